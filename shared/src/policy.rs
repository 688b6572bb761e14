//! Role-Based Access Policy
//!
//! One total, pure function over (role, resource, action). Every component
//! that performs a gated operation consults this table; a denial surfaces as
//! an authorization error, never a silent no-op.

use crate::models::Role;

/// Protected resource groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Back-office dashboard and reports
    Dashboard,
    /// Product catalog management
    Products,
    /// The staff-facing order queue
    Orders,
    /// Inventory management
    Inventory,
    /// User directory management
    Users,
    /// Staff notification feed
    Notifications,
    /// A customer's own order history
    OwnOrders,
}

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::Dashboard,
        Resource::Products,
        Resource::Orders,
        Resource::Inventory,
        Resource::Users,
        Resource::Notifications,
        Resource::OwnOrders,
    ];
}

/// Actions on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::View, Action::Create, Action::Update, Action::Delete];
}

/// The access matrix.
///
/// | Resource       | admin | manager | cashier | baker | customer |
/// |----------------|-------|---------|---------|-------|----------|
/// | Dashboard      |  ✓    |  ✓      |  ✗      |  ✗    |  ✗       |
/// | Products (rw)  |  ✓    |  ✓      |  ✓      |  ✗    |  ✗       |
/// | Orders (staff) |  ✓    |  ✓      |  ✓      |  ✓    |  ✗       |
/// | Inventory      |  ✓    |  ✓      |  ✗      |  ✓    |  ✗       |
/// | Users          |  ✓    |  ✗      |  ✗      |  ✗    |  ✗       |
/// | Notifications  |  ✓    |  ✓      |  ✓      |  ✓    |  ✗       |
/// | OwnOrders      |  ✗    |  ✗      |  ✗      |  ✗    |  ✓       |
///
/// Two deliberate refinements: browsing the catalog (`Products`/`View`) is
/// open to every signed-in role since the storefront needs it, and
/// `Orders`/`Create` is open to every role: customers order for themselves,
/// staff enter walk-in orders at the counter.
pub const fn can_access(role: Role, resource: Resource, action: Action) -> bool {
    match (resource, action) {
        (Resource::Dashboard, Action::View) => matches!(role, Role::Admin | Role::Manager),
        (Resource::Dashboard, _) => false,

        (Resource::Products, Action::View) => true,
        (Resource::Products, _) => matches!(role, Role::Admin | Role::Manager | Role::Cashier),

        (Resource::Orders, Action::Create) => true,
        (Resource::Orders, Action::View | Action::Update) => {
            matches!(role, Role::Admin | Role::Manager | Role::Cashier | Role::Baker)
        }
        // Orders are never deleted; cancellation is a status change
        (Resource::Orders, Action::Delete) => false,

        (Resource::Inventory, _) => matches!(role, Role::Admin | Role::Manager | Role::Baker),

        (Resource::Users, _) => matches!(role, Role::Admin),

        (Resource::Notifications, Action::View) => role.is_staff(),
        (Resource::Notifications, _) => false,

        (Resource::OwnOrders, Action::View) => matches!(role, Role::Customer),
        (Resource::OwnOrders, _) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role::*;

    /// The tabulated matrix, row by row, all five roles each.
    #[test]
    fn matrix_dashboard() {
        let expect = [(Admin, true), (Manager, true), (Cashier, false), (Baker, false), (Customer, false)];
        for (role, allowed) in expect {
            assert_eq!(can_access(role, Resource::Dashboard, Action::View), allowed, "{role}");
        }
    }

    #[test]
    fn matrix_manage_products() {
        let expect = [(Admin, true), (Manager, true), (Cashier, true), (Baker, false), (Customer, false)];
        for (role, allowed) in expect {
            for action in [Action::Create, Action::Update, Action::Delete] {
                assert_eq!(can_access(role, Resource::Products, action), allowed, "{role}");
            }
        }
    }

    #[test]
    fn matrix_staff_orders() {
        let expect = [(Admin, true), (Manager, true), (Cashier, true), (Baker, true), (Customer, false)];
        for (role, allowed) in expect {
            assert_eq!(can_access(role, Resource::Orders, Action::View), allowed, "{role} view");
            assert_eq!(can_access(role, Resource::Orders, Action::Update), allowed, "{role} update");
        }
    }

    #[test]
    fn matrix_inventory() {
        let expect = [(Admin, true), (Manager, true), (Cashier, false), (Baker, true), (Customer, false)];
        for (role, allowed) in expect {
            for action in Action::ALL {
                assert_eq!(can_access(role, Resource::Inventory, action), allowed, "{role}");
            }
        }
    }

    #[test]
    fn matrix_users() {
        let expect = [(Admin, true), (Manager, false), (Cashier, false), (Baker, false), (Customer, false)];
        for (role, allowed) in expect {
            for action in Action::ALL {
                assert_eq!(can_access(role, Resource::Users, action), allowed, "{role}");
            }
        }
    }

    #[test]
    fn matrix_notifications() {
        let expect = [(Admin, true), (Manager, true), (Cashier, true), (Baker, true), (Customer, false)];
        for (role, allowed) in expect {
            assert_eq!(can_access(role, Resource::Notifications, Action::View), allowed, "{role}");
        }
    }

    #[test]
    fn matrix_own_orders() {
        let expect = [(Admin, false), (Manager, false), (Cashier, false), (Baker, false), (Customer, true)];
        for (role, allowed) in expect {
            assert_eq!(can_access(role, Resource::OwnOrders, Action::View), allowed, "{role}");
        }
    }

    #[test]
    fn every_role_may_create_orders() {
        for role in Role::ALL {
            assert!(can_access(role, Resource::Orders, Action::Create), "{role}");
        }
    }

    #[test]
    fn orders_are_never_deletable() {
        for role in Role::ALL {
            assert!(!can_access(role, Resource::Orders, Action::Delete), "{role}");
        }
    }

    /// Totality: the function answers for every triple without panicking.
    #[test]
    fn matrix_is_total() {
        let mut grants = 0;
        for role in Role::ALL {
            for resource in Resource::ALL {
                for action in Action::ALL {
                    if can_access(role, resource, action) {
                        grants += 1;
                    }
                }
            }
        }
        assert!(grants > 0);
    }
}
