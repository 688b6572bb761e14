//! Order Service
//!
//! The single entry point for order operations. Every call checks the role
//! policy first, then delegates to the draft builder and the store. All
//! store calls are bounded by the configured timeout so a stuck database
//! surfaces as a storage-unavailable error instead of a hung request, and
//! every mutation emits a structured audit event naming the actor.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use shared::models::{Order, OrderCreate, OrderStatus, Product, Role};
use shared::policy::{Action, Resource, can_access};

use super::draft::{self, CustomerInfo};
use super::store::{OrderStore, ProductCatalog};
use crate::auth::CurrentUser;
use crate::audit_log;
use crate::db::repository::RepoResult;
use crate::utils::AppError;

/// Default walk-in customer name when staff do not supply one
const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

pub struct OrderService {
    store: Arc<dyn OrderStore>,
    catalog: Arc<dyn ProductCatalog>,
    store_timeout: Duration,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        catalog: Arc<dyn ProductCatalog>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            catalog,
            store_timeout,
        }
    }

    /// Run a store/catalog call under the configured timeout
    async fn bounded<T>(
        &self,
        what: &'static str,
        fut: impl Future<Output = RepoResult<T>>,
    ) -> Result<T, AppError> {
        match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => Err(AppError::StorageUnavailable(format!("{what} timed out"))),
        }
    }

    fn deny(&self, actor: &CurrentUser, action: &'static str) -> AppError {
        audit_log!(
            "authorization_denied",
            actor_id = actor.id,
            actor_role = %actor.role,
            attempted = action
        );
        AppError::Forbidden(format!("Role '{}' may not {action}", actor.role))
    }

    /// Place an order. Customers order for themselves; staff enter walk-in
    /// orders where the customer fields come from the request and the
    /// customer reference stays null.
    pub async fn place_order(
        &self,
        actor: &CurrentUser,
        request: OrderCreate,
    ) -> Result<Order, AppError> {
        if !can_access(actor.role, Resource::Orders, Action::Create) {
            return Err(self.deny(actor, "create orders"));
        }

        let customer = if actor.role == Role::Customer {
            CustomerInfo {
                id: Some(actor.id),
                name: actor.name.clone(),
                email: Some(actor.email.clone()),
            }
        } else {
            CustomerInfo {
                id: None,
                name: request
                    .customer_name
                    .clone()
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| WALK_IN_CUSTOMER.to_string()),
                email: request.customer_email.clone(),
            }
        };

        // Resolve each distinct product once; the draft builder stays pure
        let mut products: HashMap<i64, Product> = HashMap::new();
        for item in &request.items {
            if products.contains_key(&item.product_id) {
                continue;
            }
            if let Some(product) = self
                .bounded("catalog lookup", self.catalog.get_product(item.product_id))
                .await?
            {
                products.insert(item.product_id, product);
            }
        }

        let order_draft = draft::build_draft(customer, &request, |id| products.get(&id).cloned())?;

        let order = self
            .bounded("order create", self.store.create(order_draft))
            .await?;

        audit_log!(
            "order_created",
            actor_id = actor.id,
            actor_role = %actor.role,
            order_id = order.id,
            total = order.total
        );

        Ok(order)
    }

    /// List orders according to the caller's role: customers see their own,
    /// staff with order access see everything.
    pub async fn list_orders(&self, actor: &CurrentUser) -> Result<Vec<Order>, AppError> {
        if actor.role == Role::Customer {
            if !can_access(actor.role, Resource::OwnOrders, Action::View) {
                return Err(self.deny(actor, "view orders"));
            }
            return self
                .bounded("order list", self.store.find_for_customer(actor.id))
                .await;
        }

        if !can_access(actor.role, Resource::Orders, Action::View) {
            return Err(self.deny(actor, "view orders"));
        }
        self.bounded("order list", self.store.find_all()).await
    }

    /// The caller's own order history, whatever their role. Staff rarely
    /// have any (walk-in orders carry no customer reference).
    pub async fn list_own_orders(&self, actor: &CurrentUser) -> Result<Vec<Order>, AppError> {
        self.bounded("order list", self.store.find_for_customer(actor.id))
            .await
    }

    /// Transition an order's status. Staff only; the store enforces the
    /// state machine atomically.
    pub async fn change_status(
        &self,
        actor: &CurrentUser,
        order_id: i64,
        new_status: OrderStatus,
    ) -> Result<Order, AppError> {
        if !can_access(actor.role, Resource::Orders, Action::Update) {
            return Err(self.deny(actor, "update orders"));
        }

        let order = self
            .bounded(
                "order status update",
                self.store.update_status(order_id, new_status),
            )
            .await?;

        audit_log!(
            "order_status_changed",
            actor_id = actor.id,
            actor_role = %actor.role,
            order_id = order.id,
            status = %order.status
        );

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::RepoError;
    use crate::orders::draft::OrderDraft;
    use async_trait::async_trait;
    use shared::models::OrderLineRequest;
    use std::sync::Mutex;

    /// In-memory store double implementing the same contract as SQLite
    #[derive(Default)]
    struct MemoryOrderStore {
        orders: Mutex<Vec<Order>>,
        next_id: Mutex<i64>,
    }

    #[async_trait]
    impl OrderStore for MemoryOrderStore {
        async fn create(&self, draft: OrderDraft) -> RepoResult<Order> {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            let order = Order {
                id: *next,
                customer_id: draft.customer_id,
                customer_name: draft.customer_name,
                customer_email: draft.customer_email,
                lines: draft.lines,
                total: draft.total,
                status: OrderStatus::Pending,
                phone: draft.phone,
                address: draft.address,
                created_at: shared::util::now_millis(),
                start_time: None,
                completed_time: None,
            };
            self.orders.lock().unwrap().push(order.clone());
            Ok(order)
        }

        async fn find_by_id(&self, id: i64) -> RepoResult<Option<Order>> {
            Ok(self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned())
        }

        async fn find_all(&self) -> RepoResult<Vec<Order>> {
            let mut orders = self.orders.lock().unwrap().clone();
            orders.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            Ok(orders)
        }

        async fn find_for_customer(&self, customer_id: i64) -> RepoResult<Vec<Order>> {
            let mut orders: Vec<Order> = self
                .orders
                .lock()
                .unwrap()
                .iter()
                .filter(|o| o.customer_id == Some(customer_id))
                .cloned()
                .collect();
            orders.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            Ok(orders)
        }

        async fn update_status(&self, id: i64, new_status: OrderStatus) -> RepoResult<Order> {
            let mut orders = self.orders.lock().unwrap();
            let order = orders
                .iter_mut()
                .find(|o| o.id == id)
                .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))?;
            if !order.status.can_transition(new_status) {
                return Err(RepoError::InvalidTransition {
                    from: order.status,
                    to: new_status,
                });
            }
            order.status = new_status;
            let now = shared::util::now_millis();
            match new_status {
                OrderStatus::Processing => {
                    order.start_time.get_or_insert(now);
                }
                OrderStatus::Completed => order.completed_time = Some(now),
                _ => {}
            }
            Ok(order.clone())
        }
    }

    struct MemoryCatalog(HashMap<i64, Product>);

    #[async_trait]
    impl ProductCatalog for MemoryCatalog {
        async fn get_product(&self, id: i64) -> RepoResult<Option<Product>> {
            Ok(self.0.get(&id).cloned())
        }
    }

    fn service() -> OrderService {
        let mut products = HashMap::new();
        products.insert(
            7,
            Product {
                id: 7,
                name: "Croissant".into(),
                description: None,
                price: 22.00,
                stock: 100,
                image_url: None,
                created_at: 0,
                updated_at: 0,
            },
        );
        OrderService::new(
            Arc::new(MemoryOrderStore::default()),
            Arc::new(MemoryCatalog(products)),
            Duration::from_secs(5),
        )
    }

    fn actor(id: i64, role: Role) -> CurrentUser {
        CurrentUser {
            id,
            name: format!("user-{id}"),
            email: format!("user{id}@example.com"),
            role,
        }
    }

    fn order_request(quantity: i64) -> OrderCreate {
        OrderCreate {
            items: vec![OrderLineRequest { product_id: 7, quantity }],
            customer_name: None,
            customer_email: None,
            phone: None,
            address: None,
            client_token: None,
        }
    }

    #[tokio::test]
    async fn customer_order_snapshots_caller_identity() {
        let svc = service();
        let customer = actor(1, Role::Customer);
        let order = svc.place_order(&customer, order_request(2)).await.unwrap();
        assert_eq!(order.customer_id, Some(1));
        assert_eq!(order.customer_name, "user-1");
        assert_eq!(order.total, 44.00);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn staff_walk_in_order_has_no_customer_reference() {
        let svc = service();
        let cashier = actor(2, Role::Cashier);
        let mut request = order_request(1);
        request.customer_name = Some("Counter Guest".into());
        let order = svc.place_order(&cashier, request).await.unwrap();
        assert_eq!(order.customer_id, None);
        assert_eq!(order.customer_name, "Counter Guest");
    }

    #[tokio::test]
    async fn staff_walk_in_defaults_customer_name() {
        let svc = service();
        let order = svc
            .place_order(&actor(2, Role::Cashier), order_request(1))
            .await
            .unwrap();
        assert_eq!(order.customer_name, WALK_IN_CUSTOMER);
    }

    #[tokio::test]
    async fn invalid_quantity_is_rejected_before_any_write() {
        let svc = service();
        let err = svc
            .place_order(&actor(1, Role::Customer), order_request(0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        // Nothing was persisted
        let staff = actor(3, Role::Manager);
        assert!(svc.list_orders(&staff).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn customers_only_see_their_own_orders() {
        let svc = service();
        let alice = actor(1, Role::Customer);
        let bob = actor(2, Role::Customer);
        svc.place_order(&alice, order_request(1)).await.unwrap();
        svc.place_order(&bob, order_request(1)).await.unwrap();
        svc.place_order(&alice, order_request(2)).await.unwrap();

        let mine = svc.list_orders(&alice).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|o| o.customer_id == Some(1)));

        let all = svc.list_orders(&actor(9, Role::Baker)).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn customer_cannot_change_status() {
        let svc = service();
        let customer = actor(1, Role::Customer);
        let order = svc.place_order(&customer, order_request(1)).await.unwrap();
        let err = svc
            .change_status(&customer, order.id, OrderStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn completing_then_reopening_fails_with_invalid_transition() {
        let svc = service();
        let order = svc
            .place_order(&actor(1, Role::Customer), order_request(1))
            .await
            .unwrap();
        let staff = actor(5, Role::Manager);

        let completed = svc
            .change_status(&staff, order.id, OrderStatus::Completed)
            .await
            .unwrap();
        assert!(completed.completed_time.is_some());

        let err = svc
            .change_status(&staff, order.id, OrderStatus::Processing)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn status_change_on_unknown_order_is_not_found() {
        let svc = service();
        let err = svc
            .change_status(&actor(5, Role::Admin), 424242, OrderStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
