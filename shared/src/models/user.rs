//! User Model
//!
//! Users cover both storefront customers and back-office staff. The role is
//! a closed set; parsing is case-insensitive because historic client data
//! mixed `"Admin"` and `"admin"` spellings.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// User role (closed set, canonical lowercase)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum Role {
    Admin,
    Manager,
    Baker,
    Cashier,
    Customer,
}

impl Role {
    /// All roles, for exhaustive iteration in tests and admin UIs
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Manager,
        Role::Baker,
        Role::Cashier,
        Role::Customer,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Baker => "baker",
            Role::Cashier => "cashier",
            Role::Customer => "customer",
        }
    }

    /// Staff roles are everything except `customer`
    pub const fn is_staff(&self) -> bool {
        !matches!(self, Role::Customer)
    }
}

/// Error when parsing an unknown role string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Case-insensitive: legacy clients sent "Admin", "Customer", ...
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "baker" => Ok(Role::Baker),
            "cashier" => Ok(Role::Cashier),
            "customer" => Ok(Role::Customer),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum UserStatus {
    Active,
    Inactive,
}

impl UserStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }
}

/// Error when parsing an unknown status string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown user status: {0}")]
pub struct ParseUserStatusError(pub String);

impl FromStr for UserStatus {
    type Err = ParseUserStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            _ => Err(ParseUserStatusError(s.to_string())),
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for UserStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Unique, compared case-insensitively
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub status: UserStatus,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Public projection of a user (no credential material)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: i64,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            status: u.status,
            phone: u.phone,
            address: u.address,
            created_at: u.created_at,
        }
    }
}

/// Registration payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Optional explicit role; defaults to `customer`
    pub role: Option<Role>,
}

/// Login payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: bearer token plus the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserView,
}

/// Self-service profile update (unset fields keep their value)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Admin user update: may also change role and status
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("CUSTOMER".parse::<Role>().unwrap(), Role::Customer);
        assert_eq!("Baker".parse::<Role>().unwrap(), Role::Baker);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"manager\"");
        let parsed: Role = serde_json::from_str("\"Cashier\"").unwrap();
        assert_eq!(parsed, Role::Cashier);
    }

    #[test]
    fn staff_roles() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Baker.is_staff());
        assert!(!Role::Customer.is_staff());
    }

    #[test]
    fn user_view_drops_credentials() {
        let user = User {
            id: 1,
            name: "Jane".into(),
            email: "jane@example.com".into(),
            password_hash: "$argon2id$...".into(),
            role: Role::Customer,
            status: UserStatus::Active,
            phone: None,
            address: None,
            created_at: 0,
            updated_at: 0,
        };
        let json = serde_json::to_string(&UserView::from(user)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }
}
