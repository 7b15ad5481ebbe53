//! Request DTOs for the loyalty API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

/// Largest activity page a single request may ask for.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default activity page size when the query omits it.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Request body for user registration (POST /users)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    /// Wallet address of the new user
    pub address: String,
    /// Contact email for coupon notifications
    pub email: String,
    /// Optional display name
    #[serde(default)]
    pub name: Option<String>,
}

impl CreateUserRequest {
    /// Validates the request, returning an error message if invalid.
    pub fn validate(&self) -> Option<String> {
        if self.address.trim().is_empty() {
            return Some("address cannot be empty".to_string());
        }
        if !self.address.starts_with("0x") {
            return Some("address must start with 0x".to_string());
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Some("email is not valid".to_string());
        }
        None
    }
}

/// Request body for recording a wash transaction (POST /transactions)
#[derive(Debug, Clone, Deserialize)]
pub struct RecordTransactionRequest {
    /// Wallet address of the user who washed
    pub address: String,
}

impl RecordTransactionRequest {
    /// Validates the request, returning an error message if invalid.
    pub fn validate(&self) -> Option<String> {
        if self.address.trim().is_empty() {
            return Some("address cannot be empty".to_string());
        }
        None
    }
}

/// Request body for redeeming a wash package (POST /redemptions)
#[derive(Debug, Clone, Deserialize)]
pub struct RedeemPackageRequest {
    /// Wallet address of the redeeming user
    pub address: String,
    /// Catalog identifier of the package
    pub package_id: String,
}

impl RedeemPackageRequest {
    /// Validates the request, returning an error message if invalid.
    pub fn validate(&self) -> Option<String> {
        if self.address.trim().is_empty() {
            return Some("address cannot be empty".to_string());
        }
        if self.package_id.trim().is_empty() {
            return Some("package_id cannot be empty".to_string());
        }
        None
    }
}

/// Request body for granting admin rights (POST /admins)
#[derive(Debug, Clone, Deserialize)]
pub struct AddAdminRequest {
    /// Wallet address to grant admin rights to
    pub address: String,
}

impl AddAdminRequest {
    /// Validates the request, returning an error message if invalid.
    pub fn validate(&self) -> Option<String> {
        if self.address.trim().is_empty() {
            return Some("address cannot be empty".to_string());
        }
        None
    }
}

/// Query string for the activity log (GET /activity/:address)
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityQuery {
    /// Zero-based page index
    #[serde(default)]
    pub page: u32,
    /// Entries per page, clamped to `MAX_PAGE_SIZE`
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl ActivityQuery {
    /// Effective page size: at least 1, at most `MAX_PAGE_SIZE`.
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}
