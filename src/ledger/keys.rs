//! Cache Key Scheme
//!
//! Structured `prefix:identifier[:sub]` keys for every chain-owned value
//! the gateway shadows. Addresses are normalized to lowercase before
//! keying so mixed-case requests share one entry.

/// Fixed key for the combined admin list.
pub const ADMINS_KEY: &str = "admins:all";

/// Lowercases an address for use in cache keys and comparisons.
pub fn normalize_address(address: &str) -> String {
    address.to_ascii_lowercase()
}

/// Key shadowing a user's point balance.
pub fn points_key(address: &str) -> String {
    format!("points:{}", normalize_address(address))
}

/// Key shadowing a user's NFT metadata record.
pub fn nft_key(address: &str) -> String {
    format!("nft:{}", normalize_address(address))
}

/// Key shadowing a user's free-wash coupon status.
pub fn free_wash_key(address: &str) -> String {
    format!("freewash:{}", normalize_address(address))
}

/// Key shadowing one page of a user's activity log. Pagination parameters
/// are part of the key, not the value.
pub fn activity_key(address: &str, page: u32, page_size: u32) -> String {
    format!(
        "activity:{}:{}:{}",
        normalize_address(address),
        page,
        page_size
    )
}

/// Glob matching every cached activity page for one user.
pub fn activity_pattern(address: &str) -> String {
    format!("activity:{}:*", normalize_address(address))
}
