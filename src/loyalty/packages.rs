//! Wash Package Module
//!
//! Catalog of redeemable wash packages. Redemption deducts points on the
//! chain; the catalog itself is static configuration.

use serde::Serialize;

// == Wash Package ==
/// A redeemable package with a fixed point cost.
#[derive(Debug, Clone, Serialize)]
pub struct WashPackage {
    /// Stable identifier used in redemption requests
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Point cost deducted on redemption
    pub cost: u64,
}

/// The package catalog.
pub const PACKAGES: &[WashPackage] = &[
    WashPackage {
        id: "basic",
        name: "Basic Wash",
        cost: 500,
    },
    WashPackage {
        id: "deluxe",
        name: "Deluxe Wash",
        cost: 1500,
    },
    WashPackage {
        id: "premium",
        name: "Premium Detail",
        cost: 3000,
    },
];

/// Looks up a package by its identifier.
pub fn package_by_id(id: &str) -> Option<&'static WashPackage> {
    PACKAGES.iter().find(|package| package.id == id)
}
