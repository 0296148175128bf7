//! Listing marketplace: accounts, properties, favorites, and inquiries.

pub mod credentials;
pub mod domain;
pub mod memory;
pub mod policy;
pub mod query;
pub mod repository;
pub mod router;
pub mod service;

pub use credentials::{PasswordVault, TokenSigner, DEFAULT_TOKEN_TTL_MINUTES};
pub use router::marketplace_router;
pub use service::{MarketplaceError, MarketplaceService};

#[cfg(test)]
mod tests;
