//! Storage abstractions so the marketplace service can be exercised
//! against test doubles. The backing store is assumed to offer atomic
//! single-record reads and writes; nothing here spans two records.

use serde::{Deserialize, Serialize};

use super::domain::{Favorite, Inquiry, Property, PropertyStatus, User};
use super::query::{Page, PropertyFilter};

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Account record as persisted: the public profile plus the password
/// digest, which stays inside the store boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

pub trait UserRepository: Send + Sync {
    /// Insert a new account; `Conflict` when the email is already present.
    /// Email comparison is case-sensitive, matching stored bytes.
    fn insert(&self, record: StoredUser) -> Result<StoredUser, RepositoryError>;
    fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, RepositoryError>;
    fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError>;
    fn count(&self) -> Result<u64, RepositoryError>;
}

pub trait PropertyRepository: Send + Sync {
    fn insert(&self, property: Property) -> Result<Property, RepositoryError>;
    fn fetch(&self, id: &str) -> Result<Option<Property>, RepositoryError>;
    /// Fetch plus an atomic view-counter increment; the returned record
    /// carries the post-increment count. `NotFound` when absent.
    fn fetch_and_record_view(&self, id: &str) -> Result<Property, RepositoryError>;
    /// Whole-record replacement keyed by `property.id`, except `views`:
    /// the counter is store-owned and keeps the stored value, never the
    /// one carried by the argument.
    fn update(&self, property: Property) -> Result<Property, RepositoryError>;
    fn delete(&self, id: &str) -> Result<(), RepositoryError>;
    /// Filtered, offset-paginated scan in insertion order.
    fn query(&self, filter: &PropertyFilter, page: Page) -> Result<Vec<Property>, RepositoryError>;
    fn owned_by(&self, owner_id: &str) -> Result<Vec<Property>, RepositoryError>;
    fn count(&self, status: Option<PropertyStatus>) -> Result<u64, RepositoryError>;
}

pub trait EngagementRepository: Send + Sync {
    /// `Conflict` when the (user, property) pair already has a favorite.
    fn insert_favorite(&self, favorite: Favorite) -> Result<Favorite, RepositoryError>;
    /// `NotFound` when no such favorite exists; removal is not a no-op.
    fn delete_favorite(&self, user_id: &str, property_id: &str) -> Result<(), RepositoryError>;
    fn favorites_for(&self, user_id: &str) -> Result<Vec<Favorite>, RepositoryError>;
    fn insert_inquiry(&self, inquiry: Inquiry) -> Result<Inquiry, RepositoryError>;
    fn inquiries_by_user(&self, user_id: &str) -> Result<Vec<Inquiry>, RepositoryError>;
    fn inquiries_for_properties(
        &self,
        property_ids: &[String],
    ) -> Result<Vec<Inquiry>, RepositoryError>;
}
