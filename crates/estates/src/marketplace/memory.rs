//! In-memory reference implementation of the repository traits, used by
//! the service binary and the test suites. Each collection serializes its
//! operations behind one mutex, which is what makes the view-counter bump
//! in [`fetch_and_record_view`] an atomic increment rather than a
//! read-modify-write.
//!
//! [`fetch_and_record_view`]: crate::marketplace::repository::PropertyRepository::fetch_and_record_view

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::domain::{Favorite, Inquiry, Property, PropertyStatus, User};
use super::query::{Page, PropertyFilter};
use super::repository::{
    EngagementRepository, PropertyRepository, RepositoryError, StoredUser, UserRepository,
};

#[derive(Default, Clone)]
pub struct InMemoryUserRepository {
    records: Arc<Mutex<HashMap<String, StoredUser>>>,
}

impl UserRepository for InMemoryUserRepository {
    fn insert(&self, record: StoredUser) -> Result<StoredUser, RepositoryError> {
        let mut guard = self.records.lock().expect("user mutex poisoned");
        if guard
            .values()
            .any(|existing| existing.user.email == record.user.email)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.user.id.clone(), record.clone());
        Ok(record)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, RepositoryError> {
        let guard = self.records.lock().expect("user mutex poisoned");
        Ok(guard
            .values()
            .find(|record| record.user.email == email)
            .cloned())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        let guard = self.records.lock().expect("user mutex poisoned");
        Ok(guard.get(id).map(|record| record.user.clone()))
    }

    fn count(&self) -> Result<u64, RepositoryError> {
        let guard = self.records.lock().expect("user mutex poisoned");
        Ok(guard.len() as u64)
    }
}

/// Properties live in a Vec so filtered queries page in insertion order,
/// the way a collection scan would.
#[derive(Default, Clone)]
pub struct InMemoryPropertyRepository {
    records: Arc<Mutex<Vec<Property>>>,
}

impl PropertyRepository for InMemoryPropertyRepository {
    fn insert(&self, property: Property) -> Result<Property, RepositoryError> {
        let mut guard = self.records.lock().expect("property mutex poisoned");
        if guard.iter().any(|existing| existing.id == property.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(property.clone());
        Ok(property)
    }

    fn fetch(&self, id: &str) -> Result<Option<Property>, RepositoryError> {
        let guard = self.records.lock().expect("property mutex poisoned");
        Ok(guard.iter().find(|property| property.id == id).cloned())
    }

    fn fetch_and_record_view(&self, id: &str) -> Result<Property, RepositoryError> {
        let mut guard = self.records.lock().expect("property mutex poisoned");
        let property = guard
            .iter_mut()
            .find(|property| property.id == id)
            .ok_or(RepositoryError::NotFound)?;
        property.views += 1;
        Ok(property.clone())
    }

    fn update(&self, property: Property) -> Result<Property, RepositoryError> {
        let mut guard = self.records.lock().expect("property mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|existing| existing.id == property.id)
            .ok_or(RepositoryError::NotFound)?;
        // The view counter is store-owned: a bump recorded between the
        // caller's fetch and this write must survive the replacement.
        let views = slot.views;
        *slot = property;
        slot.views = views;
        Ok(slot.clone())
    }

    fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("property mutex poisoned");
        let before = guard.len();
        guard.retain(|property| property.id != id);
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn query(&self, filter: &PropertyFilter, page: Page) -> Result<Vec<Property>, RepositoryError> {
        let guard = self.records.lock().expect("property mutex poisoned");
        Ok(guard
            .iter()
            .filter(|property| filter.is_match_all() || filter.matches(property))
            .skip(page.offset)
            .take(page.limit)
            .cloned()
            .collect())
    }

    fn owned_by(&self, owner_id: &str) -> Result<Vec<Property>, RepositoryError> {
        let guard = self.records.lock().expect("property mutex poisoned");
        Ok(guard
            .iter()
            .filter(|property| property.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn count(&self, status: Option<PropertyStatus>) -> Result<u64, RepositoryError> {
        let guard = self.records.lock().expect("property mutex poisoned");
        let count = match status {
            Some(status) => guard
                .iter()
                .filter(|property| property.status == status)
                .count(),
            None => guard.len(),
        };
        Ok(count as u64)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryEngagementRepository {
    favorites: Arc<Mutex<Vec<Favorite>>>,
    inquiries: Arc<Mutex<Vec<Inquiry>>>,
}

impl EngagementRepository for InMemoryEngagementRepository {
    fn insert_favorite(&self, favorite: Favorite) -> Result<Favorite, RepositoryError> {
        let mut guard = self.favorites.lock().expect("favorite mutex poisoned");
        if guard.iter().any(|existing| {
            existing.user_id == favorite.user_id && existing.property_id == favorite.property_id
        }) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(favorite.clone());
        Ok(favorite)
    }

    fn delete_favorite(&self, user_id: &str, property_id: &str) -> Result<(), RepositoryError> {
        let mut guard = self.favorites.lock().expect("favorite mutex poisoned");
        let before = guard.len();
        guard.retain(|favorite| {
            !(favorite.user_id == user_id && favorite.property_id == property_id)
        });
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn favorites_for(&self, user_id: &str) -> Result<Vec<Favorite>, RepositoryError> {
        let guard = self.favorites.lock().expect("favorite mutex poisoned");
        Ok(guard
            .iter()
            .filter(|favorite| favorite.user_id == user_id)
            .cloned()
            .collect())
    }

    fn insert_inquiry(&self, inquiry: Inquiry) -> Result<Inquiry, RepositoryError> {
        let mut guard = self.inquiries.lock().expect("inquiry mutex poisoned");
        guard.push(inquiry.clone());
        Ok(inquiry)
    }

    fn inquiries_by_user(&self, user_id: &str) -> Result<Vec<Inquiry>, RepositoryError> {
        let guard = self.inquiries.lock().expect("inquiry mutex poisoned");
        Ok(guard
            .iter()
            .filter(|inquiry| inquiry.user_id == user_id)
            .cloned()
            .collect())
    }

    fn inquiries_for_properties(
        &self,
        property_ids: &[String],
    ) -> Result<Vec<Inquiry>, RepositoryError> {
        let guard = self.inquiries.lock().expect("inquiry mutex poisoned");
        Ok(guard
            .iter()
            .filter(|inquiry| property_ids.contains(&inquiry.property_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::domain::{PropertyStatus, PropertyType};
    use chrono::Utc;

    fn listing(id: &str) -> Property {
        Property {
            id: id.to_string(),
            title: "Corner Lot".to_string(),
            description: "well maintained".to_string(),
            property_type: PropertyType::House,
            status: PropertyStatus::ForSale,
            price: 350_000.0,
            bedrooms: 3,
            bathrooms: 2,
            area_sqft: 1600.0,
            address: "44 Elm Ct".to_string(),
            city: "Des Moines".to_string(),
            state: "Iowa".to_string(),
            zip_code: "50310".to_string(),
            country: "USA".to_string(),
            latitude: None,
            longitude: None,
            images: Vec::new(),
            amenities: Vec::new(),
            year_built: None,
            parking_spaces: None,
            owner_id: "user-1".to_string(),
            agent_id: None,
            is_featured: false,
            views: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn update_keeps_view_bumps_recorded_after_the_snapshot() {
        let repo = InMemoryPropertyRepository::default();
        repo.insert(listing("p1")).expect("insert succeeds");

        // Snapshot before the bump, the way an editing request races a
        // concurrent detail fetch.
        let mut snapshot = repo.fetch("p1").expect("fetch succeeds").expect("present");
        repo.fetch_and_record_view("p1").expect("view recorded");

        snapshot.price = 375_000.0;
        let written = repo.update(snapshot).expect("update succeeds");
        assert_eq!(written.views, 1, "stale snapshot must not erase the bump");
        assert_eq!(written.price, 375_000.0);

        let stored = repo.fetch("p1").expect("fetch succeeds").expect("present");
        assert_eq!(stored.views, 1);
    }
}
