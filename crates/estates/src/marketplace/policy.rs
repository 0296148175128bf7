//! Authorization rules for mutating shared listings.

use super::domain::{Property, User, UserRole};

/// Whether `user` may update or delete `property`.
///
/// Owners always may. Any agent-role account may mutate any listing,
/// regardless of the listing's `agent_id` — the marketplace-wide override
/// the product currently runs with. Tightening that rule to assigned
/// agents only means changing this one function.
pub fn can_mutate(user: &User, property: &Property) -> bool {
    property.owner_id == user.id || user.role == UserRole::Agent
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: &str, role: UserRole) -> User {
        User {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            full_name: id.to_string(),
            phone: None,
            role,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn property_owned_by(owner_id: &str, agent_id: Option<&str>) -> Property {
        Property {
            id: "prop-1".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            property_type: super::super::domain::PropertyType::House,
            status: super::super::domain::PropertyStatus::ForSale,
            price: 1.0,
            bedrooms: 1,
            bathrooms: 1,
            area_sqft: 100.0,
            address: "a".to_string(),
            city: "c".to_string(),
            state: "s".to_string(),
            zip_code: "z".to_string(),
            country: "USA".to_string(),
            latitude: None,
            longitude: None,
            images: Vec::new(),
            amenities: Vec::new(),
            year_built: None,
            parking_spaces: None,
            owner_id: owner_id.to_string(),
            agent_id: agent_id.map(str::to_string),
            is_featured: false,
            views: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn owner_may_mutate_regardless_of_role() {
        let property = property_owned_by("seller-1", None);
        assert!(can_mutate(&user("seller-1", UserRole::Seller), &property));
        assert!(can_mutate(&user("seller-1", UserRole::Buyer), &property));
    }

    #[test]
    fn non_owner_buyer_and_seller_are_refused() {
        let property = property_owned_by("seller-1", None);
        assert!(!can_mutate(&user("buyer-1", UserRole::Buyer), &property));
        assert!(!can_mutate(&user("seller-2", UserRole::Seller), &property));
    }

    #[test]
    fn any_agent_may_mutate_even_unassigned() {
        let property = property_owned_by("seller-1", Some("agent-assigned"));
        assert!(can_mutate(&user("agent-other", UserRole::Agent), &property));
    }
}
