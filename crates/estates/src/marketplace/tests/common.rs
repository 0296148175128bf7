use std::sync::Arc;

use crate::marketplace::credentials::TokenSigner;
use crate::marketplace::domain::{
    PropertyDraft, PropertyStatus, PropertyType, Registration, TokenGrant, UserRole,
};
use crate::marketplace::memory::{
    InMemoryEngagementRepository, InMemoryPropertyRepository, InMemoryUserRepository,
};
use crate::marketplace::service::MarketplaceService;

pub(super) type TestService = MarketplaceService<
    InMemoryUserRepository,
    InMemoryPropertyRepository,
    InMemoryEngagementRepository,
>;

pub(super) fn service() -> Arc<TestService> {
    Arc::new(MarketplaceService::new(
        Arc::new(InMemoryUserRepository::default()),
        Arc::new(InMemoryPropertyRepository::default()),
        Arc::new(InMemoryEngagementRepository::default()),
        TokenSigner::with_default_ttl("marketplace-test-secret"),
    ))
}

pub(super) fn registration(email: &str, role: UserRole) -> Registration {
    Registration {
        email: email.to_string(),
        password: "a sturdy passphrase".to_string(),
        full_name: format!("Account {email}"),
        phone: None,
        role,
    }
}

pub(super) fn register(service: &TestService, email: &str, role: UserRole) -> TokenGrant {
    service
        .register(registration(email, role))
        .expect("registration succeeds")
}

pub(super) fn draft(title: &str, price: f64) -> PropertyDraft {
    PropertyDraft {
        title: title.to_string(),
        description: "Bright rooms, quiet street".to_string(),
        property_type: PropertyType::House,
        status: PropertyStatus::ForSale,
        price,
        bedrooms: 3,
        bathrooms: 2,
        area_sqft: 1450.0,
        address: "901 Grand Ave".to_string(),
        city: "Des Moines".to_string(),
        state: "IA".to_string(),
        zip_code: "50309".to_string(),
        country: "USA".to_string(),
        latitude: None,
        longitude: None,
        images: Vec::new(),
        amenities: vec!["garage".to_string()],
        year_built: Some(1994),
        parking_spaces: Some(2),
        agent_id: None,
        is_featured: false,
    }
}
