use std::sync::Arc;

use estates::marketplace::credentials::TokenSigner;
use estates::marketplace::domain::{
    PropertyDraft, PropertyPatch, PropertyStatus, PropertyType, Registration, UserRole,
};
use estates::marketplace::memory::{
    InMemoryEngagementRepository, InMemoryPropertyRepository, InMemoryUserRepository,
};
use estates::marketplace::{MarketplaceError, MarketplaceService};

type Service = MarketplaceService<
    InMemoryUserRepository,
    InMemoryPropertyRepository,
    InMemoryEngagementRepository,
>;

fn marketplace() -> Service {
    MarketplaceService::new(
        Arc::new(InMemoryUserRepository::default()),
        Arc::new(InMemoryPropertyRepository::default()),
        Arc::new(InMemoryEngagementRepository::default()),
        TokenSigner::with_default_ttl("flow-test-secret"),
    )
}

fn account(email: &str, role: UserRole) -> Registration {
    Registration {
        email: email.to_string(),
        password: "a sturdy passphrase".to_string(),
        full_name: format!("Account {email}"),
        phone: None,
        role,
    }
}

fn listing(price: f64) -> PropertyDraft {
    PropertyDraft {
        title: "Corner Lot".to_string(),
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
        amenities: Vec::new(),
        year_built: None,
        parking_spaces: None,
        agent_id: None,
        is_featured: false,
    }
}

#[test]
fn seller_lifecycle_from_registration_to_deletion() {
    let marketplace = marketplace();

    let seller = marketplace
        .register(account("seller@example.com", UserRole::Seller))
        .expect("seller registers");
    let buyer = marketplace
        .register(account("buyer@example.com", UserRole::Buyer))
        .expect("buyer registers");

    // The issued token resolves straight back to the seller account.
    let me = marketplace
        .current_user(&seller.access_token)
        .expect("token resolves");
    assert_eq!(me.id, seller.user.id);

    let created = marketplace
        .create_property(listing(350_000.0), &seller.user)
        .expect("listing created");
    assert_eq!(created.price, 350_000.0);
    assert_eq!(created.views, 0);

    let updated = marketplace
        .update_property(
            &created.id,
            PropertyPatch {
                price: Some(375_000.0),
                ..PropertyPatch::default()
            },
            &seller.user,
        )
        .expect("owner updates price");
    assert_eq!(updated.price, 375_000.0);

    let fetched = marketplace
        .get_property(&created.id)
        .expect("listing fetches");
    assert_eq!(fetched.price, 375_000.0);
    assert_eq!(fetched.views, 1, "exactly one recorded view");

    let refused = marketplace.delete_property(&created.id, &buyer.user);
    assert!(matches!(refused, Err(MarketplaceError::Forbidden)));

    marketplace
        .delete_property(&created.id, &seller.user)
        .expect("owner deletes");

    let gone = marketplace.get_property(&created.id);
    assert!(matches!(gone, Err(MarketplaceError::NotFound)));
}
