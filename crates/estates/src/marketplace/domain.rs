use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marketplace account roles. Buyers browse and inquire; sellers list;
/// agents additionally hold the listing mutation override (see `policy`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Buyer,
    Seller,
    Agent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    House,
    Villa,
    Commercial,
    Land,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    ForSale,
    ForRent,
    Sold,
    Rented,
}

/// Inquiry lifecycle. Only `New` is ever assigned in-process; the other
/// states exist for operators working the store directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    New,
    Contacted,
    Closed,
}

/// Public account profile. The password digest never lives on this struct,
/// so serializing a `User` can never leak it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload. The role defaults to buyer, matching the public
/// sign-up form.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_role")]
    pub role: UserRole,
}

fn default_role() -> UserRole {
    UserRole::Buyer
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token envelope returned by register and login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: User,
}

/// A listing record. `views` is server-incremented on every fetch-by-id;
/// `owner_id` is always the authenticated creator and never client-supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    pub price: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub area_sqft: f64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub year_built: Option<i32>,
    pub parking_spaces: Option<u32>,
    pub owner_id: String,
    pub agent_id: Option<String>,
    pub is_featured: bool,
    pub views: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied fields for a new listing. Identity, ownership,
/// timestamps, and the view counter are assigned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDraft {
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    pub price: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub area_sqft: f64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub year_built: Option<i32>,
    #[serde(default)]
    pub parking_spaces: Option<u32>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

fn default_country() -> String {
    "USA".to_string()
}

/// Partial update for a listing. Only populated fields are merged;
/// id, owner_id, views, and created_at are immutable through this path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<PropertyType>,
    pub status: Option<PropertyStatus>,
    pub price: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub area_sqft: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub images: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    pub year_built: Option<i32>,
    pub parking_spaces: Option<u32>,
    pub is_featured: Option<bool>,
}

macro_rules! merge_field {
    ($patch:ident, $target:ident, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $patch.$field.take() {
                $target.$field = value;
            }
        )+
    };
}

impl PropertyPatch {
    /// Merge the populated fields into `target` and touch `updated_at`.
    pub fn apply_to(mut self, target: &mut Property, now: DateTime<Utc>) {
        merge_field!(
            self, target, title, description, property_type, status, price, bedrooms, bathrooms,
            area_sqft, address, city, state, zip_code, images, amenities, is_featured,
        );
        // Optional columns overwrite only when the patch names them.
        if self.latitude.is_some() {
            target.latitude = self.latitude;
        }
        if self.longitude.is_some() {
            target.longitude = self.longitude;
        }
        if self.year_built.is_some() {
            target.year_built = self.year_built;
        }
        if self.parking_spaces.is_some() {
            target.parking_spaces = self.parking_spaces;
        }
        target.updated_at = now;
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.property_type.is_none()
            && self.status.is_none()
            && self.price.is_none()
            && self.bedrooms.is_none()
            && self.bathrooms.is_none()
            && self.area_sqft.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip_code.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.images.is_none()
            && self.amenities.is_none()
            && self.year_built.is_none()
            && self.parking_spaces.is_none()
            && self.is_featured.is_none()
    }
}

/// A buyer-to-seller message about a listing. `user_id` is always the
/// authenticated requester, never taken from the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: String,
    pub property_id: String,
    pub user_id: String,
    pub message: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InquiryDraft {
    pub property_id: String,
    pub message: String,
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

/// Saved-listing row. At most one per (user, property) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: String,
    pub user_id: String,
    pub property_id: String,
    pub created_at: DateTime<Utc>,
}

/// Headline counters for the public dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarketplaceStats {
    pub total_properties: u64,
    pub properties_for_sale: u64,
    pub properties_for_rent: u64,
    pub total_users: u64,
}

impl UserRole {
    pub const fn label(self) -> &'static str {
        match self {
            UserRole::Buyer => "buyer",
            UserRole::Seller => "seller",
            UserRole::Agent => "agent",
        }
    }
}

impl PropertyStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PropertyStatus::ForSale => "for_sale",
            PropertyStatus::ForRent => "for_rent",
            PropertyStatus::Sold => "sold",
            PropertyStatus::Rented => "rented",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn base_property() -> Property {
        Property {
            id: "prop-1".to_string(),
            title: "Sunny walk-up".to_string(),
            description: "Two bed near the river".to_string(),
            property_type: PropertyType::Apartment,
            status: PropertyStatus::ForSale,
            price: 350_000.0,
            bedrooms: 2,
            bathrooms: 1,
            area_sqft: 900.0,
            address: "12 Bank St".to_string(),
            city: "Des Moines".to_string(),
            state: "IA".to_string(),
            zip_code: "50309".to_string(),
            country: "USA".to_string(),
            latitude: None,
            longitude: None,
            images: Vec::new(),
            amenities: vec!["laundry".to_string()],
            year_built: Some(1978),
            parking_spaces: None,
            owner_id: "user-1".to_string(),
            agent_id: None,
            is_featured: false,
            views: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn patch_merges_only_populated_fields() {
        let mut property = base_property();
        let created_at = property.created_at;
        let patch = PropertyPatch {
            price: Some(375_000.0),
            city: Some("Ames".to_string()),
            parking_spaces: Some(2),
            ..PropertyPatch::default()
        };

        let now = Utc::now();
        patch.apply_to(&mut property, now);

        assert_eq!(property.price, 375_000.0);
        assert_eq!(property.city, "Ames");
        assert_eq!(property.parking_spaces, Some(2));
        assert_eq!(property.title, "Sunny walk-up");
        assert_eq!(property.views, 3);
        assert_eq!(property.created_at, created_at);
        assert_eq!(property.updated_at, now);
    }

    #[test]
    fn empty_patch_reports_empty_and_still_touches_updated_at() {
        let mut property = base_property();
        let patch = PropertyPatch::default();
        assert!(patch.is_empty());

        let now = Utc::now();
        patch.apply_to(&mut property, now);
        assert_eq!(property.updated_at, now);
    }

    #[test]
    fn registration_defaults_role_to_buyer() {
        let payload = serde_json::json!({
            "email": "buyer@example.com",
            "password": "hunter2hunter2",
            "full_name": "First Buyer"
        });
        let registration: Registration =
            serde_json::from_value(payload).expect("registration parses");
        assert_eq!(registration.role, UserRole::Buyer);
        assert!(registration.phone.is_none());
    }

    #[test]
    fn enums_serialize_snake_case() {
        assert_eq!(
            serde_json::to_value(PropertyStatus::ForRent).expect("serializes"),
            serde_json::json!("for_rent")
        );
        assert_eq!(
            serde_json::to_value(PropertyType::Villa).expect("serializes"),
            serde_json::json!("villa")
        );
        assert_eq!(
            serde_json::to_value(UserRole::Agent).expect("serializes"),
            serde_json::json!("agent")
        );
    }
}
