use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::credentials::{CredentialError, PasswordVault, TokenSigner};
use super::domain::{
    Favorite, Inquiry, InquiryDraft, InquiryStatus, LoginRequest, MarketplaceStats, Property,
    PropertyDraft, PropertyPatch, PropertyStatus, Registration, TokenGrant, User, UserRole,
};
use super::policy::can_mutate;
use super::query::SearchCriteria;
use super::repository::{
    EngagementRepository, PropertyRepository, RepositoryError, StoredUser, UserRepository,
};

/// Service composing the credential pieces with the three stores. All
/// authorization decisions happen here so the HTTP layer stays a thin
/// translation of errors to status codes.
pub struct MarketplaceService<U, P, E> {
    users: Arc<U>,
    properties: Arc<P>,
    engagement: Arc<E>,
    vault: PasswordVault,
    signer: TokenSigner,
}

/// Error raised by marketplace operations, one variant per client-visible
/// outcome.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("invalid authentication credentials")]
    InvalidCredential,
    #[error("record not found")]
    NotFound,
    #[error("not authorized to modify this property")]
    Forbidden,
    #[error("property already in favorites")]
    Conflict,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("credential backend failure: {0}")]
    Internal(String),
}

impl From<CredentialError> for MarketplaceError {
    fn from(value: CredentialError) -> Self {
        match value {
            CredentialError::InvalidCredential => Self::InvalidCredential,
            CredentialError::Hashing(message) => Self::Internal(message),
        }
    }
}

impl<U, P, E> MarketplaceService<U, P, E>
where
    U: UserRepository + 'static,
    P: PropertyRepository + 'static,
    E: EngagementRepository + 'static,
{
    pub fn new(users: Arc<U>, properties: Arc<P>, engagement: Arc<E>, signer: TokenSigner) -> Self {
        Self {
            users,
            properties,
            engagement,
            vault: PasswordVault,
            signer,
        }
    }

    // ---- accounts ----

    pub fn register(&self, registration: Registration) -> Result<TokenGrant, MarketplaceError> {
        validate_registration(&registration)?;

        // Email matching is case-sensitive as stored; `Alice@x` and
        // `alice@x` are distinct accounts.
        if self.users.find_by_email(&registration.email)?.is_some() {
            return Err(MarketplaceError::DuplicateEmail);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: registration.email,
            full_name: registration.full_name,
            phone: registration.phone,
            role: registration.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let password_hash = self.vault.hash(&registration.password)?;

        let stored = self
            .users
            .insert(StoredUser { user, password_hash })
            .map_err(|err| match err {
                RepositoryError::Conflict => MarketplaceError::DuplicateEmail,
                other => MarketplaceError::Repository(other),
            })?;

        info!(user_id = %stored.user.id, role = stored.user.role.label(), "account registered");
        self.grant(stored.user)
    }

    /// Missing account and wrong password produce the identical error so
    /// login cannot be used to enumerate addresses.
    pub fn login(&self, request: LoginRequest) -> Result<TokenGrant, MarketplaceError> {
        let stored = self
            .users
            .find_by_email(&request.email)?
            .ok_or(MarketplaceError::InvalidCredential)?;
        if !self.vault.verify(&request.password, &stored.password_hash) {
            return Err(MarketplaceError::InvalidCredential);
        }
        self.grant(stored.user)
    }

    /// Resolve a bearer token to its account. Unknown subjects collapse
    /// into the same invalid-credential outcome as a bad signature.
    pub fn current_user(&self, token: &str) -> Result<User, MarketplaceError> {
        let subject = self.signer.verify(token)?;
        self.users
            .find_by_id(&subject)?
            .ok_or(MarketplaceError::InvalidCredential)
    }

    fn grant(&self, user: User) -> Result<TokenGrant, MarketplaceError> {
        let access_token = self.signer.issue(&user.id)?;
        Ok(TokenGrant {
            access_token,
            token_type: "bearer",
            user,
        })
    }

    // ---- listings ----

    pub fn create_property(
        &self,
        draft: PropertyDraft,
        owner: &User,
    ) -> Result<Property, MarketplaceError> {
        validate_draft(&draft)?;

        let now = Utc::now();
        let property = Property {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            description: draft.description,
            property_type: draft.property_type,
            status: draft.status,
            price: draft.price,
            bedrooms: draft.bedrooms,
            bathrooms: draft.bathrooms,
            area_sqft: draft.area_sqft,
            address: draft.address,
            city: draft.city,
            state: draft.state,
            zip_code: draft.zip_code,
            country: draft.country,
            latitude: draft.latitude,
            longitude: draft.longitude,
            images: draft.images,
            amenities: draft.amenities,
            year_built: draft.year_built,
            parking_spaces: draft.parking_spaces,
            owner_id: owner.id.clone(),
            agent_id: draft.agent_id,
            is_featured: draft.is_featured,
            views: 0,
            created_at: now,
            updated_at: now,
        };

        let stored = self.properties.insert(property)?;
        info!(property_id = %stored.id, owner_id = %stored.owner_id, "listing created");
        Ok(stored)
    }

    /// Single-listing fetch. Every successful call bumps the persisted
    /// view counter atomically; the returned record reflects the bump.
    pub fn get_property(&self, id: &str) -> Result<Property, MarketplaceError> {
        self.properties
            .fetch_and_record_view(id)
            .map_err(not_found_or_repo)
    }

    pub fn search_properties(
        &self,
        criteria: SearchCriteria,
    ) -> Result<Vec<Property>, MarketplaceError> {
        let (filter, page) = criteria.into_filter();
        Ok(self.properties.query(&filter, page)?)
    }

    pub fn update_property(
        &self,
        id: &str,
        patch: PropertyPatch,
        requester: &User,
    ) -> Result<Property, MarketplaceError> {
        // Existence is checked before authorization, so a 404 is possible
        // even for callers who would be refused.
        let mut property = self
            .properties
            .fetch(id)?
            .ok_or(MarketplaceError::NotFound)?;
        if !can_mutate(requester, &property) {
            return Err(MarketplaceError::Forbidden);
        }

        // Nothing to merge, so skip the write and leave updated_at alone.
        if patch.is_empty() {
            return Ok(property);
        }

        patch.apply_to(&mut property, Utc::now());
        Ok(self.properties.update(property)?)
    }

    pub fn delete_property(&self, id: &str, requester: &User) -> Result<(), MarketplaceError> {
        let property = self
            .properties
            .fetch(id)?
            .ok_or(MarketplaceError::NotFound)?;
        if !can_mutate(requester, &property) {
            return Err(MarketplaceError::Forbidden);
        }

        // No cascade: favorites and inquiries keep their dangling
        // property ids and are filtered or surfaced downstream.
        self.properties.delete(id).map_err(not_found_or_repo)?;
        info!(property_id = %id, requester = %requester.id, "listing deleted");
        Ok(())
    }

    // ---- engagement ----

    pub fn add_favorite(
        &self,
        user: &User,
        property_id: &str,
    ) -> Result<Favorite, MarketplaceError> {
        if self.properties.fetch(property_id)?.is_none() {
            return Err(MarketplaceError::NotFound);
        }

        let favorite = Favorite {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            property_id: property_id.to_string(),
            created_at: Utc::now(),
        };
        self.engagement
            .insert_favorite(favorite)
            .map_err(|err| match err {
                RepositoryError::Conflict => MarketplaceError::Conflict,
                other => MarketplaceError::Repository(other),
            })
    }

    pub fn remove_favorite(&self, user: &User, property_id: &str) -> Result<(), MarketplaceError> {
        self.engagement
            .delete_favorite(&user.id, property_id)
            .map_err(not_found_or_repo)
    }

    /// Resolve saved listings to their property records. Listings deleted
    /// after favoriting are silently omitted.
    pub fn list_favorites(&self, user: &User) -> Result<Vec<Property>, MarketplaceError> {
        let favorites = self.engagement.favorites_for(&user.id)?;
        let mut resolved = Vec::with_capacity(favorites.len());
        for favorite in favorites {
            if let Some(property) = self.properties.fetch(&favorite.property_id)? {
                resolved.push(property);
            }
        }
        Ok(resolved)
    }

    /// Inquiries are filed against whatever property id the caller names;
    /// there is deliberately no existence check on the listing.
    pub fn create_inquiry(
        &self,
        draft: InquiryDraft,
        requester: &User,
    ) -> Result<Inquiry, MarketplaceError> {
        if draft.message.trim().is_empty() {
            return Err(MarketplaceError::Validation(
                "inquiry message must not be empty".to_string(),
            ));
        }

        let inquiry = Inquiry {
            id: Uuid::new_v4().to_string(),
            property_id: draft.property_id,
            user_id: requester.id.clone(),
            message: draft.message,
            contact_email: draft.contact_email,
            contact_phone: draft.contact_phone,
            status: InquiryStatus::New,
            created_at: Utc::now(),
        };
        Ok(self.engagement.insert_inquiry(inquiry)?)
    }

    /// Buyers see their own inquiries. Sellers and agents see inquiries
    /// against listings they own — agents get no marketplace-wide view
    /// here, unlike the mutation override.
    pub fn list_inquiries(&self, user: &User) -> Result<Vec<Inquiry>, MarketplaceError> {
        if user.role == UserRole::Buyer {
            return Ok(self.engagement.inquiries_by_user(&user.id)?);
        }

        let owned = self.properties.owned_by(&user.id)?;
        let property_ids: Vec<String> = owned.into_iter().map(|property| property.id).collect();
        Ok(self.engagement.inquiries_for_properties(&property_ids)?)
    }

    // ---- stats ----

    pub fn stats(&self) -> Result<MarketplaceStats, MarketplaceError> {
        Ok(MarketplaceStats {
            total_properties: self.properties.count(None)?,
            properties_for_sale: self.properties.count(Some(PropertyStatus::ForSale))?,
            properties_for_rent: self.properties.count(Some(PropertyStatus::ForRent))?,
            total_users: self.users.count()?,
        })
    }
}

fn not_found_or_repo(err: RepositoryError) -> MarketplaceError {
    match err {
        RepositoryError::NotFound => MarketplaceError::NotFound,
        other => MarketplaceError::Repository(other),
    }
}

fn validate_registration(registration: &Registration) -> Result<(), MarketplaceError> {
    if !registration.email.contains('@') {
        return Err(MarketplaceError::Validation(
            "email must contain '@'".to_string(),
        ));
    }
    if registration.password.is_empty() {
        return Err(MarketplaceError::Validation(
            "password must not be empty".to_string(),
        ));
    }
    if registration.full_name.trim().is_empty() {
        return Err(MarketplaceError::Validation(
            "full name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_draft(draft: &PropertyDraft) -> Result<(), MarketplaceError> {
    if draft.title.trim().is_empty() {
        return Err(MarketplaceError::Validation(
            "title must not be empty".to_string(),
        ));
    }
    if draft.price < 0.0 {
        return Err(MarketplaceError::Validation(
            "price must be non-negative".to_string(),
        ));
    }
    if draft.area_sqft <= 0.0 {
        return Err(MarketplaceError::Validation(
            "area must be positive".to_string(),
        ));
    }
    Ok(())
}
