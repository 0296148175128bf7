//! Translation from loosely-specified search criteria to the structured
//! filter value the property store evaluates.
//!
//! `SearchCriteria` is the wire shape; `PropertyFilter` is the normalized
//! store query. The translation is a pure function so filter composition
//! can be tested without any repository behind it.

use serde::Deserialize;

use super::domain::{Property, PropertyStatus, PropertyType};

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Search payload accepted by `POST /api/properties/search`. Every
/// predicate is independently optional; absent criteria match everything.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub property_type: Option<PropertyType>,
    #[serde(default)]
    pub status: Option<PropertyStatus>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub min_bedrooms: Option<u32>,
    #[serde(default)]
    pub max_bedrooms: Option<u32>,
    #[serde(default)]
    pub min_bathrooms: Option<u32>,
    #[serde(default)]
    pub max_bathrooms: Option<u32>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub min_area: Option<f64>,
    #[serde(default)]
    pub max_area: Option<f64>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    DEFAULT_PAGE_SIZE
}

// Serde field defaults only apply while deserializing, so the programmatic
// defaults are spelled out to hand back the same first-page window.
impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            query: None,
            property_type: None,
            status: None,
            min_price: None,
            max_price: None,
            min_bedrooms: None,
            max_bedrooms: None,
            min_bathrooms: None,
            max_bathrooms: None,
            city: None,
            state: None,
            min_area: None,
            max_area: None,
            is_featured: None,
            page: default_page(),
            limit: default_limit(),
        }
    }
}

/// Query-string filters for `GET /api/properties`, a subset of the full
/// search surface.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowseQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub property_type: Option<PropertyType>,
    #[serde(default)]
    pub status: Option<PropertyStatus>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub is_featured: Option<bool>,
}

impl Default for BrowseQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            property_type: None,
            status: None,
            min_price: None,
            max_price: None,
            city: None,
            is_featured: None,
        }
    }
}

impl BrowseQuery {
    pub fn into_criteria(self) -> SearchCriteria {
        SearchCriteria {
            property_type: self.property_type,
            status: self.status,
            min_price: self.min_price,
            max_price: self.max_price,
            city: self.city,
            is_featured: self.is_featured,
            page: self.page,
            limit: self.limit,
            ..SearchCriteria::default()
        }
    }
}

/// Offset window derived from 1-based page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Page {
    pub fn new(page: usize, limit: usize) -> Self {
        // Page and limit arrive straight from the request body, so the
        // offset saturates instead of overflowing on absurd values.
        let page = page.max(1);
        Self {
            offset: (page - 1).saturating_mul(limit),
            limit,
        }
    }
}

/// Normalized store query. Text needles are lowercased once at build time
/// so evaluation only lowercases the candidate side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFilter {
    pub text: Option<String>,
    pub property_type: Option<PropertyType>,
    pub status: Option<PropertyStatus>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_bedrooms: Option<u32>,
    pub max_bedrooms: Option<u32>,
    pub min_bathrooms: Option<u32>,
    pub max_bathrooms: Option<u32>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
    pub is_featured: Option<bool>,
}

impl SearchCriteria {
    /// Pure translation into the store query plus the pagination window.
    pub fn into_filter(self) -> (PropertyFilter, Page) {
        let page = Page::new(self.page, self.limit);
        let filter = PropertyFilter {
            text: normalize_needle(self.query),
            property_type: self.property_type,
            status: self.status,
            min_price: self.min_price,
            max_price: self.max_price,
            min_bedrooms: self.min_bedrooms,
            max_bedrooms: self.max_bedrooms,
            min_bathrooms: self.min_bathrooms,
            max_bathrooms: self.max_bathrooms,
            city: normalize_needle(self.city),
            state: normalize_needle(self.state),
            min_area: self.min_area,
            max_area: self.max_area,
            is_featured: self.is_featured,
        };
        (filter, page)
    }
}

fn normalize_needle(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
}

impl PropertyFilter {
    /// Conjunction of every present predicate. The free-text group is a
    /// disjunction over title, description, address, and city.
    pub fn matches(&self, property: &Property) -> bool {
        if let Some(needle) = &self.text {
            let hit = [
                &property.title,
                &property.description,
                &property.address,
                &property.city,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(needle.as_str()));
            if !hit {
                return false;
            }
        }

        if let Some(property_type) = self.property_type {
            if property.property_type != property_type {
                return false;
            }
        }
        if let Some(status) = self.status {
            if property.status != status {
                return false;
            }
        }
        if let Some(is_featured) = self.is_featured {
            if property.is_featured != is_featured {
                return false;
            }
        }

        if !within_f64(property.price, self.min_price, self.max_price) {
            return false;
        }
        if !within_u32(property.bedrooms, self.min_bedrooms, self.max_bedrooms) {
            return false;
        }
        if !within_u32(property.bathrooms, self.min_bathrooms, self.max_bathrooms) {
            return false;
        }
        if !within_f64(property.area_sqft, self.min_area, self.max_area) {
            return false;
        }

        if let Some(city) = &self.city {
            if !property.city.to_lowercase().contains(city.as_str()) {
                return false;
            }
        }
        if let Some(state) = &self.state {
            if !property.state.to_lowercase().contains(state.as_str()) {
                return false;
            }
        }

        true
    }

    /// True when no predicate is set, so the store can skip evaluation.
    pub fn is_match_all(&self) -> bool {
        *self == PropertyFilter::default()
    }
}

fn within_f64(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.map_or(true, |bound| value >= bound) && max.map_or(true, |bound| value <= bound)
}

fn within_u32(value: u32, min: Option<u32>, max: Option<u32>) -> bool {
    min.map_or(true, |bound| value >= bound) && max.map_or(true, |bound| value <= bound)
}
