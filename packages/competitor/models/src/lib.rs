#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Competitor record types.
//!
//! A [`Competitor`] is one business discovered near the caller's location.
//! Records are produced by a competitor source (mock or live) and consumed
//! read-only by the analytics engine, the email renderer and the REST API.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in `[-90, 90]`.
    pub latitude: f64,
    /// Longitude in `[-180, 180]`.
    pub longitude: f64,
}

impl Coordinates {
    /// Creates a new coordinate pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` if both components are finite and within range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Postal address of a business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street name and number.
    pub street: String,
    /// Neighborhood (bairro).
    pub neighborhood: String,
    /// City name.
    pub city: String,
    /// Two-letter state abbreviation.
    pub state: String,
    /// CEP, formatted `XXXXX-XXX`.
    pub postal_code: String,
    /// Country name.
    pub country: String,
}

/// Social media and web presence of a business.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlinePresence {
    /// Whether the business has an Instagram profile.
    pub has_instagram: bool,
    /// Whether the business has a Facebook page.
    pub has_facebook: bool,
    /// Whether the business has its own website.
    pub has_website: bool,
    /// Instagram follower count.
    #[serde(default)]
    pub instagram_followers: u32,
    /// Facebook page likes.
    #[serde(default)]
    pub facebook_likes: u32,
}

/// One competing business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    /// Stable source-specific identifier.
    pub id: String,
    /// Trade name.
    pub name: String,
    /// Business category display name.
    pub category: String,
    /// CNAE activity code (e.g. `"4721-1/02"`).
    pub cnae_code: String,
    /// CNAE activity description.
    pub cnae_description: String,
    /// Formatted CNPJ.
    pub cnpj: String,
    /// Location.
    pub coordinates: Coordinates,
    /// Postal address.
    pub address: Address,
    /// Contact phone.
    pub phone: String,
    /// Average review rating in `[0, 5]`.
    pub rating: f64,
    /// Number of reviews.
    pub review_count: u32,
    /// Distance from the search reference point, when computed.
    pub distance_km: Option<f64>,
    /// Online presence signals.
    pub online_presence: OnlinePresence,
    /// Whether the listing has been verified.
    pub is_verified: bool,
    /// Year the business opened.
    pub opening_year: i32,
    /// Employee count bracket (e.g. `"6-10"`).
    pub employee_count_estimate: String,
    /// Estimated monthly revenue in BRL.
    pub estimated_monthly_revenue: u64,
    /// Whether the business offers delivery.
    pub has_delivery: bool,
    /// Whether the business accepts PIX instant payments.
    pub accepts_pix: bool,
    /// Whether the business accepts card payments.
    pub accepts_cards: bool,
}

/// Supported business categories.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum BusinessCategory {
    /// Bakery.
    #[serde(rename = "Padaria")]
    #[strum(serialize = "Padaria")]
    Padaria,
    /// Restaurant.
    #[serde(rename = "Restaurante")]
    #[strum(serialize = "Restaurante")]
    Restaurante,
    /// Pharmacy.
    #[serde(rename = "Farmácia")]
    #[strum(serialize = "Farmácia")]
    Farmacia,
    /// Supermarket.
    #[serde(rename = "Supermercado")]
    #[strum(serialize = "Supermercado")]
    Supermercado,
    /// Coffee shop.
    #[serde(rename = "Cafeteria")]
    #[strum(serialize = "Cafeteria")]
    Cafeteria,
    /// Gym.
    #[serde(rename = "Academia")]
    #[strum(serialize = "Academia")]
    Academia,
    /// Pet shop.
    #[serde(rename = "Pet Shop")]
    #[strum(serialize = "Pet Shop")]
    PetShop,
    /// Snack bar.
    #[serde(rename = "Lanchonete")]
    #[strum(serialize = "Lanchonete")]
    Lanchonete,
}

impl BusinessCategory {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Padaria,
            Self::Restaurante,
            Self::Farmacia,
            Self::Supermercado,
            Self::Cafeteria,
            Self::Academia,
            Self::PetShop,
            Self::Lanchonete,
        ]
    }
}
