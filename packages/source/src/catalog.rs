//! City and business-category catalog.
//!
//! Both lists are TOML files under `packages/source/catalog/`, baked into
//! the binary at compile time via [`include_str!`]. Adding a city or a
//! category only takes a new entry in the matching file.

use compete_intel_competitor_models::Coordinates;
use serde::Deserialize;

use crate::SourceError;

const CITIES_TOML: &str = include_str!("../catalog/cities.toml");
const CATEGORIES_TOML: &str = include_str!("../catalog/categories.toml");

/// A city the source can search in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct City {
    /// Display name.
    pub name: String,
    /// Two-letter state abbreviation.
    pub state: String,
    /// Latitude of the city centre.
    pub latitude: f64,
    /// Longitude of the city centre.
    pub longitude: f64,
    /// Telephone area code (DDD).
    pub area_code: u8,
}

impl City {
    /// Coordinates of the city centre.
    #[must_use]
    pub const fn center(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// A business category with its registry code and generation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryDefinition {
    /// Display name, matching `BusinessCategory`'s display form.
    pub name: String,
    /// CNAE activity code.
    pub cnae_code: String,
    /// CNAE activity description.
    pub cnae_description: String,
    /// Typical monthly revenue in BRL.
    pub base_monthly_revenue: u64,
    /// Trade-name templates with a single `{}` placeholder.
    pub name_templates: Vec<String>,
}

#[derive(Deserialize)]
struct CitiesFile {
    cities: Vec<City>,
}

#[derive(Deserialize)]
struct CategoriesFile {
    categories: Vec<CategoryDefinition>,
}

/// The loaded catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    cities: Vec<City>,
    categories: Vec<CategoryDefinition>,
}

impl Catalog {
    /// Parses the embedded catalog.
    ///
    /// # Panics
    ///
    /// Panics if an embedded TOML file is malformed or empty. The files are
    /// compiled in, so this is caught by the catalog tests.
    #[must_use]
    pub fn embedded() -> Self {
        let cities: CitiesFile = toml::de::from_str(CITIES_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse cities.toml: {e}"));
        let categories: CategoriesFile = toml::de::from_str(CATEGORIES_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse categories.toml: {e}"));

        assert!(!cities.cities.is_empty(), "cities.toml has no cities");
        assert!(
            !categories.categories.is_empty(),
            "categories.toml has no categories"
        );

        Self {
            cities: cities.cities,
            categories: categories.categories,
        }
    }

    /// All cities, fallback first.
    #[must_use]
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    /// All categories, fallback first.
    #[must_use]
    pub fn categories(&self) -> &[CategoryDefinition] {
        &self.categories
    }

    /// Finds a city by exact name, then by case-insensitive containment in
    /// either direction.
    ///
    /// # Errors
    ///
    /// * [`SourceError::UnknownCity`] if nothing matches
    pub fn find_city(&self, name: &str) -> Result<&City, SourceError> {
        find_by_name(&self.cities, name, |c| &c.name).ok_or_else(|| SourceError::UnknownCity {
            name: name.to_string(),
        })
    }

    /// Finds a category the same way as [`Self::find_city`].
    ///
    /// # Errors
    ///
    /// * [`SourceError::UnknownCategory`] if nothing matches
    pub fn find_category(&self, name: &str) -> Result<&CategoryDefinition, SourceError> {
        find_by_name(&self.categories, name, |c| &c.name).ok_or_else(|| {
            SourceError::UnknownCategory {
                name: name.to_string(),
            }
        })
    }

    /// Like [`Self::find_city`], falling back to the first catalog city.
    #[must_use]
    pub fn resolve_city(&self, name: &str) -> &City {
        self.find_city(name).unwrap_or_else(|e| {
            let fallback = &self.cities[0];
            log::warn!("{e}, using {}", fallback.name);
            fallback
        })
    }

    /// Like [`Self::find_category`], falling back to the first catalog
    /// category.
    #[must_use]
    pub fn resolve_category(&self, name: &str) -> &CategoryDefinition {
        self.find_category(name).unwrap_or_else(|e| {
            let fallback = &self.categories[0];
            log::warn!("{e}, using {}", fallback.name);
            fallback
        })
    }
}

fn find_by_name<'a, T>(items: &'a [T], name: &str, key: impl Fn(&T) -> &String) -> Option<&'a T> {
    let name = name.trim();
    if let Some(exact) = items.iter().find(|item| key(*item) == name) {
        return Some(exact);
    }

    let wanted = name.to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    items.iter().find(|item| {
        let candidate = key(*item).to_lowercase();
        candidate.contains(&wanted) || wanted.contains(&candidate)
    })
}
