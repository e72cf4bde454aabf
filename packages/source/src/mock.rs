//! Deterministic mock competitor source.
//!
//! Datasets are generated per (city, category, count) from a [`StdRng`]
//! seeded with that key, so the same query always yields the same
//! competitors. Generated datasets are kept in the source's
//! [`MockDataCache`].

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use compete_intel_analytics::geo::distance_km;
use compete_intel_competitor_models::{Address, Competitor, Coordinates, OnlinePresence};
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::cache::{DatasetKey, MockDataCache};
use crate::catalog::{Catalog, CategoryDefinition, City};
use crate::{CompetitorSource, SearchQuery, SourceError};

/// Radius around the city centre that generated competitors fall within.
pub const GENERATION_RADIUS_KM: f64 = 5.0;
/// Generated records per requested result, leaving room for filtering.
pub const OVERSAMPLING_FACTOR: usize = 3;
/// Default number of cached datasets.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

const KM_PER_DEGREE: f64 = 111.0;

const STREET_PREFIXES: &[&str] = &["Rua", "Avenida", "Travessa", "Alameda", "Praça"];
const STREET_NAMES: &[&str] = &[
    "das Flores",
    "do Comércio",
    "Central",
    "Principal",
    "Paulista",
    "Getúlio Vargas",
    "Santos Dumont",
    "Dom Pedro",
    "XV de Novembro",
    "Sete de Setembro",
    "da Independência",
    "Rio Branco",
    "Tiradentes",
    "São João",
    "da República",
    "do Mercado",
    "das Palmeiras",
];
const NEIGHBORHOODS: &[&str] = &[
    "Centro",
    "Vila Nova",
    "Jardim das Flores",
    "Bairro Alto",
    "Zona Sul",
];
const LOCATION_WORDS: &[&str] = &["Central", "Norte", "Sul", "Leste", "Oeste"];
const EMPLOYEE_BRACKETS: &[&str] = &["1-5", "1-5", "6-10", "6-10", "11-25", "26-50", "50+"];

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// How established a generated business looks online.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PresenceTier {
    High,
    Medium,
    Low,
}

impl PresenceTier {
    fn for_reputation(rating: f64, review_count: u32) -> Self {
        if rating >= 4.5 && review_count > 200 {
            Self::High
        } else if rating >= 4.0 && review_count > 100 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    fn sample(self, rng: &mut impl Rng) -> OnlinePresence {
        match self {
            Self::High => OnlinePresence {
                has_instagram: true,
                has_facebook: true,
                has_website: true,
                instagram_followers: rng.gen_range(5_000..=50_000),
                facebook_likes: rng.gen_range(3_000..=30_000),
            },
            Self::Medium => OnlinePresence {
                has_instagram: true,
                has_facebook: true,
                has_website: false,
                instagram_followers: rng.gen_range(500..=5_000),
                facebook_likes: rng.gen_range(300..=3_000),
            },
            Self::Low => OnlinePresence {
                has_instagram: false,
                has_facebook: true,
                has_website: false,
                instagram_followers: 0,
                facebook_likes: rng.gen_range(50..=500),
            },
        }
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// Seed for the dataset identified by `key`.
///
/// 64-bit FNV-1a over the city, the category and the little-endian count,
/// with a `0xff` byte after each string. The value depends only on the key.
#[must_use]
pub fn dataset_seed(key: &DatasetKey) -> u64 {
    let count = u64::try_from(key.count).unwrap_or(u64::MAX).to_le_bytes();
    let parts: [&[u8]; 5] = [
        key.city.as_bytes(),
        &[0xff],
        key.category.as_bytes(),
        &[0xff],
        &count,
    ];

    parts
        .into_iter()
        .flatten()
        .fold(FNV_OFFSET_BASIS, |hash, byte| {
            (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
        })
}

fn pick<'a>(rng: &mut impl Rng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Generates `count` competitors around `city`, best rated first.
#[must_use]
pub fn generate_competitors(
    city: &City,
    category: &CategoryDefinition,
    count: usize,
    rng: &mut impl Rng,
) -> Vec<Competitor> {
    let mut competitors: Vec<Competitor> = (1..=count)
        .map(|index| generate_one(city, category, index, rng))
        .collect();
    competitors.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    competitors
}

fn generate_one(
    city: &City,
    category: &CategoryDefinition,
    index: usize,
    rng: &mut impl Rng,
) -> Competitor {
    let max_offset = GENERATION_RADIUS_KM / KM_PER_DEGREE;
    let coordinates = Coordinates::new(
        round6(city.latitude + rng.gen_range(-max_offset..=max_offset)),
        round6(city.longitude + rng.gen_range(-max_offset..=max_offset)),
    );

    let template = category
        .name_templates
        .choose(rng)
        .map_or("{}", String::as_str);
    let location = if rng.gen_ratio(1, 6) {
        city.name.as_str()
    } else {
        pick(rng, LOCATION_WORDS)
    };
    let name = template.replacen("{}", location, 1);

    let rating = (rng.gen_range(3.5..=5.0_f64) * 10.0).round() / 10.0;
    let review_count: u32 = rng.gen_range(10..=500);
    let online_presence = PresenceTier::for_reputation(rating, review_count).sample(rng);

    #[allow(clippy::cast_precision_loss)]
    let base = category.base_monthly_revenue as f64;
    let revenue_factor =
        (rating / 5.0) * (1.0 + f64::from(review_count) / 1_000.0) * rng.gen_range(0.7..=1.5);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let estimated_monthly_revenue = (base * revenue_factor) as u64;

    let mut cnpj_base = [0_u32; 12];
    for digit in &mut cnpj_base[..8] {
        *digit = rng.gen_range(0..10);
    }
    cnpj_base[11] = 1;

    Competitor {
        id: format!("mock_{}_{}_{index}", slug(&category.name), slug(&city.name)),
        name,
        category: category.name.clone(),
        cnae_code: category.cnae_code.clone(),
        cnae_description: category.cnae_description.clone(),
        cnpj: compete_intel_cnpj::from_base(&cnpj_base),
        coordinates,
        address: generate_address(city, rng),
        phone: format!(
            "({}) 9{:04}-{:04}",
            city.area_code,
            rng.gen_range(0..10_000),
            rng.gen_range(0..10_000)
        ),
        rating,
        review_count,
        distance_km: None,
        online_presence,
        is_verified: rng.gen_bool(0.75),
        opening_year: rng.gen_range(2010..=2024),
        employee_count_estimate: pick(rng, EMPLOYEE_BRACKETS).to_string(),
        estimated_monthly_revenue,
        has_delivery: rng.gen_bool(0.5),
        accepts_pix: rng.gen_bool(0.75),
        accepts_cards: rng.gen_bool(0.8),
    }
}

fn generate_address(city: &City, rng: &mut impl Rng) -> Address {
    let prefix = pick(rng, STREET_PREFIXES);
    let street = pick(rng, STREET_NAMES);
    let number: u16 = rng.gen_range(1..=999);
    let cep_area: u32 = rng.gen_range(10_000..=99_999);
    let cep_suffix: u16 = rng.gen_range(100..=999);

    Address {
        street: format!("{prefix} {street}, {number}"),
        neighborhood: pick(rng, NEIGHBORHOODS).to_string(),
        city: city.name.clone(),
        state: city.state.clone(),
        postal_code: format!("{cep_area:05}-{cep_suffix:03}"),
        country: "Brasil".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Competitor source backed by generated data.
#[derive(Debug)]
pub struct MockCompetitorSource {
    catalog: Catalog,
    cache: Mutex<MockDataCache>,
}

impl Default for MockCompetitorSource {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl MockCompetitorSource {
    /// Creates a source over the embedded catalog, caching up to
    /// `cache_capacity` datasets.
    #[must_use]
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            catalog: Catalog::embedded(),
            cache: Mutex::new(MockDataCache::new(cache_capacity)),
        }
    }

    /// The catalog this source generates from.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Number of datasets currently cached.
    #[must_use]
    pub fn cached_datasets(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns the generated dataset for a resolved city and category.
    #[must_use]
    pub fn dataset(
        &self,
        city: &City,
        category: &CategoryDefinition,
        count: usize,
    ) -> Arc<Vec<Competitor>> {
        let key = DatasetKey {
            city: city.name.clone(),
            category: category.name.clone(),
            count,
        };
        let seed = dataset_seed(&key);

        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert_with(key, || {
                log::debug!(
                    "dataset: generating {count} {} in {} (seed {seed})",
                    category.name,
                    city.name
                );
                let mut rng = StdRng::seed_from_u64(seed);
                generate_competitors(city, category, count, &mut rng)
            })
    }

    /// Runs `query` against the generated data.
    ///
    /// Competitors farther than the radius from the reference point, or
    /// failing the neighborhood or CEP filters, are skipped. At most
    /// `max_results` are kept, nearest first.
    #[must_use]
    pub fn find(&self, query: &SearchQuery) -> Vec<Competitor> {
        if query.max_results == 0 {
            return Vec::new();
        }

        let city = self.catalog.resolve_city(&query.city);
        let category = self.catalog.resolve_category(&query.category);
        let dataset = self.dataset(
            city,
            category,
            query.max_results.saturating_mul(OVERSAMPLING_FACTOR),
        );

        let reference = query.coordinates.unwrap_or_else(|| city.center());
        let neighborhood = query
            .neighborhood
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_lowercase);
        let cep_area: Option<String> = query
            .cep
            .as_deref()
            .map(|cep| cep.chars().filter(char::is_ascii_digit).take(5).collect())
            .filter(|area: &String| !area.is_empty());

        let mut results = Vec::with_capacity(query.max_results);
        for competitor in dataset.iter() {
            let distance = distance_km(reference, competitor.coordinates);
            if distance > query.radius_km {
                continue;
            }
            if let Some(wanted) = &neighborhood {
                if !competitor
                    .address
                    .neighborhood
                    .to_lowercase()
                    .contains(wanted.as_str())
                {
                    continue;
                }
            }
            if let Some(area) = &cep_area {
                let digits: String = competitor
                    .address
                    .postal_code
                    .chars()
                    .filter(char::is_ascii_digit)
                    .collect();
                if !digits.starts_with(area.as_str()) {
                    continue;
                }
            }

            let mut competitor = competitor.clone();
            competitor.distance_km = Some((distance * 100.0).round() / 100.0);
            results.push(competitor);

            if results.len() >= query.max_results {
                break;
            }
        }

        results.sort_by(|a, b| {
            a.distance_km
                .unwrap_or(f64::MAX)
                .total_cmp(&b.distance_km.unwrap_or(f64::MAX))
        });

        log::debug!(
            "find: {} {} in {} within {}km",
            results.len(),
            category.name,
            city.name,
            query.radius_km
        );

        results
    }
}

#[async_trait]
impl CompetitorSource for MockCompetitorSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn is_mock(&self) -> bool {
        true
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Competitor>, SourceError> {
        Ok(self.find(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> MockCompetitorSource {
        MockCompetitorSource::new(DEFAULT_CACHE_CAPACITY)
    }

    #[test]
    fn dataset_seed_is_pinned() {
        let key = DatasetKey {
            city: "São Paulo".to_string(),
            category: "Padaria".to_string(),
            count: 10,
        };
        assert_eq!(dataset_seed(&key), 0x0e5e_4c37_d37e_9700);

        let other = DatasetKey {
            count: 11,
            ..key.clone()
        };
        assert_ne!(dataset_seed(&key), dataset_seed(&other));
    }

    #[test]
    fn same_key_generates_same_dataset() {
        let a = source();
        let b = source();
        let city = a.catalog().resolve_city("Curitiba");
        let category = a.catalog().resolve_category("Cafeteria");

        assert_eq!(*a.dataset(city, category, 30), *b.dataset(city, category, 30));
    }

    #[test]
    fn different_counts_are_different_datasets() {
        let source = source();
        let city = source.catalog().resolve_city("Recife");
        let category = source.catalog().resolve_category("Padaria");

        assert_eq!(source.dataset(city, category, 12).len(), 12);
        assert_eq!(source.dataset(city, category, 15).len(), 15);
        assert_eq!(source.cached_datasets(), 2);
    }

    #[test]
    fn repeated_queries_reuse_cached_dataset() {
        let source = source();
        let city = source.catalog().resolve_city("Salvador");
        let category = source.catalog().resolve_category("Academia");

        let first = source.dataset(city, category, 9);
        let second = source.dataset(city, category, 9);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.cached_datasets(), 1);
    }

    #[test]
    fn cache_capacity_bounds_datasets() {
        let source = MockCompetitorSource::new(2);
        for max_results in 1..=5 {
            let _ = source.find(&SearchQuery::new("Padaria", "Manaus").with_max_results(max_results));
        }
        assert_eq!(source.cached_datasets(), 2);
    }

    #[test]
    fn generated_records_are_well_formed() {
        let source = source();
        let catalog = source.catalog();
        let city = catalog.resolve_city("São Paulo");

        for category in catalog.categories() {
            let dataset = source.dataset(city, category, 30);
            assert_eq!(dataset.len(), 30);

            for pair in dataset.windows(2) {
                assert!(pair[0].rating >= pair[1].rating, "not sorted by rating");
            }

            #[allow(clippy::cast_precision_loss)]
            let base = category.base_monthly_revenue as f64;
            for competitor in dataset.iter() {
                assert!((3.5..=5.0).contains(&competitor.rating));
                assert!((10..=500).contains(&competitor.review_count));
                assert!(competitor.coordinates.is_valid());
                assert!(
                    distance_km(city.center(), competitor.coordinates)
                        <= GENERATION_RADIUS_KM * 1.5
                );
                assert!(compete_intel_cnpj::validate(&competitor.cnpj), "{}", competitor.cnpj);
                assert_eq!(competitor.category, category.name);
                assert_eq!(competitor.cnae_code, category.cnae_code);
                assert_eq!(competitor.address.city, city.name);
                assert_eq!(competitor.address.postal_code.len(), 9);
                assert!(competitor.phone.starts_with("(11) 9"));
                assert!(!competitor.name.contains("{}"));
                assert!(competitor.distance_km.is_none());

                #[allow(clippy::cast_precision_loss)]
                let revenue = competitor.estimated_monthly_revenue as f64;
                assert!(revenue >= base * 0.7 * 0.7 - 1.0);
                assert!(revenue <= base * 1.5 * 1.5);
            }
        }
    }

    #[test]
    fn presence_follows_reputation() {
        let source = source();
        let city = source.catalog().resolve_city("Fortaleza");
        let category = source.catalog().resolve_category("Restaurante");

        for competitor in source.dataset(city, category, 60).iter() {
            let tier = PresenceTier::for_reputation(competitor.rating, competitor.review_count);
            let presence = competitor.online_presence;
            match tier {
                PresenceTier::High => {
                    assert!(presence.has_website && presence.has_instagram);
                    assert!(presence.instagram_followers >= 5_000);
                }
                PresenceTier::Medium => {
                    assert!(presence.has_instagram && !presence.has_website);
                    assert!((500..=5_000).contains(&presence.instagram_followers));
                }
                PresenceTier::Low => {
                    assert!(!presence.has_instagram && !presence.has_website);
                    assert_eq!(presence.instagram_followers, 0);
                }
            }
        }
    }

    #[test]
    fn search_respects_radius_and_limit() {
        let source = source();
        let query = SearchQuery::new("Farmácia", "Belo Horizonte")
            .with_radius_km(3.0)
            .with_max_results(8);
        let results = source.find(&query);

        assert!(results.len() <= 8);
        for competitor in &results {
            let distance = competitor.distance_km.unwrap();
            assert!(distance <= 3.0 + 0.005);
        }
        for pair in results.windows(2) {
            assert!(pair[0].distance_km <= pair[1].distance_km);
        }
    }

    #[test]
    fn search_uses_given_reference_point() {
        let source = source();
        let mut query = SearchQuery::new("Padaria", "Recife").with_radius_km(1.0);
        // Far from any generated Recife competitor.
        query.coordinates = Some(Coordinates::new(-23.5505, -46.6333));
        assert!(source.find(&query).is_empty());
    }

    #[test]
    fn neighborhood_filter_is_case_insensitive() {
        let source = source();
        let mut query = SearchQuery::new("Supermercado", "Brasília")
            .with_radius_km(50.0)
            .with_max_results(20);
        query.neighborhood = Some("  centro ".to_string());

        let results = source.find(&query);
        assert!(!results.is_empty());
        assert!(results.iter().all(|c| c.address.neighborhood == "Centro"));
    }

    #[test]
    fn cep_filter_matches_first_five_digits() {
        let source = source();
        let all = source.find(
            &SearchQuery::new("Lanchonete", "Porto Alegre")
                .with_radius_km(50.0)
                .with_max_results(10),
        );
        let target = all[0].address.postal_code.clone();

        let mut query = SearchQuery::new("Lanchonete", "Porto Alegre")
            .with_radius_km(50.0)
            .with_max_results(10);
        query.cep = Some(format!("{}-000", &target[..5]));

        let results = source.find(&query);
        assert!(!results.is_empty());
        assert!(results.iter().all(|c| c.address.postal_code.starts_with(&target[..5])));
    }

    #[test]
    fn unknown_city_falls_back_to_first_catalog_city() {
        let source = source();
        let results = source.find(&SearchQuery::new("Padaria", "Atlantis").with_radius_km(50.0));
        assert!(!results.is_empty());
        assert!(results.iter().all(|c| c.address.city == "São Paulo"));
    }

    #[test]
    fn zero_max_results_returns_nothing() {
        let source = source();
        assert!(source.find(&SearchQuery::new("Padaria", "Recife").with_max_results(0)).is_empty());
        assert_eq!(source.cached_datasets(), 0);
    }
}
