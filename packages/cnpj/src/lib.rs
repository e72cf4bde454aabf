#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CNPJ (Brazilian company registry number) handling.
//!
//! A CNPJ has 14 digits: an 8-digit root, a 4-digit branch number and two
//! mod-11 check digits. Input may carry any formatting; every function
//! here looks only at the digits.
//!
//! Company lookup is mocked: any valid number resolves to a fixed sample
//! record.

use serde::{Deserialize, Serialize};

/// Number of digits in a CNPJ.
pub const CNPJ_LEN: usize = 14;

const FIRST_CHECK_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const SECOND_CHECK_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Description returned for CNAE codes missing from the table.
pub const UNCLASSIFIED_ACTIVITY: &str = "Atividade não classificada";

const CNAE_DESCRIPTIONS: &[(&str, &str)] = &[
    (
        "4721-1/02",
        "Padaria e confeitaria com predominância de produção própria",
    ),
    ("5611-2/01", "Restaurantes e similares"),
    (
        "5611-2/03",
        "Lanchonetes, casas de chá, de sucos e similares",
    ),
    (
        "5611-2/04",
        "Bares e outros estabelecimentos especializados em servir bebidas",
    ),
    (
        "4771-7/01",
        "Comércio varejista de produtos farmacêuticos sem manipulação de fórmulas",
    ),
    ("4711-3/02", "Supermercado"),
    (
        "4712-1/00",
        "Comércio varejista de mercadorias em geral, com predominância de produtos \
         alimentícios - minimercados, mercearias e armazéns",
    ),
    ("9313-1/00", "Atividades de condicionamento físico"),
    (
        "4789-0/05",
        "Comércio varejista de animais vivos e de artigos e alimentos para animais de estimação",
    ),
    ("4721-1/03", "Comércio varejista de laticínios e frios"),
    ("4722-9/01", "Comércio varejista de carnes - açougues"),
];

/// Errors from CNPJ operations.
#[derive(Debug, thiserror::Error)]
pub enum CnpjError {
    /// The input does not contain exactly 14 digits.
    #[error("CNPJ must have 14 digits, found {digits}")]
    InvalidLength {
        /// Number of digits found.
        digits: usize,
    },
}

/// Primary economic activity of a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainActivity {
    /// CNAE code.
    pub code: String,
    /// CNAE description.
    pub description: String,
}

/// Registry record of a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Formatted CNPJ.
    pub cnpj: String,
    /// Legal name.
    pub name: String,
    /// Trade name.
    pub trade_name: String,
    /// Registration status (e.g. `"ATIVA"`).
    pub status: String,
    /// Opening date, `DD/MM/YYYY`.
    pub opening_date: String,
    /// Legal nature.
    pub legal_nature: String,
    /// Primary activity.
    pub main_activity: MainActivity,
}

/// Extracts the digits of `cnpj` as numbers, ignoring everything else.
fn digits(cnpj: &str) -> Vec<u32> {
    cnpj.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let total: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let remainder = total % 11;
    if remainder < 2 { 0 } else { 11 - remainder }
}

/// Computes both check digits for a 12-digit root + branch prefix.
#[must_use]
pub fn check_digits(base: &[u32; 12]) -> [u32; 2] {
    let first = check_digit(base, &FIRST_CHECK_WEIGHTS);
    let mut with_first = [0_u32; 13];
    with_first[..12].copy_from_slice(base);
    with_first[12] = first;
    let second = check_digit(&with_first, &SECOND_CHECK_WEIGHTS);
    [first, second]
}

/// Returns `true` if `cnpj` has 14 digits, not all equal, with valid
/// check digits.
#[must_use]
pub fn validate(cnpj: &str) -> bool {
    let digits = digits(cnpj);
    if digits.len() != CNPJ_LEN {
        return false;
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    let mut base = [0_u32; 12];
    base.copy_from_slice(&digits[..12]);
    check_digits(&base) == [digits[12], digits[13]]
}

/// Formats the digits of `cnpj` as `XX.XXX.XXX/XXXX-XX`.
///
/// Check digits are not verified.
///
/// # Errors
///
/// * If the input does not contain exactly 14 digits
pub fn format(cnpj: &str) -> Result<String, CnpjError> {
    let clean: String = cnpj.chars().filter(char::is_ascii_digit).collect();
    if clean.len() != CNPJ_LEN {
        return Err(CnpjError::InvalidLength {
            digits: clean.len(),
        });
    }

    Ok(format!(
        "{}.{}.{}/{}-{}",
        &clean[..2],
        &clean[2..5],
        &clean[5..8],
        &clean[8..12],
        &clean[12..]
    ))
}

/// Builds a formatted, valid CNPJ from a 12-digit prefix.
#[must_use]
pub fn from_base(base: &[u32; 12]) -> String {
    let [first, second] = check_digits(base);
    let raw: String = base
        .iter()
        .chain([first, second].iter())
        .filter_map(|d| char::from_digit(*d, 10))
        .collect();
    format(&raw).unwrap_or(raw)
}

/// Looks up the registry record for `cnpj`.
///
/// Returns `None` for invalid numbers. Valid numbers resolve to a sample
/// record until a live registry client exists.
#[must_use]
pub fn lookup(cnpj: &str) -> Option<CompanyRecord> {
    if !validate(cnpj) {
        log::debug!("lookup: rejected invalid CNPJ");
        return None;
    }

    let cnpj = format(cnpj).ok()?;
    let code = "4721-1/02";

    Some(CompanyRecord {
        cnpj,
        name: "Empresa Exemplo Ltda".to_string(),
        trade_name: "Exemplo".to_string(),
        status: "ATIVA".to_string(),
        opening_date: "01/01/2020".to_string(),
        legal_nature: "Sociedade Empresária Limitada".to_string(),
        main_activity: MainActivity {
            code: code.to_string(),
            description: cnae_description(code).to_string(),
        },
    })
}

/// Returns the description of a CNAE code, or [`UNCLASSIFIED_ACTIVITY`].
#[must_use]
pub fn cnae_description(code: &str) -> &'static str {
    CNAE_DESCRIPTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map_or(UNCLASSIFIED_ACTIVITY, |(_, description)| *description)
}
