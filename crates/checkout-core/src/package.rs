//! # Package Catalog
//!
//! Package catalog types for the checkout gateway.
//! Catalogs are loaded from TOML (`config/packages.toml`) and are immutable
//! once the process has started.

use crate::error::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Minor currency units per whole unit (öre per krona, cents per dollar)
pub const MINOR_UNITS_PER_UNIT: i64 = 100;

/// Catalog shipped with the gateway, used when no catalog file is configured
const BUILTIN_CATALOG: &str = include_str!("../catalog/drivex.toml");

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    SEK,
    NOK,
    DKK,
    EUR,
    USD,
    GBP,
}

impl Currency {
    /// Returns the ISO 4217 currency code in the lowercase form providers expect
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::SEK => "sek",
            Currency::NOK => "nok",
            Currency::DKK => "dkk",
            Currency::EUR => "eur",
            Currency::USD => "usd",
            Currency::GBP => "gbp",
        }
    }

    /// Parse a provider currency code, case-insensitively
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "sek" => Some(Currency::SEK),
            "nok" => Some(Currency::NOK),
            "dkk" => Some(Currency::DKK),
            "eur" => Some(Currency::EUR),
            "usd" => Some(Currency::USD),
            "gbp" => Some(Currency::GBP),
            _ => None,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::SEK
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// A purchasable package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Catalog key (e.g., "daily")
    pub id: String,

    /// Display name
    pub name: String,

    /// Price in whole currency units
    pub price: i64,

    /// Short description
    pub description: String,

    /// Feature bullet points, in display order
    #[serde(default)]
    pub features: Vec<String>,

    /// Optional duration label (e.g., "24 timmar")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl Package {
    /// Price converted to the smallest currency unit, or `None` if it does not fit
    pub fn checked_unit_amount(&self) -> Option<i64> {
        self.price.checked_mul(MINOR_UNITS_PER_UNIT)
    }

    /// Price converted to the smallest currency unit.
    ///
    /// Catalog packages are validated to fit; anything else saturates.
    pub fn unit_amount(&self) -> i64 {
        self.price.saturating_mul(MINOR_UNITS_PER_UNIT)
    }
}

/// On-disk catalog layout
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    currency: Currency,
    packages: Vec<Package>,
}

/// Immutable package catalog with an id index
#[derive(Debug, Clone)]
pub struct Catalog {
    brand: Option<String>,
    currency: Currency,
    packages: Vec<Package>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting empty tables, blank ids, duplicate ids and
    /// prices that cannot be expressed in minor units
    pub fn new(
        brand: Option<String>,
        currency: Currency,
        packages: Vec<Package>,
    ) -> GatewayResult<Self> {
        if packages.is_empty() {
            return Err(GatewayError::Configuration(
                "catalog has no packages".to_string(),
            ));
        }

        let mut index = HashMap::with_capacity(packages.len());
        for (pos, package) in packages.iter().enumerate() {
            if package.id.trim().is_empty() {
                return Err(GatewayError::Configuration(format!(
                    "package #{} has an empty id",
                    pos + 1
                )));
            }
            if package.price <= 0 {
                return Err(GatewayError::Configuration(format!(
                    "package '{}' must have a positive price",
                    package.id
                )));
            }
            if package.checked_unit_amount().is_none() {
                return Err(GatewayError::Configuration(format!(
                    "package '{}' price {} overflows in minor units",
                    package.id, package.price
                )));
            }
            if index.insert(package.id.clone(), pos).is_some() {
                return Err(GatewayError::Configuration(format!(
                    "duplicate package id '{}'",
                    package.id
                )));
            }
        }

        Ok(Self {
            brand: brand.filter(|b| !b.trim().is_empty()),
            currency,
            packages,
            index,
        })
    }

    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> GatewayResult<Self> {
        let file: CatalogFile = toml::from_str(toml_str)
            .map_err(|e| GatewayError::Configuration(format!("invalid catalog: {}", e)))?;
        Self::new(file.brand, file.currency, file.packages)
    }

    /// The DriveX rental packages bundled with the gateway
    pub fn builtin() -> GatewayResult<Self> {
        Self::from_toml(BUILTIN_CATALOG)
    }

    /// Find a package by id
    pub fn get(&self, id: &str) -> Option<&Package> {
        self.index.get(id).map(|&pos| &self.packages[pos])
    }

    /// All packages, in catalog order
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Catalog currency, shared by every package
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Optional brand prefix for line item names
    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    /// Name shown on the provider's checkout page
    pub fn display_name(&self, package: &Package) -> String {
        match &self.brand {
            Some(brand) => format!("{} {}", brand, package.name),
            None => package.name.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(id: &str, price: i64) -> Package {
        Package {
            id: id.to_string(),
            name: id.to_uppercase(),
            price,
            description: String::new(),
            features: Vec::new(),
            duration: None,
        }
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin().unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.currency(), Currency::SEK);
        assert_eq!(catalog.brand(), Some("DriveX"));

        let daily = catalog.get("daily").unwrap();
        assert_eq!(daily.name, "Dagspaket");
        assert_eq!(daily.price, 1990);
        assert_eq!(daily.unit_amount(), 199000);
        assert_eq!(daily.duration.as_deref(), Some("24 timmar"));
        assert_eq!(daily.features.len(), 5);

        assert_eq!(catalog.get("weekend").unwrap().unit_amount(), 499000);
        assert_eq!(catalog.get("weekly").unwrap().unit_amount(), 999000);
        assert!(catalog.get("doesnotexist").is_none());
    }

    #[test]
    fn test_catalog_keeps_order() {
        let catalog = Catalog::builtin().unwrap();
        let ids: Vec<_> = catalog
            .packages()
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, ["daily", "weekend", "weekly"]);
    }

    #[test]
    fn test_lookup_is_exact_match() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.get("Daily").is_none());
        assert!(catalog.get(" daily").is_none());
        assert!(catalog.get("").is_none());
    }

    #[test]
    fn test_display_name_uses_brand() {
        let catalog = Catalog::builtin().unwrap();
        let daily = catalog.get("daily").unwrap();
        assert_eq!(catalog.display_name(daily), "DriveX Dagspaket");

        let plain = Catalog::new(None, Currency::EUR, vec![package("basic", 10)]).unwrap();
        assert_eq!(plain.display_name(plain.get("basic").unwrap()), "BASIC");
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = Catalog::new(None, Currency::SEK, vec![package("a", 1), package("a", 2)])
            .unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
    }

    #[test]
    fn test_rejects_empty_and_unpriced() {
        assert!(Catalog::new(None, Currency::SEK, Vec::new()).is_err());
        assert!(Catalog::new(None, Currency::SEK, vec![package("free", 0)]).is_err());
        assert!(Catalog::new(None, Currency::SEK, vec![package(" ", 5)]).is_err());
    }

    #[test]
    fn test_rejects_price_overflowing_minor_units() {
        let err = Catalog::from_toml(
            r#"
            [[packages]]
            id = "huge"
            name = "Huge"
            price = 100000000000000000
            description = "Too expensive"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
        assert!(err.to_string().contains("huge"));

        let largest = i64::MAX / MINOR_UNITS_PER_UNIT;
        let catalog = Catalog::new(None, Currency::SEK, vec![package("max", largest)]).unwrap();
        assert_eq!(
            catalog.get("max").unwrap().unit_amount(),
            largest * MINOR_UNITS_PER_UNIT
        );
    }

    #[test]
    fn test_unit_amount_saturates_outside_catalog() {
        let loose = package("loose", i64::MAX / 2);
        assert_eq!(loose.checked_unit_amount(), None);
        assert_eq!(loose.unit_amount(), i64::MAX);
    }

    #[test]
    fn test_from_toml_defaults_currency() {
        let catalog = Catalog::from_toml(
            r#"
            [[packages]]
            id = "basic"
            name = "Basic"
            price = 100
            description = "Entry tier"
            "#,
        )
        .unwrap();

        assert_eq!(catalog.currency(), Currency::SEK);
        assert_eq!(catalog.brand(), None);
        assert!(catalog.get("basic").unwrap().features.is_empty());
    }

    #[test]
    fn test_currency_codes() {
        assert_eq!(Currency::from_code("SEK"), Some(Currency::SEK));
        assert_eq!(Currency::from_code("xyz"), None);
        assert_eq!(Currency::SEK.to_string(), "SEK");
    }
}
