//! Offline zone-table shipping estimates.

use serde::{Deserialize, Serialize};
use tracing::debug;

use kelp_kit_core::catalog::Catalog;
use kelp_kit_core::models::ServiceLevel;
use kelp_kit_core::pricing::{
    RateQuote, ShippingError, ShippingRateProvider, ShippingRequest, ShippingResult,
};

/// Nearest zone (same or adjacent 3-digit prefix region).
pub const MIN_ZONE: u32 = 2;
/// Farthest contiguous zone.
pub const MAX_ZONE: u32 = 8;

/// Rate table parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneTable {
    /// Per-package base rate, ground
    pub standard_base: f64,
    /// Per-package base rate, cooler + ice
    pub compliance_base: f64,
    /// Rate per pound at zone 2
    pub per_pound: f64,
    /// Multiplier added per zone beyond zone 2
    pub zone_step: f64,
    /// Prefix distance covered by one zone
    pub prefix_span: u32,
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self {
            standard_base: 8.00,
            compliance_base: 50.00,
            per_pound: 0.75,
            zone_step: 0.15,
            prefix_span: 100,
        }
    }
}

/// Estimates shipping from a local zone table.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneTableEstimator {
    table: ZoneTable,
}

impl ZoneTableEstimator {
    pub fn new(table: ZoneTable) -> Self {
        Self { table }
    }

    /// Use the catalog's tier rates as per-package base rates.
    pub fn from_catalog(catalog: &Catalog) -> ShippingResult<Self> {
        let base = |level| {
            catalog
                .shipping_tier(level)
                .map(|tier| tier.base_rate)
                .map_err(|e| ShippingError::Unavailable(e.to_string()))
        };
        Ok(Self::new(ZoneTable {
            standard_base: base(ServiceLevel::Standard)?,
            compliance_base: base(ServiceLevel::Compliance)?,
            ..ZoneTable::default()
        }))
    }

    pub fn table(&self) -> &ZoneTable {
        &self.table
    }

    /// Zone between two US postal codes.
    pub fn zone(&self, origin: &str, destination: &str) -> ShippingResult<u32> {
        let from = postal_prefix(origin)?;
        let to = postal_prefix(destination)?;
        let span = self.table.prefix_span.max(1);
        Ok((MIN_ZONE + from.abs_diff(to) / span).min(MAX_ZONE))
    }

    /// Rate for one package.
    pub fn package_rate(&self, level: ServiceLevel, weight: f64, zone: u32) -> f64 {
        let base = match level {
            ServiceLevel::Standard => self.table.standard_base,
            ServiceLevel::Compliance => self.table.compliance_base,
        };
        let factor = 1.0 + self.table.zone_step * (zone.saturating_sub(MIN_ZONE)) as f64;
        round_cents(base + self.table.per_pound * weight.max(0.0) * factor)
    }
}

impl Default for ZoneTableEstimator {
    fn default() -> Self {
        Self::new(ZoneTable::default())
    }
}

impl ShippingRateProvider for ZoneTableEstimator {
    fn quote(&self, request: &ShippingRequest) -> ShippingResult<RateQuote> {
        if request.destination.country != "US" {
            return Err(ShippingError::Unavailable(format!(
                "no zone table for country {}",
                request.destination.country
            )));
        }

        let zone = self.zone(&request.origin, &request.destination.postal_code)?;
        let per_package = self.package_rate(request.service_level, request.weight_per_package, zone);
        let total_charge = round_cents(per_package * request.package_count as f64);

        debug!(
            zone,
            per_package,
            total_charge,
            packages = request.package_count,
            "zone table estimate"
        );

        let (service_name, transit_estimate) = match request.service_level {
            ServiceLevel::Standard => (
                format!("Ground (Zone {zone})"),
                ground_transit(zone),
            ),
            ServiceLevel::Compliance => (
                format!("2-Day Cold Chain (Zone {zone})"),
                String::from("2 business days"),
            ),
        };

        Ok(RateQuote {
            total_charge,
            service_name,
            transit_estimate,
        })
    }
}

fn ground_transit(zone: u32) -> String {
    match zone {
        0..=2 => "1-2 business days".into(),
        3..=4 => "2-3 business days".into(),
        5..=6 => "3-4 business days".into(),
        _ => "4-5 business days".into(),
    }
}

/// First three digits of a US postal code (ZIP or ZIP+4).
fn postal_prefix(postal_code: &str) -> ShippingResult<u32> {
    let code = postal_code.trim();
    let digits: String = code.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() != 5 {
        return Err(ShippingError::Unavailable(format!(
            "not a US postal code: {code:?}"
        )));
    }
    digits[..3]
        .parse()
        .map_err(|_| ShippingError::Unavailable(format!("not a US postal code: {code:?}")))
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use kelp_kit_core::models::Destination;
    use std::time::Duration;

    fn request(destination: &str, level: ServiceLevel, packages: u32) -> ShippingRequest {
        ShippingRequest {
            origin: "94608".into(),
            destination: Destination::us(destination),
            weight_per_package: 2.0,
            service_level: level,
            package_count: packages,
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_zone_bounds() {
        let estimator = ZoneTableEstimator::default();
        assert_eq!(estimator.zone("94608", "94110").unwrap(), MIN_ZONE);
        assert_eq!(estimator.zone("94608", "10001").unwrap(), MAX_ZONE);
        assert_eq!(estimator.zone("94608", "80202").unwrap(), 3);
    }

    #[test]
    fn test_zip_plus_four() {
        let estimator = ZoneTableEstimator::default();
        assert_eq!(estimator.zone("94608", "94110-1234").unwrap(), MIN_ZONE);
    }

    #[test]
    fn test_package_rate() {
        let estimator = ZoneTableEstimator::default();
        // 8.00 + 0.75 * 2.0 * 1.0
        assert_eq!(estimator.package_rate(ServiceLevel::Standard, 2.0, 2), 9.5);
        // 50.00 + 0.75 * 2.0 * 1.9
        assert_eq!(estimator.package_rate(ServiceLevel::Compliance, 2.0, 8), 52.85);
    }

    #[test]
    fn test_quote_scales_with_packages() {
        let estimator = ZoneTableEstimator::default();
        let one = estimator
            .quote(&request("94110", ServiceLevel::Standard, 1))
            .unwrap();
        let two = estimator
            .quote(&request("94110", ServiceLevel::Standard, 2))
            .unwrap();
        assert_eq!(one.total_charge, 9.5);
        assert_eq!(two.total_charge, 19.0);
        assert_eq!(one.service_name, "Ground (Zone 2)");
        assert_eq!(one.transit_estimate, "1-2 business days");
    }

    #[test]
    fn test_compliance_is_two_day() {
        let estimator = ZoneTableEstimator::default();
        let quote = estimator
            .quote(&request("10001", ServiceLevel::Compliance, 1))
            .unwrap();
        assert_eq!(quote.transit_estimate, "2 business days");
        assert!(quote.total_charge > 50.0);
    }

    #[test]
    fn test_bad_destination() {
        let estimator = ZoneTableEstimator::default();
        assert!(estimator
            .quote(&request("ABC", ServiceLevel::Standard, 1))
            .is_err());

        let mut foreign = request("94110", ServiceLevel::Standard, 1);
        foreign.destination.country = "CA".into();
        assert!(matches!(
            estimator.quote(&foreign),
            Err(ShippingError::Unavailable(_))
        ));
    }

    #[test]
    fn test_from_catalog() {
        let estimator = ZoneTableEstimator::from_catalog(&Catalog::kelp()).unwrap();
        assert_eq!(estimator.table().standard_base, 8.0);
        assert_eq!(estimator.table().compliance_base, 50.0);
    }
}
