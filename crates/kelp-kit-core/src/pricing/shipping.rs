//! Shipping rate provider boundary and flat-rate fallback.
//!
//! A provider may be a live carrier client or a local estimator. When none is
//! configured, no destination is known, or the provider fails, the order is
//! charged the configured flat per-package rate and marked as an estimate.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::{PricingError, PricingResult};
use crate::catalog::Catalog;
use crate::models::{Destination, KitRequirements, ServiceLevel, ShippingCharge, ShippingSource};

/// Shipping provider errors. All are recovered by the fallback estimate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShippingError {
    #[error("Shipping rates unavailable: {0}")]
    Unavailable(String),

    #[error("Shipping rate request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid shipping rate response: {0}")]
    InvalidResponse(String),
}

pub type ShippingResult<T> = Result<T, ShippingError>;

/// Rate request for one order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingRequest {
    /// Origin postal code (the lab)
    pub origin: String,
    pub destination: Destination,
    /// Weight of each package (lb)
    pub weight_per_package: f64,
    pub service_level: ServiceLevel,
    pub package_count: u32,
    /// Upper bound on how long the provider may block
    pub timeout: Duration,
}

/// Rate returned by a provider for the whole order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateQuote {
    pub total_charge: f64,
    pub service_name: String,
    pub transit_estimate: String,
}

/// Source of shipping rates.
pub trait ShippingRateProvider {
    /// Quote a shipment, or report why no rate is available.
    fn quote(&self, request: &ShippingRequest) -> ShippingResult<RateQuote>;
}

/// Shipping settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShippingConfig {
    /// Lab postal code
    pub origin_postal_code: String,
    /// Provider request timeout in milliseconds
    pub timeout_ms: u64,
    /// Fallback rate per package, ground
    pub standard_rate_per_package: f64,
    /// Fallback rate per package, cooler + ice
    pub compliance_rate_per_package: f64,
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            origin_postal_code: "94608".into(),
            timeout_ms: 10_000,
            standard_rate_per_package: 8.00,
            compliance_rate_per_package: 50.00,
        }
    }
}

impl ShippingConfig {
    /// Fallback rates must always produce a usable charge.
    pub fn validate(&self) -> PricingResult<()> {
        for (name, rate) in [
            ("standard_rate_per_package", self.standard_rate_per_package),
            ("compliance_rate_per_package", self.compliance_rate_per_package),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(PricingError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {rate}"
                )));
            }
        }
        if self.timeout_ms == 0 {
            return Err(PricingError::InvalidConfig(
                "timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Flat fallback rate for a service level.
    pub fn fallback_rate(&self, level: ServiceLevel) -> f64 {
        match level {
            ServiceLevel::Standard => self.standard_rate_per_package,
            ServiceLevel::Compliance => self.compliance_rate_per_package,
        }
    }
}

/// Resolves the shipping charge for a kit.
pub struct ShippingEstimator<'a> {
    catalog: &'a Catalog,
    config: &'a ShippingConfig,
    provider: Option<&'a dyn ShippingRateProvider>,
}

impl<'a> ShippingEstimator<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a ShippingConfig) -> Self {
        Self {
            catalog,
            config,
            provider: None,
        }
    }

    pub fn with_provider(mut self, provider: &'a dyn ShippingRateProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Build the provider request for a kit.
    pub fn request_for(&self, requirements: &KitRequirements, destination: &Destination) -> ShippingRequest {
        ShippingRequest {
            origin: self.config.origin_postal_code.clone(),
            destination: destination.clone(),
            weight_per_package: requirements.weight_per_package(),
            service_level: ServiceLevel::from_compliance(requirements.compliance_shipping),
            package_count: requirements.package_count,
            timeout: self.config.timeout(),
        }
    }

    /// Charge for shipping a kit. Always yields a usable amount.
    pub fn charge(&self, requirements: &KitRequirements, destination: Option<&Destination>) -> ShippingCharge {
        let level = ServiceLevel::from_compliance(requirements.compliance_shipping);

        let (provider, destination) = match (self.provider, destination) {
            (Some(provider), Some(destination)) => (provider, destination),
            (None, _) => {
                debug!("no shipping provider configured, using flat rate");
                return self.fallback(level, requirements.package_count);
            }
            (Some(_), None) => {
                debug!("no destination given, using flat rate");
                return self.fallback(level, requirements.package_count);
            }
        };

        let request = self.request_for(requirements, destination);
        match provider.quote(&request) {
            Ok(quote) if quote.total_charge.is_finite() && quote.total_charge >= 0.0 => ShippingCharge {
                total: quote.total_charge,
                service_name: quote.service_name,
                transit_estimate: quote.transit_estimate,
                source: ShippingSource::Live,
            },
            Ok(quote) => {
                warn!(charge = quote.total_charge, "provider returned an unusable charge, using flat rate");
                self.fallback(level, requirements.package_count)
            }
            Err(e) => {
                warn!(error = %e, "shipping provider failed, using flat rate");
                self.fallback(level, requirements.package_count)
            }
        }
    }

    /// Flat per-package estimate.
    pub fn fallback(&self, level: ServiceLevel, package_count: u32) -> ShippingCharge {
        let (service_name, transit_estimate) = match self.catalog.shipping_tier(level) {
            Ok(tier) => (tier.name.clone(), tier.transit_estimate.clone()),
            Err(_) => (level.to_string(), String::from("unknown")),
        };

        ShippingCharge {
            total: self.config.fallback_rate(level) * package_count as f64,
            service_name,
            transit_estimate,
            source: ShippingSource::Estimated,
        }
    }
}
