//! Order pricing.
//!
//! Custom orders are priced module-by-module on top of the base kit; bundle
//! orders are priced at the bundle's flat price. Labor is reported but never
//! enters the total.

mod shipping;

pub use shipping::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};
use crate::engine::EngineError;
use crate::models::{Bundle, KitRequirements, Module, PriceBreakdown};

/// Pricing errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("Invalid shipping quote: {0}")]
    InvalidShippingQuote(f64),

    #[error("Invalid pricing configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub type PricingResult<T> = Result<T, PricingError>;

/// Which side of an active sharing pair is charged its `shared_cost`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SharedDiscount {
    /// The module marked `reduced` in the catalog (anions)
    #[default]
    ReducedSide,
    /// The module hosting the shared bottle (general chemistry)
    PartnerSide,
}

/// Pricing policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PricingConfig {
    /// Multiplier on material cost; 1.0 means no markup
    pub markup_factor: f64,
    pub shared_discount: SharedDiscount,
    /// Assembly labor per kit (about 7 minutes)
    pub labor_cost: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            markup_factor: 1.0,
            shared_discount: SharedDiscount::ReducedSide,
            labor_cost: 7.46,
        }
    }
}

impl PricingConfig {
    pub fn validate(&self) -> PricingResult<()> {
        if !self.markup_factor.is_finite() || self.markup_factor < 0.0 {
            return Err(PricingError::InvalidConfig(format!(
                "markup_factor must be a non-negative number, got {}",
                self.markup_factor
            )));
        }
        if !self.labor_cost.is_finite() || self.labor_cost < 0.0 {
            return Err(PricingError::InvalidConfig(format!(
                "labor_cost must be a non-negative number, got {}",
                self.labor_cost
            )));
        }
        Ok(())
    }
}

/// Prices kits against the catalog.
pub struct PriceCalculator<'a> {
    catalog: &'a Catalog,
    config: &'a PricingConfig,
}

impl<'a> PriceCalculator<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a PricingConfig) -> Self {
        Self { catalog, config }
    }

    /// Price a custom (module-by-module) order.
    ///
    /// Selected modules and active sharing pairs are read from the
    /// requirements snapshot.
    pub fn price_custom(
        &self,
        requirements: &KitRequirements,
        shipping_cost: f64,
    ) -> PricingResult<PriceBreakdown> {
        self.config.validate()?;
        check_shipping(shipping_cost)?;

        let base = self.catalog.base_kit();
        let mut material_cost = base.unit_cost * requirements.package_count as f64;
        for id in &requirements.modules {
            let module = self.catalog.get_module(id)?;
            material_cost += self.module_cost(module, requirements);
        }
        let material_cost = round_cents(material_cost);
        let sharing_savings = self.sharing_savings(requirements)?;
        let markup = round_cents(material_cost * (self.config.markup_factor - 1.0));

        Ok(PriceBreakdown {
            material_cost,
            markup,
            shipping_cost,
            labor_cost: self.config.labor_cost,
            total: round_cents(material_cost + markup + shipping_cost),
            sharing_savings,
        })
    }

    /// Price a bundle order. The flat price replaces material cost.
    pub fn price_bundle(&self, bundle: &Bundle, shipping_cost: f64) -> PricingResult<PriceBreakdown> {
        self.config.validate()?;
        check_shipping(shipping_cost)?;

        Ok(PriceBreakdown {
            material_cost: bundle.flat_price,
            markup: 0.0,
            shipping_cost,
            labor_cost: self.config.labor_cost,
            total: round_cents(bundle.flat_price + shipping_cost),
            sharing_savings: 0.0,
        })
    }

    /// Amount saved by active sharing pairs relative to full module prices.
    pub fn sharing_savings(&self, requirements: &KitRequirements) -> PricingResult<f64> {
        let mut savings = 0.0;
        for pair in &requirements.shared_pairs {
            let discounted = match self.config.shared_discount {
                SharedDiscount::ReducedSide => &pair.reduced,
                SharedDiscount::PartnerSide => &pair.host,
            };
            let module = self.catalog.get_module(discounted)?;
            savings += module.unit_cost - module.shared_cost;
        }
        Ok(round_cents(savings))
    }

    /// Cost of one selected module given the active sharing pairs.
    pub fn module_cost(&self, module: &Module, requirements: &KitRequirements) -> f64 {
        let discounted = match self.config.shared_discount {
            SharedDiscount::ReducedSide => requirements.is_reduced(&module.id),
            SharedDiscount::PartnerSide => requirements.is_host(&module.id),
        };
        if discounted {
            module.shared_cost
        } else {
            module.unit_cost
        }
    }
}

fn check_shipping(shipping_cost: f64) -> PricingResult<()> {
    if shipping_cost.is_finite() && shipping_cost >= 0.0 {
        Ok(())
    } else {
        Err(PricingError::InvalidShippingQuote(shipping_cost))
    }
}

/// Round a currency amount to cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
