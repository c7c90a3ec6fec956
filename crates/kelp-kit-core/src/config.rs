//! Kit builder configuration.

use serde::{Deserialize, Serialize};

use crate::pricing::{PricingConfig, PricingResult, ShippingConfig};

/// Top-level configuration. Every field has a default, so a partial JSON
/// document is enough.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KitConfig {
    pub pricing: PricingConfig,
    pub shipping: ShippingConfig,
}

impl KitConfig {
    /// Parse configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> PricingResult<()> {
        self.pricing.validate()?;
        self.shipping.validate()
    }
}
