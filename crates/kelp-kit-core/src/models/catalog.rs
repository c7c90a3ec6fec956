//! Catalog reference models: test modules, bundles, parts and shipping tiers.

use serde::{Deserialize, Serialize};

/// Physical shipping-box capacity in bottles.
pub const MAX_BOTTLES_PER_PACKAGE: u32 = 2;

/// Glove pairs packed per package.
pub const GLOVES_PER_PACKAGE: u32 = 2;

/// Part-number prefix shared by preservative vials.
pub const PRESERVATIVE_PREFIX: &str = "Pres_";

/// A purchasable analytical test module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Module {
    /// Stable identifier (e.g., "general_chemistry")
    pub id: String,
    /// Display name
    pub name: String,
    /// Short summary of the analytes covered
    pub description: String,
    /// Individual analytes in the panel
    pub tests: Vec<String>,
    /// Preservation requirement (e.g., "HNO3 to pH <2")
    pub preservation: String,
    /// Price when ordered standalone
    pub unit_cost: f64,
    /// Price when the bottle requirement is covered by a shared bottle
    pub shared_cost: f64,
    /// Bottle part number
    pub bottle_part: String,
    /// Bottles of `bottle_part` normally required
    pub bottle_count: u32,
    /// Extra per-module parts (preservatives, caps, labels)
    pub accessories: Vec<ComponentLine>,
    /// Incremental shipping weight (lb)
    pub weight: f64,
    /// Bottle sharing relation, if any
    pub shares_with: Option<SharedBottle>,
    /// Requires contamination-avoidance substitutions (PFAS)
    pub requires_special_handling: bool,
    /// Warning printed on the pick list when selected
    pub special_warning: Option<String>,
}

/// One side of a bottle-sharing relation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SharedBottle {
    /// The other module of the pair
    pub partner: String,
    /// This module's bottle folds into the partner's when both are selected
    pub reduced: bool,
}

/// A part reference with a quantity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComponentLine {
    pub part: String,
    pub quantity: u32,
}

impl ComponentLine {
    pub fn new(part: impl Into<String>, quantity: u32) -> Self {
        Self {
            part: part.into(),
            quantity,
        }
    }
}

/// A stocked physical part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Component {
    /// Part number (e.g., "Bottle_02")
    pub part: String,
    /// Pick-list description
    pub description: String,
    /// Shelf location in the stock room
    pub location: String,
}

/// A fixed, flat-priced selection of modules sold as one SKU.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bundle {
    pub sku: String,
    pub name: String,
    pub description: String,
    /// Module ids included in the bundle
    pub modules: Vec<String>,
    /// Replaces module-level material cost
    pub flat_price: f64,
}

/// Shipping service level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ServiceLevel {
    /// Ground shipping, no temperature control
    Standard,
    /// Two-day shipping with cooler and ice for regulatory samples
    Compliance,
}

impl ServiceLevel {
    pub fn from_compliance(compliance_shipping: bool) -> Self {
        if compliance_shipping {
            ServiceLevel::Compliance
        } else {
            ServiceLevel::Standard
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceLevel::Standard => "standard",
            ServiceLevel::Compliance => "compliance",
        }
    }
}

impl std::fmt::Display for ServiceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shipping tier reference data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingTier {
    pub level: ServiceLevel,
    pub name: String,
    pub description: String,
    /// Published per-package rate
    pub base_rate: f64,
    /// Human-readable transit estimate
    pub transit_estimate: String,
    /// Extra weight per package (cooler, ice)
    pub weight_per_package: f64,
    /// Extra parts per package
    pub components: Vec<ComponentLine>,
}

/// Parts and costs shared by every kit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaseKit {
    /// Material cost per package
    pub unit_cost: f64,
    /// Shipping weight per package (lb)
    pub unit_weight: f64,
    pub shipping_box: String,
    pub labels: String,
    pub instructions: String,
    pub chain_of_custody: String,
    pub gloves: String,
    /// Replaces `gloves` when any module needs special handling
    pub special_gloves: String,
    pub packaging: String,
    pub special_packaging: String,
}

impl Module {
    /// Whether this module's bottle folds into its partner's when shared.
    pub fn is_reduced_side(&self) -> bool {
        self.shares_with.as_ref().is_some_and(|s| s.reduced)
    }

    /// Partner module id, if this module takes part in bottle sharing.
    pub fn partner(&self) -> Option<&str> {
        self.shares_with.as_ref().map(|s| s.partner.as_str())
    }

    /// Short name without the "MODULE X:" style prefix.
    pub fn short_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, rest)) => rest.trim(),
            None => &self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(id: &str) -> Module {
        Module {
            id: id.into(),
            name: "MODULE C: Anions (EPA 300.1)".into(),
            description: String::new(),
            tests: Vec::new(),
            preservation: "NONE".into(),
            unit_cost: 1.5,
            shared_cost: 0.0,
            bottle_part: "Bottle_03".into(),
            bottle_count: 1,
            accessories: Vec::new(),
            weight: 0.5,
            shares_with: None,
            requires_special_handling: false,
            special_warning: None,
        }
    }

    #[test]
    fn test_reduced_side() {
        let mut m = module("anions");
        assert!(!m.is_reduced_side());
        assert_eq!(m.partner(), None);

        m.shares_with = Some(SharedBottle {
            partner: "general_chemistry".into(),
            reduced: true,
        });
        assert!(m.is_reduced_side());
        assert_eq!(m.partner(), Some("general_chemistry"));
    }

    #[test]
    fn test_short_name() {
        let mut m = module("anions");
        assert_eq!(m.short_name(), "Anions (EPA 300.1)");

        m.name = "Anions".into();
        assert_eq!(m.short_name(), "Anions");
    }

    #[test]
    fn test_service_level_serde() {
        let json = serde_json::to_string(&ServiceLevel::Compliance).unwrap();
        assert_eq!(json, "\"compliance\"");
        assert_eq!(ServiceLevel::from_compliance(false), ServiceLevel::Standard);
    }
}
