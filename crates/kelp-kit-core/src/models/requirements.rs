//! Derived kit requirements (engine output).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::PRESERVATIVE_PREFIX;

/// Everything lab staff need to assemble one order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KitRequirements {
    /// Selected module ids, in catalog order
    pub modules: Vec<String>,
    /// Compliance (cooler + ice) shipping requested
    pub compliance_shipping: bool,
    /// Bottle part -> quantity after sharing
    pub bottle_map: BTreeMap<String, u32>,
    pub total_bottles: u32,
    pub package_count: u32,
    /// Ordered pick list
    pub pick_list: Vec<PickListItem>,
    /// Active sharing pairs
    pub shared_pairs: Vec<SharedPair>,
    /// Sharing notes and handling warnings
    pub special_notes: Vec<String>,
    pub has_special_handling: bool,
    pub sharing_active: bool,
    /// Total shipping weight (lb)
    pub weight: f64,
}

/// A single pick-list line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PickListItem {
    /// Part number
    pub part: String,
    pub description: String,
    pub quantity: u32,
    /// Shelf location
    pub location: String,
    pub note: Option<String>,
}

/// A sharing pair that is active for an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SharedPair {
    /// Module whose bottle is used
    pub host: String,
    /// Module whose bottle need is folded into the host's
    pub reduced: String,
}

impl KitRequirements {
    /// Find the pick-list line for a part number.
    pub fn line(&self, part: &str) -> Option<&PickListItem> {
        self.pick_list.iter().find(|item| item.part == part)
    }

    /// Quantity of a part on the pick list (0 if absent).
    pub fn quantity_of(&self, part: &str) -> u32 {
        self.line(part).map(|item| item.quantity).unwrap_or(0)
    }

    /// Whether a module is part of this kit.
    pub fn contains_module(&self, module_id: &str) -> bool {
        self.modules.iter().any(|m| m == module_id)
    }

    /// Whether a module is the reduced side of an active sharing pair.
    pub fn is_reduced(&self, module_id: &str) -> bool {
        self.shared_pairs.iter().any(|p| p.reduced == module_id)
    }

    /// Whether a module hosts an active shared bottle.
    pub fn is_host(&self, module_id: &str) -> bool {
        self.shared_pairs.iter().any(|p| p.host == module_id)
    }

    /// Preservative vials on the pick list.
    pub fn preservative_count(&self) -> u32 {
        self.pick_list
            .iter()
            .filter(|item| item.part.starts_with(PRESERVATIVE_PREFIX))
            .map(|item| item.quantity)
            .sum()
    }

    /// Shipping weight per package (lb).
    pub fn weight_per_package(&self) -> f64 {
        self.weight / self.package_count.max(1) as f64
    }
}
