//! Read-only catalog of modules, bundles, parts and shipping tiers.

mod builtin;

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;
use thiserror::Error;

use crate::models::{BaseKit, Bundle, Component, Module, ServiceLevel, ShippingTier};

/// Minimum similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.80;

/// Kind of catalog entry, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Module,
    Bundle,
    Component,
    ShippingTier,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntryKind::Module => "module",
            EntryKind::Bundle => "bundle",
            EntryKind::Component => "component",
            EntryKind::ShippingTier => "shipping tier",
        };
        f.write_str(s)
    }
}

/// Catalog errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Unknown {kind}: {id}{}", suggestion_suffix(.suggestion))]
    UnknownCatalogEntry {
        kind: EntryKind,
        id: String,
        suggestion: Option<String>,
    },

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Static reference data for kit derivation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    base: BaseKit,
    modules: Vec<Module>,
    bundles: Vec<Bundle>,
    components: Vec<Component>,
    shipping_tiers: Vec<ShippingTier>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::kelp()
    }
}

impl Catalog {
    /// Build a catalog, validating cross references and sharing relations.
    pub fn new(
        base: BaseKit,
        modules: Vec<Module>,
        bundles: Vec<Bundle>,
        components: Vec<Component>,
        shipping_tiers: Vec<ShippingTier>,
    ) -> CatalogResult<Self> {
        let catalog = Self {
            base,
            modules,
            bundles,
            components,
            shipping_tiers,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from JSON.
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        let catalog: Catalog = serde_json::from_str(json)
            .map_err(|e| CatalogError::InvalidCatalog(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> CatalogResult<()> {
        let mut seen = std::collections::HashSet::new();
        for module in &self.modules {
            if !seen.insert(module.id.as_str()) {
                return Err(invalid(format!("duplicate module id {}", module.id)));
            }
            if module.bottle_count == 0 {
                return Err(invalid(format!("module {} requires no bottles", module.id)));
            }
            if !(module.unit_cost >= 0.0 && module.shared_cost >= 0.0 && module.weight >= 0.0) {
                return Err(invalid(format!("module {} has a negative cost or weight", module.id)));
            }
            self.component(&module.bottle_part)?;
            for accessory in &module.accessories {
                self.component(&accessory.part)?;
            }

            let Some(link) = &module.shares_with else {
                continue;
            };
            let partner = self.get_module(&link.partner)?;
            let back = partner.shares_with.as_ref().ok_or_else(|| {
                invalid(format!("{} shares with {} but not the reverse", module.id, partner.id))
            })?;
            if back.partner != module.id {
                return Err(invalid(format!(
                    "{} shares with {} but {} shares with {}",
                    module.id, partner.id, partner.id, back.partner
                )));
            }
            if back.reduced == link.reduced {
                return Err(invalid(format!(
                    "exactly one of {} and {} must be the reduced side",
                    module.id, partner.id
                )));
            }
        }

        for bundle in &self.bundles {
            if bundle.modules.is_empty() {
                return Err(invalid(format!("bundle {} has no modules", bundle.sku)));
            }
            if !(bundle.flat_price >= 0.0) {
                return Err(invalid(format!("bundle {} has a negative price", bundle.sku)));
            }
            for id in &bundle.modules {
                self.get_module(id)?;
            }
        }

        let base = &self.base;
        for part in [
            &base.shipping_box,
            &base.labels,
            &base.instructions,
            &base.chain_of_custody,
            &base.gloves,
            &base.special_gloves,
            &base.packaging,
            &base.special_packaging,
        ] {
            self.component(part)?;
        }

        for level in [ServiceLevel::Standard, ServiceLevel::Compliance] {
            let tier = self.shipping_tier(level)?;
            for line in &tier.components {
                self.component(&line.part)?;
            }
        }

        Ok(())
    }

    /// Look up a module by id.
    pub fn get_module(&self, id: &str) -> CatalogResult<&Module> {
        self.modules.iter().find(|m| m.id == id).ok_or_else(|| {
            unknown(EntryKind::Module, id, self.modules.iter().map(|m| m.id.as_str()))
        })
    }

    /// Look up a bundle by SKU.
    pub fn get_bundle(&self, sku: &str) -> CatalogResult<&Bundle> {
        self.bundles.iter().find(|b| b.sku == sku).ok_or_else(|| {
            unknown(EntryKind::Bundle, sku, self.bundles.iter().map(|b| b.sku.as_str()))
        })
    }

    /// Look up a part by part number.
    pub fn component(&self, part: &str) -> CatalogResult<&Component> {
        self.components.iter().find(|c| c.part == part).ok_or_else(|| {
            unknown(EntryKind::Component, part, self.components.iter().map(|c| c.part.as_str()))
        })
    }

    /// Look up the tier for a service level.
    pub fn shipping_tier(&self, level: ServiceLevel) -> CatalogResult<&ShippingTier> {
        self.shipping_tiers
            .iter()
            .find(|t| t.level == level)
            .ok_or_else(|| CatalogError::UnknownCatalogEntry {
                kind: EntryKind::ShippingTier,
                id: level.to_string(),
                suggestion: None,
            })
    }

    /// All modules, in catalog order.
    pub fn list_modules(&self) -> &[Module] {
        &self.modules
    }

    /// All bundles, in catalog order.
    pub fn list_bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    pub fn list_components(&self) -> &[Component] {
        &self.components
    }

    pub fn base_kit(&self) -> &BaseKit {
        &self.base
    }

    /// Position of a module in catalog order.
    pub(crate) fn module_index(&self, id: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.id == id)
    }

    /// Mutable module access for catalog maintenance.
    pub fn module_mut(&mut self, id: &str) -> CatalogResult<&mut Module> {
        let known: Vec<String> = self.modules.iter().map(|m| m.id.clone()).collect();
        self.modules
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| unknown(EntryKind::Module, id, known.iter().map(String::as_str)))
    }
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean {s}?)"),
        None => String::new(),
    }
}

fn invalid(message: String) -> CatalogError {
    CatalogError::InvalidCatalog(message)
}

/// Build an unknown-entry error with the closest known id as a suggestion.
fn unknown<'a>(kind: EntryKind, id: &str, known: impl Iterator<Item = &'a str>) -> CatalogError {
    let needle = id.to_lowercase();
    let suggestion = known
        .map(|candidate| (jaro_winkler(&needle, &candidate.to_lowercase()), candidate))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(_, candidate)| candidate.to_string());

    CatalogError::UnknownCatalogEntry {
        kind,
        id: id.to_string(),
        suggestion,
    }
}
