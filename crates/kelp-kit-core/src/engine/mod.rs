//! Kit requirements derivation.
//!
//! Pipeline: Selection → Sharing → Bottle map → Packages → Pick list → Weight
//!
//! Derivation is pure: the same selection always yields the same
//! [`KitRequirements`], regardless of the order ids are supplied in.

mod pick_list;

pub use pick_list::*;

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::debug;

use crate::catalog::{Catalog, CatalogError};
use crate::models::{
    KitRequirements, Module, OrderSelection, Selection, ServiceLevel, SharedPair,
    GLOVES_PER_PACKAGE, MAX_BOTTLES_PER_PACKAGE,
};

/// Engine errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("No test modules selected")]
    EmptySelection,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Packages needed for a bottle count.
pub fn package_count(total_bottles: u32) -> u32 {
    total_bottles.div_ceil(MAX_BOTTLES_PER_PACKAGE).max(1)
}

/// Compute kit requirements for a set of module ids.
pub fn compute_requirements<I, S>(
    catalog: &Catalog,
    selected_module_ids: I,
    compliance_shipping: bool,
) -> EngineResult<KitRequirements>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    KitEngine::new(catalog).compute_requirements(selected_module_ids, compliance_shipping)
}

/// Derives physical kit contents from catalog data.
pub struct KitEngine<'a> {
    catalog: &'a Catalog,
}

impl<'a> KitEngine<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Compute requirements for an order selection (modules or bundle).
    pub fn compute_for_selection(&self, selection: &OrderSelection) -> EngineResult<KitRequirements> {
        match &selection.selection {
            Selection::Modules { ids } => {
                self.compute_requirements(ids, selection.compliance_shipping)
            }
            Selection::Bundle { sku } => {
                self.compute_for_bundle(sku, selection.compliance_shipping)
            }
        }
    }

    /// Compute requirements for a bundle's fixed module set.
    pub fn compute_for_bundle(&self, sku: &str, compliance_shipping: bool) -> EngineResult<KitRequirements> {
        let bundle = self.catalog.get_bundle(sku)?;
        self.compute_requirements(&bundle.modules, compliance_shipping)
    }

    /// Compute requirements for a set of module ids.
    pub fn compute_requirements<I, S>(
        &self,
        selected_module_ids: I,
        compliance_shipping: bool,
    ) -> EngineResult<KitRequirements>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let modules = self.resolve_selection(selected_module_ids)?;
        let base = self.catalog.base_kit();
        let tier = self
            .catalog
            .shipping_tier(ServiceLevel::from_compliance(compliance_shipping))?;

        // 1. Sharing
        let shared_pairs = find_shared_pairs(&modules);
        let sharing_active = !shared_pairs.is_empty();
        let is_folded = |m: &Module| shared_pairs.iter().any(|p| p.reduced == m.id);

        // 2. Bottle contributions, accumulated by part in catalog order
        let mut bottle_order: Vec<&str> = Vec::new();
        let mut bottle_map: BTreeMap<String, u32> = BTreeMap::new();
        let mut special_bottles = 0;
        for module in modules.iter().filter(|m| !is_folded(m)) {
            if !bottle_map.contains_key(&module.bottle_part) {
                bottle_order.push(&module.bottle_part);
            }
            *bottle_map.entry(module.bottle_part.clone()).or_insert(0) += module.bottle_count;
            if module.requires_special_handling {
                special_bottles += module.bottle_count;
            }
        }

        // 3-4. Totals and packages
        let total_bottles: u32 = bottle_map.values().sum();
        let package_count = package_count(total_bottles);
        let has_special_handling = modules.iter().any(|m| m.requires_special_handling);

        // 5. Pick list
        let shared_parts: Vec<(&str, String)> = shared_pairs
            .iter()
            .filter_map(|pair| {
                let host = modules.iter().find(|m| m.id == pair.host)?;
                let reduced = modules.iter().find(|m| m.id == pair.reduced)?;
                Some((
                    host.bottle_part.as_str(),
                    format!("Shared: {} + {}", host.short_name(), reduced.short_name()),
                ))
            })
            .collect();

        let mut pick = PickListBuilder::new(self.catalog);
        pick.add(&base.shipping_box, package_count)?;
        for part in &bottle_order {
            let note = shared_parts
                .iter()
                .find(|(p, _)| p == part)
                .map(|(_, note)| note.clone());
            pick.add_with_note(part, bottle_map[*part], note)?;
        }
        for module in &modules {
            for accessory in &module.accessories {
                pick.add(&accessory.part, accessory.quantity)?;
            }
        }
        let gloves = if has_special_handling {
            &base.special_gloves
        } else {
            &base.gloves
        };
        pick.add(gloves, package_count * GLOVES_PER_PACKAGE)?;
        pick.add(&base.packaging, total_bottles - special_bottles)?;
        pick.add(&base.special_packaging, special_bottles)?;
        pick.add(&base.labels, package_count)?;
        pick.add(&base.instructions, package_count)?;
        pick.add(&base.chain_of_custody, 1)?;
        for line in &tier.components {
            pick.add(&line.part, line.quantity * package_count)?;
        }

        // Notes for lab staff
        let mut special_notes = Vec::new();
        for pair in &shared_pairs {
            let host = self.catalog.get_module(&pair.host)?;
            let reduced = self.catalog.get_module(&pair.reduced)?;
            special_notes.push(format!(
                "{} ({}) share bottle with {}",
                reduced.short_name(),
                reduced.description,
                host.short_name()
            ));
        }
        for module in &modules {
            if let Some(warning) = &module.special_warning {
                special_notes.push(warning.clone());
            }
        }
        if compliance_shipping {
            special_notes.push(format!(
                "Temperature control required: pack each box for {}",
                tier.name
            ));
        }

        // 6. Weight
        let module_weight: f64 = modules.iter().map(|m| m.weight).sum();
        let weight = round_weight(
            base.unit_weight * package_count as f64
                + module_weight
                + tier.weight_per_package * package_count as f64,
        );

        debug!(
            modules = modules.len(),
            total_bottles,
            package_count,
            sharing_active,
            has_special_handling,
            "computed kit requirements"
        );

        Ok(KitRequirements {
            modules: modules.iter().map(|m| m.id.clone()).collect(),
            compliance_shipping,
            bottle_map,
            total_bottles,
            package_count,
            pick_list: pick.build(),
            shared_pairs,
            special_notes,
            has_special_handling,
            sharing_active,
            weight,
        })
    }

    /// Deduplicate, resolve and sort the selection into catalog order.
    fn resolve_selection<I, S>(&self, selected_module_ids: I) -> EngineResult<Vec<&'a Module>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids: BTreeSet<String> = selected_module_ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .collect();
        if ids.is_empty() {
            return Err(EngineError::EmptySelection);
        }

        let mut modules = ids
            .iter()
            .map(|id| self.catalog.get_module(id))
            .collect::<Result<Vec<_>, _>>()?;
        modules.sort_by_key(|m| self.catalog.module_index(&m.id));
        Ok(modules)
    }
}

/// Sharing pairs whose two modules are both selected.
fn find_shared_pairs(modules: &[&Module]) -> Vec<SharedPair> {
    modules
        .iter()
        .filter(|m| m.is_reduced_side())
        .filter_map(|m| {
            let partner = m.partner()?;
            modules.iter().any(|other| other.id == partner).then(|| SharedPair {
                host: partner.to_string(),
                reduced: m.id.clone(),
            })
        })
        .collect()
}

fn round_weight(weight: f64) -> f64 {
    (weight * 100.0).round() / 100.0
}
