//! Order selection, pricing and history models.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::requirements::KitRequirements;

/// What the customer picked: individual modules or a bundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Selection {
    Modules { ids: BTreeSet<String> },
    Bundle { sku: String },
}

/// Immutable order configuration handed to the engine and calculator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderSelection {
    pub selection: Selection,
    pub compliance_shipping: bool,
}

impl OrderSelection {
    /// Custom selection of individual modules.
    pub fn modules<I, S>(ids: I, compliance_shipping: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selection: Selection::Modules {
                ids: ids.into_iter().map(Into::into).collect(),
            },
            compliance_shipping,
        }
    }

    /// Pre-packaged bundle selection.
    pub fn bundle(sku: impl Into<String>, compliance_shipping: bool) -> Self {
        Self {
            selection: Selection::Bundle { sku: sku.into() },
            compliance_shipping,
        }
    }

    pub fn bundle_sku(&self) -> Option<&str> {
        match &self.selection {
            Selection::Bundle { sku } => Some(sku),
            Selection::Modules { .. } => None,
        }
    }
}

/// Where the kit ships to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Destination {
    pub postal_code: String,
    /// ISO country code
    pub country: String,
}

impl Destination {
    pub fn us(postal_code: impl Into<String>) -> Self {
        Self {
            postal_code: postal_code.into(),
            country: "US".into(),
        }
    }
}

/// Where a shipping charge came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShippingSource {
    /// Quoted by a rate provider
    Live,
    /// Flat per-package fallback estimate
    Estimated,
}

/// Shipping charge for a whole order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingCharge {
    pub total: f64,
    pub service_name: String,
    pub transit_estimate: String,
    pub source: ShippingSource,
}

impl ShippingCharge {
    pub fn is_estimate(&self) -> bool {
        self.source == ShippingSource::Estimated
    }
}

/// Priced order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceBreakdown {
    pub material_cost: f64,
    /// Markup on material cost (0 unless configured)
    pub markup: f64,
    pub shipping_cost: f64,
    /// Assembly labor, shown for visibility only
    pub labor_cost: f64,
    /// material + markup + shipping
    pub total: f64,
    /// Discount from shared bottles, already reflected in material cost
    #[serde(default)]
    pub sharing_savings: f64,
}

/// Optional metadata printed on pick lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderMetadata {
    pub order_number: Option<String>,
    pub customer: Option<String>,
    pub project: Option<String>,
    /// RFC 3339 timestamp
    pub generated_at: Option<String>,
}

/// A finalized order in the append-only history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRecord {
    /// Unique record ID
    pub record_id: String,
    /// Human-facing order number (YYYY-MMDD-NNN)
    pub order_number: String,
    pub customer: Option<String>,
    pub project: Option<String>,
    pub selection: OrderSelection,
    pub destination: Option<Destination>,
    pub requirements: KitRequirements,
    pub price: PriceBreakdown,
    pub shipping: ShippingCharge,
    /// RFC 3339 timestamp
    pub created_at: String,
}
