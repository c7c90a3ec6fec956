//! Printable pick lists for lab staff.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogResult};
use crate::models::{
    KitRequirements, OrderMetadata, OrderRecord, PickListItem, PriceBreakdown, ShippingCharge,
};

const PLACEHOLDER: &str = "[Not specified]";
const RULE: &str = "==========================================================================";

/// Pick list ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PickListDocument {
    pub metadata: OrderMetadata,
    /// Display names of the ordered test modules
    pub tests: Vec<String>,
    pub package_count: u32,
    pub total_bottles: u32,
    #[serde(default)]
    pub preservatives: u32,
    pub items: Vec<PickListItem>,
    pub special_notes: Vec<String>,
    /// Shipping service name, if priced
    pub shipping_method: Option<String>,
    /// Customer price, if priced
    pub customer_price: Option<f64>,
}

impl PickListDocument {
    /// Build a document from derived requirements.
    pub fn new(
        catalog: &Catalog,
        requirements: &KitRequirements,
        metadata: OrderMetadata,
    ) -> CatalogResult<Self> {
        let tests = requirements
            .modules
            .iter()
            .map(|id| catalog.get_module(id).map(|m| m.short_name().to_string()))
            .collect::<CatalogResult<Vec<_>>>()?;

        Ok(Self {
            metadata,
            tests,
            package_count: requirements.package_count,
            total_bottles: requirements.total_bottles,
            preservatives: requirements.preservative_count(),
            items: requirements.pick_list.clone(),
            special_notes: requirements.special_notes.clone(),
            shipping_method: None,
            customer_price: None,
        })
    }

    /// Build the pick list for a finalized order.
    pub fn from_record(catalog: &Catalog, record: &OrderRecord) -> CatalogResult<Self> {
        let metadata = OrderMetadata {
            order_number: Some(record.order_number.clone()),
            customer: record.customer.clone(),
            project: record.project.clone(),
            generated_at: Some(record.created_at.clone()),
        };
        Ok(Self::new(catalog, &record.requirements, metadata)?
            .with_price(&record.price, &record.shipping))
    }

    /// Attach pricing information.
    pub fn with_price(mut self, price: &PriceBreakdown, shipping: &ShippingCharge) -> Self {
        let method = if shipping.is_estimate() {
            format!("{} (estimated)", shipping.service_name)
        } else {
            shipping.service_name.clone()
        };
        self.shipping_method = Some(method);
        self.customer_price = Some(price.total);
        self
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        // Header
        csv.push_str("item,qty,pn,location,note\n");

        for item in &self.items {
            csv.push_str(&format!(
                "{},{},{},{},{}\n",
                escape_csv(&item.description),
                item.quantity,
                escape_csv(&item.part),
                escape_csv(&item.location),
                escape_csv(item.note.as_deref().unwrap_or("")),
            ));
        }

        csv
    }

    /// Render as a plain-text checklist.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let meta = &self.metadata;

        out.push_str("KETOS ENVIRONMENTAL LABORATORY\n");
        out.push_str("SAMPLING KIT - PICK LIST\n");
        out.push_str(RULE);
        out.push('\n');

        let (date, time) = meta
            .generated_at
            .as_deref()
            .and_then(|ts| chrono::DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| (dt.format("%B %d, %Y").to_string(), dt.format("%I:%M %p").to_string()))
            .unwrap_or_default();

        out.push_str(&format!(
            "{:<16}{:<40}{:<8}{}\n",
            "Order Number:",
            meta.order_number.as_deref().unwrap_or(PLACEHOLDER),
            "Date:",
            date
        ));
        out.push_str(&format!(
            "{:<16}{:<40}{:<8}{}\n",
            "Customer:",
            meta.customer.as_deref().unwrap_or(PLACEHOLDER),
            "Time:",
            time
        ));
        out.push_str(&format!(
            "{:<16}{}\n",
            "Project:",
            meta.project.as_deref().unwrap_or(PLACEHOLDER)
        ));
        out.push_str(&format!("Tests Ordered: {}\n", self.tests.join(", ")));
        out.push_str(&format!(
            "Packages: {}    Sample Bottles: {}    Preservatives: {}\n\n",
            self.package_count, self.total_bottles, self.preservatives
        ));

        out.push_str("COMPONENTS TO PICK\n");
        out.push_str(&format!(
            "{:<4}{:<44}{:>5}  {:<16}{}\n",
            "", "Item Description", "Qty", "P/N", "Location"
        ));
        for item in &self.items {
            out.push_str(&format!(
                "{:<4}{:<44}{:>5}  {:<16}{}\n",
                "[ ]",
                truncate(&item.description, 42),
                item.quantity,
                item.part,
                item.location
            ));
            if let Some(note) = &item.note {
                out.push_str(&format!("{:<4}  -> {}\n", "", note));
            }
        }
        out.push('\n');

        if !self.special_notes.is_empty() {
            out.push_str("SPECIAL INSTRUCTIONS\n");
            for note in &self.special_notes {
                out.push_str(&format!("  * {}\n", note));
            }
            out.push('\n');
        }

        out.push_str("ASSEMBLY INFORMATION\n");
        out.push_str(&format!("{:<20}{}\n", "Total Items:", self.items.len()));
        if let Some(method) = &self.shipping_method {
            out.push_str(&format!("{:<20}{}\n", "Shipping Method:", method));
        }
        if let Some(price) = self.customer_price {
            out.push_str(&format!("{:<20}${:.2}\n", "Customer Price:", price));
        }
        out.push('\n');

        out.push_str("QUALITY CONTROL\n");
        out.push_str("Assembled By:   ________________   Date: __________   Time: __________\n");
        out.push_str("QC Reviewed By: ________________   Date: __________   Initials: ______\n");
        out.push_str(RULE);
        out.push('\n');
        out.push_str("KELP-SOP-KIT-001 | ISO/IEC 17025:2017 | TNI Accredited Laboratory\n");

        out
    }
}

/// Render a text pick list for requirements with no order metadata.
pub fn render(catalog: &Catalog, requirements: &KitRequirements) -> CatalogResult<String> {
    Ok(PickListDocument::new(catalog, requirements, OrderMetadata::default())?.to_text())
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(|c| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
