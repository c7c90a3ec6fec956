//! KELP Kit Builder Core Library
//!
//! Turns a selection of laboratory test modules (or a pre-packaged bundle)
//! into a physical sampling kit: bottles, preservatives, packaging, a
//! part-numbered pick list for lab staff, and a customer price.
//!
//! # Architecture
//!
//! ```text
//!   OrderSession (mutable, single writer)
//!          │ OrderSelection (immutable)
//!          ▼
//!   ┌──────────────┐   lookups   ┌─────────┐
//!   │  KitEngine   │────────────▶│ Catalog │
//!   └──────┬───────┘             └─────────┘
//!          │ KitRequirements
//!          ├───────────────────────────┐
//!          ▼                           ▼
//!   ShippingEstimator ──▶ ShippingRateProvider (live or flat-rate fallback)
//!          │ ShippingCharge
//!          ▼
//!   PriceCalculator ──▶ PriceBreakdown
//!          │
//!          ├──▶ PickListDocument (text / CSV / JSON)
//!          └──▶ Order history (append-only SQLite)
//! ```
//!
//! # Modules
//!
//! - [`catalog`]: Modules, bundles, components and shipping tiers
//! - [`engine`]: Kit requirements derivation (bottle sharing, packages, pick list)
//! - [`pricing`]: Price calculator and shipping rate boundary
//! - [`configurator`]: End-to-end quoting
//! - [`session`]: In-progress order state
//! - [`export`]: Pick list rendering
//! - [`db`]: Order history

pub mod catalog;
pub mod config;
pub mod configurator;
pub mod db;
pub mod engine;
pub mod export;
pub mod models;
pub mod pricing;
pub mod session;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogError};
pub use config::KitConfig;
pub use configurator::{KitConfigurator, QuotedKit};
pub use db::Database;
pub use engine::{compute_requirements, package_count, KitEngine};
pub use export::PickListDocument;
pub use models::{
    Bundle, Destination, KitRequirements, Module, OrderMetadata, OrderRecord, OrderSelection,
    PickListItem, PriceBreakdown, ShippingCharge, ShippingSource,
};
pub use pricing::{PriceCalculator, ShippingEstimator, ShippingRateProvider};
pub use session::OrderSession;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum KitBuilderError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<db::DbError> for KitBuilderError {
    fn from(e: db::DbError) -> Self {
        KitBuilderError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for KitBuilderError {
    fn from(e: serde_json::Error) -> Self {
        KitBuilderError::SerializationError(e.to_string())
    }
}

impl From<CatalogError> for KitBuilderError {
    fn from(e: CatalogError) -> Self {
        KitBuilderError::InvalidInput(e.to_string())
    }
}

impl From<engine::EngineError> for KitBuilderError {
    fn from(e: engine::EngineError) -> Self {
        KitBuilderError::InvalidInput(e.to_string())
    }
}

impl From<pricing::PricingError> for KitBuilderError {
    fn from(e: pricing::PricingError) -> Self {
        KitBuilderError::InvalidInput(e.to_string())
    }
}

impl From<session::SessionError> for KitBuilderError {
    fn from(e: session::SessionError) -> Self {
        match e {
            session::SessionError::Db(e) => e.into(),
            other => KitBuilderError::InvalidInput(other.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for KitBuilderError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        KitBuilderError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create an order history at the given path.
///
/// `config_json` may override pricing and shipping settings; omitted fields
/// keep their defaults.
#[uniffi::export]
pub fn open_kit_builder(
    path: String,
    config_json: Option<String>,
) -> Result<Arc<KitBuilderCore>, KitBuilderError> {
    let db = Database::open(&path)?;
    KitBuilderCore::with_database(db, config_json)
}

/// Create a kit builder with an in-memory history (for testing).
#[uniffi::export]
pub fn open_kit_builder_in_memory() -> Result<Arc<KitBuilderCore>, KitBuilderError> {
    let db = Database::open_in_memory()?;
    KitBuilderCore::with_database(db, None)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe kit builder for FFI. Shipping is always the flat-rate estimate.
#[derive(uniffi::Object)]
pub struct KitBuilderCore {
    db: Arc<Mutex<Database>>,
    catalog: Catalog,
    config: KitConfig,
}

impl KitBuilderCore {
    fn with_database(
        db: Database,
        config_json: Option<String>,
    ) -> Result<Arc<Self>, KitBuilderError> {
        let config = match config_json {
            Some(json) => KitConfig::from_json(&json)?,
            None => KitConfig::default(),
        };
        config.validate()?;

        Ok(Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            catalog: Catalog::kelp(),
            config,
        }))
    }

    fn configurator(&self) -> KitConfigurator<'_> {
        KitConfigurator::new(&self.catalog, &self.config)
    }
}

#[uniffi::export]
impl KitBuilderCore {
    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// All test modules, in catalog order.
    pub fn list_modules(&self) -> Vec<FfiModule> {
        self.catalog
            .list_modules()
            .iter()
            .map(FfiModule::from)
            .collect()
    }

    /// All pre-packaged bundles.
    pub fn list_bundles(&self) -> Vec<FfiBundle> {
        self.catalog
            .list_bundles()
            .iter()
            .map(FfiBundle::from)
            .collect()
    }

    // =========================================================================
    // Kit Operations
    // =========================================================================

    /// Derive the physical kit for a module selection.
    pub fn compute_kit(
        &self,
        module_ids: Vec<String>,
        compliance_shipping: bool,
    ) -> Result<FfiKitRequirements, KitBuilderError> {
        let requirements = compute_requirements(&self.catalog, &module_ids, compliance_shipping)?;
        Ok(requirements.into())
    }

    /// Quote a custom module selection.
    pub fn quote_custom(
        &self,
        module_ids: Vec<String>,
        compliance_shipping: bool,
        postal_code: Option<String>,
    ) -> Result<FfiQuote, KitBuilderError> {
        let destination = postal_code.map(Destination::us);
        let quoted =
            self.configurator()
                .quote_custom(module_ids, compliance_shipping, destination.as_ref())?;
        Ok(quoted.into())
    }

    /// Quote a bundle.
    pub fn quote_bundle(
        &self,
        sku: String,
        compliance_shipping: bool,
        postal_code: Option<String>,
    ) -> Result<FfiQuote, KitBuilderError> {
        let destination = postal_code.map(Destination::us);
        let quoted =
            self.configurator()
                .quote_bundle(&sku, compliance_shipping, destination.as_ref())?;
        Ok(quoted.into())
    }

    // =========================================================================
    // Pick List Operations
    // =========================================================================

    /// Render an unsaved order's pick list as a text checklist.
    pub fn render_pick_list_text(&self, order: FfiOrderRequest) -> Result<String, KitBuilderError> {
        Ok(self.preview(order)?.to_text())
    }

    /// Render an unsaved order's pick list as CSV.
    pub fn render_pick_list_csv(&self, order: FfiOrderRequest) -> Result<String, KitBuilderError> {
        Ok(self.preview(order)?.to_csv())
    }

    /// Render a saved order's pick list as a text checklist.
    pub fn order_pick_list_text(&self, order_number: String) -> Result<String, KitBuilderError> {
        let db = self.db.lock()?;
        let record = db
            .get_order_by_number(&order_number)?
            .ok_or_else(|| KitBuilderError::NotFound(order_number.clone()))?;
        Ok(PickListDocument::from_record(&self.catalog, &record)?.to_text())
    }

    // =========================================================================
    // Order History Operations
    // =========================================================================

    /// Price an order and append it to history.
    pub fn save_order(&self, order: FfiOrderRequest) -> Result<FfiOrderSummary, KitBuilderError> {
        let db = self.db.lock()?;
        let mut session = order.into_session();
        let record = session.finalize(&self.configurator(), &db)?;
        Ok(record.into())
    }

    /// All saved orders, newest first.
    pub fn list_orders(&self) -> Result<Vec<FfiOrderSummary>, KitBuilderError> {
        let db = self.db.lock()?;
        let orders = db.list_orders()?;
        Ok(orders.into_iter().map(|o| o.into()).collect())
    }

    /// Get a saved order by order number.
    pub fn get_order(&self, order_number: String) -> Result<Option<FfiOrderSummary>, KitBuilderError> {
        let db = self.db.lock()?;
        let order = db.get_order_by_number(&order_number)?;
        Ok(order.map(|o| o.into()))
    }
}

impl KitBuilderCore {
    fn preview(&self, order: FfiOrderRequest) -> Result<PickListDocument, KitBuilderError> {
        let session = order.into_session();
        let quoted = session.quote(&self.configurator())?;
        let document = PickListDocument::new(&self.catalog, &quoted.requirements, session.metadata())?
            .with_price(&quoted.price, &quoted.shipping);
        Ok(document)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe test module.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiModule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tests: Vec<String>,
    pub preservation: String,
    pub unit_cost: f64,
    pub bottle_count: u32,
    pub shares_with: Option<String>,
    pub requires_special_handling: bool,
    pub special_warning: Option<String>,
}

impl From<&Module> for FfiModule {
    fn from(module: &Module) -> Self {
        Self {
            id: module.id.clone(),
            name: module.name.clone(),
            description: module.description.clone(),
            tests: module.tests.clone(),
            preservation: module.preservation.clone(),
            unit_cost: module.unit_cost,
            bottle_count: module.bottle_count,
            shares_with: module.partner().map(str::to_string),
            requires_special_handling: module.requires_special_handling,
            special_warning: module.special_warning.clone(),
        }
    }
}

/// FFI-safe bundle.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBundle {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub modules: Vec<String>,
    pub flat_price: f64,
}

impl From<&Bundle> for FfiBundle {
    fn from(bundle: &Bundle) -> Self {
        Self {
            sku: bundle.sku.clone(),
            name: bundle.name.clone(),
            description: bundle.description.clone(),
            modules: bundle.modules.clone(),
            flat_price: bundle.flat_price,
        }
    }
}

/// FFI-safe pick list line.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPickListItem {
    pub part: String,
    pub description: String,
    pub quantity: u32,
    pub location: String,
    pub note: Option<String>,
}

impl From<PickListItem> for FfiPickListItem {
    fn from(item: PickListItem) -> Self {
        Self {
            part: item.part,
            description: item.description,
            quantity: item.quantity,
            location: item.location,
            note: item.note,
        }
    }
}

/// FFI-safe kit requirements.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiKitRequirements {
    pub modules: Vec<String>,
    pub total_bottles: u32,
    pub package_count: u32,
    pub preservatives: u32,
    pub pick_list: Vec<FfiPickListItem>,
    pub special_notes: Vec<String>,
    pub has_special_handling: bool,
    pub sharing_active: bool,
    pub weight: f64,
}

impl From<KitRequirements> for FfiKitRequirements {
    fn from(req: KitRequirements) -> Self {
        let preservatives = req.preservative_count();
        Self {
            modules: req.modules,
            total_bottles: req.total_bottles,
            package_count: req.package_count,
            preservatives,
            pick_list: req.pick_list.into_iter().map(|i| i.into()).collect(),
            special_notes: req.special_notes,
            has_special_handling: req.has_special_handling,
            sharing_active: req.sharing_active,
            weight: req.weight,
        }
    }
}

/// FFI-safe priced quote.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiQuote {
    pub requirements: FfiKitRequirements,
    pub material_cost: f64,
    pub markup: f64,
    pub shipping_cost: f64,
    pub labor_cost: f64,
    pub total: f64,
    pub sharing_savings: f64,
    pub shipping_service: String,
    pub transit_estimate: String,
    /// True when shipping is a flat-rate estimate rather than a live rate
    pub shipping_estimated: bool,
}

impl From<QuotedKit> for FfiQuote {
    fn from(quoted: QuotedKit) -> Self {
        let shipping_estimated = quoted.shipping.is_estimate();
        Self {
            requirements: quoted.requirements.into(),
            material_cost: quoted.price.material_cost,
            markup: quoted.price.markup,
            shipping_cost: quoted.price.shipping_cost,
            labor_cost: quoted.price.labor_cost,
            total: quoted.price.total,
            sharing_savings: quoted.price.sharing_savings,
            shipping_service: quoted.shipping.service_name,
            transit_estimate: quoted.shipping.transit_estimate,
            shipping_estimated,
        }
    }
}

/// FFI-safe order request. A bundle SKU takes precedence over module IDs.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiOrderRequest {
    pub module_ids: Vec<String>,
    pub bundle_sku: Option<String>,
    pub compliance_shipping: bool,
    pub customer: Option<String>,
    pub project: Option<String>,
    pub postal_code: Option<String>,
}

impl FfiOrderRequest {
    fn into_session(self) -> OrderSession {
        let mut session = OrderSession::new();
        for id in self.module_ids {
            session.select_module(id);
        }
        if let Some(sku) = self.bundle_sku {
            session.choose_bundle(sku);
        }
        session
            .set_compliance_shipping(self.compliance_shipping)
            .set_customer(self.customer)
            .set_project(self.project)
            .set_destination(self.postal_code.map(Destination::us));
        session
    }
}

/// FFI-safe saved order.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiOrderSummary {
    pub record_id: String,
    pub order_number: String,
    pub customer: Option<String>,
    pub project: Option<String>,
    pub modules: Vec<String>,
    pub bundle_sku: Option<String>,
    pub package_count: u32,
    pub total: f64,
    pub shipping_estimated: bool,
    pub created_at: String,
}

impl From<OrderRecord> for FfiOrderSummary {
    fn from(record: OrderRecord) -> Self {
        Self {
            bundle_sku: record.selection.bundle_sku().map(str::to_string),
            shipping_estimated: record.shipping.is_estimate(),
            record_id: record.record_id,
            order_number: record.order_number,
            customer: record.customer,
            project: record.project,
            modules: record.requirements.modules,
            package_count: record.requirements.package_count,
            total: record.price.total,
            created_at: record.created_at,
        }
    }
}
