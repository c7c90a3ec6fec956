//! In-progress order state.
//!
//! The session is the only mutable piece of an order. Every quote hands an
//! immutable [`OrderSelection`] to the configurator; finalizing copies the
//! priced order into the append-only history and starts over.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::configurator::{KitConfigurator, QuotedKit};
use crate::db::{Database, DbError};
use crate::models::{Destination, OrderMetadata, OrderRecord, OrderSelection};
use crate::pricing::PricingError;

/// Session errors.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No modules or bundle selected")]
    NothingSelected,

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Db(#[from] DbError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// An order being assembled by a user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderSession {
    modules: BTreeSet<String>,
    bundle: Option<String>,
    compliance_shipping: bool,
    customer: Option<String>,
    project: Option<String>,
    destination: Option<Destination>,
}

impl OrderSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module to a custom order. Picking a module drops any bundle.
    pub fn select_module(&mut self, id: impl Into<String>) -> &mut Self {
        self.bundle = None;
        self.modules.insert(id.into());
        self
    }

    pub fn deselect_module(&mut self, id: &str) -> &mut Self {
        self.modules.remove(id);
        self
    }

    /// Order a bundle instead of individual modules.
    pub fn choose_bundle(&mut self, sku: impl Into<String>) -> &mut Self {
        self.modules.clear();
        self.bundle = Some(sku.into());
        self
    }

    pub fn clear_bundle(&mut self) -> &mut Self {
        self.bundle = None;
        self
    }

    pub fn set_compliance_shipping(&mut self, compliance: bool) -> &mut Self {
        self.compliance_shipping = compliance;
        self
    }

    pub fn set_customer(&mut self, customer: Option<String>) -> &mut Self {
        self.customer = non_blank(customer);
        self
    }

    pub fn set_project(&mut self, project: Option<String>) -> &mut Self {
        self.project = non_blank(project);
        self
    }

    pub fn set_destination(&mut self, destination: Option<Destination>) -> &mut Self {
        self.destination = destination;
        self
    }

    pub fn selected_modules(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(String::as_str)
    }

    pub fn bundle(&self) -> Option<&str> {
        self.bundle.as_deref()
    }

    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.bundle.is_none()
    }

    /// Snapshot the current choice, if anything is selected.
    pub fn selection(&self) -> Option<OrderSelection> {
        match &self.bundle {
            Some(sku) => Some(OrderSelection::bundle(sku.clone(), self.compliance_shipping)),
            None if !self.modules.is_empty() => Some(OrderSelection::modules(
                self.modules.iter().cloned(),
                self.compliance_shipping,
            )),
            None => None,
        }
    }

    /// Pick list metadata for the current order.
    pub fn metadata(&self) -> OrderMetadata {
        OrderMetadata {
            order_number: None,
            customer: self.customer.clone(),
            project: self.project.clone(),
            generated_at: Some(Utc::now().to_rfc3339()),
        }
    }

    /// Derive and price the current order.
    pub fn quote(&self, configurator: &KitConfigurator<'_>) -> SessionResult<QuotedKit> {
        let selection = self.selection().ok_or(SessionError::NothingSelected)?;
        Ok(configurator.quote(&selection, self.destination.as_ref())?)
    }

    /// Price the order, append it to history and reset the session.
    pub fn finalize(
        &mut self,
        configurator: &KitConfigurator<'_>,
        db: &Database,
    ) -> SessionResult<OrderRecord> {
        self.finalize_at(configurator, db, Utc::now())
    }

    /// [`finalize`](Self::finalize) with an explicit timestamp.
    pub fn finalize_at(
        &mut self,
        configurator: &KitConfigurator<'_>,
        db: &Database,
        now: DateTime<Utc>,
    ) -> SessionResult<OrderRecord> {
        let quoted = self.quote(configurator)?;
        let order_number = db.next_order_number(now.date_naive())?;

        let record = OrderRecord {
            record_id: Uuid::new_v4().to_string(),
            order_number,
            customer: self.customer.clone(),
            project: self.project.clone(),
            selection: quoted.selection,
            destination: self.destination.clone(),
            requirements: quoted.requirements,
            price: quoted.price,
            shipping: quoted.shipping,
            created_at: now.to_rfc3339(),
        };
        db.insert_order(&record)?;

        info!(
            order_number = %record.order_number,
            total = record.price.total,
            packages = record.requirements.package_count,
            estimated_shipping = record.shipping.is_estimate(),
            "order finalized"
        );

        self.reset();
        Ok(record)
    }

    /// Discard the in-progress order.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
