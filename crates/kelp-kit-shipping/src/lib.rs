//! Shipping rate providers for KELP sample kits.
//!
//! Both providers implement [`kelp_kit_core::ShippingRateProvider`]. Any
//! error they return is absorbed by the core's flat-rate fallback.
//!
//! - [`ZoneTableEstimator`]: offline estimate from postal-prefix distance
//! - [`CarrierRateProvider`]: JSON rate request over a pluggable transport
//! - [`DemoModeProvider`]: no carrier configured

pub mod carrier;
pub mod estimator;

pub use carrier::*;
pub use estimator::*;
