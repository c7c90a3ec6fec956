//! Shipping providers plugged into the core configurator.

use std::time::Duration;

use proptest::prelude::*;

use kelp_kit_core::catalog::Catalog;
use kelp_kit_core::config::KitConfig;
use kelp_kit_core::configurator::KitConfigurator;
use kelp_kit_core::models::{Destination, ShippingSource};
use kelp_kit_shipping::{
    CarrierRateProvider, DemoModeProvider, MockTransport, TransportError, ZoneTableEstimator,
};

#[test]
fn test_zone_estimate_is_live() {
    let catalog = Catalog::kelp();
    let config = KitConfig::default();
    let estimator = ZoneTableEstimator::from_catalog(&catalog).unwrap();
    let configurator = KitConfigurator::new(&catalog, &config).with_provider(&estimator);

    let quoted = configurator
        .quote_custom(["microbiology"], false, Some(&Destination::us("94110")))
        .unwrap();

    // one package of 1.8 lb at zone 2: 8.00 + 0.75 * 1.8
    assert_eq!(quoted.shipping.source, ShippingSource::Live);
    assert_eq!(quoted.shipping.service_name, "Ground (Zone 2)");
    assert!((quoted.shipping.total - 9.35).abs() < 1e-9);
    assert!((quoted.price.total - 21.35).abs() < 1e-9);
}

#[test]
fn test_carrier_reply_used() {
    let catalog = Catalog::kelp();
    let config = KitConfig::default();
    let provider = CarrierRateProvider::new(
        MockTransport::replying(
            r#"{"total_charge": 33.1, "service_name": "Carrier 2Day", "transit_days": 2}"#,
        ),
        "ACCT-1",
    );
    let configurator = KitConfigurator::new(&catalog, &config).with_provider(&provider);

    let quoted = configurator
        .quote_bundle("KELP-DW-ESSENTIAL", true, Some(&Destination::us("30301")))
        .unwrap();

    assert_eq!(quoted.shipping.service_name, "Carrier 2Day");
    assert!((quoted.price.total - 182.1).abs() < 1e-9);
    assert_eq!(provider.transport().sent().len(), 1);
}

#[test]
fn test_carrier_timeout_falls_back() {
    let catalog = Catalog::kelp();
    let config = KitConfig::default();
    let provider = CarrierRateProvider::new(
        MockTransport::failing(TransportError::Timeout(Duration::from_secs(10))),
        "ACCT-1",
    );
    let configurator = KitConfigurator::new(&catalog, &config).with_provider(&provider);

    let quoted = configurator
        .quote_custom(["pfas"], true, Some(&Destination::us("30301")))
        .unwrap();

    assert!(quoted.shipping.is_estimate());
    assert_eq!(quoted.shipping.total, 50.0);
}

#[test]
fn test_negative_carrier_charge_falls_back() {
    let catalog = Catalog::kelp();
    let config = KitConfig::default();
    let provider = CarrierRateProvider::new(
        MockTransport::replying(r#"{"total_charge": -4.0, "service_name": "Ground", "transit_days": 3}"#),
        "ACCT-1",
    );
    let configurator = KitConfigurator::new(&catalog, &config).with_provider(&provider);

    let quoted = configurator
        .quote_custom(["metals"], false, Some(&Destination::us("30301")))
        .unwrap();

    assert!(quoted.shipping.is_estimate());
    assert_eq!(quoted.shipping.total, 8.0);
}

#[test]
fn test_demo_mode_falls_back() {
    let catalog = Catalog::kelp();
    let config = KitConfig::default();
    let configurator = KitConfigurator::new(&catalog, &config).with_provider(&DemoModeProvider);

    let quoted = configurator
        .quote_bundle("KELP-DW-COMPLETE", false, Some(&Destination::us("30301")))
        .unwrap();

    assert!(quoted.shipping.is_estimate());
    assert_eq!(quoted.price.total, 249.0 + 16.0);
}

proptest! {
    /// Zone estimates never drop below the flat per-package base
    #[test]
    fn zone_estimate_at_least_base(zip in 10000u32..99999, compliance in any::<bool>()) {
        let catalog = Catalog::kelp();
        let config = KitConfig::default();
        let estimator = ZoneTableEstimator::from_catalog(&catalog).unwrap();
        let configurator = KitConfigurator::new(&catalog, &config).with_provider(&estimator);

        let destination = Destination::us(zip.to_string());
        let quoted = configurator
            .quote_custom(["general_chemistry", "nutrients", "pfas"], compliance, Some(&destination))
            .unwrap();

        let base = if compliance { 50.0 } else { 8.0 };
        prop_assert_eq!(quoted.shipping.source, ShippingSource::Live);
        prop_assert!(quoted.shipping.total >= base * quoted.requirements.package_count as f64);
    }
}
