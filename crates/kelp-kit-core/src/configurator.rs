//! End-to-end quoting: selection → requirements → shipping → price.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::config::KitConfig;
use crate::engine::KitEngine;
use crate::models::{
    Destination, KitRequirements, OrderSelection, PriceBreakdown, Selection, ShippingCharge,
};
use crate::pricing::{PriceCalculator, PricingResult, ShippingEstimator, ShippingRateProvider};

/// A derived and priced kit, ready for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuotedKit {
    pub selection: OrderSelection,
    pub requirements: KitRequirements,
    pub shipping: ShippingCharge,
    pub price: PriceBreakdown,
}

/// Coordinates the engine, shipping estimator and price calculator.
pub struct KitConfigurator<'a> {
    catalog: &'a Catalog,
    config: &'a KitConfig,
    provider: Option<&'a dyn ShippingRateProvider>,
}

impl<'a> KitConfigurator<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a KitConfig) -> Self {
        Self {
            catalog,
            config,
            provider: None,
        }
    }

    /// Use a live rate provider instead of flat-rate estimates.
    pub fn with_provider(mut self, provider: &'a dyn ShippingRateProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Derive and price an order.
    pub fn quote(
        &self,
        selection: &OrderSelection,
        destination: Option<&Destination>,
    ) -> PricingResult<QuotedKit> {
        self.config.validate()?;
        let requirements = KitEngine::new(self.catalog).compute_for_selection(selection)?;

        let mut estimator = ShippingEstimator::new(self.catalog, &self.config.shipping);
        if let Some(provider) = self.provider {
            estimator = estimator.with_provider(provider);
        }
        let shipping = estimator.charge(&requirements, destination);

        let calculator = PriceCalculator::new(self.catalog, &self.config.pricing);
        let price = match &selection.selection {
            Selection::Modules { .. } => calculator.price_custom(&requirements, shipping.total)?,
            Selection::Bundle { sku } => {
                let bundle = self.catalog.get_bundle(sku)?;
                calculator.price_bundle(bundle, shipping.total)?
            }
        };

        Ok(QuotedKit {
            selection: selection.clone(),
            requirements,
            shipping,
            price,
        })
    }

    /// Quote a custom module selection.
    pub fn quote_custom<I, S>(
        &self,
        module_ids: I,
        compliance_shipping: bool,
        destination: Option<&Destination>,
    ) -> PricingResult<QuotedKit>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.quote(&OrderSelection::modules(module_ids, compliance_shipping), destination)
    }

    /// Quote a bundle.
    pub fn quote_bundle(
        &self,
        sku: &str,
        compliance_shipping: bool,
        destination: Option<&Destination>,
    ) -> PricingResult<QuotedKit> {
        self.quote(&OrderSelection::bundle(sku, compliance_shipping), destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;
    use crate::models::ShippingSource;
    use crate::pricing::{PricingError, RateQuote, ShippingRequest, ShippingResult};

    struct PerPound(f64);

    impl ShippingRateProvider for PerPound {
        fn quote(&self, request: &ShippingRequest) -> ShippingResult<RateQuote> {
            Ok(RateQuote {
                total_charge: self.0 * request.weight_per_package * request.package_count as f64,
                service_name: "Test Ground".into(),
                transit_estimate: "1 day".into(),
            })
        }
    }

    #[test]
    fn test_quote_custom_fallback() {
        let catalog = Catalog::kelp();
        let config = KitConfig::default();
        let configurator = KitConfigurator::new(&catalog, &config);

        let quoted = configurator
            .quote_custom(["general_chemistry", "anions"], false, None)
            .unwrap();

        assert!(quoted.requirements.sharing_active);
        assert_eq!(quoted.shipping.source, ShippingSource::Estimated);
        assert_eq!(quoted.price.shipping_cost, 8.0);
        assert!((quoted.price.total - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_quote_bundle_with_provider() {
        let catalog = Catalog::kelp();
        let config = KitConfig::default();
        let provider = PerPound(2.0);
        let configurator = KitConfigurator::new(&catalog, &config).with_provider(&provider);

        let quoted = configurator
            .quote_bundle("KELP-DW-COMPLETE", false, Some(&Destination::us("30301")))
            .unwrap();

        // 4 bottles -> 2 packages, 1.5*2 + 0.6+0.6+0.5+1.1+0.3 = 6.1 lb
        assert_eq!(quoted.requirements.package_count, 2);
        assert_eq!(quoted.shipping.source, ShippingSource::Live);
        assert!((quoted.shipping.total - 12.2).abs() < 1e-9);
        assert_eq!(quoted.price.material_cost, 249.0);
        assert!((quoted.price.total - 261.2).abs() < 1e-9);
    }

    #[test]
    fn test_empty_custom_selection() {
        let catalog = Catalog::kelp();
        let config = KitConfig::default();
        let configurator = KitConfigurator::new(&catalog, &config);

        let empty: Vec<String> = Vec::new();
        let err = configurator.quote_custom(empty, false, None).unwrap_err();
        assert_eq!(err, PricingError::Engine(EngineError::EmptySelection));
    }

    #[test]
    fn test_unknown_bundle() {
        let catalog = Catalog::kelp();
        let config = KitConfig::default();
        let configurator = KitConfigurator::new(&catalog, &config);

        assert!(configurator.quote_bundle("KELP-NOPE", false, None).is_err());
    }

    #[test]
    fn test_quote_rejects_negative_fallback_rate() {
        let catalog = Catalog::kelp();
        let mut config = KitConfig::default();
        config.shipping.standard_rate_per_package = -5.0;
        let configurator = KitConfigurator::new(&catalog, &config);

        let err = configurator
            .quote_custom(["metals"], false, None)
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidConfig(_)));
    }
}
