//! Carrier rate adapter.
//!
//! The adapter only speaks JSON bodies. Moving those bodies over HTTP (or
//! not at all, in tests) is the job of a [`RateTransport`].

use std::cell::RefCell;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use kelp_kit_core::models::ServiceLevel;
use kelp_kit_core::pricing::{
    RateQuote, ShippingError, ShippingRateProvider, ShippingRequest, ShippingResult,
};

/// Transport errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Carrier returned status {status}: {message}")]
    Status { status: u16, message: String },
}

/// Moves a JSON request body to the carrier and returns the reply body.
pub trait RateTransport {
    fn send(&self, body: &str, timeout: Duration) -> Result<String, TransportError>;
}

/// Rate request as sent to the carrier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CarrierRateRequest {
    pub account: String,
    pub origin_postal_code: String,
    pub destination_postal_code: String,
    pub destination_country: String,
    /// "ground" or "two_day"
    pub service: String,
    /// Cooler shipments need insulated handling
    pub insulated: bool,
    pub packages: Vec<CarrierPackage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CarrierPackage {
    pub weight_lb: f64,
}

/// Rate reply from the carrier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CarrierRateReply {
    pub total_charge: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub service_name: String,
    pub transit_days: Option<u32>,
}

fn default_currency() -> String {
    "USD".into()
}

impl CarrierRateRequest {
    pub fn from_request(account: &str, request: &ShippingRequest) -> Self {
        let (service, insulated) = match request.service_level {
            ServiceLevel::Standard => ("ground", false),
            ServiceLevel::Compliance => ("two_day", true),
        };
        Self {
            account: account.to_string(),
            origin_postal_code: request.origin.clone(),
            destination_postal_code: request.destination.postal_code.clone(),
            destination_country: request.destination.country.clone(),
            service: service.into(),
            insulated,
            packages: (0..request.package_count)
                .map(|_| CarrierPackage {
                    weight_lb: request.weight_per_package,
                })
                .collect(),
        }
    }
}

/// Parse a carrier reply, tolerating text around the JSON object.
pub fn parse_rate_reply(body: &str) -> ShippingResult<CarrierRateReply> {
    let json_start = body
        .find('{')
        .ok_or_else(|| ShippingError::InvalidResponse("No JSON object found in reply".into()))?;
    let json_end = body
        .rfind('}')
        .ok_or_else(|| ShippingError::InvalidResponse("No closing brace found in reply".into()))?;
    if json_end < json_start {
        return Err(ShippingError::InvalidResponse("Malformed JSON object in reply".into()));
    }

    serde_json::from_str(&body[json_start..=json_end])
        .map_err(|e| ShippingError::InvalidResponse(e.to_string()))
}

impl From<TransportError> for ShippingError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout(after) => ShippingError::Timeout(after),
            other => ShippingError::Unavailable(other.to_string()),
        }
    }
}

/// Quotes shipments through a carrier rate API.
pub struct CarrierRateProvider<T: RateTransport> {
    transport: T,
    account: String,
}

impl<T: RateTransport> CarrierRateProvider<T> {
    pub fn new(transport: T, account: impl Into<String>) -> Self {
        Self {
            transport,
            account: account.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: RateTransport> ShippingRateProvider for CarrierRateProvider<T> {
    fn quote(&self, request: &ShippingRequest) -> ShippingResult<RateQuote> {
        let body = serde_json::to_string(&CarrierRateRequest::from_request(&self.account, request))
            .map_err(|e| ShippingError::Unavailable(e.to_string()))?;

        debug!(
            destination = %request.destination.postal_code,
            service = %request.service_level,
            packages = request.package_count,
            "requesting carrier rate"
        );
        let reply = parse_rate_reply(&self.transport.send(&body, request.timeout)?)?;

        if reply.currency != "USD" {
            return Err(ShippingError::InvalidResponse(format!(
                "unexpected currency {}",
                reply.currency
            )));
        }

        let transit_estimate = match reply.transit_days {
            Some(1) => "1 business day".to_string(),
            Some(days) => format!("{days} business days"),
            None => "unknown".to_string(),
        };

        Ok(RateQuote {
            total_charge: reply.total_charge,
            service_name: reply.service_name,
            transit_estimate,
        })
    }
}

/// Provider used when no carrier account is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoModeProvider;

impl ShippingRateProvider for DemoModeProvider {
    fn quote(&self, _request: &ShippingRequest) -> ShippingResult<RateQuote> {
        Err(ShippingError::Unavailable(
            "demo mode: no carrier configured".into(),
        ))
    }
}

/// Canned transport for testing without a carrier.
pub struct MockTransport {
    reply: Result<String, TransportError>,
    sent: RefCell<Vec<String>>,
}

impl MockTransport {
    pub fn replying(body: impl Into<String>) -> Self {
        Self {
            reply: Ok(body.into()),
            sent: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(error: TransportError) -> Self {
        Self {
            reply: Err(error),
            sent: RefCell::new(Vec::new()),
        }
    }

    /// Request bodies sent so far.
    pub fn sent(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }
}

impl RateTransport for MockTransport {
    fn send(&self, body: &str, _timeout: Duration) -> Result<String, TransportError> {
        self.sent.borrow_mut().push(body.to_string());
        self.reply.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kelp_kit_core::models::Destination;

    fn request(level: ServiceLevel) -> ShippingRequest {
        ShippingRequest {
            origin: "94608".into(),
            destination: Destination::us("30301"),
            weight_per_package: 3.05,
            service_level: level,
            package_count: 2,
            timeout: Duration::from_millis(2500),
        }
    }

    #[test]
    fn test_request_body() {
        let provider = CarrierRateProvider::new(
            MockTransport::replying(r#"{"total_charge": 21.4, "service_name": "Ground", "transit_days": 3}"#),
            "ACCT-1",
        );
        provider.quote(&request(ServiceLevel::Compliance)).unwrap();

        let sent = provider.transport().sent();
        assert_eq!(sent.len(), 1);
        let body: CarrierRateRequest = serde_json::from_str(&sent[0]).unwrap();
        assert_eq!(body.account, "ACCT-1");
        assert_eq!(body.service, "two_day");
        assert!(body.insulated);
        assert_eq!(body.packages.len(), 2);
        assert_eq!(body.packages[0].weight_lb, 3.05);
    }

    #[test]
    fn test_quote_from_reply() {
        let provider = CarrierRateProvider::new(
            MockTransport::replying(r#"{"total_charge": 21.4, "service_name": "Ground", "transit_days": 3}"#),
            "ACCT-1",
        );
        let quote = provider.quote(&request(ServiceLevel::Standard)).unwrap();
        assert_eq!(quote.total_charge, 21.4);
        assert_eq!(quote.service_name, "Ground");
        assert_eq!(quote.transit_estimate, "3 business days");
    }

    #[test]
    fn test_parse_reply_with_prose() {
        let body = "Rate follows:\n{\"total_charge\": 9.0, \"service_name\": \"Ground\", \"transit_days\": 1}\nthanks";
        let reply = parse_rate_reply(body).unwrap();
        assert_eq!(reply.total_charge, 9.0);
        assert_eq!(reply.currency, "USD");
    }

    #[test]
    fn test_parse_reply_garbage() {
        assert!(matches!(
            parse_rate_reply("service unavailable"),
            Err(ShippingError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_rate_reply("} nope {"),
            Err(ShippingError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_rate_reply(r#"{"total_charge": "lots"}"#),
            Err(ShippingError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_foreign_currency_rejected() {
        let provider = CarrierRateProvider::new(
            MockTransport::replying(r#"{"total_charge": 30, "currency": "CAD", "service_name": "Ground", "transit_days": null}"#),
            "ACCT-1",
        );
        assert!(matches!(
            provider.quote(&request(ServiceLevel::Standard)),
            Err(ShippingError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_transport_errors_map() {
        let timeout = CarrierRateProvider::new(
            MockTransport::failing(TransportError::Timeout(Duration::from_millis(2500))),
            "ACCT-1",
        );
        assert_eq!(
            timeout.quote(&request(ServiceLevel::Standard)),
            Err(ShippingError::Timeout(Duration::from_millis(2500)))
        );

        let down = CarrierRateProvider::new(
            MockTransport::failing(TransportError::Status {
                status: 503,
                message: "maintenance".into(),
            }),
            "ACCT-1",
        );
        assert!(matches!(
            down.quote(&request(ServiceLevel::Standard)),
            Err(ShippingError::Unavailable(msg)) if msg.contains("503")
        ));
    }

    #[test]
    fn test_demo_mode_unavailable() {
        assert!(matches!(
            DemoModeProvider.quote(&request(ServiceLevel::Standard)),
            Err(ShippingError::Unavailable(_))
        ));
    }
}
