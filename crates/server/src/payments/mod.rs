//! Hosted checkout through an external payment processor.

pub mod signature;
pub mod stripe;

use futures::future::BoxFuture;
use models::payment::PaymentType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payments are not configured")]
    NotConfigured,

    #[error("payment processor request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("payment processor rejected the request: {0}")]
    Rejected(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(&'static str),

    #[error("invalid event payload: {0}")]
    InvalidPayload(String),
}

/// A checkout session to open for one student
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub student_id: String,
    pub customer_email: String,
    pub amount_cents: i64,
    pub payment_type: PaymentType,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted page the student is sent to
    pub url: String,
}

/// A verified notification from the processor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    CheckoutCompleted {
        session_id: String,
        student_id: String,
        amount_cents: i64,
        payment_type: PaymentType,
    },
    CheckoutExpired {
        session_id: String,
    },
    /// Event types the service does not act on
    Ignored(String),
}

pub trait PaymentGateway: Send + Sync {
    fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> BoxFuture<'_, Result<CheckoutSession, GatewayError>>;

    /// Checks the signature header against the raw payload and decodes the event
    fn verify_event(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<GatewayEvent, GatewayError>;
}
