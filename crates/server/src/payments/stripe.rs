use super::{
    CheckoutRequest, CheckoutSession, GatewayError, GatewayEvent, PaymentGateway, signature,
};
use chrono::Utc;
use futures::future::BoxFuture;
use log::{info, warn};
use models::{payment::PaymentType, tuition::format_cents};
use serde::Deserialize;
use std::{collections::HashMap, str::FromStr};

const API_BASE: &str = "https://api.stripe.com/v1";

/// Stripe Checkout over its form-encoded REST API
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: Option<String>,
    webhook_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Event {
    #[serde(rename = "type")]
    kind: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: SessionObject,
}

#[derive(Debug, Deserialize)]
struct SessionObject {
    id: String,
    amount_total: Option<i64>,
    payment_status: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

impl StripeGateway {
    pub fn new(secret_key: Option<String>, webhook_secret: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key,
            webhook_secret,
        }
    }

    fn checkout_form(request: &CheckoutRequest) -> Vec<(&'static str, String)> {
        vec![
            ("mode", "payment".to_string()),
            ("success_url", request.success_url.clone()),
            ("cancel_url", request.cancel_url.clone()),
            ("customer_email", request.customer_email.clone()),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", "usd".to_string()),
            (
                "line_items[0][price_data][unit_amount]",
                request.amount_cents.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                format!("Tuition payment ({})", request.payment_type),
            ),
            ("metadata[student_id]", request.student_id.clone()),
            ("metadata[payment_type]", request.payment_type.to_string()),
            ("metadata[amount]", request.amount_cents.to_string()),
        ]
    }

    fn parse_event(payload: &[u8]) -> Result<GatewayEvent, GatewayError> {
        let event: Event = serde_json::from_slice(payload)
            .map_err(|err| GatewayError::InvalidPayload(err.to_string()))?;
        let session = event.data.object;

        match event.kind.as_str() {
            "checkout.session.completed" | "checkout.session.async_payment_succeeded" => {
                if session.payment_status.as_deref() != Some("paid") {
                    return Ok(GatewayEvent::Ignored(format!(
                        "{} for unpaid session {}",
                        event.kind, session.id
                    )));
                }

                let metadata = |key: &str| {
                    session.metadata.get(key).cloned().ok_or_else(|| {
                        GatewayError::InvalidPayload(format!("session metadata lacks {key}"))
                    })
                };
                let student_id = metadata("student_id")?;
                let payment_type = PaymentType::from_str(&metadata("payment_type")?)
                    .map_err(|err| GatewayError::InvalidPayload(err.to_string()))?;
                let amount_cents = match session.amount_total {
                    Some(amount) => amount,
                    None => metadata("amount")?
                        .parse()
                        .map_err(|_| GatewayError::InvalidPayload("bad amount".to_string()))?,
                };

                Ok(GatewayEvent::CheckoutCompleted {
                    session_id: session.id,
                    student_id,
                    amount_cents,
                    payment_type,
                })
            }
            "checkout.session.expired" | "checkout.session.async_payment_failed" => {
                Ok(GatewayEvent::CheckoutExpired {
                    session_id: session.id,
                })
            }
            _ => Ok(GatewayEvent::Ignored(event.kind)),
        }
    }
}

impl PaymentGateway for StripeGateway {
    fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> BoxFuture<'_, Result<CheckoutSession, GatewayError>> {
        Box::pin(async move {
            let secret_key = self
                .secret_key
                .as_deref()
                .ok_or(GatewayError::NotConfigured)?;

            let response = self
                .client
                .post(format!("{API_BASE}/checkout/sessions"))
                .bearer_auth(secret_key)
                .form(&Self::checkout_form(&request))
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let message = response
                    .json::<ErrorResponse>()
                    .await
                    .ok()
                    .and_then(|body| body.error.message)
                    .unwrap_or_else(|| status.to_string());
                warn!("Checkout creation for {} failed: {message}", request.student_id);
                return Err(GatewayError::Rejected(message));
            }

            let session: SessionResponse = response.json().await?;
            let url = session
                .url
                .ok_or_else(|| GatewayError::Rejected("session has no checkout url".to_string()))?;

            info!(
                "Created checkout session {} for {} ({})",
                session.id,
                request.student_id,
                format_cents(request.amount_cents)
            );
            Ok(CheckoutSession {
                id: session.id,
                url,
            })
        })
    }

    fn verify_event(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<GatewayEvent, GatewayError> {
        let secret = self
            .webhook_secret
            .as_deref()
            .ok_or(GatewayError::NotConfigured)?;
        let header =
            signature_header.ok_or(GatewayError::InvalidSignature("missing signature header"))?;

        signature::verify(secret, payload, header, Utc::now().timestamp())?;
        Self::parse_event(payload)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SECRET: &str = "whsec_test";

    fn completed_event() -> Vec<u8> {
        serde_json::json!({
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_1",
                    "amount_total": 30000,
                    "payment_status": "paid",
                    "metadata": {
                        "student_id": "student-1",
                        "payment_type": "full",
                        "amount": "30000"
                    }
                }
            }
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_verified_completed_event() {
        let gateway = StripeGateway::new(None, Some(SECRET.to_string()));
        let payload = completed_event();
        let header = signature::sign(SECRET, &payload, Utc::now().timestamp()).unwrap();

        let event = gateway.verify_event(&payload, Some(&header)).unwrap();
        assert_eq!(
            event,
            GatewayEvent::CheckoutCompleted {
                session_id: "cs_test_1".to_string(),
                student_id: "student-1".to_string(),
                amount_cents: 300_00,
                payment_type: PaymentType::Full,
            }
        );
    }

    #[test]
    fn test_unsigned_event_rejected() {
        let gateway = StripeGateway::new(None, Some(SECRET.to_string()));
        let err = gateway.verify_event(&completed_event(), None).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidSignature(_)));

        let unconfigured = StripeGateway::new(None, None);
        let err = unconfigured
            .verify_event(&completed_event(), Some("t=1,v1=00"))
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotConfigured));
    }

    #[test]
    fn test_other_events() {
        let expired = br#"{"type":"checkout.session.expired","data":{"object":{"id":"cs_2"}}}"#;
        assert_eq!(
            StripeGateway::parse_event(expired).unwrap(),
            GatewayEvent::CheckoutExpired {
                session_id: "cs_2".to_string()
            }
        );

        let refund = br#"{"type":"charge.refunded","data":{"object":{"id":"ch_1"}}}"#;
        assert!(matches!(
            StripeGateway::parse_event(refund).unwrap(),
            GatewayEvent::Ignored(_)
        ));
    }

    #[test]
    fn test_checkout_form_carries_metadata() {
        let form = StripeGateway::checkout_form(&CheckoutRequest {
            student_id: "student-1".to_string(),
            customer_email: "s1@school.edu".to_string(),
            amount_cents: 125_50,
            payment_type: PaymentType::Partial,
            success_url: "http://localhost:3000/account/checkout/success".to_string(),
            cancel_url: "http://localhost:3000/account/checkout/cancel".to_string(),
        });
        let field = |name: &str| {
            form.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.as_str())
        };

        assert_eq!(field("line_items[0][price_data][unit_amount]"), Some("12550"));
        assert_eq!(field("metadata[payment_type]"), Some("partial"));
        assert_eq!(field("customer_email"), Some("s1@school.edu"));
    }
}
