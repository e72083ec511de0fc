use crate::dtos::course::CourseResponse;
use chrono::{DateTime, Utc};
use database::{entities::payments, services::billing::AccountSummary};
use models::{
    payment::{PaymentStatus, PaymentType},
    tuition::{TuitionStatement, format_cents},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatementResponse {
    pub total_credits: i64,
    pub tuition_cents: i64,
    pub paid_cents: i64,
    /// Negative when overpaid
    pub balance_cents: i64,
    /// e.g. "$400.00"
    pub balance: String,
}

impl From<TuitionStatement> for StatementResponse {
    fn from(statement: TuitionStatement) -> Self {
        Self {
            total_credits: statement.total_credits,
            tuition_cents: statement.tuition_cents,
            paid_cents: statement.paid_cents,
            balance_cents: statement.balance_cents,
            balance: format_cents(statement.balance_cents),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub amount_cents: i64,
    #[schema(value_type = String)]
    pub payment_type: PaymentType,
    #[schema(value_type = String)]
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<payments::Model> for PaymentResponse {
    fn from(payment: payments::Model) -> Self {
        Self {
            id: payment.id,
            amount_cents: payment.amount_cents,
            payment_type: payment.payment_type,
            status: payment.status,
            created_at: payment.created_at,
            completed_at: payment.completed_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub courses: Vec<CourseResponse>,
    pub statement: StatementResponse,
    pub payments: Vec<PaymentResponse>,
}

impl From<AccountSummary> for AccountResponse {
    fn from(summary: AccountSummary) -> Self {
        Self {
            courses: summary.courses.into_iter().map(Into::into).collect(),
            statement: summary.statement.into(),
            payments: summary.payments.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutRequestBody {
    /// "full" or "partial"
    #[schema(value_type = String)]
    pub payment_type: PaymentType,
    /// Required for partial payments
    pub amount_cents: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutResponse {
    pub session_id: String,
    /// Hosted checkout page to redirect the student to
    pub checkout_url: String,
    pub amount_cents: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CheckoutReturnParams {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutReturnResponse {
    pub message: String,
    pub statement: StatementResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookResponse {
    pub received: bool,
}
