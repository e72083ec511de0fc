use crate::{
    auth::CurrentUser,
    dtos::billing::{
        AccountResponse, CheckoutRequestBody, CheckoutResponse, CheckoutReturnParams,
        CheckoutReturnResponse, WebhookResponse,
    },
    error::ApiResult,
    payments::{CheckoutRequest, GatewayEvent},
    state::AppState,
};
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
};
use database::{error::ServiceError, services::billing::BillingService};
use log::{debug, info};
use models::role::Role;

const SIGNATURE_HEADER: &str = "stripe-signature";

/// Registered courses, tuition statement and payment history of the calling student
#[utoipa::path(
    get,
    path = "/account",
    responses(
        (status = 200, description = "Account summary", body = AccountResponse),
        (status = 403, description = "Caller is not a student")
    ),
    security(("jwt" = [])),
    tag = "Billing"
)]
pub async fn account(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Json<AccountResponse>> {
    let summary = BillingService::account_summary(&state.db, &principal).await?;
    Ok(Json(summary.into()))
}

/// Open a hosted checkout for the full balance or part of it
#[utoipa::path(
    post,
    path = "/account/checkout",
    request_body = CheckoutRequestBody,
    responses(
        (status = 200, description = "Checkout session opened", body = CheckoutResponse),
        (status = 403, description = "Caller is not a student"),
        (status = 422, description = "No balance due or amount out of range"),
        (status = 502, description = "Payment processor unavailable")
    ),
    security(("jwt" = [])),
    tag = "Billing"
)]
pub async fn create_checkout(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(body): Json<CheckoutRequestBody>,
) -> ApiResult<Json<CheckoutResponse>> {
    principal.require(Role::Student)?;

    let statement = BillingService::statement(&state.db, &principal.user_id).await?;
    let amount_cents =
        BillingService::payment_quote(&statement, body.payment_type, body.amount_cents)
            .map_err(ServiceError::from)?;

    let base = &state.public_base_url;
    let session = state
        .payments
        .create_checkout(CheckoutRequest {
            student_id: principal.user_id.clone(),
            customer_email: principal.email.clone(),
            amount_cents,
            payment_type: body.payment_type,
            success_url: format!("{base}/account/checkout/success?session_id={{CHECKOUT_SESSION_ID}}"),
            cancel_url: format!("{base}/account/checkout/cancel"),
        })
        .await?;

    BillingService::record_pending(
        &state.db,
        &principal.user_id,
        amount_cents,
        body.payment_type,
        &session.id,
    )
    .await?;

    Ok(Json(CheckoutResponse {
        session_id: session.id,
        checkout_url: session.url,
        amount_cents,
    }))
}

/// Landing page after a successful checkout. Shows the balance without recording anything;
/// the payment is settled by the processor's signed notification.
#[utoipa::path(
    get,
    path = "/account/checkout/success",
    params(CheckoutReturnParams),
    responses(
        (status = 200, description = "Current balance", body = CheckoutReturnResponse),
        (status = 403, description = "Caller is not a student")
    ),
    security(("jwt" = [])),
    tag = "Billing"
)]
pub async fn checkout_success(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Query(params): Query<CheckoutReturnParams>,
) -> ApiResult<Json<CheckoutReturnResponse>> {
    principal.require(Role::Student)?;
    let statement = BillingService::statement(&state.db, &principal.user_id).await?;

    let message = match params.session_id {
        Some(session_id) => format!("Payment {session_id} is being processed."),
        None => "Payment is being processed.".to_string(),
    };
    Ok(Json(CheckoutReturnResponse {
        message,
        statement: statement.into(),
    }))
}

/// Landing page after an abandoned checkout
#[utoipa::path(
    get,
    path = "/account/checkout/cancel",
    responses(
        (status = 200, description = "Current balance", body = CheckoutReturnResponse),
        (status = 403, description = "Caller is not a student")
    ),
    security(("jwt" = [])),
    tag = "Billing"
)]
pub async fn checkout_cancel(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Json<CheckoutReturnResponse>> {
    principal.require(Role::Student)?;
    let statement = BillingService::statement(&state.db, &principal.user_id).await?;

    Ok(Json(CheckoutReturnResponse {
        message: "Payment was cancelled.".to_string(),
        statement: statement.into(),
    }))
}

/// Signed notification from the payment processor
#[utoipa::path(
    post,
    path = "/payments/webhook",
    request_body(content = String, content_type = "application/json"),
    responses(
        (status = 200, description = "Notification accepted", body = WebhookResponse),
        (status = 400, description = "Missing or invalid signature"),
        (status = 502, description = "Payments are not configured")
    ),
    tag = "Billing"
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookResponse>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match state.payments.verify_event(&body, signature)? {
        GatewayEvent::CheckoutCompleted {
            session_id,
            student_id,
            amount_cents,
            payment_type,
        } => {
            BillingService::record_payment(
                &state.db,
                &student_id,
                amount_cents,
                payment_type,
                Some(session_id.as_str()),
            )
            .await?;
        }
        GatewayEvent::CheckoutExpired { session_id } => {
            BillingService::fail_payment(&state.db, &session_id).await?;
        }
        GatewayEvent::Ignored(kind) => debug!("Ignoring payment event {kind}"),
    }

    info!("Processed payment notification");
    Ok(Json(WebhookResponse { received: true }))
}
