use crate::{
    access::Principal,
    entities::{courses, payments},
    error::{ServiceError, ServiceResult, is_unique_violation},
    services::registration::RegistrationService,
};
use chrono::Utc;
use log::info;
use models::{
    payment::{PaymentStatus, PaymentType},
    role::Role,
    tuition::{TuitionStatement, format_cents},
    validation::FieldError,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use uuid::Uuid;

/// Everything shown on a student's account page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub courses: Vec<courses::Model>,
    pub statement: TuitionStatement,
    pub payments: Vec<payments::Model>,
}

pub struct BillingService;

impl BillingService {
    /// Tuition for every registered credit minus completed payments
    pub async fn statement<C: ConnectionTrait>(
        db: &C,
        student_id: &str,
    ) -> Result<TuitionStatement, DbErr> {
        let courses = RegistrationService::registered_courses(db, student_id).await?;
        let payments = Self::payments_for(db, student_id).await?;
        Ok(Self::tally(&courses, &payments))
    }

    pub async fn account_summary(
        db: &DatabaseConnection,
        principal: &Principal,
    ) -> ServiceResult<AccountSummary> {
        principal.require(Role::Student)?;
        let student_id = principal.user_id.as_str();

        let courses = RegistrationService::registered_courses(db, student_id).await?;
        let payments = Self::payments_for(db, student_id).await?;

        Ok(AccountSummary {
            statement: Self::tally(&courses, &payments),
            courses,
            payments,
        })
    }

    /// Amount to charge for a checkout. A full payment clears the balance; a
    /// partial one must be positive and no more than the balance.
    pub fn payment_quote(
        statement: &TuitionStatement,
        payment_type: PaymentType,
        requested_cents: Option<i64>,
    ) -> Result<i64, FieldError> {
        let balance = statement.balance_cents;
        if balance <= 0 {
            return Err(FieldError::new("amount", "There is no balance due."));
        }

        match payment_type {
            PaymentType::Full => Ok(balance),
            PaymentType::Partial => match requested_cents {
                Some(amount) if amount > 0 && amount <= balance => Ok(amount),
                _ => Err(FieldError::new(
                    "amount",
                    format!(
                        "Amount must be between {} and {}",
                        format_cents(1),
                        format_cents(balance)
                    ),
                )),
            },
        }
    }

    /// Records a checkout the processor has opened but not yet settled
    pub async fn record_pending(
        db: &DatabaseConnection,
        student_id: &str,
        amount_cents: i64,
        payment_type: PaymentType,
        session_id: &str,
    ) -> ServiceResult<payments::Model> {
        let payment = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student_id.to_string()),
            amount_cents: Set(amount_cents),
            payment_type: Set(payment_type),
            external_session_id: Set(Some(session_id.to_string())),
            status: Set(PaymentStatus::Pending),
            notes: Set(None),
            created_at: Set(Utc::now()),
            completed_at: Set(None),
        }
        .insert(db)
        .await?;

        info!(
            "Opened {} checkout {} for {} ({})",
            payment_type,
            session_id,
            student_id,
            format_cents(amount_cents)
        );
        Ok(payment)
    }

    /// Records a completed payment. Repeated calls with the same session id
    /// settle the same row once.
    pub async fn record_payment(
        db: &DatabaseConnection,
        student_id: &str,
        amount_cents: i64,
        payment_type: PaymentType,
        session_id: Option<&str>,
    ) -> ServiceResult<payments::Model> {
        if amount_cents <= 0 {
            return Err(ServiceError::validation(
                "amount",
                "Payment amount must be greater than zero",
            ));
        }

        if let Some(session_id) = session_id
            && let Some(existing) = Self::find_by_session(db, session_id).await?
        {
            return Self::complete(db, existing, student_id, amount_cents).await;
        }

        let payment = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student_id.to_string()),
            amount_cents: Set(amount_cents),
            payment_type: Set(payment_type),
            external_session_id: Set(session_id.map(str::to_string)),
            status: Set(PaymentStatus::Completed),
            notes: Set(None),
            created_at: Set(Utc::now()),
            completed_at: Set(Some(Utc::now())),
        };

        match payment.insert(db).await {
            Ok(payment) => {
                info!(
                    "Recorded {} payment of {} for {}",
                    payment_type,
                    format_cents(amount_cents),
                    student_id
                );
                Ok(payment)
            }
            // Another confirmation for the same session won the insert
            Err(err) if is_unique_violation(&err) => {
                let session_id = session_id.unwrap_or_default();
                let existing = Self::find_by_session(db, session_id)
                    .await?
                    .ok_or(err)?;
                Self::complete(db, existing, student_id, amount_cents).await
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Marks a pending checkout as failed; completed rows are left alone
    pub async fn fail_payment(
        db: &DatabaseConnection,
        session_id: &str,
    ) -> ServiceResult<Option<payments::Model>> {
        let Some(payment) = Self::find_by_session(db, session_id).await? else {
            return Ok(None);
        };
        if payment.status != PaymentStatus::Pending {
            return Ok(Some(payment));
        }

        let mut payment: payments::ActiveModel = payment.into();
        payment.status = Set(PaymentStatus::Failed);
        let payment = payment.update(db).await?;

        info!("Checkout {session_id} failed for {}", payment.student_id);
        Ok(Some(payment))
    }

    pub async fn find_by_session<C: ConnectionTrait>(
        db: &C,
        session_id: &str,
    ) -> Result<Option<payments::Model>, DbErr> {
        payments::Entity::find()
            .filter(payments::Column::ExternalSessionId.eq(session_id))
            .one(db)
            .await
    }

    /// Newest first
    async fn payments_for<C: ConnectionTrait>(
        db: &C,
        student_id: &str,
    ) -> Result<Vec<payments::Model>, DbErr> {
        payments::Entity::find()
            .filter(payments::Column::StudentId.eq(student_id))
            .order_by_desc(payments::Column::CreatedAt)
            .all(db)
            .await
    }

    // Summed here so the result type does not depend on the backend's SUM
    fn tally(courses: &[courses::Model], payments: &[payments::Model]) -> TuitionStatement {
        let total_credits = courses.iter().map(|c| i64::from(c.credit_hours)).sum();
        let paid_cents = payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Completed)
            .map(|p| p.amount_cents)
            .sum();

        TuitionStatement::new(total_credits, paid_cents)
    }

    async fn complete(
        db: &DatabaseConnection,
        existing: payments::Model,
        student_id: &str,
        amount_cents: i64,
    ) -> ServiceResult<payments::Model> {
        if existing.status == PaymentStatus::Completed {
            return Ok(existing);
        }
        if existing.student_id != student_id {
            return Err(ServiceError::conflict(
                "Payment session belongs to a different student",
            ));
        }

        let mut payment: payments::ActiveModel = existing.into();
        payment.amount_cents = Set(amount_cents);
        payment.status = Set(PaymentStatus::Completed);
        payment.completed_at = Set(Some(Utc::now()));
        let payment = payment.update(db).await?;

        info!(
            "Settled checkout {} for {} ({})",
            payment.external_session_id.as_deref().unwrap_or_default(),
            student_id,
            format_cents(amount_cents)
        );
        Ok(payment)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{course_draft, create_course, setup_db, student};
    use models::validation::CourseDraft;
    use sea_orm::PaginatorTrait;

    async fn registered_for(db: &DatabaseConnection, credits: &[i32]) -> Principal {
        let alice = student(1);
        for (i, credit_hours) in credits.iter().enumerate() {
            let course = create_course(
                db,
                CourseDraft {
                    credit_hours: *credit_hours,
                    ..course_draft("HIST", 100 + i as i32, "History")
                },
            )
            .await;
            RegistrationService::toggle(db, &alice, course.id)
                .await
                .unwrap();
        }
        alice
    }

    #[tokio::test]
    async fn test_payment_reduces_balance_exactly() {
        let db = setup_db().await;
        let alice = registered_for(&db, &[3, 4]).await;

        let before = BillingService::statement(&db, &alice.user_id).await.unwrap();
        assert_eq!(before.total_credits, 7);
        assert_eq!(before.balance_cents, 700_00);

        BillingService::record_payment(&db, &alice.user_id, 50_00, PaymentType::Partial, None)
            .await
            .unwrap();

        let after = BillingService::statement(&db, &alice.user_id).await.unwrap();
        assert_eq!(before.balance_cents - after.balance_cents, 50_00);
    }

    #[tokio::test]
    async fn test_only_completed_payments_count() {
        let db = setup_db().await;
        let alice = registered_for(&db, &[3]).await;

        BillingService::record_pending(&db, &alice.user_id, 100_00, PaymentType::Partial, "cs_1")
            .await
            .unwrap();
        BillingService::record_pending(&db, &alice.user_id, 100_00, PaymentType::Partial, "cs_2")
            .await
            .unwrap();
        BillingService::fail_payment(&db, "cs_2").await.unwrap();

        let summary = BillingService::account_summary(&db, &alice).await.unwrap();
        assert_eq!(summary.statement.paid_cents, 0);
        assert_eq!(summary.payments.len(), 2);
        assert_eq!(summary.courses.len(), 1);
    }

    #[tokio::test]
    async fn test_confirmation_is_idempotent_per_session() {
        let db = setup_db().await;
        let alice = registered_for(&db, &[3]).await;
        BillingService::record_pending(&db, &alice.user_id, 300_00, PaymentType::Full, "cs_1")
            .await
            .unwrap();

        for _ in 0..2 {
            let payment = BillingService::record_payment(
                &db,
                &alice.user_id,
                300_00,
                PaymentType::Full,
                Some("cs_1"),
            )
            .await
            .unwrap();
            assert_eq!(payment.status, PaymentStatus::Completed);
        }

        assert_eq!(payments::Entity::find().count(&db).await.unwrap(), 1);
        let statement = BillingService::statement(&db, &alice.user_id).await.unwrap();
        assert_eq!(statement.balance_cents, 0);
    }

    #[tokio::test]
    async fn test_account_summary_matches_statement() {
        let db = setup_db().await;
        let alice = registered_for(&db, &[3, 2]).await;
        BillingService::record_payment(&db, &alice.user_id, 120_00, PaymentType::Partial, None)
            .await
            .unwrap();
        BillingService::record_pending(&db, &alice.user_id, 80_00, PaymentType::Partial, "cs_9")
            .await
            .unwrap();

        let summary = BillingService::account_summary(&db, &alice).await.unwrap();
        let statement = BillingService::statement(&db, &alice.user_id).await.unwrap();
        assert_eq!(summary.statement, statement);
        assert_eq!(statement.total_credits, 5);
        assert_eq!(statement.paid_cents, 120_00);
        assert_eq!(statement.balance_cents, 380_00);
    }

    #[tokio::test]
    async fn test_overpayment_goes_negative() {
        let db = setup_db().await;
        let alice = registered_for(&db, &[1]).await;
        BillingService::record_payment(&db, &alice.user_id, 150_00, PaymentType::Full, None)
            .await
            .unwrap();

        let statement = BillingService::statement(&db, &alice.user_id).await.unwrap();
        assert_eq!(statement.balance_cents, -50_00);
    }

    #[test]
    fn test_payment_quote() {
        let statement = TuitionStatement::new(3, 0);
        assert_eq!(
            BillingService::payment_quote(&statement, PaymentType::Full, None),
            Ok(300_00)
        );
        assert_eq!(
            BillingService::payment_quote(&statement, PaymentType::Partial, Some(25_00)),
            Ok(25_00)
        );
        assert!(BillingService::payment_quote(&statement, PaymentType::Partial, Some(0)).is_err());
        assert!(
            BillingService::payment_quote(&statement, PaymentType::Partial, Some(300_01)).is_err()
        );

        let settled = TuitionStatement::new(3, 300_00);
        let err = BillingService::payment_quote(&settled, PaymentType::Full, None).unwrap_err();
        assert_eq!(err.field, "amount");
    }
}
