use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::{
    entities::payments::InsertPaymentEntity,
    repositories::{payments::PaymentRepository, plans::PlanRepository},
    value_objects::payments::{
        PaymentModel, PaymentSubmitOutcome, PaymentVerifyOutcome, SubmitPaymentModel,
    },
};
use crate::usecases::{clock::Clock, notifier::Notifier};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("plan not found")]
    PlanNotFound,
    #[error("payment not found")]
    PaymentNotFound,
    #[error("user already has a payment awaiting verification")]
    PendingPaymentExists,
    #[error("user already has an active subscription")]
    ActiveSubscriptionExists,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PaymentError::PlanNotFound | PaymentError::PaymentNotFound => StatusCode::NOT_FOUND,
            PaymentError::PendingPaymentExists | PaymentError::ActiveSubscriptionExists => {
                StatusCode::CONFLICT
            }
            PaymentError::Validation(_) => StatusCode::BAD_REQUEST,
            PaymentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type PaymentResult<T> = std::result::Result<T, PaymentError>;

pub struct PaymentUseCase<Pay, P>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    payment_repo: Arc<Pay>,
    plan_repo: Arc<P>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
}

impl<Pay, P> PaymentUseCase<Pay, P>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    pub fn new(
        payment_repo: Arc<Pay>,
        plan_repo: Arc<P>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            payment_repo,
            plan_repo,
            clock,
            notifier,
        }
    }

    pub async fn submit_payment(
        &self,
        submit_payment_model: SubmitPaymentModel,
    ) -> PaymentResult<PaymentModel> {
        if submit_payment_model.proof_url.trim().is_empty() {
            return Err(PaymentError::Validation(
                "payment proof is required".to_string(),
            ));
        }

        let plan = self
            .plan_repo
            .find_by_id(submit_payment_model.plan_id)
            .await
            .map_err(|err| {
                error!(
                    plan_id = submit_payment_model.plan_id,
                    db_error = ?err,
                    "payments: failed to load plan for submission"
                );
                PaymentError::Internal(err)
            })?
            .ok_or(PaymentError::PlanNotFound)?;

        if !plan.is_active {
            return Err(PaymentError::Validation(
                "plan is not open for new purchases".to_string(),
            ));
        }

        let outcome = self
            .payment_repo
            .submit(
                InsertPaymentEntity {
                    user_id: submit_payment_model.user_id,
                    plan_id: Some(plan.id),
                    proof_url: submit_payment_model.proof_url,
                },
                self.clock.today(),
            )
            .await
            .map_err(|err| {
                error!(
                    user_id = %submit_payment_model.user_id,
                    db_error = ?err,
                    "payments: failed to record submission"
                );
                PaymentError::Internal(err)
            })?;

        match outcome {
            PaymentSubmitOutcome::Submitted(payment) => {
                info!(
                    payment_id = payment.id,
                    user_id = %payment.user_id,
                    plan_id = plan.id,
                    "payments: proof submitted, awaiting verification"
                );
                Ok(PaymentModel::from(payment))
            }
            PaymentSubmitOutcome::PendingPaymentExists => {
                warn!(
                    user_id = %submit_payment_model.user_id,
                    "payments: submission rejected, pending payment exists"
                );
                Err(PaymentError::PendingPaymentExists)
            }
            PaymentSubmitOutcome::ActiveSubscriptionExists => {
                warn!(
                    user_id = %submit_payment_model.user_id,
                    "payments: submission rejected, active subscription exists"
                );
                Err(PaymentError::ActiveSubscriptionExists)
            }
        }
    }

    pub async fn list_pending(&self) -> PaymentResult<Vec<PaymentModel>> {
        let payments = self.payment_repo.list_pending().await.map_err(|err| {
            error!(db_error = ?err, "payments: failed to list pending payments");
            PaymentError::Internal(err)
        })?;

        Ok(payments.into_iter().map(PaymentModel::from).collect())
    }

    /// Marks the payment verified and promotes it into an active subscription
    /// in one transaction. Re-verifying is a no-op: the payment comes back
    /// unchanged and no second subscription is created.
    pub async fn verify_payment(&self, payment_id: i64) -> PaymentResult<PaymentModel> {
        let outcome = self
            .payment_repo
            .verify_and_promote(payment_id, self.clock.today())
            .await
            .map_err(|err| {
                error!(payment_id, db_error = ?err, "payments: verification failed");
                PaymentError::Internal(err)
            })?;

        match outcome {
            PaymentVerifyOutcome::Promoted {
                payment,
                subscription,
                plan,
            } => {
                info!(
                    payment_id = payment.id,
                    subscription_id = subscription.id,
                    user_id = %payment.user_id,
                    "payments: payment verified and promoted"
                );
                self.notifier.notify(&format!(
                    "Payment verified: user {} is now subscribed to {}",
                    payment.user_id, plan.name
                ));
                Ok(PaymentModel::from(payment))
            }
            PaymentVerifyOutcome::AlreadyVerified(payment) => {
                info!(
                    payment_id = payment.id,
                    "payments: payment was already verified, nothing to do"
                );
                Ok(PaymentModel::from(payment))
            }
            PaymentVerifyOutcome::ActiveSubscriptionExists => {
                warn!(
                    payment_id,
                    "payments: verification rejected, active subscription exists"
                );
                Err(PaymentError::ActiveSubscriptionExists)
            }
            PaymentVerifyOutcome::MissingPlan => Err(PaymentError::Validation(
                "payment has no plan attached".to_string(),
            )),
            PaymentVerifyOutcome::NotFound => Err(PaymentError::PaymentNotFound),
        }
    }
}
