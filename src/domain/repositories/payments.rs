use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::automock;

use crate::domain::entities::payments::InsertPaymentEntity;
use crate::domain::entities::payments::PaymentEntity;
use crate::domain::value_objects::payments::{PaymentSubmitOutcome, PaymentVerifyOutcome};

#[async_trait]
#[automock]
pub trait PaymentRepository {
    /// Records a proof-of-payment submission. The duplicate-pending-payment
    /// and active-subscription checks run inside the insert transaction.
    async fn submit(
        &self,
        insert_payment_entity: InsertPaymentEntity,
        as_of: NaiveDate,
    ) -> Result<PaymentSubmitOutcome>;

    /// Unverified payments awaiting admin review, oldest first.
    async fn list_pending(&self) -> Result<Vec<PaymentEntity>>;

    /// Flips the verified flag, creates the subscription and back-links it,
    /// atomically. Re-verifying an already-verified payment reports
    /// `AlreadyVerified` and writes nothing.
    async fn verify_and_promote(
        &self,
        payment_id: i64,
        as_of: NaiveDate,
    ) -> Result<PaymentVerifyOutcome>;
}
