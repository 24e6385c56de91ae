use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::payments::PaymentEntity;
use crate::domain::entities::plans::PlanEntity;
use crate::domain::entities::subscriptions::SubscriptionEntity;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentModel {
    pub id: i64,
    pub user_id: Uuid,
    pub plan_id: Option<i32>,
    pub subscription_id: Option<i64>,
    pub proof_url: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<PaymentEntity> for PaymentModel {
    fn from(entity: PaymentEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            plan_id: entity.plan_id,
            subscription_id: entity.subscription_id,
            proof_url: entity.proof_url,
            is_verified: entity.is_verified,
            created_at: entity.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitPaymentModel {
    pub user_id: Uuid,
    pub plan_id: i32,
    pub proof_url: String,
}

#[derive(Debug, Clone)]
pub enum PaymentSubmitOutcome {
    Submitted(PaymentEntity),
    PendingPaymentExists,
    ActiveSubscriptionExists,
}

#[derive(Debug, Clone)]
pub enum PaymentVerifyOutcome {
    /// Verified flag flipped, subscription created and back-linked, all in
    /// one transaction.
    Promoted {
        payment: PaymentEntity,
        subscription: SubscriptionEntity,
        plan: PlanEntity,
    },
    /// Re-verification of an already-verified or already-linked payment.
    AlreadyVerified(PaymentEntity),
    ActiveSubscriptionExists,
    MissingPlan,
    NotFound,
}
