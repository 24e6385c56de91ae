use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use crate::usecases::renewals::PaymentGateway;

/// Randomized stand-in for a real payment gateway. The approval probability
/// comes from configuration (`RENEWAL_SUCCESS_RATE`).
pub struct RandomPaymentGateway {
    success_rate: f64,
}

impl RandomPaymentGateway {
    pub fn new(success_rate: f64) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
impl PaymentGateway for RandomPaymentGateway {
    async fn attempt(&self, user_id: Uuid, plan_id: i32) -> Result<bool> {
        let paid = rand::thread_rng().gen_bool(self.success_rate);
        info!(
            %user_id,
            plan_id,
            paid,
            "payment gateway stand-in processed a charge attempt"
        );
        Ok(paid)
    }
}
