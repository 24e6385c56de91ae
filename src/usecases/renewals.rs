use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::subscriptions::SubscriptionEntity,
    repositories::subscriptions::SubscriptionRepository,
    value_objects::renewals::{RenewalOutcome, RenewalSummary},
};
use crate::usecases::{clock::Clock, notifier::Notifier};

/// External charge attempt used only by the renewal batch. The production
/// implementation is a randomized stand-in for a real gateway.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait PaymentGateway: Send + Sync {
    async fn attempt(&self, user_id: Uuid, plan_id: i32) -> Result<bool>;
}

pub struct RenewalUseCase<S, G>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    subscription_repo: Arc<S>,
    gateway: Arc<G>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
}

impl<S, G> RenewalUseCase<S, G>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    pub fn new(
        subscription_repo: Arc<S>,
        gateway: Arc<G>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            subscription_repo,
            gateway,
            clock,
            notifier,
        }
    }

    /// One batch pass over subscriptions whose end date is on or before
    /// today. A failed or errored candidate never aborts the batch; every
    /// candidate is processed and counted.
    pub async fn run(&self) -> Result<RenewalSummary> {
        let as_of = self.clock.today();
        let candidates = self.subscription_repo.list_due(as_of).await?;

        let mut summary = RenewalSummary {
            found: candidates.len(),
            ..Default::default()
        };
        info!(%as_of, found = summary.found, "renewals: batch started");

        for subscription in candidates {
            match self.renew_one(&subscription, as_of).await {
                Ok(true) => summary.renewed += 1,
                Ok(false) => summary.failed += 1,
                Err(err) => {
                    error!(
                        subscription_id = subscription.id,
                        user_id = %subscription.user_id,
                        error = ?err,
                        "renewals: candidate errored, continuing batch"
                    );
                    summary.failed += 1;
                }
            }
        }

        info!(
            found = summary.found,
            renewed = summary.renewed,
            failed = summary.failed,
            "renewals: batch finished"
        );
        Ok(summary)
    }

    async fn renew_one(&self, subscription: &SubscriptionEntity, as_of: NaiveDate) -> Result<bool> {
        let paid = self
            .gateway
            .attempt(subscription.user_id, subscription.plan_id)
            .await?;

        if !paid {
            self.notifier.notify(&format!(
                "Renewal payment failed for user {} on plan {}",
                subscription.user_id, subscription.plan_id
            ));
            return Ok(false);
        }

        match self.subscription_repo.renew(subscription.id, as_of).await? {
            RenewalOutcome::Renewed(new_subscription) => {
                info!(
                    old_subscription_id = subscription.id,
                    new_subscription_id = new_subscription.id,
                    user_id = %subscription.user_id,
                    "renewals: subscription renewed"
                );
                self.notifier.notify(&format!(
                    "Subscription renewed for user {} on plan {}",
                    subscription.user_id, subscription.plan_id
                ));
                Ok(true)
            }
            RenewalOutcome::ActiveConflict => {
                // The user purchased manually between candidate selection and
                // the renewal transaction.
                warn!(
                    subscription_id = subscription.id,
                    user_id = %subscription.user_id,
                    "renewals: skipped, user already holds an active subscription"
                );
                Ok(false)
            }
            RenewalOutcome::NotFound => {
                warn!(
                    subscription_id = subscription.id,
                    "renewals: candidate disappeared before renewal"
                );
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        repositories::subscriptions::MockSubscriptionRepository,
        value_objects::enums::subscription_statuses::SubscriptionStatus,
    };
    use crate::usecases::{clock::FixedClock, notifier::MockNotifier};
    use chrono::Utc;
    use mockall::predicate::eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn due_subscription(id: i64, user_id: Uuid) -> SubscriptionEntity {
        SubscriptionEntity {
            id,
            user_id,
            plan_id: 1,
            start_date: Some(date(2024, 1, 31)),
            end_date: Some(date(2024, 2, 29)),
            status: SubscriptionStatus::Active.to_string(),
            created_at: Utc::now(),
        }
    }

    fn loose_notifier() -> MockNotifier {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().return_const(());
        notifier
    }

    fn gateway_returning(paid: bool) -> MockPaymentGateway {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_attempt()
            .returning(move |_, _| Box::pin(async move { Ok(paid) }));
        gateway
    }

    #[tokio::test]
    async fn forced_success_renews_the_single_candidate() {
        let user_id = Uuid::new_v4();
        let as_of = date(2024, 3, 1);

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_list_due()
            .with(eq(as_of))
            .returning(move |_| {
                Box::pin(async move { Ok(vec![due_subscription(1, user_id)]) })
            });
        subscription_repo
            .expect_renew()
            .with(eq(1i64), eq(as_of))
            .times(1)
            .returning(move |_, as_of| {
                Box::pin(async move {
                    Ok(RenewalOutcome::Renewed(SubscriptionEntity {
                        id: 2,
                        user_id,
                        plan_id: 1,
                        start_date: Some(as_of),
                        end_date: Some(date(2024, 4, 1)),
                        status: SubscriptionStatus::Active.to_string(),
                        created_at: Utc::now(),
                    }))
                })
            });

        let usecase = RenewalUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(gateway_returning(true)),
            Arc::new(FixedClock(as_of)),
            Arc::new(loose_notifier()),
        );

        let summary = usecase.run().await.unwrap();
        assert_eq!(
            summary,
            RenewalSummary {
                found: 1,
                renewed: 1,
                failed: 0,
            }
        );
    }

    #[tokio::test]
    async fn forced_failure_leaves_the_candidate_untouched() {
        let user_id = Uuid::new_v4();
        let as_of = date(2024, 3, 1);

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_list_due().returning(move |_| {
            Box::pin(async move { Ok(vec![due_subscription(1, user_id)]) })
        });
        subscription_repo.expect_renew().times(0);

        let usecase = RenewalUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(gateway_returning(false)),
            Arc::new(FixedClock(as_of)),
            Arc::new(loose_notifier()),
        );

        let summary = usecase.run().await.unwrap();
        assert_eq!(
            summary,
            RenewalSummary {
                found: 1,
                renewed: 0,
                failed: 1,
            }
        );
    }

    #[tokio::test]
    async fn one_errored_candidate_does_not_abort_the_batch() {
        let first_user = Uuid::new_v4();
        let second_user = Uuid::new_v4();
        let as_of = date(2024, 3, 1);

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_list_due().returning(move |_| {
            Box::pin(async move {
                Ok(vec![
                    due_subscription(1, first_user),
                    due_subscription(2, second_user),
                ])
            })
        });
        subscription_repo
            .expect_renew()
            .with(eq(2i64), eq(as_of))
            .times(1)
            .returning(move |_, as_of| {
                Box::pin(async move {
                    Ok(RenewalOutcome::Renewed(SubscriptionEntity {
                        id: 3,
                        user_id: second_user,
                        plan_id: 1,
                        start_date: Some(as_of),
                        end_date: Some(date(2024, 4, 1)),
                        status: SubscriptionStatus::Active.to_string(),
                        created_at: Utc::now(),
                    }))
                })
            });

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_attempt()
            .with(eq(first_user), eq(1))
            .returning(|_, _| {
                Box::pin(async { Err(anyhow::anyhow!("gateway timed out")) })
            });
        gateway
            .expect_attempt()
            .with(eq(second_user), eq(1))
            .returning(|_, _| Box::pin(async { Ok(true) }));

        let usecase = RenewalUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(gateway),
            Arc::new(FixedClock(as_of)),
            Arc::new(loose_notifier()),
        );

        let summary = usecase.run().await.unwrap();
        assert_eq!(
            summary,
            RenewalSummary {
                found: 2,
                renewed: 1,
                failed: 1,
            }
        );
    }

    #[tokio::test]
    async fn manual_purchase_between_scan_and_renew_counts_as_not_renewed() {
        let user_id = Uuid::new_v4();
        let as_of = date(2024, 3, 1);

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_list_due().returning(move |_| {
            Box::pin(async move { Ok(vec![due_subscription(1, user_id)]) })
        });
        subscription_repo
            .expect_renew()
            .returning(|_, _| Box::pin(async { Ok(RenewalOutcome::ActiveConflict) }));

        let usecase = RenewalUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(gateway_returning(true)),
            Arc::new(FixedClock(as_of)),
            Arc::new(loose_notifier()),
        );

        let summary = usecase.run().await.unwrap();
        assert_eq!(
            summary,
            RenewalSummary {
                found: 1,
                renewed: 0,
                failed: 1,
            }
        );
    }
}
