use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::{plans::PlanEntity, subscriptions::InsertSubscriptionEntity},
    repositories::{plans::PlanRepository, subscriptions::SubscriptionRepository},
    value_objects::{
        enums::subscription_statuses::SubscriptionStatus,
        subscriptions::{
            InsertSubscriptionModel, SubscriptionCreateOutcome, SubscriptionModel, period_end,
        },
    },
};
use crate::usecases::clock::Clock;

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("plan not found")]
    PlanNotFound,
    #[error("user already has an active subscription")]
    ActiveSubscriptionExists,
    #[error("no prior subscription found for this user")]
    NoPriorSubscription,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionError::PlanNotFound => StatusCode::NOT_FOUND,
            SubscriptionError::ActiveSubscriptionExists => StatusCode::CONFLICT,
            SubscriptionError::NoPriorSubscription | SubscriptionError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type SubscriptionResult<T> = std::result::Result<T, SubscriptionError>;

pub struct SubscriptionUseCase<S, P>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
    plan_repo: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<S, P> SubscriptionUseCase<S, P>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>, plan_repo: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            subscription_repo,
            plan_repo,
            clock,
        }
    }

    /// Admin entry point. When a start date is supplied without an end date,
    /// the end date is derived from the plan duration once, here, and never
    /// recomputed afterwards.
    pub async fn create_subscription(
        &self,
        insert_subscription_model: InsertSubscriptionModel,
    ) -> SubscriptionResult<SubscriptionModel> {
        let plan = self.load_plan(insert_subscription_model.plan_id).await?;
        let today = self.clock.today();

        let status = insert_subscription_model
            .status
            .unwrap_or(SubscriptionStatus::Active);
        let end_date = insert_subscription_model
            .start_date
            .map(|start_date| {
                period_end(start_date, plan.duration_months).ok_or_else(|| {
                    SubscriptionError::Validation(format!(
                        "cannot add {} months to {}",
                        plan.duration_months, start_date
                    ))
                })
            })
            .transpose()?;

        let insert = InsertSubscriptionEntity {
            user_id: insert_subscription_model.user_id,
            plan_id: plan.id,
            start_date: insert_subscription_model.start_date,
            end_date,
            status: status.to_string(),
        };

        let outcome = self
            .subscription_repo
            .create(insert, today)
            .await
            .map_err(|err| {
                error!(
                    user_id = %insert_subscription_model.user_id,
                    db_error = ?err,
                    "subscriptions: failed to create subscription"
                );
                SubscriptionError::Internal(err)
            })?;

        match outcome {
            SubscriptionCreateOutcome::Created(subscription) => {
                info!(
                    subscription_id = subscription.id,
                    user_id = %subscription.user_id,
                    plan_id = subscription.plan_id,
                    "subscriptions: subscription created"
                );
                Ok(SubscriptionModel::from_entity(subscription, today))
            }
            SubscriptionCreateOutcome::ActiveConflict => {
                warn!(
                    user_id = %insert_subscription_model.user_id,
                    "subscriptions: user already has an active subscription"
                );
                Err(SubscriptionError::ActiveSubscriptionExists)
            }
        }
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> SubscriptionResult<Vec<SubscriptionModel>> {
        let today = self.clock.today();
        let subscriptions = self
            .subscription_repo
            .list_for_user(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "subscriptions: failed to list for user");
                SubscriptionError::Internal(err)
            })?;

        Ok(subscriptions
            .into_iter()
            .map(|subscription| SubscriptionModel::from_entity(subscription, today))
            .collect())
    }

    pub async fn latest_for_user(
        &self,
        user_id: Uuid,
    ) -> SubscriptionResult<Option<SubscriptionModel>> {
        let today = self.clock.today();
        let subscription = self
            .subscription_repo
            .latest_for_user(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "subscriptions: failed to load latest for user");
                SubscriptionError::Internal(err)
            })?;

        Ok(subscription
            .map(|subscription| SubscriptionModel::from_entity(subscription, today)))
    }

    /// Renewal on demand: opens a fresh period on the plan of the user's most
    /// recent subscription, payment assumed settled by the caller.
    pub async fn renew_for_user(&self, user_id: Uuid) -> SubscriptionResult<SubscriptionModel> {
        let latest = self
            .subscription_repo
            .latest_for_user(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "subscriptions: failed to load latest for renew");
                SubscriptionError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%user_id, "subscriptions: renew requested without a prior subscription");
                SubscriptionError::NoPriorSubscription
            })?;

        let today = self.clock.today();
        self.create_subscription(InsertSubscriptionModel {
            user_id,
            plan_id: latest.plan_id,
            start_date: Some(today),
            status: Some(SubscriptionStatus::Active),
        })
        .await
    }

    async fn load_plan(&self, plan_id: i32) -> SubscriptionResult<PlanEntity> {
        self.plan_repo
            .find_by_id(plan_id)
            .await
            .map_err(|err| {
                error!(plan_id, db_error = ?err, "subscriptions: failed to load plan");
                SubscriptionError::Internal(err)
            })?
            .ok_or(SubscriptionError::PlanNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::{plans::PlanEntity, subscriptions::SubscriptionEntity},
        repositories::{
            plans::MockPlanRepository, subscriptions::MockSubscriptionRepository,
        },
    };
    use crate::usecases::clock::FixedClock;
    use chrono::{NaiveDate, Utc};
    use mockall::predicate::eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_plan(id: i32, duration_months: i32) -> PlanEntity {
        PlanEntity {
            id,
            name: "Monthly".to_string(),
            price_minor: 50000,
            duration_months,
            is_active: true,
        }
    }

    fn sample_subscription(user_id: Uuid, plan_id: i32) -> SubscriptionEntity {
        SubscriptionEntity {
            id: 7,
            user_id,
            plan_id,
            start_date: Some(date(2024, 1, 31)),
            end_date: Some(date(2024, 2, 29)),
            status: SubscriptionStatus::Active.to_string(),
            created_at: Utc::now(),
        }
    }

    fn plan_repo_with(plan: PlanEntity) -> MockPlanRepository {
        let mut plan_repo = MockPlanRepository::new();
        plan_repo
            .expect_find_by_id()
            .with(eq(plan.id))
            .returning(move |_| {
                let plan = plan.clone();
                Box::pin(async move { Ok(Some(plan)) })
            });
        plan_repo
    }

    #[tokio::test]
    async fn derives_end_date_with_calendar_month_clamp() {
        let user_id = Uuid::new_v4();
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_create()
            .returning(|insert, _as_of| {
                Box::pin(async move {
                    // Jan 31 + 1 month lands on leap-day Feb 29 per chrono.
                    assert_eq!(insert.start_date, Some(date(2024, 1, 31)));
                    assert_eq!(insert.end_date, Some(date(2024, 2, 29)));
                    Ok(SubscriptionCreateOutcome::Created(SubscriptionEntity {
                        id: 1,
                        user_id: insert.user_id,
                        plan_id: insert.plan_id,
                        start_date: insert.start_date,
                        end_date: insert.end_date,
                        status: insert.status,
                        created_at: Utc::now(),
                    }))
                })
            });

        let usecase = SubscriptionUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(plan_repo_with(sample_plan(1, 1))),
            Arc::new(FixedClock(date(2024, 1, 31))),
        );

        let subscription = usecase
            .create_subscription(InsertSubscriptionModel {
                user_id,
                plan_id: 1,
                start_date: Some(date(2024, 1, 31)),
                status: None,
            })
            .await
            .unwrap();

        assert_eq!(subscription.end_date, Some(date(2024, 2, 29)));
        assert!(subscription.is_active);
    }

    #[tokio::test]
    async fn pending_creation_without_start_date_has_no_end_date() {
        let user_id = Uuid::new_v4();
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_create()
            .returning(|insert, _as_of| {
                Box::pin(async move {
                    assert_eq!(insert.start_date, None);
                    assert_eq!(insert.end_date, None);
                    assert_eq!(insert.status, "pending");
                    Ok(SubscriptionCreateOutcome::Created(SubscriptionEntity {
                        id: 2,
                        user_id: insert.user_id,
                        plan_id: insert.plan_id,
                        start_date: None,
                        end_date: None,
                        status: insert.status,
                        created_at: Utc::now(),
                    }))
                })
            });

        let usecase = SubscriptionUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(plan_repo_with(sample_plan(1, 3))),
            Arc::new(FixedClock(date(2024, 1, 1))),
        );

        let subscription = usecase
            .create_subscription(InsertSubscriptionModel {
                user_id,
                plan_id: 1,
                start_date: None,
                status: Some(SubscriptionStatus::Pending),
            })
            .await
            .unwrap();

        assert!(!subscription.is_active);
    }

    #[tokio::test]
    async fn maps_active_conflict_to_error() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_create()
            .returning(|_, _| Box::pin(async { Ok(SubscriptionCreateOutcome::ActiveConflict) }));

        let usecase = SubscriptionUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(plan_repo_with(sample_plan(1, 1))),
            Arc::new(FixedClock(date(2024, 1, 1))),
        );

        let result = usecase
            .create_subscription(InsertSubscriptionModel {
                user_id: Uuid::new_v4(),
                plan_id: 1,
                start_date: Some(date(2024, 1, 1)),
                status: None,
            })
            .await;

        assert!(matches!(
            result,
            Err(SubscriptionError::ActiveSubscriptionExists)
        ));
    }

    #[tokio::test]
    async fn unknown_plan_is_not_found() {
        let mut plan_repo = MockPlanRepository::new();
        plan_repo
            .expect_find_by_id()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = SubscriptionUseCase::new(
            Arc::new(MockSubscriptionRepository::new()),
            Arc::new(plan_repo),
            Arc::new(FixedClock(date(2024, 1, 1))),
        );

        let result = usecase
            .create_subscription(InsertSubscriptionModel {
                user_id: Uuid::new_v4(),
                plan_id: 99,
                start_date: None,
                status: None,
            })
            .await;

        assert!(matches!(result, Err(SubscriptionError::PlanNotFound)));
    }

    #[tokio::test]
    async fn list_for_user_marks_expired_periods_inactive() {
        let user_id = Uuid::new_v4();
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_list_for_user()
            .with(eq(user_id))
            .returning(move |user_id| {
                Box::pin(async move { Ok(vec![sample_subscription(user_id, 1)]) })
            });

        let usecase = SubscriptionUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(MockPlanRepository::new()),
            Arc::new(FixedClock(date(2024, 3, 1))),
        );

        let subscriptions = usecase.list_for_user(user_id).await.unwrap();
        assert_eq!(subscriptions.len(), 1);
        assert!(!subscriptions[0].is_active);
    }

    #[tokio::test]
    async fn renew_for_user_reuses_latest_plan_and_starts_today() {
        let user_id = Uuid::new_v4();
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_latest_for_user()
            .with(eq(user_id))
            .returning(move |user_id| {
                Box::pin(async move { Ok(Some(sample_subscription(user_id, 3))) })
            });
        subscription_repo
            .expect_create()
            .returning(|insert, _as_of| {
                Box::pin(async move {
                    assert_eq!(insert.plan_id, 3);
                    assert_eq!(insert.start_date, Some(date(2024, 3, 1)));
                    assert_eq!(insert.end_date, Some(date(2024, 4, 1)));
                    Ok(SubscriptionCreateOutcome::Created(SubscriptionEntity {
                        id: 8,
                        user_id: insert.user_id,
                        plan_id: insert.plan_id,
                        start_date: insert.start_date,
                        end_date: insert.end_date,
                        status: insert.status,
                        created_at: Utc::now(),
                    }))
                })
            });

        let usecase = SubscriptionUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(plan_repo_with(sample_plan(3, 1))),
            Arc::new(FixedClock(date(2024, 3, 1))),
        );

        let subscription = usecase.renew_for_user(user_id).await.unwrap();
        assert_eq!(subscription.plan_id, 3);
        assert!(subscription.is_active);
    }

    #[tokio::test]
    async fn renew_for_user_without_history_is_rejected() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_latest_for_user()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = SubscriptionUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(MockPlanRepository::new()),
            Arc::new(FixedClock(date(2024, 3, 1))),
        );

        let result = usecase.renew_for_user(Uuid::new_v4()).await;
        assert!(matches!(result, Err(SubscriptionError::NoPriorSubscription)));
    }
}
