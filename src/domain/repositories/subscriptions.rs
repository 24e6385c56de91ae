use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity};
use crate::domain::value_objects::renewals::RenewalOutcome;
use crate::domain::value_objects::subscriptions::SubscriptionCreateOutcome;

#[async_trait]
#[automock]
pub trait SubscriptionRepository {
    /// Inserts a subscription after re-checking the single-active-subscription
    /// guard inside the same transaction (row locks on the user's
    /// subscriptions), so a racing create cannot slip past the check.
    async fn create(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
        as_of: NaiveDate,
    ) -> Result<SubscriptionCreateOutcome>;

    /// All subscriptions for a user, most recent start date first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<SubscriptionEntity>>;

    /// The subscription with the greatest end date, if any; records still
    /// waiting for activation (no end date) are skipped.
    async fn latest_for_user(&self, user_id: Uuid) -> Result<Option<SubscriptionEntity>>;

    /// Renewal candidates: active records whose end date is on or before
    /// `as_of`.
    async fn list_due(&self, as_of: NaiveDate) -> Result<Vec<SubscriptionEntity>>;

    /// Starts a fresh period for the owner of `subscription_id` and marks the
    /// old row expired, both in one transaction guarded like `create`.
    async fn renew(&self, subscription_id: i64, as_of: NaiveDate) -> Result<RenewalOutcome>;
}
