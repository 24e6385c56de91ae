use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::subscriptions::SubscriptionEntity;
use crate::domain::value_objects::enums::subscription_statuses::SubscriptionStatus;

/// End of a subscription period that starts on `start_date` and runs for
/// `duration_months` calendar months. Month-end clamping ("Jan 31 + 1 month")
/// is deliberately delegated to `chrono::Months` rather than derived by hand;
/// whatever chrono answers is the canonical end date.
pub fn period_end(start_date: NaiveDate, duration_months: i32) -> Option<NaiveDate> {
    let months = u32::try_from(duration_months).ok()?;
    start_date.checked_add_months(Months::new(months))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionModel {
    pub id: i64,
    pub user_id: Uuid,
    pub plan_id: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: SubscriptionStatus,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl SubscriptionModel {
    pub fn from_entity(entity: SubscriptionEntity, as_of: NaiveDate) -> Self {
        let is_active = entity.is_active_on(as_of);
        Self {
            id: entity.id,
            user_id: entity.user_id,
            plan_id: entity.plan_id,
            start_date: entity.start_date,
            end_date: entity.end_date,
            status: SubscriptionStatus::from_str(&entity.status),
            is_active,
            created_at: entity.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertSubscriptionModel {
    pub user_id: Uuid,
    pub plan_id: i32,
    pub start_date: Option<NaiveDate>,
    pub status: Option<SubscriptionStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewSubscriptionModel {
    pub user_id: Uuid,
}

/// Result of the guarded insert: the conflict check and the insert run in
/// one storage transaction, so a lost race surfaces here instead of as a
/// duplicate row.
#[derive(Debug, Clone)]
pub enum SubscriptionCreateOutcome {
    Created(SubscriptionEntity),
    ActiveConflict,
}
