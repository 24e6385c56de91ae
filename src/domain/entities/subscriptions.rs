use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::value_objects::enums::subscription_statuses::SubscriptionStatus;
use crate::infrastructure::postgres::schema::subscriptions;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = subscriptions)]
pub struct SubscriptionEntity {
    pub id: i64,
    pub user_id: Uuid,
    pub plan_id: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl SubscriptionEntity {
    /// Single source of truth for "currently active": the status field and
    /// the end date must both agree. A record without an end date (pending
    /// admin activation) is never active.
    pub fn is_active_on(&self, as_of: NaiveDate) -> bool {
        SubscriptionStatus::from_str(&self.status) == SubscriptionStatus::Active
            && self.end_date.is_some_and(|end_date| end_date >= as_of)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subscriptions)]
pub struct InsertSubscriptionEntity {
    pub user_id: Uuid,
    pub plan_id: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample(status: SubscriptionStatus, end_date: Option<NaiveDate>) -> SubscriptionEntity {
        SubscriptionEntity {
            id: 1,
            user_id: Uuid::new_v4(),
            plan_id: 1,
            start_date: Some(date(2024, 1, 1)),
            end_date,
            status: status.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn active_within_period() {
        let subscription = sample(SubscriptionStatus::Active, Some(date(2024, 2, 1)));
        assert!(subscription.is_active_on(date(2024, 1, 15)));
        assert!(subscription.is_active_on(date(2024, 2, 1)));
    }

    #[test]
    fn inactive_after_end_date() {
        let subscription = sample(SubscriptionStatus::Active, Some(date(2024, 2, 1)));
        assert!(!subscription.is_active_on(date(2024, 2, 2)));
    }

    #[test]
    fn inactive_when_status_is_not_active() {
        for status in [
            SubscriptionStatus::Pending,
            SubscriptionStatus::Expired,
            SubscriptionStatus::Canceled,
        ] {
            let subscription = sample(status, Some(date(2999, 1, 1)));
            assert!(!subscription.is_active_on(date(2024, 1, 1)));
        }
    }

    #[test]
    fn inactive_without_end_date() {
        let mut subscription = sample(SubscriptionStatus::Active, None);
        subscription.start_date = None;
        assert!(!subscription.is_active_on(date(2024, 1, 1)));
    }
}
