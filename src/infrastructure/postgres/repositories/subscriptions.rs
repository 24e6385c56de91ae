use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::{Connection, PgConnection, QueryResult, RunQueryDsl, insert_into, prelude::*, update};
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            plans::PlanEntity,
            subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
        },
        repositories::subscriptions::SubscriptionRepository,
        value_objects::{
            enums::subscription_statuses::SubscriptionStatus,
            renewals::RenewalOutcome,
            subscriptions::{SubscriptionCreateOutcome, period_end},
        },
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{plans, subscriptions},
    },
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

/// Locks the user's currently-active rows so a concurrent create for the same
/// user serializes behind this transaction instead of double-inserting.
pub(super) fn lock_currently_active(
    conn: &mut PgConnection,
    user_id: Uuid,
    as_of: NaiveDate,
) -> QueryResult<Vec<i64>> {
    subscriptions::table
        .filter(subscriptions::user_id.eq(user_id))
        .filter(subscriptions::status.eq(SubscriptionStatus::Active.to_string()))
        .filter(subscriptions::end_date.ge(as_of))
        .select(subscriptions::id)
        .for_update()
        .load::<i64>(conn)
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn create(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
        as_of: NaiveDate,
    ) -> Result<SubscriptionCreateOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let outcome = conn.transaction::<SubscriptionCreateOutcome, anyhow::Error, _>(|conn| {
            let active =
                lock_currently_active(conn, insert_subscription_entity.user_id, as_of)?;
            if !active.is_empty() {
                return Ok(SubscriptionCreateOutcome::ActiveConflict);
            }

            let created = insert_into(subscriptions::table)
                .values(&insert_subscription_entity)
                .returning(SubscriptionEntity::as_returning())
                .get_result::<SubscriptionEntity>(conn)?;

            Ok(SubscriptionCreateOutcome::Created(created))
        })?;

        Ok(outcome)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .order(subscriptions::start_date.desc())
            .select(SubscriptionEntity::as_select())
            .load::<SubscriptionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn latest_for_user(&self, user_id: Uuid) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .filter(subscriptions::end_date.is_not_null())
            .order(subscriptions::end_date.desc())
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_due(&self, as_of: NaiveDate) -> Result<Vec<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = subscriptions::table
            .filter(subscriptions::status.eq(SubscriptionStatus::Active.to_string()))
            .filter(subscriptions::end_date.le(as_of))
            .order(subscriptions::end_date.asc())
            .select(SubscriptionEntity::as_select())
            .load::<SubscriptionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn renew(&self, subscription_id: i64, as_of: NaiveDate) -> Result<RenewalOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let outcome = conn.transaction::<RenewalOutcome, anyhow::Error, _>(|conn| {
            let old = subscriptions::table
                .find(subscription_id)
                .select(SubscriptionEntity::as_select())
                .for_update()
                .first::<SubscriptionEntity>(conn)
                .optional()?;
            let Some(old) = old else {
                return Ok(RenewalOutcome::NotFound);
            };

            // The row being renewed may itself still count as currently
            // active (end date equal to today), so it is excluded from the
            // guard.
            let active = subscriptions::table
                .filter(subscriptions::user_id.eq(old.user_id))
                .filter(subscriptions::status.eq(SubscriptionStatus::Active.to_string()))
                .filter(subscriptions::end_date.ge(as_of))
                .filter(subscriptions::id.ne(old.id))
                .select(subscriptions::id)
                .for_update()
                .load::<i64>(conn)?;
            if !active.is_empty() {
                return Ok(RenewalOutcome::ActiveConflict);
            }

            let plan = plans::table
                .find(old.plan_id)
                .select(PlanEntity::as_select())
                .first::<PlanEntity>(conn)?;
            let end_date = period_end(as_of, plan.duration_months).ok_or_else(|| {
                anyhow!(
                    "cannot add {} months to {}",
                    plan.duration_months,
                    as_of
                )
            })?;

            let created = insert_into(subscriptions::table)
                .values(&InsertSubscriptionEntity {
                    user_id: old.user_id,
                    plan_id: old.plan_id,
                    start_date: Some(as_of),
                    end_date: Some(end_date),
                    status: SubscriptionStatus::Active.to_string(),
                })
                .returning(SubscriptionEntity::as_returning())
                .get_result::<SubscriptionEntity>(conn)?;

            update(subscriptions::table.find(old.id))
                .set(subscriptions::status.eq(SubscriptionStatus::Expired.to_string()))
                .execute(conn)?;

            Ok(RenewalOutcome::Renewed(created))
        })?;

        Ok(outcome)
    }
}
