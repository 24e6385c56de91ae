use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::{Connection, RunQueryDsl, insert_into, prelude::*, update};

use crate::{
    domain::{
        entities::{
            payments::{InsertPaymentEntity, PaymentEntity},
            plans::PlanEntity,
            subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
        },
        repositories::payments::PaymentRepository,
        value_objects::{
            enums::subscription_statuses::SubscriptionStatus,
            payments::{PaymentSubmitOutcome, PaymentVerifyOutcome},
            subscriptions::period_end,
        },
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        repositories::subscriptions::lock_currently_active,
        schema::{payments, plans, subscriptions},
    },
};

pub struct PaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentRepository for PaymentPostgres {
    async fn submit(
        &self,
        insert_payment_entity: InsertPaymentEntity,
        as_of: NaiveDate,
    ) -> Result<PaymentSubmitOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let outcome = conn.transaction::<PaymentSubmitOutcome, anyhow::Error, _>(|conn| {
            let pending = payments::table
                .filter(payments::user_id.eq(insert_payment_entity.user_id))
                .filter(payments::is_verified.eq(false))
                .select(payments::id)
                .for_update()
                .load::<i64>(conn)?;
            if !pending.is_empty() {
                return Ok(PaymentSubmitOutcome::PendingPaymentExists);
            }

            let active = lock_currently_active(conn, insert_payment_entity.user_id, as_of)?;
            if !active.is_empty() {
                return Ok(PaymentSubmitOutcome::ActiveSubscriptionExists);
            }

            let created = insert_into(payments::table)
                .values(&insert_payment_entity)
                .returning(PaymentEntity::as_returning())
                .get_result::<PaymentEntity>(conn)?;

            Ok(PaymentSubmitOutcome::Submitted(created))
        })?;

        Ok(outcome)
    }

    async fn list_pending(&self) -> Result<Vec<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = payments::table
            .filter(payments::is_verified.eq(false))
            .order(payments::created_at.asc())
            .select(PaymentEntity::as_select())
            .load::<PaymentEntity>(&mut conn)?;

        Ok(results)
    }

    async fn verify_and_promote(
        &self,
        payment_id: i64,
        as_of: NaiveDate,
    ) -> Result<PaymentVerifyOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let outcome = conn.transaction::<PaymentVerifyOutcome, anyhow::Error, _>(|conn| {
            let payment = payments::table
                .find(payment_id)
                .select(PaymentEntity::as_select())
                .for_update()
                .first::<PaymentEntity>(conn)
                .optional()?;
            let Some(payment) = payment else {
                return Ok(PaymentVerifyOutcome::NotFound);
            };

            // Idempotent re-verification: the row lock above means a
            // double-submitted verify sees the first one's writes.
            if payment.is_verified || payment.subscription_id.is_some() {
                return Ok(PaymentVerifyOutcome::AlreadyVerified(payment));
            }

            let Some(plan_id) = payment.plan_id else {
                return Ok(PaymentVerifyOutcome::MissingPlan);
            };

            let active = lock_currently_active(conn, payment.user_id, as_of)?;
            if !active.is_empty() {
                return Ok(PaymentVerifyOutcome::ActiveSubscriptionExists);
            }

            let plan = plans::table
                .find(plan_id)
                .select(PlanEntity::as_select())
                .first::<PlanEntity>(conn)?;
            let end_date = period_end(as_of, plan.duration_months)
                .ok_or_else(|| anyhow!("cannot add {} months to {}", plan.duration_months, as_of))?;

            let subscription = insert_into(subscriptions::table)
                .values(&InsertSubscriptionEntity {
                    user_id: payment.user_id,
                    plan_id: plan.id,
                    start_date: Some(as_of),
                    end_date: Some(end_date),
                    status: SubscriptionStatus::Active.to_string(),
                })
                .returning(SubscriptionEntity::as_returning())
                .get_result::<SubscriptionEntity>(conn)?;

            let payment = update(payments::table.find(payment.id))
                .set((
                    payments::is_verified.eq(true),
                    payments::subscription_id.eq(Some(subscription.id)),
                ))
                .returning(PaymentEntity::as_returning())
                .get_result::<PaymentEntity>(conn)?;

            Ok(PaymentVerifyOutcome::Promoted {
                payment,
                subscription,
                plan,
            })
        })?;

        Ok(outcome)
    }
}
