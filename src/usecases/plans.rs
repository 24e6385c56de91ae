use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::{
    repositories::plans::PlanRepository,
    value_objects::plans::{InsertPlanModel, PlanModel, UpdatePlanModel},
};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("plan not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PlanError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PlanError::NotFound => StatusCode::NOT_FOUND,
            PlanError::Validation(_) => StatusCode::BAD_REQUEST,
            PlanError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type PlanResult<T> = std::result::Result<T, PlanError>;

pub struct PlanUseCase<P>
where
    P: PlanRepository + Send + Sync + 'static,
{
    plan_repo: Arc<P>,
}

impl<P> PlanUseCase<P>
where
    P: PlanRepository + Send + Sync + 'static,
{
    pub fn new(plan_repo: Arc<P>) -> Self {
        Self { plan_repo }
    }

    pub async fn create_plan(&self, insert_plan_model: InsertPlanModel) -> PlanResult<PlanModel> {
        validate_price(Some(insert_plan_model.price_minor))?;
        validate_duration(Some(insert_plan_model.duration_months))?;
        if insert_plan_model.name.trim().is_empty() {
            return Err(PlanError::Validation("plan name is required".to_string()));
        }

        let plan = self
            .plan_repo
            .create(insert_plan_model.to_entity())
            .await
            .map_err(|err| {
                error!(db_error = ?err, "plans: failed to create plan");
                PlanError::Internal(err)
            })?;

        info!(plan_id = plan.id, plan_name = %plan.name, "plans: plan created");
        Ok(PlanModel::from(plan))
    }

    pub async fn get_plan(&self, plan_id: i32) -> PlanResult<PlanModel> {
        let plan = self
            .plan_repo
            .find_by_id(plan_id)
            .await
            .map_err(|err| {
                error!(plan_id, db_error = ?err, "plans: failed to load plan");
                PlanError::Internal(err)
            })?
            .ok_or(PlanError::NotFound)?;

        Ok(PlanModel::from(plan))
    }

    pub async fn list_plans(&self) -> PlanResult<Vec<PlanModel>> {
        let plans = self.plan_repo.list().await.map_err(|err| {
            error!(db_error = ?err, "plans: failed to list plans");
            PlanError::Internal(err)
        })?;

        Ok(plans.into_iter().map(PlanModel::from).collect())
    }

    /// Field updates never touch subscriptions already created from the plan:
    /// end dates were materialized at creation time.
    pub async fn update_plan(
        &self,
        plan_id: i32,
        update_plan_model: UpdatePlanModel,
    ) -> PlanResult<PlanModel> {
        validate_price(update_plan_model.price_minor)?;
        validate_duration(update_plan_model.duration_months)?;

        let changes = update_plan_model.to_entity();
        if changes.is_empty() {
            return Err(PlanError::Validation("no fields to update".to_string()));
        }

        let plan = self
            .plan_repo
            .update(plan_id, changes)
            .await
            .map_err(|err| {
                error!(plan_id, db_error = ?err, "plans: failed to update plan");
                PlanError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(plan_id, "plans: update targeted a missing plan");
                PlanError::NotFound
            })?;

        info!(plan_id = plan.id, "plans: plan updated");
        Ok(PlanModel::from(plan))
    }

    /// Closes the plan to new purchases.
    pub async fn deactivate_plan(&self, plan_id: i32) -> PlanResult<PlanModel> {
        self.update_plan(
            plan_id,
            UpdatePlanModel {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }
}

fn validate_price(price_minor: Option<i64>) -> PlanResult<()> {
    if price_minor.is_some_and(|price| price < 0) {
        return Err(PlanError::Validation(
            "price must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_duration(duration_months: Option<i32>) -> PlanResult<()> {
    if duration_months.is_some_and(|months| months < 1) {
        return Err(PlanError::Validation(
            "duration must be at least one month".to_string(),
        ));
    }
    Ok(())
}
