use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::{
    domain::{
        repositories::plans::PlanRepository,
        value_objects::plans::{InsertPlanModel, UpdatePlanModel},
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad, repositories::plans::PlanPostgres,
    },
    usecases::plans::{PlanError, PlanUseCase},
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let plan_repository = PlanPostgres::new(Arc::clone(&db_pool));
    let plan_usecase = PlanUseCase::new(Arc::new(plan_repository));

    Router::new()
        .route("/", get(list_plans).post(create_plan))
        .route(
            "/:plan_id",
            get(get_plan).patch(update_plan).delete(deactivate_plan),
        )
        .with_state(Arc::new(plan_usecase))
}

pub async fn create_plan<T>(
    State(plan_usecase): State<Arc<PlanUseCase<T>>>,
    Json(insert_plan_model): Json<InsertPlanModel>,
) -> Result<impl IntoResponse, PlanError>
where
    T: PlanRepository + Send + Sync + 'static,
{
    let plan = plan_usecase.create_plan(insert_plan_model).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn list_plans<T>(
    State(plan_usecase): State<Arc<PlanUseCase<T>>>,
) -> Result<impl IntoResponse, PlanError>
where
    T: PlanRepository + Send + Sync + 'static,
{
    let plans = plan_usecase.list_plans().await?;
    Ok(Json(plans))
}

pub async fn get_plan<T>(
    State(plan_usecase): State<Arc<PlanUseCase<T>>>,
    Path(plan_id): Path<i32>,
) -> Result<impl IntoResponse, PlanError>
where
    T: PlanRepository + Send + Sync + 'static,
{
    let plan = plan_usecase.get_plan(plan_id).await?;
    Ok(Json(plan))
}

pub async fn update_plan<T>(
    State(plan_usecase): State<Arc<PlanUseCase<T>>>,
    Path(plan_id): Path<i32>,
    Json(update_plan_model): Json<UpdatePlanModel>,
) -> Result<impl IntoResponse, PlanError>
where
    T: PlanRepository + Send + Sync + 'static,
{
    let plan = plan_usecase.update_plan(plan_id, update_plan_model).await?;
    Ok(Json(plan))
}

pub async fn deactivate_plan<T>(
    State(plan_usecase): State<Arc<PlanUseCase<T>>>,
    Path(plan_id): Path<i32>,
) -> Result<impl IntoResponse, PlanError>
where
    T: PlanRepository + Send + Sync + 'static,
{
    let plan = plan_usecase.deactivate_plan(plan_id).await?;
    Ok(Json(plan))
}
