use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    domain::{
        repositories::{plans::PlanRepository, subscriptions::SubscriptionRepository},
        value_objects::subscriptions::{InsertSubscriptionModel, RenewSubscriptionModel},
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        repositories::{plans::PlanPostgres, subscriptions::SubscriptionPostgres},
    },
    usecases::{
        clock::SystemClock,
        subscriptions::{SubscriptionError, SubscriptionUseCase},
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let plan_repository = PlanPostgres::new(Arc::clone(&db_pool));
    let subscription_usecase = SubscriptionUseCase::new(
        Arc::new(subscription_repository),
        Arc::new(plan_repository),
        Arc::new(SystemClock),
    );

    Router::new()
        .route("/", post(create_subscription))
        .route("/renew", post(renew_subscription))
        .route("/user/:user_id", get(list_for_user))
        .route("/user/:user_id/latest", get(latest_for_user))
        .with_state(Arc::new(subscription_usecase))
}

pub async fn create_subscription<S, P>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, P>>>,
    Json(insert_subscription_model): Json<InsertSubscriptionModel>,
) -> Result<impl IntoResponse, SubscriptionError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    let subscription = subscription_usecase
        .create_subscription(insert_subscription_model)
        .await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

pub async fn renew_subscription<S, P>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, P>>>,
    Json(renew_subscription_model): Json<RenewSubscriptionModel>,
) -> Result<impl IntoResponse, SubscriptionError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    let subscription = subscription_usecase
        .renew_for_user(renew_subscription_model.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

pub async fn list_for_user<S, P>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, P>>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, SubscriptionError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    let subscriptions = subscription_usecase.list_for_user(user_id).await?;
    Ok(Json(subscriptions))
}

pub async fn latest_for_user<S, P>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, P>>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, SubscriptionError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    let subscription = subscription_usecase.latest_for_user(user_id).await?;
    Ok(Json(subscription))
}
