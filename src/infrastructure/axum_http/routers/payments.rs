use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    domain::{
        repositories::{payments::PaymentRepository, plans::PlanRepository},
        value_objects::payments::SubmitPaymentModel,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        repositories::{payments::PaymentPostgres, plans::PlanPostgres},
    },
    usecases::{
        clock::SystemClock,
        notifier::TracingNotifier,
        payments::{PaymentError, PaymentUseCase},
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let payment_repository = PaymentPostgres::new(Arc::clone(&db_pool));
    let plan_repository = PlanPostgres::new(Arc::clone(&db_pool));
    let payment_usecase = PaymentUseCase::new(
        Arc::new(payment_repository),
        Arc::new(plan_repository),
        Arc::new(SystemClock),
        Arc::new(TracingNotifier),
    );

    Router::new()
        .route("/", post(submit_payment))
        .route("/pending", get(list_pending))
        .route("/:payment_id/verify", post(verify_payment))
        .with_state(Arc::new(payment_usecase))
}

pub async fn submit_payment<Pay, P>(
    State(payment_usecase): State<Arc<PaymentUseCase<Pay, P>>>,
    Json(submit_payment_model): Json<SubmitPaymentModel>,
) -> Result<impl IntoResponse, PaymentError>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    let payment = payment_usecase.submit_payment(submit_payment_model).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn list_pending<Pay, P>(
    State(payment_usecase): State<Arc<PaymentUseCase<Pay, P>>>,
) -> Result<impl IntoResponse, PaymentError>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    let payments = payment_usecase.list_pending().await?;
    Ok(Json(payments))
}

pub async fn verify_payment<Pay, P>(
    State(payment_usecase): State<Arc<PaymentUseCase<Pay, P>>>,
    Path(payment_id): Path<i64>,
) -> Result<impl IntoResponse, PaymentError>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    let payment = payment_usecase.verify_payment(payment_id).await?;
    Ok(Json(payment))
}
