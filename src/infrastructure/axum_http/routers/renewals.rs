use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::error;

use crate::{
    config::config_model::DotEnvyConfig,
    domain::repositories::subscriptions::SubscriptionRepository,
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad, repositories::subscriptions::SubscriptionPostgres,
    },
    payments::random_gateway::RandomPaymentGateway,
    usecases::{
        clock::SystemClock,
        notifier::TracingNotifier,
        renewals::{PaymentGateway, RenewalUseCase},
    },
};

// The periodic trigger lives outside this service; operators (or a cron
// hitting this route) kick off one batch pass at a time.
pub fn routes(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Router {
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let gateway = RandomPaymentGateway::new(config.renewal.success_rate);
    let renewal_usecase = RenewalUseCase::new(
        Arc::new(subscription_repository),
        Arc::new(gateway),
        Arc::new(SystemClock),
        Arc::new(TracingNotifier),
    );

    Router::new()
        .route("/run", post(run_renewal_batch))
        .with_state(Arc::new(renewal_usecase))
}

pub async fn run_renewal_batch<S, G>(
    State(renewal_usecase): State<Arc<RenewalUseCase<S, G>>>,
) -> Response
where
    S: SubscriptionRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    match renewal_usecase.run().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => {
            error!(error = ?err, "renewals: batch run failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}
