use anyhow::{Ok, Result, ensure};

use super::config_model::DotEnvyConfig;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = super::config_model::Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = super::config_model::Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let success_rate: f64 = std::env::var("RENEWAL_SUCCESS_RATE")
        .unwrap_or_else(|_| "0.8".to_string())
        .parse()?;
    ensure!(
        (0.0..=1.0).contains(&success_rate),
        "RENEWAL_SUCCESS_RATE must be between 0 and 1"
    );

    Ok(DotEnvyConfig {
        server,
        database,
        renewal: super::config_model::Renewal { success_rate },
    })
}
