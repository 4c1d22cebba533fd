/// Meridian Gateway - trip-planning integration service
///
/// A unified REST API over third-party places, weather and calendar
/// providers, with a tiered cache (Redis + SQLite) between client requests
/// and the upstream APIs.

mod api;
mod cache;
mod calendar;
mod config;
mod context;
mod db;
mod error;
mod fingerprint;
mod metrics;
mod places;
mod rate_limit;
mod server;
mod weather;

use config::GatewayConfig;
use context::AppContext;
use error::GatewayResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> GatewayResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meridian_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Print banner
    print_banner();

    // Load configuration
    let config = GatewayConfig::from_env()?;

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    __  ___          _     ___
   /  |/  /__  _____(_)___/ (_)___ _____
  / /|_/ / _ \/ ___/ / __  / / __ `/ __ \
 / /  / /  __/ /  / / /_/ / / /_/ / / / /
/_/  /_/\___/_/  /_/\__,_/_/\__,_/_/ /_/

        Integration Gateway v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
