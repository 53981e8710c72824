use std::sync::Arc;

use anyhow::{Context, Result};
use shared::MonthSelection;
use tracing::info;

use expense_dashboard::services::logging::init_logging;
use expense_dashboard::{
    ApiClient, DashboardConfig, DashboardController, DashboardState, LoggingErrorReporter,
    StaticToken,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = DashboardConfig::from_env()?;
    let token = config.require_token()?.to_string();
    let month = match std::env::args().nth(1) {
        Some(raw) => raw
            .parse::<MonthSelection>()
            .with_context(|| format!("Invalid month argument {:?}", raw))?,
        None => MonthSelection::current(),
    };

    info!("Using backend at {}", config.backend_url);
    let client = ApiClient::from_config(&config, Arc::new(StaticToken(token)))?;
    let controller = DashboardController::new(Arc::new(client), Arc::new(LoggingErrorReporter));
    let mut state =
        DashboardState::for_month(month).with_chart_category(config.chart_label.clone());

    if !controller.initialize(&mut state).await {
        anyhow::bail!("Failed to load the dashboard for {}", month.display_name());
    }

    info!(
        "{}: {} expenses across {} labels, total {:.2}",
        month.display_name(),
        state.expenses().len(),
        state.labels().len(),
        state.total_for_month()
    );

    println!("{}", serde_json::to_string_pretty(state.chart())?);
    Ok(())
}
