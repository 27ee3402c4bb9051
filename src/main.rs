use dotenvy::dotenv;
use home_harmony::{
    config::{database, household},
    core::{member, report},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    // 3. Load the household configuration
    let config = household::load_default_config()
        .inspect_err(|e| error!("Failed to load household configuration: {}", e))?;
    info!(household = %config.household.name, "Loaded household configuration");

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed members from the config (existing members are left untouched)
    let seeded = member::seed_members(&db, &config.members)
        .await
        .inspect_err(|e| error!("Failed to seed members: {}", e))?;
    info!(seeded, "Members seeded");

    // 6. Print the current settlement report
    let report = report::generate_settlement_report(&db, (&config.ledger).into())
        .await
        .inspect_err(|e| error!("Failed to generate settlement report: {}", e))?;

    for balance in &report.balances {
        info!("{}", report::format_balance(balance));
    }
    if report.is_settled() {
        info!("Everyone is settled up.");
    }
    for suggestion in &report.suggestions {
        info!("{}", report::format_settlement_line(suggestion));
    }

    Ok(())
}
