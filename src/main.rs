use borrel_status::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Load .env before the log filter is read
    dotenvy::dotenv().ok();

    // Initialize logging
    startup::init_logging()?;

    info!("Updating borrel status");

    // Errors are reported on stdout, the exit code stays 0
    println!("{}", startup::run_and_report().await);

    Ok(())
}
