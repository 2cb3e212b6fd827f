mod bootstrap;

use anyhow::{Context, Result};
use mttr_core::owners::OwnerDirectory;
use mttr_core::settings::Settings;
use mttr_core::time_utils::resolve_timezone;
use mttr_core::window::TimeWindow;
use mttr_data::analysis::analyze_month;
use mttr_data::diagnostics::TracingSink;
use mttr_data::fetcher::IssueFetcher;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("jira-mttr v{} starting", env!("CARGO_PKG_VERSION"));

    let tz = resolve_timezone(&settings.timezone).context("Got error resolving timezone")?;
    let window = TimeWindow::from_month(&settings.month, tz).context("Got error setting month")?;
    tracing::info!("Measuring tickets resolved in {} ({})", window, tz);

    let owners_path = bootstrap::owners_path(&settings.owners);
    let owners = OwnerDirectory::load(&owners_path)
        .context("Failed to get owners data from owners file")?;

    let mut fetcher = IssueFetcher::new(&settings.url, settings.page_size, settings.timeout)?;
    if let Some((user, token)) = settings.credentials()? {
        fetcher = fetcher.with_credentials(user, token);
    }

    let report = analyze_month(
        &fetcher,
        &window,
        &owners,
        settings.parse_scope(),
        &mut TracingSink,
    )
    .await
    .context("Got error getting MTTR")?;

    match settings.format.as_str() {
        "json" => println!("{}", report.render_json()?),
        _ => print!("{}", report.render_text()),
    }

    Ok(())
}
