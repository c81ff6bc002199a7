use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use engine_logging::{engine_info, engine_warn};
use harvester_core::{completion_percent, CompletionReason, Record};
use harvester_engine::{
    export_records, locate_table, read_count_hint, run_wizard, ChromeDriver, DriverError,
    ExportContext, ExportOptions, ExportSummary, HarvestError, HarvestOutcome, Harvester,
    LocateSettings, PageDriver,
};
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;

#[derive(Debug)]
pub struct RunReport {
    pub summary: ExportSummary,
    pub reason: CompletionReason,
    pub target_count_hint: Option<u64>,
}

impl RunReport {
    pub fn summary_line(&self) -> String {
        let count = self.summary.count;
        match (self.target_count_hint, self.summary.completion_percent) {
            (Some(total), Some(pct)) => {
                format!("Collection complete: {count}/{total} products ({pct:.1}%), {}", self.reason)
            }
            _ => format!("Collection complete: {count} products, {}", self.reason),
        }
    }
}

/// Open the browser, harvest, and always close it again.
pub async fn run(config: &AppConfig, cancel: CancellationToken) -> Result<RunReport> {
    engine_info!("Opening {}", config.target_url);
    let driver = ChromeDriver::launch(&config.chrome_settings(), &config.target_url)
        .await
        .context("failed to launch browser")?;

    let result = run_session(&driver, config, cancel).await;

    if let Err(err) = driver.close().await {
        engine_warn!("Browser did not close cleanly: {err}");
    }
    result
}

/// Everything after the page is open. Records collected before a fatal
/// driver failure are still exported.
pub async fn run_session<D>(
    driver: &D,
    config: &AppConfig,
    cancel: CancellationToken,
) -> Result<RunReport>
where
    D: PageDriver + ?Sized,
{
    let steps = config.wizard_steps();
    if !steps.is_empty() {
        let clicked = run_wizard(driver, &steps).await.context("wizard failed")?;
        engine_info!("Wizard finished: {clicked}/{} steps clicked something", steps.len());
    }

    let table_selector = match &config.table_selector {
        Some(selector) => selector.clone(),
        None => locate_table(driver, &LocateSettings::default())
            .await
            .context("failed to locate table")?,
    };

    let target_count_hint = match read_count_hint(driver).await {
        Ok(Some(total)) => Some(total),
        Ok(None) => config.default_count_hint,
        Err(err) if err.is_transient() => {
            engine_warn!("Could not read row banner: {err}");
            config.default_count_hint
        }
        Err(err) => return Err(err).context("failed to read page text"),
    };

    let harvester = Harvester::new(config.harvest_settings()).with_cancellation(cancel);
    let result = harvester
        .harvest(driver, &table_selector, target_count_hint)
        .await;
    let (records, context, ending) = split_result(result, target_count_hint);

    let options = ExportOptions {
        manifest_path: config.manifest_path(),
        harvested_utc: Arc::new(|| Utc::now().to_rfc3339()),
        ..ExportOptions::new(&config.output)
    };
    let summary = export_records(&records, context, &options)
        .with_context(|| format!("failed to write {}", config.output.display()))?;
    engine_info!(
        "Saved {} products to {}",
        summary.count,
        summary.output_path.display()
    );

    match ending {
        Ok(reason) => Ok(RunReport {
            summary,
            reason,
            target_count_hint: context.target_count_hint,
        }),
        Err(err) => Err(anyhow::Error::new(err).context(format!(
            "harvest aborted at round {}; {} partial records saved ({})",
            context.rounds,
            summary.count,
            percent_text(summary.count, context.target_count_hint),
        ))),
    }
}

/// Records to export, the context describing them, and how the harvest ended.
fn split_result(
    result: Result<HarvestOutcome, HarvestError>,
    target_count_hint: Option<u64>,
) -> (Vec<Record>, ExportContext, Result<CompletionReason, DriverError>) {
    match result {
        Ok(outcome) => {
            let context = ExportContext {
                reason: Some(outcome.reason),
                rounds: outcome.rounds,
                target_count_hint: outcome.target_count_hint,
            };
            (outcome.records, context, Ok(outcome.reason))
        }
        Err(HarvestError::Driver {
            source,
            partial,
            round,
        }) => {
            let context = ExportContext {
                reason: None,
                rounds: round,
                target_count_hint,
            };
            (partial, context, Err(source))
        }
    }
}

fn percent_text(count: usize, hint: Option<u64>) -> String {
    match completion_percent(count, hint) {
        Some(pct) => format!("{pct:.1}% of {}", hint.unwrap_or_default()),
        None => "no target count".to_string(),
    }
}
