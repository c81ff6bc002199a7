mod cli;
mod config;
mod logging;
mod run;

use anyhow::Result;
use engine_logging::{engine_error, engine_warn};
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let opts = cli::parse();
    let config = AppConfig::resolve(&opts)?;
    logging::initialize(config.log, opts.log_level(), &config.log_file);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                engine_warn!("Interrupted; stopping after the current round");
                cancel.cancel();
            }
        }
    });

    match run::run(&config, cancel).await {
        Ok(report) => {
            println!("{}", report.summary_line());
            Ok(())
        }
        Err(err) => {
            engine_error!("{err:#}");
            Err(err)
        }
    }
}
