//! MultiversX transaction pipeline CLI.
//!
//! ```text
//! mvx-pipeline <operation>
//!     → config (MVX_PIPELINE_CONFIG or ./pipeline.toml, else devnet defaults)
//!     → wallet (key file + password from the environment)
//!     → pipeline run → report on stdout, logs on stderr
//! ```

use std::path::Path;
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::Parser;

use mvx_pipeline::blockchain::{ApiNetworkProvider, NetworkProvider, TransactionSigner, Wallet};
use mvx_pipeline::commands::Cli;
use mvx_pipeline::config::load_from_env;
use mvx_pipeline::lifecycle::signals::spawn_interrupt_handler;
use mvx_pipeline::observability::logging::init_logging;
use mvx_pipeline::{Pipeline, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::InvalidSubcommand | ErrorKind::UnknownArgument) => {
            println!("Operation not found");
            return Ok(());
        }
        Err(e) => e.exit(),
    };

    let config = load_from_env()?;
    init_logging(&config.observability);

    tracing::info!(
        operation = ?cli.command,
        api_url = %config.network.api_url,
        chain_id = %config.network.chain_id,
        "mvx-pipeline v0.1.0 starting"
    );

    let wallet = Wallet::from_keystore_env(Path::new(&config.wallet.key_file), &config.wallet.password_env)?;
    let sender = wallet.address();
    let signer: Arc<dyn TransactionSigner> = Arc::new(wallet);
    let network: Arc<dyn NetworkProvider> =
        Arc::new(ApiNetworkProvider::new(&config.network, config.retries.clone())?);

    let shutdown = Shutdown::new();
    spawn_interrupt_handler(shutdown.clone());
    let pipeline = Pipeline::new(network, signer, &config)?.with_shutdown(shutdown);

    match cli.command.descriptor(&config, &sender)? {
        Some(operation) => {
            let report = pipeline.run(&operation).await?;
            if let Some(url) = report.explorer_url() {
                println!("Check in the Explorer: {}", url);
            }
            println!("{}", report);
        }
        None => {
            let overview = pipeline.account_overview().await?;
            println!("{}", overview);
        }
    }

    Ok(())
}
