//! `process-snapshot` subcommand

use abscissa_core::Runnable;
use tokio::fs;
use tracing::info;

use crate::{
    cli::ProcessSnapshotCmd,
    commands::AsyncRunnable,
    components::{
        convert::{self, ConvertError},
        snapshot::RawBalances,
    },
    error::Error,
    prelude::*,
};

impl AsyncRunnable for ProcessSnapshotCmd {
    async fn run(&self) -> Result<(), Error> {
        let config = APP.config();
        let rate = config
            .snapshot
            .exchange_rate()
            .map_err(ConvertError::InvalidRate)?;

        let balances_path = config.snapshot.balances();
        info!("Reading snapshot balances from {}", balances_path.display());
        let balances = fs::read_to_string(balances_path)
            .await
            .map_err(|e| e.to_string())
            .and_then(|json| RawBalances::from_json(&json).map_err(|e| e.to_string()))
            .map_err(|e| {
                ConvertError::Balances(format!("{}: {e}", balances_path.display()))
            })?;

        let (dataset, _) =
            convert::convert(&balances.addresses, config.successor.addresses(), rate)?;

        let output_path = config.snapshot.output();
        dataset
            .write(output_path)
            .await
            .map_err(|e| ConvertError::Dataset(e.to_string()))?;
        info!(
            "Wrote {} snapshot entries to {}",
            dataset.len(),
            output_path.display()
        );

        Ok(())
    }
}

impl Runnable for ProcessSnapshotCmd {
    fn run(&self) {
        self.run_on_runtime();
    }
}
