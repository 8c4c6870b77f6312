//! `claim-snapshot` subcommand

use abscissa_core::Runnable;
use tracing::info;

use crate::{
    cli::ClaimSnapshotCmd,
    commands::AsyncRunnable,
    components::{
        claim::{self, ClaimError, ClaimParams},
        snapshot::SnapshotDataset,
        wallet::WalletRole,
        wallet_rpc::{WalletRpc, redact_endpoint},
    },
    error::Error,
    prelude::*,
};

impl AsyncRunnable for ClaimSnapshotCmd {
    async fn run(&self) -> Result<(), Error> {
        let config = APP.config();

        let dataset = SnapshotDataset::read(config.snapshot.output())
            .await
            .map_err(|e| ClaimError::Dataset(e.to_string()))?;
        info!("Loaded {} snapshot entries", dataset.len());

        let timeout = config.rpc.timeout();
        let legacy = WalletRpc::connect(&self.legacy_rpc, WalletRole::Legacy, timeout)?;
        let successor = WalletRpc::connect(&self.successor_rpc, WalletRole::Successor, timeout)?;
        info!(
            "Claiming from {} into {}",
            redact_endpoint(&self.legacy_rpc),
            redact_endpoint(&self.successor_rpc),
        );

        let params = ClaimParams {
            secret_key_version: config.successor.secret_keys(),
            label: config.claim.label().to_owned(),
        };
        claim::claim(&dataset, &legacy, &successor, &params).await?;

        Ok(())
    }
}

impl Runnable for ClaimSnapshotCmd {
    fn run(&self) {
        self.run_on_runtime();
    }
}
