//! hucsnap Subcommands

use std::path::{Path, PathBuf};

use abscissa_core::{
    Application, Configurable, FrameworkError, FrameworkErrorKind, Runnable, Shutdown,
};
use tracing::info;

use crate::{
    cli::EntryPoint,
    config::HucsnapConfig,
    error::{Error, ErrorKind},
    fl,
    prelude::APP,
};

mod claim_snapshot;
mod example_config;
mod process_snapshot;

/// hucsnap Configuration Filename
pub const CONFIG_FILE: &str = "hucsnap.toml";

impl Runnable for EntryPoint {
    fn run(&self) {
        self.cmd.run()
    }
}

impl Configurable<HucsnapConfig> for EntryPoint {
    fn config_path(&self) -> Option<PathBuf> {
        // An explicitly requested config file must exist; the default one is optional.
        match &self.config {
            Some(path) => Some(path.clone()),
            None => {
                let filename = Path::new(CONFIG_FILE);
                filename.exists().then(|| filename.to_path_buf())
            }
        }
    }

    fn process_config(&self, config: HucsnapConfig) -> Result<HucsnapConfig, FrameworkError> {
        config.snapshot.exchange_rate().map_err(|rate| {
            FrameworkErrorKind::ConfigError.context(fl!("err-config-invalid-rate", rate = rate))
        })?;
        Ok(config)
    }
}

/// An async version of the [`Runnable`] trait.
pub(crate) trait AsyncRunnable {
    /// Runs this `AsyncRunnable`.
    async fn run(&self) -> Result<(), Error>;

    /// Runs this `AsyncRunnable` using the `abscissa_tokio` runtime.
    ///
    /// Interrupts (Ctrl-C on most platforms, corresponding to `SIGINT` on Unix) and
    /// `SIGTERM` on Unix cause [`AsyncRunnable::run`] to be cancelled at an `.await`
    /// boundary. Every command is safe to rerun after being cancelled.
    ///
    /// This should be called from [`Runnable::run`].
    fn run_on_runtime(&self) {
        match abscissa_tokio::run(&APP, async move {
            tokio::select! {
                biased;
                res = shutdown() => res,
                result = self.run() => result,
            }
        }) {
            Ok(Ok(())) => (),
            Ok(Err(e)) => {
                eprintln!("{e}");
                APP.shutdown_with_exitcode(Shutdown::Forced, 1);
            }
            Err(e) => {
                eprintln!("{e}");
                APP.shutdown_with_exitcode(Shutdown::Forced, 1);
            }
        }
    }
}

/// Resolves once the process is asked to stop.
///
/// An interrupted command has not finished its work, so this always resolves to an error.
async fn shutdown() -> Result<(), Error> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint =
            signal(SignalKind::interrupt()).map_err(|e| ErrorKind::Init.context(e))?;
        let mut sigterm =
            signal(SignalKind::terminate()).map_err(|e| ErrorKind::Init.context(e))?;

        let signal = tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
        };

        info!("Received {signal}, stopping");
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| ErrorKind::Init.context(e))?;

        info!("Received Ctrl-C, stopping");
    }

    Err(ErrorKind::Generic.context(fl!("err-interrupted")).into())
}
