use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use abscissa_core::{Component, FrameworkError, FrameworkErrorKind, terminal::ColorChoice};

/// Abscissa component for initializing the `tracing` subsystem.
///
/// Diagnostics go to stderr; stdout is left for command output.
#[derive(Component, Debug)]
#[component(core)]
pub(crate) struct Tracing {}

impl Tracing {
    pub(crate) fn new(color_choice: ColorChoice, verbose: bool) -> Result<Self, FrameworkError> {
        let filter = std::env::var("RUST_LOG")
            .unwrap_or_else(|_| if verbose { "debug" } else { "info" }.to_owned());

        // Route `log` records from dependencies through `tracing`.
        LogTracer::init().map_err(|e| FrameworkErrorKind::ComponentError.context(e))?;

        let subscriber = FmtSubscriber::builder()
            .with_writer(std::io::stderr)
            .with_ansi(!matches!(color_choice, ColorChoice::Never))
            .with_env_filter(filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| FrameworkErrorKind::ComponentError.context(e))?;

        Ok(Self {})
    }
}
