//! hucsnap Abscissa Application

use abscissa_core::{
    Application, Component, FrameworkError, FrameworkErrorKind, StandardPaths,
    application::{self, AppCell},
    config::{self, CfgCell},
    terminal::{ColorChoice, component::Terminal},
};
use abscissa_tokio::TokioComponent;
use i18n_embed::unic_langid::LanguageIdentifier;

use crate::{cli::EntryPoint, components::tracing::Tracing, config::HucsnapConfig, i18n};

/// Application state
pub static APP: AppCell<HucsnapApp> = AppCell::new();

/// hucsnap Application
#[derive(Debug)]
pub struct HucsnapApp {
    /// Application configuration.
    config: CfgCell<HucsnapConfig>,

    /// Application state.
    state: application::State<Self>,
}

/// Initializes a new application instance.
///
/// By default no configuration is loaded, and the framework state is initialized to a
/// default, empty state (no components, threads, etc).
impl Default for HucsnapApp {
    fn default() -> Self {
        Self {
            config: CfgCell::default(),
            state: application::State::default(),
        }
    }
}

impl Application for HucsnapApp {
    type Cmd = EntryPoint;
    type Cfg = HucsnapConfig;
    type Paths = StandardPaths;

    fn config(&self) -> config::Reader<HucsnapConfig> {
        self.config.read()
    }

    fn state(&self) -> &application::State<Self> {
        &self.state
    }

    /// Replaces Abscissa's default tracing component with one that logs to stderr.
    fn framework_components(
        &mut self,
        command: &Self::Cmd,
    ) -> Result<Vec<Box<dyn Component<Self>>>, FrameworkError> {
        let color = self.term_colors(command);
        let terminal = Terminal::new(color);
        let tracing = Tracing::new(color, command.verbose)?;

        Ok(vec![Box::new(terminal), Box::new(tracing)])
    }

    fn register_components(&mut self, command: &Self::Cmd) -> Result<(), FrameworkError> {
        let mut components = self.framework_components(command)?;

        // Wallet calls are strictly sequential, so a single thread is enough.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| FrameworkErrorKind::ComponentError.context(e))?;
        components.push(Box::new(TokioComponent::from(runtime)));

        self.state.components_mut().register(components)
    }

    fn after_config(&mut self, config: Self::Cfg) -> Result<(), FrameworkError> {
        // Configure components
        let mut components = self.state.components_mut();
        components.after_config(&config)?;
        self.config.set_once(config);
        Ok(())
    }

    fn term_colors(&self, _command: &EntryPoint) -> ColorChoice {
        ColorChoice::Auto
    }
}

/// Boots the hucsnap application, parsing subcommand and options from command-line
/// arguments, and terminating when complete.
pub fn boot(requested_languages: Vec<LanguageIdentifier>) {
    // We load languages here so that the app's CLI usage text can be localized.
    i18n::load_languages(&requested_languages);

    // Now do the normal Abscissa boot.
    abscissa_core::boot(&APP);
}
