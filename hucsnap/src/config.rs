//! hucsnap Config

use std::collections::HashMap;
use std::fmt::{self, Write};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use documented::{Documented, DocumentedFields};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::components::{
    amount::{self, default_exchange_rate},
    codec::{AddressVersion, SecretKeyVersion},
};

/// hucsnap Configuration
///
/// Every field is an `Option<T>`, so that leaving a field unset means "use the current
/// default" while setting it (even to the default value) pins that value.
#[derive(Clone, Debug, Default, Deserialize, Serialize, DocumentedFields)]
#[serde(deny_unknown_fields)]
pub struct HucsnapConfig {
    /// Settings for the snapshot files and the conversion.
    #[serde(default)]
    pub snapshot: SnapshotSection,

    /// Parameters of the successor chain.
    #[serde(default)]
    pub successor: SuccessorSection,

    /// Settings for importing claimed keys.
    #[serde(default)]
    pub claim: ClaimSection,

    /// Settings for the wallet JSON-RPC connections.
    #[serde(default)]
    pub rpc: RpcSection,
}

impl HucsnapConfig {
    /// Loads the configuration from the given TOML file, or the defaults if `None`.
    ///
    /// The config is validated the same way as when it is loaded for a command.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = match path {
            None => Self::default(),
            Some(path) => {
                let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
                toml::from_str(&contents).map_err(ConfigError::Parse)?
            }
        };

        config
            .snapshot
            .exchange_rate()
            .map_err(ConfigError::InvalidExchangeRate)?;

        Ok(config)
    }
}

/// Errors that can occur while loading a config file with [`HucsnapConfig::load`].
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file is not a valid config.
    Parse(toml::de::Error),
    /// The configured exchange rate is not a positive amount with at most 8 decimals.
    InvalidExchangeRate(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => fmt::Display::fmt(e, f),
            ConfigError::Parse(e) => fmt::Display::fmt(e, f),
            ConfigError::InvalidExchangeRate(rate) => write!(
                f,
                "{}",
                crate::fl!("err-config-invalid-rate", rate = rate.as_str())
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for the snapshot files and the conversion.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
#[serde(deny_unknown_fields)]
pub struct SnapshotSection {
    /// Path to the raw snapshot balances, relative to the working directory.
    ///
    /// The file holds a JSON object `{"addresses": {ADDRESS: BALANCE, ...}}`.
    pub balances: Option<PathBuf>,

    /// Path of the processed snapshot, relative to the working directory.
    ///
    /// `process-snapshot` writes this file, and `claim-snapshot` reads it.
    pub output: Option<PathBuf>,

    /// Successor-chain coins credited per whole Huntercoin in the snapshot.
    ///
    /// Written as a decimal string. Must be positive, with at most 8 decimal places.
    pub exchange_rate: Option<String>,
}

impl SnapshotSection {
    /// Path to the raw snapshot balances.
    ///
    /// Default is `snapshot-balances.json`.
    pub fn balances(&self) -> &Path {
        self.balances
            .as_deref()
            .unwrap_or_else(|| Path::new("snapshot-balances.json"))
    }

    /// Path of the processed snapshot.
    ///
    /// Default is `processed-snapshot.json`.
    pub fn output(&self) -> &Path {
        self.output
            .as_deref()
            .unwrap_or_else(|| Path::new("processed-snapshot.json"))
    }

    /// The exchange rate, or the configured text if it is not a usable rate.
    ///
    /// Default is `0.23338000`.
    pub fn exchange_rate(&self) -> Result<Decimal, String> {
        match &self.exchange_rate {
            None => Ok(default_exchange_rate()),
            Some(text) => Decimal::from_str(text.trim())
                .ok()
                .filter(|rate| amount::validate_rate(*rate))
                .ok_or_else(|| text.clone()),
        }
    }
}

/// Parameters of the successor chain.
///
/// These only need changing when claiming onto a chain other than the one the snapshot
/// was made for.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
#[serde(deny_unknown_fields)]
pub struct SuccessorSection {
    /// Base58Check version byte of successor-chain addresses.
    pub address_version: Option<u8>,

    /// Base58Check version byte of successor-chain WIF private keys.
    pub secret_key_version: Option<u8>,
}

impl SuccessorSection {
    /// Base58Check version byte of successor-chain addresses.
    ///
    /// Default is 28.
    pub fn address_version(&self) -> u8 {
        self.address_version.unwrap_or(28)
    }

    /// Base58Check version byte of successor-chain WIF private keys.
    ///
    /// Default is 130.
    pub fn secret_key_version(&self) -> u8 {
        self.secret_key_version.unwrap_or(130)
    }

    pub(crate) fn addresses(&self) -> AddressVersion {
        AddressVersion(self.address_version())
    }

    pub(crate) fn secret_keys(&self) -> SecretKeyVersion {
        SecretKeyVersion(self.secret_key_version())
    }
}

/// Settings for importing claimed keys.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
#[serde(deny_unknown_fields)]
pub struct ClaimSection {
    /// The wallet label attached to every imported key.
    pub label: Option<String>,
}

impl ClaimSection {
    /// The wallet label attached to every imported key.
    ///
    /// Default is `huc-snapshot`.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("huc-snapshot")
    }
}

/// Settings for the wallet JSON-RPC connections.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
#[serde(deny_unknown_fields)]
pub struct RpcSection {
    /// Timeout (in seconds) during HTTP requests.
    pub timeout: Option<u64>,
}

impl RpcSection {
    /// Timeout during HTTP requests.
    ///
    /// Default is 30 seconds.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(30))
    }
}

impl HucsnapConfig {
    /// Generates an example config file, with all default values included as comments.
    pub fn generate_example() -> String {
        // Keep in sync with the config structure.
        let conf = HucsnapConfig::default();
        let field_defaults = [
            snapshot("balances", conf.snapshot.balances()),
            snapshot("output", conf.snapshot.output()),
            snapshot("exchange_rate", default_exchange_rate().to_string()),
            successor("address_version", conf.successor.address_version()),
            successor("secret_key_version", conf.successor.secret_key_version()),
            claim("label", conf.claim.label()),
            rpc("timeout", conf.rpc.timeout().as_secs()),
        ]
        .into_iter()
        .collect::<HashMap<_, _>>();

        const SNAPSHOT: &str = "snapshot";
        const SUCCESSOR: &str = "successor";
        const CLAIM: &str = "claim";
        const RPC: &str = "rpc";
        fn snapshot<T: Serialize>(
            f: &'static str,
            d: T,
        ) -> ((&'static str, &'static str), Option<toml::Value>) {
            field(SNAPSHOT, f, d)
        }
        fn successor<T: Serialize>(
            f: &'static str,
            d: T,
        ) -> ((&'static str, &'static str), Option<toml::Value>) {
            field(SUCCESSOR, f, d)
        }
        fn claim<T: Serialize>(
            f: &'static str,
            d: T,
        ) -> ((&'static str, &'static str), Option<toml::Value>) {
            field(CLAIM, f, d)
        }
        fn rpc<T: Serialize>(
            f: &'static str,
            d: T,
        ) -> ((&'static str, &'static str), Option<toml::Value>) {
            field(RPC, f, d)
        }
        fn field<T: Serialize>(
            s: &'static str,
            f: &'static str,
            d: T,
        ) -> ((&'static str, &'static str), Option<toml::Value>) {
            ((s, f), toml::Value::try_from(d).ok())
        }

        let sec_def = |section_name, field_name| {
            field_defaults
                .get(&(section_name, field_name))
                .and_then(Option::as_ref)
        };

        let mut config = r"# Default configuration for hucsnap.
#
# This file is generated as an example using hucsnap's current defaults. It can
# be used as a skeleton for custom configs.
#
# Every field is commented out, and set to the current default value that
# hucsnap will use for it. Uncomment a field to override it.

"
        .to_owned();

        fn write_section<'a, T: Documented + DocumentedFields>(
            config: &mut String,
            section_name: &'static str,
            sec_def: &impl Fn(&'static str, &'static str) -> Option<&'a toml::Value>,
        ) {
            writeln!(config).unwrap();
            writeln!(config, "#").unwrap();
            for line in T::DOCS.lines() {
                if line.is_empty() {
                    writeln!(config, "#").unwrap();
                } else {
                    writeln!(config, "# {line}").unwrap();
                }
            }
            writeln!(config, "#").unwrap();
            writeln!(config, "[{section_name}]").unwrap();
            writeln!(config).unwrap();

            for field_name in T::FIELD_NAMES {
                write_field::<T>(config, field_name, sec_def(section_name, field_name));
            }
        }

        fn write_field<T: DocumentedFields>(
            config: &mut String,
            field_name: &str,
            field_default: Option<&toml::Value>,
        ) {
            for line in T::get_field_docs(field_name).unwrap_or_default().lines() {
                let line = line.strip_prefix(' ').unwrap_or(line);
                if line.is_empty() {
                    writeln!(config, "#").unwrap();
                } else {
                    writeln!(config, "# {line}").unwrap();
                }
            }

            write!(config, "#{field_name} = ").unwrap();
            match field_default {
                Some(present) => {
                    Serialize::serialize(&present, toml::ser::ValueSerializer::new(config)).unwrap()
                }
                None => write!(config, "UNSET").unwrap(),
            }

            writeln!(config).unwrap();
            writeln!(config).unwrap();
        }

        for field_name in Self::FIELD_NAMES {
            match *field_name {
                SNAPSHOT => write_section::<SnapshotSection>(&mut config, field_name, &sec_def),
                SUCCESSOR => write_section::<SuccessorSection>(&mut config, field_name, &sec_def),
                CLAIM => write_section::<ClaimSection>(&mut config, field_name, &sec_def),
                RPC => write_section::<RpcSection>(&mut config, field_name, &sec_def),
                _ => (),
            }
        }

        config
    }
}
