//! Claiming snapshot balances from a live Huntercoin wallet.
//!
//! Claiming runs in two passes. The scan pass walks the whole snapshot, asks the legacy
//! wallet which addresses it owns, and collects their private keys re-encoded for the
//! successor chain. Only once the scan has finished without error does the import pass
//! hand those keys to the successor wallet. A failure during the scan therefore leaves
//! the successor wallet untouched, and since importing a known key again is harmless,
//! the whole claim can simply be rerun after any failure.

use std::collections::HashSet;
use std::fmt;

use rust_decimal::Decimal;
use secrecy::SecretString;
use tracing::{debug, info, warn};

use super::{
    codec::{self, CodecError, SecretKeyVersion},
    snapshot::{SnapshotDataset, SnapshotEntry},
    wallet::{OwnershipOracle, WalletMutator, WalletRole, ensure_unlocked},
};

macro_rules! wfl {
    ($f:ident, $message_id:literal, $($args:expr),* $(,)?) => {
        write!($f, "{}", $crate::fl!($message_id, $($args), *))
    };
}

/// A snapshot entry owned by the legacy wallet, with its key ready for import.
#[derive(Debug)]
pub(crate) struct EligibilityRecord {
    pub(crate) entry: SnapshotEntry,
    pub(crate) successor_key: SecretString,
}

/// Sums over the eligible entries, for reporting to the operator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct AggregateTotals {
    pub(crate) legacy: Decimal,
    pub(crate) successor: Decimal,
}

impl AggregateTotals {
    /// Adds an entry's amounts, or returns `None` if a sum leaves the decimal range.
    fn checked_add(self, entry: &SnapshotEntry) -> Option<Self> {
        Some(Self {
            legacy: self.legacy.checked_add(entry.amount.legacy)?,
            successor: self.successor.checked_add(entry.amount.successor)?,
        })
    }
}

/// The result of a complete scan pass.
#[derive(Debug, Default)]
pub(crate) struct ScanResult {
    pub(crate) records: Vec<EligibilityRecord>,
    pub(crate) totals: AggregateTotals,
}

/// Settings for a claim run.
#[derive(Clone, Debug)]
pub(crate) struct ClaimParams {
    pub(crate) secret_key_version: SecretKeyVersion,
    pub(crate) label: String,
}

/// Finds the snapshot entries owned by `legacy` and collects their re-encoded keys.
///
/// This only reads from the wallet. Each legacy address is looked up once; repeated
/// snapshot entries for an address already seen are skipped.
pub(crate) async fn scan<L>(
    dataset: &SnapshotDataset,
    legacy: &L,
    secret_key_version: SecretKeyVersion,
) -> Result<ScanResult, ClaimError>
where
    L: OwnershipOracle + ?Sized,
{
    let mut result = ScanResult::default();
    let mut seen = HashSet::with_capacity(dataset.len());

    for entry in dataset.entries() {
        let address = entry.address.legacy.as_str();
        if !seen.insert(address) {
            warn!("Skipping repeated snapshot entry for {}", address);
            continue;
        }

        if !legacy.is_mine(address).await? {
            debug!("Not ours: {}", address);
            continue;
        }

        info!("Found address: {}", address);
        let legacy_key = legacy.dump_priv_key(address).await?;
        let successor_key = codec::remap_secret_key(&legacy_key, secret_key_version)
            .map_err(|err| ClaimError::Codec {
                address: address.to_owned(),
                err,
            })?;

        result.totals = result
            .totals
            .checked_add(entry)
            .ok_or_else(|| ClaimError::Overflow(address.to_owned()))?;
        result.records.push(EligibilityRecord {
            entry: entry.clone(),
            successor_key,
        });
    }

    info!("Total HUC amount eligible: {}", result.totals.legacy);
    info!("Total ROD amount claimed: {}", result.totals.successor);

    Ok(result)
}

/// Imports every collected key into `successor`, one call per key, without rescanning.
///
/// Returns the number of imported keys. The keys are dropped (and zeroized) once this
/// returns.
pub(crate) async fn import_all<S>(
    records: Vec<EligibilityRecord>,
    successor: &S,
    label: &str,
) -> Result<usize, ClaimError>
where
    S: WalletMutator + ?Sized,
{
    let mut imported = 0;
    for record in records {
        successor
            .import_priv_key(&record.successor_key, label, false)
            .await?;
        debug!("Imported key for {}", record.entry.address.successor);
        imported += 1;
    }

    info!(
        "Imported {} private keys. You need to manually rescan now.",
        imported
    );

    Ok(imported)
}

/// The outcome of a full claim run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ClaimSummary {
    pub(crate) totals: AggregateTotals,
    pub(crate) imported: usize,
}

/// Runs the lock check, the scan pass and then the import pass.
pub(crate) async fn claim<L, S>(
    dataset: &SnapshotDataset,
    legacy: &L,
    successor: &S,
    params: &ClaimParams,
) -> Result<ClaimSummary, ClaimError>
where
    L: OwnershipOracle + ?Sized,
    S: WalletMutator + ?Sized,
{
    ensure_unlocked(legacy, successor).await?;

    let ScanResult { records, totals } = scan(dataset, legacy, params.secret_key_version).await?;
    let imported = import_all(records, successor, &params.label).await?;

    Ok(ClaimSummary { totals, imported })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ClaimError {
    Codec { address: String, err: CodecError },
    Connect { wallet: WalletRole, err: String },
    Dataset(String),
    Overflow(String),
    Transport { wallet: WalletRole, err: String },
    WalletLocked(WalletRole),
}

impl fmt::Display for ClaimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codec { address, err } => wfl!(
                f,
                "err-claim-key-codec",
                address = address.as_str(),
                err = err.to_string(),
            ),
            Self::Connect { wallet, err } => wfl!(
                f,
                "err-claim-connect",
                wallet = wallet.to_string(),
                err = err.as_str(),
            ),
            Self::Dataset(e) => write!(f, "{e}"),
            Self::Overflow(address) => wfl!(f, "err-claim-overflow", address = address.as_str()),
            Self::Transport { wallet, err } => wfl!(
                f,
                "err-claim-transport",
                wallet = wallet.to_string(),
                err = err.as_str(),
            ),
            Self::WalletLocked(wallet) => {
                wfl!(f, "err-claim-wallet-locked", wallet = wallet.to_string())
            }
        }
    }
}

impl std::error::Error for ClaimError {}
