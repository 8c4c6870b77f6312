//! The narrow views of the two wallets that the claim process needs.
//!
//! The legacy wallet is only ever read from, and the successor wallet only ever gets keys
//! imported into it. Keeping these as separate traits lets the claim logic run against
//! in-memory wallets in tests.

use std::fmt;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Deserialize;

use super::claim::ClaimError;

/// `unlocked_until` values below this are not timestamps, and mean the wallet is locked.
pub(crate) const UNLOCKED_UNTIL_THRESHOLD: u64 = 1_000_000_000;

/// The parts of a `getwalletinfo` response that the claim process looks at.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub(crate) struct WalletInfo {
    /// Absent for unencrypted wallets.
    #[serde(default)]
    pub(crate) unlocked_until: Option<u64>,
}

impl WalletInfo {
    pub(crate) fn is_locked(&self) -> bool {
        matches!(self.unlocked_until, Some(t) if t < UNLOCKED_UNTIL_THRESHOLD)
    }
}

/// Read access to the legacy wallet.
#[async_trait]
pub(crate) trait OwnershipOracle: Send + Sync {
    async fn wallet_info(&self) -> Result<WalletInfo, ClaimError>;

    /// Returns whether the wallet holds the key for `address`.
    async fn is_mine(&self, address: &str) -> Result<bool, ClaimError>;

    /// Exports the WIF private key for an address the wallet owns.
    async fn dump_priv_key(&self, address: &str) -> Result<SecretString, ClaimError>;
}

/// Write access to the successor wallet.
#[async_trait]
pub(crate) trait WalletMutator: Send + Sync {
    async fn wallet_info(&self) -> Result<WalletInfo, ClaimError>;

    /// Imports a WIF private key. Re-importing a known key is a no-op in the wallet.
    async fn import_priv_key(
        &self,
        key: &SecretString,
        label: &str,
        rescan: bool,
    ) -> Result<(), ClaimError>;
}

/// Which side of the migration a wallet is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WalletRole {
    Legacy,
    Successor,
}

impl fmt::Display for WalletRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletRole::Legacy => write!(f, "{}", crate::fl!("wallet-role-legacy")),
            WalletRole::Successor => write!(f, "{}", crate::fl!("wallet-role-successor")),
        }
    }
}

/// Fails unless both wallets are unlocked (or unencrypted).
///
/// Nothing else is asked of either wallet before this passes.
pub(crate) async fn ensure_unlocked<L, S>(legacy: &L, successor: &S) -> Result<(), ClaimError>
where
    L: OwnershipOracle + ?Sized,
    S: WalletMutator + ?Sized,
{
    if legacy.wallet_info().await?.is_locked() {
        return Err(ClaimError::WalletLocked(WalletRole::Legacy));
    }
    if successor.wallet_info().await?.is_locked() {
        return Err(ClaimError::WalletLocked(WalletRole::Successor));
    }
    Ok(())
}
