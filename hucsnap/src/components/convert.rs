//! Offline conversion of the raw balance table into the snapshot dataset.

use std::fmt;

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::{
    amount::{self, AmountError},
    codec::{self, AddressVersion, CodecError},
    snapshot::{AddressPair, AmountPair, BalanceTable, SnapshotDataset, SnapshotEntry},
};

macro_rules! wfl {
    ($f:ident, $message_id:literal, $($args:expr),* $(,)?) => {
        write!($f, "{}", $crate::fl!($message_id, $($args), *))
    };
}

/// Running totals over a converted dataset, for the audit log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ConversionTotals {
    pub(crate) entries: usize,
    pub(crate) legacy: Decimal,
    pub(crate) legacy_whole: u64,
    pub(crate) successor: Decimal,
}

/// Converts every balance in the table, preserving table order.
///
/// Any malformed address or balance aborts the whole conversion.
pub(crate) fn convert(
    balances: &BalanceTable,
    address_version: AddressVersion,
    rate: Decimal,
) -> Result<(SnapshotDataset, ConversionTotals), ConvertError> {
    let mut entries = Vec::with_capacity(balances.0.len());
    let mut totals = ConversionTotals::default();

    for (address, balance) in &balances.0 {
        let successor = codec::remap_address(address, address_version).map_err(|err| {
            ConvertError::InvalidAddress {
                address: address.clone(),
                err,
            }
        })?;

        let converted = amount::convert(*balance, rate).map_err(|e| match e {
            AmountError::Negative => ConvertError::NegativeBalance(address.clone()),
            AmountError::Overflow => ConvertError::Overflow(address.clone()),
        })?;

        debug!(
            "{} -> {}: {} -> {}",
            address, successor, converted.exact, converted.successor
        );

        let overflow = || ConvertError::Overflow(address.clone());
        totals.entries += 1;
        totals.legacy = totals
            .legacy
            .checked_add(converted.exact)
            .ok_or_else(overflow)?;
        totals.legacy_whole = totals
            .legacy_whole
            .checked_add(converted.whole)
            .ok_or_else(overflow)?;
        totals.successor = totals
            .successor
            .checked_add(converted.successor)
            .ok_or_else(overflow)?;

        entries.push(SnapshotEntry {
            address: AddressPair {
                legacy: address.clone(),
                successor,
            },
            amount: AmountPair {
                legacy: converted.exact,
                legacy_whole: converted.whole,
                successor: converted.successor,
            },
        });
    }

    info!(
        "Converted {} snapshot entries: {} HUC ({} whole) -> {} ROD",
        totals.entries, totals.legacy, totals.legacy_whole, totals.successor
    );

    Ok((SnapshotDataset::new(entries), totals))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ConvertError {
    Balances(String),
    Dataset(String),
    InvalidAddress { address: String, err: CodecError },
    InvalidRate(String),
    NegativeBalance(String),
    Overflow(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Balances(e) => wfl!(f, "err-convert-balances", err = e.as_str()),
            Self::Dataset(e) => write!(f, "{e}"),
            Self::InvalidAddress { address, err } => wfl!(
                f,
                "err-convert-invalid-address",
                address = address.as_str(),
                err = err.to_string()
            ),
            Self::InvalidRate(rate) => wfl!(f, "err-convert-invalid-rate", rate = rate.as_str()),
            Self::NegativeBalance(address) => {
                wfl!(f, "err-convert-negative-balance", address = address.as_str())
            }
            Self::Overflow(address) => wfl!(f, "err-convert-overflow", address = address.as_str()),
        }
    }
}

impl std::error::Error for ConvertError {}
