//! Components of hucsnap.
//!
//! The converter (`convert`) runs offline on the raw balance table. The claim process
//! (`claim`) talks to the two wallets through the capability traits in `wallet`, which
//! `wallet_rpc` implements over JSON-RPC.

pub(crate) mod amount;
pub(crate) mod claim;
pub(crate) mod codec;
pub(crate) mod convert;
pub(crate) mod snapshot;
pub(crate) mod tracing;
pub(crate) mod wallet;
pub(crate) mod wallet_rpc;

#[cfg(test)]
pub(crate) mod testing;
