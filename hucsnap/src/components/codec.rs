//! Base58Check encoding of addresses and private keys.
//!
//! Huntercoin and its successor chain share the same key cryptography, so converting an
//! address or WIF private key between the two chains only means swapping the leading
//! version byte and recomputing the checksum. The payload is carried over untouched,
//! including the compressed-key marker of a WIF key.

use std::fmt;

use secrecy::{ExposeSecret, SecretString, SecretVec};
use sha2::{Digest, Sha256};

macro_rules! wfl {
    ($f:ident, $message_id:literal) => {
        write!($f, "{}", $crate::fl!($message_id))
    };

    ($f:ident, $message_id:literal, $($args:expr),* $(,)?) => {
        write!($f, "{}", $crate::fl!($message_id, $($args), *))
    };
}

const CHECKSUM_LEN: usize = 4;

/// The version byte used for addresses on some chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AddressVersion(pub(crate) u8);

/// The version byte used for WIF-encoded private keys on some chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SecretKeyVersion(pub(crate) u8);

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum CodecError {
    InvalidEncoding(String),
    ChecksumMismatch,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEncoding(e) => wfl!(f, "err-codec-invalid-encoding", err = e.as_str()),
            Self::ChecksumMismatch => wfl!(f, "err-codec-checksum-mismatch"),
        }
    }
}

impl std::error::Error for CodecError {}

fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash = Sha256::digest(Sha256::digest(data));
    let mut out = [0; CHECKSUM_LEN];
    out.copy_from_slice(&hash[..CHECKSUM_LEN]);
    out
}

/// Decodes a Base58Check string into its version byte and payload.
pub(crate) fn decode(encoded: &str) -> Result<(u8, Vec<u8>), CodecError> {
    let mut raw = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| CodecError::InvalidEncoding(e.to_string()))?;

    let res = split_checked(&raw).map(|(version, payload)| (version, payload.to_vec()));
    zeroize_vec(&mut raw);
    res
}

/// Encodes a version byte and payload as a Base58Check string.
pub(crate) fn encode(version: u8, payload: &[u8]) -> String {
    let mut raw = Vec::with_capacity(1 + payload.len() + CHECKSUM_LEN);
    raw.push(version);
    raw.extend_from_slice(payload);
    let check = checksum(&raw);
    raw.extend_from_slice(&check);

    let encoded = bs58::encode(&raw).into_string();
    zeroize_vec(&mut raw);
    encoded
}

fn split_checked(raw: &[u8]) -> Result<(u8, &[u8]), CodecError> {
    if raw.len() < 1 + CHECKSUM_LEN {
        return Err(CodecError::InvalidEncoding(format!(
            "{} bytes is too short for Base58Check",
            raw.len()
        )));
    }

    let (data, check) = raw.split_at(raw.len() - CHECKSUM_LEN);
    if checksum(data) != check {
        return Err(CodecError::ChecksumMismatch);
    }

    Ok((data[0], &data[1..]))
}

// Intermediate buffers may hold private key bytes.
fn zeroize_vec(buf: &mut Vec<u8>) {
    buf.iter_mut().for_each(|b| *b = 0);
    buf.clear();
}

/// Re-encodes an address under the given address version byte.
pub(crate) fn remap_address(address: &str, to: AddressVersion) -> Result<String, CodecError> {
    let (_, payload) = decode(address)?;
    Ok(encode(to.0, &payload))
}

/// Re-encodes a WIF private key under the given private key version byte.
///
/// The decoded key bytes only ever live inside a [`SecretVec`].
pub(crate) fn remap_secret_key(
    key: &SecretString,
    to: SecretKeyVersion,
) -> Result<SecretString, CodecError> {
    let raw = SecretVec::new(
        bs58::decode(key.expose_secret())
            .into_vec()
            .map_err(|e| CodecError::InvalidEncoding(e.to_string()))?,
    );
    let (_, payload) = split_checked(raw.expose_secret())?;
    Ok(SecretString::new(encode(to.0, payload)))
}
