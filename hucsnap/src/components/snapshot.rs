//! The snapshot dataset handed from `process-snapshot` to `claim-snapshot`.
//!
//! The on-disk form is a JSON array with one record per snapshot address:
//!
//! ```json
//! [
//!   {
//!     "address": { "legacy": "H...", "successor": "C..." },
//!     "amount": { "legacy": 12.99999999, "legacy_whole": 12, "successor": 2.80056000 }
//!   }
//! ]
//! ```
//!
//! Amounts are written as JSON numbers with their exact decimal digits. Files written by
//! earlier snapshot tooling (with `huc` / `rod` / `full_huc` keys and amounts that
//! went through a float) are accepted too.

use std::fmt;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{MapAccess, Visitor},
};
use tokio::{fs, io::AsyncWriteExt};

use super::amount::quantize;

macro_rules! wfl {
    ($f:ident, $message_id:literal, $($args:expr),* $(,)?) => {
        write!($f, "{}", $crate::fl!($message_id, $($args), *))
    };
}

/// The same key hash encoded for both chains.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct AddressPair {
    #[serde(alias = "huc")]
    pub(crate) legacy: String,
    #[serde(alias = "rod")]
    pub(crate) successor: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct AmountPair {
    /// The snapshot balance.
    #[serde(alias = "huc", with = "json_amount")]
    pub(crate) legacy: Decimal,
    /// The snapshot balance in whole coins, which is what gets converted.
    #[serde(alias = "full_huc")]
    pub(crate) legacy_whole: u64,
    /// The converted successor-chain amount.
    #[serde(alias = "rod", with = "json_amount")]
    pub(crate) successor: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SnapshotEntry {
    pub(crate) address: AddressPair,
    pub(crate) amount: AmountPair,
}

/// All snapshot entries, in the order of the raw balance table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct SnapshotDataset(Vec<SnapshotEntry>);

impl SnapshotDataset {
    pub(crate) fn new(entries: Vec<SnapshotEntry>) -> Self {
        Self(entries)
    }

    pub(crate) fn entries(&self) -> &[SnapshotEntry] {
        &self.0
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut dataset: Self = serde_json::from_str(json)?;
        for entry in &mut dataset.0 {
            entry.amount.legacy = quantize(entry.amount.legacy);
            entry.amount.successor = quantize(entry.amount.successor);
        }
        Ok(dataset)
    }

    pub(crate) fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reads a dataset previously written by [`SnapshotDataset::write`].
    pub(crate) async fn read(path: &Path) -> Result<Self, DatasetError> {
        let json = fs::read_to_string(path)
            .await
            .map_err(|e| DatasetError::Io(e.to_string()))?;
        Self::from_json(&json).map_err(|e| DatasetError::Parse(e.to_string()))
    }

    /// Writes the dataset to `path`.
    ///
    /// The data goes to a sibling temporary file first and is then renamed over `path`,
    /// so an existing dataset is either fully replaced or left untouched.
    pub(crate) async fn write(&self, path: &Path) -> Result<(), DatasetError> {
        let json = self
            .to_json()
            .map_err(|e| DatasetError::Parse(e.to_string()))?;

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = Path::new(&tmp_name);

        let res = async {
            let mut f = fs::File::create(tmp_path).await?;
            f.write_all(json.as_bytes()).await?;
            f.write_all(b"\n").await?;
            f.sync_all().await?;
            fs::rename(tmp_path, path).await
        }
        .await;

        if let Err(e) = res {
            let _ = fs::remove_file(tmp_path).await;
            return Err(DatasetError::Io(e.to_string()));
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum DatasetError {
    Io(String),
    Parse(String),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => wfl!(f, "err-dataset-io", err = e.as_str()),
            Self::Parse(e) => wfl!(f, "err-dataset-parse", err = e.as_str()),
        }
    }
}

impl std::error::Error for DatasetError {}

/// The raw snapshot balance table (`snapshot-balances.json`).
///
/// Entries are kept in file order, and an address that occurs more than once is kept
/// once per occurrence.
#[derive(Debug, Deserialize)]
pub(crate) struct RawBalances {
    pub(crate) addresses: BalanceTable,
}

#[derive(Debug, Default)]
pub(crate) struct BalanceTable(pub(crate) Vec<(String, Decimal)>);

impl<'de> Deserialize<'de> for BalanceTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = BalanceTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from addresses to balances")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((address, Balance(balance))) = map.next_entry::<String, Balance>()? {
                    entries.push((address, balance));
                }
                Ok(BalanceTable(entries))
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

#[derive(Deserialize)]
struct Balance(#[serde(with = "json_amount")] Decimal);

impl RawBalances {
    pub(crate) fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Decimal amounts as JSON numbers that keep every written digit.
mod json_amount {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::{
        Deserialize, Deserializer, Serialize, Serializer, de::Error as _, ser::Error as _,
    };
    use serde_json::{Number, Value};

    pub(super) fn serialize<S: Serializer>(
        value: &Decimal,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        Number::from_str(&value.to_string())
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }

    /// Accepts JSON numbers as well as strings.
    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Decimal, D::Error> {
        let text = match Value::deserialize(deserializer)? {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s,
            other => {
                return Err(D::Error::custom(format!(
                    "expected a decimal amount, found {other}"
                )));
            }
        };

        Decimal::from_str(text.trim())
            .or_else(|_| Decimal::from_scientific(text.trim()))
            .map_err(D::Error::custom)
    }
}
