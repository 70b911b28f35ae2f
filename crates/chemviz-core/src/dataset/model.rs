use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Backend-assigned dataset identifier.
pub type DatasetId = u64;

/// One parsed CSV record, keyed by column name.
pub type Row = Map<String, Value>;

/// Metadata for one past upload, as listed by `/history/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: DatasetId,
    pub name: String,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub row_count: Option<u64>,
    #[serde(default)]
    pub summary: Option<Summary>,
}

/// A single uploaded CSV with its parsed rows and backend-computed summary.
///
/// Datasets are only ever built from a complete response body and are
/// replaced wholesale; nothing mutates one field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: DatasetId,
    pub name: String,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub row_count: Option<u64>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default, rename = "data")]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub summary: Option<Summary>,
}

impl Dataset {
    /// Type distribution of the summary, if the backend sent one.
    pub fn type_distribution(&self) -> Option<&TypeDistribution> {
        self.summary.as_ref().map(|summary| &summary.type_dist)
    }
}

/// Aggregate statistics computed by the backend.
///
/// Averages are optional because the backend omits them for datasets with
/// no valid numeric rows. The min/max/raw counters are only sent by newer
/// backends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub avg_flow: Option<f64>,
    #[serde(default)]
    pub avg_pressure: Option<f64>,
    #[serde(default)]
    pub avg_temp: Option<f64>,
    #[serde(default)]
    pub type_dist: TypeDistribution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_raw: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_rows: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_flow: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_flow: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_temp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_temp: Option<f64>,
}

/// Equipment type → count, in the order the backend sent it.
///
/// Keys are unique. Decoding rejects a payload that repeats a key; building
/// from an iterator keeps the first position and the last count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeDistribution {
    entries: Vec<(String, u64)>,
}

impl TypeDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count for one equipment type.
    pub fn get(&self, label: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, count)| *count)
    }

    /// Iterates `(label, count)` pairs in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries
            .iter()
            .map(|(label, count)| (label.as_str(), *count))
    }

    fn upsert(&mut self, label: String, count: u64) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == label) {
            Some(entry) => entry.1 = count,
            None => self.entries.push((label, count)),
        }
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for TypeDistribution {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut distribution = Self::new();
        for (label, count) in iter {
            distribution.upsert(label.into(), count);
        }
        distribution
    }
}

impl Serialize for TypeDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, count) in &self.entries {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TypeDistribution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DistributionVisitor;

        impl<'de> Visitor<'de> for DistributionVisitor {
            type Value = TypeDistribution;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of equipment type to count")
            }

            // `null` is treated like a missing distribution
            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(TypeDistribution::new())
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(TypeDistribution::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, u64)> =
                    Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((label, count)) = map.next_entry::<String, u64>()? {
                    if entries.iter().any(|(existing, _)| *existing == label) {
                        return Err(de::Error::custom(format!(
                            "duplicate equipment type `{label}`"
                        )));
                    }
                    entries.push((label, count));
                }
                Ok(TypeDistribution { entries })
            }
        }

        deserializer.deserialize_any(DistributionVisitor)
    }
}
