use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// How a table answers keys above its largest explicit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Extrapolation {
    /// Reuse the value of the largest key.
    Clamp,
    /// Largest key's value plus `step` for every unit above it.
    Linear { step: u32 },
}

/// Why a table could not answer a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMiss {
    /// Neither listed nor covered by extrapolation.
    Missing,
    /// Extrapolated value does not fit in a `u32`.
    Overflow,
}

/// Lookup from a group size or a count to points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointTable {
    #[serde(deserialize_with = "deserialize_points")]
    pub points: BTreeMap<u32, u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beyond: Option<Extrapolation>,
}

impl PointTable {
    pub fn new(points: impl IntoIterator<Item = (u32, u32)>) -> Self {
        Self {
            points: points.into_iter().collect(),
            beyond: None,
        }
    }

    /// Consecutive keys starting at `first_key`.
    pub fn sequence(first_key: u32, values: &[u32]) -> Self {
        Self::new((first_key..).zip(values.iter().copied()))
    }

    pub fn with_beyond(mut self, beyond: Extrapolation) -> Self {
        self.beyond = Some(beyond);
        self
    }

    /// A missing key of zero scores nothing.
    pub fn lookup(&self, key: u32) -> Result<u32, TableMiss> {
        if let Some(points) = self.points.get(&key) {
            return Ok(*points);
        }
        if key == 0 {
            return Ok(0);
        }
        let (&last_key, &last_points) = self.points.last_key_value().ok_or(TableMiss::Missing)?;
        if key < last_key {
            return Err(TableMiss::Missing);
        }
        match self.beyond.ok_or(TableMiss::Missing)? {
            Extrapolation::Clamp => Ok(last_points),
            Extrapolation::Linear { step } => step
                .checked_mul(key - last_key)
                .and_then(|extra| last_points.checked_add(extra))
                .ok_or(TableMiss::Overflow),
        }
    }

    pub fn max_key(&self) -> Option<u32> {
        self.points.keys().next_back().copied()
    }
}

/// Accepts integer keys (YAML) and numeric string keys (JSON), including
/// when the table sits inside a tagged enum.
fn deserialize_points<'de, D>(deserializer: D) -> Result<BTreeMap<u32, u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Key {
        Number(u32),
        Text(String),
    }

    struct PointsVisitor;

    impl<'de> Visitor<'de> for PointsVisitor {
        type Value = BTreeMap<u32, u32>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map from non-negative integers to points")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut points = BTreeMap::new();
            while let Some((key, value)) = access.next_entry::<Key, u32>()? {
                let key = match key {
                    Key::Number(key) => key,
                    Key::Text(text) => text.trim().parse().map_err(|_| {
                        de::Error::custom(format!("table key '{text}' is not an integer"))
                    })?,
                };
                points.insert(key, value);
            }
            Ok(points)
        }
    }

    deserializer.deserialize_map(PointsVisitor)
}
