//! Rider and team records as returned by ZwiftPower.
//!
//! Records keep the upstream JSON document untouched; the API forwards it
//! verbatim.

use serde_json::Value;
use strum::{AsRefStr, Display};

/// Kind of record being fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum RecordKind {
    /// A single rider profile.
    Rider,
    /// A team roster.
    Team,
}

/// Profile record for a Zwift participant.
#[derive(Debug, Clone, PartialEq)]
pub struct Rider {
    /// Zwift account id.
    pub zwift_id: i64,
    raw: Value,
}

impl Rider {
    /// Wrap an upstream profile document.
    pub fn new(zwift_id: i64, raw: Value) -> Self {
        Self { zwift_id, raw }
    }

    /// The upstream document as-is.
    pub fn as_dict(&self) -> Value {
        self.raw.clone()
    }

    /// Rider name from the most recent entry, if any.
    pub fn name(&self) -> Option<&str> {
        data_array(&self.raw)?
            .first()?
            .get("name")?
            .as_str()
    }

    /// Number of race entries in the profile.
    pub fn race_count(&self) -> usize {
        data_array(&self.raw).map_or(0, Vec::len)
    }
}

/// A named group of riders with their power data.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    /// ZwiftPower team id.
    pub team_id: i64,
    raw: Value,
}

impl Team {
    /// Wrap an upstream team document.
    pub fn new(team_id: i64, raw: Value) -> Self {
        Self { team_id, raw }
    }

    /// The upstream document as-is.
    pub fn as_dict(&self) -> Value {
        self.raw.clone()
    }

    /// The rider entries of the team.
    pub fn as_list(&self) -> Value {
        Value::Array(data_array(&self.raw).cloned().unwrap_or_default())
    }

    /// Number of riders on the team.
    pub fn rider_count(&self) -> usize {
        data_array(&self.raw).map_or(0, Vec::len)
    }
}

/// ZwiftPower wraps every payload in `{"data": [...]}`.
pub(crate) fn data_array(raw: &Value) -> Option<&Vec<Value>> {
    raw.get("data")?.as_array()
}

/// Whether an upstream document carries any records.
pub(crate) fn has_records(raw: &Value) -> bool {
    data_array(raw).is_some_and(|data| !data.is_empty())
}
