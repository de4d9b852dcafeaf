//! Distribution payload and its `Name=count;Name=count` wire form

use crate::error::{common, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between `Name=count` pairs
pub const PAIR_DELIMITER: char = ';';
/// Separator between name and count inside a pair
pub const KEY_VALUE_SEPARATOR: char = '=';
/// Prefix that makes the next character of a name literal
pub const ESCAPE: char = '\\';

/// One state of an axis and the number of defects in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub name: String,
    pub count: u64,
}

impl DistributionEntry {
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// Ordered list of entries covering every state of an axis
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Distribution {
    entries: Vec<DistributionEntry>,
}

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, count: u64) {
        self.entries.push(DistributionEntry::new(name, count));
    }

    pub fn entries(&self) -> &[DistributionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry counts
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn count_of(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.count)
    }

    /// Serialize as `Name=count` pairs joined by `;`, in entry order
    ///
    /// A `;` or `\` inside a name is written as `\;` or `\\`. Other
    /// characters, `=` included, are written verbatim.
    pub fn to_data_string(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}{}{}", escape_name(&e.name), KEY_VALUE_SEPARATOR, e.count))
            .collect::<Vec<_>>()
            .join(&PAIR_DELIMITER.to_string())
    }

    /// Parse a payload written by [`Distribution::to_data_string`]
    ///
    /// The count is taken after the last `=`, so names may contain `=`.
    pub fn parse(data: &str) -> Result<Self> {
        let mut distribution = Self::new();
        if data.is_empty() {
            return Ok(distribution);
        }

        for pair in split_pairs(data) {
            let (name, count) = pair.rsplit_once(KEY_VALUE_SEPARATOR).ok_or_else(|| {
                common::malformed_distribution(format!("pair '{}' has no '=' separator", pair))
            })?;
            let count = count.trim().parse::<u64>().map_err(|e| {
                common::malformed_distribution(format!("invalid count in pair '{}'", pair))
                    .with_source(e)
            })?;
            distribution.push(unescape_name(name), count);
        }

        Ok(distribution)
    }
}

fn escape_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        if c == ESCAPE || c == PAIR_DELIMITER {
            escaped.push(ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

fn unescape_name(name: &str) -> String {
    let mut unescaped = String::with_capacity(name.len());
    let mut chars = name.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            if let Some(next) = chars.next() {
                unescaped.push(next);
                continue;
            }
        }
        unescaped.push(c);
    }
    unescaped
}

/// Split on every `;` not preceded by an escape
fn split_pairs(data: &str) -> Vec<&str> {
    let mut pairs = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in data.char_indices() {
        if escaped {
            escaped = false;
        } else if c == ESCAPE {
            escaped = true;
        } else if c == PAIR_DELIMITER {
            pairs.push(&data[start..i]);
            start = i + c.len_utf8();
        }
    }
    pairs.push(&data[start..]);
    pairs
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_data_string())
    }
}

impl FromIterator<DistributionEntry> for Distribution {
    fn from_iter<T: IntoIterator<Item = DistributionEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
