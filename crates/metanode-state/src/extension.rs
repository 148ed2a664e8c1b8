//! # Vendor-Namespaced Extensions
//!
//! Any descriptor node can carry out-of-band annotations as
//! `(vendor, key, value)` triples. The core schema only interprets entries
//! in its own reserved namespace, [`VENDOR_NAME`]; entries from any other
//! vendor are carried along untouched.
//!
//! ## Rules
//!
//! - A vendor is always required. A reserved-namespace entry also needs
//!   both a key and a value. Foreign vendors may omit either.
//! - Vendor comparison against the reserved namespace ignores ASCII case.
//!   Key comparison is exact.
//! - [`ExtensionSet::add_extension()`] keeps at most one reserved entry per
//!   key by replacing the existing one. Foreign entries are never
//!   deduplicated and may share a key with a reserved entry.
//! - [`ExtensionSet::new_extension()`] validates the same way but always
//!   appends, so it can leave two reserved entries with the same key.
//!   Lookups then see the first one.

use serde::{Deserialize, Serialize};

use metanode_core::{MetaDataError, INVALID_EXTENSION_CODE};

/// Vendor name of the reserved namespace.
pub const VENDOR_NAME: &str = "datanucleus";

/// Whether `vendor` names the reserved namespace.
pub fn is_reserved_vendor(vendor: &str) -> bool {
    vendor.eq_ignore_ascii_case(VENDOR_NAME)
}

/// Split a comma-separated attribute value into trimmed tokens.
///
/// Empty input yields `None`. Empty segments between adjacent commas are
/// skipped.
pub fn split_comma_separated(value: &str) -> Option<Vec<String>> {
    if value.is_empty() {
        return None;
    }
    Some(
        value
            .split(',')
            .filter(|token| !token.is_empty())
            .map(|token| token.trim().to_string())
            .collect(),
    )
}

// ─── Extension Entry ─────────────────────────────────────────────────

/// An immutable `(vendor, key, value)` annotation.
///
/// Entries can only be built through [`ExtensionEntry::new()`], including
/// on deserialization, so an entry in the reserved namespace always has a
/// key and a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawExtensionEntry")]
pub struct ExtensionEntry {
    vendor: String,
    key: Option<String>,
    value: Option<String>,
}

#[derive(Deserialize)]
struct RawExtensionEntry {
    vendor: Option<String>,
    key: Option<String>,
    value: Option<String>,
}

impl TryFrom<RawExtensionEntry> for ExtensionEntry {
    type Error = MetaDataError;

    fn try_from(raw: RawExtensionEntry) -> Result<Self, Self::Error> {
        Self::new(raw.vendor.as_deref(), raw.key.as_deref(), raw.value.as_deref())
    }
}

impl ExtensionEntry {
    /// Validate and build an entry.
    ///
    /// # Errors
    ///
    /// [`MetaDataError::InvalidExtension`] when `vendor` is `None`, or when
    /// `vendor` is the reserved namespace and `key` or `value` is `None`.
    pub fn new(
        vendor: Option<&str>,
        key: Option<&str>,
        value: Option<&str>,
    ) -> Result<Self, MetaDataError> {
        let vendor = match vendor {
            Some(v) if !is_reserved_vendor(v) || (key.is_some() && value.is_some()) => v,
            _ => {
                return Err(MetaDataError::InvalidExtension {
                    code: INVALID_EXTENSION_CODE,
                    vendor: vendor.map(str::to_string),
                    key: key.map(str::to_string),
                    value: value.map(str::to_string),
                })
            }
        };
        Ok(Self {
            vendor: vendor.to_string(),
            key: key.map(str::to_string),
            value: value.map(str::to_string),
        })
    }

    /// Entry in the reserved namespace.
    pub fn reserved(key: &str, value: &str) -> Self {
        Self {
            vendor: VENDOR_NAME.to_string(),
            key: Some(key.to_string()),
            value: Some(value.to_string()),
        }
    }

    /// Owning vendor namespace, as supplied.
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Key. Always present in the reserved namespace.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Value. Always present in the reserved namespace.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Whether this entry lives in the reserved namespace.
    pub fn is_reserved(&self) -> bool {
        is_reserved_vendor(&self.vendor)
    }

    /// Whether this is a reserved-namespace entry for exactly `key`.
    pub fn is_reserved_key(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key) && self.is_reserved()
    }
}

impl std::fmt::Display for ExtensionEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<extension vendor-name=\"{}\" key=\"{}\" value=\"{}\"/>",
            self.vendor,
            self.key.as_deref().unwrap_or(""),
            self.value.as_deref().unwrap_or("")
        )
    }
}

// ─── Extension Set ───────────────────────────────────────────────────

/// The extension bag embedded in every descriptor node.
///
/// Iteration follows insertion order, but callers must not rely on it;
/// only membership is meaningful.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionSet {
    // Vec::new() does not allocate, so the backing storage only appears on
    // the first insert.
    entries: Vec<ExtensionEntry>,
}

impl ExtensionSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add an entry, replacing any reserved entry with the
    /// same key.
    pub fn add_extension(
        &mut self,
        vendor: Option<&str>,
        key: Option<&str>,
        value: Option<&str>,
    ) -> Result<&mut Self, MetaDataError> {
        let entry = ExtensionEntry::new(vendor, key, value)?;
        self.add(entry);
        Ok(self)
    }

    /// Add an already validated entry with replace-on-duplicate semantics.
    ///
    /// Returns the reserved entry that was displaced, if any.
    pub fn add(&mut self, entry: ExtensionEntry) -> Option<ExtensionEntry> {
        let displaced = match entry.key() {
            Some(key) if entry.is_reserved() => self.remove(key),
            _ => None,
        };
        self.entries.push(entry);
        displaced
    }

    /// Validate and append an entry without the duplicate check, returning
    /// the stored entry.
    pub fn new_extension(
        &mut self,
        vendor: Option<&str>,
        key: Option<&str>,
        value: Option<&str>,
    ) -> Result<&ExtensionEntry, MetaDataError> {
        let entry = ExtensionEntry::new(vendor, key, value)?;
        self.entries.push(entry);
        let last = self.entries.len() - 1;
        Ok(&self.entries[last])
    }

    /// Remove the first reserved entry for `key`.
    pub fn remove(&mut self, key: &str) -> Option<ExtensionEntry> {
        let pos = self.entries.iter().position(|e| e.is_reserved_key(key))?;
        Some(self.entries.remove(pos))
    }

    /// Whether a reserved entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.is_reserved_key(key))
    }

    /// First reserved entry for `key`.
    pub fn get(&self, key: &str) -> Option<&ExtensionEntry> {
        self.entries.iter().find(|e| e.is_reserved_key(key))
    }

    /// Value of the first reserved entry for `key`.
    pub fn value_for(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ExtensionEntry::value)
    }

    /// Value of the first reserved entry for `key`, split on commas.
    pub fn values_for(&self, key: &str) -> Option<Vec<String>> {
        self.value_for(key).and_then(split_comma_separated)
    }

    /// All entries of any vendor, or `None` when there are none.
    pub fn entries(&self) -> Option<&[ExtensionEntry]> {
        if self.entries.is_empty() {
            None
        } else {
            Some(&self.entries)
        }
    }

    /// Iterate over entries of every vendor.
    pub fn iter(&self) -> std::slice::Iter<'_, ExtensionEntry> {
        self.entries.iter()
    }

    /// Number of entries of any vendor.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One line per entry, `<prefix><entry>\n`. Empty string when there are
    /// no entries.
    pub fn render(&self, prefix: &str) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(prefix);
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out
    }
}

impl<'a> IntoIterator for &'a ExtensionSet {
    type Item = &'a ExtensionEntry;
    type IntoIter = std::slice::Iter<'a, ExtensionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn vendor() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("datanucleus".to_string()),
            Just("DataNucleus".to_string()),
            Just("acme".to_string()),
        ]
    }

    proptest! {
        /// After any sequence of add_extension calls, each reserved key
        /// appears at most once.
        #[test]
        fn reserved_keys_stay_unique(
            ops in prop::collection::vec((vendor(), "[a-c]", "[0-9]{1,2}"), 0..24)
        ) {
            let mut set = ExtensionSet::new();
            for (v, k, x) in &ops {
                set.add_extension(Some(v.as_str()), Some(k.as_str()), Some(x.as_str())).unwrap();
            }
            for key in ["a", "b", "c"] {
                let count = set.iter().filter(|e| e.is_reserved_key(key)).count();
                prop_assert!(count <= 1);
            }
            let foreign = ops.iter().filter(|(v, _, _)| v == "acme").count();
            prop_assert_eq!(set.iter().filter(|e| !e.is_reserved()).count(), foreign);
        }

        /// The last reserved value written for a key is the one looked up.
        #[test]
        fn last_reserved_write_wins(values in prop::collection::vec("[a-z]{1,4}", 1..8)) {
            let mut set = ExtensionSet::new();
            for v in &values {
                set.add_extension(Some("datanucleus"), Some("k"), Some(v.as_str())).unwrap();
            }
            prop_assert_eq!(set.value_for("k"), values.last().map(String::as_str));
        }
    }
}
