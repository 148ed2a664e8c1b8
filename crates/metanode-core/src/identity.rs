//! # Node Identity
//!
//! Descriptor nodes never own their parent. A child names its parent by
//! [`NodeId`], and the id is resolved against whatever node table the owning
//! subsystem keeps. This keeps parent/child links free of ownership cycles.
//!
//! The textual form is `metadata:<uuid>`. It is what diagnostics print and
//! what serialization writes, and [`NodeId::from_str`] reads it back, so an
//! id quoted in an error message can be fed straight into a table lookup.
//! A bare UUID is accepted as well.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MetaDataError;

const PREFIX: &str = "metadata:";

/// Handle naming a descriptor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(Uuid);

impl NodeId {
    /// Fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID, e.g. one assigned by an external registry.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{PREFIX}{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = MetaDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix(PREFIX).unwrap_or(s);
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|e| MetaDataError::user(format!("invalid node id {s:?}: {e}")))
    }
}

impl TryFrom<String> for NodeId {
    type Error = MetaDataError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.to_string()
    }
}
