//! # Descriptor Node
//!
//! [`DescriptorNode`] is the shared base every descriptor kind embeds: an
//! identity, a non-owning parent link, a [`Lifecycle`] and an
//! [`ExtensionSet`]. Concrete kinds (class, field, column descriptors)
//! compose it and implement [`Descriptor`], overriding
//! [`Descriptor::initialise()`] to do their own setup before handing off
//! to the base transition.
//!
//! ## Freeze rule
//!
//! Once a node is populated or initialised, [`DescriptorNode::set_parent()`]
//! fails with [`MetaDataError::ConfigurationState`], whatever parent is
//! offered (including `None`). Extensions remain editable.
//!
//! ## Threading
//!
//! There is no internal locking. Mutation during the Created phase must be
//! serialized by the caller. Once initialised a node can be shared for
//! concurrent reads.

use serde::{Deserialize, Serialize};

use metanode_core::{MetaDataError, NodeId};

use crate::extension::{ExtensionEntry, ExtensionSet};
use crate::lifecycle::{Lifecycle, LifecycleState, LifecycleTransitionRecord};

// ─── Collaborators ───────────────────────────────────────────────────

/// Class-loading resolver used by descriptor kinds during initialisation.
///
/// Opaque to this crate: it is only forwarded to [`Descriptor::initialise()`].
pub trait ClassLoaderResolver {}

/// Handle to the metadata manager owning a family of descriptors.
///
/// Opaque to this crate: it is only forwarded to [`Descriptor::initialise()`].
pub trait MetaDataManager {}

// ─── Capabilities ────────────────────────────────────────────────────

/// Anything that carries a descriptor lifecycle.
pub trait HasLifecycle {
    /// The embedded lifecycle component.
    fn lifecycle(&self) -> &Lifecycle;

    /// Current lifecycle state.
    fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle().state()
    }

    /// `true` from Populated onwards.
    fn is_populated(&self) -> bool {
        self.lifecycle_state().is_populated()
    }

    /// `true` from Initialised onwards.
    fn is_initialised(&self) -> bool {
        self.lifecycle_state().is_initialised()
    }

    /// `true` only in the terminal Used state.
    fn is_used(&self) -> bool {
        self.lifecycle_state().is_used()
    }
}

/// Anything that carries vendor extensions. Lookups only consider the
/// reserved namespace; counts and snapshots cover every vendor.
pub trait HasExtensions {
    /// The embedded extension registry.
    fn extension_set(&self) -> &ExtensionSet;

    /// Number of extensions of any vendor.
    fn no_of_extensions(&self) -> usize {
        self.extension_set().len()
    }

    /// Snapshot of all entries, or `None` if there are none.
    fn extensions(&self) -> Option<&[ExtensionEntry]> {
        self.extension_set().entries()
    }

    /// Whether a reserved-namespace extension exists for `key`.
    fn has_extension(&self, key: &str) -> bool {
        self.extension_set().contains(key)
    }

    /// Value of the first reserved-namespace extension for `key`.
    fn value_for_extension(&self, key: &str) -> Option<&str> {
        self.extension_set().value_for(key)
    }

    /// Comma-separated value for `key`, split into trimmed tokens.
    fn values_for_extension(&self, key: &str) -> Option<Vec<String>> {
        self.extension_set().values_for(key)
    }
}

/// A descriptor kind built on top of [`DescriptorNode`].
pub trait Descriptor: HasLifecycle + HasExtensions {
    fn node(&self) -> &DescriptorNode;

    fn node_mut(&mut self) -> &mut DescriptorNode;

    /// Fix the internal structures of this descriptor.
    ///
    /// The base behaviour only moves the node to Initialised. Kinds that
    /// override this do their own setup first and finish with
    /// `self.node_mut().mark_initialised()`. Calling it again is harmless
    /// for the state, but overrides that derive fields should not expect it.
    fn initialise(
        &mut self,
        _clr: &dyn ClassLoaderResolver,
        _mmgr: &dyn MetaDataManager,
    ) -> Result<(), MetaDataError> {
        self.node_mut().mark_initialised();
        Ok(())
    }
}

// ─── Descriptor Node ─────────────────────────────────────────────────

/// Base descriptor node: identity, parent link, lifecycle, extensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorNode {
    id: NodeId,
    parent: Option<NodeId>,
    lifecycle: Lifecycle,
    extensions: ExtensionSet,
}

impl DescriptorNode {
    /// A new root node in Created.
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    /// A new node in Created under `parent`.
    pub fn with_parent(parent: Option<NodeId>) -> Self {
        Self {
            id: NodeId::new(),
            parent,
            lifecycle: Lifecycle::new(),
            extensions: ExtensionSet::new(),
        }
    }

    /// A new node under `parent` carrying `source`'s extensions.
    ///
    /// Only extensions are copied, and they go through the regular add path,
    /// so reserved duplicates in `source` collapse to the last one. The copy
    /// gets a fresh id, starts in Created with an empty transition log, and
    /// ignores `source`'s parent.
    pub fn copy_from(parent: Option<NodeId>, source: &DescriptorNode) -> Self {
        let mut node = Self::with_parent(parent);
        for entry in &source.extensions {
            node.insert_extension(entry.clone());
        }
        node
    }

    /// This node's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Id of the parent node, if any. Resolve it through a
    /// [`NodeTable`](crate::NodeTable).
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// One-line rendering for diagnostics: the id, followed by the
    /// extension dump in brackets when there is one.
    pub fn describe(&self) -> String {
        if self.extensions.is_empty() {
            return self.id.to_string();
        }
        let dump = self.render_extensions("", "");
        let entries: Vec<&str> = dump.lines().collect();
        format!("{} [{}]", self.id, entries.join(", "))
    }

    /// Reparent this node.
    ///
    /// # Errors
    ///
    /// [`MetaDataError::ConfigurationState`] once the node is populated or
    /// initialised.
    pub fn set_parent(&mut self, parent: Option<NodeId>) -> Result<(), MetaDataError> {
        if self.is_populated() || self.is_initialised() {
            tracing::warn!(
                node = %self.id,
                state = %self.lifecycle_state(),
                "rejected reparenting of frozen node"
            );
            return Err(MetaDataError::ConfigurationState {
                node: self.describe(),
                state: self.lifecycle_state().to_string(),
            });
        }
        self.parent = parent;
        Ok(())
    }

    /// Ordered log of lifecycle transitions.
    pub fn transitions(&self) -> &[LifecycleTransitionRecord] {
        self.lifecycle.transitions()
    }

    // ── State advancement (owning subsystem only) ────────────────────

    /// Mark the node populated.
    pub fn mark_populated(&mut self) {
        self.advance(LifecycleState::Populated);
    }

    /// Mark the node initialised. Normally reached through
    /// [`Descriptor::initialise()`].
    pub fn mark_initialised(&mut self) {
        self.advance(LifecycleState::Initialised);
    }

    /// Mark the node used, after runtime information has been attached.
    pub fn mark_used(&mut self) {
        self.advance(LifecycleState::Used);
    }

    fn advance(&mut self, to: LifecycleState) {
        let from = self.lifecycle.state();
        if self.lifecycle.advance(to) {
            tracing::debug!(node = %self.id, %from, %to, "lifecycle transition");
        }
    }

    // ── Extensions ───────────────────────────────────────────────────

    /// Add an extension for `vendor`, replacing a reserved entry with the
    /// same key.
    ///
    /// # Errors
    ///
    /// [`MetaDataError::InvalidExtension`] when `vendor` is missing, or when
    /// it is the reserved namespace and `key` or `value` is missing.
    pub fn add_vendor_extension(
        &mut self,
        vendor: Option<&str>,
        key: Option<&str>,
        value: Option<&str>,
    ) -> Result<&mut Self, MetaDataError> {
        let entry = ExtensionEntry::new(vendor, key, value)?;
        self.insert_extension(entry);
        Ok(self)
    }

    /// Add a reserved-namespace extension, replacing any with the same key.
    pub fn add_extension(&mut self, key: &str, value: &str) -> &mut Self {
        self.insert_extension(ExtensionEntry::reserved(key, value));
        self
    }

    fn insert_extension(&mut self, entry: ExtensionEntry) {
        if let Some(old) = self.extensions.add(entry) {
            tracing::trace!(
                node = %self.id,
                key = old.key().unwrap_or_default(),
                "replaced reserved extension"
            );
        }
    }

    /// Validate and append an extension without replacing existing entries,
    /// returning the new entry.
    pub fn new_extension_metadata(
        &mut self,
        vendor: Option<&str>,
        key: Option<&str>,
        value: Option<&str>,
    ) -> Result<&ExtensionEntry, MetaDataError> {
        self.extensions.new_extension(vendor, key, value)
    }

    /// Remove the first reserved-namespace extension for `key`, if any.
    pub fn remove_extension(&mut self, key: &str) -> &mut Self {
        self.extensions.remove(key);
        self
    }

    // ── Diagnostics ──────────────────────────────────────────────────

    /// Dump of all extensions, one `<prefix><entry>` line each.
    ///
    /// `indent` is accepted for descriptor kinds that nest child dumps; the
    /// base node has no children and does not use it.
    pub fn render_extensions(&self, prefix: &str, _indent: &str) -> String {
        self.extensions.render(prefix)
    }
}

impl Default for DescriptorNode {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DescriptorNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render_extensions("", ""))
    }
}

impl HasLifecycle for DescriptorNode {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }
}

impl HasExtensions for DescriptorNode {
    fn extension_set(&self) -> &ExtensionSet {
        &self.extensions
    }
}

impl Descriptor for DescriptorNode {
    fn node(&self) -> &DescriptorNode {
        self
    }

    fn node_mut(&mut self) -> &mut DescriptorNode {
        self
    }
}

// ─── Tests ───────────────────────────────────────────────────────────


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Populate,
        Initialise,
        Use,
        Reparent,
        Add(String),
        Remove(String),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Populate),
            Just(Op::Initialise),
            Just(Op::Use),
            Just(Op::Reparent),
            "[a-c]".prop_map(Op::Add),
            "[a-c]".prop_map(Op::Remove),
        ]
    }

    proptest! {
        /// State is monotonic and reparenting succeeds exactly while unpopulated.
        #[test]
        fn lifecycle_guards_hold(ops in prop::collection::vec(op(), 0..40)) {
            let mut node = DescriptorNode::new();
            let mut previous = node.lifecycle_state();
            for op in ops {
                match op {
                    Op::Populate => node.mark_populated(),
                    Op::Initialise => node.mark_initialised(),
                    Op::Use => node.mark_used(),
                    Op::Reparent => {
                        let frozen = node.is_populated() || node.is_initialised();
                        prop_assert_eq!(node.set_parent(Some(NodeId::new())).is_err(), frozen);
                    }
                    Op::Add(key) => {
                        node.add_extension(&key, "v");
                    }
                    Op::Remove(key) => {
                        node.remove_extension(&key);
                    }
                }
                prop_assert!(node.lifecycle_state() >= previous);
                previous = node.lifecycle_state();
            }
        }
    }
}
