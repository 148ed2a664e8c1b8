//! # metanode-state — Lifecycle-Guarded Descriptor Nodes
//!
//! The shared base of every metadata descriptor: a tree node that moves
//! through `Created → Populated → Initialised → Used` and carries an open
//! bag of vendor-namespaced extensions.
//!
//! ## Modules
//!
//! - **Lifecycle** (`lifecycle.rs`): the ordered [`LifecycleState`] and the
//!   embeddable [`Lifecycle`] component. Transitions only ever move forward.
//!
//! - **Extensions** (`extension.rs`): [`ExtensionEntry`] and the
//!   [`ExtensionSet`] registry with its validation, replace-on-add and
//!   lookup rules for the reserved [`VENDOR_NAME`] namespace.
//!
//! - **Node** (`node.rs`): [`DescriptorNode`], plus the [`HasLifecycle`],
//!   [`HasExtensions`] and [`Descriptor`] capabilities that descriptor kinds
//!   implement by composition.
//!
//! - **Table** (`arena.rs`): [`NodeTable`], which owns descriptors and
//!   resolves the non-owning [`NodeId`](metanode_core::NodeId) parent links.
//!
//! ## Design
//!
//! Descriptor kinds do not inherit from a base class. They embed a
//! `DescriptorNode`, expose it through [`Descriptor::node()`], and override
//! [`Descriptor::initialise()`] when they need setup of their own.

pub mod arena;
pub mod extension;
pub mod lifecycle;
pub mod node;

// ─── Lifecycle re-exports ───────────────────────────────────────────

pub use lifecycle::{Lifecycle, LifecycleState, LifecycleTransitionRecord};

// ─── Extension re-exports ───────────────────────────────────────────

pub use extension::{
    is_reserved_vendor, split_comma_separated, ExtensionEntry, ExtensionSet, VENDOR_NAME,
};

// ─── Node re-exports ────────────────────────────────────────────────

pub use node::{
    ClassLoaderResolver, Descriptor, DescriptorNode, HasExtensions, HasLifecycle,
    MetaDataManager,
};

pub use arena::NodeTable;
