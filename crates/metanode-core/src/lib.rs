//! # metanode-core — Foundational Types for Descriptor Nodes
//!
//! Leaf crate of the metanode workspace. It holds the pieces every other
//! crate shares and depends on nothing internal:
//!
//! - [`MetaDataError`] and its [`Severity`] classification. A failure is
//!   either a *user* error (bad input, usage precondition violated) or a
//!   *fatal* one that should abort the larger operation it belongs to.
//! - [`NodeId`], the non-owning handle a descriptor node uses to name its
//!   parent.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;

pub use error::{MetaDataError, Severity, INVALID_EXTENSION_CODE};
pub use identity::NodeId;
