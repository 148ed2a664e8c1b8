//! # Descriptor Lifecycle State Machine
//!
//! Every descriptor node moves through four states, strictly forward:
//!
//! ```text
//! Created ──▶ Populated ──▶ Initialised ──▶ Used (terminal)
//!    │                           ▲
//!    └───────────────────────────┘  (initialise() from Created)
//! ```
//!
//! - **Created**: values passed in from a parsed source or built by hand.
//!   Parent and extensions are fully mutable.
//! - **Populated**: defaulted information has been filled in from the
//!   described class. Reparenting is blocked from here on.
//! - **Initialised**: internal structures are fixed; no further additions.
//! - **Used**: runtime information (resolved column names and the like) has
//!   been attached.
//!
//! ## Design Decision
//!
//! The state is an ordered enum rather than a typestate. Descriptor kinds
//! embed the lifecycle as a component and are stored side by side in node
//! tables, so the state has to be a runtime value. Monotonicity is enforced
//! by [`Lifecycle::advance()`], which ignores any request that is not
//! strictly later than the current state. A node can therefore never be
//! observed going back from Initialised to Created.
//!
//! The same invariant holds for lifecycles read back from serialized form:
//! the transition log must step strictly forward from Created and end at the
//! recorded state, otherwise deserialization fails.

use serde::{Deserialize, Serialize};

use metanode_core::MetaDataError;

// ─── Lifecycle State ─────────────────────────────────────────────────

/// The lifecycle state of a descriptor node. Ordered by progression.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum LifecycleState {
    /// Initial values only.
    #[default]
    Created = 0,
    /// Populated with defaulted information.
    Populated = 1,
    /// Internal structures fixed.
    Initialised = 2,
    /// Runtime information attached (terminal).
    Used = 3,
}

impl LifecycleState {
    /// The numeric state (0-3).
    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// `true` from Populated onwards.
    pub fn is_populated(&self) -> bool {
        *self >= Self::Populated
    }

    /// `true` from Initialised onwards.
    pub fn is_initialised(&self) -> bool {
        *self >= Self::Initialised
    }

    /// `true` only in Used.
    pub fn is_used(&self) -> bool {
        matches!(self, Self::Used)
    }

    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        self.is_used()
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "CREATED",
            Self::Populated => "POPULATED",
            Self::Initialised => "INITIALISED",
            Self::Used => "USED",
        };
        f.write_str(s)
    }
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of an effective lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleTransitionRecord {
    /// State before the transition.
    pub from_state: LifecycleState,
    /// State after the transition.
    pub to_state: LifecycleState,
}

// ─── Lifecycle ───────────────────────────────────────────────────────

/// Embeddable lifecycle component: the current state plus its history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLifecycle")]
pub struct Lifecycle {
    state: LifecycleState,
    transitions: Vec<LifecycleTransitionRecord>,
}

#[derive(Deserialize)]
struct RawLifecycle {
    state: LifecycleState,
    transitions: Vec<LifecycleTransitionRecord>,
}

impl TryFrom<RawLifecycle> for Lifecycle {
    type Error = MetaDataError;

    fn try_from(raw: RawLifecycle) -> Result<Self, Self::Error> {
        let mut replay = Lifecycle::new();
        for record in &raw.transitions {
            if record.from_state != replay.state || !replay.advance(record.to_state) {
                return Err(MetaDataError::user(format!(
                    "lifecycle log breaks at {} -> {} (expected a step forward from {})",
                    record.from_state, record.to_state, replay.state
                )));
            }
        }
        if replay.state != raw.state {
            return Err(MetaDataError::user(format!(
                "lifecycle state {} does not match its log, which ends at {}",
                raw.state, replay.state
            )));
        }
        Ok(replay)
    }
}

impl Lifecycle {
    /// A fresh lifecycle in [`LifecycleState::Created`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Ordered log of effective transitions.
    pub fn transitions(&self) -> &[LifecycleTransitionRecord] {
        &self.transitions
    }

    /// Move forward to `to`.
    ///
    /// Returns `false` and leaves the state untouched when `to` is not
    /// strictly later than the current state. Skipping intermediate states
    /// is allowed (Created → Initialised is a single transition).
    pub fn advance(&mut self, to: LifecycleState) -> bool {
        if to <= self.state {
            return false;
        }
        self.transitions.push(LifecycleTransitionRecord {
            from_state: self.state,
            to_state: to,
        });
        self.state = to;
        true
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
