//! # Lifecycle Engine
//!
//! A table-driven state machine shared by every stateful entity type.
//!
//! A lifecycle is a closed enum of stages plus a fixed successor table
//! ([`Lifecycle::TRANSITIONS`]). Entities embed a [`LifecycleCell`], which
//! can only be created in the initial stage and can only be moved forward by
//! [`StateMachine::advance`]. There is no way to set an arbitrary stage.
//!
//! Advancing from a terminal stage is a no-op, never an error, so lifecycle
//! advancement is safe to call unconditionally.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use tracing::debug;

use orderflow_core::Timestamp;

// ─── Lifecycle ───────────────────────────────────────────────────────

/// A closed set of lifecycle stages with a fixed successor relation.
pub trait Lifecycle: Copy + Eq + fmt::Debug + fmt::Display + 'static {
    /// The stage every entity starts in.
    const INITIAL: Self;

    /// `(from, to)` pairs. Each stage appears as `from` at most once.
    const TRANSITIONS: &'static [(Self, Self)];

    /// Stable, human-readable label.
    fn label(&self) -> &'static str;

    /// The successor of this stage, or `None` if terminal.
    fn successor(&self) -> Option<Self> {
        Self::TRANSITIONS
            .iter()
            .find(|(from, _)| from == self)
            .map(|(_, to)| *to)
    }

    /// Whether this stage has no outgoing transition.
    fn is_terminal(&self) -> bool {
        self.successor().is_none()
    }
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of a single applied transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord<S> {
    /// Stage before the transition.
    pub from_state: S,
    /// Stage after the transition.
    pub to_state: S,
    /// When the transition was applied (UTC).
    pub timestamp: Timestamp,
}

// ─── Lifecycle Cell ──────────────────────────────────────────────────

/// The current stage of one entity plus its append-only transition log.
///
/// Not `Clone`: a cell cannot be copied from one entity into another.
#[derive(Debug)]
pub struct LifecycleCell<S: Lifecycle> {
    current: S,
    log: Vec<TransitionRecord<S>>,
}

impl<S: Lifecycle> LifecycleCell<S> {
    /// A cell in [`Lifecycle::INITIAL`] with an empty log.
    pub fn new() -> Self {
        Self {
            current: S::INITIAL,
            log: Vec::new(),
        }
    }

    /// The active stage.
    pub fn current(&self) -> S {
        self.current
    }

    /// Every applied transition, oldest first.
    pub fn log(&self) -> &[TransitionRecord<S>] {
        &self.log
    }

    fn step(&mut self) -> Option<TransitionRecord<S>> {
        let to = self.current.successor()?;
        let record = TransitionRecord {
            from_state: self.current,
            to_state: to,
            timestamp: Timestamp::now(),
        };
        self.current = to;
        self.log.push(record.clone());
        Some(record)
    }
}

impl<S: Lifecycle> Default for LifecycleCell<S> {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Step Key ────────────────────────────────────────────────────────

/// Capability required to borrow an entity's cell mutably.
///
/// Only [`StateMachine`] can construct one, so code outside this module
/// cannot reach [`Stateful::lifecycle_mut`] and cannot swap or overwrite a
/// cell.
///
/// ```compile_fail
/// use orderflow_state::{Order, StateMachine, Stateful};
/// use orderflow_state::lifecycle::StepKey;
///
/// let mut order = StateMachine::<Order>::new().create_initial();
/// let _ = order.lifecycle_mut(StepKey { _private: () });
/// ```
#[derive(Debug)]
pub struct StepKey {
    _private: (),
}

// ─── Stateful ────────────────────────────────────────────────────────

/// An entity whose lifecycle is driven by a [`StateMachine`].
pub trait Stateful {
    /// The lifecycle this entity follows.
    type State: Lifecycle;

    /// Construct a fresh entity. Must embed a new [`LifecycleCell`].
    fn create() -> Self;

    /// Read access to the lifecycle cell.
    fn lifecycle(&self) -> &LifecycleCell<Self::State>;

    /// Write access to the lifecycle cell. Callable only with a [`StepKey`].
    fn lifecycle_mut(&mut self, key: StepKey) -> &mut LifecycleCell<Self::State>;
}

// ─── State Machine ───────────────────────────────────────────────────

/// Applies a lifecycle's transition table to entities of type `E`.
///
/// The machine is stateless: the table lives on the [`Lifecycle`] type and
/// the current stage lives on each entity, so one machine serves any number
/// of entities.
pub struct StateMachine<E> {
    _entity: PhantomData<fn() -> E>,
}

impl<E: Stateful> StateMachine<E> {
    /// Create a machine for entities of type `E`.
    pub const fn new() -> Self {
        Self {
            _entity: PhantomData,
        }
    }

    /// New entity in the lifecycle's initial stage.
    pub fn create_initial(&self) -> E {
        E::create()
    }

    /// Move `entity` to the successor of its current stage.
    ///
    /// Returns the applied transition, or `None` when the entity is already
    /// terminal (in which case nothing changes).
    pub fn advance(&self, entity: &mut E) -> Option<TransitionRecord<E::State>> {
        let cell = entity.lifecycle_mut(StepKey { _private: () });
        match cell.step() {
            Some(record) => {
                debug!(from = %record.from_state, to = %record.to_state, "lifecycle advanced");
                Some(record)
            }
            None => {
                debug!(state = %cell.current(), "advance on terminal stage ignored");
                None
            }
        }
    }

    /// Label of the entity's current stage.
    pub fn describe(&self, entity: &E) -> &'static str {
        entity.lifecycle().current().label()
    }

    /// The full transition table, for display.
    pub fn transitions(&self) -> &'static [(E::State, E::State)] {
        E::State::TRANSITIONS
    }
}

impl<E: Stateful> Default for StateMachine<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for StateMachine<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("entity", &std::any::type_name::<E>())
            .finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
