//! # Order Lifecycle
//!
//! The shipped lifecycle instance: an order moving through three stages.
//!
//! ```text
//! Created ──▶ Shipped ──▶ Done (terminal)
//! ```
//!
//! The order's customer email is its observable attribute. Changing it
//! notifies every attached observer before [`Order::change_email`] returns.
//! Advancing the lifecycle does not notify; stage changes are visible
//! through the transition log instead.

use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use orderflow_core::{ObserverError, OrderId, OrderflowError, Timestamp};

use crate::lifecycle::{Lifecycle, LifecycleCell, Stateful, StepKey, TransitionRecord};
use crate::observer::{Observer, ObserverRegistry};

// ─── Order State ─────────────────────────────────────────────────────

/// The lifecycle stage of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    /// Order has been placed.
    Created,
    /// Order has left the warehouse.
    Shipped,
    /// Order has been delivered (terminal).
    Done,
}

impl OrderState {
    /// Every stage, in lifecycle order.
    pub const ALL: [OrderState; 3] = [Self::Created, Self::Shipped, Self::Done];
}

impl Lifecycle for OrderState {
    const INITIAL: Self = Self::Created;
    const TRANSITIONS: &'static [(Self, Self)] =
        &[(Self::Created, Self::Shipped), (Self::Shipped, Self::Done)];

    fn label(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Shipped => "shipped",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OrderState {
    type Err = OrderflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| OrderflowError::UnknownState(s.to_string()))
    }
}

// ─── Snapshot ────────────────────────────────────────────────────────

/// Point-in-time copy of an order's observable state.
///
/// Owns all of its data, so later changes to the order never show through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    /// The order this snapshot was taken from.
    pub order_id: OrderId,
    /// Lifecycle stage at snapshot time.
    pub state: OrderState,
    /// Customer email at snapshot time.
    pub email: Option<String>,
    /// When the snapshot was taken.
    pub taken_at: Timestamp,
}

// ─── Order ───────────────────────────────────────────────────────────

/// An order with its lifecycle stage, customer email, and observers.
///
/// Orders are only constructed through [`Stateful::create`] (usually via
/// [`crate::StateMachine::create_initial`]) and always start in
/// [`OrderState::Created`].
#[derive(Debug)]
pub struct Order {
    id: OrderId,
    created_at: Timestamp,
    email: Option<String>,
    lifecycle: LifecycleCell<OrderState>,
    observers: ObserverRegistry<OrderSnapshot>,
}

impl Order {
    /// Unique order identifier.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// When the order was created.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Current lifecycle stage.
    pub fn state(&self) -> OrderState {
        self.lifecycle.current()
    }

    /// Current customer email, if one has been set.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Ordered log of applied lifecycle transitions.
    pub fn transitions(&self) -> &[TransitionRecord<OrderState>] {
        self.lifecycle.log()
    }

    /// Copy of the current observable state.
    pub fn snapshot(&self) -> OrderSnapshot {
        OrderSnapshot {
            order_id: self.id,
            state: self.state(),
            email: self.email.clone(),
            taken_at: Timestamp::now(),
        }
    }

    /// Register an observer. Attaching an already attached observer is a no-op.
    pub fn attach<O: Observer<OrderSnapshot> + 'static>(&mut self, observer: &Rc<O>) {
        self.observers.attach(observer);
    }

    /// Unregister an observer. Detaching an absent observer is a no-op.
    pub fn detach<O: Observer<OrderSnapshot> + 'static>(&mut self, observer: &Rc<O>) {
        self.observers.detach(observer);
    }

    /// Number of live observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Set the customer email and notify observers.
    ///
    /// The new email is stored before delivery starts, so it stays set even
    /// if an observer fails. The first observer failure is returned and
    /// later observers are not notified.
    pub fn change_email(&mut self, email: impl Into<String>) -> Result<(), ObserverError> {
        let email = email.into();
        debug!(order_id = %self.id, email = %email, "order email changed");
        self.email = Some(email);
        self.notify().map(|_| ())
    }

    /// Deliver a fresh snapshot to every observer.
    ///
    /// Returns the number of observers notified.
    pub fn notify(&mut self) -> Result<usize, ObserverError> {
        let snapshot = self.snapshot();
        self.observers.notify_all(&snapshot)
    }
}

impl Stateful for Order {
    type State = OrderState;

    fn create() -> Self {
        let order = Self {
            id: OrderId::new(),
            created_at: Timestamp::now(),
            email: None,
            lifecycle: LifecycleCell::new(),
            observers: ObserverRegistry::new(),
        };
        debug!(order_id = %order.id, "order created");
        order
    }

    fn lifecycle(&self) -> &LifecycleCell<OrderState> {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self, _key: StepKey) -> &mut LifecycleCell<OrderState> {
        &mut self.lifecycle
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::StateMachine;
    use crate::sinks::SnapshotRecorder;

    fn machine() -> StateMachine<Order> {
        StateMachine::new()
    }

    #[test]
    fn test_order_state_labels() {
        assert_eq!(OrderState::Created.to_string(), "created");
        assert_eq!(OrderState::Shipped.to_string(), "shipped");
        assert_eq!(OrderState::Done.to_string(), "done");
    }

    #[test]
    fn test_transition_table() {
        assert_eq!(OrderState::Created.successor(), Some(OrderState::Shipped));
        assert_eq!(OrderState::Shipped.successor(), Some(OrderState::Done));
        assert!(OrderState::Done.is_terminal());
    }

    #[test]
    fn test_parse_state_labels() {
        assert_eq!("created".parse::<OrderState>().unwrap(), OrderState::Created);
        assert_eq!(" SHIPPED ".parse::<OrderState>().unwrap(), OrderState::Shipped);
        assert!(matches!(
            "cancelled".parse::<OrderState>(),
            Err(OrderflowError::UnknownState(_))
        ));
    }

    #[test]
    fn test_new_order_has_no_email_and_no_transitions() {
        let order = machine().create_initial();
        assert_eq!(order.state(), OrderState::Created);
        assert!(order.email().is_none());
        assert!(order.transitions().is_empty());
        assert_eq!(order.observer_count(), 0);
    }

    #[test]
    fn test_transition_log_records_applied_steps_only() {
        let m = machine();
        let mut order = m.create_initial();
        for _ in 0..4 {
            m.advance(&mut order);
        }
        let log = order.transitions();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].from_state, OrderState::Created);
        assert_eq!(log[0].to_state, OrderState::Shipped);
        assert_eq!(log[1].from_state, OrderState::Shipped);
        assert_eq!(log[1].to_state, OrderState::Done);
    }

    #[test]
    fn test_change_email_without_observers() {
        let mut order = machine().create_initial();
        order.change_email("foo@bar.com").unwrap();
        assert_eq!(order.email(), Some("foo@bar.com"));
    }

    #[test]
    fn test_snapshot_reflects_state_and_email() {
        let m = machine();
        let recorder = Rc::new(SnapshotRecorder::<OrderSnapshot>::new("audit"));
        let mut order = m.create_initial();
        order.attach(&recorder);
        m.advance(&mut order);
        order.change_email("a@b.c").unwrap();

        let latest = recorder.latest().unwrap();
        assert_eq!(latest.order_id, order.id());
        assert_eq!(latest.state, OrderState::Shipped);
        assert_eq!(latest.email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn test_order_state_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&OrderState::Shipped).unwrap(), "\"shipped\"");
        let parsed: OrderState = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(parsed, OrderState::Done);
    }

    #[test]
    fn test_transition_record_requires_utc_timestamp() {
        let utc = r#"{"from_state":"created","to_state":"shipped","timestamp":"2026-02-01T09:00:00Z"}"#;
        let record: TransitionRecord<OrderState> = serde_json::from_str(utc).unwrap();
        assert_eq!(record.to_state, OrderState::Shipped);
        assert_eq!(record.timestamp.to_iso8601(), "2026-02-01T09:00:00Z");

        let offset = r#"{"from_state":"created","to_state":"shipped","timestamp":"2026-02-01T09:00:00+01:00"}"#;
        assert!(serde_json::from_str::<TransitionRecord<OrderState>>(offset).is_err());
    }

    #[test]
    fn test_snapshot_serialization() {
        let mut order = machine().create_initial();
        order.change_email("x@y.z").unwrap();
        let snap = order.snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let parsed: OrderSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snap);
    }
}
