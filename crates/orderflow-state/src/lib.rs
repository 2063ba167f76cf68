//! # orderflow-state — Observable Lifecycle State Machines
//!
//! A table-driven lifecycle engine plus a synchronous observer registry,
//! composed into the [`Order`] entity.
//!
//! ## Modules
//!
//! - **Lifecycle** (`lifecycle.rs`): the [`Lifecycle`] and [`Stateful`]
//!   traits and the generic [`StateMachine`]. Transitions come from a fixed
//!   table; advancing a terminal stage is a no-op.
//!
//! - **Observer** (`observer.rs`): [`ObserverRegistry`], non-owning,
//!   identity-deduplicated, ordered and fail-fast.
//!
//! - **Order** (`order.rs`): `Created → Shipped → Done`, with the customer
//!   email as the observable attribute.
//!
//! - **Sinks** (`sinks.rs`): [`SnapshotRecorder`] and [`TracingObserver`].
//!
//! ## Notification Scope
//!
//! Only attribute changes notify observers. [`StateMachine::advance`] never
//! does; callers that care about stage changes read the transition log or
//! call [`Order::notify`] explicitly.

pub mod lifecycle;
pub mod observer;
pub mod order;
pub mod sinks;

pub use lifecycle::{Lifecycle, LifecycleCell, StateMachine, Stateful, StepKey, TransitionRecord};
pub use observer::{Observer, ObserverRegistry};
pub use order::{Order, OrderSnapshot, OrderState};
pub use sinks::{SnapshotRecorder, TracingObserver};
