//! # Observer Registry
//!
//! Synchronous, ordered notification fan-out.
//!
//! Registration is non-owning: the registry keeps a [`Weak`] handle and the
//! caller keeps the [`Rc`]. Dropping the caller's last `Rc` silently ends the
//! registration; [`ObserverRegistry::detach`] ends it without dropping the
//! observer.
//!
//! ## Delivery Rules
//!
//! - Membership is a set keyed by `Rc` identity. Attaching twice is a no-op
//!   and the observer keeps its original position.
//! - Observers are notified in attachment order, one at a time, each with
//!   its own clone of the snapshot.
//! - The set of recipients is fixed when a pass starts. Every recipient is
//!   upgraded to a strong handle up front, so an observer dropped by another
//!   observer mid-pass still receives this pass.
//! - The first observer error stops the pass and is returned. Observers
//!   already notified keep their notification.

use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use orderflow_core::ObserverError;

/// Receives snapshots of a subject of type `T`.
pub trait Observer<T> {
    /// Name used in logs and error messages.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Handle one notification.
    fn notify(&self, snapshot: T) -> Result<(), ObserverError>;
}

/// Ordered set of non-owning observer registrations.
pub struct ObserverRegistry<T> {
    observers: Vec<Weak<dyn Observer<T>>>,
}

impl<T: Clone + 'static> ObserverRegistry<T> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Register `observer`. Returns `false` if it was already registered.
    pub fn attach<O: Observer<T> + 'static>(&mut self, observer: &Rc<O>) -> bool {
        self.prune();
        if self.position(observer).is_some() {
            debug!(observer = observer.name(), "observer already attached");
            return false;
        }
        let handle: Weak<O> = Rc::downgrade(observer);
        self.observers.push(handle);
        debug!(observer = observer.name(), count = self.observers.len(), "observer attached");
        true
    }

    /// Unregister `observer`. Returns `false` if it was not registered.
    pub fn detach<O: Observer<T> + 'static>(&mut self, observer: &Rc<O>) -> bool {
        match self.position(observer) {
            Some(index) => {
                self.observers.remove(index);
                debug!(observer = observer.name(), "observer detached");
                true
            }
            None => false,
        }
    }

    /// Whether `observer` is currently registered.
    pub fn contains<O: Observer<T> + 'static>(&self, observer: &Rc<O>) -> bool {
        self.position(observer).is_some()
    }

    /// Number of registrations whose observer is still alive.
    pub fn len(&self) -> usize {
        self.observers.iter().filter(|w| w.strong_count() > 0).count()
    }

    /// Whether no live observer is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `snapshot` to every registered observer, in order.
    ///
    /// Returns the number of observers notified.
    pub fn notify_all(&mut self, snapshot: &T) -> Result<usize, ObserverError> {
        self.prune();
        let recipients: Vec<Rc<dyn Observer<T>>> =
            self.observers.iter().filter_map(Weak::upgrade).collect();

        for (delivered, observer) in recipients.iter().enumerate() {
            if let Err(err) = observer.notify(snapshot.clone()) {
                warn!(
                    observer = observer.name(),
                    delivered,
                    skipped = recipients.len() - delivered - 1,
                    error = %err,
                    "observer failed, aborting delivery"
                );
                return Err(err);
            }
        }

        debug!(delivered = recipients.len(), "notification delivered");
        Ok(recipients.len())
    }

    fn position<O: Observer<T> + 'static>(&self, observer: &Rc<O>) -> Option<usize> {
        let target = Rc::as_ptr(observer) as *const ();
        self.observers
            .iter()
            .position(|w| w.as_ptr() as *const () == target)
    }

    fn prune(&mut self) {
        self.observers.retain(|w| w.strong_count() > 0);
    }
}

impl<T: Clone + 'static> Default for ObserverRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ObserverRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("registrations", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Appends `start:<name>` / `end:<name>` to a shared journal.
    struct Journaled {
        name: &'static str,
        journal: Rc<RefCell<Vec<String>>>,
        seen: RefCell<Vec<u32>>,
    }

    impl Journaled {
        fn new(name: &'static str, journal: &Rc<RefCell<Vec<String>>>) -> Rc<Self> {
            Rc::new(Self {
                name,
                journal: Rc::clone(journal),
                seen: RefCell::new(Vec::new()),
            })
        }
    }

    impl Observer<u32> for Journaled {
        fn name(&self) -> &str {
            self.name
        }

        fn notify(&self, snapshot: u32) -> Result<(), ObserverError> {
            self.journal.borrow_mut().push(format!("start:{}", self.name));
            self.seen.borrow_mut().push(snapshot);
            self.journal.borrow_mut().push(format!("end:{}", self.name));
            Ok(())
        }
    }

    struct Failing;

    impl Observer<u32> for Failing {
        fn notify(&self, _snapshot: u32) -> Result<(), ObserverError> {
            Err(ObserverError::rejected("failing", "always fails"))
        }
    }

    /// Drops the only strong handle to another observer when notified.
    struct Dropper {
        victim: RefCell<Option<Rc<Journaled>>>,
    }

    impl Observer<u32> for Dropper {
        fn notify(&self, _snapshot: u32) -> Result<(), ObserverError> {
            self.victim.borrow_mut().take();
            Ok(())
        }
    }

    fn journal() -> Rc<RefCell<Vec<String>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_attach_is_set_semantics() {
        let j = journal();
        let a = Journaled::new("a", &j);
        let mut registry: ObserverRegistry<u32> = ObserverRegistry::new();
        assert!(registry.attach(&a));
        assert!(!registry.attach(&a));
        assert_eq!(registry.len(), 1);

        registry.notify_all(&7).unwrap();
        assert_eq!(*a.seen.borrow(), vec![7]);
    }

    #[test]
    fn test_detach_absent_is_noop() {
        let j = journal();
        let a = Journaled::new("a", &j);
        let mut registry: ObserverRegistry<u32> = ObserverRegistry::new();
        assert!(!registry.detach(&a));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_detach_keeps_observer_alive() {
        let j = journal();
        let a = Journaled::new("a", &j);
        let mut registry: ObserverRegistry<u32> = ObserverRegistry::new();
        registry.attach(&a);
        assert!(registry.detach(&a));
        assert!(!registry.contains(&a));
        assert_eq!(Rc::strong_count(&a), 1);

        registry.notify_all(&1).unwrap();
        assert!(a.seen.borrow().is_empty());
    }

    #[test]
    fn test_delivery_is_sequential_in_attachment_order() {
        let j = journal();
        let first = Journaled::new("first", &j);
        let second = Journaled::new("second", &j);
        let mut registry: ObserverRegistry<u32> = ObserverRegistry::new();
        registry.attach(&first);
        registry.attach(&second);

        assert_eq!(registry.notify_all(&3).unwrap(), 2);
        assert_eq!(
            *j.borrow(),
            vec!["start:first", "end:first", "start:second", "end:second"]
        );
    }

    #[test]
    fn test_reattach_keeps_original_position() {
        let j = journal();
        let first = Journaled::new("first", &j);
        let second = Journaled::new("second", &j);
        let mut registry: ObserverRegistry<u32> = ObserverRegistry::new();
        registry.attach(&first);
        registry.attach(&second);
        registry.attach(&first);

        registry.notify_all(&0).unwrap();
        assert_eq!(j.borrow()[0], "start:first");
        assert_eq!(j.borrow().len(), 4);
    }

    #[test]
    fn test_failure_aborts_later_deliveries() {
        let j = journal();
        let before = Journaled::new("before", &j);
        let failing = Rc::new(Failing);
        let after = Journaled::new("after", &j);
        let mut registry: ObserverRegistry<u32> = ObserverRegistry::new();
        registry.attach(&before);
        registry.attach(&failing);
        registry.attach(&after);

        let err = registry.notify_all(&9).unwrap_err();
        assert_eq!(err, ObserverError::rejected("failing", "always fails"));
        assert_eq!(*before.seen.borrow(), vec![9]);
        assert!(after.seen.borrow().is_empty());
    }

    #[test]
    fn test_dropped_observer_is_skipped_and_pruned() {
        let j = journal();
        let keep = Journaled::new("keep", &j);
        let gone = Journaled::new("gone", &j);
        let mut registry: ObserverRegistry<u32> = ObserverRegistry::new();
        registry.attach(&gone);
        registry.attach(&keep);
        drop(gone);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.notify_all(&5).unwrap(), 1);
        assert_eq!(*j.borrow(), vec!["start:keep", "end:keep"]);
    }

    #[test]
    fn test_recipients_fixed_at_pass_start() {
        let j = journal();
        let victim = Journaled::new("victim", &j);
        let weak_victim = Rc::downgrade(&victim);
        let dropper = Rc::new(Dropper {
            victim: RefCell::new(None),
        });
        let mut registry: ObserverRegistry<u32> = ObserverRegistry::new();
        registry.attach(&dropper);
        registry.attach(&victim);
        *dropper.victim.borrow_mut() = Some(victim);

        // The dropper releases the victim's last owner mid-pass; the pass
        // still reaches the victim.
        assert_eq!(registry.notify_all(&1).unwrap(), 2);
        assert_eq!(*j.borrow(), vec!["start:victim", "end:victim"]);

        // The next pass does not.
        assert!(weak_victim.upgrade().is_none());
        assert_eq!(registry.notify_all(&2).unwrap(), 1);
    }
}
