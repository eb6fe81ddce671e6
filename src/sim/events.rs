//! Synchronous observer lists
//!
//! Presentation sinks (materials, particles, sounds, HUD) subscribe here.
//! Callbacks run inline during `advance`, in subscription order.

use std::fmt;

use super::arena::ArenaPhase;

/// Handle returned by [`Observers::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

/// Signals emitted by a ring
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RingEvent {
    /// Shrinking began from Idle
    ShrinkStarted,
    /// Emitted every tick while shrinking, with the new progress
    ShrinkProgress(f32),
    /// Progress reached 1; fires once per run
    ShrinkCompleted,
}

/// Signals emitted by the arena sequencer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArenaEvent {
    PhaseChanged(ArenaPhase),
    /// Ring at this index was told to start
    RingStarted(usize),
    /// Ring at this index reported completion
    RingCompleted(usize),
    MatchEnded,
    /// The post-match grace window elapsed
    Settled,
}

type Callback<E> = Box<dyn FnMut(&E)>;

/// Ordered list of callbacks for one event type
pub struct Observers<E> {
    callbacks: Vec<(SubscriptionId, Callback<E>)>,
    next_id: u32,
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self {
            callbacks: Vec::new(),
            next_id: 1,
        }
    }
}

impl<E> fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.callbacks.len())
            .finish()
    }
}

impl<E> Observers<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback
    pub fn subscribe(&mut self, callback: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback; returns false if the id was unknown
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sid, _)| *sid != id);
        self.callbacks.len() != before
    }

    pub fn emit(&mut self, event: &E) {
        for (_, callback) in &mut self.callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn emits_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::<RingEvent>::new();

        let a = Rc::clone(&seen);
        observers.subscribe(move |e| a.borrow_mut().push(("a", *e)));
        let b = Rc::clone(&seen);
        observers.subscribe(move |e| b.borrow_mut().push(("b", *e)));

        observers.emit(&RingEvent::ShrinkStarted);
        assert_eq!(
            *seen.borrow(),
            vec![("a", RingEvent::ShrinkStarted), ("b", RingEvent::ShrinkStarted)]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut observers = Observers::<RingEvent>::new();

        let c = Rc::clone(&count);
        let id = observers.subscribe(move |_| *c.borrow_mut() += 1);
        observers.emit(&RingEvent::ShrinkCompleted);

        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.emit(&RingEvent::ShrinkCompleted);

        assert_eq!(*count.borrow(), 1);
        assert!(observers.is_empty());
    }
}
