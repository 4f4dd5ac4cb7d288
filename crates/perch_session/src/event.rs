//! Lifecycle events and their observers

use crate::error::ErrorKind;
use crate::placement::PlacedObject;
use perch_core::{Pose, Vec3};
use perch_scene::ObjectId;
use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Why a session ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndReason {
    /// `end()` was called
    Requested,
    /// The platform ended the session (the user left AR)
    Platform,
    /// A frame reported the session as gone
    Fatal,
    /// The start sequence failed before reaching `Active`
    Failed,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::Requested => "requested",
            EndReason::Platform => "platform",
            EndReason::Fatal => "fatal",
            EndReason::Failed => "failed",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events published by a placement session
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// The session reached `Active`
    Ready,
    /// A frame produced a hit after one that did not
    TrackingAcquired { pose: Pose },
    /// A frame produced no hit after one that did
    TrackingLost,
    /// An object was placed
    Placed { object: PlacedObject },
    /// A movable object was dragged
    Moved { id: ObjectId, position: Vec3 },
    /// Something failed; `message` is suitable for display
    Error { kind: ErrorKind, message: String },
    /// The session reached `Ended`
    Ended { reason: EndReason },
}

impl SessionEvent {
    /// Event name as used by presentation layers
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Ready => "ready",
            SessionEvent::TrackingAcquired { .. } => "trackingAcquired",
            SessionEvent::TrackingLost => "trackingLost",
            SessionEvent::Placed { .. } => "placed",
            SessionEvent::Moved { .. } => "moved",
            SessionEvent::Error { .. } => "error",
            SessionEvent::Ended { .. } => "ended",
        }
    }
}

/// Handle returned by [`EventEmitter::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener = Rc<RefCell<dyn FnMut(&SessionEvent)>>;

/// Queue-backed observer list
///
/// Events are queued and delivered by [`flush`](Self::flush) in the order
/// they were raised. A listener may subscribe, unsubscribe or raise further
/// events while being called; nested events are delivered after the current
/// one, never recursively.
#[derive(Default)]
pub struct EventEmitter {
    listeners: RefCell<FxHashMap<SubscriptionId, Listener>>,
    next_id: Cell<u64>,
    queue: RefCell<VecDeque<SessionEvent>>,
    flushing: Cell<bool>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl FnMut(&SessionEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners
            .borrow_mut()
            .insert(id, Rc::new(RefCell::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.borrow_mut().remove(&id).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Queue an event without delivering it
    pub fn queue(&self, event: SessionEvent) {
        self.queue.borrow_mut().push_back(event);
    }

    /// Queue and deliver
    pub fn emit(&self, event: SessionEvent) {
        self.queue(event);
        self.flush();
    }

    /// Deliver every queued event
    pub fn flush(&self) {
        if self.flushing.replace(true) {
            return;
        }

        loop {
            let Some(event) = self.queue.borrow_mut().pop_front() else {
                break;
            };

            let mut listeners: Vec<(SubscriptionId, Listener)> = self
                .listeners
                .borrow()
                .iter()
                .map(|(id, l)| (*id, l.clone()))
                .collect();
            listeners.sort_by_key(|(id, _)| *id);

            for (id, listener) in listeners {
                // Skip listeners removed by an earlier one
                if !self.listeners.borrow().contains_key(&id) {
                    continue;
                }
                if let Ok(mut callback) = listener.try_borrow_mut() {
                    (*callback)(&event);
                }
            }
        }

        self.flushing.set(false);
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listener_count())
            .field("queued", &self.queue.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(emitter: &EventEmitter) -> Rc<RefCell<Vec<&'static str>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        emitter.subscribe(move |e| sink.borrow_mut().push(e.name()));
        log
    }

    #[test]
    fn test_delivery_order() {
        let emitter = EventEmitter::new();
        let log = recorder(&emitter);

        emitter.queue(SessionEvent::Ready);
        emitter.queue(SessionEvent::TrackingLost);
        assert!(log.borrow().is_empty());

        emitter.flush();
        assert_eq!(*log.borrow(), ["ready", "trackingLost"]);
    }

    #[test]
    fn test_unsubscribe() {
        let emitter = EventEmitter::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let id = emitter.subscribe(move |_| c.set(c.get() + 1));

        emitter.emit(SessionEvent::Ready);
        assert!(emitter.unsubscribe(id));
        assert!(!emitter.unsubscribe(id));
        emitter.emit(SessionEvent::Ready);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_nested_events_are_delivered_after() {
        let emitter = Rc::new(EventEmitter::new());
        let log = recorder(&emitter);

        let inner = emitter.clone();
        emitter.subscribe(move |e| {
            if matches!(e, SessionEvent::Ready) {
                inner.emit(SessionEvent::TrackingLost);
            }
        });

        emitter.emit(SessionEvent::Ready);
        assert_eq!(*log.borrow(), ["ready", "trackingLost"]);
    }

    #[test]
    fn test_subscribe_during_delivery() {
        let emitter = Rc::new(EventEmitter::new());
        let late = Rc::new(Cell::new(0));

        let inner = emitter.clone();
        let late_count = late.clone();
        emitter.subscribe(move |_| {
            let c = late_count.clone();
            inner.subscribe(move |_| c.set(c.get() + 1));
        });

        emitter.emit(SessionEvent::Ready);
        assert_eq!(late.get(), 0);
        assert_eq!(emitter.listener_count(), 2);
    }
}
