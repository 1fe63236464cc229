//! Navigation lifecycle events and the per-engine event bus.
//!
//! Every [`NavigationEngine`](crate::navigator::NavigationEngine) owns one
//! [`EventBus`]; engines never share a bus, so nested routers do not see each
//! other's events. Subscribers get a [`Subscription`] handle and stay
//! registered until they call [`Subscription::unsubscribe`].
//!
//! # Usage
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use glide_motion::events::{EventBus, EventKind, NavigationEvent};
//!
//! let bus = EventBus::new();
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! let subscription = bus.subscribe_to(EventKind::PageAnimationEnd, move |event| {
//!     sink.borrow_mut().push(event.clone());
//! });
//!
//! bus.publish(&NavigationEvent::PageAnimationStart);
//! bus.publish(&NavigationEvent::PageAnimationEnd);
//! assert_eq!(seen.borrow().len(), 1);
//!
//! subscription.unsubscribe();
//! bus.publish(&NavigationEvent::PageAnimationEnd);
//! assert_eq!(seen.borrow().len(), 1);
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Event consumed or produced by the navigation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NavigationEvent {
    /// Route change requested from outside the engine.
    Navigate {
        route: String,
        #[serde(default)]
        route_params: BTreeMap<String, String>,
    },
    /// Back navigation request or acknowledgement.
    GoBack { replace_state: bool },
    /// Whole-screen timeline started.
    PageAnimationStart,
    /// Whole-screen timeline settled.
    PageAnimationEnd,
    /// Shared element transition aborted.
    PageAnimationCancel,
    /// Progress reporting began.
    MotionProgressStart { progress: f64 },
    /// Progress in [0, 100].
    MotionProgress { progress: f64 },
    /// Progress reporting ended.
    MotionProgressEnd { progress: f64 },
}

/// Payload-free discriminant of [`NavigationEvent`], used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    Navigate,
    GoBack,
    PageAnimationStart,
    PageAnimationEnd,
    PageAnimationCancel,
    MotionProgressStart,
    MotionProgress,
    MotionProgressEnd,
}

impl NavigationEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Navigate { .. } => EventKind::Navigate,
            Self::GoBack { .. } => EventKind::GoBack,
            Self::PageAnimationStart => EventKind::PageAnimationStart,
            Self::PageAnimationEnd => EventKind::PageAnimationEnd,
            Self::PageAnimationCancel => EventKind::PageAnimationCancel,
            Self::MotionProgressStart { .. } => EventKind::MotionProgressStart,
            Self::MotionProgress { .. } => EventKind::MotionProgress,
            Self::MotionProgressEnd { .. } => EventKind::MotionProgressEnd,
        }
    }

    /// External event name.
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Progress payload, for the motion-progress family.
    pub fn progress(&self) -> Option<f64> {
        match self {
            Self::MotionProgressStart { progress }
            | Self::MotionProgress { progress }
            | Self::MotionProgressEnd { progress } => Some(*progress),
            _ => None,
        }
    }
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Navigate => "navigate",
            Self::GoBack => "go-back",
            Self::PageAnimationStart => "page-animation-start",
            Self::PageAnimationEnd => "page-animation-end",
            Self::PageAnimationCancel => "page-animation-cancel",
            Self::MotionProgressStart => "motion-progress-start",
            Self::MotionProgress => "motion-progress",
            Self::MotionProgressEnd => "motion-progress-end",
        }
    }
}

/// FIFO of events produced while the engine mutates its state. The engine
/// flushes it to the bus once the operation is complete, so handlers never
/// observe a half-applied transition.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<NavigationEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: NavigationEvent) {
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<NavigationEvent> {
        self.events.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

type Handler = Rc<RefCell<dyn FnMut(&NavigationEvent)>>;

struct Subscriber {
    id: u64,
    filter: Option<EventKind>,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// Typed publish/subscribe bus scoped to one engine.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every event.
    pub fn subscribe(&self, handler: impl FnMut(&NavigationEvent) + 'static) -> Subscription {
        self.add(None, handler)
    }

    /// Receive events of one kind only.
    pub fn subscribe_to(
        &self,
        kind: EventKind,
        handler: impl FnMut(&NavigationEvent) + 'static,
    ) -> Subscription {
        self.add(Some(kind), handler)
    }

    fn add(
        &self,
        filter: Option<EventKind>,
        handler: impl FnMut(&NavigationEvent) + 'static,
    ) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.subscribers.push(Subscriber { id, filter, handler: Rc::new(RefCell::new(handler)) });
        Subscription { bus: Rc::downgrade(&self.inner), id }
    }

    /// Deliver `event` to every matching subscriber in subscription order.
    ///
    /// Handlers may subscribe, unsubscribe or publish while being called. A
    /// handler that is already running is not re-entered.
    pub fn publish(&self, event: &NavigationEvent) {
        let kind = event.kind();
        let handlers: Vec<Handler> = self
            .inner
            .borrow()
            .subscribers
            .iter()
            .filter(|s| s.filter.is_none_or(|f| f == kind))
            .map(|s| Rc::clone(&s.handler))
            .collect();

        trace!(event = kind.name(), handlers = handlers.len(), "publish");
        for handler in handlers {
            match handler.try_borrow_mut() {
                Ok(mut handler) => (&mut *handler)(event),
                Err(_) => trace!(event = kind.name(), "skipping re-entrant handler"),
            }
        }
    }

    /// Publish everything queued, in order.
    pub fn flush(&self, queue: &mut EventQueue) {
        while let Some(event) = queue.pop() {
            self.publish(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug)]
#[must_use = "dropping a Subscription keeps the handler registered; call unsubscribe() to remove it"]
pub struct Subscription {
    bus: Weak<RefCell<BusInner>>,
    id: u64,
}

impl Subscription {
    /// Remove the handler. Returns `false` if the bus is gone.
    pub fn unsubscribe(self) -> bool {
        let Some(bus) = self.bus.upgrade() else {
            return false;
        };
        let mut inner = bus.borrow_mut();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|s| s.id != self.id);
        inner.subscribers.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(bus: &EventBus) -> (Subscription, Rc<RefCell<Vec<NavigationEvent>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = bus.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        (sub, seen)
    }

    #[test]
    fn test_event_names() {
        assert_eq!(NavigationEvent::PageAnimationStart.name(), "page-animation-start");
        assert_eq!(NavigationEvent::GoBack { replace_state: true }.name(), "go-back");
        assert_eq!(NavigationEvent::MotionProgress { progress: 3.0 }.progress(), Some(3.0));
        assert_eq!(NavigationEvent::PageAnimationEnd.progress(), None);
    }

    #[test]
    fn test_event_serialization() {
        let event = NavigationEvent::MotionProgress { progress: 42.5 };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"motion-progress\""));
        assert!(json.contains("\"progress\":42.5"));

        let parsed: NavigationEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);

        let navigate: NavigationEvent =
            serde_json::from_str(r#"{"type":"navigate","route":"/details"}"#).unwrap();
        assert_eq!(
            navigate,
            NavigationEvent::Navigate { route: "/details".into(), route_params: BTreeMap::new() }
        );
    }

    #[test]
    fn test_publish_in_subscription_order() {
        let bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let (a, b) = (Rc::clone(&order), Rc::clone(&order));
        let _first = bus.subscribe(move |_| a.borrow_mut().push(1));
        let _second = bus.subscribe(move |_| b.borrow_mut().push(2));
        bus.publish(&NavigationEvent::PageAnimationStart);
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_filtered_subscription() {
        let bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let _sub = bus.subscribe_to(EventKind::MotionProgress, move |_| *sink.borrow_mut() += 1);
        bus.publish(&NavigationEvent::MotionProgressStart { progress: 0.0 });
        bus.publish(&NavigationEvent::MotionProgress { progress: 10.0 });
        bus.publish(&NavigationEvent::MotionProgress { progress: 20.0 });
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let (sub, seen) = recorder(&bus);
        bus.publish(&NavigationEvent::PageAnimationEnd);
        assert!(sub.unsubscribe());
        bus.publish(&NavigationEvent::PageAnimationEnd);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribe_after_bus_dropped() {
        let bus = EventBus::new();
        let (sub, _seen) = recorder(&bus);
        drop(bus);
        assert!(!sub.unsubscribe());
    }

    #[test]
    fn test_buses_are_isolated() {
        let a = EventBus::new();
        let b = EventBus::new();
        let (_sub, seen) = recorder(&a);
        b.publish(&NavigationEvent::PageAnimationStart);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_handler_may_publish() {
        let bus = EventBus::new();
        let (_sub, seen) = recorder(&bus);
        let inner = bus.clone();
        let _relay = bus.subscribe_to(EventKind::PageAnimationStart, move |_| {
            inner.publish(&NavigationEvent::MotionProgressStart { progress: 0.0 });
        });
        bus.publish(&NavigationEvent::PageAnimationStart);
        let kinds: Vec<EventKind> = seen.borrow().iter().map(NavigationEvent::kind).collect();
        assert_eq!(kinds, vec![EventKind::PageAnimationStart, EventKind::MotionProgressStart]);
    }

    #[test]
    fn test_flush_queue() {
        let bus = EventBus::new();
        let (_sub, seen) = recorder(&bus);
        let mut queue = EventQueue::new();
        queue.push(NavigationEvent::PageAnimationStart);
        queue.push(NavigationEvent::PageAnimationEnd);
        bus.flush(&mut queue);
        assert!(queue.is_empty());
        let kinds: Vec<EventKind> = seen.borrow().iter().map(NavigationEvent::kind).collect();
        assert_eq!(kinds, vec![EventKind::PageAnimationStart, EventKind::PageAnimationEnd]);
    }
}
