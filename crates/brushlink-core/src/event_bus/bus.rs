//! The session's publish/subscribe hub.
//!
//! Handlers run inline inside [`EventBus::publish`], on the tick that
//! produced the event. Consumers on other threads (trial loggers) take a
//! broadcast receiver instead and drain it at their own pace.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{AppEvent, EventCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.simple().to_string()[..8])
    }
}

/// Which events a handler is called for.
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    #[default]
    All,
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type Handler = Arc<dyn Fn(AppEvent) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// How far a broadcast receiver may fall behind before it skips ahead.
    pub channel_capacity: usize,
    pub enable_history: bool,
    /// Oldest events are dropped past this many.
    pub max_history_size: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            enable_history: false,
            max_history_size: 1000,
        }
    }
}

/// Owned by the composition root and shared as `Arc<EventBus>`.
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
    handlers: RwLock<HashMap<SubscriptionId, (EventFilter, Handler)>>,
    history: Mutex<VecDeque<AppEvent>>,
    config: EventBusConfig,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            handlers: RwLock::new(HashMap::new()),
            history: Mutex::new(VecDeque::new()),
            config,
        }
    }

    /// Delivers `event` and returns how many handlers and receivers got it.
    ///
    /// Matching handlers are collected before any runs, so a handler may
    /// subscribe or unsubscribe without deadlocking.
    pub fn publish(&self, event: AppEvent) -> usize {
        if self.config.enable_history {
            let mut history = self.history.lock();
            history.push_back(event.clone());
            while history.len() > self.config.max_history_size {
                history.pop_front();
            }
        }

        let matching: Vec<Handler> = self
            .handlers
            .read()
            .values()
            .filter(|(filter, _)| filter.matches(&event))
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in &matching {
            handler(event.clone());
        }

        // No receivers is not a failure.
        let received = self.sender.send(event).unwrap_or(0);
        matching.len() + received
    }

    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.handlers.write().insert(id, (filter, Arc::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Receives every event published after this call.
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.handlers.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Recorded events, oldest first. Empty unless history is enabled.
    pub fn history(&self) -> Vec<AppEvent> {
        self.history.lock().iter().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::events::{InteractionEvent, InteractionKind, SelectionEvent, VisEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn brushing_start() -> AppEvent {
        AppEvent::Interaction(InteractionEvent::new(
            InteractionKind::Brushing,
            "Start",
            1.5,
        ))
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = EventBus::new();
        let id = bus.subscribe(EventFilter::All, |_| {});
        assert_eq!(bus.subscriber_count(), 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.publish(brushing_start()), 0);
    }

    #[test]
    fn test_handlers_only_see_their_categories() {
        let bus = EventBus::new();
        let interactions = Arc::new(AtomicUsize::new(0));
        let counter = interactions.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Interaction]),
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        assert_eq!(bus.publish(brushing_start()), 1);
        assert_eq!(bus.publish(AppEvent::Vis(VisEvent::FilterReset)), 0);
        assert_eq!(interactions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_may_subscribe_while_publishing() {
        let bus = Arc::new(EventBus::new());
        let inner = bus.clone();
        bus.subscribe(EventFilter::All, move |_| {
            inner.subscribe(EventFilter::All, |_| {});
        });

        bus.publish(brushing_start());
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn test_history_keeps_newest() {
        let bus = EventBus::with_config(EventBusConfig {
            enable_history: true,
            max_history_size: 3,
            ..Default::default()
        });
        for count in 0..6 {
            bus.publish(AppEvent::Selection(SelectionEvent::Evicted { count }));
        }

        let history = bus.history();
        assert_eq!(history.len(), 3);
        assert!(matches!(
            history[0],
            AppEvent::Selection(SelectionEvent::Evicted { count: 3 })
        ));
        bus.clear_history();
        assert!(bus.history().is_empty());
    }

    #[test]
    fn test_receiver_on_another_thread() {
        let bus = Arc::new(EventBus::new());
        let mut receiver = bus.receiver();

        let logger = std::thread::spawn(move || {
            let mut lines = Vec::new();
            while let Ok(event) = receiver.blocking_recv() {
                lines.push(event.description());
            }
            lines
        });

        assert_eq!(bus.publish(brushing_start()), 1);
        drop(bus);

        let lines = logger.join().unwrap();
        assert_eq!(lines, vec!["Brushing Start at 1.500s".to_string()]);
    }
}
