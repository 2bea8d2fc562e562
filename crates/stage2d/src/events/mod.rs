//! Event routing
//!
//! Events carry named arguments and are delivered to listeners registered for
//! their [`EventType`]. The first listener returning `true` consumes the event.
//! Events can also be queued for the next frame or for a later time.
//!
//! Listeners may be tied to an owning node. Events that name a target node are
//! delivered to that node's listeners plus unowned ones, and removing a node
//! removes its listeners ([`EventDispatcher::remove_owner`]), so no callback
//! outlives the node it was registered for.

use std::collections::HashMap;

use crate::foundation::math::Vec2;
use crate::input::{KeyCode, MouseButton};
use crate::render::WindowEvent;
use crate::scene::NodeId;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Cursor entered an interactive node
    UiHoverEnter,
    /// Cursor left an interactive node
    UiHoverExit,
    /// Mouse button pressed over an interactive node
    UiPressed,
    /// Mouse button released after a press on an interactive node
    UiReleased,
    /// Press and release on the same interactive node
    UiClicked,
    /// Key went down
    KeyPressed,
    /// Key went up
    KeyReleased,
    /// Mouse cursor moved
    MouseMoved,
    /// Mouse button went down
    MouseButtonPressed,
    /// Mouse button went up
    MouseButtonReleased,
    /// Window client area resized
    WindowResized,
}

/// Typed argument value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventArg {
    /// Node the event is about
    Target(NodeId),
    /// Key
    Key(KeyCode),
    /// Position coordinates
    Position(f32, f32),
    /// Mouse button
    MouseButton(MouseButton),
    /// Width and height
    Size(u32, u32),
}

/// Routed event
#[derive(Debug, Clone)]
pub struct Event {
    /// Kind
    pub event_type: EventType,
    /// Engine time at creation, in seconds
    pub timestamp: f64,
    args: HashMap<&'static str, EventArg>,
}

impl Event {
    /// Event without arguments
    pub fn new(event_type: EventType, timestamp: f64) -> Self {
        Self {
            event_type,
            timestamp,
            args: HashMap::new(),
        }
    }

    /// Attach a named argument
    #[must_use]
    pub fn with_arg(mut self, key: &'static str, value: EventArg) -> Self {
        self.args.insert(key, value);
        self
    }

    /// Address the event to a node
    #[must_use]
    pub fn with_target(self, node: NodeId) -> Self {
        self.with_arg("target", EventArg::Target(node))
    }

    /// Translate a window event. Button events carry `cursor` as their
    /// position; close and focus changes have no event.
    pub fn from_window_event(event: &WindowEvent, timestamp: f64, cursor: Vec2) -> Option<Self> {
        let event = match *event {
            WindowEvent::CursorMoved { x, y } => {
                Self::new(EventType::MouseMoved, timestamp).with_arg("position", EventArg::Position(x, y))
            }
            WindowEvent::MouseButton { button, pressed } => {
                let event_type = if pressed {
                    EventType::MouseButtonPressed
                } else {
                    EventType::MouseButtonReleased
                };
                Self::new(event_type, timestamp)
                    .with_arg("button", EventArg::MouseButton(button))
                    .with_arg("position", EventArg::Position(cursor.x, cursor.y))
            }
            WindowEvent::Key { key, pressed } => {
                let event_type = if pressed {
                    EventType::KeyPressed
                } else {
                    EventType::KeyReleased
                };
                Self::new(event_type, timestamp).with_arg("key", EventArg::Key(key))
            }
            WindowEvent::Resized { width, height } => {
                Self::new(EventType::WindowResized, timestamp).with_arg("size", EventArg::Size(width, height))
            }
            WindowEvent::Close | WindowEvent::Focus(_) => return None,
        };
        Some(event)
    }

    /// Named argument
    pub fn get_arg(&self, key: &str) -> Option<&EventArg> {
        self.args.get(key)
    }

    /// Target node, if the event is addressed
    pub fn target(&self) -> Option<NodeId> {
        match self.get_arg("target") {
            Some(EventArg::Target(node)) => Some(*node),
            _ => None,
        }
    }

    /// `key` argument
    pub fn get_key(&self) -> Option<KeyCode> {
        match self.get_arg("key") {
            Some(EventArg::Key(key)) => Some(*key),
            _ => None,
        }
    }

    /// `position` argument
    pub fn get_position(&self) -> Option<(f32, f32)> {
        match self.get_arg("position") {
            Some(EventArg::Position(x, y)) => Some((*x, *y)),
            _ => None,
        }
    }

    /// `button` argument
    pub fn get_mouse_button(&self) -> Option<MouseButton> {
        match self.get_arg("button") {
            Some(EventArg::MouseButton(button)) => Some(*button),
            _ => None,
        }
    }

    /// `size` argument
    pub fn get_size(&self) -> Option<(u32, u32)> {
        match self.get_arg("size") {
            Some(EventArg::Size(width, height)) => Some((*width, *height)),
            _ => None,
        }
    }
}

/// Event callback; returns `true` if the event was consumed
pub type EventCallback = Box<dyn FnMut(&Event) -> bool>;

/// Handle returned by [`EventDispatcher::add_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener {
    id: ListenerId,
    owner: Option<NodeId>,
    callback: EventCallback,
}

/// Listener table plus the frame and timed queues
#[derive(Default)]
pub struct EventDispatcher {
    queued: Vec<Event>,
    scheduled: Vec<(f64, Event)>,
    listeners: HashMap<EventType, Vec<Listener>>,
    current_time: f64,
    next_id: u64,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listener_count())
            .field("queued", &(self.queued.len() + self.scheduled.len()))
            .finish()
    }
}

impl EventDispatcher {
    /// No listeners, nothing queued
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the clock used for scheduled delivery
    pub fn update_time(&mut self, time: f64) {
        self.current_time = time;
    }

    /// Current time as last set by [`EventDispatcher::update_time`]
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Register a callback for one event type, optionally owned by a node
    pub fn add_listener(
        &mut self,
        owner: Option<NodeId>,
        event_type: EventType,
        callback: impl FnMut(&Event) -> bool + 'static,
    ) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.entry(event_type).or_default().push(Listener {
            id,
            owner,
            callback: Box::new(callback),
        });
        id
    }

    /// Unregister one listener; returns whether it existed
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let mut removed = false;
        for listeners in self.listeners.values_mut() {
            let before = listeners.len();
            listeners.retain(|listener| listener.id != id);
            removed |= listeners.len() != before;
        }
        removed
    }

    /// Unregister every listener owned by `owner`; returns how many went
    pub fn remove_owner(&mut self, owner: NodeId) -> usize {
        let mut removed = 0;
        for listeners in self.listeners.values_mut() {
            let before = listeners.len();
            listeners.retain(|listener| listener.owner != Some(owner));
            removed += before - listeners.len();
        }
        if removed > 0 {
            log::trace!("Removed {removed} listener(s) owned by {owner:?}");
        }
        removed
    }

    /// Total registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    /// Queue for the next [`EventDispatcher::dispatch_pending`]
    pub fn send(&mut self, event: Event) {
        self.queued.push(event);
    }

    /// Queue for delivery once the clock reaches `delivery_time`
    pub fn post(&mut self, delivery_time: f64, event: Event) {
        self.scheduled.push((delivery_time, event));
    }

    /// Deliver the frame queue, then every scheduled event that is due
    pub fn dispatch_pending(&mut self) {
        for event in std::mem::take(&mut self.queued) {
            self.dispatch(&event);
        }

        let now = self.current_time;
        let (due, waiting): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.scheduled).into_iter().partition(|(time, _)| *time <= now);
        self.scheduled = waiting;
        for (_, event) in due {
            self.dispatch(&event);
        }
    }

    /// Deliver one event now. Stops at the first listener that consumes it;
    /// returns whether any did.
    pub fn dispatch(&mut self, event: &Event) -> bool {
        let target = event.target();
        let Some(listeners) = self.listeners.get_mut(&event.event_type) else {
            return false;
        };
        for listener in listeners.iter_mut() {
            let interested = match (target, listener.owner) {
                (Some(target), Some(owner)) => target == owner,
                _ => true,
            };
            if interested && (listener.callback)(event) {
                return true;
            }
        }
        false
    }

    /// Drop queued and scheduled events; listeners stay
    pub fn clear(&mut self) {
        self.queued.clear();
        self.scheduled.clear();
    }
}
