//! # Scenes
//!
//! A scene owns one node tree, its camera and its event listeners. Scenes are
//! shared as [`SceneRef`] so the manager's stack, its named registry and an
//! in-flight transition can all hold the same scene without copies.
//!
//! Game-specific behavior plugs in through [`SceneScript`]; its hooks are
//! called with the scene mutably borrowed, so a script may add or remove
//! nodes, move the camera or register listeners.

use std::cell::RefCell;
use std::rc::Rc;

use crate::events::{Event, EventArg, EventDispatcher, EventType, ListenerId};
use crate::foundation::math::{Color, Size, Vec2};
use crate::input::MouseButton;
use crate::render::{Camera, RenderCommand, WindowEvent};

use super::node::{Node, NodeId, NodeTree};

/// Shared handle to a scene
pub type SceneRef = Rc<RefCell<Scene>>;

/// Lifecycle state of a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneState {
    /// Not on screen (never entered, or exited)
    #[default]
    Idle,
    /// Entered and on top of the stack
    Running,
    /// Entered but covered by another scene
    Paused,
}

/// Per-scene game logic
///
/// Every hook has an empty default, implement only what the scene needs.
pub trait SceneScript {
    /// Scene became active for the first time
    fn on_enter(&mut self, _scene: &mut Scene) {}

    /// Scene is leaving the stack
    fn on_exit(&mut self, _scene: &mut Scene) {}

    /// Per-frame update while running
    fn on_update(&mut self, _scene: &mut Scene, _dt: f32) {}

    /// Another scene was pushed on top
    fn on_pause(&mut self, _scene: &mut Scene) {}

    /// The scene on top was popped
    fn on_resume(&mut self, _scene: &mut Scene) {}
}

/// A screenful of nodes with a camera and listeners
pub struct Scene {
    name: String,
    background: Color,
    viewport: Size,
    camera: Camera,
    nodes: NodeTree,
    events: EventDispatcher,
    state: SceneState,
    script: Option<Box<dyn SceneScript>>,
    time: f64,
    cursor: Vec2,
    hovered: Option<NodeId>,
    pressed: Option<NodeId>,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("viewport", &self.viewport)
            .field("nodes", &self.nodes.len())
            .field("scripted", &self.script.is_some())
            .finish_non_exhaustive()
    }
}

/// Viewport used until the engine (or caller) sets one
const DEFAULT_VIEWPORT: Size = Size::new(800.0, 600.0);

impl Scene {
    /// Create an idle, empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            background: Color::BLACK,
            viewport: DEFAULT_VIEWPORT,
            camera: Camera::for_viewport(DEFAULT_VIEWPORT.width, DEFAULT_VIEWPORT.height),
            nodes: NodeTree::new(),
            events: EventDispatcher::new(),
            state: SceneState::Idle,
            script: None,
            time: 0.0,
            cursor: Vec2::zeros(),
            hovered: None,
            pressed: None,
        }
    }

    /// Attach a script (builder)
    #[must_use]
    pub fn with_script(mut self, script: impl SceneScript + 'static) -> Self {
        self.script = Some(Box::new(script));
        self
    }

    /// Set the background color (builder)
    #[must_use]
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Wrap into a shared handle
    pub fn into_ref(self) -> SceneRef {
        Rc::new(RefCell::new(self))
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lifecycle state
    pub fn state(&self) -> SceneState {
        self.state
    }

    /// Whether the scene is entered and on top
    pub fn is_running(&self) -> bool {
        self.state == SceneState::Running
    }

    /// Clear color for frames showing this scene
    pub fn background_color(&self) -> Color {
        self.background
    }

    /// Set the clear color
    pub fn set_background_color(&mut self, color: Color) {
        self.background = color;
    }

    /// Viewport size in pixels
    pub fn viewport_size(&self) -> Size {
        self.viewport
    }

    /// Resize the viewport; the camera keeps its position, rotation and zoom.
    /// Non-positive sizes (a minimized window) are ignored.
    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            log::debug!("Scene '{}': ignoring viewport {width}x{height}", self.name);
            return;
        }
        self.viewport = Size::new(width, height);
        self.camera.set_viewport(0.0, width, height, 0.0);
    }

    /// Camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Node tree
    pub fn nodes(&self) -> &NodeTree {
        &self.nodes
    }

    /// Mutable node tree. Prefer [`Scene::remove_node`] for removal so
    /// listeners go with their nodes.
    pub fn nodes_mut(&mut self) -> &mut NodeTree {
        &mut self.nodes
    }

    /// Event listeners
    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    /// Mutable event listeners
    pub fn events_mut(&mut self) -> &mut EventDispatcher {
        &mut self.events
    }

    /// Replace the script
    pub fn set_script(&mut self, script: Box<dyn SceneScript>) {
        self.script = Some(script);
    }

    /// Add a node under the root
    pub fn add_node(&mut self, node: Node) -> NodeId {
        self.nodes.add(node)
    }

    /// Add a node under `parent`
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> Option<NodeId> {
        self.nodes.add_child(parent, node)
    }

    /// Find a node by name
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes.find_by_name(name)
    }

    /// Remove a node, its subtree and every listener they own
    pub fn remove_node(&mut self, id: NodeId) -> usize {
        let removed = self.nodes.remove(id);
        for node in &removed {
            self.events.remove_owner(*node);
            if self.hovered == Some(*node) {
                self.hovered = None;
            }
            if self.pressed == Some(*node) {
                self.pressed = None;
            }
        }
        removed.len()
    }

    /// Call `callback` whenever `node` is clicked
    pub fn on_click(&mut self, node: NodeId, mut callback: impl FnMut() + 'static) -> ListenerId {
        self.events.add_listener(Some(node), EventType::UiClicked, move |_| {
            callback();
            true
        })
    }

    fn run_script(&mut self, hook: impl FnOnce(&mut dyn SceneScript, &mut Self)) {
        if let Some(mut script) = self.script.take() {
            hook(script.as_mut(), self);
            // A hook may install a replacement script; keep it.
            if self.script.is_none() {
                self.script = Some(script);
            }
        }
    }

    /// Become the active scene
    pub fn enter(&mut self) {
        log::debug!("Scene '{}' entered", self.name);
        self.state = SceneState::Running;
        self.run_script(|script, scene| script.on_enter(scene));
    }

    /// Leave the stack
    pub fn exit(&mut self) {
        log::debug!("Scene '{}' exited", self.name);
        self.run_script(|script, scene| script.on_exit(scene));
        self.state = SceneState::Idle;
        self.events.clear();
        self.hovered = None;
        self.pressed = None;
    }

    /// Covered by another scene
    pub fn pause(&mut self) {
        if self.state == SceneState::Running {
            self.state = SceneState::Paused;
            self.run_script(|script, scene| script.on_pause(scene));
        }
    }

    /// Uncovered again
    pub fn resume(&mut self) {
        if self.state == SceneState::Paused {
            self.state = SceneState::Running;
            self.run_script(|script, scene| script.on_resume(scene));
        }
    }

    /// Advance nodes, script and queued events; only running scenes move
    pub fn update(&mut self, dt: f32) {
        if self.state != SceneState::Running {
            return;
        }
        self.time += f64::from(dt);
        self.nodes.update(dt);
        self.run_script(|script, scene| script.on_update(scene, dt));
        self.events.update_time(self.time);
        self.events.dispatch_pending();
    }

    /// Append this scene's commands: its view-projection first, then every
    /// visible node, alpha scaled by `opacity`
    pub fn collect_render_commands(&self, out: &mut Vec<RenderCommand>, opacity: f32) {
        out.push(RenderCommand::ViewProjection(self.camera.view_projection()));
        self.nodes.collect_render_commands(out, opacity);
    }

    /// Feed one window event: the matching key/mouse/resize event goes to
    /// the scene's listeners, then the primary button and cursor drive UI
    /// pointer routing
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        let cursor = match *event {
            WindowEvent::CursorMoved { x, y } => Vec2::new(x, y),
            _ => self.cursor,
        };
        if let Some(translated) = Event::from_window_event(event, self.time, cursor) {
            self.dispatch(translated);
        }
        match *event {
            WindowEvent::CursorMoved { x, y } => self.pointer_moved(Vec2::new(x, y)),
            WindowEvent::MouseButton {
                button: MouseButton::Left,
                pressed,
            } => self.pointer_button(pressed),
            _ => {}
        }
    }

    fn dispatch(&mut self, event: Event) -> bool {
        self.events.dispatch(&event)
    }

    fn ui_event(&mut self, event_type: EventType, node: NodeId) {
        let event = Event::new(event_type, self.time)
            .with_target(node)
            .with_arg("position", EventArg::Position(self.cursor.x, self.cursor.y));
        self.dispatch(event);
    }

    /// Move the pointer to a screen position, updating hover state
    pub fn pointer_moved(&mut self, screen: Vec2) {
        self.cursor = screen;
        let world = self.camera.screen_to_world(screen);
        let hit = self.nodes.hit_test(world);
        if hit == self.hovered {
            return;
        }

        if let Some(previous) = self.hovered.take() {
            if let Some(node) = self.nodes.get_mut(previous) {
                node.ui_state_mut().hovered = false;
            }
            self.ui_event(EventType::UiHoverExit, previous);
        }
        if let Some(current) = hit {
            if let Some(node) = self.nodes.get_mut(current) {
                node.ui_state_mut().hovered = true;
            }
            self.hovered = Some(current);
            self.ui_event(EventType::UiHoverEnter, current);
        }
    }

    /// Press or release the primary button at the last pointer position
    pub fn pointer_button(&mut self, pressed: bool) {
        let world = self.camera.screen_to_world(self.cursor);
        let hit = self.nodes.hit_test(world);

        if pressed {
            let Some(target) = hit else {
                return;
            };
            if let Some(node) = self.nodes.get_mut(target) {
                node.ui_state_mut().pressed = true;
            }
            self.pressed = Some(target);
            self.ui_event(EventType::UiPressed, target);
            return;
        }

        let Some(target) = self.pressed.take() else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(target) {
            node.ui_state_mut().pressed = false;
        }
        self.ui_event(EventType::UiReleased, target);
        if hit == Some(target) {
            self.ui_event(EventType::UiClicked, target);
        }
    }

    /// Node under the pointer, if interactive
    pub fn hovered_node(&self) -> Option<NodeId> {
        self.hovered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct Trace(Rc<RefCell<Vec<&'static str>>>);

    impl SceneScript for Trace {
        fn on_enter(&mut self, scene: &mut Scene) {
            self.0.borrow_mut().push("enter");
            scene.add_node(Node::empty().with_name("spawned"));
        }
        fn on_exit(&mut self, _scene: &mut Scene) {
            self.0.borrow_mut().push("exit");
        }
        fn on_update(&mut self, _scene: &mut Scene, _dt: f32) {
            self.0.borrow_mut().push("update");
        }
        fn on_pause(&mut self, _scene: &mut Scene) {
            self.0.borrow_mut().push("pause");
        }
        fn on_resume(&mut self, _scene: &mut Scene) {
            self.0.borrow_mut().push("resume");
        }
    }

    #[test]
    fn test_lifecycle_hooks() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scene = Scene::new("level").with_script(Trace(Rc::clone(&log)));

        scene.update(0.1);
        scene.enter();
        assert!(scene.find_node("spawned").is_some());
        scene.update(0.1);
        scene.pause();
        scene.update(0.1);
        scene.resume();
        scene.exit();

        assert_eq!(*log.borrow(), vec!["enter", "update", "pause", "resume", "exit"]);
        assert_eq!(scene.state(), SceneState::Idle);
    }

    #[test]
    fn test_commands_start_with_view_projection() {
        let mut scene = Scene::new("s");
        scene.add_node(Node::rect(10.0, 10.0, Color::RED));
        let mut out = Vec::new();
        scene.collect_render_commands(&mut out, 1.0);
        assert!(matches!(out[0], RenderCommand::ViewProjection(_)));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_click_routing() {
        let mut scene = Scene::new("menu");
        scene.enter();
        let button = scene.add_node(Node::rect(100.0, 40.0, Color::BLUE).at(200.0, 100.0).interactive());
        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        scene.on_click(button, move || counter.set(counter.get() + 1));

        scene.pointer_moved(Vec2::new(210.0, 110.0));
        assert_eq!(scene.hovered_node(), Some(button));
        assert!(scene.nodes().get(button).unwrap().ui_state().hovered);

        scene.handle_window_event(&WindowEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
        });
        assert!(scene.nodes().get(button).unwrap().ui_state().pressed);
        scene.handle_window_event(&WindowEvent::MouseButton {
            button: MouseButton::Left,
            pressed: false,
        });
        assert_eq!(clicks.get(), 1);

        // Press inside, release outside: no click.
        scene.pointer_button(true);
        scene.pointer_moved(Vec2::new(10.0, 10.0));
        assert_eq!(scene.hovered_node(), None);
        scene.pointer_button(false);
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn test_remove_node_drops_listeners() {
        let mut scene = Scene::new("s");
        let parent = scene.add_node(Node::empty());
        let child = scene.add_child(parent, Node::rect(1.0, 1.0, Color::RED).interactive()).unwrap();
        scene.on_click(child, || {});
        scene.on_click(parent, || {});
        assert_eq!(scene.events().listener_count(), 2);

        assert_eq!(scene.remove_node(parent), 2);
        assert_eq!(scene.events().listener_count(), 0);
    }
}
