//! # Scene Manager
//!
//! Stack-based scene lifecycle with a transition sub-state:
//!
//! ```text
//! Empty ──run_with_scene──▶ Active ◀──finish──▶ Transitioning
//! ```
//!
//! Only the top of the stack is active. While a transition runs, every
//! stack mutation is rejected, the requested change is held as a
//! [`PendingOp`], and exactly two scenes render (outgoing then incoming).
//! The change, its lifecycle hooks and the one-shot callback are committed
//! together on the update that finishes the transition, so the renderer
//! never sees a half-applied stack.
//!
//! Once a scene has been entered the stack is never empty again until
//! [`SceneManager::end`].

use std::collections::HashMap;
use std::rc::Rc;

use crate::foundation::math::Size;
use crate::render::{execute_commands, RenderBackend, RenderCommand, WindowEvent};

use super::scene::SceneRef;
use super::transition::{Transition, TransitionType};

/// Stack change deferred until a transition finishes
#[derive(Debug)]
enum PendingOp {
    /// Top exits and is popped, incoming is pushed and entered
    Replace,
    /// Top pauses, incoming is pushed and entered
    Push,
    /// Top exits and is popped, the one below resumes
    Pop,
    /// Everything above the root exits, the root resumes
    PopToRoot,
    /// Unwind to the target if stacked, otherwise replace the top with it
    PopTo,
}

struct ActiveTransition {
    transition: Transition,
    outgoing: Option<SceneRef>,
    incoming: SceneRef,
    op: PendingOp,
}

/// Owns the scene stack and the named scene registry
#[derive(Default)]
pub struct SceneManager {
    stack: Vec<SceneRef>,
    registry: HashMap<String, SceneRef>,
    active: Option<ActiveTransition>,
    next_callback: Option<Box<dyn FnOnce()>>,
    viewport: Option<Size>,
}

impl std::fmt::Debug for SceneManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.stack.iter().map(|scene| scene.borrow().name().to_string()).collect();
        f.debug_struct("SceneManager")
            .field("stack", &names)
            .field("registered", &self.registry.len())
            .field("transitioning", &self.is_transitioning())
            .finish_non_exhaustive()
    }
}

impl SceneManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Viewport applied to every managed scene, now and as they arrive
    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            log::debug!("SceneManager: keeping viewport, got {width}x{height}");
            return;
        }
        self.viewport = Some(Size::new(width, height));
        for scene in self.stack.iter().chain(self.registry.values()) {
            scene.borrow_mut().set_viewport_size(width, height);
        }
    }

    fn adopt(&self, scene: &SceneRef) {
        if let Some(size) = self.viewport {
            scene.borrow_mut().set_viewport_size(size.width, size.height);
        }
    }

    fn reject(&self, operation: &str) -> bool {
        if self.is_transitioning() {
            log::debug!("SceneManager: {operation} ignored while a transition is running");
            return true;
        }
        false
    }

    /// Enter the first scene. Only valid while the stack is empty.
    pub fn run_with_scene(&mut self, scene: SceneRef) {
        if !self.stack.is_empty() {
            log::warn!("SceneManager: run_with_scene should only be called once");
            return;
        }
        if self.reject("run_with_scene") {
            return;
        }
        self.adopt(&scene);
        log::info!("Running scene '{}'", scene.borrow().name());
        scene.borrow_mut().enter();
        self.stack.push(scene);
    }

    /// Enter the first scene, or replace the current one
    pub fn enter_scene(&mut self, scene: SceneRef) {
        if self.stack.is_empty() {
            self.run_with_scene(scene);
        } else {
            self.replace_scene(scene);
        }
    }

    /// Like [`SceneManager::enter_scene`], replacing through a transition
    pub fn enter_scene_with(&mut self, scene: SceneRef, kind: TransitionType, duration: f32) {
        if self.stack.is_empty() {
            self.run_with_scene(scene);
        } else {
            self.replace_scene_with(scene, kind, duration);
        }
    }

    /// Exit and pop the top, then push and enter `scene`
    pub fn replace_scene(&mut self, scene: SceneRef) {
        if self.reject("replace_scene") {
            return;
        }
        let Some(old) = self.stack.pop() else {
            self.run_with_scene(scene);
            return;
        };
        old.borrow_mut().exit();
        self.adopt(&scene);
        scene.borrow_mut().enter();
        self.stack.push(scene);
    }

    /// Replace the top scene through a transition
    pub fn replace_scene_with(&mut self, scene: SceneRef, kind: TransitionType, duration: f32) {
        if self.reject("replace_scene") {
            return;
        }
        let Some(top) = self.current_scene() else {
            self.run_with_scene(scene);
            return;
        };
        self.start_transition(Some(top), scene, kind, duration, PendingOp::Replace);
    }

    /// Pause the top and push `scene` over it
    pub fn push_scene(&mut self, scene: SceneRef) {
        if self.reject("push_scene") {
            return;
        }
        if let Some(top) = self.stack.last() {
            top.borrow_mut().pause();
        }
        self.adopt(&scene);
        scene.borrow_mut().enter();
        self.stack.push(scene);
    }

    /// Push `scene` through a transition
    pub fn push_scene_with(&mut self, scene: SceneRef, kind: TransitionType, duration: f32) {
        if self.reject("push_scene") {
            return;
        }
        let Some(top) = self.current_scene() else {
            self.run_with_scene(scene);
            return;
        };
        self.start_transition(Some(top), scene, kind, duration, PendingOp::Push);
    }

    /// Exit the top and resume the scene below; no-op with one scene
    pub fn pop_scene(&mut self) {
        if self.reject("pop_scene") || !self.can_pop("pop_scene") {
            return;
        }
        if let Some(top) = self.stack.pop() {
            top.borrow_mut().exit();
        }
        self.resume_top();
    }

    /// Pop through a transition; the top stays stacked until it finishes
    pub fn pop_scene_with(&mut self, kind: TransitionType, duration: f32) {
        if self.reject("pop_scene") || !self.can_pop("pop_scene") {
            return;
        }
        let (Some(top), Some(below)) = (self.current_scene(), self.previous_scene()) else {
            return;
        };
        self.start_transition(Some(top), below, kind, duration, PendingOp::Pop);
    }

    /// Exit everything above the root, top first, and resume the root
    pub fn pop_to_root_scene(&mut self) {
        if self.reject("pop_to_root_scene") || !self.can_pop("pop_to_root_scene") {
            return;
        }
        self.unwind(1);
        self.resume_top();
    }

    /// Pop to the root through a transition
    pub fn pop_to_root_scene_with(&mut self, kind: TransitionType, duration: f32) {
        if self.reject("pop_to_root_scene") || !self.can_pop("pop_to_root_scene") {
            return;
        }
        let (Some(top), Some(root)) = (self.current_scene(), self.root_scene()) else {
            return;
        };
        self.start_transition(Some(top), root, kind, duration, PendingOp::PopToRoot);
    }

    /// Exit every scene above the stacked scene named `name` and resume it.
    /// No-op when no stacked scene has that name.
    pub fn pop_to_scene(&mut self, name: &str) {
        if self.reject("pop_to_scene") {
            return;
        }
        let Some(depth) = self.stack_position(name) else {
            log::debug!("SceneManager: pop_to_scene('{name}') found no such scene on the stack");
            return;
        };
        if depth + 1 == self.stack.len() {
            return;
        }
        self.unwind(depth + 1);
        self.resume_top();
    }

    /// Transition to the scene named `name`, looked up in the registry first
    /// and then on the stack. A stacked target is unwound to; a registered
    /// one replaces the top.
    pub fn pop_to_scene_with(&mut self, name: &str, kind: TransitionType, duration: f32) {
        if self.reject("pop_to_scene") {
            return;
        }
        let (Some(top), Some(target)) = (self.current_scene(), self.scene_by_name(name)) else {
            log::debug!("SceneManager: pop_to_scene('{name}') has no target");
            return;
        };
        if Rc::ptr_eq(&top, &target) {
            return;
        }
        self.start_transition(Some(top), target, kind, duration, PendingOp::PopTo);
    }

    fn can_pop(&self, operation: &str) -> bool {
        if self.stack.len() <= 1 {
            log::debug!("SceneManager: {operation} needs at least two scenes");
            return false;
        }
        true
    }

    fn stack_position(&self, name: &str) -> Option<usize> {
        self.stack.iter().rposition(|scene| scene.borrow().name() == name)
    }

    /// Exit and pop scenes, top first, until `len` remain
    fn unwind(&mut self, len: usize) {
        while self.stack.len() > len {
            if let Some(scene) = self.stack.pop() {
                scene.borrow_mut().exit();
            }
        }
    }

    fn resume_top(&self) {
        if let Some(top) = self.stack.last() {
            top.borrow_mut().resume();
        }
    }

    fn start_transition(
        &mut self,
        outgoing: Option<SceneRef>,
        incoming: SceneRef,
        kind: TransitionType,
        duration: f32,
        op: PendingOp,
    ) {
        self.adopt(&incoming);
        let mut transition = Transition::new(kind, duration);
        if let Some(callback) = self.next_callback.take() {
            let mut callback = Some(callback);
            transition.set_on_finish(move || {
                if let Some(callback) = callback.take() {
                    callback();
                }
            });
        }
        transition.start(outgoing.as_ref(), &incoming);
        log::info!(
            "Scene transition {:?} ({kind:?}, {duration:.2}s) to '{}'",
            op,
            incoming.borrow().name()
        );
        self.active = Some(ActiveTransition {
            transition,
            outgoing,
            incoming,
            op,
        });
    }

    fn finish_transition(&mut self, active: ActiveTransition) {
        let ActiveTransition {
            mut transition,
            outgoing,
            incoming,
            op,
        } = active;

        match op {
            PendingOp::Replace => {
                if let Some(old) = self.stack.pop() {
                    old.borrow_mut().exit();
                }
                incoming.borrow_mut().enter();
                self.stack.push(incoming);
            }
            PendingOp::Push => {
                if let Some(old) = outgoing {
                    old.borrow_mut().pause();
                }
                incoming.borrow_mut().enter();
                self.stack.push(incoming);
            }
            PendingOp::Pop => {
                if let Some(old) = self.stack.pop() {
                    old.borrow_mut().exit();
                }
                self.resume_top();
            }
            PendingOp::PopToRoot => {
                self.unwind(1);
                self.resume_top();
            }
            PendingOp::PopTo => {
                if let Some(depth) = self.stack.iter().rposition(|scene| Rc::ptr_eq(scene, &incoming)) {
                    self.unwind(depth + 1);
                    self.resume_top();
                } else {
                    if let Some(old) = self.stack.pop() {
                        old.borrow_mut().exit();
                    }
                    incoming.borrow_mut().enter();
                    self.stack.push(incoming);
                }
            }
        }

        transition.notify_finished();
    }

    /// One-shot callback run after the stack change of the running transition
    /// (or, when idle, the next one) has been committed
    pub fn set_transition_callback(&mut self, callback: impl FnOnce() + 'static) {
        let Some(active) = self.active.as_mut() else {
            self.next_callback = Some(Box::new(callback));
            return;
        };
        let mut callback = Some(callback);
        active.transition.set_on_finish(move || {
            if let Some(callback) = callback.take() {
                callback();
            }
        });
    }

    /// Whether a transition is in flight
    pub fn is_transitioning(&self) -> bool {
        self.active.is_some()
    }

    /// Scenes taking part in the running transition: (outgoing, incoming)
    pub fn transition_scenes(&self) -> Option<(Option<SceneRef>, SceneRef)> {
        self.active
            .as_ref()
            .map(|active| (active.outgoing.clone(), Rc::clone(&active.incoming)))
    }

    /// Advance the running transition, or update the top scene
    pub fn update(&mut self, dt: f32) {
        if let Some(active) = self.active.as_mut() {
            if active.transition.advance(dt) {
                if let Some(active) = self.active.take() {
                    self.finish_transition(active);
                }
            }
            return;
        }
        if let Some(top) = self.stack.last() {
            top.borrow_mut().update(dt);
        }
    }

    /// Route a window event to the top scene; dropped while transitioning
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        if self.is_transitioning() {
            return;
        }
        if let Some(top) = self.stack.last() {
            top.borrow_mut().handle_window_event(event);
        }
    }

    /// Append the frame's commands: both transition scenes while one runs
    /// (outgoing first), otherwise the top scene
    pub fn collect_render_commands(&self, out: &mut Vec<RenderCommand>) {
        if let Some(active) = self.active.as_ref().filter(|active| active.transition.duration() > 0.0) {
            active.transition.collect_render_commands(out);
            return;
        }
        if let Some(top) = self.stack.last() {
            top.borrow().collect_render_commands(out, 1.0);
        }
    }

    /// Draw the current frame's commands straight into a backend
    pub fn render(&self, backend: &mut dyn RenderBackend) {
        let mut commands = Vec::new();
        self.collect_render_commands(&mut commands);
        execute_commands(&commands, backend);
    }

    /// Top of the stack
    pub fn current_scene(&self) -> Option<SceneRef> {
        self.stack.last().cloned()
    }

    /// Scene directly below the top
    pub fn previous_scene(&self) -> Option<SceneRef> {
        self.stack.len().checked_sub(2).map(|index| Rc::clone(&self.stack[index]))
    }

    /// Bottom of the stack
    pub fn root_scene(&self) -> Option<SceneRef> {
        self.stack.first().cloned()
    }

    /// Number of stacked scenes
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// Keep `scene` alive under `name` until [`SceneManager::purge_cached_scenes`]
    pub fn register_scene(&mut self, name: impl Into<String>, scene: SceneRef) {
        self.adopt(&scene);
        self.registry.insert(name.into(), scene);
    }

    /// Registered scene named `name`, else the topmost stacked scene with that name
    pub fn scene_by_name(&self, name: &str) -> Option<SceneRef> {
        self.registry
            .get(name)
            .cloned()
            .or_else(|| self.stack_position(name).map(|index| Rc::clone(&self.stack[index])))
    }

    /// Whether [`SceneManager::scene_by_name`] finds anything
    pub fn has_scene(&self, name: &str) -> bool {
        self.scene_by_name(name).is_some()
    }

    /// Exit every stacked scene (top first), drop any transition and clear the registry
    pub fn end(&mut self) {
        if self.active.take().is_some() {
            log::debug!("SceneManager: abandoning running transition");
        }
        self.unwind(0);
        self.registry.clear();
        self.next_callback = None;
    }

    /// Drop the registry's references
    pub fn purge_cached_scenes(&mut self) {
        self.registry.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Color;
    use crate::render::RecordingBackend;
    use crate::scene::{Node, Scene, SceneScript, SceneState};
    use std::cell::{Cell, RefCell};

    type Log = Rc<RefCell<Vec<String>>>;

    struct Hooks {
        name: &'static str,
        log: Log,
    }

    impl Hooks {
        fn record(&self, event: &str) {
            self.log.borrow_mut().push(format!("{}:{event}", self.name));
        }
    }

    impl SceneScript for Hooks {
        fn on_enter(&mut self, _scene: &mut Scene) {
            self.record("enter");
        }
        fn on_exit(&mut self, _scene: &mut Scene) {
            self.record("exit");
        }
        fn on_pause(&mut self, _scene: &mut Scene) {
            self.record("pause");
        }
        fn on_resume(&mut self, _scene: &mut Scene) {
            self.record("resume");
        }
    }

    fn scene(name: &'static str, log: &Log, color: Color) -> SceneRef {
        let mut scene = Scene::new(name).with_script(Hooks {
            name,
            log: Rc::clone(log),
        });
        scene.add_node(Node::rect(10.0, 10.0, color));
        scene.into_ref()
    }

    fn names(manager: &SceneManager) -> Vec<String> {
        manager.stack.iter().map(|scene| scene.borrow().name().to_string()).collect()
    }

    fn taken(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.borrow_mut())
    }

    #[test]
    fn test_run_with_scene_only_once() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        manager.run_with_scene(scene("a", &log, Color::RED));
        manager.run_with_scene(scene("b", &log, Color::BLUE));
        assert_eq!(names(&manager), vec!["a"]);
        assert_eq!(taken(&log), vec!["a:enter"]);
    }

    #[test]
    fn test_stack_never_empties() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        manager.pop_scene();
        manager.run_with_scene(scene("a", &log, Color::RED));
        manager.pop_scene();
        manager.pop_to_root_scene();
        manager.pop_to_scene("missing");
        manager.pop_scene_with(TransitionType::Fade, 0.5);
        assert_eq!(manager.stack_len(), 1);
        assert!(!manager.is_transitioning());

        manager.replace_scene(scene("b", &log, Color::BLUE));
        assert_eq!(names(&manager), vec!["b"]);
    }

    #[test]
    fn test_replace_with_fade_commits_on_completion() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        let a = scene("a", &log, Color::RED);
        let b = scene("b", &log, Color::BLUE);
        let callbacks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&callbacks);

        manager.run_with_scene(Rc::clone(&a));
        taken(&log);
        manager.set_transition_callback(move || counter.set(counter.get() + 1));
        manager.replace_scene_with(Rc::clone(&b), TransitionType::Fade, 0.5);

        assert!(manager.is_transitioning());
        assert_eq!(names(&manager), vec!["a"]);
        assert!(taken(&log).is_empty());

        manager.update(0.6);
        assert!(!manager.is_transitioning());
        assert_eq!(names(&manager), vec!["b"]);
        assert_eq!(taken(&log), vec!["a:exit", "b:enter"]);
        assert_eq!(a.borrow().state(), SceneState::Idle);
        assert_eq!(callbacks.get(), 1);

        manager.update(0.6);
        assert_eq!(callbacks.get(), 1);
    }

    #[test]
    fn test_mutations_rejected_while_transitioning() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        manager.run_with_scene(scene("a", &log, Color::RED));
        manager.push_scene_with(scene("b", &log, Color::BLUE), TransitionType::Scale, 1.0);

        manager.push_scene(scene("c", &log, Color::GREEN));
        manager.replace_scene(scene("d", &log, Color::GREEN));
        manager.pop_to_root_scene();
        assert_eq!(names(&manager), vec!["a"]);

        manager.update(1.0);
        assert_eq!(names(&manager), vec!["a", "b"]);
    }

    #[test]
    fn test_second_transition_keeps_first_pair() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        let a = scene("a", &log, Color::RED);
        let b = scene("b", &log, Color::BLUE);
        manager.run_with_scene(Rc::clone(&a));
        manager.push_scene(Rc::clone(&b));
        manager.register_scene("menu", scene("menu", &log, Color::WHITE));
        let c = scene("c", &log, Color::GREEN);
        manager.replace_scene_with(Rc::clone(&c), TransitionType::Fade, 1.0);
        manager.update(0.25);

        manager.replace_scene_with(scene("d", &log, Color::GREEN), TransitionType::Scale, 0.5);
        manager.push_scene_with(scene("e", &log, Color::GREEN), TransitionType::Flip(crate::scene::FlipAxis::Vertical), 0.5);
        manager.pop_scene_with(TransitionType::Slide(crate::scene::SlideDirection::Up), 0.5);
        manager.pop_to_root_scene_with(TransitionType::Fade, 0.5);
        manager.pop_to_scene_with("menu", TransitionType::Box { divisions: 2 }, 0.5);
        manager.enter_scene_with(scene("f", &log, Color::GREEN), TransitionType::Fade, 0.5);

        let (outgoing, incoming) = manager.transition_scenes().unwrap();
        assert!(Rc::ptr_eq(&outgoing.unwrap(), &b));
        assert!(Rc::ptr_eq(&incoming, &c));

        manager.update(0.75);
        assert!(!manager.is_transitioning());
        assert_eq!(names(&manager), vec!["a", "c"]);
    }

    #[test]
    fn test_transition_callback_sees_committed_stack() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        manager.run_with_scene(scene("a", &log, Color::RED));
        let b = scene("b", &log, Color::BLUE);
        manager.push_scene_with(Rc::clone(&b), TransitionType::Fade, 0.5);

        // Registered mid-transition: attaches to the running one.
        let observed = Rc::new(Cell::new(None));
        let seen = Rc::clone(&observed);
        let incoming = Rc::clone(&b);
        manager.set_transition_callback(move || seen.set(Some(incoming.borrow().state())));

        manager.update(0.25);
        assert_eq!(observed.get(), None);
        manager.update(0.25);
        assert_eq!(observed.get(), Some(SceneState::Running));

        observed.set(None);
        manager.pop_scene_with(TransitionType::Fade, 0.1);
        manager.update(0.1);
        assert_eq!(observed.get(), None);
    }

    #[test]
    fn test_transition_renders_exactly_two_scenes() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        let a = scene("a", &log, Color::RED);
        let b = scene("b", &log, Color::BLUE);
        manager.run_with_scene(Rc::clone(&a));
        manager.replace_scene_with(Rc::clone(&b), TransitionType::Fade, 1.0);
        manager.update(0.5);

        let (outgoing, incoming) = manager.transition_scenes().unwrap();
        assert!(Rc::ptr_eq(&outgoing.unwrap(), &a));
        assert!(Rc::ptr_eq(&incoming, &b));

        let mut out = Vec::new();
        manager.collect_render_commands(&mut out);
        let view_projections = out.iter().filter(|c| matches!(c, RenderCommand::ViewProjection(_))).count();
        assert_eq!(view_projections, 2);

        let backend = RecordingBackend::new();
        let handle = backend.handle();
        let mut backend = backend;
        manager.render(&mut backend);
        assert_eq!(handle.snapshot().iter().filter(|call| call.label() == "fill_rect").count(), 2);
    }

    #[test]
    fn test_push_then_pop_pauses_and_resumes() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        let a = scene("a", &log, Color::RED);
        manager.run_with_scene(Rc::clone(&a));
        taken(&log);

        manager.push_scene(scene("c", &log, Color::GREEN));
        assert_eq!(names(&manager), vec!["a", "c"]);
        assert_eq!(taken(&log), vec!["a:pause", "c:enter"]);
        assert_eq!(a.borrow().state(), SceneState::Paused);

        manager.pop_scene_with(TransitionType::Slide(crate::scene::SlideDirection::Right), 0.2);
        assert_eq!(names(&manager), vec!["a", "c"]);
        manager.update(0.1);
        manager.update(0.1);
        assert_eq!(names(&manager), vec!["a"]);
        assert_eq!(taken(&log), vec!["c:exit", "a:resume"]);
        assert!(a.borrow().is_running());
    }

    #[test]
    fn test_pop_to_scene_unwinds_top_first() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        manager.run_with_scene(scene("a", &log, Color::RED));
        manager.push_scene(scene("b", &log, Color::BLUE));
        manager.push_scene(scene("c", &log, Color::GREEN));
        manager.push_scene(scene("d", &log, Color::WHITE));
        taken(&log);

        manager.pop_to_scene("b");
        assert_eq!(names(&manager), vec!["a", "b"]);
        assert_eq!(taken(&log), vec!["d:exit", "c:exit", "b:resume"]);

        manager.push_scene(scene("e", &log, Color::WHITE));
        taken(&log);
        manager.pop_to_root_scene_with(TransitionType::Flip(crate::scene::FlipAxis::Horizontal), 0.0);
        manager.update(0.0);
        assert_eq!(names(&manager), vec!["a"]);
        assert_eq!(taken(&log), vec!["e:exit", "b:exit", "a:resume"]);
    }

    #[test]
    fn test_pop_to_registered_scene_replaces_top() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        manager.run_with_scene(scene("a", &log, Color::RED));
        manager.register_scene("menu", scene("menu", &log, Color::BLUE));
        assert!(manager.has_scene("menu"));
        taken(&log);

        manager.pop_to_scene_with("menu", TransitionType::Box { divisions: 4 }, 0.5);
        manager.update(0.5);
        assert_eq!(names(&manager), vec!["menu"]);
        assert_eq!(taken(&log), vec!["a:exit", "menu:enter"]);

        manager.pop_to_scene_with("menu", TransitionType::Fade, 0.5);
        assert!(!manager.is_transitioning());
    }

    #[test]
    fn test_zero_duration_never_renders_mid_transition() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        manager.run_with_scene(scene("a", &log, Color::RED));
        manager.replace_scene_with(scene("b", &log, Color::BLUE), TransitionType::Fade, 0.0);

        let mut out = Vec::new();
        manager.collect_render_commands(&mut out);
        let fills: Vec<_> = out
            .iter()
            .filter_map(|c| match c {
                RenderCommand::FillRect { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(fills, vec![Color::RED]);

        manager.update(0.0);
        assert_eq!(names(&manager), vec!["b"]);
    }

    #[test]
    fn test_end_exits_all_and_clears_registry() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        manager.run_with_scene(scene("a", &log, Color::RED));
        manager.push_scene(scene("b", &log, Color::BLUE));
        manager.register_scene("cached", scene("cached", &log, Color::GREEN));
        taken(&log);

        manager.end();
        assert_eq!(manager.stack_len(), 0);
        assert!(!manager.has_scene("cached"));
        assert_eq!(taken(&log), vec!["b:exit", "a:exit"]);
    }

    #[test]
    fn test_viewport_applies_to_managed_scenes() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        manager.set_viewport_size(1024.0, 768.0);
        let a = scene("a", &log, Color::RED);
        manager.run_with_scene(Rc::clone(&a));
        assert_eq!(a.borrow().viewport_size(), Size::new(1024.0, 768.0));
    }
}
