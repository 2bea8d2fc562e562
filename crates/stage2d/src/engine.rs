//! Core engine implementation
//!
//! [`Engine`] is the one explicit context: window, backend, scenes,
//! resources, timers, input and the optional render thread all live here and
//! are torn down in a fixed order by [`Engine::shutdown`].
//!
//! ## Frame
//!
//! ```text
//! timer ─▶ poll events ─▶ timers ─▶ fixed steps ─▶ app update ─▶ scenes
//!                                                                  │
//!        ┌─────────────────────── render ◀─────────────────────────┘
//!        ├─ multi-threaded: fill write slot ─▶ submit copy ─▶ swap slots
//!        └─ single-threaded: execute inline ─▶ swap window buffers
//! ```

use thiserror::Error;

use crate::application::Application;
use crate::assets::ResourceManager;
use crate::config::ConfigError;
use crate::core::AppConfig;
use crate::events::{Event, EventDispatcher};
use crate::foundation::time::{FpsCounter, Timer, TimerManager};
use crate::input::InputManager;
use crate::render::{execute_frame, Camera, RenderBackend, RenderError, Viewport, Window, WindowError, WindowEvent};
use crate::scene::{SceneManager, SceneRef, TransitionType};
use crate::threading::{FrameData, FrameDataBuffer, RenderThread, StartError};

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Engine could not be set up
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// Window error
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    /// Render pipeline error
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// An application hook failed
    #[error("Application error: {0}")]
    ApplicationError(String),
}

/// Where frames are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Inline on the main thread
    SingleThreaded,
    /// On the dedicated render thread
    MultiThreaded,
}

/// Main engine struct
///
/// The engine coordinates all subsystems and manages the main loop.
pub struct Engine {
    config: AppConfig,
    /// Scene stack and transitions
    pub scenes: SceneManager,
    /// Texture and font cache
    pub resources: ResourceManager,
    /// Scheduled callbacks
    pub timers: TimerManager,
    /// Keyboard and mouse state
    pub input: InputManager,
    /// Engine-wide listeners (not tied to a scene)
    pub events: EventDispatcher,
    /// Camera used when no scene is active
    pub camera: Camera,
    render_thread: Option<RenderThread>,
    backend: Option<Box<dyn RenderBackend>>,
    frames: FrameDataBuffer,
    timer: Timer,
    fps: FpsCounter,
    fixed_accumulator: f32,
    frame_number: u64,
    running: bool,
    paused: bool,
    shut_down: bool,
    window: Box<dyn Window>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("mode", &self.render_mode())
            .field("frame_number", &self.frame_number)
            .field("running", &self.running)
            .field("paused", &self.paused)
            .field("scenes", &self.scenes)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create a new engine instance
    ///
    /// With `render.multi_threaded` set, the render thread is started here. If
    /// that fails the engine logs a warning and renders inline instead.
    pub fn new(
        config: AppConfig,
        mut window: Box<dyn Window>,
        backend: Box<dyn RenderBackend>,
    ) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");
        config.validate()?;
        window.set_vsync(config.render.vsync);

        let (render_thread, backend) = if config.render.multi_threaded {
            let mut thread = RenderThread::new();
            match thread.start(window.as_mut(), backend) {
                Ok(()) => (Some(thread), None),
                Err(StartError {
                    error,
                    backend: Some(backend),
                }) => {
                    log::warn!("{error}, falling back to single-threaded rendering");
                    (None, Some(backend))
                }
                Err(StartError { error, backend: None }) => return Err(EngineError::Render(error)),
            }
        } else {
            (None, Some(backend))
        };

        let (width, height) = (config.window.width as f32, config.window.height as f32);
        let mut scenes = SceneManager::new();
        scenes.set_viewport_size(width, height);

        let engine = Self {
            scenes,
            resources: ResourceManager::new(config.engine.asset_paths.iter()),
            timers: TimerManager::new(),
            input: InputManager::new(),
            events: EventDispatcher::new(),
            camera: Camera::for_viewport(width, height),
            render_thread,
            backend,
            frames: FrameDataBuffer::new(),
            timer: Timer::new(),
            fps: FpsCounter::default(),
            fixed_accumulator: 0.0,
            frame_number: 0,
            running: true,
            paused: false,
            shut_down: false,
            window,
            config,
        };
        log::info!("Engine initialized ({:?})", engine.render_mode());
        Ok(engine)
    }

    /// Run the main loop until [`Engine::quit`] or the window closes, then
    /// clean up the application and shut down
    pub fn run<A: Application + ?Sized>(&mut self, app: &mut A) -> Result<(), EngineError> {
        app.initialize(self)
            .map_err(|e| EngineError::ApplicationError(format!("App initialization: {e}")))?;

        log::info!("Starting main loop...");
        self.timer.reset_delta();
        let result = self.run_loop(app);

        app.cleanup(self);
        self.shutdown();
        log::info!("Engine shutdown complete");
        result
    }

    fn run_loop<A: Application + ?Sized>(&mut self, app: &mut A) -> Result<(), EngineError> {
        while self.running && !self.window.should_close() {
            self.step(app)?;
        }
        Ok(())
    }

    /// Run exactly one frame
    pub fn step<A: Application + ?Sized>(&mut self, app: &mut A) -> Result<(), EngineError> {
        self.timer.update();
        let dt = self.timer.delta_time().min(self.config.engine.max_frame_delta);
        self.fps.tick(dt);

        self.input.update();
        for event in self.window.poll_events() {
            app.handle_event(self, &event)
                .map_err(|e| EngineError::ApplicationError(format!("App event: {e}")))?;
        }
        if self.window.should_close() {
            self.running = false;
        }

        if !self.paused {
            self.timers.update(dt);
            self.events.update_time(f64::from(self.timer.total_time()));
            self.events.dispatch_pending();

            if let Some(step) = self.config.engine.fixed_timestep {
                self.fixed_accumulator += dt;
                while self.fixed_accumulator >= step {
                    app.fixed_update(self, step)
                        .map_err(|e| EngineError::ApplicationError(format!("App fixed update: {e}")))?;
                    self.fixed_accumulator -= step;
                }
            }
            app.update(self, dt)
                .map_err(|e| EngineError::ApplicationError(format!("App update: {e}")))?;
            self.scenes.update(dt);
        }

        self.render();
        self.pace();
        Ok(())
    }

    /// Feed a window event to input, engine listeners and the active scene
    pub fn handle_event(&mut self, event: &WindowEvent) {
        self.input.handle_event(event);
        match *event {
            WindowEvent::Close => self.quit(),
            WindowEvent::Resized { width, height } if width == 0 || height == 0 => {
                log::debug!("Window minimized, keeping the current viewport");
            }
            WindowEvent::Resized { width, height } => {
                log::debug!("Window resized to {width}x{height}");
                let (width, height) = (width as f32, height as f32);
                self.scenes.set_viewport_size(width, height);
                self.camera.set_viewport(0.0, width, height, 0.0);
            }
            _ => {}
        }
        let timestamp = f64::from(self.timer.total_time());
        if let Some(translated) = Event::from_window_event(event, timestamp, self.input.mouse_position()) {
            self.events.dispatch(&translated);
        }
        self.scenes.handle_window_event(event);
    }

    fn render(&mut self) {
        self.frame_number += 1;

        if let Some(thread) = self.render_thread.as_mut() {
            if thread.is_running() {
                {
                    let mut frame = self.frames.write_buffer();
                    populate_frame(
                        &mut frame,
                        &self.scenes,
                        &self.camera,
                        &self.config,
                        self.window.size(),
                        self.frame_number,
                    );
                    thread.submit_frame(&frame);
                }
                self.frames.swap();
                return;
            }
            log::warn!("Render thread exited unexpectedly, falling back to single-threaded rendering");
            self.backend = thread.stop();
            self.render_thread = None;
        }

        let Some(backend) = self.backend.as_mut() else {
            log::trace!("No backend, skipping frame {}", self.frame_number);
            return;
        };
        {
            let mut frame = self.frames.write_buffer();
            populate_frame(
                &mut frame,
                &self.scenes,
                &self.camera,
                &self.config,
                self.window.size(),
                self.frame_number,
            );
            execute_frame(&frame, backend.as_mut());
        }
        self.frames.swap();
        self.window.swap_buffers();
    }

    fn pace(&self) {
        let Some(budget) = self.config.frame_budget() else {
            return;
        };
        let elapsed = self.timer.peek_elapsed();
        if elapsed < budget {
            std::thread::sleep(budget - elapsed);
        }
    }

    /// Block until the render thread has executed the last submitted frame
    /// (no-op in single-threaded mode)
    pub fn wait_for_frame_complete(&self) {
        if let Some(thread) = &self.render_thread {
            thread.wait_for_frame_complete();
        }
    }

    /// Enter the first scene or replace the current one. The scene takes the
    /// window viewport: the configured size until the first resize.
    pub fn enter_scene(&mut self, scene: SceneRef) {
        self.scenes.enter_scene(scene);
    }

    /// Like [`Engine::enter_scene`], replacing through a transition
    pub fn enter_scene_with(&mut self, scene: SceneRef, kind: TransitionType, duration: f32) {
        self.scenes.enter_scene_with(scene, kind, duration);
    }

    /// Stop updating (rendering continues)
    pub fn pause(&mut self) {
        if !self.paused {
            log::info!("Engine paused");
            self.paused = true;
        }
    }

    /// Resume updating; the paused time is not fed to the next update
    pub fn resume(&mut self) {
        if self.paused {
            log::info!("Engine resumed");
            self.paused = false;
            self.timer.reset_delta();
        }
    }

    /// Whether updates are paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Request the main loop to end after the current frame
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the loop should keep going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Tear down in order: render thread (join, then context), scenes,
    /// resources. The window goes with the engine.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.running = false;
        log::info!("Shutting down engine...");

        if let Some(mut thread) = self.render_thread.take() {
            if let Some(backend) = thread.stop() {
                self.backend = Some(backend);
            }
        }
        self.scenes.end();
        self.timers = TimerManager::new();
        self.resources.clear();
    }

    /// Current render mode
    pub fn render_mode(&self) -> RenderMode {
        if self.render_thread.is_some() {
            RenderMode::MultiThreaded
        } else {
            RenderMode::SingleThreaded
        }
    }

    /// Render thread, when running multi-threaded
    pub fn render_thread(&self) -> Option<&RenderThread> {
        self.render_thread.as_ref()
    }

    /// Number of frames produced so far
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Frames per second over the last full second
    pub fn fps(&self) -> u32 {
        self.fps.fps()
    }

    /// Frame delta of the last step, clamped
    pub fn delta_time(&self) -> f32 {
        self.timer.delta_time().min(self.config.engine.max_frame_delta)
    }

    /// Configuration the engine was built with
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Window
    pub fn window(&self) -> &dyn Window {
        self.window.as_ref()
    }

    /// Mutable window
    pub fn window_mut(&mut self) -> &mut dyn Window {
        self.window.as_mut()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Fill `frame` for the current state: the top scene's clear color and
/// camera (engine camera and configured clear color without a scene), the
/// window viewport and the scene commands
fn populate_frame(
    frame: &mut FrameData,
    scenes: &SceneManager,
    camera: &Camera,
    config: &AppConfig,
    window_size: (u32, u32),
    frame_number: u64,
) {
    frame.clear();
    frame.frame_number = frame_number;
    frame.viewport = Viewport::with_size(window_size.0, window_size.1);
    match scenes.current_scene() {
        Some(scene) => {
            let scene = scene.borrow();
            frame.clear_color = scene.background_color();
            frame.view_projection = scene.camera().view_projection();
        }
        None => {
            frame.clear_color = config.render.clear_color;
            frame.view_projection = camera.view_projection();
        }
    }
    scenes.collect_render_commands(&mut frame.render_commands);
    log::trace!("Frame {frame_number}: {} command(s)", frame.command_count());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::AppError;
    use crate::foundation::math::{Color, Rect, Size};
    use crate::render::{DrawCall, HeadlessWindow, RecordingBackend, RecordingHandle};
    use crate::scene::{Node, Scene};
    use std::rc::Rc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    #[derive(Default)]
    struct CountingApp {
        initialized: bool,
        updates: u32,
        fixed_updates: u32,
        cleaned_up: bool,
        quit_after: Option<u32>,
    }

    impl Application for CountingApp {
        fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
            self.initialized = true;
            let mut scene = Scene::new("main").with_background(Color::BLUE);
            scene.add_node(Node::rect(10.0, 10.0, Color::RED).at(20.0, 20.0));
            engine.enter_scene(scene.into_ref());
            Ok(())
        }

        fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
            self.updates += 1;
            if self.quit_after == Some(self.updates) {
                engine.quit();
            }
            Ok(())
        }

        fn fixed_update(&mut self, _engine: &mut Engine, _step: f32) -> Result<(), AppError> {
            self.fixed_updates += 1;
            Ok(())
        }

        fn cleanup(&mut self, _engine: &mut Engine) {
            self.cleaned_up = true;
        }
    }

    fn recording() -> (Box<dyn RenderBackend>, RecordingHandle) {
        let backend = RecordingBackend::new();
        let handle = backend.handle();
        (Box::new(backend), handle)
    }

    fn config() -> AppConfig {
        AppConfig::new("test").with_size(320, 240).with_vsync(true)
    }

    #[test]
    fn test_single_threaded_run_renders_inline() {
        let window = HeadlessWindow::new(320, 240).close_after(3);
        let stats = window.stats();
        let (backend, handle) = recording();
        let mut engine = Engine::new(config(), Box::new(window), backend).unwrap();
        assert_eq!(engine.render_mode(), RenderMode::SingleThreaded);

        let mut app = CountingApp::default();
        engine.run(&mut app).unwrap();

        assert!(app.initialized && app.cleaned_up);
        assert_eq!(app.updates, 3);
        assert_eq!(engine.frame_number(), 3);
        assert_eq!(stats.window_swaps.load(Ordering::Relaxed), 3);
        assert_eq!(handle.clear_colors(), vec![Color::BLUE; 3]);
        assert!(handle.snapshot().iter().any(|call| matches!(call, DrawCall::FillRect(_, color) if *color == Color::RED)));
        assert_eq!(engine.scenes.stack_len(), 0);
    }

    #[test]
    fn test_multi_threaded_frames_reach_worker() {
        let window = HeadlessWindow::new(320, 240);
        let stats = window.stats();
        let (backend, handle) = recording();
        let mut engine = Engine::new(config().with_multi_threaded(true), Box::new(window), backend).unwrap();
        assert_eq!(engine.render_mode(), RenderMode::MultiThreaded);

        let mut app = CountingApp::default();
        app.initialize(&mut engine).unwrap();
        for _ in 0..3 {
            engine.step(&mut app).unwrap();
            engine.wait_for_frame_complete();
        }
        assert_eq!(engine.render_thread().unwrap().last_frame_number(), 3);
        assert_eq!(handle.clear_colors(), vec![Color::BLUE; 3]);
        // Main window is never swapped in this mode.
        assert_eq!(stats.window_swaps.load(Ordering::Relaxed), 0);

        engine.shutdown();
        assert!(engine.render_thread().is_none());
        assert!(stats.surface_destroyed.load(Ordering::Acquire));
        assert_eq!(stats.use_after_destroy.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_context_failure_falls_back_to_single_threaded() {
        let window = HeadlessWindow::new(320, 240).failing_shared_context();
        let (backend, handle) = recording();
        let mut engine = Engine::new(config().with_multi_threaded(true), Box::new(window), backend).unwrap();
        assert_eq!(engine.render_mode(), RenderMode::SingleThreaded);

        let mut app = CountingApp::default();
        engine.step(&mut app).unwrap();
        assert_eq!(handle.frames(), 1);
    }

    #[test]
    fn test_worker_binding_failure_falls_back() {
        let window = HeadlessWindow::new(320, 240).failing_bindings();
        let (backend, handle) = recording();
        let mut engine = Engine::new(config().with_multi_threaded(true), Box::new(window), backend).unwrap();
        let mut app = CountingApp::default();

        for _ in 0..200 {
            engine.step(&mut app).unwrap();
            if engine.render_mode() == RenderMode::SingleThreaded {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(engine.render_mode(), RenderMode::SingleThreaded);
        engine.step(&mut app).unwrap();
        assert!(handle.frames() >= 1);
    }

    #[test]
    fn test_pause_skips_updates_but_renders() {
        let window = HeadlessWindow::new(320, 240);
        let (backend, handle) = recording();
        let mut engine = Engine::new(config(), Box::new(window), backend).unwrap();
        let mut app = CountingApp::default();

        engine.pause();
        engine.step(&mut app).unwrap();
        assert_eq!(app.updates, 0);
        assert_eq!(handle.frames(), 1);

        engine.resume();
        engine.step(&mut app).unwrap();
        assert_eq!(app.updates, 1);
    }

    #[test]
    fn test_quit_and_close_event_end_loop() {
        let window = HeadlessWindow::new(320, 240);
        let (backend, _handle) = recording();
        let mut engine = Engine::new(config(), Box::new(window), backend).unwrap();
        let mut app = CountingApp {
            quit_after: Some(2),
            ..CountingApp::default()
        };
        engine.run(&mut app).unwrap();
        assert_eq!(app.updates, 2);

        let window = HeadlessWindow::new(320, 240).with_events([vec![], vec![WindowEvent::Close]]);
        let (backend, _handle) = recording();
        let mut engine = Engine::new(config(), Box::new(window), backend).unwrap();
        let mut app = CountingApp::default();
        engine.run(&mut app).unwrap();
        // The frame that sees the close still completes.
        assert_eq!(app.updates, 2);
    }

    #[test]
    fn test_fixed_timestep_runs_whole_steps() {
        let window = HeadlessWindow::new(320, 240);
        let (backend, _handle) = recording();
        let config = config().with_fixed_timestep(0.001);
        let mut engine = Engine::new(config, Box::new(window), backend).unwrap();
        let mut app = CountingApp::default();

        std::thread::sleep(Duration::from_millis(20));
        engine.step(&mut app).unwrap();
        assert!(app.fixed_updates >= 10);
    }

    #[test]
    fn test_minimized_window_keeps_last_viewport() {
        let window = HeadlessWindow::new(320, 240).with_events([
            vec![WindowEvent::Resized { width: 0, height: 0 }],
            vec![],
            vec![WindowEvent::Resized { width: 640, height: 480 }],
        ]);
        let (backend, handle) = recording();
        let mut engine = Engine::new(config(), Box::new(window), backend).unwrap();
        let mut app = CountingApp::default();
        app.initialize(&mut engine).unwrap();

        engine.step(&mut app).unwrap();
        engine.step(&mut app).unwrap();
        assert_eq!(handle.frames(), 2);
        let scene = engine.scenes.current_scene().unwrap();
        assert_eq!(scene.borrow().viewport_size(), Size::new(320.0, 240.0));
        assert_eq!(engine.camera.viewport(), Rect::new(0.0, 0.0, 320.0, 240.0));

        engine.step(&mut app).unwrap();
        assert_eq!(scene.borrow().viewport_size(), Size::new(640.0, 480.0));

        // Scenes entered later pick up the resized viewport.
        let late = Scene::new("late").into_ref();
        engine.enter_scene(Rc::clone(&late));
        assert_eq!(late.borrow().viewport_size(), Size::new(640.0, 480.0));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let window = HeadlessWindow::new(320, 240);
        let (backend, _handle) = recording();
        let result = Engine::new(config().with_size(0, 240), Box::new(window), backend);
        assert!(matches!(result, Err(EngineError::Config(_))));
    }
}
