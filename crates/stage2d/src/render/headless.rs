//! Headless window and context
//!
//! Display-less stand-ins for [`Window`] and [`GraphicsContext`]. They keep the
//! same threading contract as a real window (the shared context is created on
//! the caller's thread, its surface is destroyed after the worker joins) and
//! expose counters and failure switches so the engine loop can run in CI.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use super::window::{GraphicsContext, SharedContext, Window, WindowError, WindowEvent, WindowResult};
use super::RenderError;

/// Counters shared between a [`HeadlessWindow`] and the contexts it creates
#[derive(Debug, Default)]
pub struct HeadlessStats {
    /// Buffer swaps on the window's own context
    pub window_swaps: AtomicU64,
    /// Buffer swaps on shared contexts
    pub context_swaps: AtomicU64,
    /// Event polls
    pub polls: AtomicU64,
    /// Set once the shared-context surface has been destroyed
    pub surface_destroyed: AtomicBool,
    /// Context calls made after its surface was destroyed
    pub use_after_destroy: AtomicU64,
}

/// Window without a display
#[derive(Debug)]
pub struct HeadlessWindow {
    width: u32,
    height: u32,
    should_close: bool,
    vsync: bool,
    close_after: Option<u64>,
    scripted: VecDeque<Vec<WindowEvent>>,
    fail_shared_context: bool,
    fail_bindings: bool,
    stats: Arc<HeadlessStats>,
}

impl HeadlessWindow {
    /// Create a headless window of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            should_close: false,
            vsync: false,
            close_after: None,
            scripted: VecDeque::new(),
            fail_shared_context: false,
            fail_bindings: false,
            stats: Arc::new(HeadlessStats::default()),
        }
    }

    /// Request close after `polls` event polls
    #[must_use]
    pub fn close_after(mut self, polls: u64) -> Self {
        self.close_after = Some(polls);
        self
    }

    /// Queue events returned by successive polls, one batch per poll
    #[must_use]
    pub fn with_events(mut self, batches: impl IntoIterator<Item = Vec<WindowEvent>>) -> Self {
        self.scripted.extend(batches);
        self
    }

    /// Make [`Window::create_shared_context`] fail
    #[must_use]
    pub fn failing_shared_context(mut self) -> Self {
        self.fail_shared_context = true;
        self
    }

    /// Create shared contexts whose bindings fail to load
    #[must_use]
    pub fn failing_bindings(mut self) -> Self {
        self.fail_bindings = true;
        self
    }

    /// Queue a batch of events for the next poll
    pub fn push_events(&mut self, events: Vec<WindowEvent>) {
        self.scripted.push_back(events);
    }

    /// Shared counters, usable after the window moved into an engine
    pub fn stats(&self) -> Arc<HeadlessStats> {
        Arc::clone(&self.stats)
    }

    /// Whether vsync is enabled
    pub fn vsync(&self) -> bool {
        self.vsync
    }
}

impl Window for HeadlessWindow {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn should_close(&self) -> bool {
        self.should_close
    }

    fn set_should_close(&mut self, should_close: bool) {
        self.should_close = should_close;
    }

    fn poll_events(&mut self) -> Vec<WindowEvent> {
        let polls = self.stats.polls.fetch_add(1, Ordering::Relaxed) + 1;
        let events = self.scripted.pop_front().unwrap_or_default();

        for event in &events {
            match *event {
                WindowEvent::Close => self.should_close = true,
                WindowEvent::Resized { width, height } => {
                    self.width = width;
                    self.height = height;
                }
                _ => {}
            }
        }
        if self.close_after.is_some_and(|limit| polls >= limit) {
            self.should_close = true;
        }
        events
    }

    fn swap_buffers(&mut self) {
        self.stats.window_swaps.fetch_add(1, Ordering::Relaxed);
    }

    fn set_vsync(&mut self, enabled: bool) {
        self.vsync = enabled;
    }

    fn create_shared_context(&mut self) -> WindowResult<SharedContext> {
        if self.fail_shared_context {
            return Err(WindowError::SharedContextFailed("headless window configured to fail".to_string()));
        }
        self.stats.surface_destroyed.store(false, Ordering::Release);

        Ok(SharedContext {
            context: Box::new(HeadlessContext {
                current: false,
                fail_bindings: self.fail_bindings,
                stats: Arc::clone(&self.stats),
            }),
            surface: Box::new(HeadlessSurface {
                stats: Arc::clone(&self.stats),
            }),
        })
    }
}

/// Context created by [`HeadlessWindow::create_shared_context`]
#[derive(Debug)]
pub struct HeadlessContext {
    current: bool,
    fail_bindings: bool,
    stats: Arc<HeadlessStats>,
}

impl HeadlessContext {
    fn check_surface(&self) {
        if self.stats.surface_destroyed.load(Ordering::Acquire) {
            log::error!("Headless context used after its surface was destroyed");
            self.stats.use_after_destroy.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl GraphicsContext for HeadlessContext {
    fn make_current(&mut self) {
        self.check_surface();
        self.current = true;
    }

    fn load_bindings(&mut self) -> Result<(), RenderError> {
        if !self.current {
            return Err(RenderError::BindingsUnavailable("no context is current".to_string()));
        }
        if self.fail_bindings {
            return Err(RenderError::BindingsUnavailable("headless context configured to fail".to_string()));
        }
        Ok(())
    }

    fn swap_buffers(&mut self) {
        self.check_surface();
        self.stats.context_swaps.fetch_add(1, Ordering::Relaxed);
    }

    fn release_current(&mut self) {
        self.check_surface();
        self.current = false;
    }
}

#[derive(Debug)]
struct HeadlessSurface {
    stats: Arc<HeadlessStats>,
}

impl Drop for HeadlessSurface {
    fn drop(&mut self) {
        self.stats.surface_destroyed.store(true, Ordering::Release);
    }
}
