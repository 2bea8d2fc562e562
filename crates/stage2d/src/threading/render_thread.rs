//! # Render Thread
//!
//! Executes [`FrameData`] snapshots on a dedicated OS thread that owns a
//! shared graphics context. The producer and the worker meet at a single
//! pending-frame slot guarded by a mutex and two condition variables; no scene
//! object ever crosses over.
//!
//! ## Lifecycle
//!
//! 1. [`RenderThread::start`] creates the shared context on the caller's thread,
//!    then spawns the worker, which makes it current and loads bindings.
//! 2. [`RenderThread::submit_frame`] copies a frame into the slot. A frame the
//!    worker has not picked up yet is overwritten (latest frame wins).
//! 3. [`RenderThread::stop`] clears `running`, wakes the worker, joins it, and
//!    only then destroys the context's surface.
//!
//! A binding failure inside the worker ends the thread and flips
//! [`RenderThread::is_running`] to `false`; the owner polls for that.

use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use thiserror::Error;

use super::FrameData;
use crate::render::{execute_frame, GraphicsContext, RenderBackend, RenderError, Window};

/// Failed [`RenderThread::start`]; hands the backend back for inline rendering
#[derive(Error)]
#[error("render thread failed to start: {error}")]
pub struct StartError {
    /// Why the thread did not start
    #[source]
    pub error: RenderError,
    /// The backend passed to `start`, if it could be recovered
    pub backend: Option<Box<dyn RenderBackend>>,
}

impl std::fmt::Debug for StartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartError")
            .field("error", &self.error)
            .field("backend", &self.backend.as_ref().map(|backend| backend.name().to_string()))
            .finish()
    }
}

#[derive(Default)]
struct FrameSlot {
    pending: Option<FrameData>,
    frame_ready: bool,
    frame_complete: bool,
}

struct RenderShared {
    slot: Mutex<FrameSlot>,
    frame_ready: Condvar,
    frame_complete: Condvar,
    running: AtomicBool,
    backend: Mutex<Option<Box<dyn RenderBackend>>>,
    frames_executed: AtomicU64,
    frames_dropped: AtomicU64,
    last_frame_number: AtomicU64,
}

impl RenderShared {
    fn new() -> Self {
        Self {
            slot: Mutex::new(FrameSlot {
                frame_complete: true,
                ..FrameSlot::default()
            }),
            frame_ready: Condvar::new(),
            frame_complete: Condvar::new(),
            running: AtomicBool::new(false),
            backend: Mutex::new(None),
            frames_executed: AtomicU64::new(0),
            frames_dropped: AtomicU64::new(0),
            last_frame_number: AtomicU64::new(0),
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, FrameSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_backend(&self) -> MutexGuard<'_, Option<Box<dyn RenderBackend>>> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Clear `running` under the slot lock so no waiter misses the wakeup
    fn shut_down(&self) {
        {
            let _slot = self.lock_slot();
            self.running.store(false, Ordering::Release);
        }
        self.frame_ready.notify_all();
        self.frame_complete.notify_all();
    }
}

/// Dedicated render thread
pub struct RenderThread {
    shared: Arc<RenderShared>,
    worker: Option<JoinHandle<()>>,
    surface: Option<Box<dyn Any>>,
}

impl std::fmt::Debug for RenderThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderThread")
            .field("running", &self.is_running())
            .field("frames_executed", &self.frames_executed())
            .finish_non_exhaustive()
    }
}

impl Default for RenderThread {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderThread {
    /// Create a stopped render thread
    pub fn new() -> Self {
        Self {
            shared: Arc::new(RenderShared::new()),
            worker: None,
            surface: None,
        }
    }

    /// Create the shared context and spawn the worker.
    ///
    /// Returns once the context exists and the thread is spawned. Binding
    /// failures happen later on the worker and show up through
    /// [`RenderThread::is_running`].
    pub fn start(&mut self, window: &mut dyn Window, backend: Box<dyn RenderBackend>) -> Result<(), StartError> {
        if self.worker.is_some() {
            log::warn!("RenderThread: already started, ignoring backend '{}'", backend.name());
            return Ok(());
        }

        let shared_context = match window.create_shared_context() {
            Ok(shared_context) => shared_context,
            Err(e) => {
                log::error!("RenderThread: failed to create shared context: {e}");
                return Err(StartError {
                    error: e.into(),
                    backend: Some(backend),
                });
            }
        };

        let backend_name = backend.name().to_string();
        *self.shared.lock_backend() = Some(backend);
        {
            let mut slot = self.shared.lock_slot();
            slot.pending = None;
            slot.frame_ready = false;
            slot.frame_complete = true;
        }
        self.shared.running.store(true, Ordering::Release);

        let shared = Arc::clone(&self.shared);
        let context = shared_context.context;
        let spawned = std::thread::Builder::new()
            .name("render".to_string())
            .spawn(move || render_loop(&shared, context));

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                self.surface = Some(shared_context.surface);
                log::info!("RenderThread: started with backend '{backend_name}'");
                Ok(())
            }
            Err(e) => {
                self.shared.running.store(false, Ordering::Release);
                log::error!("RenderThread: failed to spawn worker: {e}");
                Err(StartError {
                    error: RenderError::ThreadSpawn(e),
                    backend: self.shared.lock_backend().take(),
                })
            }
        }
    }

    /// Hand a frame to the worker without waiting for it to execute
    pub fn submit_frame(&self, frame: &FrameData) {
        if !self.shared.is_running() {
            log::debug!("RenderThread: not running, dropping frame {}", frame.frame_number);
            return;
        }
        {
            let mut slot = self.shared.lock_slot();
            match slot.pending.as_mut() {
                Some(pending) => {
                    self.shared.frames_dropped.fetch_add(1, Ordering::Relaxed);
                    log::trace!("RenderThread: frame {} replaced by {}", pending.frame_number, frame.frame_number);
                    pending.clone_from(frame);
                }
                None => slot.pending = Some(frame.clone()),
            }
            slot.frame_ready = true;
            slot.frame_complete = false;
        }
        self.shared.frame_ready.notify_one();
    }

    /// Block until the last submitted frame has executed or the thread stopped
    pub fn wait_for_frame_complete(&self) {
        let slot = self.shared.lock_slot();
        let _slot = self
            .shared
            .frame_complete
            .wait_while(slot, |slot| !slot.frame_complete && self.shared.is_running())
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Whether the worker is alive and accepting frames
    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// Whether [`RenderThread::start`] succeeded and [`RenderThread::stop`] has not run yet
    pub fn is_started(&self) -> bool {
        self.worker.is_some()
    }

    /// Frames executed by the worker
    pub fn frames_executed(&self) -> u64 {
        self.shared.frames_executed.load(Ordering::Acquire)
    }

    /// Frames overwritten before the worker picked them up
    pub fn frames_dropped(&self) -> u64 {
        self.shared.frames_dropped.load(Ordering::Relaxed)
    }

    /// Frame number of the last executed frame
    pub fn last_frame_number(&self) -> u64 {
        self.shared.last_frame_number.load(Ordering::Acquire)
    }

    /// Stop and join the worker, then destroy the shared context.
    ///
    /// Returns the backend so the caller can keep rendering inline. `None` if
    /// the thread was never started.
    pub fn stop(&mut self) -> Option<Box<dyn RenderBackend>> {
        let worker = self.worker.take()?;

        log::info!("RenderThread: stopping...");
        self.shared.shut_down();
        if worker.join().is_err() {
            log::error!("RenderThread: worker panicked");
        }
        // The worker has exited; the context can go.
        self.surface = None;
        log::info!("RenderThread: stopped after {} frames", self.frames_executed());

        self.shared.lock_backend().take()
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        self.stop();
    }
}

fn render_loop(shared: &RenderShared, mut context: Box<dyn GraphicsContext>) {
    let Some(mut backend) = shared.lock_backend().take() else {
        log::error!("RenderThread: no backend to render with");
        shared.shut_down();
        return;
    };

    context.make_current();
    if let Err(e) = context.load_bindings() {
        log::error!("RenderThread: {e}");
        shared.shut_down();
        *shared.lock_backend() = Some(backend);
        return;
    }
    log::info!("RenderThread: render loop started");

    loop {
        let frame = {
            let slot = shared.lock_slot();
            let mut slot = shared
                .frame_ready
                .wait_while(slot, |slot| !slot.frame_ready && shared.is_running())
                .unwrap_or_else(PoisonError::into_inner);
            if !shared.is_running() {
                break;
            }
            slot.frame_ready = false;
            slot.pending.take()
        };

        let Some(frame) = frame else {
            continue;
        };
        execute_frame(&frame, backend.as_mut());
        context.swap_buffers();
        shared.last_frame_number.store(frame.frame_number, Ordering::Release);
        shared.frames_executed.fetch_add(1, Ordering::AcqRel);

        {
            let mut slot = shared.lock_slot();
            // A submit during execution keeps the frame incomplete.
            if !slot.frame_ready {
                slot.frame_complete = true;
            }
        }
        shared.frame_complete.notify_all();
    }

    context.release_current();
    *shared.lock_backend() = Some(backend);
    log::info!("RenderThread: render loop exited");
}
