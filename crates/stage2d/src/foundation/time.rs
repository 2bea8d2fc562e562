//! Frame clock, stopwatch and scheduled callbacks

use std::time::{Duration, Instant};

/// Frame clock driven by the engine loop
///
/// `update` is called at the top of every frame; everything else reads the
/// values it stored.
#[derive(Debug)]
pub struct Timer {
    last_tick: Instant,
    delta: f32,
    total: f32,
    frames: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Clock starting now
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            delta: 0.0,
            total: 0.0,
            frames: 0,
        }
    }

    /// Advance one frame
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = (now - self.last_tick).as_secs_f32();
        self.total += self.delta;
        self.last_tick = now;
        self.frames += 1;
    }

    /// Forget the time spent since the last update so a pause does not leak
    /// into the next delta
    pub fn reset_delta(&mut self) {
        self.last_tick = Instant::now();
        self.delta = 0.0;
    }

    /// Time since the last update, without advancing
    pub fn peek_elapsed(&self) -> Duration {
        self.last_tick.elapsed()
    }

    /// Seconds between the last two updates
    pub fn delta_time(&self) -> f32 {
        self.delta
    }

    /// Seconds accumulated over all updates
    pub fn total_time(&self) -> f32 {
        self.total
    }

    /// Number of updates
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Mean frame rate over the clock's lifetime
    pub fn average_fps(&self) -> f32 {
        if self.total <= 0.0 {
            return 0.0;
        }
        self.frames as f32 / self.total
    }
}

/// Pausable wall-clock accumulator
#[derive(Debug, Default)]
pub struct Stopwatch {
    running_since: Option<Instant>,
    banked: Duration,
}

impl Stopwatch {
    /// Stopped, at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Running from now
    pub fn started() -> Self {
        Self {
            running_since: Some(Instant::now()),
            banked: Duration::ZERO,
        }
    }

    /// Start or keep running
    pub fn start(&mut self) {
        self.running_since.get_or_insert_with(Instant::now);
    }

    /// Stop, keeping the time measured so far
    pub fn stop(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.banked += since.elapsed();
        }
    }

    /// Stop and zero
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Total measured time, including the current run
    pub fn elapsed(&self) -> Duration {
        self.banked + self.running_since.map_or(Duration::ZERO, |since| since.elapsed())
    }

    /// Whether the stopwatch is running
    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }
}

/// Rolling frames-per-second counter, refreshed once per accumulated second
#[derive(Debug, Default)]
pub struct FpsCounter {
    frames: u32,
    accumulated: f32,
    current: u32,
}

impl FpsCounter {
    /// Record one frame of `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        self.frames += 1;
        self.accumulated += dt;
        if self.accumulated >= 1.0 {
            self.current = self.frames;
            self.frames = 0;
            self.accumulated -= 1.0;
        }
    }

    /// Frames counted during the last full second
    pub fn fps(&self) -> u32 {
        self.current
    }
}

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

struct ScheduledTimer {
    id: TimerId,
    interval: f32,
    remaining: f32,
    repeat: bool,
    paused: bool,
    callback: Box<dyn FnMut()>,
}

/// Frame-driven callback scheduler
///
/// Advanced by the engine once per frame with the frame delta. Callbacks run on
/// the main thread, in deadline order.
#[derive(Default)]
pub struct TimerManager {
    timers: Vec<ScheduledTimer>,
    next_id: u64,
}

impl std::fmt::Debug for TimerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerManager")
            .field("timers", &self.timers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl TimerManager {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `callback` to run after `interval` seconds, and every
    /// `interval` seconds afterwards when `repeat` is set
    pub fn schedule(&mut self, interval: f32, repeat: bool, callback: impl FnMut() + 'static) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(ScheduledTimer {
            id,
            interval: interval.max(0.0),
            remaining: interval.max(0.0),
            repeat,
            paused: false,
            callback: Box::new(callback),
        });
        id
    }

    /// Cancel a timer. Returns false if it was unknown or already finished
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Pause a timer without losing its remaining time
    pub fn pause(&mut self, id: TimerId) {
        if let Some(timer) = self.timers.iter_mut().find(|t| t.id == id) {
            timer.paused = true;
        }
    }

    /// Resume a paused timer
    pub fn resume(&mut self, id: TimerId) {
        if let Some(timer) = self.timers.iter_mut().find(|t| t.id == id) {
            timer.paused = false;
        }
    }

    /// Number of live timers
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// True when nothing is scheduled
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Advance every running timer by `dt` and fire the due callbacks
    pub fn update(&mut self, dt: f32) {
        let mut due: Vec<(f32, usize)> = Vec::new();
        for (index, timer) in self.timers.iter_mut().enumerate() {
            if timer.paused {
                continue;
            }
            timer.remaining -= dt;
            if timer.remaining <= 0.0 {
                due.push((timer.remaining, index));
            }
        }
        // Most overdue first; ties keep scheduling order.
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        for &(_, index) in &due {
            let timer = &mut self.timers[index];
            (timer.callback)();
            if timer.repeat {
                // At most one firing per update; a long frame does not cause a burst.
                timer.remaining += timer.interval;
                if timer.remaining <= 0.0 {
                    timer.remaining = timer.interval;
                }
            }
        }

        self.timers.retain(|t| t.repeat || t.remaining > 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_stopwatch_accumulates() {
        let mut sw = Stopwatch::new();
        assert!(!sw.is_running());
        sw.start();
        assert!(sw.is_running());
        sw.stop();
        assert!(!sw.is_running());
        sw.reset();
        assert_eq!(sw.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_fps_counter_rolls_over() {
        let mut fps = FpsCounter::default();
        for _ in 0..60 {
            fps.tick(1.0 / 60.0 + 1e-4);
        }
        assert_eq!(fps.fps(), 60);
    }

    #[test]
    fn test_one_shot_timer_fires_once() {
        let hits = Rc::new(RefCell::new(0));
        let mut timers = TimerManager::new();
        let counter = hits.clone();
        timers.schedule(0.5, false, move || *counter.borrow_mut() += 1);

        timers.update(0.25);
        assert_eq!(*hits.borrow(), 0);
        timers.update(0.3);
        assert_eq!(*hits.borrow(), 1);
        timers.update(1.0);
        assert_eq!(*hits.borrow(), 1);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_repeat_timer_fires_once_per_update() {
        let hits = Rc::new(RefCell::new(0));
        let mut timers = TimerManager::new();
        let counter = hits.clone();
        timers.schedule(0.1, true, move || *counter.borrow_mut() += 1);

        timers.update(1.0);
        assert_eq!(*hits.borrow(), 1);
        timers.update(0.1);
        assert_eq!(*hits.borrow(), 2);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_cancel_and_pause() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut timers = TimerManager::new();
        let a_hits = hits.clone();
        let a = timers.schedule(0.1, false, move || a_hits.borrow_mut().push('a'));
        let b_hits = hits.clone();
        let b = timers.schedule(0.1, false, move || b_hits.borrow_mut().push('b'));

        assert!(timers.cancel(a));
        assert!(!timers.cancel(a));
        timers.pause(b);
        timers.update(1.0);
        assert!(hits.borrow().is_empty());
        timers.resume(b);
        timers.update(0.2);
        assert_eq!(*hits.borrow(), vec!['b']);
    }

    #[test]
    fn test_due_timers_fire_in_deadline_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut timers = TimerManager::new();
        let late = order.clone();
        timers.schedule(0.3, false, move || late.borrow_mut().push(3));
        let early = order.clone();
        timers.schedule(0.1, false, move || early.borrow_mut().push(1));

        timers.update(0.5);
        assert_eq!(*order.borrow(), vec![1, 3]);
    }
}
