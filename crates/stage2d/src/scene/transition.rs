//! # Scene Transitions
//!
//! A [`Transition`] blends two scenes over a fixed duration. It only ever
//! holds weak references: the [`SceneManager`](super::SceneManager) keeps both
//! scenes alive and commits the stack change once the transition reports it
//! has finished.
//!
//! Each strategy renders the outgoing scene first and the incoming one
//! second, and puts every camera it touches back the way it found it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::foundation::math::{Color, Rect, Size, Vec2};
use crate::render::{Camera, RenderCommand};

use super::scene::{Scene, SceneRef};

/// Fallback viewport when neither scene is alive
const FALLBACK_VIEWPORT: Size = Size::new(800.0, 600.0);

/// Direction the scenes travel in a slide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    /// Outgoing leaves to the left, incoming enters from the right
    Left,
    /// Outgoing leaves to the right, incoming enters from the left
    Right,
    /// Outgoing leaves upward, incoming enters from below
    Up,
    /// Outgoing leaves downward, incoming enters from above
    Down,
}

/// Axis a flip turns around
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    /// Positive rotation
    Horizontal,
    /// Negative rotation
    Vertical,
}

/// Transition strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionType {
    /// Cross-fade
    Fade,
    /// Both scenes move across the viewport
    Slide(SlideDirection),
    /// Outgoing shrinks away, incoming grows in
    Scale,
    /// Half-turn; the scene swaps at the midpoint
    Flip(FlipAxis),
    /// A grid of boxes closes over the outgoing scene and opens on the incoming one
    Box {
        /// Cells per side
        divisions: u32,
    },
}

/// Quadratic ease-in-out
pub fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) * 0.5
    }
}

/// Quadratic ease-out
pub fn ease_out_quad(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Timed blend between two scenes
pub struct Transition {
    kind: TransitionType,
    duration: f32,
    elapsed: f32,
    progress: f32,
    started: bool,
    finished: bool,
    outgoing: Option<Weak<RefCell<Scene>>>,
    incoming: Option<Weak<RefCell<Scene>>>,
    on_finish: Option<Box<dyn FnMut()>>,
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("kind", &self.kind)
            .field("duration", &self.duration)
            .field("progress", &self.progress)
            .field("started", &self.started)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl Transition {
    /// Create an unstarted transition
    pub fn new(kind: TransitionType, duration: f32) -> Self {
        Self {
            kind,
            duration,
            elapsed: 0.0,
            progress: 0.0,
            started: false,
            finished: false,
            outgoing: None,
            incoming: None,
            on_finish: None,
        }
    }

    /// Cross-fade
    pub fn fade(duration: f32) -> Self {
        Self::new(TransitionType::Fade, duration)
    }

    /// Slide in `direction`
    pub fn slide(direction: SlideDirection, duration: f32) -> Self {
        Self::new(TransitionType::Slide(direction), duration)
    }

    /// Shrink / grow
    pub fn scale(duration: f32) -> Self {
        Self::new(TransitionType::Scale, duration)
    }

    /// Flip around `axis`
    pub fn flip(axis: FlipAxis, duration: f32) -> Self {
        Self::new(TransitionType::Flip(axis), duration)
    }

    /// Box grid with `divisions` cells per side
    pub fn boxes(divisions: u32, duration: f32) -> Self {
        Self::new(TransitionType::Box { divisions }, duration)
    }

    /// Callback run once each time the transition finishes
    pub fn set_on_finish(&mut self, callback: impl FnMut() + 'static) {
        self.on_finish = Some(Box::new(callback));
    }

    /// Strategy
    pub fn kind(&self) -> TransitionType {
        self.kind
    }

    /// Total length in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Seconds since start
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Linear progress in [0, 1]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Whether `start` was called
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether the transition has completed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Started and not yet finished
    pub fn is_active(&self) -> bool {
        self.started && !self.finished
    }

    /// Begin blending from `outgoing` (if any) to `incoming`. Restarting
    /// resets the clock and re-arms the finish callback.
    pub fn start(&mut self, outgoing: Option<&SceneRef>, incoming: &SceneRef) {
        self.outgoing = outgoing.map(Rc::downgrade);
        self.incoming = Some(Rc::downgrade(incoming));
        self.elapsed = 0.0;
        self.progress = 0.0;
        self.started = true;
        self.finished = false;
        log::debug!("{:?} transition started ({:.2}s)", self.kind, self.duration);
    }

    /// Advance the clock. Returns `true` on the update that finishes the
    /// transition, and only on that one.
    pub fn update(&mut self, dt: f32) -> bool {
        let finished = self.advance(dt);
        if finished {
            self.notify_finished();
        }
        finished
    }

    /// Like [`Transition::update`] but leaves the finish callback to the
    /// caller, which runs it with [`Transition::notify_finished`] once its own
    /// completion work is done
    pub(crate) fn advance(&mut self, dt: f32) -> bool {
        if !self.is_active() {
            return false;
        }
        self.elapsed += dt;
        self.progress = if self.duration > 0.0 {
            (self.elapsed / self.duration).min(1.0)
        } else {
            1.0
        };
        if self.progress < 1.0 {
            return false;
        }
        self.finished = true;
        log::debug!("{:?} transition finished", self.kind);
        true
    }

    pub(crate) fn notify_finished(&mut self) {
        if let Some(callback) = self.on_finish.as_mut() {
            callback();
        }
    }

    fn scene(slot: Option<&Weak<RefCell<Scene>>>) -> Option<SceneRef> {
        slot.and_then(Weak::upgrade)
    }

    fn viewport(outgoing: Option<&SceneRef>, incoming: Option<&SceneRef>) -> Size {
        outgoing
            .or(incoming)
            .map(|scene| scene.borrow().viewport_size())
            .filter(|size| size.width > 0.0 && size.height > 0.0)
            .unwrap_or(FALLBACK_VIEWPORT)
    }

    /// Append the blended frame. Nothing is drawn unless the transition is
    /// active.
    pub fn collect_render_commands(&self, out: &mut Vec<RenderCommand>) {
        if !self.is_active() {
            return;
        }
        let outgoing = Self::scene(self.outgoing.as_ref());
        let incoming = Self::scene(self.incoming.as_ref());
        let p = ease_in_out_quad(self.progress);

        match self.kind {
            TransitionType::Fade => {
                let alpha = ease_out_quad(self.progress);
                render_with(outgoing.as_ref(), out, 1.0 - alpha, |_| {});
                render_with(incoming.as_ref(), out, alpha, |_| {});
            }
            TransitionType::Slide(direction) => {
                let size = Self::viewport(outgoing.as_ref(), incoming.as_ref());
                let (out_offset, in_offset) = slide_offsets(direction, size, p);
                render_with(outgoing.as_ref(), out, 1.0, |camera| camera.move_by(out_offset));
                render_with(incoming.as_ref(), out, 1.0, |camera| camera.move_by(in_offset));
            }
            TransitionType::Scale => {
                render_with(outgoing.as_ref(), out, 1.0, |camera| camera.set_zoom(camera.zoom() * (1.0 - p)));
                render_with(incoming.as_ref(), out, 1.0, |camera| camera.set_zoom(camera.zoom() * p));
            }
            TransitionType::Flip(axis) => {
                let sign = match axis {
                    FlipAxis::Horizontal => 1.0,
                    FlipAxis::Vertical => -1.0,
                };
                let angle = p * 180.0;
                if p < 0.5 {
                    render_with(outgoing.as_ref(), out, 1.0, |camera| {
                        camera.set_rotation(camera.rotation() + sign * angle);
                    });
                } else {
                    render_with(incoming.as_ref(), out, 1.0, |camera| {
                        camera.set_rotation(camera.rotation() + sign * (angle - 180.0));
                    });
                }
            }
            TransitionType::Box { divisions } => {
                let (scene, coverage) = if p < 0.5 {
                    (outgoing.as_ref(), p * 2.0)
                } else {
                    (incoming.as_ref(), (1.0 - p) * 2.0)
                };
                render_with(scene, out, 1.0, |_| {});
                let size = Self::viewport(outgoing.as_ref(), incoming.as_ref());
                push_box_grid(out, size, divisions, coverage);
            }
        }
    }
}

/// Render `scene` with its camera temporarily adjusted by `adjust`
fn render_with(scene: Option<&SceneRef>, out: &mut Vec<RenderCommand>, opacity: f32, adjust: impl FnOnce(&mut Camera)) {
    let Some(scene) = scene else {
        return;
    };
    let mut scene = scene.borrow_mut();
    let saved = scene.camera().state();
    adjust(scene.camera_mut());
    scene.collect_render_commands(out, opacity);
    scene.camera_mut().restore(saved);
}

/// Camera offsets for (outgoing, incoming) at eased progress `p`
fn slide_offsets(direction: SlideDirection, size: Size, p: f32) -> (Vec2, Vec2) {
    let (w, h) = (size.width, size.height);
    match direction {
        SlideDirection::Left => (Vec2::new(-w * p, 0.0), Vec2::new(w * (1.0 - p), 0.0)),
        SlideDirection::Right => (Vec2::new(w * p, 0.0), Vec2::new(-w * (1.0 - p), 0.0)),
        SlideDirection::Up => (Vec2::new(0.0, -h * p), Vec2::new(0.0, h * (1.0 - p))),
        SlideDirection::Down => (Vec2::new(0.0, h * p), Vec2::new(0.0, -h * (1.0 - p))),
    }
}

/// Black boxes centered in a `divisions`² grid, each `coverage` of its cell
fn push_box_grid(out: &mut Vec<RenderCommand>, size: Size, divisions: u32, coverage: f32) {
    if divisions == 0 || coverage <= 0.0 {
        return;
    }
    let cell = Size::new(size.width / divisions as f32, size.height / divisions as f32);
    let side = Size::new(cell.width * coverage, cell.height * coverage);
    out.push(RenderCommand::ViewProjection(
        Camera::for_viewport(size.width, size.height).view_projection(),
    ));
    for row in 0..divisions {
        for column in 0..divisions {
            let x = column as f32 * cell.width + (cell.width - side.width) * 0.5;
            let y = row as f32 * cell.height + (cell.height - side.height) * 0.5;
            out.push(RenderCommand::fill_rect(Rect::new(x, y, side.width, side.height), Color::BLACK));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Node;
    use approx::assert_relative_eq;
    use std::cell::Cell;

    fn scene(name: &str, color: Color) -> SceneRef {
        let mut scene = Scene::new(name);
        scene.add_node(Node::rect(10.0, 10.0, color));
        scene.into_ref()
    }

    fn fills(out: &[RenderCommand]) -> Vec<Color> {
        out.iter()
            .filter_map(|command| match command {
                RenderCommand::FillRect { color, .. } => Some(*color),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_easing_endpoints() {
        for ease in [ease_in_out_quad, ease_out_quad] {
            assert_relative_eq!(ease(0.0), 0.0);
            assert_relative_eq!(ease(1.0), 1.0);
        }
        assert_relative_eq!(ease_in_out_quad(0.5), 0.5);
    }

    #[test]
    fn test_finish_fires_once_per_start() {
        let a = scene("a", Color::RED);
        let b = scene("b", Color::BLUE);
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);

        let mut transition = Transition::fade(0.5);
        transition.set_on_finish(move || counter.set(counter.get() + 1));
        assert!(!transition.update(1.0));

        transition.start(Some(&a), &b);
        assert!(!transition.update(0.3));
        assert!(transition.update(0.3));
        assert!(!transition.update(0.3));
        assert_eq!(fired.get(), 1);
        assert!(transition.is_finished());

        transition.start(Some(&a), &b);
        transition.update(1.0);
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn test_zero_duration_finishes_on_first_update() {
        let b = scene("b", Color::BLUE);
        let mut transition = Transition::slide(SlideDirection::Left, 0.0);
        transition.start(None, &b);
        assert!(transition.update(0.0));
        assert_relative_eq!(transition.progress(), 1.0);

        let mut out = Vec::new();
        transition.collect_render_commands(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_fade_renders_outgoing_then_incoming() {
        let a = scene("a", Color::RED);
        let b = scene("b", Color::BLUE);
        let mut transition = Transition::fade(1.0);
        transition.start(Some(&a), &b);
        transition.update(0.5);

        let mut out = Vec::new();
        transition.collect_render_commands(&mut out);
        let colors = fills(&out);
        assert_eq!(colors.len(), 2);
        assert_relative_eq!(colors[0].r, 1.0);
        assert_relative_eq!(colors[0].a, 0.25);
        assert_relative_eq!(colors[1].b, 1.0);
        assert_relative_eq!(colors[1].a, 0.75);
    }

    #[test]
    fn test_camera_restored_after_render() {
        let a = scene("a", Color::RED);
        let b = scene("b", Color::BLUE);
        a.borrow_mut().camera_mut().set_position(Vec2::new(5.0, 7.0));
        let before_a = a.borrow().camera().state();
        let before_b = b.borrow().camera().state();

        for kind in [
            TransitionType::Slide(SlideDirection::Up),
            TransitionType::Scale,
            TransitionType::Flip(FlipAxis::Vertical),
        ] {
            let mut transition = Transition::new(kind, 1.0);
            transition.start(Some(&a), &b);
            transition.update(0.4);
            let mut out = Vec::new();
            transition.collect_render_commands(&mut out);
            assert!(!out.is_empty());
            assert_eq!(a.borrow().camera().state(), before_a);
            assert_eq!(b.borrow().camera().state(), before_b);
        }
    }

    #[test]
    fn test_flip_and_box_show_one_scene_per_half() {
        let a = scene("a", Color::RED);
        let b = scene("b", Color::BLUE);
        for kind in [TransitionType::Flip(FlipAxis::Horizontal), TransitionType::Box { divisions: 0 }] {
            let mut transition = Transition::new(kind, 1.0);
            transition.start(Some(&a), &b);

            transition.update(0.25);
            let mut out = Vec::new();
            transition.collect_render_commands(&mut out);
            assert_eq!(fills(&out), vec![Color::RED]);

            transition.update(0.5);
            out.clear();
            transition.collect_render_commands(&mut out);
            assert_eq!(fills(&out), vec![Color::BLUE]);
        }
    }

    #[test]
    fn test_box_grid_covers_cells() {
        let mut out = Vec::new();
        push_box_grid(&mut out, Size::new(100.0, 100.0), 2, 1.0);
        assert_eq!(out.len(), 5);
        match out[4] {
            RenderCommand::FillRect { rect, .. } => assert_eq!(rect, Rect::new(50.0, 50.0, 50.0, 50.0)),
            ref other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_slide_offsets() {
        let size = Size::new(800.0, 600.0);
        let (outgoing, incoming) = slide_offsets(SlideDirection::Left, size, 0.25);
        assert_relative_eq!(outgoing.x, -200.0);
        assert_relative_eq!(incoming.x, 600.0);
        let (outgoing, incoming) = slide_offsets(SlideDirection::Down, size, 0.5);
        assert_relative_eq!(outgoing.y, 300.0);
        assert_relative_eq!(incoming.y, -300.0);
    }
}
