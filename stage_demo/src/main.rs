//! stage2d demo application
//!
//! Walks the scene stack through every transition kind: a menu with a
//! button, a level full of drifting shapes pushed over it, then pops,
//! replaces and unwinds back to the menu before quitting. Runs headless by
//! default. `--features glfw` opens a real window and shared GL context to
//! exercise the render thread against them; frames still go to a recording
//! backend, so the window stays blank.
//!
//! Settings are read from `stage_demo.toml` next to the binary when present.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use rand::Rng;
use stage2d::core::ConfigError;
use stage2d::foundation::logging;
use stage2d::prelude::*;
use stage2d::render::{RecordingHandle, WindowError};
use thiserror::Error;

const CONFIG_PATH: &str = "stage_demo.toml";
/// Seconds between scripted scene changes
const STAGE_INTERVAL: f32 = 1.5;
/// Headless safety net
#[cfg(not(feature = "glfw"))]
const MAX_HEADLESS_FRAMES: u64 = 900;

#[derive(Debug, Error)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Default)]
struct DemoApp {
    ticks: Rc<Cell<u32>>,
    clicked: Rc<Cell<bool>>,
    stage: u32,
    uptime: Stopwatch,
    draws: Option<RecordingHandle>,
    draw_calls: usize,
}

impl DemoApp {
    fn menu_scene(&self, engine: &mut Engine) -> SceneRef {
        let font = engine.resources.load_font("mono", 24);
        let mut scene = Scene::new("menu").with_background(Color::rgb(0.08, 0.08, 0.12));

        scene.add_node(
            Node::label("stage2d", font.clone())
                .with_name("title")
                .at(400.0, 160.0)
                .with_color(Color::WHITE),
        );
        let play = scene.add_node(
            Node::button(ButtonStyle {
                text: "Play".to_string(),
                font,
                border_width: 2.0,
                ..ButtonStyle::default()
            })
            .with_name("play")
            .at(400.0, 300.0),
        );
        let clicked = Rc::clone(&self.clicked);
        scene.on_click(play, move || clicked.set(true));
        scene.into_ref()
    }

    fn level_scene(engine: &mut Engine, name: &str, tint: Color) -> SceneRef {
        let mut rng = rand::thread_rng();
        let texture = engine.resources.create_texture("star", 8, 8, [255, 240, 180, 255]);
        let mut scene = Scene::new(name).with_background(Color::rgb(0.02, 0.02, 0.05));

        let field = scene.add_node(Node::empty().with_name("field").with_anchor(0.0, 0.0));
        for _ in 0..40 {
            let star = Node::sprite(Some(Arc::clone(&texture)))
                .at(rng.gen_range(0.0..800.0), rng.gen_range(0.0..600.0))
                .with_behavior(Behavior::Drift {
                    velocity: Vec2::new(rng.gen_range(-40.0..-10.0), 0.0),
                });
            scene.add_child(field, star);
        }
        for index in 0..6 {
            let size = rng.gen_range(20.0..60.0);
            scene.add_node(
                Node::rect(size, size, tint)
                    .at(120.0 + index as f32 * 110.0, 300.0)
                    .with_z_order(index)
                    .with_behavior(Behavior::Spin {
                        degrees_per_second: rng.gen_range(-90.0..90.0),
                    }),
            );
        }
        scene.add_node(
            Node::line(Vec2::new(800.0, 0.0), 2.0, Color::WHITE)
                .at(0.0, 560.0)
                .with_name("ground"),
        );
        scene.into_ref()
    }

    fn advance(&mut self, engine: &mut Engine) {
        self.stage += 1;
        log::info!("Demo stage {}", self.stage);
        match self.stage {
            1 => {
                let level = Self::level_scene(engine, "level-1", Color::GREEN);
                engine
                    .scenes
                    .push_scene_with(level, TransitionType::Slide(SlideDirection::Left), 0.5);
            }
            2 => engine.scenes.pop_scene_with(TransitionType::Fade, 0.4),
            3 => {
                let level = Self::level_scene(engine, "level-2", Color::BLUE);
                engine.scenes.push_scene_with(level, TransitionType::Scale, 0.5);
            }
            4 => {
                let level = Self::level_scene(engine, "level-3", Color::RED);
                engine
                    .scenes
                    .replace_scene_with(level, TransitionType::Flip(FlipAxis::Horizontal), 0.6);
            }
            5 => engine
                .scenes
                .pop_to_scene_with("menu", TransitionType::Box { divisions: 8 }, 0.5),
            _ => engine.quit(),
        }
    }
}

impl Application for DemoApp {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        self.uptime.start();
        let menu = self.menu_scene(engine);
        engine.scenes.register_scene("menu", Rc::clone(&menu));
        engine.enter_scene(menu);

        let ticks = Rc::clone(&self.ticks);
        engine
            .timers
            .schedule(STAGE_INTERVAL, true, move || ticks.set(ticks.get() + 1));
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        if self.clicked.replace(false) && self.stage == 0 {
            self.ticks.set(self.ticks.get().max(1));
        }
        if engine.input.is_key_pressed(KeyCode::Escape) {
            engine.quit();
        }
        if let Some(draws) = &self.draws {
            self.draw_calls += draws.take().len();
        }
        if !engine.scenes.is_transitioning() && self.stage < self.ticks.get() {
            self.advance(engine);
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        if let Some(thread) = engine.render_thread() {
            log::info!(
                "Render thread executed {} frame(s), dropped {}",
                thread.frames_executed(),
                thread.frames_dropped()
            );
        }
        self.uptime.stop();
        log::info!(
            "Demo finished after {} frame(s) and {} draw call(s) in {:.1}s at {} fps",
            engine.frame_number(),
            self.draw_calls,
            self.uptime.elapsed().as_secs_f32(),
            engine.fps()
        );
    }
}

#[cfg(feature = "glfw")]
fn open_window(config: &AppConfig) -> Result<Box<dyn Window>, DemoError> {
    let window = stage2d::render::GlfwWindow::new(&config.window, config.render.msaa_samples)?;
    Ok(Box::new(window))
}

#[cfg(not(feature = "glfw"))]
fn open_window(config: &AppConfig) -> Result<Box<dyn Window>, DemoError> {
    let window = HeadlessWindow::new(config.window.width, config.window.height).close_after(MAX_HEADLESS_FRAMES);
    Ok(Box::new(window))
}

fn default_config() -> AppConfig {
    AppConfig::new("stage2d demo")
        .with_multi_threaded(true)
        .with_vsync(false)
        .with_fps_limit(60)
}

fn main() -> Result<(), DemoError> {
    let config = if std::path::Path::new(CONFIG_PATH).exists() {
        AppConfig::load_from_file(CONFIG_PATH)?
    } else {
        default_config()
    };
    logging::init_with_level(&config.engine.log_level);
    log::info!("Starting stage2d demo ({}x{})", config.window.width, config.window.height);

    let window = open_window(&config)?;
    let backend = RecordingBackend::new();
    let mut app = DemoApp {
        draws: Some(backend.handle()),
        ..DemoApp::default()
    };
    let mut engine = Engine::new(config, window, Box::new(backend))?;
    engine.run(&mut app)?;
    Ok(())
}
