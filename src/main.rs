// SPDX-License-Identifier: MIT
//
// tcanvas: a sandbox that exercises the whole engine.
//
// A movable `@`, a few rectangles and labels, and a spinning cube drawn
// through the rasterizer, all redrawn every frame and diffed down to the
// handful of cells that actually changed.
//
// Layout:
//
//   ┌─ tcanvas ──────────────────────────┐
//   │  ▒▒▒▒▒▒▒▒                          │
//   │  ▒ box ▒▒          cube            │
//   │  ▒▒▒▒▒▒▒▒                          │
//   │              @                     │
//   │ key / render statistics            │
//   │ help                               │
//   └────────────────────────────────────┘
//
// Controls: WASD or arrows move, `f` toggles the solid cube, `q` quits
// (Escape too on the Windows console, where it arrives as a single key).

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use tc_raster::{Rasterizer, Transform, Vec3, CUBE};
use tc_term::color::{self, Color};
use tc_term::{Engine, EngineConfig, KeyCode, RenderStats, TerminalBackend};

/// Draw in the terminal: a movable player, shapes, text and a rotating cube.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Frames per second to pace to (0 for unlimited)
    #[arg(long, default_value_t = 30)]
    fps: i32,

    /// Start with a solid cube instead of a wireframe
    #[arg(long)]
    filled: bool,

    /// Leave the cube out
    #[arg(long)]
    no_cube: bool,

    /// Write logs to this file (the terminal is busy being a canvas)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

// ─── Sandbox ─────────────────────────────────────────────────────────────────

/// Radians the cube turns per frame.
const SPIN: f32 = 0.04;

const BORDER: Color = color::GRAY;
const PLAYER: Color = color::YELLOW;

struct Sandbox {
    player: (i32, i32),
    filled: bool,
    show_cube: bool,
    angle: f32,
    last_key: Option<KeyCode>,
    stats: RenderStats,
    rasterizer: Rasterizer,
}

impl Sandbox {
    fn new(args: &Args, width: u16, height: u16) -> Self {
        Self {
            player: (i32::from(width) / 2, i32::from(height) / 2),
            filled: args.filled,
            show_cube: !args.no_cube,
            angle: 0.0,
            last_key: None,
            stats: RenderStats::default(),
            rasterizer: Rasterizer::default(),
        }
    }

    /// React to one key. Movement stays inside the border.
    fn handle_key(&mut self, key: KeyCode, width: u16, height: u16) {
        self.last_key = Some(key);
        let (dx, dy) = match key {
            KeyCode::Up | KeyCode::Char(b'w') => (0, -1),
            KeyCode::Down | KeyCode::Char(b's') => (0, 1),
            KeyCode::Left | KeyCode::Char(b'a') => (-1, 0),
            KeyCode::Right | KeyCode::Char(b'd') => (1, 0),
            KeyCode::Char(b'f') => {
                self.filled = !self.filled;
                log::info!("cube {}", if self.filled { "filled" } else { "wireframe" });
                return;
            }
            _ => return,
        };
        let max_x = (i32::from(width) - 2).max(1);
        let max_y = (i32::from(height) - 2).max(1);
        self.player = (
            (self.player.0 + dx).clamp(1, max_x),
            (self.player.1 + dy).clamp(1, max_y),
        );
    }

    fn update(&mut self) {
        self.angle = (self.angle + SPIN) % std::f32::consts::TAU;
    }

    fn draw<B: TerminalBackend>(&mut self, engine: &mut Engine<B>) {
        let w = i32::from(engine.screen_width());
        let h = i32::from(engine.screen_height());

        engine.clear_background(color::BLACK);
        engine.draw_rect_outline(0, 0, w, h, BORDER, color::BLANK);
        engine.draw_text(" tcanvas ", 2, 0, color::WHITE, color::BLANK);

        engine.draw_rect_filled(3, 2, 12, 3, color::WHITE, color::DARKBLUE);
        engine.draw_text("box", 7, 3, color::WHITE, color::BLANK);
        engine.draw_text("filled", 3, 5, color::LIGHTGRAY, color::BLANK);
        engine.draw_rect_outline(17, 2, 12, 3, color::GREEN, color::BLANK);
        engine.draw_text("outline", 17, 5, color::LIGHTGRAY, color::BLANK);

        if self.show_cube {
            let transform = Transform {
                position: Vec3::new(1.2, 0.0, 0.0),
                size: Vec3::splat(1.4),
                rotation: Vec3::new(self.angle * 0.7, self.angle, 0.0),
            };
            if self.filled {
                self.rasterizer.draw_model_filled(&mut *engine, &CUBE, &transform, color::RED);
            } else {
                self.rasterizer.draw_model_wireframe(&mut *engine, &CUBE, &transform, color::SKYBLUE);
            }
        }

        engine.draw_text("@", self.player.0, self.player.1, PLAYER, color::BLANK);

        let key = self.last_key.map_or(0, KeyCode::code);
        let status = format!(
            " key {key:3}  rendered {:5}  skipped {:5} ",
            self.stats.cells_rendered, self.stats.cells_skipped
        );
        engine.draw_text(&status, 2, h - 3, color::WHITE, color::BLANK);
        engine.draw_text(
            " WASD/arrows move  f solid/wire  q quit ",
            2,
            h - 2,
            color::DARKGRAY,
            color::BLANK,
        );
    }
}

// ─── Main ────────────────────────────────────────────────────────────────────

/// Send logs to `path`. Without a path nothing is installed and logging is
/// a no-op, since stderr shares the screen.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run<B: TerminalBackend>(engine: &mut Engine<B>, args: &Args) -> Result<()> {
    engine
        .try_open(80, 24, "tcanvas")
        .context("failed to initialize terminal")?;
    let (width, height) = (engine.screen_width(), engine.screen_height());
    log::info!("sandbox running on a {width}x{height} terminal at {} fps", args.fps);

    let mut sandbox = Sandbox::new(args, width, height);
    loop {
        engine.try_begin_frame()?;
        if engine.should_quit() {
            break;
        }
        if let Some(key) = engine.get_key() {
            sandbox.handle_key(key, width, height);
        }
        sandbox.update();
        sandbox.draw(engine);
        sandbox.stats = engine.end_frame();
    }

    engine.close();
    log::info!("sandbox closed");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let config = EngineConfig::default().with_target_fps(args.fps);
    let mut engine = Engine::native(config);
    run(&mut engine, &args)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
