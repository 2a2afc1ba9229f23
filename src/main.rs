mod animations;
mod config;
mod content;
mod error;
mod page;
mod palette;
mod render;
mod scheduler;
mod surface;
mod watch;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, terminal,
};
use unicode_width::UnicodeWidthStr;

use animations::typing::TYPING_INTERVAL_MS;
use config::Config;
use content::Portfolio;
use page::Page;
use palette::Palette;
use render::{Canvas, ColorMode, RenderMode};

#[derive(Parser)]
#[command(name = "termfolio", about = "Single-page portfolio in the terminal")]
struct Cli {
    /// Render mode
    #[arg(short, long, value_enum)]
    render: Option<RenderMode>,

    /// Color mode
    #[arg(short, long, value_enum)]
    color: Option<ColorMode>,

    /// Target FPS (1-120)
    #[arg(short, long)]
    fps: Option<u32>,

    /// Portfolio content file (.toml or .json)
    #[arg(long)]
    content: Option<PathBuf>,

    /// Reload the content file when it changes
    #[arg(short, long)]
    watch: bool,

    /// Hide the status bar
    #[arg(long)]
    clean: bool,

    /// Write debug logs to this file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Print the config file path and exit
    #[arg(long)]
    show_config: bool,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,

    /// Print the active content as TOML and exit
    #[arg(long)]
    dump_content: bool,
}

/// CLI flags merged over the config file, merged over defaults.
struct Settings {
    render_mode: RenderMode,
    color_mode: ColorMode,
    fps: u32,
    clean: bool,
    content: Option<PathBuf>,
    watch: bool,
    typing_interval: f64,
    palette: Palette,
    color_quant: u8,
}

impl Settings {
    fn resolve(cli: &Cli, config: &Config) -> anyhow::Result<Self> {
        Ok(Settings {
            render_mode: cli
                .render
                .or(config.render.map(Into::into))
                .unwrap_or(RenderMode::HalfBlock),
            color_mode: cli
                .color
                .or(config.color.map(Into::into))
                .unwrap_or(ColorMode::TrueColor),
            fps: cli.fps.or(config.fps).unwrap_or(60).clamp(1, 120),
            clean: cli.clean || config.clean.unwrap_or(false),
            content: cli.content.clone().or_else(|| config.content_path()),
            watch: cli.watch || config.watch.unwrap_or(false),
            typing_interval: config.typing_interval_ms.unwrap_or(TYPING_INTERVAL_MS),
            palette: config.palette().context("invalid palette in config")?,
            color_quant: config.color_quant.unwrap_or(0),
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.init_config {
        let path = config::init_config()?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    if cli.show_config {
        match config::config_path() {
            Some(path) if path.exists() => println!("{}", path.display()),
            Some(path) => println!("{} (not created, use --init-config)", path.display()),
            None => println!("No config directory on this platform"),
        }
        return Ok(());
    }

    let config = config::load_config().context("failed to load config")?;
    init_logging(cli.log.clone().or_else(|| config.log_path()).as_deref())?;
    let settings = Settings::resolve(&cli, &config)?;

    let portfolio = match &settings.content {
        Some(path) => Portfolio::load(path)
            .with_context(|| format!("failed to load content from {}", path.display()))?,
        None => Portfolio::default(),
    };

    if cli.dump_content {
        print!("{}", toml::to_string_pretty(&portfolio)?);
        return Ok(());
    }

    let updates = match (&settings.content, settings.watch) {
        (Some(path), true) => Some(watch::spawn_content_watcher(path)),
        (None, true) => bail!("--watch needs a content file (--content or `content` in config)"),
        _ => None,
    };

    tracing::info!(
        render = ?settings.render_mode,
        color = ?settings.color_mode,
        fps = settings.fps,
        "starting"
    );

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        EnableMouseCapture
    )?;

    let mut writer = BufWriter::with_capacity(256 * 1024, stdout);
    let result = run_loop(&mut writer, &settings, portfolio, updates);

    // Cleanup
    execute!(
        writer,
        DisableMouseCapture,
        cursor::Show,
        terminal::LeaveAlternateScreen
    )?;
    terminal::disable_raw_mode()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "exiting with error");
    }
    result
}

fn init_logging(path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
    Ok(())
}

/// Longest wait for input while the page is still. Bounds content reload latency.
const IDLE_WAIT: Duration = Duration::from_millis(250);

const RENDER_MODES: [RenderMode; 3] = [RenderMode::HalfBlock, RenderMode::Braille, RenderMode::Ascii];
const COLOR_MODES: [ColorMode; 4] = [ColorMode::TrueColor, ColorMode::Ansi256, ColorMode::Ansi16, ColorMode::Mono];

fn run_loop(
    stdout: &mut BufWriter<io::Stdout>,
    settings: &Settings,
    portfolio: Portfolio,
    updates: Option<Receiver<Portfolio>>,
) -> anyhow::Result<()> {
    let frame_dur = Duration::from_secs_f64(1.0 / settings.fps as f64);
    let (mut cols, mut rows) = terminal::size()?;
    let mut render_mode = settings.render_mode;
    let mut color_mode = settings.color_mode;
    let mut hide_status = settings.clean;
    let view_rows = |rows: u16, hide: bool| {
        if hide {
            rows as usize
        } else {
            // Reserve 1 row for status bar
            (rows as usize).saturating_sub(1)
        }
    };

    let mut display_rows = view_rows(rows, hide_status);
    let mut canvas = Canvas::new(cols as usize, display_rows, render_mode, color_mode);
    canvas.color_quant = settings.color_quant;
    let mut page = Page::new(
        portfolio,
        settings.palette,
        settings.typing_interval,
        cols as usize,
        display_rows,
        render_mode,
    );

    let start = Instant::now();
    let mut frame_count: u64 = 0;
    let mut actual_fps: f64 = 0.0;
    let mut fps_update = Instant::now();
    let mut rebuild_canvas = false;

    loop {
        let frame_start = Instant::now();

        // Handle input (non-blocking)
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Resize(w, h) => {
                    if w >= 10 && h >= 5 {
                        cols = w;
                        rows = h;
                        rebuild_canvas = true;
                    }
                }
                Event::Mouse(MouseEvent {
                    kind, column, row, ..
                }) => match kind {
                    MouseEventKind::Moved
                    | MouseEventKind::Drag(_)
                    | MouseEventKind::Down(MouseButton::Left) => {
                        if (row as usize) < display_rows {
                            page.pointer_moved(column as usize, row as usize);
                        } else {
                            page.pointer_left();
                        }
                    }
                    MouseEventKind::ScrollUp => page.scroll_by(-3),
                    MouseEventKind::ScrollDown => page.scroll_by(3),
                    _ => {}
                },
                Event::Key(KeyEvent {
                    code, modifiers, ..
                }) => match code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(());
                    }
                    KeyCode::Up | KeyCode::Char('k') => page.scroll_by(-1),
                    KeyCode::Down | KeyCode::Char('j') => page.scroll_by(1),
                    KeyCode::PageUp => page.scroll_by(-(display_rows.max(2) as isize - 1)),
                    KeyCode::PageDown | KeyCode::Char(' ') => {
                        page.scroll_by(display_rows.max(2) as isize - 1)
                    }
                    KeyCode::Home => page.scroll_to(0),
                    KeyCode::End => page.scroll_to(usize::MAX),
                    KeyCode::Tab => page.focus_next(true),
                    KeyCode::BackTab => page.focus_next(false),
                    KeyCode::Enter => page.skip_typing(),
                    // Cycle render mode
                    KeyCode::Char('r') => {
                        let idx = RENDER_MODES.iter().position(|&m| m == render_mode).unwrap_or(0);
                        render_mode = RENDER_MODES[(idx + 1) % RENDER_MODES.len()];
                        rebuild_canvas = true;
                    }
                    // Cycle color mode
                    KeyCode::Char('c') => {
                        let idx = COLOR_MODES.iter().position(|&m| m == color_mode).unwrap_or(0);
                        color_mode = COLOR_MODES[(idx + 1) % COLOR_MODES.len()];
                        rebuild_canvas = true;
                    }
                    // Toggle status bar
                    KeyCode::Char('h') => {
                        hide_status = !hide_status;
                        rebuild_canvas = true;
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        if let Some(portfolio) = updates.as_ref().and_then(|rx| rx.try_iter().last()) {
            page.set_portfolio(portfolio);
        }

        // Rebuild canvas if mode changed or terminal resized
        if rebuild_canvas && cols >= 10 && rows >= 5 {
            // Re-read size to get the settled value
            let (settled_cols, settled_rows) = terminal::size()?;
            if settled_cols >= 10 && settled_rows >= 5 {
                cols = settled_cols;
                rows = settled_rows;
            }
            display_rows = view_rows(rows, hide_status);
            canvas = Canvas::new(cols as usize, display_rows, render_mode, color_mode);
            canvas.color_quant = settings.color_quant;
            page.relayout(cols as usize, display_rows, render_mode);
            // Reset terminal state completely
            write!(stdout, "\x1b[2J\x1b[H")?;
            stdout.flush()?;
            rebuild_canvas = false;
        }

        let now_ms = start.elapsed().as_secs_f64() * 1000.0;
        page.tick(now_ms);
        canvas.clear();
        page.draw(&mut canvas, now_ms);
        let frame = canvas.render();

        // Skip the frame if the terminal changed size under us
        let (check_cols, check_rows) = terminal::size()?;
        if check_cols != cols || check_rows != rows {
            cols = check_cols;
            rows = check_rows;
            rebuild_canvas = true;
            std::thread::sleep(Duration::from_millis(50));
            continue;
        }

        // Build entire frame into buffer before flushing
        stdout.write_all(b"\x1b[H")?;
        stdout.write_all(frame.as_bytes())?;

        frame_count += 1;
        if fps_update.elapsed() >= Duration::from_secs(1) {
            actual_fps = frame_count as f64 / fps_update.elapsed().as_secs_f64();
            frame_count = 0;
            fps_update = Instant::now();
        }
        if !hide_status {
            let target = page
                .hovered_card()
                .map(|card| format!("↗ {}", card.url))
                .unwrap_or_else(|| {
                    let bottom = (page.scroll() + display_rows).min(page.height());
                    format!("row {}/{}", bottom, page.height())
                });
            let status = format!(
                " {} | {:?} | {:?} | {:.0} fps | {} | [↑/↓] scroll  [tab] focus  [r] render  [c] color  [h] hide  [q] quit ",
                page.portfolio().name,
                render_mode,
                color_mode,
                actual_fps,
                target,
            );
            let w = cols as usize;
            let truncated = page::layout::truncate(&status, w);
            let pad = w.saturating_sub(truncated.width());
            write!(
                stdout,
                "\x1b[{};1H\x1b[7m{}{}\x1b[0m",
                rows,
                truncated,
                " ".repeat(pad)
            )?;
        }

        // Single flush per frame
        stdout.flush()?;

        // Nothing moves until the next input: wait for it instead of
        // redrawing an unchanged page at full rate.
        if !page.is_animating(now_ms) {
            event::poll(IDLE_WAIT)?;
            continue;
        }

        // Sleep to target FPS
        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}
