//! Finishline TUI: estimate a finish place and drag to compare finish times.
//!
//! Layout:
//! 1. Estimate: race, distance, gender, age, goal pace
//! 2. Results: summary, placements, field cards
//! 3. Chart: finish-time distribution with the drag-to-compare marker

use std::fs::File;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use finishline_core::{synthetic, DataSource, EstimatorConfig};
use finishline_tui::worker::{self, WorkerCommand};
use finishline_tui::{input, ui, AppState};

#[derive(Parser)]
#[command(name = "finishline-tui", version, about = "Finishline: interactive placement estimator")]
struct Cli {
    /// Results CSV: a file path or an http(s) URL. Defaults to `source` from the config.
    #[arg(long)]
    source: Option<String>,

    /// Use a generated demo field instead of real results.
    #[arg(long, default_value_t = false, conflicts_with = "source")]
    demo: bool,

    /// Seed for the demo field.
    #[arg(long, default_value_t = 2024)]
    seed: u64,

    /// TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file. The terminal belongs to the UI, so nothing
    /// is logged without it.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let config = match &cli.config {
        Some(path) => EstimatorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EstimatorConfig::default(),
    };

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stderr(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableFocusChange
        );
        default_hook(info);
    }));

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(cmd_rx, resp_tx).context("starting worker thread")?;

    let mut app = AppState::new(config).with_worker(cmd_tx.clone(), resp_rx);
    let source = cli.source.clone().or_else(|| app.config.source.clone());
    match source {
        Some(spec) if !cli.demo => app.request_load(DataSource::parse(&spec)),
        _ => {
            info!(seed = cli.seed, "using generated demo field");
            app.apply_table(synthetic::demo_table(cli.seed));
            app.set_status("Demo field loaded. Fill in the form and press Enter.");
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Shutdown worker
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    result
}

fn init_logging(path: Option<&PathBuf>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .try_init();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Keep the drag scale in step with the drawn plot.
        let size = terminal.size()?;
        let plot = ui::plot_area(Rect::new(0, 0, size.width, size.height));
        app.set_plot_width(f64::from(plot.width));

        // 2. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 3. Drain worker responses (non-blocking)
        app.drain_worker();

        // 4. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => input::handle_key(app, key),
                Event::Mouse(mouse) => input::handle_mouse(app, mouse, plot),
                Event::FocusLost => input::handle_focus_lost(app),
                _ => {}
            }
        }
        app.tick(Instant::now());

        // 5. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
