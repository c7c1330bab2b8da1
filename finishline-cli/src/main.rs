//! Finishline CLI: estimate where a goal pace would place in a past race.
//!
//! Commands:
//! - `races`: list races and the distances each one has results for
//! - `estimate`: placement, percentiles and field breakdown for a pace
//! - `histogram`: the finish-time distribution as text, candidate bin marked
//! - `compare`: move the compare marker (by time or by pixels) and print the live label

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use finishline_core::data::{self, DataSource};
use finishline_core::{
    compute_candidate, format_clock, parse_clock, synthetic, CandidateResult, ChartState,
    DragController, EstimatorConfig, EventCatalog, EventType, Gender, PointerPhase, PointerSample,
    RaceSelection, ResultTable, TieRule,
};

#[derive(Parser)]
#[command(
    name = "finishline",
    version,
    about = "Finishline: race placement and percentile estimator"
)]
struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    /// Override the configured histogram bin count.
    #[arg(long, global = true)]
    bins: Option<usize>,

    /// Override the configured tie rule.
    #[arg(long, global = true, value_enum)]
    tie_rule: Option<TieRuleArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List races and their available distances.
    Races {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Estimate placement for a goal pace.
    Estimate {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Print the result as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the finish-time histogram with the candidate bin marked.
    Histogram {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Width of the longest bar, in characters.
        #[arg(long, default_value_t = 50)]
        width: usize,
    },
    /// Move the compare marker and print the live label.
    Compare {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Compare against this finish time (H:MM:SS or MM:SS).
        #[arg(long, conflicts_with = "offset_px")]
        at: Option<String>,

        /// Drag distance in pixels from the current marker (negative = faster).
        #[arg(long, allow_hyphen_values = true)]
        offset_px: Option<f64>,

        /// Overlay width the drag distance is measured against.
        #[arg(long, default_value_t = 800.0)]
        overlay_width: f64,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Results CSV: a file path or an http(s) URL. Defaults to `source` from the config.
    #[arg(long)]
    source: Option<String>,

    /// Use a generated demo field instead of real results.
    #[arg(long, default_value_t = false, conflicts_with = "source")]
    demo: bool,

    /// Seed for the demo field.
    #[arg(long, default_value_t = 2024)]
    seed: u64,
}

#[derive(Args)]
struct SelectionArgs {
    /// Race name, as listed by `races`.
    #[arg(long)]
    race: String,

    /// Distance. Defaults to the full marathon when the race has one.
    #[arg(long, value_enum)]
    distance: Option<DistanceArg>,

    #[arg(long, value_enum)]
    gender: GenderArg,

    #[arg(long)]
    age: String,

    /// Goal pace in minutes per mile: `8:30` or `8.5`.
    #[arg(long)]
    pace: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum DistanceArg {
    Full,
    Half,
}

#[derive(Clone, Copy, ValueEnum)]
enum GenderArg {
    M,
    F,
}

#[derive(Clone, Copy, ValueEnum)]
enum TieRuleArg {
    Unified,
    Legacy,
}

impl From<DistanceArg> for EventType {
    fn from(d: DistanceArg) -> Self {
        match d {
            DistanceArg::Full => EventType::Full,
            DistanceArg::Half => EventType::Half,
        }
    }
}

impl From<GenderArg> for Gender {
    fn from(g: GenderArg) -> Self {
        match g {
            GenderArg::M => Gender::M,
            GenderArg::F => Gender::F,
        }
    }
}

impl From<TieRuleArg> for TieRule {
    fn from(t: TieRuleArg) -> Self {
        match t {
            TieRuleArg::Unified => TieRule::Unified,
            TieRuleArg::Legacy => TieRule::Legacy,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Races { source } => run_races(&source, &config),
        Commands::Estimate {
            source,
            selection,
            json,
        } => run_estimate(&source, &selection, json, &config),
        Commands::Histogram {
            source,
            selection,
            width,
        } => run_histogram(&source, &selection, width, &config),
        Commands::Compare {
            source,
            selection,
            at,
            offset_px,
            overlay_width,
        } => run_compare(&source, &selection, at, offset_px, overlay_width, &config),
    }
}

fn load_config(cli: &Cli) -> Result<EstimatorConfig> {
    let mut config = match &cli.config {
        Some(path) => EstimatorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EstimatorConfig::default(),
    };
    if let Some(bins) = cli.bins {
        config.bins = bins;
    }
    if let Some(rule) = cli.tie_rule {
        config.tie_rule = rule.into();
    }
    config.validate()?;
    debug!(?config, "configuration resolved");
    Ok(config)
}

fn load_table(args: &SourceArgs, config: &EstimatorConfig) -> Result<ResultTable> {
    if args.demo {
        info!(seed = args.seed, "using generated demo field");
        return Ok(synthetic::demo_table(args.seed));
    }
    let Some(spec) = args.source.as_deref().or(config.source.as_deref()) else {
        bail!("no results source: pass --source <path|url>, set `source` in the config, or use --demo");
    };
    let source = DataSource::parse(spec);
    let report = data::load(&source).with_context(|| format!("loading results from {source}"))?;
    if report.dropped() > 0 {
        info!(
            dropped = report.dropped(),
            kept = report.rows.len(),
            "some result rows were skipped"
        );
    }
    Ok(report.rows)
}

fn build_selection(args: &SelectionArgs, table: &ResultTable) -> Result<RaceSelection> {
    let catalog = EventCatalog::from_rows(table);
    let Some(entry) = catalog.get(&args.race) else {
        let known: Vec<&str> = catalog.names().collect();
        bail!("unknown race '{}'. Known races: {}", args.race, known.join(", "));
    };
    let distance = match args.distance {
        Some(d) => d.into(),
        None => catalog
            .default_distance(&entry.name)
            .context("race has no distance with results")?,
    };
    let selection = RaceSelection::from_inputs(
        &entry.name,
        distance,
        args.gender.into(),
        &args.age,
        &args.pace,
    )?;
    Ok(selection)
}

fn calculate(
    source: &SourceArgs,
    selection: &SelectionArgs,
    config: &EstimatorConfig,
) -> Result<CandidateResult> {
    let table = load_table(source, config)?;
    let selection = build_selection(selection, &table)?;
    Ok(compute_candidate(&table, &selection, config.tie_rule)?)
}

// ── Commands ─────────────────────────────────────────────────────────

fn run_races(source: &SourceArgs, config: &EstimatorConfig) -> Result<()> {
    let table = load_table(source, config)?;
    let catalog = EventCatalog::from_rows(&table);
    if catalog.is_empty() {
        println!("No races found.");
        return Ok(());
    }
    let width = catalog.names().map(str::len).max().unwrap_or(0);
    for race in catalog.races() {
        let distances: Vec<&str> = race.distances().iter().map(|d| d.label()).collect();
        println!("{:<width$}  {}", race.name, distances.join(", "));
    }
    Ok(())
}

fn run_estimate(
    source: &SourceArgs,
    selection: &SelectionArgs,
    json: bool,
    config: &EstimatorConfig,
) -> Result<()> {
    let result = calculate(source, selection, config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    print_result(&result);
    Ok(())
}

fn print_result(result: &CandidateResult) {
    println!("{}", result.summary_sentence());
    println!();

    println!("=== Placement ===");
    println!(
        "  Overall:   #{} out of {}  Top {:.1}%",
        result.overall.place,
        result.overall.total,
        result.overall.top_percent()
    );
    println!(
        "  Gender:    {} out of {}  {}",
        result.gender.place_text(),
        result.gender.total(),
        result.gender.top_text()
    );
    println!(
        "  Division:  {} {}  {}",
        result.division.place_text(),
        result.division_label,
        result.division.top_text()
    );

    let b = &result.breakdown;
    print_card("Age", &b.age_card());
    print_card("Gender", &b.gender_card());
    print_card("Top divisions", &b.division_card());
    print_card("Finish time", &b.finish_time_card());
    print_card("Pace", &b.pace_card());
}

fn print_card(title: &str, lines: &[String]) {
    println!();
    println!("=== {title} ===");
    for line in lines {
        println!("  {line}");
    }
}

fn run_histogram(
    source: &SourceArgs,
    selection: &SelectionArgs,
    width: usize,
    config: &EstimatorConfig,
) -> Result<()> {
    let result = calculate(source, selection, config)?;
    let chart = ChartState::from_result(&result, config);
    let hist = &chart.histogram;
    if hist.is_empty() {
        println!("No finish times to chart.");
        return Ok(());
    }

    let max = hist.max_count().max(1);
    let marked = hist.bin_of(chart.base_time);
    for (i, (edge, count)) in hist.edges.iter().zip(&hist.counts).enumerate() {
        let bar_len = count * width / max;
        let marker = if marked == Some(i) { "  <- you" } else { "" };
        println!(
            "{:>8} |{:<width$}| {:>5}{marker}",
            format_clock(*edge),
            "#".repeat(bar_len),
            count,
        );
    }
    println!(
        "{} of {} finishers charted; slowest {:.0}% off the chart.",
        hist.total(),
        chart.times().len(),
        (1.0 - config.trim_quantile) * 100.0
    );
    if marked.is_none() {
        println!("Your time {} is outside the charted range.", format_clock(chart.base_time));
    }
    Ok(())
}

fn run_compare(
    source: &SourceArgs,
    selection: &SelectionArgs,
    at: Option<String>,
    offset_px: Option<f64>,
    overlay_width: f64,
    config: &EstimatorConfig,
) -> Result<()> {
    let result = calculate(source, selection, config)?;
    let chart = ChartState::from_result(&result, config);
    let mut controller = DragController::new(chart, overlay_width, config);

    let label = match (at, offset_px) {
        (Some(at), _) => {
            let t = parse_clock(&at).with_context(|| format!("parsing --at '{at}'"))?;
            controller.set_compare_time(f64::from(t)).cloned()
        }
        (None, Some(dx)) => {
            let start = overlay_width / 2.0;
            controller.on_pointer(PointerSample::new(start, PointerPhase::Down));
            controller.on_pointer(PointerSample::new(start + dx, PointerPhase::Move));
            controller
                .on_pointer(PointerSample::new(start + dx, PointerPhase::Up))
                .cloned()
        }
        (None, None) => bail!("pass --at <time> or --offset-px <px>"),
    };
    let Some(label) = label else {
        bail!("no compare label produced");
    };

    println!("Base time:    {}", format_clock(result.finish_time_seconds));
    println!("Compare time: {}", label.clock_text());
    println!("{label}");
    Ok(())
}
