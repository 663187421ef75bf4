use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use casemap::config::{ConfigLoader, ResolvedConfig};
use casemap::domain::{CalendarDate, parse_calendar_date};
use casemap::error::{CaseMapError, PipelineError};
use casemap::fetch::DailyReportHttpClient;
use casemap::geocode::{PlacesHttpClient, lookup};
use casemap::output::{HumanOutput, JsonOutput, MapFeed, OutputMode};
use casemap::pipeline::{Clock, Pipeline, PipelineResult, PipelineSettings, SystemClock};
use casemap::trigger::IntervalTrigger;
use casemap::viewport::Viewport;

#[derive(Parser)]
#[command(name = "casemap")]
#[command(about = "Daily case counts as map markers, with fallback to earlier reports")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<String>,

    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Fetch the latest report and print its markers")]
    Fetch(FetchArgs),
    #[command(about = "Refresh the markers on a fixed interval")]
    Watch(WatchArgs),
    #[command(about = "Look up a place by name")]
    Search(SearchArgs),
}

#[derive(Args, Clone)]
struct FetchArgs {
    #[arg(long)]
    date: Option<String>,

    #[arg(long)]
    max_lookback: Option<u32>,

    #[arg(long, default_value_t = 10)]
    top: usize,
}

#[derive(Args)]
struct WatchArgs {
    #[arg(long, default_value_t = 3600)]
    interval_secs: u64,

    #[arg(long)]
    max_lookback: Option<u32>,

    #[arg(long, default_value_t = 10)]
    top: usize,
}

#[derive(Args)]
struct SearchArgs {
    query: String,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<CaseMapError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &CaseMapError) -> u8 {
    match error {
        CaseMapError::Pipeline(PipelineError::NoDataAvailable { .. })
        | CaseMapError::Pipeline(PipelineError::MalformedPayload { .. })
        | CaseMapError::PlaceWithoutCoordinates(_) => 2,
        CaseMapError::Pipeline(PipelineError::Transient { .. })
        | CaseMapError::ReportHttp(_)
        | CaseMapError::PlacesHttp(_)
        | CaseMapError::PlacesStatus { .. }
        | CaseMapError::PlacesRejected(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    let config = ConfigLoader::resolve(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Fetch(args)) => run_fetch(args, &config, output_mode),
        Some(Commands::Watch(args)) => run_watch(args, &config, output_mode),
        Some(Commands::Search(args)) => run_search(args, &config, output_mode),
        None => run_fetch(
            FetchArgs {
                date: None,
                max_lookback: None,
                top: 10,
            },
            &config,
            output_mode,
        ),
    }
}

fn build_pipeline(
    config: &ResolvedConfig,
    max_lookback: Option<u32>,
) -> miette::Result<Pipeline<DailyReportHttpClient>> {
    let mut settings = PipelineSettings::from(config);
    if let Some(max_lookback) = max_lookback {
        if max_lookback == 0 {
            return Err(CaseMapError::InvalidConfig(
                "--max-lookback must be at least 1".to_string(),
            )
            .into());
        }
        settings.max_lookback = max_lookback;
    }
    let fetcher = DailyReportHttpClient::new(config.source_url_template.clone())?;
    Ok(Pipeline::new(fetcher, SystemClock, settings))
}

fn run_fetch(
    args: FetchArgs,
    config: &ResolvedConfig,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let pipeline = build_pipeline(config, args.max_lookback)?;
    let start = args.date.as_deref().map(parse_calendar_date).transpose()?;

    let result = match start {
        Some(start) => pipeline.run_from(start),
        None => pipeline.run(),
    };
    render(&result, pipeline.today(), config, output_mode, args.top)?;
    match &result.error {
        Some(error) => Err(CaseMapError::Pipeline(error.clone()).into()),
        None => Ok(()),
    }
}

fn run_watch(
    args: WatchArgs,
    config: &ResolvedConfig,
    output_mode: OutputMode,
) -> miette::Result<()> {
    if args.interval_secs == 0 {
        return Err(miette::Report::msg("--interval-secs must be at least 1"));
    }
    let pipeline = Arc::new(build_pipeline(config, args.max_lookback)?);
    let trigger = IntervalTrigger::new(Duration::from_secs(args.interval_secs));

    let top = args.top;
    let listener_config = config.clone();
    let clock = SystemClock;
    pipeline.subscribe(&trigger, move |result| {
        if let Err(err) = render(&result, clock.today(), &listener_config, output_mode, top) {
            tracing::warn!(error = %err, "watch.render_failed");
        }
    });

    let result = pipeline.run();
    render(&result, pipeline.today(), config, output_mode, top)?;
    loop {
        thread::park();
    }
}

fn run_search(
    args: SearchArgs,
    config: &ResolvedConfig,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let api_key = config
        .places_api_key
        .clone()
        .ok_or(CaseMapError::MissingPlacesKey)?;
    let client = PlacesHttpClient::new(api_key)?;
    let places = lookup(&client, &args.query)?;
    match output_mode {
        OutputMode::Json => JsonOutput::print_places(&places).into_diagnostic(),
        OutputMode::Human => {
            HumanOutput::print_places(&places);
            Ok(())
        }
    }
}

fn render(
    result: &PipelineResult,
    today: CalendarDate,
    config: &ResolvedConfig,
    output_mode: OutputMode,
    top: usize,
) -> miette::Result<()> {
    let viewport = Viewport::world(config.default_center);
    match output_mode {
        OutputMode::Json => {
            JsonOutput::print_feed(&MapFeed::new(result, viewport, today)).into_diagnostic()
        }
        OutputMode::Human => {
            HumanOutput::print_feed(result, &viewport, today, top);
            Ok(())
        }
    }
}
