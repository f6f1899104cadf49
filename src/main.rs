use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use juice_itinerary::dom::Document;
use juice_itinerary::export::{ExportEngine, ExportFormat};
use juice_itinerary::loader::ScheduleLoader;
use juice_itinerary::view::{activity_details, Action, ViewMode, ViewState, SCHEDULE_CSS, SCHEDULE_ROOT_ID};
use juice_itinerary::ItineraryConfig;

#[derive(Parser, Debug)]
#[command(
    name = "juice-itinerary",
    version,
    about = "Juice Cafe itinerary calendar with PNG and PDF export"
)]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the itinerary feed URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// `week` or `day`
    #[arg(long, global = true, default_value = "week")]
    view: ViewMode,

    /// Day shown in day view, counting from 1
    #[arg(long, global = true)]
    day: Option<usize>,

    /// Directory exported files are written to
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the calendar as text
    Show {
        /// Print the details of one activity instead
        #[arg(long)]
        activity: Option<String>,
    },
    /// Print the schedule markup
    Html,
    /// Export the calendar as `png` or `pdf`
    Export {
        #[arg(long, default_value = "png")]
        format: ExportFormat,
    },
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow!("invalid RUST_LOG filter: {}", e))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {}", e))
}

fn build_config(cli: &Cli) -> Result<ItineraryConfig> {
    let mut config = match &cli.config {
        Some(path) => ItineraryConfig::load(path)?,
        None => ItineraryConfig::default(),
    };
    if let Some(url) = &cli.url {
        config.source_url = url.clone();
    }
    if let Some(out) = &cli.out {
        config.output_dir = out.clone();
    }
    config.validate()?;
    Ok(config)
}

async fn export(config: &ItineraryConfig, state: &mut ViewState, format: ExportFormat) -> Result<()> {
    let html = state.render_html()?;
    let mut doc = Document::from_html(&html, SCHEDULE_CSS);
    let root = doc
        .element_by_id(SCHEDULE_ROOT_ID)
        .context("schedule markup has no export root")?;

    let engine = ExportEngine::new(config);
    state.update(Action::ExportStarted);
    let result = engine.export(&mut doc, root, format).await;
    state.update(Action::ExportFinished {
        format,
        succeeded: result.is_ok(),
    });
    if let Some(alert) = &state.alert {
        eprintln!("{}", alert);
    }

    let artifact = result?;
    let path = artifact.save_to(&config.output_dir)?;
    println!("{}  {}", artifact.sha256_hex(), path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let loader = ScheduleLoader::new(config.clone())?;
    let mut state = ViewState::new();
    let loaded = loader.load().await.map(|schedule| schedule.days);
    state.update(Action::Loaded(loaded));
    if let Some(message) = &state.error {
        bail!("{}", message);
    }

    if cli.view == ViewMode::Day {
        state.update(Action::ToggleViewMode);
    }
    if let Some(day) = cli.day {
        state.update(Action::SelectDay(day.saturating_sub(1)));
    }

    match cli.command {
        Command::Show { activity: Some(name) } => {
            let activity = state
                .days
                .iter()
                .flat_map(|d| &d.activities)
                .find(|a| a.activity_name.eq_ignore_ascii_case(&name))
                .cloned()
                .with_context(|| format!("no activity named {:?}", name))?;
            state.update(Action::OpenActivity(activity));
            if let Some(selected) = &state.selected_activity {
                print!("{}", activity_details(selected));
            }
            state.update(Action::CloseActivity);
        }
        Command::Show { activity: None } => print!("{}", state.render_text()),
        Command::Html => println!("{}", state.render_html()?),
        Command::Export { format } => export(&config, &mut state, format).await?,
    }
    Ok(())
}
