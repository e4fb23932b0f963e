use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::Input;
use tracing_subscriber::EnvFilter;

use agromitra::agent::{
    FarmField, FarmingBackend, HttpBackend, LocalBackend, Preferences, UserContext,
};
use agromitra::api::{ApiServer, ApiState};
use agromitra::db::{self, FarmRepo};
use agromitra::disease::DiseaseDetector;
use agromitra::farming::{KnowledgeBase, WeatherClient};
use agromitra::scraper::MarketScraper;
use agromitra::soil::SoilGridsClient;
use agromitra::{AgentReply, Config, Language, VoiceAgent};

/// AgroMitra - farming assistant service
#[derive(Parser)]
#[command(name = "agromitra", version, about)]
struct Cli {
    /// Port to listen on (overrides config)
    #[arg(long, global = true, env = "AGROMITRA_PORT")]
    port: Option<u16>,

    /// Farming backend the assistant talks to (overrides config)
    #[arg(long, global = true, env = "AGROMITRA_BACKEND_URL")]
    backend_url: Option<String>,

    /// Assistant language code (en, hi, es)
    #[arg(short, long, global = true, env = "AGROMITRA_LANGUAGE")]
    language: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server (default)
    Serve,
    /// Ask the assistant a single question
    Ask {
        /// What to ask
        text: String,
        /// Answer in-process instead of calling the backend over HTTP
        #[arg(long)]
        local: bool,
    },
    /// Talk to the assistant interactively
    Chat {
        /// Answer in-process instead of calling the backend over HTTP
        #[arg(long)]
        local: bool,
    },
    /// Run the simulated market price scrape
    Scrape {
        /// Records to print
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Look up soil properties for a coordinate
    Soil {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Diagnose a plant image
    Diagnose {
        /// Path to a JPEG, PNG or WebP image
        image: PathBuf,
    },
    /// Manage stored farms
    Farms {
        #[command(subcommand)]
        action: FarmsCommand,
    },
}

#[derive(Subcommand)]
enum FarmsCommand {
    /// List a user's active farms
    List {
        /// User id (defaults to the configured user)
        #[arg(short, long)]
        user: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,agromitra=info",
        1 => "info,agromitra=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }
    if let Some(code) = cli.language.as_deref() {
        config.agent.language = Language::from_code(code)
            .with_context(|| format!("unsupported language: {code}"))?;
    }
    tracing::debug!(?config, "loaded configuration");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Ask { text, local } => ask(&config, &text, local).await,
        Command::Chat { local } => chat(&config, local).await,
        Command::Scrape { limit } => scrape(limit).await,
        Command::Soil { lat, lon } => soil(&config, lat, lon).await,
        Command::Diagnose { image } => diagnose(&config, &image).await,
        Command::Farms {
            action: FarmsCommand::List { user },
        } => list_farms(&config, user.as_deref()),
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let pool = db::init(config.database_path())?;
    let state = Arc::new(ApiState::new(&config, pool));

    tracing::info!(
        port = config.server.port,
        data_dir = %config.data_dir.display(),
        "starting agromitra"
    );

    ApiServer::new(state, config.server.host.clone(), config.server.port)
        .run()
        .await?;
    Ok(())
}

/// Assistant over the HTTP backend, or in-process over the local database
fn build_agent(config: &Config, local: bool) -> anyhow::Result<VoiceAgent> {
    let defaults = &config.agent;
    let preferences = Preferences {
        language: defaults.language,
        location: defaults.location.clone(),
        farming_type: defaults.farming_type.clone(),
    };

    let (backend, farm_fields): (Arc<dyn FarmingBackend>, Vec<FarmField>) = if local {
        let farms = FarmRepo::new(db::init(config.database_path())?);
        let fields = farms
            .list_active(&defaults.user_id)?
            .iter()
            .map(FarmField::from)
            .collect();
        let weather = WeatherClient::new(
            config.upstream.openweather_url.clone(),
            config.api_keys.openweather.clone(),
        );
        let backend = LocalBackend::new(weather, Arc::new(KnowledgeBase::default()), farms);
        (Arc::new(backend), fields)
    } else {
        (Arc::new(HttpBackend::new(config.backend_url.clone())), Vec::new())
    };

    let context = UserContext {
        farm_fields,
        preferences,
        recent_queries: Vec::new(),
    };
    Ok(VoiceAgent::new(context, backend).with_user_id(defaults.user_id.clone()))
}

fn print_reply(reply: &AgentReply) {
    println!("{}", reply.response);
    if let Some(target) = reply.redirect_to.as_deref().filter(|_| reply.should_redirect) {
        println!("  -> open {target}");
    }
}

async fn ask(config: &Config, text: &str, local: bool) -> anyhow::Result<()> {
    let mut agent = build_agent(config, local)?;
    let reply = agent.process_user_input(text).await;
    print_reply(&reply);
    Ok(())
}

async fn chat(config: &Config, local: bool) -> anyhow::Result<()> {
    let mut agent = build_agent(config, local)?;
    println!("AgroMitra assistant. Type 'exit' to quit.\n");

    loop {
        let line: String = Input::new()
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()?;

        let line = line.trim();
        if matches!(line, "exit" | "quit") {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let reply = agent.process_user_input(line).await;
        print_reply(&reply);
        println!();
    }

    Ok(())
}

async fn scrape(limit: usize) -> anyhow::Result<()> {
    let scraper = MarketScraper::new();
    let result = scraper
        .scrape_market_prices(|p| println!("[{:3}%] {}", p.percent, p.status))
        .await?;

    println!(
        "\n{} records from {} in {} ms\n",
        result.total_records,
        result.scraped_from.join(", "),
        result.scraping_time
    );
    for record in result.data.iter().take(limit) {
        println!(
            "{:<12} {:<22} {:<28} {:>6} {} ({:+.1}%)",
            record.commodity,
            record.quality,
            record.market,
            record.current_price,
            record.unit,
            record.change_percent
        );
    }
    Ok(())
}

async fn soil(config: &Config, lat: f64, lon: f64) -> anyhow::Result<()> {
    let client = SoilGridsClient::new(config.upstream.soilgrids_url.clone());
    let report = client.report(lat, lon).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

async fn diagnose(config: &Config, image: &Path) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("failed to read {}", image.display()))?;

    let detector = DiseaseDetector::new(&config.api_keys, &config.upstream);
    if !detector.has_providers() {
        tracing::warn!("no disease providers configured, showing a sample result");
    }

    let result = detector.detect(&bytes, mime_for(image)).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn list_farms(config: &Config, user: Option<&str>) -> anyhow::Result<()> {
    let user_id = user.unwrap_or(&config.agent.user_id);
    let farms = FarmRepo::new(db::init(config.database_path())?);
    let list = farms.list_active(user_id)?;

    if list.is_empty() {
        println!("No farms for {user_id}");
        return Ok(());
    }

    for farm in &list {
        println!(
            "{}  {:<24} {:>8.2} acres  {:<12} {:<12} ({:.5}, {:.5})",
            farm.id,
            farm.name,
            farm.total_area,
            farm.crop_type,
            farm.soil_type,
            farm.center.lat,
            farm.center.lng
        );
    }
    Ok(())
}
