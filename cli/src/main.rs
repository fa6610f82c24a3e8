//! Cinegraph CLI: crawl a movie catalog into a graph and ask it for recommendations
//!
//! Talks to Neo4j over Bolt, or to an in-process graph with `--embedded`.

use anyhow::{bail, Context};
use clap::{ArgAction, Args, Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};

use cinegraph::config::{DEFAULT_SEED_URL, ENV_DATABASE, ENV_PASSWORD, ENV_URI, ENV_USER};
use cinegraph::{
    CatalogCrawler, ConfigError, CrawlConfig, EmbeddedClient, GraphStoreClient, IngestReport, Ingestor,
    JsonLinesSink, MovieUpsertService, Neo4jClient, SimilarMovie, SimilarityQueryService, StoreConfig,
};

const PROMPT: &str = "Pick a movie and the top 5 similar movies will be recommended:";

#[derive(Parser)]
#[command(name = "cinegraph", version, about = "Movie catalog crawler and graph recommender")]
struct Cli {
    /// Neo4j Bolt URI
    #[arg(long, global = true, env = ENV_URI)]
    uri: Option<String>,

    /// Neo4j user
    #[arg(long, global = true, env = ENV_USER)]
    user: Option<String>,

    /// Neo4j password
    #[arg(long, global = true, env = ENV_PASSWORD, hide_env_values = true)]
    password: Option<String>,

    /// Neo4j database (server default if omitted)
    #[arg(long, global = true, env = ENV_DATABASE)]
    database: Option<String>,

    /// Use an in-memory graph instead of Neo4j
    #[arg(long, global = true)]
    embedded: bool,

    /// More log output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the catalog, store every movie, then recommend
    Crawl(CrawlArgs),
    /// Store movies from a JSON file of raw records
    Ingest {
        /// JSON array of raw records
        #[arg(long)]
        input: PathBuf,

        /// Also write stored movies here as JSON lines
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Recommend movies similar to NAME
    Similar {
        name: String,
    },
    /// Show node and relationship counts
    Status,
    /// Ping the store
    Ping,
}

#[derive(Args)]
struct CrawlArgs {
    /// Catalog page to start from
    #[arg(long, default_value = DEFAULT_SEED_URL)]
    seed: String,

    /// Follow at most this many movies
    #[arg(long)]
    max_movies: Option<usize>,

    /// Delay before each movie page request, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Also write stored movies here as JSON lines
    #[arg(long)]
    out: Option<PathBuf>,

    /// Recommend for this movie instead of prompting
    #[arg(long, conflicts_with = "no_prompt")]
    similar: Option<String>,

    /// Skip the recommendation prompt
    #[arg(long)]
    no_prompt: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let client = match connect(&cli).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Crawl(args) => run_crawl(&client, args, cli.format).await,
        Commands::Ingest { input, out } => run_ingest(&client, &input, out.as_deref(), cli.format).await,
        Commands::Similar { name } => run_similar(&client, &name, cli.format).await,
        Commands::Status => run_status(&client, cli.format).await,
        Commands::Ping => run_ping(&client).await,
    };

    // One connection per run, closed once every command is done with it
    client.close().await;

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Store settings from flags/env; the same rules as `StoreConfig::from_env`
fn store_config(cli: &Cli) -> Result<StoreConfig, ConfigError> {
    StoreConfig::from_lookup(|key| match key {
        ENV_URI => cli.uri.clone(),
        ENV_USER => cli.user.clone(),
        ENV_PASSWORD => cli.password.clone(),
        ENV_DATABASE => cli.database.clone(),
        _ => None,
    })
}

async fn connect(cli: &Cli) -> anyhow::Result<Arc<dyn GraphStoreClient>> {
    if cli.embedded {
        info!("using in-memory graph");
        return Ok(Arc::new(EmbeddedClient::new()));
    }
    let config = store_config(cli)?;
    let client = Neo4jClient::connect(&config).await?;
    Ok(Arc::new(client))
}

fn ingestor(client: &Arc<dyn GraphStoreClient>, out: Option<&Path>) -> anyhow::Result<Ingestor> {
    let ingestor = Ingestor::new(MovieUpsertService::new(client.clone()));
    Ok(match out {
        Some(path) => {
            let sink = JsonLinesSink::create(path).with_context(|| format!("cannot create {}", path.display()))?;
            ingestor.with_sink(Box::new(sink))
        }
        None => ingestor,
    })
}

async fn run_crawl(
    client: &Arc<dyn GraphStoreClient>,
    args: CrawlArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let defaults = CrawlConfig::default();
    let config = CrawlConfig {
        seed_url: args.seed,
        delay: args.delay_ms.map(Duration::from_millis).unwrap_or(defaults.delay),
        max_movies: args.max_movies,
        ..defaults
    };
    let crawler = CatalogCrawler::new(config)?;

    let mut ingestor = ingestor(client, args.out.as_deref())?;
    ingestor.ingest_crawl(&crawler).await?;
    let report = ingestor.finish()?;
    print_report(&report, format)?;
    check_report(&report)?;

    // Recommendations only run once every record has been written
    let name = match args.similar {
        Some(name) => Some(name),
        None if args.no_prompt => None,
        None => prompt()?,
    };
    if let Some(name) = name {
        run_similar(client, &name, format).await?;
    }
    Ok(())
}

async fn run_ingest(
    client: &Arc<dyn GraphStoreClient>,
    input: &Path,
    out: Option<&Path>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(input).with_context(|| format!("cannot read {}", input.display()))?;

    let mut ingestor = ingestor(client, out)?;
    ingestor
        .ingest_json(&text)
        .await
        .with_context(|| format!("{} is not a JSON array", input.display()))?;
    let report = ingestor.finish()?;
    print_report(&report, format)?;
    check_report(&report)
}

fn check_report(report: &IngestReport) -> anyhow::Result<()> {
    if report.all_failed() {
        bail!("none of the {} movies could be stored", report.failed);
    }
    Ok(())
}

fn prompt() -> anyhow::Result<Option<String>> {
    println!("{}", PROMPT);
    std::io::stdout().flush()?;

    let mut line = String::new();
    if std::io::stdin().read_line(&mut line)? == 0 {
        return Ok(None); // EOF
    }
    let name = line.trim();
    Ok((!name.is_empty()).then(|| name.to_string()))
}

async fn run_similar(
    client: &Arc<dyn GraphStoreClient>,
    name: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let similar = SimilarityQueryService::new(client.clone()).find_similar(name).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&similar)?);
        }
        OutputFormat::Table => {
            if similar.is_empty() {
                println!("No similar movies found for \"{}\"", name);
            }
            for movie in &similar {
                println!("{}", format_similar(movie));
            }
        }
    }
    Ok(())
}

fn format_similar(movie: &SimilarMovie) -> String {
    format!("{} ({}) - {}%", movie.name, movie.year, movie.score)
}

fn print_report(report: &IngestReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Stored", "Rejected", "Failed", "Fetch failed"]);
            table.add_row(vec![
                report.stored.to_string(),
                report.rejected.to_string(),
                report.failed.to_string(),
                report.fetch_failed.to_string(),
            ]);
            println!("{}", table);
        }
    }
    Ok(())
}

async fn run_status(client: &Arc<dyn GraphStoreClient>, format: OutputFormat) -> anyhow::Result<()> {
    let stats = client.status().await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Table => {
            println!("Nodes:   {}", stats.nodes);
            println!("Edges:   {}", stats.edges);
        }
    }
    Ok(())
}

async fn run_ping(client: &Arc<dyn GraphStoreClient>) -> anyhow::Result<()> {
    client.ping().await?;
    println!("PONG");
    Ok(())
}
