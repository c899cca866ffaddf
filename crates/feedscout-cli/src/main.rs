use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use feedscout_crawler::{
    load_keywords, CampaignRunner, CrawlerConfig, DedupLedger, FeedExtractor, OnError,
};
use feedscout_snapshot::{posts_in_document, SnapshotSession};

mod writer;

use writer::{OutputFormat, OutputWriter};

const DEFAULT_LOG: &str = "feedscout_crawler=info,feedscout_snapshot=warn,feedscout=info";

/// Keyword timeline crawler
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: SubCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum SubCommand {
    #[command(name = "crawl")]
    Crawl(CrawlArgs),
    #[command(name = "extract")]
    Extract(ExtractArgs),
    #[command(hide = true)]
    Completion,
}

/// Collect the latest posts of each keyword along with their replies
#[derive(Debug, clap::Args)]
pub struct CrawlArgs {
    /// Path to the keywords file, one keyword per line
    #[arg(long, short)]
    pub keywords: PathBuf,
    /// Path to the yaml manifest of captured pages to replay
    #[arg(long, short)]
    pub snapshot: PathBuf,
    /// Directory holding previous outputs, new ones are written there too
    #[arg(long, short, default_value = "data/output")]
    pub output_dir: PathBuf,
    /// Format of the posts file
    #[arg(value_enum, long, short, default_value = "json")]
    pub format: OutputFormat,
    /// Optional default crawler yaml configuration file
    #[arg(env = "FEEDSCOUT_CRAWLER_CONFIG", long)]
    pub crawler_config: Option<PathBuf>,
    /// Override crawler's number of new posts wanted per keyword
    #[arg(long)]
    pub target_count: Option<usize>,
    /// Override crawler's pagination time budget, in seconds
    #[arg(long)]
    pub timeout: Option<f32>,
    /// Don't open threads to collect replies
    #[arg(long)]
    pub no_replies: bool,
    /// Override crawler's keyword error handling strategy
    #[arg(value_enum, long)]
    pub on_keyword_error: Option<OnError>,
    /// When quiet no logs are outputted
    #[arg(long, short)]
    pub quiet: bool,
}

impl TryFrom<&CrawlArgs> for CrawlerConfig {
    type Error = anyhow::Error;

    fn try_from(args: &CrawlArgs) -> Result<Self, Self::Error> {
        let mut conf = if let Some(path) = &args.crawler_config {
            let file = fs_err::File::open(path)?;
            serde_yaml::from_reader(file)
                .with_context(|| format!("Invalid crawler config {}", path.display()))?
        } else {
            CrawlerConfig::default()
        };
        if let Some(target_count) = args.target_count {
            conf.target_count = target_count;
        }
        if let Some(timeout) = args.timeout {
            conf.timeout = timeout;
        }
        if args.no_replies {
            conf.fetch_replies = false;
        }
        if let Some(on_keyword_error) = args.on_keyword_error {
            conf.on_keyword_error = on_keyword_error;
        }
        Ok(conf)
    }
}

pub fn crawl(args: CrawlArgs) -> anyhow::Result<()> {
    let config = CrawlerConfig::try_from(&args)?;
    let keywords = load_keywords(&args.keywords)?;

    let ledger = DedupLedger::load(&args.output_dir)?;
    let session = SnapshotSession::from_manifest(&args.snapshot, &config.search_url)?;

    let mut runner = CampaignRunner::new(config, session, ledger)?;
    let output = runner.run(&keywords);
    output.report.log_summary();

    let writer = OutputWriter::new(&args.output_dir);
    writer.write_posts(&output.posts, args.format)?;
    let report = writer.write_report(&output.report)?;
    log::info!("Saved report to {}", report.display());

    match output.aborted {
        Some(reason) => anyhow::bail!("Campaign aborted: {reason}"),
        None => Ok(()),
    }
}

/// Extract posts of a single page and print them as json to stdout
#[derive(Debug, clap::Args)]
#[command(group = clap::ArgGroup::new("page").required(true))]
pub struct ExtractArgs {
    /// A local html page to extract
    #[arg(group = "page", long)]
    pub file: Option<PathBuf>,
    /// A distant html page to extract
    #[arg(group = "page", long)]
    pub url: Option<String>,
    /// Keyword to tag extracted posts with
    #[arg(long, short)]
    pub keyword: Option<String>,
    /// Optional default crawler yaml configuration file
    #[arg(env = "FEEDSCOUT_CRAWLER_CONFIG", long)]
    pub crawler_config: Option<PathBuf>,
}

pub fn extract(args: ExtractArgs) -> anyhow::Result<()> {
    let config = match &args.crawler_config {
        Some(path) => serde_yaml::from_reader(fs_err::File::open(path)?)
            .with_context(|| format!("Invalid crawler config {}", path.display()))?,
        None => CrawlerConfig::default(),
    };
    let page = if let Some(url) = &args.url {
        reqwest::blocking::get(url)?.error_for_status()?.text()?
    } else if let Some(path) = &args.file {
        fs_err::read_to_string(path)?
    } else {
        anyhow::bail!("Missing `url` or `file`");
    };

    let extractor = FeedExtractor::new(&config)?;
    let mut posts = posts_in_document(&page, &extractor)?;
    if let Some(keyword) = &args.keyword {
        posts = posts.into_iter().map(|p| p.with_keyword(keyword)).collect();
    }
    log::info!("Extracted {} posts", posts.len());

    serde_json::to_writer_pretty(io::stdout(), &posts)?;
    println!();
    Ok(())
}

fn init_logger() {
    let env = env_logger::Env::default().default_filter_or(DEFAULT_LOG);
    env_logger::Builder::from_env(env).init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.cmd {
        SubCommand::Crawl(args) => {
            if !args.quiet {
                init_logger();
            }
            crawl(args)
        }
        SubCommand::Extract(args) => {
            init_logger();
            extract(args)
        }
        SubCommand::Completion => {
            generate(Shell::Bash, &mut Args::command(), "feedscout", &mut io::stdout());
            Ok(())
        }
    }
}
