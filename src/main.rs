mod config;
mod markdown;
mod openai;
mod research;
mod shell;
mod tavily;

pub const USER_AGENT: &str = concat!("research-agent/", env!("CARGO_PKG_VERSION"));

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use tokio::io::BufReader;
use tracing::{info, warn};

use config::Secrets;
use openai::OpenAiClient;
use research::{Event, ResearchAgent};
use shell::{ConsoleShell, Input, Shell, read_input};
use tavily::TavilyClient;

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Global HTTP client timeout covering DNS + connect + response body.
const HTTP_TIMEOUT: Duration = Duration::from_secs(90);

/// Turn a research topic into a Markdown report: LLM-generated questions, a web search per
/// question, compiled into one downloadable document.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Secrets file with [openai] and [tavily] api_key entries (default: ./secrets.toml if present)
    #[arg(long)]
    secrets: Option<PathBuf>,

    /// Directory reports are saved into
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Research a single topic and exit instead of prompting interactively
    #[arg(long)]
    topic: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("research_agent=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let secrets = Secrets::load(args.secrets.as_deref())
        .inspect_err(|e| tracing::error!("configuration error: {e}"))?;

    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .build()?;
    let mut agent = ResearchAgent::new(
        OpenAiClient::new(http.clone(), secrets.openai),
        TavilyClient::new(http, secrets.tavily),
    );
    let mut shell = ConsoleShell::new(std::io::stdout(), args.output_dir);

    info!("starting research agent");

    if let Some(topic) = args.topic {
        agent.handle(Event::TopicEntered(topic), &mut shell).await;
        let phase = agent.handle(Event::GeneratePressed, &mut shell).await;
        info!(%phase, report = agent.report().is_some(), "one-shot run finished");
        return Ok(());
    }

    shell.banner();
    shell.prompt();
    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut buf = Vec::new();
    while let Some(input) = read_input(&mut stdin, &mut buf).await? {
        match input {
            Input::Topic(line) => {
                agent.handle(Event::TopicEntered(line), &mut shell).await;
                agent.handle(Event::GeneratePressed, &mut shell).await;
            }
            Input::NotUtf8 => {
                warn!("skipping input line that is not valid UTF-8");
                shell.warning("Topic must be valid UTF-8 text; line skipped.");
            }
        }
        shell.prompt();
    }

    info!(
        reports = shell.saved().len(),
        last_phase = %agent.phase(),
        "session ended"
    );
    Ok(())
}
