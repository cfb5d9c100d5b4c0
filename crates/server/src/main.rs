use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use scribe_core::{
    FeedbackTransport, GenerationAdapter, LinkDiscoverer, OpenAiClient, Pipeline, PromptSynthesizer, ScribeConfig,
    SmtpFeedbackTransport,
};
use scribe_server::{AppState, SessionRegistry, router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "scribe-server", version, about = "HTTP API for the SEO content generator")]
struct Args {
    #[arg(long, env = "SCRIBE_ADDR", default_value = "127.0.0.1:8080")]
    addr: String,

    /// JSON configuration file. Defaults to `<config dir>/scribe/config.json` when present.
    #[arg(long, env = "SCRIBE_CONFIG")]
    config: Option<PathBuf>,

    /// Seconds a session may stay idle before it is discarded.
    #[arg(long, env = "SCRIBE_SESSION_TTL", default_value_t = 3600)]
    session_ttl: u64,

    /// Log at debug level unless RUST_LOG is set.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "scribe_server=debug,scribe_core=debug,tower_http=debug"
    } else {
        "scribe_server=info,scribe_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_state(config: &ScribeConfig, sessions: SessionRegistry) -> anyhow::Result<AppState> {
    let client = OpenAiClient::new(&config.generation.base_url, config.generation.timeout)
        .context("failed to build completion client")?;

    let pipeline = Pipeline {
        discoverer: LinkDiscoverer::new(config.crawl.discover_config()),
        synthesizer: PromptSynthesizer::new(config.generation.language),
        generator: GenerationAdapter::new(Arc::new(client), config.generation.settings()),
    };

    let feedback = config.smtp.clone().map(|smtp| {
        tracing::info!(server = %smtp.server, port = smtp.port, "feedback delivery enabled");
        Arc::new(SmtpFeedbackTransport::new(smtp)) as Arc<dyn FeedbackTransport>
    });
    if feedback.is_none() {
        tracing::warn!("no smtp section configured, feedback delivery disabled");
    }

    Ok(AppState::with_sessions(sessions, pipeline, feedback))
}

/// Evicts idle sessions once per minute, or per TTL when that is shorter.
fn spawn_session_sweeper(sessions: SessionRegistry) {
    let period = sessions.ttl().clamp(Duration::from_secs(1), Duration::from_secs(60));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            sessions.evict_expired().await;
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = ScribeConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "configuration");

    let sessions = SessionRegistry::with_ttl(Duration::from_secs(args.session_ttl));
    spawn_session_sweeper(sessions.clone());

    let app = router(build_state(&config, sessions)?).layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("failed to bind {}", args.addr))?;
    tracing::info!(addr = %args.addr, model = %config.generation.model, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("http server crashed")?;

    Ok(())
}
