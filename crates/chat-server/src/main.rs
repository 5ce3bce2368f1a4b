use anyhow::Result;
use chat_server::{router, AppState, ServerConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "seqchat-server")]
#[command(about = "seq2seq chat reply server", long_about = None)]
struct Args {
    /// Config file (.yaml, .yml or .json). Without it, configuration comes from the environment.
    #[arg(short, long, env = "SEQCHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Server host
    #[arg(long)]
    host: Option<String>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// JSON word -> id vocabulary file
    #[arg(long)]
    vocab: Option<PathBuf>,

    /// Newline-delimited corpus to fit the vocabulary on (ignored when --vocab is set)
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Maximum decoder steps per reply
    #[arg(long)]
    max_steps: Option<usize>,

    /// Seed for parameter initialization
    #[arg(long)]
    seed: Option<u64>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    /// 命令行参数覆盖配置文件 / 环境变量
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.http.host = host;
        }
        if let Some(port) = self.port {
            config.http.port = port;
        }
        if let Some(vocab) = self.vocab {
            config.tokenizer.vocab_path = Some(vocab);
        }
        if let Some(corpus) = self.corpus {
            config.tokenizer.corpus_path = Some(corpus);
        }
        if let Some(max_steps) = self.max_steps {
            config.generation.max_steps = max_steps;
        }
        if let Some(seed) = self.seed {
            config.model.seed = seed;
        }
        if let Some(level) = self.log_level {
            config.log.level = level;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::from_env(),
    };
    args.apply(&mut config);

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Building seq2seq model...");
    let state = tokio::task::spawn_blocking(move || AppState::from_config(config)).await??;
    tracing::info!("Model ready");

    let host = state.config.http.host.clone();
    let port = state.config.http.port;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    tracing::info!("seqchat server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
