use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "movies-server")]
#[command(about = "In-memory movie catalogue over HTTP", long_about = None)]
struct Args {
    /// YAML config file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<String>,

    /// Listen port, overrides both the config file and $PORT.
    #[arg(short, long)]
    port: Option<u16>,

    #[arg(short, long)]
    debug: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_filter = if args.debug {
        "movies_rs=debug,tower_http=debug"
    } else {
        "movies_rs=info,tower_http=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    if let Err(e) = movies_rs::run(args.config.as_deref(), args.port, args.debug).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
