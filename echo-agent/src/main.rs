use clap::Parser;
use echo_agent::{default_card, serve, EchoAgent};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sample A2A agent that echoes whatever it receives
#[derive(Debug, Parser)]
#[command(name = "echo-agent", version, about)]
struct Args {
    /// Interface to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Endpoint advertised in the agent card; defaults to the bound address
    #[arg(long)]
    public_url: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port)).await?;
    let local_addr = listener.local_addr()?;
    let url = args
        .public_url
        .unwrap_or_else(|| format!("http://{}/", local_addr));

    serve(listener, EchoAgent::new(default_card(url))).await
}
