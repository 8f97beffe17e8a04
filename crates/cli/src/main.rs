use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use server::Config;

#[derive(Parser)]
#[command(name = "aniserver")]
#[command(about = "Anime listing extraction and MEGA acquisition server", long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Base URL of the listing site
    #[arg(long, default_value = "https://www3.animeflv.net")]
    base_url: String,

    /// Directory for per-session downloads and archives
    #[arg(short, long, default_value = "downloads")]
    download_dir: PathBuf,

    /// Path to the MEGA downloader binary
    #[arg(long, default_value = "megadl")]
    mega_binary: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    let config = Config::new(cli.base_url, cli.download_dir, cli.mega_binary);

    server::run_server(addr, config).await
}
