use std::path::PathBuf;

use clap::Parser;

use shiori::config::AppConfig;
use shiori::server;

#[derive(Parser)]
#[command(name = "shiori", about = "Notion-backed chat log viewer and profile API", version)]
struct Cli {
    /// Path to a TOML config file (env vars fill in the rest)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Override the listen address, e.g. 0.0.0.0:8787
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    config.validate()?;

    if let Err(e) = server::serve(config).await {
        anyhow::bail!("server error: {}", e);
    }
    Ok(())
}
