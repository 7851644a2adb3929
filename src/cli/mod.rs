use anyhow::Context;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};

use crate::{
    codec::CodecRegistry,
    config::{self, Config},
    domain::id::SongId,
    registry::{MediaSource, SourceRegistry, register_builtin},
};

#[derive(Parser)]
#[command(name = "dirdeck")]
#[command(version = "0.1")]
#[command(about = "Serve music directories as song catalogs")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show configured sources
    Sources,
    /// Scan a source and list its songs
    List {
        /// Index of the source, as shown by `sources`
        #[arg(short, long, default_value_t = 0)]
        source: usize,
    },
    /// Show one song
    Info {
        /// Song id, as printed by `list`
        id: String,
        /// Index of the source, as shown by `sources`
        #[arg(short, long, default_value_t = 0)]
        source: usize,
    },
    /// Run http server hosting the sources
    Serve,
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;
    let sources = open_sources(&cfg.sources)?;

    match cli.command {
        Commands::Sources => {
            for (index, source) in sources.iter().enumerate() {
                println!("[{index}] {}", source.key());
            }
        }

        Commands::List { source } => {
            let source = pick(&sources, source)?;
            let catalog = source.list()?;

            println!("{} songs in {}", catalog.len(), source.key());
            for (id, info) in catalog.iter() {
                println!("{id}");
                println!("  {} - {} ({})", info.artist, info.title, info.album);
                if let Some(cover) = &info.cover {
                    println!("  cover: {}", cover.as_str());
                }
            }
        }

        Commands::Info { id, source } => {
            let source = pick(&sources, source)?;
            let id = SongId::decode(&id).context("Failed to parse song id")?;
            let info = source.info(&id)?;

            println!("path:   {}", id.path().to_string_lossy());
            println!("index:  {}", id.index());
            println!("title:  {}", info.title);
            println!("album:  {}", info.album);
            println!("artist: {}", info.artist);
            if let Some(cover) = &info.cover {
                println!("cover:  {}", cover.as_str());
            }
        }

        Commands::Serve => {
            let http_server = crate::http::server::HttpServer::new(sources, cfg.http);

            println!(
                "HTTP server running at http://{}:{}",
                http_server.config.bind_addr, http_server.config.port
            );
            http_server.run();
        }
    }

    Ok(())
}

/// Builds every configured source through the registry.
fn open_sources(configs: &[config::SourceConfig]) -> anyhow::Result<Vec<Box<dyn MediaSource>>> {
    let mut registry = SourceRegistry::new();
    register_builtin(&mut registry)?;
    let codecs = Arc::new(CodecRegistry::with_defaults());

    configs
        .iter()
        .map(|cfg| {
            registry
                .create(&cfg.kind, &cfg.params, codecs.clone())
                .with_context(|| format!("Failed to open {} source {:?}", cfg.kind, cfg.params))
        })
        .collect()
}

fn pick(sources: &[Box<dyn MediaSource>], index: usize) -> anyhow::Result<&dyn MediaSource> {
    sources
        .get(index)
        .map(|source| &**source)
        .with_context(|| format!("No source with index {index}"))
}
