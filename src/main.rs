//! CLI entry point for blog-mirror

use anyhow::Result;
use blog_mirror::mirror::{ProfileKind, SyncOutcome};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "blog-mirror")]
#[command(version)]
#[command(about = "Mirror headless CMS posts into object storage and a Git repository", long_about = None)]
struct Cli {
    /// Configuration file; environment variables override its values
    #[arg(short, long, global = true, default_value = "mirror.yml")]
    config: PathBuf,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to the configured address)
        #[arg(short, long)]
        ip: Option<String>,
    },

    /// Mirror one post from the CMS
    Sync {
        /// Content identifier
        id: String,

        /// Which mirror to write
        #[arg(long, value_enum, default_value_t = ProfileKind::Sync)]
        profile: ProfileKind,
    },

    /// Remove one post's mirrored file
    Delete {
        /// Content identifier
        id: String,

        /// Which mirror to delete from
        #[arg(long, value_enum, default_value_t = ProfileKind::Sync)]
        profile: ProfileKind,
    },

    /// Print the mirrored Markdown of a post
    Render {
        /// Content identifier
        id: String,

        /// Print only the front-matter
        #[arg(long)]
        meta: bool,
    },

    /// List CMS posts with their mirrored file names
    List {
        /// Only posts in this category
        #[arg(long)]
        category: Option<String>,

        /// Naming rules to apply
        #[arg(long, value_enum, default_value_t = ProfileKind::Sync)]
        profile: ProfileKind,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "blog_mirror=debug,info"
    } else {
        "blog_mirror=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve { port, ip } => {
            let app = blog_mirror::BlogMirror::load(&cli.config)?;
            let port = port.unwrap_or(app.config.server.port);
            let ip = ip.unwrap_or_else(|| app.config.server.ip.clone());

            tracing::info!("Starting server at http://{}:{}", ip, port);
            blog_mirror::server::start(app, &ip, port).await?;
        }

        Commands::Sync { id, profile } => {
            let app = blog_mirror::BlogMirror::load(&cli.config)?;
            tracing::info!("Mirroring {} ({})", id, profile);
            let outcome = blog_mirror::commands::sync::run(&app, profile, &id).await?;
            report(&outcome);
        }

        Commands::Delete { id, profile } => {
            let app = blog_mirror::BlogMirror::load(&cli.config)?;
            tracing::info!("Deleting {} ({})", id, profile);
            let outcome = blog_mirror::commands::delete::run(&app, profile, &id).await?;
            report(&outcome);
        }

        Commands::Render { id, meta } => {
            let app = blog_mirror::BlogMirror::load(&cli.config)?;
            blog_mirror::commands::render::run(&app, &id, meta).await?;
        }

        Commands::List { category, profile } => {
            let app = blog_mirror::BlogMirror::load(&cli.config)?;
            blog_mirror::commands::list::run(&app, category.as_deref(), profile).await?;
        }

        Commands::Version => {
            println!("blog-mirror version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn report(outcome: &SyncOutcome) {
    println!("{}: {}", outcome.action, outcome.file);
}
