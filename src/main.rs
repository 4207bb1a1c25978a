//! CLI entry point for blog-rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "blog-rs")]
#[command(version)]
#[command(about = "A personal markdown blog with an admin API", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new blog
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Markdown body
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,

        /// Read the markdown body from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Tags (repeatable)
        #[arg(short, long)]
        tag: Vec<String>,
    },

    /// Start the server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (overrides the config)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (overrides the config)
        #[arg(short, long)]
        ip: Option<String>,
    },

    /// List blog content
    List {
        /// Type of content to list (post, tag, slug, user)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a user
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "blog_rs=debug,tower_http=debug,info"
    } else {
        "blog_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing blog in {:?}", target_dir);
            blog_rs::commands::init::init_site(&target_dir)?;
            println!("Initialized blog in {:?}", target_dir);
        }

        Commands::New {
            title,
            content,
            file,
            tag,
        } => {
            let blog = blog_rs::Blog::new(&base_dir)?;
            tracing::info!("Creating new post with title: {}", title);
            blog_rs::commands::new::create_post(
                &blog,
                &title,
                content.as_deref(),
                file.as_deref(),
                tag,
            )?;
        }

        Commands::Serve { port, ip } => {
            let blog = blog_rs::Blog::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| blog.config.server.ip.clone());
            let port = port.unwrap_or(blog.config.server.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            blog_rs::server::start(&blog, &ip, port).await?;
        }

        Commands::List { r#type } => {
            let blog = blog_rs::Blog::new(&base_dir)?;
            blog_rs::commands::list::run(&blog, &r#type)?;
        }

        Commands::User { command } => {
            let blog = blog_rs::Blog::new(&base_dir)?;
            match command {
                UserCommands::Add {
                    name,
                    email,
                    password,
                } => blog_rs::commands::user::add(&blog, &name, &email, &password)?,
            }
        }

        Commands::Version => {
            println!("blog-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
