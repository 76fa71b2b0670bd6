//! Codepage CLI
//!
//! Command-line tools for managing a Codepage site.
//!
//! # Commands
//!
//! - `create` - Create a draft code page
//! - `list` - List entries
//! - `publish` / `unpublish` - Change publication state
//! - `rename` / `delete` - Retitle or remove an entry
//! - `import` - Save code fields from files
//! - `render` - Print the document of a published code page
//! - `session` - Issue a login session token
//! - `serve` - Run the HTTP server
//! - `compact` - Rewrite the metadata log without superseded records

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the hex-encoded site secret.
const SECRET_ENV: &str = "CODEPAGE_SECRET";

/// Codepage site management tools.
#[derive(Parser)]
#[command(name = "codepage")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the metadata log
    #[arg(global = true, short, long)]
    data: Option<PathBuf>,

    /// Hex-encoded site secret (defaults to $CODEPAGE_SECRET)
    #[arg(global = true, long)]
    secret: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a draft code page
    Create {
        /// Page title
        title: String,

        /// Author user id
        #[arg(short, long, default_value = "1")]
        author: u64,

        /// Content kind (defaults to code pages)
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// List entries
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Publish an entry
    Publish {
        /// Entry id
        id: u64,
    },

    /// Return an entry to draft
    Unpublish {
        /// Entry id
        id: u64,
    },

    /// Change the title (and so the slug) of an entry
    Rename {
        /// Entry id
        id: u64,

        /// New title
        title: String,
    },

    /// Delete an entry and its code fields
    Delete {
        /// Entry id
        id: u64,
    },

    /// Save code fields from files
    Import {
        /// Entry id
        id: u64,

        /// HTML file
        #[arg(long)]
        html: Option<PathBuf>,

        /// CSS file
        #[arg(long)]
        css: Option<PathBuf>,

        /// JavaScript file
        #[arg(long)]
        js: Option<PathBuf>,
    },

    /// Print the document of a published code page
    Render {
        /// Entry id
        id: u64,
    },

    /// Issue a login session token
    Session {
        /// User id
        #[arg(short, long)]
        user: u64,

        /// Role (administrator, editor, author, subscriber)
        #[arg(short, long, default_value = "editor")]
        role: String,
    },

    /// Run the HTTP server
    Serve {
        /// Address to bind to
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        bind: String,
    },

    /// Rewrite the metadata log without superseded records
    Compact,

    /// Generate a fresh site secret
    Secret,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let secret = cli.secret.or_else(|| std::env::var(SECRET_ENV).ok());
    let data = cli.data;
    let open = || -> Result<commands::Site, Box<dyn std::error::Error>> {
        let path = data.as_deref().ok_or("Metadata path required (--data)")?;
        commands::Site::open(path, secret.as_deref())
    };

    match cli.command {
        Commands::Create {
            title,
            author,
            kind,
        } => commands::create::run(&open()?, &title, author, kind.as_deref())?,
        Commands::List { format } => commands::list::run(&open()?, &format)?,
        Commands::Publish { id } => commands::status::publish(&open()?, id)?,
        Commands::Unpublish { id } => commands::status::unpublish(&open()?, id)?,
        Commands::Rename { id, title } => commands::entry::rename(&open()?, id, &title)?,
        Commands::Delete { id } => commands::entry::delete(&open()?, id)?,
        Commands::Import { id, html, css, js } => {
            let files = commands::import::CodeFiles { html, css, js };
            commands::import::run(&open()?, id, &files)?;
        }
        Commands::Render { id } => commands::render::run(&open()?, id)?,
        Commands::Session { user, role } => {
            commands::session::run(secret.as_deref(), user, &role)?;
        }
        Commands::Serve { bind } => commands::serve::run(open()?, &bind)?,
        Commands::Compact => commands::compact::run(&open()?)?,
        Commands::Secret => println!("{}", codepage_core::SiteSecret::generate().to_hex()),
        Commands::Version => {
            println!("Codepage CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
