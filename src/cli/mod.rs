pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "site-admin")]
#[command(about = "Site admin CLI - store setup, fallback data and back-office users")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Store schema setup")]
    Setup {
        #[command(subcommand)]
        cmd: commands::setup::SetupCommands,
    },

    #[command(about = "Print the built-in fallback rows for a resource")]
    Fallback {
        #[arg(help = "Resource: companies, courses, projects or inquiries")]
        resource: String,
    },

    #[command(about = "Probe the store and report live/fallback per resource")]
    Check,

    #[command(about = "Back-office user management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Sign in and show the admin gate decision for the account")]
    Whoami {
        #[arg(long, help = "Account email")]
        email: String,
        #[arg(long, env = "SITE_ADMIN_PASSWORD", help = "Account password")]
        password: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Setup { cmd } => commands::setup::handle(cmd, output_format).await,
        Commands::Fallback { resource } => commands::fallback::handle(&resource, output_format).await,
        Commands::Check => commands::check::handle(output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, output_format).await,
        Commands::Whoami { email, password } => commands::whoami::handle(&email, &password, output_format).await,
    }
}
