use clap::Subcommand;
use serde_json::json;

use crate::cli::{utils, OutputFormat};
use crate::setup::{tables, SETUP_SQL};

#[derive(Subcommand)]
pub enum SetupCommands {
    #[command(about = "Print the SQL that creates every table and policy")]
    Sql,
}

pub async fn handle(cmd: SetupCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SetupCommands::Sql => match output_format {
            OutputFormat::Json => utils::print_json(&json!({ "tables": tables(), "sql": SETUP_SQL })),
            OutputFormat::Text => {
                print!("{}", SETUP_SQL);
                Ok(())
            }
        },
    }
}
