use clap::Subcommand;
use serde_json::json;

use crate::auth::{open_identity, Role};
use crate::cli::{utils, OutputFormat};
use crate::config::config;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a confirmed back-office user (needs the service role key)")]
    Create {
        #[arg(long, help = "Account email")]
        email: String,
        #[arg(long, env = "SITE_ADMIN_PASSWORD", help = "Account password")]
        password: String,
        #[arg(long, default_value = "admin", value_parser = parse_role, help = "Role: admin or anonymous")]
        role: Role,
    },
}

fn parse_role(s: &str) -> Result<Role, String> {
    s.parse()
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create { email, password, role } => {
            let identity = open_identity(&config().store)?;
            let user = identity.create_user(&email, &password, role).await?;
            tracing::info!("created user {} with role {}", user.id, role);
            utils::output_success(
                &output_format,
                &format!("Created {} user {}", role, email),
                Some(json!({ "user": user })),
            )
        }
    }
}
