use serde_json::json;

use crate::auth::{open_identity, GateState, Role, SessionGate, SessionProvider};
use crate::cli::{utils, OutputFormat};
use crate::config::config;

/// Sign in through a session provider and report what the admin gate decides
pub async fn handle(email: &str, password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let identity = open_identity(&config().store)?;
    let provider = SessionProvider::new(identity);
    let mut gate = SessionGate::new(&provider);

    let session = match provider.sign_in(email, password).await {
        Ok(session) => session,
        Err(e) => {
            utils::output_error(&output_format, &e.to_string(), Some("SIGN_IN_FAILED"))?;
            anyhow::bail!("sign-in failed");
        }
    };

    let state = gate.evaluate(&provider).await.clone();
    gate.close();
    provider.sign_out().await;

    let role = Role::from_user(&session.user);
    let message = match &state {
        GateState::Authenticated(_) => format!("{} may use the admin area", email),
        other => format!(
            "{} is signed in but the admin gate denies access ({})",
            email,
            other.redirect().unwrap_or_default()
        ),
    };

    utils::output_success(
        &output_format,
        &message,
        Some(json!({ "user": session.user, "role": role, "gate": state })),
    )
}
