use super::{output, CliContext};
use crate::registry::validator::probe;
use crate::registry::CredentialBundle;

pub fn show_account(bundle: &CredentialBundle) {
    println!("Project:         {}", bundle.project_id);
    println!("Service account: {}", bundle.client_email);
}

/// Probe the key against the registry. Returns whether it was accepted.
pub async fn validate(ctx: &CliContext, bundle: &CredentialBundle) -> bool {
    let outcome = probe(bundle, ctx.connector.as_ref(), &ctx.probe_policy).await;

    if outcome.valid {
        output::success(format!(
            "Credentials valid for project {} ({})",
            bundle.project_id, bundle.client_email
        ));
        if let Some(warning) = &outcome.warning {
            output::warning(warning);
        }
    } else {
        output::failure(outcome.error.as_deref().unwrap_or("Invalid credentials"));
    }

    outcome.valid
}
