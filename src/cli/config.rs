//! Where the CLI finds its service account key.
//!
//! Lookup order: `--credentials`, then `ARTIFACT_BROWSER_CREDENTIALS`, then
//! `~/.config/artifact-browser/service-account.json`. The key is handed to
//! the registry client directly; nothing is exported into the environment.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::registry::{CredentialBundle, CredentialInput};

pub const CREDENTIALS_ENV: &str = "ARTIFACT_BROWSER_CREDENTIALS";
const CONFIG_DIR_NAME: &str = "artifact-browser";
const CREDENTIALS_FILE_NAME: &str = "service-account.json";

/// Default key location under the user's config directory
pub fn default_credentials_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CREDENTIALS_FILE_NAME)
    })
}

fn pick_credentials_path(
    flag: Option<&Path>,
    env_value: Option<String>,
    default: Option<PathBuf>,
) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| env_value.filter(|v| !v.is_empty()).map(PathBuf::from))
        .or(default)
}

/// Resolve the key file path for this invocation
pub fn credentials_path(flag: Option<&Path>) -> Result<PathBuf> {
    pick_credentials_path(
        flag,
        std::env::var(CREDENTIALS_ENV).ok(),
        default_credentials_path(),
    )
    .context("Could not determine home directory; pass --credentials explicitly")
}

/// Read and structurally check a key file
pub fn load_credentials(path: &Path) -> Result<CredentialBundle> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials file {}", path.display()))?;

    let bundle = CredentialInput::Text(text)
        .resolve()
        .with_context(|| format!("Invalid credentials file {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        project = %bundle.project_id,
        "Loaded service account key"
    );

    Ok(bundle)
}
