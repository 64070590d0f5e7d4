use std::path::PathBuf;

use clap::Parser;

use crate::build_http_client;
use crate::errors::AppError;
use crate::manifest::ManifestSource;
use crate::slack_manifest::{SlackManifestClient, SlackManifestOptions};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct App {
    /// Slack app id. Used by manifest update and delete.
    #[arg(short = 'a', long = "app_id", alias = "app-id")]
    pub app_id: Option<String>,

    /// Slack app configuration access token. Required if refresh token is not provided.
    #[arg(long = "accessToken", alias = "access-token")]
    pub access_token: Option<String>,

    /// Create a Slack app with the provided manifest.
    #[arg(short = 'c', long)]
    pub create: bool,

    /// Delete the Slack app identified by app_id.
    #[arg(short = 'd', long)]
    pub delete: bool,

    /// Replace ${VAR} placeholders in the manifest with environment variables.
    #[arg(short = 'e', long)]
    pub environment: bool,

    /// Path to the app manifest file. Required unless deleting.
    #[arg(short = 'm', long)]
    pub manifest: Option<PathBuf>,

    /// Print a new access and refresh token pair to stdout. Requires a refresh token.
    #[arg(short = 'r', long)]
    pub rotate: bool,

    /// Slack app configuration refresh token, valid for 12 hours. Required if access token is not provided.
    #[arg(long = "refreshToken", alias = "refresh-token")]
    pub refresh_token: Option<String>,

    /// Update the Slack app manifest with the provided manifest.
    #[arg(short = 'u', long)]
    pub update: bool,

    /// Validate the manifest file.
    #[arg(short = 'v', long)]
    pub validate: bool,
}

fn response_is_ok(response: &serde_json::Value) -> bool {
    response["ok"].as_bool().unwrap_or(false)
}

pub async fn run(app: App) -> Result<(), AppError> {
    // Usage checks happen before any network call
    if app.manifest.is_none() && !app.delete {
        return Err(AppError::UsageError("manifest file is required".to_string()));
    }

    if app.access_token.is_none() && app.refresh_token.is_none() {
        return Err(AppError::UsageError("slack app configuration access or refresh token is required".to_string()));
    }

    let manifest = match &app.manifest {
        Some(path) => Some(ManifestSource::from_path(path)?),
        None => None,
    };

    let http_client = build_http_client()?;
    let client = SlackManifestClient::new(http_client, SlackManifestOptions {
        manifest,
        access_token: app.access_token,
        refresh_token: app.refresh_token,
        app_id: app.app_id,
        interpolate_env: app.environment,
    })?;

    // Validation may be combined with a mutating operation and aborts it when invalid
    if app.validate {
        if client.validate().await? {
            println!("manifest is valid");
        } else {
            return Err(AppError::SlackError("manifest is invalid".to_string()));
        }
    }

    if app.update {
        let response = client.update().await?;

        if response_is_ok(&response) {
            println!("manifest updated");
        } else {
            println!("{}", serde_json::to_string_pretty(&response)?);
            return Err(AppError::SlackError("manifest update failed".to_string()));
        }
    } else if app.create {
        let response = client.create().await?;

        if response_is_ok(&response) {
            println!("app created from manifest");
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&response)?);
            return Err(AppError::SlackError("app creation failed".to_string()));
        }
    } else if app.delete {
        let response = client.delete().await?;

        if response_is_ok(&response) {
            println!("app deleted");
        } else {
            println!("{}", serde_json::to_string_pretty(&response)?);
            return Err(AppError::SlackError("app deletion failed".to_string()));
        }
    } else if app.rotate {
        let response = client.rotate().await?;

        if response.ok {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&response)?);
            return Err(AppError::SlackError("token generation failed".to_string()));
        }
    }

    Ok(())
}
