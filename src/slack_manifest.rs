use reqwest::Client;
use serde_derive::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::manifest::ManifestSource;

const SLACK_API: &str = "https://slack.com/api";

/// App configuration token pair. At least one of the two must be present
/// before any authenticated call.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

enum TokenSource<'a> {
    Provided(&'a str),
    NeedsRotation(&'a str),
}

impl Credentials {
    fn token_source(&self) -> Result<TokenSource<'_>, AppError> {
        if let Some(access_token) = &self.access_token {
            Ok(TokenSource::Provided(access_token))
        } else if let Some(refresh_token) = &self.refresh_token {
            Ok(TokenSource::NeedsRotation(refresh_token))
        } else {
            Err(AppError::UsageError("slack app configuration access or refresh token is required".to_string()))
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RotateResponse {
    pub ok: bool,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub exp: Option<i64>,
    pub error: Option<String>,
}

pub struct SlackManifestOptions {
    pub manifest: Option<ManifestSource>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub app_id: Option<String>,
    pub interpolate_env: bool,
}

pub struct SlackManifestClient {
    http_client: Client,
    base_url: String,
    credentials: Credentials,
    manifest: Option<ManifestSource>,
    interpolate_env: bool,
    app_id: Option<String>,
}

impl SlackManifestClient {
    pub fn new(http_client: Client, options: SlackManifestOptions) -> Result<SlackManifestClient, AppError> {
        let credentials = Credentials {
            access_token: options.access_token,
            refresh_token: options.refresh_token,
        };
        credentials.token_source()?;

        Ok(SlackManifestClient {
            http_client,
            base_url: SLACK_API.to_string(),
            credentials,
            manifest: options.manifest,
            interpolate_env: options.interpolate_env,
            app_id: options.app_id,
        })
    }

    /// Return the provided access token verbatim, or exchange the refresh
    /// token for a fresh one. Rotated tokens are not cached: every call
    /// without a provided access token rotates again.
    pub async fn resolve_access_token(&self) -> Result<String, AppError> {
        match self.credentials.token_source()? {
            TokenSource::Provided(access_token) => Ok(access_token.to_string()),
            TokenSource::NeedsRotation(_) => {
                let response = self.rotate().await?;

                response.token.ok_or_else(|| AppError::TokenRotationError(
                    response.error.unwrap_or_else(|| "rotation response contained no token".to_string()),
                ))
            },
        }
    }

    /// Exchange the refresh token for a new access/refresh token pair.
    /// A response with `ok: false` is logged and returned as data, the
    /// caller decides whether it is fatal.
    pub async fn rotate(&self) -> Result<RotateResponse, AppError> {
        let refresh_token = self.credentials.refresh_token.as_deref()
            .ok_or_else(|| AppError::UsageError("refresh token is required to rotate".to_string()))?;

        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("refresh_token", refresh_token)
            .finish();

        let response: RotateResponse = self.http_client
            .post(format!("{}/tooling.tokens.rotate", self.base_url))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Accept", "application/json")
            .body(body)
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            println!("SlackManifestClient: token rotation failed, error: {:?}", response.error);
        }

        Ok(response)
    }

    /// POST a JSON payload to a Slack Web API method and return the parsed
    /// response unconditionally. The caller inspects the `ok` field.
    pub async fn request(&self, method: &str, params: &Value) -> Result<Value, AppError> {
        let access_token = self.resolve_access_token().await?;
        let body = params.to_string();

        let response = self.http_client
            .post(format!("{}{}", self.base_url, method))
            .bearer_auth(&access_token)
            .header("Content-Type", "application/json; charset=utf-8")
            .header("Accept", "application/json")
            .body(body)
            .send()
            .await?;

        Ok(response.json().await?)
    }

    pub async fn validate(&self) -> Result<bool, AppError> {
        let manifest = self.load_manifest()?;
        let response = self.request("/apps.manifest.validate", &json!({
            "manifest": manifest,
        })).await?;

        Ok(response["ok"].as_bool().unwrap_or(false))
    }

    pub async fn create(&self) -> Result<Value, AppError> {
        let manifest = self.load_manifest()?;

        self.request("/apps.manifest.create", &json!({
            "manifest": manifest,
        })).await
    }

    // A missing app_id is omitted from the payload, not pre-validated.
    // Slack rejects the request server-side.
    pub async fn update(&self) -> Result<Value, AppError> {
        let manifest = self.load_manifest()?;
        let mut payload = json!({
            "manifest": manifest,
        });
        if let Some(app_id) = &self.app_id {
            payload["app_id"] = json!(app_id);
        }

        self.request("/apps.manifest.update", &payload).await
    }

    pub async fn delete(&self) -> Result<Value, AppError> {
        let mut payload = json!({});
        if let Some(app_id) = &self.app_id {
            payload["app_id"] = json!(app_id);
        }

        self.request("/apps.manifest.delete", &payload).await
    }

    fn load_manifest(&self) -> Result<String, AppError> {
        let source = self.manifest.as_ref()
            .ok_or_else(|| AppError::UsageError("manifest file is required".to_string()))?;

        source.load(self.interpolate_env)
    }
}
