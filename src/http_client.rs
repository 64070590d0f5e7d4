use reqwest::Client;

use crate::errors::AppError;

pub fn build_http_client() -> Result<Client, AppError> {
    let client = Client::builder()
        .user_agent(concat!("slack-manifest-tools/", env!("CARGO_PKG_VERSION")))
        .build()?;

    Ok(client)
}
