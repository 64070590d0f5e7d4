pub mod cli;
pub mod errors;
pub mod manifest;
pub mod slack_manifest;
mod http_client;

pub use http_client::build_http_client;
