use std::process;

use clap::Parser;
use slack_manifest_tools::cli::{run, App};

#[tokio::main]
async fn main() {
    let app = App::parse();

    if let Err(error) = run(app).await {
        eprintln!("{}", error);
        process::exit(1);
    }
}
