mod budget;
mod config;
mod db;
mod error;
mod ledger;
mod models;
mod report;
mod run;
mod ui;

use anyhow::Result;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cfg = config::Config::load()?;
    config::init_tracing(&cfg)?;

    let result = run::dispatch(&args, &cfg);
    if let Err(ref e) = result {
        tracing::error!(error = %format!("{e:#}"), "command failed");
    }
    result
}
