use bskypost::cli::{Config, Runner, die};
use clap::Parser;

#[tokio::main]
async fn main() {
    let config = Config::parse();
    env_logger::Builder::new()
        .filter_level(config.verbosity().log_level_filter())
        .init();

    if let Err(err) = Runner::new(config).run().await {
        die(1, &format!("{err}"));
    }
}
