//! epseek: find the frame where an episode's title card appears.

mod cli;
mod config;
mod order;
mod scan;
mod timecode;
mod video;

fn main() -> anyhow::Result<()> {
    // Structured logging. Use `RUST_LOG=debug` to watch the probe order.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    cli::run()
}
