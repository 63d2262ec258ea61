mod app;
mod config;
mod media;
mod player;
mod runtime;
mod scenario;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    runtime::run()
}
