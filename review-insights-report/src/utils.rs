use {
    tracing::Level,
    tracing_subscriber::{prelude::*, filter::filter_fn},
};

const WORKSPACE_TARGETS: [&str; 2] = ["review_insights_core", "review_insights_report"];

pub fn init_logging() {
    tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_writer(std::io::stderr)
        .finish()
        .with(filter_fn(|metadata| {
            if WORKSPACE_TARGETS.iter().any(|target| metadata.target().starts_with(target)) {
                true
            } else {
                metadata.level() <= &Level::INFO
            }
        }))
        .init();
}
