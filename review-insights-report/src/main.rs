mod report;
mod utils;

use {
    std::time::Duration,
    anyhow::{Context, Result},
    tracing::info,
    indicatif::{ProgressBar, ProgressStyle},
    review_insights_core::{
        cache::PreparedCache,
        config::{Config, ReportFormat},
        lexicon::Lexicon,
        preparation::ReviewDatasetPreparer,
        sentiment::LexiconScorer,
    },
    crate::{
        report::Report,
        utils::init_logging,
    },
};

fn main() -> Result<()> {
    init_logging();

    info!("review insights report");

    let config = Config::load();
    let source = config.source().path();

    let lexicon = match config.sentiment().lexicon_path() {
        Some(path) => Lexicon::builtin_with_extension(path)
            .with_context(|| format!("failed to load sentiment lexicon from {}", path.display()))?,
        None => Lexicon::builtin(),
    };
    info!("using sentiment lexicon with {} words", lexicon.len());

    let preparer = ReviewDatasetPreparer::new(config.preparation().clone(), LexiconScorer::new(lexicon));
    let mut cache = PreparedCache::new(preparer);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")?);
    pb.set_message(format!("preparing reviews from {}", source.display()));
    pb.enable_steady_tick(Duration::from_millis(100));
    let table = cache.get_or_prepare(&source);
    pb.finish_and_clear();
    let table = table.with_context(|| format!("failed to prepare reviews from {}", source.display()))?;

    let report = Report::build(source.display().to_string(), &table, config.report());
    match config.report().format() {
        ReportFormat::Text => print!("{}", report),
        ReportFormat::Json => println!("{}", report.to_json().context("failed to serialize report")?),
    }

    Ok(())
}
