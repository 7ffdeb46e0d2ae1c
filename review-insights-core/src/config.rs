use {
    std::{fs::read_to_string, path::{Path, PathBuf}},
    tracing::warn,
    serde::Deserialize,
};

pub const DEFAULT_FREQUENCY_THRESHOLD: usize = 50;
pub const DEFAULT_SENTIMENT_SAMPLE_SIZE: usize = 50_000;

#[derive(Deserialize, Debug)]
pub struct Config {
    source: Option<SourceConfig>,
    #[serde(default)]
    preparation: PreparationConfig,
    #[serde(default)]
    sentiment: SentimentConfig,
    #[serde(default)]
    report: ReportConfig,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SourceConfig {
    path: Option<PathBuf>,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct PreparationConfig {
    #[serde(default = "default_frequency_threshold")]
    pub frequency_threshold: usize,
    #[serde(default = "default_sentiment_sample_size")]
    pub sentiment_sample_size: usize,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct SentimentConfig {
    lexicon_path: Option<PathBuf>,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ReportConfig {
    format: Option<ReportFormat>,
    top_users: Option<usize>,
    product_min_reviews: Option<usize>,
    product_limit: Option<usize>,
    histogram_bins: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            preparation: PreparationConfig::default(),
            sentiment: SentimentConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: None,
        }
    }
}

impl Default for PreparationConfig {
    fn default() -> Self {
        Self {
            frequency_threshold: DEFAULT_FREQUENCY_THRESHOLD,
            sentiment_sample_size: DEFAULT_SENTIMENT_SAMPLE_SIZE,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: None,
            top_users: None,
            product_min_reviews: None,
            product_limit: None,
            histogram_bins: None,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        read_to_string("./config.toml")
            .or_else(|_| read_to_string("/config/config.toml"))
            .map_err(|err| err.to_string())
            .and_then(|v| Self::from_toml_str(&v))
            .unwrap_or_else(|err| {
                warn!("failed to read config: {}", err);
                Config::default()
            })
    }

    pub fn from_toml_str(config: &str) -> Result<Self, String> {
        toml::from_str(config).map_err(|err| err.to_string())
    }

    pub fn source(&self) -> SourceConfig {
        self.source.as_ref().cloned().unwrap_or_default()
    }

    pub fn preparation(&self) -> &PreparationConfig {
        &self.preparation
    }

    pub fn sentiment(&self) -> &SentimentConfig {
        &self.sentiment
    }

    pub fn report(&self) -> &ReportConfig {
        &self.report
    }
}

impl SourceConfig {
    pub fn path(&self) -> PathBuf {
        self.path.as_ref().cloned().unwrap_or_else(|| PathBuf::from("Reviews.csv"))
    }
}

impl SentimentConfig {
    pub fn lexicon_path(&self) -> Option<&Path> {
        self.lexicon_path.as_deref()
    }
}

impl ReportConfig {
    pub fn format(&self) -> ReportFormat {
        self.format.unwrap_or(ReportFormat::Text)
    }

    pub fn top_users(&self) -> usize {
        self.top_users.unwrap_or(10)
    }

    pub fn product_min_reviews(&self) -> usize {
        self.product_min_reviews.unwrap_or(500)
    }

    pub fn product_limit(&self) -> usize {
        self.product_limit.unwrap_or(20)
    }

    pub fn histogram_bins(&self) -> usize {
        self.histogram_bins.unwrap_or(50)
    }
}

fn default_frequency_threshold() -> usize {
    DEFAULT_FREQUENCY_THRESHOLD
}

fn default_sentiment_sample_size() -> usize {
    DEFAULT_SENTIMENT_SAMPLE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();

        assert_eq!(config.source().path(), PathBuf::from("Reviews.csv"));
        assert_eq!(config.preparation(), &PreparationConfig::default());
        assert_eq!(config.preparation().frequency_threshold, 50);
        assert_eq!(config.preparation().sentiment_sample_size, 50_000);
        assert!(config.sentiment().lexicon_path().is_none());
        assert_eq!(config.report().format(), ReportFormat::Text);
        assert_eq!(config.report().top_users(), 10);
        assert_eq!(config.report().product_min_reviews(), 500);
        assert_eq!(config.report().product_limit(), 20);
        assert_eq!(config.report().histogram_bins(), 50);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = Config::from_toml_str(r#"
[source]
path = "data/reviews.csv"

[preparation]
sentiment_sample_size = 1000

[sentiment]
lexicon_path = "extra.csv"

[report]
format = "json"
top_users = 3
"#).unwrap();

        assert_eq!(config.source().path(), PathBuf::from("data/reviews.csv"));
        assert_eq!(config.preparation().frequency_threshold, 50);
        assert_eq!(config.preparation().sentiment_sample_size, 1000);
        assert_eq!(config.sentiment().lexicon_path(), Some(Path::new("extra.csv")));
        assert_eq!(config.report().format(), ReportFormat::Json);
        assert_eq!(config.report().top_users(), 3);
        assert_eq!(config.report().product_limit(), 20);
    }

    #[test]
    fn unknown_report_format_is_rejected() {
        assert!(Config::from_toml_str("[report]\nformat = \"html\"").is_err());
    }
}
