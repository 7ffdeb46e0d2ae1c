use {
    std::{collections::{HashMap, HashSet}, io::Read, path::Path},
    tracing::{info, trace},
    chrono::{DateTime, Utc},
    crate::{
        config::PreparationConfig,
        data_loading::{load_reviews, load_reviews_from_path},
        entity::{RawReview, TimedReview, PreparedReview, ViewerType, NULL_TEXT},
        error::{PrepareError, TimeParseError},
        progress::Progress,
        sentiment::{SentimentScorer, SentimentError, LexiconScorer, NEUTRAL_POLARITY},
    },
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparationStats {
    pub loaded: usize,
    pub invalid_helpfulness: usize,
    pub duplicates: usize,
    pub prepared: usize,
    pub sentiment_scored: usize,
    pub sentiment_fallbacks: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserReviewCounts {
    counts: HashMap<String, usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentScoring {
    pub scored: usize,
    pub fallbacks: usize,
}

/// Immutable snapshot of the prepared review table.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTable {
    reviews: Vec<PreparedReview>,
    user_counts: UserReviewCounts,
    frequency_threshold: usize,
    stats: PreparationStats,
}

pub struct ReviewDatasetPreparer<S = LexiconScorer> {
    config: PreparationConfig,
    scorer: S,
}

impl<S: SentimentScorer> ReviewDatasetPreparer<S> {
    pub fn new(config: PreparationConfig, scorer: S) -> Self {
        Self {
            config,
            scorer,
        }
    }

    pub fn prepare_path(&self, path: &Path) -> Result<PreparedTable, PrepareError> {
        let raw = load_reviews_from_path(path)?;
        self.prepare_raw(raw)
    }

    pub fn prepare_reader<R: Read>(&self, source: R) -> Result<PreparedTable, PrepareError> {
        let raw = load_reviews(source)?;
        self.prepare_raw(raw)
    }

    pub fn prepare_raw(&self, raw: Vec<RawReview>) -> Result<PreparedTable, PrepareError> {
        let loaded = raw.len();

        let valid = filter_invalid_helpfulness(raw);
        let invalid_helpfulness = loaded - valid.len();
        info!("dropped {} reviews with helpfulness numerator above denominator", invalid_helpfulness);

        let valid_count = valid.len();
        let unique = deduplicate(valid);
        let duplicates = valid_count - unique.len();
        info!("dropped {} duplicate reviews", duplicates);

        let timed = normalize_time(unique)?;
        let (reviews, user_counts) = classify_reviews(timed, self.config.frequency_threshold);
        info!(
            "prepared {} reviews from {} users ({} frequent)",
            reviews.len(),
            user_counts.len(),
            user_counts.frequent_users(self.config.frequency_threshold),
        );

        let mut table = PreparedTable {
            stats: PreparationStats {
                loaded,
                invalid_helpfulness,
                duplicates,
                prepared: reviews.len(),
                ..PreparationStats::default()
            },
            reviews,
            user_counts,
            frequency_threshold: self.config.frequency_threshold,
        };

        table.score_sentiment(&self.scorer, self.config.sentiment_sample_size);

        Ok(table)
    }
}

impl Default for ReviewDatasetPreparer<LexiconScorer> {
    fn default() -> Self {
        Self::new(PreparationConfig::default(), LexiconScorer::default())
    }
}

impl PreparedTable {
    pub fn reviews(&self) -> &[PreparedReview] {
        &self.reviews
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    pub fn user_counts(&self) -> &UserReviewCounts {
        &self.user_counts
    }

    pub fn frequency_threshold(&self) -> usize {
        self.frequency_threshold
    }

    pub fn stats(&self) -> &PreparationStats {
        &self.stats
    }

    /// The prefix of reviews carrying a polarity.
    pub fn scored_reviews(&self) -> &[PreparedReview] {
        &self.reviews[..self.stats.sentiment_scored]
    }

    /// Scores the first `limit` reviews and clears polarity everywhere else.
    /// Failed and non-finite scores are recorded as neutral instead of failing
    /// the batch; finite scores are clamped to `[-1, 1]`.
    pub fn score_sentiment<S: SentimentScorer + ?Sized>(&mut self, scorer: &S, limit: usize) -> SentimentScoring {
        let limit = limit.min(self.reviews.len());
        let mut scoring = SentimentScoring::default();
        let mut progress = Progress::new("scoring review sentiment");

        for review in &mut self.reviews[limit..] {
            review.clear_polarity();
        }

        for review in &mut self.reviews[..limit] {
            let polarity = match scorer.polarity(review.sentiment_text()).and_then(bounded_polarity) {
                Ok(polarity) => polarity,
                Err(err) => {
                    trace!("using neutral polarity for review of user {}: {}", review.user_id(), err);
                    scoring.fallbacks += 1;
                    NEUTRAL_POLARITY
                },
            };
            review.set_polarity(polarity);
            scoring.scored += 1;
            progress.update();
        }

        if limit > 0 {
            progress.finish();
        }
        if scoring.fallbacks > 0 {
            info!("{} of {} summaries could not be scored and were treated as neutral", scoring.fallbacks, scoring.scored);
        }

        self.stats.sentiment_scored = scoring.scored;
        self.stats.sentiment_fallbacks = scoring.fallbacks;

        scoring
    }
}

impl UserReviewCounts {
    pub fn from_reviews(reviews: &[TimedReview]) -> Self {
        let mut counts = HashMap::new();
        for review in reviews {
            *counts.entry(review.user_id.clone()).or_insert(0) += 1;
        }

        Self {
            counts,
        }
    }

    pub fn get(&self, user_id: &str) -> usize {
        self.counts.get(user_id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(user_id, count)| (user_id.as_str(), *count))
    }

    pub fn frequent_users(&self, threshold: usize) -> usize {
        self.counts.values().filter(|count| **count > threshold).count()
    }
}

pub fn filter_invalid_helpfulness(reviews: Vec<RawReview>) -> Vec<RawReview> {
    reviews.into_iter()
        .filter(RawReview::is_helpfulness_valid)
        .collect()
}

/// Keeps the first review for every (user, profile name, time, text) combination.
pub fn deduplicate(reviews: Vec<RawReview>) -> Vec<RawReview> {
    let mut seen = HashSet::new();

    reviews.into_iter()
        .filter(|review| seen.insert((
            review.user_id.clone(),
            review.profile_name.clone(),
            review.time.trim().to_owned(),
            review.text.clone(),
        )))
        .collect()
}

pub fn normalize_time(reviews: Vec<RawReview>) -> Result<Vec<TimedReview>, TimeParseError> {
    reviews.into_iter()
        .map(|review| {
            let time = parse_epoch_seconds(&review.time, review.line)?;
            Ok(review.with_time(time))
        })
        .collect()
}

pub fn parse_epoch_seconds(value: &str, line: u64) -> Result<DateTime<Utc>, TimeParseError> {
    value.trim()
        .parse::<i64>()
        .ok()
        .and_then(|seconds| DateTime::<Utc>::from_timestamp(seconds, 0))
        .ok_or_else(|| TimeParseError {
            line,
            value: value.to_owned(),
        })
}

/// Whitespace token count of the text, with a missing text counted as its
/// null representation (one word). Information separators U+001C..U+001F
/// split words as well.
pub fn text_length(text: Option<&str>) -> usize {
    text.unwrap_or(NULL_TEXT)
        .split(is_word_separator)
        .filter(|word| !word.is_empty())
        .count()
}

fn is_word_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

fn bounded_polarity(polarity: f64) -> Result<f64, SentimentError> {
    if polarity.is_finite() {
        Ok(polarity.clamp(-1.0, 1.0))
    } else {
        Err(SentimentError::NonFinite)
    }
}

/// Counts reviews per user over the whole set first, then labels every review.
pub fn classify_reviews(reviews: Vec<TimedReview>, frequency_threshold: usize) -> (Vec<PreparedReview>, UserReviewCounts) {
    let user_counts = UserReviewCounts::from_reviews(&reviews);

    let prepared = reviews.into_iter()
        .map(|review| {
            let user_review_count = user_counts.get(&review.user_id);
            let text_length = text_length(review.text.as_deref());

            PreparedReview::builder()
                .id(review.id)
                .product_id(review.product_id)
                .user_id(review.user_id)
                .profile_name(review.profile_name)
                .helpfulness_numerator(review.helpfulness_numerator)
                .helpfulness_denominator(review.helpfulness_denominator)
                .score(review.score)
                .time(review.time)
                .summary(review.summary)
                .text(review.text)
                .text_length(text_length)
                .viewer_type(ViewerType::classify(user_review_count, frequency_threshold))
                .user_review_count(user_review_count)
                .build()
        })
        .collect();

    (prepared, user_counts)
}
