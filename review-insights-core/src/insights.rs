use {
    std::collections::{BTreeMap, HashMap},
    serde::Serialize,
    chrono::{DateTime, Utc},
    crate::{
        entity::{PreparedReview, ViewerType},
        preparation::PreparedTable,
        sentiment::Sentiment,
    },
};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ScoreCount {
    pub score: u8,
    pub count: usize,
    pub percent: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ScoreDistribution {
    pub viewer_type: ViewerType,
    pub total: usize,
    pub scores: Vec<ScoreCount>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UserActivity {
    pub user_id: String,
    pub reviews: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProductScores {
    pub product_id: String,
    pub reviews: usize,
    // index 0 holds one star reviews
    pub score_counts: [usize; 5],
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LengthSummary {
    pub count: usize,
    pub min: usize,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: usize,
    pub mean: f64,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SentimentBreakdown {
    pub analyzed: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DateRange {
    pub first: DateTime<Utc>,
    pub last: DateTime<Utc>,
}

pub fn score_distribution(table: &PreparedTable, viewer_type: ViewerType) -> ScoreDistribution {
    let mut counts = BTreeMap::new();
    let mut total = 0;
    for review in reviews_of(table, viewer_type) {
        *counts.entry(review.score()).or_insert(0) += 1;
        total += 1;
    }

    let scores = counts.into_iter()
        .map(|(score, count)| ScoreCount {
            score,
            count,
            percent: round_to_hundredths(count as f64 / total as f64 * 100.0),
        })
        .collect();

    ScoreDistribution {
        viewer_type,
        total,
        scores,
    }
}

/// Users ranked by number of reviewed products. Ties are ordered by user id.
pub fn top_users(table: &PreparedTable, limit: usize) -> Vec<UserActivity> {
    let mut users: Vec<_> = table.user_counts().iter().collect();
    users.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    users.into_iter()
        .take(limit)
        .map(|(user_id, reviews)| UserActivity {
            user_id: user_id.to_owned(),
            reviews,
        })
        .collect()
}

/// Score breakdown of products with more than `min_reviews` reviews, most reviewed first.
pub fn product_score_breakdown(table: &PreparedTable, min_reviews: usize, limit: usize) -> Vec<ProductScores> {
    let mut products: HashMap<&str, [usize; 5]> = HashMap::new();
    for review in table.reviews() {
        let counts = products.entry(review.product_id()).or_insert([0; 5]);
        if let Some(count) = score_index(review.score()).and_then(|i| counts.get_mut(i)) {
            *count += 1;
        }
    }

    let mut products: Vec<ProductScores> = products.into_iter()
        .map(|(product_id, score_counts)| ProductScores {
            product_id: product_id.to_owned(),
            reviews: score_counts.iter().sum(),
            score_counts,
        })
        .filter(|product| product.reviews > min_reviews)
        .collect();
    products.sort_by(|a, b| b.reviews.cmp(&a.reviews).then_with(|| a.product_id.cmp(&b.product_id)));
    products.truncate(limit);

    products
}

pub fn review_length_summary(table: &PreparedTable, viewer_type: ViewerType) -> Option<LengthSummary> {
    let mut lengths: Vec<usize> = reviews_of(table, viewer_type)
        .map(PreparedReview::text_length)
        .collect();
    if lengths.is_empty() {
        return None;
    }
    lengths.sort_unstable();

    let count = lengths.len();
    Some(LengthSummary {
        count,
        min: lengths[0],
        q1: quantile(&lengths, 0.25),
        median: quantile(&lengths, 0.5),
        q3: quantile(&lengths, 0.75),
        max: lengths[count - 1],
        mean: lengths.iter().sum::<usize>() as f64 / count as f64,
    })
}

pub fn sentiment_breakdown(table: &PreparedTable) -> SentimentBreakdown {
    let mut breakdown = SentimentBreakdown::default();

    for polarity in table.reviews().iter().filter_map(PreparedReview::polarity) {
        breakdown.analyzed += 1;
        match Sentiment::from_polarity(polarity) {
            Sentiment::Positive => breakdown.positive += 1,
            Sentiment::Negative => breakdown.negative += 1,
            Sentiment::Neutral => breakdown.neutral += 1,
        }
    }

    breakdown
}

/// Histogram of sampled polarities over `[-1, 1]` split into `bins` equal bins.
/// The last bin includes its upper edge.
pub fn polarity_histogram(table: &PreparedTable, bins: usize) -> Vec<HistogramBin> {
    if bins == 0 {
        return Vec::new();
    }

    let width = 2.0 / bins as f64;
    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: -1.0 + width * i as f64,
            upper: if i + 1 == bins { 1.0 } else { -1.0 + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for polarity in table.reviews().iter().filter_map(PreparedReview::polarity) {
        let index = ((polarity.clamp(-1.0, 1.0) + 1.0) / width).floor() as usize;
        histogram[index.min(bins - 1)].count += 1;
    }

    histogram
}

pub fn date_range(table: &PreparedTable) -> Option<DateRange> {
    let first = table.reviews().iter().map(PreparedReview::time).min()?;
    let last = table.reviews().iter().map(PreparedReview::time).max()?;

    Some(DateRange {
        first,
        last,
    })
}

impl SentimentBreakdown {
    pub fn percent(&self, sentiment: Sentiment) -> f64 {
        if self.analyzed == 0 {
            return 0.0;
        }

        let count = match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        };
        round_to_hundredths(count as f64 / self.analyzed as f64 * 100.0)
    }
}

impl ScoreDistribution {
    pub fn percent(&self, score: u8) -> f64 {
        self.scores.iter()
            .find(|v| v.score == score)
            .map(|v| v.percent)
            .unwrap_or(0.0)
    }
}

impl ProductScores {
    pub fn count(&self, score: u8) -> usize {
        score_index(score)
            .and_then(|i| self.score_counts.get(i))
            .copied()
            .unwrap_or(0)
    }
}

fn reviews_of(table: &PreparedTable, viewer_type: ViewerType) -> impl Iterator<Item = &PreparedReview> {
    table.reviews().iter().filter(move |review| review.viewer_type() == viewer_type)
}

fn score_index(score: u8) -> Option<usize> {
    usize::from(score).checked_sub(1)
}

// linear interpolation between closest ranks
fn quantile(sorted: &[usize], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    sorted[lower] as f64 + (sorted[upper] as f64 - sorted[lower] as f64) * fraction
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            config::PreparationConfig,
            entity::RawReview,
            preparation::ReviewDatasetPreparer,
            sentiment::LexiconScorer,
        },
    };

    fn raw(user_id: &str, product_id: &str, score: u8, time: i64, summary: &str, text: &str) -> RawReview {
        RawReview {
            id: None,
            product_id: product_id.to_owned(),
            user_id: user_id.to_owned(),
            profile_name: None,
            helpfulness_numerator: 0,
            helpfulness_denominator: 0,
            score,
            time: time.to_string(),
            summary: Some(summary.to_owned()),
            text: Some(text.to_owned()),
            line: 0,
        }
    }

    fn table(reviews: Vec<RawReview>, frequency_threshold: usize) -> PreparedTable {
        let config = PreparationConfig {
            frequency_threshold,
            ..PreparationConfig::default()
        };
        ReviewDatasetPreparer::new(config, LexiconScorer::default())
            .prepare_raw(reviews)
            .unwrap()
    }

    fn sample() -> PreparedTable {
        table(vec![
            raw("A1", "P1", 5, 10, "Great", "one two three"),
            raw("A1", "P1", 4, 20, "Good", "one two three four five"),
            raw("A1", "P2", 5, 30, "Delicious", "one"),
            raw("A2", "P1", 1, 40, "Awful", "one two"),
            raw("A3", "P2", 3, 5, "Box of taffy", "one two three four"),
        ], 2)
    }

    #[test]
    fn score_distribution_per_viewer_type() {
        let table = sample();

        let frequent = score_distribution(&table, ViewerType::Frequent);
        assert_eq!(frequent.total, 3);
        assert_eq!(frequent.scores, vec![
            ScoreCount { score: 4, count: 1, percent: 33.33 },
            ScoreCount { score: 5, count: 2, percent: 66.67 },
        ]);
        assert_eq!(frequent.percent(5), 66.67);
        assert_eq!(frequent.percent(1), 0.0);

        let other = score_distribution(&table, ViewerType::NotFrequent);
        assert_eq!(other.total, 2);
        assert_eq!(other.scores.iter().map(|v| v.score).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn empty_group_has_empty_distribution() {
        let none = table_with_no_frequent();
        let distribution = score_distribution(&none, ViewerType::Frequent);
        assert_eq!(distribution.total, 0);
        assert!(distribution.scores.is_empty());
        assert_eq!(review_length_summary(&none, ViewerType::Frequent), None);
    }

    fn table_with_no_frequent() -> PreparedTable {
        table(vec![raw("A1", "P1", 5, 10, "Great", "text")], 50)
    }

    #[test]
    fn top_users_rank_by_reviews_then_id() {
        let table = sample();

        assert_eq!(top_users(&table, 2), vec![
            UserActivity { user_id: "A1".to_owned(), reviews: 3 },
            UserActivity { user_id: "A2".to_owned(), reviews: 1 },
        ]);
        assert_eq!(top_users(&table, 10).len(), 3);
    }

    #[test]
    fn product_breakdown_only_includes_heavily_reviewed_products() {
        let table = sample();

        let products = product_score_breakdown(&table, 2, 20);
        assert_eq!(products, vec![
            ProductScores { product_id: "P1".to_owned(), reviews: 3, score_counts: [1, 0, 0, 1, 1] },
        ]);
        assert_eq!(products[0].count(1), 1);
        assert_eq!(products[0].count(9), 0);

        let products = product_score_breakdown(&table, 0, 1);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].product_id, "P1");
    }

    #[test]
    fn review_length_summary_uses_interpolated_quartiles() {
        let table = sample();

        let summary = review_length_summary(&table, ViewerType::Frequent).unwrap();
        assert_eq!(summary, LengthSummary {
            count: 3,
            min: 1,
            q1: 2.0,
            median: 3.0,
            q3: 4.0,
            max: 5,
            mean: 3.0,
        });

        let summary = review_length_summary(&table, ViewerType::NotFrequent).unwrap();
        assert_eq!(summary.q1, 2.5);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q3, 3.5);
    }

    #[test]
    fn sentiment_breakdown_counts_scored_prefix_only() {
        let table = sample();

        let breakdown = sentiment_breakdown(&table);
        assert_eq!(breakdown, SentimentBreakdown { analyzed: 5, positive: 3, negative: 1, neutral: 1 });
        assert_eq!(breakdown.percent(Sentiment::Positive), 60.0);
        assert_eq!(SentimentBreakdown::default().percent(Sentiment::Positive), 0.0);

        let mut partial = sample();
        partial.score_sentiment(&LexiconScorer::default(), 2);
        assert_eq!(sentiment_breakdown(&partial).analyzed, 2);
    }

    #[test]
    fn histogram_bins_cover_the_polarity_range() {
        let table = sample();

        let histogram = polarity_histogram(&table, 4);
        assert_eq!(histogram.len(), 4);
        assert_eq!(histogram[0].lower, -1.0);
        assert_eq!(histogram[3].upper, 1.0);
        assert_eq!(histogram.iter().map(|v| v.count).sum::<usize>(), 5);
        // awful sits on the lower edge, delicious on the closed upper edge
        assert_eq!(histogram[0].count, 1);
        assert_eq!(histogram[2].count, 1);
        assert_eq!(histogram[3].count, 3);
        assert!(polarity_histogram(&table, 0).is_empty());
    }

    #[test]
    fn date_range_spans_all_reviews() {
        let table = sample();

        let range = date_range(&table).unwrap();
        assert_eq!(range.first.timestamp(), 5);
        assert_eq!(range.last.timestamp(), 40);
        assert_eq!(date_range(&table_empty()), None);
    }

    fn table_empty() -> PreparedTable {
        table(Vec::new(), 50)
    }
}
