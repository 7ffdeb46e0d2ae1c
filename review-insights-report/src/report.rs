use {
    std::fmt,
    serde::Serialize,
    chrono::{DateTime, Utc},
    review_insights_core::{
        config::ReportConfig,
        entity::ViewerType,
        insights::{
            score_distribution,
            top_users,
            product_score_breakdown,
            review_length_summary,
            sentiment_breakdown,
            polarity_histogram,
            date_range,
            ScoreDistribution,
            UserActivity,
            ProductScores,
            LengthSummary,
            SentimentBreakdown,
            HistogramBin,
        },
        preparation::PreparedTable,
        sentiment::Sentiment,
    },
};

const VIEWER_TYPES: [ViewerType; 2] = [ViewerType::Frequent, ViewerType::NotFrequent];
const HISTOGRAM_WIDTH: usize = 40;

#[derive(Serialize, Debug)]
pub struct Report {
    source: String,
    overview: Overview,
    score_distribution: Vec<ScoreDistribution>,
    top_users: Vec<UserActivity>,
    product_min_reviews: usize,
    products: Vec<ProductScores>,
    review_length: Vec<ViewerLength>,
    sentiment: SentimentSection,
    insights: Vec<String>,
}

#[derive(Serialize, Debug)]
struct Overview {
    reviews: usize,
    loaded: usize,
    dropped_invalid_helpfulness: usize,
    dropped_duplicates: usize,
    users: usize,
    frequent_users: usize,
    frequency_threshold: usize,
    first_review: Option<DateTime<Utc>>,
    last_review: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug)]
struct ViewerLength {
    viewer_type: ViewerType,
    summary: Option<LengthSummary>,
}

#[derive(Serialize, Debug)]
struct SentimentSection {
    breakdown: SentimentBreakdown,
    fallbacks: usize,
    histogram: Vec<HistogramBin>,
}

impl Report {
    pub fn build(source: impl Into<String>, table: &PreparedTable, config: &ReportConfig) -> Self {
        let stats = table.stats();
        let range = date_range(table);

        let overview = Overview {
            reviews: table.len(),
            loaded: stats.loaded,
            dropped_invalid_helpfulness: stats.invalid_helpfulness,
            dropped_duplicates: stats.duplicates,
            users: table.user_counts().len(),
            frequent_users: table.user_counts().frequent_users(table.frequency_threshold()),
            frequency_threshold: table.frequency_threshold(),
            first_review: range.as_ref().map(|v| v.first),
            last_review: range.as_ref().map(|v| v.last),
        };

        let score_distribution = VIEWER_TYPES.iter()
            .map(|viewer_type| score_distribution(table, *viewer_type))
            .collect();
        let review_length = VIEWER_TYPES.iter()
            .map(|viewer_type| ViewerLength {
                viewer_type: *viewer_type,
                summary: review_length_summary(table, *viewer_type),
            })
            .collect();
        let sentiment = SentimentSection {
            breakdown: sentiment_breakdown(table),
            fallbacks: stats.sentiment_fallbacks,
            histogram: polarity_histogram(table, config.histogram_bins()),
        };

        let mut report = Self {
            source: source.into(),
            overview,
            score_distribution,
            top_users: top_users(table, config.top_users()),
            product_min_reviews: config.product_min_reviews(),
            products: product_score_breakdown(table, config.product_min_reviews(), config.product_limit()),
            review_length,
            sentiment,
            insights: Vec::new(),
        };
        report.insights = report.summarize();

        report
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn insights(&self) -> &[String] {
        &self.insights
    }

    fn distribution(&self, viewer_type: ViewerType) -> Option<&ScoreDistribution> {
        self.score_distribution.iter().find(|v| v.viewer_type == viewer_type)
    }

    fn length(&self, viewer_type: ViewerType) -> Option<&LengthSummary> {
        self.review_length.iter()
            .find(|v| v.viewer_type == viewer_type)
            .and_then(|v| v.summary.as_ref())
    }

    fn summarize(&self) -> Vec<String> {
        let mut insights = Vec::new();

        if let (Some(frequent), Some(other)) = (self.length(ViewerType::Frequent), self.length(ViewerType::NotFrequent)) {
            let comparison = if frequent.median > other.median {
                "longer"
            } else if frequent.median < other.median {
                "shorter"
            } else {
                "equally long"
            };
            insights.push(format!(
                "Frequent reviewers write {} reviews: median of {:.1} words against {:.1} for other reviewers.",
                comparison, frequent.median, other.median,
            ));
        }

        if let (Some(frequent), Some(other)) = (self.distribution(ViewerType::Frequent), self.distribution(ViewerType::NotFrequent)) {
            if frequent.total > 0 && other.total > 0 {
                insights.push(format!(
                    "{:.2}% of ratings from frequent reviewers are 5 stars, compared to {:.2}% from other reviewers.",
                    frequent.percent(5), other.percent(5),
                ));
            }
        }

        let breakdown = &self.sentiment.breakdown;
        if breakdown.analyzed > 0 {
            insights.push(format!(
                "{:.2}% of {} analyzed summaries are positive and {:.2}% are negative.",
                breakdown.percent(Sentiment::Positive), breakdown.analyzed, breakdown.percent(Sentiment::Negative),
            ));
        }

        if let Some(product) = self.products.first() {
            insights.push(format!(
                "Most reviewed product is {} with {} reviews, {} of them 5 stars.",
                product.product_id, product.reviews, product.count(5),
            ));
        }

        if let Some(user) = self.top_users.first() {
            insights.push(format!("Most active reviewer is {} with {} reviews.", user.user_id, user.reviews));
        }

        insights
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overview = &self.overview;
        section(f, "Overview")?;
        writeln!(f, "source: {}", self.source)?;
        writeln!(
            f,
            "reviews: {} ({} loaded, {} with invalid helpfulness, {} duplicates)",
            overview.reviews, overview.loaded, overview.dropped_invalid_helpfulness, overview.dropped_duplicates,
        )?;
        writeln!(
            f,
            "users: {} ({} with more than {} reviews)",
            overview.users, overview.frequent_users, overview.frequency_threshold,
        )?;
        if let (Some(first), Some(last)) = (overview.first_review, overview.last_review) {
            writeln!(f, "reviews written between {} and {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d"))?;
        }

        section(f, "Score distribution")?;
        for distribution in &self.score_distribution {
            writeln!(f, "{} ({} reviews)", distribution.viewer_type, distribution.total)?;
            for score in &distribution.scores {
                writeln!(f, "  {} stars: {:>8} {:>7.2}%", score.score, score.count, score.percent)?;
            }
        }

        section(f, "Top users")?;
        for (rank, user) in self.top_users.iter().enumerate() {
            writeln!(f, "{:>3}. {:<24} {}", rank + 1, user.user_id, user.reviews)?;
        }

        section(f, "Product vs score")?;
        if self.products.is_empty() {
            writeln!(f, "no products with more than {} reviews", self.product_min_reviews)?;
        } else {
            writeln!(f, "{:<14} {:>7} {:>6} {:>6} {:>6} {:>6} {:>6}", "product", "reviews", "1", "2", "3", "4", "5")?;
            for product in &self.products {
                write!(f, "{:<14} {:>7}", product.product_id, product.reviews)?;
                for count in product.score_counts {
                    write!(f, " {:>6}", count)?;
                }
                writeln!(f)?;
            }
        }

        section(f, "Review length")?;
        for length in &self.review_length {
            match &length.summary {
                Some(v) => writeln!(
                    f,
                    "{:<12} n={} min={} q1={:.1} median={:.1} q3={:.1} max={} mean={:.2}",
                    length.viewer_type.label(), v.count, v.min, v.q1, v.median, v.q3, v.max, v.mean,
                )?,
                None => writeln!(f, "{:<12} no reviews", length.viewer_type.label())?,
            }
        }

        section(f, "Sentiment")?;
        let breakdown = &self.sentiment.breakdown;
        writeln!(f, "analyzed summaries: {} ({} scored as neutral after a failure)", breakdown.analyzed, self.sentiment.fallbacks)?;
        writeln!(f, "positive: {} ({:.2}%)", breakdown.positive, breakdown.percent(Sentiment::Positive))?;
        writeln!(f, "negative: {} ({:.2}%)", breakdown.negative, breakdown.percent(Sentiment::Negative))?;
        writeln!(f, "neutral:  {} ({:.2}%)", breakdown.neutral, breakdown.percent(Sentiment::Neutral))?;
        let peak = self.sentiment.histogram.iter().map(|v| v.count).max().unwrap_or(0);
        let last = self.sentiment.histogram.len().saturating_sub(1);
        for (i, bin) in self.sentiment.histogram.iter().enumerate().filter(|(_, v)| v.count > 0) {
            let bar = "#".repeat((bin.count * HISTOGRAM_WIDTH).div_ceil(peak));
            let close = if i == last { ']' } else { ')' };
            writeln!(f, "[{:>5.2}, {:>5.2}{} {:>8} {}", bin.lower, bin.upper, close, bin.count, bar)?;
        }

        section(f, "Insights")?;
        for insight in &self.insights {
            writeln!(f, "- {}", insight)?;
        }

        Ok(())
    }
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "== {} ==", title)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        review_insights_core::{config::Config, preparation::ReviewDatasetPreparer, sentiment::LexiconScorer},
    };

    const SOURCE: &str = "Id,ProductId,UserId,ProfileName,HelpfulnessNumerator,HelpfulnessDenominator,Score,Time,Summary,Text\n\
                          1,B001,A1,alice,1,1,5,1303862400,Great taffy,Great taffy at a great price\n\
                          2,B001,A1,alice,0,0,5,1303948800,Delicious,Yay\n\
                          3,B002,A1,alice,0,0,4,1304035200,Good,Good enough for me\n\
                          4,B001,A2,bob,0,1,1,1304121600,Awful,Stale and bland taffy\n\
                          5,B002,A3,carol,2,1,3,1304208000,Okay,Invalid helpfulness\n";

    fn report(config: &str) -> Report {
        let table = ReviewDatasetPreparer::<LexiconScorer>::default()
            .prepare_reader(SOURCE.as_bytes())
            .unwrap();
        let config = Config::from_toml_str(config).unwrap();

        Report::build("reviews.csv", &table, config.report())
    }

    #[test]
    fn text_report_contains_every_section() {
        let text = report("").to_string();

        for title in ["Overview", "Score distribution", "Top users", "Product vs score", "Review length", "Sentiment", "Insights"] {
            assert!(text.contains(&format!("== {} ==", title)), "missing section {}", title);
        }
        assert!(text.contains("reviews: 4 (5 loaded, 1 with invalid helpfulness, 0 duplicates)"));
        assert!(text.contains("no products with more than 500 reviews"));
        assert!(text.contains("reviews written between 2011-04-27 and 2011-04-30"));
    }

    #[test]
    fn only_the_last_histogram_bin_is_closed() {
        let text = report("").to_string();

        // delicious scores 1.0, awful scores -1.0
        assert!(text.contains("[ 0.96,  1.00]"));
        assert!(text.contains("[-1.00, -0.96)"));
        assert!(!text.contains("[ 0.96,  1.00)"));
    }

    #[test]
    fn product_section_follows_config() {
        let report = report("[report]\nproduct_min_reviews = 2\ntop_users = 1");

        assert_eq!(report.products.len(), 1);
        assert_eq!(report.products[0].product_id, "B001");
        assert_eq!(report.top_users.len(), 1);
        assert_eq!(report.top_users[0].user_id, "A1");
    }

    #[test]
    fn insights_are_computed_from_the_table() {
        let report = report("[report]\nproduct_min_reviews = 0");

        let insights = report.insights();
        assert!(insights.iter().any(|v| v == "Most reviewed product is B001 with 3 reviews, 2 of them 5 stars."));
        assert!(insights.iter().any(|v| v == "Most active reviewer is A1 with 3 reviews."));
        assert!(insights.iter().any(|v| v.starts_with("75.00% of 4 analyzed summaries are positive")));
        // with the default threshold nobody is frequent, so there is nothing to compare
        assert!(!insights.iter().any(|v| v.starts_with("Frequent reviewers write")));
    }

    #[test]
    fn json_report_is_structured() {
        let json: serde_json::Value = serde_json::from_str(&report("").to_json().unwrap()).unwrap();

        assert_eq!(json["overview"]["reviews"], 4);
        assert_eq!(json["score_distribution"][1]["viewer_type"], "Not Frequent");
        assert_eq!(json["sentiment"]["breakdown"]["analyzed"], 4);
        assert_eq!(json["sentiment"]["histogram"].as_array().unwrap().len(), 50);
        assert!(json["review_length"][0]["summary"].is_null());
    }
}
