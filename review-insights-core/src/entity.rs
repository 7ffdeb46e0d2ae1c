use {
    std::fmt,
    typed_builder::TypedBuilder,
    serde::{Serialize, Deserialize},
    chrono::{DateTime, Utc},
};

// string form of a missing cell, counted and scored like any other text
pub const NULL_TEXT: &str = "nan";

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RawReview {
    #[serde(rename = "Id", default)]
    pub id: Option<u64>,
    #[serde(rename = "ProductId")]
    pub product_id: String,
    #[serde(rename = "UserId")]
    pub user_id: String,
    #[serde(rename = "ProfileName")]
    pub profile_name: Option<String>,
    #[serde(rename = "HelpfulnessNumerator")]
    pub helpfulness_numerator: u32,
    #[serde(rename = "HelpfulnessDenominator")]
    pub helpfulness_denominator: u32,
    #[serde(rename = "Score")]
    pub score: u8,
    // kept raw until time normalization
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Summary")]
    pub summary: Option<String>,
    #[serde(rename = "Text")]
    pub text: Option<String>,

    #[serde(skip)]
    pub line: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimedReview {
    pub id: Option<u64>,
    pub product_id: String,
    pub user_id: String,
    pub profile_name: Option<String>,
    pub helpfulness_numerator: u32,
    pub helpfulness_denominator: u32,
    pub score: u8,
    pub time: DateTime<Utc>,
    pub summary: Option<String>,
    pub text: Option<String>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerType {
    Frequent,
    #[serde(rename = "Not Frequent")]
    NotFrequent,
}

#[derive(TypedBuilder, Serialize, Debug, Clone, PartialEq)]
pub struct PreparedReview {
    #[builder(default)]
    id: Option<u64>,
    product_id: String,
    user_id: String,
    #[builder(default)]
    profile_name: Option<String>,
    helpfulness_numerator: u32,
    helpfulness_denominator: u32,
    score: u8,
    time: DateTime<Utc>,
    #[builder(default)]
    summary: Option<String>,
    #[builder(default)]
    text: Option<String>,

    text_length: usize,
    viewer_type: ViewerType,
    user_review_count: usize,
    #[builder(default)]
    polarity: Option<f64>,
}

impl RawReview {
    pub fn is_helpfulness_valid(&self) -> bool {
        self.helpfulness_numerator <= self.helpfulness_denominator
    }

    pub fn with_time(self, time: DateTime<Utc>) -> TimedReview {
        TimedReview {
            id: self.id,
            product_id: self.product_id,
            user_id: self.user_id,
            profile_name: self.profile_name,
            helpfulness_numerator: self.helpfulness_numerator,
            helpfulness_denominator: self.helpfulness_denominator,
            score: self.score,
            time,
            summary: self.summary,
            text: self.text,
        }
    }
}

impl ViewerType {
    pub fn classify(user_review_count: usize, threshold: usize) -> Self {
        if user_review_count > threshold {
            Self::Frequent
        } else {
            Self::NotFrequent
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Frequent => "Frequent",
            Self::NotFrequent => "Not Frequent",
        }
    }
}

impl fmt::Display for ViewerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl PreparedReview {
    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn profile_name(&self) -> Option<&str> {
        self.profile_name.as_deref()
    }

    pub fn helpfulness_numerator(&self) -> u32 {
        self.helpfulness_numerator
    }

    pub fn helpfulness_denominator(&self) -> u32 {
        self.helpfulness_denominator
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn text_length(&self) -> usize {
        self.text_length
    }

    pub fn viewer_type(&self) -> ViewerType {
        self.viewer_type
    }

    pub fn user_review_count(&self) -> usize {
        self.user_review_count
    }

    pub fn polarity(&self) -> Option<f64> {
        self.polarity
    }

    /// Text used for sentiment scoring. A missing summary is scored as its
    /// null representation, never replaced by the review body.
    pub fn sentiment_text(&self) -> &str {
        self.summary.as_deref().unwrap_or(NULL_TEXT)
    }

    pub(crate) fn set_polarity(&mut self, polarity: f64) {
        self.polarity = Some(polarity);
    }

    pub(crate) fn clear_polarity(&mut self) {
        self.polarity = None;
    }
}
