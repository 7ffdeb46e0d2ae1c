use {
    serde::Serialize,
    thiserror::Error,
    crate::lexicon::Lexicon,
};

pub const NEUTRAL_POLARITY: f64 = 0.0;

// applied to a sentiment word that follows a negation in the same clause
const NEGATION_FACTOR: f64 = -0.5;

#[derive(Debug, Error, PartialEq)]
pub enum SentimentError {
    #[error("polarity evaluated to a non-finite value")]
    NonFinite,
}

pub trait SentimentScorer {
    /// Polarity in `[-1.0, 1.0]`, or the reason the text could not be scored.
    fn polarity(&self, text: &str) -> Result<f64, SentimentError>;
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone)]
pub struct LexiconScorer {
    lexicon: Lexicon,
}

impl LexiconScorer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self {
            lexicon,
        }
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new(Lexicon::builtin())
    }
}

impl SentimentScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> Result<f64, SentimentError> {
        let mut assessments = Vec::new();
        let mut intensity = 1.0;
        let mut negated = false;

        for token in tokenize(text) {
            let word = match token {
                Token::Word(word) => word,
                Token::ClauseBreak => {
                    intensity = 1.0;
                    negated = false;
                    continue;
                },
            };

            if self.lexicon.is_negation(&word) {
                negated = true;
            } else if let Some(factor) = self.lexicon.intensity(&word) {
                intensity *= factor;
            } else if let Some(polarity) = self.lexicon.polarity(&word) {
                let mut assessment = polarity * intensity;
                if negated {
                    assessment *= NEGATION_FACTOR;
                }
                assessments.push(assessment);
                intensity = 1.0;
                negated = false;
            } else {
                intensity = 1.0;
            }
        }

        if assessments.is_empty() {
            return Ok(NEUTRAL_POLARITY);
        }

        let mean = assessments.iter().sum::<f64>() / assessments.len() as f64;
        if !mean.is_finite() {
            return Err(SentimentError::NonFinite);
        }

        Ok(mean.clamp(-1.0, 1.0))
    }
}

impl Sentiment {
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.0 {
            Self::Positive
        } else if polarity < 0.0 {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

enum Token {
    Word(String),
    ClauseBreak,
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();

    for c in text.chars() {
        if c.is_alphanumeric() || c == '\'' || c == '\u{2019}' {
            word.extend(c.to_lowercase().map(|c| if c == '\u{2019}' { '\'' } else { c }));
            continue;
        }

        push_word(&mut tokens, &mut word);
        if matches!(c, '.' | ',' | ';' | ':' | '!' | '?') {
            tokens.push(Token::ClauseBreak);
        }
    }
    push_word(&mut tokens, &mut word);

    tokens
}

fn push_word(tokens: &mut Vec<Token>, word: &mut String) {
    let trimmed = word.trim_matches('\'');
    if !trimmed.is_empty() {
        tokens.push(Token::Word(trimmed.to_owned()));
    }
    word.clear();
}
