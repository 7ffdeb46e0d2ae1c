use {
    std::{collections::{HashMap, HashSet}, fs::File, io::Read, path::{Path, PathBuf}},
    tracing::info,
    serde::Deserialize,
    once_cell::sync::Lazy,
    thiserror::Error,
};

const WORDS: &[(&str, f64)] = &[
    ("good", 0.7),
    ("great", 0.8),
    ("excellent", 1.0),
    ("best", 1.0),
    ("better", 0.5),
    ("love", 0.5),
    ("loved", 0.7),
    ("lovely", 0.5),
    ("delicious", 1.0),
    ("tasty", 0.5),
    ("yummy", 0.6),
    ("perfect", 1.0),
    ("awesome", 1.0),
    ("amazing", 0.6),
    ("wonderful", 1.0),
    ("fantastic", 0.4),
    ("favorite", 0.5),
    ("nice", 0.6),
    ("happy", 0.8),
    ("glad", 0.5),
    ("fresh", 0.3),
    ("healthy", 0.5),
    ("easy", 0.43),
    ("fine", 0.42),
    ("pleasant", 0.73),
    ("satisfied", 0.5),
    ("superb", 1.0),
    ("outstanding", 0.5),
    ("incredible", 0.9),
    ("impressive", 1.0),
    ("terrific", 1.0),
    ("beautiful", 0.85),
    ("fun", 0.3),
    ("sweet", 0.35),
    ("smooth", 0.4),
    ("rich", 0.375),
    ("cool", 0.35),
    ("enjoyable", 0.4),
    ("decent", 0.17),
    ("recommend", 0.3),
    ("bad", -0.7),
    ("worst", -1.0),
    ("worse", -0.4),
    ("terrible", -1.0),
    ("awful", -1.0),
    ("horrible", -1.0),
    ("disgusting", -1.0),
    ("nasty", -1.0),
    ("poor", -0.4),
    ("disappointing", -0.6),
    ("disappointed", -0.75),
    ("disappointment", -0.6),
    ("stale", -0.5),
    ("bland", -0.5),
    ("gross", -0.6),
    ("weird", -0.5),
    ("expensive", -0.5),
    ("overpriced", -0.5),
    ("broken", -0.4),
    ("sad", -0.5),
    ("wrong", -0.5),
    ("useless", -0.5),
    ("boring", -1.0),
    ("bitter", -0.1),
    ("sick", -0.7),
    ("difficult", -0.5),
    ("unhappy", -0.6),
    ("mediocre", -0.3),
    ("inedible", -0.8),
    ("rancid", -0.8),
    ("fake", -0.5),
    ("misleading", -0.5),
    ("waste", -0.2),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.2),
    ("so", 1.3),
    ("super", 1.3),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("absolutely", 1.5),
    ("totally", 1.3),
    ("pretty", 1.2),
    ("quite", 1.1),
    ("somewhat", 0.7),
    ("slightly", 0.5),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nothing", "neither", "nor", "without", "cannot",
    "dont", "doesnt", "didnt", "isnt", "wasnt", "arent", "werent", "wont", "cant", "couldnt", "wouldnt",
];

static BUILTIN: Lazy<Lexicon> = Lazy::new(|| Lexicon {
    words: WORDS.iter().map(|(word, polarity)| (word.to_string(), *polarity)).collect(),
    intensifiers: INTENSIFIERS.iter().map(|(word, factor)| (word.to_string(), *factor)).collect(),
    negations: NEGATIONS.iter().map(|word| word.to_string()).collect(),
});

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to open lexicon {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed lexicon entry: {0}")]
    Malformed(#[from] csv::Error),
    #[error("lexicon word {word:?} has polarity {polarity}, expected a value between -1 and 1")]
    PolarityOutOfRange {
        word: String,
        polarity: f64,
    },
}

#[derive(Debug, Clone)]
pub struct Lexicon {
    words: HashMap<String, f64>,
    intensifiers: HashMap<String, f64>,
    negations: HashSet<String>,
}

#[derive(Deserialize, Debug)]
struct LexiconEntry {
    word: String,
    polarity: f64,
}

impl Lexicon {
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Builtin lexicon extended with `word,polarity` rows from a csv file.
    /// Entries override builtin words of the same spelling.
    pub fn builtin_with_extension(path: &Path) -> Result<Self, LexiconError> {
        let file = File::open(path).map_err(|source| LexiconError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut lexicon = Self::builtin();
        let added = lexicon.extend_from_reader(file)?;
        info!("loaded {} lexicon entries from {}", added, path.display());

        Ok(lexicon)
    }

    pub fn extend_from_reader<R: Read>(&mut self, source: R) -> Result<usize, LexiconError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);

        let mut entries = Vec::new();
        for entry in reader.deserialize() {
            let entry: LexiconEntry = entry?;
            if !entry.polarity.is_finite() || !(-1.0..=1.0).contains(&entry.polarity) {
                return Err(LexiconError::PolarityOutOfRange {
                    word: entry.word,
                    polarity: entry.polarity,
                });
            }
            entries.push(entry);
        }

        let added = entries.len();
        for entry in entries {
            self.words.insert(entry.word.to_lowercase(), entry.polarity);
        }

        Ok(added)
    }

    pub fn polarity(&self, word: &str) -> Option<f64> {
        self.words.get(word).copied()
    }

    pub fn intensity(&self, word: &str) -> Option<f64> {
        self.intensifiers.get(word).copied()
    }

    pub fn is_negation(&self, word: &str) -> bool {
        self.negations.contains(word) || word.ends_with("n't")
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_words_stay_within_polarity_range() {
        let lexicon = Lexicon::builtin();

        assert!(!lexicon.is_empty());
        for (word, polarity) in WORDS {
            assert!((-1.0..=1.0).contains(polarity), "{} out of range", word);
            assert_eq!(lexicon.polarity(word), Some(*polarity));
        }
    }

    #[test]
    fn negations_include_contractions() {
        let lexicon = Lexicon::builtin();

        assert!(lexicon.is_negation("not"));
        assert!(lexicon.is_negation("don't"));
        assert!(lexicon.is_negation("wouldn't"));
        assert!(!lexicon.is_negation("good"));
    }

    #[test]
    fn extension_overrides_and_adds_words() {
        let mut lexicon = Lexicon::builtin();
        let before = lexicon.len();

        let added = lexicon.extend_from_reader("word,polarity\nGood, 0.2\nchewy,-0.3\n".as_bytes()).unwrap();

        assert_eq!(added, 2);
        assert_eq!(lexicon.polarity("good"), Some(0.2));
        assert_eq!(lexicon.polarity("chewy"), Some(-0.3));
        assert_eq!(lexicon.len(), before + 1);
    }

    #[test]
    fn extension_rejects_out_of_range_polarity_without_partial_update() {
        let mut lexicon = Lexicon::builtin();

        let err = lexicon.extend_from_reader("word,polarity\nchewy,-0.3\nstellar,4\n".as_bytes()).unwrap_err();

        assert!(matches!(err, LexiconError::PolarityOutOfRange { ref word, .. } if word == "stellar"));
        assert_eq!(lexicon.polarity("chewy"), None);
    }

    #[test]
    fn extension_rejects_non_numeric_polarity() {
        let mut lexicon = Lexicon::builtin();

        assert!(matches!(
            lexicon.extend_from_reader("word,polarity\nchewy,lots\n".as_bytes()),
            Err(LexiconError::Malformed(_))
        ));
    }
}
