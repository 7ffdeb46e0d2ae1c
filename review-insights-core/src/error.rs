use {
    std::{io, path::PathBuf},
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
    #[error(transparent)]
    TimeParse(#[from] TimeParseError),
}

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("failed to open review source {path}: {source}")]
    Open {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to read review source: {0}")]
    Read(#[from] io::Error),
    #[error("failed to read review source header: {0}")]
    Header(String),
    #[error("review source is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("malformed review record on line {line}: {source}")]
    Malformed {
        line: u64,
        source: csv::Error,
    },
    #[error("review on line {line} has score {score}, expected 1 to 5")]
    ScoreOutOfRange {
        line: u64,
        score: u8,
    },
}

#[derive(Debug, Error)]
#[error("review time {value:?} on line {line} is not a valid epoch timestamp")]
pub struct TimeParseError {
    pub line: u64,
    pub value: String,
}
