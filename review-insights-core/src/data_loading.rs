use {
    std::{fs::File, io::Read, path::Path},
    tracing::{info, debug},
    csv::StringRecord,
    crate::{
        entity::RawReview,
        error::DataSourceError,
        progress::Progress,
    },
};

pub const REQUIRED_COLUMNS: [&str; 9] = [
    "UserId",
    "ProfileName",
    "ProductId",
    "HelpfulnessNumerator",
    "HelpfulnessDenominator",
    "Time",
    "Summary",
    "Text",
    "Score",
];

pub fn load_reviews_from_path(path: &Path) -> Result<Vec<RawReview>, DataSourceError> {
    info!("loading reviews from {}", path.display());

    let file = File::open(path).map_err(|source| DataSourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    load_reviews(file)
}

pub fn load_reviews<R: Read>(source: R) -> Result<Vec<RawReview>, DataSourceError> {
    let mut reader = csv::Reader::from_reader(source);
    let headers = normalized_headers(reader.headers().map_err(header_error)?);
    check_required_columns(&headers)?;

    let mut progress = Progress::new("loading reviews");
    let mut reviews = Vec::new();
    let mut record = StringRecord::new();

    loop {
        let has_record = reader.read_record(&mut record).map_err(|source| DataSourceError::Malformed {
            line: source.position().map(|v| v.line()).unwrap_or_default(),
            source,
        })?;
        if !has_record {
            break;
        }

        let line = record.position().map(|v| v.line()).unwrap_or_default();
        let mut review: RawReview = record.deserialize(Some(&headers))
            .map_err(|source| DataSourceError::Malformed { line, source })?;

        if !(1..=5).contains(&review.score) {
            return Err(DataSourceError::ScoreOutOfRange { line, score: review.score });
        }

        review.line = line;
        reviews.push(review);
        progress.update();
    }

    progress.finish();
    debug!("loaded {} raw reviews", reviews.len());

    Ok(reviews)
}

fn check_required_columns(headers: &StringRecord) -> Result<(), DataSourceError> {
    let missing: Vec<String> = REQUIRED_COLUMNS.iter()
        .filter(|column| !headers.iter().any(|header| header == **column))
        .map(|column| column.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataSourceError::MissingColumns(missing))
    }
}

// spreadsheet exports tend to prefix the first header with a byte order mark
fn normalized_headers(headers: &StringRecord) -> StringRecord {
    headers.iter()
        .map(|header| header.trim_start_matches('\u{feff}'))
        .collect()
}

fn header_error(err: csv::Error) -> DataSourceError {
    match err.into_kind() {
        csv::ErrorKind::Io(err) => DataSourceError::Read(err),
        kind => DataSourceError::Header(format!("{:?}", kind)),
    }
}
