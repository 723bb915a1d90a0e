use thiserror::Error;

#[derive(Error, Debug)]
pub enum StickySyncError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{path}:{line}: expected 5 tab-separated fields, found {found}")]
    WrongColumnCount { path: String, line: usize, found: usize },

    #[error("unparsable header timestamp in {0}")]
    BadHeaderTimestamp(String),

    #[error("malformed study data: {0:?}")]
    MalformedStudyData(String),

    #[error("kanji table {0} has no 'kanji' column")]
    MissingKanjiColumn(String),

    #[error("subset mapping contains a cycle through '{0}'")]
    CyclicMapping(String),

    #[error("deck '{name}' not found at {path}")]
    MissingDeck { name: String, path: String },

    #[error("StickySyncError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for StickySyncError {
    fn from(error: std::io::Error) -> Self {
        StickySyncError::Io(Box::new(error))
    }
}
