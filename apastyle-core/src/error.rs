use thiserror::Error;

/// Failures while reading attributes out of a source document.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("not a readable DOCX package: {0}")]
    Package(#[from] zip::result::ZipError),

    #[error("DOCX package is missing required part {0}")]
    MissingPart(&'static str),

    #[error("malformed XML in {part} at byte {position}: {message}")]
    Xml {
        part: &'static str,
        position: usize,
        message: String,
    },

    #[error("I/O error while extracting: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid attribute dump: {0}")]
    Dump(#[from] serde_json::Error),
}

/// Problems with a style profile or its rule set.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("unknown style profile '{0}'")]
    UnknownProfile(String),

    #[error("invalid rule set: {0}")]
    InvalidRuleSet(String),

    #[error("invalid pipeline: {0}")]
    InvalidPipeline(String),

    #[error("invalid detection pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
