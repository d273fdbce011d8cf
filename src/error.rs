use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pool configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("feed line {line} is not a valid monitor event: {source}")]
    Feed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid platform filter {pattern:?}: {source}")]
    PlatformFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
