use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("empty scenario selector")]
    EmptySelector,
    #[error("scenario selector is not valid unicode")]
    SelectorNotUnicode,
    #[error("invalid scenario name pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("failed to open scenario file `{path}`: {source}")]
    ScenarioOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scenario file `{path}`: {source}")]
    ScenarioParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
pub type Result<T> = std::result::Result<T, Error>;
