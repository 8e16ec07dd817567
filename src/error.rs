use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

use crate::segmenter::Stage;

/// Subclip's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Subclip's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// The video or subtitle input does not exist.
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// A subtitle timestamp did not match its grammar.
    #[error("invalid timestamp: '{0}'")]
    InvalidTimestamp(String),

    /// The media toolkit could not produce a decoded audio track.
    #[error("audio extraction failed: {0}")]
    ExtractionFailure(String),

    /// A single clip could not be exported.
    #[error("failed to encode {}: {message}", .path.display())]
    EncodingFailure { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A fatal error annotated with the pipeline stage it happened in.
    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub(crate) fn in_stage(self, stage: Stage) -> Self {
        match self {
            already @ Self::Stage { .. } => already,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, skipping the stage annotation.
    pub fn root(&self) -> &Error {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_annotation_is_applied_once() {
        let err = Error::InvalidTimestamp("00:00".into())
            .in_stage(Stage::ParsingSubtitles)
            .in_stage(Stage::Slicing);

        assert!(matches!(
            err,
            Error::Stage {
                stage: Stage::ParsingSubtitles,
                ..
            }
        ));
        assert!(matches!(err.root(), Error::InvalidTimestamp(_)));
        assert_eq!(
            err.to_string(),
            "parsing subtitles failed: invalid timestamp: '00:00'"
        );
    }
}
