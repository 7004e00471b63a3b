//! Errors raised while loading and aggregating the datasets.

use thiserror::Error;

/// Failure of one load attempt. Any of these aborts the whole pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request never produced a response.
    #[error("failed to fetch {source_name} from {url}: {message}")]
    Fetch {
        source_name: String,
        url: String,
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The body was not the JSON shape we expect.
    #[error("failed to parse {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// A registration row is too short for the configured column layout.
    #[error("registration row {row} has {found} fields, expected at least {expected}")]
    SchemaMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_message() {
        let err = PipelineError::SchemaMismatch {
            row: 3,
            expected: 17,
            found: 5,
        };
        assert_eq!(
            err.to_string(),
            "registration row 3 has 5 fields, expected at least 17"
        );
    }

    #[test]
    fn test_status_message() {
        let err = PipelineError::Status {
            url: "https://example.org/data.json".to_string(),
            status: 503,
        };
        assert!(err.to_string().contains("HTTP 503"));
    }
}
