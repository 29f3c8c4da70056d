//! Error types for the fillline detection engine.

use thiserror::Error;

/// Primary error type for detection operations.
///
/// `InvalidRegion`, `MissingPageAsset` and `DegenerateStatistic` are local:
/// the engine logs them and carries on with an empty result for the region or
/// stage concerned. The remaining variants are terminal for a document call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectError {
    #[error("invalid region {width}x{height} at ({x}, {y})")]
    InvalidRegion {
        x: i64,
        y: i64,
        width: i64,
        height: i64,
    },

    #[error("no raster for page {page}")]
    MissingPageAsset { page: usize },

    #[error("statistic computed over an empty population")]
    DegenerateStatistic,

    #[error("corrupt raster for page {page}: expected {expected} bytes, got {got}")]
    CorruptRaster {
        page: usize,
        expected: usize,
        got: usize,
    },

    #[error("document has no page rasters")]
    NoRasters,

    #[error("invalid page geometry for page {page}")]
    InvalidPageGeometry { page: usize },

    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

impl DetectError {
    /// Whether this error only affects one region or stage.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            DetectError::InvalidRegion { .. }
                | DetectError::MissingPageAsset { .. }
                | DetectError::DegenerateStatistic
        )
    }
}

/// Convenience Result type alias for DetectError.
pub type Result<T> = std::result::Result<T, DetectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_errors_are_classified() {
        assert!(DetectError::DegenerateStatistic.is_local());
        assert!(DetectError::MissingPageAsset { page: 2 }.is_local());
        assert!(!DetectError::NoRasters.is_local());
        assert!(
            !DetectError::CorruptRaster {
                page: 0,
                expected: 4,
                got: 3
            }
            .is_local()
        );
    }

    #[test]
    fn messages_name_the_page() {
        let err = DetectError::CorruptRaster {
            page: 3,
            expected: 100,
            got: 99,
        };
        assert_eq!(
            err.to_string(),
            "corrupt raster for page 3: expected 100 bytes, got 99"
        );
    }
}
