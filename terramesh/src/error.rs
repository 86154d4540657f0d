//! Crate-level error type.
//!
//! Layer errors ([`FetchError`](crate::provider::FetchError),
//! [`StitchError`](crate::stitch::StitchError),
//! [`CoordError`](crate::coord::CoordError)) convert into [`TerrainError`] as
//! they cross the orchestrator boundary, so callers see a single taxonomy.
//! Cancellation is its own variant at every layer and is never folded into a
//! generic failure.

use std::fmt;

use crate::coord::CoordError;
use crate::provider::FetchError;
use crate::stitch::StitchError;

/// Errors surfaced by the fetch/stitch/decode/mesh pipeline.
#[derive(Debug)]
pub enum TerrainError {
    /// A request URL could not be constructed from the configured template.
    UrlConstruction(String),

    /// The request produced no HTTP response (connection, TLS, timeout).
    Transport(String),

    /// The tile service answered with a status outside the accepted range.
    HttpStatus(u16),

    /// Response bytes were not a decodable raster, or pixel data was
    /// unreadable during heightmap decoding.
    Decode(String),

    /// Tile placement or canvas assembly failed.
    Stitch(StitchError),

    /// Coordinate or bounding-box validation failed.
    Coord(CoordError),

    /// The operation was cancelled by the caller.
    Cancelled,

    /// The height grid contained no usable samples to mesh.
    EmptyGrid,

    /// No specific cause was captured (e.g. exhausted retries with no
    /// recorded last error).
    Unknown,
}

impl TerrainError {
    /// Whether this error is the cancellation outcome.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TerrainError::Cancelled)
    }
}

impl fmt::Display for TerrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerrainError::UrlConstruction(msg) => {
                write!(f, "Failed to construct request URL: {}", msg)
            }
            TerrainError::Transport(msg) => write!(f, "No HTTP response: {}", msg),
            TerrainError::HttpStatus(code) => {
                write!(f, "Unacceptable HTTP status: {}", code)
            }
            TerrainError::Decode(msg) => write!(f, "Raster decode failed: {}", msg),
            TerrainError::Stitch(e) => write!(f, "Stitch failed: {}", e),
            TerrainError::Coord(e) => write!(f, "Invalid coordinates: {}", e),
            TerrainError::Cancelled => write!(f, "Operation cancelled"),
            TerrainError::EmptyGrid => write!(f, "Height grid has no usable samples"),
            TerrainError::Unknown => write!(f, "Unknown error"),
        }
    }
}

impl std::error::Error for TerrainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TerrainError::Stitch(e) => Some(e),
            TerrainError::Coord(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FetchError> for TerrainError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::UrlConstruction(msg) => TerrainError::UrlConstruction(msg),
            FetchError::Transport(msg) => TerrainError::Transport(msg),
            FetchError::HttpStatus(code) => TerrainError::HttpStatus(code),
            FetchError::Decode(msg) => TerrainError::Decode(msg),
            FetchError::UnsupportedZoom(zoom) => {
                TerrainError::UrlConstruction(format!("unsupported zoom level {}", zoom))
            }
        }
    }
}

impl From<StitchError> for TerrainError {
    fn from(e: StitchError) -> Self {
        TerrainError::Stitch(e)
    }
}

impl From<CoordError> for TerrainError {
    fn from(e: CoordError) -> Self {
        TerrainError::Coord(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_http_status() {
        let err = TerrainError::HttpStatus(404);
        assert_eq!(err.to_string(), "Unacceptable HTTP status: 404");
    }

    #[test]
    fn test_display_cancelled() {
        assert_eq!(TerrainError::Cancelled.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_is_cancelled() {
        assert!(TerrainError::Cancelled.is_cancelled());
        assert!(!TerrainError::Unknown.is_cancelled());
        assert!(!TerrainError::HttpStatus(500).is_cancelled());
    }

    #[test]
    fn test_from_fetch_error_preserves_status() {
        let err: TerrainError = FetchError::HttpStatus(503).into();
        assert!(matches!(err, TerrainError::HttpStatus(503)));
    }

    #[test]
    fn test_from_fetch_error_unsupported_zoom() {
        let err: TerrainError = FetchError::UnsupportedZoom(25).into();
        assert!(matches!(err, TerrainError::UrlConstruction(_)));
        assert!(err.to_string().contains("25"));
    }

    #[test]
    fn test_source_chain_for_stitch() {
        use std::error::Error;

        let err = TerrainError::Stitch(StitchError::EmptyCanvas);
        assert!(err.source().is_some());
        assert!(TerrainError::Unknown.source().is_none());
    }
}
