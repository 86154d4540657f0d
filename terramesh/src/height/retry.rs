//! Zoom-degradation retry policy.
//!
//! Coarser zoom tiles are more likely to exist for sparsely covered regions,
//! so the terrain-height path retries failed fetches at progressively lower
//! zoom levels instead of repeating the same request. The degradation
//! sequence is an explicit state machine ([`ZoomLadder`]) rather than a
//! recursive retry, so it is independently testable.
//!
//! Cancellation short-circuits immediately without consuming an attempt and
//! is never converted into a retry.

use std::future::Future;

use tracing::warn;

use crate::coord::MIN_ZOOM;
use crate::error::TerrainError;

/// Default number of fetch attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// The sequence of zoom levels a retried fetch walks through.
///
/// Yields `start, start-1, start-2, …` for exactly `max_attempts` items,
/// saturating at [`MIN_ZOOM`].
#[derive(Debug, Clone)]
pub struct ZoomLadder {
    next_zoom: u8,
    remaining: u32,
}

impl ZoomLadder {
    /// Create a ladder starting at `start_zoom` with `max_attempts` rungs.
    pub fn new(start_zoom: u8, max_attempts: u32) -> Self {
        Self {
            next_zoom: start_zoom,
            remaining: max_attempts,
        }
    }
}

impl Iterator for ZoomLadder {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let zoom = self.next_zoom;
        self.next_zoom = zoom.saturating_sub(1).max(MIN_ZOOM);
        Some(zoom)
    }
}

/// Run `attempt` down the zoom ladder until it succeeds.
///
/// On any failure other than cancellation the zoom is lowered by one and the
/// fetch retried, up to `max_attempts` total attempts. Cancellation returns
/// immediately. When every attempt fails, the last non-cancellation error is
/// surfaced, or [`TerrainError::Unknown`] if none was captured.
pub async fn fetch_with_retry<T, F, Fut>(
    start_zoom: u8,
    max_attempts: u32,
    mut attempt: F,
) -> Result<T, TerrainError>
where
    F: FnMut(u8) -> Fut,
    Fut: Future<Output = Result<T, TerrainError>>,
{
    let mut last_error = None;

    for zoom in ZoomLadder::new(start_zoom, max_attempts) {
        match attempt(zoom).await {
            Ok(value) => return Ok(value),
            Err(TerrainError::Cancelled) => return Err(TerrainError::Cancelled),
            Err(error) => {
                warn!(zoom, %error, "height fetch failed, degrading zoom");
                last_error = Some(error);
            }
        }
    }

    Err(last_error.unwrap_or(TerrainError::Unknown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_ladder_descends_one_per_attempt() {
        let zooms: Vec<u8> = ZoomLadder::new(12, 3).collect();
        assert_eq!(zooms, vec![12, 11, 10]);
    }

    #[test]
    fn test_ladder_saturates_at_min_zoom() {
        let zooms: Vec<u8> = ZoomLadder::new(1, 4).collect();
        assert_eq!(zooms, vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_ladder_zero_attempts_is_empty() {
        assert_eq!(ZoomLadder::new(12, 0).count(), 0);
    }

    #[tokio::test]
    async fn test_first_attempt_success_stops_ladder() {
        let calls = Mutex::new(Vec::new());
        let result = fetch_with_retry(12, 3, |zoom| {
            calls.lock().unwrap().push(zoom);
            async move { Ok::<_, TerrainError>(zoom) }
        })
        .await;

        assert_eq!(result.unwrap(), 12);
        assert_eq!(*calls.lock().unwrap(), vec![12]);
    }

    #[tokio::test]
    async fn test_all_failures_walk_ladder_and_surface_last_error() {
        let calls = Mutex::new(Vec::new());
        let result: Result<(), _> = fetch_with_retry(12, 3, |zoom| {
            calls.lock().unwrap().push(zoom);
            async move { Err(TerrainError::HttpStatus(500 + u16::from(zoom))) }
        })
        .await;

        assert_eq!(*calls.lock().unwrap(), vec![12, 11, 10]);
        // Last attempt ran at zoom 10.
        assert!(matches!(result, Err(TerrainError::HttpStatus(510))));
    }

    #[tokio::test]
    async fn test_success_after_degradation() {
        let result = fetch_with_retry(12, 3, |zoom| async move {
            if zoom < 12 {
                Ok(zoom)
            } else {
                Err(TerrainError::HttpStatus(404))
            }
        })
        .await;

        assert_eq!(result.unwrap(), 11);
    }

    #[tokio::test]
    async fn test_cancellation_short_circuits() {
        let calls = Mutex::new(0u32);
        let result: Result<(), _> = fetch_with_retry(12, 3, |_zoom| {
            *calls.lock().unwrap() += 1;
            async { Err(TerrainError::Cancelled) }
        })
        .await;

        assert!(matches!(result, Err(TerrainError::Cancelled)));
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_yields_unknown() {
        let result: Result<(), _> =
            fetch_with_retry(12, 0, |_zoom| async { Ok(()) }).await;
        assert!(matches!(result, Err(TerrainError::Unknown)));
    }
}
