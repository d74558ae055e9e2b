// Track Progress Projection
//
// Computes elapsed/remaining time for the currently playing track between
// snapshots, so progress keeps moving without new data from the transport.

use crate::model::Track;

/// Floor for the rendered progress bar so very short tracks stay visible.
pub const MIN_VISIBLE_PERCENT: f64 = 8.0;

/// Static bar width used when a track has no usable timestamps.
pub const FALLBACK_PERCENT: f64 = 20.0;

/// Progress tick period.
pub const TICK_MS: u64 = 1000;

/// Identity key for the playing track. Progress may move within the same
/// signature; title/subtitle/artwork are only re-emitted when it changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSignature {
    track_id: Option<String>,
    title: String,
    subtitle: String,
    start_ms: Option<i64>,
    artwork: Option<String>,
}

impl TrackSignature {
    pub fn of(track: &Track) -> Self {
        TrackSignature {
            track_id: track.track_id.clone(),
            title: track.title.clone(),
            subtitle: track.subtitle.clone(),
            start_ms: track.start_ms,
            artwork: track.artwork.clone(),
        }
    }
}

/// One rendered progress state.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressFrame {
    pub percent: f64,
    pub elapsed: String,
    pub total: String,
}

/// The (start, end) pair a ticker can actually run on.
pub fn playable_window(track: &Track) -> Option<(i64, i64)> {
    match (track.start_ms, track.end_ms) {
        (Some(start), Some(end)) if end > start => Some((start, end)),
        _ => None,
    }
}

/// Project progress at `now_ms` for a valid window (end > start).
///
/// Elapsed wraps modulo the track length, so a clock past the nominal end
/// (drift, repeating track) loops instead of freezing at 100%.
pub fn project(start_ms: i64, end_ms: i64, now_ms: i64) -> ProgressFrame {
    let total = end_ms - start_ms;
    let raw = (now_ms - start_ms).max(0);
    let elapsed = raw % total;
    let percent = ((elapsed as f64 / total as f64) * 100.0).max(MIN_VISIBLE_PERCENT);
    ProgressFrame {
        percent,
        elapsed: format_mmss(elapsed),
        total: format_mmss(total),
    }
}

/// Static frame for tracks with missing or inverted timestamps.
pub fn fallback_frame() -> ProgressFrame {
    ProgressFrame {
        percent: FALLBACK_PERCENT,
        elapsed: "0:00".to_string(),
        total: "—".to_string(),
    }
}

/// Progress for whatever window the track has, valid or not.
pub fn project_track(track: &Track, now_ms: i64) -> ProgressFrame {
    match playable_window(track) {
        Some((start, end)) => project(start, end, now_ms),
        None => fallback_frame(),
    }
}

/// `minutes:seconds`, seconds zero-padded to two digits.
pub fn format_mmss(ms: i64) -> String {
    let s = ms / 1000;
    format!("{}:{:02}", s / 60, s % 60)
}
