// Presence Reconciliation
//
// Converts a stream of presence snapshots into UI intents. This is the
// only place where transition/ordering rules live: transient labels fire
// once per status change, the last-seen ticker runs only while offline,
// and track info is re-emitted only when the track identity changes.
//
// `reconcile` is synchronous and takes the clock as a parameter; the
// runtime (widget.rs) owns the actual timers.

use crate::assets;
use crate::model::{PresenceSnapshot, Status};
use crate::projector::{self, TrackSignature};

/// How long a transient status label stays visible before auto-hiding.
pub const TRANSIENT_HIDE_MS: u64 = 1500;

/// Last-seen ticker period.
pub const LAST_SEEN_TICK_MS: u64 = 1000;

/// Everything the presentation layer can be asked to do. One-way: the
/// sink never feeds information back.
#[derive(Debug, Clone, PartialEq)]
pub enum UiIntent {
    SetProfile {
        name: String,
        avatar_url: String,
        banner_url: Option<String>,
        badge_flags: u64,
    },
    SetStatusLabel(String),
    ShowTransient(String),
    HideTransient,
    SetLastSeenText(String),
    SetTrackInfo {
        title: String,
        subtitle: String,
        artwork_url: Option<String>,
    },
    SetTrackProgress {
        percent: f64,
        elapsed: String,
        total: String,
    },
    ClearTrack,
}

/// Reconciler state. Created once with all-unknown defaults and mutated
/// only on snapshot arrival or ticker callback.
#[derive(Debug, Clone, Default)]
pub struct ReconcilerState {
    pub current_status: Status,
    /// Most recent moment a non-offline status was observed. Monotonically
    /// non-decreasing; `None` until the first such observation.
    pub last_active_ms: Option<i64>,
    /// A just-transitioned status label is visible or pending hide.
    pub transient_active: bool,
    /// The "last seen N ago" ticker is active.
    pub offline_ticker_running: bool,
    /// Identity of the last rendered track.
    pub track_signature: Option<TrackSignature>,
    /// Valid (start, end) of the current track, when it has one. Drives
    /// the progress ticker slot.
    pub track_window: Option<(i64, i64)>,
    last_status_label: Option<String>,
}

/// "Last seen Ns/Nm/Nh/Nd ago", or the unknown fallback when the user has
/// never been observed active.
pub fn last_seen_text(last_active_ms: Option<i64>, now_ms: i64) -> String {
    match last_active_ms {
        None => "Last seen unknown".to_string(),
        Some(t) => format!(
            "Last seen {} ago",
            compact_duration(now_ms.saturating_sub(t).max(0))
        ),
    }
}

fn compact_duration(ms: i64) -> String {
    let s = ms / 1000;
    if s < 60 {
        return format!("{}s", s);
    }
    let m = s / 60;
    if m < 60 {
        return format!("{}m", m);
    }
    let h = m / 60;
    if h < 24 {
        return format!("{}h", h);
    }
    format!("{}d", h / 24)
}

/// Ingest one snapshot at `now_ms` and emit the resulting UI intents.
///
/// Transitions are detected against the immediately previous reconciled
/// status only; flapping between polls produces one transient per flap.
pub fn reconcile(
    state: &mut ReconcilerState,
    snapshot: &PresenceSnapshot,
    now_ms: i64,
) -> Vec<UiIntent> {
    let mut intents = Vec::new();
    let status = snapshot.status;

    if status.is_active() && state.last_active_ms.map_or(true, |t| now_ms > t) {
        state.last_active_ms = Some(now_ms);
    }

    // Profile is re-emitted per snapshot, like the steady indicators; the
    // sink is free to dedup.
    intents.push(UiIntent::SetProfile {
        name: snapshot.profile.display_name.clone(),
        avatar_url: assets::avatar_url(&snapshot.profile.id, snapshot.profile.avatar.as_deref()),
        banner_url: assets::banner_url(&snapshot.profile.id, snapshot.profile.banner.as_deref()),
        badge_flags: snapshot.profile.badge_flags,
    });

    let label = status.steady_label();
    if state.last_status_label.as_deref() != Some(label) {
        intents.push(UiIntent::SetStatusLabel(label.to_string()));
        state.last_status_label = Some(label.to_string());
    }

    let changed = status != state.current_status;
    match (changed, status.is_active()) {
        (false, true) => {
            // Steady active state: hide any lingering transient (no-op if
            // already hidden), make sure the offline ticker is off.
            if state.transient_active {
                intents.push(UiIntent::HideTransient);
                state.transient_active = false;
            }
            state.offline_ticker_running = false;
        }
        (false, false) => {
            if !state.offline_ticker_running {
                state.offline_ticker_running = true;
                intents.push(UiIntent::SetLastSeenText(last_seen_text(
                    state.last_active_ms,
                    now_ms,
                )));
            }
        }
        (true, true) => {
            state.offline_ticker_running = false;
            let message = status.transient_label().unwrap_or(label);
            intents.push(UiIntent::ShowTransient(message.to_string()));
            state.transient_active = true;
        }
        (true, false) => {
            // Into offline: no transient phase, the last-seen display
            // starts immediately.
            if state.transient_active {
                intents.push(UiIntent::HideTransient);
                state.transient_active = false;
            }
            state.offline_ticker_running = true;
            intents.push(UiIntent::SetLastSeenText(last_seen_text(
                state.last_active_ms,
                now_ms,
            )));
        }
    }
    state.current_status = status;

    // Track slot.
    match &snapshot.track {
        None => {
            if state.track_signature.take().is_some() {
                intents.push(UiIntent::ClearTrack);
            }
            state.track_window = None;
        }
        Some(track) => {
            let signature = TrackSignature::of(track);
            if state.track_signature.as_ref() != Some(&signature) {
                intents.push(UiIntent::SetTrackInfo {
                    title: track.title.clone(),
                    subtitle: track.subtitle.clone(),
                    artwork_url: track.artwork.as_deref().map(assets::artwork_url),
                });
                state.track_signature = Some(signature);
            }
            state.track_window = projector::playable_window(track);
            let frame = projector::project_track(track, now_ms);
            intents.push(UiIntent::SetTrackProgress {
                percent: frame.percent,
                elapsed: frame.elapsed,
                total: frame.total,
            });
        }
    }

    intents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Profile, Track};

    fn snapshot(status: Status) -> PresenceSnapshot {
        PresenceSnapshot {
            profile: Profile {
                id: "1319292111325106296".to_string(),
                display_name: "Someone".to_string(),
                avatar: None,
                banner: None,
                badge_flags: 0,
            },
            status,
            track: None,
        }
    }

    fn with_track(status: Status, track: Track) -> PresenceSnapshot {
        PresenceSnapshot {
            track: Some(track),
            ..snapshot(status)
        }
    }

    fn track(start: i64, end: i64) -> Track {
        Track {
            track_id: Some("t1".to_string()),
            title: "Song".to_string(),
            subtitle: "Artist".to_string(),
            artwork: Some("spotify:art".to_string()),
            start_ms: Some(start),
            end_ms: Some(end),
        }
    }

    fn has_show(intents: &[UiIntent]) -> bool {
        intents.iter().any(|i| matches!(i, UiIntent::ShowTransient(_)))
    }

    #[test]
    fn test_first_snapshot_is_always_a_transition() {
        let mut state = ReconcilerState::default();
        let intents = reconcile(&mut state, &snapshot(Status::Online), 1_000);
        assert!(intents.contains(&UiIntent::ShowTransient("Active now".to_string())));
        assert!(state.transient_active);
        assert!(!state.offline_ticker_running);
    }

    #[test]
    fn test_first_snapshot_offline_starts_ticker_with_unknown() {
        let mut state = ReconcilerState::default();
        let intents = reconcile(&mut state, &snapshot(Status::Offline), 1_000);
        assert!(intents.contains(&UiIntent::SetLastSeenText("Last seen unknown".to_string())));
        assert!(state.offline_ticker_running);
        assert!(!state.transient_active);
        assert_eq!(state.last_active_ms, None);
    }

    #[test]
    fn test_offline_to_online_transition() {
        let mut state = ReconcilerState::default();
        reconcile(&mut state, &snapshot(Status::Offline), 0);
        assert!(state.offline_ticker_running);

        let intents = reconcile(&mut state, &snapshot(Status::Online), 1_000);
        assert!(intents.contains(&UiIntent::ShowTransient("Active now".to_string())));
        assert!(!state.offline_ticker_running);
        assert_eq!(state.last_active_ms, Some(1_000));
    }

    #[test]
    fn test_transient_and_ticker_never_both_active() {
        let mut state = ReconcilerState::default();
        let sequence = [
            Status::Online,
            Status::Online,
            Status::Idle,
            Status::Offline,
            Status::Offline,
            Status::Dnd,
            Status::Offline,
            Status::Online,
        ];
        for (i, status) in sequence.into_iter().enumerate() {
            reconcile(&mut state, &snapshot(status), i as i64 * 4_000);
            assert!(
                !(state.transient_active && state.offline_ticker_running),
                "both active after step {}",
                i
            );
        }
    }

    #[test]
    fn test_unchanged_active_status_shows_nothing_new() {
        let mut state = ReconcilerState::default();
        reconcile(&mut state, &snapshot(Status::Online), 0);
        // simulate the runtime's auto-hide having fired
        state.transient_active = false;

        let intents = reconcile(&mut state, &snapshot(Status::Online), 4_000);
        assert!(!has_show(&intents));
        assert!(!intents.contains(&UiIntent::HideTransient));
    }

    #[test]
    fn test_unchanged_active_with_pending_transient_hides_it() {
        let mut state = ReconcilerState::default();
        reconcile(&mut state, &snapshot(Status::Idle), 0);
        assert!(state.transient_active);

        let intents = reconcile(&mut state, &snapshot(Status::Idle), 500);
        assert!(intents.contains(&UiIntent::HideTransient));
        assert!(!has_show(&intents));
        assert!(!state.transient_active);
    }

    #[test]
    fn test_flapping_produces_one_transient_per_flap() {
        let mut state = ReconcilerState::default();
        let a = reconcile(&mut state, &snapshot(Status::Online), 0);
        let b = reconcile(&mut state, &snapshot(Status::Idle), 4_000);
        let c = reconcile(&mut state, &snapshot(Status::Online), 8_000);
        assert!(has_show(&a));
        assert!(b.contains(&UiIntent::ShowTransient("Away now".to_string())));
        assert!(c.contains(&UiIntent::ShowTransient("Active now".to_string())));
    }

    #[test]
    fn test_last_active_is_monotonic_and_survives_offline() {
        let mut state = ReconcilerState::default();
        reconcile(&mut state, &snapshot(Status::Online), 10_000);
        assert_eq!(state.last_active_ms, Some(10_000));

        reconcile(&mut state, &snapshot(Status::Offline), 14_000);
        assert_eq!(state.last_active_ms, Some(10_000));

        // a stale clock must not move the reference point backwards
        reconcile(&mut state, &snapshot(Status::Online), 9_000);
        assert_eq!(state.last_active_ms, Some(10_000));
    }

    #[test]
    fn test_unchanged_offline_keeps_ticker_without_new_intents() {
        let mut state = ReconcilerState::default();
        reconcile(&mut state, &snapshot(Status::Offline), 0);
        let intents = reconcile(&mut state, &snapshot(Status::Offline), 4_000);
        assert!(!intents
            .iter()
            .any(|i| matches!(i, UiIntent::SetLastSeenText(_))));
        assert!(state.offline_ticker_running);
    }

    #[test]
    fn test_status_label_emitted_only_on_change() {
        let mut state = ReconcilerState::default();
        let a = reconcile(&mut state, &snapshot(Status::Online), 0);
        let b = reconcile(&mut state, &snapshot(Status::Online), 4_000);
        assert!(a.contains(&UiIntent::SetStatusLabel("Online".to_string())));
        assert!(!b.iter().any(|i| matches!(i, UiIntent::SetStatusLabel(_))));
    }

    #[test]
    fn test_new_track_emits_info_and_progress() {
        let mut state = ReconcilerState::default();
        let intents = reconcile(&mut state, &with_track(Status::Online, track(0, 180_000)), 90_000);
        assert!(intents.contains(&UiIntent::SetTrackInfo {
            title: "Song".to_string(),
            subtitle: "Artist".to_string(),
            artwork_url: Some("https://i.scdn.co/image/art".to_string()),
        }));
        assert!(intents.iter().any(|i| matches!(
            i,
            UiIntent::SetTrackProgress { elapsed, total, .. }
                if elapsed == "1:30" && total == "3:00"
        )));
        assert_eq!(state.track_window, Some((0, 180_000)));
    }

    #[test]
    fn test_same_track_updates_progress_only() {
        let mut state = ReconcilerState::default();
        reconcile(&mut state, &with_track(Status::Online, track(0, 180_000)), 10_000);
        let intents = reconcile(&mut state, &with_track(Status::Online, track(0, 180_000)), 14_000);
        assert!(!intents.iter().any(|i| matches!(i, UiIntent::SetTrackInfo { .. })));
        assert!(intents
            .iter()
            .any(|i| matches!(i, UiIntent::SetTrackProgress { .. })));
    }

    #[test]
    fn test_track_removal_clears_once() {
        let mut state = ReconcilerState::default();
        reconcile(&mut state, &with_track(Status::Online, track(0, 180_000)), 0);
        let intents = reconcile(&mut state, &snapshot(Status::Online), 4_000);
        assert!(intents.contains(&UiIntent::ClearTrack));
        assert_eq!(state.track_window, None);

        let again = reconcile(&mut state, &snapshot(Status::Online), 8_000);
        assert!(!again.contains(&UiIntent::ClearTrack));
    }

    #[test]
    fn test_track_without_timestamps_has_no_ticker_window() {
        let mut state = ReconcilerState::default();
        let mut t = track(0, 0);
        t.start_ms = None;
        t.end_ms = None;
        let intents = reconcile(&mut state, &with_track(Status::Online, t), 0);
        assert_eq!(state.track_window, None);
        assert!(intents.iter().any(|i| matches!(
            i,
            UiIntent::SetTrackProgress { total, .. } if total == "—"
        )));
    }

    #[test]
    fn test_compact_duration_units() {
        assert_eq!(compact_duration(5_000), "5s");
        assert_eq!(compact_duration(60_000), "1m");
        assert_eq!(compact_duration(59 * 60_000), "59m");
        assert_eq!(compact_duration(3 * 3_600_000), "3h");
        assert_eq!(compact_duration(49 * 3_600_000), "2d");
    }

    #[test]
    fn test_last_seen_text() {
        assert_eq!(last_seen_text(None, 1_000), "Last seen unknown");
        assert_eq!(last_seen_text(Some(0), 90_000), "Last seen 1m ago");
        // reference point in the future (clock skew) clamps to zero
        assert_eq!(last_seen_text(Some(5_000), 1_000), "Last seen 0s ago");
    }

    #[test]
    fn test_identical_snapshot_twice_is_idempotent() {
        let mut state = ReconcilerState::default();
        let snap = with_track(Status::Online, track(0, 180_000));
        reconcile(&mut state, &snap, 0);
        state.transient_active = false; // auto-hide fired

        let intents = reconcile(&mut state, &snap, 4_000);
        for intent in &intents {
            assert!(
                matches!(
                    intent,
                    UiIntent::SetProfile { .. } | UiIntent::SetTrackProgress { .. }
                ),
                "unexpected intent on identical snapshot: {:?}",
                intent
            );
        }
    }
}
