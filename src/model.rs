// Presence Wire Model
//
// Types for the Lanyard REST envelope and socket frames, plus the
// normalized snapshot the reconciler consumes.

use serde::Deserialize;
use serde_json::Value as JsonValue;

/// Normalized presence status.
///
/// `Unknown` is the reconciler's pre-first-snapshot value; it never comes
/// off the wire. A wire value of "invisible" (or anything unrecognized)
/// normalizes to `Offline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    Online,
    Idle,
    Dnd,
    Offline,
    #[default]
    Unknown,
}

impl Status {
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw.map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("online") => Status::Online,
            Some("idle") => Status::Idle,
            Some("dnd") => Status::Dnd,
            // "invisible", "offline", anything else, or missing entirely
            _ => Status::Offline,
        }
    }

    /// True for online/idle/dnd.
    pub fn is_active(self) -> bool {
        matches!(self, Status::Online | Status::Idle | Status::Dnd)
    }

    /// Steady-state status label.
    pub fn steady_label(self) -> &'static str {
        match self {
            Status::Online => "Online",
            Status::Idle => "Away",
            Status::Dnd => "Do not disturb",
            Status::Offline | Status::Unknown => "Offline",
        }
    }

    /// One-shot announcement shown when transitioning into this status.
    /// Offline has no transient phase (the last-seen ticker starts instead).
    pub fn transient_label(self) -> Option<&'static str> {
        match self {
            Status::Online => Some("Active now"),
            Status::Idle => Some("Away now"),
            Status::Dnd => Some("Do not disturb"),
            Status::Offline | Status::Unknown => None,
        }
    }
}

/// Profile metadata for the tracked user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub display_name: String,
    pub avatar: Option<String>,
    pub banner: Option<String>,
    pub badge_flags: u64,
}

/// Currently playing track, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub track_id: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub artwork: Option<String>,
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
}

/// One point-in-time presence observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceSnapshot {
    pub profile: Profile,
    pub status: Status,
    pub track: Option<Track>,
}

/// REST response envelope: `{ "success": bool, "data": {...} }`.
#[derive(Debug, Deserialize)]
pub struct RestEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<WirePresence>,
}

/// Socket frame: `{ "op": u8, "t": "...", "d": {...} }`.
#[derive(Debug, Deserialize)]
pub struct SocketFrame {
    pub op: u8,
    #[serde(default)]
    pub t: Option<String>,
    #[serde(default)]
    pub d: Option<JsonValue>,
}

/// Presence data object as Lanyard sends it.
#[derive(Debug, Deserialize)]
pub struct WirePresence {
    #[serde(default)]
    pub discord_user: Option<WireUser>,
    #[serde(default)]
    pub discord_status: Option<String>,
    #[serde(default)]
    pub activities: Vec<WireActivity>,
    #[serde(default)]
    pub spotify: Option<WireSpotify>,
}

#[derive(Debug, Deserialize)]
pub struct WireUser {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub public_flags: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct WireActivity {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub sync_id: Option<String>,
    #[serde(default)]
    pub timestamps: Option<WireTimestamps>,
    #[serde(default)]
    pub assets: Option<WireAssets>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireTimestamps {
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub end: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct WireAssets {
    #[serde(default)]
    pub large_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireSpotify {
    #[serde(default)]
    pub track_id: Option<String>,
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album_art_url: Option<String>,
    #[serde(default)]
    pub timestamps: Option<WireTimestamps>,
}

impl PresenceSnapshot {
    /// Normalize a wire presence object. `fallback_id` identifies the
    /// tracked user when the payload carries no `discord_user` at all.
    pub fn from_wire(wire: WirePresence, fallback_id: &str) -> Self {
        let profile = match wire.discord_user {
            Some(u) => Profile {
                display_name: u
                    .global_name
                    .or(u.username)
                    .unwrap_or_else(|| "Unknown".to_string()),
                avatar: u.avatar,
                banner: u.banner,
                badge_flags: u.public_flags.unwrap_or(0),
                id: u.id,
            },
            None => Profile {
                id: fallback_id.to_string(),
                display_name: "Unknown".to_string(),
                avatar: None,
                banner: None,
                badge_flags: 0,
            },
        };

        let status = Status::from_wire(wire.discord_status.as_deref());

        // Prefer the top-level spotify object; fall back to the Spotify
        // activity entry when only the raw activity list is present.
        let track = match wire.spotify {
            Some(s) => Some(Track {
                track_id: s.track_id,
                title: s.song.unwrap_or_default(),
                subtitle: s.artist.unwrap_or_default(),
                artwork: s.album_art_url,
                start_ms: s.timestamps.as_ref().and_then(|t| t.start),
                end_ms: s.timestamps.as_ref().and_then(|t| t.end),
            }),
            None => wire
                .activities
                .into_iter()
                .find(|a| a.name.as_deref() == Some("Spotify"))
                .map(|a| Track {
                    track_id: a.sync_id,
                    title: a.details.unwrap_or_default(),
                    subtitle: a.state.unwrap_or_default(),
                    artwork: a.assets.and_then(|s| s.large_image),
                    start_ms: a.timestamps.as_ref().and_then(|t| t.start),
                    end_ms: a.timestamps.as_ref().and_then(|t| t.end),
                }),
        };

        PresenceSnapshot {
            profile,
            status,
            track,
        }
    }
}
