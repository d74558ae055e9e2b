// presence-card - Live Presence Widget
//
// Tracks a single user's presence (status, profile, playing track) from a
// presence-aggregation service and turns the snapshot stream into
// temporally coherent UI intents for a pluggable presentation sink.

pub mod assets;
pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod projector;
pub mod reconciler;
pub mod sink;
pub mod transport;
pub mod widget;

pub use cache::LastSeenCache;
pub use config::{Config, TransportKind};
pub use error::CardError;
pub use model::{PresenceSnapshot, Profile, Status, Track};
pub use reconciler::{reconcile, ReconcilerState, UiIntent};
pub use sink::{PresentationSink, TerminalSink};
pub use transport::{PollTransport, SocketTransport, Transport};
pub use widget::{Clock, PresenceWidget, SystemClock};
