// Presentation Sink
//
// The rendering seam. The reconciler and projector emit `UiIntent`s; a
// sink renders them and never feeds anything back.

use crate::reconciler::UiIntent;
use async_trait::async_trait;

/// Unified presentation sink trait.
#[async_trait]
pub trait PresentationSink: Send {
    /// Apply one UI intent to the rendering surface.
    async fn apply(&mut self, intent: UiIntent);
}

/// Renders intents as plain lines on stdout. This is the binary's default
/// surface; visual styling is deliberately minimal.
pub struct TerminalSink {
    transient_visible: bool,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self {
            transient_visible: false,
        }
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PresentationSink for TerminalSink {
    async fn apply(&mut self, intent: UiIntent) {
        match intent {
            UiIntent::SetProfile {
                name, badge_flags, ..
            } => {
                if badge_flags != 0 {
                    println!("· {} [flags {:#x}]", name, badge_flags);
                } else {
                    println!("· {}", name);
                }
            }
            UiIntent::SetStatusLabel(label) => println!("status: {}", label),
            UiIntent::ShowTransient(text) => {
                self.transient_visible = true;
                println!("» {}", text);
            }
            UiIntent::HideTransient => {
                // hiding an already-hidden label is a no-op
                if self.transient_visible {
                    self.transient_visible = false;
                    println!("«");
                }
            }
            UiIntent::SetLastSeenText(text) => println!("{}", text),
            UiIntent::SetTrackInfo {
                title, subtitle, ..
            } => println!("♪ {} — {}", title, subtitle),
            UiIntent::SetTrackProgress {
                percent,
                elapsed,
                total,
            } => println!("  {} / {} ({:.0}%)", elapsed, total, percent),
            UiIntent::ClearTrack => println!("♪ (nothing playing)"),
        }
    }
}
