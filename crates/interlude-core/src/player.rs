//! Playback surface control logic.
//!
//! Widget-free state machine behind the full-screen player: the host surface
//! drives it with timestamps and tap events and renders whatever it answers.
//! Covers the two behaviors the ad contract cares about -- the dismiss
//! control stays inert for the configured delay, and body taps that open the
//! target URL are debounced so a double-tap cannot navigate twice.

use crate::error::SdkError;
use crate::sdk::AdPlacement;

/// Minimum spacing between body taps.
pub const TAP_DEBOUNCE_MS: u64 = 600;

/// What the surface should do in response to a body tap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapAction {
    /// Swallow the tap.
    Ignored,
    /// Open the URL externally and close the surface.
    Navigate(String),
}

/// Control state for one ad presentation.
#[derive(Debug, Clone)]
pub struct PlaybackControl {
    dismiss_at_ms: u64,
    target_url: Option<String>,
    last_tap_at_ms: Option<u64>,
    closed: bool,
}

impl PlaybackControl {
    /// Begin a presentation at `now_ms`. A placement with a blank video URL
    /// is rejected; the surface closes immediately instead of playing.
    pub fn new(placement: &AdPlacement, now_ms: u64) -> Result<Self, SdkError> {
        if placement.video_url.trim().is_empty() {
            return Err(SdkError::InvalidPlacement("blank video url".into()));
        }
        let delay_ms = u64::from(placement.dismiss_delay_seconds.clamp(5, 30)) * 1000;
        Ok(Self {
            dismiss_at_ms: now_ms + delay_ms,
            target_url: placement.target_url.clone(),
            last_tap_at_ms: None,
            closed: false,
        })
    }

    /// Whether the dismiss control is interactive yet.
    pub fn can_dismiss(&self, now_ms: u64) -> bool {
        !self.closed && now_ms >= self.dismiss_at_ms
    }

    /// Tap on the dismiss control. Returns whether the surface closed.
    pub fn on_dismiss_tap(&mut self, now_ms: u64) -> bool {
        if self.can_dismiss(now_ms) {
            self.closed = true;
            true
        } else {
            false
        }
    }

    /// Tap on the video body (outside the dismiss control).
    pub fn on_body_tap(&mut self, now_ms: u64) -> TapAction {
        if self.closed {
            return TapAction::Ignored;
        }
        if let Some(last) = self.last_tap_at_ms {
            if now_ms.saturating_sub(last) < TAP_DEBOUNCE_MS {
                return TapAction::Ignored;
            }
        }
        self.last_tap_at_ms = Some(now_ms);

        match self.target_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => {
                // Close so returning from the browser goes back to the app.
                self.closed = true;
                TapAction::Navigate(url.to_string())
            }
            _ => TapAction::Ignored,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(target: Option<&str>, delay: u8) -> AdPlacement {
        AdPlacement {
            video_url: "https://cdn.example.com/ad.mp4".into(),
            target_url: target.map(str::to_string),
            dismiss_delay_seconds: delay,
        }
    }

    #[test]
    fn blank_video_url_is_rejected() {
        let bad = AdPlacement {
            video_url: "   ".into(),
            target_url: None,
            dismiss_delay_seconds: 5,
        };
        assert!(matches!(
            PlaybackControl::new(&bad, 0),
            Err(SdkError::InvalidPlacement(_))
        ));
    }

    #[test]
    fn dismiss_waits_out_the_delay() {
        let mut ctl = PlaybackControl::new(&placement(None, 7), 10_000).unwrap();
        assert!(!ctl.can_dismiss(10_000));
        assert!(!ctl.on_dismiss_tap(16_999));
        assert!(!ctl.is_closed());

        assert!(ctl.can_dismiss(17_000));
        assert!(ctl.on_dismiss_tap(17_000));
        assert!(ctl.is_closed());
    }

    #[test]
    fn dismiss_delay_is_clamped() {
        let ctl = PlaybackControl::new(&placement(None, 200), 0).unwrap();
        assert!(!ctl.can_dismiss(29_999));
        assert!(ctl.can_dismiss(30_000));
    }

    #[test]
    fn body_tap_navigates_once_and_closes() {
        let mut ctl = PlaybackControl::new(&placement(Some("https://example.com"), 5), 0).unwrap();
        assert_eq!(
            ctl.on_body_tap(100),
            TapAction::Navigate("https://example.com".into())
        );
        assert!(ctl.is_closed());
        assert_eq!(ctl.on_body_tap(101), TapAction::Ignored);
    }

    #[test]
    fn body_taps_are_debounced() {
        // No target URL: taps are swallowed but still stamp the debounce.
        let mut ctl = PlaybackControl::new(&placement(None, 5), 0).unwrap();
        assert_eq!(ctl.on_body_tap(1_000), TapAction::Ignored);
        assert_eq!(ctl.on_body_tap(1_400), TapAction::Ignored);
        assert!(!ctl.is_closed());

        let mut with_target =
            PlaybackControl::new(&placement(Some("https://example.com"), 5), 0).unwrap();
        assert!(matches!(with_target.on_body_tap(0), TapAction::Navigate(_)));
    }

    #[test]
    fn rapid_double_tap_cannot_navigate_twice() {
        let mut first = PlaybackControl::new(&placement(Some("https://a.example"), 5), 0).unwrap();
        assert!(matches!(first.on_body_tap(500), TapAction::Navigate(_)));

        // A second control on the same surface lineage would still debounce
        // via closed-state; within one control the close already blocks it.
        assert_eq!(first.on_body_tap(700), TapAction::Ignored);
    }
}
