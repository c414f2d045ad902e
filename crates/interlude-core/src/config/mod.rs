//! Trigger configuration model.
//!
//! A [`TriggerConfig`] is an immutable value describing *when* the engine is
//! allowed to attempt an ad show: either after a number of user interactions
//! (CLICKS) or on a fixed cadence (INTERVAL). Exactly one of the two trigger
//! fields is semantically active, selected by the trigger kind; the other may
//! be present on the wire and is ignored.
//!
//! Floors and clamps are applied at read time through the accessor methods,
//! so a config deserialized from a lenient backend can never drive the engine
//! with a zero threshold or a sub-10-second interval.

pub mod store;

use serde::{Deserialize, Serialize};

pub use store::ConfigStore;

/// Default click threshold when the backend omits `count`.
pub const DEFAULT_CLICK_THRESHOLD: u32 = 15;
/// Default interval when the backend omits `seconds`.
pub const DEFAULT_INTERVAL_SECONDS: u64 = 120;
/// Lower bound for INTERVAL cadence.
pub const MIN_INTERVAL_SECONDS: u64 = 10;
/// Allowed range for the dismiss-control delay.
pub const DISMISS_DELAY_RANGE: std::ops::RangeInclusive<u32> = 5..=30;

/// Trigger policy selector.
///
/// Unknown values coming off the wire map to [`TriggerKind::Unknown`], which
/// every decision path treats as "never show" rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TriggerKind {
    Clicks,
    Interval,
    Unknown,
}

impl From<String> for TriggerKind {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "CLICKS" => TriggerKind::Clicks,
            "INTERVAL" => TriggerKind::Interval,
            _ => TriggerKind::Unknown,
        }
    }
}

impl From<TriggerKind> for String {
    fn from(kind: TriggerKind) -> Self {
        match kind {
            TriggerKind::Clicks => "CLICKS".to_string(),
            TriggerKind::Interval => "INTERVAL".to_string(),
            TriggerKind::Unknown => "UNKNOWN".to_string(),
        }
    }
}

impl Default for TriggerKind {
    fn default() -> Self {
        TriggerKind::Clicks
    }
}

/// Trigger descriptor as stored on the backend.
///
/// Both optional fields are kept for backward/forward compatibility; the
/// accessors on [`TriggerConfig`] pick the active one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(rename = "type")]
    pub kind: TriggerKind,
    /// Used when kind = Clicks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    /// Used when kind = Interval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u64>,
}

impl Trigger {
    pub fn clicks(count: u32) -> Self {
        Self {
            kind: TriggerKind::Clicks,
            count: Some(count.max(1)),
            seconds: None,
        }
    }

    pub fn interval(seconds: u64) -> Self {
        Self {
            kind: TriggerKind::Interval,
            count: None,
            seconds: Some(seconds.max(MIN_INTERVAL_SECONDS)),
        }
    }
}

/// Immutable trigger configuration, replaced wholesale on every sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    #[serde(default)]
    pub categories: Vec<String>,
    pub trigger: Trigger,
    /// Kept wide on the wire; clamped into range at read time like the other
    /// trigger parameters, so an out-of-range value degrades instead of
    /// failing the whole document.
    #[serde(default = "default_dismiss_delay")]
    pub dismiss_delay_seconds: u32,
}

fn default_dismiss_delay() -> u32 {
    5
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            categories: vec!["SPORT".into(), "FOOD".into(), "TECH".into()],
            trigger: Trigger::clicks(DEFAULT_CLICK_THRESHOLD),
            dismiss_delay_seconds: 5,
        }
    }
}

impl TriggerConfig {
    /// Active click threshold, floored at 1.
    pub fn click_threshold(&self) -> u32 {
        self.trigger.count.unwrap_or(DEFAULT_CLICK_THRESHOLD).max(1)
    }

    /// Active interval cadence in seconds, floored at 10.
    pub fn interval_seconds(&self) -> u64 {
        self.trigger
            .seconds
            .unwrap_or(DEFAULT_INTERVAL_SECONDS)
            .max(MIN_INTERVAL_SECONDS)
    }

    /// Dismiss-control delay clamped into `[5, 30]`.
    pub fn dismiss_delay(&self) -> u8 {
        self.dismiss_delay_seconds
            .clamp(*DISMISS_DELAY_RANGE.start(), *DISMISS_DELAY_RANGE.end()) as u8
    }

    /// Build the config resulting from a developer preference override,
    /// layered over the currently active config.
    ///
    /// An empty (post-normalization) category list keeps the current
    /// categories; omitted trigger parameters fall back to their defaults and
    /// are floored; an omitted dismiss delay keeps the current one.
    pub fn apply_preferences(&self, prefs: &Preferences) -> TriggerConfig {
        let cleaned = normalize_categories(prefs.categories.iter().map(String::as_str));
        let categories = if cleaned.is_empty() {
            self.categories.clone()
        } else {
            cleaned
        };

        let trigger = match prefs.trigger_kind {
            TriggerKind::Interval => {
                Trigger::interval(prefs.interval_seconds.unwrap_or(DEFAULT_INTERVAL_SECONDS))
            }
            _ => Trigger::clicks(prefs.click_count.unwrap_or(DEFAULT_CLICK_THRESHOLD)),
        };

        TriggerConfig {
            categories,
            trigger,
            dismiss_delay_seconds: prefs
                .dismiss_delay_seconds
                .unwrap_or(self.dismiss_delay_seconds)
                .clamp(*DISMISS_DELAY_RANGE.start(), *DISMISS_DELAY_RANGE.end()),
        }
    }
}

/// Developer-requested configuration override (see `AdEngine::set_preferences`).
#[derive(Debug, Clone, Default)]
pub struct Preferences {
    pub categories: Vec<String>,
    pub trigger_kind: TriggerKind,
    pub click_count: Option<u32>,
    pub interval_seconds: Option<u64>,
    pub dismiss_delay_seconds: Option<u32>,
}

/// Trim, uppercase, drop blanks, and deduplicate while preserving order.
pub fn normalize_categories<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for cat in raw {
        let cleaned = cat.trim().to_ascii_uppercase();
        if !cleaned.is_empty() && !out.contains(&cleaned) {
            out.push(cleaned);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_kind_parses_case_insensitively() {
        assert_eq!(TriggerKind::from("clicks".to_string()), TriggerKind::Clicks);
        assert_eq!(
            TriggerKind::from(" Interval ".to_string()),
            TriggerKind::Interval
        );
        assert_eq!(
            TriggerKind::from("BANNER".to_string()),
            TriggerKind::Unknown
        );
    }

    #[test]
    fn wire_shape_round_trips() {
        let json = r#"{
            "categories": ["SPORT", "TECH"],
            "trigger": {"type": "INTERVAL", "seconds": 45},
            "dismiss_delay_seconds": 12
        }"#;
        let cfg: TriggerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.trigger.kind, TriggerKind::Interval);
        assert_eq!(cfg.interval_seconds(), 45);
        assert_eq!(cfg.dismiss_delay(), 12);

        let back = serde_json::to_value(&cfg).unwrap();
        assert_eq!(back["trigger"]["type"], "INTERVAL");
        // The inactive field is absent, not null.
        assert!(back["trigger"].get("count").is_none());
    }

    #[test]
    fn unknown_trigger_type_deserializes() {
        let json = r#"{"categories": [], "trigger": {"type": "SOMETHING_NEW"}}"#;
        let cfg: TriggerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.trigger.kind, TriggerKind::Unknown);
        assert_eq!(cfg.dismiss_delay(), 5);
    }

    #[test]
    fn oversized_dismiss_delay_clamps_instead_of_failing_parse() {
        let json = r#"{
            "categories": ["SPORT"],
            "trigger": {"type": "CLICKS", "count": 5},
            "dismiss_delay_seconds": 400
        }"#;
        let cfg: TriggerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.dismiss_delay_seconds, 400);
        assert_eq!(cfg.dismiss_delay(), 30);
    }

    #[test]
    fn accessors_apply_floors() {
        let cfg = TriggerConfig {
            categories: vec![],
            trigger: Trigger {
                kind: TriggerKind::Interval,
                count: Some(0),
                seconds: Some(3),
            },
            dismiss_delay_seconds: 99,
        };
        assert_eq!(cfg.click_threshold(), 1);
        assert_eq!(cfg.interval_seconds(), MIN_INTERVAL_SECONDS);
        assert_eq!(cfg.dismiss_delay(), 30);
    }

    #[test]
    fn normalize_categories_cleans_and_dedupes() {
        let cats = normalize_categories(
            ["  sport ", "TECH", "tech", "", "  ", "Food"].into_iter(),
        );
        assert_eq!(cats, vec!["SPORT", "TECH", "FOOD"]);
    }

    #[test]
    fn preferences_with_empty_categories_keep_current() {
        let current = TriggerConfig::default();
        let next = current.apply_preferences(&Preferences {
            categories: vec!["".into(), "   ".into()],
            trigger_kind: TriggerKind::Interval,
            interval_seconds: Some(4),
            ..Default::default()
        });
        assert_eq!(next.categories, current.categories);
        assert_eq!(next.trigger, Trigger::interval(MIN_INTERVAL_SECONDS));
    }

    #[test]
    fn preferences_default_to_clicks_with_defaults() {
        let current = TriggerConfig::default();
        let next = current.apply_preferences(&Preferences {
            categories: vec!["news".into()],
            trigger_kind: TriggerKind::Unknown,
            ..Default::default()
        });
        assert_eq!(next.trigger, Trigger::clicks(DEFAULT_CLICK_THRESHOLD));
        assert_eq!(next.categories, vec!["NEWS"]);
        assert_eq!(next.dismiss_delay_seconds, current.dismiss_delay_seconds);
    }
}
