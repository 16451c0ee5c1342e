//! Time-to-live policy by endpoint class.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::request_key::RequestParams;

/// Broad category of an upstream endpoint, used to pick a TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointClass {
    /// Fixtures by date.
    Fixtures,
    /// Live fixtures and live predictions.
    Live,
    Odds,
    Leagues,
    Teams,
    /// Non-live predictions.
    Predictions,
    HeadToHead,
    /// Anything not recognised.
    Other,
}

impl EndpointClass {
    /// Classify an endpoint name, taking a `live` parameter into account.
    pub fn classify(endpoint: &str, params: &RequestParams) -> Self {
        let name = endpoint.to_ascii_lowercase();
        let live_param = params.get("live").is_some_and(|v| match v {
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::Null => false,
            serde_json::Value::String(s) => !s.is_empty() && s != "false" && s != "0",
            serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
        });

        if name.starts_with("h2h") || name.contains("headtohead") || name.contains("head-to-head") {
            Self::HeadToHead
        } else if live_param || name.contains("live") {
            Self::Live
        } else if name.starts_with("odds") {
            Self::Odds
        } else if name.starts_with("prediction") {
            Self::Predictions
        } else if name.starts_with("fixture") {
            Self::Fixtures
        } else if name.starts_with("league") {
            Self::Leagues
        } else if name.starts_with("team") {
            Self::Teams
        } else {
            Self::Other
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fixtures => "fixtures",
            Self::Live => "live",
            Self::Odds => "odds",
            Self::Leagues => "leagues",
            Self::Teams => "teams",
            Self::Predictions => "predictions",
            Self::HeadToHead => "head_to_head",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EndpointClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TTL in seconds for each endpoint class. A value of 0 stores without expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TtlPolicy {
    #[serde(default = "default_fixtures_secs")]
    pub fixtures_secs: u64,

    #[serde(default = "default_live_secs")]
    pub live_secs: u64,

    #[serde(default = "default_odds_secs")]
    pub odds_secs: u64,

    #[serde(default = "default_reference_secs")]
    pub leagues_secs: u64,

    #[serde(default = "default_reference_secs")]
    pub teams_secs: u64,

    #[serde(default = "default_predictions_secs")]
    pub predictions_secs: u64,

    #[serde(default = "default_head_to_head_secs")]
    pub head_to_head_secs: u64,

    /// Used for [`EndpointClass::Other`].
    #[serde(default = "default_fixtures_secs")]
    pub default_secs: u64,
}

const fn default_fixtures_secs() -> u64 {
    30 * 60
}

const fn default_live_secs() -> u64 {
    5 * 60
}

const fn default_odds_secs() -> u64 {
    5 * 60
}

const fn default_reference_secs() -> u64 {
    24 * 60 * 60
}

const fn default_predictions_secs() -> u64 {
    60 * 60
}

const fn default_head_to_head_secs() -> u64 {
    12 * 60 * 60
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            fixtures_secs: default_fixtures_secs(),
            live_secs: default_live_secs(),
            odds_secs: default_odds_secs(),
            leagues_secs: default_reference_secs(),
            teams_secs: default_reference_secs(),
            predictions_secs: default_predictions_secs(),
            head_to_head_secs: default_head_to_head_secs(),
            default_secs: default_fixtures_secs(),
        }
    }
}

impl TtlPolicy {
    pub const fn secs_for(&self, class: EndpointClass) -> u64 {
        match class {
            EndpointClass::Fixtures => self.fixtures_secs,
            EndpointClass::Live => self.live_secs,
            EndpointClass::Odds => self.odds_secs,
            EndpointClass::Leagues => self.leagues_secs,
            EndpointClass::Teams => self.teams_secs,
            EndpointClass::Predictions => self.predictions_secs,
            EndpointClass::HeadToHead => self.head_to_head_secs,
            EndpointClass::Other => self.default_secs,
        }
    }

    /// TTL to pass to `set`; `None` when the class is configured without expiry.
    pub fn ttl_for(&self, class: EndpointClass) -> Option<Duration> {
        match self.secs_for(class) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Classify and resolve in one step.
    pub fn ttl_for_request(&self, endpoint: &str, params: &RequestParams) -> Option<Duration> {
        self.ttl_for(EndpointClass::classify(endpoint, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let policy = TtlPolicy::default();
        assert_eq!(policy.ttl_for(EndpointClass::Fixtures), Some(Duration::from_secs(1800)));
        assert_eq!(policy.ttl_for(EndpointClass::Live), Some(Duration::from_secs(300)));
        assert_eq!(policy.ttl_for(EndpointClass::Odds), Some(Duration::from_secs(300)));
        assert_eq!(policy.ttl_for(EndpointClass::Leagues), Some(Duration::from_secs(86_400)));
        assert_eq!(policy.ttl_for(EndpointClass::Teams), Some(Duration::from_secs(86_400)));
        assert_eq!(policy.ttl_for(EndpointClass::Predictions), Some(Duration::from_secs(3600)));
        assert_eq!(policy.ttl_for(EndpointClass::HeadToHead), Some(Duration::from_secs(43_200)));
    }

    #[test]
    fn test_zero_means_no_expiry() {
        let policy = TtlPolicy {
            leagues_secs: 0,
            ..TtlPolicy::default()
        };
        assert_eq!(policy.ttl_for(EndpointClass::Leagues), None);
    }

    #[test]
    fn test_classify() {
        let none = RequestParams::new();
        assert_eq!(EndpointClass::classify("fixtures", &none), EndpointClass::Fixtures);
        assert_eq!(EndpointClass::classify("fixtures/headtohead", &none), EndpointClass::HeadToHead);
        assert_eq!(EndpointClass::classify("h2h-fixture-1", &none), EndpointClass::HeadToHead);
        assert_eq!(EndpointClass::classify("odds", &none), EndpointClass::Odds);
        assert_eq!(EndpointClass::classify("odds/live", &none), EndpointClass::Live);
        assert_eq!(EndpointClass::classify("predictions", &none), EndpointClass::Predictions);
        assert_eq!(EndpointClass::classify("leagues", &none), EndpointClass::Leagues);
        assert_eq!(EndpointClass::classify("teams", &none), EndpointClass::Teams);
        assert_eq!(EndpointClass::classify("standings", &none), EndpointClass::Other);
    }

    #[test]
    fn test_classify_live_param() {
        let live = RequestParams::new().with("live", "all");
        assert_eq!(EndpointClass::classify("fixtures", &live), EndpointClass::Live);
        let not_live = RequestParams::new().with("live", false);
        assert_eq!(EndpointClass::classify("fixtures", &not_live), EndpointClass::Fixtures);
    }

    #[test]
    fn test_classify_numeric_live_param() {
        let zero = RequestParams::new().with("live", 0);
        assert_eq!(EndpointClass::classify("fixtures", &zero), EndpointClass::Fixtures);
        let one = RequestParams::new().with("live", 1);
        assert_eq!(EndpointClass::classify("fixtures", &one), EndpointClass::Live);
    }

    #[test]
    fn test_yaml_partial_override() {
        let policy: TtlPolicy = serde_yaml::from_str("odds_secs: 60").unwrap();
        assert_eq!(policy.odds_secs, 60);
        assert_eq!(policy.fixtures_secs, 1800);
    }
}
