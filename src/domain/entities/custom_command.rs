use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// How a custom command's trigger is compared against message text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum TriggerType {
    /// First word of the message is `prefix + trigger`
    #[default]
    Command,
    StartsWith,
    Contains,
    Regex,
    /// Whole message equals the trigger
    Exact,
    /// Stored value outside the known range; kept as-is and never matches
    Unknown(i64),
}

impl TriggerType {
    pub fn as_str(&self) -> &str {
        match self {
            TriggerType::Command => "command",
            TriggerType::StartsWith => "starts-with",
            TriggerType::Contains => "contains",
            TriggerType::Regex => "regex",
            TriggerType::Exact => "exact",
            TriggerType::Unknown(_) => "unknown",
        }
    }
}

impl From<i64> for TriggerType {
    fn from(value: i64) -> Self {
        match value {
            0 => TriggerType::Command,
            1 => TriggerType::StartsWith,
            2 => TriggerType::Contains,
            3 => TriggerType::Regex,
            4 => TriggerType::Exact,
            other => TriggerType::Unknown(other),
        }
    }
}

impl From<TriggerType> for i64 {
    fn from(value: TriggerType) -> Self {
        match value {
            TriggerType::Command => 0,
            TriggerType::StartsWith => 1,
            TriggerType::Contains => 2,
            TriggerType::Regex => 3,
            TriggerType::Exact => 4,
            TriggerType::Unknown(other) => other,
        }
    }
}

impl std::str::FromStr for TriggerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "command" => Ok(TriggerType::Command),
            "starts-with" | "startswith" => Ok(TriggerType::StartsWith),
            "contains" => Ok(TriggerType::Contains),
            "regex" => Ok(TriggerType::Regex),
            "exact" => Ok(TriggerType::Exact),
            other => Err(format!("unknown trigger type '{}'", other)),
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerType::Unknown(value) => write!(f, "unknown({})", value),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Explicit `null` decodes to the zero value, same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A user-defined trigger/response rule scoped to one guild.
///
/// `Default` is the placeholder substituted for entries that fail to decode:
/// it has an empty trigger and never matches anything.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomCommand {
    #[serde(deserialize_with = "null_as_default")]
    pub trigger_type: TriggerType,
    #[serde(deserialize_with = "null_as_default")]
    pub trigger: String,
    #[serde(deserialize_with = "null_as_default")]
    pub response: String,
    #[serde(deserialize_with = "null_as_default")]
    pub case_sensitive: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub id: u32,
}

impl CustomCommand {
    pub fn new(trigger_type: TriggerType, trigger: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            trigger_type,
            trigger: trigger.into(),
            response: response.into(),
            case_sensitive: false,
            id: 0,
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn is_placeholder(&self) -> bool {
        *self == Self::default()
    }

    /// Check whether `text` fires this command. `prefix` only applies to
    /// `TriggerType::Command`.
    pub fn matches(&self, text: &str, prefix: &str) -> bool {
        self.matches_with(text, prefix, None)
    }

    /// Same as [`CustomCommand::matches`], reusing compiled regexes from `cache`
    pub fn matches_cached(&self, text: &str, prefix: &str, cache: &RegexCache) -> bool {
        self.matches_with(text, prefix, Some(cache))
    }

    fn matches_with(&self, text: &str, prefix: &str, cache: Option<&RegexCache>) -> bool {
        if self.trigger.is_empty() {
            return false;
        }

        if self.trigger_type == TriggerType::Regex {
            let pattern = if self.case_sensitive {
                self.trigger.clone()
            } else {
                format!("(?i){}", self.trigger)
            };
            return match cache {
                Some(cache) => cache.is_match(&pattern, text),
                None => compile(&pattern).is_some_and(|re| re.is_match(text)),
            };
        }

        let (text, trigger, prefix) = if self.case_sensitive {
            (text.to_string(), self.trigger.clone(), prefix.to_string())
        } else {
            (text.to_lowercase(), self.trigger.to_lowercase(), prefix.to_lowercase())
        };

        match self.trigger_type {
            TriggerType::Command => {
                let Some(rest) = text.strip_prefix(prefix.as_str()) else {
                    return false;
                };
                let Some(after) = rest.strip_prefix(trigger.as_str()) else {
                    return false;
                };
                after.is_empty() || after.starts_with(char::is_whitespace)
            }
            TriggerType::StartsWith => text.starts_with(&trigger),
            TriggerType::Contains => text.contains(&trigger),
            TriggerType::Exact => text == trigger,
            TriggerType::Regex | TriggerType::Unknown(_) => false,
        }
    }
}

impl fmt::Display for CustomCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} [{}] {} -> {}", self.id, self.trigger_type, self.trigger, self.response)
    }
}

fn compile(pattern: &str) -> Option<regex_lite::Regex> {
    match regex_lite::Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::debug!("Invalid custom command regex {:?}: {}", pattern, e);
            None
        }
    }
}

/// Compiled regex triggers keyed by pattern. Invalid patterns are cached as
/// `None` so they are only reported once.
pub struct RegexCache {
    compiled: Mutex<HashMap<String, Option<regex_lite::Regex>>>,
    capacity: usize,
}

impl RegexCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            compiled: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    pub fn is_match(&self, pattern: &str, text: &str) -> bool {
        let mut compiled = self.compiled.lock().unwrap_or_else(|e| e.into_inner());

        if !compiled.contains_key(pattern) {
            // start over rather than track recency
            if compiled.len() >= self.capacity {
                compiled.clear();
            }
            compiled.insert(pattern.to_string(), compile(pattern));
        }

        compiled
            .get(pattern)
            .and_then(Option::as_ref)
            .is_some_and(|re| re.is_match(text))
    }

    pub fn len(&self) -> usize {
        self.compiled.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RegexCache {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_record() {
        let raw = r#"{"trigger_type":3,"trigger":"^hi+$","response":"hello","case_sensitive":true,"id":9}"#;
        let cmd: CustomCommand = serde_json::from_str(raw).unwrap();

        assert_eq!(cmd.trigger_type, TriggerType::Regex);
        assert_eq!(cmd.trigger, "^hi+$");
        assert_eq!(cmd.response, "hello");
        assert!(cmd.case_sensitive);
        assert_eq!(cmd.id, 9);
    }

    #[test]
    fn test_missing_fields_take_zero_values() {
        let cmd: CustomCommand = serde_json::from_str(r#"{"trigger":"ping","id":2}"#).unwrap();
        assert_eq!(cmd.trigger_type, TriggerType::Command);
        assert_eq!(cmd.response, "");
        assert!(!cmd.case_sensitive);
        assert_eq!(cmd.id, 2);
    }

    #[test]
    fn test_invalid_records_rejected() {
        assert!(serde_json::from_str::<CustomCommand>(r#"{"id":-1}"#).is_err());
        assert!(serde_json::from_str::<CustomCommand>(r#"{"trigger":5}"#).is_err());
        assert!(serde_json::from_str::<CustomCommand>("not json").is_err());
    }

    #[test]
    fn test_unknown_trigger_type_kept() {
        let cmd: CustomCommand = serde_json::from_str(r#"{"trigger_type":9,"trigger":"keep me","id":12}"#).unwrap();
        assert_eq!(cmd.trigger_type, TriggerType::Unknown(9));
        assert_eq!(cmd.id, 12);
        assert!(!cmd.matches("keep me", "!"));
        assert_eq!(serde_json::to_value(&cmd).unwrap()["trigger_type"], 9);
    }

    #[test]
    fn test_null_fields_take_zero_values() {
        let raw = r#"{"trigger_type":null,"trigger":null,"response":null,"case_sensitive":null,"id":13}"#;
        let cmd: CustomCommand = serde_json::from_str(raw).unwrap();
        assert_eq!(cmd, CustomCommand::default().with_id(13));
    }

    #[test]
    fn test_trigger_type_encodes_as_integer() {
        let cmd = CustomCommand::new(TriggerType::Exact, "a", "b").with_id(4);
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value["trigger_type"], 4);
        assert_eq!(value["id"], 4);
    }

    #[test]
    fn test_placeholder_never_matches() {
        let placeholder = CustomCommand::default();
        assert!(placeholder.is_placeholder());
        assert!(!placeholder.matches("", "!"));
        assert!(!placeholder.matches("!", "!"));
        assert!(!placeholder.matches("anything", "!"));
    }

    #[test]
    fn test_command_trigger() {
        let cmd = CustomCommand::new(TriggerType::Command, "ping", "pong");
        assert!(cmd.matches("!ping", "!"));
        assert!(cmd.matches("!PING extra args", "!"));
        assert!(!cmd.matches("!pingpong", "!"));
        assert!(!cmd.matches("ping", "!"));
    }

    #[test]
    fn test_starts_with_and_contains() {
        let starts = CustomCommand::new(TriggerType::StartsWith, "good", "morning");
        assert!(starts.matches("Good day", "!"));
        assert!(!starts.matches("a good day", "!"));

        let contains = CustomCommand::new(TriggerType::Contains, "rust", "crab");
        assert!(contains.matches("I like RUST a lot", "!"));
        assert!(!contains.matches("I like go", "!"));
    }

    #[test]
    fn test_exact_respects_case_sensitivity() {
        let insensitive = CustomCommand::new(TriggerType::Exact, "Hello", "hi");
        assert!(insensitive.matches("hello", "!"));
        assert!(!insensitive.matches("hello there", "!"));

        let sensitive = insensitive.clone().case_sensitive(true);
        assert!(sensitive.matches("Hello", "!"));
        assert!(!sensitive.matches("hello", "!"));
    }

    #[test]
    fn test_mixed_case_prefix() {
        let cmd = CustomCommand::new(TriggerType::Command, "ping", "pong");
        assert!(cmd.matches("Bot.PING", "bot."));
        assert!(cmd.matches("bot.ping", "Bot."));
        assert!(!cmd.case_sensitive(true).matches("bot.ping", "Bot."));
    }

    #[test]
    fn test_regex_cache_reuses_patterns() {
        let cache = RegexCache::new(2);
        let cmd = CustomCommand::new(TriggerType::Regex, r"^ha+$", "lol");

        assert!(cmd.matches_cached("HAAA", "!", &cache));
        assert!(!cmd.matches_cached("hello", "!", &cache));
        assert_eq!(cache.len(), 1);

        let broken = CustomCommand::new(TriggerType::Regex, "(", "never");
        assert!(!broken.matches_cached("(", "!", &cache));
        assert_eq!(cache.len(), 2);

        let other = CustomCommand::new(TriggerType::Regex, "x", "y").case_sensitive(true);
        assert!(other.matches_cached("x", "!", &cache));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_regex_trigger() {
        let cmd = CustomCommand::new(TriggerType::Regex, r"^ha+$", "lol");
        assert!(cmd.matches("HAAA", "!"));
        assert!(!cmd.case_sensitive(true).matches("HAAA", "!"));

        let broken = CustomCommand::new(TriggerType::Regex, "(", "never");
        assert!(!broken.matches("(", "!"));
    }
}
