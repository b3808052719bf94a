use once_cell::sync::Lazy;
use regex::Regex;

/// How series matching one rule combine across hosts on a shared chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStrategy {
    /// One series per host/label.
    Separate,
    /// Stack same-label series from all hosts into one series.
    Stack,
}

/// One classification rule for perfdata metrics.
pub struct ServiceGroupRule {
    pub pattern: Regex,
    pub category: &'static str,
    pub unit_hint: Option<&'static str>,
    pub join: JoinStrategy,
    /// Record the match but keep evaluating later rules, so a metric can
    /// belong to several categories.
    pub fallthrough: bool,
}

impl ServiceGroupRule {
    fn new(
        pattern: &str,
        category: &'static str,
        unit_hint: Option<&'static str>,
        join: JoinStrategy,
        fallthrough: bool,
    ) -> Self {
        Self {
            pattern: Regex::new(pattern).unwrap(),
            category,
            unit_hint,
            join,
            fallthrough,
        }
    }
}

/// The rule table is a prioritized list, not a lookup table: rules are
/// evaluated top to bottom and the first non-fallthrough match wins.
/// Reordering changes classification results.
static RULES: Lazy<Vec<ServiceGroupRule>> = Lazy::new(|| {
    use JoinStrategy::*;
    vec![
        // NRPE interface checks are network metrics and also classify by
        // their individual label below.
        ServiceGroupRule::new(r"^nrpe_(eth|bond|em)\d", "network", None, Stack, true),
        ServiceGroupRule::new(r"(^|_)(rta|rtt|latency)($|_)", "latency", Some("ms"), Separate, false),
        ServiceGroupRule::new(r"(^|_)pl$|packet_loss", "loss", Some("%"), Separate, false),
        ServiceGroupRule::new(r"(rx|tx)_bytes", "throughput", Some("B/s"), Stack, false),
        ServiceGroupRule::new(
            r"(rx|tx)_(packets|errors|dropped)|collisions",
            "packets",
            Some("p/s"),
            Stack,
            false,
        ),
        ServiceGroupRule::new(r"^load", "load", None, Separate, false),
        ServiceGroupRule::new(r"^(mem|swap)", "memory", Some("iB"), Separate, false),
        ServiceGroupRule::new(r"(^|_)temp", "temperature", Some("°C"), Separate, false),
        ServiceGroupRule::new(r"^(disk|df|fs)(_|$)", "storage", Some("iB"), Separate, false),
        ServiceGroupRule::new(r"users?$", "users", None, Separate, false),
        ServiceGroupRule::new(r"procs?$", "processes", None, Separate, false),
    ]
});

/// All rules matching `name`, in priority order. Evaluation stops at the
/// first non-fallthrough match; an empty result means "uncategorized".
pub fn classify(name: &str) -> Vec<&'static ServiceGroupRule> {
    let mut matches = Vec::new();
    for rule in RULES.iter() {
        if rule.pattern.is_match(name) {
            matches.push(rule);
            if !rule.fallthrough {
                break;
            }
        }
    }
    matches
}

/// Primary category and unit hint for `name`. The unit hint comes from
/// the first matching rule that has one.
pub fn primary(name: &str) -> (Option<&'static str>, Option<&'static str>) {
    let matches = classify(name);
    let category = matches.first().map(|rule| rule.category);
    let unit_hint = matches.iter().find_map(|rule| rule.unit_hint);
    (category, unit_hint)
}
