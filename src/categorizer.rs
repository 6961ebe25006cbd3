use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Tip,
    Promotion,
    NetFare,
    Ignore,
}

impl Category {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Tip => "tip",
            Self::Promotion => "promotion",
            Self::NetFare => "net_fare",
            Self::Ignore => "ignore",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tip => "Tips",
            Self::Promotion => "Promotions",
            Self::NetFare => "Net Fare",
            Self::Ignore => "Ignored",
        }
    }

    /// Whether the category counts toward shift revenue.
    pub fn is_revenue(&self) -> bool {
        !matches!(self, Self::Ignore)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum MatchType {
    Exact,
    StartsWith,
    ContainsIgnoreCase,
}

// Evaluated top to bottom; first hit wins. Anything unmatched is a ride fare.
const RULES: &[(&str, MatchType, Category)] = &[
    ("Tip", MatchType::Exact, Category::Tip),
    ("Quest", MatchType::StartsWith, Category::Promotion),
    ("Incentive", MatchType::StartsWith, Category::Promotion),
    ("transferred to bank", MatchType::ContainsIgnoreCase, Category::Ignore),
];

fn matches(event_type: &str, pattern: &str, match_type: MatchType) -> bool {
    match match_type {
        MatchType::Exact => event_type == pattern,
        MatchType::StartsWith => event_type.starts_with(pattern),
        MatchType::ContainsIgnoreCase => event_type
            .to_lowercase()
            .contains(&pattern.to_lowercase()),
    }
}

/// Classify a transaction label. Pure; the result is never persisted.
pub fn categorize(event_type: &str) -> Category {
    let event_type = event_type.trim();
    RULES
        .iter()
        .find(|(pattern, match_type, _)| matches(event_type, pattern, *match_type))
        .map(|(_, _, category)| *category)
        .unwrap_or(Category::NetFare)
}
