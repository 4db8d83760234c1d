//! Core domain types: messages, pairs, categories, and semantic blocks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single turn of text from one side of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
}

/// One user turn and the assistant turn that answers it.
///
/// Both sides are always present; the assistant content may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePair {
    pub id: String,
    pub user: Message,
    pub assistant: Message,
}

impl MessagePair {
    /// Build pair `n` with ids `pair-n`, `user-n`, and `assistant-n`.
    pub fn new(n: usize, user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            id: format!("pair-{n}"),
            user: Message {
                id: format!("user-{n}"),
                role: Role::User,
                content: user.into(),
            },
            assistant: Message {
                id: format!("assistant-{n}"),
                role: Role::Assistant,
                content: assistant.into(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// BlockCategory
// ---------------------------------------------------------------------------

/// The closed set of topic labels a pair can be assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockCategory {
    PricingStrategy,
    StartingPricePoints,
    CompetitorAnalysis,
    SalesTeam,
    FreeTrial,
    General,
}

/// Presentation metadata for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryMeta {
    pub title: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

impl BlockCategory {
    /// Every category, in declaration order.
    pub const ALL: [BlockCategory; 6] = [
        Self::PricingStrategy,
        Self::StartingPricePoints,
        Self::CompetitorAnalysis,
        Self::SalesTeam,
        Self::FreeTrial,
        Self::General,
    ];

    /// Wire label (`snake_case`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PricingStrategy => "pricing_strategy",
            Self::StartingPricePoints => "starting_price_points",
            Self::CompetitorAnalysis => "competitor_analysis",
            Self::SalesTeam => "sales_team",
            Self::FreeTrial => "free_trial",
            Self::General => "general",
        }
    }

    /// Static title/icon/color used when a block is emitted.
    pub fn meta(&self) -> CategoryMeta {
        match self {
            Self::PricingStrategy => CategoryMeta {
                title: "Pricing Strategy",
                icon: "DollarSign",
                color: "emerald",
            },
            Self::StartingPricePoints => CategoryMeta {
                title: "Starting Price Points",
                icon: "Tag",
                color: "indigo",
            },
            Self::CompetitorAnalysis => CategoryMeta {
                title: "Competitor Analysis",
                icon: "BarChart3",
                color: "blue",
            },
            Self::SalesTeam => CategoryMeta {
                title: "Sales Team",
                icon: "Users",
                color: "violet",
            },
            Self::FreeTrial => CategoryMeta {
                title: "Free Trial",
                icon: "Gift",
                color: "amber",
            },
            Self::General => CategoryMeta {
                title: "General",
                icon: "MessageCircle",
                color: "slate",
            },
        }
    }
}

impl fmt::Display for BlockCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a label is not one of the six category names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category label '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for BlockCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// SemanticBlock
// ---------------------------------------------------------------------------

/// A titled group of pairs sharing one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticBlock {
    /// `block-<n>`, assigned in emission order.
    pub id: String,
    pub category: BlockCategory,
    pub title: String,
    pub icon: String,
    pub color: String,
    /// Never empty for emitted blocks.
    pub messages: Vec<MessagePair>,
}

impl SemanticBlock {
    /// Build block `n` for `category`, filling presentation fields from [`BlockCategory::meta`].
    pub fn new(n: usize, category: BlockCategory, messages: Vec<MessagePair>) -> Self {
        let meta = category.meta();
        Self {
            id: format!("block-{n}"),
            category,
            title: meta.title.to_string(),
            icon: meta.icon.to_string(),
            color: meta.color.to_string(),
            messages,
        }
    }
}
