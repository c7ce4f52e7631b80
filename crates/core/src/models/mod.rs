//! Shared domain models.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::catalog::Card;

/// Avatar used when a user has not set one.
pub const PLACEHOLDER_AVATAR: &str = "/placeholder-avatar.png";

/// A known trader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier used for ownership checks.
    pub id: String,
    /// Display name, also used to sign in.
    pub username: String,
    /// Contact address.
    #[serde(default)]
    pub email: String,
    /// Avatar URL, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Reputation score, display only.
    #[serde(default)]
    pub reputation: f64,
    /// Free-text profile blurb.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Free-text location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// When the account was created.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_date"
    )]
    pub join_date: Option<DateTime<Utc>>,
    /// Experience points.
    #[serde(default)]
    pub xp: u32,
    /// Level derived from experience.
    #[serde(default)]
    pub level: u32,
    /// Number of trades the user has finished.
    #[serde(default)]
    pub completed_trades: u32,
    /// Badges earned so far.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub achievements: Vec<Achievement>,
    /// Profile summary: cards owned.
    #[serde(default)]
    pub collection_size: u32,
    /// Profile summary: estimated collection value.
    #[serde(default)]
    pub collection_value: f64,
}

/// Badge shown on a user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    /// Kept as stored; usually a `YYYY-MM-DD` date.
    #[serde(default)]
    pub date_earned: String,
}

impl User {
    /// Minimal user with the given id and username.
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: String::new(),
            avatar: None,
            reputation: 0.0,
            bio: None,
            location: None,
            join_date: None,
            xp: 0,
            level: 0,
            completed_trades: 0,
            achievements: Vec::new(),
            collection_size: 0,
            collection_value: 0.0,
        }
    }

    /// Avatar URL, falling back to the shared placeholder.
    pub fn avatar_or_placeholder(&self) -> String {
        self.avatar
            .as_deref()
            .filter(|avatar| !avatar.is_empty())
            .unwrap_or(PLACEHOLDER_AVATAR)
            .to_string()
    }
}

/// Physical condition of a card, ordered from worst to best so that
/// `Mint > NearMint > ... > Poor`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CardCondition {
    /// Heavily worn.
    Poor,
    /// Visible play wear.
    Played,
    /// Light wear.
    Good,
    /// Minor imperfections.
    Excellent,
    /// Near perfect.
    #[default]
    #[serde(rename = "Near Mint")]
    NearMint,
    /// Perfect.
    Mint,
}

impl CardCondition {
    /// Display label, matching the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            CardCondition::Mint => "Mint",
            CardCondition::NearMint => "Near Mint",
            CardCondition::Excellent => "Excellent",
            CardCondition::Good => "Good",
            CardCondition::Played => "Played",
            CardCondition::Poor => "Poor",
        }
    }
}

impl fmt::Display for CardCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Professional grading label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum CardGrade {
    #[serde(rename = "PSA 10")]
    Psa10,
    #[serde(rename = "PSA 9")]
    Psa9,
    #[serde(rename = "PSA 8")]
    Psa8,
    #[serde(rename = "PSA 7")]
    Psa7,
    #[serde(rename = "BGS 10")]
    Bgs10,
    #[serde(rename = "BGS 9.5")]
    Bgs9_5,
    #[serde(rename = "BGS 9")]
    Bgs9,
    #[serde(rename = "CGC 10")]
    Cgc10,
    #[serde(rename = "CGC 9.5")]
    Cgc9_5,
    #[serde(rename = "CGC 9")]
    Cgc9,
    Raw,
}

/// A card the user owns, or a by-value snapshot of one attached to a listing or offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntry {
    /// Catalog data for the card.
    #[serde(flatten)]
    pub card: Card,
    /// Copies owned.
    pub quantity: u32,
    /// Condition of the owned copies.
    #[serde(default)]
    pub condition: CardCondition,
    /// Whether the card sits in the trade bin.
    #[serde(default)]
    pub for_trade: bool,
    /// Grading label, if graded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<CardGrade>,
    /// Price paid per copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    /// When the card was added. Date-only values load as midnight UTC.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_date"
    )]
    pub purchase_date: Option<DateTime<Utc>>,
    /// Free-text notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// User-assigned value overriding the catalog price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_price: Option<f64>,
    /// Folders the card is filed under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<Vec<String>>,
    /// Where the last price refresh came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_price_source: Option<String>,
}

impl CollectionEntry {
    /// New entry for `card` with no optional metadata.
    pub fn new(card: Card, quantity: u32, condition: CardCondition) -> Self {
        Self {
            card,
            quantity,
            condition,
            for_trade: false,
            grade: None,
            purchase_price: None,
            purchase_date: None,
            notes: None,
            custom_price: None,
            folder: None,
            last_price_source: None,
        }
    }

    /// Catalog id of the card.
    pub fn card_id(&self) -> &str {
        &self.card.id
    }

    /// Per-copy value: the custom price if set, else the catalog market price.
    pub fn unit_value(&self) -> Option<f64> {
        self.custom_price.or_else(|| self.card.market_price())
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates; null or blank is `None`.
fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(timestamp.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| Some(midnight.and_utc()))
        .ok_or_else(|| de::Error::custom(format!("invalid date {raw:?}")))
}
