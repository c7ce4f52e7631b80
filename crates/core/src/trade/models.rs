use std::{collections::HashSet, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::CollectionEntry;

/// Lifecycle state of a [`TradeListing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingStatus {
    /// Open for offers.
    Active,
    /// Reserved state carried by persisted data; no operation enters it.
    Pending,
    /// An offer was accepted. Terminal.
    Completed,
    /// Withdrawn by its owner. Terminal.
    Cancelled,
}

impl ListingStatus {
    /// `true` for states with no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, ListingStatus::Completed | ListingStatus::Cancelled)
    }

    /// Lowercase label used by status filters.
    pub fn as_str(self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Pending => "pending",
            ListingStatus::Completed => "completed",
            ListingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of an [`Offer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfferStatus {
    /// Awaiting the listing owner's decision.
    Pending,
    /// Chosen by the listing owner.
    Accepted,
    /// Declined, or closed out by another decision on the listing.
    Rejected,
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Rejected => "rejected",
        };
        f.write_str(label)
    }
}

/// Counter-proposal made against a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    /// Identifier, unique within the parent listing.
    pub id: String,
    /// Id of the offering user.
    pub offer_user_id: String,
    /// Username of the offering user at offer time.
    pub offer_username: String,
    /// Avatar of the offering user at offer time.
    pub offer_user_avatar: String,
    /// Cards put up in exchange.
    pub offered_cards: Vec<CollectionEntry>,
    /// Note to the listing owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Arrival time.
    pub created_at: DateTime<Utc>,
    /// Current decision.
    pub status: OfferStatus,
}

/// A bundle of cards one user puts up for trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeListing {
    /// Opaque unique identifier.
    pub id: String,
    /// Owner id; never changes after creation.
    pub user_id: String,
    /// Owner username at creation time.
    pub username: String,
    /// Owner avatar at creation time.
    pub user_avatar: String,
    /// Owner reputation at creation time.
    #[serde(default)]
    pub user_reputation: f64,
    /// The bundle; never empty.
    pub cards: Vec<CollectionEntry>,
    /// Price asked instead of, or in addition to, cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asking_price: Option<f64>,
    /// Card names the owner would like in return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wishlist: Option<Vec<String>>,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lifecycle state.
    pub status: ListingStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Offers in arrival order.
    #[serde(default)]
    pub offers: Vec<Offer>,
}

impl TradeListing {
    /// Look up an offer by id.
    pub fn offer(&self, offer_id: &str) -> Option<&Offer> {
        self.offers.iter().find(|offer| offer.id == offer_id)
    }

    /// The accepted offer, if the listing completed.
    pub fn accepted_offer(&self) -> Option<&Offer> {
        self.offers
            .iter()
            .find(|offer| offer.status == OfferStatus::Accepted)
    }

    /// Offers still awaiting a decision.
    pub fn pending_offers(&self) -> impl Iterator<Item = &Offer> {
        self.offers
            .iter()
            .filter(|offer| offer.status == OfferStatus::Pending)
    }

    /// Check the structural invariants of a listing that entered from outside
    /// the engine, such as persisted JSON.
    pub fn validate(&self) -> Result<(), String> {
        if self.cards.is_empty() {
            return Err("listing has no cards".to_string());
        }
        validate_price(self.asking_price)?;

        let mut seen = HashSet::new();
        let mut accepted = 0;
        for offer in &self.offers {
            if !seen.insert(offer.id.as_str()) {
                return Err(format!("duplicate offer id {}", offer.id));
            }
            if offer.offer_user_id == self.user_id {
                return Err(format!("offer {} was made by the listing owner", offer.id));
            }
            if offer.offered_cards.is_empty() {
                return Err(format!("offer {} has no cards", offer.id));
            }
            if offer.status == OfferStatus::Accepted {
                accepted += 1;
            }
        }

        match accepted {
            0 => Ok(()),
            1 if self.status == ListingStatus::Completed => Ok(()),
            1 => Err(format!("accepted offer on a {} listing", self.status)),
            _ => Err("more than one accepted offer".to_string()),
        }
    }
}

/// Payload for a new listing; ownership, id, status and timestamps are
/// assigned by the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingDraft {
    /// The bundle; must not be empty.
    pub cards: Vec<CollectionEntry>,
    /// Optional non-negative asking price.
    pub asking_price: Option<f64>,
    /// Optional wanted card names.
    pub wishlist: Option<Vec<String>>,
    /// Optional description.
    pub description: Option<String>,
}

/// Edit applied to one field of an existing listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldUpdate<T> {
    /// Leave the field as it is.
    #[default]
    Keep,
    /// Replace the field.
    Set(T),
    /// Clear an optional field.
    Clear,
}

impl<T> FieldUpdate<T> {
    pub(crate) fn apply_to(self, slot: &mut Option<T>) {
        match self {
            FieldUpdate::Keep => {}
            FieldUpdate::Set(value) => *slot = Some(value),
            FieldUpdate::Clear => *slot = None,
        }
    }
}

/// Field-level edit of a listing's payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingUpdate {
    /// Replacement bundle; must not be empty when given.
    pub cards: Option<Vec<CollectionEntry>>,
    /// Asking price edit.
    pub asking_price: FieldUpdate<f64>,
    /// Wishlist edit.
    pub wishlist: FieldUpdate<Vec<String>>,
    /// Description edit.
    pub description: FieldUpdate<String>,
}

pub(crate) fn validate_price(price: Option<f64>) -> Result<(), String> {
    match price {
        Some(value) if !value.is_finite() || value < 0.0 => {
            Err(format!("asking price {value} must be a non-negative number"))
        }
        _ => Ok(()),
    }
}
