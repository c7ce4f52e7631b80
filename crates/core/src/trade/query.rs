use std::collections::BTreeSet;

use crate::models::{CardCondition, CollectionEntry};

use super::{
    engine::TradeExchange,
    models::{ListingStatus, TradeListing},
};

/// Marketplace filter over listings.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    /// Only listings in this state; `None` shows all.
    pub status: Option<ListingStatus>,
    /// Case-insensitive match against the owner's username and the names and
    /// sets of the bundled cards.
    pub text: Option<String>,
    /// At least one bundled card has this energy type.
    pub energy_type: Option<String>,
    /// At least one bundled card has this rarity.
    pub rarity: Option<String>,
    /// At least one bundled card is in this condition.
    pub condition: Option<CardCondition>,
}

impl ListingFilter {
    /// Whether `listing` passes every configured criterion.
    pub fn matches(&self, listing: &TradeListing) -> bool {
        if let Some(status) = self.status {
            if listing.status != status {
                return false;
            }
        }

        if let Some(needle) = self.needle() {
            let in_cards = listing.cards.iter().any(|entry| {
                entry.card.name.to_lowercase().contains(&needle)
                    || entry.card.set.name.to_lowercase().contains(&needle)
            });
            if !listing.username.to_lowercase().contains(&needle) && !in_cards {
                return false;
            }
        }

        if let Some(energy) = &self.energy_type {
            if !listing.cards.iter().any(|e| e.card.types.contains(energy)) {
                return false;
            }
        }
        if let Some(rarity) = &self.rarity {
            if !listing
                .cards
                .iter()
                .any(|e| e.card.rarity.as_ref() == Some(rarity))
            {
                return false;
            }
        }
        if let Some(condition) = self.condition {
            if !listing.cards.iter().any(|e| e.condition == condition) {
                return false;
            }
        }

        true
    }

    fn needle(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase)
    }
}

/// Distinct values offered by the marketplace filter menus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Energy types, sorted.
    pub energy_types: BTreeSet<String>,
    /// Rarities, sorted.
    pub rarities: BTreeSet<String>,
    /// Conditions, worst first.
    pub conditions: BTreeSet<CardCondition>,
    /// Set names, sorted.
    pub sets: BTreeSet<String>,
}

impl FilterOptions {
    fn absorb(&mut self, entry: &CollectionEntry) {
        self.energy_types.extend(entry.card.types.iter().cloned());
        if let Some(rarity) = &entry.card.rarity {
            self.rarities.insert(rarity.clone());
        }
        self.conditions.insert(entry.condition);
        if !entry.card.set.name.is_empty() {
            self.sets.insert(entry.card.set.name.clone());
        }
    }
}

impl TradeExchange {
    /// Listings passing `filter`, in stored (newest-first) order.
    pub fn search(&self, filter: &ListingFilter) -> Vec<&TradeListing> {
        self.listings()
            .iter()
            .filter(|listing| filter.matches(listing))
            .collect()
    }

    /// Listings created by `user_id`.
    pub fn listings_owned_by(&self, user_id: &str) -> Vec<&TradeListing> {
        self.listings()
            .iter()
            .filter(|listing| listing.user_id == user_id)
            .collect()
    }

    /// Every listing `user_id` has offered on, each carrying only that user's offers.
    pub fn offers_made_by(&self, user_id: &str) -> Vec<TradeListing> {
        self.listings()
            .iter()
            .filter_map(|listing| {
                let offers: Vec<_> = listing
                    .offers
                    .iter()
                    .filter(|offer| offer.offer_user_id == user_id)
                    .cloned()
                    .collect();
                if offers.is_empty() {
                    return None;
                }
                let mut view = listing.clone();
                view.offers = offers;
                Some(view)
            })
            .collect()
    }

    /// Filter menu values drawn from every listed card plus `collection`.
    pub fn filter_options(&self, collection: &[CollectionEntry]) -> FilterOptions {
        let mut options = FilterOptions::default();
        for entry in self
            .listings()
            .iter()
            .flat_map(|listing| listing.cards.iter())
            .chain(collection.iter())
        {
            options.absorb(entry);
        }
        options
    }
}
