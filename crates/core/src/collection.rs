//! Owned-card inventory.

use std::cmp::Ordering;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    catalog::Card,
    error::{TradeError, TradeResult},
    models::{CardCondition, CardGrade, CollectionEntry},
    trade::FieldUpdate,
};

/// Ordering applied by [`Collection::query`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum SortOrder {
    #[default]
    NameAsc,
    NameDesc,
    /// Set name, then collector number.
    SetAsc,
    SetDesc,
    DateAddedAsc,
    DateAddedDesc,
    QuantityAsc,
    QuantityDesc,
}

/// Search, filter and sort options for the collection view.
#[derive(Debug, Clone, Default)]
pub struct CollectionQuery {
    /// Case-insensitive match against card name or set name.
    pub text: Option<String>,
    /// Energy type.
    pub energy_type: Option<String>,
    /// Exact rarity.
    pub rarity: Option<String>,
    /// Set id.
    pub set_id: Option<String>,
    /// `Some(true)` keeps only the trade bin, `Some(false)` only the rest.
    pub for_trade: Option<bool>,
    /// Result ordering.
    pub sort: SortOrder,
}

/// Edits to an owned card. `None`/[`FieldUpdate::Keep`] leave a field alone.
#[derive(Debug, Clone, Default)]
#[allow(missing_docs)]
pub struct EntryUpdate {
    pub quantity: Option<u32>,
    pub condition: Option<CardCondition>,
    pub for_trade: Option<bool>,
    pub grade: FieldUpdate<CardGrade>,
    pub purchase_price: FieldUpdate<f64>,
    pub notes: FieldUpdate<String>,
    pub custom_price: FieldUpdate<f64>,
}

/// Aggregate value of a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Portfolio {
    /// Total copies held.
    pub total_cards: u32,
    /// Sum of unit value × quantity over entries with a known value.
    pub market_value: f64,
    /// Sum of purchase price × quantity.
    pub total_cost: f64,
}

impl Portfolio {
    /// Market value minus cost.
    pub fn profit_loss(&self) -> f64 {
        self.market_value - self.total_cost
    }

    /// Profit or loss relative to cost, in percent; `None` without any cost basis.
    pub fn profit_loss_percent(&self) -> Option<f64> {
        (self.total_cost > 0.0).then(|| self.profit_loss() / self.total_cost * 100.0)
    }
}

/// A user's owned cards in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    entries: Vec<CollectionEntry>,
}

impl Collection {
    /// Wrap existing entries.
    pub fn new(entries: Vec<CollectionEntry>) -> Self {
        Self { entries }
    }

    /// Starter collection: one Near Mint copy of each card, none for trade.
    pub fn from_catalog(cards: Vec<Card>) -> Self {
        let now = Utc::now();
        let entries = cards
            .into_iter()
            .map(|card| {
                let mut entry = CollectionEntry::new(card, 1, CardCondition::NearMint);
                entry.purchase_date = Some(now);
                entry
            })
            .collect();
        Self { entries }
    }

    /// All entries.
    pub fn entries(&self) -> &[CollectionEntry] {
        &self.entries
    }

    /// `true` when no cards are held.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by card id.
    pub fn entry(&self, card_id: &str) -> Option<&CollectionEntry> {
        self.entries.iter().find(|entry| entry.card_id() == card_id)
    }

    /// Add copies of `card`, merging into an existing entry for the same card.
    pub fn add_card(
        &mut self,
        card: Card,
        quantity: u32,
        condition: CardCondition,
    ) -> &CollectionEntry {
        if let Some(index) = self.position(&card.id) {
            let entry = &mut self.entries[index];
            entry.quantity = entry.quantity.saturating_add(quantity);
            info!(card_id = %entry.card.id, quantity = entry.quantity, "Collection quantity increased");
            return &self.entries[index];
        }

        let mut entry = CollectionEntry::new(card, quantity, condition);
        entry.purchase_date = Some(Utc::now());
        info!(card_id = %entry.card.id, quantity, "Card added to collection");
        self.entries.push(entry);
        let last = self.entries.len() - 1;
        &self.entries[last]
    }

    /// Apply `update` to the entry for `card_id`.
    pub fn update_entry(&mut self, card_id: &str, update: EntryUpdate) -> TradeResult<&CollectionEntry> {
        let entry = self.entry_mut(card_id)?;
        if let Some(quantity) = update.quantity {
            entry.quantity = quantity;
        }
        if let Some(condition) = update.condition {
            entry.condition = condition;
        }
        if let Some(for_trade) = update.for_trade {
            entry.for_trade = for_trade;
        }
        update.grade.apply_to(&mut entry.grade);
        update.purchase_price.apply_to(&mut entry.purchase_price);
        update.notes.apply_to(&mut entry.notes);
        update.custom_price.apply_to(&mut entry.custom_price);
        Ok(&*entry)
    }

    /// Remove a card entirely.
    pub fn remove_card(&mut self, card_id: &str) -> TradeResult<CollectionEntry> {
        let index = self
            .position(card_id)
            .ok_or_else(|| TradeError::CardNotFound(card_id.to_string()))?;
        info!(card_id, "Card removed from collection");
        Ok(self.entries.remove(index))
    }

    /// Move a card in or out of the trade bin. Existing listings are unaffected.
    pub fn update_card_trade_status(&mut self, card_id: &str, for_trade: bool) -> TradeResult<()> {
        let entry = self.entry_mut(card_id)?;
        entry.for_trade = for_trade;
        info!(card_id, for_trade, "Card trade status updated");
        Ok(())
    }

    /// Cards flagged for trade.
    pub fn trade_bin(&self) -> Vec<&CollectionEntry> {
        self.entries.iter().filter(|entry| entry.for_trade).collect()
    }

    /// Filter and sort entries for display.
    pub fn query(&self, query: &CollectionQuery) -> Vec<&CollectionEntry> {
        let needle = query
            .text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase);

        let mut items: Vec<&CollectionEntry> = self
            .entries
            .iter()
            .filter(|entry| match &needle {
                Some(needle) => {
                    entry.card.name.to_lowercase().contains(needle)
                        || entry.card.set.name.to_lowercase().contains(needle)
                }
                None => true,
            })
            .filter(|entry| {
                query
                    .energy_type
                    .as_ref()
                    .map_or(true, |energy| entry.card.types.contains(energy))
            })
            .filter(|entry| {
                query
                    .rarity
                    .as_ref()
                    .map_or(true, |rarity| entry.card.rarity.as_ref() == Some(rarity))
            })
            .filter(|entry| {
                query
                    .set_id
                    .as_ref()
                    .map_or(true, |set_id| &entry.card.set.id == set_id)
            })
            .filter(|entry| query.for_trade.map_or(true, |flag| entry.for_trade == flag))
            .collect();

        items.sort_by(|a, b| compare(a, b, query.sort));
        items
    }

    /// Totals across the collection.
    pub fn portfolio(&self) -> Portfolio {
        self.entries
            .iter()
            .fold(Portfolio::default(), |mut acc, entry| {
                let quantity = f64::from(entry.quantity);
                acc.total_cards = acc.total_cards.saturating_add(entry.quantity);
                acc.market_value += entry.unit_value().unwrap_or(0.0) * quantity;
                acc.total_cost += entry.purchase_price.unwrap_or(0.0) * quantity;
                acc
            })
    }

    /// Consume the collection and return its entries.
    pub fn into_entries(self) -> Vec<CollectionEntry> {
        self.entries
    }

    fn position(&self, card_id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.card_id() == card_id)
    }

    fn entry_mut(&mut self, card_id: &str) -> TradeResult<&mut CollectionEntry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.card_id() == card_id)
            .ok_or_else(|| TradeError::CardNotFound(card_id.to_string()))
    }
}

fn compare(a: &CollectionEntry, b: &CollectionEntry, order: SortOrder) -> Ordering {
    let by_set = |a: &CollectionEntry, b: &CollectionEntry| {
        a.card
            .set
            .name
            .cmp(&b.card.set.name)
            .then_with(|| a.card.number.cmp(&b.card.number))
    };
    match order {
        SortOrder::NameAsc => a.card.name.cmp(&b.card.name),
        SortOrder::NameDesc => b.card.name.cmp(&a.card.name),
        SortOrder::SetAsc => by_set(a, b),
        SortOrder::SetDesc => by_set(b, a),
        SortOrder::DateAddedAsc => a.purchase_date.cmp(&b.purchase_date),
        SortOrder::DateAddedDesc => b.purchase_date.cmp(&a.purchase_date),
        SortOrder::QuantityAsc => a.quantity.cmp(&b.quantity),
        SortOrder::QuantityDesc => b.quantity.cmp(&a.quantity),
    }
}
