//! Host for the trade exchange: tracks the signed-in user and mirrors every
//! change to the persistence adapter.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    catalog::Card,
    collection::{Collection, EntryUpdate},
    error::{TradeError, TradeResult},
    identity::IdentityProvider,
    models::{CardCondition, CollectionEntry, User},
    storage::{
        collection_key, load_json_lenient, load_json_list, save_json, PersistenceAdapter,
        CURRENT_USER_KEY, TRADE_LISTINGS_KEY,
    },
    trade::{ListingDraft, ListingUpdate, Offer, TradeExchange, TradeListing},
};

/// Application state for one client.
///
/// Operations act as the signed-in user and fail with
/// [`TradeError::NotSignedIn`] when there is none. After each successful
/// change the affected snapshot is written back in full. If that write fails
/// the in-memory change stands and [`TradeError::Storage`] is returned.
pub struct TradeHub {
    store: Arc<dyn PersistenceAdapter>,
    identity: Arc<dyn IdentityProvider>,
    current_user: Option<User>,
    collection: Collection,
    exchange: TradeExchange,
    wishlist: Vec<Card>,
}

impl TradeHub {
    /// Restore state from `store`. Unreadable values are logged and skipped;
    /// in stored lists only the unreadable elements are dropped.
    pub fn open(store: Arc<dyn PersistenceAdapter>, identity: Arc<dyn IdentityProvider>) -> Self {
        let current_user: Option<User> = load_json_lenient(store.as_ref(), CURRENT_USER_KEY);
        let collection = current_user
            .as_ref()
            .map(|user| load_collection(store.as_ref(), &user.id))
            .unwrap_or_default();
        let listings: Vec<TradeListing> = load_json_list(store.as_ref(), TRADE_LISTINGS_KEY);
        let exchange = TradeExchange::from_listings(listings);

        info!(
            user = current_user.as_ref().map(|u| u.username.as_str()).unwrap_or("none"),
            listings = exchange.listings().len(),
            "Trade hub opened"
        );

        Self {
            store,
            identity,
            current_user,
            collection,
            exchange,
            wishlist: Vec::new(),
        }
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// The signed-in user's collection; empty when signed out.
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Every listing, for read-only queries.
    pub fn exchange(&self) -> &TradeExchange {
        &self.exchange
    }

    /// Sign in by username and load that user's collection.
    pub fn sign_in(&mut self, username: &str) -> TradeResult<&User> {
        let user = self
            .identity
            .find_by_username(username)
            .ok_or_else(|| TradeError::UnknownUser(username.to_string()))?;

        save_json(self.store.as_ref(), CURRENT_USER_KEY, &user)?;
        self.collection = load_collection(self.store.as_ref(), &user.id);
        info!(user_id = %user.id, cards = self.collection.entries().len(), "Signed in");
        Ok(&*self.current_user.insert(user))
    }

    /// Sign out, forgetting the in-memory collection and wishlist.
    pub fn sign_out(&mut self) -> TradeResult<()> {
        if let Some(user) = self.current_user.take() {
            info!(user_id = %user.id, "Signed out");
        }
        self.collection = Collection::default();
        self.wishlist.clear();
        self.store.remove(CURRENT_USER_KEY)?;
        Ok(())
    }

    /// Install a starter collection built from `cards` if the user has none.
    /// Returns whether anything was installed.
    pub fn seed_collection(&mut self, cards: Vec<Card>) -> TradeResult<bool> {
        self.require_user()?;
        if !self.collection.is_empty() || cards.is_empty() {
            return Ok(false);
        }
        self.collection = Collection::from_catalog(cards);
        self.persist_collection()?;
        Ok(true)
    }

    /// Copy entries out of the collection by card id, for use in a listing or offer.
    pub fn snapshot_cards(&self, card_ids: &[&str]) -> TradeResult<Vec<CollectionEntry>> {
        card_ids
            .iter()
            .map(|id| {
                self.collection
                    .entry(id)
                    .cloned()
                    .ok_or_else(|| TradeError::CardNotFound(id.to_string()))
            })
            .collect()
    }

    /// Add copies of a catalog card to the collection.
    pub fn add_to_collection(
        &mut self,
        card: Card,
        quantity: u32,
        condition: CardCondition,
    ) -> TradeResult<CollectionEntry> {
        self.require_user()?;
        let entry = self.collection.add_card(card, quantity, condition).clone();
        self.persist_collection()?;
        Ok(entry)
    }

    /// Edit an owned card.
    pub fn update_collection_card(
        &mut self,
        card_id: &str,
        update: EntryUpdate,
    ) -> TradeResult<CollectionEntry> {
        self.require_user()?;
        let entry = self.collection.update_entry(card_id, update)?.clone();
        self.persist_collection()?;
        Ok(entry)
    }

    /// Drop a card from the collection.
    pub fn remove_from_collection(&mut self, card_id: &str) -> TradeResult<CollectionEntry> {
        self.require_user()?;
        let removed = self.collection.remove_card(card_id)?;
        self.persist_collection()?;
        Ok(removed)
    }

    /// Move a card in or out of the trade bin.
    pub fn update_card_trade_status(&mut self, card_id: &str, for_trade: bool) -> TradeResult<()> {
        self.require_user()?;
        self.collection.update_card_trade_status(card_id, for_trade)?;
        self.persist_collection()
    }

    /// Publish a listing as the signed-in user.
    pub fn create_listing(&mut self, draft: ListingDraft) -> TradeResult<TradeListing> {
        let user = self.require_user()?.clone();
        let listing = self.exchange.create_listing(&user, draft)?.clone();
        self.persist_listings()?;
        Ok(listing)
    }

    /// Edit one of the signed-in user's listings.
    pub fn update_listing(
        &mut self,
        listing_id: &str,
        update: ListingUpdate,
    ) -> TradeResult<TradeListing> {
        let user = self.require_user()?.clone();
        let listing = self
            .exchange
            .update_listing(listing_id, &user, update)?
            .clone();
        self.persist_listings()?;
        Ok(listing)
    }

    /// Cancel one of the signed-in user's listings.
    pub fn cancel_listing(&mut self, listing_id: &str) -> TradeResult<TradeListing> {
        let user = self.require_user()?.clone();
        let listing = self.exchange.cancel_listing(listing_id, &user)?.clone();
        self.persist_listings()?;
        Ok(listing)
    }

    /// Offer cards against another user's listing.
    pub fn make_offer(
        &mut self,
        listing_id: &str,
        offered_cards: Vec<CollectionEntry>,
        message: Option<&str>,
    ) -> TradeResult<Offer> {
        let user = self.require_user()?.clone();
        let offer = self
            .exchange
            .make_offer(listing_id, &user, offered_cards, message)?
            .clone();
        self.persist_listings()?;
        Ok(offer)
    }

    /// Accept an offer on one of the signed-in user's listings.
    pub fn accept_offer(&mut self, listing_id: &str, offer_id: &str) -> TradeResult<TradeListing> {
        let user = self.require_user()?.clone();
        let listing = self
            .exchange
            .accept_offer(listing_id, offer_id, &user)?
            .clone();
        self.persist_listings()?;
        Ok(listing)
    }

    /// Reject an offer on one of the signed-in user's listings.
    pub fn reject_offer(&mut self, listing_id: &str, offer_id: &str) -> TradeResult<TradeListing> {
        let user = self.require_user()?.clone();
        let listing = self
            .exchange
            .reject_offer(listing_id, offer_id, &user)?
            .clone();
        self.persist_listings()?;
        Ok(listing)
    }

    /// Withdraw one of the signed-in user's offers.
    pub fn withdraw_offer(&mut self, listing_id: &str, offer_id: &str) -> TradeResult<Offer> {
        let user = self.require_user()?.clone();
        let offer = self.exchange.withdraw_offer(listing_id, offer_id, &user)?;
        self.persist_listings()?;
        Ok(offer)
    }

    /// Cards the user is looking for, in the order they were added.
    pub fn wishlist(&self) -> &[Card] {
        &self.wishlist
    }

    /// Add `card` to the wishlist, or remove it if a card with the same id is
    /// already there. Returns whether the card is now wishlisted.
    ///
    /// The wishlist lives for the session only and is never persisted.
    pub fn toggle_wishlist(&mut self, card: Card) -> bool {
        if let Some(index) = self.wishlist.iter().position(|item| item.id == card.id) {
            self.wishlist.remove(index);
            info!(card_id = %card.id, "Removed from wishlist");
            false
        } else {
            info!(card_id = %card.id, "Added to wishlist");
            self.wishlist.push(card);
            true
        }
    }

    /// Listings created by the signed-in user.
    pub fn my_listings(&self) -> TradeResult<Vec<&TradeListing>> {
        let user = self.require_user()?;
        Ok(self.exchange.listings_owned_by(&user.id))
    }

    /// Listings the signed-in user has offered on, with only their offers.
    pub fn my_offers(&self) -> TradeResult<Vec<TradeListing>> {
        let user = self.require_user()?;
        Ok(self.exchange.offers_made_by(&user.id))
    }

    fn require_user(&self) -> TradeResult<&User> {
        self.current_user.as_ref().ok_or(TradeError::NotSignedIn)
    }

    fn persist_listings(&self) -> TradeResult<()> {
        let listings = self.exchange.listings();
        if listings.is_empty() {
            self.store.remove(TRADE_LISTINGS_KEY)?;
        } else {
            save_json(self.store.as_ref(), TRADE_LISTINGS_KEY, listings)?;
        }
        Ok(())
    }

    fn persist_collection(&self) -> TradeResult<()> {
        let user = self.require_user()?;
        let key = collection_key(&user.id);
        if self.collection.is_empty() {
            self.store.remove(&key)?;
        } else if let Err(err) = save_json(self.store.as_ref(), &key, &self.collection) {
            warn!(user_id = %user.id, "Failed to persist collection: {err:#}");
            return Err(err.into());
        }
        Ok(())
    }
}

fn load_collection(store: &dyn PersistenceAdapter, user_id: &str) -> Collection {
    Collection::new(load_json_list(store, &collection_key(user_id)))
}
