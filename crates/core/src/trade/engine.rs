use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::{TradeError, TradeResult},
    models::{CollectionEntry, User},
};

use super::models::{
    validate_price, FieldUpdate, ListingDraft, ListingStatus, ListingUpdate, Offer, OfferStatus,
    TradeListing,
};

/// Owns every trade listing and applies the listing/offer state machine.
///
/// All operations are synchronous and touch only in-memory state; callers
/// persist [`TradeExchange::listings`] afterwards. Listings are kept
/// newest-first and are never removed, so cancelled and completed listings
/// remain as history.
#[derive(Debug, Clone, Default)]
pub struct TradeExchange {
    listings: Vec<TradeListing>,
}

impl TradeExchange {
    /// Empty exchange.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt listings loaded from outside the engine, dropping any that break
    /// listing invariants.
    pub fn from_listings(listings: Vec<TradeListing>) -> Self {
        let listings = listings
            .into_iter()
            .filter(|listing| match listing.validate() {
                Ok(()) => true,
                Err(reason) => {
                    warn!(listing_id = %listing.id, %reason, "Dropping invalid trade listing");
                    false
                }
            })
            .collect();
        Self { listings }
    }

    /// All listings, newest first.
    pub fn listings(&self) -> &[TradeListing] {
        &self.listings
    }

    /// Consume the exchange and return its listings.
    pub fn into_listings(self) -> Vec<TradeListing> {
        self.listings
    }

    /// Look up a listing by id.
    pub fn listing(&self, listing_id: &str) -> Option<&TradeListing> {
        self.listings.iter().find(|listing| listing.id == listing_id)
    }

    /// Publish a new listing owned by `owner`.
    pub fn create_listing(
        &mut self,
        owner: &User,
        draft: ListingDraft,
    ) -> TradeResult<&TradeListing> {
        if draft.cards.is_empty() {
            return Err(TradeError::InvalidPayload(
                "a listing needs at least one card".to_string(),
            ));
        }
        validate_price(draft.asking_price).map_err(TradeError::InvalidPayload)?;

        let listing = TradeListing {
            id: Uuid::new_v4().to_string(),
            user_id: owner.id.clone(),
            username: owner.username.clone(),
            user_avatar: owner.avatar_or_placeholder(),
            user_reputation: owner.reputation,
            cards: draft.cards,
            asking_price: draft.asking_price,
            wishlist: draft.wishlist,
            description: draft.description,
            status: ListingStatus::Active,
            created_at: Utc::now(),
            offers: Vec::new(),
        };
        info!(
            listing_id = %listing.id,
            user_id = %owner.id,
            cards = listing.cards.len(),
            "Trade listing created"
        );
        self.listings.insert(0, listing);
        Ok(&self.listings[0])
    }

    /// Apply a field-level edit to a listing the actor owns.
    pub fn update_listing(
        &mut self,
        listing_id: &str,
        actor: &User,
        update: ListingUpdate,
    ) -> TradeResult<&TradeListing> {
        if matches!(&update.cards, Some(cards) if cards.is_empty()) {
            return Err(TradeError::InvalidPayload(
                "a listing needs at least one card".to_string(),
            ));
        }
        if let FieldUpdate::Set(price) = &update.asking_price {
            validate_price(Some(*price)).map_err(TradeError::InvalidPayload)?;
        }

        let listing = self.listing_mut(listing_id)?;
        ensure_owner(listing, actor, "edit this listing")?;
        ensure_open(listing)?;

        if let Some(cards) = update.cards {
            listing.cards = cards;
        }
        update.asking_price.apply_to(&mut listing.asking_price);
        update.wishlist.apply_to(&mut listing.wishlist);
        update.description.apply_to(&mut listing.description);

        info!(listing_id, "Trade listing updated");
        Ok(&*listing)
    }

    /// Cancel a listing. Every offer on it is rejected.
    pub fn cancel_listing(&mut self, listing_id: &str, actor: &User) -> TradeResult<&TradeListing> {
        let listing = self.listing_mut(listing_id)?;
        ensure_owner(listing, actor, "cancel this listing")?;
        ensure_open(listing)?;

        listing.status = ListingStatus::Cancelled;
        for offer in &mut listing.offers {
            offer.status = OfferStatus::Rejected;
        }

        info!(listing_id, offers = listing.offers.len(), "Trade listing cancelled");
        Ok(&*listing)
    }

    /// Append a pending offer from `offerer` to an active listing.
    ///
    /// Card quantities are not checked here; the caller selects cards the
    /// offerer actually holds.
    pub fn make_offer(
        &mut self,
        listing_id: &str,
        offerer: &User,
        offered_cards: Vec<CollectionEntry>,
        message: Option<&str>,
    ) -> TradeResult<&Offer> {
        if offered_cards.is_empty() {
            return Err(TradeError::InvalidPayload(
                "an offer needs at least one card".to_string(),
            ));
        }

        let listing = self.listing_mut(listing_id)?;
        if listing.user_id == offerer.id {
            return Err(TradeError::Forbidden {
                user_id: offerer.id.clone(),
                action: "make an offer on their own listing",
            });
        }
        if listing.status != ListingStatus::Active {
            return Err(TradeError::ListingClosed {
                listing_id: listing.id.clone(),
                status: listing.status,
            });
        }

        let offer = Offer {
            id: Uuid::new_v4().to_string(),
            offer_user_id: offerer.id.clone(),
            offer_username: offerer.username.clone(),
            offer_user_avatar: offerer.avatar_or_placeholder(),
            offered_cards,
            message: message
                .map(str::trim)
                .filter(|message| !message.is_empty())
                .map(str::to_string),
            created_at: Utc::now(),
            status: OfferStatus::Pending,
        };
        info!(
            listing_id,
            offer_id = %offer.id,
            user_id = %offerer.id,
            "Offer made"
        );
        listing.offers.push(offer);
        let last = listing.offers.len() - 1;
        Ok(&listing.offers[last])
    }

    /// Accept one offer: it becomes accepted, every sibling is rejected and
    /// the listing completes.
    pub fn accept_offer(
        &mut self,
        listing_id: &str,
        offer_id: &str,
        actor: &User,
    ) -> TradeResult<&TradeListing> {
        let listing = self.listing_mut(listing_id)?;
        ensure_owner(listing, actor, "accept offers on this listing")?;
        if listing.status != ListingStatus::Active {
            return Err(TradeError::ListingClosed {
                listing_id: listing.id.clone(),
                status: listing.status,
            });
        }
        ensure_pending_offer(listing, offer_id)?;

        for offer in &mut listing.offers {
            offer.status = if offer.id == offer_id {
                OfferStatus::Accepted
            } else {
                OfferStatus::Rejected
            };
        }
        listing.status = ListingStatus::Completed;

        info!(listing_id, offer_id, "Offer accepted");
        Ok(&*listing)
    }

    /// Reject a single pending offer; the listing stays as it is.
    pub fn reject_offer(
        &mut self,
        listing_id: &str,
        offer_id: &str,
        actor: &User,
    ) -> TradeResult<&TradeListing> {
        let listing = self.listing_mut(listing_id)?;
        ensure_owner(listing, actor, "reject offers on this listing")?;
        let index = ensure_pending_offer(listing, offer_id)?;
        listing.offers[index].status = OfferStatus::Rejected;

        info!(listing_id, offer_id, "Offer rejected");
        Ok(&*listing)
    }

    /// Remove a pending offer. Only its author may withdraw it.
    pub fn withdraw_offer(
        &mut self,
        listing_id: &str,
        offer_id: &str,
        actor: &User,
    ) -> TradeResult<Offer> {
        let listing = self.listing_mut(listing_id)?;
        let index = find_offer(listing, offer_id)?;
        let offer = &listing.offers[index];
        if offer.offer_user_id != actor.id {
            debug!(listing_id, offer_id, user_id = %actor.id, "Refusing foreign withdrawal");
            return Err(TradeError::Forbidden {
                user_id: actor.id.clone(),
                action: "withdraw another user's offer",
            });
        }
        if offer.status != OfferStatus::Pending {
            return Err(TradeError::OfferNotPending {
                offer_id: offer.id.clone(),
                status: offer.status,
            });
        }

        let removed = listing.offers.remove(index);
        info!(listing_id, offer_id, "Offer withdrawn");
        Ok(removed)
    }

    fn listing_mut(&mut self, listing_id: &str) -> TradeResult<&mut TradeListing> {
        self.listings
            .iter_mut()
            .find(|listing| listing.id == listing_id)
            .ok_or_else(|| TradeError::ListingNotFound(listing_id.to_string()))
    }
}

fn ensure_owner(listing: &TradeListing, actor: &User, action: &'static str) -> TradeResult<()> {
    if listing.user_id == actor.id {
        Ok(())
    } else {
        Err(TradeError::Forbidden {
            user_id: actor.id.clone(),
            action,
        })
    }
}

fn ensure_open(listing: &TradeListing) -> TradeResult<()> {
    if listing.status.is_terminal() {
        Err(TradeError::ListingClosed {
            listing_id: listing.id.clone(),
            status: listing.status,
        })
    } else {
        Ok(())
    }
}

fn find_offer(listing: &TradeListing, offer_id: &str) -> TradeResult<usize> {
    listing
        .offers
        .iter()
        .position(|offer| offer.id == offer_id)
        .ok_or_else(|| TradeError::OfferNotFound {
            listing_id: listing.id.clone(),
            offer_id: offer_id.to_string(),
        })
}

fn ensure_pending_offer(listing: &TradeListing, offer_id: &str) -> TradeResult<usize> {
    let index = find_offer(listing, offer_id)?;
    let offer = &listing.offers[index];
    if offer.status != OfferStatus::Pending {
        return Err(TradeError::OfferNotPending {
            offer_id: offer.id.clone(),
            status: offer.status,
        });
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::Card, models::CardCondition};

    fn user(id: &str) -> User {
        User::new(id, format!("{id}-name"))
    }

    fn entry(card_id: &str) -> CollectionEntry {
        let card = Card {
            id: card_id.to_string(),
            name: format!("Card {card_id}"),
            ..Card::default()
        };
        CollectionEntry::new(card, 1, CardCondition::NearMint)
    }

    fn draft(card_ids: &[&str]) -> ListingDraft {
        ListingDraft {
            cards: card_ids.iter().map(|id| entry(id)).collect(),
            ..ListingDraft::default()
        }
    }

    fn exchange_with_listing(owner: &User) -> (TradeExchange, String) {
        let mut exchange = TradeExchange::new();
        let id = exchange
            .create_listing(owner, draft(&["card1"]))
            .unwrap()
            .id
            .clone();
        (exchange, id)
    }

    fn offer_id(exchange: &mut TradeExchange, listing_id: &str, from: &User) -> String {
        exchange
            .make_offer(listing_id, from, vec![entry("cardX")], Some("trade?"))
            .unwrap()
            .id
            .clone()
    }

    fn assert_listing_invariants(exchange: &TradeExchange) {
        for listing in exchange.listings() {
            assert!(!listing.cards.is_empty());
            let accepted = listing
                .offers
                .iter()
                .filter(|offer| offer.status == OfferStatus::Accepted)
                .count();
            assert!(accepted <= 1);
            if accepted == 1 {
                assert_eq!(listing.status, ListingStatus::Completed);
            }
            assert!(listing
                .offers
                .iter()
                .all(|offer| offer.offer_user_id != listing.user_id));
        }
    }

    #[test]
    fn created_listing_is_active_and_empty() {
        let alice = user("alice");
        let (exchange, id) = exchange_with_listing(&alice);
        let listing = exchange.listing(&id).unwrap();
        assert_eq!(listing.status, ListingStatus::Active);
        assert!(listing.offers.is_empty());
        assert_eq!(listing.cards.len(), 1);
        assert_eq!(listing.cards[0].card_id(), "card1");
        assert_eq!(listing.cards[0].condition, CardCondition::NearMint);
        assert_eq!(listing.asking_price, None);
        assert_eq!(listing.user_id, "alice");
        assert_eq!(listing.user_avatar, crate::models::PLACEHOLDER_AVATAR);
    }

    #[test]
    fn listings_are_newest_first() {
        let alice = user("alice");
        let mut exchange = TradeExchange::new();
        let first = exchange.create_listing(&alice, draft(&["a"])).unwrap().id.clone();
        let second = exchange.create_listing(&alice, draft(&["b"])).unwrap().id.clone();
        let ids: Vec<_> = exchange.listings().iter().map(|l| l.id.clone()).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn rejects_empty_bundles_and_bad_prices() {
        let alice = user("alice");
        let mut exchange = TradeExchange::new();
        assert!(matches!(
            exchange.create_listing(&alice, ListingDraft::default()),
            Err(TradeError::InvalidPayload(_))
        ));
        let mut priced = draft(&["a"]);
        priced.asking_price = Some(-1.0);
        assert!(matches!(
            exchange.create_listing(&alice, priced),
            Err(TradeError::InvalidPayload(_))
        ));
        assert!(exchange.listings().is_empty());
    }

    #[test]
    fn offer_is_appended_as_pending() {
        let (alice, bob) = (user("alice"), user("bob"));
        let (mut exchange, id) = exchange_with_listing(&alice);
        offer_id(&mut exchange, &id, &bob);

        let listing = exchange.listing(&id).unwrap();
        assert_eq!(listing.offers.len(), 1);
        let offer = &listing.offers[0];
        assert_eq!(offer.status, OfferStatus::Pending);
        assert_eq!(offer.offered_cards, vec![entry("cardX")]);
        assert_eq!(offer.message.as_deref(), Some("trade?"));
        assert_eq!(offer.offer_user_id, "bob");
    }

    #[test]
    fn self_offers_and_closed_listings_are_refused() {
        let (alice, bob) = (user("alice"), user("bob"));
        let (mut exchange, id) = exchange_with_listing(&alice);

        let result = exchange.make_offer(&id, &alice, vec![entry("x")], None);
        assert!(matches!(result, Err(TradeError::Forbidden { .. })));
        let result = exchange.make_offer(&id, &bob, Vec::new(), None);
        assert!(matches!(result, Err(TradeError::InvalidPayload(_))));

        exchange.cancel_listing(&id, &alice).unwrap();
        let result = exchange.make_offer(&id, &bob, vec![entry("x")], None);
        assert!(matches!(
            result,
            Err(TradeError::ListingClosed {
                status: ListingStatus::Cancelled,
                ..
            })
        ));
        assert!(exchange.listing(&id).unwrap().offers.is_empty());
    }

    #[test]
    fn accepting_completes_listing_and_rejects_siblings() {
        let (alice, bob, carol) = (user("alice"), user("bob"), user("carol"));
        let (mut exchange, id) = exchange_with_listing(&alice);
        let from_bob = offer_id(&mut exchange, &id, &bob);
        let from_carol = offer_id(&mut exchange, &id, &carol);

        let listing = exchange.accept_offer(&id, &from_bob, &alice).unwrap();
        assert_eq!(listing.status, ListingStatus::Completed);
        assert_eq!(listing.offer(&from_bob).unwrap().status, OfferStatus::Accepted);
        assert_eq!(listing.offer(&from_carol).unwrap().status, OfferStatus::Rejected);

        let again = exchange.accept_offer(&id, &from_carol, &alice);
        assert!(matches!(again, Err(TradeError::ListingClosed { .. })));
        assert_listing_invariants(&exchange);
    }

    #[test]
    fn only_the_owner_decides_offers() {
        let (alice, bob) = (user("alice"), user("bob"));
        let (mut exchange, id) = exchange_with_listing(&alice);
        let offer = offer_id(&mut exchange, &id, &bob);

        assert!(matches!(
            exchange.accept_offer(&id, &offer, &bob),
            Err(TradeError::Forbidden { .. })
        ));
        assert!(matches!(
            exchange.reject_offer(&id, &offer, &bob),
            Err(TradeError::Forbidden { .. })
        ));
        assert!(matches!(
            exchange.cancel_listing(&id, &bob),
            Err(TradeError::Forbidden { .. })
        ));
        let listing = exchange.listing(&id).unwrap();
        assert_eq!(listing.status, ListingStatus::Active);
        assert_eq!(listing.offers[0].status, OfferStatus::Pending);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let (alice, bob) = (user("alice"), user("bob"));
        let (mut exchange, id) = exchange_with_listing(&alice);
        assert!(matches!(
            exchange.accept_offer("missing", "o", &alice),
            Err(TradeError::ListingNotFound(_))
        ));
        assert!(matches!(
            exchange.reject_offer(&id, "missing", &alice),
            Err(TradeError::OfferNotFound { .. })
        ));
        assert!(matches!(
            exchange.withdraw_offer(&id, "missing", &bob),
            Err(TradeError::OfferNotFound { .. })
        ));
    }

    #[test]
    fn rejecting_leaves_listing_active() {
        let (alice, bob, carol) = (user("alice"), user("bob"), user("carol"));
        let (mut exchange, id) = exchange_with_listing(&alice);
        let from_bob = offer_id(&mut exchange, &id, &bob);
        let from_carol = offer_id(&mut exchange, &id, &carol);

        let listing = exchange.reject_offer(&id, &from_bob, &alice).unwrap();
        assert_eq!(listing.status, ListingStatus::Active);
        assert_eq!(listing.offer(&from_bob).unwrap().status, OfferStatus::Rejected);
        assert_eq!(listing.offer(&from_carol).unwrap().status, OfferStatus::Pending);

        assert!(matches!(
            exchange.reject_offer(&id, &from_bob, &alice),
            Err(TradeError::OfferNotPending { .. })
        ));
    }

    #[test]
    fn cancelling_rejects_every_offer_and_spares_other_listings() {
        let (alice, bob, carol) = (user("alice"), user("bob"), user("carol"));
        let (mut exchange, id) = exchange_with_listing(&alice);
        let other = exchange
            .create_listing(&alice, draft(&["card2"]))
            .unwrap()
            .id
            .clone();
        offer_id(&mut exchange, &id, &bob);
        offer_id(&mut exchange, &id, &carol);
        offer_id(&mut exchange, &other, &bob);

        let listing = exchange.cancel_listing(&id, &alice).unwrap();
        assert_eq!(listing.status, ListingStatus::Cancelled);
        assert_eq!(listing.offers.len(), 2);
        assert!(listing
            .offers
            .iter()
            .all(|offer| offer.status == OfferStatus::Rejected));

        let untouched = exchange.listing(&other).unwrap();
        assert_eq!(untouched.status, ListingStatus::Active);
        assert_eq!(untouched.offers[0].status, OfferStatus::Pending);

        assert!(matches!(
            exchange.cancel_listing(&id, &alice),
            Err(TradeError::ListingClosed { .. })
        ));
    }

    #[test]
    fn withdrawal_is_reserved_to_the_author() {
        let (alice, bob, carol) = (user("alice"), user("bob"), user("carol"));
        let (mut exchange, id) = exchange_with_listing(&alice);
        let from_bob = offer_id(&mut exchange, &id, &bob);
        let before = exchange.listing(&id).unwrap().offers.clone();

        for intruder in [&alice, &carol] {
            let result = exchange.withdraw_offer(&id, &from_bob, intruder);
            assert!(matches!(result, Err(TradeError::Forbidden { .. })));
            assert_eq!(exchange.listing(&id).unwrap().offers, before);
        }

        let removed = exchange.withdraw_offer(&id, &from_bob, &bob).unwrap();
        assert_eq!(removed.id, from_bob);
        assert!(exchange.listing(&id).unwrap().offers.is_empty());
    }

    #[test]
    fn decided_offers_cannot_be_withdrawn() {
        let (alice, bob) = (user("alice"), user("bob"));
        let (mut exchange, id) = exchange_with_listing(&alice);
        let from_bob = offer_id(&mut exchange, &id, &bob);
        exchange.accept_offer(&id, &from_bob, &alice).unwrap();

        assert!(matches!(
            exchange.withdraw_offer(&id, &from_bob, &bob),
            Err(TradeError::OfferNotPending {
                status: OfferStatus::Accepted,
                ..
            })
        ));
        assert_listing_invariants(&exchange);
    }

    #[test]
    fn updates_apply_per_field_for_the_owner_only() {
        let (alice, bob) = (user("alice"), user("bob"));
        let (mut exchange, id) = exchange_with_listing(&alice);

        let update = ListingUpdate {
            asking_price: FieldUpdate::Set(12.5),
            description: FieldUpdate::Set("Mint binder pull".to_string()),
            wishlist: FieldUpdate::Set(vec!["Umbreon".to_string()]),
            ..ListingUpdate::default()
        };
        let listing = exchange.update_listing(&id, &alice, update).unwrap();
        assert_eq!(listing.asking_price, Some(12.5));
        assert_eq!(listing.cards.len(), 1);

        let clear = ListingUpdate {
            description: FieldUpdate::Clear,
            cards: Some(vec![entry("card1"), entry("card9")]),
            ..ListingUpdate::default()
        };
        let listing = exchange.update_listing(&id, &alice, clear).unwrap();
        assert_eq!(listing.description, None);
        assert_eq!(listing.cards.len(), 2);
        assert_eq!(listing.wishlist, Some(vec!["Umbreon".to_string()]));

        let hijack = ListingUpdate {
            asking_price: FieldUpdate::Set(0.0),
            ..ListingUpdate::default()
        };
        assert!(matches!(
            exchange.update_listing(&id, &bob, hijack),
            Err(TradeError::Forbidden { .. })
        ));
        let emptied = ListingUpdate {
            cards: Some(Vec::new()),
            ..ListingUpdate::default()
        };
        assert!(matches!(
            exchange.update_listing(&id, &alice, emptied),
            Err(TradeError::InvalidPayload(_))
        ));
        assert_eq!(exchange.listing(&id).unwrap().asking_price, Some(12.5));
        assert_eq!(exchange.listing(&id).unwrap().user_id, "alice");
    }

    #[test]
    fn closed_listings_cannot_be_edited() {
        let (alice, bob) = (user("alice"), user("bob"));
        let (mut exchange, done) = exchange_with_listing(&alice);
        let from_bob = offer_id(&mut exchange, &done, &bob);
        exchange.accept_offer(&done, &from_bob, &alice).unwrap();
        let cancelled = exchange.create_listing(&alice, draft(&["card2"])).unwrap().id.clone();
        exchange.cancel_listing(&cancelled, &alice).unwrap();

        for (id, status) in [
            (&done, ListingStatus::Completed),
            (&cancelled, ListingStatus::Cancelled),
        ] {
            let update = ListingUpdate {
                description: FieldUpdate::Set("relisted".to_string()),
                ..ListingUpdate::default()
            };
            match exchange.update_listing(id, &alice, update) {
                Err(TradeError::ListingClosed { status: closed, .. }) => assert_eq!(closed, status),
                other => panic!("expected ListingClosed, got {other:?}"),
            }
            assert_eq!(exchange.listing(id).unwrap().description, None);
        }
    }

    #[test]
    fn restored_pending_listing_only_allows_cancellation() {
        let (alice, bob, carol) = (user("alice"), user("bob"), user("carol"));
        let (mut exchange, id) = exchange_with_listing(&alice);
        let from_bob = offer_id(&mut exchange, &id, &bob);
        let mut listings = exchange.into_listings();
        listings[0].status = ListingStatus::Pending;

        let mut exchange = TradeExchange::from_listings(listings);
        assert_eq!(exchange.listing(&id).unwrap().status, ListingStatus::Pending);
        assert!(matches!(
            exchange.make_offer(&id, &carol, vec![entry("cardY")], None),
            Err(TradeError::ListingClosed {
                status: ListingStatus::Pending,
                ..
            })
        ));
        assert!(matches!(
            exchange.accept_offer(&id, &from_bob, &alice),
            Err(TradeError::ListingClosed {
                status: ListingStatus::Pending,
                ..
            })
        ));
        assert_eq!(exchange.listing(&id).unwrap().offers.len(), 1);

        let listing = exchange.cancel_listing(&id, &alice).unwrap();
        assert_eq!(listing.status, ListingStatus::Cancelled);
        assert_eq!(listing.offers[0].status, OfferStatus::Rejected);
        assert_listing_invariants(&exchange);
    }

    #[test]
    fn invalid_loaded_listings_are_dropped() {
        let alice = user("alice");
        let (exchange, _) = exchange_with_listing(&alice);
        let mut listings = exchange.into_listings();
        let mut broken = listings[0].clone();
        broken.id = "broken".to_string();
        broken.cards.clear();
        listings.push(broken);

        let restored = TradeExchange::from_listings(listings);
        assert_eq!(restored.listings().len(), 1);
        assert!(restored.listing("broken").is_none());
    }

    #[test]
    fn listing_collection_survives_json_round_trip() -> anyhow::Result<()> {
        let (alice, bob, carol) = (user("alice"), user("bob"), user("carol"));
        let (mut exchange, id) = exchange_with_listing(&alice);
        let from_bob = offer_id(&mut exchange, &id, &bob);
        offer_id(&mut exchange, &id, &carol);
        exchange.accept_offer(&id, &from_bob, &alice)?;
        exchange.create_listing(&carol, draft(&["card7", "card8"]))?;

        let json = serde_json::to_string(exchange.listings())?;
        let restored: Vec<TradeListing> = serde_json::from_str(&json)?;
        assert_eq!(restored, exchange.listings());
        Ok(())
    }
}
