//! Trade listings, offers and the exchange that governs them.

mod engine;
mod models;
mod query;

pub use engine::TradeExchange;
pub use models::{
    FieldUpdate, ListingDraft, ListingStatus, ListingUpdate, Offer, OfferStatus, TradeListing,
};
pub use query::{FilterOptions, ListingFilter};
