#![warn(clippy::all, missing_docs)]

//! Core of a trading-card collection and trade exchange client.
//!
//! This crate hosts the trade listing/offer state machine, the owned-card
//! collection, identity lookup, JSON key-value persistence and the
//! read-only card catalog client. Frontends drive everything through
//! [`TradeHub`].

pub mod catalog;
pub mod collection;
pub mod config;
pub mod error;
pub mod hub;
pub mod identity;
pub mod logging;
pub mod models;
pub mod storage;
pub mod trade;

pub use catalog::{CatalogClient, Card, PokemonSet};
pub use collection::Collection;
pub use config::AppConfig;
pub use error::{TradeError, TradeResult};
pub use hub::TradeHub;
pub use identity::{IdentityProvider, StaticDirectory};
pub use models::{CardCondition, CollectionEntry, User};
pub use storage::{JsonFileStore, MemoryStore, PersistenceAdapter};
pub use trade::{ListingStatus, Offer, OfferStatus, TradeExchange, TradeListing};
