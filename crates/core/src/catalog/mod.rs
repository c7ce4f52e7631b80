//! Third-party card catalog access.

/// Async HTTP client for the catalog API.
pub mod client;
/// Wire models returned by the catalog.
pub mod models;

pub use client::{CatalogClient, Format, SetQuery};
pub use models::{
    market_price, Card, CardImages, Legalities, PokemonSet, TcgPlayer, TcgPlayerPrice,
    TypeModifier,
};
