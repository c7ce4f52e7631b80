//! Typed failures returned by guarded trade and collection operations.

use thiserror::Error;

use crate::trade::{ListingStatus, OfferStatus};

/// Reason a guarded operation left state untouched.
#[derive(Debug, Error)]
pub enum TradeError {
    /// The operation needs a signed-in user and nobody is signed in.
    #[error("no user is signed in")]
    NotSignedIn,
    /// Sign-in was attempted with a username the identity provider does not know.
    #[error("unknown user '{0}'")]
    UnknownUser(String),
    /// The supplied payload breaks a listing or offer invariant.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    /// No listing carries the given id.
    #[error("listing {0} not found")]
    ListingNotFound(String),
    /// The listing exists but has no offer with the given id.
    #[error("offer {offer_id} not found on listing {listing_id}")]
    OfferNotFound {
        /// Listing that was searched.
        listing_id: String,
        /// Offer id that was not present.
        offer_id: String,
    },
    /// No collection entry carries the given card id.
    #[error("card {0} not found in collection")]
    CardNotFound(String),
    /// The acting user does not own the listing or offer being changed.
    #[error("user {user_id} may not {action}")]
    Forbidden {
        /// Acting user id.
        user_id: String,
        /// Short description of the refused action.
        action: &'static str,
    },
    /// The listing no longer accepts the requested change.
    #[error("listing {listing_id} is {status}")]
    ListingClosed {
        /// Listing id.
        listing_id: String,
        /// Status that blocked the change.
        status: ListingStatus,
    },
    /// The offer has already been decided.
    #[error("offer {offer_id} is already {status}")]
    OfferNotPending {
        /// Offer id.
        offer_id: String,
        /// Current offer status.
        status: OfferStatus,
    },
    /// Persisting the resulting state failed.
    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

/// Convenience alias for results carrying a [`TradeError`].
pub type TradeResult<T> = std::result::Result<T, TradeError>;
