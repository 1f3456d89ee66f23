use thiserror::Error;

use super::selectors::SelectorId;
use super::view::View;
use crate::api::InitError;
use crate::store::StoreError;

/// Errors returned by [`Session`](super::Session) operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The init call failed; the welcome screen is re-armed for a retry.
    #[error("initialization failed: {0}")]
    Initialization(#[from] InitError),

    /// The stored session record could not be decoded.
    #[error("persisted session state is corrupt: {0}")]
    CorruptState(#[source] serde_json::Error),

    #[error("could not encode session state: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("cannot go from {from} to {to}")]
    InvalidTransition { from: View, to: View },

    /// The control lives on a page that is not currently shown.
    #[error("{control} is on the {page} page, which is not shown")]
    ControlHidden { control: &'static str, page: View },

    #[error("'{option}' is not an option of {selector}")]
    UnknownOption { selector: SelectorId, option: String },

    #[error("'{option}' is not a management option on the {page} page")]
    UnknownTile { page: View, option: String },
}
