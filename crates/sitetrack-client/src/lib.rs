//! Composition root for the sitetrack client core.
//!
//! `ClientContexts` bundles the selection contexts and the API client
//! into one explicitly injected unit; the flow methods on it do the
//! fetch-then-commit sequencing the screens rely on. No global state:
//! whoever builds the UI builds one of these at startup and hands it
//! down.

mod contexts;
mod navigation;

pub use contexts::{ClientContexts, SessionStatus};
pub use navigation::{next_screen_for_step, Screen};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Api(#[from] sitetrack_api::ApiError),

    #[error("no {0} selected")]
    NoSelection(&'static str),
}
