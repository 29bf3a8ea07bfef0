//! Errors for translation.

use query_engine_model::ModelError;

/// A failure to obtain a translation at all. Refusals are not errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Model(#[from] ModelError),
}
