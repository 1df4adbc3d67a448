//! Statement preparation seam.
//!
//! Every generated template goes through exactly one `prepare` call. What the
//! prepared handle looks like, and how failures are reported, belongs to the
//! store; the generator hands both back to its caller untouched.

use async_trait::async_trait;
use std::sync::Arc;

pub mod local;
pub mod template;

pub use local::{LocalPreparer, PrepareError};
pub use template::{scan_bind_markers, PreparedTemplate, ScannedMarker};

#[async_trait]
pub trait StatementPreparer: Send + Sync {
    /// Reusable handle returned by the store.
    type Prepared: Clone + Send + Sync + 'static;
    /// Store-level failure, propagated verbatim.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Prepares `query` in a single round-trip.
    async fn prepare(&self, query: &str) -> Result<Self::Prepared, Self::Error>;
}

#[async_trait]
impl<T> StatementPreparer for Arc<T>
where
    T: StatementPreparer + ?Sized,
{
    type Prepared = T::Prepared;
    type Error = T::Error;

    async fn prepare(&self, query: &str) -> Result<Self::Prepared, Self::Error> {
        (**self).prepare(query).await
    }
}
