//! Upstream series fetcher trait.

use crate::error::FetchError;
use crate::types::{RawSeries, Source, TimeWindow};
use async_trait::async_trait;

/// One upstream data source.
///
/// Implementations return whatever the upstream provides, tagged with its
/// own timestamps and units. They must not round or resample.
#[async_trait]
pub trait SeriesFetcher: Send + Sync {
    /// Fetch the series covering `window`.
    ///
    /// # Arguments
    /// * `window` - The forecast window to cover
    ///
    /// # Returns
    /// The raw series, or the reason the source is unavailable this cycle
    async fn fetch(&self, window: &TimeWindow) -> Result<RawSeries, FetchError>;

    /// The source this fetcher serves.
    fn source(&self) -> Source;

    /// Get the fetcher name.
    fn name(&self) -> &str;
}
