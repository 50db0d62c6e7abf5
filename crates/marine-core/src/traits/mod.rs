//! Core traits for the marine forecast cache.

mod fetcher;
mod tide;

pub use fetcher::SeriesFetcher;
pub use tide::TideModel;
