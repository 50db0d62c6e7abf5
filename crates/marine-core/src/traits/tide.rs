//! Tide height model trait.

use crate::error::ComputeError;
use crate::types::Location;

/// Deterministic tide height prediction.
///
/// Implementations are pure and CPU-bound; callers run them off the async
/// executor.
pub trait TideModel: Send + Sync {
    /// Predict tide heights.
    ///
    /// # Arguments
    /// * `location` - Where to predict
    /// * `epochs` - Epoch seconds to predict at
    ///
    /// # Returns
    /// One height per epoch, whole centimetres above chart datum
    fn compute_heights(
        &self,
        location: &Location,
        epochs: &[i64],
    ) -> Result<Vec<i32>, ComputeError>;

    /// Get the model name.
    fn name(&self) -> &str;
}
