use crate::domain::model::{Estimate, VehicleQuery};
use crate::utils::error::EstimatorFailure;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// The seam where a model-serving backend, the placeholder, or a test double plugs in.
#[async_trait]
pub trait Estimator: Send + Sync {
    async fn estimate(&self, query: &VehicleQuery) -> Result<Estimate, EstimatorFailure>;

    fn name(&self) -> &str;
}

pub trait ConfigProvider: Send + Sync {
    /// Estimation service URL; `None` when no real backend is configured.
    fn endpoint(&self) -> Option<&str>;
    fn timeout(&self) -> Duration;
    fn headers(&self) -> &HashMap<String, String>;
    fn placeholder_delay(&self) -> Duration;
}
