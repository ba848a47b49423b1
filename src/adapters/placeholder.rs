use crate::domain::model::{Estimate, VehicleQuery};
use crate::domain::ports::Estimator;
use crate::utils::error::EstimatorFailure;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

pub const PLACEHOLDER_MIN_PRICE: f64 = 15_000.0;
pub const PLACEHOLDER_PRICE_SPAN: f64 = 30_000.0;
pub const DEFAULT_PLACEHOLDER_DELAY: Duration = Duration::from_secs(2);

/// Demo stand-in for a real model: waits, then returns a random price.
///
/// The price ignores the query entirely. Only use it for demos and tests.
#[derive(Debug, Clone)]
pub struct PlaceholderEstimator {
    delay: Duration,
}

impl PlaceholderEstimator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for PlaceholderEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_DELAY)
    }
}

#[async_trait]
impl Estimator for PlaceholderEstimator {
    async fn estimate(&self, _query: &VehicleQuery) -> Result<Estimate, EstimatorFailure> {
        tracing::warn!("placeholder estimator in use; prices are random");
        tokio::time::sleep(self.delay).await;

        let price = {
            let mut rng = rand::thread_rng();
            rng.gen_range(PLACEHOLDER_MIN_PRICE..PLACEHOLDER_MIN_PRICE + PLACEHOLDER_PRICE_SPAN)
        };
        Ok(Estimate::new(price.round())?.with_model("placeholder"))
    }

    fn name(&self) -> &str {
        "placeholder"
    }
}
