// Adapters layer: concrete estimators behind the `Estimator` port.

pub mod http;
pub mod placeholder;

use crate::domain::ports::{ConfigProvider, Estimator};
use crate::utils::error::Result;
use std::sync::Arc;

/// Pick the estimator for a configuration: the HTTP backend when an endpoint
/// is set, the placeholder only when `demo` is explicitly requested.
pub fn build_estimator<C: ConfigProvider + ?Sized>(
    config: &C,
    demo: bool,
) -> Result<Arc<dyn Estimator>> {
    if demo {
        tracing::warn!("demo mode: using placeholder estimator");
        return Ok(Arc::new(placeholder::PlaceholderEstimator::new(
            config.placeholder_delay(),
        )));
    }

    Ok(Arc::new(http::HttpEstimator::from_config(config)?))
}
