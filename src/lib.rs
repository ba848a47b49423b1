pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{build_estimator, http::HttpEstimator, placeholder::PlaceholderEstimator};
pub use config::Settings;
pub use crate::core::{
    form::FormState,
    page::PredictorPage,
    requester::{EstimationRequester, Notice, NoticeKind, RequesterState},
};
pub use domain::model::{
    BodyType, Estimate, FormField, FuelType, Make, Transmission, VehicleQuery, VehicleSpec,
};
pub use domain::ports::{ConfigProvider, Estimator};
pub use utils::error::{CarPredictError, EstimationResult, EstimatorFailure, Result};
