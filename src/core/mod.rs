pub mod form;
pub mod page;
pub mod requester;

pub use crate::domain::model::{Estimate, FormField, VehicleQuery};
pub use crate::domain::ports::{ConfigProvider, Estimator};
pub use crate::utils::error::Result;
