pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod models;
pub mod util;

pub use error::{Error, Result};
pub use models::ring_average::RingAverage;
pub use models::sample::Sample;
