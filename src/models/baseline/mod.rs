//! Moving-average forecasting models built on the time-based engine.

mod moving_average;
mod weighted_moving_average;

pub use moving_average::MovingAverage;
pub use weighted_moving_average::{WeightedMovingAverage, WmaBuilder};
