pub mod jwt;
pub mod metrics;
pub mod odometer;
