pub mod combo;
pub mod compare;
pub mod metrics;
pub mod scoring;
