pub mod assumptions;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "credit")]
pub mod credit;

#[cfg(feature = "land")]
pub mod land;

#[cfg(feature = "analysis")]
pub mod analysis;

#[cfg(feature = "scenarios")]
pub mod scenarios;

#[cfg(feature = "export")]
pub mod export;

pub use error::LandCreditError;
pub use types::*;

/// Standard result type for all land-credit operations
pub type LandCreditResult<T> = Result<T, LandCreditError>;
