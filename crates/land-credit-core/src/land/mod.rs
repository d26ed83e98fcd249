pub mod opportunity;
pub mod residual;
