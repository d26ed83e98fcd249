pub mod amortization;
pub mod scenario;
pub mod tax;
pub mod true_cost;
