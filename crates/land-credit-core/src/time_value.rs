use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::assumptions::AnalysisAssumptions;
use crate::error::LandCreditError;
use crate::types::{compound_factor, Money, Rate};
use crate::LandCreditResult;

const DERIVATIVE_FLOOR: Decimal = dec!(0.000000000001);
const RATE_FLOOR: Rate = dec!(-0.99);
const RATE_CEILING: Rate = dec!(10);

/// Newton-Raphson controls for the IRR solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrSettings {
    pub initial_guess: Rate,
    pub max_iterations: u32,
    pub rate_tolerance: Rate,
    pub npv_tolerance: Money,
}

impl Default for IrrSettings {
    fn default() -> Self {
        Self::from(&AnalysisAssumptions::default())
    }
}

impl From<&AnalysisAssumptions> for IrrSettings {
    fn from(a: &AnalysisAssumptions) -> Self {
        Self {
            initial_guess: a.irr_initial_guess,
            max_iterations: a.irr_max_iterations,
            rate_tolerance: a.irr_rate_tolerance,
            npv_tolerance: a.irr_npv_tolerance,
        }
    }
}

/// Best-effort IRR. `converged == false` means `rate` is the last stable
/// estimate and should be treated as low confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrSolution {
    /// Periodic rate as a decimal
    pub rate: Rate,
    pub iterations: u32,
    pub converged: bool,
}

/// Net Present Value of a series of cash flows, first flow at t = 0.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> LandCreditResult<Money> {
    if rate <= dec!(-1) {
        return Err(LandCreditError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let one_plus_r = Decimal::ONE + rate;
    let mut result = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        result += cf / discount;
    }

    Ok(result)
}

/// Internal Rate of Return using Newton-Raphson on NPV(r).
///
/// Flows without both an outflow and an inflow (all zero included) have no
/// IRR: the result is rate 0, zero iterations, `converged = false`.
/// Cash-flow vectors with more than one sign change can have several real
/// roots or none; the solver then reports the estimate it stopped at with
/// `converged = false` rather than failing. A degenerate derivative or an
/// overflowing discount factor also stops the iteration at the last stable
/// estimate.
pub fn irr(cash_flows: &[Money], settings: &IrrSettings) -> LandCreditResult<IrrSolution> {
    if cash_flows.len() < 2 {
        return Err(LandCreditError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    let has_outflow = cash_flows.iter().any(|cf| *cf < Decimal::ZERO);
    let has_inflow = cash_flows.iter().any(|cf| *cf > Decimal::ZERO);
    if !(has_outflow && has_inflow) {
        debug!("IRR: cash flows have no sign change");
        return Ok(unconverged(Decimal::ZERO, 0));
    }

    let mut rate = settings.initial_guess;

    for iteration in 1..=settings.max_iterations {
        let Some((npv_val, dnpv)) = npv_and_derivative(cash_flows, rate) else {
            warn!(rate = %rate, iteration, "IRR: discount factor overflow, keeping last estimate");
            return Ok(unconverged(rate, iteration));
        };

        if npv_val.abs() < settings.npv_tolerance {
            return Ok(IrrSolution {
                rate,
                iterations: iteration,
                converged: true,
            });
        }

        if dnpv.abs() < DERIVATIVE_FLOOR {
            warn!(rate = %rate, iteration, "IRR: derivative near zero, keeping last estimate");
            return Ok(unconverged(rate, iteration));
        }

        let Some(step) = npv_val.checked_div(dnpv) else {
            return Ok(unconverged(rate, iteration));
        };
        let raw = rate - step;
        let next = raw.clamp(RATE_FLOOR, RATE_CEILING);

        if next != raw && next == rate {
            // Pinned against a bound: no root in the search range
            warn!(rate = %rate, iteration, "IRR: estimate pinned at search bound");
            return Ok(unconverged(rate, iteration));
        }

        if (next - rate).abs() < settings.rate_tolerance {
            debug!(rate = %next, iteration, "IRR converged");
            return Ok(IrrSolution {
                rate: next,
                iterations: iteration,
                converged: true,
            });
        }

        rate = next;
    }

    warn!(
        rate = %rate,
        max_iterations = settings.max_iterations,
        "IRR did not converge, returning last estimate"
    );
    Ok(unconverged(rate, settings.max_iterations))
}

fn unconverged(rate: Rate, iterations: u32) -> IrrSolution {
    IrrSolution {
        rate,
        iterations,
        converged: false,
    }
}

/// NPV(r) = sum CF_t / (1+r)^t and its derivative d(NPV)/dr.
/// `None` when the arithmetic leaves the representable range.
fn npv_and_derivative(cash_flows: &[Money], rate: Rate) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }
    let inv = Decimal::ONE.checked_div(one_plus_r)?;

    let mut npv = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        npv = npv.checked_add(cf.checked_mul(discount)?)?;
        if t > 0 {
            // d/dr of CF_t / (1+r)^t = -t * CF_t / (1+r)^(t+1)
            let term = Decimal::from(t as u64)
                .checked_mul(*cf)?
                .checked_mul(discount)?
                .checked_mul(inv)?;
            dnpv = dnpv.checked_sub(term)?;
        }
        discount = discount.checked_mul(inv)?;
    }

    Some((npv, dnpv))
}

/// Value of `amount` compounded annually at `rate` for `years`.
/// Saturates rather than overflowing for extreme rates or horizons.
pub fn future_value(amount: Money, rate: Rate, years: u32) -> Money {
    amount.saturating_mul(compound_factor(rate, years))
}

/// Level payment that fully amortizes `principal` over `periods` at
/// `periodic_rate`: P * r(1+r)^n / ((1+r)^n - 1), evaluated as
/// P * r / (1 - (1+r)^-n) so a saturated compound factor still gives the
/// interest-only limit P * r. Zero rate falls back to straight-line
/// repayment; zero periods or non-positive principal pay nothing.
pub fn annuity_payment(principal: Money, periodic_rate: Rate, periods: u32) -> Money {
    if periods == 0 || principal <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if periodic_rate.is_zero() {
        return principal / Decimal::from(periods);
    }

    let compound = compound_factor(periodic_rate, periods);
    let denominator = match Decimal::ONE.checked_div(compound) {
        Some(discount) => Decimal::ONE - discount,
        None => Decimal::ZERO,
    };
    if denominator.is_zero() {
        return principal / Decimal::from(periods);
    }

    principal
        .saturating_mul(periodic_rate)
        .checked_div(denominator)
        .unwrap_or(Decimal::MAX)
}
