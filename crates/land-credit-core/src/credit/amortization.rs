use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::credit::scenario::{schedule_months, MAX_TERM_YEARS};
use crate::error::LandCreditError;
use crate::time_value::annuity_payment;
use crate::types::{pct_to_rate, round_currency, Money, Percent};
use crate::LandCreditResult;

/// One month of a fixed-rate, fully-amortizing schedule. All amounts are
/// whole currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    /// 1-based month index
    pub month: u32,
    /// principal + interest + insurance
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    pub insurance: Money,
    pub remaining_balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// Per-year roll-up of a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyTotals {
    pub year: u32,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    pub insurance: Money,
    pub closing_balance: Money,
}

/// Totals over a whole schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub months: u32,
    pub total_paid: Money,
    pub total_principal: Money,
    pub total_interest: Money,
    pub total_insurance: Money,
    pub yearly: Vec<YearlyTotals>,
}

/// Reject schedule terms a caller supplied directly: negative amounts or
/// rate, or a term beyond [`MAX_TERM_YEARS`].
pub fn validate_terms(
    principal: Money,
    annual_rate_pct: Percent,
    years: u32,
    monthly_insurance: Money,
) -> LandCreditResult<()> {
    for (value, field) in [
        (principal, "principal"),
        (annual_rate_pct, "annual_interest_rate"),
        (monthly_insurance, "monthly_insurance"),
    ] {
        if value < Decimal::ZERO {
            return Err(LandCreditError::InvalidInput {
                field: field.into(),
                reason: "Must not be negative".into(),
            });
        }
    }
    if years > MAX_TERM_YEARS {
        return Err(LandCreditError::InvalidInput {
            field: "term_years".into(),
            reason: format!("Must not exceed {} years", MAX_TERM_YEARS),
        });
    }
    Ok(())
}

/// Unrounded level payment (principal + interest) for `months` at an annual
/// rate given in percent.
pub fn monthly_payment(principal: Money, annual_rate_pct: Percent, months: u32) -> Money {
    annuity_payment(principal, pct_to_rate(annual_rate_pct) / dec!(12), months)
}

/// Generate the monthly schedule for `years * 12` payments.
///
/// The schedule runs in full decimal precision. Each row's cumulative totals
/// are rounded to whole units and the row amounts are the differences of
/// consecutive rounded totals, so the columns sum exactly to the rounded
/// totals and no rounding drift builds up towards the final month.
///
/// A non-positive principal yields a zero-valued schedule (no interest, no
/// insurance) of the same length; zero years yields an empty schedule.
/// Terms beyond [`MAX_TERM_YEARS`] are clamped.
pub fn generate_schedule(
    principal: Money,
    annual_rate_pct: Percent,
    years: u32,
    monthly_insurance: Money,
) -> Vec<AmortizationEntry> {
    if years > MAX_TERM_YEARS {
        warn!(years, max = MAX_TERM_YEARS, "credit term clamped for scheduling");
    }
    let months = schedule_months(years);
    if months == 0 {
        return Vec::new();
    }

    let has_loan = principal > Decimal::ZERO;
    let principal = principal.max(Decimal::ZERO);
    let insurance = if has_loan {
        monthly_insurance.max(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };
    let rate = if has_loan {
        pct_to_rate(annual_rate_pct) / dec!(12)
    } else {
        Decimal::ZERO
    };
    let payment = annuity_payment(principal, rate, months);
    let rounded_principal = round_currency(principal);

    let mut entries = Vec::with_capacity(months as usize);
    let mut balance = principal;
    let mut cum_interest = Decimal::ZERO;
    let mut cum_principal = Decimal::ZERO;
    let mut cum_insurance = Decimal::ZERO;
    let mut prev_interest = Decimal::ZERO;
    let mut prev_principal = Decimal::ZERO;
    let mut prev_insurance = Decimal::ZERO;

    for month in 1..=months {
        let interest = balance.saturating_mul(rate);
        let mut principal_paid = payment - interest;
        if month == months || principal_paid > balance {
            principal_paid = balance;
        }
        balance = (balance - principal_paid).max(Decimal::ZERO);

        cum_interest = cum_interest.saturating_add(interest);
        cum_principal += principal_paid;
        cum_insurance += insurance;

        let r_interest = round_currency(cum_interest);
        let r_principal = round_currency(cum_principal);
        let r_insurance = round_currency(cum_insurance);

        let row_interest = r_interest - prev_interest;
        let row_principal = r_principal - prev_principal;
        let row_insurance = r_insurance - prev_insurance;

        entries.push(AmortizationEntry {
            month,
            payment: row_principal + row_interest + row_insurance,
            principal: row_principal,
            interest: row_interest,
            insurance: row_insurance,
            remaining_balance: (rounded_principal - r_principal).max(Decimal::ZERO),
            cumulative_interest: r_interest,
            cumulative_principal: r_principal,
        });

        prev_interest = r_interest;
        prev_principal = r_principal;
        prev_insurance = r_insurance;
    }

    entries
}

/// Outstanding balance after `month` payments. Month 0 is the original
/// principal; months past the end are fully repaid.
pub fn balance_after(schedule: &[AmortizationEntry], month: u32, principal: Money) -> Money {
    if month == 0 || schedule.is_empty() {
        return principal.max(Decimal::ZERO);
    }
    let idx = (month as usize).min(schedule.len()) - 1;
    schedule[idx].remaining_balance
}

/// Total of all payments made in the first `month` months.
pub fn paid_through(schedule: &[AmortizationEntry], month: u32) -> Money {
    schedule
        .iter()
        .take(month as usize)
        .map(|e| e.payment)
        .sum()
}

/// Totals and per-year roll-up of a schedule.
pub fn summarize(schedule: &[AmortizationEntry]) -> ScheduleSummary {
    let mut yearly: Vec<YearlyTotals> = Vec::with_capacity(schedule.len() / 12 + 1);

    for entry in schedule {
        let year = (entry.month - 1) / 12 + 1;
        match yearly.last_mut() {
            Some(y) if y.year == year => {
                y.payment += entry.payment;
                y.principal += entry.principal;
                y.interest += entry.interest;
                y.insurance += entry.insurance;
                y.closing_balance = entry.remaining_balance;
            }
            _ => yearly.push(YearlyTotals {
                year,
                payment: entry.payment,
                principal: entry.principal,
                interest: entry.interest,
                insurance: entry.insurance,
                closing_balance: entry.remaining_balance,
            }),
        }
    }

    ScheduleSummary {
        months: schedule.len() as u32,
        total_paid: schedule.iter().map(|e| e.payment).sum(),
        total_principal: schedule.iter().map(|e| e.principal).sum(),
        total_interest: schedule.iter().map(|e| e.interest).sum(),
        total_insurance: schedule.iter().map(|e| e.insurance).sum(),
        yearly,
    }
}
