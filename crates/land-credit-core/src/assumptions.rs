//! Named, overridable assumptions behind every heuristic in the engine.
//!
//! None of these values are derived from market data. The defaults reproduce
//! the reference dashboard behaviour; callers override any subset by
//! deserialising a partial JSON/YAML document (`#[serde(default)]`).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent, Rate};

/// Reference annual return forgone on the down payment.
pub const DEFAULT_OPPORTUNITY_COST_RATE: Rate = dec!(0.08);
/// Share of gross rent reserved for operating expenses.
pub const DEFAULT_OPERATING_EXPENSE_RATIO: Rate = dec!(0.25);
/// DSCR reported when there is no debt service at all.
pub const DEFAULT_DSCR_NO_DEBT_SENTINEL: Decimal = dec!(999);
pub const DEFAULT_IRR_INITIAL_GUESS: Rate = dec!(0.10);
pub const DEFAULT_IRR_MAX_ITERATIONS: u32 = 1000;
/// Convergence on successive rate estimates.
pub const DEFAULT_IRR_RATE_TOLERANCE: Rate = dec!(0.0000001);
/// Convergence on |NPV| in currency units.
pub const DEFAULT_IRR_NPV_TOLERANCE: Money = dec!(0.0001);
/// Horizon of the IRR / equity-multiple cash-flow vector.
pub const DEFAULT_HOLDING_PERIOD_YEARS: u32 = 10;
/// Value of one annual income-tax unit in currency units.
pub const DEFAULT_REFERENCE_TAX_UNIT_VALUE: Money = dec!(778248);
/// Deductible mortgage interest is capped at this many tax units per year.
pub const DEFAULT_DEDUCTION_CAP_TAX_UNITS: Decimal = dec!(8);
/// Flat marginal rate applied to deductible interest. Not a bracket model.
pub const DEFAULT_EFFECTIVE_TAX_RATE: Rate = dec!(0.15);
/// Fraction of stamp tax waived under the preferential regime.
pub const DEFAULT_STAMP_TAX_RELIEF_RATIO: Rate = dec!(0.5);
/// Developer margin on GDV when a development plan does not state one.
pub const DEFAULT_TARGET_PROFIT_MARGIN: Rate = dec!(0.20);

/// Every tunable constant used by the calculators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisAssumptions {
    /// Annual rate used to compound the down payment forward (decimal)
    pub opportunity_cost_rate: Rate,
    /// Operating expenses as a share of gross rent (decimal)
    pub operating_expense_ratio: Rate,
    pub dscr_no_debt_sentinel: Decimal,
    pub irr_initial_guess: Rate,
    pub irr_max_iterations: u32,
    pub irr_rate_tolerance: Rate,
    pub irr_npv_tolerance: Money,
    pub holding_period_years: u32,
    pub reference_tax_unit_value: Money,
    pub deduction_cap_tax_units: Decimal,
    pub effective_tax_rate: Rate,
    pub stamp_tax_relief_ratio: Rate,
    pub target_profit_margin: Rate,
    pub scoring: ScoringRules,
}

impl Default for AnalysisAssumptions {
    fn default() -> Self {
        Self {
            opportunity_cost_rate: DEFAULT_OPPORTUNITY_COST_RATE,
            operating_expense_ratio: DEFAULT_OPERATING_EXPENSE_RATIO,
            dscr_no_debt_sentinel: DEFAULT_DSCR_NO_DEBT_SENTINEL,
            irr_initial_guess: DEFAULT_IRR_INITIAL_GUESS,
            irr_max_iterations: DEFAULT_IRR_MAX_ITERATIONS,
            irr_rate_tolerance: DEFAULT_IRR_RATE_TOLERANCE,
            irr_npv_tolerance: DEFAULT_IRR_NPV_TOLERANCE,
            holding_period_years: DEFAULT_HOLDING_PERIOD_YEARS,
            reference_tax_unit_value: DEFAULT_REFERENCE_TAX_UNIT_VALUE,
            deduction_cap_tax_units: DEFAULT_DEDUCTION_CAP_TAX_UNITS,
            effective_tax_rate: DEFAULT_EFFECTIVE_TAX_RATE,
            stamp_tax_relief_ratio: DEFAULT_STAMP_TAX_RELIEF_RATIO,
            target_profit_margin: DEFAULT_TARGET_PROFIT_MARGIN,
            scoring: ScoringRules::default(),
        }
    }
}

impl AnalysisAssumptions {
    /// Annual deductible-interest ceiling in currency units.
    pub fn deduction_cap(&self) -> Money {
        self.deduction_cap_tax_units * self.reference_tax_unit_value
    }
}

// ---------------------------------------------------------------------------
// Scoring rules
// ---------------------------------------------------------------------------

/// Whether a tier matches values at or above, or at or below, its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierDirection {
    /// Higher is better: first tier with `value >= threshold` wins
    AtLeast,
    /// Lower is better: first tier with `value <= threshold` wins
    AtMost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub threshold: Decimal,
    pub points: i32,
}

/// An ordered list of tiers plus the points awarded when no tier matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierScale {
    pub direction: TierDirection,
    pub tiers: Vec<Tier>,
    pub otherwise: i32,
}

impl TierScale {
    fn at_least(tiers: &[(Decimal, i32)], otherwise: i32) -> Self {
        Self::build(TierDirection::AtLeast, tiers, otherwise)
    }

    fn at_most(tiers: &[(Decimal, i32)], otherwise: i32) -> Self {
        Self::build(TierDirection::AtMost, tiers, otherwise)
    }

    fn build(direction: TierDirection, tiers: &[(Decimal, i32)], otherwise: i32) -> Self {
        Self {
            direction,
            tiers: tiers
                .iter()
                .map(|&(threshold, points)| Tier { threshold, points })
                .collect(),
            otherwise,
        }
    }

    /// Points for `value`: the first matching tier in declaration order.
    pub fn points(&self, value: Decimal) -> i32 {
        self.tiers
            .iter()
            .find(|t| match self.direction {
                TierDirection::AtLeast => value >= t.threshold,
                TierDirection::AtMost => value <= t.threshold,
            })
            .map(|t| t.points)
            .unwrap_or(self.otherwise)
    }
}

/// Minimum scores for each recommendation band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    pub strong_buy: u8,
    pub buy: u8,
    pub neutral: u8,
    pub avoid: u8,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            strong_buy: 85,
            buy: 70,
            neutral: 50,
            avoid: 30,
        }
    }
}

/// The composite viability heuristic. A subjective weighting, not an optimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub base_score: i32,
    /// Percentage below appraisal
    pub appraisal_discount: TierScale,
    /// 10-year annualized ROI (%)
    pub roi: TierScale,
    /// Applied when the land produces rent or carries no debt
    pub dscr: TierScale,
    pub ltv_sweet_spot_min: Percent,
    pub ltv_sweet_spot_max: Percent,
    pub ltv_sweet_spot_points: i32,
    pub ltv_high_threshold: Percent,
    pub ltv_high_points: i32,
    /// Monthly payment as % of land price
    pub payment_to_price: TierScale,
    /// Cash required as % of land price
    pub cash_to_price: TierScale,
    /// Residential, commercial or mixed zoning
    pub buildable_zoning_points: i32,
    pub undefined_zoning_points: i32,
    pub utilities_points: i32,
    pub road_access_points: i32,
    /// Replaces the two bonuses above when neither is present
    pub no_infrastructure_points: i32,
    /// Applied only when the land produces rent
    pub cap_rate: TierScale,
    /// IRR (%)
    pub irr: TierScale,
    pub preferential_tax_points: i32,
    pub recommendation: RecommendationThresholds,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            base_score: 50,
            appraisal_discount: TierScale::at_least(
                &[(dec!(20), 10), (dec!(10), 5), (dec!(5), 2), (dec!(0), 0)],
                -5,
            ),
            roi: TierScale::at_least(
                &[(dec!(15), 10), (dec!(10), 7), (dec!(5), 3), (dec!(0), 0)],
                -10,
            ),
            dscr: TierScale::at_least(&[(dec!(1.5), 5), (dec!(1.2), 3), (dec!(1.0), 0)], -5),
            ltv_sweet_spot_min: dec!(50),
            ltv_sweet_spot_max: dec!(80),
            ltv_sweet_spot_points: 5,
            ltv_high_threshold: dec!(90),
            ltv_high_points: -5,
            payment_to_price: TierScale::at_most(
                &[(dec!(0.5), 5), (dec!(1.0), 2), (dec!(2.0), 0)],
                -5,
            ),
            cash_to_price: TierScale::at_most(&[(dec!(20), 5), (dec!(35), 2), (dec!(60), 0)], -5),
            buildable_zoning_points: 3,
            undefined_zoning_points: -3,
            utilities_points: 2,
            road_access_points: 2,
            no_infrastructure_points: -4,
            cap_rate: TierScale::at_least(&[(dec!(8), 5), (dec!(5), 3)], 0),
            irr: TierScale::at_least(
                &[(dec!(15), 8), (dec!(10), 5), (dec!(5), 2), (dec!(0), 0)],
                -8,
            ),
            preferential_tax_points: 3,
            recommendation: RecommendationThresholds::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_deduction_cap() {
        let a = AnalysisAssumptions::default();
        assert_eq!(a.deduction_cap(), dec!(6225984));
    }

    #[test]
    fn test_tier_scale_at_least() {
        let roi = ScoringRules::default().roi;
        assert_eq!(roi.points(dec!(20)), 10);
        assert_eq!(roi.points(dec!(15)), 10);
        assert_eq!(roi.points(dec!(12)), 7);
        assert_eq!(roi.points(dec!(0)), 0);
        assert_eq!(roi.points(dec!(-0.1)), -10);
    }

    #[test]
    fn test_tier_scale_at_most() {
        let cash = ScoringRules::default().cash_to_price;
        assert_eq!(cash.points(dec!(10)), 5);
        assert_eq!(cash.points(dec!(20)), 5);
        assert_eq!(cash.points(dec!(30)), 2);
        assert_eq!(cash.points(dec!(50)), 0);
        assert_eq!(cash.points(dec!(75)), -5);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let json = r#"{ "opportunity_cost_rate": "0.05", "scoring": { "base_score": 40 } }"#;
        let a: AnalysisAssumptions = serde_json::from_str(json).unwrap();
        assert_eq!(a.opportunity_cost_rate, dec!(0.05));
        assert_eq!(a.operating_expense_ratio, DEFAULT_OPERATING_EXPENSE_RATIO);
        assert_eq!(a.scoring.base_score, 40);
        assert_eq!(a.scoring.recommendation.buy, 70);
    }
}
