use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::analysis::metrics::AdvancedMetrics;
use crate::assumptions::{RecommendationThresholds, ScoringRules};
use crate::credit::scenario::CreditScenario;
use crate::land::opportunity::{LandOpportunity, Zoning};
use crate::types::{rate_to_pct, safe_div, Money, Percent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Neutral,
    Avoid,
    StrongAvoid,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "Strong Buy",
            Recommendation::Buy => "Buy",
            Recommendation::Neutral => "Neutral",
            Recommendation::Avoid => "Avoid",
            Recommendation::StrongAvoid => "Strong Avoid",
        }
    }
}

/// Points contributed by one scoring factor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreAdjustment {
    pub factor: String,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    /// Clamped to 0..=100
    pub score: u8,
    pub recommendation: Recommendation,
    /// Every factor that was applied, in evaluation order
    pub adjustments: Vec<ScoreAdjustment>,
}

/// Everything the viability score looks at.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInputs<'a> {
    pub land: &'a LandOpportunity,
    pub credit: &'a CreditScenario,
    pub metrics: &'a AdvancedMetrics,
    /// 10-year annualized ROI (%)
    pub roi_10y: Percent,
    pub monthly_payment: Money,
    pub cash_required: Money,
    pub annual_rent: Money,
}

/// Composite 0-100 viability score and its recommendation band.
pub fn score(inputs: &ScoringInputs<'_>, rules: &ScoringRules) -> ScoreCard {
    let land = inputs.land;
    let metrics = inputs.metrics;
    let mut adjustments = Vec::new();
    let mut add = |factor: &str, points: i32| {
        adjustments.push(ScoreAdjustment {
            factor: factor.to_string(),
            points,
        });
    };

    if land.appraisal_value > Decimal::ZERO {
        add(
            "appraisal_discount",
            rules.appraisal_discount.points(land.derived_discount_pct()),
        );
    }

    add("roi_10y", rules.roi.points(inputs.roi_10y));

    let has_rent = inputs.annual_rent > Decimal::ZERO;
    if has_rent || metrics.annual_debt_service.is_zero() {
        add("dscr", rules.dscr.points(metrics.dscr));
    }

    let ltv = metrics.loan_to_value;
    if ltv >= rules.ltv_sweet_spot_min && ltv <= rules.ltv_sweet_spot_max {
        add("ltv", rules.ltv_sweet_spot_points);
    } else if ltv > rules.ltv_high_threshold {
        add("ltv", rules.ltv_high_points);
    }

    if land.price > Decimal::ZERO {
        let payment_pct = rate_to_pct(safe_div(inputs.monthly_payment, land.price));
        add("payment_to_price", rules.payment_to_price.points(payment_pct));
        let cash_pct = rate_to_pct(safe_div(inputs.cash_required, land.price));
        add("cash_to_price", rules.cash_to_price.points(cash_pct));
    }

    if land.zoning.is_buildable() {
        add("zoning", rules.buildable_zoning_points);
    } else if land.zoning == Zoning::Undefined {
        add("zoning", rules.undefined_zoning_points);
    }

    match (land.has_utilities, land.has_road_access) {
        (false, false) => add("infrastructure", rules.no_infrastructure_points),
        (utilities, road) => {
            if utilities {
                add("utilities", rules.utilities_points);
            }
            if road {
                add("road_access", rules.road_access_points);
            }
        }
    }

    if has_rent {
        add("cap_rate", rules.cap_rate.points(metrics.cap_rate));
    }

    // An unconverged estimate is not trusted enough to move the score
    if metrics.irr_converged {
        add("irr", rules.irr.points(metrics.irr));
    }

    if inputs.credit.preferential_tax_regime {
        add("preferential_tax", rules.preferential_tax_points);
    }

    let total: i32 = rules.base_score + adjustments.iter().map(|a| a.points).sum::<i32>();
    let score = total.clamp(0, 100) as u8;

    ScoreCard {
        score,
        recommendation: recommend(score, &rules.recommendation),
        adjustments,
    }
}

pub fn recommend(score: u8, thresholds: &RecommendationThresholds) -> Recommendation {
    if score >= thresholds.strong_buy {
        Recommendation::StrongBuy
    } else if score >= thresholds.buy {
        Recommendation::Buy
    } else if score >= thresholds.neutral {
        Recommendation::Neutral
    } else if score >= thresholds.avoid {
        Recommendation::Avoid
    } else {
        Recommendation::StrongAvoid
    }
}
