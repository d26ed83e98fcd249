use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::land::opportunity::DevelopmentPotential;
use crate::types::{round_ratio, Money, Rate};

/// Development appraisal inputs for a residual valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualInput {
    pub gross_development_value: Money,
    pub construction_cost: Money,
    #[serde(default)]
    pub fees: Money,
    #[serde(default)]
    pub finance: Money,
    #[serde(default)]
    pub marketing: Money,
    #[serde(default)]
    pub contingency: Money,
    /// Developer profit as a share of GDV (0.20 = 20%)
    pub profit_margin: Rate,
}

impl ResidualInput {
    /// Inputs from a parcel's development plan. `None` unless GDV and
    /// construction cost are both known; `default_margin` fills a missing
    /// target margin.
    pub fn from_development(dev: &DevelopmentPotential, default_margin: Rate) -> Option<Self> {
        Some(Self {
            gross_development_value: dev.gross_development_value?,
            construction_cost: dev.construction_cost?,
            fees: dev.professional_fees.unwrap_or(Decimal::ZERO),
            finance: dev.finance_costs.unwrap_or(Decimal::ZERO),
            marketing: dev.marketing_costs.unwrap_or(Decimal::ZERO),
            contingency: dev.contingency.unwrap_or(Decimal::ZERO),
            profit_margin: dev.target_profit_margin.unwrap_or(default_margin),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualLandValue {
    pub gross_development_value: Money,
    pub construction_cost: Money,
    pub fees: Money,
    pub finance: Money,
    pub marketing: Money,
    pub contingency: Money,
    pub developer_profit: Money,
    /// All development costs including developer profit
    pub total_costs: Money,
    /// Maximum land price the scheme supports, floored at zero
    pub residual_value: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_per_unit_area: Option<Money>,
}

impl ResidualLandValue {
    /// Attach the per-area residual once the parcel area is known.
    pub fn with_area(mut self, area: Decimal) -> Self {
        self.value_per_unit_area = if area > Decimal::ZERO {
            Some(round_ratio(self.residual_value / area, 2))
        } else {
            None
        };
        self
    }
}

/// residual = max(0, GDV - (costs + GDV * profit_margin))
pub fn calculate_residual_land_value(input: &ResidualInput) -> ResidualLandValue {
    let gdv = input.gross_development_value;
    let developer_profit = gdv * input.profit_margin;
    let total_costs = input.construction_cost
        + input.fees
        + input.finance
        + input.marketing
        + input.contingency
        + developer_profit;

    ResidualLandValue {
        gross_development_value: gdv,
        construction_cost: input.construction_cost,
        fees: input.fees,
        finance: input.finance,
        marketing: input.marketing,
        contingency: input.contingency,
        developer_profit,
        total_costs,
        residual_value: (gdv - total_costs).max(Decimal::ZERO),
        value_per_unit_area: None,
    }
}
