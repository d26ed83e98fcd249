use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{rate_to_pct, round_ratio, safe_div, Money, Percent};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zoning {
    Residential,
    Commercial,
    Industrial,
    Agricultural,
    Mixed,
    #[default]
    Undefined,
}

impl Zoning {
    /// Zoning that allows residential or commercial development.
    pub fn is_buildable(&self) -> bool {
        matches!(self, Zoning::Residential | Zoning::Commercial | Zoning::Mixed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topography {
    Flat,
    Sloped,
    Irregular,
    #[default]
    Undefined,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandStatus {
    #[default]
    Available,
    UnderContract,
    Sold,
    Analyzing,
}

/// Development attributes, present only for parcels with a building plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentPotential {
    /// Buildable floor area
    pub buildable_area: Decimal,
    /// Units per hectare (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floors: Option<u32>,
    /// Expected sale value of the completed development
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_development_value: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction_cost: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_fees: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finance_costs: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketing_costs: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contingency: Option<Money>,
    /// Target developer margin on GDV (decimal, 0.20 = 20%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_profit_margin: Option<Decimal>,
}

/// A parcel under evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandOpportunity {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub price_per_unit_area: Money,
    #[serde(default)]
    pub area: Decimal,
    #[serde(default)]
    pub appraisal_value: Money,
    /// (appraisal - price) / appraisal, in percent
    #[serde(default)]
    pub percentage_below_appraisal: Percent,
    #[serde(default)]
    pub zoning: Zoning,
    #[serde(default)]
    pub has_utilities: bool,
    #[serde(default)]
    pub has_road_access: bool,
    #[serde(default)]
    pub topography: Topography,
    /// Expected annual appreciation in percent
    pub expected_annual_appreciation: Percent,
    /// Estimated monthly rent, when the parcel can be leased
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_rental_income: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development_potential: Option<DevelopmentPotential>,
    #[serde(default)]
    pub status: LandStatus,
}

impl LandOpportunity {
    /// Build a parcel with the derived fields (per-area price, discount)
    /// filled in. Remaining fields take neutral defaults.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Money,
        area: Decimal,
        appraisal_value: Money,
        expected_annual_appreciation: Percent,
    ) -> Self {
        let mut land = Self {
            id: id.into(),
            name: name.into(),
            location: None,
            price,
            price_per_unit_area: Decimal::ZERO,
            area,
            appraisal_value,
            percentage_below_appraisal: Decimal::ZERO,
            zoning: Zoning::Undefined,
            has_utilities: false,
            has_road_access: false,
            topography: Topography::Undefined,
            expected_annual_appreciation,
            estimated_rental_income: None,
            development_potential: None,
            status: LandStatus::Available,
        };
        land.price_per_unit_area = round_ratio(safe_div(price, area), 2);
        land.percentage_below_appraisal = land.derived_discount_pct();
        land
    }

    /// Discount to appraisal implied by price and appraisal, in percent.
    /// Negative when the asking price is above appraisal; 0 without appraisal.
    pub fn derived_discount_pct(&self) -> Percent {
        if self.appraisal_value <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        round_ratio(
            rate_to_pct(safe_div(self.appraisal_value - self.price, self.appraisal_value)),
            2,
        )
    }

    /// Whether the stored discount agrees with price and appraisal (to 0.01%).
    pub fn is_consistent(&self) -> bool {
        (self.percentage_below_appraisal - self.derived_discount_pct()).abs() <= dec!(0.01)
    }

    /// Annual gross rent from the monthly estimate.
    pub fn annual_rent(&self) -> Money {
        self.estimated_rental_income
            .map(|m| m.max(Decimal::ZERO) * dec!(12))
            .unwrap_or(Decimal::ZERO)
    }
}
