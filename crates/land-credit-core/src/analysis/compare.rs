use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;
use tracing::debug;

use crate::analysis::combo::{self, ComboInput, LandCreditCombo};
use crate::analysis::scoring::Recommendation;
use crate::types::*;
use crate::LandCreditResult;

/// Best pairing along each dimension. `None` only for an empty input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComboComparison {
    /// Highest 10-year annualized ROI
    pub best_by_roi: Option<LandCreditCombo>,
    /// Lowest monthly payment
    pub best_by_monthly_payment: Option<LandCreditCombo>,
    /// Lowest cash required
    pub best_by_cash_required: Option<LandCreditCombo>,
    pub best_by_irr: Option<LandCreditCombo>,
    pub best_by_cash_on_cash: Option<LandCreditCombo>,
    /// Highest viability score
    pub best_overall: Option<LandCreditCombo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCombo {
    pub rank: usize,
    pub land_id: String,
    pub credit_id: String,
    pub score: u8,
    pub recommendation: Recommendation,
    pub roi_10y: Percent,
}

/// Output of [`compare_inputs`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub combos: Vec<LandCreditCombo>,
    /// Descending by score; ties keep input order
    pub ranking: Vec<RankedCombo>,
    pub best: ComboComparison,
}

/// Pick the best pairing per dimension. Ties keep the earlier element.
pub fn compare(combos: &[LandCreditCombo]) -> ComboComparison {
    ComboComparison {
        best_by_roi: best_by(combos, |c| c.analysis.roi_10y, Ordering::Greater),
        best_by_monthly_payment: best_by(combos, |c| c.analysis.monthly_payment, Ordering::Less),
        best_by_cash_required: best_by(combos, |c| c.analysis.cash_required, Ordering::Less),
        best_by_irr: best_by(combos, |c| c.analysis.advanced_metrics.irr, Ordering::Greater),
        best_by_cash_on_cash: best_by(
            combos,
            |c| c.analysis.advanced_metrics.cash_on_cash_return,
            Ordering::Greater,
        ),
        best_overall: best_by(
            combos,
            |c| Decimal::from(c.analysis.score),
            Ordering::Greater,
        ),
    }
}

/// A candidate replaces the incumbent only when strictly better.
fn best_by<F>(combos: &[LandCreditCombo], key: F, better: Ordering) -> Option<LandCreditCombo>
where
    F: Fn(&LandCreditCombo) -> Decimal,
{
    let (first, rest) = combos.split_first()?;
    let best = rest.iter().fold(first, |best, candidate| {
        if key(candidate).cmp(&key(best)) == better {
            candidate
        } else {
            best
        }
    });
    Some(best.clone())
}

/// Stable descending ranking by score.
pub fn rank_by_score(combos: &[LandCreditCombo]) -> Vec<&LandCreditCombo> {
    let mut ranked: Vec<&LandCreditCombo> = combos.iter().collect();
    ranked.sort_by(|a, b| b.analysis.score.cmp(&a.analysis.score));
    ranked
}

/// Analyse each pairing in order, then rank and compare them.
pub fn compare_inputs(inputs: &[ComboInput]) -> LandCreditResult<ComputationOutput<ComparisonReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if inputs.is_empty() {
        warnings.push("No pairings supplied; nothing to compare".into());
    }

    let mut combos = Vec::with_capacity(inputs.len());
    for input in inputs {
        let out = combo::run_analysis(input)?;
        let label = format!("{} / {}", input.land.id, input.credit.id);
        warnings.extend(out.warnings.into_iter().map(|w| format!("[{label}] {w}")));
        combos.push(out.result);
    }

    let ranking = rank_by_score(&combos)
        .into_iter()
        .enumerate()
        .map(|(i, c)| RankedCombo {
            rank: i + 1,
            land_id: c.land.id.clone(),
            credit_id: c.credit.id.clone(),
            score: c.analysis.score,
            recommendation: c.analysis.recommendation,
            roi_10y: c.analysis.roi_10y,
        })
        .collect();
    let best = compare(&combos);

    debug!(pairings = combos.len(), "comparison complete");

    let report = ComparisonReport {
        combos,
        ranking,
        best,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Land & Credit Combo Comparison (best by ROI, payment, cash, IRR, cash-on-cash, score)",
        &serde_json::json!({
            "pairings": inputs.len(),
            "tie_break": "first in input order",
        }),
        warnings,
        elapsed,
        report,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::AnalysisAssumptions;
    use crate::credit::scenario::CreditScenario;
    use crate::land::opportunity::LandOpportunity;
    use rust_decimal_macros::dec;

    fn combo(id: &str, price: Decimal, rate: Decimal) -> LandCreditCombo {
        let land = LandOpportunity::new(id, id, price, dec!(1000), price, dec!(5));
        let credit = CreditScenario::new(id, "Banco", price, price / dec!(5), rate, 20);
        let analysis = combo::analyze(&land, &credit, &AnalysisAssumptions::default());
        LandCreditCombo {
            land,
            credit,
            analysis,
        }
    }

    #[test]
    fn test_empty_comparison() {
        assert_eq!(compare(&[]), ComboComparison::default());
    }

    #[test]
    fn test_singleton_wins_everything() {
        let only = combo("a", dec!(30000000), dec!(4.6));
        let cmp = compare(std::slice::from_ref(&only));
        assert_eq!(cmp.best_by_roi.as_ref(), Some(&only));
        assert_eq!(cmp.best_by_monthly_payment.as_ref(), Some(&only));
        assert_eq!(cmp.best_by_cash_required.as_ref(), Some(&only));
        assert_eq!(cmp.best_by_irr.as_ref(), Some(&only));
        assert_eq!(cmp.best_by_cash_on_cash.as_ref(), Some(&only));
        assert_eq!(cmp.best_overall.as_ref(), Some(&only));
    }

    #[test]
    fn test_lower_rate_wins_payment_and_roi() {
        let cheap = combo("cheap", dec!(30000000), dec!(3.5));
        let dear = combo("dear", dec!(30000000), dec!(6.0));
        let cmp = compare(&[dear, cheap]);
        assert_eq!(cmp.best_by_monthly_payment.unwrap().land.id, "cheap");
        assert_eq!(cmp.best_by_roi.unwrap().land.id, "cheap");
    }

    #[test]
    fn test_ties_keep_first() {
        let a = combo("a", dec!(30000000), dec!(4.6));
        let mut b = a.clone();
        b.land.id = "b".into();
        let cmp = compare(&[a, b]);
        assert_eq!(cmp.best_by_roi.unwrap().land.id, "a");
        assert_eq!(cmp.best_by_cash_required.unwrap().land.id, "a");
        assert_eq!(cmp.best_overall.unwrap().land.id, "a");
    }

    #[test]
    fn test_rank_by_score_is_stable() {
        let mut a = combo("a", dec!(30000000), dec!(4.6));
        let mut b = a.clone();
        let mut c = a.clone();
        a.analysis.score = 60;
        b.land.id = "b".into();
        b.analysis.score = 80;
        c.land.id = "c".into();
        c.analysis.score = 60;
        let combos = [a, b, c];
        let ids: Vec<&str> = rank_by_score(&combos)
            .iter()
            .map(|c| c.land.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_compare_inputs_ranks_and_prefixes_warnings() {
        let inputs: Vec<ComboInput> = ["a", "b"]
            .iter()
            .map(|id| {
                let c = combo(id, dec!(30000000), dec!(4.6));
                ComboInput {
                    land: c.land,
                    credit: c.credit,
                    assumptions: None,
                }
            })
            .collect();
        let out = compare_inputs(&inputs).unwrap();
        assert_eq!(out.result.combos.len(), 2);
        assert_eq!(out.result.ranking[0].rank, 1);
        assert_eq!(out.result.ranking[0].land_id, "a");
        assert!(out.warnings.iter().all(|w| w.starts_with('[')));
    }

    #[test]
    fn test_compare_inputs_empty() {
        let out = compare_inputs(&[]).unwrap();
        assert!(out.result.combos.is_empty());
        assert!(out.result.best.best_overall.is_none());
        assert_eq!(out.warnings.len(), 1);
    }
}
