use crate::analysis::combo::LandCreditCombo;
use crate::error::LandCreditError;
use crate::export::format::{format_currency, format_percent, CurrencyFormat};
use crate::LandCreditResult;

/// Labels of [`combo_csv_rows`], in output order.
pub const ROW_LABELS: [&str; 16] = [
    "Terrain",
    "Price",
    "Credit",
    "Rate / Term",
    "Monthly Payment",
    "Cash Required",
    "Total Investment",
    "ROI 5y",
    "ROI 10y",
    "ROI 20y",
    "Cash-on-Cash",
    "IRR",
    "Cap Rate",
    "DSCR",
    "Score",
    "Recommendation",
];

/// The presentation rows for one pairing as `(label, value)`.
pub fn combo_csv_rows(combo: &LandCreditCombo) -> Vec<(String, String)> {
    combo_csv_rows_with(combo, &CurrencyFormat::default())
}

pub fn combo_csv_rows_with(
    combo: &LandCreditCombo,
    fmt: &CurrencyFormat,
) -> Vec<(String, String)> {
    let a = &combo.analysis;
    let m = &a.advanced_metrics;
    let credit = match &combo.credit.product_name {
        Some(product) => format!("{} - {}", combo.credit.bank_name, product),
        None => combo.credit.bank_name.clone(),
    };

    let values = [
        combo.land.name.clone(),
        format_currency(combo.land.price, fmt),
        credit,
        format!(
            "{} / {} years",
            format_percent(combo.credit.annual_interest_rate, 2),
            combo.credit.term_years
        ),
        format_currency(a.monthly_payment, fmt),
        format_currency(a.cash_required, fmt),
        format_currency(a.total_investment, fmt),
        format_percent(a.roi_5y, 2),
        format_percent(a.roi_10y, 2),
        format_percent(a.roi_20y, 2),
        format_percent(m.cash_on_cash_return, 2),
        format_percent(m.irr, 2),
        format_percent(m.cap_rate, 2),
        format!("{:.2}", m.dscr),
        a.score.to_string(),
        a.recommendation.label().to_string(),
    ];

    ROW_LABELS
        .iter()
        .zip(values)
        .map(|(label, value)| (label.to_string(), value))
        .collect()
}

/// Two-column `Metric,Value` CSV for one pairing.
pub fn export_combo_csv(combo: &LandCreditCombo) -> LandCreditResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["Metric", "Value"])?;
    for (label, value) in combo_csv_rows(combo) {
        wtr.write_record([label, value])?;
    }
    finish(wtr)
}

/// One `Metric` column plus one column per pairing, headed `land / bank`.
pub fn export_comparison_csv(combos: &[LandCreditCombo]) -> LandCreditResult<String> {
    if combos.is_empty() {
        return Err(LandCreditError::InsufficientData(
            "At least one analysed pairing is required for export".into(),
        ));
    }

    let columns: Vec<Vec<(String, String)>> = combos.iter().map(combo_csv_rows).collect();

    let mut wtr = csv::Writer::from_writer(Vec::new());
    let mut header = vec!["Metric".to_string()];
    header.extend(
        combos
            .iter()
            .map(|c| format!("{} / {}", c.land.name, c.credit.bank_name)),
    );
    wtr.write_record(&header)?;

    for (i, label) in ROW_LABELS.iter().enumerate() {
        let mut record = vec![label.to_string()];
        record.extend(columns.iter().map(|rows| rows[i].1.clone()));
        wtr.write_record(&record)?;
    }
    finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> LandCreditResult<String> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| LandCreditError::ExportError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| LandCreditError::ExportError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::combo::analyze;
    use crate::assumptions::AnalysisAssumptions;
    use crate::credit::scenario::CreditScenario;
    use crate::land::opportunity::LandOpportunity;
    use rust_decimal_macros::dec;

    fn sample_combo(name: &str) -> LandCreditCombo {
        let land = LandOpportunity::new(
            "t1",
            name,
            dec!(30000000),
            dec!(5000),
            dec!(36000000),
            dec!(5),
        );
        let credit =
            CreditScenario::new("c1", "Banco Uno", dec!(30000000), dec!(6000000), dec!(4.6), 20);
        let analysis = analyze(&land, &credit, &AnalysisAssumptions::default());
        LandCreditCombo {
            land,
            credit,
            analysis,
        }
    }

    #[test]
    fn test_rows_follow_fixed_order() {
        let rows = combo_csv_rows(&sample_combo("Parcela Norte"));
        let labels: Vec<&str> = rows.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ROW_LABELS.to_vec());
        assert_eq!(rows[0].1, "Parcela Norte");
        assert_eq!(rows[1].1, "$ 30.000.000");
        assert_eq!(rows[3].1, "4.60% / 20 years");
        assert_eq!(rows[4].1, "$ 153.134");
        assert_eq!(rows[5].1, "$ 12.000.000");
    }

    #[test]
    fn test_export_combo_csv_header_and_length() {
        let csv = export_combo_csv(&sample_combo("Parcela Norte")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Metric,Value");
        assert_eq!(lines.len(), 1 + ROW_LABELS.len());
        assert_eq!(lines[1], "Terrain,Parcela Norte");
    }

    #[test]
    fn test_values_with_commas_are_quoted() {
        let csv = export_combo_csv(&sample_combo("Lote 4, Sector Sur")).unwrap();
        assert!(csv.contains("Terrain,\"Lote 4, Sector Sur\""));
    }

    #[test]
    fn test_comparison_has_one_column_per_combo() {
        let csv = export_comparison_csv(&[sample_combo("A"), sample_combo("B")]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Metric,A / Banco Uno,B / Banco Uno");
        assert_eq!(lines[1], "Terrain,A,B");
    }

    #[test]
    fn test_comparison_requires_combos() {
        assert!(matches!(
            export_comparison_csv(&[]),
            Err(LandCreditError::InsufficientData(_))
        ));
    }
}
