use serde::{Deserialize, Serialize};

use super::chart::{ChartKind, ChartUi, ChartUpdate};
use super::engine::{emi_schedule, gst_breakdown, lumpsum_future_value, sip_future_value};
use super::format::format_currency_or_infinity;
use super::slider::{amount_from_slider_pos, round_nice_amount, slider_pos_from_amount};
use super::types::{Bounds, EmiResult, GrowthResult, GstBreakdown, GstDirection};
use super::validation::validate_number_input;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculatorKind {
    Sip,
    Lumpsum,
    Gst,
    Emi,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FieldSpec {
    pub bounds: Bounds,
    pub default: f64,
}

const PERCENT_RANGE: Bounds = Bounds::new(1.0, 100.0);
const YEARS_RANGE: Bounds = Bounds::new(1.0, 100.0);

impl CalculatorKind {
    pub const ALL: [CalculatorKind; 4] = [
        CalculatorKind::Sip,
        CalculatorKind::Lumpsum,
        CalculatorKind::Gst,
        CalculatorKind::Emi,
    ];

    pub fn amount_field(self) -> FieldSpec {
        match self {
            CalculatorKind::Sip => FieldSpec {
                bounds: Bounds::new(1.0, 5e8),
                default: 5_000.0,
            },
            CalculatorKind::Lumpsum => FieldSpec {
                bounds: Bounds::new(1.0, 5e9),
                default: 100_000.0,
            },
            CalculatorKind::Gst => FieldSpec {
                bounds: Bounds::new(1.0, 5e9),
                default: 1_000.0,
            },
            CalculatorKind::Emi => FieldSpec {
                bounds: Bounds::new(1.0, 5e9),
                default: 500_000.0,
            },
        }
    }

    pub fn rate_field(self) -> FieldSpec {
        match self {
            CalculatorKind::Sip | CalculatorKind::Lumpsum => FieldSpec {
                bounds: PERCENT_RANGE,
                default: 12.0,
            },
            CalculatorKind::Gst => FieldSpec {
                bounds: Bounds::new(0.0, 100.0),
                default: 18.0,
            },
            CalculatorKind::Emi => FieldSpec {
                bounds: PERCENT_RANGE,
                default: 10.0,
            },
        }
    }

    /// Investment period or loan tenure in years; GST has none.
    pub fn period_field(self) -> Option<FieldSpec> {
        match self {
            CalculatorKind::Sip | CalculatorKind::Lumpsum => Some(FieldSpec {
                bounds: YEARS_RANGE,
                default: 10.0,
            }),
            CalculatorKind::Emi => Some(FieldSpec {
                bounds: YEARS_RANGE,
                default: 20.0,
            }),
            CalculatorKind::Gst => None,
        }
    }
}

/// Raw field text as typed by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorForm {
    pub kind: CalculatorKind,
    pub amount: String,
    pub rate: String,
    pub period: String,
    pub direction: GstDirection,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedInputs {
    pub amount: f64,
    pub rate: f64,
    pub period: Option<f64>,
    pub direction: GstDirection,
}

impl CalculatorForm {
    pub fn with_defaults(kind: CalculatorKind) -> Self {
        Self {
            kind,
            amount: kind.amount_field().default.to_string(),
            rate: kind.rate_field().default.to_string(),
            period: kind
                .period_field()
                .map(|f| f.default.to_string())
                .unwrap_or_default(),
            direction: GstDirection::Add,
        }
    }

    /// Applies the hard on-blur policy to every field.
    pub fn validate(&self) -> ValidatedInputs {
        ValidatedInputs {
            amount: validate_number_input(&self.amount, self.kind.amount_field().bounds),
            rate: validate_number_input(&self.rate, self.kind.rate_field().bounds),
            period: self
                .kind
                .period_field()
                .map(|f| validate_number_input(&self.period, f.bounds)),
            direction: self.direction,
        }
    }

    pub fn calculate(&self) -> Option<Calculation> {
        calculate(self.kind, self.validate())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "calculator", rename_all = "lowercase")]
pub enum Calculation {
    Sip(GrowthResult),
    Lumpsum(GrowthResult),
    Gst {
        direction: GstDirection,
        #[serde(flatten)]
        breakdown: GstBreakdown,
    },
    Emi {
        principal: f64,
        #[serde(flatten)]
        result: EmiResult,
    },
}

/// Runs the formula for `kind`, or `None` when the inputs fail the
/// positivity guard the growth and loan formulas require.
pub fn calculate(kind: CalculatorKind, inputs: ValidatedInputs) -> Option<Calculation> {
    let positive = |v: f64| v.is_finite() && v > 0.0;
    match kind {
        CalculatorKind::Gst => Some(Calculation::Gst {
            direction: inputs.direction,
            breakdown: gst_breakdown(inputs.amount, inputs.rate, inputs.direction),
        }),
        CalculatorKind::Sip | CalculatorKind::Lumpsum | CalculatorKind::Emi => {
            let period = inputs.period?;
            if !positive(inputs.amount) || !positive(inputs.rate) || !positive(period) {
                return None;
            }
            Some(match kind {
                CalculatorKind::Sip => {
                    Calculation::Sip(sip_future_value(inputs.amount, inputs.rate, period))
                }
                CalculatorKind::Lumpsum => {
                    Calculation::Lumpsum(lumpsum_future_value(inputs.amount, inputs.rate, period))
                }
                _ => Calculation::Emi {
                    principal: inputs.amount,
                    result: emi_schedule(inputs.amount, inputs.rate, period),
                },
            })
        }
    }
}

fn pair(a: &str, b: &str) -> [String; 2] {
    [a.to_string(), b.to_string()]
}

fn ui(growth_title: &str, growth_badge: &str, breakdown_badge: &str) -> ChartUi {
    ChartUi {
        growth_title: growth_title.to_string(),
        growth_badge: growth_badge.to_string(),
        breakdown_title: "Breakdown".to_string(),
        breakdown_badge: breakdown_badge.to_string(),
    }
}

fn growth_chart(result: &GrowthResult, ui: ChartUi) -> ChartUpdate {
    ChartUpdate {
        kind: ChartKind::Line,
        labels: result.yearly.iter().map(|p| p.label.clone()).collect(),
        invested_series: result.yearly.iter().map(|p| p.invested).collect(),
        returns_series: result.yearly.iter().map(|p| p.returns).collect(),
        series_labels: pair("Invested", "Returns"),
        pie_labels: pair("Invested", "Returns"),
        pie_data: [result.invested, result.returns.max(0.0)],
        ui,
    }
}

impl Calculation {
    pub fn kind(&self) -> CalculatorKind {
        match self {
            Calculation::Sip(_) => CalculatorKind::Sip,
            Calculation::Lumpsum(_) => CalculatorKind::Lumpsum,
            Calculation::Gst { .. } => CalculatorKind::Gst,
            Calculation::Emi { .. } => CalculatorKind::Emi,
        }
    }

    pub fn chart_update(&self) -> ChartUpdate {
        match self {
            Calculation::Sip(result) => growth_chart(
                result,
                ui(
                    "SIP Growth Over Time",
                    "Tip: Longer tenure boosts compounding",
                    "Invested vs Returns",
                ),
            ),
            Calculation::Lumpsum(result) => growth_chart(
                result,
                ui(
                    "Lumpsum Growth Over Time",
                    "Tip: Time in market > timing",
                    "Invested vs Returns",
                ),
            ),
            Calculation::Gst {
                direction,
                breakdown,
            } => {
                let (base, gst, badge) = match direction {
                    GstDirection::Add => ("Base", "GST Added", "Add GST"),
                    GstDirection::Remove => ("Pre-tax Base", "GST Portion", "Remove GST"),
                };
                let tax = breakdown.tax.max(0.0);
                ChartUpdate {
                    kind: ChartKind::Bar,
                    labels: vec!["Total".to_string()],
                    invested_series: vec![breakdown.original],
                    returns_series: vec![tax],
                    series_labels: pair(base, gst),
                    pie_labels: pair(base, gst),
                    pie_data: [breakdown.original, tax],
                    ui: ui("GST Total", badge, &format!("{base} vs {gst}")),
                }
            }
            Calculation::Emi { principal, result } => {
                let interest = result.total_interest.max(0.0);
                ChartUpdate {
                    kind: ChartKind::Bar,
                    labels: vec!["Total".to_string()],
                    invested_series: vec![*principal],
                    returns_series: vec![interest],
                    series_labels: pair("Principal", "Interest"),
                    pie_labels: pair("Principal", "Interest"),
                    pie_data: [*principal, interest],
                    ui: ui(
                        "EMI Total Cost",
                        "Principal vs Interest over loan",
                        "Principal vs Interest",
                    ),
                }
            }
        }
    }

    /// Labelled, display-formatted headline figures.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        let fmt = format_currency_or_infinity;
        match self {
            Calculation::Sip(r) | Calculation::Lumpsum(r) => vec![
                ("Invested", fmt(r.invested)),
                ("Returns", fmt(r.returns)),
                ("Total", fmt(r.total)),
            ],
            Calculation::Gst { breakdown, .. } => vec![
                ("Original", fmt(breakdown.original)),
                ("GST", fmt(breakdown.tax)),
                ("Net", fmt(breakdown.net)),
            ],
            Calculation::Emi { result, .. } => vec![
                ("Monthly EMI", fmt(result.emi)),
                ("Total interest", fmt(result.total_interest)),
                ("Total payment", fmt(result.total_payment)),
            ],
        }
    }
}

/// Amount shown in the field when the slider sits at `pos`.
pub fn slider_amount(kind: CalculatorKind, pos: u32) -> f64 {
    let bounds = kind.amount_field().bounds;
    round_nice_amount(amount_from_slider_pos(f64::from(pos), bounds.min, bounds.max))
}

pub fn slider_position(kind: CalculatorKind, amount: f64) -> u32 {
    let bounds = kind.amount_field().bounds;
    slider_pos_from_amount(amount, bounds.min, bounds.max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(kind: CalculatorKind, amount: &str, rate: &str, period: &str) -> CalculatorForm {
        CalculatorForm {
            kind,
            amount: amount.to_string(),
            rate: rate.to_string(),
            period: period.to_string(),
            direction: GstDirection::Add,
        }
    }

    #[test]
    fn defaults_produce_results_for_every_calculator() {
        for kind in CalculatorKind::ALL {
            let calc = CalculatorForm::with_defaults(kind)
                .calculate()
                .expect("defaults are valid");
            assert_eq!(calc.kind(), kind);
        }
    }

    #[test]
    fn blur_policy_clamps_raw_fields() {
        let inputs = form(CalculatorKind::Sip, "9e9", "", "250").validate();
        assert_eq!(inputs.amount, 5e8);
        assert_eq!(inputs.rate, 1.0);
        assert_eq!(inputs.period, Some(100.0));

        let gst = form(CalculatorKind::Gst, "abc", "-4", "").validate();
        assert_eq!(gst.amount, 1.0);
        assert_eq!(gst.rate, 0.0);
        assert_eq!(gst.period, None);
    }

    #[test]
    fn guard_rejects_non_positive_inputs() {
        let inputs = ValidatedInputs {
            amount: 5_000.0,
            rate: 0.0,
            period: Some(10.0),
            direction: GstDirection::Add,
        };
        assert!(calculate(CalculatorKind::Sip, inputs).is_none());
        assert!(calculate(CalculatorKind::Emi, ValidatedInputs { period: None, ..inputs }).is_none());
        assert!(calculate(CalculatorKind::Gst, inputs).is_some());
    }

    #[test]
    fn sip_summary_and_chart() {
        let calc = form(CalculatorKind::Sip, "5000", "12", "10")
            .calculate()
            .expect("valid");
        let summary = calc.summary();
        assert_eq!(summary[0], ("Invested", "₹6,00,000.00".to_string()));
        assert_eq!(summary[2].0, "Total");
        assert!(summary[2].1.starts_with("₹11,61,69"));

        let chart = calc.chart_update();
        assert_eq!(chart.kind, ChartKind::Line);
        assert_eq!(chart.labels.len(), 10);
        assert_eq!(chart.ui.growth_title, "SIP Growth Over Time");
    }

    #[test]
    fn gst_chart_labels_follow_direction() {
        let mut remove = form(CalculatorKind::Gst, "1180", "18", "");
        remove.direction = GstDirection::Remove;
        let chart = remove.calculate().expect("valid").chart_update();
        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.pie_labels[0], "Pre-tax Base");
        assert_eq!(chart.ui.growth_badge, "Remove GST");
        assert_eq!(chart.ui.breakdown_badge, "Pre-tax Base vs GST Portion");
        assert!((chart.pie_data[1] - 180.0).abs() < 1e-9);
    }

    #[test]
    fn emi_chart_shows_principal_and_interest_totals() {
        let calc = form(CalculatorKind::Emi, "1000000", "10", "20")
            .calculate()
            .expect("valid");
        let chart = calc.chart_update();
        assert_eq!(chart.labels, vec!["Total".to_string()]);
        assert_eq!(chart.invested_series, vec![1_000_000.0]);
        assert!((chart.returns_series[0] - 1_316_052.0).abs() < 5.0);
        assert_eq!(calc.summary()[0].0, "Monthly EMI");
    }

    #[test]
    fn calculation_serializes_with_calculator_tag() {
        let calc = form(CalculatorKind::Gst, "1000", "18", "")
            .calculate()
            .expect("valid");
        let json = serde_json::to_value(&calc).expect("serialize");
        assert_eq!(json["calculator"], "gst");
        assert_eq!(json["direction"], "add");
        assert_eq!(json["net"], 1180.0);
    }

    #[test]
    fn slider_glue_uses_amount_bounds() {
        assert_eq!(slider_amount(CalculatorKind::Emi, 0), 1.0);
        assert_eq!(slider_amount(CalculatorKind::Emi, 20), 10_000.0);
        assert_eq!(slider_amount(CalculatorKind::Sip, 1000), 5e8);
        assert_eq!(slider_position(CalculatorKind::Sip, 5_000.0), 10);
        assert_eq!(slider_position(CalculatorKind::Lumpsum, 5e9), 1000);
    }
}
