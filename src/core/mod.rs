mod calculator;
mod chart;
mod engine;
mod expr;
mod format;
mod slider;
mod types;
mod validation;

pub use calculator::{
    Calculation, CalculatorForm, CalculatorKind, FieldSpec, ValidatedInputs, calculate,
    slider_amount, slider_position,
};
pub use chart::{BreakdownChart, ChartBoard, ChartKind, ChartUi, ChartUpdate, Dataset, GrowthChart};
pub use engine::{emi_schedule, gst_breakdown, lumpsum_future_value, sip_future_value};
pub use expr::{CalcError, Calculator, evaluate_expression};
pub use format::{format_currency, format_currency_or_infinity, format_indian_compact};
pub use slider::{
    EARLY_STEPS, EARLY_ZONE_POS, SLIDER_MAX, SLIDER_MIN, amount_from_slider_pos, nice_step,
    round_nice_amount, slider_pos_from_amount, snap_slider_pos,
};
pub use types::{
    AmortizationYear, Bounds, EmiResult, GrowthResult, GstBreakdown, GstDirection, YearPoint,
};
pub use validation::{LiveClamp, clamp_input_if_out_of_range, parse_number, validate_number_input};
