//! Maps a 0..=1000 slider onto a monetary range.
//!
//! The first 21 positions walk a fixed ladder (1, 500, 1000, ... 10000) so
//! small amounts can be picked exactly; the remaining 980 positions
//! interpolate exponentially from the top of the ladder to the maximum.

pub const SLIDER_MIN: u32 = 0;
pub const SLIDER_MAX: u32 = 1000;

pub const EARLY_STEPS: [f64; 21] = [
    1.0, 500.0, 1_000.0, 1_500.0, 2_000.0, 2_500.0, 3_000.0, 3_500.0, 4_000.0, 4_500.0,
    5_000.0, 5_500.0, 6_000.0, 6_500.0, 7_000.0, 7_500.0, 8_000.0, 8_500.0, 9_000.0, 9_500.0,
    10_000.0,
];

/// Last slider position inside the ladder zone.
pub const EARLY_ZONE_POS: u32 = (EARLY_STEPS.len() - 1) as u32;

const EXP_SPAN: f64 = (SLIDER_MAX - EARLY_ZONE_POS) as f64;

fn last_early_step() -> f64 {
    EARLY_STEPS[EARLY_STEPS.len() - 1]
}

pub fn amount_from_slider_pos(pos: f64, min_amount: f64, max_amount: f64) -> f64 {
    let min_a = min_amount.max(1.0);
    let p = if pos.is_nan() {
        f64::from(SLIDER_MIN)
    } else {
        pos.clamp(f64::from(SLIDER_MIN), f64::from(SLIDER_MAX))
    };

    if p <= f64::from(EARLY_ZONE_POS) {
        let idx = (p.round() as usize).min(EARLY_STEPS.len() - 1);
        return EARLY_STEPS[idx].max(min_a);
    }

    let start = last_early_step().max(min_a);
    let t = (p - f64::from(EARLY_ZONE_POS)) / EXP_SPAN;
    start * (max_amount / start).powf(t)
}

pub fn slider_pos_from_amount(amount: f64, min_amount: f64, max_amount: f64) -> u32 {
    let min_a = min_amount.max(1.0);
    let a = amount.max(min_a).min(max_amount);
    let last_early = last_early_step().max(min_a);

    if a <= last_early {
        let idx = EARLY_STEPS
            .iter()
            .take_while(|step| a >= step.max(min_a))
            .count()
            .saturating_sub(1);
        return (idx as u32).clamp(SLIDER_MIN, SLIDER_MAX);
    }

    let t = (a / last_early).ln() / (max_amount / last_early).ln();
    let pos = (f64::from(EARLY_ZONE_POS) + t * EXP_SPAN).round();
    if pos.is_nan() {
        return SLIDER_MIN;
    }
    pos.clamp(f64::from(SLIDER_MIN), f64::from(SLIDER_MAX)) as u32
}

/// Snaps an amount to a step that grows with its magnitude.
pub fn round_nice_amount(n: f64) -> f64 {
    if n < 500.0 {
        return 1.0;
    }
    let step = nice_step(n);
    (n / step).round() * step
}

/// Granularity `round_nice_amount` uses around `n`.
pub fn nice_step(n: f64) -> f64 {
    match n {
        n if n < 10_000.0 => 500.0,
        n if n < 100_000.0 => 1_000.0,
        n if n < 1_000_000.0 => 5_000.0,
        n if n < 10_000_000.0 => 10_000.0,
        n if n < 100_000_000.0 => 50_000.0,
        n if n < 1_000_000_000.0 => 100_000.0,
        _ => 500_000.0,
    }
}

/// Rounds a raw slider value to the position it settles on. NaN maps to
/// `SLIDER_MIN`.
pub fn snap_slider_pos(pos: f64) -> u32 {
    if pos.is_nan() {
        return SLIDER_MIN;
    }
    pos.round().clamp(f64::from(SLIDER_MIN), f64::from(SLIDER_MAX)) as u32
}
