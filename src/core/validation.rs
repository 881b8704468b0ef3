use serde::Serialize;

use super::types::Bounds;

/// Outcome of clamping a value while the user is still typing.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "camelCase")]
pub enum LiveClamp {
    /// Nothing parseable yet; leave the raw text alone.
    Pending,
    Accepted(f64),
    Clamped(f64),
}

impl LiveClamp {
    pub fn value(self) -> Option<f64> {
        match self {
            LiveClamp::Pending => None,
            LiveClamp::Accepted(v) | LiveClamp::Clamped(v) => Some(v),
        }
    }
}

/// Parses the leading decimal number of `raw`, ignoring trailing text.
///
/// Accepts an optional sign, then either `Infinity` or digits with an
/// optional fraction and exponent. Returns `None` when no digits lead the
/// input.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    if s[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Clamps a value typed into a field, permitting empty or partial input.
pub fn clamp_input_if_out_of_range(raw: &str, bounds: Bounds) -> LiveClamp {
    match parse_number(raw) {
        None => LiveClamp::Pending,
        Some(v) => {
            let clamped = bounds.clamp(v);
            if clamped == v {
                LiveClamp::Accepted(v)
            } else {
                LiveClamp::Clamped(clamped)
            }
        }
    }
}

/// Hard validation applied when a field loses focus: unparseable text
/// becomes `bounds.min`, anything else is clamped into range.
pub fn validate_number_input(raw: &str, bounds: Bounds) -> f64 {
    bounds.clamp(parse_number(raw).unwrap_or(bounds.min))
}
