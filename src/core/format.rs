// Rupee formatting with Indian digit grouping (12,34,567.89) and compact
// named units for chart axes and tooltips.

const INFINITY_MARK: &str = "∞";

const COMPACT_UNITS: [(f64, &str); 8] = [
    (1e17, "Shankh"),
    (1e15, "Padma"),
    (1e13, "Neel"),
    (1e11, "Kharab"),
    (1e9, "Arab"),
    (1e7, "Crore"),
    (1e5, "Lakh"),
    (1e3, "Thousand"),
];

fn group_indian(int_digits: &str) -> String {
    if int_digits.len() <= 3 {
        return int_digits.to_string();
    }
    let (head, last3) = int_digits.split_at(int_digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), last3)
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn grouped_fixed(n: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let mut out = group_indian(int_part);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// `₹` with Indian grouping and exactly two decimals.
pub fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}₹{}", grouped_fixed(amount, 2))
}

pub fn format_currency_or_infinity(amount: f64) -> String {
    if !amount.is_finite() {
        return INFINITY_MARK.to_string();
    }
    format_currency(amount)
}

/// Compact Indian-unit rendering, e.g. `₹1.5 Crore` or `₹12 Lakh`.
pub fn format_indian_compact(value: f64, with_currency: bool) -> String {
    if !value.is_finite() {
        return INFINITY_MARK.to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let n = value.abs();
    let prefix = if with_currency { "₹" } else { "" };

    let Some(&(unit_value, unit)) = COMPACT_UNITS.iter().find(|(v, _)| n >= *v) else {
        let small = if with_currency {
            format_currency(n)
        } else {
            let grouped = grouped_fixed(n, 2);
            trim_fraction(&grouped).to_string()
        };
        return format!("{sign}{small}");
    };

    let ratio = n / unit_value;
    if ratio >= 1e9 {
        let exp_form = format!("{ratio:.2e}");
        if let Some((mantissa, exp)) = exp_form.split_once('e') {
            return format!("{sign}{prefix}{} × 10^{exp} {unit}", trim_fraction(mantissa));
        }
    }

    let decimals = if ratio >= 100.0 {
        0
    } else if ratio >= 10.0 {
        1
    } else {
        2
    };
    let fixed = format!("{ratio:.decimals$}");
    format!("{sign}{prefix}{} {unit}", trim_fraction(&fixed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_uses_indian_grouping() {
        assert_eq!(format_currency(0.0), "₹0.00");
        assert_eq!(format_currency(999.5), "₹999.50");
        assert_eq!(format_currency(1_000.0), "₹1,000.00");
        assert_eq!(format_currency(123_456.789), "₹1,23,456.79");
        assert_eq!(format_currency(1_161_695.38), "₹11,61,695.38");
        assert_eq!(format_currency(-25_000.0), "-₹25,000.00");
    }

    #[test]
    fn non_finite_values_render_as_infinity() {
        assert_eq!(format_currency_or_infinity(f64::INFINITY), "∞");
        assert_eq!(format_currency_or_infinity(f64::NAN), "∞");
        assert_eq!(format_currency_or_infinity(10.0), "₹10.00");
        assert_eq!(format_indian_compact(f64::NEG_INFINITY, true), "∞");
    }

    #[test]
    fn compact_units() {
        assert_eq!(format_indian_compact(1_500.0, true), "₹1.5 Thousand");
        assert_eq!(format_indian_compact(100_000.0, true), "₹1 Lakh");
        assert_eq!(format_indian_compact(1_234_567.0, true), "₹12.3 Lakh");
        assert_eq!(format_indian_compact(15_000_000.0, false), "1.5 Crore");
        assert_eq!(format_indian_compact(1_500_000_000.0, true), "₹1.5 Arab");
        assert_eq!(format_indian_compact(150_000_000.0, true), "₹15 Crore");
        assert_eq!(format_indian_compact(9_990_000.0, true), "₹99.9 Lakh");
    }

    #[test]
    fn compact_strips_only_fractional_zeros() {
        assert_eq!(format_indian_compact(15e9, true), "₹15 Arab");
        assert_eq!(format_indian_compact(150_000.0 * 1e7, true), "₹15 Kharab");
        assert_eq!(format_indian_compact(250.0 * 1e7, true), "₹2.5 Arab");
        assert_eq!(format_indian_compact(300.0 * 1e5, true), "₹3 Crore");
        assert_eq!(format_indian_compact(150.0 * 1e3, true), "₹1.5 Lakh");
        assert_eq!(format_indian_compact(450.0 * 1e3, true), "₹4.5 Lakh");
        assert_eq!(format_indian_compact(200.0 * 1e17, true), "₹200 Shankh");
    }

    #[test]
    fn compact_small_values() {
        assert_eq!(format_indian_compact(999.0, true), "₹999.00");
        assert_eq!(format_indian_compact(999.5, false), "999.5");
        assert_eq!(format_indian_compact(-42.0, false), "-42");
    }

    #[test]
    fn compact_enormous_ratio_uses_power_notation() {
        assert_eq!(format_indian_compact(3.45e30, true), "₹3.45 × 10^13 Shankh");
        assert_eq!(format_indian_compact(2e26, false), "2 × 10^9 Shankh");
    }
}
