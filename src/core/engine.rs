use super::types::{AmortizationYear, EmiResult, GrowthResult, GstBreakdown, GstDirection, YearPoint};

const MONTHS_PER_YEAR: f64 = 12.0;

fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 100.0 / MONTHS_PER_YEAR
}

/// Annuity-due future value of `months` contributions of `monthly_amount`.
fn sip_value_at(monthly_amount: f64, rate: f64, months: f64) -> f64 {
    monthly_amount * (((1.0 + rate).powf(months) - 1.0) / rate) * (1.0 + rate)
}

fn series_years(years: f64) -> u32 {
    let rounded = years.round();
    if rounded.is_finite() && rounded >= 1.0 {
        rounded as u32
    } else {
        1
    }
}

/// Future value of a monthly SIP paid at the start of each month.
///
/// Callers are expected to guard `amount`, `rate` and `years` to be positive;
/// with a zero rate the annuity factor degenerates to NaN.
pub fn sip_future_value(monthly_amount: f64, annual_rate_percent: f64, years: f64) -> GrowthResult {
    let months = years * MONTHS_PER_YEAR;
    let rate = monthly_rate(annual_rate_percent);
    let total = sip_value_at(monthly_amount, rate, months);
    let invested = monthly_amount * months;

    let yearly = (1..=series_years(years))
        .map(|y| {
            let m = f64::from(y) * MONTHS_PER_YEAR;
            let value = sip_value_at(monthly_amount, rate, m);
            let invested_at = monthly_amount * m;
            YearPoint {
                label: format!("Y{y}"),
                invested: invested_at,
                returns: (value - invested_at).max(0.0),
            }
        })
        .collect();

    GrowthResult {
        invested,
        returns: total - invested,
        total,
        yearly,
    }
}

/// Future value of a single upfront investment compounded annually.
pub fn lumpsum_future_value(principal: f64, annual_rate_percent: f64, years: f64) -> GrowthResult {
    let growth = 1.0 + annual_rate_percent / 100.0;
    let total = principal * growth.powf(years);

    let yearly = (1..=series_years(years))
        .map(|y| {
            let value = principal * growth.powi(y as i32);
            YearPoint {
                label: format!("Y{y}"),
                invested: principal,
                returns: (value - principal).max(0.0),
            }
        })
        .collect();

    GrowthResult {
        invested: principal,
        returns: total - principal,
        total,
        yearly,
    }
}

pub fn gst_breakdown(amount: f64, rate_percent: f64, direction: GstDirection) -> GstBreakdown {
    match direction {
        GstDirection::Add => {
            let tax = amount * (rate_percent / 100.0);
            GstBreakdown {
                original: amount,
                tax,
                net: amount + tax,
            }
        }
        GstDirection::Remove => {
            let original = amount / (1.0 + rate_percent / 100.0);
            GstBreakdown {
                original,
                tax: amount - original,
                net: amount,
            }
        }
    }
}

/// Equated monthly instalment plus a yearly-sampled amortization schedule.
///
/// The schedule samples every twelfth month and the final month, so a tenure
/// shorter than a year yields exactly one row.
pub fn emi_schedule(principal: f64, annual_rate_percent: f64, years: f64) -> EmiResult {
    let rate = monthly_rate(annual_rate_percent);
    let months = years * MONTHS_PER_YEAR;
    let growth = (1.0 + rate).powf(months);
    let emi = principal * rate * growth / (growth - 1.0);
    let total_payment = emi * months;

    EmiResult {
        emi,
        total_interest: total_payment - principal,
        total_payment,
        amortization_by_year: amortize(principal, rate, emi, months),
    }
}

fn amortize(principal: f64, rate: f64, emi: f64, months: f64) -> Vec<AmortizationYear> {
    let rounded = months.round();
    let month_count = if rounded.is_finite() && rounded >= 1.0 {
        rounded as u32
    } else {
        1
    };

    let mut rows = Vec::with_capacity(month_count.div_ceil(12) as usize);
    let mut balance = principal;
    let mut cumulative_principal = 0.0;
    let mut cumulative_interest = 0.0;
    let mut sampled_principal = 0.0;
    let mut sampled_interest = 0.0;

    for month in 1..=month_count {
        let interest = balance * rate;
        let principal_part = emi - interest;
        cumulative_principal += principal_part;
        cumulative_interest += interest;
        balance -= principal_part;

        if month % 12 == 0 || month == month_count {
            rows.push(AmortizationYear {
                label: format!("Y{}", month.div_ceil(12)),
                month,
                principal_paid: cumulative_principal - sampled_principal,
                interest_paid: cumulative_interest - sampled_interest,
                cumulative_principal,
                cumulative_interest,
                balance,
            });
            sampled_principal = cumulative_principal;
            sampled_interest = cumulative_interest;
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn sip_matches_reference_scenario() {
        let result = sip_future_value(5_000.0, 12.0, 10.0);
        assert_approx_tol(result.invested, 600_000.0, 1e-6);
        assert_approx_tol(result.total, 1_161_695.38, 1.0);
        assert_approx_tol(result.returns, 561_695.38, 1.0);
        assert_eq!(result.yearly.len(), 10);
        assert_eq!(result.yearly[0].label, "Y1");
        assert_approx_tol(result.yearly[9].invested, 600_000.0, 1e-6);
        assert_approx_tol(result.yearly[9].returns, result.returns, 1e-6);
    }

    #[test]
    fn sip_yearly_series_has_one_point_for_short_periods() {
        let result = sip_future_value(1_000.0, 10.0, 0.4);
        assert_eq!(result.yearly.len(), 1);
        assert_eq!(result.yearly[0].label, "Y1");
    }

    #[test]
    fn sip_zero_rate_is_not_finite() {
        let result = sip_future_value(1_000.0, 0.0, 5.0);
        assert!(!result.total.is_finite());
    }

    #[test]
    fn lumpsum_compounds_annually() {
        let result = lumpsum_future_value(100_000.0, 12.0, 10.0);
        assert_approx_tol(result.total, 310_584.82, 0.01);
        assert_approx_tol(result.returns, 210_584.82, 0.01);
        assert_approx_tol(result.invested, 100_000.0, 1e-9);
        assert!(result.yearly.iter().all(|p| p.invested == 100_000.0));
        assert_approx_tol(result.yearly[0].returns, 12_000.0, 1e-6);
    }

    #[test]
    fn lumpsum_zero_rate_keeps_principal() {
        let result = lumpsum_future_value(25_000.0, 0.0, 7.0);
        assert_eq!(result.total, 25_000.0);
        assert_eq!(result.returns, 0.0);
    }

    #[test]
    fn gst_add_and_remove_scenarios() {
        let added = gst_breakdown(1_000.0, 18.0, GstDirection::Add);
        assert_approx_tol(added.original, 1_000.0, 1e-9);
        assert_approx_tol(added.tax, 180.0, 1e-9);
        assert_approx_tol(added.net, 1_180.0, 1e-9);

        let removed = gst_breakdown(1_180.0, 18.0, GstDirection::Remove);
        assert_approx_tol(removed.net, 1_180.0, 1e-9);
        assert_approx_tol(removed.original, 1_000.0, 1e-9);
        assert_approx_tol(removed.tax, 180.0, 1e-9);
    }

    #[test]
    fn gst_zero_rate_is_identity() {
        let added = gst_breakdown(500.0, 0.0, GstDirection::Add);
        assert_eq!(added.tax, 0.0);
        assert_eq!(added.net, 500.0);
    }

    #[test]
    fn emi_matches_reference_scenario() {
        let result = emi_schedule(1_000_000.0, 10.0, 20.0);
        assert_approx_tol(result.emi, 9_650.22, 0.01);
        assert_approx_tol(result.total_payment, 2_316_052.0, 5.0);
        assert_approx_tol(result.total_interest, 1_316_052.0, 5.0);
        assert_eq!(result.amortization_by_year.len(), 20);
        assert_eq!(result.amortization_by_year[19].month, 240);
        assert_eq!(result.amortization_by_year[19].label, "Y20");
    }

    #[test]
    fn emi_schedule_retires_the_loan() {
        let result = emi_schedule(1_000_000.0, 10.0, 20.0);
        let last = result.amortization_by_year.last().expect("schedule rows");
        assert_approx_tol(last.balance, 0.0, 1e-4);
        assert_approx_tol(last.cumulative_principal, 1_000_000.0, 1e-4);
        assert_approx_tol(last.cumulative_interest, result.total_interest, 1e-3);
    }

    #[test]
    fn emi_short_tenure_samples_once() {
        let result = emi_schedule(120_000.0, 12.0, 0.5);
        assert_eq!(result.amortization_by_year.len(), 1);
        let row = &result.amortization_by_year[0];
        assert_eq!(row.month, 6);
        assert_eq!(row.label, "Y1");
        assert_approx_tol(row.principal_paid, 120_000.0, 1e-6);
    }

    #[test]
    fn emi_samples_trailing_partial_year() {
        let result = emi_schedule(200_000.0, 9.0, 2.5);
        let months: Vec<u32> = result.amortization_by_year.iter().map(|r| r.month).collect();
        assert_eq!(months, vec![12, 24, 30]);
        assert_eq!(result.amortization_by_year[2].label, "Y3");
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_sip_positive_rate_has_positive_returns(
            amount in 1u32..1_000_000,
            rate_bp in 10u32..5_000,
            years in 1u32..60
        ) {
            let result = sip_future_value(amount as f64, rate_bp as f64 / 100.0, years as f64);
            prop_assert!(result.total > result.invested);
            prop_assert!((result.invested + result.returns - result.total).abs() <= result.total * 1e-12);
        }

        #[test]
        fn prop_lumpsum_total_is_invested_plus_returns(
            principal in 1u32..10_000_000,
            rate_bp in 0u32..5_000,
            years in 1u32..60
        ) {
            let result = lumpsum_future_value(principal as f64, rate_bp as f64 / 100.0, years as f64);
            prop_assert!(result.total >= result.invested);
            prop_assert!((result.invested + result.returns - result.total).abs() <= result.total * 1e-12);
        }

        #[test]
        fn prop_gst_round_trip_recovers_original(
            amount in 1u64..5_000_000_000,
            rate_bp in 0u32..10_000
        ) {
            let x = amount as f64;
            let rate = rate_bp as f64 / 100.0;
            let added = gst_breakdown(x, rate, GstDirection::Add);
            let removed = gst_breakdown(added.net, rate, GstDirection::Remove);
            prop_assert!((removed.original - x).abs() <= x * 1e-12);
        }

        #[test]
        fn prop_emi_schedule_reconciles_with_summary(
            principal in 1_000u32..50_000_000,
            rate_bp in 50u32..3_000,
            years in 1u32..40
        ) {
            let p = principal as f64;
            let result = emi_schedule(p, rate_bp as f64 / 100.0, years as f64);
            let months = years as f64 * 12.0;
            prop_assert!((result.total_payment - result.emi * months).abs() <= result.total_payment * 1e-12);

            let repaid: f64 = result.amortization_by_year.iter().map(|r| r.principal_paid).sum();
            prop_assert!((repaid - p).abs() <= p * 1e-8);

            let interest: f64 = result.amortization_by_year.iter().map(|r| r.interest_paid).sum();
            prop_assert!((interest - result.total_interest).abs() <= p * 1e-8);
        }
    }
}
