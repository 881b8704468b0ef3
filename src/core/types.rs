use serde::{Deserialize, Serialize};

/// Inclusive numeric range a calculator field is allowed to take.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(self, value: f64) -> f64 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearPoint {
    pub label: String,
    pub invested: f64,
    pub returns: f64,
}

/// Output of the SIP and lumpsum growth calculators.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthResult {
    pub invested: f64,
    pub returns: f64,
    pub total: f64,
    pub yearly: Vec<YearPoint>,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GstDirection {
    #[default]
    Add,
    Remove,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GstBreakdown {
    pub original: f64,
    pub tax: f64,
    pub net: f64,
}

/// One sampled row of an amortization schedule.
///
/// `principal_paid` and `interest_paid` cover the months since the previous
/// sample; the `cumulative_*` fields run from the first month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationYear {
    pub label: String,
    pub month: u32,
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub cumulative_principal: f64,
    pub cumulative_interest: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmiResult {
    pub emi: f64,
    pub total_interest: f64,
    pub total_payment: f64,
    pub amortization_by_year: Vec<AmortizationYear>,
}
