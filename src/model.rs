//! Fixed-rate mortgage affordability model.

use serde::Serialize;

use crate::error::AffordError;

/// Assumptions behind the maximum-affordable-loan computation.
///
/// Injected as configuration so alternate rate environments can reuse the
/// model without touching its code. [`MortgageTerms::for_year`] carries the
/// published averages for the two snapshot years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MortgageTerms {
    /// Nominal annual interest rate, in percent (e.g. 4.69).
    pub annual_rate_pct: f64,
    /// Amortization term in months.
    pub term_months: u32,
    /// Share of gross monthly income available for the payment.
    pub payment_ratio: f64,
}

impl MortgageTerms {
    /// Terms for a supported snapshot year: Freddie Mac 30-year average
    /// rates, 360-month term, 30% of gross monthly income.
    pub fn for_year(year: u16) -> Result<Self, AffordError> {
        let annual_rate_pct = match year {
            2010 => 4.69,
            2019 => 3.94,
            _ => return Err(AffordError::UnsupportedModelYear(year)),
        };
        Ok(MortgageTerms {
            annual_rate_pct,
            term_months: 360,
            payment_ratio: 0.30,
        })
    }

    /// Maximum loan principal a household at `annual_income` could service.
    ///
    /// Standard fixed-payment amortization identity:
    /// P = payment * (1 - (1+r)^-N) / r with r the monthly rate and the
    /// payment capped at `payment_ratio` of gross monthly income.
    ///
    /// HMDA loan amounts already exclude the down payment, so the result is
    /// compared directly against reported loan amounts. The full home price
    /// at 20% down would be P / 0.8; that is out of scope here.
    pub fn max_affordable_loan(&self, annual_income: f64) -> Result<f64, AffordError> {
        if !annual_income.is_finite() {
            return Err(AffordError::NonFiniteIncome(annual_income));
        }

        let monthly_income = annual_income / 12.0;
        let r = self.annual_rate_pct / 100.0 / 12.0;
        let annuity = (1.0 - (1.0 + r).powi(-(self.term_months as i32))) / r;

        Ok(self.payment_ratio * monthly_income * annuity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_value_2010() {
        // 120k income at the 2010 rate: 0.3 * 10000 * annuity(4.69%/12, 360)
        let terms = MortgageTerms::for_year(2010).unwrap();
        let p = terms.max_affordable_loan(120_000.0).unwrap();
        assert!((p - 579_109.3).abs() < 1.0, "got {p}");
    }

    #[test]
    fn test_strictly_increasing_in_income() {
        let terms = MortgageTerms::for_year(2010).unwrap();
        let mut prev = terms.max_affordable_loan(10_000.0).unwrap();
        for income in [20_000.0, 55_000.0, 90_000.0, 250_000.0] {
            let p = terms.max_affordable_loan(income).unwrap();
            assert!(p > prev);
            prev = p;
        }
    }

    #[test]
    fn test_lower_rate_affords_more() {
        let p_2010 = MortgageTerms::for_year(2010)
            .unwrap()
            .max_affordable_loan(85_000.0)
            .unwrap();
        let p_2019 = MortgageTerms::for_year(2019)
            .unwrap()
            .max_affordable_loan(85_000.0)
            .unwrap();
        assert!(p_2019 > p_2010);
    }

    #[test]
    fn test_nonpositive_income_yields_nonpositive_principal() {
        let terms = MortgageTerms::for_year(2019).unwrap();
        assert_eq!(terms.max_affordable_loan(0.0).unwrap(), 0.0);
        assert!(terms.max_affordable_loan(-50_000.0).unwrap() < 0.0);
    }

    #[test]
    fn test_unsupported_year() {
        assert_eq!(
            MortgageTerms::for_year(2015),
            Err(AffordError::UnsupportedModelYear(2015))
        );
    }

    #[test]
    fn test_non_finite_income_rejected() {
        let terms = MortgageTerms::for_year(2010).unwrap();
        assert!(terms.max_affordable_loan(f64::NAN).is_err());
        assert!(terms.max_affordable_loan(f64::INFINITY).is_err());
    }
}
