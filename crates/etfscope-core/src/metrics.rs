//! ETF metric calculator.
//!
//! Three pure functions. None of them substitutes a default for a bad
//! divisor; callers receive a [`MetricError`] and decide how to report it.
//!
//! | Function | Formula |
//! |----------|---------|
//! | [`nav`] | `total_assets / total_shares` |
//! | [`premium_discount`] | `(market_price - nav) / nav * 100` |
//! | [`tracking_error`] | population std-dev of `etf[i] - benchmark[i]` |

use crate::MetricError;

/// Net asset value per share.
pub fn nav(total_assets: f64, total_shares: u64) -> Result<f64, MetricError> {
    ensure_finite("total_assets", total_assets)?;
    if total_shares == 0 {
        return Err(MetricError::DivisionByZero {
            divisor: "total_shares",
        });
    }

    Ok(total_assets / total_shares as f64)
}

/// Percentage gap between market price and NAV. Positive is a premium,
/// negative a discount.
pub fn premium_discount(market_price: f64, nav: f64) -> Result<f64, MetricError> {
    ensure_finite("market_price", market_price)?;
    ensure_finite("nav", nav)?;
    if nav == 0.0 {
        return Err(MetricError::DivisionByZero { divisor: "nav" });
    }

    Ok((market_price - nav) / nav * 100.0)
}

/// Population standard deviation of the element-wise return differences.
///
/// A single pair yields `0.0`.
pub fn tracking_error(etf_returns: &[f64], benchmark_returns: &[f64]) -> Result<f64, MetricError> {
    if etf_returns.len() != benchmark_returns.len() {
        return Err(MetricError::LengthMismatch {
            etf: etf_returns.len(),
            benchmark: benchmark_returns.len(),
        });
    }
    if etf_returns.is_empty() {
        return Err(MetricError::EmptySeries);
    }

    let differences = etf_returns
        .iter()
        .zip(benchmark_returns)
        .map(|(etf, benchmark)| {
            ensure_finite("etf_returns", *etf)?;
            ensure_finite("benchmark_returns", *benchmark)?;
            Ok(etf - benchmark)
        })
        .collect::<Result<Vec<_>, MetricError>>()?;

    let n = differences.len() as f64;
    let mean = differences.iter().sum::<f64>() / n;
    let variance = differences.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;

    Ok(variance.sqrt())
}

fn ensure_finite(field: &'static str, value: f64) -> Result<(), MetricError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(MetricError::NonFinite { field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn nav_divides_assets_by_shares() {
        let value = nav(1_000_000.0, 40_000).expect("shares are non-zero");
        assert!((value - 25.0).abs() < EPS);
    }

    #[test]
    fn nav_rejects_zero_shares() {
        let err = nav(1_000_000.0, 0).expect_err("must fail");
        assert_eq!(
            err,
            MetricError::DivisionByZero {
                divisor: "total_shares"
            }
        );
    }

    #[test]
    fn premium_discount_sign_follows_price() {
        assert!(premium_discount(10_100.0, 10_000.0).expect("nav non-zero") > 0.0);
        assert!(premium_discount(9_900.0, 10_000.0).expect("nav non-zero") < 0.0);
        assert_eq!(premium_discount(10_000.0, 10_000.0).expect("nav non-zero"), 0.0);
    }

    #[test]
    fn premium_discount_is_percentage() {
        let value = premium_discount(10_150.0, 10_000.0).expect("nav non-zero");
        assert!((value - 1.5).abs() < EPS);
    }

    #[test]
    fn premium_discount_rejects_zero_nav() {
        let err = premium_discount(100.0, 0.0).expect_err("must fail");
        assert_eq!(err, MetricError::DivisionByZero { divisor: "nav" });
    }

    #[test]
    fn tracking_error_is_population_std_dev() {
        // differences: 1, -1, 1, -1 -> mean 0, variance 1
        let value = tracking_error(&[2.0, 0.0, 2.0, 0.0], &[1.0, 1.0, 1.0, 1.0])
            .expect("equal lengths");
        assert!((value - 1.0).abs() < EPS);
    }

    #[test]
    fn tracking_error_of_single_pair_is_zero() {
        let value = tracking_error(&[5.0], &[3.0]).expect("equal lengths");
        assert_eq!(value, 0.0);
    }

    #[test]
    fn tracking_error_rejects_length_mismatch() {
        let err = tracking_error(&[1.0, 2.0], &[1.0]).expect_err("must fail");
        assert_eq!(
            err,
            MetricError::LengthMismatch {
                etf: 2,
                benchmark: 1
            }
        );
    }

    #[test]
    fn tracking_error_rejects_empty_series() {
        let err = tracking_error(&[], &[]).expect_err("must fail");
        assert_eq!(err, MetricError::EmptySeries);
    }

    #[test]
    fn non_finite_inputs_are_rejected() {
        assert!(matches!(
            nav(f64::NAN, 10),
            Err(MetricError::NonFinite { field: "total_assets" })
        ));
        assert!(matches!(
            tracking_error(&[f64::INFINITY], &[0.0]),
            Err(MetricError::NonFinite { .. })
        ));
    }
}
