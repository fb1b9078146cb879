//! Black formula on a lognormal forward.
//!
//! Every closed form of the Gaussian HJM model reduces to this formula once
//! the variance of the relevant log-forward has been assembled from the
//! volatility integrals:
//!
//! ```text
//! Call = D·[F·N(d₁) - K·N(d₂)]
//! Put  = D·[K·N(-d₂) - F·N(-d₁)]
//! d₁ = (ln(F/K) + ½V) / √V,  d₂ = d₁ - √V
//! ```

use hjm_core::math::distributions::norm_cdf;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OptionType {
    /// Right to buy: max(F - K, 0)
    Call,
    /// Right to sell: max(K - F, 0)
    Put,
}

impl OptionType {
    /// Payoff at expiry.
    #[inline]
    pub fn intrinsic(&self, forward: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (forward - strike).max(0.0),
            OptionType::Put => (strike - forward).max(0.0),
        }
    }
}

/// Payer or receiver swaption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SwaptionType {
    /// Right to pay fixed
    Payer,
    /// Right to receive fixed
    Receiver,
}

/// Discounted Black price.
///
/// `variance` is the total variance `σ²T` of `ln F` to expiry. A
/// non-positive variance, forward or strike returns the discounted
/// intrinsic value.
///
/// # Examples
/// ```
/// use hjm_models::analytical::{black, OptionType};
///
/// let call = black(100.0, 100.0, 0.04, 0.95, OptionType::Call);
/// let put = black(100.0, 100.0, 0.04, 0.95, OptionType::Put);
///
/// // Put-call parity at the money
/// assert!((call - put).abs() < 1e-12);
/// assert!(call > 0.0);
/// ```
pub fn black(forward: f64, strike: f64, variance: f64, discount: f64, option: OptionType) -> f64 {
    if variance <= 0.0 || forward <= 0.0 || strike <= 0.0 {
        return discount * option.intrinsic(forward, strike);
    }

    let std_dev = variance.sqrt();
    let d1 = ((forward / strike).ln() + 0.5 * variance) / std_dev;
    let d2 = d1 - std_dev;

    let undiscounted = match option {
        OptionType::Call => forward * norm_cdf(d1) - strike * norm_cdf(d2),
        OptionType::Put => strike * norm_cdf(-d2) - forward * norm_cdf(-d1),
    };
    discount * undiscounted
}
