//! Numeraire selection.

/// Unit in which simulated values are expressed.
///
/// Every numeraire is valued in domestic currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Numeraire {
    /// Discrete rolling spot: roll one unit through the zero-coupon bond of
    /// each timeline step, `∏ 1/P(t_i, t_{i+1})`.
    #[default]
    DomesticRollingSpot,
    /// Rolling spot of foreign economy `k` (1-based economy index),
    /// converted at the spot exchange rate.
    ForeignRollingSpot(usize),
    /// Domestic asset `m` with dividends reinvested.
    DomesticAsset(usize),
}

impl Numeraire {
    /// Decodes an integer selector: `0` domestic rolling spot, `-k` the
    /// rolling spot of foreign economy `k`, `+k` the `k`-th domestic asset
    /// (asset index `k - 1`).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hjm_pricing::world::Numeraire;
    ///
    /// assert_eq!(Numeraire::from_selector(0), Numeraire::DomesticRollingSpot);
    /// assert_eq!(Numeraire::from_selector(-2), Numeraire::ForeignRollingSpot(2));
    /// assert_eq!(Numeraire::from_selector(1), Numeraire::DomesticAsset(0));
    /// ```
    pub fn from_selector(selector: i32) -> Self {
        match selector {
            0 => Numeraire::DomesticRollingSpot,
            k if k < 0 => Numeraire::ForeignRollingSpot(k.unsigned_abs() as usize),
            k => Numeraire::DomesticAsset(k as usize - 1),
        }
    }
}

/// Reportables a numeraire depends on.
///
/// Returned by [`GaussMarkovWorld::set_numeraire`](super::GaussMarkovWorld::set_numeraire)
/// so that the registration side effects are visible at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumeraireRegistration {
    /// Numeraire in force after any fall-back.
    pub numeraire: Numeraire,
    /// Reportable index of the numeraire asset.
    pub asset: Option<usize>,
    /// Reportable index of the domestic bond maturing at the horizon.
    pub bond: Option<usize>,
}
