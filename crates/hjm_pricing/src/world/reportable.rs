//! Quantities a simulated path reports.

use super::error::WorldError;

/// What is reported, in the currency of its economy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportableKind {
    /// Terminal forward price of the economy's `j`-th asset.
    Asset(usize),
    /// Zero-coupon bond maturing at a fixed date; reports 1 once matured.
    FixedMaturityBond(f64),
    /// Terminal forward exchange rate of a foreign economy, in domestic
    /// currency per unit of foreign.
    TerminalForwardFx,
    /// Zero-coupon bond with a fixed time to maturity.
    RollingBond(f64),
}

impl ReportableKind {
    /// Decodes an integer selector.
    ///
    /// | selector | kind |
    /// |----------|------|
    /// | `j >= 0` | [`Asset(j)`](Self::Asset) |
    /// | `-1` | [`FixedMaturityBond(maturity)`](Self::FixedMaturityBond) |
    /// | `-2` | [`TerminalForwardFx`](Self::TerminalForwardFx) |
    /// | `-3` | [`RollingBond(maturity)`](Self::RollingBond) |
    ///
    /// `maturity` is ignored by the selectors that do not need it.
    ///
    /// # Errors
    ///
    /// `InvalidReportable` for any other selector, or a bond maturity that
    /// is negative or not finite.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hjm_pricing::world::ReportableKind;
    ///
    /// assert_eq!(ReportableKind::from_selector(2, 0.0).unwrap(), ReportableKind::Asset(2));
    /// assert_eq!(
    ///     ReportableKind::from_selector(-3, 0.25).unwrap(),
    ///     ReportableKind::RollingBond(0.25)
    /// );
    /// assert!(ReportableKind::from_selector(-4, 1.0).is_err());
    /// ```
    pub fn from_selector(selector: i32, maturity: f64) -> Result<Self, WorldError> {
        let kind = match selector {
            j if j >= 0 => ReportableKind::Asset(j as usize),
            -1 => ReportableKind::FixedMaturityBond(maturity),
            -2 => ReportableKind::TerminalForwardFx,
            -3 => ReportableKind::RollingBond(maturity),
            other => {
                return Err(WorldError::InvalidReportable(format!(
                    "unknown selector {}",
                    other
                )))
            }
        };
        kind.validate_maturity()?;
        Ok(kind)
    }

    pub(crate) fn validate_maturity(&self) -> Result<(), WorldError> {
        match self {
            ReportableKind::FixedMaturityBond(maturity) | ReportableKind::RollingBond(maturity)
                if !(*maturity >= 0.0 && maturity.is_finite()) =>
            {
                Err(WorldError::InvalidReportable(format!(
                    "bond maturity {} must be finite and non-negative",
                    maturity
                )))
            }
            _ => Ok(()),
        }
    }

    /// Whether the reported value is `anchor · exp(state)` for a log state
    /// variable.
    #[inline]
    pub fn is_lognormal(&self) -> bool {
        matches!(
            self,
            ReportableKind::Asset(_) | ReportableKind::TerminalForwardFx
        )
    }
}

/// A registered reportable: a kind in the currency of one economy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reportable {
    /// Economy index, 0 for domestic.
    pub currency: usize,
    /// What is reported.
    pub kind: ReportableKind,
}

impl Reportable {
    /// Pairs a currency with a kind.
    #[inline]
    pub fn new(currency: usize, kind: ReportableKind) -> Self {
        Self { currency, kind }
    }
}
