//! Per-currency economies.
//!
//! An economy groups everything denominated in one currency: its traded
//! assets, the volatility of its interest rates and its initial discount
//! curve. Exchange rates link a foreign economy to the domestic one.

mod asset;
mod currency;

pub use asset::{Asset, ExchangeRate};
pub use currency::Economy;
