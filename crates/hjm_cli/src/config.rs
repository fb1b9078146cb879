//! World description files.
//!
//! A TOML file describes the economies, the exchange rates linking them,
//! the simulation settings and the quotes the `price` command computes:
//!
//! ```toml
//! log_level = "info"
//!
//! [simulation]
//! paths = 20000
//! seed = 42
//! timeline = [0.0, 0.5, 1.0, 2.0]
//! numeraire = 0
//!
//! [[economies]]
//! name = "EUR"
//! curve = { kind = "flat", rate = 0.02 }
//! rate_volatility = { kind = "exponential", levels = [0.01], decays = [0.05] }
//!
//! [[economies.assets]]
//! name = "SX5E"
//! spot = 4000.0
//! dividend_yield = 0.03
//! volatility = { kind = "constant", levels = [0.2] }
//! ```
//!
//! The first economy is domestic. Every other economy needs exactly one
//! `[[exchange_rates]]` entry naming it as `foreign`.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use hjm_core::market_data::{CurveInterpolation, DiscountCurve, InterpolatedCurve};
use hjm_models::analytical::OptionType;
use hjm_models::economy::{Asset, Economy, ExchangeRate};
use hjm_models::volatility::VolatilityFunction;
use hjm_pricing::mc::{MonteCarloConfig, DEFAULT_BATCH_SIZE};
use hjm_pricing::world::{GaussMarkovWorld, Numeraire};
use serde::Deserialize;

use crate::{CliError, Result};

/// Log levels accepted in the file and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(CliError::InvalidArgument(format!(
                "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                s
            ))),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Whole world description.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorldConfig {
    /// Fallback log filter when `RUST_LOG` is unset
    #[serde(default)]
    pub log_level: LogLevel,
    /// Monte Carlo settings
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Economies, domestic first
    pub economies: Vec<EconomyConfig>,
    /// One exchange rate per foreign economy
    #[serde(default)]
    pub exchange_rates: Vec<ExchangeRateConfig>,
    /// Quotes for the `price` command
    #[serde(default)]
    pub quotes: Vec<QuoteConfig>,
}

/// Monte Carlo settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of paths
    pub paths: usize,
    /// Seed; drawn from entropy when absent
    pub seed: Option<u64>,
    /// Paths per parallel batch
    pub batch_size: usize,
    /// Simulation dates, starting at 0
    pub timeline: Vec<f64>,
    /// Numeraire selector: 0 domestic, `-k` foreign economy `k`, `+k`
    /// domestic asset `k-1`
    pub numeraire: i32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            paths: 10_000,
            seed: None,
            batch_size: DEFAULT_BATCH_SIZE,
            timeline: vec![0.0, 1.0],
            numeraire: 0,
        }
    }
}

impl SimulationConfig {
    /// Validated Monte Carlo configuration.
    pub fn monte_carlo(&self, paths: Option<usize>) -> Result<MonteCarloConfig> {
        let mut builder = MonteCarloConfig::builder()
            .n_paths(paths.unwrap_or(self.paths))
            .batch_size(self.batch_size);
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        Ok(builder.build()?)
    }

    /// Decoded numeraire selector.
    #[inline]
    pub fn numeraire(&self) -> Numeraire {
        Numeraire::from_selector(self.numeraire)
    }

    /// Simulation dates before `expiry`, followed by `expiry`.
    pub fn timeline_to(&self, expiry: f64) -> Vec<f64> {
        let mut dates: Vec<f64> = self
            .timeline
            .iter()
            .copied()
            .filter(|t| *t < expiry)
            .collect();
        if dates.first() != Some(&0.0) {
            dates.insert(0, 0.0);
        }
        dates.push(expiry);
        dates
    }
}

/// Discount curve description.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum CurveConfig {
    /// Flat continuously compounded zero rate
    Flat { rate: f64 },
    /// Pillar zero rates
    Interpolated {
        tenors: Vec<f64>,
        rates: Vec<f64>,
        #[serde(default)]
        interpolation: CurveInterpolation,
        #[serde(default = "default_extrapolate")]
        extrapolate: bool,
    },
}

fn default_extrapolate() -> bool {
    true
}

impl CurveConfig {
    fn build(&self) -> Result<Arc<DiscountCurve>> {
        let curve = match self {
            CurveConfig::Flat { rate } => DiscountCurve::flat(*rate),
            CurveConfig::Interpolated {
                tenors,
                rates,
                interpolation,
                extrapolate,
            } => InterpolatedCurve::new(tenors, rates, *interpolation, *extrapolate)?.into(),
        };
        Ok(Arc::new(curve))
    }
}

/// Volatility shape description.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum VolatilityConfig {
    /// Constant per-factor levels
    Constant { levels: Vec<f64> },
    /// `v_i·exp(a_i·t)` per factor
    Exponential { levels: Vec<f64>, decays: Vec<f64> },
    /// Per-factor levels on `[breakpoints[k], breakpoints[k+1])`
    Piecewise {
        breakpoints: Vec<f64>,
        levels: Vec<Vec<f64>>,
    },
}

impl VolatilityConfig {
    fn build(&self) -> Result<Arc<VolatilityFunction>> {
        let vol = match self {
            VolatilityConfig::Constant { levels } => VolatilityFunction::constant(levels.clone())?,
            VolatilityConfig::Exponential { levels, decays } => {
                VolatilityFunction::exponential(levels.clone(), decays.clone())?
            }
            VolatilityConfig::Piecewise {
                breakpoints,
                levels,
            } => VolatilityFunction::piecewise(breakpoints.clone(), levels.clone())?,
        };
        Ok(Arc::new(vol))
    }
}

/// Traded asset description.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetConfig {
    pub name: String,
    pub spot: f64,
    #[serde(default)]
    pub dividend_yield: f64,
    pub volatility: VolatilityConfig,
}

/// Economy description.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EconomyConfig {
    /// Currency name, unique across the file
    pub name: String,
    pub curve: CurveConfig,
    pub rate_volatility: VolatilityConfig,
    #[serde(default)]
    pub assets: Vec<AssetConfig>,
}

impl EconomyConfig {
    fn build(&self) -> Result<Economy> {
        let assets = self
            .assets
            .iter()
            .map(|a| Ok(Asset::new(&a.name, a.spot, a.dividend_yield, a.volatility.build()?)?))
            .collect::<Result<Vec<_>>>()?;
        Ok(Economy::new(
            assets,
            self.rate_volatility.build()?,
            self.curve.build()?,
        )?)
    }
}

/// Exchange rate description: domestic units per unit of `foreign`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExchangeRateConfig {
    pub foreign: String,
    pub spot: f64,
    pub volatility: VolatilityConfig,
}

/// Closed-form quote checked against the simulation.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum QuoteConfig {
    /// Option on a zero-coupon bond of `currency`
    ZeroBondOption {
        currency: String,
        expiry: f64,
        maturity: f64,
        strike: f64,
        option: OptionType,
    },
    /// Option on an asset of `currency`
    EquityOption {
        currency: String,
        asset: String,
        expiry: f64,
        strike: f64,
        option: OptionType,
    },
    /// Option on the exchange rate of the foreign economy `currency`
    FxOption {
        currency: String,
        expiry: f64,
        strike: f64,
        option: OptionType,
    },
}

impl QuoteConfig {
    /// Option expiry.
    pub fn expiry(&self) -> f64 {
        match self {
            QuoteConfig::ZeroBondOption { expiry, .. }
            | QuoteConfig::EquityOption { expiry, .. }
            | QuoteConfig::FxOption { expiry, .. } => *expiry,
        }
    }

    /// Currency name the quote refers to.
    pub fn currency(&self) -> &str {
        match self {
            QuoteConfig::ZeroBondOption { currency, .. }
            | QuoteConfig::EquityOption { currency, .. }
            | QuoteConfig::FxOption { currency, .. } => currency,
        }
    }

    /// Short label for reports.
    pub fn label(&self) -> String {
        match self {
            QuoteConfig::ZeroBondOption {
                currency,
                maturity,
                strike,
                option,
                expiry,
            } => format!(
                "{} zcb {:?} {}y/{}y K={}",
                currency, option, expiry, maturity, strike
            ),
            QuoteConfig::EquityOption {
                asset,
                strike,
                option,
                expiry,
                ..
            } => format!("{} {:?} {}y K={}", asset, option, expiry, strike),
            QuoteConfig::FxOption {
                currency,
                strike,
                option,
                expiry,
            } => format!("{} fx {:?} {}y K={}", currency, option, expiry, strike),
        }
    }
}

impl WorldConfig {
    /// Load and validate a description from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("Failed to read config file: {}", e)))?;
        content.parse()
    }

    /// Validate cross references between sections.
    pub fn validate(&self) -> Result<()> {
        if self.economies.is_empty() {
            return Err(CliError::Config("at least one economy is required".into()));
        }
        for (k, economy) in self.economies.iter().enumerate() {
            if self.economies[..k].iter().any(|e| e.name == economy.name) {
                return Err(CliError::Config(format!(
                    "duplicate economy {}",
                    economy.name
                )));
            }
        }
        if self.exchange_rates.len() != self.economies.len() - 1 {
            return Err(CliError::Config(format!(
                "{} foreign economies need {} exchange rates, got {}",
                self.economies.len() - 1,
                self.economies.len() - 1,
                self.exchange_rates.len()
            )));
        }
        for quote in &self.quotes {
            let currency = self.currency_index(quote.currency())?;
            if let QuoteConfig::FxOption { .. } = quote {
                if currency == 0 {
                    return Err(CliError::Config(format!(
                        "fx option on the domestic economy {}",
                        quote.currency()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Position of the named economy.
    pub fn currency_index(&self, name: &str) -> Result<usize> {
        self.economies
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| CliError::Config(format!("unknown economy {}", name)))
    }

    /// Economies in file order.
    pub fn build_economies(&self) -> Result<Vec<Economy>> {
        self.economies.iter().map(EconomyConfig::build).collect()
    }

    /// Exchange rates ordered like the foreign economies.
    pub fn build_exchange_rates(&self) -> Result<Vec<ExchangeRate>> {
        self.economies
            .iter()
            .skip(1)
            .map(|economy| {
                let mut matching = self
                    .exchange_rates
                    .iter()
                    .filter(|fx| fx.foreign == economy.name);
                match (matching.next(), matching.next()) {
                    (Some(fx), None) => Ok(ExchangeRate::new(fx.spot, fx.volatility.build()?)?),
                    (None, _) => Err(CliError::Config(format!(
                        "no exchange rate for {}",
                        economy.name
                    ))),
                    (Some(_), Some(_)) => Err(CliError::Config(format!(
                        "several exchange rates for {}",
                        economy.name
                    ))),
                }
            })
            .collect()
    }

    /// World over every economy, with no timeline set.
    pub fn build_world(&self) -> Result<GaussMarkovWorld> {
        Ok(GaussMarkovWorld::new(
            self.build_economies()?,
            self.build_exchange_rates()?,
        )?)
    }
}

impl FromStr for WorldConfig {
    type Err = CliError;

    fn from_str(content: &str) -> Result<Self> {
        let config: WorldConfig = toml::from_str(content)
            .map_err(|e| CliError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}
