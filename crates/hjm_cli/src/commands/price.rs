//! Price command implementation
//!
//! Computes every configured quote in closed form and by simulation of the
//! world under the configured numeraire, and reports both side by side.

use hjm_models::economy::ExchangeRate;
use hjm_pricing::mc::{McEstimate, WorldPricer};
use hjm_pricing::world::{GaussMarkovWorld, ReportableKind};
use tracing::{debug, info, warn};

use crate::config::{QuoteConfig, WorldConfig};
use crate::{CliError, Result};

/// Standard errors within which a simulated quote counts as matching.
const TOLERANCE_SE: f64 = 4.0;

/// One quote in both methods, in the currency of the quote.
#[derive(Debug, Clone)]
pub struct QuoteResult {
    pub label: String,
    pub currency: String,
    pub closed_form: f64,
    pub estimate: McEstimate,
}

impl QuoteResult {
    /// Distance of the closed form from the simulated mean in standard
    /// errors; zero for a deterministic estimate that matches.
    pub fn z_score(&self) -> f64 {
        let gap = self.estimate.mean - self.closed_form;
        if self.estimate.std_error > 0.0 {
            gap / self.estimate.std_error
        } else if gap == 0.0 {
            0.0
        } else {
            f64::INFINITY
        }
    }

    /// Whether the closed form lies inside the simulated confidence band.
    #[inline]
    pub fn matches(&self) -> bool {
        self.estimate.contains(self.closed_form, TOLERANCE_SE)
    }
}

/// Run the price command
pub fn run(config: &WorldConfig, paths: Option<usize>) -> Result<()> {
    info!("Starting pricing...");
    info!("  Quotes: {}", config.quotes.len());
    info!("  Numeraire: {:?}", config.simulation.numeraire());

    if config.quotes.is_empty() {
        warn!("No quotes configured");
        return Ok(());
    }

    let results = price_quotes(config, paths)?;

    println!(
        "\n{:<36} {:<6} {:>14} {:>14} {:>12} {:>8}",
        "Quote", "Ccy", "Closed form", "Monte Carlo", "Std error", "z"
    );
    println!("{}", "-".repeat(95));
    for result in &results {
        println!(
            "{:<36} {:<6} {:>14.8} {:>14.8} {:>12.2e} {:>8.2}",
            result.label,
            result.currency,
            result.closed_form,
            result.estimate.mean,
            result.estimate.std_error,
            result.z_score()
        );
    }
    println!();

    let outside = results.iter().filter(|r| !r.matches()).count();
    if outside > 0 {
        warn!(
            "{} quote(s) outside {} standard errors",
            outside, TOLERANCE_SE
        );
    }

    info!("Pricing complete");
    Ok(())
}

/// Prices every configured quote.
pub fn price_quotes(config: &WorldConfig, paths: Option<usize>) -> Result<Vec<QuoteResult>> {
    let pricer = WorldPricer::new(config.simulation.monte_carlo(paths)?);
    let mut base = config.build_world()?;
    base.set_numeraire(config.simulation.numeraire())?;

    config
        .quotes
        .iter()
        .map(|quote| {
            let closed_form = closed_form(config, &base, quote)?;
            let estimate = simulate(config, &base, &pricer, quote)?;
            debug!(
                quote = %quote.label(),
                closed_form,
                mean = estimate.mean,
                std_error = estimate.std_error,
                "quote priced"
            );
            Ok(QuoteResult {
                label: quote.label(),
                currency: quote.currency().to_string(),
                closed_form,
                estimate,
            })
        })
        .collect()
}

/// Closed-form value in the quote's currency.
pub(crate) fn closed_form(
    config: &WorldConfig,
    world: &GaussMarkovWorld,
    quote: &QuoteConfig,
) -> Result<f64> {
    let currency = config.currency_index(quote.currency())?;
    let economy = &world.economies()[currency];
    let value = match quote {
        QuoteConfig::ZeroBondOption {
            expiry,
            maturity,
            strike,
            option,
            ..
        } => economy
            .model()
            .zcb_option(*expiry, *maturity, *strike, *option)?,
        QuoteConfig::EquityOption {
            asset,
            expiry,
            strike,
            option,
            ..
        } => {
            let j = asset_index(world, currency, asset)?;
            economy
                .model()
                .equity_option(&economy.assets()[j], *expiry, *strike, *option)?
        }
        QuoteConfig::FxOption {
            expiry,
            strike,
            option,
            ..
        } => {
            let fx = foreign_exchange_rate(world, currency)?;
            world.economies()[0].model().fx_option(
                economy.model(),
                fx.volatility(),
                fx.spot(),
                *expiry,
                *strike,
                *option,
            )?
        }
    };
    Ok(value)
}

/// Simulated value in the quote's currency.
///
/// Payoffs in a foreign currency are converted at the terminal exchange
/// rate, priced in domestic currency and converted back at the spot rate.
pub(crate) fn simulate(
    config: &WorldConfig,
    base: &GaussMarkovWorld,
    pricer: &WorldPricer,
    quote: &QuoteConfig,
) -> Result<McEstimate> {
    let currency = config.currency_index(quote.currency())?;
    let mut world = base.clone();

    let (underlying, strike, option) = match quote {
        QuoteConfig::ZeroBondOption {
            maturity,
            strike,
            option,
            ..
        } => (
            world.set_reporting(currency, ReportableKind::FixedMaturityBond(*maturity))?,
            *strike,
            *option,
        ),
        QuoteConfig::EquityOption {
            asset,
            strike,
            option,
            ..
        } => {
            let j = asset_index(&world, currency, asset)?;
            (
                world.set_reporting(currency, ReportableKind::Asset(j))?,
                *strike,
                *option,
            )
        }
        QuoteConfig::FxOption { strike, option, .. } => (
            world.set_reporting(currency, ReportableKind::TerminalForwardFx)?,
            *strike,
            *option,
        ),
    };

    // FX options pay in domestic currency already.
    let conversion = match quote {
        QuoteConfig::FxOption { .. } => None,
        _ if currency > 0 => Some(world.set_reporting(currency, ReportableKind::TerminalForwardFx)?),
        _ => None,
    };

    world.set_timeline(&config.simulation.timeline_to(quote.expiry()))?;

    let estimate = pricer.price_discounted(&world, |path| {
        let payoff = option.intrinsic(path.terminal(underlying), strike);
        conversion.map_or(payoff, |fx| payoff * path.terminal(fx))
    })?;

    Ok(match conversion {
        Some(_) => {
            let spot = foreign_exchange_rate(&world, currency)?.spot();
            McEstimate {
                mean: estimate.mean / spot,
                std_error: estimate.std_error / spot,
                paths: estimate.paths,
            }
        }
        None => estimate,
    })
}

fn asset_index(world: &GaussMarkovWorld, currency: usize, name: &str) -> Result<usize> {
    world.economies()[currency]
        .asset_index(name)
        .ok_or_else(|| CliError::Config(format!("unknown asset {}", name)))
}

fn foreign_exchange_rate(
    world: &GaussMarkovWorld,
    currency: usize,
) -> Result<&ExchangeRate> {
    world.exchange_rate(currency).ok_or_else(|| {
        CliError::InvalidArgument(format!("economy {} has no exchange rate", currency))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::TWO_CURRENCIES;

    fn config() -> WorldConfig {
        TWO_CURRENCIES.parse().unwrap()
    }

    // ========================================
    // Closed Forms
    // ========================================

    #[test]
    fn test_closed_forms_positive() {
        let config = config();
        let world = config.build_world().unwrap();
        for quote in &config.quotes {
            let value = closed_form(&config, &world, quote).unwrap();
            assert!(value > 0.0 && value.is_finite(), "{}", quote.label());
        }
    }

    #[test]
    fn test_unknown_asset() {
        let config: WorldConfig = TWO_CURRENCIES
            .replace("asset = \"SX5E\"", "asset = \"DAX\"")
            .parse()
            .unwrap();
        let world = config.build_world().unwrap();
        assert!(matches!(
            closed_form(&config, &world, &config.quotes[1]),
            Err(CliError::Config(_))
        ));
    }

    // ========================================
    // Agreement With Simulation
    // ========================================

    #[test]
    fn test_quotes_match_simulation() {
        let results = price_quotes(&config(), None).unwrap();
        assert_eq!(results.len(), 3);
        for result in &results {
            assert_eq!(result.estimate.paths, 20_000);
            assert!(
                result.matches(),
                "{}: closed form {} against {} +/- {}",
                result.label,
                result.closed_form,
                result.estimate.mean,
                result.estimate.std_error
            );
        }
    }

    #[test]
    fn test_foreign_quote_under_domestic_numeraire() {
        let content = TWO_CURRENCIES.replace("numeraire = -1", "numeraire = 0").replace(
            "kind = \"zero_bond_option\"\n        currency = \"EUR\"",
            "kind = \"zero_bond_option\"\n        currency = \"USD\"",
        );
        let config: WorldConfig = content.parse().unwrap();
        assert_eq!(config.quotes[0].currency(), "USD");

        let result = &price_quotes(&config, None).unwrap()[0];
        assert!(result.matches(), "{:?}", result);
    }

    #[test]
    fn test_z_score() {
        let result = QuoteResult {
            label: "x".into(),
            currency: "EUR".into(),
            closed_form: 1.0,
            estimate: McEstimate {
                mean: 1.2,
                std_error: 0.1,
                paths: 10,
            },
        };
        assert!((result.z_score() - 2.0).abs() < 1e-12);
        assert!(result.matches());

        let exact = QuoteResult {
            estimate: McEstimate {
                mean: 1.0,
                std_error: 0.0,
                paths: 10,
            },
            ..result
        };
        assert_eq!(exact.z_score(), 0.0);
        assert!(exact.matches());
    }
}
