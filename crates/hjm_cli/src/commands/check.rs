//! Check command implementation
//!
//! Builds the world from its description and reports the layout of the
//! state vector and the rank of every step's covariance.

use hjm_pricing::world::GaussMarkovWorld;
use tracing::info;

use crate::config::WorldConfig;
use crate::Result;

/// Covariance summary of one simulation step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSummary {
    pub start: f64,
    pub end: f64,
    pub rank: usize,
    pub largest_eigenvalue: f64,
}

/// Run the check command
pub fn run(config: &WorldConfig) -> Result<()> {
    info!("Checking world description...");
    let world = prepare(config)?;

    let names: Vec<&str> = config.economies.iter().map(|e| e.name.as_str()).collect();
    info!("  Economies: {}", names.join(", "));
    info!("  Factors: {}", world.factors());
    info!("  State variables: {}", world.state_dimension());
    for (k, economy) in world.economies().iter().enumerate() {
        if let Some(start) = world.economy_start_index(k) {
            info!(
                "  {}: rates from {}, {} asset(s)",
                names[k],
                start,
                economy.assets().len()
            );
        }
    }
    let registration = world.numeraire_registration();
    info!(
        "  Numeraire: {:?} (initial value {:.6})",
        registration.numeraire,
        world.initial_numeraire()
    );

    println!(
        "\n{:>10} {:>10} {:>6} {:>18}",
        "From", "To", "Rank", "Largest variance"
    );
    println!("{}", "-".repeat(47));
    for step in summarise(&world) {
        println!(
            "{:>10.4} {:>10.4} {:>6} {:>18.6e}",
            step.start, step.end, step.rank, step.largest_eigenvalue
        );
    }
    println!();

    info!("Check complete");
    Ok(())
}

/// World with the configured numeraire and timeline.
pub fn prepare(config: &WorldConfig) -> Result<GaussMarkovWorld> {
    let mut world = config.build_world()?;
    world.set_numeraire(config.simulation.numeraire())?;
    world.set_timeline(&config.simulation.timeline)?;
    Ok(world)
}

/// Rank and largest eigenvalue of every step's covariance.
pub fn summarise(world: &GaussMarkovWorld) -> Vec<StepSummary> {
    world
        .timeline()
        .windows(2)
        .enumerate()
        .filter_map(|(step, dates)| {
            world.sampler(step).map(|sampler| StepSummary {
                start: dates[0],
                end: dates[1],
                rank: sampler.rank(),
                largest_eigenvalue: sampler.eigenvalues().first().copied().unwrap_or(0.0),
            })
        })
        .collect()
}
