use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use osmose_core::constants::GRAMS_PER_TON;
use osmose_core::{MortalityAlgorithm, RunSummary, SimConfig, Simulation, UniformForcing};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Tons of plankton per cell, one value per group of the default config.
const PLANKTON_BIOMASS: [f64; 2] = [60.0, 30.0];
const BACKGROUND_BIOMASS: [f64; 1] = [8.0];
const PLANKTON_SEASONALITY: f64 = 0.3;
/// Initial biomass (tons) of each focal species.
const SEED_BIOMASS: f64 = 150.0;
/// Initial schools per species for each benchmark case.
const BENCHMARK_SCHOOLS: [usize; 3] = [100, 300, 800];

#[derive(Parser)]
#[command(name = "osmose")]
#[command(about = "Multispecies fish school simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation from a config file
    Run {
        /// Path to config file (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Output directory for the run summary (optional)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Stop after this many steps instead of the configured duration
        #[arg(long)]
        steps: Option<usize>,

        /// Initial schools per focal species
        #[arg(long, default_value_t = 40)]
        schools: usize,
    },
    /// Time one simulated year for both mortality algorithms
    Benchmark,
    /// Dump the default configuration to stdout
    DumpDefaultConfig,
}

fn make_forcing(config: &SimConfig) -> Box<UniformForcing> {
    let plankton = (0..config.plankton.len())
        .map(|i| PLANKTON_BIOMASS.get(i).copied().unwrap_or(PLANKTON_BIOMASS[0]))
        .collect();
    let background = (0..config.background.len())
        .map(|i| BACKGROUND_BIOMASS.get(i).copied().unwrap_or(BACKGROUND_BIOMASS[0]))
        .collect();
    Box::new(
        UniformForcing::new(plankton, background)
            .with_seasonality(PLANKTON_SEASONALITY, config.steps_per_year),
    )
}

/// Spread `schools_per_species` schools of random ages over random ocean
/// cells, sharing `SEED_BIOMASS` tons per species.
fn create_population(sim: &mut Simulation, schools_per_species: usize) -> Result<usize> {
    let mut rng = ChaCha12Rng::seed_from_u64(sim.config().seed);
    let ocean: Vec<usize> = sim.grid().ocean_cells().to_vec();
    let n_species = sim.species_table().n_species();
    let mut created = 0;
    for species in 0..n_species {
        let (lifespan_dt, share) = {
            let params = &sim.species_table().species[species];
            (params.lifespan_dt.max(2), SEED_BIOMASS / schools_per_species.max(1) as f64)
        };
        for _ in 0..schools_per_species {
            let age_dt = rng.random_range(1..lifespan_dt);
            let cell = ocean[rng.random_range(0..ocean.len())];
            let (length, weight) = {
                let params = &sim.species_table().species[species];
                let length = params.vb_length(age_dt);
                (length, params.weight_at(length))
            };
            let abundance = share * GRAMS_PER_TON / weight;
            sim.seed_school(species, age_dt, length, abundance, Some(cell))
                .with_context(|| format!("failed to seed species {species} in cell {cell}"))?;
            created += 1;
        }
    }
    Ok(created)
}

fn run_steps(sim: &mut Simulation, steps: usize) -> Result<RunSummary> {
    let mut summaries = Vec::with_capacity(steps);
    while summaries.len() < steps && !sim.is_finished() {
        summaries.push(sim.step().context("simulation step failed")?);
    }
    let names = sim
        .species_table()
        .species
        .iter()
        .map(|s| s.name.clone())
        .collect();
    Ok(RunSummary::from_steps(sim.config().seed, names, summaries))
}

fn run_benchmark(algorithm: MortalityAlgorithm, schools_per_species: usize) -> Result<()> {
    let config = SimConfig {
        n_years: 1,
        algorithm,
        ..SimConfig::default()
    };
    config
        .validate()
        .context("benchmark config validation error")?;
    let forcing = make_forcing(&config);
    let mut sim = Simulation::new(config, forcing).context("failed to initialize simulation")?;
    let n_schools = create_population(&mut sim, schools_per_species)?;

    let start = Instant::now();
    let summary = sim.run().context("benchmark run failed")?;
    let elapsed = start.elapsed();
    let per_step_ms = elapsed.as_secs_f64() * 1000.0 / summary.n_steps.max(1) as f64;

    println!("--- {algorithm:?}, {n_schools} initial schools, {} workers ---", sim.n_batches());
    println!(
        "  Year:          {:.2} s ({per_step_ms:.1} ms/step)",
        elapsed.as_secs_f64()
    );
    println!("  Alive schools: {}", summary.final_alive_schools);
    println!();
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::DumpDefaultConfig => {
            let config = SimConfig::default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Benchmark => {
            if cfg!(debug_assertions) {
                eprintln!("WARNING: running in debug mode. Results are not representative.");
                eprintln!("         Use: cargo run -p osmose-cli --release -- benchmark");
                eprintln!();
            }
            println!("=== One simulated year ===");
            println!();
            for algorithm in [MortalityAlgorithm::Stochastic, MortalityAlgorithm::Iterative] {
                for schools in BENCHMARK_SCHOOLS {
                    run_benchmark(algorithm, schools)?;
                }
            }
        }
        Commands::Run {
            config,
            out,
            steps,
            schools,
        } => {
            let file = File::open(&config).context("failed to open config file")?;
            let reader = BufReader::new(file);
            let sim_config: SimConfig =
                serde_json::from_reader(reader).context("failed to parse config")?;
            sim_config.validate().context("config validation error")?;

            let steps = steps.unwrap_or_else(|| sim_config.n_steps());
            info!(config = ?config, steps, "loaded config");

            let forcing = make_forcing(&sim_config);
            let mut sim =
                Simulation::new(sim_config, forcing).context("failed to initialize simulation")?;
            let n_schools = create_population(&mut sim, schools)?;
            info!(n_schools, "population seeded");

            let summary = run_steps(&mut sim, steps)?;

            if let Some(out_dir) = out {
                std::fs::create_dir_all(&out_dir).context("failed to create output directory")?;
                let summary_path = out_dir.join("summary.json");
                let file = File::create(summary_path).context("failed to create summary file")?;
                serde_json::to_writer_pretty(file, &summary).context("failed to write summary")?;
                println!("Run complete. Results saved to {:?}", out_dir);
            } else {
                println!(
                    "Run complete. {} steps, {} schools alive.",
                    summary.n_steps, summary.final_alive_schools
                );
                for (name, biomass) in summary.species.iter().zip(&summary.final_biomass) {
                    println!("  {name:<20} {biomass:>12.1} t");
                }
            }
        }
    }
    Ok(())
}
