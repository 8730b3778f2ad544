//! Experiment runner for spin-chain spectral functions.
//!
//! This executable builds a spin-1/2 chain Hamiltonian, computes its ground state with
//! the restarted Arnoldi solver and evaluates the dynamical structure factor
//! `<0| S^c_i delta(w - (H - E_0)) S^c_i |0>` on a frequency grid with the selected
//! backend. The spectrum is written to a CSV file, one row per frequency.
use anyhow::{Context, Result, anyhow, ensure};
use arnoldi_spectra::{
    ArnoldiOptions, CorrelatorBackend, CorrelatorOptions, FrequencyGrid,
    correlator::SolveFailurePolicy,
    lowest_energy,
    matrix::SparseOperator,
    solve_dynamical_correlator,
    state::DenseSpace,
    utils::chains::{SpinComponent, heisenberg_chain, local_spin_operator, transverse_ising_chain},
};
use clap::{Parser, ValueEnum};
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use std::{path::PathBuf, time::Instant};

/// The spin chain to study.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Model {
    Heisenberg,
    Ising,
}

/// Spin component measured by the structure factor.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Component {
    X,
    Y,
    Z,
}

impl From<Component> for SpinComponent {
    fn from(component: Component) -> Self {
        match component {
            Component::X => SpinComponent::X,
            Component::Y => SpinComponent::Y,
            Component::Z => SpinComponent::Z,
        }
    }
}

/// Command-line arguments for the spectral-function runner.
#[derive(Parser, Debug)]
#[clap(
    name = "spectra",
    about = "Computes the dynamical spin structure factor of a spin-1/2 chain."
)]
struct SpectraArgs {
    #[clap(long, value_enum, default_value_t = Model::Heisenberg)]
    model: Model,
    #[clap(long, default_value_t = 8)]
    sites: usize,
    /// Exchange coupling J.
    #[clap(long, default_value_t = 1.0)]
    coupling: f64,
    /// Transverse field h (Ising model only).
    #[clap(long, default_value_t = 1.0)]
    field: f64,
    /// Correlator backend: KPM, ED or CV.
    #[clap(long, default_value = "KPM")]
    backend: String,
    #[clap(long, default_value_t = 0.05)]
    broadening: f64,
    #[clap(long, value_enum, default_value_t = Component::Z)]
    component: Component,
    /// Site on which the spin operator acts.
    #[clap(long, default_value_t = 0)]
    site: usize,
    #[clap(long, default_value_t = -0.5, allow_hyphen_values = true)]
    omega_min: f64,
    #[clap(long, default_value_t = 4.0, allow_hyphen_values = true)]
    omega_max: f64,
    #[clap(long, default_value_t = 500)]
    points: usize,
    /// Convergence tolerance of the ground-state search.
    #[clap(long, default_value_t = 1e-6)]
    tolerance: f64,
    #[clap(long, default_value_t = 50)]
    max_iterations: usize,
    #[clap(long, default_value_t = 42)]
    seed: u64,
    /// Path to the output CSV file where results will be written.
    #[clap(long, value_name = "PATH")]
    output: PathBuf,
}

/// A single row of the output file.
#[derive(Debug, Serialize)]
struct SpectrumRow {
    omega: f64,
    real: f64,
    imag: f64,
    converged: bool,
}

fn build_hamiltonian(args: &SpectraArgs) -> Result<SparseOperator> {
    let hamiltonian = match args.model {
        Model::Heisenberg => heisenberg_chain(args.sites, args.coupling)?,
        Model::Ising => transverse_ising_chain(args.sites, args.coupling, args.field)?,
    };
    Ok(hamiltonian)
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

    let args = SpectraArgs::parse();
    ensure!(args.points > 0, "At least one frequency point is required");
    let backend: CorrelatorBackend = args.backend.parse()?;

    let hamiltonian = build_hamiltonian(&args)?;
    let spin = local_spin_operator(args.sites, args.site, args.component.into())?;
    let space = DenseSpace::new(hamiltonian.dim());
    let mut rng = StdRng::seed_from_u64(args.seed);
    log::info!(
        "{:?} chain with {} sites (dimension {})",
        args.model,
        args.sites,
        hamiltonian.dim()
    );

    let start_time = Instant::now();
    let options = ArnoldiOptions {
        tolerance: args.tolerance,
        max_iterations: args.max_iterations,
        ..Default::default()
    };
    let ground = lowest_energy(&hamiltonian, &space, 1, &options, &mut rng)?;
    if !ground.convergence.converged {
        log::warn!(
            "Ground state not converged (error {:e}); continuing with the best estimate",
            ground.convergence.max_error
        );
    }
    let ground_state = &ground.pairs[0];
    let ground_energy = ground_state.energy.re;
    log::info!(
        "Ground energy {ground_energy:.10} after {} iterations ({:.3} s)",
        ground.convergence.iterations,
        start_time.elapsed().as_secs_f64()
    );

    let grid = FrequencyGrid::linspace(args.omega_min, args.omega_max, args.points);
    let correlator = CorrelatorOptions {
        backend,
        broadening: args.broadening,
        on_solve_failure: SolveFailurePolicy::KeepBestEffort,
        ..Default::default()
    };
    let start_time = Instant::now();
    let spectrum = solve_dynamical_correlator(
        &hamiltonian,
        &spin,
        &spin,
        &ground_state.vector,
        ground_energy,
        grid.as_slice(),
        &correlator,
        &space,
        &mut rng,
    )?;
    log::info!(
        "{backend} spectrum on {} frequencies in {:.3} s, integrated weight {:.6}",
        grid.len(),
        start_time.elapsed().as_secs_f64(),
        spectrum.integrate()
    );

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create output file {:?}", args.output))?;
    for (index, (&omega, value)) in spectrum
        .frequencies
        .iter()
        .zip(spectrum.values.iter())
        .enumerate()
    {
        writer.serialize(SpectrumRow {
            omega,
            real: value.re,
            imag: value.im,
            converged: !spectrum.unconverged.contains(&index),
        })?;
    }
    writer.flush()?;

    log::info!("Results written to {:?}", args.output);
    Ok(())
}
