//! Solve steady 1D advection in a Galerkin-Difference space with a cut last element.
//!
//! Usage: gd-advection [OPTIONS]
//!
//! Run `gd-advection --help` for available options.
//! Set `RUST_LOG=info` (or `debug`, `trace`) for progress output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use gdspace::advection::{solve_advection, AdvectionParams};
use gdspace::io;

#[derive(Parser)]
#[command(name = "gd-advection")]
#[command(author, version, about = "Steady advection with Galerkin-Difference cut cells", long_about = None)]
struct Cli {
    /// Order of the dense DG elements
    #[arg(short, long, default_value = "1")]
    order: usize,

    /// Degree of the GD reconstruction (defaults to the element order)
    #[arg(short, long)]
    degree: Option<usize>,

    /// The last element represents 1/cutsize of its length
    #[arg(short = 's', long = "cutsize", default_value = "1")]
    cut_size: f64,

    /// Number of mesh elements
    #[arg(short = 'n', long = "elements", default_value = "20")]
    elements: usize,

    /// Advection velocity
    #[arg(long, default_value = "-1", allow_negative_numbers = true)]
    velocity: f64,

    /// Use single-threaded execution
    #[arg(long)]
    sequential: bool,

    /// Write the reduced stiffness matrix as row/column/value triplets
    #[arg(long, default_value = "stiffmat_GD.txt")]
    stiffness_output: PathBuf,

    /// Write the mesh and prolongated solution as VTK
    #[arg(long, default_value = "dgAdvection_GD.vtk")]
    vtk_output: PathBuf,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let params = AdvectionParams {
        order: cli.order,
        degree: cli.degree.unwrap_or(cli.order),
        elements: cli.elements,
        cut_size: cli.cut_size,
        velocity: cli.velocity,
        parallel: !cli.sequential,
        ..Default::default()
    };
    log::info!("{params:?}");

    let start = Instant::now();
    let velocity = params.velocity;
    let solution = solve_advection(&params, f64::exp, move |x| velocity * x.exp())?;
    let elapsed = start.elapsed();

    let mut file = BufWriter::new(File::create(&cli.stiffness_output)?);
    io::write_triplets(&mut file, &solution.stiffness)?;
    file.flush()?;
    log::info!("stiffness matrix written to {}", cli.stiffness_output.display());

    let mut file = BufWriter::new(File::create(&cli.vtk_output)?);
    io::write_vtk(
        &mut file,
        solution.gd.space(),
        Some((&solution.dense, "dgAdvSolution_GD")),
    )?;
    file.flush()?;
    log::info!("solution written to {}", cli.vtk_output.display());

    println!("number of elements: {}", params.elements);
    println!("number of unknowns: {}", solution.gd.true_vsize());
    println!("mesh size, h = {}", params.length / params.elements as f64);
    println!("cut element length: {}", params.cut_scale());
    println!("L2 error: {:e}", solution.l2_error);
    println!("solved in {:.2?}", elapsed);

    Ok(())
}
