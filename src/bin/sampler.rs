use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use stimgen::aig::Aag;
use stimgen::build::build;
use stimgen::count::PathCounts;
use stimgen::sample::Sampler;
use stimgen::solution::{reshape, Aggregate};
use stimgen::verilog::ConstraintModule;

#[derive(Debug, Parser)]
#[command(author, version, about = "Draw random satisfying assignments from per-split AAGs")]
struct Cli {
    /// Directory holding json2verilog.v and reordered_aags/.
    #[arg(value_name = "DIR")]
    input_dir: PathBuf,

    /// Seed for the random draws.
    #[arg(value_name = "INT")]
    random_seed: u64,

    /// Number of assignments to draw.
    #[arg(value_name = "INT")]
    solution_num: usize,

    /// Path of the aggregated JSON document.
    #[arg(value_name = "FILE")]
    output: PathBuf,

    /// Number of splits to process.
    #[arg(value_name = "INT")]
    split_num: usize,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();

    // The aggregate is shaped by the unsplit module, which still knows
    // every variable and its full width.
    let module_path = args.input_dir.join("json2verilog.v");
    let module = ConstraintModule::from_path(&module_path)
        .wrap_err_with(|| format!("failed to parse {}", module_path.display()))?;
    let mut aggregate = Aggregate::new(args.solution_num, &module.widths);

    for q in 0..args.split_num {
        info!("processing split {}", q);

        let aag_path = args
            .input_dir
            .join("reordered_aags")
            .join(format!("reordered_{}.aag", q));
        let aag = Aag::from_path(&aag_path)?;

        let samples = if aag.is_trivially_true() {
            // Nothing is constrained; every draw is the all-false default
            vec![vec![false; aag.header.i]; args.solution_num]
        } else {
            let circuit = build(&aag)?;
            let counts = PathCounts::compute(&circuit.bdd, circuit.root);
            let rng = ChaCha8Rng::seed_from_u64(args.random_seed);
            let mut sampler = Sampler::new(&circuit.bdd, &counts, rng);
            sampler.draw_many(circuit.root, circuit.num_inputs, args.solution_num)
        };

        let (_, widths) = aag.input_shape();
        aggregate.merge(&reshape(&samples, &aag.symbols, &widths));

        info!("split {} processed", q);
    }

    let file = File::create(&args.output)
        .wrap_err_with(|| format!("failed to create {}", args.output.display()))?;
    aggregate
        .to_document()
        .write(BufWriter::new(file))
        .wrap_err_with(|| format!("failed to write {}", args.output.display()))?;

    println!("Solutions generated and saved to {}", args.output.display());

    let time_total = time_total.elapsed();
    info!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
