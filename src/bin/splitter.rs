use std::fs;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use log::info;

use stimgen::partition::Partition;
use stimgen::verilog::ConstraintModule;

#[derive(Debug, Parser)]
#[command(author, version, about = "Split a constraint module into independent sub-modules")]
struct Cli {
    /// Constraint module to split.
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Directory receiving one split_<s>.v per component.
    #[arg(value_name = "DIR")]
    output_dir: PathBuf,
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

    let module = ConstraintModule::from_path(&args.input)
        .wrap_err_with(|| format!("failed to parse {}", args.input.display()))?;
    info!(
        "parsed {} variables and {} constraints",
        module.num_variables, module.num_constraints
    );

    let partition = Partition::build(&module);

    for s in 0..partition.set_count {
        let path = args.output_dir.join(format!("split_{}.v", s));
        fs::write(&path, partition.render_split(&module, s))
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;
    }

    println!(
        "Constraint module successfully split into {} separate modules.",
        partition.set_count
    );

    let time_total = time_total.elapsed();
    info!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
