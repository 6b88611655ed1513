// SPDX-License-Identifier: Apache-2.0

//! Binary that compiles a list of gate instances into a DIMACS CNF file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use xlsynth_faultcnf::cnf::{Formula, write_dimacs};
use xlsynth_faultcnf::compile::{CompileReport, GateInstance, compile_gates, compile_gates_parallel};
use xlsynth_faultcnf::descriptor::load_descriptor_from_path;
use xlsynth_faultcnf::dispatch::DispatchTable;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Cell-library descriptor (JSON).
    #[arg(long)]
    descriptor: PathBuf,

    /// Gate instances to compile (JSON array of {name, cell, output_pin, pins}).
    #[arg(long)]
    gates: PathBuf,

    /// Where to write the DIMACS output; stdout if absent.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Encode gates on worker threads.
    #[arg(long, default_value_t = false)]
    #[arg(action = clap::ArgAction::Set)]
    parallel: bool,

    /// Run varisat on the compiled formula and report SAT/UNSAT.
    #[arg(long, default_value_t = false)]
    #[arg(action = clap::ArgAction::Set)]
    solve: bool,

    /// Emit the clauses of the gates that did compile even if some failed.
    #[arg(long, default_value_t = false)]
    #[arg(action = clap::ArgAction::Set)]
    keep_going: bool,
}

fn load_gates(path: &Path) -> Result<Vec<GateInstance>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading gate instances '{}'", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("decoding gate instances '{}'", path.display()))
}

fn run(args: &Args) -> Result<()> {
    let descriptor = load_descriptor_from_path(&args.descriptor)?;
    let table = DispatchTable::from_descriptor(&descriptor)?;
    let gates = load_gates(&args.gates)?;

    let mut formula = Formula::new();
    let report: CompileReport = if args.parallel {
        compile_gates_parallel(&table, &gates, None, &mut formula)
    } else {
        compile_gates(&table, &gates, &mut formula)
    };
    for (gate, e) in &report.failures {
        log::error!("{}: {}", gate, e);
    }
    if !report.is_success() && !args.keep_going {
        return Err(anyhow!(
            "{} of {} gates failed to compile",
            report.failures.len(),
            gates.len()
        ));
    }

    if args.solve {
        match formula.solve(&[]) {
            Ok(Some(_)) => log::info!("formula is SAT"),
            Ok(None) => log::info!("formula is UNSAT"),
            Err(e) => return Err(anyhow!("solver error: {:?}", e)),
        }
    }

    let clauses = formula.into_clause_set();
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating output '{}'", path.display()))?;
            let mut out = BufWriter::new(file);
            write_dimacs(&mut out, &clauses, 0)?;
            out.flush()?;
            log::info!("wrote {} clauses to '{}'", clauses.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            write_dimacs(&mut out, &clauses, 0)?;
        }
    }
    Ok(())
}

fn main() {
    let _ = env_logger::builder().try_init();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
