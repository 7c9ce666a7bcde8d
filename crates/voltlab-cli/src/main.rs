//! voltlab command-line interface.
//!
//! Reads a netlist, runs the analyses its dot commands request, and prints
//! the `.print` variables as tab-separated tables.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use voltlab_engine::netlist::{self, AnalysisCommand};
use voltlab_engine::Session;

#[derive(Parser)]
#[command(name = "voltlab")]
#[command(about = "A SPICE-like circuit simulator", long_about = None)]
#[command(version)]
struct Cli {
    /// Input netlist file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let content = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read netlist: {}", cli.input.display()))?;

    let mut session = Session::new();
    let run = netlist::load_netlist(&mut session, &content)
        .map_err(|e| anyhow::anyhow!("parse error: {e}"))?;

    if cli.verbose {
        println!("devices: {}", session.circuit().devices().len());
        println!("analyses: {}", run.analyses.len());
        println!("print variables: {}", run.prints.join(" "));
        println!();
    }

    if run.analyses.is_empty() {
        println!("no analysis commands in netlist (add .dc, .tran, or .ac)");
        return Ok(());
    }

    let vars: Vec<&str> = run.prints.iter().map(String::as_str).collect();

    for analysis in &run.analyses {
        match analysis {
            AnalysisCommand::Dc {
                source,
                start,
                stop,
                step,
            } => {
                session
                    .run_dc_sweep(source, *start, *stop, *step)
                    .map_err(|e| anyhow::anyhow!("dc sweep failed: {e}"))?;
                print_table(source, &vars, &session.get_dc_results(&vars));
            }
            AnalysisCommand::Tran {
                t_stop,
                t_start,
                max_step,
            } => {
                session
                    .run_transient(*t_stop, *t_start, *max_step)
                    .map_err(|e| anyhow::anyhow!("transient failed: {e}"))?;
                print_table("time", &vars, &session.get_transient_results(&vars));
            }
            AnalysisCommand::Ac {
                omega_start,
                omega_stop,
                n_points,
            } => {
                session
                    .run_ac_sweep(*omega_start, *omega_stop, *n_points)
                    .map_err(|e| anyhow::anyhow!("ac sweep failed: {e}"))?;
                print_table("omega", &vars, &session.get_ac_results(&vars));
            }
        }
    }

    Ok(())
}

/// Print a sweep as a TSV table: one row per sweep point, one column per
/// variable that produced a series.
fn print_table(key_name: &str, vars: &[&str], results: &HashMap<String, Vec<(f64, f64)>>) {
    let columns: Vec<&str> = vars
        .iter()
        .copied()
        .filter(|v| results.contains_key(*v))
        .collect();
    if columns.is_empty() {
        println!("(no printable variables)");
        return;
    }

    println!("{}\t{}", key_name, columns.join("\t"));

    let n_rows = results[columns[0]].len();
    for row in 0..n_rows {
        let key = results[columns[0]][row].0;
        let mut line = format!("{key:.6e}");
        for col in &columns {
            line.push('\t');
            line.push_str(&format!("{:.6e}", results[*col][row].1));
        }
        println!("{line}");
    }
    println!();
}
