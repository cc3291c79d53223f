// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! The cairn command line interface.
//!
//! Loads a TOP benchmark instance, optionally applies the sensitivity
//! transforms (adjusted fleet size, removed vertices), runs either the
//! exhaustive baseline or branch-and-price, and writes the KPI report as
//! YAML.

mod kpi;

use anyhow::Context;
use cairn_master::lp::MinilpOracle;
use cairn_model::index::VertexIndex;
use cairn_model::instance::Instance;
use cairn_model::loading::InstanceLoader;
use cairn_solver::enumerate::solve_by_enumeration;
use cairn_solver::params::SolverParams;
use cairn_solver::solver::BranchAndPrice;
use clap::{Parser, ValueEnum};
use kpi::KpiReport;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    /// Enumerate every elementary route and solve one integer master.
    #[value(name = "0")]
    Enumerate,
    /// Branch-and-price (the default).
    #[value(name = "1")]
    BranchAndPrice,
}

#[derive(Debug, Parser)]
#[command(name = "cairn", version, about = "Branch-and-price solver for the team orienteering problem")]
struct Cli {
    /// Instance file name.
    #[arg(short = 'n', long = "name", default_value = "p2.2.a.txt")]
    name: String,

    /// Folder containing the instance files.
    #[arg(short = 'p', long = "path", default_value = ".")]
    path: PathBuf,

    /// Output KPI file path (YAML); printed to stdout when absent.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Time limit in seconds.
    #[arg(short = 't', long = "time-limit", default_value_t = 3600)]
    time_limit: u64,

    /// Algorithm: 0 = enumerate, 1 = branch-and-price.
    #[arg(short = 'a', long = "algorithm", default_value = "1")]
    algorithm: Algorithm,

    /// Adjusted fleet size for sensitivity analysis.
    #[arg(short = 'f', long = "fleet-size")]
    fleet_size: Option<usize>,

    /// Vertices to remove for sensitivity analysis.
    #[arg(short = 'v', long = "remove-vertex", num_args = 1..)]
    remove_vertices: Vec<usize>,

    /// Verbose logging.
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let instance_path = cli.path.join(&cli.name);
    let instance = InstanceLoader::new()
        .from_path(&instance_path)
        .with_context(|| format!("failed to load instance {}", instance_path.display()))?;
    let instance = apply_sensitivity(instance, &cli)?;
    info!(%instance, "instance loaded");

    let report = match cli.algorithm {
        Algorithm::Enumerate => run_enumeration(&instance, &cli)?,
        Algorithm::BranchAndPrice => run_branch_and_price(&instance, &cli)?,
    };

    let yaml = report.to_yaml().context("failed to render the KPI report")?;
    match &cli.output {
        Some(path) => std::fs::write(path, &yaml)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", yaml),
    }

    Ok(())
}

/// Applies the sensitivity transforms requested on the command line.
fn apply_sensitivity(instance: Instance, cli: &Cli) -> Result<Instance, anyhow::Error> {
    let mut instance = instance;
    if let Some(fleet_size) = cli.fleet_size {
        anyhow::ensure!(fleet_size >= 1, "adjusted fleet size must be at least 1");
        instance = instance.with_fleet_size(fleet_size);
    }
    if !cli.remove_vertices.is_empty() {
        let vertices: Vec<VertexIndex> = cli
            .remove_vertices
            .iter()
            .map(|&index| VertexIndex::new(index))
            .collect();
        instance = instance
            .without_vertices(&vertices)
            .context("failed to remove vertices")?;
    }
    Ok(instance)
}

fn run_enumeration(instance: &Instance, cli: &Cli) -> Result<KpiReport, anyhow::Error> {
    let start = Instant::now();
    let (objective, routes) = solve_by_enumeration(instance, &mut MinilpOracle::new())
        .context("enumeration failed")?;
    info!(objective, routes = routes.len(), "enumeration finished");

    Ok(KpiReport {
        instance: cli.name.clone(),
        objective,
        num_created_nodes: 1,
        num_feasible_nodes: 1,
        max_parallel_solves: 1,
        time_seconds: start.elapsed().as_secs_f64(),
        dual_upper_bound: None,
    })
}

fn run_branch_and_price(instance: &Instance, cli: &Cli) -> Result<KpiReport, anyhow::Error> {
    let params = SolverParams::default().with_time_limit(Duration::from_secs(cli.time_limit));
    let solution = BranchAndPrice::new(instance, params)
        .solve()
        .context("branch-and-price failed")?;
    info!(%solution, "branch and price finished");

    Ok(KpiReport {
        instance: cli.name.clone(),
        objective: solution.objective,
        num_created_nodes: solution.num_created_nodes,
        num_feasible_nodes: solution.num_feasible_nodes,
        max_parallel_solves: solution.max_parallel_solves,
        time_seconds: solution.time_seconds,
        dual_upper_bound: solution.dual_upper_bound,
    })
}
