//! faultmesh CLI - run a single migration strategy or a batch manifest
//!
//! Binary: faultmesh

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use faultmesh::batch::{run_manifest, write_csv};
use faultmesh::config::RunConfig;
use faultmesh::evaluator::evaluate;
use faultmesh::graph::ShortestPathOracle;
use faultmesh::init::initialize;
use faultmesh::loader::{load_agents, load_graph, load_tasks};
use faultmesh::strategies;

/// faultmesh - task redistribution engine for faulted multi-agent networks
#[derive(Parser)]
#[command(name = "faultmesh")]
#[command(about = "Compare HGTM, MPFTM, GBMA and MMLMA migration strategies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one algorithm against one {tasks, agents, graph} triple
    Run {
        /// Task file path
        #[arg(long)]
        tasks: String,

        /// Agent (robot) file path
        #[arg(long)]
        agents: String,

        /// Graph edge file path
        #[arg(long)]
        graph: String,

        /// Migration strategy: hgtm, mpftm, gbma, or mmlma
        #[arg(long)]
        algorithm: String,

        /// Fraction of agents to fault
        #[arg(long, default_value_t = RunConfig::default().fault_ratio)]
        fault_ratio: f64,

        /// RNG seed for the interaction-level draw
        #[arg(long, default_value_t = RunConfig::default().seed)]
        seed: u64,

        /// Append the result row to this CSV file
        #[arg(long)]
        out: Option<String>,
    },

    /// Run all four algorithms against every triple listed in a manifest file
    Batch {
        /// Manifest file: one "tasks agents graph" line per triple
        #[arg(long)]
        manifest: String,

        /// Write result rows to this CSV file
        #[arg(long, default_value = "results.csv")]
        out: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "faultmesh=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { tasks, agents, graph, algorithm, fault_ratio, seed, out } => {
            let agent_list = load_agents(&agents)?;
            let agent_ids: Vec<u64> = agent_list.iter().map(|a| a.id).collect();
            let task_list = load_tasks(&tasks)?;
            let graph = load_graph(&graph, &agent_ids)?;

            let config = RunConfig { fault_ratio, seed, ..RunConfig::default() };
            let init_result = initialize(task_list, agent_list, config.fault_ratio, config.seed);
            let mut world = init_result.world;
            let oracle = ShortestPathOracle::new(&graph);
            let strategy = strategies::by_name(&algorithm)?;

            let started = std::time::Instant::now();
            let migrations = strategy.migrate(&mut world, &graph, &oracle, config);
            let elapsed = started.elapsed();

            let record = evaluate(strategy.name(), &world, &oracle, &migrations, config.eval_weights, elapsed);
            println!("{}", serde_json::to_string_pretty(&record)?);

            if let Some(out) = out {
                write_csv(out, std::slice::from_ref(&record))?;
            }

            info!(algorithm = strategy.name(), migrations = migrations.len(), "run complete");
        }

        Commands::Batch { manifest, out } => {
            let records = run_manifest(&manifest, RunConfig::default())?;
            info!(runs = records.len(), "batch complete");
            write_csv(&out, &records)?;
        }
    }

    Ok(())
}
