//! Civitas - Entry Point
//!
//! Seeds a settlement (or loads a snapshot), runs ticks on a tokio runtime
//! and prints what happened. With `--interactive` it drops into a small
//! command loop for stepping the world and prompting agents by hand.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use tokio::runtime::Runtime;

use civitas::core::config::SimConfig;
use civitas::core::error::Result;
use civitas::core::random::SeededRandom;
use civitas::core::types::GridPos;
use civitas::ecs::snapshot::Snapshot;
use civitas::ecs::world::{census, World};
use civitas::llm::oracle::{DecisionOracle, LlmOracle, NullOracle};
use civitas::simulation::tick::Simulation;

#[derive(Debug, Parser)]
#[command(name = "civitas", about = "Run a small simulated society")]
struct Args {
    /// Seed for world generation and every random draw
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Ticks to run before exiting (or before the prompt in interactive mode)
    #[arg(long, default_value_t = 10)]
    ticks: u64,

    /// Settlers in a freshly generated world
    #[arg(long, default_value_t = 8)]
    agents: usize,

    /// TOML file overriding simulation constants
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start from a saved snapshot instead of a new settlement
    #[arg(long)]
    snapshot_in: Option<PathBuf>,

    /// Write a snapshot when the run ends
    #[arg(long)]
    snapshot_out: Option<PathBuf>,

    /// Read commands from stdin after the initial ticks
    #[arg(long)]
    interactive: bool,

    /// Never contact the language model, even if LLM_API_KEY is set
    #[arg(long)]
    offline: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("civitas=info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    let mut rng = SeededRandom::new(args.seed);
    let world = match &args.snapshot_in {
        Some(path) => Snapshot::load(path)?.into_world()?,
        None => World::settlement(&config, args.agents, &mut rng),
    };
    tracing::info!(seed = args.seed, agents = world.agent_count(), "civitas starting");
    let mut sim = Simulation::new(world, config, Box::new(rng));

    let rt = Runtime::new()?;
    let oracle = if args.offline { None } else { LlmOracle::from_env().ok() };
    match oracle {
        Some(oracle) => rt.block_on(drive(&mut sim, &oracle, &args))?,
        None => {
            tracing::warn!("no language model configured - agents will stay silent");
            rt.block_on(drive(&mut sim, &NullOracle, &args))?
        }
    }

    if let Some(path) = &args.snapshot_out {
        Snapshot::capture(&sim.world).save(path)?;
        println!("Saved snapshot to {}", path.display());
    }
    Ok(())
}

async fn drive<O: DecisionOracle>(sim: &mut Simulation, oracle: &O, args: &Args) -> Result<()> {
    run_ticks(sim, oracle, args.ticks).await;
    display_status(&sim.world);
    if args.interactive {
        repl(sim, oracle).await?;
    }
    Ok(())
}

async fn run_ticks<O: DecisionOracle>(sim: &mut Simulation, oracle: &O, n: u64) {
    for _ in 0..n {
        for event in sim.tick(oracle).await {
            println!("{}", event);
        }
    }
}

async fn repl<O: DecisionOracle>(sim: &mut Simulation, oracle: &O) -> Result<()> {
    println!();
    println!("Commands:");
    println!("  tick / t              - Advance one tick");
    println!("  run <n>               - Run n ticks");
    println!("  status / s            - Show every agent");
    println!("  spawn <name>          - Add a settler at the centre");
    println!("  prompt <name> <text>  - Ask an agent to do something");
    println!("  save <path>           - Write a snapshot");
    println!("  quit / q              - Exit");

    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        let (command, rest) = input.split_once(' ').unwrap_or((input, ""));
        let rest = rest.trim();

        match command {
            "" => continue,
            "quit" | "q" => break,
            "tick" | "t" => run_ticks(sim, oracle, 1).await,
            "run" => match rest.parse::<u64>() {
                Ok(n) => {
                    run_ticks(sim, oracle, n).await;
                    println!("Now at tick {}.", sim.world.current_tick);
                }
                Err(_) => println!("Usage: run <number>"),
            },
            "status" | "s" => display_detailed_status(&sim.world),
            "spawn" if !rest.is_empty() => {
                let env = &sim.world.environment;
                let centre = GridPos::new(env.width / 2, env.height / 2);
                let id = sim.world.spawn_agent(rest, centre, &sim.config);
                println!("Spawned {} ({})", rest, id);
            }
            "prompt" => prompt(sim, oracle, rest).await,
            "save" if !rest.is_empty() => match Snapshot::capture(&sim.world).save(rest) {
                Ok(()) => println!("Saved to {}", rest),
                Err(e) => println!("Could not save: {}", e),
            },
            _ => println!("Unknown command. Available: tick, run <n>, status, spawn <name>, prompt <name> <text>, save <path>, quit"),
        }
    }

    println!(
        "\nGoodbye! {} of {} agents alive after {} ticks.",
        sim.world.store.living_count(),
        sim.world.agent_count(),
        sim.world.current_tick
    );
    Ok(())
}

async fn prompt<O: DecisionOracle>(sim: &mut Simulation, oracle: &O, rest: &str) {
    let Some((name, text)) = rest.split_once(' ') else {
        println!("Usage: prompt <name> <text>");
        return;
    };
    let Some(id) = sim.world.store.find_agent_by_name(name).map(|a| a.id) else {
        println!("No agent named {}", name);
        return;
    };
    match sim.prompt_agent(id, text.trim(), oracle).await {
        Ok(Some(executed)) => {
            println!("{} chose {}: {}", name, executed.action, executed.outcome.message);
            for event in executed.events.iter().skip(1) {
                println!("  {}", event);
            }
        }
        Ok(None) => println!("{} does nothing.", name),
        Err(e) => println!("Cannot prompt {}: {}", name, e),
    }
}

fn display_status(world: &World) {
    println!();
    print!("--- Tick {} |", world.current_tick);
    for (kind, count) in census(world) {
        print!(" {} {}", kind, count);
    }
    println!(" ---");
    if let Some(leader) = world.government.leader.and_then(|id| world.store.agent(id)) {
        println!("  Leader: {}", leader.name);
    }
    println!();
}

fn display_detailed_status(world: &World) {
    display_status(world);
    for agent in world.store.agents() {
        let state = if !agent.is_alive() {
            "dead"
        } else if agent.is_imprisoned() {
            "jailed"
        } else {
            "alive"
        };
        let (need, level) = agent.needs.most_pressing();
        println!(
            "{} ({}) at ({}, {}) - {} | health {:.0} | age {:.0} | {:?} {:.0} | {} coins",
            agent.name,
            agent.id,
            agent.position.x,
            agent.position.y,
            state,
            agent.health,
            agent.age,
            need,
            level,
            agent.currency
        );
    }
    println!();
}
