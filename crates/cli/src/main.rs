//! Tomasulo scheduling simulator CLI.
//!
//! This binary provides a single entry point for all simulation modes. It performs:
//! 1. **Stepped run:** Tick manually until the program drains, printing every cycle.
//! 2. **Live run:** Drive the machine from the real-time clock and print published snapshots.
//! 3. **Check:** Decode a program and validate it against a configuration without running it.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use tomasim_core::sim::clock::ClockState;
use tomasim_core::sim::loader::load_program_file;
use tomasim_core::{Config, Controller, SimError, Simulator, Snapshot};

#[derive(Parser, Debug)]
#[command(
    name = "tomasim",
    author,
    version,
    about = "Tomasulo scheduling simulator",
    long_about = "Load an arithmetic program and watch it flow through reservation stations, \
functional units and the common data bus.\n\nExamples:\n  tomasim run program.asm\n  \
tomasim run program.asm --config machine.json --format json\n  tomasim live program.asm --rate 20\n  \
tomasim check program.asm"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Step the machine manually until the program drains.
    Run {
        /// Program text file.
        program: PathBuf,

        /// JSON machine configuration (defaults if omitted).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Stop after this many cycles even if the program has not drained.
        #[arg(short, long, default_value_t = 10_000)]
        ticks: u64,

        /// Snapshot output format.
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Print statistics at the end; optionally restrict to sections (summary, stalls).
        #[arg(long, num_args = 0.., value_delimiter = ',')]
        stats: Option<Vec<String>>,
    },

    /// Run on the real-time clock until the program drains.
    Live {
        /// Program text file.
        program: PathBuf,

        /// JSON machine configuration (defaults if omitted).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Clock rate in ticks per second (overrides the configuration).
        #[arg(short, long)]
        rate: Option<f64>,

        /// Snapshot output format.
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Decode and validate a program without running it.
    Check {
        /// Program text file.
        program: PathBuf,

        /// JSON machine configuration (defaults if omitted).
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Human-readable table per cycle.
    Text,
    /// One JSON object per line.
    Json,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            program,
            config,
            ticks,
            format,
            stats,
        } => cmd_run(&program, config.as_deref(), ticks, format, stats.as_deref()),
        Commands::Live {
            program,
            config,
            rate,
            format,
        } => cmd_live(&program, config.as_deref(), rate, format),
        Commands::Check { program, config } => cmd_check(&program, config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("\n[!] FATAL: {e}");
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, SimError> {
    path.map_or_else(|| Ok(Config::default()), Config::from_file)
}

fn print_snapshot(snapshot: &Snapshot, format: Format) {
    match format {
        Format::Text => println!("{snapshot}"),
        Format::Json => match serde_json::to_string(snapshot) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("[!] could not encode snapshot: {e}"),
        },
    }
}

/// Loads the program and ticks until it drains or `ticks` cycles elapse.
fn cmd_run(
    program: &Path,
    config: Option<&Path>,
    ticks: u64,
    format: Format,
    stats: Option<&[String]>,
) -> Result<(), SimError> {
    let config = load_config(config)?;
    let mut sim = Simulator::new(&config)?;
    sim.load_program(load_program_file(program)?)?;

    print_snapshot(&sim.snapshot(ClockState::Stopped), format);
    while !sim.is_drained() && sim.cycle() < ticks {
        let _ = sim.tick();
        print_snapshot(&sim.snapshot(ClockState::Stopped), format);
    }
    if !sim.is_drained() {
        eprintln!("[!] not drained after {ticks} cycles");
    }

    if let Some(sections) = stats {
        sim.stats().print_sections(sections);
    }
    Ok(())
}

/// Runs the program on the real-time clock, printing each published snapshot.
fn cmd_live(
    program: &Path,
    config: Option<&Path>,
    rate: Option<f64>,
    format: Format,
) -> Result<(), SimError> {
    let config = load_config(config)?;
    let controller = Controller::new(&config)?;
    if let Some(r) = rate {
        controller.set_rate(r)?;
    }

    let (tx, rx) = mpsc::channel::<Snapshot>();
    let _ = controller.subscribe("cli", move |s| {
        let _ = tx.send(s.clone());
    });

    controller.load_program(load_program_file(program)?)?;
    controller.start()?;

    let idle = Duration::from_secs_f64((4.0 / controller.clock_rate()).max(1.0));
    loop {
        match rx.recv_timeout(idle) {
            Ok(snapshot) => {
                print_snapshot(&snapshot, format);
                if snapshot.clock == ClockState::Running && snapshot.is_drained() {
                    break;
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if controller.is_drained() {
                    break;
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    controller.stop();
    let _ = controller.unsubscribe("cli");
    controller.stats().print();
    Ok(())
}

/// Decodes the program and checks it against the configured register file.
fn cmd_check(program: &Path, config: Option<&Path>) -> Result<(), SimError> {
    let config = load_config(config)?;
    let instructions = load_program_file(program)?;
    let mut sim = Simulator::new(&config)?;
    let count = instructions.len();
    sim.load_program(instructions)?;

    println!("[*] {}: {count} instructions OK", program.display());
    for inst in sim.engine().queue().iter() {
        println!("    {inst}");
    }
    Ok(())
}
