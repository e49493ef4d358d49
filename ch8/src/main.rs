use std::{path::PathBuf, process::ExitCode};

use ch8_base::machine::{
    BuilderError, InvalidOpcodePolicy, Key, Machine, MachineCallPolicy, MachineError, Step,
    TimerMode,
};
use clap::Parser;
use thiserror::Error;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum RunError {
    #[error("could not read ROM file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Builder(#[from] BuilderError),
    #[error("machine stopped after {cycles} cycles: {source}")]
    Machine { cycles: u64, source: MachineError },
}

/// Parse a single hexadecimal digit into a key.
fn parse_key(digit: &str) -> Result<Key, String> {
    let value = u8::from_str_radix(digit, 16).map_err(|err| err.to_string())?;
    Key::try_from(value).map_err(|_| format!("there is no key {}", digit))
}

#[derive(Debug, Parser)]
#[clap(version, about)]
struct CliOpts {
    /// The path to the file containing the ROM.
    /// The file's contents will be loaded into the machine's memory,
    /// starting at address 0x200.
    rom_file: PathBuf,
    /// Number of cycles to run before stopping.
    #[clap(short, long, default_value_t = 10_000)]
    cycles: u64,
    /// Cycles executed between two ticks of the delay and sound timers.
    /// With the common 600 Hz instruction rate this is 10 for the 60 Hz timers.
    #[clap(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    cycles_per_tick: u64,
    /// Seed for the random number instruction. Without one every run differs.
    #[clap(short, long)]
    seed: Option<u64>,
    /// Stop on invalid opcodes and machine code routine calls instead of skipping them.
    #[clap(long)]
    strict: bool,
    /// Count the timers down after every cycle as well.
    #[clap(long)]
    per_cycle_timers: bool,
    /// Keys (hex digits) held down for the whole run, e.g. `--keys 5,a`.
    #[clap(short, long, value_delimiter = ',', value_parser = parse_key)]
    keys: Vec<Key>,
    /// Print the display contents when the run ends.
    #[clap(short, long)]
    print_display: bool,
}

fn build_machine(cli_opts: &CliOpts) -> Result<Machine, RunError> {
    let program = std::fs::read(&cli_opts.rom_file).map_err(|source| RunError::Io {
        path: cli_opts.rom_file.clone(),
        source,
    })?;
    info!(len = program.len(), path = ?cli_opts.rom_file, "loaded ROM");

    let mut builder = Machine::builder().program(&program)?;
    if let Some(seed) = cli_opts.seed {
        builder = builder.seed(seed);
    }
    if cli_opts.strict {
        builder = builder
            .invalid_opcodes(InvalidOpcodePolicy::Halt)
            .machine_calls(MachineCallPolicy::Reject);
    }
    if cli_opts.per_cycle_timers {
        builder = builder.timer_mode(TimerMode::PerCycle);
    }

    let mut machine = builder.build();
    for &key in &cli_opts.keys {
        machine.press(key);
    }
    Ok(machine)
}

fn run(machine: &mut Machine, cli_opts: &CliOpts) -> Result<(), RunError> {
    let mut skipped = 0u64;
    let mut waiting = 0u64;

    for cycle in 0..cli_opts.cycles {
        match machine.run_cycle() {
            Ok(Step::Executed(_)) => {}
            Ok(Step::WaitingForKey) => waiting += 1,
            Ok(Step::SkippedInvalid(_)) => skipped += 1,
            Err(source) => {
                return Err(RunError::Machine {
                    cycles: cycle,
                    source,
                })
            }
        }

        if (cycle + 1) % cli_opts.cycles_per_tick == 0 {
            machine.tick_timers();
            debug!(
                delay = machine.state().delay_timer(),
                sound = machine.state().sound_timer(),
                "timers ticked"
            );
        }
    }

    info!(
        cycles = cli_opts.cycles,
        skipped,
        waiting,
        lit_pixels = machine.display().lit_pixel_count(),
        "run finished"
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli_opts = CliOpts::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut machine = match build_machine(&cli_opts) {
        Ok(machine) => machine,
        Err(err) => {
            error!(%err, "could not set up the machine");
            return ExitCode::FAILURE;
        }
    };
    let result = run(&mut machine, &cli_opts);

    if cli_opts.print_display {
        print!("{}", machine.display());
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "run failed");
            ExitCode::FAILURE
        }
    }
}
