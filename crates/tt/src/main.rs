//! tt - TurboTask CLI
//!
//! Interactive front end over the macro engine: record into slots, bind
//! hotkeys, tune repeat policies, replay. Backspace is the panic key and
//! always stops every running playback; Ctrl+C does the same without
//! exiting.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use turbotask_engine::prelude::*;

#[derive(Parser)]
#[command(name = "tt")]
#[command(about = "TurboTask - hotkey-driven input macro recorder")]
#[command(version)]
struct Cli {
    /// Number of macro slots
    #[arg(long, default_value_t = DEFAULT_SLOTS)]
    slots: usize,
    /// Verbose engine logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "turbotask_engine=debug,tt=debug"
    } else {
        "turbotask_engine=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let engine = Arc::new(MacroEngine::start(cli.slots).context("starting macro engine")?);

    let panic_engine = engine.clone();
    ctrlc::set_handler(move || {
        panic_engine.stop_all();
        eprintln!("\nstopped all playback");
    })?;

    println!(
        "TurboTask: {} slots. Backspace stops all playback at any time.",
        cli.slots
    );
    print_help();

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match run_command(&engine, line.trim()) {
            Ok(true) => break,
            Ok(false) => {}
            Err(e) => eprintln!("error: {}", e),
        }
    }

    engine.shutdown();
    Ok(())
}

/// Execute one prompt line. Returns true when the session should end.
fn run_command(engine: &MacroEngine, line: &str) -> Result<bool> {
    let mut parts = line.split_whitespace();
    match parts.next() {
        None => {}
        Some("record") => {
            let slot = parse_slot(parts.next())?;
            engine.toggle_recording(slot)?;
        }
        Some("hotkey") => {
            let slot = parse_slot(parts.next())?;
            engine.set_hotkey_request(slot)?;
            println!("press the key to bind to slot {}", slot);
        }
        Some("repeat") => {
            let slot = parse_slot(parts.next())?;
            let value = parts.next().unwrap_or("1");
            let forever = value.eq_ignore_ascii_case("forever");
            engine.set_repeat_policy(slot, RepeatPolicy::from_input(value, forever))?;
        }
        Some("status") => print_json(&engine.status()),
        Some("stop") => engine.stop_all(),
        Some("help") => print_help(),
        Some("quit") | Some("exit") => return Ok(true),
        Some(other) => eprintln!("unknown command: {} (try 'help')", other),
    }
    Ok(false)
}

fn parse_slot(arg: Option<&str>) -> Result<usize> {
    arg.context("missing slot index")?
        .parse()
        .context("slot index must be a number")
}

fn print_json<T: serde::Serialize>(output: &T) {
    println!("{}", serde_json::to_string_pretty(output).unwrap());
}

fn print_help() {
    println!("commands:");
    println!("  record <slot>            start/stop recording (stop replays once)");
    println!("  hotkey <slot>            bind the next key press to a slot");
    println!("  repeat <slot> <n|forever>  set the slot's repeat policy");
    println!("  status                   show all slots as JSON");
    println!("  stop                     stop all playback");
    println!("  quit                     shut down and exit");
}
