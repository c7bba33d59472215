use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use airfidelity_replay::{replay, Scenario};

/// Replay an audio device scenario through the arbitration engine.
#[derive(Debug, Parser)]
#[command(name = "airfidelity-replay", version, about)]
struct Args {
    /// Scenario file (JSON).
    scenario: PathBuf,

    /// Print the full transcript as JSON instead of one line per step.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let result = Scenario::load(&args.scenario).and_then(|scenario| replay(&scenario));
    let transcript = match result {
        Ok(transcript) => transcript,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&transcript) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                log::error!("failed to serialize transcript: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        for entry in &transcript.entries {
            println!("{}", entry.summary_line());
        }
    }

    ExitCode::SUCCESS
}
