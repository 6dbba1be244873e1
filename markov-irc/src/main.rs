use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use log::{debug, error, info};

use markov_core::brain::Brain;
use markov_core::irc::serve;
use markov_core::random::RngSource;
use markov_core::walker::ChainWalker;

/// Answers `recipient [seed words...]` lines from stdin with generated
/// IRC `PRIVMSG` lines on stdout.
#[derive(Parser, Debug)]
#[command(name = "markov-irc", version, about)]
struct Cli {
	/// Path to the brain (SQLite table `brain(keyword, chain1, chain2)`)
	brain: PathBuf,

	/// Fixed seed for the random generator (reproducible output)
	#[arg(long, value_name = "SEED")]
	rng_seed: Option<u64>,

	/// Load the brain from `<brain file>.bin` next to it, writing that snapshot first if missing
	#[arg(long)]
	cache: bool,
}

/// Main entry point.
///
/// Exits with 1, without writing to stdout, when the brain argument is
/// missing or the brain cannot be opened. An empty brain also stops the
/// stream with 1 rather than emitting garbage.
fn main() -> ExitCode {
	env_logger::init();

	let cli = match Cli::try_parse() {
		Ok(cli) => cli,
		Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
			let _ = e.print();
			return ExitCode::SUCCESS;
		}
		Err(e) => {
			debug!("invalid arguments: {e}");
			return ExitCode::from(1);
		}
	};

	let brain = match Brain::open(&cli.brain, cli.cache) {
		Ok(brain) => brain,
		Err(e) => {
			error!("{e}");
			return ExitCode::from(1);
		}
	};

	let rng = match cli.rng_seed {
		Some(seed) => RngSource::seeded(seed),
		None => RngSource::from_os(),
	};
	let mut walker = ChainWalker::new(brain, rng);

	match serve(&mut walker, io::stdin().lock(), io::stdout().lock()) {
		Ok(answered) => {
			info!("input closed after {answered} records");
			ExitCode::SUCCESS
		}
		Err(e) => {
			error!("{e}");
			ExitCode::from(1)
		}
	}
}
