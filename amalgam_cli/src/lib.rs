use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Pack a multi-file C library into one distributable header.",
	long_about = "amalgam reads the fragments listed in amalgam.toml, hoists and deduplicates \
	              their system includes, drops local includes and comments, and writes a \
	              single self-contained header guarded against multiple inclusion.\n\nQuick \
	              start:\n  amalgam init   Create a sample amalgam.toml\n  amalgam        \
	              Build the header\n  amalgam check  Verify the header is up to date"
)]
pub struct AmalgamCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Build the amalgamated header. This is the default command.
	///
	/// Reads the API fragment and every listed fragment in order, assembles
	/// the header in memory and writes it to the configured output path. If
	/// any fragment cannot be read nothing is written.
	Build(BuildArgs),
	/// Check that the header on disk matches what a build would produce.
	///
	/// Never writes. Exits with a non-zero status code when the header is
	/// missing or stale, which makes it suitable for CI.
	Check {
		/// Show a unified diff between the header on disk and the expected
		/// header.
		#[arg(long, default_value_t = false)]
		diff: bool,
	},
	/// Create a sample `amalgam.toml` in the project root.
	///
	/// If a config file already exists, this command is a no-op and exits
	/// successfully.
	Init,
}

#[derive(Args, Debug, Default, Clone)]
pub struct BuildArgs {
	/// Print the header to stdout instead of writing it.
	#[arg(long, default_value_t = false)]
	pub stdout: bool,

	/// Override the configured output path (relative to the project root).
	#[arg(long, short)]
	pub output: Option<PathBuf>,

	/// Override the include-guard macro.
	#[arg(long)]
	pub guard: Option<String>,

	/// Do not wrap the declarations in `extern "C"`.
	#[arg(long, default_value_t = false)]
	pub no_linkage: bool,
}
