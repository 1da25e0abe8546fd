use std::path::Path;
use std::path::PathBuf;
use std::process;

use amalgam_cli::AmalgamCli;
use amalgam_cli::BuildArgs;
use amalgam_cli::Commands;
use amalgam_core::AmalgamConfig;
use amalgam_core::AmalgamError;
use amalgam_core::AnyEmptyResult;
use amalgam_core::AnyResult;
use amalgam_core::DirectorySource;
use amalgam_core::FileSink;
use amalgam_core::Layout;
use amalgam_core::amalgamate;
use amalgam_core::build_document;
use clap::Parser;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

const SAMPLE_CONFIG: &str = r#"# amalgam configuration

# The public API header. It is emitted first, with its license banner and
# `@file` documentation block removed.
api = "api.h"

# Destination of the single-header build, relative to this file.
output = "dist/library.h"

# Directory holding the fragments, relative to this file.
source_dir = "src"

# Fragments in output order. A fragment that declares a type must come
# before every fragment that uses it.
fragments = [
  # "util.h",
  # "library.c",
]

# [header]
# guard = "LIBRARY_H"
# linkage = true
# prologue = "/* ... */"

# [filter]
# strip_file_docs = true
"#;

fn main() {
	let args = AmalgamCli::parse();

	// Respect NO_COLOR env var, --no-color flag and terminal support.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stdout).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Build(build)) => run_build(&args, build),
		Some(Commands::Check { diff }) => run_check(&args, *diff),
		Some(Commands::Init) => run_init(&args),
		None => run_build(&args, &BuildArgs::default()),
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<AmalgamError>() {
			Ok(amalgam_err) => {
				let report: miette::Report = (*amalgam_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Logs go to stderr so that `build --stdout` output stays clean.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.with_ansi(use_color)
		.with_writer(std::io::stderr)
		.init();
}

fn resolve_root(args: &AmalgamCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Load the project config and apply command-line overrides.
fn load_config(root: &Path, build: &BuildArgs) -> Result<AmalgamConfig, AmalgamError> {
	let mut config = AmalgamConfig::load(root)?.ok_or_else(|| {
		AmalgamError::MissingConfig {
			root: root.to_path_buf(),
		}
	})?;

	if let Some(output) = &build.output {
		config.output.clone_from(output);
	}
	if let Some(guard) = &build.guard {
		config.header.guard = Some(guard.clone());
	}
	if build.no_linkage {
		config.header.linkage = false;
	}

	tracing::debug!(
		root = %root.display(),
		fragments = config.fragments.len(),
		"loaded config"
	);
	Ok(config)
}

fn run_build(args: &AmalgamCli, build: &BuildArgs) -> AnyEmptyResult {
	let root = resolve_root(args);
	let config = load_config(&root, build)?;
	let manifest = config.manifest()?;
	let layout = Layout::from_config(&config)?;
	let source = DirectorySource::new(config.source_root(&root));

	if build.stdout {
		let document = build_document(&source, &manifest, &layout)?;
		print!("{}", document.as_str());
		return Ok(());
	}

	let output = config.output_path(&root);
	let mut sink = FileSink::new(&output);
	let document = amalgamate(&source, &mut sink, &manifest, &layout)?;

	println!(
		"{} {} ({} fragment(s), {} system include(s))",
		colored!("Wrote", green),
		make_relative(&output, &root),
		document.fragment_count(),
		document.system_includes().len()
	);
	if args.verbose {
		println!();
		println!("{}", colored!("System includes", bold));
		for target in document.system_includes() {
			println!("  <{target}>");
		}
	}

	Ok(())
}

fn run_check(args: &AmalgamCli, diff: bool) -> AnyEmptyResult {
	let root = resolve_root(args);
	let config = load_config(&root, &BuildArgs::default())?;
	let manifest = config.manifest()?;
	let layout = Layout::from_config(&config)?;
	let source = DirectorySource::new(config.source_root(&root));

	let expected = build_document(&source, &manifest, &layout)?;
	let output = config.output_path(&root);
	let rel_path = make_relative(&output, &root);

	let Some(current) = read_existing(&output)? else {
		eprintln!(
			"{} {rel_path} does not exist. Run `amalgam build` to create it.",
			colored!("✗", red)
		);
		process::exit(1);
	};

	if current == expected.as_str() {
		println!("{} {rel_path} is up to date.", colored!("✓", green));
		return Ok(());
	}

	eprintln!(
		"{} {rel_path} is out of date. Run `amalgam build` to regenerate it.",
		colored!("✗", red)
	);
	if diff {
		print_diff(&current, expected.as_str());
	}
	process::exit(1);
}

fn run_init(args: &AmalgamCli) -> AnyEmptyResult {
	let root = resolve_root(args);

	if let Some(existing) = AmalgamConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
		return Ok(());
	}

	let config_path = root.join("amalgam.toml");
	std::fs::write(&config_path, SAMPLE_CONFIG)?;
	println!("Created {}", config_path.display());
	println!();
	println!("Next steps:");
	println!("  1. Set `api` to your public header and list the fragments in order");
	println!("  2. Run `amalgam` to build the single header");
	println!("  3. Run `amalgam check` in CI to keep it in sync");

	Ok(())
}

/// Read `path`, or `None` when it does not exist yet.
fn read_existing(path: &Path) -> AnyResult<Option<String>> {
	match std::fs::read_to_string(path) {
		Ok(content) => Ok(Some(content)),
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
		Err(e) => Err(e.into()),
	}
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
