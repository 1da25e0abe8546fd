use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum AmalgamError {
	#[error(transparent)]
	#[diagnostic(code(amalgam::io_error))]
	Io(#[from] std::io::Error),

	#[error("unable to read fragment `{name}`")]
	#[diagnostic(
		code(amalgam::fragment_unreadable),
		help("check that `{name}` exists under the configured `source_dir`")
	)]
	FragmentUnreadable {
		name: String,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to write amalgamation to `{}`", path.display())]
	#[diagnostic(
		code(amalgam::sink_write_failure),
		help("the destination was left untouched; fix the problem and run again")
	)]
	SinkWriteFailure {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(amalgam::config_parse),
		help("check that amalgam.toml is valid TOML with `api`, `fragments` and `output` keys")
	)]
	ConfigParse(String),

	#[error("no config file found in `{}`", root.display())]
	#[diagnostic(
		code(amalgam::missing_config),
		help("run `amalgam init` to create a sample amalgam.toml")
	)]
	MissingConfig { root: PathBuf },

	#[error("invalid include guard: `{0}`")]
	#[diagnostic(
		code(amalgam::invalid_guard),
		help("a guard must start with a letter or `_` and contain only letters, digits and `_`")
	)]
	InvalidGuard(String),

	#[error("fragment names must not be empty")]
	#[diagnostic(code(amalgam::empty_fragment_name))]
	EmptyFragmentName,
}

pub type AmalgamResult<T> = Result<T, AmalgamError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
