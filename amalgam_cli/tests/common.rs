use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn amalgam_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("amalgam"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}

/// Lay out a small library: an API header and two fragments under `src/`.
#[allow(dead_code)]
pub fn write_project(root: &Path, fragments: &[&str]) -> std::io::Result<()> {
	let src = root.join("src");
	std::fs::create_dir_all(&src)?;
	std::fs::write(
		src.join("api.h"),
		"/*\n * Copyright (c) example\n */\n\n/**\n * @file\n * @brief public api\n */\n\nint \
		 lib_b(void);\n",
	)?;
	std::fs::write(src.join("a.h"), "#include <stdio.h>\nint a;\n")?;
	std::fs::write(
		src.join("b.c"),
		"#include <stdio.h>\n#include \"a.h\"\nint b = a; // note\nint lib_b(void) { return b; }\n",
	)?;

	let list = fragments
		.iter()
		.map(|name| format!("\"{name}\""))
		.collect::<Vec<_>>()
		.join(", ");
	std::fs::write(
		root.join("amalgam.toml"),
		format!("api = \"api.h\"\noutput = \"dist/lib.h\"\nsource_dir = \"src\"\nfragments = [{list}]\n"),
	)?;

	Ok(())
}
