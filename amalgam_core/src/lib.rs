//! `amalgam_core` packs the fragments of a multi-file C library into one
//! self-contained header. Consumers add a single file to their project
//! instead of compiling the library.
//!
//! ## Processing Pipeline
//!
//! ```text
//! API fragment
//!   → Trimmer (drops the license banner and the `@file` doc block)
//! Ordered fragments
//!   → Filter (hoists `#include <...>`, drops `#include "..."`, cuts `//` comments, drops the banner)
//!   → Assembler (prologue, guard, `extern "C"`, API, includes, bodies, closers)
//!   → Sink (writes the finished header once)
//! ```
//!
//! All transformations are lexical and line based. The fragments are never
//! parsed, so comment markers inside string literals are treated like any
//! other text.
//!
//! ## Modules
//!
//! - [`config`]: Loading of `amalgam.toml` (API fragment, ordered fragment list, output path and header options).
//! - [`filter`]: Line classification and per-fragment filtering into a shared [`SystemIncludeSet`].
//! - [`trim`]: Banner and file-level documentation removal.
//!
//! ## Quick Start
//!
//! ```rust
//! use amalgam_core::Layout;
//! use amalgam_core::Manifest;
//! use amalgam_core::MemorySource;
//! use amalgam_core::build_document;
//!
//! let source = MemorySource::new()
//! 	.with("api.h", "/* license */\nvoid f(void);\n")
//! 	.with("f.c", "#include <stdio.h>\n#include \"api.h\"\nvoid f(void) { puts(\"f\"); } // hi\n");
//! let manifest = Manifest::new("api.h", vec!["f.c".to_string()]).unwrap();
//! let layout = Layout::new("F_H").unwrap();
//!
//! let document = build_document(&source, &manifest, &layout).unwrap();
//! assert!(document.as_str().contains("#include <stdio.h>\n"));
//! assert!(!document.as_str().contains("api.h"));
//! ```

pub use assemble::*;
pub use config::AmalgamConfig;
pub use config::Manifest;
pub use error::*;
pub use filter::FilterOptions;
pub use filter::Fragment;
pub use filter::SystemIncludeSet;
pub use source::*;

mod assemble;
pub mod config;
#[allow(unused_assignments)]
mod error;
pub mod filter;
mod source;
pub mod trim;
