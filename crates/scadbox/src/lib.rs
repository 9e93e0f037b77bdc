//! scadbox: sandboxed project-file access for agent tools
//!
//! Lets an external caller list, read, create, append to and overwrite files
//! inside a single project directory. Filenames can never resolve outside
//! that directory, existing files are only replaced on explicit request, and
//! hidden entries never show up in listings.
//!
//! ```rust,no_run
//! use scadbox::ProjectFiles;
//!
//! # fn main() -> scadbox::Result<()> {
//! let files = ProjectFiles::new("/path/to/project")?;
//! files.write_file("box.scad", "cube(10);", false)?;
//! files.append_to_file("box.scad", "\nsphere(5);")?;
//! for entry in files.list_files(Some("scad"))? {
//!     println!("{}", entry.name);
//! }
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
mod listing;
mod locks;
mod resolver;

pub use engine::{AppendOutcome, ProjectFiles, WriteAction, WriteOutcome};
pub use error::{ErrorKind, FsError, Result};
pub use listing::{ExtensionFilter, ListingEntry};
pub use locks::PathLocks;
pub use resolver::{PathResolver, ResolvedPath};
