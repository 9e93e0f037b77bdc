//! scadbox CLI - run project file operations from the shell
//!
//! Usage:
//!   scadbox ls [--ext scad]                List project files
//!   scadbox cat FILE                       Print a file
//!   scadbox write FILE [--overwrite]       Write stdin (or --content) to FILE
//!   scadbox append FILE                    Append stdin (or --content) to FILE

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use scadbox::ProjectFiles;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Sandboxed file operations on an OpenSCAD project
#[derive(Parser, Debug)]
#[command(name = "scadbox")]
struct Args {
    /// Project directory all operations are confined to
    #[arg(long, env = "SCADBOX_ROOT", default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// List the entries of the project root
    Ls {
        /// Only list files with this extension
        #[arg(long)]
        ext: Option<String>,
    },
    /// Print a file
    Cat {
        /// File relative to the project root
        file: String,
    },
    /// Create a file, or replace it with --overwrite
    Write {
        /// File relative to the project root
        file: String,
        /// Replace the file if it exists
        #[arg(long)]
        overwrite: bool,
        /// Content to write (read from stdin when omitted)
        #[arg(long)]
        content: Option<String>,
    },
    /// Append to an existing file
    Append {
        /// File relative to the project root
        file: String,
        /// Content to append (read from stdin when omitted)
        #[arg(long)]
        content: Option<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<scadbox::FsError>() {
                Some(fs_err) => eprintln!("scadbox: {}: {}", fs_err.kind(), fs_err),
                None => eprintln!("scadbox: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let files = ProjectFiles::new(&args.root)?;
    let mut stdout = io::stdout().lock();

    match args.command {
        Cmd::Ls { ext } => {
            for entry in files.list_files(ext.as_deref())? {
                let suffix = if entry.is_dir { "/" } else { "" };
                writeln!(stdout, "{}{}", entry.name, suffix)?;
            }
        }
        Cmd::Cat { file } => {
            stdout.write_all(&files.read_bytes(&file)?)?;
        }
        Cmd::Write {
            file,
            overwrite,
            content,
        } => {
            let content = content_or_stdin(content)?;
            let outcome = files.write_file(&file, content, overwrite)?;
            tracing::debug!(?outcome, "write finished");
        }
        Cmd::Append { file, content } => {
            let content = content_or_stdin(content)?;
            files.append_to_file(&file, content)?;
        }
    }

    stdout.flush()?;
    Ok(())
}

fn content_or_stdin(content: Option<String>) -> io::Result<Vec<u8>> {
    match content {
        Some(text) => Ok(text.into_bytes()),
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}
