/// Status-line reporting for loaded STL files
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::{self, Write};
use std::path::Path;
use stlview_core::{display_name, StlError, StlFile};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Result of loading one file, as shown to the user.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(StlFile),
    /// The file produced no geometry; counts read as zero.
    Failed { name: String, error: StlError },
}

impl LoadOutcome {
    pub fn load(path: &Path) -> Self {
        match StlFile::open(path) {
            Ok(file) => LoadOutcome::Loaded(file),
            Err(error) => LoadOutcome::Failed {
                name: display_name(path),
                error,
            },
        }
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            LoadOutcome::Loaded(file) => file.vertex_count(),
            LoadOutcome::Failed { .. } => 0,
        }
    }

    pub fn triangle_count(&self) -> usize {
        match self {
            LoadOutcome::Loaded(file) => file.triangle_count(),
            LoadOutcome::Failed { .. } => 0,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, LoadOutcome::Failed { .. })
    }
}

/// Log filter for the CLI.
///
/// A non-empty, valid `rust_log` wins outright; otherwise the level comes
/// from the `-v` count (WARN, INFO, then DEBUG).
pub fn log_filter(verbose: u8, rust_log: Option<&str>) -> EnvFilter {
    if let Some(filter) = rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
    {
        return filter;
    }

    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    EnvFilter::default().add_directive(level.into())
}

/// Write one colored status line for `outcome`.
pub fn write_status<W: Write>(writer: &mut W, outcome: &LoadOutcome) -> io::Result<()> {
    match outcome {
        LoadOutcome::Loaded(file) => {
            writer.queue(SetForegroundColor(Color::Yellow))?;
            writer.queue(Print(format!("{} ({})", file, file.format)))?;
        }
        LoadOutcome::Failed { name, error } => {
            writer.queue(SetForegroundColor(Color::Red))?;
            writer.queue(Print(format!(
                "Failed: {} | Vertices: {} | Faces: {} | {}",
                name,
                outcome.vertex_count(),
                outcome.triangle_count(),
                error
            )))?;
        }
    }
    writer.queue(ResetColor)?;
    writer.queue(Print('\n'))?;
    writer.flush()
}
