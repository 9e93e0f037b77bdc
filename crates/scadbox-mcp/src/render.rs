//! Text formatting of file operation results for the model.

use scadbox::{AppendOutcome, ListingEntry, WriteAction, WriteOutcome};

fn scad_marker(name: &str) -> &'static str {
    if name.ends_with(".scad") { " [OpenSCAD]" } else { "" }
}

/// Listing with OpenSCAD files surfaced ahead of everything else.
pub fn listing(entries: &[ListingEntry], extension: Option<&str>) -> String {
    if entries.is_empty() {
        return match extension {
            Some(ext) => format!("No files found matching '*.{ext}'."),
            None => "No files found.".to_string(),
        };
    }

    let (scad, other): (Vec<_>, Vec<_>) = entries.iter().partition(|e| e.is_scad());
    let mut out = String::from("Files in project:");
    if !scad.is_empty() {
        out.push_str("\n\nOpenSCAD files:");
        for entry in scad {
            out.push_str("\n- ");
            out.push_str(&entry.name);
        }
    }
    if !other.is_empty() {
        out.push_str("\n\nOther files:");
        for entry in other {
            out.push_str("\n- ");
            out.push_str(&entry.name);
            if entry.is_dir {
                out.push('/');
            }
        }
    }
    out
}

/// File content framed by a header line.
pub fn file_content(name: &str, content: &str) -> String {
    format!(
        "File: {name} ({} characters){}\n---\n{content}\n---",
        content.chars().count(),
        scad_marker(name)
    )
}

/// Confirmation of a write.
pub fn written(name: &str, outcome: &WriteOutcome) -> String {
    let action = match outcome.action {
        WriteAction::Created => "created",
        WriteAction::Overwritten => "overwritten",
    };
    format!(
        "File '{name}'{} was {action} ({} bytes).",
        scad_marker(name),
        outcome.bytes
    )
}

/// Confirmation of an append.
pub fn appended(name: &str, outcome: &AppendOutcome) -> String {
    format!(
        "Appended {} bytes to '{name}'{} (now {} bytes).",
        outcome.bytes,
        scad_marker(name),
        outcome.len
    )
}
