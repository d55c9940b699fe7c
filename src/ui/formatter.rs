//! Pure formatting functions for UI output.
//!
//! Functions here only print; prompting lives in the parent module.

use console::style;

use crate::orchestrator::{ReleaseFailure, ReleaseOutcome, ReleaseOutputs};
use crate::warning::ReleaseWarning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a non-fatal release warning.
pub fn display_warning(warning: &ReleaseWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Display the version change about to be released.
///
/// # Arguments
/// * `previous` - Latest released version (`v0.0.0` on a first release)
/// * `next` - The version that will be tagged
pub fn display_proposed_version(previous: &str, next: &str) {
    println!("\n{}", style("Proposed Release:").bold());
    println!("  From: {}", style(previous).red());
    println!("  To:   {}", style(next).green());
}

fn display_outputs(outputs: &ReleaseOutputs) {
    for (name, value) in outputs.entries() {
        println!("  {:<18} {}", style(name).cyan(), value);
    }
}

/// Display the result of a completed run, warnings included.
pub fn display_outcome(outcome: &ReleaseOutcome) {
    for warning in &outcome.warnings {
        display_warning(warning);
    }

    match (&outcome.outputs.version, outcome.outputs.released) {
        (_, true) => display_success(&format!(
            "Released {}",
            outcome.outputs.tag_name.as_deref().unwrap_or_default()
        )),
        (Some(version), false) if outcome.dry_run => {
            display_status(&format!("Dry run: would release {}", version))
        }
        _ => display_status("Nothing to release"),
    }

    println!("\n{}", style("Outputs:").bold());
    display_outputs(&outcome.outputs);
}

/// Display a failed run: the error, the stage reached and any warnings.
pub fn display_failure(failure: &ReleaseFailure) {
    for warning in &failure.warnings {
        display_warning(warning);
    }
    display_error(&failure.source.to_string());
    eprintln!("  last completed stage: {}", failure.stage);

    if let Some(tag) = &failure.outputs.tag_name {
        if failure.outputs.released {
            eprintln!("  release for {} exists; rerun to finish", tag);
        } else {
            eprintln!("  rerunning will recreate tag {}", tag);
        }
    }
}
