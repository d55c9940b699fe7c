//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive prompts and user input handling

use std::io::{self, Write};

use crate::error::Result;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_error, display_failure, display_outcome, display_proposed_version, display_status,
    display_success, display_warning,
};

/// Prompts user to confirm an action with a yes/no prompt.
///
/// Accepts "y" or "yes" (case-insensitive) as confirmation.
/// Default is "no" if user presses Enter.
///
/// # Arguments
/// * `prompt` - The prompt message to display (without the "(y/N): " suffix)
///
/// # Returns
/// * `Ok(true)` - If user entered "y" or "yes"
/// * `Ok(false)` - Otherwise (including Enter, or "n"/"no")
/// * `Err` - If input error occurs
pub fn confirm_action(prompt: &str) -> Result<bool> {
    print!("\n{} (y/N): ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(is_confirmation(&input))
}

fn is_confirmation(input: &str) -> bool {
    let response = input.trim().to_lowercase();
    response == "y" || response == "yes"
}
