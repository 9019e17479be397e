//! Text views.
//!
//! Each view fetches what it needs through [`crate::api::StudioClient`],
//! keeps its own state and renders to a `String`; the binary decides where
//! the text goes.

pub mod content_plan;
pub mod dashboard;
pub mod header;
pub mod highlight_card;
pub mod not_found;
pub mod upload;
pub mod video_detail;

use crate::routes::Route;
use std::io::{self, BufRead, Write};

pub const DELETE_PROMPT: &str =
    "Are you sure you want to delete this video? This action cannot be undone.";

/// Asks the user to approve a destructive action
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Prompts on stderr and reads a `y`/`yes` answer from stdin
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        let mut stderr = io::stderr();
        if write!(stderr, "{} [y/N] ", prompt)
            .and_then(|_| stderr.flush())
            .is_err()
        {
            return false;
        }

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Approves everything (`--yes`)
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

/// Full-view error state with a way back
pub fn render_error_view(heading: &str, message: &str, back_label: &str, back: &Route) -> String {
    format!("!! {}\n{}\n\n-> {}: {}\n", heading, message, back_label, back)
}

/// Text progress bar, `width` cells wide
pub fn progress_bar(percent: u8, width: usize) -> String {
    let filled = width * usize::from(percent.min(100)) / 100;
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        percent
    )
}
