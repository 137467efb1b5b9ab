//! Terminal rendering utilities.
//!
//! Status lines go to stderr; counts go to stdout so they can be captured.

use console::{style, Emoji};
use srcvault_tree::{Direction, TreeStatus, WalkReport};

pub static CHECK: Emoji = Emoji("✓", "+");
pub static CROSS: Emoji = Emoji("✗", "x");
pub static WARN: Emoji = Emoji("⚠", "!");

/// Owner verified.
pub fn render_granted(enrolled: bool) {
    if enrolled {
        eprintln!(
            "{} Access granted {}",
            style(CHECK).green(),
            style("(device enrolled)").dim()
        );
    } else {
        eprintln!("{} Access granted", style(CHECK).green());
    }
}

/// Wrong passkey or unauthorized device.
pub fn render_denied() {
    eprintln!("{} Access denied", style(CROSS).red().bold());
}

/// Passkey entry aborted by the user.
pub fn render_aborted() {
    eprintln!("{} Aborted", style(WARN).yellow());
}

/// Final count of a walk.
pub fn render_report(direction: Direction, report: &WalkReport) {
    let verb = match direction {
        Direction::Lock => "Locked",
        Direction::Unlock => "Unlocked",
    };
    println!(
        "{} {} file(s) {}",
        verb,
        style(report.transformed).cyan(),
        style(format!("({} already {}ed)", report.unchanged, direction)).dim(),
    );
    if report.failed > 0 {
        eprintln!(
            "{} {} file(s) skipped; run with -v for details",
            style(WARN).yellow(),
            report.failed
        );
    }
}

/// Per-state counts of the managed files.
pub fn render_status(status: &TreeStatus, list: bool) {
    println!(
        "{} encrypted, {} plaintext",
        style(status.encrypted.len()).cyan(),
        style(status.plaintext.len()).cyan(),
    );
    if list {
        for path in &status.encrypted {
            println!("  {} {}", style("E").red(), path.display());
        }
        for path in &status.plaintext {
            println!("  {} {}", style("P").green(), path.display());
        }
    }
}
