// ============================================================================
// src/ui.rs – Console presentation (status lines, panels, code display)
// ============================================================================

use console::{style, Style};
use qrcodegen::{QrCode, QrCodeEcc};

use crate::totp::{OtpResult, STEP_SECS};

pub const BAR_WIDTH: usize = 30;

/// Status output for humans. Everything goes to stderr except the code
/// itself, which callers print to stdout.
#[derive(Debug, Clone, Default)]
pub struct UX {
    pub quiet: bool,
}

impl UX {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn banner(&self, title: &str) {
        if self.quiet {
            return;
        }
        let rule = "═".repeat(title.chars().count() + 4);
        let frame = Style::new().color256(39).bold();
        eprintln!("{}", frame.apply_to(format!("╔{rule}╗")));
        eprintln!("{}", frame.apply_to(format!("║  {title}  ║")));
        eprintln!("{}", frame.apply_to(format!("╚{rule}╝")));
    }

    pub fn info(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("•").cyan().bold(), msg);
        }
    }

    pub fn note(&self, msg: &str) {
        if !self.quiet {
            eprintln!("  {}", style(msg).dim());
        }
    }

    pub fn success(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("✔").green().bold(), msg);
        }
    }

    /// Warnings and errors print even in quiet mode.
    pub fn warn(&self, msg: &str) {
        eprintln!("{} {}", style("!").yellow().bold(), style(msg).yellow());
    }

    pub fn error(&self, msg: &str) {
        eprintln!("{} {}", style("✖").red().bold(), style(msg).red());
    }

    /// Labelled key/value block.
    pub fn data_panel(&self, title: &str, rows: &[(&str, String)]) {
        if self.quiet {
            return;
        }
        let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        eprintln!("{}", style(format!("── {title} ──")).bold());
        for (k, v) in rows {
            eprintln!("  {}  {}", style(format!("{k:<width$}")).dim(), v);
        }
    }

    /// Big code, validity bar, and a warning when the window is nearly over.
    pub fn otp_panel(&self, otp: &OtpResult, warn_below: u64) {
        if self.quiet {
            return;
        }
        eprintln!();
        eprintln!("{}", style("== 2FA ONE-TIME PASSWORD ==").bold());
        eprintln!("Code: {}", style(otp.display_code()).green().bold());
        eprintln!("Valid for: {} seconds", otp.remaining);
        eprintln!("[{}]", progress_bar(otp.remaining, BAR_WIDTH));
        if otp.remaining <= warn_below {
            self.warn("Code expiring soon");
        }
    }
}

/// Filled cells for the share of the window still left.
pub fn progress_bar(remaining: u64, width: usize) -> String {
    let remaining = remaining.min(STEP_SECS) as usize;
    let filled = width * remaining / STEP_SECS as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Render `text` as a QR code with half-block characters (two rows per line).
pub fn render_qr(text: &str) -> Option<String> {
    let qr = QrCode::encode_text(text, QrCodeEcc::Medium).ok()?;
    let border = 2;
    let size = qr.size();
    let dark = |x: i32, y: i32| qr.get_module(x, y);

    let mut out = String::new();
    let mut y = -border;
    while y < size + border {
        for x in -border..size + border {
            let ch = match (dark(x, y), dark(x, y + 1)) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            };
            out.push(ch);
        }
        out.push('\n');
        y += 2;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(progress_bar(30, 30), "█".repeat(30));
        assert_eq!(progress_bar(15, 30), format!("{}{}", "█".repeat(15), "░".repeat(15)));
        assert_eq!(progress_bar(1, 30), format!("█{}", "░".repeat(29)));
        assert_eq!(progress_bar(0, 10), "░".repeat(10));
        assert_eq!(progress_bar(99, 10), "█".repeat(10));
    }

    #[test]
    fn qr_has_square_footprint() {
        let art = render_qr("otpauth://totp/acct?secret=JBSWY3DPEHPK3PXP").unwrap();
        let lines: Vec<_> = art.lines().collect();
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
        // two module rows per text line
        assert_eq!(lines.len(), (width + 1) / 2);
    }
}
