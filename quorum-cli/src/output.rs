#![forbid(unsafe_code)]

use console::{style, Term};

pub struct Output {
    term: Term,
}

impl Output {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    pub fn success(&self, msg: &str) {
        let _ = self
            .term
            .write_line(&format!("{} {}", style("✓").green().bold(), msg));
    }

    pub fn error(&self, msg: &str) {
        let _ = self
            .term
            .write_line(&format!("{} {}", style("✗").red().bold(), msg));
    }

    pub fn warn(&self, msg: &str) {
        let _ = self
            .term
            .write_line(&format!("{} {}", style("!").yellow().bold(), msg));
    }

    pub fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    pub fn header(&self, msg: &str) {
        let _ = self.term.write_line(&format!("\n{}", style(msg).bold()));
    }

    pub fn field(&self, label: &str, value: &str) {
        let _ = self
            .term
            .write_line(&format!("  {}: {}", style(label).dim(), value));
    }

    pub fn key_field(&self, label: &str, value: &str) {
        let _ = self.term.write_line(&format!(
            "  {}: {}",
            style(label).dim(),
            style(value).yellow()
        ));
    }

    pub fn newline(&self) {
        let _ = self.term.write_line("");
    }

    pub fn table_header(&self, cols: &[(&str, usize)]) {
        let header: String = cols
            .iter()
            .map(|(name, width)| format!("{:<width$}", style(*name).bold(), width = width))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = self.term.write_line(&format!("\n{}", header));
        let _ = self.term.write_line(&"─".repeat(70));
    }

    pub fn table_row(&self, cols: &[(&str, usize, bool)]) {
        let row: String = cols
            .iter()
            .map(|(val, width, highlight)| {
                if *highlight {
                    format!("{:<width$}", style(*val).yellow(), width = width)
                } else {
                    format!("{:<width$}", val, width = width)
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        let _ = self.term.write_line(&row);
    }

    /// Machine-readable result on stdout, kept apart from the stderr chatter.
    pub fn emit(&self, value: &str) {
        println!("{value}");
    }

    pub fn share_notes(&self) {
        self.header("IMPORTANT NOTES:");
        let _ = self.term.write_line(&format!(
            "  • Hand each share to a {} holder",
            style("different").yellow()
        ));
        let _ = self
            .term
            .write_line("  • The shares are shown once and are not stored anywhere");
        let _ = self.term.write_line(&format!(
            "  • Anyone holding the threshold of shares can mint a {} credential",
            style("root").red().bold()
        ));
        self.newline();
    }

    pub fn revoke_hint(&self, accessor: &str) {
        self.newline();
        self.warn("A root credential was issued but could not be delivered.");
        self.info("Revoke it with:");
        let _ = self.term.write_line(&format!(
            "  {}",
            style(format!("quorum revoke --accessor {accessor}")).cyan()
        ));
    }
}
