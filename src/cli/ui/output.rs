use console::style;

/// Status lines for interactive commands. `quiet` keeps only errors.
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✓").green(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    pub fn step(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("→").cyan(), message);
        }
    }

    /// Dimmed, indented follow-up to the previous line
    pub fn detail(&self, message: &str) {
        if !self.quiet {
            for line in message.lines() {
                println!("  {}", style(line).dim());
            }
        }
    }

    pub fn list(&self, lines: &[String]) {
        if !self.quiet {
            for line in lines {
                println!("  {}", line);
            }
        }
    }

    pub fn header(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold().underlined());
        }
    }

    pub fn section(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold());
            println!("{}", "─".repeat(40));
        }
    }

    /// Unstyled block, printed even when quiet (reports the user asked for)
    pub fn plain(&self, text: &str) {
        println!("{}", text);
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new(false)
    }
}
