//! Terminal output utilities

use console::style;

/// Width of the banner rule
const RULE_WIDTH: usize = 52;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Print a header
pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold().underlined());
}

/// Print a title between two rules
pub fn banner(msg: &str) {
    let rule = "-".repeat(RULE_WIDTH);
    println!("{}", style(&rule).dim());
    println!("{}", style(msg).bold());
    println!("{}", style(&rule).dim());
}

/// Print a settings line, `key: [value]` with keys aligned
pub fn setting(key: &str, value: &str) {
    println!("{}: [{}]", style(format!("{:<25}", key)).dim(), value);
}

/// Print a list item
pub fn item(msg: &str) {
    println!("  - {}", msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}
