//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use console::style;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print vault names, one per line, marking the active vault with `*`.
pub fn print_vault_names(names: &[&str], active: Option<&str>) {
    if names.is_empty() {
        info("No vaults yet.");
        tip("Run `clam vault add <NAME>` to create one.");
        return;
    }

    for name in names {
        if Some(*name) == active {
            println!("{} {}", style("*").green().bold(), style(name).bold());
        } else {
            println!("  {name}");
        }
    }
}
