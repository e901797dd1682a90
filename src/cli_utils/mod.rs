// Terminal helpers for the wallet-fleet CLI
pub mod formatting;
pub mod input;
pub mod menu;

pub use formatting::{format_record, format_table, print_header, print_section};
pub use input::Input;
pub use menu::{FleetOperation, Menu};

/// Result type for CLI operations
pub type CliResult<T> = std::result::Result<T, CliError>;

/// CLI error type
#[derive(Debug)]
pub enum CliError {
    ValidationError(String),
    UserCancelled,
    IoError(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            CliError::UserCancelled => write!(f, "Operation cancelled by user"),
            CliError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError(err.to_string())
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        CliError::IoError(err.to_string())
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    use colored::Colorize;
    eprintln!("{}", format!("✓ {}", message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    use colored::Colorize;
    eprintln!("{}", format!("ℹ {}", message).bright_cyan());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    use colored::Colorize;
    eprintln!("{}", format!("⚠ {}", message).yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    use colored::Colorize;
    eprintln!("{}", format!("✗ {}", message).red());
}
