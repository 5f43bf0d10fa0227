//! Logging utilities with colored module prefixes.
//!
//! The compiler itself stays silent; only the `render` convenience path
//! reports diagnostics before returning the error to the caller.
//!
//! # Example
//!
//! ```ignore
//! log!("compile"; "template failed at line {}", line);
//! ```

use colored::{ColoredString, Colorize};
use std::io::{Write, stderr};

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a message with a colored module prefix to stderr.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let mut stderr = stderr().lock();
    writeln!(stderr, "{prefix} {message}").ok();
}

/// Apply color to a module prefix based on module type.
#[inline]
fn colorize_prefix(module: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "error" => prefix.bright_red().bold(),
        "render" => prefix.bright_green().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}
