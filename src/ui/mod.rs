//! User interface module
//!
//! Styled status lines on stdout, errors and warnings on stderr. Plain
//! machine-readable output (such as `print-version`) is printed by `main`
//! directly.

pub mod formatter;

pub use formatter::{
    display_error, display_status, display_success, display_warning, format_deploy_result,
    format_version_change,
};
