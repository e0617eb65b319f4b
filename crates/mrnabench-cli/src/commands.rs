pub mod bench;
pub mod validate;

use crate::utils::progress::CliProgressHandler;
use std::path::Path;

/// Options given before the subcommand that every command honours.
#[derive(Debug, Clone, Copy)]
pub struct Globals<'a> {
    pub config_path: Option<&'a Path>,
    pub set_values: &'a [String],
    pub quiet: bool,
}

impl Globals<'_> {
    fn progress_handler(&self) -> CliProgressHandler {
        if self.quiet {
            CliProgressHandler::hidden()
        } else {
            CliProgressHandler::new()
        }
    }
}
