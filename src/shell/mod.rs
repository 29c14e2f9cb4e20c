//! UI sinks the research agent reports into, and the terminal implementation.

mod console;

pub use console::{ConsoleShell, Input, read_input};

use crate::research::{Phase, Report};

/// Output side of the user interface.
///
/// The agent calls these while a run progresses; implementations decide how to render.
pub trait Shell {
    /// A long-running phase has started.
    fn progress(&mut self, phase: Phase, message: &str);
    fn success(&mut self, message: &str);
    fn warning(&mut self, message: &str);
    fn error(&mut self, message: &str);
    /// The question about to be searched.
    fn question(&mut self, question: &str);
    /// Display the finished report and offer it for download.
    fn deliver(&mut self, report: &Report);
}
