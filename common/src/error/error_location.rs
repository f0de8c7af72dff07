use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location as PanicLocation;

/// Call-site coordinates captured at error construction time.
///
/// Every error enum in the workspace embeds one of these so log lines
/// point at the line that raised the error, not the line that
/// formatted it. Capture with [`ErrorLocation::caller`] from inside a
/// `#[track_caller]` chain.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ErrorLocation {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl ErrorLocation {
    /// Capture the location of the nearest `#[track_caller]` frame.
    #[track_caller]
    pub fn caller() -> Self {
        let location = PanicLocation::caller();
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl Display for ErrorLocation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "[{}:{}:{}]", self.file, self.line, self.column)
    }
}
