/// Shown instead of the real reason for token and configuration failures
/// when not in debug mode
pub const INTERNAL_ERROR: &str = "Internal error. Please try again later.";

/// Decides how much of an internal failure is shown to the visitor.
/// Validation and provider errors are always shown as-is (the visitor can act
/// on them); token and configuration errors go through `reveal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    Verbose,
    Generic,
}

impl ErrorPolicy {
    pub fn from_debug_flag(debug: bool) -> Self {
        match debug {
            true => Self::Verbose,
            false => Self::Generic,
        }
    }

    pub fn reveal(
        self,
        detail: &str,
    ) -> String {
        match self {
            Self::Verbose => detail.to_owned(),
            Self::Generic => INTERNAL_ERROR.to_owned(),
        }
    }
}
