use crate::domain::SubscribeResponse;

/// Which part of the form is visible. Mirrors what the client script does
/// with a JSON response, so that a browser without scripting ends up looking
/// at the same thing:
///
/// - `Idle`: input fields shown, both response panels hidden
/// - `Succeeded`: fields hidden, success panel shown
/// - `Failed`: fields hidden, error panel shown, listing every error
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Idle,
    Succeeded,
    Failed(Vec<String>),
}

impl FormState {
    /// Used by the template to pick the visible section
    pub fn name(&self) -> &'static str {
        match self {
            FormState::Idle => "idle",
            FormState::Succeeded => "succeeded",
            FormState::Failed(_) => "failed",
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            FormState::Failed(errors) => errors,
            _ => &[],
        }
    }
}

impl From<SubscribeResponse> for FormState {
    fn from(value: SubscribeResponse) -> Self {
        match value.is_success() {
            true => FormState::Succeeded,
            false => FormState::Failed(value.errors().to_vec()),
        }
    }
}
