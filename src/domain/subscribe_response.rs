use serde::Deserialize;
use serde::Serialize;

use crate::error_policy::INTERNAL_ERROR;

/// The JSON body returned for every subscribe request:
///
/// ```json
/// {"success": true}
/// {"success": false, "errors": ["Missing Email field"]}
/// ```
///
/// `errors` is present and non-empty iff `success` is false. The fields are
/// private so that only the two constructors can produce a value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubscribeResponse {
    success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

impl SubscribeResponse {
    pub fn success() -> Self {
        Self {
            success: true,
            errors: vec![],
        }
    }

    /// Returns `None` when there is nothing to report, so that a failure can
    /// never be built without at least one error
    pub fn failure(errors: Vec<String>) -> Option<Self> {
        (!errors.is_empty()).then_some(Self {
            success: false,
            errors,
        })
    }

    /// A failure carrying only the generic message
    pub fn internal_error() -> Self {
        Self {
            success: false,
            errors: vec![INTERNAL_ERROR.to_string()],
        }
    }

    pub fn is_success(&self) -> bool { self.success }

    pub fn errors(&self) -> &[String] { &self.errors }
}
