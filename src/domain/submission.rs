use std::collections::HashMap;

/// Discriminator field; every AJAX post names the action it wants
pub const ACTION_FIELD: &str = "action";
pub const SUBSCRIBE_ACTION: &str = "mailchimp_ajax_subscribe";
pub const NONCE_FIELD: &str = "subscribe-nonce";
pub const EMAIL_FIELD: &str = "subscribe-email";

/// A raw form post: field name -> value, exactly as the browser sent it.
/// Nothing in here has been validated or sanitized yet.
#[derive(Debug, Default, Clone)]
pub struct Submission(HashMap<String, String>);

impl Submission {
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Like `get`, but treats whitespace-only values as absent (an empty text
    /// input is still posted, with an empty value)
    pub fn non_empty(
        &self,
        name: &str,
    ) -> Option<&str> {
        self.get(name).filter(|v| !v.trim().is_empty())
    }
}

impl From<HashMap<String, String>> for Submission {
    fn from(value: HashMap<String, String>) -> Self { Self(value) }
}

impl<K, V> FromIterator<(K, V)> for Submission
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
