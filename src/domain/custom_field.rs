use htmlescape::encode_minimal;
use serde::Deserialize;

use super::Sanitizer;

/// An extra form field forwarded to the provider as a merge variable, e.g.
///
/// ```yaml
/// - name: "subscribe-first-name"
///   label: "First Name"
///   merge_tag: "FNAME"
///   required: true
/// ```
#[derive(Deserialize, Debug, Clone)]
pub struct CustomField {
    /// Name of the form input; must not collide with the built-in
    /// `subscribe-email`/`subscribe-nonce`/`action` fields
    pub name: String,
    /// Placeholder text, and the name used in "Missing ... field"
    pub label: String,
    /// Provider-side tag the value is stored under
    pub merge_tag: String,
    #[serde(default = "default_input_type")]
    pub input_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub sanitizer: Sanitizer,
    /// When non-empty, the field is rendered as a `<select>` with these
    /// options instead of an `<input>`
    #[serde(default)]
    pub options: Vec<String>,
}

fn default_input_type() -> String { "text".to_string() }

impl CustomField {
    /// Markup contributed to the form. Every interpolated value is escaped;
    /// the result is sanitized again along with the rest of the form.
    pub fn html(&self) -> String {
        let name = encode_minimal(&self.name);
        let label = encode_minimal(&self.label);
        if self.options.is_empty() {
            return format!(
                r#"<input class="{name}-field" name="{name}" type="{}" placeholder="{label}" />"#,
                encode_minimal(&self.input_type),
            );
        }
        let options: String = self
            .options
            .iter()
            .map(|o| {
                let o = encode_minimal(o);
                format!(r#"<option value="{o}">{o}</option>"#)
            })
            .collect();
        format!(
            r#"<select class="{name}-field" name="{name}"><option value="">{label}</option>{options}</select>"#
        )
    }

    pub fn missing_message(&self) -> String { format!("Missing {} field", self.label) }
}
