//! Allow-list HTML filter applied to the rendered form.
//!
//! Tags not on the list are dropped (their text content is kept), except
//! `<script>` and `<style>` whose content is dropped as well. Attributes not
//! on the list for their tag are dropped, and so are comments. URL attributes
//! must be relative or use one of the allowed schemes.

use std::collections::HashMap;
use std::collections::HashSet;

use ammonia::Builder;
use ammonia::UrlRelative;
use once_cell::sync::Lazy;

/// An `ammonia` cleaner configured for subscription forms
pub struct AllowList(Builder<'static>);

const COMMON: &[&str] = &["class", "id", "hidden", "title"];

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Tags whose content is dropped along with the tag
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

static FORM_ALLOW_LIST: Lazy<AllowList> = Lazy::new(|| {
    let mut tags: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    tags.insert("form", &["class", "id", "action", "method", "hidden"]);
    tags.insert(
        "input",
        &["type", "class", "id", "name", "placeholder", "value", "required"],
    );
    tags.insert("select", &["class", "id", "name", "required"]);
    tags.insert("option", &["value", "selected"]);
    tags.insert("label", &["class", "id", "for"]);
    tags.insert("button", &["class", "id", "type", "name", "value"]);
    tags.insert("a", &["class", "id", "href", "title", "rel"]);
    for tag in [
        "div", "span", "p", "ul", "ol", "li", "h1", "h2", "h3", "h4", "h5", "h6", "strong", "em",
        "b", "i", "br", "fieldset", "legend",
    ] {
        tags.insert(tag, COMMON);
    }

    let mut builder = Builder::empty();
    builder
        .tags(tags.keys().copied().collect())
        .tag_attributes(
            tags.iter()
                .map(|(tag, attributes)| (*tag, attributes.iter().copied().collect()))
                .collect(),
        )
        .url_schemes(ALLOWED_SCHEMES.iter().copied().collect())
        .url_relative(UrlRelative::PassThrough)
        .clean_content_tags(RAW_TEXT_TAGS.iter().copied().collect::<HashSet<_>>())
        // `rel` is listed for `<a>`, so ammonia must not manage it
        .link_rel(None)
        .strip_comments(true);
    AllowList(builder)
});

/// The tags and attributes a subscription form is allowed to contain
pub fn form_allow_list() -> &'static AllowList { &FORM_ALLOW_LIST }

impl AllowList {
    pub fn sanitize(
        &self,
        html: &str,
    ) -> String {
        self.0.clean(html).to_string()
    }
}
