//! Placeholder substitution for the extension's template files.

pub const DISPLAY_NAME: &str = "__DISPLAY_NAME__";
pub const BUNDLE_IDENTIFIER: &str = "__BUNDLE_IDENTIFIER__";
pub const GROUP_IDENTIFIER: &str = "__GROUP_IDENTIFIER__";
pub const BUNDLE_SHORT_VERSION_STRING: &str = "__BUNDLE_SHORT_VERSION_STRING__";
pub const BUNDLE_VERSION: &str = "__BUNDLE_VERSION__";
pub const URL_SCHEME: &str = "__URL_SCHEME__";
pub const UNIFORM_TYPE_IDENTIFIER: &str = "__UNIFORM_TYPE_IDENTIFIER__";

pub const DEFAULT_URL_SCHEME: &str = "openwithcxm";
pub const DEFAULT_UNIFORM_TYPE_IDENTIFIER: &str = "public.data";

/// Values the standard tokens resolve to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenValues {
    /// Xcode project name, e.g. `HelloCordova`.
    pub display_name: String,
    /// `widget/@id` from config.xml.
    pub app_id: String,
    /// Appended to the app id for the app group, e.g. `.shareextension`.
    pub bundle_suffix: String,
    pub short_version: String,
    pub bundle_version: String,
    pub url_scheme: String,
    pub uniform_type_identifier: String,
}

impl TokenValues {
    pub fn group_identifier(&self) -> String {
        format!("group.{}{}", self.app_id, self.bundle_suffix)
    }
}

/// Ordered token → value pairs.
///
/// Replacement runs in table order over the whole text, one token at a time,
/// so a value may itself contain a later token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenTable {
    entries: Vec<(String, String)>,
}

impl TokenTable {
    pub fn standard(values: &TokenValues) -> Self {
        let entries = [
            (DISPLAY_NAME, values.display_name.clone()),
            (BUNDLE_IDENTIFIER, "$(PRODUCT_BUNDLE_IDENTIFIER)".to_string()),
            (GROUP_IDENTIFIER, values.group_identifier()),
            (BUNDLE_SHORT_VERSION_STRING, values.short_version.clone()),
            (BUNDLE_VERSION, values.bundle_version.clone()),
            (URL_SCHEME, values.url_scheme.clone()),
            (UNIFORM_TYPE_IDENTIFIER, values.uniform_type_identifier.clone()),
        ];
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    /// Add or override tokens. Extra tokens with an existing name replace
    /// the value in place; new ones are appended. Empty names are ignored.
    pub fn with_extra<I, K, V>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in extra {
            let key = key.into();
            if key.is_empty() {
                continue;
            }
            let value = value.into();
            match self.entries.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => self.entries.push((key, value)),
            }
        }
        self
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == token)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every token occurrence, returning the new text and the number
    /// of replacements made.
    pub fn substitute(&self, text: &str) -> (String, u64) {
        let mut out = text.to_string();
        let mut count = 0u64;
        for (token, value) in &self.entries {
            let hits = out.matches(token.as_str()).count() as u64;
            if hits > 0 {
                out = out.replace(token.as_str(), value);
                count += hits;
            }
        }
        (out, count)
    }
}
