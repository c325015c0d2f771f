use indexmap::IndexMap;

/// Insertion-ordered dictionary.
pub type Dict = IndexMap<String, Value>;

/// A string scalar plus whether it was written with quotes.
///
/// Equality with plain text goes through [`PbxString::matches`], which
/// ignores the quoting flag and any quote characters a caller embedded in
/// the text itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PbxString {
    text: String,
    quoted: bool,
}

impl PbxString {
    /// A string that is quoted only when its content requires it.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: false,
        }
    }

    /// A string that is always written with quotes.
    pub fn quoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: true,
        }
    }

    pub(crate) fn from_parts(text: String, quoted: bool) -> Self {
        Self { text, quoted }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// True when the written form must be quoted.
    pub fn needs_quotes(&self) -> bool {
        self.quoted || !is_bare_safe(&self.text)
    }

    /// Compare against `other`, treating `Foo` and `"Foo"` as equal.
    pub fn matches(&self, other: &str) -> bool {
        unquote(&self.text) == unquote(other)
    }
}

impl From<&str> for PbxString {
    fn from(s: &str) -> Self {
        PbxString::new(s)
    }
}

impl From<String> for PbxString {
    fn from(s: String) -> Self {
        PbxString::new(s)
    }
}

/// Strip one pair of surrounding double quotes, if present.
pub(crate) fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(s)
}

/// Characters Xcode writes without quotes.
pub(crate) fn is_bare_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '/' | ':' | '.')
}

/// Characters accepted in unquoted strings when reading.
pub(crate) fn is_unquoted_char(c: char) -> bool {
    is_bare_char(c) || matches!(c, '-' | '+')
}

fn is_bare_safe(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_bare_char) && !s.contains("//") && !s.contains("/*")
}

/// A parsed pbxproj value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(PbxString),
    Array(Vec<Value>),
    Dict(Dict),
    Data(Vec<u8>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(PbxString::new(s))
    }

    pub fn quoted(s: impl Into<String>) -> Self {
        Value::String(PbxString::quoted(s))
    }

    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::Array(items.into_iter().map(Value::string).collect())
    }

    pub fn empty_dict() -> Self {
        Value::Dict(Dict::new())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_pbx_string(&self) -> Option<&PbxString> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Dictionary lookup; `None` for non-dictionaries.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_dict().and_then(|d| d.get(key))
    }

    /// String items of an array, skipping anything that is not a string.
    pub fn string_items(&self) -> Vec<&str> {
        self.as_array()
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<PbxString> for Value {
    fn from(s: PbxString) -> Self {
        Value::String(s)
    }
}

impl From<Dict> for Value {
    fn from(d: Dict) -> Self {
        Value::Dict(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_ignores_quotes() {
        let bare = PbxString::new("ShareExt");
        let quoted = PbxString::quoted("ShareExt");
        let embedded = PbxString::new("\"ShareExt\"");
        for s in [&bare, &quoted, &embedded] {
            assert!(s.matches("ShareExt"));
            assert!(s.matches("\"ShareExt\""));
            assert!(!s.matches("ShareExtension"));
        }
    }

    #[test]
    fn bare_safety() {
        assert!(!PbxString::new("AppDelegate.m").needs_quotes());
        assert!(PbxString::new("$(SRCROOT)/x").needs_quotes());
        assert!(PbxString::new("").needs_quotes());
        assert!(PbxString::new("<group>").needs_quotes());
        assert!(PbxString::new("com.apple.product-type.app-extension").needs_quotes());
        assert!(PbxString::new("UIView+Ext.h").needs_quotes());
        assert!(PbxString::new("a//b").needs_quotes());
        assert!(PbxString::quoted("Debug").needs_quotes());
    }

    #[test]
    fn string_items_skips_non_strings() {
        let v = Value::Array(vec![Value::string("A"), Value::empty_dict(), Value::string("B")]);
        assert_eq!(v.string_items(), vec!["A", "B"]);
        assert!(Value::string("x").string_items().is_empty());
    }
}
