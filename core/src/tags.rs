//! Declarative per-field metadata.
//!
//! Field metadata uses the conventional struct-tag syntax: space-separated
//! `key:"value"` pairs, where the value is a double-quoted string that may
//! contain backslash escapes.
//!
//! ```
//! use schema_synth_core::FieldTags;
//!
//! let tags = FieldTags::parse(r#"json:"name,omitempty" xml:"name,attr" validate:"required""#);
//! assert_eq!(tags.lookup("json"), Some("name,omitempty"));
//! assert_eq!(tags.lookup("xml"), Some("name,attr"));
//! assert_eq!(tags.lookup("example"), None);
//! ```

/// Tag key for the JSON serialization name.
pub const JSON_TAG: &str = "json";
/// Tag key for XML serialization metadata.
pub const XML_TAG: &str = "xml";
/// Tag key for a literal example value.
pub const EXAMPLE_TAG: &str = "example";
/// Tag key for validation directives.
pub const VALIDATE_TAG: &str = "validate";
/// Tag key for a free-text description.
pub const DESCRIPTION_TAG: &str = "description";

/// Ordered set of tag entries attached to one struct field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTags {
    entries: Vec<(String, String)>,
}

impl FieldTags {
    /// Creates an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a struct-tag string.
    ///
    /// Parsing stops at the first malformed entry; the entries before it
    /// are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_synth_core::FieldTags;
    ///
    /// let tags = FieldTags::parse(r#"description:"says \"hi\"" broken"#);
    /// assert_eq!(tags.lookup("description"), Some(r#"says "hi""#));
    /// assert_eq!(tags.len(), 1);
    /// ```
    pub fn parse(raw: &str) -> Self {
        let mut entries = Vec::new();
        let mut rest = raw;

        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }

            let Some(colon) = rest.find(':') else {
                break;
            };
            let key = &rest[..colon];
            if key.is_empty() || key.contains(|c: char| c == ' ' || c == '"' || c.is_control()) {
                break;
            }

            let Some((value, remaining)) = parse_quoted(&rest[colon + 1..]) else {
                break;
            };
            entries.push((key.to_string(), value));
            rest = remaining;
        }

        Self { entries }
    }

    /// Adds an entry, replacing any existing value for `key`.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
        self
    }

    /// Returns the value for `key`, distinguishing an absent key from an
    /// empty value.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the value for `key`, or `""` if absent.
    pub fn get(&self, key: &str) -> &str {
        self.lookup(key).unwrap_or("")
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Splits a tag value at the first comma into a name and its options.
///
/// # Examples
///
/// ```
/// use schema_synth_core::split_tag_value;
///
/// assert_eq!(split_tag_value("name,omitempty"), ("name", vec!["omitempty"]));
/// assert_eq!(split_tag_value(",attr"), ("", vec!["attr"]));
/// assert_eq!(split_tag_value("plain"), ("plain", vec![]));
/// ```
pub fn split_tag_value(value: &str) -> (&str, Vec<&str>) {
    let mut parts = value.split(',');
    let name = parts.next().unwrap_or("");
    (name, parts.collect())
}

/// Reads a double-quoted string from the start of `input`, returning the
/// unescaped value and the remaining input.
fn parse_quoted(input: &str) -> Option<(String, &str)> {
    let body = input.strip_prefix('"')?;
    let mut value = String::new();
    let mut chars = body.char_indices();

    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => return Some((value, &body[idx + 1..])),
            '\\' => {
                let (_, escaped) = chars.next()?;
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
            }
            other => value.push(other),
        }
    }

    None
}
