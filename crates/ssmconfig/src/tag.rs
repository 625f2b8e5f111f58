//! Parsing of `ssm` field tags.

const OPTIONAL_MODIFIER: &str = "optional";

/// A parsed field tag: `name` or `name,optional`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Parameter name relative to the request path, without surrounding slashes.
    pub suffix: String,
    pub optional: bool,
}

impl Tag {
    /// Parse a raw tag. Returns `None` when the tag names no parameter.
    ///
    /// Only the second comma separated part is inspected for the modifier;
    /// anything other than `optional` leaves the parameter required.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }

        let mut parts = raw.split(',');
        let suffix = parts.next()?.trim_matches('/');
        if suffix.is_empty() {
            return None;
        }
        let optional = parts.next() == Some(OPTIONAL_MODIFIER);

        Some(Self {
            suffix: suffix.to_string(),
            optional,
        })
    }
}
