//! Attribute codec: name normalization, style building and attribute strings.
//!
//! Attribute keys may carry a trailing `_` (so `type_` or `for_` can be used
//! where the bare word is awkward) and `_` stands in for `-`. Keys starting
//! with [`STYLE_PREFIX`] are style properties rather than HTML attributes.

use std::borrow::Cow;
use std::fmt;

use compact_str::{CompactString, ToCompactString};

use crate::escape::escape_into;

/// Attribute key prefix marking a style shorthand (`s_color` becomes `color: ...;`).
pub const STYLE_PREFIX: &str = "s_";

/// Attributes rendered bare (`checked`, never `checked="..."`) when truthy.
const BOOLEAN_ATTRS: &[&str] = &[
    "checked", "defer", "disabled", "multiple", "readonly", "selected",
];

/// Check if an attribute is rendered without a value.
pub fn is_boolean_attr(name: &str) -> bool {
    BOOLEAN_ATTRS.contains(&name)
}

/// Value of an HTML attribute.
///
/// Falsy values (`None`, `false`, `0` and the empty string) omit the
/// attribute entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum AttrValue {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Str(CompactString),
}

impl AttrValue {
    pub fn is_truthy(&self) -> bool {
        match self {
            AttrValue::None => false,
            AttrValue::Bool(b) => *b,
            AttrValue::Int(n) => *n != 0,
            AttrValue::Str(s) => !s.is_empty(),
        }
    }

    fn write_escaped(&self, out: &mut String) {
        // Writing into a String cannot fail.
        let _ = match self {
            AttrValue::Str(s) => escape_into(out, s),
            other => escape_into(out, &other.to_compact_string()),
        };
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::None => Ok(()),
            AttrValue::Bool(b) => write!(f, "{}", b),
            AttrValue::Int(n) => write!(f, "{}", n),
            AttrValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.into())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s.into())
    }
}

impl From<CompactString> for AttrValue {
    fn from(s: CompactString) -> Self {
        AttrValue::Str(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Int(n)
    }
}

impl From<i32> for AttrValue {
    fn from(n: i32) -> Self {
        AttrValue::Int(n.into())
    }
}

impl From<u32> for AttrValue {
    fn from(n: u32) -> Self {
        AttrValue::Int(n.into())
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttrValue::None, Into::into)
    }
}

/// The `class` attribute: either a ready-made string or a list joined by spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassList {
    Single(CompactString),
    Many(Vec<CompactString>),
}

impl ClassList {
    /// The class attribute value, list entries joined by a single space.
    pub fn joined(&self) -> Cow<'_, str> {
        match self {
            ClassList::Single(s) => Cow::Borrowed(s.as_str()),
            ClassList::Many(classes) => match classes.as_slice() {
                [] => Cow::Borrowed(""),
                [only] => Cow::Borrowed(only.as_str()),
                _ => Cow::Owned(
                    classes
                        .iter()
                        .map(CompactString::as_str)
                        .collect::<Vec<_>>()
                        .join(" "),
                ),
            },
        }
    }
}

impl Default for ClassList {
    fn default() -> Self {
        ClassList::Many(Vec::new())
    }
}

impl From<&str> for ClassList {
    fn from(s: &str) -> Self {
        ClassList::Single(s.into())
    }
}

impl From<String> for ClassList {
    fn from(s: String) -> Self {
        ClassList::Single(s.into())
    }
}

impl<S: Into<CompactString>> From<Vec<S>> for ClassList {
    fn from(classes: Vec<S>) -> Self {
        ClassList::Many(classes.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<CompactString>, const N: usize> From<[S; N]> for ClassList {
    fn from(classes: [S; N]) -> Self {
        ClassList::Many(classes.into_iter().map(Into::into).collect())
    }
}

/// Turn an attribute key into its markup name.
///
/// Trailing underscores are stripped, remaining underscores become hyphens:
/// `type_` is `type`, `data_user_id` is `data-user-id`.
pub fn normalize_attr_name(name: &str) -> CompactString {
    let trimmed = name.trim_end_matches('_');
    if trimmed.contains('_') {
        trimmed.replace('_', "-").into()
    } else {
        trimmed.into()
    }
}

/// The property name of a style shorthand key, if `key` is one.
pub fn style_shorthand(key: &str) -> Option<&str> {
    key.strip_prefix(STYLE_PREFIX)
}

/// Build the `style` attribute value.
///
/// Explicit entries come first, shorthand entries after them. Nothing is
/// deduplicated; both sources are rendered in full as `property: value;`
/// separated by single spaces.
pub fn build_style<'a>(
    explicit: impl IntoIterator<Item = (&'a str, &'a str)>,
    shorthand: impl IntoIterator<Item = (&'a str, &'a AttrValue)>,
) -> String {
    let mut out = String::new();
    let mut push = |property: &str, value: &dyn fmt::Display| {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&normalize_attr_name(property));
        out.push_str(": ");
        // Writing into a String cannot fail.
        let _ = escape_into(&mut out, &value.to_compact_string());
        out.push(';');
    };

    for (property, value) in explicit {
        push(property, &value);
    }
    for (property, value) in shorthand {
        push(property, value);
    }
    out
}

fn push_attr(out: &mut String, name: &str, value: &AttrValue) {
    if !value.is_truthy() {
        return;
    }
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(name);
    if is_boolean_attr(name) {
        return;
    }
    out.push_str("=\"");
    value.write_escaped(out);
    out.push('"');
}

fn push_text_attr(out: &mut String, name: &str, value: &str, escaped: bool) {
    if value.is_empty() {
        return;
    }
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(name);
    out.push_str("=\"");
    if escaped {
        out.push_str(value);
    } else {
        let _ = escape_into(out, value);
    }
    out.push('"');
}

/// Assemble everything that goes between the tag name and the closing `>`.
///
/// `class` comes first, then `style`, then `rest` sorted by normalized name.
/// When several keys of `rest` normalize to the same name, the last one wins.
/// `style` is taken as produced by [`build_style`], whose values are already
/// escaped. `rest` must not contain style shorthand keys; those belong in
/// `style`.
pub fn build_attribute_string<'a>(
    class: &ClassList,
    style: &str,
    rest: impl IntoIterator<Item = (&'a str, &'a AttrValue)>,
) -> String {
    let mut rest: Vec<(CompactString, &AttrValue)> = rest
        .into_iter()
        .map(|(name, value)| (normalize_attr_name(name), value))
        .collect();
    // Reversed before the stable sort so dedup keeps the last occurrence.
    rest.reverse();
    rest.sort_by(|(a, _), (b, _)| a.cmp(b));
    rest.dedup_by(|(a, _), (b, _)| a == b);

    let mut out = String::new();
    push_text_attr(&mut out, "class", &class.joined(), false);
    push_text_attr(&mut out, "style", style, true);
    for (name, value) in &rest {
        push_attr(&mut out, name, value);
    }
    out
}
