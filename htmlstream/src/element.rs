//! Element descriptors and the content they carry.
//!
//! An [`Element`] is built once with a consuming builder and never mutated
//! afterwards. Its renderable part, the [`TagShape`], is hashable and is what
//! the tag cache is keyed on; contents never influence the rendered tags.

use std::sync::Arc;

use compact_str::CompactString;

use crate::attr::{AttrValue, ClassList, normalize_attr_name, style_shorthand};
use crate::error::{Result, WriteError};
use crate::render::{RenderedTags, default_renderer, is_void_element};

/// The fields of an element that determine its tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TagShape {
    pub(crate) name: CompactString,
    pub(crate) style: Vec<(CompactString, CompactString)>,
    pub(crate) class: ClassList,
    /// Sorted by key, keys unique, so insertion order never affects equality.
    pub(crate) attrs: Vec<(CompactString, AttrValue)>,
}

impl TagShape {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> &ClassList {
        &self.class
    }

    /// Explicit style entries, in insertion order.
    pub fn style(&self) -> impl Iterator<Item = (&str, &str)> {
        self.style.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All attributes (style shorthands included), sorted by key.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        check_name("element name", &self.name)?;
        for (property, _) in &self.style {
            check_name("style property", &normalize_attr_name(property))?;
        }
        for (key, _) in &self.attrs {
            let name = style_shorthand(key).unwrap_or(key.as_str());
            check_name("attribute name", &normalize_attr_name(name))?;
        }
        Ok(())
    }
}

/// Whether `key` is a style shorthand, and the name it renders under.
fn rendered_key(key: &str) -> (bool, CompactString) {
    match style_shorthand(key) {
        Some(property) => (true, normalize_attr_name(property)),
        None => (false, normalize_attr_name(key)),
    }
}

fn check_name(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(WriteError::invalid(format!("empty {kind}")));
    }
    let illegal = |c: char| {
        c.is_whitespace()
            || c.is_control()
            || matches!(c, '<' | '>' | '"' | '\'' | '/' | '=' | '&')
    };
    if let Some(c) = name.chars().find(|&c| illegal(c)) {
        return Err(WriteError::invalid(format!("{kind} {name:?} contains {c:?}")));
    }
    Ok(())
}

/// An element to be written: name, attributes, class, style and optional contents.
///
/// ```rust
/// use htmlstream::Element;
///
/// let input = Element::new("input")
///     .attr("type_", "checkbox")
///     .attr("checked", true)
///     .class(["big", "red"]);
/// assert_eq!(
///     input.start_tag().unwrap(),
///     r#"<input class="big red" checked type="checkbox">"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    shape: TagShape,
    contents: Option<Box<ContentItem>>,
}

impl Element {
    /// Create an element with no attributes and no contents.
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            shape: TagShape {
                name: name.into(),
                ..TagShape::default()
            },
            contents: None,
        }
    }

    /// Set an attribute. Setting the same key twice keeps the last value.
    ///
    /// Keys are normalized when rendered (`type_` is `type`, `data_id` is
    /// `data-id`), and keys starting with `s_` are style properties. Keys that
    /// render the same (`data_id` and `data-id`) count as the same key.
    pub fn attr(mut self, key: impl Into<CompactString>, value: impl Into<AttrValue>) -> Self {
        let key = key.into();
        let value = value.into();
        let rendered = rendered_key(&key);
        self.shape
            .attrs
            .retain(|(k, _)| *k == key || rendered_key(k) != rendered);
        match self.shape.attrs.binary_search_by(|(k, _)| k.cmp(&key)) {
            Ok(pos) => self.shape.attrs[pos].1 = value,
            Err(pos) => self.shape.attrs.insert(pos, (key, value)),
        }
        self
    }

    /// Set several attributes at once.
    pub fn attrs<K, V>(self, attrs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<CompactString>,
        V: Into<AttrValue>,
    {
        attrs.into_iter().fold(self, |elem, (k, v)| elem.attr(k, v))
    }

    /// Set the class: a single string, or a list joined with spaces.
    pub fn class(mut self, class: impl Into<ClassList>) -> Self {
        self.shape.class = class.into();
        self
    }

    /// Append an explicit style entry.
    pub fn style(
        mut self,
        property: impl Into<CompactString>,
        value: impl Into<CompactString>,
    ) -> Self {
        self.shape.style.push((property.into(), value.into()));
        self
    }

    /// Append several explicit style entries, in iteration order.
    pub fn styles<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<CompactString>,
        V: Into<CompactString>,
    {
        self.shape
            .style
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set the contents written between the start and end tags.
    pub fn with_contents(mut self, contents: impl Into<ContentItem>) -> Self {
        self.contents = Some(Box::new(contents.into()));
        self
    }

    /// Shorthand for text contents.
    pub fn text(self, text: impl Into<CompactString>) -> Self {
        self.with_contents(ContentItem::Text(text.into()))
    }

    pub fn name(&self) -> &str {
        &self.shape.name
    }

    pub fn shape(&self) -> &TagShape {
        &self.shape
    }

    pub fn contents(&self) -> Option<&ContentItem> {
        self.contents.as_deref()
    }

    /// Whether there is anything to write between the tags.
    ///
    /// Empty text and empty sequences count as no contents, so such an
    /// element is written as an empty tag.
    pub fn has_contents(&self) -> bool {
        self.contents.as_deref().is_some_and(|c| !c.is_empty())
    }

    pub fn is_void(&self) -> bool {
        is_void_element(&self.shape.name)
    }

    /// Rendered tags, from the process-wide renderer. Names are not checked.
    pub fn tags(&self) -> Arc<RenderedTags> {
        default_renderer().render(self)
    }

    /// Start tag, from the process-wide renderer. Fails on an illegal
    /// element or attribute name, exactly as [`Writer`](crate::Writer) would.
    pub fn start_tag(&self) -> Result<String> {
        default_renderer().start_tag(self)
    }

    pub fn end_tag(&self) -> Result<String> {
        default_renderer().end_tag(self)
    }

    pub fn empty_tag(&self) -> Result<String> {
        default_renderer().empty_tag(self)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.shape.validate()?;
        match self.contents.as_deref() {
            Some(contents) => contents.validate(),
            None => Ok(()),
        }
    }
}

/// Something that can be written: text, trusted markup, an element, or a sequence of those.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItem {
    /// Plain text, escaped when written.
    Text(CompactString),
    /// Already-escaped markup, written verbatim.
    Markup(CompactString),
    Element(Element),
    Sequence(Vec<ContentItem>),
}

impl ContentItem {
    pub fn text(text: impl Into<CompactString>) -> Self {
        ContentItem::Text(text.into())
    }

    /// Trusted markup. It bypasses escaping, so never feed it user input.
    pub fn markup(markup: impl Into<CompactString>) -> Self {
        ContentItem::Markup(markup.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ContentItem::Text(s) | ContentItem::Markup(s) => s.is_empty(),
            ContentItem::Element(_) => false,
            ContentItem::Sequence(items) => items.is_empty(),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            ContentItem::Text(_) | ContentItem::Markup(_) => Ok(()),
            ContentItem::Element(elem) => elem.validate(),
            ContentItem::Sequence(items) => items.iter().try_for_each(ContentItem::validate),
        }
    }
}

impl From<&str> for ContentItem {
    fn from(s: &str) -> Self {
        ContentItem::Text(s.into())
    }
}

impl From<String> for ContentItem {
    fn from(s: String) -> Self {
        ContentItem::Text(s.into())
    }
}

impl From<CompactString> for ContentItem {
    fn from(s: CompactString) -> Self {
        ContentItem::Text(s)
    }
}

impl From<Element> for ContentItem {
    fn from(elem: Element) -> Self {
        ContentItem::Element(elem)
    }
}

impl<T: Into<ContentItem>> From<Vec<T>> for ContentItem {
    fn from(items: Vec<T>) -> Self {
        ContentItem::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ContentItem>, const N: usize> From<[T; N]> for ContentItem {
    fn from(items: [T; N]) -> Self {
        ContentItem::Sequence(items.into_iter().map(Into::into).collect())
    }
}
