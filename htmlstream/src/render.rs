//! Tag rendering: element descriptors to start, end and empty tag strings.
//!
//! Rendering only depends on an element's [`TagShape`], so results are
//! memoized per shape. Templated output repeats the same few shapes over
//! and over, which makes the cache hit rate high in practice.

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasherDefault;
use std::num::NonZeroUsize;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use compact_str::CompactString;
use lru::LruCache;
use rapidhash::RapidHasher;

use crate::attr::{build_attribute_string, build_style, style_shorthand};
use crate::element::{Element, TagShape};
use crate::error::Result;
use crate::tracing_macros::debug;

/// Elements that never have an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "br", "col", "frame", "hr", "img", "input", "isindex", "link",
    "meta", "param",
];

/// Capacity of the bounded tag cache.
const DEFAULT_CACHE_CAPACITY: NonZeroUsize = NonZeroUsize::new(2048).unwrap();

/// Check if a tag is a void element.
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// The three canonical tag strings of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTags {
    name: CompactString,
    start: String,
    end: String,
    empty: String,
}

impl RenderedTags {
    fn render(shape: &TagShape) -> Self {
        let mut shorthand = Vec::new();
        let mut rest = Vec::new();
        for (key, value) in shape.attrs() {
            match style_shorthand(key) {
                Some(property) => shorthand.push((property, value)),
                None => rest.push((key, value)),
            }
        }
        let style = build_style(shape.style(), shorthand);
        let attrs = build_attribute_string(shape.class(), &style, rest);

        let name = shape.name();
        let start = if attrs.is_empty() {
            format!("<{name}>")
        } else {
            format!("<{name} {attrs}>")
        };

        // `<x />` is never produced: HTML5 only allows it on void elements,
        // and those are written without it anyway.
        let (end, empty) = if is_void_element(name) {
            (String::new(), start.clone())
        } else {
            let end = format!("</{name}>");
            let empty = format!("{start}{end}");
            (end, empty)
        };

        Self {
            name: name.into(),
            start,
            end,
            empty,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<name attrs>`, or `<name>` without attributes.
    pub fn start(&self) -> &str {
        &self.start
    }

    /// `</name>`, or empty for void elements.
    pub fn end(&self) -> &str {
        &self.end
    }

    /// The start tag for void elements, start and end tag otherwise.
    pub fn empty(&self) -> &str {
        &self.empty
    }
}

type ShapeHasher = BuildHasherDefault<RapidHasher>;

enum CachePolicy {
    Bounded(Mutex<LruCache<TagShape, Arc<RenderedTags>, ShapeHasher>>),
    Unbounded(Mutex<HashMap<TagShape, Arc<RenderedTags>, ShapeHasher>>),
    Disabled,
}

/// Memoization policy for a [`TagRenderer`].
///
/// The cache sits behind a mutex so a renderer can be shared between
/// writers on different threads.
pub struct TagCache {
    policy: CachePolicy,
}

/// Cached values are immutable, so a panic while the lock was held cannot
/// leave them half-written.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TagCache {
    /// Least-recently-used cache of bounded size. This is the default.
    pub fn bounded() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub(crate) fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            policy: CachePolicy::Bounded(Mutex::new(LruCache::with_hasher(
                capacity,
                ShapeHasher::default(),
            ))),
        }
    }

    /// Cache that never evicts.
    pub fn unbounded() -> Self {
        Self {
            policy: CachePolicy::Unbounded(Mutex::new(HashMap::default())),
        }
    }

    /// No caching: every call renders afresh.
    pub fn disabled() -> Self {
        Self {
            policy: CachePolicy::Disabled,
        }
    }

    /// Number of shapes currently cached.
    pub fn len(&self) -> usize {
        match &self.policy {
            CachePolicy::Bounded(cache) => lock(cache).len(),
            CachePolicy::Unbounded(cache) => lock(cache).len(),
            CachePolicy::Disabled => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, shape: &TagShape) -> Option<Arc<RenderedTags>> {
        match &self.policy {
            CachePolicy::Bounded(cache) => lock(cache).get(shape).cloned(),
            CachePolicy::Unbounded(cache) => lock(cache).get(shape).cloned(),
            CachePolicy::Disabled => None,
        }
    }

    fn insert(&self, shape: &TagShape, tags: Arc<RenderedTags>) {
        match &self.policy {
            CachePolicy::Bounded(cache) => {
                lock(cache).put(shape.clone(), tags);
            }
            CachePolicy::Unbounded(cache) => {
                lock(cache).insert(shape.clone(), tags);
            }
            CachePolicy::Disabled => {}
        }
    }
}

impl Default for TagCache {
    fn default() -> Self {
        Self::bounded()
    }
}

impl fmt::Debug for TagCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let policy = match &self.policy {
            CachePolicy::Bounded(_) => "bounded",
            CachePolicy::Unbounded(_) => "unbounded",
            CachePolicy::Disabled => "disabled",
        };
        f.debug_struct("TagCache")
            .field("policy", &policy)
            .field("len", &self.len())
            .finish()
    }
}

/// Renders elements to tag strings, memoized through a [`TagCache`].
#[derive(Debug, Default)]
pub struct TagRenderer {
    cache: TagCache,
}

impl TagRenderer {
    pub fn new(cache: TagCache) -> Self {
        Self { cache }
    }

    /// Rendered tags for `elem`. Contents play no part.
    ///
    /// Names are not checked here; [`Writer`](crate::Writer) and the string
    /// helpers below validate before rendering.
    pub fn render(&self, elem: &Element) -> Arc<RenderedTags> {
        self.render_shape(elem.shape())
    }

    pub fn render_shape(&self, shape: &TagShape) -> Arc<RenderedTags> {
        if let Some(tags) = self.cache.get(shape) {
            return tags;
        }
        debug!(name = shape.name(), "tag cache miss");
        let tags = Arc::new(RenderedTags::render(shape));
        self.cache.insert(shape, Arc::clone(&tags));
        tags
    }

    /// Start tag of `elem`. Fails with
    /// [`WriteError::InvalidArgument`](crate::WriteError::InvalidArgument) on
    /// an illegal element or attribute name.
    pub fn start_tag(&self, elem: &Element) -> Result<String> {
        Ok(self.checked(elem)?.start().to_owned())
    }

    /// End tag of `elem`; empty for void elements.
    pub fn end_tag(&self, elem: &Element) -> Result<String> {
        Ok(self.checked(elem)?.end().to_owned())
    }

    pub fn empty_tag(&self, elem: &Element) -> Result<String> {
        Ok(self.checked(elem)?.empty().to_owned())
    }

    fn checked(&self, elem: &Element) -> Result<Arc<RenderedTags>> {
        elem.shape().validate()?;
        Ok(self.render(elem))
    }

    pub fn cache(&self) -> &TagCache {
        &self.cache
    }
}

static DEFAULT_RENDERER: LazyLock<Arc<TagRenderer>> =
    LazyLock::new(|| Arc::new(TagRenderer::default()));

/// The process-wide renderer, with a bounded cache.
pub fn default_renderer() -> &'static Arc<TagRenderer> {
    &DEFAULT_RENDERER
}

// =============================================================================
// Tests
// =============================================================================
