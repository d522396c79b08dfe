//! Streaming writer: the whitespace state machine over a nesting stack.
//!
//! Every write goes straight to the sink. For each unit written the writer
//! looks at the current [`Frame`] and decides whether the unit starts with an
//! indent, a separating space or nothing, and whether it ends with a newline:
//!
//! - the first unit on a line is indented by the unit's nesting level
//! - two text units on the same line are separated by one space; tags never are
//! - a unit ends its line unless it, or an enclosing frame, asked to stay on
//!   the same line
//!
//! ```rust
//! use htmlstream::{Element, ScopeOptions, WriteOptions, Writer};
//!
//! let mut out = String::new();
//! let mut w = Writer::new(&mut out);
//! w.with_element(&Element::new("div"), ScopeOptions::default(), |w| {
//!     w.write("Hello", WriteOptions::default())
//! })
//! .unwrap();
//! drop(w);
//! assert_eq!(out, "<div>\n  Hello\n</div>\n");
//! ```

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use compact_str::CompactString;

use crate::element::{ContentItem, Element};
use crate::error::{Result, WriteError};
use crate::escape::escape_into;
use crate::render::{TagRenderer, default_renderer};
use crate::stack::{Frame, NestingStack};
use crate::tracing_macros::debug;

/// Writer-wide configuration.
#[derive(Clone, Debug)]
pub struct WriterOptions {
    /// Indentation unit, repeated once per nesting level (default: two spaces)
    pub indent: CompactString,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            indent: CompactString::const_new("  "),
        }
    }
}

impl WriterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom indentation unit.
    pub fn with_indent(mut self, indent: impl Into<CompactString>) -> Self {
        self.indent = indent.into();
        self
    }
}

/// Options for [`Writer::write`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteOptions {
    /// Keep whatever comes next on this line (default: false)
    pub next_same_line: bool,
    /// For elements: keep their contents on one line (default: true)
    pub contents_same_line: bool,
    /// Indent the unit if it starts a line (default: true)
    pub indent: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            next_same_line: false,
            contents_same_line: true,
            indent: true,
        }
    }
}

impl WriteOptions {
    pub fn next_same_line(mut self, yes: bool) -> Self {
        self.next_same_line = yes;
        self
    }

    pub fn contents_same_line(mut self, yes: bool) -> Self {
        self.contents_same_line = yes;
        self
    }

    pub fn indent(mut self, yes: bool) -> Self {
        self.indent = yes;
        self
    }
}

/// Options for [`Writer::write_tag`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagOptions {
    /// Keep whatever follows the element on its last line (default: false)
    pub same_line: bool,
    /// Keep the element's contents on one line (default: true)
    pub contents_same_line: bool,
    /// Indent text contents that start a line (default: true)
    pub indent_contents: bool,
    /// Indent the element's own tags (default: true)
    pub indent_tag: bool,
}

impl Default for TagOptions {
    fn default() -> Self {
        Self {
            same_line: false,
            contents_same_line: true,
            indent_contents: true,
            indent_tag: true,
        }
    }
}

impl TagOptions {
    pub fn same_line(mut self, yes: bool) -> Self {
        self.same_line = yes;
        self
    }

    pub fn contents_same_line(mut self, yes: bool) -> Self {
        self.contents_same_line = yes;
        self
    }

    pub fn indent_contents(mut self, yes: bool) -> Self {
        self.indent_contents = yes;
        self
    }

    pub fn indent_tag(mut self, yes: bool) -> Self {
        self.indent_tag = yes;
        self
    }
}

/// Options for opening an element with [`Writer::begin`] and friends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeOptions {
    /// Children start on the opener's line, without extra indentation (default: false)
    pub child_same_line: bool,
    /// Everything inside stays on one line; inherited by all descendants (default: false)
    pub contents_same_line: bool,
    /// Skip indentation of the start and end tags when false (default: true)
    pub indent: bool,
}

impl Default for ScopeOptions {
    fn default() -> Self {
        Self {
            child_same_line: false,
            contents_same_line: false,
            indent: true,
        }
    }
}

impl ScopeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child_same_line(mut self, yes: bool) -> Self {
        self.child_same_line = yes;
        self
    }

    pub fn contents_same_line(mut self, yes: bool) -> Self {
        self.contents_same_line = yes;
        self
    }

    pub fn indent(mut self, yes: bool) -> Self {
        self.indent = yes;
        self
    }
}

/// Streaming markup writer over any [`fmt::Write`] sink.
///
/// A writer is not meant to be shared between threads; independent writers
/// can share a [`TagRenderer`] (and its cache) through an `Arc`.
#[derive(Debug)]
pub struct Writer<W> {
    out: W,
    /// Speculative output, innermost last. Writes go to the last buffer, or
    /// to `out` when there is none.
    buffers: Vec<String>,
    stack: NestingStack,
    indent: CompactString,
    renderer: Arc<TagRenderer>,
    line_indented: bool,
    last_was_tag: bool,
}

impl<W: fmt::Write> Writer<W> {
    /// Create a writer with default options and the process-wide renderer.
    pub fn new(out: W) -> Self {
        Self::with_options(out, WriterOptions::default())
    }

    pub fn with_options(out: W, options: WriterOptions) -> Self {
        Self {
            out,
            buffers: Vec::new(),
            stack: NestingStack::new(),
            indent: options.indent,
            renderer: Arc::clone(default_renderer()),
            line_indented: false,
            last_was_tag: true,
        }
    }

    /// Use `renderer` (and its cache policy) instead of the process-wide one.
    pub fn with_renderer(mut self, renderer: Arc<TagRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn renderer(&self) -> &Arc<TagRenderer> {
        &self.renderer
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn current_frame(&self) -> &Frame {
        self.stack.current()
    }

    // -------------------------------------------------------------------------
    // Public write operations
    // -------------------------------------------------------------------------

    /// Write text, an element, or a sequence of those.
    ///
    /// The whole item is validated first; an invalid item writes nothing.
    pub fn write(&mut self, item: impl Into<ContentItem>, options: WriteOptions) -> Result<()> {
        self.write_item(&item.into(), options)
    }

    /// Like [`write`](Self::write), without taking ownership.
    pub fn write_item(&mut self, item: &ContentItem, options: WriteOptions) -> Result<()> {
        item.validate()?;
        self.emit_item(item, options)
    }

    /// Write an element: an empty tag if it has no contents, otherwise start
    /// tag, contents and end tag. The end tag is written even when writing
    /// the contents fails.
    pub fn write_tag(&mut self, elem: &Element, options: TagOptions) -> Result<()> {
        elem.validate()?;
        self.emit_tag(elem, options)
    }

    /// Open `elem` without closing it. Its contents, if any, are ignored.
    ///
    /// Prefer [`begin`](Self::begin) or [`with_element`](Self::with_element),
    /// which guarantee the matching [`write_end_tag`](Self::write_end_tag).
    pub fn write_start_tag(&mut self, elem: &Element, options: ScopeOptions) -> Result<()> {
        elem.validate()?;
        self.open(elem, options)
    }

    /// Close the innermost open element.
    ///
    /// Fails with [`WriteError::StackUnderflow`], writing nothing, when no
    /// element is open.
    pub fn write_end_tag(&mut self, indent: bool, next_same_line: bool) -> Result<()> {
        let popped = self.stack.pop()?;
        let current = self.stack.current();
        let (level, same_line) = (
            current.indent_level,
            current.contents_same_line || next_same_line || current.child_same_line,
        );
        self.write_start_whitespace(level, true, indent)?;
        if let Some(tags) = popped.tags {
            self.emit(tags.end())?;
        }
        self.write_end_whitespace(same_line)
    }

    /// Open `elem` and return a guard that closes it exactly once: on
    /// [`ElementScope::end`], or when the guard is dropped.
    ///
    /// The guard derefs to the writer, so the element's contents are written
    /// through it.
    pub fn begin(&mut self, elem: &Element, options: ScopeOptions) -> Result<ElementScope<'_, W>> {
        elem.validate()?;
        let depth = self.stack.depth();
        self.open(elem, options)?;
        Ok(ElementScope {
            writer: self,
            depth,
            indent: options.indent,
            open: true,
        })
    }

    /// Open `elem`, run `f`, then close `elem` whatever `f` returned.
    ///
    /// An error from `f` takes precedence over one from closing.
    pub fn with_element<T, E>(
        &mut self,
        elem: &Element,
        options: ScopeOptions,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<WriteError>,
    {
        elem.validate()?;
        self.scoped(elem, options, f)
    }

    /// Open every element of `openers` in turn, write `last` inside the
    /// innermost one, then close them all in reverse order.
    ///
    /// Only `last` may carry contents: an opener with contents of its own is
    /// rejected with [`WriteError::InvalidArgument`] before anything is written.
    pub fn write_chain(
        &mut self,
        openers: &[Element],
        last: impl Into<ContentItem>,
        options: WriteOptions,
    ) -> Result<()> {
        for (i, opener) in openers.iter().enumerate() {
            if opener.has_contents() {
                return Err(WriteError::invalid(format!(
                    "chained opener #{i} <{}> carries contents; only the last item may",
                    opener.name()
                )));
            }
            opener.validate()?;
        }
        let last = last.into();
        last.validate()?;
        self.emit_chain(openers, &last, options)
    }

    /// Run `f` with all output held back in memory, and pass it on to the
    /// sink only if `f` succeeds.
    ///
    /// On failure the held-back output is dropped, the line position and the
    /// stack of open elements are restored to what they were on entry, and
    /// the error is returned. Calls nest: an inner success commits into the outer
    /// buffer.
    pub fn only_write_if_successful<T, E>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<WriteError>,
    {
        let stack = self.stack.clone();
        let (line_indented, last_was_tag) = (self.line_indented, self.last_was_tag);

        self.buffers.push(String::new());
        let result = f(self);
        let buffer = self.buffers.pop().unwrap_or_default();

        match result {
            Ok(value) => {
                debug!(bytes = buffer.len(), "committing buffered output");
                self.emit(&buffer)?;
                Ok(value)
            }
            Err(err) => {
                debug!(bytes = buffer.len(), "discarding buffered output");
                self.stack = stack;
                self.line_indented = line_indented;
                self.last_was_tag = last_was_tag;
                Err(err)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Unchecked internals: callers validate first
    // -------------------------------------------------------------------------

    fn emit_item(&mut self, item: &ContentItem, options: WriteOptions) -> Result<()> {
        match item {
            ContentItem::Text(text) => self.emit_text(text, true, options),
            ContentItem::Markup(markup) => self.emit_text(markup, false, options),
            ContentItem::Element(elem) => self.emit_tag(
                elem,
                TagOptions {
                    same_line: options.next_same_line,
                    contents_same_line: options.contents_same_line,
                    indent_contents: true,
                    indent_tag: options.indent,
                },
            ),
            ContentItem::Sequence(items) => items
                .iter()
                .try_for_each(|item| self.emit_item(item, options)),
        }
    }

    fn emit_text(&mut self, text: &str, escape: bool, options: WriteOptions) -> Result<()> {
        let current = self.stack.current();
        let (level, same_line) = (
            current.indent_level,
            current.contents_same_line || options.next_same_line,
        );
        self.write_start_whitespace(level, false, options.indent)?;
        if escape {
            escape_into(self.target(), text)?;
        } else {
            self.emit(text)?;
        }
        self.write_end_whitespace(same_line)
    }

    fn emit_tag(&mut self, elem: &Element, options: TagOptions) -> Result<()> {
        if let Some(contents) = elem.contents().filter(|c| !c.is_empty()) {
            let scope = ScopeOptions {
                child_same_line: options.same_line,
                contents_same_line: options.contents_same_line,
                indent: options.indent_tag,
            };
            let inner = WriteOptions::default().indent(options.indent_contents);
            return self.scoped(elem, scope, |w| w.emit_item(contents, inner));
        }

        let current = self.stack.current();
        let (level, same_line) = (
            current.indent_level,
            current.contents_same_line || options.contents_same_line || options.same_line,
        );
        self.write_start_whitespace(level, true, options.indent_tag)?;
        let tags = self.renderer.render(elem);
        self.emit(tags.empty())?;
        self.write_end_whitespace(same_line)
    }

    fn emit_chain(
        &mut self,
        openers: &[Element],
        last: &ContentItem,
        options: WriteOptions,
    ) -> Result<()> {
        match openers.split_first() {
            None => self.emit_item(last, options),
            Some((first, rest)) => self.scoped(first, ScopeOptions::new(), |w| {
                w.emit_chain(rest, last, options)
            }),
        }
    }

    /// Push a frame for `elem` and write its start tag.
    ///
    /// Either the frame is pushed and `Ok` returned, or nothing is pushed.
    fn open(&mut self, elem: &Element, options: ScopeOptions) -> Result<()> {
        let tags = self.renderer.render(elem);
        let parent = self.stack.current();
        let (level, same_line) = (
            parent.indent_level,
            parent.contents_same_line || options.contents_same_line || options.child_same_line,
        );

        self.write_start_whitespace(level, true, options.indent)?;
        self.emit(tags.start())?;
        self.stack
            .push(tags, options.child_same_line, options.contents_same_line);
        if let Err(err) = self.write_end_whitespace(same_line) {
            self.stack.pop()?;
            return Err(err);
        }
        Ok(())
    }

    fn scoped<T, E>(
        &mut self,
        elem: &Element,
        options: ScopeOptions,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<WriteError>,
    {
        let depth = self.stack.depth();
        self.open(elem, options)?;
        let result = f(self);
        let closed = self.close_to(depth, options.indent);
        match (result, closed) {
            (Err(err), _) => Err(err),
            (Ok(_), Err(err)) => Err(err.into()),
            (Ok(value), Ok(())) => Ok(value),
        }
    }

    /// Close open elements until `depth` remain, including any that were
    /// opened inside a scope and never closed. `indent` applies to the last
    /// one, the scope's own element. Every frame is popped even if the sink
    /// fails; the first error is returned.
    fn close_to(&mut self, depth: usize, indent: bool) -> Result<()> {
        if self.stack.depth() > depth + 1 {
            debug!(
                left_open = self.stack.depth() - depth - 1,
                "closing elements left open in scope"
            );
        }
        let mut first_err = None;
        while self.stack.depth() > depth {
            let indent = indent || self.stack.depth() > depth + 1;
            if let Err(err) = self.write_end_tag(indent, false) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    // -------------------------------------------------------------------------
    // Whitespace and raw output
    // -------------------------------------------------------------------------

    fn target(&mut self) -> &mut dyn fmt::Write {
        match self.buffers.last_mut() {
            Some(buffer) => buffer,
            None => &mut self.out,
        }
    }

    fn emit(&mut self, s: &str) -> Result<()> {
        self.target().write_str(s)?;
        Ok(())
    }

    fn write_start_whitespace(&mut self, level: usize, is_tag: bool, indent: bool) -> Result<()> {
        if !self.line_indented {
            let level = if indent { level } else { 0 };
            let Self {
                out,
                buffers,
                indent: unit,
                ..
            } = self;
            let target: &mut dyn fmt::Write = match buffers.last_mut() {
                Some(buffer) => buffer,
                None => out,
            };
            for _ in 0..level {
                target.write_str(unit)?;
            }
            self.line_indented = true;
        } else if !is_tag && !self.last_was_tag {
            self.emit(" ")?;
        }
        self.last_was_tag = is_tag;
        Ok(())
    }

    fn write_end_whitespace(&mut self, same_line: bool) -> Result<()> {
        if !same_line {
            self.emit("\n")?;
            self.line_indented = false;
        }
        Ok(())
    }
}

/// An open element, closed when this guard is ended or dropped.
///
/// Derefs to the [`Writer`], so contents are written through the guard:
///
/// ```rust
/// use htmlstream::{Element, ScopeOptions, WriteOptions, Writer};
///
/// let mut out = String::new();
/// let mut w = Writer::new(&mut out);
/// {
///     let mut ul = w.begin(&Element::new("ul"), ScopeOptions::new()).unwrap();
///     ul.write(Element::new("li").text("one"), WriteOptions::default()).unwrap();
/// }
/// drop(w);
/// assert_eq!(out, "<ul>\n  <li>one</li>\n</ul>\n");
/// ```
pub struct ElementScope<'w, W: fmt::Write> {
    writer: &'w mut Writer<W>,
    /// Depth before the element was opened.
    depth: usize,
    indent: bool,
    open: bool,
}

impl<W: fmt::Write> ElementScope<'_, W> {
    /// Close the element now, reporting any sink failure.
    ///
    /// Elements opened through the guard and still open are closed first.
    /// Dropping the guard does the same, but `Drop` has no way to report
    /// errors.
    pub fn end(mut self) -> Result<()> {
        self.open = false;
        self.writer.close_to(self.depth, self.indent)
    }
}

impl<W: fmt::Write> Deref for ElementScope<'_, W> {
    type Target = Writer<W>;

    fn deref(&self) -> &Self::Target {
        self.writer
    }
}

impl<W: fmt::Write> DerefMut for ElementScope<'_, W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.writer
    }
}

impl<W: fmt::Write> Drop for ElementScope<'_, W> {
    fn drop(&mut self) {
        if self.open {
            self.open = false;
            if let Err(_err) = self.writer.close_to(self.depth, self.indent) {
                debug!(err = %_err, "end tag lost while dropping element scope");
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TagCache;

    fn writer(out: &mut String) -> Writer<&mut String> {
        Writer::new(out).with_renderer(Arc::new(TagRenderer::new(TagCache::disabled())))
    }

    /// Sink that fails every write after the first `budget` ones.
    struct FailAfter {
        out: String,
        budget: usize,
    }

    impl fmt::Write for FailAfter {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            if self.budget == 0 {
                return Err(fmt::Error);
            }
            self.budget -= 1;
            self.out.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn test_first_text_gets_no_leading_space() {
        let mut out = String::new();
        let mut w = writer(&mut out);
        w.write("a", WriteOptions::default().next_same_line(true))
            .unwrap();
        assert!(w.line_indented);
        assert!(!w.last_was_tag);
        drop(w);
        assert_eq!(out, "a");
    }

    #[test]
    fn test_tag_then_text_needs_no_space() {
        let mut out = String::new();
        let mut w = writer(&mut out);
        let same = WriteOptions::default().next_same_line(true);
        w.write(Element::new("b"), same).unwrap();
        w.write("x", same).unwrap();
        w.write("y", same).unwrap();
        drop(w);
        assert_eq!(out, "<b></b>x y");
    }

    #[test]
    fn test_custom_indent_unit() {
        let mut out = String::new();
        let mut w = Writer::with_options(&mut out, WriterOptions::new().with_indent("\t"));
        w.with_element(&Element::new("ul"), ScopeOptions::new(), |w| {
            w.with_element(&Element::new("li"), ScopeOptions::new(), |w| {
                w.write("deep", WriteOptions::default())
            })
        })
        .unwrap();
        drop(w);
        assert_eq!(out, "<ul>\n\t<li>\n\t\tdeep\n\t</li>\n</ul>\n");
    }

    #[test]
    fn test_markup_is_not_escaped() {
        let mut out = String::new();
        let mut w = writer(&mut out);
        w.write(ContentItem::markup("<b>bold</b>"), WriteOptions::default())
            .unwrap();
        w.write("<b>", WriteOptions::default()).unwrap();
        drop(w);
        assert_eq!(out, "<b>bold</b>\n&lt;b&gt;\n");
    }

    #[test]
    fn test_open_failure_pushes_no_frame() {
        let mut sink = FailAfter {
            out: String::new(),
            budget: 1,
        };
        let mut w = Writer::new(&mut sink);
        let err = w
            .write_start_tag(&Element::new("div"), ScopeOptions::new())
            .unwrap_err();
        assert_eq!(err, WriteError::SinkWriteFailure);
        assert_eq!(w.depth(), 0);
    }

    #[test]
    fn test_sink_failure_propagates() {
        let mut sink = FailAfter {
            out: String::new(),
            budget: 0,
        };
        let mut w = Writer::new(&mut sink);
        assert_eq!(
            w.write("x", WriteOptions::default()),
            Err(WriteError::SinkWriteFailure)
        );
    }

    #[test]
    fn test_discard_restores_line_state() {
        let mut out = String::new();
        let mut w = writer(&mut out);
        let same = WriteOptions::default().next_same_line(true);
        w.write("a", same).unwrap();
        let result: Result<()> = w.only_write_if_successful(|w| {
            w.write("b", WriteOptions::default())?;
            w.write_start_tag(&Element::new("div"), ScopeOptions::new())?;
            Err(WriteError::invalid("abandoned"))
        });
        assert!(result.is_err());
        assert_eq!(w.depth(), 0);
        w.write("c", WriteOptions::default()).unwrap();
        drop(w);
        assert_eq!(out, "a c\n");
    }

    #[test]
    fn test_nested_commit_goes_to_outer_buffer() {
        let mut out = String::new();
        let mut w = writer(&mut out);
        let result: Result<()> = w.only_write_if_successful(|w| {
            w.only_write_if_successful(|w| w.write("inner", WriteOptions::default()))?;
            assert!(w.get_ref().is_empty());
            Err(WriteError::invalid("outer fails"))
        });
        assert!(result.is_err());
        drop(w);
        assert_eq!(out, "");
    }
}
