//! Streaming HTML writer with cached tag rendering.
//!
//! htmlstream provides:
//! - **Element descriptors**: immutable, hashable [`Element`]s built with a
//!   small builder, plus the [`ContentItem`] tree they carry
//! - **Tag rendering**: canonical start/end/empty tags with escaping, a fixed
//!   attribute order and boolean attributes, memoized by [`TagRenderer`]
//! - **Writing**: [`Writer`], an indentation-aware state machine that streams
//!   straight to any [`std::fmt::Write`] sink, with scoped element guards and
//!   all-or-nothing buffered sections
//!
//! # Example
//!
//! ```rust
//! use htmlstream::{Element, ScopeOptions, WriteOptions, Writer};
//!
//! let mut out = String::new();
//! let mut w = Writer::new(&mut out);
//!
//! w.with_element(&Element::new("ul").class("menu"), ScopeOptions::new(), |w| {
//!     for item in ["Home", "About <us>"] {
//!         w.write(Element::new("li").text(item), WriteOptions::default())?;
//!     }
//!     Ok::<_, htmlstream::WriteError>(())
//! })
//! .unwrap();
//! drop(w);
//!
//! assert_eq!(
//!     out,
//!     "<ul class=\"menu\">\n  <li>Home</li>\n  <li>About &lt;us&gt;</li>\n</ul>\n"
//! );
//! ```

mod tracing_macros;

pub mod attr;
mod element;
mod error;
pub mod escape;
pub mod render;
mod sink;
pub mod stack;
mod writer;

pub use attr::{AttrValue, ClassList};
pub use element::{ContentItem, Element, TagShape};
pub use error::{Result, WriteError};
pub use escape::escape;
pub use render::{RenderedTags, TagCache, TagRenderer, default_renderer};
pub use sink::IoSink;
pub use stack::{Frame, NestingStack};
pub use writer::{ElementScope, ScopeOptions, TagOptions, WriteOptions, Writer, WriterOptions};
