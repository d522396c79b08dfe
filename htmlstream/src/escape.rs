//! Markup escaping for text nodes and attribute values.
//!
//! The same escaping is used in both positions: `&`, `<`, `>`, `"` and `'`
//! are replaced by entities, everything else passes through unchanged.

use std::borrow::Cow;
use std::fmt::Write;

fn entity(b: u8) -> Option<&'static str> {
    match b {
        b'&' => Some("&amp;"),
        b'<' => Some("&lt;"),
        b'>' => Some("&gt;"),
        b'"' => Some("&quot;"),
        b'\'' => Some("&#39;"),
        _ => None,
    }
}

/// Write `text` to `out`, escaped.
///
/// Unescaped runs are written as whole slices rather than char by char.
pub fn escape_into<W: Write + ?Sized>(out: &mut W, text: &str) -> std::fmt::Result {
    let bytes = text.as_bytes();
    let mut last_end = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if let Some(replacement) = entity(b) {
            out.write_str(&text[last_end..i])?;
            out.write_str(replacement)?;
            last_end = i + 1;
        }
    }
    out.write_str(&text[last_end..])
}

/// Escape `text`, borrowing it when nothing needs replacing.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.bytes().any(|b| entity(b).is_some()) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    // Writing into a String cannot fail.
    let _ = escape_into(&mut out, text);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_borrowed() {
        assert!(matches!(escape("Hello world"), Cow::Borrowed("Hello world")));
    }

    #[test]
    fn test_escapes_markup_characters() {
        assert_eq!(escape("Hello <world>"), "Hello &lt;world&gt;");
        assert_eq!(escape("a & b"), "a &amp; b");
        assert_eq!(escape(r#"say "hi""#), "say &quot;hi&quot;");
        assert_eq!(escape("it's"), "it&#39;s");
    }

    #[test]
    fn test_multibyte_text_survives() {
        assert_eq!(escape("ünïcødé <ok>"), "ünïcødé &lt;ok&gt;");
    }

    #[test]
    fn test_escape_into_appends() {
        let mut out = String::from("x=");
        escape_into(&mut out, "<&>").unwrap();
        assert_eq!(out, "x=&lt;&amp;&gt;");
    }
}
