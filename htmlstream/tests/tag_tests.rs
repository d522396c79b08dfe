// =============================================================================
// Tag rendering
// =============================================================================

use facet_testhelpers::test;
use htmlstream::{AttrValue, Element, TagCache, TagRenderer, WriteError};

const VOID: &[&str] = &[
    "area", "base", "basefont", "br", "col", "frame", "hr", "img", "input", "isindex", "link",
    "meta", "param",
];

#[test]
fn test_void_tag() {
    let tag = Element::new("br");
    assert_eq!(tag.start_tag().unwrap(), "<br>");
    assert_eq!(tag.end_tag().unwrap(), "");
    assert_eq!(tag.empty_tag().unwrap(), "<br>");
}

#[test]
fn test_every_void_tag_has_no_end() {
    for name in VOID {
        let tag = Element::new(*name).attr("id", "x");
        assert!(tag.is_void());
        assert_eq!(tag.end_tag().unwrap(), "");
        assert_eq!(tag.empty_tag().unwrap(), tag.start_tag().unwrap());
    }
}

#[test]
fn test_non_self_closing_tag() {
    assert_eq!(Element::new("script").empty_tag().unwrap(), "<script></script>");
    assert!(!Element::new("script").is_void());
}

#[test]
fn test_style() {
    let tag = Element::new("div").style("foo", "bar").attr("s_moo", "cow");
    assert_eq!(tag.start_tag().unwrap(), r#"<div style="foo: bar; moo: cow;">"#);
}

#[test]
fn test_style_list() {
    let tag = Element::new("div").styles([("foo", "bar"), ("margin_top", "1px")]);
    assert_eq!(tag.start_tag().unwrap(), r#"<div style="foo: bar; margin-top: 1px;">"#);
}

#[test]
fn test_class_list() {
    let tag = Element::new("div").class(["foo", "bar"]);
    assert_eq!(tag.start_tag().unwrap(), r#"<div class="foo bar">"#);
}

#[test]
fn test_class_str() {
    let tag = Element::new("div").class("foo");
    assert_eq!(tag.start_tag().unwrap(), r#"<div class="foo">"#);
}

#[test]
fn test_empty_class_omitted() {
    let tag = Element::new("div").class(Vec::<&str>::new());
    assert_eq!(tag.start_tag().unwrap(), "<div>");
}

#[test]
fn test_bool_arg_true() {
    let tag = Element::new("input").attr("checked", true).attr("type_", "checkbox");
    assert_eq!(tag.start_tag().unwrap(), r#"<input checked type="checkbox">"#);
}

#[test]
fn test_bool_arg_false() {
    let tag = Element::new("input").attr("checked", false).attr("type_", "checkbox");
    assert_eq!(tag.start_tag().unwrap(), r#"<input type="checkbox">"#);
    assert!(!tag.start_tag().unwrap().contains("checked"));
}

#[test]
fn test_attr_name_normalization() {
    let tag = Element::new("label")
        .attr("for_", "name")
        .attr("data_user_id", 7)
        .attr("aria_hidden", AttrValue::None);
    assert_eq!(tag.start_tag().unwrap(), r#"<label data-user-id="7" for="name">"#);
}

#[test]
fn test_attrs_from_iterator() {
    let tag = Element::new("option").attrs([("value", "a"), ("selected", "yes")]);
    assert_eq!(tag.start_tag().unwrap(), r#"<option selected value="a">"#);
}

#[test]
fn test_attribute_escaping() {
    let tag = Element::new("a")
        .attr("href", "test?a=1&b=2")
        .attr("title", "Say \"hello\"");
    assert_eq!(
        tag.start_tag().unwrap(),
        r#"<a href="test?a=1&amp;b=2" title="Say &quot;hello&quot;">"#
    );
}

#[test]
fn test_renderer_matches_element_helpers() {
    let renderer = TagRenderer::new(TagCache::disabled());
    let tag = Element::new("td").class("num").attr("colspan", 2);
    assert_eq!(renderer.start_tag(&tag).unwrap(), tag.start_tag().unwrap());
    assert_eq!(renderer.end_tag(&tag).unwrap(), "</td>");
    assert_eq!(renderer.empty_tag(&tag).unwrap(), r#"<td class="num" colspan="2"></td>"#);
}

#[test]
fn test_identical_shapes_render_identically() {
    let renderer = TagRenderer::new(TagCache::bounded());
    let a = Element::new("span").class(["a", "b"]).attr("id", "s").style("x", "1");
    let b = Element::new("span").attr("id", "s").style("x", "1").class(["a", "b"]).text("contents");
    assert_eq!(renderer.render(&a), renderer.render(&b));
    assert_eq!(renderer.cache().len(), 1);
}

#[test]
fn test_tag_helpers_reject_illegal_names() {
    let bad = Element::new("<x>");
    assert!(matches!(bad.start_tag(), Err(WriteError::InvalidArgument { .. })));
    assert!(matches!(bad.end_tag(), Err(WriteError::InvalidArgument { .. })));
    assert!(matches!(bad.empty_tag(), Err(WriteError::InvalidArgument { .. })));

    let renderer = TagRenderer::new(TagCache::disabled());
    let bad_attr = Element::new("div").attr("on click", "x");
    assert!(matches!(
        renderer.start_tag(&bad_attr),
        Err(WriteError::InvalidArgument { .. })
    ));
}
