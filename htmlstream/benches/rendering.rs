use std::sync::Arc;

use divan::{Bencher, black_box};
use htmlstream::{Element, ScopeOptions, TagCache, TagRenderer, WriteOptions, Writer};

fn main() {
    divan::main();
}

fn row(i: usize) -> Element {
    Element::new("tr")
        .class(["row", if i % 2 == 0 { "even" } else { "odd" }])
        .with_contents(vec![
            Element::new("td").class("num").text(i.to_string()),
            Element::new("td").attr("s_color", "red").text("cell <with> escaping"),
            Element::new("td").with_contents(Element::new("input").attr("checked", i % 3 == 0)),
        ])
}

fn write_table(renderer: &Arc<TagRenderer>, rows: &[Element]) -> String {
    let mut out = String::new();
    let mut w = Writer::new(&mut out).with_renderer(Arc::clone(renderer));
    w.with_element(&Element::new("table"), ScopeOptions::new(), |w| {
        rows.iter()
            .try_for_each(|r| w.write_tag(r, Default::default()))
    })
    .unwrap();
    drop(w);
    out
}

#[divan::bench(args = [10, 100, 1000])]
fn table_cached(bencher: Bencher, n: usize) {
    let renderer = Arc::new(TagRenderer::new(TagCache::bounded()));
    let rows: Vec<_> = (0..n).map(row).collect();
    bencher.bench_local(|| black_box(write_table(&renderer, black_box(&rows))));
}

#[divan::bench(args = [10, 100, 1000])]
fn table_uncached(bencher: Bencher, n: usize) {
    let renderer = Arc::new(TagRenderer::new(TagCache::disabled()));
    let rows: Vec<_> = (0..n).map(row).collect();
    bencher.bench_local(|| black_box(write_table(&renderer, black_box(&rows))));
}

#[divan::bench]
fn text_same_line(bencher: Bencher) {
    bencher.bench_local(|| {
        let mut out = String::new();
        let mut w = Writer::new(&mut out);
        for word in black_box(["lorem", "ipsum", "<dolor>", "sit", "amet"]).iter().cycle().take(500) {
            w.write(*word, WriteOptions::default().next_same_line(true))
                .unwrap();
        }
        drop(w);
        black_box(out)
    });
}
