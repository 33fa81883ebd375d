//! Integration tests for the pagination pipeline.
//!
//! These tests exercise the full path from a source tree to decorated pages.
//! They verify:
//! - Leaves are neither dropped nor duplicated across pages
//! - No page exceeds its locked content height unless an overflow is recorded
//! - Break directives and non-splittable subtrees are honored
//! - Ancestors are reopened at the right depth, table header groups repeat
//! - Running headers, footers and page numbers resolve

use paginate::layout::tree::{BoxId, BoxTree};
use paginate::model::*;
use paginate::style::*;
use paginate::{paginate, paginate_json, BlockOracle, LayoutInfo, LayoutOracle, PageSet};

// ─── Helpers ────────────────────────────────────────────────────

fn make_leaf(text: &str, height: f64) -> Node {
    Node::text("p", text).with_id(text).with_height(height)
}

fn make_leaves(prefix: &str, count: usize, height: f64) -> Vec<Node> {
    (0..count)
        .map(|i| make_leaf(&format!("{}-{}", prefix, i), height))
        .collect()
}

fn make_section(id: &str, children: Vec<Node>) -> Node {
    Node::element("section", children).with_id(id)
}

fn make_row(text: &str, height: f64) -> Node {
    Node::element("tr", vec![Node::text("td", text).with_height(height)])
        .with_id(text)
        .with_style(Style {
            break_inside: Some(BreakInside::Avoid),
            ..Default::default()
        })
}

fn make_table(rows: usize) -> Node {
    Node::element(
        "table",
        vec![
            Node::element("thead", vec![make_row("Head", 10.0)]).with_id("thead"),
            Node::element(
                "tbody",
                (0..rows).map(|i| make_row(&format!("row-{}", i), 10.0)).collect(),
            )
            .with_id("tbody"),
        ],
    )
    .with_id("table")
}

/// 100 wide, 140 high, 20-point header and footer: 100 points of content.
fn make_doc(children: Vec<Node>) -> Document {
    let mut doc = Document::new(Node::element("body", children));
    doc.page = PageTemplate::custom(100.0, 140.0, 20.0, 20.0);
    doc
}

fn layout_doc(doc: &Document) -> PageSet {
    paginate(doc, BlockOracle::new()).unwrap()
}

fn all_content_texts(set: &PageSet) -> Vec<String> {
    (0..set.len()).flat_map(|i| set.content_texts(i)).collect()
}

fn first_leaf(tree: &BoxTree, region: BoxId) -> BoxId {
    tree.descendants(region)
        .find(|id| !tree.has_children(*id) && tree.get(*id).text.is_some())
        .unwrap()
}

// ─── Distribution ───────────────────────────────────────────────

#[test]
fn test_empty_document_has_one_page() {
    let set = layout_doc(&make_doc(vec![]));
    assert_eq!(set.len(), 1);
    assert!(all_content_texts(&set).is_empty());
}

#[test]
fn test_leaves_are_conserved_across_pages() {
    let mut chapter_two = make_section("chapter-2", make_leaves("c2", 12, 10.0));
    chapter_two.style.break_before = Some(BreakBetween::Page);
    let keep = make_section("keep", make_leaves("keep", 3, 10.0)).with_attr("nobreak", "");

    let root_children = vec![
        make_section(
            "chapter-1",
            vec![
                make_section("intro", make_leaves("intro", 7, 10.0)),
                make_section("body", make_leaves("body", 14, 12.0)),
                keep,
            ],
        ),
        chapter_two,
    ];
    let doc = make_doc(root_children);
    let set = layout_doc(&doc);

    assert!(set.len() > 3);
    assert_eq!(all_content_texts(&set), doc.root.leaf_texts());
}

#[test]
fn test_height_invariant_holds_unless_overflow_recorded() {
    let doc = make_doc(vec![
        make_section("a", make_leaves("a", 20, 15.0)),
        make_leaf("giant", 180.0),
        make_section("b", make_leaves("b", 9, 25.0)),
    ]);
    let oracle = BlockOracle::new();
    let set = paginate(&doc, &oracle).unwrap();

    assert_eq!(set.overflows.len(), 1);
    assert_eq!(set.overflows[0].node_id.as_deref(), Some("giant"));
    for (i, page) in set.pages.iter().enumerate() {
        let height = oracle.measure_height(&set.tree, page.content);
        if set.has_overflow(i) {
            assert!(height > page.content_height);
        } else {
            assert!(
                height <= page.content_height,
                "page {} measures {} over {}",
                i + 1,
                height,
                page.content_height
            );
        }
    }
}

#[test]
fn test_break_before_never_shares_page_with_preceding_content() {
    let mut flagged = make_leaf("flagged", 10.0);
    flagged.style.break_before = Some(BreakBetween::Page);
    let set = layout_doc(&make_doc(vec![make_leaf("before", 10.0), flagged]));
    assert_eq!(set.len(), 2);
    assert_eq!(set.content_texts(0), vec!["before"]);
    assert_eq!(set.content_texts(1), vec!["flagged"]);
}

#[test]
fn test_break_after_never_shares_page_with_following_content() {
    let section = make_section("s", make_leaves("s", 2, 10.0)).with_attr("breakafter", "");
    let set = layout_doc(&make_doc(vec![section, make_leaf("after", 10.0)]));
    assert_eq!(set.len(), 2);
    assert_eq!(set.content_texts(1), vec!["after"]);
}

#[test]
fn test_break_after_inside_nested_section_reopens_ancestors() {
    let mut first = make_leaf("first", 10.0);
    first.style.break_after = Some(BreakBetween::Page);
    let set = layout_doc(&make_doc(vec![make_section(
        "outer",
        vec![first, make_leaf("second", 10.0)],
    )]));
    assert_eq!(set.len(), 2);
    let leaf = first_leaf(&set.tree, set.pages[1].content);
    assert_eq!(set.tree.get(leaf).text.as_deref(), Some("second"));
    let parent = set.tree.parent(leaf).unwrap();
    assert_eq!(set.tree.get(parent).id.as_deref(), Some("outer"));
}

#[test]
fn test_avoid_break_inside_keeps_subtree_together() {
    let mut keep = make_section("keep", make_leaves("keep", 5, 10.0));
    keep.style.break_inside = Some(BreakInside::AvoidPage);
    let set = layout_doc(&make_doc(vec![make_section("fill", make_leaves("fill", 7, 10.0)), keep]));

    assert_eq!(set.len(), 2);
    assert_eq!(set.content_texts(1).len(), 5);
    assert!(set.content_texts(0).iter().all(|t| t.starts_with("fill")));
}

#[test]
fn test_oversized_avoid_block_is_split_nowhere_and_reported() {
    let mut keep = make_section("keep", make_leaves("keep", 15, 10.0));
    keep.style.break_inside = Some(BreakInside::Avoid);
    let set = layout_doc(&make_doc(vec![make_leaf("lead", 10.0), keep]));

    assert_eq!(set.len(), 2);
    assert_eq!(set.content_texts(1).len(), 15);
    assert_eq!(set.overflows.len(), 1);
    assert_eq!(set.overflows[0].page, 1);
}

// ─── Ancestry ───────────────────────────────────────────────────

#[test]
fn test_break_at_depth_reopens_every_ancestor() {
    let deep = make_section(
        "level-1",
        vec![make_section(
            "level-2",
            vec![make_section("level-3", make_leaves("deep", 14, 10.0))],
        )
        .with_attr("data-chapter", "2")],
    );
    let set = layout_doc(&make_doc(vec![deep]));
    assert_eq!(set.len(), 2);

    let content = set.pages[1].content;
    let leaf = first_leaf(&set.tree, content);
    assert_eq!(set.tree.depth_below(leaf, content), Some(4));

    let mut ancestor = set.tree.parent(leaf).unwrap();
    for expected in ["level-3", "level-2", "level-1"] {
        let data = set.tree.get(ancestor);
        assert_eq!(data.id.as_deref(), Some(expected));
        assert_eq!(data.tag, "section");
        let chapter = if expected == "level-2" { Some("2") } else { None };
        assert_eq!(data.attr("data-chapter"), chapter);
        ancestor = set.tree.parent(ancestor).unwrap();
    }
    assert_eq!(ancestor, content);
}

#[test]
fn test_table_header_repeats_on_every_page() {
    let set = layout_doc(&make_doc(vec![make_table(20)]));
    assert_eq!(set.len(), 3);

    for page in &set.pages {
        let table = set.tree.children(page.content).next().unwrap();
        assert_eq!(set.tree.get(table).id.as_deref(), Some("table"));
        let first = set.tree.children(table).next().unwrap();
        assert_eq!(set.tree.get(first).tag, "thead");
        assert_eq!(set.tree.text_content(first), "Head");
    }

    let rows: Vec<String> = all_content_texts(&set)
        .into_iter()
        .filter(|t| t != "Head")
        .collect();
    assert_eq!(rows.len(), 20);
    assert_eq!(rows[0], "row-0");
    assert_eq!(rows[19], "row-19");
}

#[test]
fn test_header_group_displayed_as_block_does_not_repeat() {
    let mut table = make_table(20);
    table.children[0].style.display = Some(Display::Block);
    let set = layout_doc(&make_doc(vec![table]));

    let page = &set.pages[1];
    let table = set.tree.children(page.content).next().unwrap();
    let first = set.tree.children(table).next().unwrap();
    assert_eq!(set.tree.get(first).tag, "tbody");
}

// ─── Decoration ─────────────────────────────────────────────────

#[test]
fn test_acme_corp_running_header_with_page_numbers() {
    let mut children = vec![Node::source(
        "header",
        vec![Node::text("span", "Acme Corp "), Node::target("pageNumber")],
    )];
    children.extend(make_leaves("leaf", 50, 10.0));
    let mut doc = Document::new(Node::element("body", vec![Node::element("div", children)]));
    doc.page = PageTemplate::custom(100.0, 135.0, 20.0, 20.0);

    let set = layout_doc(&doc);
    assert_eq!(set.pages[0].content_height, 95.0);
    assert_eq!(set.len(), 6);
    for i in 0..5 {
        assert_eq!(set.content_texts(i).iter().filter(|t| t.starts_with("leaf")).count(), 9);
    }
    assert_eq!(set.content_texts(5).len(), 5);

    for i in 0..6 {
        assert_eq!(set.header_text(i), format!("Acme Corp {}", i + 1));
    }
}

#[test]
fn test_total_pages_resolves_to_same_count_everywhere() {
    let mut doc = make_doc(make_leaves("p", 35, 10.0));
    doc.page.header = vec![Node::target("totalPages")];
    doc.page.footer = vec![
        Node::target("pageNumber"),
        Node::text("span", "/"),
        Node::target("totalPages"),
    ];
    let set = layout_doc(&doc);
    assert_eq!(set.len(), 4);
    for i in 0..4 {
        assert_eq!(set.header_text(i), "4");
        assert_eq!(set.footer_text(i), format!("{}/4", i + 1));
    }
}

#[test]
fn test_footer_source_is_page_scoped() {
    let mut second = make_leaf("second", 10.0);
    second.style.break_before = Some(BreakBetween::Page);
    let doc = make_doc(vec![
        Node::source("footer", vec![Node::text("span", "Draft")]),
        make_leaf("first", 10.0),
        second,
    ]);
    let set = layout_doc(&doc);
    assert_eq!(set.footer_text(0), "Draft");
    assert_eq!(set.footer_text(1), "");
}

#[test]
fn test_decorating_twice_is_idempotent() {
    let mut children = vec![Node::source("header", vec![Node::text("span", "Title")])];
    children.extend(make_leaves("p", 25, 10.0));
    let mut doc = make_doc(children);
    doc.page.footer = vec![Node::target("pageNumber"), Node::target("missing")];

    let mut set = layout_doc(&doc);
    let once = serde_json::to_string(&LayoutInfo::from_page_set(&set)).unwrap();
    let summary = paginate::Decorator::new(&mut set).decorate();
    let twice = serde_json::to_string(&LayoutInfo::from_page_set(&set)).unwrap();

    assert_eq!(once, twice);
    assert_eq!(summary.resolved, 0);
    assert_eq!(summary.missing, 0);
}

#[test]
fn test_decorate_can_be_disabled() {
    let mut doc = make_doc(vec![make_leaf("a", 10.0)]);
    doc.page.header = vec![Node::target("pageNumber")];
    doc.decorate = false;
    let set = layout_doc(&doc);
    assert_eq!(set.header_text(0), "");
    let target = set.tree.find_by_tag(set.pages[0].header, TARGET_TAG).next().unwrap();
    assert_eq!(set.tree.get(target).attr(STATUS_ATTR), None);
}

// ─── Oracles ────────────────────────────────────────────────────

/// An oracle for a container that is not attached to any rendering surface.
struct DetachedOracle;

impl LayoutOracle for DetachedOracle {
    fn measure_height(&self, _tree: &BoxTree, _id: BoxId) -> f64 {
        0.0
    }

    fn measure_width(&self, _tree: &BoxTree, _id: BoxId) -> f64 {
        0.0
    }
}

#[test]
fn test_unmeasurable_container_terminates_on_one_page() {
    let doc = make_doc(make_leaves("p", 40, 10.0));
    let set = paginate(&doc, DetachedOracle).unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set.pages[0].content_height, 0.0);
    assert_eq!(set.content_texts(0).len(), 40);
}

#[test]
fn test_lookup_heights_drive_breaks() {
    let doc = make_doc(vec![
        Node::text("p", "a").with_id("a"),
        Node::text("p", "b").with_id("b"),
        Node::text("p", "c").with_id("c"),
    ]);
    let oracle = BlockOracle::new()
        .with_height("a", 60.0)
        .with_height("b", 30.0)
        .with_height("c", 30.0);
    let set = paginate(&doc, oracle).unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.content_texts(0), vec!["a", "b"]);
    assert_eq!(set.content_texts(1), vec!["c"]);
}

// ─── JSON / configuration ───────────────────────────────────────

#[test]
fn test_json_document_round_trip() {
    let json = r#"{
        "page": { "size": { "Custom": { "width": 100, "height": 100 } }, "headerHeight": 10, "footerHeight": 10,
                  "footer": [ { "tag": "paginate-target", "attributes": { "data-key": "pageNumber" } } ] },
        "pageClasses": ["letter"],
        "root": { "tag": "body", "children": [
            { "tag": "p", "text": "one", "style": { "height": 50 } },
            { "tag": "p", "text": "two", "style": { "height": 50 } }
        ]}
    }"#;
    let output: serde_json::Value = serde_json::from_str(&paginate_json(json).unwrap()).unwrap();
    let pages = output["pages"].as_array().unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0]["classes"], serde_json::json!(["page", "letter"]));
    assert_eq!(pages[0]["contentHeight"], serde_json::json!(80.0));
    assert_eq!(pages[1]["content"][0]["text"], "two");
    assert_eq!(pages[1]["footer"][0]["children"][0]["text"], "2");
}

#[test]
fn test_invalid_json_is_a_parse_error() {
    let err = paginate_json("{ \"root\": ").unwrap_err();
    assert!(matches!(err, paginate::PaginateError::Parse { .. }));
}

#[test]
fn test_template_without_room_is_rejected() {
    let mut doc = make_doc(vec![]);
    doc.page = PageTemplate::custom(100.0, 40.0, 20.0, 20.0);
    assert!(matches!(
        paginate(&doc, BlockOracle::new()),
        Err(paginate::PaginateError::InvalidTemplate(_))
    ));
}
