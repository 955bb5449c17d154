//! Masking engine tests over the public API: structural masks, config
//! flags, and tri-state code-block toggling.

use std::collections::BTreeSet;

use orgdeck::engine::{recompute_masks, MaskConfig, MaskKind, SrcAction, SrcTarget, Style};
use orgdeck::{keys, Block, BlockId, Document, Node, NodeId, PageLayout};

fn demo_page() -> (Document, NodeId) {
    let mut doc = Document::new();
    let page = doc.alloc_node(Node::new("TODO The Plan :talk:", 1));
    doc.append_child(NodeId::ROOT, page);
    doc.node_mut(page).unwrap().body = vec![
        Block::Drawer {
            name: "PROPERTIES".into(),
            lines: vec![":SHOW_FILE: fig.pdf".into()],
        },
        Block::Comment {
            text: "#+AUTHOR: Someone".into(),
        },
        Block::Comment {
            text: "# just a remark".into(),
        },
        Block::List {
            items: vec!["first".into(), "second".into()],
        },
        Block::Code {
            language: Some("sh".into()),
            source: "make all".into(),
            visible: true,
        },
    ];
    (doc, page)
}

fn layout_of(doc: &Document, page: NodeId) -> PageLayout {
    PageLayout::subtree(doc, page, &BTreeSet::new())
}

#[test]
fn default_config_masks_the_chrome() {
    let (doc, page) = demo_page();
    let layout = layout_of(&doc, page);
    let masks = recompute_masks(&doc, &layout, &MaskConfig::default());
    let regions = masks.regions();

    let hidden: Vec<&str> = regions
        .iter()
        .filter(|r| r.kind == MaskKind::Hidden)
        .map(|r| &layout.text[r.range.clone()])
        .collect();

    assert!(hidden.contains(&"* "), "heading stars hidden");
    assert!(hidden.contains(&"TODO "));
    assert!(hidden.contains(&" :talk:"));
    assert!(hidden.contains(&"# just a remark"));
    assert!(hidden.contains(&"#+AUTHOR:"), "directive loses its marker only");
    assert!(hidden.iter().any(|t| t.starts_with(":PROPERTIES:")));

    let styled: Vec<(&str, Style)> = regions
        .iter()
        .filter_map(|r| match r.kind {
            MaskKind::Styled(style) => Some((&layout.text[r.range.clone()], style)),
            MaskKind::Hidden => None,
        })
        .collect();

    assert!(styled.contains(&("The Plan", Style::PageTitle)));
    assert!(styled.contains(&(" Someone", Style::Directive)));
    assert!(styled.contains(&("- ", Style::Bullet)));
}

#[test]
fn disabled_flags_leave_text_unmasked() {
    let (doc, page) = demo_page();
    let layout = layout_of(&doc, page);
    let config = MaskConfig {
        hide_todo: false,
        hide_tags: false,
        hide_properties: false,
        hide_comments: false,
        style_headings: false,
        style_bullets: false,
    };
    let masks = recompute_masks(&doc, &layout, &config);
    assert!(masks.regions().is_empty());
}

#[test]
fn recompute_twice_is_identical() {
    let (doc, page) = demo_page();
    let layout = layout_of(&doc, page);
    let config = MaskConfig::default();
    assert_eq!(
        recompute_masks(&doc, &layout, &config),
        recompute_masks(&doc, &layout, &config)
    );
}

#[test]
fn single_block_toggle_is_symmetric() {
    let (mut doc, page) = demo_page();
    let layout = layout_of(&doc, page);
    let mut masks = recompute_masks(&doc, &layout, &MaskConfig::default());
    let original = masks.clone();
    let id = BlockId::new(page, 4);

    masks
        .toggle_src_blocks(&mut doc, &layout, SrcTarget::Block(id), SrcAction::Toggle)
        .unwrap();
    assert!(masks.is_src_hidden(id));
    masks
        .toggle_src_blocks(&mut doc, &layout, SrcTarget::Block(id), SrcAction::Toggle)
        .unwrap();
    assert_eq!(masks, original);
}

#[test]
fn toggle_all_twice_restores_mixed_states() {
    let mut doc = Document::new();
    let page = doc.alloc_node(Node::new("Two Blocks", 1));
    doc.append_child(NodeId::ROOT, page);
    doc.node_mut(page).unwrap().body = vec![
        Block::Code {
            language: None,
            source: "a".into(),
            visible: true,
        },
        Block::Code {
            language: None,
            source: "b".into(),
            visible: false,
        },
    ];

    let layout = layout_of(&doc, page);
    let mut masks = recompute_masks(&doc, &layout, &MaskConfig::default());
    let original = masks.clone();
    assert!(!masks.is_src_hidden(BlockId::new(page, 0)));
    assert!(masks.is_src_hidden(BlockId::new(page, 1)));

    for _ in 0..2 {
        masks
            .toggle_src_blocks(&mut doc, &layout, SrcTarget::All, SrcAction::Toggle)
            .unwrap();
    }
    assert_eq!(masks, original);
}

#[test]
fn forced_show_reveals_document_flagged_hidden_block() {
    let (mut doc, page) = demo_page();
    let id = BlockId::new(page, 4);
    doc.set_code_visible(id, false);

    let layout = layout_of(&doc, page);
    let mut masks = recompute_masks(&doc, &layout, &MaskConfig::default());
    assert!(masks.is_src_hidden(id));

    masks
        .toggle_src_blocks(&mut doc, &layout, SrcTarget::Block(id), SrcAction::Show)
        .unwrap();
    assert!(!masks.is_src_hidden(id));

    // The document flag follows, so a recompute agrees.
    let recomputed = recompute_masks(&doc, &layout, &MaskConfig::default());
    assert!(!recomputed.is_src_hidden(id));
}

#[test]
fn hide_property_masks_whole_subtree() {
    let (mut doc, page) = demo_page();
    let secret = doc.alloc_node(Node::new("Hidden Section", 2));
    doc.append_child(page, secret);
    doc.node_mut(secret).unwrap().body = vec![Block::Text {
        text: "should not appear".into(),
    }];
    doc.node_mut(secret)
        .unwrap()
        .properties
        .insert(keys::HIDE.into(), "t".into());

    let layout = layout_of(&doc, page);
    let masks = recompute_masks(&doc, &layout, &MaskConfig::default());
    let span = layout.node_span(secret).unwrap();

    assert!(masks
        .regions()
        .iter()
        .any(|r| r.kind == MaskKind::Hidden && r.range == span));
}
