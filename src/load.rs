//! JSON document loading for the CLI.
//!
//! The engine consumes an already-parsed tree; the binary gets one from
//! a JSON outline description. This is the CLI's stand-in for a real
//! document provider and deliberately mirrors the [`Document`] shape:
//! nested sections with bodies, properties, and document keywords.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::model::{Block, Document, Node, NodeId};

/// Top-level JSON outline description.
#[derive(Debug, Deserialize)]
pub struct DocumentInput {
    #[serde(default)]
    pub keywords: BTreeMap<String, String>,
    #[serde(default)]
    pub sections: Vec<SectionInput>,
}

/// A heading with body and children. Depth is implied by nesting.
#[derive(Debug, Deserialize)]
pub struct SectionInput {
    pub title: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Vec<BlockInput>,
    #[serde(default)]
    pub children: Vec<SectionInput>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockInput {
    Text {
        text: String,
    },
    Code {
        #[serde(default)]
        language: Option<String>,
        source: String,
        #[serde(default = "default_visible")]
        visible: bool,
    },
    Drawer {
        name: String,
        #[serde(default)]
        lines: Vec<String>,
    },
    Comment {
        text: String,
    },
    List {
        #[serde(default)]
        items: Vec<String>,
    },
}

fn default_visible() -> bool {
    true
}

/// Read and build a document from a JSON outline file.
pub fn read_document(path: impl AsRef<Path>) -> Result<Document> {
    let json = std::fs::read_to_string(path)?;
    from_json(&json)
}

/// Build a document from a JSON outline string.
pub fn from_json(json: &str) -> Result<Document> {
    let input: DocumentInput = serde_json::from_str(json)?;
    let mut doc = Document::new();
    doc.keywords = input.keywords;
    for section in &input.sections {
        add_section(&mut doc, NodeId::ROOT, section, 1);
    }
    Ok(doc)
}

fn add_section(doc: &mut Document, parent: NodeId, section: &SectionInput, depth: u8) {
    let mut node = Node::new(section.title.clone(), depth);
    node.properties = section.properties.clone();
    node.body = section.body.iter().map(to_block).collect();
    let id = doc.alloc_node(node);
    doc.append_child(parent, id);
    for child in &section.children {
        add_section(doc, id, child, depth + 1);
    }
}

fn to_block(block: &BlockInput) -> Block {
    match block {
        BlockInput::Text { text } => Block::Text { text: text.clone() },
        BlockInput::Code {
            language,
            source,
            visible,
        } => Block::Code {
            language: language.clone(),
            source: source.clone(),
            visible: *visible,
        },
        BlockInput::Drawer { name, lines } => Block::Drawer {
            name: name.clone(),
            lines: lines.clone(),
        },
        BlockInput::Comment { text } => Block::Comment { text: text.clone() },
        BlockInput::List { items } => Block::List {
            items: items.clone(),
        },
    }
}
