use std::collections::HashMap;
use std::path::Path;

use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node};
use thiserror::Error;

use crate::parser::tree::{inside_content, label_text, normalize, tag_name, text_of};

/// Heading tag that opens a form section ("1. Film", "8. Crew", ...).
pub const SECTION_TAG: &str = "h2";

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("cannot read {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not valid UTF-8")]
    Decode {
        path: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("{path} contains no markup")]
    Empty { path: String },
}

/// Document-order range of nodes strictly between `start` and `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    start: Option<usize>,
    end: usize,
}

/// One parsed questionnaire. Immutable; every extractor borrows it.
pub struct Form {
    html: Html,
    nodes: Vec<NodeId>,
    order: HashMap<NodeId, usize>,
}

impl Form {
    pub fn parse(markup: &str) -> Self {
        let html = Html::parse_document(markup);
        let nodes: Vec<NodeId> = html.tree.root().descendants().map(|n| n.id()).collect();
        let order = nodes.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        Form { html, nodes, order }
    }

    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let display = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|source| DocumentError::Read {
            path: display.clone(),
            source,
        })?;
        let mut markup = String::from_utf8(bytes).map_err(|source| DocumentError::Decode {
            path: display.clone(),
            source,
        })?;
        if markup.starts_with('\u{feff}') {
            markup.remove(0);
        }
        if markup.trim().is_empty() {
            return Err(DocumentError::Empty { path: display });
        }
        Ok(Form::parse(&markup))
    }

    /// The whole document.
    pub fn everywhere(&self) -> Scope {
        Scope {
            start: None,
            end: self.nodes.len(),
        }
    }

    /// Section scope of a heading: everything after it up to the next section heading.
    pub fn section(&self, heading: ElementRef<'_>) -> Scope {
        let start = self.position(*heading);
        let end = self.nodes[start + 1..]
            .iter()
            .position(|id| {
                self.html
                    .tree
                    .get(*id)
                    .is_some_and(|n| tag_name(n) == Some(SECTION_TAG))
            })
            .map(|offset| start + 1 + offset)
            .unwrap_or(self.nodes.len());
        Scope {
            start: Some(start),
            end,
        }
    }

    pub fn position(&self, node: NodeRef<'_, Node>) -> usize {
        self.order.get(&node.id()).copied().unwrap_or(0)
    }

    pub fn nodes_in(&self, scope: Scope) -> impl Iterator<Item = NodeRef<'_, Node>> {
        let from = scope.start.map_or(0, |s| s + 1);
        self.nodes[from..scope.end]
            .iter()
            .filter_map(move |id| self.html.tree.get(*id))
    }

    pub fn elements_in(&self, scope: Scope) -> impl Iterator<Item = ElementRef<'_>> {
        self.nodes_in(scope).filter_map(ElementRef::wrap)
    }

    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.elements_in(self.everywhere())
    }

    /// First section heading whose text is `text`.
    pub fn heading(&self, text: &str) -> Option<ElementRef<'_>> {
        self.elements()
            .find(|el| el.value().name() == SECTION_TAG && normalize(&text_of(*el)) == text)
    }

    pub fn label(&self, text: &str, scope: Scope) -> Option<ElementRef<'_>> {
        self.elements_in(scope)
            .find(|el| el.value().name() == "label" && label_text(*el) == text)
    }

    /// Bare text node such as "Number of series:" that sits next to its control.
    /// Text typed into controls or inside scripts never counts.
    pub fn text_node(&self, text: &str, scope: Scope) -> Option<NodeRef<'_, Node>> {
        self.nodes_in(scope).find(|n| {
            n.value().as_text().is_some_and(|t| normalize(t) == text)
                && !inside_content(*n, None)
        })
    }

    pub fn by_id(&self, id: &str) -> Option<ElementRef<'_>> {
        self.elements().find(|el| el.value().id() == Some(id))
    }

    pub fn with_placeholder(&self, tag: &str, placeholder: &str, scope: Scope) -> Option<ElementRef<'_>> {
        self.elements_in(scope).find(|el| {
            el.value().name() == tag
                && el.value().attr("placeholder").map(str::trim) == Some(placeholder)
        })
    }

    /// `<label for="id">` anywhere in the document.
    pub fn label_for(&self, id: &str) -> Option<ElementRef<'_>> {
        self.elements()
            .find(|el| el.value().name() == "label" && el.value().attr("for") == Some(id))
    }

    /// Every user-editable control, in document order.
    pub fn controls(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.elements()
            .filter(|el| matches!(el.value().name(), "textarea" | "select" | "input"))
    }
}

// ── Tests ──
