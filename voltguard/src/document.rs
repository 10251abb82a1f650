//! Generic parsed-document tree with source positions.
//!
//! The validation core never re-parses YAML itself: it consumes this tree
//! (for the location index) alongside the serde-decoded [`RobotSpec`]
//! (for the data). Both are produced from the same source text.
//!
//! [`RobotSpec`]: crate::spec::RobotSpec

use thiserror::Error;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::Marker;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("scan yaml: {0}")]
    Scan(String),
    #[error("mapping keys must be scalars (line {line}, column {column})")]
    NonScalarKey { line: usize, column: usize },
    #[error("empty document")]
    Empty,
}

/// 1-based source position of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pub line: usize,
    pub column: usize,
}

impl Mark {
    fn from_marker(marker: Marker) -> Self {
        Mark {
            line: marker.line(),
            column: marker.col() + 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocEntry {
    pub key: String,
    pub key_mark: Mark,
    pub value: DocNode,
}

#[derive(Debug, Clone)]
pub enum DocNode {
    Scalar { value: String, mark: Mark },
    Sequence { items: Vec<DocNode>, mark: Mark },
    Mapping { entries: Vec<DocEntry>, mark: Mark },
}

impl DocNode {
    pub fn mark(&self) -> Mark {
        match self {
            DocNode::Scalar { mark, .. }
            | DocNode::Sequence { mark, .. }
            | DocNode::Mapping { mark, .. } => *mark,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, DocNode::Scalar { .. })
    }
}

/// Parse the first YAML document of `source` into a position-annotated tree.
pub fn parse_str(source: &str) -> Result<DocNode, DocumentError> {
    let mut builder = TreeBuilder::default();
    let mut parser = Parser::new_from_str(source);
    parser
        .load(&mut builder, false)
        .map_err(|e| DocumentError::Scan(e.to_string()))?;
    if let Some(err) = builder.error {
        return Err(err);
    }
    builder.root.ok_or(DocumentError::Empty)
}

enum Frame {
    Sequence {
        items: Vec<DocNode>,
        mark: Mark,
    },
    Mapping {
        entries: Vec<DocEntry>,
        pending_key: Option<(String, Mark)>,
        mark: Mark,
    },
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Frame>,
    root: Option<DocNode>,
    error: Option<DocumentError>,
}

impl TreeBuilder {
    fn push_node(&mut self, node: DocNode) {
        match self.stack.last_mut() {
            None => {
                if self.root.is_none() {
                    self.root = Some(node);
                }
            }
            Some(Frame::Sequence { items, .. }) => items.push(node),
            Some(Frame::Mapping {
                entries,
                pending_key,
                ..
            }) => match pending_key.take() {
                Some((key, key_mark)) => entries.push(DocEntry {
                    key,
                    key_mark,
                    value: node,
                }),
                None => match node {
                    DocNode::Scalar { value, mark } => *pending_key = Some((value, mark)),
                    other => {
                        let mark = other.mark();
                        if self.error.is_none() {
                            self.error = Some(DocumentError::NonScalarKey {
                                line: mark.line,
                                column: mark.column,
                            });
                        }
                    }
                },
            },
        }
    }
}

impl MarkedEventReceiver for TreeBuilder {
    fn on_event(&mut self, event: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }
        let mark = Mark::from_marker(marker);
        match event {
            Event::Scalar(value, ..) => self.push_node(DocNode::Scalar { value, mark }),
            // Anchors are not resolved here; an alias indexes as an empty
            // scalar at its own position.
            Event::Alias(..) => self.push_node(DocNode::Scalar {
                value: String::new(),
                mark,
            }),
            Event::SequenceStart(..) => self.stack.push(Frame::Sequence {
                items: Vec::new(),
                mark,
            }),
            Event::MappingStart(..) => self.stack.push(Frame::Mapping {
                entries: Vec::new(),
                pending_key: None,
                mark,
            }),
            Event::SequenceEnd => {
                if let Some(Frame::Sequence { items, mark }) = self.stack.pop() {
                    self.push_node(DocNode::Sequence { items, mark });
                }
            }
            Event::MappingEnd => {
                if let Some(Frame::Mapping { entries, mark, .. }) = self.stack.pop() {
                    self.push_node(DocNode::Mapping { entries, mark });
                }
            }
            _ => {}
        }
    }
}
