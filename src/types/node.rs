//! The tree a template compiles to.

use crate::expr::Variable;
use crate::tags::Tag;

/// A single node in a [`BlockBody`].
#[derive(Debug)]
pub enum Node {
    /// Literal text.
    Text(String),
    /// An output segment, e.g. `{{ user.name | upcase }}`.
    Output(Variable),
    /// A tag, which may own nested bodies.
    Tag(Box<dyn Tag>),
}

/// An ordered list of nodes at one nesting level.
#[derive(Debug)]
pub struct BlockBody {
    pub(crate) nodes: Vec<Node>,
    pub(crate) blank: bool,
}

/// The root of a compiled template.
#[derive(Debug)]
pub struct Document {
    pub(crate) body: BlockBody,
}

impl BlockBody {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            blank: true,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Whether this body only contains whitespace and blank tags, in which
    /// case rendering it produces no output.
    pub fn is_blank(&self) -> bool {
        self.blank
    }
}

impl Default for BlockBody {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn body(&self) -> &BlockBody {
        &self.body
    }
}
