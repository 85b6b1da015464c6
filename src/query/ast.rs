/// One node of a parsed query. The tree is immutable after parsing and
/// holds no references into any index.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    /// Parse produced no meaningful expression.
    Empty,
    /// Match every live document.
    Star,
    /// Text term, lowercased and trimmed.
    Term { word: String },
    /// Numeric range, closed on each side unless the matching flag is set.
    Range {
        lo: f64,
        hi: f64,
        lo_excl: bool,
        hi_excl: bool,
    },
    /// Complement of the child against all live documents.
    Negate { node: Box<AstNode> },
    /// Associative AND/OR over two or more children.
    Logical { op: LogicOp, nodes: Vec<AstNode> },
    /// Scopes the child to a field alias.
    Field { field: String, node: Box<AstNode> },
    /// OR of tag literals; only valid under a TAG field scope.
    Tags { tags: Vec<String> },
    /// Restrict by `filter`, then keep the `limit` nearest to `vector`.
    Knn {
        limit: usize,
        field: String,
        vector: Vec<f32>,
        filter: Box<AstNode>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

impl AstNode {
    pub fn term(word: &str) -> AstNode {
        AstNode::Term {
            word: word.trim().to_lowercase(),
        }
    }

    pub fn negate(node: AstNode) -> AstNode {
        AstNode::Negate {
            node: Box::new(node),
        }
    }

    pub fn field(field: &str, node: AstNode) -> AstNode {
        AstNode::Field {
            field: field.to_string(),
            node: Box::new(node),
        }
    }

    /// Build a logical node: a single child collapses to itself, children
    /// carrying the same operator are flattened in.
    pub fn logical(op: LogicOp, mut nodes: Vec<AstNode>) -> AstNode {
        if nodes.is_empty() {
            return AstNode::Empty;
        }
        if nodes.len() == 1 {
            return nodes.remove(0);
        }
        let mut flat = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                AstNode::Logical {
                    op: child_op,
                    nodes: children,
                } if child_op == op => flat.extend(children),
                other => flat.push(other),
            }
        }
        AstNode::Logical { op, nodes: flat }
    }
}
