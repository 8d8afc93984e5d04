//! Declarative schema rules and the editor's default rule set.

use crate::maps::{NodeType, ObjectKind, TOP_LEVEL_BLOCKS};
use crate::rich::Node;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Matches nodes by `(object, type)`; a `None` half matches anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selector {
    pub object: Option<ObjectKind>,
    pub node_type: Option<NodeType>,
}

impl Selector {
    pub fn object(object: ObjectKind) -> Self {
        Selector {
            object: Some(object),
            node_type: None,
        }
    }

    /// Matches a node type under its natural object kind.
    pub fn of_type(node_type: NodeType) -> Self {
        Selector {
            object: Some(node_type.object()),
            node_type: Some(node_type),
        }
    }

    /// Matches a node type under an explicit object kind.
    pub fn typed(object: ObjectKind, node_type: NodeType) -> Self {
        Selector {
            object: Some(object),
            node_type: Some(node_type),
        }
    }

    pub fn matches(&self, object: ObjectKind, node_type: Option<NodeType>) -> bool {
        self.object.map_or(true, |o| o == object)
            && self.node_type.map_or(true, |t| Some(t) == node_type)
    }

    pub fn matches_node(&self, node: &Node) -> bool {
        self.matches(node.object(), node.node_type())
    }
}

/// Constraint on a node's children.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildRule {
    pub matches: Vec<Selector>,
    /// Minimum number of children matching one of `matches`.
    pub min: usize,
}

impl ChildRule {
    pub fn new(matches: Vec<Selector>) -> Self {
        ChildRule { matches, min: 0 }
    }

    pub fn min(mut self, min: usize) -> Self {
        self.min = min;
        self
    }

    pub fn accepts(&self, node: &Node) -> bool {
        self.matches.iter().any(|s| s.matches_node(node))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ChildMinInvalid,
    NextSiblingTypeInvalid,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorCode::ChildMinInvalid => "child_min_invalid",
            ErrorCode::NextSiblingTypeInvalid => "next_sibling_type_invalid",
        })
    }
}

/// Repair applied to a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeAction {
    /// Insert an empty paragraph as the node's first child.
    InsertDefaultParagraph,
    /// Remove the offending node.
    RemoveNode,
    /// Merge the next sibling into the node when both are the same list kind.
    MergeSameListSibling,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: String,
    pub matches: Vec<Selector>,
    pub nodes: Vec<ChildRule>,
    /// Allowed types for the next sibling, when constrained.
    pub next: Option<Vec<Selector>>,
    pub is_void: bool,
    pub normalize: Vec<(ErrorCode, NormalizeAction)>,
}

impl Rule {
    pub fn new(name: impl Into<String>, matches: Vec<Selector>) -> Self {
        Rule {
            name: name.into(),
            matches,
            nodes: Vec::new(),
            next: None,
            is_void: false,
            normalize: Vec::new(),
        }
    }

    pub fn nodes(mut self, child: ChildRule) -> Self {
        self.nodes.push(child);
        self
    }

    pub fn next(mut self, next: Vec<Selector>) -> Self {
        self.next = Some(next);
        self
    }

    pub fn void(mut self) -> Self {
        self.is_void = true;
        self
    }

    pub fn normalize(mut self, code: ErrorCode, action: NormalizeAction) -> Self {
        self.normalize.push((code, action));
        self
    }

    pub fn action_for(&self, code: ErrorCode) -> Option<NormalizeAction> {
        self.normalize
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, action)| *action)
    }

    /// Error codes this rule is able to raise.
    pub fn raisable_codes(&self) -> Vec<ErrorCode> {
        let mut codes = Vec::new();
        if self.nodes.iter().any(|child| child.min > 0) {
            codes.push(ErrorCode::ChildMinInvalid);
        }
        if self.next.is_some() {
            codes.push(ErrorCode::NextSiblingTypeInvalid);
        }
        codes
    }
}

fn types(node_types: &[NodeType]) -> Vec<Selector> {
    node_types.iter().copied().map(Selector::of_type).collect()
}

/// Top-level blocks minus `excluded`.
fn blocks_except(excluded: &[NodeType]) -> Vec<Selector> {
    TOP_LEVEL_BLOCKS
        .iter()
        .copied()
        .filter(|t| !excluded.contains(t))
        .map(Selector::of_type)
        .collect()
}

fn list_rule(list: NodeType) -> Rule {
    Rule::new(list.as_str(), types(&[list]))
        .nodes(ChildRule::new(types(&[NodeType::ListItem])).min(1))
        .next(blocks_except(&[list]))
        .normalize(ErrorCode::ChildMinInvalid, NormalizeAction::RemoveNode)
        .normalize(
            ErrorCode::NextSiblingTypeInvalid,
            NormalizeAction::MergeSameListSibling,
        )
}

/// The Markdown editor's rule set.
pub fn default_rules() -> Vec<Rule> {
    let text_blocks = [
        NodeType::Paragraph,
        NodeType::HeadingOne,
        NodeType::HeadingTwo,
        NodeType::HeadingThree,
        NodeType::HeadingFour,
        NodeType::HeadingFive,
        NodeType::HeadingSix,
        NodeType::Link,
    ];

    vec![
        Rule::new("document", vec![Selector::object(ObjectKind::Document)])
            .nodes(ChildRule::new(types(TOP_LEVEL_BLOCKS)).min(1))
            .normalize(
                ErrorCode::ChildMinInvalid,
                NormalizeAction::InsertDefaultParagraph,
            ),
        Rule::new(
            "block-containers",
            types(&[NodeType::Quote, NodeType::ListItem, NodeType::TableCell]),
        )
        .nodes(ChildRule::new(blocks_except(&[NodeType::Shortcode]))),
        Rule::new("text-blocks", types(&text_blocks)).nodes(ChildRule::new(vec![
            Selector::object(ObjectKind::Text),
            Selector::of_type(NodeType::Link),
            Selector::of_type(NodeType::Image),
            Selector::typed(ObjectKind::Inline, NodeType::Break),
        ])),
        list_rule(NodeType::BulletedList),
        list_rule(NodeType::NumberedList),
        Rule::new("voids", {
            let mut voids = types(&[
                NodeType::Image,
                NodeType::Break,
                NodeType::ThematicBreak,
                NodeType::Shortcode,
                NodeType::CodeBlock,
            ]);
            voids.push(Selector::typed(ObjectKind::Inline, NodeType::Break));
            voids
        })
        .void(),
        Rule::new("table", types(&[NodeType::Table]))
            .nodes(ChildRule::new(types(&[NodeType::TableRow]))),
        Rule::new("table-row", types(&[NodeType::TableRow]))
            .nodes(ChildRule::new(types(&[NodeType::TableCell]))),
    ]
}
