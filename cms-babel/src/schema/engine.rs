//! Compiled schema: validation and normalization to a fixpoint.

use super::rules::{ErrorCode, NormalizeAction, Rule, Selector};
use crate::maps::{NodeType, ObjectKind};
use crate::rich::{Block, Document, Node, Path};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Rule authoring mistakes, caught when a schema is compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("rule '{rule}' can raise {code} but declares no normalizer for it")]
    MissingNormalizer { rule: String, code: ErrorCode },
    #[error("rule '{rule}' inserts a paragraph its child constraints do not accept")]
    UnsatisfiableInsert { rule: String },
    #[error("rule '{0}' has no selectors")]
    EmptyMatch(String),
}

/// One broken invariant, located by the path of the node whose rule fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: Path,
    pub code: ErrorCode,
    pub rule: String,
    /// Path of the next sibling for `next_sibling_type_invalid`.
    pub next: Option<Path>,
    rule_index: usize,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}: {}", self.path, self.rule, self.code)
    }
}

type DispatchKey = (ObjectKind, Option<NodeType>);

#[derive(Debug, Clone)]
pub struct Schema {
    rules: Vec<Rule>,
    dispatch: HashMap<DispatchKey, usize>,
}

impl Schema {
    /// Checks the rules and builds the dispatch table.
    pub fn compile(rules: Vec<Rule>) -> Result<Schema, SchemaError> {
        for rule in &rules {
            if rule.matches.is_empty() {
                return Err(SchemaError::EmptyMatch(rule.name.clone()));
            }
            for code in rule.raisable_codes() {
                let action = rule
                    .action_for(code)
                    .ok_or_else(|| SchemaError::MissingNormalizer {
                        rule: rule.name.clone(),
                        code,
                    })?;
                if action == NormalizeAction::InsertDefaultParagraph {
                    let paragraph = Node::from(Block::empty_paragraph());
                    let satisfiable = rule
                        .nodes
                        .iter()
                        .filter(|child| child.min > 0)
                        .all(|child| child.min == 1 && child.accepts(&paragraph));
                    if !satisfiable {
                        return Err(SchemaError::UnsatisfiableInsert {
                            rule: rule.name.clone(),
                        });
                    }
                }
            }
        }
        Ok(Schema::build(rules))
    }

    /// Builds the dispatch table; the first rule matching a key wins.
    fn build(rules: Vec<Rule>) -> Schema {
        let mut dispatch = HashMap::new();
        for (index, rule) in rules.iter().enumerate() {
            for selector in &rule.matches {
                for key in dispatch_keys(selector) {
                    dispatch.entry(key).or_insert(index);
                }
            }
        }
        Schema { rules, dispatch }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    fn rule_index(&self, object: ObjectKind, node_type: Option<NodeType>) -> Option<usize> {
        self.dispatch
            .get(&(object, node_type))
            .or_else(|| self.dispatch.get(&(object, None)))
            .copied()
    }

    fn indexed_rule(&self, node: &Node) -> Option<(usize, &Rule)> {
        let index = self.rule_index(node.object(), node.node_type())?;
        Some((index, &self.rules[index]))
    }

    pub fn rule_for_node(&self, node: &Node) -> Option<&Rule> {
        self.indexed_rule(node).map(|(_, rule)| rule)
    }

    pub fn is_void(&self, node: &Node) -> bool {
        self.rule_for_node(node).is_some_and(|rule| rule.is_void)
    }

    /// Every violation in the document, children before their parents.
    pub fn validate(&self, document: &Document) -> Vec<Violation> {
        let mut violations = Vec::new();
        self.validate_children(&document.nodes, &mut Vec::new(), &mut violations);
        if let Some(index) = self.rule_index(ObjectKind::Document, None) {
            let rule = (index, &self.rules[index]);
            if let Some(code) = check_children(rule.1, &document.nodes) {
                violations.push(violation(rule, Vec::new(), code, None));
            }
        }
        violations
    }

    fn validate_children(&self, nodes: &[Node], path: &mut Path, out: &mut Vec<Violation>) {
        for (index, node) in nodes.iter().enumerate() {
            path.push(index);
            let indexed = self.indexed_rule(node);
            let is_void = indexed.is_some_and(|(_, rule)| rule.is_void);
            if !is_void {
                self.validate_children(node.children(), path, out);
            }
            if let Some(indexed @ (_, rule)) = indexed {
                if !is_void {
                    if let Some(code) = check_children(rule, node.children()) {
                        out.push(violation(indexed, path.clone(), code, None));
                    }
                }
                if let (Some(allowed), Some(next)) = (&rule.next, nodes.get(index + 1)) {
                    if !allowed.iter().any(|s| s.matches_node(next)) {
                        let mut next_path = path.clone();
                        if let Some(last) = next_path.last_mut() {
                            *last += 1;
                        }
                        out.push(violation(
                            indexed,
                            path.clone(),
                            ErrorCode::NextSiblingTypeInvalid,
                            Some(next_path),
                        ));
                    }
                }
            }
            path.pop();
        }
    }

    /// Repairs violations one at a time until none are repairable.
    ///
    /// Each action shrinks the tree or fills an empty container, so the loop
    /// reaches a fixpoint; normalizing a normalized document is a no-op.
    pub fn normalize(&self, document: Document) -> Document {
        let mut document = document;
        loop {
            let repaired = self
                .validate(&document)
                .iter()
                .find_map(|v| self.repair(&document, v));
            match repaired {
                Some(next) => document = next,
                None => return document,
            }
        }
    }

    fn repair(&self, document: &Document, violation: &Violation) -> Option<Document> {
        let rule = self.rules.get(violation.rule_index)?;
        let action = rule.action_for(violation.code)?;
        let repaired = match action {
            NormalizeAction::InsertDefaultParagraph => {
                document.insert_node(&violation.path, 0, Block::empty_paragraph().into())
            }
            NormalizeAction::RemoveNode => document.remove_node(&violation.path),
            NormalizeAction::MergeSameListSibling => {
                let next_path = violation.next.as_ref()?;
                let current = document.node(&violation.path)?.node_type()?;
                let next = document.node(next_path)?.node_type()?;
                if current != next || !current.is_list() {
                    return None;
                }
                document.merge_node(next_path)
            }
        }
        .ok()?;
        debug!(
            rule = %violation.rule,
            code = %violation.code,
            path = ?violation.path,
            "normalized {:?}",
            action
        );
        Some(repaired)
    }
}

fn dispatch_keys(selector: &Selector) -> Vec<DispatchKey> {
    match (selector.object, selector.node_type) {
        (Some(object), node_type) => vec![(object, node_type)],
        (None, Some(node_type)) => vec![(node_type.object(), Some(node_type))],
        (None, None) => [
            ObjectKind::Document,
            ObjectKind::Block,
            ObjectKind::Inline,
            ObjectKind::Text,
        ]
        .into_iter()
        .map(|object| (object, None))
        .collect(),
    }
}

fn check_children(rule: &Rule, children: &[Node]) -> Option<ErrorCode> {
    rule.nodes
        .iter()
        .any(|child| children.iter().filter(|n| child.accepts(n)).count() < child.min)
        .then_some(ErrorCode::ChildMinInvalid)
}

fn violation(
    (rule_index, rule): (usize, &Rule),
    path: Path,
    code: ErrorCode,
    next: Option<Path>,
) -> Violation {
    Violation {
        path,
        code,
        rule: rule.name.clone(),
        next,
        rule_index,
    }
}
