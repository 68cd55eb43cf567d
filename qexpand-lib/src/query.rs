//! Boolean query trees: nested AND/OR groups of literal terms.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    pub fn keyword(self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
        }
    }
}

/// A child of a query node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryItem {
    Term(String),
    Node(QueryNode),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryNode {
    operator: Operator,
    /// Debug label describing which expansion step built the node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    items: Vec<QueryItem>,
}

impl QueryNode {
    pub fn new(operator: Operator) -> Self {
        Self {
            operator,
            name: None,
            items: Vec::new(),
        }
    }

    pub fn and() -> Self {
        Self::new(Operator::And)
    }

    pub fn or() -> Self {
        Self::new(Operator::Or)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn items(&self) -> &[QueryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append a literal term. A two-character term ending in a single quote is
    /// dropped.
    pub fn append(&mut self, term: impl Into<String>) {
        let term = term.into();
        if is_degenerate(&term) {
            return;
        }
        self.items.push(QueryItem::Term(term));
    }

    /// Append every term, dropping degenerate ones like [`QueryNode::append`].
    pub fn extend_terms<I, S>(&mut self, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for term in terms {
            self.append(term);
        }
    }

    /// Append a child group.
    pub fn push(&mut self, node: QueryNode) {
        self.items.push(QueryItem::Node(node));
    }

    /// Remove structurally equal children, keeping the first of each.
    pub fn dedup(&mut self) {
        let mut seen = HashSet::new();
        self.items.retain(|item| seen.insert(item.clone()));
    }

    /// Every literal term in the tree, depth first.
    pub fn terms(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_terms(&mut out);
        out
    }

    fn collect_terms<'a>(&'a self, out: &mut Vec<&'a str>) {
        for item in &self.items {
            match item {
                QueryItem::Term(t) => out.push(t),
                QueryItem::Node(n) => n.collect_terms(out),
            }
        }
    }
}

fn is_degenerate(term: &str) -> bool {
    let mut chars = term.chars();
    matches!((chars.next(), chars.next(), chars.next()), (Some(_), Some('\''), None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_term_is_dropped() {
        let mut or = QueryNode::or();
        or.append("hest");
        or.append("s'");
        or.append("ø'");
        assert_eq!(or.len(), 1);
        // Only exactly two characters are filtered.
        or.append("'");
        or.append("Hans'");
        assert_eq!(or.terms(), vec!["hest", "'", "Hans'"]);
    }

    #[test]
    fn test_dedup_is_structural() {
        let mut inner = QueryNode::or();
        inner.extend_terms(["a", "b"]);
        let mut node = QueryNode::or();
        node.extend_terms(["x", "y", "x"]);
        node.push(inner.clone());
        node.push(inner);
        node.dedup();
        assert_eq!(node.len(), 3);
        assert_eq!(node.terms(), vec!["x", "y", "a", "b"]);
    }

    #[test]
    fn test_terms_depth_first() {
        let mut and = QueryNode::and();
        let mut first = QueryNode::or().named("first");
        first.extend_terms(["hest", "heste"]);
        and.push(first);
        and.append("og");
        assert_eq!(and.terms(), vec!["hest", "heste", "og"]);
        assert_eq!(and.operator(), Operator::And);
    }
}
