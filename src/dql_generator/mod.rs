//! Native query (DQL) tree produced by the rewriter, plus its text rendering.
//!
//! The tree is plain owned data: a rewrite builds one from scratch and hands
//! it to the caller, who may render it with [`ToDql`] or inspect it directly.

use serde::{Deserialize, Serialize};

mod to_dql;

pub use to_dql::{format_uid, ToDql};

/// A complete `query { ... }` document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DqlQuery {
    pub blocks: Vec<RootQuery>,
}

impl DqlQuery {
    pub fn new(blocks: Vec<RootQuery>) -> Self {
        DqlQuery { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// A top-level block: `name(func: ...) { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootQuery {
    pub name: String,
    pub func: RootFunction,
    pub block: QueryBlock,
}

/// Selects the initial node set of a top-level block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RootFunction {
    /// `uid(0x1, 0x2)`
    Uid(Vec<u64>),
    /// `type(Post)`
    Type(String),
    /// Any index function, e.g. `eq(Post.title, "x")`
    Function(FilterFunction),
}

impl RootFunction {
    /// True for a `uid` root with no uids left; such a block matches nothing
    pub fn matches_nothing(&self) -> bool {
        matches!(self, RootFunction::Uid(uids) if uids.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryBlock {
    pub entries: Vec<Entry>,
    pub filter: Option<FilterTree>,
    pub order: Vec<OrderClause>,
    pub pagination: Pagination,
    pub cascade: Option<Cascade>,
}

impl QueryBlock {
    /// Whether any entry selects the node identifier
    pub fn selects_uid(&self) -> bool {
        self.entries.iter().any(|e| e.selector == Selector::Uid)
    }

    pub fn entry(&self, alias: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|e| e.alias.as_deref() == Some(alias))
    }

    /// Conjoin `filter` with whatever filter the block already has.
    pub fn add_filter(&mut self, filter: FilterTree) {
        self.filter = Some(match self.filter.take() {
            None => filter,
            Some(existing) => FilterTree::And(vec![existing, filter]),
        });
    }
}

/// `alias : selector`, optionally followed by a nested block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub alias: Option<String>,
    pub selector: Selector,
    pub block: Option<QueryBlock>,
}

impl Entry {
    pub fn scalar(alias: impl Into<String>, selector: Selector) -> Self {
        Entry {
            alias: Some(alias.into()),
            selector,
            block: None,
        }
    }

    pub fn nested(alias: impl Into<String>, selector: Selector, block: QueryBlock) -> Self {
        Entry {
            alias: Some(alias.into()),
            selector,
            block: Some(block),
        }
    }

    /// An entry rendered without an alias, e.g. `dgraph.type`
    pub fn bare(selector: Selector) -> Self {
        Entry {
            alias: None,
            selector,
            block: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selector {
    Uid,
    Predicate(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterTree {
    Function(FilterFunction),
    And(Vec<FilterTree>),
    Or(Vec<FilterTree>),
    Not(Box<FilterTree>),
}

/// `name(arg, arg, ...)`; arguments are kept in their rendered form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterFunction {
    pub name: String,
    pub args: Vec<String>,
}

impl FilterFunction {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        FilterFunction {
            name: name.into(),
            args,
        }
    }

    pub fn uid(uids: &[u64]) -> Self {
        FilterFunction::new("uid", uids.iter().map(|u| format_uid(*u)).collect())
    }

    pub fn type_of(type_name: impl Into<String>) -> Self {
        FilterFunction::new("type", vec![type_name.into()])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderClause {
    pub predicate: String,
    pub descending: bool,
}

impl OrderClause {
    pub fn asc(predicate: impl Into<String>) -> Self {
        OrderClause {
            predicate: predicate.into(),
            descending: false,
        }
    }

    pub fn desc(predicate: impl Into<String>) -> Self {
        OrderClause {
            predicate: predicate.into(),
            descending: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub first: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.offset.is_none()
    }
}

/// `@cascade`, or `@cascade(pred, ...)` when restricted to some fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cascade {
    pub predicates: Vec<String>,
}
