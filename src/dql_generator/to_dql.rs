use super::{
    Cascade, DqlQuery, Entry, FilterFunction, FilterTree, OrderClause, Pagination, QueryBlock,
    RootFunction, RootQuery, Selector,
};

pub const DEFAULT_INDENT_WIDTH: usize = 2;

/// Convert a DQL tree node to query text
pub trait ToDql {
    fn to_dql(&self) -> String;
}

/// Node identifiers render as lower-case hex: `0x4`
pub fn format_uid(uid: u64) -> String {
    format!("{:#x}", uid)
}

impl DqlQuery {
    /// Render with a custom indentation width
    pub fn render(&self, indent_width: usize) -> String {
        let step = " ".repeat(indent_width);
        let mut out = String::from("query {\n");
        for root in &self.blocks {
            write_root(&mut out, root, &step, &step);
        }
        out.push('}');
        out
    }
}

impl ToDql for DqlQuery {
    fn to_dql(&self) -> String {
        self.render(DEFAULT_INDENT_WIDTH)
    }
}

impl ToDql for RootQuery {
    fn to_dql(&self) -> String {
        let step = " ".repeat(DEFAULT_INDENT_WIDTH);
        let mut out = String::new();
        write_root(&mut out, self, "", &step);
        // drop the trailing newline
        out.pop();
        out
    }
}

impl ToDql for RootFunction {
    fn to_dql(&self) -> String {
        match self {
            RootFunction::Uid(uids) => FilterFunction::uid(uids).to_dql(),
            RootFunction::Type(type_name) => FilterFunction::type_of(type_name.as_str()).to_dql(),
            RootFunction::Function(func) => func.to_dql(),
        }
    }
}

impl ToDql for FilterFunction {
    fn to_dql(&self) -> String {
        format!("{}({})", self.name, self.args.join(", "))
    }
}

impl ToDql for FilterTree {
    fn to_dql(&self) -> String {
        match self {
            FilterTree::Function(func) => func.to_dql(),
            FilterTree::And(children) => join_filters(children, " AND "),
            FilterTree::Or(children) => join_filters(children, " OR "),
            FilterTree::Not(child) => format!("NOT ({})", child.to_dql()),
        }
    }
}

impl ToDql for OrderClause {
    fn to_dql(&self) -> String {
        let direction = if self.descending { "orderdesc" } else { "orderasc" };
        format!("{}: {}", direction, self.predicate)
    }
}

impl ToDql for Cascade {
    fn to_dql(&self) -> String {
        if self.predicates.is_empty() {
            "@cascade".to_string()
        } else {
            format!("@cascade({})", self.predicates.join(", "))
        }
    }
}

impl ToDql for Selector {
    fn to_dql(&self) -> String {
        match self {
            Selector::Uid => "uid".to_string(),
            Selector::Predicate(predicate) => predicate.clone(),
        }
    }
}

fn join_filters(children: &[FilterTree], op: &str) -> String {
    match children {
        [] => String::new(),
        [only] => only.to_dql(),
        _ => {
            let parts: Vec<String> = children.iter().map(|c| c.to_dql()).collect();
            format!("({})", parts.join(op))
        }
    }
}

/// `first: N, offset: M, orderasc: P, ...` in that order
fn block_arguments(pagination: &Pagination, order: &[OrderClause]) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(first) = pagination.first {
        args.push(format!("first: {}", first));
    }
    if let Some(offset) = pagination.offset {
        args.push(format!("offset: {}", offset));
    }
    args.extend(order.iter().map(|o| o.to_dql()));
    args
}

fn write_directives(out: &mut String, block: &QueryBlock) {
    if let Some(cascade) = &block.cascade {
        out.push(' ');
        out.push_str(&cascade.to_dql());
    }
    if let Some(filter) = &block.filter {
        out.push_str(" @filter(");
        out.push_str(&filter.to_dql());
        out.push(')');
    }
}

fn write_root(out: &mut String, root: &RootQuery, prefix: &str, step: &str) {
    out.push_str(prefix);
    out.push_str(&root.name);
    out.push_str("(func: ");
    out.push_str(&root.func.to_dql());
    for arg in block_arguments(&root.block.pagination, &root.block.order) {
        out.push_str(", ");
        out.push_str(&arg);
    }
    out.push(')');
    write_directives(out, &root.block);
    write_entries(out, &root.block.entries, prefix, step);
    out.push('\n');
}

fn write_entries(out: &mut String, entries: &[Entry], prefix: &str, step: &str) {
    out.push_str(" {\n");
    let inner = format!("{}{}", prefix, step);
    for entry in entries {
        write_entry(out, entry, &inner, step);
    }
    out.push_str(prefix);
    out.push('}');
}

fn write_entry(out: &mut String, entry: &Entry, prefix: &str, step: &str) {
    out.push_str(prefix);
    if let Some(alias) = &entry.alias {
        out.push_str(alias);
        out.push_str(" : ");
    }
    out.push_str(&entry.selector.to_dql());

    if let Some(block) = &entry.block {
        let args = block_arguments(&block.pagination, &block.order);
        if !args.is_empty() {
            out.push('(');
            out.push_str(&args.join(", "));
            out.push(')');
        }
        write_directives(out, block);
        write_entries(out, &block.entries, prefix, step);
    }
    out.push('\n');
}
