use crate::operation::{Directive, Field, Value, Variables};

use super::errors::RewriteError;

pub const SKIP: &str = "skip";
pub const INCLUDE: &str = "include";
pub const CASCADE: &str = "cascade";

const IF_ARG: &str = "if";
const FIELDS_ARG: &str = "fields";

/// The directives the rewriter acts on. Anything else is carried as `Other`
/// and ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDirective {
    Skip(bool),
    Include(bool),
    /// Field names the cascade is restricted to; empty means every field
    Cascade(Vec<String>),
    Other(String),
}

impl FieldDirective {
    pub fn evaluate(
        directive: &Directive,
        field: &str,
        variables: &Variables,
    ) -> Result<Self, RewriteError> {
        match directive.name.as_str() {
            SKIP => Ok(FieldDirective::Skip(condition(directive, field, variables)?)),
            INCLUDE => Ok(FieldDirective::Include(condition(directive, field, variables)?)),
            CASCADE => Ok(FieldDirective::Cascade(cascade_fields(
                directive, field, variables,
            )?)),
            other => Ok(FieldDirective::Other(other.to_string())),
        }
    }
}

/// What the directives on one field decided.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectiveOutcome {
    pub included: bool,
    /// `Some` when the field's own block gets a cascade marker
    pub cascade: Option<Vec<String>>,
}

/// Evaluate every directive on `field` before anything is emitted for it.
///
/// A skip that evaluates to true omits the field; otherwise an include that
/// evaluates to false omits it. All conditions are checked even when the
/// outcome is already known, so a bad binding always fails the rewrite.
pub fn evaluate_directives(
    field: &Field,
    variables: &Variables,
) -> Result<DirectiveOutcome, RewriteError> {
    let mut skip = false;
    let mut include = true;
    let mut cascade: Option<Vec<String>> = None;

    for directive in &field.directives {
        match FieldDirective::evaluate(directive, &field.name, variables)? {
            FieldDirective::Skip(condition) => skip |= condition,
            FieldDirective::Include(condition) => include &= condition,
            FieldDirective::Cascade(fields) => cascade = merge_cascade(cascade, Some(fields)),
            FieldDirective::Other(name) => {
                log::warn!("Ignoring directive @{} on field `{}`", name, field.name);
            }
        }
    }

    Ok(DirectiveOutcome {
        included: !skip && include,
        cascade,
    })
}

/// Combine two cascade markers meant for the same block.
pub fn merge_cascade(
    current: Option<Vec<String>>,
    other: Option<Vec<String>>,
) -> Option<Vec<String>> {
    match (current, other) {
        (None, other) => other,
        (current, None) => current,
        // An unrestricted cascade covers any restricted one
        (Some(a), Some(b)) if a.is_empty() || b.is_empty() => Some(Vec::new()),
        (Some(mut a), Some(b)) => {
            for field in b {
                if !a.contains(&field) {
                    a.push(field);
                }
            }
            Some(a)
        }
    }
}

fn condition(
    directive: &Directive,
    field: &str,
    variables: &Variables,
) -> Result<bool, RewriteError> {
    let value = directive.arguments.get(IF_ARG).ok_or_else(|| {
        RewriteError::invalid_directive(field, &directive.name, "missing `if` argument")
    })?;
    value.resolve(variables)?.as_bool().ok_or_else(|| {
        RewriteError::invalid_directive(field, &directive.name, "`if` must be a boolean")
    })
}

fn cascade_fields(
    directive: &Directive,
    field: &str,
    variables: &Variables,
) -> Result<Vec<String>, RewriteError> {
    let Some(value) = directive.arguments.get(FIELDS_ARG) else {
        return Ok(Vec::new());
    };
    let invalid = || {
        RewriteError::invalid_directive(field, CASCADE, "`fields` must be a list of field names")
    };
    match value.resolve(variables)? {
        Value::Null => Ok(Vec::new()),
        Value::String(name) => Ok(vec![name]),
        Value::List(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(name) => Ok(name),
                _ => Err(invalid()),
            })
            .collect(),
        _ => Err(invalid()),
    }
}
