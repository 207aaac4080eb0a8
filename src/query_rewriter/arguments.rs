//! Filter, order and pagination arguments to native clauses.
//!
//! Inputs are expected to be variable-free: callers resolve argument values
//! against the bound variables before handing them over.

use std::collections::BTreeMap;

use crate::dql_generator::{FilterFunction, FilterTree, OrderClause, Pagination};
use crate::operation::{UnboundVariable, Value};
use crate::schema_catalog::{PredicateMap, Schema, TypeKind};

use super::errors::RewriteError;

pub const FILTER_ARG: &str = "filter";
pub const ORDER_ARG: &str = "order";
pub const FIRST_ARG: &str = "first";
pub const OFFSET_ARG: &str = "offset";

const AND: &str = "and";
const OR: &str = "or";
const NOT: &str = "not";
const IDS: &str = "ids";
const HAS: &str = "has";
const REGEXP: &str = "regexp";
const BETWEEN: &str = "between";

/// Translates the arguments of one field against the type that field returns.
pub struct ArgumentTranslator<'a> {
    schema: &'a Schema,
    predicates: &'a PredicateMap,
    type_name: &'a str,
    field: &'a str,
}

impl<'a> ArgumentTranslator<'a> {
    pub fn new(schema: &'a Schema, type_name: &'a str, field: &'a str) -> Self {
        ArgumentTranslator {
            schema,
            predicates: schema.predicates(),
            type_name,
            field,
        }
    }

    /// `None` for a filter that constrains nothing, e.g. `{}`.
    pub fn filter(&self, filter: &Value) -> Result<Option<FilterTree>, RewriteError> {
        let object = filter
            .as_object()
            .ok_or_else(|| self.invalid(FILTER_ARG, "expected an input object"))?;
        self.filter_object(object)
    }

    fn filter_object(
        &self,
        object: &BTreeMap<String, Value>,
    ) -> Result<Option<FilterTree>, RewriteError> {
        let mut ands = Vec::new();
        let mut alternatives = None;

        // BTreeMap iteration is sorted, which keeps the output stable
        for (key, value) in object {
            match key.as_str() {
                AND => {
                    for nested in self.nested_filters(AND, value)? {
                        ands.extend(self.filter_object(nested)?);
                    }
                }
                OR => {
                    let mut branches = Vec::new();
                    for nested in self.nested_filters(OR, value)? {
                        branches.extend(self.filter_object(nested)?);
                    }
                    alternatives = combine(branches, FilterTree::Or);
                }
                NOT => {
                    let nested = value
                        .as_object()
                        .ok_or_else(|| self.invalid(FILTER_ARG, "`not` expects an input object"))?;
                    if let Some(tree) = self.filter_object(nested)? {
                        ands.push(FilterTree::Not(Box::new(tree)));
                    }
                }
                IDS => {
                    let uids = parse_uid_list(value)?;
                    ands.push(FilterTree::Function(FilterFunction::uid(&uids)));
                }
                HAS => {
                    let fields: Vec<&Value> = match value {
                        Value::List(items) => items.iter().collect(),
                        single => vec![single],
                    };
                    for field in fields {
                        let name = field
                            .as_str()
                            .ok_or_else(|| self.invalid(FILTER_ARG, "`has` expects field names"))?;
                        let predicate = self.predicate(name)?;
                        ands.push(FilterTree::Function(FilterFunction::new(
                            HAS,
                            vec![predicate.to_string()],
                        )));
                    }
                }
                field => ands.extend(self.field_filter(field, value)?),
            }
        }

        let conjunction = combine(ands, FilterTree::And);
        Ok(match (conjunction, alternatives) {
            (None, alternatives) => alternatives,
            (conjunction, None) => conjunction,
            (Some(conjunction), Some(alternatives)) => {
                Some(FilterTree::Or(vec![conjunction, alternatives]))
            }
        })
    }

    /// `and` / `or` accept a single object or a list of them.
    fn nested_filters<'v>(
        &self,
        combinator: &str,
        value: &'v Value,
    ) -> Result<Vec<&'v BTreeMap<String, Value>>, RewriteError> {
        let reason = || format!("`{}` expects an input object or a list of them", combinator);
        match value {
            Value::Object(object) => Ok(vec![object]),
            Value::List(items) => items
                .iter()
                .map(|item| {
                    item.as_object()
                        .ok_or_else(|| self.invalid(FILTER_ARG, reason()))
                })
                .collect(),
            _ => Err(self.invalid(FILTER_ARG, reason())),
        }
    }

    fn field_filter(&self, field: &str, value: &Value) -> Result<Vec<FilterTree>, RewriteError> {
        let predicate = self.predicate(field)?;
        if let Some(values) = self.enum_values(field) {
            self.check_enum_operands(field, values, value)?;
        }
        match value {
            Value::Object(operators) => operators
                .iter()
                .map(|(op, operand)| {
                    let mut args = vec![predicate.to_string()];
                    args.extend(self.operand(op, operand)?);
                    Ok(FilterTree::Function(FilterFunction::new(op.as_str(), args)))
                })
                .collect(),
            scalar => {
                let mut args = vec![predicate.to_string()];
                args.extend(self.operand("eq", scalar)?);
                Ok(vec![FilterTree::Function(FilterFunction::new("eq", args))])
            }
        }
    }

    /// Declared values when `field` is enum-typed
    fn enum_values(&self, field: &str) -> Option<&'a [String]> {
        let schema = self.schema;
        let field_type = schema.get_type(self.type_name)?.field(field)?.type_ref.named_type();
        schema
            .get_type(field_type)
            .filter(|def| def.kind == TypeKind::Enum)
            .map(|def| def.enum_values.as_slice())
    }

    /// An enum operand outside the declared values can never match.
    /// `regexp` patterns are left alone.
    fn check_enum_operands(
        &self,
        field: &str,
        values: &[String],
        value: &Value,
    ) -> Result<(), RewriteError> {
        let mut pending: Vec<&Value> = match value {
            Value::Object(operators) => operators
                .iter()
                .filter(|(op, _)| op.as_str() != REGEXP)
                .map(|(_, operand)| operand)
                .collect(),
            other => vec![other],
        };
        while let Some(operand) = pending.pop() {
            match operand {
                Value::String(s) if !values.contains(s) => {
                    return Err(self.invalid(
                        FILTER_ARG,
                        format!("`{}` is not a value of the enum behind `{}`", s, field),
                    ))
                }
                Value::List(items) => pending.extend(items),
                Value::Object(bounds) => pending.extend(bounds.values()),
                _ => {}
            }
        }
        Ok(())
    }

    fn operand(&self, op: &str, operand: &Value) -> Result<Vec<String>, RewriteError> {
        match operand {
            Value::List(items) => items.iter().map(|item| self.scalar_operand(op, item)).collect(),
            Value::Object(bounds) if op == BETWEEN => {
                let bound = |name: &str| {
                    bounds
                        .get(name)
                        .ok_or_else(|| self.invalid(FILTER_ARG, format!("`between` needs `{}`", name)))
                        .and_then(|v| self.scalar_operand(op, v))
                };
                Ok(vec![bound("min")?, bound("max")?])
            }
            scalar => Ok(vec![self.scalar_operand(op, scalar)?]),
        }
    }

    fn scalar_operand(&self, op: &str, operand: &Value) -> Result<String, RewriteError> {
        match operand {
            Value::String(s) if op == REGEXP => Ok(s.clone()),
            Value::String(s) => Ok(quote(s)),
            Value::Float(f) => Ok(format!("\"{}\"", f)),
            Value::Int(i) => Ok(i.to_string()),
            Value::Boolean(b) => Ok(b.to_string()),
            Value::Variable(name) => Err(UnboundVariable(name.clone()).into()),
            Value::Null => Err(self.invalid(FILTER_ARG, format!("`{}` has a null operand", op))),
            Value::List(_) | Value::Object(_) => Err(self.invalid(
                FILTER_ARG,
                format!("`{}` expects a scalar or a list of scalars", op),
            )),
        }
    }

    /// `{asc: field, then: {...}}`, or a list of such objects, in priority order.
    pub fn order(&self, order: &Value) -> Result<Vec<OrderClause>, RewriteError> {
        let mut clauses = Vec::new();
        match order {
            Value::List(items) => {
                for item in items {
                    self.order_chain(item, &mut clauses)?;
                }
            }
            single => self.order_chain(single, &mut clauses)?,
        }
        Ok(clauses)
    }

    fn order_chain(&self, order: &Value, clauses: &mut Vec<OrderClause>) -> Result<(), RewriteError> {
        let mut next = Some(order);
        while let Some(current) = next {
            let object = current
                .as_object()
                .ok_or_else(|| self.invalid(ORDER_ARG, "expected an input object"))?;

            let clause = match (object.get("asc"), object.get("desc")) {
                (Some(field), None) => OrderClause::asc(self.order_predicate(field)?),
                (None, Some(field)) => OrderClause::desc(self.order_predicate(field)?),
                _ => {
                    return Err(self.invalid(ORDER_ARG, "exactly one of `asc` or `desc` is required"))
                }
            };
            clauses.push(clause);
            next = object.get("then").filter(|then| !then.is_null());
        }
        Ok(())
    }

    fn order_predicate(&self, field: &Value) -> Result<&'a str, RewriteError> {
        let name = field
            .as_str()
            .ok_or_else(|| self.invalid(ORDER_ARG, "expected a field name"))?;
        self.predicate(name)
    }

    pub fn pagination(
        &self,
        first: Option<&Value>,
        offset: Option<&Value>,
    ) -> Result<Pagination, RewriteError> {
        Ok(Pagination {
            first: self.integer(FIRST_ARG, first)?,
            offset: self.integer(OFFSET_ARG, offset)?,
        })
    }

    fn integer(&self, argument: &str, value: Option<&Value>) -> Result<Option<i64>, RewriteError> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.invalid(argument, "expected an integer")),
        }
    }

    fn predicate(&self, field: &str) -> Result<&'a str, RewriteError> {
        self.predicates
            .resolve(self.type_name, field)
            .ok_or_else(|| RewriteError::UnresolvedPredicate {
                type_name: self.type_name.to_string(),
                field: field.to_string(),
            })
    }

    fn invalid(&self, argument: &str, reason: impl Into<String>) -> RewriteError {
        RewriteError::invalid_argument(self.field, argument, reason)
    }
}

fn combine(mut trees: Vec<FilterTree>, op: fn(Vec<FilterTree>) -> FilterTree) -> Option<FilterTree> {
    match trees.len() {
        0 => None,
        1 => trees.pop(),
        _ => Some(op(trees)),
    }
}

/// Double-quoted with JSON string escapes
fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Accepts `0x`-prefixed hex and plain decimal identifiers.
pub fn parse_uid(text: &str) -> Result<u64, RewriteError> {
    let trimmed = text.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse::<u64>(),
    };
    match parsed {
        Ok(uid) if uid != 0 => Ok(uid),
        _ => Err(RewriteError::InvalidUid(text.to_string())),
    }
}

/// A single identifier or a list of them, as strings or integers.
pub fn parse_uid_list(value: &Value) -> Result<Vec<u64>, RewriteError> {
    let single = |v: &Value| match v {
        Value::String(s) => parse_uid(s),
        Value::Int(i) if *i > 0 => Ok(*i as u64),
        Value::Variable(name) => Err(UnboundVariable(name.clone()).into()),
        other => Err(RewriteError::InvalidUid(
            serde_json::Value::from(other.clone()).to_string(),
        )),
    };
    match value {
        Value::List(items) => items.iter().map(single).collect(),
        other => Ok(vec![single(other)?]),
    }
}
