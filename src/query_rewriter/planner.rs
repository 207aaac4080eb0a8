//! Root function selection for top-level query blocks.

use std::collections::BTreeMap;

use crate::dql_generator::{FilterFunction, FilterTree, RootFunction};
use crate::operation::Value;
use crate::schema_catalog::{QueryKind, QueryOperation, Schema};

use super::arguments::{parse_uid_list, FILTER_ARG};
use super::errors::RewriteError;

pub const ID_ARG: &str = "id";
const IDS_KEY: &str = "ids";

/// How a top-level block selects its starting nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct RootPlan {
    pub func: RootFunction,
    /// Field arguments left for the block, with any root-level `ids` removed
    pub arguments: BTreeMap<String, Value>,
    /// `type(T)` filter to conjoin when the root no longer implies the type
    pub type_filter: Option<FilterTree>,
}

/// Plan a generated `get<T>` / `query<T>` field. `arguments` must already be
/// resolved against the bound variables.
pub fn plan_generated(
    schema: &Schema,
    field: &str,
    operation: &QueryOperation,
    mut arguments: BTreeMap<String, Value>,
) -> Result<RootPlan, RewriteError> {
    let type_name = dgraph_type_name(schema, &operation.type_name)?;

    match operation.kind {
        QueryKind::Get => {
            let id = arguments.remove(ID_ARG).ok_or_else(|| {
                RewriteError::invalid_argument(field, ID_ARG, "a node identifier is required")
            })?;
            let uids = parse_uid_list(&id)?;
            if uids.len() != 1 {
                return Err(RewriteError::invalid_argument(
                    field,
                    ID_ARG,
                    "expected exactly one node identifier",
                ));
            }
            Ok(RootPlan {
                func: RootFunction::Uid(uids),
                arguments,
                type_filter: Some(type_filter(type_name)),
            })
        }
        QueryKind::Query => match take_root_ids(&mut arguments)? {
            Some(ids) => Ok(RootPlan {
                func: RootFunction::Uid(ids),
                arguments,
                type_filter: Some(type_filter(type_name)),
            }),
            None => Ok(RootPlan {
                func: RootFunction::Type(type_name.to_string()),
                arguments,
                type_filter: None,
            }),
        },
    }
}

/// Plan a top-level field under a caller-chosen root function. An `ids`
/// filter narrows a `uid` root to the intersection of both sets.
pub fn plan_supplied(
    schema: &Schema,
    type_name: &str,
    root: RootFunction,
    mut arguments: BTreeMap<String, Value>,
) -> Result<RootPlan, RewriteError> {
    let root_uids = match root {
        RootFunction::Uid(uids) => uids,
        other => {
            return Ok(RootPlan {
                func: other,
                arguments,
                type_filter: None,
            })
        }
    };

    match take_root_ids(&mut arguments)? {
        Some(ids) => {
            let narrowed: Vec<u64> = root_uids.into_iter().filter(|u| ids.contains(u)).collect();
            let type_name = dgraph_type_name(schema, type_name)?;
            Ok(RootPlan {
                func: RootFunction::Uid(narrowed),
                arguments,
                type_filter: Some(type_filter(type_name)),
            })
        }
        None => Ok(RootPlan {
            func: RootFunction::Uid(root_uids),
            arguments,
            type_filter: None,
        }),
    }
}

/// Remove `ids` from the top level of the `filter` argument and return them.
fn take_root_ids(arguments: &mut BTreeMap<String, Value>) -> Result<Option<Vec<u64>>, RewriteError> {
    let Some(Value::Object(filter)) = arguments.get_mut(FILTER_ARG) else {
        return Ok(None);
    };
    let Some(ids) = filter.remove(IDS_KEY) else {
        return Ok(None);
    };
    let uids = parse_uid_list(&ids)?;
    if filter.is_empty() {
        arguments.remove(FILTER_ARG);
    }
    Ok(Some(uids))
}

fn dgraph_type_name<'s>(schema: &'s Schema, type_name: &str) -> Result<&'s str, RewriteError> {
    schema
        .get_type(type_name)
        .map(|def| def.dgraph_name())
        .ok_or_else(|| RewriteError::UnknownType(type_name.to_string()))
}

fn type_filter(type_name: &str) -> FilterTree {
    FilterTree::Function(FilterFunction::type_of(type_name))
}
