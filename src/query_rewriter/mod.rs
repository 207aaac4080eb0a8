//! GraphQL operation -> DQL query rewriting.
//!
//! A [`QueryRewriter`] pairs one compiled schema snapshot with the rewriter
//! configuration. Each call builds a fresh [`DqlQuery`] tree; nothing is
//! cached between calls, so one rewriter can serve many threads at once.
//!
//! Top-level query fields start from a root function chosen by the planner
//! (`get<T>` -> `uid(id)`, `query<T>` -> `type(T)`) or supplied by the caller.
//! Mutation payloads start from the uids the mutation touched.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::RewriterConfig;
use crate::dql_generator::{DqlQuery, RootFunction, RootQuery};
use crate::operation::{Field, Operation, Value, Variables};
use crate::schema_catalog::schema::{QUERY_TYPE, TYPENAME_FIELD};
use crate::schema_catalog::{Schema, SchemaRegistry};

pub mod arguments;
pub mod directives;
pub mod errors;
pub mod planner;
mod selection;

pub use errors::RewriteError;

use directives::{evaluate_directives, merge_cascade};
use planner::RootPlan;
use selection::{BlockPosition, SelectionRewriter};

/// Top-level blocks sit at depth 0; their children start at 1
const TOP_LEVEL_DEPTH: u32 = 0;

#[derive(Debug, Clone)]
pub struct QueryRewriter {
    schema: Arc<Schema>,
    config: RewriterConfig,
}

impl QueryRewriter {
    pub fn new(schema: Arc<Schema>, config: RewriterConfig) -> Self {
        QueryRewriter { schema, config }
    }

    /// Rewriter over whatever schema the registry publishes right now.
    pub fn from_registry(registry: &SchemaRegistry, config: RewriterConfig) -> Self {
        Self::new(registry.current(), config)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &RewriterConfig {
        &self.config
    }

    /// Render with the configured indentation
    pub fn render(&self, query: &DqlQuery) -> String {
        query.render(usize::from(self.config.indent_width))
    }

    /// Rewrite a generated `get<T>` / `query<T>` field. `Ok(None)` when the
    /// field's directives omit it or its root can match no node.
    pub fn rewrite_query(
        &self,
        field: &Field,
        variables: &Variables,
    ) -> Result<Option<RootQuery>, RewriteError> {
        if field.name == TYPENAME_FIELD {
            return Ok(None);
        }
        let operation = self
            .schema
            .query(&field.name)
            .ok_or_else(|| RewriteError::UnknownQuery(field.name.clone()))?;
        let field_type = self.field_type(QUERY_TYPE, &field.name)?;

        self.rewrite_top_level(field, field_type, variables, |arguments| {
            planner::plan_generated(&self.schema, &field.name, operation, arguments)
        })
    }

    /// Rewrite any field of `owner_type` as a top-level block starting from
    /// `root`.
    pub fn rewrite_query_with_root(
        &self,
        field: &Field,
        owner_type: &str,
        root: RootFunction,
        variables: &Variables,
    ) -> Result<Option<RootQuery>, RewriteError> {
        let field_type = self.field_type(owner_type, &field.name)?;

        self.rewrite_top_level(field, field_type, variables, |arguments| {
            planner::plan_supplied(&self.schema, field_type, root, arguments)
        })
    }

    /// Rewrite every query field of `operation` into one document.
    pub fn rewrite_queries(&self, operation: &Operation) -> Result<DqlQuery, RewriteError> {
        let mut blocks = Vec::with_capacity(operation.queries.len());
        for field in &operation.queries {
            blocks.extend(self.rewrite_query(field, &operation.variables)?);
        }
        Ok(DqlQuery::new(blocks))
    }

    /// Fetch query for the result of `mutation`, starting from the nodes the
    /// mutation affected.
    ///
    /// Every object-typed payload field becomes one top-level block rooted at
    /// `uid(uids)`. Scalar payload fields such as `numUids` are answered by
    /// the mutation itself and produce nothing. A cascade on the mutation
    /// field applies to each of those blocks separately.
    pub fn rewrite_mutation_payload(
        &self,
        mutation: &Field,
        uids: &[u64],
        variables: &Variables,
    ) -> Result<DqlQuery, RewriteError> {
        let operation = self
            .schema
            .mutation(&mutation.name)
            .ok_or_else(|| RewriteError::UnknownMutation(mutation.name.clone()))?;

        let directives = evaluate_directives(mutation, variables)?;
        if !directives.included {
            return Ok(DqlQuery::default());
        }
        if uids.is_empty() {
            log::debug!("Mutation `{}` affected no nodes; nothing to fetch", mutation.name);
            return Ok(DqlQuery::default());
        }

        let payload_type = operation.payload_type.as_str();
        let selection = SelectionRewriter::new(&self.schema, &self.config, variables);
        let mut blocks = Vec::new();

        for child in &mutation.selection_set {
            if child.name == TYPENAME_FIELD {
                continue;
            }
            let definition = selection.field_definition(payload_type, &child.name)?;
            let field_type = definition.type_ref.named_type();
            if !self.schema.is_object_like(field_type) {
                continue;
            }

            let child_directives = evaluate_directives(child, variables)?;
            if !child_directives.included {
                continue;
            }

            let cascade = merge_cascade(directives.cascade.clone(), child_directives.cascade);
            let plan = planner::plan_supplied(
                &self.schema,
                field_type,
                RootFunction::Uid(uids.to_vec()),
                selection.resolve_arguments(child)?,
            )?;
            blocks.extend(self.top_level_block(&selection, child, field_type, plan, cascade)?);
        }

        log::debug!(
            "Rewrote payload of `{}` over {} uid(s) into {} block(s)",
            mutation.name,
            uids.len(),
            blocks.len()
        );
        Ok(DqlQuery::new(blocks))
    }

    /// Payload fetches for every mutation of `operation`, all rooted at `uids`.
    pub fn rewrite_mutations(
        &self,
        operation: &Operation,
        uids: &[u64],
    ) -> Result<DqlQuery, RewriteError> {
        let mut blocks = Vec::new();
        for mutation in &operation.mutations {
            let payload = self.rewrite_mutation_payload(mutation, uids, &operation.variables)?;
            blocks.extend(payload.blocks);
        }
        Ok(DqlQuery::new(blocks))
    }

    fn rewrite_top_level<F>(
        &self,
        field: &Field,
        field_type: &str,
        variables: &Variables,
        plan: F,
    ) -> Result<Option<RootQuery>, RewriteError>
    where
        F: FnOnce(BTreeMap<String, Value>) -> Result<RootPlan, RewriteError>,
    {
        let directives = evaluate_directives(field, variables)?;
        if !directives.included {
            log::debug!("Top-level field `{}` omitted by its directives", field.name);
            return Ok(None);
        }

        let selection = SelectionRewriter::new(&self.schema, &self.config, variables);
        let plan = plan(selection.resolve_arguments(field)?)?;
        let Some(root) =
            self.top_level_block(&selection, field, field_type, plan, directives.cascade)?
        else {
            return Ok(None);
        };

        log::debug!(
            "Rewrote `{}` into a block with {} entries",
            field.name,
            root.block.entries.len()
        );
        Ok(Some(root))
    }

    fn top_level_block(
        &self,
        selection: &SelectionRewriter<'_>,
        field: &Field,
        field_type: &str,
        plan: RootPlan,
        cascade: Option<Vec<String>>,
    ) -> Result<Option<RootQuery>, RewriteError> {
        let mut block = selection.block(
            field,
            field_type,
            &plan.arguments,
            cascade,
            BlockPosition::TopLevel,
            TOP_LEVEL_DEPTH,
        )?;
        if plan.func.matches_nothing() {
            log::debug!("`{}` has an empty uid root; block omitted", field.name);
            return Ok(None);
        }
        if let Some(type_filter) = plan.type_filter {
            block.add_filter(type_filter);
        }

        Ok(Some(RootQuery {
            name: field.name.clone(),
            func: plan.func,
            block,
        }))
    }

    fn field_type<'s>(&'s self, owner_type: &str, field: &str) -> Result<&'s str, RewriteError> {
        let owner = self
            .schema
            .get_type(owner_type)
            .ok_or_else(|| RewriteError::UnknownType(owner_type.to_string()))?;
        owner
            .field(field)
            .map(|f| f.type_ref.named_type())
            .ok_or_else(|| RewriteError::UnknownField {
                type_name: owner_type.to_string(),
                field: field.to_string(),
            })
    }
}
