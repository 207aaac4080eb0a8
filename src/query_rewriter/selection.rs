//! Recursive translation of selection sets into nested query blocks.

use std::collections::BTreeMap;

use crate::config::RewriterConfig;
use crate::dql_generator::{Cascade, Entry, QueryBlock, Selector};
use crate::operation::{Field, Value, Variables};
use crate::schema_catalog::schema::{DGRAPH_TYPE_PREDICATE, TYPENAME_FIELD};
use crate::schema_catalog::{FieldDefinition, Schema};

use super::arguments::{ArgumentTranslator, FILTER_ARG, FIRST_ARG, OFFSET_ARG, ORDER_ARG};
use super::directives::evaluate_directives;
use super::errors::RewriteError;

/// One rewrite's view of the world. Everything is borrowed; nothing outlives
/// the call that created it.
pub(crate) struct SelectionRewriter<'a> {
    schema: &'a Schema,
    config: &'a RewriterConfig,
    variables: &'a Variables,
}

/// Where a block sits in the output tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockPosition {
    TopLevel,
    Nested,
}

impl<'a> SelectionRewriter<'a> {
    pub fn new(schema: &'a Schema, config: &'a RewriterConfig, variables: &'a Variables) -> Self {
        SelectionRewriter {
            schema,
            config,
            variables,
        }
    }

    /// Field definition of `owner_type.field`, with the failure naming
    /// whichever of the two is missing.
    pub fn field_definition(
        &self,
        owner_type: &str,
        field: &str,
    ) -> Result<&'a FieldDefinition, RewriteError> {
        let owner = self
            .schema
            .get_type(owner_type)
            .ok_or_else(|| RewriteError::UnknownType(owner_type.to_string()))?;
        owner.field(field).ok_or_else(|| RewriteError::UnknownField {
            type_name: owner_type.to_string(),
            field: field.to_string(),
        })
    }

    /// Substitute bound variables into every argument of `field`.
    pub fn resolve_arguments(&self, field: &Field) -> Result<BTreeMap<String, Value>, RewriteError> {
        field
            .arguments
            .iter()
            .map(|(name, value)| Ok((name.clone(), value.resolve(self.variables)?)))
            .collect()
    }

    /// Build the block for `field`, whose declared type is `field_type`.
    ///
    /// `arguments` are the field's resolved arguments (a top-level block may
    /// have had some consumed by root planning) and `cascade` the marker its
    /// directives asked for.
    pub fn block(
        &self,
        field: &Field,
        field_type: &str,
        arguments: &BTreeMap<String, Value>,
        cascade: Option<Vec<String>>,
        position: BlockPosition,
        depth: u32,
    ) -> Result<QueryBlock, RewriteError> {
        let mut block = QueryBlock::default();

        if self.schema.is_interface(field_type) {
            block
                .entries
                .push(Entry::bare(Selector::Predicate(DGRAPH_TYPE_PREDICATE.to_string())));
        }

        for child in &field.selection_set {
            if let Some(entry) = self.rewrite_field(child, field_type, depth + 1)? {
                block.entries.push(entry);
            }
        }

        if position == BlockPosition::Nested && !block.selects_uid() {
            block.entries.push(Entry::scalar(
                self.config.uid_sentinel_alias.as_str(),
                Selector::Uid,
            ));
        }

        let translator = ArgumentTranslator::new(self.schema, field_type, &field.name);
        if let Some(filter) = arguments.get(FILTER_ARG).filter(|f| !f.is_null()) {
            block.filter = translator.filter(filter)?;
        }
        if let Some(order) = arguments.get(ORDER_ARG).filter(|o| !o.is_null()) {
            block.order = translator.order(order)?;
        }
        block.pagination =
            translator.pagination(arguments.get(FIRST_ARG), arguments.get(OFFSET_ARG))?;
        block.cascade = cascade
            .map(|fields| self.cascade(field_type, fields))
            .transpose()?;

        Ok(block)
    }

    /// Rewrite one selected field of `owner_type`; `None` when the field
    /// produces no output.
    pub fn rewrite_field(
        &self,
        field: &Field,
        owner_type: &str,
        depth: u32,
    ) -> Result<Option<Entry>, RewriteError> {
        if field.name == TYPENAME_FIELD {
            return Ok(None);
        }
        let directives = evaluate_directives(field, self.variables)?;
        if !directives.included {
            log::trace!("Omitting `{}.{}`", owner_type, field.name);
            return Ok(None);
        }

        // Only fields that reach the output count against the ceiling
        if depth > self.config.max_selection_depth {
            return Err(RewriteError::SelectionTooDeep {
                field: field.name.clone(),
                max_depth: self.config.max_selection_depth,
            });
        }

        let definition = self.field_definition(owner_type, &field.name)?;
        log::trace!("Rewriting `{}.{}` at depth {}", owner_type, field.name, depth);

        if definition.is_identifier() {
            return Ok(Some(Entry::scalar(field.name.as_str(), Selector::Uid)));
        }

        let predicate = self
            .schema
            .predicates()
            .resolve(owner_type, &field.name)
            .ok_or_else(|| RewriteError::UnresolvedPredicate {
                type_name: owner_type.to_string(),
                field: field.name.clone(),
            })?;
        let selector = Selector::Predicate(predicate.to_string());

        let field_type = definition.type_ref.named_type();
        if !field.has_selection() || !self.schema.is_object_like(field_type) {
            return Ok(Some(Entry::scalar(field.name.as_str(), selector)));
        }

        let arguments = self.resolve_arguments(field)?;
        let block = self.block(
            field,
            field_type,
            &arguments,
            directives.cascade,
            BlockPosition::Nested,
            depth,
        )?;
        Ok(Some(Entry::nested(field.name.as_str(), selector, block)))
    }

    fn cascade(&self, field_type: &str, fields: Vec<String>) -> Result<Cascade, RewriteError> {
        let predicates = fields
            .iter()
            .map(|name| {
                self.schema
                    .predicates()
                    .resolve(field_type, name)
                    .map(str::to_string)
                    .ok_or_else(|| RewriteError::UnresolvedPredicate {
                        type_name: field_type.to_string(),
                        field: name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Cascade { predicates })
    }
}
