use thiserror::Error;

use crate::operation::UnboundVariable;

/// Any of these aborts the rewrite; no partial output is returned.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RewriteError {
    #[error("Unknown type `{0}`")]
    UnknownType(String),

    #[error("Type `{type_name}` has no field `{field}`")]
    UnknownField { type_name: String, field: String },

    #[error("No predicate is mapped for `{type_name}.{field}`")]
    UnresolvedPredicate { type_name: String, field: String },

    #[error("`{0}` is not a query field of this schema")]
    UnknownQuery(String),

    #[error("`{0}` is not a mutation field of this schema")]
    UnknownMutation(String),

    #[error(transparent)]
    UnboundVariable(#[from] UnboundVariable),

    #[error("Invalid argument `{argument}` on `{field}`: {reason}")]
    InvalidArgument {
        field: String,
        argument: String,
        reason: String,
    },

    #[error("Invalid argument on directive `@{directive}` of `{field}`: {reason}")]
    InvalidDirectiveArgument {
        field: String,
        directive: String,
        reason: String,
    },

    #[error("Invalid node identifier `{0}`")]
    InvalidUid(String),

    #[error("Selection is nested deeper than {max_depth} levels at `{field}`")]
    SelectionTooDeep { field: String, max_depth: u32 },
}

impl RewriteError {
    pub(crate) fn invalid_argument(
        field: impl Into<String>,
        argument: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        RewriteError::InvalidArgument {
            field: field.into(),
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_directive(
        field: impl Into<String>,
        directive: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        RewriteError::InvalidDirectiveArgument {
            field: field.into(),
            directive: directive.into(),
            reason: reason.into(),
        }
    }
}
