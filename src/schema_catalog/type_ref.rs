use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::{all_consuming, map, opt, recognize},
    error::ParseError,
    sequence::{delimited, pair},
    IResult, Parser,
};
use serde::{Deserialize, Serialize};

use super::errors::SchemaError;

/// A GraphQL type reference as written on a field: `String`, `ID!`, `[Post!]!`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeRef {
    Named { name: String, non_null: bool },
    List { inner: Box<TypeRef>, non_null: bool },
}

impl TypeRef {
    pub fn parse(input: &str) -> Result<Self, SchemaError> {
        match all_consuming(ws(type_ref)).parse(input) {
            Ok((_, parsed)) => Ok(parsed),
            Err(e) => Err(SchemaError::InvalidTypeRef {
                type_ref: input.to_string(),
                reason: match e {
                    nom::Err::Error(err) | nom::Err::Failure(err) if err.input.is_empty() => {
                        "unexpected end of input".to_string()
                    }
                    nom::Err::Error(err) | nom::Err::Failure(err) => {
                        format!("unexpected input at `{}`", err.input)
                    }
                    nom::Err::Incomplete(_) => "incomplete input".to_string(),
                },
            }),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            non_null: false,
        }
    }

    pub fn non_null(self) -> Self {
        match self {
            TypeRef::Named { name, .. } => TypeRef::Named {
                name,
                non_null: true,
            },
            TypeRef::List { inner, .. } => TypeRef::List {
                inner,
                non_null: true,
            },
        }
    }

    pub fn list_of(inner: TypeRef) -> Self {
        TypeRef::List {
            inner: Box::new(inner),
            non_null: false,
        }
    }

    /// The innermost named type, with list and non-null wrappers stripped.
    pub fn named_type(&self) -> &str {
        match self {
            TypeRef::Named { name, .. } => name,
            TypeRef::List { inner, .. } => inner.named_type(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, TypeRef::List { .. })
    }

    pub fn is_non_null(&self) -> bool {
        match self {
            TypeRef::Named { non_null, .. } | TypeRef::List { non_null, .. } => *non_null,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let non_null = match self {
            TypeRef::Named { name, non_null } => {
                write!(f, "{}", name)?;
                *non_null
            }
            TypeRef::List { inner, non_null } => {
                write!(f, "[{}]", inner)?;
                *non_null
            }
        };
        if non_null {
            write!(f, "!")?;
        }
        Ok(())
    }
}

fn ws<'a, O, E: ParseError<&'a str>, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
{
    delimited(multispace0, inner, multispace0)
}

// GraphQL names: /[_A-Za-z][_0-9A-Za-z]*/
fn type_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

fn named_type(input: &str) -> IResult<&str, TypeRef> {
    map(
        pair(ws(type_name), opt(ws(char('!')))),
        |(name, bang)| TypeRef::Named {
            name: name.to_string(),
            non_null: bang.is_some(),
        },
    )
    .parse(input)
}

fn list_type(input: &str) -> IResult<&str, TypeRef> {
    map(
        pair(
            delimited(ws(char('[')), type_ref, ws(char(']'))),
            opt(ws(char('!'))),
        ),
        |(inner, bang)| TypeRef::List {
            inner: Box::new(inner),
            non_null: bang.is_some(),
        },
    )
    .parse(input)
}

fn type_ref(input: &str) -> IResult<&str, TypeRef> {
    alt((list_type, named_type)).parse(input)
}
