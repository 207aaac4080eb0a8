//! End-to-end tests - schema definition in, DQL text out
//!
//! These run the public API (and the `dql-rewriter` binary) the way a caller
//! would: compile a schema definition, rewrite a mutation payload over the
//! uids it affected, render the result.

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::process::Command;
    use std::sync::Arc;

    use dql_rewriter::config::RewriterConfig;
    use dql_rewriter::operation::{Field, Value, Variables};
    use dql_rewriter::schema_catalog::{SchemaConfig, TypeDefinitionConfig};
    use dql_rewriter::{QueryRewriter, ToDql};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn blog_rewriter() -> QueryRewriter {
        let schema = SchemaConfig {
            name: Some("blog".to_string()),
            types: vec![
                TypeDefinitionConfig::object("Post")
                    .with_field("postID", "ID!")
                    .with_field("title", "String")
                    .with_field("author", "Author!"),
                TypeDefinitionConfig::object("Author").with_field("name", "String!"),
            ],
        }
        .to_schema()
        .unwrap();
        QueryRewriter::new(Arc::new(schema), RewriterConfig::default())
    }

    fn add_post(post: Field) -> Field {
        Field::new("addPost").select(post).select(Field::new("numUids"))
    }

    #[test]
    fn test_payload_selection() {
        let mutation = add_post(
            Field::new("post")
                .select(Field::new("postID"))
                .select(Field::new("title")),
        );
        let query = blog_rewriter()
            .rewrite_mutation_payload(&mutation, &[0x4], &Variables::new())
            .unwrap();

        assert_eq!(
            query.to_dql(),
            "query {
  post(func: uid(0x4)) {
    postID : uid
    title : Post.title
  }
}"
        );
    }

    #[test]
    fn test_payload_with_filter_order_and_pagination() {
        let mutation = add_post(
            Field::new("post")
                .with_argument(
                    "filter",
                    Value::from(json!({ "title": { "anyofterms": "GraphQL" } })),
                )
                .with_argument("order", Value::from(json!({ "asc": "title" })))
                .with_argument("first", 0i64)
                .with_argument("offset", 10i64)
                .select(Field::new("postID"))
                .select(Field::new("title")),
        );
        let query = blog_rewriter()
            .rewrite_mutation_payload(&mutation, &[0x4], &Variables::new())
            .unwrap();

        assert_eq!(
            query.to_dql(),
            r#"query {
  post(func: uid(0x4), first: 0, offset: 10, orderasc: Post.title) @filter(anyofterms(Post.title, "GraphQL")) {
    postID : uid
    title : Post.title
  }
}"#
        );
    }

    #[test]
    fn test_payload_with_nested_relation() {
        let mutation = add_post(
            Field::new("post")
                .select(Field::new("title"))
                .select(Field::new("author").select(Field::new("name"))),
        );
        let query = blog_rewriter()
            .rewrite_mutation_payload(&mutation, &[0x4], &Variables::new())
            .unwrap();

        assert_eq!(
            query.to_dql(),
            "query {
  post(func: uid(0x4)) {
    title : Post.title
    author : Post.author {
      name : Author.name
      dgraph.uid : uid
    }
  }
}"
        );
    }

    #[test]
    fn test_cli_renders_queries_and_payloads() {
        let fixtures = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures");

        let mut operation = tempfile::NamedTempFile::new().unwrap();
        write!(
            operation,
            "{}",
            json!({
                "queries": [{
                    "name": "getAuthor",
                    "arguments": { "id": "0x9" },
                    "selection_set": [{ "name": "name" }]
                }],
                "mutations": [{
                    "name": "addAuthor",
                    "selection_set": [{ "name": "author", "selection_set": [{ "name": "dob" }] }]
                }]
            })
        )
        .unwrap();

        let run = |extra: &[&str]| {
            let output = Command::new(env!("CARGO_BIN_EXE_dql-rewriter"))
                .arg("--schema")
                .arg(fixtures.join("blog.yaml"))
                .arg("--operation")
                .arg(operation.path())
                .args(extra)
                .env_remove("DQL_REWRITER_MAX_DEPTH")
                .env_remove("DQL_REWRITER_UID_ALIAS")
                .env_remove("DQL_REWRITER_INDENT")
                .output()
                .unwrap();
            assert!(
                output.status.success(),
                "{}",
                String::from_utf8_lossy(&output.stderr)
            );
            String::from_utf8(output.stdout).unwrap()
        };

        assert_eq!(
            run(&[]),
            "query {\n  getAuthor(func: uid(0x9)) @filter(type(Author)) {\n    name : Author.name\n  }\n}\n"
        );
        assert_eq!(
            run(&["--root-uids", "0x1,0x2", "--indent", "4"]),
            "query {\n    author(func: uid(0x1, 0x2)) {\n        dob : Author.dob\n    }\n}\n"
        );
    }
}
