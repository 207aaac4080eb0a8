//! Top-level `get<T>` / `query<T>` rewriting.

use std::sync::Arc;

use dql_rewriter::config::RewriterConfig;
use dql_rewriter::dql_generator::{RootFunction, Selector};
use dql_rewriter::operation::{Field, Operation, Variables};
use dql_rewriter::schema_catalog::{SchemaConfig, SchemaRegistry, TypeDefinitionConfig};
use dql_rewriter::{QueryRewriter, RewriteError, ToDql};
use pretty_assertions::assert_eq;

use crate::{load_schema, rewriter};

fn rewrite(fixture: &str, operation: &str) -> String {
    let rewriter = rewriter(fixture);
    let operation = Operation::from_yaml_str(operation).unwrap();
    rewriter.rewrite_queries(&operation).unwrap().to_dql()
}

#[test]
fn test_get_by_id() {
    let dql = rewrite(
        "blog.yaml",
        r#"
queries:
  - name: getPost
    arguments: { id: "0x4" }
    selection_set:
      - name: postID
      - name: title
"#,
    );
    assert_eq!(
        dql,
        "query {
  getPost(func: uid(0x4)) @filter(type(Post)) {
    postID : uid
    title : Post.title
  }
}"
    );
}

#[test]
fn test_query_by_type_with_arguments() {
    let dql = rewrite(
        "blog.yaml",
        r#"
queries:
  - name: queryPost
    arguments:
      filter: { title: { anyofterms: GraphQL } }
      order: { desc: numLikes, then: { asc: title } }
      first: 10
      offset: 20
    selection_set:
      - name: title
"#,
    );
    assert_eq!(
        dql,
        r#"query {
  queryPost(func: type(Post), first: 10, offset: 20, orderdesc: Post.numLikes, orderasc: Post.title) @filter(anyofterms(Post.title, "GraphQL")) {
    title : Post.title
  }
}"#
    );
}

#[test]
fn test_ids_filter_moves_into_root_function() {
    let dql = rewrite(
        "blog.yaml",
        r#"
queries:
  - name: queryPost
    arguments:
      filter: { ids: ["0x1", "0x2"], isPublished: true }
      first: 5
    selection_set:
      - name: title
"#,
    );
    assert_eq!(
        dql,
        "query {
  queryPost(func: uid(0x1, 0x2), first: 5) @filter((eq(Post.isPublished, true) AND type(Post))) {
    title : Post.title
  }
}"
    );
}

#[test]
fn test_interface_query_uses_renamed_type() {
    let dql = rewrite(
        "starwars.yaml",
        r#"
queries:
  - name: queryCharacter
    selection_set:
      - name: __typename
      - name: name
      - name: appearsIn
"#,
    );
    assert_eq!(
        dql,
        "query {
  queryCharacter(func: type(performance.character)) {
    dgraph.type
    name : performance.character.name
    appearsIn : performance.character.appearsIn
  }
}"
    );
}

#[test]
fn test_nested_filter_resolves_against_field_type() {
    let dql = rewrite(
        "blog.yaml",
        r#"
queries:
  - name: queryAuthor
    selection_set:
      - name: name
      - name: posts
        arguments:
          filter: { title: { eq: "x" } }
          first: 2
        selection_set:
          - name: title
"#,
    );
    assert_eq!(
        dql,
        r#"query {
  queryAuthor(func: type(Author)) {
    name : Author.name
    posts : Author.posts(first: 2) @filter(eq(Post.title, "x")) {
      title : Post.title
      dgraph.uid : uid
    }
  }
}"#
    );
}

#[test]
fn test_multi_operator_leaf_combines_with_and() {
    let dql = rewrite(
        "blog.yaml",
        r#"
queries:
  - name: queryPost
    arguments:
      filter: { numLikes: { le: 10, ge: 2 } }
    selection_set:
      - name: title
"#,
    );
    assert!(dql.contains("@filter((ge(Post.numLikes, 2) AND le(Post.numLikes, 10)))"));
}

#[test]
fn test_alias_never_reaches_output() {
    let rewriter = rewriter("blog.yaml");
    let field = Field::new("queryPost")
        .with_alias("posts")
        .select(Field::new("title").with_alias("heading"))
        .select(
            Field::new("author")
                .with_alias("writer")
                .select(Field::new("name").with_alias("fullName")),
        );
    let root = rewriter
        .rewrite_query(&field, &Variables::new())
        .unwrap()
        .unwrap();

    assert_eq!(root.name, "queryPost");
    assert!(root.block.entry("heading").is_none());
    assert_eq!(
        root.block.entry("title").map(|e| &e.selector),
        Some(&Selector::Predicate("Post.title".to_string()))
    );
    let author = root.block.entry("author").and_then(|e| e.block.as_ref()).unwrap();
    assert!(author.entry("name").is_some());
}

#[test]
fn test_sentinel_on_every_nested_block() {
    let rewriter = rewriter("blog.yaml");
    let field = Field::new("queryCategory").select(
        Field::new("posts").select(Field::new("title")).select(
            Field::new("author")
                .select(Field::new("id"))
                .select(Field::new("name")),
        ),
    );
    let root = rewriter
        .rewrite_query(&field, &Variables::new())
        .unwrap()
        .unwrap();

    // Not on the top-level block
    assert!(!root.block.selects_uid());
    let posts = root.block.entry("posts").and_then(|e| e.block.as_ref()).unwrap();
    assert!(posts.entry("dgraph.uid").is_some());
    // A block that already selects uid gets no second one
    let author = posts.entry("author").and_then(|e| e.block.as_ref()).unwrap();
    assert!(author.entry("dgraph.uid").is_none());
    assert!(author.selects_uid());
}

#[test]
fn test_caller_supplied_root() {
    let rewriter = rewriter("blog.yaml");
    let field = Field::new("post")
        .with_argument(
            "filter",
            dql_rewriter::operation::Value::from(serde_json::json!({ "ids": ["0x2", "0x3"] })),
        )
        .select(Field::new("title"));

    let root = rewriter
        .rewrite_query_with_root(
            &field,
            "AddPostPayload",
            RootFunction::Uid(vec![1, 2]),
            &Variables::new(),
        )
        .unwrap()
        .unwrap();
    assert_eq!(
        root.to_dql(),
        "post(func: uid(0x2)) @filter(type(Post)) {\n  title : Post.title\n}"
    );
}

#[test]
fn test_rewrite_errors() {
    let rewriter = rewriter("blog.yaml");
    let vars = Variables::new();

    assert_eq!(
        rewriter.rewrite_query(&Field::new("listPosts"), &vars),
        Err(RewriteError::UnknownQuery("listPosts".to_string()))
    );
    assert_eq!(
        rewriter.rewrite_query(
            &Field::new("getPost")
                .with_argument("id", "not-a-uid")
                .select(Field::new("title")),
            &vars
        ),
        Err(RewriteError::InvalidUid("not-a-uid".to_string()))
    );
    assert_eq!(
        rewriter.rewrite_query(
            &Field::new("queryPost").select(Field::new("summary")),
            &vars
        ),
        Err(RewriteError::UnknownField {
            type_name: "Post".to_string(),
            field: "summary".to_string()
        })
    );
    assert!(matches!(
        rewriter.rewrite_query(
            &Field::new("queryPost")
                .with_argument("first", dql_rewriter::operation::Value::variable("n"))
                .select(Field::new("title")),
            &vars
        ),
        Err(RewriteError::UnboundVariable(_))
    ));
}

#[test]
fn test_depth_ceiling_from_config() {
    let config = RewriterConfig {
        max_selection_depth: 2,
        ..Default::default()
    };
    let rewriter = QueryRewriter::new(Arc::new(load_schema("blog.yaml")), config);
    let field = Field::new("queryPost").select(
        Field::new("author").select(Field::new("posts").select(Field::new("title"))),
    );
    assert_eq!(
        rewriter.rewrite_query(&field, &Variables::new()),
        Err(RewriteError::SelectionTooDeep {
            field: "title".to_string(),
            max_depth: 2
        })
    );
}

#[test]
fn test_rewriter_follows_registry_snapshots() {
    let registry = SchemaRegistry::new(load_schema("blog.yaml"));
    let before = QueryRewriter::from_registry(&registry, RewriterConfig::default());

    let renamed = SchemaConfig {
        name: Some("blog-v2".to_string()),
        types: vec![TypeDefinitionConfig::object("Post")
            .with_renamed_field("title", "String", "headline")],
    }
    .to_schema()
    .unwrap();
    registry.publish(renamed);
    let after = QueryRewriter::from_registry(&registry, RewriterConfig::default());

    let field = Field::new("queryPost").select(Field::new("title"));
    let old = before.rewrite_query(&field, &Variables::new()).unwrap().unwrap();
    let new = after.rewrite_query(&field, &Variables::new()).unwrap().unwrap();
    assert!(old.to_dql().contains("title : Post.title"));
    assert!(new.to_dql().contains("title : headline"));
}

#[test]
fn test_empty_uid_root_omits_the_block() {
    let dql = rewrite(
        "blog.yaml",
        r#"
queries:
  - name: queryPost
    arguments:
      filter: { ids: [] }
    selection_set:
      - name: title
  - name: queryAuthor
    selection_set:
      - name: name
"#,
    );
    assert_eq!(
        dql,
        "query {
  queryAuthor(func: type(Author)) {
    name : Author.name
  }
}"
    );

    let rewriter = rewriter("blog.yaml");
    let field = Field::new("post")
        .with_argument(
            "filter",
            dql_rewriter::operation::Value::from(serde_json::json!({ "ids": ["0x9"] })),
        )
        .select(Field::new("title"));
    assert_eq!(
        rewriter.rewrite_query_with_root(
            &field,
            "AddPostPayload",
            RootFunction::Uid(vec![1, 2]),
            &Variables::new(),
        ),
        Ok(None)
    );
}
