//! @skip / @include / @cascade through whole rewrites.

use dql_rewriter::operation::{Directive, Field, Operation, Value, Variables};
use dql_rewriter::{RewriteError, ToDql};
use pretty_assertions::assert_eq;
use test_case::test_case;

use crate::rewriter;

fn bind(skip: bool, include: bool) -> Variables {
    let mut variables = Variables::new();
    variables.insert("skip".to_string(), Value::Boolean(skip));
    variables.insert("include".to_string(), Value::Boolean(include));
    variables
}

#[test_case(false, true, true ; "neither skipped nor excluded")]
#[test_case(true, true, false ; "skip true wins")]
#[test_case(false, false, false ; "include false omits")]
#[test_case(true, false, false ; "both omit")]
fn test_skip_include_on_nested_block(skip: bool, include: bool, kept: bool) {
    let rewriter = rewriter("blog.yaml");
    let field = Field::new("queryPost").select(Field::new("title")).select(
        Field::new("author")
            .with_directive(Directive::skip(Value::variable("skip")))
            .with_directive(Directive::include(Value::variable("include")))
            .select(Field::new("name")),
    );

    let root = rewriter
        .rewrite_query(&field, &bind(skip, include))
        .unwrap()
        .unwrap();
    assert_eq!(root.block.entry("author").is_some(), kept);
    assert!(root.block.entry("title").is_some());
}

#[test]
fn test_skipped_top_level_field_is_omitted() {
    let rewriter = rewriter("blog.yaml");
    let operation = Operation::from_yaml_str(
        r#"
queries:
  - name: queryPost
    directives: [{ name: skip, arguments: { if: { "$var": hide } } }]
    selection_set: [{ name: title }]
  - name: queryAuthor
    selection_set: [{ name: name }]
variables:
  hide: true
"#,
    )
    .unwrap();

    let query = rewriter.rewrite_queries(&operation).unwrap();
    assert_eq!(query.blocks.len(), 1);
    assert_eq!(query.blocks[0].name, "queryAuthor");
}

#[test]
fn test_bad_condition_fails_whole_rewrite() {
    let rewriter = rewriter("blog.yaml");
    let field = Field::new("queryPost")
        .select(Field::new("title"))
        .select(Field::new("text").with_directive(Directive::include(Value::variable("show"))));
    assert!(matches!(
        rewriter.rewrite_query(&field, &Variables::new()),
        Err(RewriteError::UnboundVariable(_))
    ));

    let field = Field::new("queryPost")
        .select(Field::new("text").with_directive(Directive::include(Value::Int(1))));
    assert!(matches!(
        rewriter.rewrite_query(&field, &Variables::new()),
        Err(RewriteError::InvalidDirectiveArgument { .. })
    ));
}

#[test]
fn test_cascade_applies_only_to_its_own_block() {
    let rewriter = rewriter("blog.yaml");
    let field = Field::new("queryAuthor").select(Field::new("name")).select(
        Field::new("posts")
            .with_directive(Directive::cascade())
            .select(Field::new("title"))
            .select(Field::new("category").select(Field::new("name"))),
    );
    let dql = rewriter
        .rewrite_query(&field, &Variables::new())
        .unwrap()
        .unwrap()
        .to_dql();

    assert_eq!(
        dql,
        "queryAuthor(func: type(Author)) {
  name : Author.name
  posts : Author.posts @cascade {
    title : Post.title
    category : Post.category {
      name : Category.name
      dgraph.uid : uid
    }
    dgraph.uid : uid
  }
}"
    );
}

#[test]
fn test_cascade_at_several_levels_is_additive() {
    let rewriter = rewriter("blog.yaml");
    let field = Field::new("queryPost")
        .with_directive(Directive::cascade())
        .select(Field::new("title"))
        .select(
            Field::new("author")
                .with_directive(
                    Directive::cascade()
                        .with_argument("fields", Value::List(vec![Value::from("dob")])),
                )
                .select(Field::new("name"))
                .select(Field::new("dob")),
        );
    let root = rewriter
        .rewrite_query(&field, &Variables::new())
        .unwrap()
        .unwrap();

    assert_eq!(
        root.to_dql(),
        "queryPost(func: type(Post)) @cascade {
  title : Post.title
  author : Post.author @cascade(Author.dob) {
    name : Author.name
    dob : Author.dob
    dgraph.uid : uid
  }
}"
    );
}

#[test]
fn test_cascade_fields_must_resolve() {
    let rewriter = rewriter("blog.yaml");
    let field = Field::new("queryPost")
        .with_directive(
            Directive::cascade().with_argument("fields", Value::List(vec![Value::from("rating")])),
        )
        .select(Field::new("title"));
    assert_eq!(
        rewriter.rewrite_query(&field, &Variables::new()),
        Err(RewriteError::UnresolvedPredicate {
            type_name: "Post".to_string(),
            field: "rating".to_string()
        })
    );
}

#[test]
fn test_unknown_directives_are_ignored() {
    let rewriter = rewriter("blog.yaml");
    let field = Field::new("queryPost")
        .select(Field::new("title").with_directive(Directive::new("deprecated")));
    let root = rewriter
        .rewrite_query(&field, &Variables::new())
        .unwrap()
        .unwrap();
    assert!(root.block.entry("title").is_some());
}
