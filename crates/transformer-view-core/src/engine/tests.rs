use super::*;
use crate::error::Error;
use crate::resolution::{NamespaceConvention, TransformerRegistry, TransformerResolver};
use crate::transformer::{from_fn, FieldTransformer, Transformer};
use crate::types::{Entity, Query, Record, TransformerRef, ViewValue};
use serde_json::{json, Map, Value};
use std::sync::Arc;

const POST_TRANSFORMER: &str = "App\\Model\\Transformer\\PostTransformer";
const USER_TRANSFORMER: &str = "App\\Model\\Transformer\\UserTransformer";
const COMMENT_TRANSFORMER: &str = "App\\Model\\Transformer\\CommentTransformer";

fn user(name: &str) -> Record {
    Record::new("App\\Model\\Entity\\User").with_field("name", name)
}

fn comment(id: i64, author: &str) -> Record {
    Record::new("App\\Model\\Entity\\Comment")
        .with_field("id", id)
        .with_field("body", "hi")
        .with_relation("author", user(author))
}

fn post() -> Arc<dyn Entity> {
    Arc::new(
        Record::new("App\\Model\\Entity\\Post")
            .with_field("id", 1)
            .with_field("title", "Hello")
            .with_relation("author", user("ana"))
            .with_relation("comments", ViewValue::list(vec![comment(10, "bo"), comment(11, "cy")]))
            .with_relation("editor", Value::Null),
    )
}

fn resolver() -> TransformerResolver {
    let mut registry = TransformerRegistry::new();
    registry
        .register_definition(
            POST_TRANSFORMER,
            serde_json::from_value(json!({
                "fields": ["id", "title"],
                "includes": {
                    "author": {},
                    "comments": {},
                    "editor": {"relation": "editor", "transformer": USER_TRANSFORMER}
                }
            }))
            .unwrap(),
        )
        .unwrap();
    registry
        .register_definition(
            COMMENT_TRANSFORMER,
            serde_json::from_value(json!({
                "fields": ["id"],
                "includes": {"author": {}}
            }))
            .unwrap(),
        )
        .unwrap();
    registry.register_factory(USER_TRANSFORMER, || {
        Arc::new(FieldTransformer::passthrough(USER_TRANSFORMER)) as Arc<dyn Transformer>
    });
    TransformerResolver::new(Arc::new(registry), Arc::new(NamespaceConvention::default()))
}

fn post_transformer(resolver: &TransformerResolver) -> Arc<dyn Transformer> {
    resolver.instantiate(POST_TRANSFORMER).unwrap()
}

#[test]
fn test_include_directive_parsing() {
    let directive = IncludeDirective::parse(" author , comments.author,,");
    assert_eq!(directive.entries(), ["author", "comments.author"]);

    let from_list: IncludeDirective = serde_json::from_value(json!(["a", "b"])).unwrap();
    let from_str: IncludeDirective = serde_json::from_value(json!("a,b")).unwrap();
    assert_eq!(from_list, from_str);
    assert_eq!(serde_json::to_value(&from_list).unwrap(), json!(["a", "b"]));
}

#[test]
fn test_requested_includes_add_parents() {
    let directive = IncludeDirective::parse("comments.author.avatar");
    let requested = RequestedIncludes::parse(&directive, DEFAULT_RECURSION_LIMIT);
    assert_eq!(
        requested.paths().collect::<Vec<_>>(),
        vec!["comments", "comments.author", "comments.author.avatar"]
    );
    assert!(requested.is_requested("comments.author"));
    assert!(!requested.is_requested("author"));
}

#[test]
fn test_requested_includes_respect_recursion_limit() {
    let directive = IncludeDirective::parse("a.b.c.d");
    let requested = RequestedIncludes::parse(&directive, 2);
    assert_eq!(requested.paths().collect::<Vec<_>>(), vec!["a", "a.b"]);
}

#[test]
fn test_include_params() {
    let directive = IncludeDirective::parse("comments:limit(5|1):order(created_at|desc)");
    let requested = RequestedIncludes::parse(&directive, DEFAULT_RECURSION_LIMIT);
    assert!(requested.is_requested("comments"));

    let params = requested.params("comments").unwrap();
    assert_eq!(params.len(), 2);
    assert_eq!(params.get("limit"), Some(&["5".to_string(), "1".to_string()][..]));
    assert_eq!(params.first("order"), Some("created_at"));
    assert_eq!(params.first("missing"), None);
}

#[test]
fn test_serializer_envelopes() {
    let mut item = Map::new();
    item.insert("id".to_string(), json!(1));

    let flat = SerializerKind::Array.build();
    assert_eq!(flat.item(Some("post"), item.clone()), json!({"id": 1}));
    assert_eq!(flat.collection(Some("posts"), vec![json!(1)]), json!([1]));
    assert_eq!(flat.null(), Value::Null);

    let data = SerializerKind::Data.build();
    assert_eq!(data.item(None, item.clone()), json!({"data": {"id": 1}}));
    assert_eq!(data.collection(None, vec![]), json!({"data": []}));
    assert_eq!(data.null(), json!({"data": null}));

    let keyed = SerializerKind::Keyed.build();
    assert_eq!(keyed.collection(Some("posts"), vec![json!(1)]), json!({"posts": [1]}));
    assert_eq!(keyed.collection(None, vec![json!(1)]), json!({"data": [1]}));
    assert_eq!(keyed.item(Some("post"), item), json!({"id": 1}));
}

#[test]
fn test_serializer_kind_parsing() {
    assert_eq!("DATA".parse::<SerializerKind>().unwrap(), SerializerKind::Data);
    assert_eq!(SerializerKind::Keyed.to_string(), "keyed");
    assert!(matches!(
        "xml".parse::<SerializerKind>(),
        Err(Error::Configuration { .. })
    ));
    let kind: SerializerKind = serde_json::from_value(json!("array")).unwrap();
    assert_eq!(kind, SerializerKind::default());
}

#[test]
fn test_resource_for_value() {
    let resolver = resolver();
    let transformer = post_transformer(&resolver);

    let item = Resource::for_value(&post().into(), transformer.clone(), Some("post")).unwrap();
    assert_eq!(item.kind(), "item");
    assert_eq!(item.resource_key(), Some("post"));

    let list = ViewValue::List(vec![post().into(), post().into()]);
    assert_eq!(Resource::for_value(&list, transformer.clone(), None).unwrap().kind(), "collection");

    let mixed = ViewValue::List(vec![post().into(), ViewValue::Plain(json!(1))]);
    assert!(matches!(
        Resource::for_value(&mixed, transformer.clone(), None),
        Err(Error::UnserializableVariable { variable: None })
    ));

    let plain = ViewValue::Plain(json!("text"));
    assert!(Resource::for_value(&plain, transformer, None).is_err());
}

#[test]
fn test_manager_item_without_includes() {
    let resolver = resolver();
    let manager = Manager::new(&resolver, SerializerKind::Array.build());
    let resource = Resource::item(post(), post_transformer(&resolver));

    let output = manager.create_data(&resource).unwrap();
    assert_eq!(output, json!({"id": 1, "title": "Hello"}));
}

#[test]
fn test_manager_collection_with_data_serializer() {
    let resolver = resolver();
    let manager = Manager::new(&resolver, SerializerKind::Data.build());
    let resource = Resource::collection(vec![post(), post()], post_transformer(&resolver))
        .with_meta("total", 2);

    let output = manager.create_data(&resource).unwrap();
    assert_eq!(
        output,
        json!({
            "data": [{"id": 1, "title": "Hello"}, {"id": 1, "title": "Hello"}],
            "meta": {"total": 2}
        })
    );
}

#[test]
fn test_manager_nested_includes() {
    let resolver = resolver();
    let mut manager = Manager::new(&resolver, SerializerKind::Array.build());
    manager.parse_includes(&IncludeDirective::parse("author,comments.author,editor"));

    let output = manager
        .create_data(&Resource::item(post(), post_transformer(&resolver)))
        .unwrap();
    assert_eq!(
        output,
        json!({
            "id": 1,
            "title": "Hello",
            "author": {"name": "ana"},
            "comments": [
                {"id": 10, "author": {"name": "bo"}},
                {"id": 11, "author": {"name": "cy"}}
            ],
            "editor": null
        })
    );
}

#[test]
fn test_manager_includes_are_scoped() {
    let resolver = resolver();
    let mut manager = Manager::new(&resolver, SerializerKind::Array.build());
    // `author` at the root does not request `comments.author`
    manager.parse_includes(&IncludeDirective::parse("author,comments"));

    let output = manager
        .create_data(&Resource::item(post(), post_transformer(&resolver)))
        .unwrap();
    assert_eq!(output["comments"], json!([{"id": 10}, {"id": 11}]));
}

#[test]
fn test_manager_recursion_limit() {
    let resolver = resolver();
    let mut manager =
        Manager::new(&resolver, SerializerKind::Array.build()).with_recursion_limit(1);
    manager.parse_includes(&IncludeDirective::parse("comments.author"));

    let output = manager
        .create_data(&Resource::item(post(), post_transformer(&resolver)))
        .unwrap();
    assert_eq!(output["comments"], json!([{"id": 10}, {"id": 11}]));
    assert!(!manager.requested_includes().is_requested("comments.author"));
}

#[test]
fn test_include_without_transformer_is_primitive() {
    let mut registry = TransformerRegistry::new();
    registry
        .register_definition(
            "PostTransformer",
            serde_json::from_value(json!({
                "fields": ["id"],
                "includes": {"author": {}},
                "default_includes": ["author"]
            }))
            .unwrap(),
        )
        .unwrap();
    let resolver =
        TransformerResolver::new(Arc::new(registry), Arc::new(NamespaceConvention::default()));
    let manager = Manager::new(&resolver, SerializerKind::Data.build());
    let transformer = resolver.instantiate("PostTransformer").unwrap();

    let output = manager.create_data(&Resource::item(post(), transformer)).unwrap();
    assert_eq!(output, json!({"data": {"id": 1, "author": {"name": "ana"}}}));
}

#[test]
fn test_declared_but_unimplemented_include_fails() {
    struct Advertising;

    impl Transformer for Advertising {
        fn name(&self) -> &str {
            "Advertising"
        }

        fn transform(&self, _entity: &dyn Entity) -> crate::Result<Map<String, Value>> {
            Ok(Map::new())
        }

        fn default_includes(&self) -> Vec<String> {
            vec!["author".to_string()]
        }
    }

    let resolver = resolver();
    let manager = Manager::new(&resolver, SerializerKind::Array.build());
    let err = manager
        .create_data(&Resource::item(post(), Arc::new(Advertising)))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownInclude { ref relation, .. } if relation == "author"));
}

#[test]
fn test_include_context_sees_params() {
    struct Limited;

    impl Transformer for Limited {
        fn transform(&self, _entity: &dyn Entity) -> crate::Result<Map<String, Value>> {
            Ok(Map::new())
        }

        fn available_includes(&self) -> Vec<String> {
            vec!["comments".to_string()]
        }

        fn include(
            &self,
            entity: &dyn Entity,
            _relation: &str,
            context: &IncludeContext<'_>,
        ) -> crate::Result<Option<Resource>> {
            let limit: usize = context
                .params()
                .first("limit")
                .and_then(|l| l.parse().ok())
                .unwrap_or(usize::MAX);
            let rows: Vec<Arc<dyn Entity>> = match entity.related("comments") {
                Some(ViewValue::List(items)) => items
                    .into_iter()
                    .filter_map(|item| item.as_entity().cloned())
                    .take(limit)
                    .collect(),
                _ => Vec::new(),
            };
            let transformer = context.transformer(COMMENT_TRANSFORMER)?;
            assert_eq!(context.path(), "comments");
            Ok(Some(Resource::collection(rows, transformer)))
        }
    }

    let resolver = resolver();
    let mut manager = Manager::new(&resolver, SerializerKind::Array.build());
    manager.parse_includes(&IncludeDirective::parse("comments:limit(1)"));

    let output = manager
        .create_data(&Resource::item(post(), Arc::new(Limited)))
        .unwrap();
    assert_eq!(output, json!({"comments": [{"id": 10}]}));
}

#[test]
fn test_fn_transformer_errors_propagate() {
    let failing = from_fn("Failing", |_entity: &dyn Entity| {
        Err(anyhow::anyhow!("no title").into())
    });
    let resolver = resolver();
    let manager = Manager::new(&resolver, SerializerKind::Array.build());
    let err = manager
        .create_data(&Resource::item(post(), Arc::new(failing)))
        .unwrap_err();
    assert!(matches!(err, Error::Transformation { .. }));
}

#[test]
fn test_empty_query_collection() {
    let resolver = resolver();
    let manager = Manager::new(&resolver, SerializerKind::Data.build());
    let value = ViewValue::cursor(Query::from_rows("App\\Model\\Entity\\Post", Vec::new()));
    let resolved = resolver
        .resolve(&value, &TransformerRef::Infer)
        .unwrap()
        .unwrap();
    let resource = Resource::for_value(&value, resolved.transformer, None).unwrap();
    assert_eq!(manager.create_data(&resource).unwrap(), json!({"data": []}));
}
