use super::*;
use crate::error::Error;
use crate::transformer::{FieldTransformer, Transformer, TransformerDefinition};
use crate::types::{Entity, Query, Record, ResultSet, TransformerRef, ViewValue};
use serde_json::json;
use std::sync::Arc;

const POST: &str = "App\\Model\\Entity\\Post";
const POST_TRANSFORMER: &str = "App\\Model\\Transformer\\PostTransformer";

fn post(id: i64) -> Record {
    Record::new(POST).with_field("id", id)
}

fn registry() -> TransformerRegistry {
    let mut registry = TransformerRegistry::new();
    registry.register_factory(POST_TRANSFORMER, || {
        Arc::new(FieldTransformer::passthrough(POST_TRANSFORMER)) as Arc<dyn Transformer>
    });
    registry.register_opaque(POST, "entity");
    registry
}

fn resolver() -> TransformerResolver {
    TransformerResolver::new(Arc::new(registry()), Arc::new(NamespaceConvention::default()))
}

#[test]
fn test_classify_shapes() {
    assert_eq!(classify(&ViewValue::from(post(1))), Shape::Single);
    assert_eq!(classify(&ViewValue::list(vec![post(1)])), Shape::Collection);
    assert_eq!(classify(&ViewValue::List(vec![])), Shape::Collection);
    assert_eq!(classify(&ViewValue::cursor(ResultSet::default())), Shape::Collection);
    assert_eq!(classify(&ViewValue::Plain(json!(3))), Shape::Unsupported);
    assert_eq!(classify(&ViewValue::Plain(json!({"a": 1}))), Shape::Unsupported);
}

#[test]
fn test_namespace_convention() {
    let convention = NamespaceConvention::default();
    assert_eq!(convention.candidate(POST), POST_TRANSFORMER);
    // Types outside the entity namespace only get the suffix
    assert_eq!(convention.candidate("Post"), "PostTransformer");

    let custom = NamespaceConvention {
        entity_segment: "::entities::".to_string(),
        transformer_segment: "::views::".to_string(),
        suffix: "View".to_string(),
    };
    assert_eq!(custom.candidate("app::entities::Post"), "app::views::PostView");
}

#[test]
fn test_closure_naming_strategy() {
    let naming = |entity_type: &str| format!("{}Out", entity_type.to_lowercase());
    assert_eq!(naming.candidate("Post"), "postOut");
}

#[test]
fn test_representative_type() {
    assert_eq!(representative_type(&post(1).into()), Some(POST.to_string()));
    assert_eq!(
        representative_type(&ViewValue::list(vec![post(1), post(2)])),
        Some(POST.to_string())
    );
    assert_eq!(representative_type(&ViewValue::List(vec![])), None);
    assert_eq!(
        representative_type(&ViewValue::List(vec![ViewValue::Plain(json!(1))])),
        None
    );

    // A query knows its type without rows
    let empty = Query::from_rows(POST, Vec::new());
    assert_eq!(representative_type(&ViewValue::cursor(empty)), Some(POST.to_string()));

    // A result set only through its first row
    assert_eq!(representative_type(&ViewValue::cursor(ResultSet::default())), None);
    let rows: Vec<Arc<dyn Entity>> = vec![Arc::new(post(1))];
    assert_eq!(
        representative_type(&ViewValue::cursor(ResultSet::new(rows))),
        Some(POST.to_string())
    );
}

#[test]
fn test_registry_instantiate() {
    let registry = registry();
    assert!(registry.instantiate(POST_TRANSFORMER).is_ok());

    match registry.instantiate("App\\Foo") {
        Err(Error::InvalidTransformerReference { reference }) => assert_eq!(reference, "App\\Foo"),
        other => panic!("expected invalid reference, got {:?}", other.map(|_| ())),
    }
    match registry.instantiate(POST) {
        Err(Error::CapabilityMismatch { reference }) => assert_eq!(reference, POST),
        other => panic!("expected capability mismatch, got {:?}", other.map(|_| ())),
    }

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.transformer_ids(), vec![POST_TRANSFORMER]);
    assert!(registry.get(POST).is_some_and(|entry| !entry.is_transformer()));
}

#[test]
fn test_registry_from_definitions() {
    let definitions = vec![(
        POST_TRANSFORMER.to_string(),
        serde_json::from_value::<TransformerDefinition>(json!({"fields": ["id"]})).unwrap(),
    )];
    let registry = build_registry(definitions, vec![POST.to_string()]).unwrap();
    assert!(registry.contains(POST_TRANSFORMER));
    assert!(registry.contains(POST));

    let transformer = registry.instantiate(POST_TRANSFORMER).unwrap();
    let output = transformer.transform(&post(7).with_field("title", "x")).unwrap();
    assert_eq!(serde_json::Value::Object(output), json!({"id": 7}));
}

#[test]
fn test_build_registry_rejects_bad_definition() {
    let definitions = vec![(
        "Broken".to_string(),
        serde_json::from_value::<TransformerDefinition>(json!({"default_includes": ["author"]})).unwrap(),
    )];
    let err = build_registry(definitions, Vec::<String>::new()).unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[test]
fn test_resolve_inferred() {
    let resolver = resolver();
    let resolved = resolver
        .resolve(&post(1).into(), &TransformerRef::Infer)
        .unwrap()
        .unwrap();
    assert_eq!(resolved.id, POST_TRANSFORMER);

    // Unknown entity types pass through
    let comment = ViewValue::from(Record::new("App\\Model\\Entity\\Comment"));
    assert!(resolver.resolve(&comment, &TransformerRef::Infer).unwrap().is_none());

    // Plain values have nothing to infer from
    let plain = ViewValue::Plain(json!({"a": 1}));
    assert!(resolver.resolve(&plain, &TransformerRef::Infer).unwrap().is_none());
}

#[test]
fn test_resolve_disabled_wins() {
    let resolver = resolver();
    let value = ViewValue::from(post(1));
    assert!(resolver.resolve(&value, &TransformerRef::Disabled).unwrap().is_none());
    assert_eq!(
        resolver.explain(&value, &TransformerRef::Disabled).unwrap(),
        Resolution::Disabled
    );
}

#[test]
fn test_resolve_named_is_strict() {
    let resolver = resolver();
    let value = ViewValue::Plain(json!(1));

    // Named references are checked even for values that would not transform
    let err = resolver
        .resolve(&value, &TransformerRef::named("App\\Foo"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid Transformer class: App\\Foo");

    let err = resolver.resolve(&value, &TransformerRef::named(POST)).unwrap_err();
    assert!(matches!(err, Error::CapabilityMismatch { .. }));
}

#[test]
fn test_explain_outcomes() {
    let resolver = resolver();
    assert_eq!(
        resolver.explain(&post(1).into(), &TransformerRef::Infer).unwrap(),
        Resolution::Transformer(POST_TRANSFORMER.to_string())
    );
    assert_eq!(
        resolver.explain(&ViewValue::List(vec![]), &TransformerRef::Infer).unwrap(),
        Resolution::NoConvention
    );

    let json = serde_json::to_value(Resolution::Transformer("X".to_string())).unwrap();
    assert_eq!(json, json!({"outcome": "transformer", "transformer": "X"}));
    assert_eq!(
        serde_json::to_value(Resolution::NoConvention).unwrap(),
        json!({"outcome": "no_convention"})
    );
}

#[test]
fn test_conventions_report_unregistered_candidate() {
    let resolver = resolver();
    let comment = ViewValue::from(Record::new("App\\Model\\Entity\\Comment"));
    let lookup = resolver.conventions();
    assert_eq!(
        lookup.candidate(&comment).as_deref(),
        Some("App\\Model\\Transformer\\CommentTransformer")
    );
    assert_eq!(lookup.infer(&comment), None);
}
