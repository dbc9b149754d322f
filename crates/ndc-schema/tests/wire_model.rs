//! Integration tests over complete request documents

use ndc_schema::{
    Argument, DecodeError, ExistsInCollection, Expression, Field, MutationRequest, OrderDirection,
    QueryRequest, Type,
};
use serde_json::json;

fn article_query() -> serde_json::Value {
    json!({
        "collection": "articles",
        "arguments": {},
        "collection_relationships": {
            "article_author": {
                "column_mapping": {"author_id": "id"},
                "relationship_type": "object",
                "target_collection": "authors",
                "arguments": {}
            }
        },
        "query": {
            "fields": {
                "id": {"type": "column", "column": "id"},
                "author": {
                    "type": "relationship",
                    "relationship": "article_author",
                    "arguments": {},
                    "query": {"fields": {"name": {"type": "column", "column": "name"}}}
                }
            },
            "aggregates": {"count": {"type": "star_count"}},
            "limit": 10,
            "offset": 5,
            "order_by": {
                "elements": [{
                    "order_direction": "asc",
                    "target": {"type": "column", "column": "id", "path": []}
                }]
            },
            "predicate": {
                "type": "and",
                "expressions": [
                    {
                        "type": "binary_comparison_operator",
                        "operator": {"type": "equal"},
                        "column": {"type": "column", "name": "author_id"},
                        "value": {"type": "variable", "name": "author"}
                    },
                    {
                        "type": "exists",
                        "in_collection": {
                            "type": "related",
                            "relationship": "article_author",
                            "arguments": {}
                        },
                        "where": {"type": "or", "expressions": []}
                    }
                ]
            }
        },
        "variables": [{"author": 1}, {"author": 2}]
    })
}

#[test]
fn test_full_query_request_roundtrip() {
    let raw = article_query();
    let request: QueryRequest = serde_json::from_value(raw.clone()).unwrap();

    let fields = request.query.fields.as_ref().unwrap();
    assert!(matches!(fields["author"], Field::Relationship(_)));
    assert_eq!(request.query.limit, Some(10));
    assert_eq!(request.variables.as_ref().unwrap().len(), 2);
    assert_eq!(
        request.query.order_by.as_ref().unwrap().elements[0].order_direction,
        OrderDirection::Asc
    );

    let encoded = serde_json::to_value(&request).unwrap();
    assert_eq!(encoded, raw);
    let again: QueryRequest = serde_json::from_value(encoded).unwrap();
    assert_eq!(again, request);
}

#[test]
fn test_predicate_exists_branch() {
    let request: QueryRequest = serde_json::from_value(article_query()).unwrap();
    let predicate = request.query.predicate.unwrap();
    let parts = predicate.as_and().unwrap();
    let exists = parts[1].as_exists().unwrap();
    assert!(exists.predicate.is_trivially_false());
    let (relationship, arguments) = exists.in_collection.as_related().unwrap();
    assert_eq!(relationship, "article_author");
    assert!(arguments.is_empty());
    assert!(exists.in_collection.as_unrelated().is_err());
}

#[test]
fn test_unrelated_exists_without_arguments_is_rejected() {
    let err = ExistsInCollection::decode(br#"{"type":"unrelated","collection":"authors"}"#)
        .unwrap_err();
    match err {
        DecodeError::MissingField { field, variant, .. } => {
            assert_eq!(field, "arguments");
            assert_eq!(variant, "unrelated");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_discriminant_rejection_across_unions() {
    assert!(Type::decode(br#"{"name":"Int"}"#).is_err());
    assert!(Argument::decode(br#"{"type":true}"#).is_err());
    assert!(Expression::decode(br#"{"type":"nand","expressions":[]}"#).is_err());
    assert!(Field::decode(br#"[1,2]"#).is_err());
    assert!(matches!(
        Type::decode(b"{not json"),
        Err(DecodeError::Syntax(_))
    ));
}

#[test]
fn test_mutation_request_decode() {
    let request = MutationRequest::decode(
        br#"{
            "operations": [{
                "type": "procedure",
                "name": "createAuthors",
                "arguments": {"names": ["a", "b"]},
                "fields": {"type": "array", "fields": {"type": "object", "fields": {
                    "id": {"type": "column", "column": "id"}
                }}}
            }],
            "collection_relationships": {}
        }"#,
    )
    .unwrap();
    let (name, arguments, fields) = request.operations[0].as_procedure().unwrap();
    assert_eq!(name, "createAuthors");
    assert_eq!(arguments["names"], json!(["a", "b"]));
    assert!(fields.unwrap().as_array().is_ok());
}
