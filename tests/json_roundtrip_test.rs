//! Integration tests for reading and writing documents as JSON.

use docorder::render::write_json;
use docorder::{from_json, load_file, to_json, JsonFormat};
use serde_json::json;

const RESPONSE: &str = r#"{
    "DocumentMetadata": {"Pages": 1},
    "JobStatus": "SUCCEEDED",
    "AnalyzeDocumentModelVersion": "1.0",
    "Blocks": [
        {
            "BlockType": "PAGE",
            "Id": "p1",
            "Geometry": {
                "BoundingBox": {"Width": 1.0, "Height": 1.0, "Left": 0.0, "Top": 0.0},
                "Polygon": [{"X": 0.0, "Y": 0.0}, {"X": 1.0, "Y": 0.0}, {"X": 1.0, "Y": 1.0}, {"X": 0.0, "Y": 1.0}]
            },
            "Relationships": [{"Type": "CHILD", "Ids": ["l1"]}],
            "Page": 1,
            "Custom": {"testblock": {"here": "is some fun stuff"}}
        },
        {
            "BlockType": "LINE",
            "Id": "l1",
            "Confidence": 99.5,
            "Text": "Hello",
            "Geometry": {
                "BoundingBox": {"Width": 0.2, "Height": 0.02, "Left": 0.1, "Top": 0.1},
                "Polygon": [{"X": 0.1, "Y": 0.1}, {"X": 0.3, "Y": 0.1}, {"X": 0.3, "Y": 0.12}, {"X": 0.1, "Y": 0.12}]
            },
            "Page": 1
        }
    ]
}"#;

#[test]
fn test_custom_annotations_survive_round_trip() {
    let doc = from_json(RESPONSE).unwrap();
    let custom = doc.block("p1").unwrap().custom_value("testblock").cloned();
    assert_eq!(custom, Some(json!({"here": "is some fun stuff"})));

    for format in [JsonFormat::Pretty, JsonFormat::Compact] {
        let text = to_json(&doc, format).unwrap();
        let again = from_json(&text).unwrap();
        assert_eq!(again, doc);
        assert_eq!(
            again.block("p1").unwrap().custom_value("testblock"),
            Some(&json!({"here": "is some fun stuff"}))
        );
    }
}

#[test]
fn test_absent_fields_are_omitted() {
    let doc = from_json(RESPONSE).unwrap();
    let text = to_json(&doc, JsonFormat::Compact).unwrap();
    assert!(!text.contains("null"));
    assert!(!text.contains("RowIndex"));
    assert!(text.contains("\"JobStatus\":\"SUCCEEDED\""));

    let line = doc.block("l1").unwrap();
    assert!(line.custom.is_none());
    assert_eq!(line.confidence, Some(99.5));
}

#[test]
fn test_write_and_load_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.json");

    let doc = from_json(RESPONSE).unwrap();
    write_json(&doc, &path, JsonFormat::Pretty).unwrap();
    let loaded = load_file(&path).unwrap();
    assert_eq!(loaded, doc);
}

#[test]
fn test_document_custom_round_trip() {
    let mut doc = from_json(RESPONSE).unwrap();
    let mut custom = docorder::model::Custom::new();
    custom.insert("testblock".to_string(), json!({"here": "is some fun stuff"}));
    doc.custom = Some(custom);

    let text = to_json(&doc, JsonFormat::Compact).unwrap();
    assert!(text.contains(r#""Custom":{"testblock":{"here":"is some fun stuff"}}"#));

    let again = from_json(&text).unwrap();
    assert_eq!(again.custom, doc.custom);
    assert_eq!(
        again.custom.as_ref().and_then(|c| c.get("testblock")),
        Some(&json!({"here": "is some fun stuff"}))
    );
}

#[test]
fn test_vertex_missing_a_coordinate() {
    let input = r#"{"Blocks":[{"BlockType":"WORD","Id":"w1","Geometry":{"Polygon":[{"X":0.1,"Y":0.1},{"X":0.3}]}}]}"#;
    let doc = from_json(input).unwrap();

    let polygon = &doc.block("w1").unwrap().geometry.as_ref().unwrap().polygon;
    assert_eq!(polygon.points()[1].x, Some(0.3));
    assert_eq!(polygon.points()[1].y, None);

    let text = to_json(&doc, JsonFormat::Compact).unwrap();
    assert!(!text.contains("null"));
    assert!(!text.contains("BoundingBox"));
    assert!(text.contains(r#"{"X":0.3}"#));
    assert_eq!(from_json(&text).unwrap(), doc);
}
