use serde_yaml::Value;
use trajedit_core::{decode, encode, CodecError, DocumentStore};

const ROUTE: &str = "\
header:
  frame_id: map
  stamp: 1700000000
poses:
  - position: {x: 1.5, y: -2.25, z: 0.0}
    orientation: {x: 0.0, y: 0.0, z: 0.7071, w: 0.7071}
  - position: {x: 3, y: 4}
  - position: {x: -0.125, y: 10.0}
speed_limit: 0.8
";

fn positions(raw: &[u8]) -> Vec<(f64, f64)> {
    decode("check.yaml", raw)
        .unwrap()
        .poses
        .iter()
        .map(|pose| (pose.x, pose.y))
        .collect()
}

#[test]
fn decode_produces_poses_in_file_order() {
    let doc = decode("route.yaml", ROUTE.as_bytes()).unwrap();
    assert_eq!(doc.name, "route.yaml");
    assert_eq!(doc.len(), 3);
    assert_eq!(
        doc.poses.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>(),
        vec![(1.5, -2.25), (3.0, 4.0), (-0.125, 10.0)]
    );
}

#[test]
fn encode_without_edits_round_trips_pose_values() {
    let mut store = DocumentStore::default();
    store.load("route.yaml", ROUTE.as_bytes()).unwrap();
    let id = store.document_by_name("route.yaml").unwrap().id();

    let encoded = store.encode_document(id).unwrap();
    assert_eq!(positions(&encoded), positions(ROUTE.as_bytes()));
}

#[test]
fn encode_preserves_pass_through_fields_and_key_order() {
    let mut store = DocumentStore::default();
    store.load("route.yaml", ROUTE.as_bytes()).unwrap();
    let id = store.document_by_name("route.yaml").unwrap().id();

    let encoded = store.encode_document(id).unwrap();
    let original: Value = serde_yaml::from_str(ROUTE).unwrap();
    let written: Value = serde_yaml::from_slice(&encoded).unwrap();

    let keys = |value: &Value| {
        value
            .as_mapping()
            .unwrap()
            .keys()
            .map(|key| key.as_str().unwrap().to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(keys(&written), vec!["header", "poses", "speed_limit"]);
    assert_eq!(written["header"], original["header"]);
    assert_eq!(written["speed_limit"], original["speed_limit"]);
    assert_eq!(
        written["poses"][0]["orientation"],
        original["poses"][0]["orientation"]
    );
    assert_eq!(written["poses"][0]["position"]["z"], Value::from(0.0));
}

#[test]
fn encode_does_not_mutate_document_poses() {
    let mut store = DocumentStore::default();
    store.load("route.yaml", ROUTE.as_bytes()).unwrap();
    let loaded = store.document_by_name("route.yaml").unwrap();
    let doc_id = loaded.id();
    let first = loaded.point_ids()[0];
    let before = loaded.document().clone();

    store.point_mut(first).unwrap().mark_deleted();
    let loaded = store.document(doc_id).unwrap();
    encode(loaded.document(), store.points_of(doc_id)).unwrap();

    assert_eq!(store.document(doc_id).unwrap().document(), &before);
}

#[test]
fn decode_rejects_missing_pose_sequence() {
    let err = decode("empty.yaml", b"header: {frame_id: map}\n").unwrap_err();
    assert!(matches!(err, CodecError::MalformedDocument(_)));
    assert!(err.to_string().contains("missing top-level `poses`"));
}

#[test]
fn decode_rejects_non_sequence_poses() {
    let err = decode("scalar.yaml", b"poses: 3\n").unwrap_err();
    assert!(matches!(err, CodecError::MalformedDocument(_)));
}

#[test]
fn decode_rejects_non_numeric_coordinates() {
    let raw = b"poses:\n  - position: {x: one, y: 2.0}\n";
    let err = decode("text.yaml", raw).unwrap_err();
    assert!(matches!(err, CodecError::MalformedDocument(_)));
    assert!(err.to_string().contains("position.x"));
}

#[test]
fn empty_pose_sequence_is_valid_and_round_trips() {
    let mut store = DocumentStore::default();
    store.load("empty.yaml", b"poses: []\nname: idle\n").unwrap();
    let id = store.document_by_name("empty.yaml").unwrap().id();

    let encoded = store.encode_document(id).unwrap();
    assert!(positions(&encoded).is_empty());
}
