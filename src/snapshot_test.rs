#![allow(clippy::float_cmp)]

use super::*;
use crate::post::Post;

fn seeded_store() -> (PostStore, uuid::Uuid) {
    let mut store = PostStore::new();
    let mut post = Post::new("First".into(), "one".into(), 10.0, 20.0, 0.5);
    post.remote_id = Some(11);
    let id = post.id;
    store.insert(post);
    store.insert(Post::new("Second".into(), "two".into(), 30.0, 40.0, 1.0));
    (store, id)
}

#[test]
fn versions_start_at_one_and_increase() {
    let (store, _) = seeded_store();
    let mut history = SnapshotHistory::new();
    assert_eq!(history.next_version(), 1);
    let first = history.capture(&store);
    let second = history.capture(&store);
    assert_eq!(first.version, 1);
    assert_eq!(second.version, 2);
    assert_eq!(history.len(), 2);
}

#[test]
fn capture_records_card_state_in_order() {
    let (store, _) = seeded_store();
    let mut history = SnapshotHistory::new();
    let snapshot = history.capture(&store);
    assert_eq!(snapshot.posts.len(), 2);
    assert_eq!(snapshot.posts[0].title, "First");
    assert_eq!(snapshot.posts[0].remote_id, Some(11));
    assert_eq!(snapshot.posts[0].x, 10.0);
    assert_eq!(snapshot.posts[1].title, "Second");
    assert_eq!(snapshot.posts[1].y, 40.0);
}

#[test]
fn later_registry_mutation_does_not_alter_capture() {
    let (mut store, id) = seeded_store();
    let mut history = SnapshotHistory::new();
    history.capture(&store);

    let post = store.get_mut(&id).unwrap();
    post.title = "Mutated".into();
    post.x = -999.0;

    let captured = history.get(1).unwrap();
    assert_eq!(captured.posts[0].title, "First");
    assert_eq!(captured.posts[0].x, 10.0);
}

#[test]
fn history_lists_captures_oldest_first() {
    let (store, _) = seeded_store();
    let mut history = SnapshotHistory::new();
    history.capture(&store);
    history.capture(&store);
    let versions: Vec<_> = history.snapshots().iter().map(|s| s.version).collect();
    assert_eq!(versions, vec![1, 2]);
    assert!(!history.is_empty());
}

#[test]
fn get_finds_by_version() {
    let (store, _) = seeded_store();
    let mut history = SnapshotHistory::new();
    history.capture(&store);
    history.capture(&store);
    assert!(history.get(2).is_some());
    assert!(history.get(3).is_none());
}

#[test]
fn to_record_serializes_service_shape() {
    let (store, _) = seeded_store();
    let mut history = SnapshotHistory::new();
    let record = history.capture(&store).to_record();
    assert_eq!(record.version, 1);
    let data = record.snapshot_data.as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["id"], 11);
    assert_eq!(data[0]["position_x"], 10.0);
    assert!(data[0].get("angle").is_none());
    assert!(data[0].get("pinned").is_none());
    assert!(data[0].get("editing").is_none());
}

#[test]
fn snapshot_post_deserializes_service_records() {
    let sp: SnapshotPost = serde_json::from_value(serde_json::json!({
        "id": 5,
        "title": "t",
        "content": "c",
        "position_x": 1.5,
        "position_y": 2.5,
        "user_id": "guest",
        "created_at": "2024-11-02T10:00:00"
    }))
    .unwrap();
    assert_eq!(sp.remote_id, Some(5));
    assert_eq!(sp.x, 1.5);
    assert_eq!(sp.y, 2.5);
}

#[test]
fn empty_capture_is_valid() {
    let store = PostStore::new();
    let mut history = SnapshotHistory::new();
    let snapshot = history.capture(&store);
    assert_eq!(snapshot.version, 1);
    assert!(snapshot.posts.is_empty());
}
