use super::*;
use crate::news::story::{RawStory, normalize_story};

#[test]
fn stories_encode_as_a_camel_case_array() {
    let story = normalize_story(
        &RawStory {
            object_id: Some("7".to_owned()),
            title: Some("AI notes".to_owned()),
            points: Some(12),
            created_at: Some("2024-05-01T08:00:00Z".to_owned()),
            ..Default::default()
        },
        0,
    );
    let bytes = encode_stories(std::slice::from_ref(&story)).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json[0]["id"], "7");
    assert_eq!(json[0]["cadence"], "Rising");
    assert_eq!(json[0]["postedAt"], "2024-05-01T08:00:00Z");
    assert!(json[0]["talkingPoints"].is_array());
}

#[test]
fn empty_list_encodes_as_empty_array() {
    assert_eq!(encode_stories(&[]).unwrap(), b"[]");
}
