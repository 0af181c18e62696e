//! Restart behavior: the json backend keeps counts, the memory backend
//! starts over. Restart here means dropping one `TestApp` and starting
//! another on the same data file.

mod common;

use common::TestApp;
use serde_json::json;
use tallyboard::store::CountMap;

#[test]
fn test_json_counts_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");

    {
        let app = TestApp::with_json_store(&path);
        let resp = app.post_form("/join", "name=alice");
        let cookie = format!("tally_session={}", resp.session_token().unwrap());
        app.post("/increment", Some(&cookie));
        app.post("/increment", Some(&cookie));
    }

    let app = TestApp::with_json_store(&path);
    let rows = app.get("/api/participants");
    assert_eq!(rows.json(), json!([{ "name": "alice", "count": 2 }]));
}

#[test]
fn test_memory_counts_reset_on_restart() {
    {
        let app = TestApp::with_memory_store();
        let resp = app.post_form("/join", "name=bob");
        let cookie = format!("tally_session={}", resp.session_token().unwrap());
        app.post("/increment", Some(&cookie));
    }

    let app = TestApp::with_memory_store();
    let rows = app.get("/api/participants");
    assert_eq!(rows.json(), json!([]));
}

#[test]
fn test_corrupt_data_file_starts_empty_and_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(&path, "not json at all").unwrap();

    let app = TestApp::with_json_store(&path);
    assert_eq!(app.get("/api/participants").json(), json!([]));

    // first join replaces the corrupt document with a valid one
    app.post_form("/join", "name=carol");
    let content = std::fs::read_to_string(&path).unwrap();
    let parsed: CountMap = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed.get("carol"), Some(&0));
}

#[test]
fn test_data_file_created_on_first_join() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    assert!(!path.exists());

    let app = TestApp::with_json_store(&path);
    app.post_form("/join", "name=dave");

    let content = std::fs::read_to_string(&path).unwrap();
    let parsed: CountMap = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed.get("dave"), Some(&0));
}
