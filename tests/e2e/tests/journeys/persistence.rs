//! Journey: progress survives a restart and exports cleanly

use kioku_core::ProgressStore;
use kioku_e2e_tests::harness::TestDatabaseManager;
use serde_json::Value;

const LEARNER: &str = "learner-1";

#[test]
fn test_progress_survives_reopen() {
    let mut db = TestDatabaseManager::new_temp();
    let service = db.service();
    service.submit_review(LEARNER, "yomu", 5).unwrap();
    let before = service.submit_review(LEARNER, "yomu", 4).unwrap();
    drop(service);

    db.reopen();

    let after = db.store.load(LEARNER, "yomu").unwrap();
    assert_eq!(before, after);

    // Reviews continue from the stored version
    let next = db.service().submit_review(LEARNER, "yomu", 4).unwrap();
    assert_eq!(next.version, before.version + 1);
    assert_eq!(next.retention.interval, 16);
}

#[test]
fn test_progress_json_shape() {
    let db = TestDatabaseManager::new_temp();
    let progress = db.service().submit_review(LEARNER, "neru", 5).unwrap();

    let json: Value = serde_json::to_value(&progress).unwrap();

    assert_eq!(json["learnerId"], "learner-1");
    assert_eq!(json["itemId"], "neru");
    assert_eq!(json["totalReviews"], 1);
    assert_eq!(json["retention"]["interval"], 1);
    assert_eq!(json["retention"]["repetitions"], 1);
    assert_eq!(json["retention"]["nextReviewDate"], "2026-10-20");
    assert!(json["retention"]["easeFactor"].as_f64().unwrap() > 2.5);
    assert!(json.get("lastReviewedAt").is_some());

    let back: kioku_core::VocabularyProgress = serde_json::from_value(json).unwrap();
    assert_eq!(back, progress);
}
