// ==========================================
// MoldApi 集成测试（严格策略, SQLite）
// ==========================================
// 测试目标: 验证台账操作的状态转换、寿命阈值与履历一致性
// ==========================================

#[path = "helpers/api_test_helper.rs"]
mod api_test_helper;

use api_test_helper::*;
use mold_manager::api::ApiError;
use mold_manager::domain::types::{MoldAction, MoldStatus};

// ==========================================
// 建档
// ==========================================

#[test]
fn test_create_derives_id_and_writes_one_log() {
    let env = ApiTestEnv::new().unwrap();

    let mold = env.mold_api.create("INJ", "A1", "Bracket Mold", 50).unwrap();
    assert_eq!(mold.mold_id, "INJ-A1");
    assert_eq!(mold.status(), MoldStatus::Available);
    assert_eq!(mold.current_shots, 0);
    assert_eq!(mold.last_maintenance, mold.created_at);
    assert!(mold.operator_name().is_none());

    let stored = env.mold_repo.find_by_id("INJ-A1").unwrap().unwrap();
    assert_eq!(stored, mold);

    let logs = env.mold_api.list_logs_by_mold("INJ-A1").unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, MoldAction::Create);
    assert!(logs[0].operator_name.is_none());
    assert!(logs[0].shots_added.is_none());
}

#[test]
fn test_create_duplicate_id_is_rejected_without_side_effects() {
    let env = ApiTestEnv::new().unwrap();
    env.mold_api.create("INJ", "A1", "Bracket Mold", 50).unwrap();

    match env.mold_api.create("INJ", "A1", "Another Name", 80) {
        Err(ApiError::DuplicateId { mold_id }) => assert_eq!(mold_id, "INJ-A1"),
        other => panic!("expected DuplicateId, got {:?}", other),
    }

    let stored = env.mold_api.get_mold("INJ-A1").unwrap().unwrap();
    assert_eq!(stored.name, "Bracket Mold");
    assert_eq!(stored.max_shots, 50);
    assert_eq!(env.mold_api.list_logs().unwrap().len(), 1);
}

#[test]
fn test_same_name_different_id_is_allowed() {
    let env = ApiTestEnv::new().unwrap();
    env.mold_api.create("INJ", "A1", "Bracket Mold", 50).unwrap();
    env.mold_api.create("INJ", "A2", "Bracket Mold", 50).unwrap();

    assert_eq!(env.mold_api.list_molds(None).unwrap().len(), 2);
}

#[test]
fn test_create_validation_errors() {
    let env = ApiTestEnv::new().unwrap();

    for result in [
        env.mold_api.create("INJ", "A1", "Bracket Mold", 0),
        env.mold_api.create("INJ", "A1", "Bracket Mold", -5),
        env.mold_api.create(" ", "A1", "Bracket Mold", 10),
        env.mold_api.create("INJ", "", "Bracket Mold", 10),
        env.mold_api.create("INJ", "A1", "", 10),
    ] {
        assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }

    assert!(env.mold_api.list_molds(None).unwrap().is_empty());
    assert!(env.mold_api.list_logs().unwrap().is_empty());
}

// ==========================================
// 领用
// ==========================================

#[test]
fn test_checkout_records_assignment() {
    let env = ApiTestEnv::new().unwrap();
    env.mold_api.create("INJ", "A1", "Bracket Mold", 50).unwrap();

    let outcome = env.mold_api.checkout("INJ-A1", "alice", "M1").unwrap();
    assert_applied(&outcome);

    let mold = env.mold_api.get_mold("INJ-A1").unwrap().unwrap();
    assert_eq!(mold.status(), MoldStatus::InUse);
    assert_eq!(mold.operator_name(), Some("alice"));
    assert_eq!(mold.machine(), Some("M1"));

    let logs = env.mold_api.list_logs_by_mold("INJ-A1").unwrap();
    assert_eq!(logs[0].action, MoldAction::Checkout);
    assert_eq!(logs[0].operator_name.as_deref(), Some("alice"));
    assert_eq!(logs[0].machine.as_deref(), Some("M1"));
}

#[test]
fn test_checkout_twice_is_invalid() {
    let env = ApiTestEnv::new().unwrap();
    let mold_id = env.create_checked_out("INJ", "A1", 50);

    assert_invalid_transition(env.mold_api.checkout(&mold_id, "bob", "M2"));

    let mold = env.mold_api.get_mold(&mold_id).unwrap().unwrap();
    assert_eq!(mold.operator_name(), Some("alice"));
    assert_eq!(env.mold_api.list_logs().unwrap().len(), 2);
}

#[test]
fn test_checkout_from_maintenance_is_invalid() {
    let env = ApiTestEnv::new().unwrap();
    let mold_id = env.create_checked_out("INJ", "A1", 10);
    env.mold_api.return_mold(&mold_id, 10).unwrap();

    assert_invalid_transition(env.mold_api.checkout(&mold_id, "bob", "M2"));
}

#[test]
fn test_checkout_missing_mold() {
    let env = ApiTestEnv::new().unwrap();
    assert_not_found(env.mold_api.checkout("NOPE-1", "alice", "M1"));
    assert!(env.mold_api.list_logs().unwrap().is_empty());
}

// ==========================================
// 归还
// ==========================================

#[test]
fn test_return_below_threshold() {
    let env = ApiTestEnv::new().unwrap();
    let mold_id = env.create_checked_out("INJ", "A1", 100);
    env.mold_api.return_mold(&mold_id, 90).unwrap();
    env.mold_api.checkout(&mold_id, "alice", "M1").unwrap();

    let outcome = env.mold_api.return_mold(&mold_id, 5).unwrap();
    let mold = outcome.mold().unwrap();
    assert_eq!(mold.current_shots, 95);
    assert_eq!(mold.status(), MoldStatus::Available);
    assert!(mold.operator_name().is_none());
    assert!(mold.machine().is_none());
}

#[test]
fn test_return_crossing_threshold_forces_maintenance() {
    let env = ApiTestEnv::new().unwrap();
    let mold_id = env.create_checked_out("INJ", "A1", 100);
    env.mold_api.return_mold(&mold_id, 90).unwrap();
    env.mold_api.checkout(&mold_id, "alice", "M1").unwrap();

    env.mold_api.return_mold(&mold_id, 15).unwrap();

    let mold = env.mold_api.get_mold(&mold_id).unwrap().unwrap();
    assert_eq!(mold.current_shots, 110);
    assert_eq!(mold.status(), MoldStatus::Maintenance);

    let logs = env.mold_api.list_logs_by_mold(&mold_id).unwrap();
    assert_eq!(logs[0].action, MoldAction::Return);
    assert_eq!(logs[0].shots_added, Some(15));
    assert!(logs[0].note.contains("maintenance"));
}

#[test]
fn test_return_exactly_at_threshold_forces_maintenance() {
    let env = ApiTestEnv::new().unwrap();
    let mold_id = env.create_checked_out("INJ", "A1", 40);

    env.mold_api.return_mold(&mold_id, 40).unwrap();
    let mold = env.mold_api.get_mold(&mold_id).unwrap().unwrap();
    assert_eq!(mold.status(), MoldStatus::Maintenance);
}

#[test]
fn test_return_zero_shots() {
    let env = ApiTestEnv::new().unwrap();
    let mold_id = env.create_checked_out("INJ", "A1", 40);

    env.mold_api.return_mold(&mold_id, 0).unwrap();
    let mold = env.mold_api.get_mold(&mold_id).unwrap().unwrap();
    assert_eq!(mold.current_shots, 0);
    assert_eq!(mold.status(), MoldStatus::Available);
}

#[test]
fn test_return_negative_shots_is_validation_error() {
    let env = ApiTestEnv::new().unwrap();
    let mold_id = env.create_checked_out("INJ", "A1", 40);

    assert!(matches!(
        env.mold_api.return_mold(&mold_id, -3),
        Err(ApiError::ValidationError(_))
    ));
    let mold = env.mold_api.get_mold(&mold_id).unwrap().unwrap();
    assert_eq!(mold.status(), MoldStatus::InUse);
}

#[test]
fn test_return_when_available_is_invalid() {
    let env = ApiTestEnv::new().unwrap();
    env.mold_api.create("INJ", "A1", "Bracket Mold", 50).unwrap();

    assert_invalid_transition(env.mold_api.return_mold("INJ-A1", 5));
    assert_eq!(
        env.mold_api.get_mold("INJ-A1").unwrap().unwrap().current_shots,
        0
    );
}

// ==========================================
// 保养
// ==========================================

#[test]
fn test_maintain_keeps_shots_and_updates_timestamp() {
    let env = ApiTestEnv::new().unwrap();
    let mold_id = env.create_checked_out("INJ", "A1", 10);
    env.mold_api.return_mold(&mold_id, 12).unwrap();
    let before = env.mold_api.get_mold(&mold_id).unwrap().unwrap();

    env.mold_api.maintain(&mold_id).unwrap();

    let after = env.mold_api.get_mold(&mold_id).unwrap().unwrap();
    assert_eq!(after.status(), MoldStatus::Available);
    assert_eq!(after.current_shots, 12);
    assert!(after.last_maintenance >= before.last_maintenance);

    // 未清零的模具下次归还后仍直接转入保养
    env.mold_api.checkout(&mold_id, "bob", "M2").unwrap();
    env.mold_api.return_mold(&mold_id, 0).unwrap();
    assert_eq!(
        env.mold_api.get_mold(&mold_id).unwrap().unwrap().status(),
        MoldStatus::Maintenance
    );
}

#[test]
fn test_maintain_when_not_in_maintenance_is_invalid() {
    let env = ApiTestEnv::new().unwrap();
    env.mold_api.create("INJ", "A1", "Bracket Mold", 50).unwrap();
    assert_invalid_transition(env.mold_api.maintain("INJ-A1"));

    env.mold_api.checkout("INJ-A1", "alice", "M1").unwrap();
    assert_invalid_transition(env.mold_api.maintain("INJ-A1"));
}

// ==========================================
// 删除
// ==========================================

#[test]
fn test_delete_any_state_keeps_history() {
    let env = ApiTestEnv::new().unwrap();
    let mold_id = env.create_checked_out("INJ", "A1", 50);

    let outcome = env.mold_api.delete(&mold_id).unwrap();
    assert_applied(&outcome);
    assert!(outcome.mold().is_none());

    assert!(env.mold_api.get_mold(&mold_id).unwrap().is_none());

    let logs = env.mold_api.list_logs_by_mold(&mold_id).unwrap();
    let actions: Vec<MoldAction> = logs.iter().map(|l| l.action).collect();
    assert_eq!(
        actions,
        vec![MoldAction::Delete, MoldAction::Checkout, MoldAction::Create]
    );
}

#[test]
fn test_delete_missing_mold() {
    let env = ApiTestEnv::new().unwrap();
    assert_not_found(env.mold_api.delete("NOPE-1"));
}

#[test]
fn test_recreate_after_delete() {
    let env = ApiTestEnv::new().unwrap();
    env.mold_api.create("INJ", "A1", "Bracket Mold", 50).unwrap();
    env.mold_api.delete("INJ-A1").unwrap();

    let mold = env.mold_api.create("INJ", "A1", "Bracket Mold v2", 70).unwrap();
    assert_eq!(mold.max_shots, 70);
    assert_eq!(env.mold_api.list_logs_by_mold("INJ-A1").unwrap().len(), 3);
}

// ==========================================
// 查询
// ==========================================

#[test]
fn test_list_molds_keyword_matches_id_name_model() {
    let env = ApiTestEnv::new().unwrap();
    env.mold_api.create("INJ", "A1", "Bracket Mold", 50).unwrap();
    env.mold_api.create("PR", "B7", "Cover Die", 50).unwrap();

    let by_id = env.mold_api.list_molds(Some("B7")).unwrap();
    assert_eq!(by_id.len(), 1);
    assert_eq!(by_id[0].mold_id, "PR-B7");

    let by_name = env.mold_api.list_molds(Some("Bracket")).unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].mold_id, "INJ-A1");

    assert_eq!(env.mold_api.list_molds(Some("INJ")).unwrap().len(), 1);
    assert!(env.mold_api.list_molds(Some("zzz")).unwrap().is_empty());
}

#[test]
fn test_every_mutation_writes_exactly_one_log() {
    let env = ApiTestEnv::new().unwrap();
    env.mold_api.create("INJ", "A1", "Bracket Mold", 10).unwrap();
    env.mold_api.checkout("INJ-A1", "alice", "M1").unwrap();
    env.mold_api.return_mold("INJ-A1", 10).unwrap();
    env.mold_api.maintain("INJ-A1").unwrap();
    env.mold_api.delete("INJ-A1").unwrap();

    let logs = env.mold_api.list_logs().unwrap();
    assert_eq!(logs.len(), 5);
    for window in logs.windows(2) {
        assert!(window[0].timestamp >= window[1].timestamp);
    }

    let mut ids: Vec<&str> = logs.iter().map(|l| l.log_id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5);
}

#[test]
fn test_status_summary_over_sqlite() {
    let env = ApiTestEnv::new().unwrap();
    env.mold_api.create("INJ", "A1", "Bracket Mold", 10).unwrap();
    env.create_checked_out("INJ", "A2", 10);

    let counts = env.dashboard_api.status_summary().unwrap();
    assert_eq!(counts.total, 2);
    assert_eq!(counts.available, 1);
    assert_eq!(counts.in_use, 1);
    assert_eq!(counts.maintenance, 0);
}

#[test]
fn test_list_logs_by_action_over_sqlite() {
    let env = ApiTestEnv::new().unwrap();
    env.mold_api.create("INJ", "A1", "Bracket Mold", 10).unwrap();
    env.create_checked_out("INJ", "A2", 10);
    env.mold_api.return_mold("INJ-A2", 10).unwrap();

    let creates = env.mold_api.list_logs_by_action(MoldAction::Create).unwrap();
    assert_eq!(creates.len(), 2);
    assert_eq!(creates[0].mold_id, "INJ-A2");

    let returns = env.mold_api.list_logs_by_action(MoldAction::Return).unwrap();
    assert_eq!(returns.len(), 1);
    assert_eq!(returns[0].shots_added, Some(10));
    assert!(env
        .mold_api
        .list_logs_by_action(MoldAction::Delete)
        .unwrap()
        .is_empty());
}

#[test]
fn test_list_logs_between_over_sqlite() {
    let env = ApiTestEnv::new().unwrap();
    env.mold_api.create("INJ", "A1", "Bracket Mold", 10).unwrap();
    env.mold_api.checkout("INJ-A1", "alice", "M1").unwrap();

    let logs = env.mold_api.list_logs().unwrap();
    let (newest, oldest) = (logs[0].timestamp, logs[1].timestamp);

    // 闭区间: 端点本身命中
    let hits = env.mold_api.list_logs_between(oldest, newest).unwrap();
    assert_eq!(hits, logs);

    let before = oldest - chrono::Duration::hours(1);
    assert!(env
        .mold_api
        .list_logs_between(before, before)
        .unwrap()
        .is_empty());

    assert!(matches!(
        env.mold_api.list_logs_between(newest, before),
        Err(ApiError::ValidationError(_))
    ));
}

#[test]
fn test_padded_inputs_are_stored_trimmed() {
    let env = ApiTestEnv::new().unwrap();
    let mold = env
        .mold_api
        .create(" INJ", "A1 ", "  Bracket Mold", 50)
        .unwrap();
    assert_eq!(mold.mold_id, "INJ-A1");

    let stored = env.mold_repo.find_by_id("INJ-A1").unwrap().unwrap();
    assert_eq!(stored.model, "INJ");
    assert_eq!(stored.name, "Bracket Mold");
    assert!(env.mold_repo.find_by_id(" INJ-A1").unwrap().is_none());

    env.mold_api.checkout("INJ-A1 ", "\talice", "M1 ").unwrap();
    let stored = env.mold_repo.find_by_id("INJ-A1").unwrap().unwrap();
    assert_eq!(stored.operator_name(), Some("alice"));
    assert_eq!(stored.machine(), Some("M1"));
}

// ==========================================
// 持久化失败
// ==========================================

#[test]
fn test_log_append_failure_leaves_mold_unchanged() {
    let env = ApiTestEnv::new().unwrap();
    env.mold_api.create("INJ", "A1", "Bracket Mold", 50).unwrap();

    let conn = open_test_connection(&env.db_path).unwrap();
    conn.execute_batch("DROP TABLE mold_log").unwrap();

    match env.mold_api.checkout("INJ-A1", "alice", "M1") {
        Err(ApiError::Persistence(msg)) => assert!(msg.contains("mold_log")),
        other => panic!("expected Persistence, got {:?}", other),
    }

    let mold = env.mold_api.get_mold("INJ-A1").unwrap().unwrap();
    assert_eq!(mold.status(), MoldStatus::Available);
    assert!(mold.operator_name().is_none());
}
