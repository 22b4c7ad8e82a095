// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用环境与断言
// ==========================================

#![allow(dead_code)]

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

use mold_manager::api::{ApiError, DashboardApi, MoldApi, TransitionOutcome};
use mold_manager::config::ConfigManager;
use mold_manager::db::open_sqlite_connection;
use mold_manager::domain::types::TransitionPolicy;
use mold_manager::repository::{MoldRepository, MoldStore};

pub use test_helpers::{create_test_db, insert_test_config, open_test_connection};

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 基于临时 SQLite 文件，MoldApi 与 DashboardApi 共享同一存储
pub struct ApiTestEnv {
    pub db_path: String,
    pub mold_api: Arc<MoldApi>,
    pub dashboard_api: Arc<DashboardApi>,

    // Repository层（用于直接核对落库结果）
    pub mold_repo: Arc<MoldRepository>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 创建严格策略的测试环境
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_policy(TransitionPolicy::Strict)
    }

    /// 创建指定策略的测试环境
    pub fn with_policy(policy: TransitionPolicy) -> Result<Self, Box<dyn std::error::Error>> {
        let (temp_file, db_path) = create_test_db()?;

        let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path)?));
        let mold_repo = Arc::new(MoldRepository::from_connection(conn));
        let store: Arc<dyn MoldStore> = mold_repo.clone();

        let mold_api = Arc::new(MoldApi::new(store.clone(), policy));
        let dashboard_api = Arc::new(DashboardApi::new(store));

        Ok(Self {
            db_path,
            mold_api,
            dashboard_api,
            mold_repo,
            _temp_file: temp_file,
        })
    }

    /// 按数据库中的配置创建测试环境
    pub fn from_db_config(
        configs: &[(&str, &str)],
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let (temp_file, db_path) = create_test_db()?;

        let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path)?));
        {
            let guard = conn.lock().map_err(|e| e.to_string())?;
            for (key, value) in configs {
                insert_test_config(&guard, key, value)?;
            }
        }

        let config_manager = ConfigManager::from_connection(conn.clone())?;
        let mold_repo = Arc::new(MoldRepository::from_connection(conn));
        let store: Arc<dyn MoldStore> = mold_repo.clone();

        let mold_api = Arc::new(MoldApi::from_config(store.clone(), &config_manager)?);
        let dashboard_api = Arc::new(DashboardApi::new(store));

        Ok(Self {
            db_path,
            mold_api,
            dashboard_api,
            mold_repo,
            _temp_file: temp_file,
        })
    }

    /// 建档并领用
    pub fn create_checked_out(&self, model: &str, suffix: &str, max_shots: i64) -> String {
        let mold = self
            .mold_api
            .create(model, suffix, "Test Mold", max_shots)
            .expect("建档失败");
        self.mold_api
            .checkout(&mold.mold_id, "alice", "M1")
            .expect("领用失败");
        mold.mold_id
    }
}

// ==========================================
// 断言辅助
// ==========================================

/// 断言结果为已提交
pub fn assert_applied(outcome: &TransitionOutcome) {
    assert!(outcome.is_applied(), "expected Applied, got {:?}", outcome);
}

/// 断言结果为已跳过
pub fn assert_skipped(outcome: &TransitionOutcome) {
    assert!(!outcome.is_applied(), "expected Skipped, got {:?}", outcome);
}

/// 断言为非法状态转换
pub fn assert_invalid_transition<T: std::fmt::Debug>(result: Result<T, ApiError>) {
    match result {
        Err(ApiError::InvalidTransition { .. }) => {}
        other => panic!("expected InvalidTransition, got {:?}", other),
    }
}

/// 断言为模具不存在
pub fn assert_not_found<T: std::fmt::Debug>(result: Result<T, ApiError>) {
    match result {
        Err(ApiError::MoldNotFound { .. }) => {}
        other => panic!("expected MoldNotFound, got {:?}", other),
    }
}
