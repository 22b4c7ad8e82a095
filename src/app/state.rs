// ==========================================
// 模具管理系统 - 应用状态
// ==========================================
// 职责: 打开数据库、初始化表结构、读取配置并装配 API 实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{DashboardApi, MoldApi};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection, read_schema_version};
use crate::repository::{MoldRepository, MoldStore};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "MOLD_MANAGER_DB_PATH";

/// 应用状态
///
/// 所有组件共享同一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 模具台账API
    pub mold_api: Arc<MoldApi>,

    /// 看板API
    pub dashboard_api: Arc<DashboardApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在时自动创建并建表）
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        match read_schema_version(&conn) {
            Ok(version) => tracing::info!(schema_version = ?version, "数据库表结构就绪"),
            Err(e) => tracing::warn!("读取 schema_version 失败(将继续启动): {}", e),
        }

        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        let store: Arc<dyn MoldStore> = Arc::new(MoldRepository::from_connection(conn));

        let mold_api = Arc::new(
            MoldApi::from_config(store.clone(), config_manager.as_ref())
                .map_err(|e| format!("无法创建MoldApi: {}", e))?,
        );
        tracing::info!(policy = %mold_api.policy(), "状态转换策略已加载");

        let dashboard_api = Arc::new(DashboardApi::new(store));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            mold_api,
            dashboard_api,
            config_manager,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 MOLD_MANAGER_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./mold_manager.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发构建使用独立目录
        #[cfg(debug_assertions)]
        let dir = data_dir.join("mold-manager-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("mold-manager");

        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("mold_manager.db");
        } else {
            tracing::warn!("无法创建数据目录 {}，使用当前目录", dir.display());
        }
    }

    path.to_string_lossy().to_string()
}
