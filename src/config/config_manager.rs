// ==========================================
// 模具管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value)
// ==========================================

use crate::config::registry_config_trait::{RegistryConfigReader, DEFAULT_LOG_LIST_LIMIT};
use crate::db::open_sqlite_connection;
use crate::domain::types::TransitionPolicy;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;

        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 获取所有配置（按 key 排序）
    pub fn list_configs(&self) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(config_map)
    }
}

// ==========================================
// RegistryConfigReader Trait 实现
// ==========================================
impl RegistryConfigReader for ConfigManager {
    fn get_transition_policy(&self) -> Result<TransitionPolicy, Box<dyn Error>> {
        let default = TransitionPolicy::default();
        let value = self.get_config_or_default(config_keys::TRANSITION_POLICY, default.as_str())?;
        Ok(TransitionPolicy::parse(&value).unwrap_or_else(|| {
            tracing::warn!(
                config_key = config_keys::TRANSITION_POLICY,
                raw_value = %value,
                "状态转换策略配置无法识别，使用默认值"
            );
            default
        }))
    }

    fn get_log_list_limit(&self) -> Result<Option<usize>, Box<dyn Error>> {
        let default = DEFAULT_LOG_LIST_LIMIT.to_string();
        let value = self.get_config_or_default(config_keys::LOG_LIST_LIMIT, &default)?;
        let limit = value.trim().parse::<usize>().unwrap_or_else(|_| {
            tracing::warn!(
                config_key = config_keys::LOG_LIST_LIMIT,
                raw_value = %value,
                "履历列表上限配置格式错误，使用默认值"
            );
            DEFAULT_LOG_LIST_LIMIT
        });
        Ok(if limit == 0 { None } else { Some(limit) })
    }
}

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    // 状态转换策略: STRICT / LENIENT
    pub const TRANSITION_POLICY: &str = "transition_policy";

    // 履历列表返回上限, 0 表示不限
    pub const LOG_LIST_LIMIT: &str = "log_list_limit";
}
