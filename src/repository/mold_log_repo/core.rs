use crate::db::format_timestamp;
use crate::domain::mold_log::MoldLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// MoldLogRepository - 模具履历仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct MoldLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MoldLogRepository {
    /// 创建新的履历仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

/// 在给定连接（或事务）上追加履历
pub(crate) fn insert_log(conn: &Connection, log: &MoldLog) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO mold_log (
            log_id, mold_id, action, operator_name, machine,
            shots_added, note, timestamp
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            log.log_id,
            log.mold_id,
            log.action.as_str(),
            log.operator_name,
            log.machine,
            log.shots_added,
            log.note,
            format_timestamp(&log.timestamp),
        ],
    )?;
    Ok(())
}
