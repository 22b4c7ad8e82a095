use super::core::MoldLogRepository;
use crate::db::{format_timestamp, invalid_column, timestamp_column};
use crate::domain::mold_log::MoldLog;
use crate::domain::types::MoldAction;
use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;
use rusqlite::{params, Result as SqliteResult, Row};

const SELECT_COLUMNS: &str = r#"
    SELECT log_id, mold_id, action, operator_name, machine,
           shots_added, note, timestamp
    FROM mold_log
"#;

// 同一时间戳下按写入顺序倒排
const ORDER_RECENT_FIRST: &str = "ORDER BY timestamp DESC, rowid DESC";

impl MoldLogRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 log_id 查询单条履历
    pub fn find_by_id(&self, log_id: &str) -> RepositoryResult<Option<MoldLog>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE log_id = ?1", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![log_id], Self::map_row) {
            Ok(log) => Ok(Some(log)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询全部履历（时间倒序）
    ///
    /// # 参数
    /// - `limit`: 返回数量上限，None 表示不限
    pub fn list_recent(&self, limit: Option<usize>) -> RepositoryResult<Vec<MoldLog>> {
        let conn = self.get_conn()?;
        // SQLite 中 LIMIT -1 表示不限
        let limit = limit.map(|n| n as i64).unwrap_or(-1);
        let sql = format!("{} {} LIMIT ?1", SELECT_COLUMNS, ORDER_RECENT_FIRST);
        let mut stmt = conn.prepare(&sql)?;

        let logs = stmt
            .query_map(params![limit], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 查询指定模具的履历（时间倒序，已删除模具的履历同样可查）
    pub fn find_by_mold_id(&self, mold_id: &str) -> RepositoryResult<Vec<MoldLog>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE mold_id = ?1 {}", SELECT_COLUMNS, ORDER_RECENT_FIRST);
        let mut stmt = conn.prepare(&sql)?;

        let logs = stmt
            .query_map(params![mold_id], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 查询指定动作类型的履历（时间倒序）
    ///
    /// # 参数
    /// - `limit`: 返回数量上限，None 表示不限
    pub fn find_by_action(
        &self,
        action: MoldAction,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<MoldLog>> {
        let conn = self.get_conn()?;
        let limit = limit.map(|n| n as i64).unwrap_or(-1);
        let sql = format!(
            "{} WHERE action = ?1 {} LIMIT ?2",
            SELECT_COLUMNS, ORDER_RECENT_FIRST
        );
        let mut stmt = conn.prepare(&sql)?;

        let logs = stmt
            .query_map(params![action.as_str(), limit], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 查询指定时间范围的履历（闭区间）
    pub fn find_by_time_range(
        &self,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> RepositoryResult<Vec<MoldLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE timestamp BETWEEN ?1 AND ?2 {}",
            SELECT_COLUMNS, ORDER_RECENT_FIRST
        );
        let mut stmt = conn.prepare(&sql)?;

        let logs = stmt
            .query_map(
                params![format_timestamp(&start_time), format_timestamp(&end_time)],
                Self::map_row,
            )?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 履历总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM mold_log", [], |row| row.get(0))?;
        Ok(count)
    }

    // ==========================================
    // 行映射
    // ==========================================

    pub(super) fn map_row(row: &Row<'_>) -> SqliteResult<MoldLog> {
        let action_raw: String = row.get(2)?;
        let action = MoldAction::parse(&action_raw)
            .ok_or_else(|| invalid_column(2, format!("未知履历动作: {}", action_raw)))?;

        Ok(MoldLog {
            log_id: row.get(0)?,
            mold_id: row.get(1)?,
            action,
            operator_name: row.get(3)?,
            machine: row.get(4)?,
            shots_added: row.get(5)?,
            note: row.get(6)?,
            timestamp: timestamp_column(row, 7)?,
        })
    }
}
