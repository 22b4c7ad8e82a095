// ==========================================
// 模具管理系统 - 模具台账数据仓储 (SQLite)
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 台账写入与履历追加在同一事务内提交
// ==========================================

use crate::db::{format_timestamp, invalid_column, open_sqlite_connection, timestamp_column};
use crate::domain::mold::{Assignment, Mold, MoldState};
use crate::domain::mold_log::MoldLog;
use crate::domain::types::{MoldAction, MoldStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::mold_log_repo::{insert_log, MoldLogRepository};
use crate::repository::store::{MoldStatusCounts, MoldStore, MoldWrite};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT mold_id, model, name, max_shots, current_shots,
           status, operator_name, machine, last_maintenance, created_at
    FROM molds
"#;

// ==========================================
// MoldRepository - 模具台账仓储
// ==========================================
/// 模具台账仓储
/// 职责: 管理 molds 表, 并通过共享连接读写 mold_log 表
pub struct MoldRepository {
    conn: Arc<Mutex<Connection>>,
    log_repo: MoldLogRepository,
}

impl MoldRepository {
    /// 打开数据库文件创建仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            log_repo: MoldLogRepository::new(conn.clone()),
            conn,
        }
    }

    /// 履历仓储（共享同一连接）
    pub fn log_repo(&self) -> &MoldLogRepository {
        &self.log_repo
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按编号查询
    ///
    /// # 返回
    /// - Ok(Some(Mold)): 找到模具
    /// - Ok(None): 未找到
    /// - Err: 数据库错误
    pub fn find_by_id(&self, mold_id: &str) -> RepositoryResult<Option<Mold>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE mold_id = ?1", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![mold_id], map_mold_row) {
            Ok(mold) => Ok(Some(mold)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询模具列表
    ///
    /// # 参数
    /// - `keyword`: 对编号/名称/型号做子串匹配（区分大小写），None 表示全部
    pub fn list(&self, keyword: Option<&str>) -> RepositoryResult<Vec<Mold>> {
        let conn = self.get_conn()?;

        let molds = match keyword {
            Some(keyword) => {
                let sql = format!(
                    r#"{}
                    WHERE instr(mold_id, ?1) > 0
                       OR instr(name, ?1) > 0
                       OR instr(model, ?1) > 0
                    ORDER BY mold_id ASC"#,
                    SELECT_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![keyword], map_mold_row)?
                    .collect::<SqliteResult<Vec<_>>>()?;
                rows
            }
            None => {
                let sql = format!("{} ORDER BY mold_id ASC", SELECT_COLUMNS);
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([], map_mold_row)?
                    .collect::<SqliteResult<Vec<_>>>()?;
                rows
            }
        };

        Ok(molds)
    }

    /// 按状态计数
    pub fn count_by_status(&self) -> RepositoryResult<MoldStatusCounts> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM molds GROUP BY status")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut counts = MoldStatusCounts::default();
        for (status_raw, count) in rows {
            let status = MoldStatus::parse(&status_raw).ok_or_else(|| RepositoryError::FieldValueError {
                field: "status".to_string(),
                message: format!("未知模具状态: {}", status_raw),
            })?;
            counts.total += count;
            match status {
                MoldStatus::Available => counts.available += count,
                MoldStatus::InUse => counts.in_use += count,
                MoldStatus::Maintenance => counts.maintenance += count,
            }
        }
        Ok(counts)
    }

    /// 实体写入 + 履历追加（单事务）
    pub fn write_with_log(&self, write: &MoldWrite, log: &MoldLog) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        match write {
            MoldWrite::Insert(mold) => {
                tx.execute(
                    r#"
                    INSERT INTO molds (
                        mold_id, model, name, max_shots, current_shots,
                        status, operator_name, machine, last_maintenance, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    "#,
                    params![
                        mold.mold_id,
                        mold.model,
                        mold.name,
                        mold.max_shots,
                        mold.current_shots,
                        mold.status().as_str(),
                        mold.operator_name(),
                        mold.machine(),
                        format_timestamp(&mold.last_maintenance),
                        format_timestamp(&mold.created_at),
                    ],
                )?;
            }
            MoldWrite::Update(mold) => {
                // 型号/名称/寿命/建档时间不可变，不参与更新
                let rows = tx.execute(
                    r#"
                    UPDATE molds
                    SET current_shots = ?2,
                        status = ?3,
                        operator_name = ?4,
                        machine = ?5,
                        last_maintenance = ?6
                    WHERE mold_id = ?1
                    "#,
                    params![
                        mold.mold_id,
                        mold.current_shots,
                        mold.status().as_str(),
                        mold.operator_name(),
                        mold.machine(),
                        format_timestamp(&mold.last_maintenance),
                    ],
                )?;
                if rows == 0 {
                    return Err(RepositoryError::NotFound {
                        entity: "Mold".to_string(),
                        id: mold.mold_id.clone(),
                    });
                }
            }
            MoldWrite::Remove { mold_id } => {
                let rows = tx.execute("DELETE FROM molds WHERE mold_id = ?1", params![mold_id])?;
                if rows == 0 {
                    return Err(RepositoryError::NotFound {
                        entity: "Mold".to_string(),
                        id: mold_id.clone(),
                    });
                }
            }
        }

        insert_log(&tx, log)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }
}

impl MoldStore for MoldRepository {
    fn find_mold(&self, mold_id: &str) -> RepositoryResult<Option<Mold>> {
        self.find_by_id(mold_id)
    }

    fn list_molds(&self, keyword: Option<&str>) -> RepositoryResult<Vec<Mold>> {
        self.list(keyword)
    }

    fn count_by_status(&self) -> RepositoryResult<MoldStatusCounts> {
        MoldRepository::count_by_status(self)
    }

    fn list_logs(&self, limit: Option<usize>) -> RepositoryResult<Vec<MoldLog>> {
        self.log_repo.list_recent(limit)
    }

    fn list_logs_by_mold(&self, mold_id: &str) -> RepositoryResult<Vec<MoldLog>> {
        self.log_repo.find_by_mold_id(mold_id)
    }

    fn list_logs_by_action(
        &self,
        action: MoldAction,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<MoldLog>> {
        self.log_repo.find_by_action(action, limit)
    }

    fn list_logs_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<Vec<MoldLog>> {
        self.log_repo.find_by_time_range(start, end)
    }

    fn commit(&self, write: MoldWrite, log: &MoldLog) -> RepositoryResult<()> {
        self.write_with_log(&write, log)
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// molds 行 -> Mold
///
/// in-use 行缺少领用人/机台视为数据损坏
fn map_mold_row(row: &Row<'_>) -> SqliteResult<Mold> {
    let status_raw: String = row.get(5)?;
    let status = MoldStatus::parse(&status_raw)
        .ok_or_else(|| invalid_column(5, format!("未知模具状态: {}", status_raw)))?;

    let operator_name: Option<String> = row.get(6)?;
    let machine: Option<String> = row.get(7)?;

    let state = match status {
        MoldStatus::Available => MoldState::Available,
        MoldStatus::Maintenance => MoldState::Maintenance,
        MoldStatus::InUse => match (operator_name, machine) {
            (Some(operator_name), Some(machine)) => {
                MoldState::InUse(Assignment { operator_name, machine })
            }
            _ => return Err(invalid_column(6, "in-use 模具缺少领用人或机台".to_string())),
        },
    };

    Ok(Mold {
        mold_id: row.get(0)?,
        model: row.get(1)?,
        name: row.get(2)?,
        max_shots: row.get(3)?,
        current_shots: row.get(4)?,
        state,
        last_maintenance: timestamp_column(row, 8)?,
        created_at: timestamp_column(row, 9)?,
    })
}
