// ==========================================
// 模具管理系统 - 存储抽象
// ==========================================
// 职责: 模具台账 + 模具履历 的统一存储接口
// 红线: commit 必须原子 (实体写入与履历追加同成同败)
// ==========================================

use crate::domain::{Mold, MoldAction, MoldLog, MoldStatus};
use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// MoldWrite - 实体写入
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum MoldWrite {
    /// 新增 (编号已存在时返回 UniqueConstraintViolation)
    Insert(Mold),
    /// 覆盖已有记录
    Update(Mold),
    /// 删除记录
    Remove { mold_id: String },
}

impl MoldWrite {
    pub fn mold_id(&self) -> &str {
        match self {
            MoldWrite::Insert(mold) | MoldWrite::Update(mold) => &mold.mold_id,
            MoldWrite::Remove { mold_id } => mold_id,
        }
    }
}

// ==========================================
// MoldStatusCounts - 状态计数
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoldStatusCounts {
    pub total: i64,
    pub available: i64,
    pub in_use: i64,
    pub maintenance: i64,
}

impl MoldStatusCounts {
    /// 按状态累加一条记录
    pub fn add(&mut self, status: MoldStatus) {
        self.total += 1;
        match status {
            MoldStatus::Available => self.available += 1,
            MoldStatus::InUse => self.in_use += 1,
            MoldStatus::Maintenance => self.maintenance += 1,
        }
    }
}

// ==========================================
// Trait: MoldStore
// ==========================================
// 实现: MoldRepository (SQLite) / InMemoryMoldStore (内存)
pub trait MoldStore: Send + Sync {
    /// 按编号查询模具
    fn find_mold(&self, mold_id: &str) -> RepositoryResult<Option<Mold>>;

    /// 查询模具列表 (按编号升序), keyword 对编号/名称/型号做子串匹配
    fn list_molds(&self, keyword: Option<&str>) -> RepositoryResult<Vec<Mold>>;

    /// 按状态计数
    fn count_by_status(&self) -> RepositoryResult<MoldStatusCounts>;

    /// 查询履历 (时间倒序, 同一时间后写入者在前), limit=None 表示不限
    fn list_logs(&self, limit: Option<usize>) -> RepositoryResult<Vec<MoldLog>>;

    /// 查询指定模具编号的履历 (时间倒序)
    fn list_logs_by_mold(&self, mold_id: &str) -> RepositoryResult<Vec<MoldLog>>;

    /// 查询指定动作的履历 (时间倒序), limit=None 表示不限
    fn list_logs_by_action(
        &self,
        action: MoldAction,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<MoldLog>>;

    /// 查询时间闭区间内的履历 (时间倒序)
    fn list_logs_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<Vec<MoldLog>>;

    /// 原子提交: 实体写入 + 履历追加
    fn commit(&self, write: MoldWrite, log: &MoldLog) -> RepositoryResult<()>;
}
