// ==========================================
// 模具管理系统 - 内存存储
// ==========================================
// 用途: 单元测试 / 嵌入式调用, 无持久化
// 语义与 MoldRepository 保持一致
// ==========================================

use crate::domain::{Mold, MoldAction, MoldLog};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::store::{MoldStatusCounts, MoldStore, MoldWrite};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct MemoryState {
    molds: BTreeMap<String, Mold>,
    logs: Vec<MoldLog>, // 追加顺序即写入顺序
}

/// 内存版模具存储
#[derive(Default)]
pub struct InMemoryMoldStore {
    state: Mutex<MemoryState>,
}

impl InMemoryMoldStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 时间倒序, 同一时间后写入者在前
    fn recent_first<'a>(logs: impl DoubleEndedIterator<Item = &'a MoldLog>) -> Vec<MoldLog> {
        let mut ordered: Vec<MoldLog> = logs.rev().cloned().collect();
        // 稳定排序: 时间相同保持 rev 之后的顺序
        ordered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        ordered
    }
}

impl MoldStore for InMemoryMoldStore {
    fn find_mold(&self, mold_id: &str) -> RepositoryResult<Option<Mold>> {
        Ok(self.lock()?.molds.get(mold_id).cloned())
    }

    fn list_molds(&self, keyword: Option<&str>) -> RepositoryResult<Vec<Mold>> {
        let state = self.lock()?;
        Ok(state
            .molds
            .values()
            .filter(|m| keyword.map_or(true, |k| m.matches_keyword(k)))
            .cloned()
            .collect())
    }

    fn count_by_status(&self) -> RepositoryResult<MoldStatusCounts> {
        let state = self.lock()?;
        let mut counts = MoldStatusCounts::default();
        for mold in state.molds.values() {
            counts.add(mold.status());
        }
        Ok(counts)
    }

    fn list_logs(&self, limit: Option<usize>) -> RepositoryResult<Vec<MoldLog>> {
        let state = self.lock()?;
        let mut logs = Self::recent_first(state.logs.iter());
        if let Some(limit) = limit {
            logs.truncate(limit);
        }
        Ok(logs)
    }

    fn list_logs_by_mold(&self, mold_id: &str) -> RepositoryResult<Vec<MoldLog>> {
        let state = self.lock()?;
        Ok(Self::recent_first(
            state.logs.iter().filter(|l| l.mold_id == mold_id),
        ))
    }

    fn list_logs_by_action(
        &self,
        action: MoldAction,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<MoldLog>> {
        let state = self.lock()?;
        let mut logs = Self::recent_first(state.logs.iter().filter(|l| l.action == action));
        if let Some(limit) = limit {
            logs.truncate(limit);
        }
        Ok(logs)
    }

    fn list_logs_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<Vec<MoldLog>> {
        let state = self.lock()?;
        Ok(Self::recent_first(
            state
                .logs
                .iter()
                .filter(|l| l.timestamp >= start && l.timestamp <= end),
        ))
    }

    fn commit(&self, write: MoldWrite, log: &MoldLog) -> RepositoryResult<()> {
        let mut state = self.lock()?;

        // 先校验, 再写入: 任一失败都不留下部分结果
        match &write {
            MoldWrite::Insert(mold) if state.molds.contains_key(&mold.mold_id) => {
                return Err(RepositoryError::UniqueConstraintViolation(format!(
                    "molds.mold_id={}",
                    mold.mold_id
                )));
            }
            MoldWrite::Update(_) | MoldWrite::Remove { .. }
                if !state.molds.contains_key(write.mold_id()) =>
            {
                return Err(RepositoryError::NotFound {
                    entity: "Mold".to_string(),
                    id: write.mold_id().to_string(),
                });
            }
            _ => {}
        }
        if state.logs.iter().any(|l| l.log_id == log.log_id) {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "mold_log.log_id={}",
                log.log_id
            )));
        }

        match write {
            MoldWrite::Insert(mold) | MoldWrite::Update(mold) => {
                state.molds.insert(mold.mold_id.clone(), mold);
            }
            MoldWrite::Remove { mold_id } => {
                state.molds.remove(&mold_id);
            }
        }
        state.logs.push(log.clone());
        Ok(())
    }
}
