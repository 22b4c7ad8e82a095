// ==========================================
// 模具管理系统 - 看板 API
// ==========================================
// 职责: 台账状态汇总与最近履历查询（只读）
// ==========================================

use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::domain::mold_log::MoldLog;
use crate::repository::store::{MoldStatusCounts, MoldStore};

/// 看板API
///
/// 只读，不产生履历
pub struct DashboardApi {
    store: Arc<dyn MoldStore>,
}

impl DashboardApi {
    pub fn new(store: Arc<dyn MoldStore>) -> Self {
        Self { store }
    }

    /// 按状态统计模具数量
    pub fn status_summary(&self) -> ApiResult<MoldStatusCounts> {
        let counts = self.store.count_by_status()?;
        tracing::debug!(
            total = counts.total,
            available = counts.available,
            in_use = counts.in_use,
            maintenance = counts.maintenance,
            "台账状态汇总"
        );
        Ok(counts)
    }

    /// 最近 n 条履历（时间倒序）
    pub fn recent_logs(&self, n: usize) -> ApiResult<Vec<MoldLog>> {
        Ok(self.store.list_logs(Some(n))?)
    }
}
