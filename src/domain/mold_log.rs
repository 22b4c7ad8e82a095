// ==========================================
// 模具管理系统 - 模具履历领域模型
// ==========================================
// 红线: 所有写入必须记录, 履历只增不改
// 用途: 审计追踪
// 对齐: mold_log 表
// ==========================================

use crate::domain::types::MoldAction;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// 履历备注
// ==========================================
pub mod notes {
    pub const CREATED: &str = "mold record created";
    pub const CHECKED_OUT: &str = "checked out to machine";
    pub const RETURNED: &str = "returned to stock";
    pub const LIFETIME_REACHED: &str =
        "lifetime threshold reached, auto-transitioned to maintenance";
    pub const MAINTAINED: &str = "maintenance completed, returned to stock";
    pub const DELETED: &str = "mold record deleted";
}

// ==========================================
// MoldLog - 模具履历
// ==========================================
// mold_id 为弱引用: 模具删除后履历保留
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoldLog {
    pub log_id: String, // UUID
    pub mold_id: String,
    pub action: MoldAction,

    // ===== 动作上下文 =====
    pub operator_name: Option<String>, // checkout
    pub machine: Option<String>,       // checkout
    pub shots_added: Option<i64>,      // return

    pub note: String,
    pub timestamp: NaiveDateTime,
}

impl MoldLog {
    /// 创建新的履历
    pub fn new(mold_id: &str, action: MoldAction, note: &str, timestamp: NaiveDateTime) -> Self {
        Self {
            log_id: uuid::Uuid::new_v4().to_string(),
            mold_id: mold_id.to_string(),
            action,
            operator_name: None,
            machine: None,
            shots_added: None,
            note: note.to_string(),
            timestamp,
        }
    }

    /// 设置领用人与机台
    pub fn with_assignment(mut self, operator_name: &str, machine: &str) -> Self {
        self.operator_name = Some(operator_name.to_string());
        self.machine = Some(machine.to_string());
        self
    }

    /// 设置本次增加的模次
    pub fn with_shots_added(mut self, shots_added: i64) -> Self {
        self.shots_added = Some(shots_added);
        self
    }
}
