// ==========================================
// 模具管理系统 - 模具领域模型
// ==========================================
// 红线: 领用人/机台只存在于 InUse 状态内部
// 对齐: molds 表
// ==========================================

use crate::domain::types::MoldStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 由型号与资产后缀拼出模具编号
///
/// 格式: "{model}-{asset_suffix}"
pub fn derive_mold_id(model: &str, asset_suffix: &str) -> String {
    format!("{}-{}", model, asset_suffix)
}

// ==========================================
// Assignment - 领用信息
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub operator_name: String, // 领用人
    pub machine: String,       // 上机机台
}

impl Assignment {
    pub fn new(operator_name: impl Into<String>, machine: impl Into<String>) -> Self {
        Self {
            operator_name: operator_name.into(),
            machine: machine.into(),
        }
    }
}

// ==========================================
// MoldState - 模具状态 (带领用信息)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum MoldState {
    Available,
    InUse(Assignment),
    Maintenance,
}

impl MoldState {
    pub fn status(&self) -> MoldStatus {
        match self {
            MoldState::Available => MoldStatus::Available,
            MoldState::InUse(_) => MoldStatus::InUse,
            MoldState::Maintenance => MoldStatus::Maintenance,
        }
    }

    pub fn assignment(&self) -> Option<&Assignment> {
        match self {
            MoldState::InUse(assignment) => Some(assignment),
            _ => None,
        }
    }
}

// ==========================================
// Mold - 模具
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mold {
    // ===== 主键 =====
    pub mold_id: String, // {model}-{asset_suffix}, 建档后不可变

    // ===== 业务元数据 (不可变) =====
    pub model: String, // 型号
    pub name: String,  // 名称 (允许重复)

    // ===== 寿命 =====
    pub max_shots: i64,     // 设计寿命 (模次)
    pub current_shots: i64, // 累计模次, 只增不减

    // ===== 状态 =====
    pub state: MoldState,

    // ===== 时间 =====
    pub last_maintenance: NaiveDateTime, // 最近保养时间 (建档时初始化)
    pub created_at: NaiveDateTime,
}

impl Mold {
    /// 建档: 状态 available, 累计模次 0
    pub fn new(
        model: &str,
        asset_suffix: &str,
        name: &str,
        max_shots: i64,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            mold_id: derive_mold_id(model, asset_suffix),
            model: model.to_string(),
            name: name.to_string(),
            max_shots,
            current_shots: 0,
            state: MoldState::Available,
            last_maintenance: now,
            created_at: now,
        }
    }

    pub fn status(&self) -> MoldStatus {
        self.state.status()
    }

    pub fn operator_name(&self) -> Option<&str> {
        self.state.assignment().map(|a| a.operator_name.as_str())
    }

    pub fn machine(&self) -> Option<&str> {
        self.state.assignment().map(|a| a.machine.as_str())
    }

    /// 关键字匹配 (编号/名称/型号 子串, 区分大小写)
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        self.mold_id.contains(keyword) || self.name.contains(keyword) || self.model.contains(keyword)
    }
}

// ==========================================
// Trait: MoldUsageMonitor
// ==========================================
// 用途: 寿命监控
pub trait MoldUsageMonitor {
    /// 累计模次是否已达设计寿命
    fn is_lifetime_reached(&self) -> bool;

    /// 剩余可用模次，最小为 0
    fn remaining_shots(&self) -> i64;

    /// 寿命使用率 (0.0 - 1.0+)
    fn utilization_ratio(&self) -> f64;
}

impl MoldUsageMonitor for Mold {
    fn is_lifetime_reached(&self) -> bool {
        self.current_shots >= self.max_shots
    }

    fn remaining_shots(&self) -> i64 {
        (self.max_shots - self.current_shots).max(0)
    }

    fn utilization_ratio(&self) -> f64 {
        if self.max_shots <= 0 {
            return 0.0;
        }
        self.current_shots as f64 / self.max_shots as f64
    }
}
