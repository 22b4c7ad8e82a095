// ==========================================
// 模具管理系统 - 领域类型定义
// ==========================================
// 模具状态 / 履历动作 / 状态转换策略
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 模具状态 (Mold Status)
// ==========================================
// 存储格式: kebab-case (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoldStatus {
    Available,   // 在库可用
    InUse,       // 领用中
    Maintenance, // 保养/维修中
}

impl MoldStatus {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            MoldStatus::Available => "available",
            MoldStatus::InUse => "in-use",
            MoldStatus::Maintenance => "maintenance",
        }
    }

    /// 从字符串解析
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(MoldStatus::Available),
            "in-use" => Some(MoldStatus::InUse),
            "maintenance" => Some(MoldStatus::Maintenance),
            _ => None,
        }
    }
}

impl fmt::Display for MoldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 履历动作 (Mold Action)
// ==========================================
// 每个写操作对应一个动作,一条履历
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoldAction {
    Create,      // 建档
    Checkout,    // 领用出库
    Return,      // 归还入库
    Maintenance, // 完成保养
    Delete,      // 删除
}

impl MoldAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoldAction::Create => "create",
            MoldAction::Checkout => "checkout",
            MoldAction::Return => "return",
            MoldAction::Maintenance => "maintenance",
            MoldAction::Delete => "delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(MoldAction::Create),
            "checkout" => Some(MoldAction::Checkout),
            "return" => Some(MoldAction::Return),
            "maintenance" => Some(MoldAction::Maintenance),
            "delete" => Some(MoldAction::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for MoldAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 状态转换策略 (Transition Policy)
// ==========================================
// Strict: 非法状态下调用 checkout/return/maintain/delete 返回错误
// Lenient: 静默跳过,返回可识别的 Skipped 结果
// 配置存储: SCREAMING_SNAKE_CASE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionPolicy {
    #[default]
    Strict,
    Lenient,
}

impl TransitionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPolicy::Strict => "STRICT",
            TransitionPolicy::Lenient => "LENIENT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STRICT" => Some(TransitionPolicy::Strict),
            "LENIENT" => Some(TransitionPolicy::Lenient),
            _ => None,
        }
    }
}

impl fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
