// ==========================================
// 模具管理系统 - 台账配置读取 Trait
// ==========================================
// 职责: 定义模具台账所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::TransitionPolicy;
use std::error::Error;

/// 履历列表默认返回上限, 0 表示不限
pub const DEFAULT_LOG_LIST_LIMIT: usize = 0;

// ==========================================
// RegistryConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）/ StaticRegistryConfig
pub trait RegistryConfigReader: Send + Sync {
    /// 获取状态转换策略
    ///
    /// # 默认值
    /// - STRICT
    fn get_transition_policy(&self) -> Result<TransitionPolicy, Box<dyn Error>>;

    /// 获取履历列表返回上限
    ///
    /// # 返回
    /// - Some(n): 最多返回 n 条
    /// - None: 不限（配置值为 0）
    ///
    /// # 默认值
    /// - 不限（返回全部履历）
    fn get_log_list_limit(&self) -> Result<Option<usize>, Box<dyn Error>>;
}

// ==========================================
// StaticRegistryConfig - 固定配置
// ==========================================
// 用途: 无数据库场景（内存存储、测试）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticRegistryConfig {
    pub transition_policy: TransitionPolicy,
    pub log_list_limit: Option<usize>,
}

impl Default for StaticRegistryConfig {
    fn default() -> Self {
        Self {
            transition_policy: TransitionPolicy::Strict,
            log_list_limit: None,
        }
    }
}

impl RegistryConfigReader for StaticRegistryConfig {
    fn get_transition_policy(&self) -> Result<TransitionPolicy, Box<dyn Error>> {
        Ok(self.transition_policy)
    }

    fn get_log_list_limit(&self) -> Result<Option<usize>, Box<dyn Error>> {
        Ok(self.log_list_limit)
    }
}
