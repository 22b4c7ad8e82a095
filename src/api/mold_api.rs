// ==========================================
// 模具管理系统 - 模具台账 API
// ==========================================
// 职责: 建档 / 领用 / 归还 / 保养 / 删除, 以及台账与履历查询
// 红线: 每次写操作 = 一次实体写入 + 一条履历, 同一事务提交
// ==========================================

use std::sync::Arc;

use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{validate_create, validate_required, validate_shots_added};
use crate::config::RegistryConfigReader;
use crate::domain::mold::{Assignment, Mold};
use crate::domain::mold_log::MoldLog;
use crate::domain::types::{MoldAction, MoldStatus, TransitionPolicy};
use crate::engine::{MoldLifecycleEngine, Transition, TransitionRejection};
use crate::repository::error::RepositoryError;
use crate::repository::store::{MoldStore, MoldWrite};

// ==========================================
// TransitionOutcome - 写操作结果
// ==========================================

/// 写操作结果
///
/// Skipped 仅在 Lenient 策略下出现：无状态变化、无履历。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionOutcome {
    Applied {
        /// 转换后的模具（删除时为 None）
        mold: Option<Mold>,
        log: MoldLog,
    },
    Skipped {
        mold_id: String,
        action: MoldAction,
        reason: String,
    },
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied { .. })
    }

    pub fn mold(&self) -> Option<&Mold> {
        match self {
            TransitionOutcome::Applied { mold, .. } => mold.as_ref(),
            TransitionOutcome::Skipped { .. } => None,
        }
    }

    pub fn log(&self) -> Option<&MoldLog> {
        match self {
            TransitionOutcome::Applied { log, .. } => Some(log),
            TransitionOutcome::Skipped { .. } => None,
        }
    }
}

// ==========================================
// MoldApi - 模具台账 API
// ==========================================

/// 模具台账API
///
/// 职责：
/// 1. 参数校验（不合法时不读不写）
/// 2. 调用生命周期引擎判定转换
/// 3. 按 TransitionPolicy 处理非法状态/模具不存在
/// 4. 通过 MoldStore::commit 原子提交
pub struct MoldApi {
    store: Arc<dyn MoldStore>,
    engine: MoldLifecycleEngine,
    policy: TransitionPolicy,
    log_list_limit: Option<usize>,
}

impl MoldApi {
    /// 创建新的MoldApi实例
    pub fn new(store: Arc<dyn MoldStore>, policy: TransitionPolicy) -> Self {
        Self {
            store,
            engine: MoldLifecycleEngine::new(),
            policy,
            log_list_limit: None,
        }
    }

    /// 按配置创建（策略 + 履历列表上限）
    pub fn from_config(
        store: Arc<dyn MoldStore>,
        config: &dyn RegistryConfigReader,
    ) -> ApiResult<Self> {
        let policy = config
            .get_transition_policy()
            .map_err(|e| ApiError::Persistence(format!("读取配置失败: {}", e)))?;
        let log_list_limit = config
            .get_log_list_limit()
            .map_err(|e| ApiError::Persistence(format!("读取配置失败: {}", e)))?;

        Ok(Self::new(store, policy).with_log_list_limit(log_list_limit))
    }

    /// 设置履历列表返回上限
    pub fn with_log_list_limit(mut self, limit: Option<usize>) -> Self {
        self.log_list_limit = limit;
        self
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    // ==========================================
    // 写操作
    // ==========================================

    /// 新增模具
    ///
    /// # 返回
    /// - Ok(Mold): 建档成功（状态 available，累计模次 0）
    /// - Err(ApiError::DuplicateId): 编号已存在，无写入
    #[instrument(skip(self))]
    pub fn create(
        &self,
        model: &str,
        asset_suffix: &str,
        name: &str,
        max_shots: i64,
    ) -> ApiResult<Mold> {
        validate_create(model, asset_suffix, name, max_shots)?;
        let (model, asset_suffix, name) = (model.trim(), asset_suffix.trim(), name.trim());

        let transition = self
            .engine
            .plan_create(model, asset_suffix, name, max_shots, now());
        let mold_id = transition.log.mold_id.clone();

        if self.store.find_mold(&mold_id)?.is_some() {
            warn!(mold_id = %mold_id, "模具编号已存在");
            return Err(ApiError::DuplicateId { mold_id });
        }

        match self.commit(transition)? {
            Some(outcome) => outcome
                .mold()
                .cloned()
                .ok_or_else(|| ApiError::Persistence("建档结果缺少模具记录".to_string())),
            // 并发写入时由唯一约束兜底
            None => Err(ApiError::DuplicateId { mold_id }),
        }
    }

    /// 领用出库 (available -> in-use)
    #[instrument(skip(self))]
    pub fn checkout(
        &self,
        mold_id: &str,
        operator_name: &str,
        machine: &str,
    ) -> ApiResult<TransitionOutcome> {
        let mold_id = validate_required("mold_id", mold_id)?;
        let operator_name = validate_required("operator_name", operator_name)?;
        let machine = validate_required("machine", machine)?;

        let mold = match self.load(mold_id, MoldAction::Checkout)? {
            Ok(mold) => mold,
            Err(skipped) => return Ok(skipped),
        };

        let planned = self
            .engine
            .plan_checkout(&mold, Assignment::new(operator_name, machine), now());
        self.resolve(mold_id, MoldAction::Checkout, planned)
    }

    /// 归还入库 (in-use -> available / maintenance)
    ///
    /// 累计模次达到设计寿命时自动转为 maintenance
    #[instrument(skip(self))]
    pub fn return_mold(&self, mold_id: &str, shots_added: i64) -> ApiResult<TransitionOutcome> {
        let mold_id = validate_required("mold_id", mold_id)?;
        validate_shots_added(shots_added)?;

        let mold = match self.load(mold_id, MoldAction::Return)? {
            Ok(mold) => mold,
            Err(skipped) => return Ok(skipped),
        };

        let planned = self.engine.plan_return(&mold, shots_added, now());
        self.resolve(mold_id, MoldAction::Return, planned)
    }

    /// 完成保养 (maintenance -> available)，累计模次不清零
    #[instrument(skip(self))]
    pub fn maintain(&self, mold_id: &str) -> ApiResult<TransitionOutcome> {
        let mold_id = validate_required("mold_id", mold_id)?;

        let mold = match self.load(mold_id, MoldAction::Maintenance)? {
            Ok(mold) => mold,
            Err(skipped) => return Ok(skipped),
        };

        let planned = self.engine.plan_maintain(&mold, now());
        self.resolve(mold_id, MoldAction::Maintenance, planned)
    }

    /// 删除模具（任意状态），历史履历保留
    #[instrument(skip(self))]
    pub fn delete(&self, mold_id: &str) -> ApiResult<TransitionOutcome> {
        let mold_id = validate_required("mold_id", mold_id)?;

        let mold = match self.load(mold_id, MoldAction::Delete)? {
            Ok(mold) => mold,
            Err(skipped) => return Ok(skipped),
        };

        let transition = self.engine.plan_delete(&mold, now());
        self.resolve(mold_id, MoldAction::Delete, Ok(transition))
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 按编号查询模具
    pub fn get_mold(&self, mold_id: &str) -> ApiResult<Option<Mold>> {
        Ok(self.store.find_mold(mold_id.trim())?)
    }

    /// 查询模具列表
    ///
    /// # 参数
    /// - keyword: 对编号/名称/型号做子串匹配，空白视为不过滤
    pub fn list_molds(&self, keyword: Option<&str>) -> ApiResult<Vec<Mold>> {
        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());
        let molds = self.store.list_molds(keyword)?;
        debug!(keyword = ?keyword, count = molds.len(), "查询模具列表");
        Ok(molds)
    }

    /// 查询全部履历（时间倒序，受 log_list_limit 限制）
    pub fn list_logs(&self) -> ApiResult<Vec<MoldLog>> {
        Ok(self.store.list_logs(self.log_list_limit)?)
    }

    /// 查询指定模具的履历（时间倒序，已删除模具同样可查）
    pub fn list_logs_by_mold(&self, mold_id: &str) -> ApiResult<Vec<MoldLog>> {
        let mold_id = validate_required("mold_id", mold_id)?;
        Ok(self.store.list_logs_by_mold(mold_id)?)
    }

    /// 查询指定动作的履历（时间倒序，受 log_list_limit 限制）
    pub fn list_logs_by_action(&self, action: MoldAction) -> ApiResult<Vec<MoldLog>> {
        let logs = self.store.list_logs_by_action(action, self.log_list_limit)?;
        debug!(action = %action, count = logs.len(), "按动作查询履历");
        Ok(logs)
    }

    /// 查询时间区间内的履历（闭区间，时间倒序）
    pub fn list_logs_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> ApiResult<Vec<MoldLog>> {
        if start > end {
            return Err(ApiError::ValidationError(format!(
                "起始时间晚于结束时间: {} > {}",
                start, end
            )));
        }
        Ok(self.store.list_logs_between(start, end)?)
    }

    // ==========================================
    // 内部方法
    // ==========================================

    /// 读取目标模具
    ///
    /// # 返回
    /// - Ok(Ok(mold)): 模具存在
    /// - Ok(Err(outcome)): 模具不存在且策略为 Lenient
    /// - Err(MoldNotFound): 模具不存在且策略为 Strict
    fn load(
        &self,
        mold_id: &str,
        action: MoldAction,
    ) -> ApiResult<Result<Mold, TransitionOutcome>> {
        match self.store.find_mold(mold_id)? {
            Some(mold) => Ok(Ok(mold)),
            None => self.missing(mold_id, action).map(Err),
        }
    }

    /// 模具不存在时按策略处理
    fn missing(&self, mold_id: &str, action: MoldAction) -> ApiResult<TransitionOutcome> {
        warn!(mold_id = %mold_id, action = %action, policy = %self.policy, "模具不存在");
        match self.policy {
            TransitionPolicy::Strict => Err(ApiError::MoldNotFound {
                mold_id: mold_id.to_string(),
            }),
            TransitionPolicy::Lenient => Ok(TransitionOutcome::Skipped {
                mold_id: mold_id.to_string(),
                action,
                reason: format!("模具不存在: {}", mold_id),
            }),
        }
    }

    /// 按策略处理引擎判定结果
    fn resolve(
        &self,
        mold_id: &str,
        action: MoldAction,
        planned: Result<Transition, TransitionRejection>,
    ) -> ApiResult<TransitionOutcome> {
        match planned {
            Ok(transition) => match self.commit(transition)? {
                Some(outcome) => Ok(outcome),
                // 读取后、提交前记录已被删除
                None => self.missing(mold_id, action),
            },
            Err(rejection) => {
                let allowed = allowed_actions_hint(rejection.from);
                warn!(
                    mold_id = %rejection.mold_id,
                    from = %rejection.from,
                    action = %rejection.action,
                    allowed = %allowed,
                    policy = %self.policy,
                    "状态转换被拒绝"
                );
                match self.policy {
                    TransitionPolicy::Strict => Err(rejection.into()),
                    TransitionPolicy::Lenient => Ok(TransitionOutcome::Skipped {
                        mold_id: rejection.mold_id.clone(),
                        action: rejection.action,
                        reason: format!("{}（可执行: {}）", rejection, allowed),
                    }),
                }
            }
        }
    }

    /// 原子提交
    ///
    /// # 返回
    /// - Ok(Some(outcome)): 已提交
    /// - Ok(None): 存储层报告编号冲突或记录不存在（未提交）
    /// - Err(Persistence): 其他存储失败（未提交）
    fn commit(&self, transition: Transition) -> ApiResult<Option<TransitionOutcome>> {
        let Transition { write, log } = transition;
        let mold = match &write {
            MoldWrite::Insert(mold) | MoldWrite::Update(mold) => Some(mold.clone()),
            MoldWrite::Remove { .. } => None,
        };

        match self.store.commit(write, &log) {
            Ok(()) => {
                info!(
                    mold_id = %log.mold_id,
                    action = %log.action,
                    note = %log.note,
                    "模具状态已提交"
                );
                Ok(Some(TransitionOutcome::Applied { mold, log }))
            }
            Err(RepositoryError::UniqueConstraintViolation(msg)) if log.action == MoldAction::Create => {
                warn!(mold_id = %log.mold_id, detail = %msg, "建档时编号冲突");
                Ok(None)
            }
            Err(RepositoryError::NotFound { .. }) if log.action != MoldAction::Create => Ok(None),
            Err(e) => {
                error!(mold_id = %log.mold_id, action = %log.action, error = %e, "提交失败");
                Err(e.into())
            }
        }
    }
}

/// 当前状态下可执行的动作，如 "checkout/delete"
fn allowed_actions_hint(status: MoldStatus) -> String {
    MoldLifecycleEngine::allowed_actions(status)
        .iter()
        .map(|action| action.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

/// 当前时间（毫秒精度，与存储格式一致）
fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(3)
}
