// ==========================================
// 模具管理系统 - 模具生命周期引擎
// ==========================================
// 红线: Engine 不拼 SQL, 每次转换都产出一条履历
// ==========================================
// 职责: 判定状态转换是否合法, 计算转换后的模具与履历
// 输入: 当前 Mold + 操作参数
// 输出: Transition (实体写入 + 履历) 或 TransitionRejection
// ==========================================
//
// available --checkout--> in-use --return--> available / maintenance
// maintenance --maintain--> available
// 任意状态 --delete--> (移除)

use crate::domain::mold::{Assignment, Mold, MoldState, MoldUsageMonitor};
use crate::domain::mold_log::{notes, MoldLog};
use crate::domain::types::{MoldAction, MoldStatus};
use crate::repository::store::MoldWrite;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use tracing::debug;

// ==========================================
// Transition - 一次合法的状态转换
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub write: MoldWrite,
    pub log: MoldLog,
}

impl Transition {
    /// 转换后的模具（删除时为 None）
    pub fn mold(&self) -> Option<&Mold> {
        match &self.write {
            MoldWrite::Insert(mold) | MoldWrite::Update(mold) => Some(mold),
            MoldWrite::Remove { .. } => None,
        }
    }
}

// ==========================================
// TransitionRejection - 守卫条件不满足
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionRejection {
    pub mold_id: String,
    pub from: MoldStatus,
    pub action: MoldAction,
}

impl fmt::Display for TransitionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "模具 {} 当前状态为 {}，不允许执行 {}",
            self.mold_id, self.from, self.action
        )
    }
}

// ==========================================
// MoldLifecycleEngine - 模具生命周期引擎
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct MoldLifecycleEngine;

impl MoldLifecycleEngine {
    pub fn new() -> Self {
        Self
    }

    /// 各状态下允许的动作（不含 create）
    pub fn allowed_actions(status: MoldStatus) -> &'static [MoldAction] {
        match status {
            MoldStatus::Available => &[MoldAction::Checkout, MoldAction::Delete],
            MoldStatus::InUse => &[MoldAction::Return, MoldAction::Delete],
            MoldStatus::Maintenance => &[MoldAction::Maintenance, MoldAction::Delete],
        }
    }

    /// 建档
    ///
    /// 编号重复由存储层判定
    pub fn plan_create(
        &self,
        model: &str,
        asset_suffix: &str,
        name: &str,
        max_shots: i64,
        now: NaiveDateTime,
    ) -> Transition {
        let mold = Mold::new(model, asset_suffix, name, max_shots, now);
        let log = MoldLog::new(&mold.mold_id, MoldAction::Create, notes::CREATED, now);
        Transition {
            write: MoldWrite::Insert(mold),
            log,
        }
    }

    /// 领用出库: available -> in-use
    pub fn plan_checkout(
        &self,
        mold: &Mold,
        assignment: Assignment,
        now: NaiveDateTime,
    ) -> Result<Transition, TransitionRejection> {
        Self::guard(mold, MoldStatus::Available, MoldAction::Checkout)?;

        let log = MoldLog::new(&mold.mold_id, MoldAction::Checkout, notes::CHECKED_OUT, now)
            .with_assignment(&assignment.operator_name, &assignment.machine);

        let mut next = mold.clone();
        next.state = MoldState::InUse(assignment);

        Ok(Transition {
            write: MoldWrite::Update(next),
            log,
        })
    }

    /// 归还入库: in-use -> available / maintenance
    ///
    /// 累计模次达到设计寿命时自动转入保养
    pub fn plan_return(
        &self,
        mold: &Mold,
        shots_added: i64,
        now: NaiveDateTime,
    ) -> Result<Transition, TransitionRejection> {
        Self::guard(mold, MoldStatus::InUse, MoldAction::Return)?;

        let mut next = mold.clone();
        next.current_shots = mold.current_shots.saturating_add(shots_added);

        let note = if next.is_lifetime_reached() {
            next.state = MoldState::Maintenance;
            notes::LIFETIME_REACHED
        } else {
            next.state = MoldState::Available;
            notes::RETURNED
        };
        debug!(
            mold_id = %mold.mold_id,
            current_shots = next.current_shots,
            max_shots = next.max_shots,
            to = %next.status(),
            "归还判定"
        );

        let log = MoldLog::new(&mold.mold_id, MoldAction::Return, note, now)
            .with_shots_added(shots_added);

        Ok(Transition {
            write: MoldWrite::Update(next),
            log,
        })
    }

    /// 完成保养: maintenance -> available
    ///
    /// 累计模次不清零
    pub fn plan_maintain(
        &self,
        mold: &Mold,
        now: NaiveDateTime,
    ) -> Result<Transition, TransitionRejection> {
        Self::guard(mold, MoldStatus::Maintenance, MoldAction::Maintenance)?;

        let mut next = mold.clone();
        next.state = MoldState::Available;
        next.last_maintenance = now;

        let log = MoldLog::new(&mold.mold_id, MoldAction::Maintenance, notes::MAINTAINED, now);

        Ok(Transition {
            write: MoldWrite::Update(next),
            log,
        })
    }

    /// 删除: 任意状态
    pub fn plan_delete(&self, mold: &Mold, now: NaiveDateTime) -> Transition {
        Transition {
            write: MoldWrite::Remove {
                mold_id: mold.mold_id.clone(),
            },
            log: MoldLog::new(&mold.mold_id, MoldAction::Delete, notes::DELETED, now),
        }
    }

    fn guard(
        mold: &Mold,
        required: MoldStatus,
        action: MoldAction,
    ) -> Result<(), TransitionRejection> {
        if mold.status() == required {
            Ok(())
        } else {
            Err(TransitionRejection {
                mold_id: mold.mold_id.clone(),
                from: mold.status(),
                action,
            })
        }
    }
}
