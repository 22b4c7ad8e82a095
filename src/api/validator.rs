// ==========================================
// 模具管理系统 - 输入校验
// ==========================================
// 职责: 写操作前的参数校验，校验失败不读不写
// ==========================================

use crate::api::error::{ApiError, ApiResult};

/// 必填字符串（去除首尾空白后非空）
///
/// 返回去除首尾空白后的值
pub fn validate_required<'a>(field: &str, value: &'a str) -> ApiResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::ValidationError(format!("{}不能为空", field)));
    }
    Ok(value)
}

/// 设计寿命必须为正整数
pub fn validate_max_shots(max_shots: i64) -> ApiResult<()> {
    if max_shots <= 0 {
        return Err(ApiError::ValidationError(format!(
            "max_shots必须为正整数，当前值: {}",
            max_shots
        )));
    }
    Ok(())
}

/// 本次模次不能为负
pub fn validate_shots_added(shots_added: i64) -> ApiResult<()> {
    if shots_added < 0 {
        return Err(ApiError::ValidationError(format!(
            "shots_added不能为负数，当前值: {}",
            shots_added
        )));
    }
    Ok(())
}

/// 建档参数校验
pub fn validate_create(
    model: &str,
    asset_suffix: &str,
    name: &str,
    max_shots: i64,
) -> ApiResult<()> {
    validate_required("model", model)?;
    validate_required("asset_suffix", asset_suffix)?;
    validate_required("name", name)?;
    validate_max_shots(max_shots)
}
