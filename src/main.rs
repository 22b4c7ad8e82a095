// ==========================================
// 模具管理系统 - 命令行入口
// ==========================================
// 用法:
//   mold-manager create <model> <asset_suffix> <name> <max_shots>
//   mold-manager checkout <mold_id> <operator_name> <machine>
//   mold-manager return <mold_id> <shots_added>
//   mold-manager maintain <mold_id>
//   mold-manager delete <mold_id>
//   mold-manager list [keyword]
//   mold-manager logs [mold_id]
//   mold-manager logs-by-action <action>
//   mold-manager logs-between <start> <end>   (时间格式: "%Y-%m-%d %H:%M:%S")
//   mold-manager summary
//
// 结果以 JSON 输出到 stdout, 日志输出到 stderr
// 数据库路径: MOLD_MANAGER_DB_PATH 或用户数据目录
// ==========================================

use chrono::NaiveDateTime;
use mold_manager::app::{get_default_db_path, AppState};
use mold_manager::domain::MoldAction;
use mold_manager::logging;
use serde::Serialize;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const USAGE: &str = "\
用法:
  mold-manager create <model> <asset_suffix> <name> <max_shots>
  mold-manager checkout <mold_id> <operator_name> <machine>
  mold-manager return <mold_id> <shots_added>
  mold-manager maintain <mold_id>
  mold-manager delete <mold_id>
  mold-manager list [keyword]
  mold-manager logs [mold_id]
  mold-manager logs-by-action <action>
  mold-manager logs-between <start> <end>   (时间格式: \"%Y-%m-%d %H:%M:%S\")
  mold-manager summary";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };
    let rest = &args[1..];

    let db_path = get_default_db_path();
    tracing::debug!("使用数据库: {}", db_path);
    let state = AppState::new(db_path)?;
    let api = &state.mold_api;

    match (command, rest) {
        ("create", [model, suffix, name, max_shots]) => {
            let max_shots: i64 = max_shots
                .parse()
                .map_err(|e| format!("max_shots 不是整数: {}", e))?;
            print_json(&api.create(model, suffix, name, max_shots)?)
        }
        ("checkout", [mold_id, operator_name, machine]) => {
            print_json(&api.checkout(mold_id, operator_name, machine)?)
        }
        ("return", [mold_id, shots_added]) => {
            let shots_added: i64 = shots_added
                .parse()
                .map_err(|e| format!("shots_added 不是整数: {}", e))?;
            print_json(&api.return_mold(mold_id, shots_added)?)
        }
        ("maintain", [mold_id]) => print_json(&api.maintain(mold_id)?),
        ("delete", [mold_id]) => print_json(&api.delete(mold_id)?),
        ("list", []) => print_json(&api.list_molds(None)?),
        ("list", [keyword]) => print_json(&api.list_molds(Some(keyword.as_str()))?),
        ("logs", []) => print_json(&api.list_logs()?),
        ("logs", [mold_id]) => print_json(&api.list_logs_by_mold(mold_id)?),
        ("logs-by-action", [action]) => {
            let action = MoldAction::parse(action)
                .ok_or_else(|| format!("未知动作: {}", action))?;
            print_json(&api.list_logs_by_action(action)?)
        }
        ("logs-between", [start, end]) => {
            let start = parse_time("start", start)?;
            let end = parse_time("end", end)?;
            print_json(&api.list_logs_between(start, end)?)
        }
        ("summary", []) => print_json(&state.dashboard_api.status_summary()?),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

fn parse_time(field: &str, raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw.trim(), TIME_FORMAT)
        .map_err(|e| format!("{} 时间格式错误 ({}): {}", field, TIME_FORMAT, e))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
