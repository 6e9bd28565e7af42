// ==========================================
// 工位轮换预订系统 - 演示数据库初始化
// ==========================================
// 用法: seed_demo_db [db_path]
// 建表并写入演示座位 (D01~D40 指定 / F01~F10 浮动),
// 周期锚点设为最近的周一
// ==========================================

use chrono::{Datelike, Duration, Local};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::info;

use seat_booking::config::ConfigManager;
use seat_booking::db::{default_db_path, init_schema, open_sqlite_connection};
use seat_booking::domain::action_log::{ActionLog, ActionType};
use seat_booking::domain::seat::Seat;
use seat_booking::domain::types::SeatKind;
use seat_booking::repository::{ActionLogRepository, SeatRepository};

const DESIGNATED_COUNT: u32 = 40;
const FLOATING_COUNT: u32 = 10;

fn main() -> Result<(), Box<dyn Error>> {
    seat_booking::logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(default_db_path);

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    let conn = Arc::new(Mutex::new(conn));
    let seat_repo = SeatRepository::from_connection(conn.clone());
    let action_log_repo = ActionLogRepository::from_connection(conn.clone());
    let config_manager = ConfigManager::from_connection(conn)?;

    // ===== 座位: D01~D40 指定 + F01~F10 浮动 =====
    let mut seats = Vec::new();
    for i in 1..=DESIGNATED_COUNT {
        seats.push(Seat::new(format!("D{:02}", i), SeatKind::Designated));
    }
    for i in 1..=FLOATING_COUNT {
        seats.push(Seat::new(format!("F{:02}", i), SeatKind::Floating));
    }
    let inserted = seat_repo.insert_batch(&seats)?;
    info!(inserted, total = seats.len(), "座位初始化完成");

    // ===== 周期锚点: 最近的周一 =====
    let today = Local::now().date_naive();
    let last_monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    config_manager.set_cycle_start_date(last_monday)?;
    info!(cycle_start_date = %last_monday, "周期锚点已设置");

    let log = ActionLog::new(ActionType::SeedData, "system").with_detail(format!(
        "初始化 {} 个座位, 周期锚点 {}",
        seats.len(),
        last_monday
    ));
    action_log_repo.insert(&log)?;

    info!(db_path = %db_path, "演示数据库初始化完成");
    Ok(())
}
