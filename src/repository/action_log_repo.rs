// ==========================================
// 工位轮换预订系统 - 操作日志数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::action_log::ActionLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// ActionLogRepository - 操作日志仓储
// ==========================================

/// 操作日志仓储
/// 职责: 管理 action_log 表的追加写与审计查询
pub struct ActionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActionLogRepository {
    /// 创建新的操作日志仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入操作日志
    pub fn insert(&self, log: &ActionLog) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO action_log (
                action_id, action_type, action_ts, actor,
                payload_json, booking_id, booking_date, detail
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                log.action_id,
                log.action_type,
                log.action_ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                log.actor,
                log.payload_json.as_ref().map(|v| v.to_string()),
                log.booking_id,
                log.booking_date.map(|d| d.format("%Y-%m-%d").to_string()),
                log.detail,
            ],
        )?;

        Ok(())
    }

    /// 查询最近的操作日志
    pub fn find_recent(&self, limit: usize) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, action_type, action_ts, actor,
                   payload_json, booking_id, booking_date, detail
            FROM action_log
            ORDER BY action_ts DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;

        let logs = stmt
            .query_map(params![limit as i64], map_log_row)?
            .collect::<SqliteResult<Vec<ActionLog>>>()?;

        Ok(logs)
    }

    /// 查询某预订的全部操作日志 (审计链)
    pub fn find_by_booking(&self, booking_id: &str) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, action_type, action_ts, actor,
                   payload_json, booking_id, booking_date, detail
            FROM action_log
            WHERE booking_id = ?1
            ORDER BY action_ts ASC, rowid ASC
            "#,
        )?;

        let logs = stmt
            .query_map(params![booking_id], map_log_row)?
            .collect::<SqliteResult<Vec<ActionLog>>>()?;

        Ok(logs)
    }
}

// ==========================================
// 行映射辅助
// ==========================================

fn map_log_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActionLog> {
    let payload_raw: Option<String> = row.get(4)?;
    let date_raw: Option<String> = row.get(6)?;

    Ok(ActionLog {
        action_id: row.get(0)?,
        action_type: row.get(1)?,
        action_ts: NaiveDateTime::parse_from_str(&row.get::<_, String>(2)?, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_else(|_| {
                NaiveDate::from_ymd_opt(1970, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            }),
        actor: row.get(3)?,
        payload_json: payload_raw.and_then(|s| serde_json::from_str(&s).ok()),
        booking_id: row.get(5)?,
        booking_date: date_raw.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        detail: row.get(7)?,
    })
}
