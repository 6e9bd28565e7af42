// ==========================================
// 工位轮换预订系统 - 座位数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 座位为只读参照数据, 仅初始化时批量写入
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::seat::Seat;
use crate::domain::types::SeatKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// SeatRepository - 座位仓储
// ==========================================

/// 座位仓储
/// 职责: 管理 seat 表的查询与初始化写入
pub struct SeatRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SeatRepository {
    /// 创建新的座位仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
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

    /// 按ID查询座位
    pub fn find_by_id(&self, seat_id: &str) -> RepositoryResult<Option<Seat>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT seat_id, seat_number, seat_kind, created_at FROM seat WHERE seat_id = ?1",
        )?;

        let seat = stmt.query_row(params![seat_id], map_seat_row).optional()?;

        Ok(seat)
    }

    /// 按编号查询座位
    pub fn find_by_number(&self, seat_number: &str) -> RepositoryResult<Option<Seat>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT seat_id, seat_number, seat_kind, created_at FROM seat WHERE seat_number = ?1",
        )?;

        let seat = stmt
            .query_row(params![seat_number], map_seat_row)
            .optional()?;

        Ok(seat)
    }

    /// 查询全部座位 (按编号排序)
    pub fn find_all(&self) -> RepositoryResult<Vec<Seat>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT seat_id, seat_number, seat_kind, created_at FROM seat ORDER BY seat_number",
        )?;

        let seats = stmt
            .query_map([], map_seat_row)?
            .collect::<SqliteResult<Vec<Seat>>>()?;

        Ok(seats)
    }

    /// 批量插入座位 (编号已存在则跳过)
    ///
    /// # 返回
    /// - Ok(usize): 实际插入的记录数
    pub fn insert_batch(&self, seats: &[Seat]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;

        conn.execute("BEGIN TRANSACTION", [])?;

        let mut inserted = 0;
        for seat in seats {
            let affected = conn
                .execute(
                    "INSERT OR IGNORE INTO seat (seat_id, seat_number, seat_kind, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        seat.seat_id,
                        seat.seat_number,
                        seat.kind.to_db_str(),
                        seat.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    ],
                )
                .map_err(|e| {
                    let _ = conn.execute("ROLLBACK", []);
                    RepositoryError::from(e)
                })?;
            inserted += affected;
        }

        conn.execute("COMMIT", [])?;

        Ok(inserted)
    }

    /// 座位总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM seat", [], |row| row.get(0))?;
        Ok(count)
    }
}

// ==========================================
// 行映射辅助
// ==========================================

fn map_seat_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Seat> {
    Ok(Seat {
        seat_id: row.get(0)?,
        seat_number: row.get(1)?,
        // 默认值: 浮动座位 (受更严格的解锁规则约束)
        kind: SeatKind::from_str(&row.get::<_, String>(2)?).unwrap_or(SeatKind::Floating),
        created_at: parse_ts(&row.get::<_, String>(3)?),
    })
}

fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn setup_repo() -> SeatRepository {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        SeatRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_insert_batch_and_find() {
        let repo = setup_repo();

        let seats = vec![
            Seat::new("D01".to_string(), SeatKind::Designated),
            Seat::new("F01".to_string(), SeatKind::Floating),
        ];
        let inserted = repo.insert_batch(&seats).unwrap();
        assert_eq!(inserted, 2);

        let all = repo.find_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].seat_number, "D01");
        assert!(all[0].is_designated());

        let by_number = repo.find_by_number("F01").unwrap().unwrap();
        assert_eq!(by_number.kind, SeatKind::Floating);

        let by_id = repo.find_by_id(&seats[0].seat_id).unwrap().unwrap();
        assert_eq!(by_id.seat_number, "D01");
    }

    #[test]
    fn test_insert_batch_skips_duplicates() {
        let repo = setup_repo();

        let first = vec![Seat::new("D01".to_string(), SeatKind::Designated)];
        assert_eq!(repo.insert_batch(&first).unwrap(), 1);

        // 相同编号重复插入被跳过 (幂等初始化)
        let again = vec![Seat::new("D01".to_string(), SeatKind::Designated)];
        assert_eq!(repo.insert_batch(&again).unwrap(), 0);
        assert_eq!(repo.count().unwrap(), 1);
    }
}
