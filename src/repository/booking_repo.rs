// ==========================================
// 工位轮换预订系统 - 预订数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 例外说明: insert_if_absent 的"占用复查 + 插入"属于数据层
// 唯一性约束的实现, 业务含义由 API 层赋予
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::booking::Booking;
use crate::domain::types::BookingStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// BookingInsertOutcome - 原子插入结果
// ==========================================
// 复查与插入在同一事务内完成; 占用结果是正常返回值而非错误,
// 由 API 层映射为 AlreadyBooked / DuplicateUserBooking
#[derive(Debug)]
pub enum BookingInsertOutcome {
    Inserted(Booking),  // 插入成功
    SeatTaken,          // 座位当日已有 ACTIVE 预订
    UserAlreadyBooked,  // 用户当日已有 ACTIVE 预订
}

// ==========================================
// BookingRepository - 预订仓储
// ==========================================

/// 预订仓储
/// 职责: 管理 booking 表的查询与状态流转, 提供原子条件插入原语
pub struct BookingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BookingRepository {
    /// 创建新的预订仓储实例
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

    /// 按ID查询预订
    pub fn find_by_id(&self, booking_id: &str) -> RepositoryResult<Option<Booking>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT booking_id, seat_id, user_id, booking_date, status, created_at, updated_at
            FROM booking
            WHERE booking_id = ?1
            "#,
        )?;

        let booking = stmt
            .query_row(params![booking_id], map_booking_row)
            .optional()?;

        Ok(booking)
    }

    /// 查询某日全部 ACTIVE 预订 (资格评估的占用输入)
    pub fn find_active_by_date(&self, date: NaiveDate) -> RepositoryResult<Vec<Booking>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT booking_id, seat_id, user_id, booking_date, status, created_at, updated_at
            FROM booking
            WHERE booking_date = ?1 AND status = 'ACTIVE'
            ORDER BY seat_id
            "#,
        )?;

        let bookings = stmt
            .query_map(params![fmt_date(date)], map_booking_row)?
            .collect::<SqliteResult<Vec<Booking>>>()?;

        Ok(bookings)
    }

    /// 查询用户某日的 ACTIVE 预订
    pub fn find_active_by_user_and_date(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> RepositoryResult<Option<Booking>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT booking_id, seat_id, user_id, booking_date, status, created_at, updated_at
            FROM booking
            WHERE user_id = ?1 AND booking_date = ?2 AND status = 'ACTIVE'
            "#,
        )?;

        let booking = stmt
            .query_row(params![user_id, fmt_date(date)], map_booking_row)
            .optional()?;

        Ok(booking)
    }

    /// 查询座位某日的 ACTIVE 预订
    pub fn find_active_by_seat_and_date(
        &self,
        seat_id: &str,
        date: NaiveDate,
    ) -> RepositoryResult<Option<Booking>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT booking_id, seat_id, user_id, booking_date, status, created_at, updated_at
            FROM booking
            WHERE seat_id = ?1 AND booking_date = ?2 AND status = 'ACTIVE'
            "#,
        )?;

        let booking = stmt
            .query_row(params![seat_id, fmt_date(date)], map_booking_row)
            .optional()?;

        Ok(booking)
    }

    /// 查询预订列表
    ///
    /// # 参数
    /// - user_id: 限定用户 (None 表示全部, 供管理员视图)
    /// - upcoming_from: 限定"未来预订" (date >= 该日期 且 ACTIVE)
    pub fn find_bookings(
        &self,
        user_id: Option<&str>,
        upcoming_from: Option<NaiveDate>,
    ) -> RepositoryResult<Vec<Booking>> {
        let conn = self.get_conn()?;

        // 动态拼接条件均为参数化占位, 无注入面
        let mut sql = String::from(
            "SELECT booking_id, seat_id, user_id, booking_date, status, created_at, updated_at
             FROM booking WHERE 1=1",
        );
        let mut args: Vec<String> = Vec::new();

        if let Some(uid) = user_id {
            sql.push_str(&format!(" AND user_id = ?{}", args.len() + 1));
            args.push(uid.to_string());
        }
        if let Some(from) = upcoming_from {
            sql.push_str(&format!(" AND booking_date >= ?{}", args.len() + 1));
            args.push(fmt_date(from));
            sql.push_str(" AND status = 'ACTIVE'");
        }
        sql.push_str(" ORDER BY booking_date ASC, created_at ASC");

        let mut stmt = conn.prepare(&sql)?;
        let bookings = stmt
            .query_map(rusqlite::params_from_iter(args.iter()), map_booking_row)?
            .collect::<SqliteResult<Vec<Booking>>>()?;

        Ok(bookings)
    }

    /// 原子条件插入 (核心正确性原语)
    ///
    /// 在 BEGIN IMMEDIATE 事务内复查 (座位,日期) 与 (用户,日期) 的
    /// ACTIVE 占用后插入; 两个部分唯一索引在跨连接竞争时兜底。
    /// 对同一 (座位,日期) 的并发调用恰好一个得到 Inserted。
    ///
    /// # 返回
    /// - Ok(Inserted): 新预订已持久化
    /// - Ok(SeatTaken) / Ok(UserAlreadyBooked): 占用冲突
    /// - Err(DatabaseBusy): 瞬时锁冲突, 调用方可有界重试
    pub fn insert_if_absent(
        &self,
        seat_id: &str,
        user_id: &str,
        date: NaiveDate,
    ) -> RepositoryResult<BookingInsertOutcome> {
        let conn = self.get_conn()?;
        let date_str = fmt_date(date);

        conn.execute("BEGIN IMMEDIATE", [])?;

        // 复查 (座位, 日期)
        let seat_taken = match exists_active(&conn, "seat_id", seat_id, &date_str) {
            Ok(v) => v,
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                return Err(e);
            }
        };
        if seat_taken {
            let _ = conn.execute("ROLLBACK", []);
            return Ok(BookingInsertOutcome::SeatTaken);
        }

        // 复查 (用户, 日期)
        let user_busy = match exists_active(&conn, "user_id", user_id, &date_str) {
            Ok(v) => v,
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                return Err(e);
            }
        };
        if user_busy {
            let _ = conn.execute("ROLLBACK", []);
            return Ok(BookingInsertOutcome::UserAlreadyBooked);
        }

        let booking = Booking::new(seat_id.to_string(), user_id.to_string(), date);

        let insert_result = conn.execute(
            r#"
            INSERT INTO booking (
                booking_id, seat_id, user_id, booking_date, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                booking.booking_id,
                booking.seat_id,
                booking.user_id,
                date_str,
                booking.status.to_db_str(),
                fmt_ts(booking.created_at),
                fmt_ts(booking.updated_at),
            ],
        );

        if let Err(e) = insert_result {
            let _ = conn.execute("ROLLBACK", []);
            // 唯一索引兜底: 跨连接竞争导致的约束违反映射回占用结果
            let repo_err = RepositoryError::from(e);
            return match &repo_err {
                RepositoryError::UniqueConstraintViolation(msg) if msg.contains("seat_id") => {
                    Ok(BookingInsertOutcome::SeatTaken)
                }
                RepositoryError::UniqueConstraintViolation(msg) if msg.contains("user_id") => {
                    Ok(BookingInsertOutcome::UserAlreadyBooked)
                }
                _ => Err(repo_err),
            };
        }

        conn.execute("COMMIT", [])
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(BookingInsertOutcome::Inserted(booking))
    }

    /// 条件状态流转: 仅当当前状态为 ACTIVE 时更新
    ///
    /// # 返回
    /// - Ok(true): 流转成功
    /// - Ok(false): 预订已不处于 ACTIVE (并发流转落败方)
    pub fn update_status_if_active(
        &self,
        booking_id: &str,
        new_status: BookingStatus,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            "UPDATE booking SET status = ?1, updated_at = ?2
             WHERE booking_id = ?3 AND status = 'ACTIVE'",
            params![
                new_status.to_db_str(),
                fmt_ts(chrono::Utc::now().naive_utc()),
                booking_id,
            ],
        )?;

        Ok(affected > 0)
    }
}

// ==========================================
// 行映射与格式化辅助
// ==========================================

fn map_booking_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Booking> {
    Ok(Booking {
        booking_id: row.get(0)?,
        seat_id: row.get(1)?,
        user_id: row.get(2)?,
        booking_date: parse_date(&row.get::<_, String>(3)?),
        status: BookingStatus::from_str(&row.get::<_, String>(4)?),
        created_at: parse_ts(&row.get::<_, String>(5)?),
        updated_at: parse_ts(&row.get::<_, String>(6)?),
    })
}

fn exists_active(
    conn: &Connection,
    column: &str,
    value: &str,
    date_str: &str,
) -> RepositoryResult<bool> {
    // column 仅取自本文件内的固定字面量 ("seat_id"/"user_id")
    let sql = format!(
        "SELECT 1 FROM booking WHERE {} = ?1 AND booking_date = ?2 AND status = 'ACTIVE' LIMIT 1",
        column
    );
    let found: Option<i64> = conn
        .query_row(&sql, params![value, date_str], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

fn fmt_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn fmt_ts(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
}

fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap())
}
