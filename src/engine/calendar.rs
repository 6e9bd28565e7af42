// ==========================================
// 工位轮换预订系统 - 日历策略
// ==========================================
// 职责: 周末判定与14天可订窗口计算
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================

use chrono::{Datelike, NaiveDate, Weekday};

/// 可订窗口天数 (今天起含当天至 +14 天)
pub const BOOKING_WINDOW_DAYS: i64 = 14;

// ==========================================
// CalendarPolicy - 纯函数工具类
// ==========================================
pub struct CalendarPolicy;

impl CalendarPolicy {
    /// 是否周末 (周六/周日, 天粒度, 忽略时刻)
    pub fn is_weekend(date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// 距今日的带符号天数 (负数 = 过去)
    pub fn days_from_today(date: NaiveDate, today: NaiveDate) -> i64 {
        date.signed_duration_since(today).num_days()
    }

    /// 是否落在可订窗口内 (0 <= 距今天数 <= 14)
    pub fn is_within_booking_window(date: NaiveDate, today: NaiveDate) -> bool {
        let diff = Self::days_from_today(date, today);
        (0..=BOOKING_WINDOW_DAYS).contains(&diff)
    }

    /// 最大可订日期 (今天 + 14 天)
    pub fn max_booking_date(today: NaiveDate) -> NaiveDate {
        today + chrono::Duration::days(BOOKING_WINDOW_DAYS)
    }
}
