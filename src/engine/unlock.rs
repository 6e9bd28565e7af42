// ==========================================
// 工位轮换预订系统 - 浮动座位解锁策略
// ==========================================
// 职责: 判定浮动座位对目标日期是否已解锁
// 红线: 无状态、无副作用、无 I/O 操作
// 每次调用重新求值 (不缓存): 结果在固定时钟边界翻转
// ==========================================

use crate::engine::calendar::{CalendarPolicy, BOOKING_WINDOW_DAYS};
use chrono::{NaiveDate, NaiveDateTime, Timelike};

/// 次日浮动座位解锁时刻 (当日 15:00, 整点下取: 14:59:59 仍锁定)
pub const FLOATING_UNLOCK_HOUR: u32 = 15;

// ==========================================
// UnlockPolicy - 纯函数工具类
// ==========================================
pub struct UnlockPolicy;

impl UnlockPolicy {
    /// 判定浮动座位对目标日期是否解锁
    ///
    /// # 规则
    /// - diff == 0 (当天): 始终解锁
    /// - diff == 1 (次日): 当前时刻 >= 15:00 才解锁
    /// - 1 < diff <= 14: 始终解锁
    /// - 其他 (过去或窗口外): 锁定 (窗口校验另行拦截)
    pub fn is_floating_unlocked(target_date: NaiveDate, now: NaiveDateTime) -> bool {
        let today = now.date();
        let diff = CalendarPolicy::days_from_today(target_date, today);

        match diff {
            0 => true,
            1 => now.hour() >= FLOATING_UNLOCK_HOUR,
            d if d > 1 && d <= BOOKING_WINDOW_DAYS => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_same_day_always_unlocked() {
        assert!(UnlockPolicy::is_floating_unlocked(d(2024, 1, 3), dt(2024, 1, 3, 0, 0, 1)));
        assert!(UnlockPolicy::is_floating_unlocked(d(2024, 1, 3), dt(2024, 1, 3, 23, 59, 59)));
    }

    #[test]
    fn test_next_day_unlocks_at_15() {
        // 14:59:59 锁定, 15:00:00 解锁 (整点下取语义)
        assert!(!UnlockPolicy::is_floating_unlocked(d(2024, 1, 4), dt(2024, 1, 3, 14, 59, 59)));
        assert!(UnlockPolicy::is_floating_unlocked(d(2024, 1, 4), dt(2024, 1, 3, 15, 0, 0)));
        assert!(UnlockPolicy::is_floating_unlocked(d(2024, 1, 4), dt(2024, 1, 3, 18, 30, 0)));
    }

    #[test]
    fn test_beyond_next_day_within_window_unlocked() {
        let now = dt(2024, 1, 3, 9, 0, 0);
        assert!(UnlockPolicy::is_floating_unlocked(d(2024, 1, 5), now));
        // 第14天
        assert!(UnlockPolicy::is_floating_unlocked(d(2024, 1, 17), now));
    }

    #[test]
    fn test_out_of_window_locked() {
        let now = dt(2024, 1, 3, 9, 0, 0);
        // 第15天
        assert!(!UnlockPolicy::is_floating_unlocked(d(2024, 1, 18), now));
        // 过去
        assert!(!UnlockPolicy::is_floating_unlocked(d(2024, 1, 2), now));
    }
}
