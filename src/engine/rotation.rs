// ==========================================
// 工位轮换预订系统 - 轮换解析器
// ==========================================
// 职责: 计算日期所在的双周周期周数, 以及当日排班批次
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================
// 轮换表 (固定, 仅周期锚点可配置):
//   | 周数 | 周一~周三 | 周四~周五 |
//   |------|-----------|-----------|
//   | 1    | A         | B         |
//   | 2    | B         | A         |
// ==========================================

use crate::domain::types::{Batch, CycleWeek, WeekdayBand};
use crate::engine::calendar::CalendarPolicy;
use chrono::NaiveDate;

/// 轮换周期长度 (天)
pub const CYCLE_LENGTH_DAYS: i64 = 14;

// ==========================================
// RotationResolver - 纯函数工具类
// ==========================================
pub struct RotationResolver;

impl RotationResolver {
    /// 计算日期所在的周期周数
    ///
    /// # 规则
    /// 1. 锚点未配置 → 第1周 (策略默认值, 非错误)
    /// 2. 日期早于锚点 → 第1周
    /// 3. 否则 position = 距锚点天数 mod 14; position < 7 → 第1周, 否则第2周
    pub fn week_number(cycle_start: Option<NaiveDate>, date: NaiveDate) -> CycleWeek {
        let anchor = match cycle_start {
            Some(d) => d,
            None => return CycleWeek::Week1,
        };

        let diff = CalendarPolicy::days_from_today(date, anchor);
        if diff < 0 {
            return CycleWeek::Week1;
        }

        if diff % CYCLE_LENGTH_DAYS < 7 {
            CycleWeek::Week1
        } else {
            CycleWeek::Week2
        }
    }

    /// 查询轮换表: 给定周数与工作日分段, 返回排班批次
    pub fn scheduled_batch(week: CycleWeek, band: WeekdayBand) -> Option<Batch> {
        match (week, band) {
            (CycleWeek::Week1, WeekdayBand::MonToWed) => Some(Batch::A),
            (CycleWeek::Week1, WeekdayBand::ThuToFri) => Some(Batch::B),
            (CycleWeek::Week2, WeekdayBand::MonToWed) => Some(Batch::B),
            (CycleWeek::Week2, WeekdayBand::ThuToFri) => Some(Batch::A),
            (_, WeekdayBand::Weekend) => None,
        }
    }

    /// 判定批次在给定日期是否排班 (即该批次当日是否可订轮换指定座位)
    ///
    /// # 规则
    /// - batch = NONE 或周末 → false
    /// - 否则按轮换表比对
    pub fn is_batch_scheduled(
        batch: Batch,
        date: NaiveDate,
        cycle_start: Option<NaiveDate>,
    ) -> bool {
        if matches!(batch, Batch::None) || CalendarPolicy::is_weekend(date) {
            return false;
        }

        let week = Self::week_number(cycle_start, date);
        let band = WeekdayBand::of(date);

        Self::scheduled_batch(week, band) == Some(batch)
    }
}
