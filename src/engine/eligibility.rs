// ==========================================
// 工位轮换预订系统 - 座位资格评估引擎
// ==========================================
// 职责: 组合日历/轮换/解锁三项策略与当日占用, 产出逐座位可订裁决
// 输入: 用户身份 + 批次, 目标日期, 座位列表, 当日 ACTIVE 预订
// 输出: SeatVerdict (available + reason)
// 红线: 纯读路径, 不写库; 读写两侧共用本引擎, 策略不得在调用方复制
// ==========================================
// 收口说明: "轮换日浮动座位锁定"规则在此统一执行 —
// 批次当日排班时, 该用户仅在已持有浮动预订的情况下才可见浮动座位
// ==========================================

use crate::config::cycle_config_trait::CycleConfigReader;
use crate::domain::booking::Booking;
use crate::domain::seat::Seat;
use crate::domain::types::{Batch, SeatKind};
use crate::engine::calendar::CalendarPolicy;
use crate::engine::rotation::RotationResolver;
use crate::engine::unlock::UnlockPolicy;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// 裁决原因文案 (仅用于展示, 无行为语义)
// ==========================================
pub const REASON_WEEKEND: &str = "No seats on weekends";
pub const REASON_NOT_BATCH_DAY: &str = "Not your batch day for designated seats";
pub const REASON_ALREADY_BOOKED: &str = "Already booked";
pub const REASON_FLOATING_LOCKED: &str = "Floating seats unlock at 3:00 PM for next day";
pub const REASON_BATCH_DAY_FLOATING_LOCK: &str =
    "Your batch has designated seats on this day";

// ==========================================
// SeatVerdict - 逐座位裁决
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatVerdict {
    pub seat_id: String,
    pub seat_number: String,
    pub kind: SeatKind,
    pub is_booked: bool,                // 当日是否已有 ACTIVE 预订
    pub is_my_booking: bool,            // 该预订是否属于调用者
    pub my_booking_id: Option<String>,  // 调用者持有的预订ID
    pub available: bool,
    pub reason: Option<String>,         // 不可订原因 (available=true 时为 None)
}

impl SeatVerdict {
    fn unavailable(seat: &Seat, existing: Option<&Booking>, mine: Option<&Booking>, reason: &str) -> Self {
        Self {
            seat_id: seat.seat_id.clone(),
            seat_number: seat.seat_number.clone(),
            kind: seat.kind,
            is_booked: existing.is_some(),
            is_my_booking: mine.is_some(),
            my_booking_id: mine.map(|b| b.booking_id.clone()),
            available: false,
            reason: Some(reason.to_string()),
        }
    }

    fn available(seat: &Seat, existing: Option<&Booking>, mine: Option<&Booking>) -> Self {
        Self {
            seat_id: seat.seat_id.clone(),
            seat_number: seat.seat_number.clone(),
            kind: seat.kind,
            is_booked: existing.is_some(),
            is_my_booking: mine.is_some(),
            my_booking_id: mine.map(|b| b.booking_id.clone()),
            available: true,
            reason: None,
        }
    }
}

// ==========================================
// EligibilityEngine - 资格评估引擎
// ==========================================
pub struct EligibilityEngine<C>
where
    C: CycleConfigReader,
{
    config: Arc<C>,
}

impl<C> EligibilityEngine<C>
where
    C: CycleConfigReader,
{
    /// 创建新的 EligibilityEngine 实例
    ///
    /// # 参数
    /// - config: 周期配置读取器
    pub fn new(config: Arc<C>) -> Self {
        Self { config }
    }

    /// 单座位纯裁决核心 (无 I/O, 供单元测试与写路径复用)
    ///
    /// # 参数
    /// - cycle_start: 轮换周期锚点 (None = 全部按第1周)
    /// - active_bookings: 目标日期的 ACTIVE 预订集合
    pub fn verdict_for_seat(
        seat: &Seat,
        user_id: &str,
        batch: Batch,
        date: NaiveDate,
        now: NaiveDateTime,
        cycle_start: Option<NaiveDate>,
        active_bookings: &[Booking],
    ) -> SeatVerdict {
        let existing = active_bookings.iter().find(|b| b.seat_id == seat.seat_id);
        let mine = existing.filter(|b| b.user_id == user_id);

        // 周末短路: 调用方不应对周末求值, 此处兜底为全部不可订
        if CalendarPolicy::is_weekend(date) {
            return SeatVerdict::unavailable(seat, existing, mine, REASON_WEEKEND);
        }

        let batch_scheduled = RotationResolver::is_batch_scheduled(batch, date, cycle_start);

        match seat.kind {
            SeatKind::Designated => {
                if !batch_scheduled {
                    SeatVerdict::unavailable(seat, existing, mine, REASON_NOT_BATCH_DAY)
                } else if existing.is_some() && mine.is_none() {
                    SeatVerdict::unavailable(seat, existing, mine, REASON_ALREADY_BOOKED)
                } else {
                    SeatVerdict::available(seat, existing, mine)
                }
            }
            SeatKind::Floating => {
                if !UnlockPolicy::is_floating_unlocked(date, now) {
                    SeatVerdict::unavailable(seat, existing, mine, REASON_FLOATING_LOCKED)
                } else if batch_scheduled && mine.is_none() {
                    // 轮换日浮动座位锁定 (服务端收口, 不再依赖展示层)
                    SeatVerdict::unavailable(seat, existing, mine, REASON_BATCH_DAY_FLOATING_LOCK)
                } else if existing.is_some() && mine.is_none() {
                    SeatVerdict::unavailable(seat, existing, mine, REASON_ALREADY_BOOKED)
                } else {
                    SeatVerdict::available(seat, existing, mine)
                }
            }
        }
    }

    /// 评估全部座位
    ///
    /// # 参数
    /// - user_id / batch: 调用者身份
    /// - date: 目标日期
    /// - now: 当前时刻 (解锁策略按调用时求值)
    /// - seats: 座位列表
    /// - active_bookings: 目标日期的 ACTIVE 预订
    ///
    /// # 返回
    /// - Vec<SeatVerdict>: 与 seats 等长的裁决列表
    #[instrument(skip(self, seats, active_bookings), fields(user_id = %user_id, date = %date))]
    pub async fn evaluate_seats(
        &self,
        user_id: &str,
        batch: Batch,
        date: NaiveDate,
        now: NaiveDateTime,
        seats: &[Seat],
        active_bookings: &[Booking],
    ) -> Result<Vec<SeatVerdict>, Box<dyn Error>> {
        let cycle_start = self.config.get_cycle_start_date().await?;

        Ok(seats
            .iter()
            .map(|seat| {
                Self::verdict_for_seat(
                    seat,
                    user_id,
                    batch,
                    date,
                    now,
                    cycle_start,
                    active_bookings,
                )
            })
            .collect())
    }

    /// 评估单个座位
    ///
    /// 写路径 (创建预订) 传入空占用列表做"不含占用"的策略预检,
    /// 占用冲突交由原子插入原语裁决
    pub async fn evaluate_single(
        &self,
        seat: &Seat,
        user_id: &str,
        batch: Batch,
        date: NaiveDate,
        now: NaiveDateTime,
        active_bookings: &[Booking],
    ) -> Result<SeatVerdict, Box<dyn Error>> {
        let cycle_start = self.config.get_cycle_start_date().await?;

        Ok(Self::verdict_for_seat(
            seat,
            user_id,
            batch,
            date,
            now,
            cycle_start,
            active_bookings,
        ))
    }
}
