// ==========================================
// 工位轮换预订系统 - 座位可用性查询 API
// ==========================================
// 职责: 只读路径 —— 为日历/座位图渲染产出逐座位裁决与元信息
// 约束: 读路径不与写路径串行化; 过期读导致的预订尝试
// 由事务层以占用冲突错误拒绝, 不产生状态损坏
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::auth::AuthenticatedUser;
use crate::config::cycle_config_trait::CycleConfigReader;
use crate::domain::types::Batch;
use crate::engine::calendar::CalendarPolicy;
use crate::engine::eligibility::{EligibilityEngine, SeatVerdict};
use crate::engine::rotation::RotationResolver;
use crate::engine::unlock::UnlockPolicy;
use crate::repository::booking_repo::BookingRepository;
use crate::repository::seat_repo::SeatRepository;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// DTO 类型定义
// ==========================================

/// 可用性元信息 (供界面展示当日排班上下文)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityMeta {
    pub date: NaiveDate,
    pub week_number: u8,          // 周期周数 (1/2)
    pub batch_scheduled: bool,    // 调用者批次当日是否排班
    pub floating_unlocked: bool,  // 浮动座位当前是否解锁
    pub user_batch: Batch,
}

/// 座位可用性查询结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatAvailability {
    pub seats: Vec<SeatVerdict>,
    pub meta: AvailabilityMeta,
}

// ==========================================
// SeatApi - 座位可用性查询 API
// ==========================================
pub struct SeatApi<C>
where
    C: CycleConfigReader,
{
    seat_repo: Arc<SeatRepository>,
    booking_repo: Arc<BookingRepository>,
    eligibility_engine: Arc<EligibilityEngine<C>>,
    config: Arc<C>,
}

impl<C> SeatApi<C>
where
    C: CycleConfigReader,
{
    /// 创建新的 SeatApi 实例
    pub fn new(
        seat_repo: Arc<SeatRepository>,
        booking_repo: Arc<BookingRepository>,
        eligibility_engine: Arc<EligibilityEngine<C>>,
        config: Arc<C>,
    ) -> Self {
        Self {
            seat_repo,
            booking_repo,
            eligibility_engine,
            config,
        }
    }

    /// 查询调用者在目标日期的全部座位可用性
    ///
    /// # 参数
    /// - user: 已认证的调用者 (含批次)
    /// - date: 目标日期
    /// - now: 当前时刻 (解锁策略按调用时求值, 不缓存)
    ///
    /// # 返回
    /// - 周末: 空座位列表 + 元信息 (短路)
    /// - 工作日: 逐座位裁决列表 + 元信息
    #[instrument(skip(self, user), fields(user_id = %user.user_id, date = %date))]
    pub async fn get_seat_availability(
        &self,
        user: &AuthenticatedUser,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> ApiResult<SeatAvailability> {
        let cycle_start = self
            .config
            .get_cycle_start_date()
            .await
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        let meta = AvailabilityMeta {
            date,
            week_number: RotationResolver::week_number(cycle_start, date).as_number(),
            batch_scheduled: RotationResolver::is_batch_scheduled(user.batch, date, cycle_start),
            floating_unlocked: UnlockPolicy::is_floating_unlocked(date, now),
            user_batch: user.batch,
        };

        // 周末短路: 无座位可评估
        if CalendarPolicy::is_weekend(date) {
            return Ok(SeatAvailability {
                seats: Vec::new(),
                meta,
            });
        }

        let seats = self.seat_repo.find_all()?;
        let active_bookings = self.booking_repo.find_active_by_date(date)?;

        let verdicts = self
            .eligibility_engine
            .evaluate_seats(&user.user_id, user.batch, date, now, &seats, &active_bookings)
            .await
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        Ok(SeatAvailability {
            seats: verdicts,
            meta,
        })
    }
}
