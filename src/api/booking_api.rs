// ==========================================
// 工位轮换预订系统 - 预订事务 API
// ==========================================
// 职责: 预订创建/取消/释放的事务编排
// 核心正确性: "复查+插入"对同一 (座位,日期) 或 (用户,日期) 的
// 并发请求不可分割 —— 恰好一个成功, 其余得到占用冲突错误
// 状态机: ACTIVE -> CANCELLED (本人或管理员)
//         ACTIVE -> RELEASED  (本人或管理员, 仅轮换指定座位)
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::cycle_config_trait::CycleConfigReader;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::booking::{Actor, Booking, BookingRequest};
use crate::domain::types::BookingStatus;
use crate::engine::calendar::CalendarPolicy;
use crate::engine::eligibility::EligibilityEngine;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::booking_repo::{BookingInsertOutcome, BookingRepository};
use crate::repository::seat_repo::SeatRepository;
use crate::auth::AuthenticatedUser;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 瞬时忙冲突的最大重试次数 (唯一约束冲突不重试, 立即返回)
pub const MAX_BUSY_RETRIES: u32 = 3;

// ==========================================
// BookingApi - 预订事务 API
// ==========================================
pub struct BookingApi<C>
where
    C: CycleConfigReader,
{
    seat_repo: Arc<SeatRepository>,
    booking_repo: Arc<BookingRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    eligibility_engine: Arc<EligibilityEngine<C>>,
}

impl<C> BookingApi<C>
where
    C: CycleConfigReader,
{
    /// 创建新的 BookingApi 实例
    pub fn new(
        seat_repo: Arc<SeatRepository>,
        booking_repo: Arc<BookingRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        eligibility_engine: Arc<EligibilityEngine<C>>,
    ) -> Self {
        Self {
            seat_repo,
            booking_repo,
            action_log_repo,
            eligibility_engine,
        }
    }

    /// 创建预订
    ///
    /// # 参数
    /// - user: 已认证的调用者 (含批次)
    /// - seat_id: 目标座位
    /// - date: 目标日期 (天粒度)
    /// - now: 当前时刻 (窗口与解锁策略按此求值)
    ///
    /// # 返回
    /// - Ok(Booking): 已持久化的 ACTIVE 预订
    /// - Err(OutOfWindow / WeekendNotBookable / SeatNotFound / NotEligible /
    ///   AlreadyBooked / DuplicateUserBooking / StorageError)
    #[instrument(skip(self, user), fields(user_id = %user.user_id, seat_id = %seat_id, date = %date))]
    pub async fn create_booking(
        &self,
        user: &AuthenticatedUser,
        seat_id: &str,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> ApiResult<Booking> {
        let today = now.date();
        let request = BookingRequest {
            user_id: user.user_id.clone(),
            batch: user.batch,
            seat_id: seat_id.to_string(),
            date,
        };

        // === 步骤 1: 窗口校验 (过去或超过14天均拒绝) ===
        if !CalendarPolicy::is_within_booking_window(date, today) {
            return Err(ApiError::OutOfWindow {
                days: CalendarPolicy::days_from_today(date, today),
            });
        }

        // === 步骤 2: 周末校验 ===
        if CalendarPolicy::is_weekend(date) {
            return Err(ApiError::WeekendNotBookable);
        }

        // === 步骤 3: 座位解析 ===
        let seat = self
            .seat_repo
            .find_by_id(seat_id)?
            .ok_or_else(|| ApiError::SeatNotFound {
                seat_id: seat_id.to_string(),
            })?;

        // === 步骤 4: 资格预检 (不含占用; 占用冲突由步骤5裁决) ===
        let verdict = self
            .eligibility_engine
            .evaluate_single(&seat, &user.user_id, user.batch, date, now, &[])
            .await
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        if !verdict.available {
            return Err(ApiError::NotEligible {
                reason: verdict
                    .reason
                    .unwrap_or_else(|| "not eligible".to_string()),
            });
        }

        // === 步骤 5: 原子条件插入 (瞬时忙冲突有界重试) ===
        let mut attempt: u32 = 0;
        let booking = loop {
            match self.booking_repo.insert_if_absent(seat_id, &user.user_id, date) {
                Ok(BookingInsertOutcome::Inserted(booking)) => break booking,
                Ok(BookingInsertOutcome::SeatTaken) => return Err(ApiError::AlreadyBooked),
                Ok(BookingInsertOutcome::UserAlreadyBooked) => {
                    return Err(ApiError::DuplicateUserBooking)
                }
                Err(e) if e.is_busy() && attempt < MAX_BUSY_RETRIES => {
                    attempt += 1;
                    warn!(attempt, "预订事务遇到数据库忙, 重试");
                    tokio::time::sleep(std::time::Duration::from_millis(10 * attempt as u64))
                        .await;
                }
                Err(e) => return Err(e.into()),
            }
        };

        // === 步骤 6: 审计记录 ===
        self.record_action(
            ActionType::CreateBooking,
            &user.user_id,
            &booking,
            serde_json::to_value(&request).unwrap_or(serde_json::Value::Null),
            format!("预订座位 {}", seat.seat_number),
        );

        info!(booking_id = %booking.booking_id, seat_number = %seat.seat_number, "预订成功");
        Ok(booking)
    }

    /// 取消预订 (本人或管理员, 仅 ACTIVE)
    ///
    /// # 返回
    /// - Ok(Booking): 已流转为 CANCELLED 的预订
    /// - Err(NotFound / Forbidden / NotActive / StorageError)
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id, booking_id = %booking_id))]
    pub fn cancel_booking(&self, booking_id: &str, actor: &Actor) -> ApiResult<Booking> {
        self.transition_booking(booking_id, actor, BookingStatus::Cancelled)
    }

    /// 释放预订 (本人或管理员, 仅轮换指定座位, 仅 ACTIVE)
    ///
    /// 释放后座位当日可被他人一次性重新预订;
    /// RELEASED 状态保留用于审计/报表, 与 CANCELLED 区分
    ///
    /// # 返回
    /// - Ok(Booking): 已流转为 RELEASED 的预订
    /// - Err(NotFound / Forbidden / NotActive / NotReleasable / StorageError)
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id, booking_id = %booking_id))]
    pub fn release_booking(&self, booking_id: &str, actor: &Actor) -> ApiResult<Booking> {
        self.transition_booking(booking_id, actor, BookingStatus::Released)
    }

    /// 查询预订列表
    ///
    /// # 参数
    /// - actor: 调用者; 员工仅见本人预订, 管理员可见全部
    /// - upcoming_only: 仅未来预订 (date >= today 且 ACTIVE)
    /// - today: 当前日期
    pub fn list_bookings(
        &self,
        actor: &Actor,
        upcoming_only: bool,
        today: NaiveDate,
    ) -> ApiResult<Vec<Booking>> {
        let user_filter = if actor.is_admin() {
            None
        } else {
            Some(actor.user_id.as_str())
        };
        let upcoming_from = if upcoming_only { Some(today) } else { None };

        Ok(self.booking_repo.find_bookings(user_filter, upcoming_from)?)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    /// 状态流转公共路径 (取消/释放)
    fn transition_booking(
        &self,
        booking_id: &str,
        actor: &Actor,
        target: BookingStatus,
    ) -> ApiResult<Booking> {
        let booking = self
            .booking_repo
            .find_by_id(booking_id)?
            .ok_or_else(|| ApiError::NotFound {
                booking_id: booking_id.to_string(),
            })?;

        // 权限: 本人或管理员
        if !actor.can_operate(&booking) {
            return Err(ApiError::Forbidden);
        }

        // 仅轮换指定座位可释放
        if target == BookingStatus::Released {
            let seat = self
                .seat_repo
                .find_by_id(&booking.seat_id)?
                .ok_or_else(|| {
                    ApiError::InternalError(format!("预订引用的座位缺失: {}", booking.seat_id))
                })?;
            if !seat.is_designated() {
                return Err(ApiError::NotReleasable);
            }
        }

        // 终态预订不可再流转
        if !booking.is_active() {
            return Err(ApiError::NotActive {
                status: booking.status.to_string(),
            });
        }

        // 条件更新: 并发流转的落败方在此收到 NotActive
        let transitioned = self
            .booking_repo
            .update_status_if_active(booking_id, target)?;
        if !transitioned {
            let current = self
                .booking_repo
                .find_by_id(booking_id)?
                .map(|b| b.status.to_string())
                .unwrap_or_else(|| "UNKNOWN".to_string());
            return Err(ApiError::NotActive { status: current });
        }

        let updated = self
            .booking_repo
            .find_by_id(booking_id)?
            .ok_or_else(|| ApiError::InternalError("状态流转后预订消失".to_string()))?;

        let action_type = match target {
            BookingStatus::Cancelled => ActionType::CancelBooking,
            _ => ActionType::ReleaseBooking,
        };
        self.record_action(
            action_type,
            &actor.user_id,
            &updated,
            serde_json::json!({
                "seat_id": updated.seat_id,
                "user_id": updated.user_id,
                "date": updated.booking_date.format("%Y-%m-%d").to_string(),
                "status": updated.status.to_db_str(),
            }),
            format!("预订状态流转为 {}", target),
        );

        info!(booking_id = %booking_id, status = %target, "预订状态已流转");
        Ok(updated)
    }

    /// 写入审计日志; 审计失败不回滚业务写入, 仅告警
    fn record_action(
        &self,
        action_type: ActionType,
        actor_id: &str,
        booking: &Booking,
        payload: serde_json::Value,
        detail: String,
    ) {
        let log = ActionLog::new(action_type, actor_id)
            .with_booking(&booking.booking_id, booking.booking_date)
            .with_payload(&payload)
            .with_detail(detail);

        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(error = %e, booking_id = %booking.booking_id, "审计日志写入失败");
        }
    }
}
