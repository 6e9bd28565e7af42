// ==========================================
// 预订事务 API 集成测试
// ==========================================
// 职责: 验证预订创建的校验链与取消/释放状态机
// ==========================================


#[cfg(test)]
mod booking_api_test {
    use chrono::{NaiveDate, NaiveDateTime};
    use seat_booking::api::ApiError;
    use seat_booking::domain::types::{Batch, BookingStatus};
    use seat_booking::engine::eligibility::{
        REASON_BATCH_DAY_FLOATING_LOCK, REASON_FLOATING_LOCKED, REASON_NOT_BATCH_DAY,
    };

    use crate::test_helpers::{
        admin, employee, seat_id, seed_seats, set_cycle_start, setup_test_env,
    };

    // ==========================================
    // 测试辅助函数
    // ==========================================

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dt(y: i32, m: u32, day: u32, h: u32) -> NaiveDateTime {
        d(y, m, day).and_hms_opt(h, 0, 0).unwrap()
    }

    // 锚点: 2024-01-01 (周一); 第1周周一~周三 → A 批次排班
    fn anchor() -> NaiveDate {
        d(2024, 1, 1)
    }

    // ==========================================
    // 创建预订: 校验链
    // ==========================================

    #[tokio::test]
    async fn test_create_booking_success() {
        let env = setup_test_env();
        seed_seats(&env);
        set_cycle_start(&env, anchor());

        let alice = employee("alice", Batch::A);
        let booking = env
            .booking_api
            .create_booking(&alice, &seat_id(&env, "D01"), d(2024, 1, 2), dt(2024, 1, 1, 9))
            .await
            .unwrap();

        assert_eq!(booking.user_id, "alice");
        assert_eq!(booking.booking_date, d(2024, 1, 2));
        assert_eq!(booking.status, BookingStatus::Active);

        // 审计链包含创建记录
        let logs = env
            .action_log_repo
            .find_by_booking(&booking.booking_id)
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action_type, "CreateBooking");
    }

    #[tokio::test]
    async fn test_create_booking_window_boundaries() {
        let env = setup_test_env();
        seed_seats(&env);
        set_cycle_start(&env, anchor());

        let alice = employee("alice", Batch::A);
        let now = dt(2024, 1, 1, 9);

        // 恰好第14天 (2024-01-15 周一, 新周期第1周 → A 排班) → 成功
        let ok = env
            .booking_api
            .create_booking(&alice, &seat_id(&env, "D01"), d(2024, 1, 15), now)
            .await;
        assert!(ok.is_ok(), "第14天应可预订: {:?}", ok.err());

        // 第15天 → OutOfWindow
        let err = env
            .booking_api
            .create_booking(&alice, &seat_id(&env, "D02"), d(2024, 1, 16), now)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::OutOfWindow { days: 15 }));

        // 昨天 → OutOfWindow
        let err = env
            .booking_api
            .create_booking(&alice, &seat_id(&env, "D02"), d(2023, 12, 31), now)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::OutOfWindow { days: -1 }));
    }

    #[tokio::test]
    async fn test_create_booking_rejects_weekend() {
        let env = setup_test_env();
        seed_seats(&env);
        set_cycle_start(&env, anchor());

        let alice = employee("alice", Batch::A);
        // 2024-01-06 周六 (窗口内)
        let err = env
            .booking_api
            .create_booking(&alice, &seat_id(&env, "D01"), d(2024, 1, 6), dt(2024, 1, 1, 9))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::WeekendNotBookable));
    }

    #[tokio::test]
    async fn test_create_booking_seat_not_found() {
        let env = setup_test_env();
        seed_seats(&env);
        set_cycle_start(&env, anchor());

        let alice = employee("alice", Batch::A);
        let err = env
            .booking_api
            .create_booking(&alice, "no-such-seat", d(2024, 1, 2), dt(2024, 1, 1, 9))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::SeatNotFound { .. }));
    }

    #[tokio::test]
    async fn test_create_booking_wrong_batch_not_eligible() {
        let env = setup_test_env();
        seed_seats(&env);
        set_cycle_start(&env, anchor());

        // 2024-01-02 第1周周二 → A 排班, B 不可订指定座位
        let bob = employee("bob", Batch::B);
        let err = env
            .booking_api
            .create_booking(&bob, &seat_id(&env, "D01"), d(2024, 1, 2), dt(2024, 1, 1, 9))
            .await
            .unwrap_err();
        match err {
            ApiError::NotEligible { reason } => assert_eq!(reason, REASON_NOT_BATCH_DAY),
            other => panic!("Expected NotEligible, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_floating_locked_before_cutoff() {
        let env = setup_test_env();
        seed_seats(&env);
        set_cycle_start(&env, anchor());

        // B 批次次日浮动预订, 当前 14 点 → 未解锁
        let bob = employee("bob", Batch::B);
        let err = env
            .booking_api
            .create_booking(&bob, &seat_id(&env, "F01"), d(2024, 1, 2), dt(2024, 1, 1, 14))
            .await
            .unwrap_err();
        match err {
            ApiError::NotEligible { reason } => assert_eq!(reason, REASON_FLOATING_LOCKED),
            other => panic!("Expected NotEligible, got {:?}", other),
        }

        // 15 点后解锁 → 成功
        let ok = env
            .booking_api
            .create_booking(&bob, &seat_id(&env, "F01"), d(2024, 1, 2), dt(2024, 1, 1, 15))
            .await;
        assert!(ok.is_ok(), "15点后次日浮动座位应可预订: {:?}", ok.err());
    }

    #[tokio::test]
    async fn test_create_floating_locked_on_batch_day() {
        let env = setup_test_env();
        seed_seats(&env);
        set_cycle_start(&env, anchor());

        // A 批次在排班日 (1/2) 当天不可订浮动座位 (服务端收口规则)
        let alice = employee("alice", Batch::A);
        let err = env
            .booking_api
            .create_booking(&alice, &seat_id(&env, "F01"), d(2024, 1, 2), dt(2024, 1, 2, 9))
            .await
            .unwrap_err();
        match err {
            ApiError::NotEligible { reason } => {
                assert_eq!(reason, REASON_BATCH_DAY_FLOATING_LOCK)
            }
            other => panic!("Expected NotEligible, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_booking_occupancy_conflicts() {
        let env = setup_test_env();
        seed_seats(&env);
        set_cycle_start(&env, anchor());

        let alice = employee("alice", Batch::A);
        let carol = employee("carol", Batch::A);
        let now = dt(2024, 1, 1, 9);

        env.booking_api
            .create_booking(&alice, &seat_id(&env, "D01"), d(2024, 1, 2), now)
            .await
            .unwrap();

        // 同座位同日他人 → AlreadyBooked
        let err = env
            .booking_api
            .create_booking(&carol, &seat_id(&env, "D01"), d(2024, 1, 2), now)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::AlreadyBooked));

        // 同用户同日另一座位 → DuplicateUserBooking
        let err = env
            .booking_api
            .create_booking(&alice, &seat_id(&env, "D02"), d(2024, 1, 2), now)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateUserBooking));

        // 另一天不受影响
        let ok = env
            .booking_api
            .create_booking(&alice, &seat_id(&env, "D02"), d(2024, 1, 3), now)
            .await;
        assert!(ok.is_ok());
    }

    // ==========================================
    // 取消: 权限与状态机
    // ==========================================

    #[tokio::test]
    async fn test_cancel_booking_permissions() {
        let env = setup_test_env();
        seed_seats(&env);
        set_cycle_start(&env, anchor());

        let alice = employee("alice", Batch::A);
        let booking = env
            .booking_api
            .create_booking(&alice, &seat_id(&env, "D01"), d(2024, 1, 2), dt(2024, 1, 1, 9))
            .await
            .unwrap();

        // 他人取消 → Forbidden
        let bob = employee("bob", Batch::B);
        let err = env
            .booking_api
            .cancel_booking(&booking.booking_id, &bob.actor())
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));

        // 管理员取消 → 成功
        let cancelled = env
            .booking_api
            .cancel_booking(&booking.booking_id, &admin("root").actor())
            .unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        // 再次取消 → NotActive
        let err = env
            .booking_api
            .cancel_booking(&booking.booking_id, &alice.actor())
            .unwrap_err();
        assert!(matches!(err, ApiError::NotActive { .. }));
    }

    #[tokio::test]
    async fn test_cancel_missing_booking() {
        let env = setup_test_env();
        let alice = employee("alice", Batch::A);

        let err = env
            .booking_api
            .cancel_booking("no-such-booking", &alice.actor())
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_seat_is_rebookable() {
        let env = setup_test_env();
        seed_seats(&env);
        set_cycle_start(&env, anchor());

        let alice = employee("alice", Batch::A);
        let carol = employee("carol", Batch::A);
        let now = dt(2024, 1, 1, 9);

        let booking = env
            .booking_api
            .create_booking(&alice, &seat_id(&env, "D01"), d(2024, 1, 2), now)
            .await
            .unwrap();
        env.booking_api
            .cancel_booking(&booking.booking_id, &alice.actor())
            .unwrap();

        // 取消后座位当日重新可订
        let ok = env
            .booking_api
            .create_booking(&carol, &seat_id(&env, "D01"), d(2024, 1, 2), now)
            .await;
        assert!(ok.is_ok());
    }

    // ==========================================
    // 释放: 仅指定座位, 终态保持
    // ==========================================

    #[tokio::test]
    async fn test_release_designated_booking() {
        let env = setup_test_env();
        seed_seats(&env);
        set_cycle_start(&env, anchor());

        let alice = employee("alice", Batch::A);
        let booking = env
            .booking_api
            .create_booking(&alice, &seat_id(&env, "D01"), d(2024, 1, 2), dt(2024, 1, 1, 9))
            .await
            .unwrap();

        let released = env
            .booking_api
            .release_booking(&booking.booking_id, &alice.actor())
            .unwrap();
        assert_eq!(released.status, BookingStatus::Released);

        // RELEASED 为终态: 取消与再次释放均失败 NotActive
        let err = env
            .booking_api
            .cancel_booking(&booking.booking_id, &alice.actor())
            .unwrap_err();
        assert!(matches!(err, ApiError::NotActive { .. }));
        let err = env
            .booking_api
            .release_booking(&booking.booking_id, &alice.actor())
            .unwrap_err();
        assert!(matches!(err, ApiError::NotActive { .. }));

        // 审计保留 RELEASED 记录 (与 CANCELLED 区分)
        let found = env
            .booking_repo
            .find_by_id(&booking.booking_id)
            .unwrap()
            .unwrap();
        assert_eq!(found.status, BookingStatus::Released);
    }

    #[tokio::test]
    async fn test_release_floating_booking_rejected() {
        let env = setup_test_env();
        seed_seats(&env);
        set_cycle_start(&env, anchor());

        // B 批次当天浮动预订 (1/4 第1周周四 → B 排班日之外选同日: 用 1/2, B 不排班, 当天解锁)
        let bob = employee("bob", Batch::B);
        let booking = env
            .booking_api
            .create_booking(&bob, &seat_id(&env, "F01"), d(2024, 1, 2), dt(2024, 1, 2, 9))
            .await
            .unwrap();

        let err = env
            .booking_api
            .release_booking(&booking.booking_id, &bob.actor())
            .unwrap_err();
        assert!(matches!(err, ApiError::NotReleasable));

        // 预订保持 ACTIVE
        let found = env
            .booking_repo
            .find_by_id(&booking.booking_id)
            .unwrap()
            .unwrap();
        assert!(found.is_active());
    }

    #[tokio::test]
    async fn test_released_seat_is_rebookable_once() {
        let env = setup_test_env();
        seed_seats(&env);
        set_cycle_start(&env, anchor());

        let alice = employee("alice", Batch::A);
        let carol = employee("carol", Batch::A);
        let now = dt(2024, 1, 1, 9);

        let booking = env
            .booking_api
            .create_booking(&alice, &seat_id(&env, "D01"), d(2024, 1, 2), now)
            .await
            .unwrap();
        env.booking_api
            .release_booking(&booking.booking_id, &alice.actor())
            .unwrap();

        // 释放后座位当日可被他人重新预订
        let rebooked = env
            .booking_api
            .create_booking(&carol, &seat_id(&env, "D01"), d(2024, 1, 2), now)
            .await
            .unwrap();
        assert_eq!(rebooked.user_id, "carol");

        // 指定座位的常规批次规则不因释放而放宽
        let bob = employee("bob", Batch::B);
        let err = env
            .booking_api
            .create_booking(&bob, &seat_id(&env, "D02"), d(2024, 1, 2), now)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotEligible { .. }));
    }

    // ==========================================
    // 预订列表
    // ==========================================

    #[tokio::test]
    async fn test_list_bookings_scoping() {
        let env = setup_test_env();
        seed_seats(&env);
        set_cycle_start(&env, anchor());

        let alice = employee("alice", Batch::A);
        let carol = employee("carol", Batch::A);
        let now = dt(2024, 1, 1, 9);

        env.booking_api
            .create_booking(&alice, &seat_id(&env, "D01"), d(2024, 1, 2), now)
            .await
            .unwrap();
        env.booking_api
            .create_booking(&carol, &seat_id(&env, "D02"), d(2024, 1, 2), now)
            .await
            .unwrap();
        let old = env
            .booking_api
            .create_booking(&alice, &seat_id(&env, "D03"), d(2024, 1, 1), now)
            .await
            .unwrap();
        env.booking_api
            .cancel_booking(&old.booking_id, &alice.actor())
            .unwrap();

        // 员工仅见本人 (含已取消)
        let mine = env
            .booking_api
            .list_bookings(&alice.actor(), false, d(2024, 1, 2))
            .unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|b| b.user_id == "alice"));

        // upcoming 过滤: 仅 ACTIVE 且不早于今天
        let upcoming = env
            .booking_api
            .list_bookings(&alice.actor(), true, d(2024, 1, 2))
            .unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].booking_date, d(2024, 1, 2));

        // 管理员可见全部
        let all = env
            .booking_api
            .list_bookings(&admin("root").actor(), false, d(2024, 1, 2))
            .unwrap();
        assert_eq!(all.len(), 3);
    }
}
