// ==========================================
// 工位轮换预订系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、更新
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::cycle_config_trait::CycleConfigReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// CycleConfig - 周期配置记录
// ==========================================
// 全进程唯一的一条配置; 仅管理操作可变更,
// 轮换解析在每次评估时读取
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleConfig {
    /// 轮换周期锚点 (第1周的周一)
    pub cycle_start_date: NaiveDate,
    /// 最近更新时间
    pub updated_at: Option<NaiveDateTime>,
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值（UPSERT, scope_id='global'）
    fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        Ok(())
    }

    /// 读取周期配置记录（含更新时间）
    ///
    /// # 返回
    /// - Ok(Some(CycleConfig)): 已配置
    /// - Ok(None): 未配置
    pub fn get_cycle_config(&self) -> Result<Option<CycleConfig>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT value, updated_at FROM config_kv
                 WHERE scope_id = 'global' AND key = ?1",
                params![config_keys::CYCLE_START_DATE],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (value, updated_at_raw) = match row {
            Some(v) => v,
            None => return Ok(None),
        };

        let cycle_start_date = match NaiveDate::parse_from_str(&value, "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                tracing::warn!(
                    config_key = config_keys::CYCLE_START_DATE,
                    raw_value = %value,
                    "周期锚点配置格式错误，按未配置处理"
                );
                return Ok(None);
            }
        };

        let updated_at =
            NaiveDateTime::parse_from_str(&updated_at_raw, "%Y-%m-%d %H:%M:%S").ok();

        Ok(Some(CycleConfig {
            cycle_start_date,
            updated_at,
        }))
    }

    /// 写入周期锚点日期
    ///
    /// # 说明
    /// 锚点是否为周一由管理端 API 校验, 此处仅负责持久化
    pub fn set_cycle_start_date(&self, date: NaiveDate) -> Result<(), Box<dyn Error>> {
        self.set_config_value(
            config_keys::CYCLE_START_DATE,
            &date.format("%Y-%m-%d").to_string(),
        )
    }
}

// ==========================================
// CycleConfigReader Trait 实现
// ==========================================
#[async_trait]
impl CycleConfigReader for ConfigManager {
    async fn get_cycle_start_date(&self) -> Result<Option<NaiveDate>, Box<dyn Error>> {
        Ok(self.get_cycle_config()?.map(|c| c.cycle_start_date))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    /// 轮换周期锚点 (格式 YYYY-MM-DD, 周一)
    pub const CYCLE_START_DATE: &str = "cycle_start_date";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn setup_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_cycle_start_roundtrip() {
        let manager = setup_manager();

        // 未配置时为 None (策略默认第1周)
        assert!(manager.get_cycle_start_date().await.unwrap().is_none());

        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        manager.set_cycle_start_date(monday).unwrap();

        assert_eq!(
            manager.get_cycle_start_date().await.unwrap(),
            Some(monday)
        );

        let config = manager.get_cycle_config().unwrap().unwrap();
        assert_eq!(config.cycle_start_date, monday);
        assert!(config.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_invalid_stored_value_treated_as_absent() {
        let manager = setup_manager();
        manager
            .set_config_value(config_keys::CYCLE_START_DATE, "not-a-date")
            .unwrap();

        assert!(manager.get_cycle_start_date().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_overwrites() {
        let manager = setup_manager();

        let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let second = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        manager.set_cycle_start_date(first).unwrap();
        manager.set_cycle_start_date(second).unwrap();

        assert_eq!(
            manager.get_cycle_start_date().await.unwrap(),
            Some(second)
        );
    }
}
