// ==========================================
// 工位轮换预订系统 - 身份协作方接口
// ==========================================
// 职责: 将不透明凭证解析为调用者身份 (user_id + role + batch)
// 红线: 本引擎不经手凭证签发/校验/口令散列, 仅消费解析结果
// ==========================================

use crate::domain::booking::Actor;
use crate::domain::types::{Batch, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ==========================================
// AuthenticatedUser - 已认证的调用者身份
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub name: Option<String>,
    pub role: Role,
    pub batch: Batch,
}

impl AuthenticatedUser {
    /// 转换为操作者 (取消/释放/管理操作的主体)
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id.clone(), self.role)
    }
}

// ==========================================
// AuthError - 身份解析错误
// ==========================================
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("凭证无效")]
    InvalidCredential,

    #[error("凭证已过期")]
    CredentialExpired,

    #[error("身份服务内部错误: {0}")]
    Internal(String),
}

// ==========================================
// IdentityResolver Trait
// ==========================================
// 用途: 由外部身份协作方实现 (JWT/Session 等机制对本引擎不可见)
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// 解析不透明凭证为调用者身份
    async fn resolve(&self, credential: &str) -> Result<AuthenticatedUser, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // 固定映射的测试实现
    struct StaticResolver;

    #[async_trait]
    impl IdentityResolver for StaticResolver {
        async fn resolve(&self, credential: &str) -> Result<AuthenticatedUser, AuthError> {
            match credential {
                "token-alice" => Ok(AuthenticatedUser {
                    user_id: "alice".to_string(),
                    name: Some("Alice".to_string()),
                    role: Role::Employee,
                    batch: Batch::A,
                }),
                _ => Err(AuthError::InvalidCredential),
            }
        }
    }

    #[tokio::test]
    async fn test_resolve_known_credential() {
        let resolver = StaticResolver;
        let user = resolver.resolve("token-alice").await.unwrap();
        assert_eq!(user.user_id, "alice");
        assert_eq!(user.batch, Batch::A);

        let actor = user.actor();
        assert_eq!(actor.user_id, "alice");
        assert!(!actor.is_admin());
    }

    #[tokio::test]
    async fn test_resolve_unknown_credential_fails() {
        let resolver = StaticResolver;
        assert!(matches!(
            resolver.resolve("garbage").await,
            Err(AuthError::InvalidCredential)
        ));
    }
}
