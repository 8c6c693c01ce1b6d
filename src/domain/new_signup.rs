use chrono::{DateTime, Utc};

use crate::domain::SignupEmail;

/// 即将写入注册表的一行
#[derive(Debug, Clone)]
pub struct NewSignup {
    pub email: SignupEmail,
    pub created_at: DateTime<Utc>,
}

impl NewSignup {
    pub fn now(email: SignupEmail) -> Self {
        Self {
            email,
            created_at: Utc::now(),
        }
    }
}
