use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// RFC 5321 规定的地址长度上限
const MAX_EMAIL_LENGTH: usize = 254;
const MAX_LOCAL_PART_LENGTH: usize = 64;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

/// `candidate` 是可以保存的邮箱地址时返回 `true`。
///
/// 所有规则必须同时满足: 首尾没有空白; 总长不超过 254 个字符, 本地部分不超过 64 个;
/// 恰好一个 `@`, 本地部分和域名都非空; 本地部分不以点开头或结尾, 也没有连续的点;
/// 域名不以连字符开头或结尾, 至少包含一个点; 整个字符串匹配 [`EMAIL_PATTERN`]。
pub fn is_valid_email(candidate: &str) -> bool {
    if candidate.is_empty() || candidate.trim() != candidate {
        return false;
    }
    if candidate.chars().count() > MAX_EMAIL_LENGTH {
        return false;
    }

    let mut parts = candidate.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    local.chars().count() <= MAX_LOCAL_PART_LENGTH
        && !local.is_empty()
        && !domain.is_empty()
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && !domain.starts_with('-')
        && !domain.ends_with('-')
        && domain.contains('.')
        && EMAIL_PATTERN.is_match(candidate)
}

/// 通过 [`is_valid_email`] 校验的邮箱地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupEmail(String);

impl SignupEmail {
    pub fn parse(s: String) -> Result<SignupEmail, String> {
        if is_valid_email(&s) {
            Ok(Self(s))
        } else {
            Err(format!("{} is not a valid signup email.", s))
        }
    }
}

impl AsRef<str> for SignupEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignupEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
