use once_cell::sync::Lazy;
use regex::Regex;

static MOBILE_USER_AGENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)android|webos|iphone|ipad|ipod|blackberry|iemobile|opera mini")
        .expect("mobile user agent pattern is valid")
});

/// 访客设备的粗略分类，决定注册后是否下发桌面安装包
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Mobile,
    Desktop,
}

impl DeviceKind {
    /// 没有 `User-Agent` 的访客按桌面端处理
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        match user_agent {
            Some(ua) if MOBILE_USER_AGENT.is_match(ua) => DeviceKind::Mobile,
            _ => DeviceKind::Desktop,
        }
    }

    pub fn is_mobile(self) -> bool {
        self == DeviceKind::Mobile
    }
}
