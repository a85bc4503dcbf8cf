//! Cookie 存储
//!
//! 只模拟页面脚本可见的部分：`name=value`、过期时间和路径。

use chrono::{DateTime, Duration, Utc};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

/// 单个 cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_path() -> String {
    "/".to_string()
}

impl Cookie {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires.map_or(false, |expires| expires <= now)
    }

    /// `document.cookie = ...` 形式的写入行
    pub fn to_set_cookie_line(&self) -> String {
        match self.expires {
            Some(expires) => format!(
                "{}={};expires={};path={}",
                self.name,
                self.value,
                expires.format("%a, %d %b %Y %H:%M:%S GMT"),
                self.path
            ),
            None => format!("{}={};path={}", self.name, self.value, self.path),
        }
    }
}

/// 页面的 cookie 集合
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析 `a=1; b=2` 形式的 cookie 串（即 `document.cookie` 的读取结果）
    pub fn parse(header: &str) -> Self {
        let mut jar = CookieJar::new();

        for pair in header.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }

            if let Some((name, value)) = pair.split_once('=') {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                jar.insert(Cookie {
                    name: name.to_string(),
                    value: value.trim().to_string(),
                    expires: None,
                    path: default_path(),
                });
            }
        }

        jar
    }

    fn insert(&mut self, cookie: Cookie) {
        self.cookies.retain(|existing| existing.name != cookie.name);
        self.cookies.push(cookie);
    }

    /// 读取未过期 cookie 的原始值
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_at(name, Utc::now())
    }

    pub fn get_at(&self, name: &str, now: DateTime<Utc>) -> Option<&str> {
        self.cookies
            .iter()
            .find(|cookie| cookie.name == name && !cookie.is_expired(now))
            .map(|cookie| cookie.value.as_str())
    }

    /// 读取并做 URL 解码（CSRF token 等）
    pub fn get_decoded(&self, name: &str) -> Option<String> {
        self.get(name)
            .map(|value| percent_decode_str(value).decode_utf8_lossy().into_owned())
    }

    /// 写入 cookie，`days` 天后过期，路径固定为 `/`
    pub fn set(&mut self, name: &str, value: &str, days: i64) {
        self.set_at(name, value, days, Utc::now());
    }

    pub fn set_at(&mut self, name: &str, value: &str, days: i64, now: DateTime<Utc>) {
        self.insert(Cookie {
            name: name.to_string(),
            value: value.to_string(),
            expires: Some(now + Duration::days(days)),
            path: default_path(),
        });
    }

    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|cookie| cookie.name == name)
    }

    /// 序列化为 `document.cookie` 的读取形式，跳过已过期的项
    pub fn to_header_string(&self) -> String {
        let now = Utc::now();
        self.cookies
            .iter()
            .filter(|cookie| !cookie.is_expired(now))
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
