//! 位置服务
//!
//! 地图默认中心、定位失败时的回退，以及位置相关接口的请求和响应解析。
//! 所有接口结果都以 `ApiOutcome` 返回，不会把错误抛出边界。

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::translation::error::TranslationError;

/// 更新位置接口
pub const UPDATE_LOCATION_PATH: &str = "/api/update-location/";
/// 附近回收员接口
pub const NEARBY_COLLECTORS_PATH: &str = "/api/nearby-collectors/";
/// 附近回收请求接口
pub const NEARBY_PICKUPS_PATH: &str = "/api/nearby-pickups/";

/// 浏览器不支持定位时的错误信息
pub const GEOLOCATION_UNSUPPORTED: &str = "Geolocation not supported";

/// 地图默认中心：基加利
pub const DEFAULT_LOCATION: Coordinates = Coordinates {
    lat: -1.9441,
    lon: 30.0619,
};

/// 地图默认缩放级别
pub const DEFAULT_ZOOM: u8 = 13;

/// 经纬度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl Default for Coordinates {
    fn default() -> Self {
        DEFAULT_LOCATION
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// 上报位置的用户类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Household,
    Collector,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Household => "household",
            UserType::Collector => "collector",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = TranslationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "household" => Ok(UserType::Household),
            "collector" => Ok(UserType::Collector),
            other => Err(TranslationError::InvalidInput(format!(
                "未知的用户类型: {}",
                other
            ))),
        }
    }
}

/// 一次定位的结果
///
/// 失败时坐标为默认中心，并附带错误信息。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoFix {
    pub coordinates: Coordinates,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GeoFix {
    pub fn located(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            success: true,
            error: None,
        }
    }

    pub fn fallback(error: impl Into<String>) -> Self {
        Self {
            coordinates: DEFAULT_LOCATION,
            success: false,
            error: Some(error.into()),
        }
    }

    /// 根据定位提供方的结果构造
    ///
    /// `None` 表示环境不支持定位。
    pub fn from_position(position: Option<Result<Coordinates, String>>) -> Self {
        match position {
            Some(Ok(coordinates)) => Self::located(coordinates),
            Some(Err(error)) => {
                tracing::warn!("定位失败，使用默认位置: {}", error);
                Self::fallback(error)
            }
            None => Self::fallback(GEOLOCATION_UNSUPPORTED),
        }
    }
}

/// 接口调用结果
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    Success(T),
    Failure { error: String },
}

impl<T> ApiOutcome<T> {
    pub fn failure(error: impl Into<String>) -> Self {
        ApiOutcome::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiOutcome::Success(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            ApiOutcome::Success(value) => Some(value),
            ApiOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ApiOutcome::Success(_) => None,
            ApiOutcome::Failure { error } => Some(error),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ApiOutcome<U> {
        match self {
            ApiOutcome::Success(value) => ApiOutcome::Success(f(value)),
            ApiOutcome::Failure { error } => ApiOutcome::Failure { error },
        }
    }
}

/// 更新位置的请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationUpdate {
    pub latitude: f64,
    pub longitude: f64,
    pub user_type: UserType,
}

impl LocationUpdate {
    pub fn new(coordinates: Coordinates, user_type: UserType) -> Self {
        Self {
            latitude: coordinates.lat,
            longitude: coordinates.lon,
            user_type,
        }
    }
}

/// 更新位置成功后的确认
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateAck {
    #[serde(default)]
    pub message: Option<String>,
}

/// 附近的回收员
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyCollector {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub distance_km: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// 附近的回收请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyPickup {
    pub id: i64,
    pub household_name: String,
    #[serde(default)]
    pub address: Option<String>,
    pub waste_category: String,
    pub quantity: f64,
    pub distance_km: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// 所有接口共用的响应外壳
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    collectors: Option<serde_json::Value>,
    #[serde(default)]
    pickups: Option<serde_json::Value>,
}

fn parse_envelope(body: &str) -> Result<Envelope, String> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| format!("响应格式错误: {}", e))?;

    if envelope.success {
        Ok(envelope)
    } else {
        Err(envelope
            .error
            .unwrap_or_else(|| "服务器未返回错误信息".to_string()))
    }
}

fn parse_list<T: DeserializeOwned>(value: Option<serde_json::Value>, field: &str) -> ApiOutcome<Vec<T>> {
    match value {
        None => ApiOutcome::failure(format!("响应缺少 {} 字段", field)),
        Some(value) => match serde_json::from_value(value) {
            Ok(list) => ApiOutcome::Success(list),
            Err(e) => ApiOutcome::failure(format!("{} 字段格式错误: {}", field, e)),
        },
    }
}

/// 解析更新位置接口的响应
pub fn parse_update_response(body: &str) -> ApiOutcome<UpdateAck> {
    match parse_envelope(body) {
        Ok(envelope) => ApiOutcome::Success(UpdateAck {
            message: envelope.message,
        }),
        Err(error) => ApiOutcome::failure(error),
    }
}

/// 解析附近回收员接口的响应
pub fn parse_collectors_response(body: &str) -> ApiOutcome<Vec<NearbyCollector>> {
    match parse_envelope(body) {
        Ok(envelope) => parse_list(envelope.collectors, "collectors"),
        Err(error) => ApiOutcome::failure(error),
    }
}

/// 解析附近回收请求接口的响应
pub fn parse_pickups_response(body: &str) -> ApiOutcome<Vec<NearbyPickup>> {
    match parse_envelope(body) {
        Ok(envelope) => parse_list(envelope.pickups, "pickups"),
        Err(error) => ApiOutcome::failure(error),
    }
}

#[cfg(feature = "network")]
pub use client::LocationClient;

#[cfg(feature = "network")]
mod client {
    use std::time::Duration;

    use reqwest::blocking::{Client, RequestBuilder};
    use reqwest::header::{CONTENT_TYPE, COOKIE};
    use url::Url;

    use super::*;
    use crate::translation::config::ApiConfig;
    use crate::translation::error::TranslationResult;
    use crate::translation::storage::CookieJar;

    /// 发送 CSRF 令牌的请求头
    const CSRF_HEADER: &str = "X-CSRFToken";
    /// 保存 CSRF 令牌的 cookie
    const CSRF_COOKIE: &str = "csrftoken";

    /// 位置接口客户端（阻塞）
    #[derive(Debug, Clone)]
    pub struct LocationClient {
        client: Client,
        base_url: Url,
        default_max_distance: f64,
        csrf_token: Option<String>,
        cookie_header: Option<String>,
    }

    impl LocationClient {
        /// 按配置创建客户端，并从 cookie 中带上会话和 CSRF 令牌
        pub fn new(config: &ApiConfig, cookies: &CookieJar) -> TranslationResult<Self> {
            let base_url = Url::parse(&config.base_url).map_err(|e| {
                TranslationError::ConfigError(format!("API 地址无效 {}: {}", config.base_url, e))
            })?;

            let client = Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| TranslationError::ConfigError(format!("创建HTTP客户端失败: {}", e)))?;

            let cookie_header = cookies.to_header_string();

            Ok(Self {
                client,
                base_url,
                default_max_distance: config.max_distance_km,
                csrf_token: cookies.get_decoded(CSRF_COOKIE),
                cookie_header: (!cookie_header.is_empty()).then_some(cookie_header),
            })
        }

        /// 上报当前位置
        pub fn update_location(
            &self,
            coordinates: Coordinates,
            user_type: UserType,
        ) -> ApiOutcome<UpdateAck> {
            let payload = LocationUpdate::new(coordinates, user_type);
            let body = match serde_json::to_string(&payload) {
                Ok(body) => body,
                Err(e) => return ApiOutcome::failure(e.to_string()),
            };

            let url = match self.endpoint(UPDATE_LOCATION_PATH, None) {
                Ok(url) => url,
                Err(error) => return ApiOutcome::failure(error),
            };

            let mut request = self
                .client
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .body(body);
            if let Some(token) = &self.csrf_token {
                request = request.header(CSRF_HEADER, token.as_str());
            }

            let outcome = match self.send(request) {
                Ok(body) => parse_update_response(&body),
                Err(error) => ApiOutcome::failure(error),
            };

            match &outcome {
                ApiOutcome::Success(_) => tracing::info!("位置已更新: {}", coordinates),
                ApiOutcome::Failure { error } => tracing::warn!("更新位置失败: {}", error),
            }
            outcome
        }

        /// 查询附近的回收员，`None` 时使用配置中的默认距离
        pub fn nearby_collectors(&self, max_distance: Option<f64>) -> ApiOutcome<Vec<NearbyCollector>> {
            self.get(NEARBY_COLLECTORS_PATH, max_distance)
                .map_or_else(|error| ApiOutcome::failure(error), |body| parse_collectors_response(&body))
        }

        /// 查询附近的回收请求
        pub fn nearby_pickups(&self, max_distance: Option<f64>) -> ApiOutcome<Vec<NearbyPickup>> {
            self.get(NEARBY_PICKUPS_PATH, max_distance)
                .map_or_else(|error| ApiOutcome::failure(error), |body| parse_pickups_response(&body))
        }

        fn get(&self, path: &str, max_distance: Option<f64>) -> Result<String, String> {
            let distance = max_distance.unwrap_or(self.default_max_distance);
            let url = self.endpoint(path, Some(distance))?;
            self.send(self.client.get(url))
        }

        fn endpoint(&self, path: &str, max_distance: Option<f64>) -> Result<Url, String> {
            let mut url = self
                .base_url
                .join(path)
                .map_err(|e| format!("无效的接口路径 {}: {}", path, e))?;

            if let Some(distance) = max_distance {
                url.query_pairs_mut()
                    .append_pair("max_distance", &distance.to_string());
            }
            Ok(url)
        }

        /// 发送请求并读取响应正文
        ///
        /// 错误状态码的正文同样是 JSON 外壳，交给解析函数处理。
        fn send(&self, mut request: RequestBuilder) -> Result<String, String> {
            if let Some(cookie_header) = &self.cookie_header {
                request = request.header(COOKIE, cookie_header.as_str());
            }

            let response = request.send().map_err(|e| {
                tracing::debug!("请求失败: {}", e);
                e.to_string()
            })?;

            tracing::debug!("{} -> {}", response.url(), response.status());
            response.text().map_err(|e| e.to_string())
        }
    }

}
