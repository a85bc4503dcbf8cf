//! # 网络模块
//!
//! 与站点后端交互的位置服务：
//!
//! - `location` - 默认地图中心、定位回退、位置接口的请求和响应
//!
//! HTTP 客户端 `LocationClient` 需要启用 `network` 特性。

pub mod location;

pub use location::{
    parse_collectors_response, parse_pickups_response, parse_update_response, ApiOutcome,
    Coordinates, GeoFix, LocationUpdate, NearbyCollector, NearbyPickup, UpdateAck, UserType,
    DEFAULT_LOCATION, DEFAULT_ZOOM,
};

#[cfg(feature = "network")]
pub use location::LocationClient;
