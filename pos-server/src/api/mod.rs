//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 登录、注册、当前用户
//! - [`orders`] - 订单管理接口
//! - [`statistics`] - 销售统计接口

pub mod extract;

pub mod auth;
pub mod health;
pub mod orders;
pub mod statistics;

pub use extract::{AppJson, AppPath, AppQuery};
