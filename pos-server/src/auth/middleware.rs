//! 认证中间件
//!
//! 为 JWT 认证和授权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::HeaderMap;

use crate::AppError;
use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// 无需令牌的 API 路径
const PUBLIC_API_ROUTES: &[&str] = &["/api/login", "/api/register"];

/// 从请求头解析并验证 Bearer 令牌
///
/// 失败时记录安全日志并返回对应的 401 错误
pub fn authenticate_headers(
    headers: &HeaderMap,
    jwt_service: &JwtService,
    uri: &http::Uri,
) -> Result<CurrentUser, AppError> {
    let auth_header = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", uri));
            return Err(AppError::not_authenticated());
        }
    };

    match jwt_service.validate_token(token) {
        Ok(claims) => CurrentUser::try_from(claims)
            .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {}", e))),
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", uri)
            );

            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径 (健康检查等)
/// - `/api/login`, `/api/register`
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 NotAuthenticated |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path();
    if !path.starts_with("/api/") || PUBLIC_API_ROUTES.contains(&path) {
        return Ok(next.run(req).await);
    }

    let user = authenticate_headers(req.headers(), &state.get_jwt_service(), req.uri())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// 权限检查中间件 - 要求特定权限
///
/// # 用法
///
/// ```ignore
/// use axum::middleware;
/// Router::new()
///     .route("/api/statistics", get(handler::report))
///     .layer(middleware::from_fn(require_permission("statistics:view")));
/// ```
///
/// 无权限返回 403 Forbidden
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or_else(AppError::not_authenticated)?;

            if !user.has_permission(permission) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id,
                    username = user.username.clone(),
                    role = user.role.as_str(),
                    required_permission = permission
                );
                return Err(AppError::permission_denied(format!(
                    "Permission denied: {}",
                    permission
                )));
            }

            Ok(next.run(req).await)
        })
    }
}
