//! 密码哈希 (Argon2id, 随机盐)

use std::sync::LazyLock;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// 用户不存在时参与校验的哈希，使两条登录失败路径耗时一致
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hash_password("pos-server/unknown-user").unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build dummy password hash");
        String::new()
    })
});

/// 哈希格式无效时视为不匹配
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// 登录校验
///
/// 无论用户是否存在都会完整执行一次 Argon2 校验，
/// `stored_hash` 为 `None` 时结果恒为 `false`。
pub fn verify_login(password: &str, stored_hash: Option<&str>) -> bool {
    let valid = verify_password(password, stored_hash.unwrap_or(DUMMY_HASH.as_str()));
    valid && stored_hash.is_some()
}
