//! Permission Definitions
//!
//! 角色 → 权限的固定映射。
//!
//! - owner: 订单 + 统计 + 用户管理
//! - receptionist: 仅订单

use shared::models::Role;

pub const ORDERS_READ: &str = "orders:read";
pub const ORDERS_WRITE: &str = "orders:write";
pub const ORDERS_DELETE: &str = "orders:delete";
pub const STATISTICS_VIEW: &str = "statistics:view";
pub const USERS_MANAGE: &str = "users:manage";

/// 店主权限（全部）
pub const OWNER_PERMISSIONS: &[&str] = &[
    ORDERS_READ,
    ORDERS_WRITE,
    ORDERS_DELETE,
    STATISTICS_VIEW,
    USERS_MANAGE,
];

/// 前台权限（点单、查看和删除订单）
pub const RECEPTIONIST_PERMISSIONS: &[&str] = &[ORDERS_READ, ORDERS_WRITE, ORDERS_DELETE];

/// Get permissions for a role
pub fn permissions_for(role: Role) -> Vec<String> {
    let perms = match role {
        Role::Owner => OWNER_PERMISSIONS,
        Role::Receptionist => RECEPTIONIST_PERMISSIONS,
    };
    perms.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_owner_sees_statistics() {
        assert!(permissions_for(Role::Owner).contains(&STATISTICS_VIEW.to_string()));
        assert!(!permissions_for(Role::Receptionist).contains(&STATISTICS_VIEW.to_string()));
    }

    #[test]
    fn test_both_roles_handle_orders() {
        for role in [Role::Owner, Role::Receptionist] {
            let perms = permissions_for(role);
            for p in [ORDERS_READ, ORDERS_WRITE, ORDERS_DELETE] {
                assert!(perms.contains(&p.to_string()), "{role} lacks {p}");
            }
        }
    }
}
