//! Account service, user account and role documents.

use serde::Serialize;

use super::{Collection, Header, Link, Status, odata_id};

pub const ROLE_IDS: &[&str] = &["Administrator", "Operator", "ReadOnly"];

const ACCOUNTS_PATH: &str = "AccountService/Accounts";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountService {
    #[serde(flatten)]
    pub header: Header,
    pub service_enabled: bool,
    pub status: Status,
    pub min_password_length: u32,
    pub max_password_length: u32,
    pub account_lockout_threshold: u32,
    pub account_lockout_duration: u32,
    pub account_lockout_counter_reset_after: u32,
    pub accounts: Link,
    pub roles: Link,
}

pub fn account_service() -> AccountService {
    AccountService {
        header: Header::new(
            "AccountService",
            "v1_15_0",
            odata_id("AccountService"),
            "AccountService",
            "Account Service",
        ),
        service_enabled: true,
        status: Status::enabled(),
        min_password_length: 8,
        max_password_length: 64,
        account_lockout_threshold: 5,
        account_lockout_duration: 300,
        account_lockout_counter_reset_after: 1800,
        accounts: Link::to(ACCOUNTS_PATH),
        roles: Link::to("AccountService/Roles"),
    }
}

/// A user account. The password is never part of the document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManagerAccount {
    #[serde(flatten)]
    pub header: Header,
    pub user_name: String,
    pub role_id: String,
    pub account_types: Vec<&'static str>,
    pub enabled: bool,
    pub locked: bool,
    pub links: AccountLinks,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountLinks {
    pub role: Link,
}

pub fn manager_account(username: &str, role_id: &str, enabled: bool) -> ManagerAccount {
    ManagerAccount {
        header: Header::new(
            "ManagerAccount",
            "v1_13_0",
            odata_id(&format!("{ACCOUNTS_PATH}/{username}")),
            username,
            "User Account",
        ),
        user_name: username.to_string(),
        role_id: role_id.to_string(),
        account_types: vec!["Redfish"],
        enabled,
        locked: false,
        links: AccountLinks {
            role: Link::to(&format!("AccountService/Roles/{role_id}")),
        },
    }
}

/// Accounts collection for the given user names, in the order given.
pub fn accounts_collection<'a>(usernames: impl IntoIterator<Item = &'a str>) -> Collection {
    let members = usernames
        .into_iter()
        .map(|name| Link::to(&format!("{ACCOUNTS_PATH}/{name}")))
        .collect();
    Collection::new(
        "ManagerAccountCollection",
        ACCOUNTS_PATH,
        "Accounts Collection",
        members,
    )
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Role {
    #[serde(flatten)]
    pub header: Header,
    pub role_id: &'static str,
    pub assigned_privileges: &'static [&'static str],
    pub is_predefined: bool,
}

/// Privileges granted by a predefined role.
pub fn role_privileges(role_id: &str) -> Option<&'static [&'static str]> {
    match role_id {
        "Administrator" => Some(&[
            "Login",
            "ConfigureManager",
            "ConfigureUsers",
            "ConfigureComponents",
            "ConfigureSelf",
        ]),
        "Operator" => Some(&["Login", "ConfigureComponents", "ConfigureSelf"]),
        "ReadOnly" => Some(&["Login", "ConfigureSelf"]),
        _ => None,
    }
}

pub fn role(id: &str) -> Option<Role> {
    let role_id = ROLE_IDS.iter().copied().find(|r| *r == id)?;
    Some(Role {
        header: Header::new(
            "Role",
            "v1_2_0",
            odata_id(&format!("AccountService/Roles/{role_id}")),
            role_id,
            role_id,
        ),
        role_id,
        assigned_privileges: role_privileges(role_id)?,
        is_predefined: true,
    })
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn account_never_carries_password() {
        let doc = serde_json::to_value(manager_account("admin", "Administrator", true)).unwrap();
        assert_eq!(doc["UserName"], "admin");
        assert_eq!(
            doc["Links"]["Role"]["@odata.id"],
            "/redfish/v1/AccountService/Roles/Administrator"
        );
        assert!(doc.get("Password").is_none());
    }

    #[test]
    fn accounts_collection_lists_given_users() {
        let collection = accounts_collection(["admin", "operator"]);
        assert_eq!(collection.count, 2);
        assert_eq!(
            collection.members[1].odata_id,
            "/redfish/v1/AccountService/Accounts/operator"
        );
    }

    #[test]
    fn operator_cannot_configure_users() {
        let privileges = role_privileges("Operator").unwrap();
        assert!(!privileges.contains(&"ConfigureUsers"));
        assert!(role("Nobody").is_none());
    }
}
