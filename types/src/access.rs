use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de;

/// A user's role, from the profile's `role_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    SystemAdmin,
    CompanyAdmin,
    CompanyUser,
}

impl Role {
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("talent_verify_admin") => Self::SystemAdmin,
            Some("company_admin") => Self::CompanyAdmin,
            _ => Self::CompanyUser,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::SystemAdmin => "System Admin",
            Self::CompanyAdmin => "Company Admin",
            Self::CompanyUser => "Company User",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    /// Open the management page for the resource.
    Manage,
    Create,
    Update,
    Delete,
    Export,
    Import,
    Resolve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Company,
    Employee,
    BulkJob,
    AuditLog,
    SecurityEvent,
    User,
    Invitation,
    /// Choosing which company a new user or invitation belongs to.
    CompanyAssignment,
    /// Granting the company admin flag.
    AdminFlag,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUser {
    pub id: i64,
    #[serde(default, deserialize_with = "de::null_string")]
    pub username: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub email: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub first_name: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub last_name: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub full_name: String,
}

/// Response of `auth/profile/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub user: ProfileUser,
    #[serde(default)]
    pub role_name: Option<String>,
    #[serde(default)]
    pub company: Option<i64>,
    #[serde(default, deserialize_with = "de::null_string")]
    pub company_name: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub phone: String,
    #[serde(default)]
    pub permissions: Option<Value>,
}

impl Profile {
    pub fn role(&self) -> Role {
        Role::from_name(self.role_name.as_deref())
    }

    pub fn display_name(&self) -> String {
        let user = &self.user;
        if !user.full_name.trim().is_empty() {
            return user.full_name.trim().to_string();
        }
        let name = format!("{} {}", user.first_name, user.last_name);
        match name.trim() {
            "" => user.username.clone(),
            name => name.to_string(),
        }
    }

    pub fn initial(&self) -> String {
        self.display_name()
            .chars()
            .next()
            .unwrap_or('?')
            .to_uppercase()
            .to_string()
    }

    /// Whether the signed-in user may perform `action` on `resource`.
    ///
    /// This only decides what the UI offers; the backend enforces the rules.
    pub fn can(&self, action: Action, resource: Resource) -> bool {
        use Action::*;
        use Resource::*;

        match self.role() {
            Role::SystemAdmin => true,
            Role::CompanyAdmin => match resource {
                Company => action == View,
                Employee => true,
                BulkJob => action != Delete,
                SecurityEvent => matches!(action, View | Resolve),
                User => matches!(action, View | Manage | Create | Update),
                Invitation => matches!(action, View | Manage | Create),
                AuditLog | CompanyAssignment | AdminFlag => false,
            },
            Role::CompanyUser => match resource {
                Company => action == View,
                Employee => true,
                BulkJob => action != Delete,
                User => action == View,
                AuditLog | SecurityEvent | Invitation | CompanyAssignment | AdminFlag => false,
            },
        }
    }

    /// Company imports need the right to create companies; the others only
    /// need bulk import rights.
    pub fn can_import(&self, operation: crate::bulk::OperationType) -> bool {
        use crate::bulk::OperationType;

        match operation {
            OperationType::CompanyImport => self.can(Action::Create, Resource::Company),
            OperationType::EmployeeImport | OperationType::PositionImport => {
                self.can(Action::Import, Resource::BulkJob)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::OperationType;

    fn profile(role: Option<&str>) -> Profile {
        Profile {
            id: 1,
            user: ProfileUser {
                id: 1,
                username: "ada".into(),
                email: "ada@acme.test".into(),
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                full_name: String::new(),
            },
            role_name: role.map(String::from),
            company: Some(5),
            company_name: "Acme".into(),
            phone: String::new(),
            permissions: None,
        }
    }

    #[test]
    fn system_admin_can_do_anything() {
        let admin = profile(Some("talent_verify_admin"));
        assert!(admin.can(Action::Manage, Resource::Company));
        assert!(admin.can(Action::View, Resource::AuditLog));
        assert!(admin.can(Action::Update, Resource::AdminFlag));
        assert!(admin.can_import(OperationType::CompanyImport));
    }

    #[test]
    fn company_admin_manages_users_not_companies() {
        let admin = profile(Some("company_admin"));
        assert!(admin.can(Action::Manage, Resource::User));
        assert!(admin.can(Action::Create, Resource::Invitation));
        assert!(admin.can(Action::View, Resource::Company));
        assert!(!admin.can(Action::Manage, Resource::Company));
        assert!(!admin.can(Action::View, Resource::AuditLog));
        assert!(!admin.can(Action::Update, Resource::CompanyAssignment));
        assert!(!admin.can_import(OperationType::CompanyImport));
        assert!(admin.can_import(OperationType::EmployeeImport));
    }

    #[test]
    fn plain_user() {
        for role in [None, Some("company_user"), Some("something_new")] {
            let user = profile(role);
            assert_eq!(user.role(), Role::CompanyUser);
            assert!(user.can(Action::Create, Resource::Employee));
            assert!(user.can(Action::Create, Resource::BulkJob));
            assert!(!user.can(Action::Manage, Resource::User));
            assert!(!user.can(Action::View, Resource::SecurityEvent));
        }
    }

    #[test]
    fn display_name_fallbacks() {
        let mut p = profile(None);
        assert_eq!(p.display_name(), "Ada Lovelace");
        assert_eq!(p.initial(), "A");

        p.user.first_name.clear();
        p.user.last_name.clear();
        assert_eq!(p.display_name(), "ada");
    }

    #[test]
    fn parses_profile() {
        let p: Profile = serde_json::from_str(
            r#"{
                "id": 4,
                "user": {"id": 9, "username": "ada", "email": "ada@acme.test",
                         "first_name": "Ada", "last_name": "L", "full_name": "Ada L",
                         "is_active": true, "date_joined": "2024-01-01T00:00:00Z"},
                "role": 1,
                "role_name": "company_admin",
                "role_description": "Company administrator",
                "company": 5,
                "company_name": "Acme",
                "phone": null,
                "is_active": true,
                "permissions": {"users": ["view"]}
            }"#,
        )
        .unwrap();
        assert_eq!(p.role(), Role::CompanyAdmin);
        assert_eq!(p.display_name(), "Ada L");
        assert_eq!(p.phone, "");
    }
}
