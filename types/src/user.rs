use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::de;

pub const PASSWORD_MISMATCH: &str = "Passwords do not match";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default, deserialize_with = "de::null_string")]
    pub email: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub username: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub first_name: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub last_name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_company_admin: bool,
    #[serde(default, deserialize_with = "de::null_string")]
    pub company_name: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub created_by_name: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub role_display: String,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub last_login: Option<Timestamp>,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub date_joined: Option<Timestamp>,
}

impl User {
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        match name.trim() {
            "" => self.username.clone(),
            name => name.to_string(),
        }
    }

    pub fn role_label(&self) -> &str {
        if !self.role_display.is_empty() {
            &self.role_display
        } else if self.is_company_admin {
            "Company Admin"
        } else {
            "Company User"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub company: Option<i64>,
    #[serde(default, deserialize_with = "de::null_string")]
    pub company_name: String,
    #[serde(default)]
    pub is_company_admin: bool,
    #[serde(default, deserialize_with = "de::null_string")]
    pub invited_by_name: String,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub expires_at: Option<Timestamp>,
    #[serde(default)]
    pub is_used: bool,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationStatus {
    Pending,
    Expired,
    Accepted,
}

impl InvitationStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Expired => "Expired",
            Self::Accepted => "Accepted",
        }
    }

    pub fn tone(self) -> &'static str {
        match self {
            Self::Pending => "warning",
            Self::Expired => "error",
            Self::Accepted => "success",
        }
    }
}

impl Invitation {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expires| expires < now)
    }

    pub fn status(&self, now: Timestamp) -> InvitationStatus {
        if self.is_used {
            InvitationStatus::Accepted
        } else if self.is_expired(now) {
            InvitationStatus::Expired
        } else {
            InvitationStatus::Pending
        }
    }

    pub fn role_label(&self) -> &'static str {
        if self.is_company_admin {
            "Company Admin"
        } else {
            "Company User"
        }
    }
}

fn check_passwords(password: &str, confirm: &str) -> Result<(), String> {
    if password != confirm {
        return Err(PASSWORD_MISMATCH.to_string());
    }
    Ok(())
}

fn check_required(fields: &[(&str, &str)]) -> Result<(), String> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| *label)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("Please fill in: {}", missing.join(", ")))
    }
}

/// Form for creating a user directly. The email doubles as the username.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub company_id: Option<i64>,
    pub is_company_admin: bool,
    pub password: String,
    pub password_confirm: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), String> {
        check_required(&[
            ("Email", &self.email),
            ("First Name", &self.first_name),
            ("Last Name", &self.last_name),
            ("Password", &self.password),
        ])?;
        check_passwords(&self.password, &self.password_confirm)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewInvitation {
    pub email: String,
    pub company: Option<i64>,
    pub is_company_admin: bool,
}

impl NewInvitation {
    pub fn validate(&self) -> Result<(), String> {
        check_required(&[("Email", &self.email)])
    }
}

/// Form on the public invitation page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcceptInvitation {
    pub token: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub password: String,
    pub password_confirm: String,
}

impl AcceptInvitation {
    pub fn validate(&self) -> Result<(), String> {
        check_passwords(&self.password, &self.password_confirm)?;
        if self.token.trim().is_empty() {
            return Err("Invalid invitation token".to_string());
        }
        check_required(&[
            ("First Name", &self.first_name),
            ("Last Name", &self.last_name),
            ("Password", &self.password),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitation(expires_at: &str, is_used: bool) -> Invitation {
        Invitation {
            id: 1,
            email: "new@acme.test".into(),
            company: Some(2),
            company_name: "Acme".into(),
            is_company_admin: false,
            invited_by_name: "Ada".into(),
            expires_at: Some(expires_at.parse().unwrap()),
            is_used,
            created_at: None,
        }
    }

    #[test]
    fn invitation_status() {
        let now: Timestamp = "2024-06-10T00:00:00Z".parse().unwrap();
        assert_eq!(
            invitation("2024-06-12T00:00:00Z", false).status(now),
            InvitationStatus::Pending
        );
        assert_eq!(
            invitation("2024-06-09T23:59:59Z", false).status(now),
            InvitationStatus::Expired
        );
        assert_eq!(
            invitation("2024-06-09T00:00:00Z", true).status(now),
            InvitationStatus::Accepted
        );
    }

    #[test]
    fn new_user_checks() {
        let mut form = NewUser {
            email: "jo@acme.test".into(),
            first_name: "Jo".into(),
            last_name: "Bloggs".into(),
            password: "hunter22".into(),
            password_confirm: "hunter23".into(),
            ..Default::default()
        };
        assert_eq!(form.validate(), Err("Passwords do not match".to_string()));

        form.password_confirm = "hunter22".into();
        assert_eq!(form.validate(), Ok(()));

        form.last_name.clear();
        assert_eq!(form.validate(), Err("Please fill in: Last Name".to_string()));
    }

    #[test]
    fn accept_checks_passwords_first() {
        let form = AcceptInvitation {
            token: "tok".into(),
            password: "a".into(),
            password_confirm: "b".into(),
            ..Default::default()
        };
        assert_eq!(form.validate(), Err(PASSWORD_MISMATCH.to_string()));
    }

    #[test]
    fn user_names() {
        let user: User = serde_json::from_str(
            r#"{"id": 1, "email": "jo@acme.test", "username": "jo@acme.test",
                "first_name": "", "last_name": "", "is_active": true,
                "is_company_admin": true, "company_name": null,
                "created_by_name": "", "role_display": "",
                "last_login": null, "date_joined": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(user.full_name(), "jo@acme.test");
        assert_eq!(user.role_label(), "Company Admin");
    }
}
