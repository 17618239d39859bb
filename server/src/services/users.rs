use serde_json::{Value, json};
use types::user::{AcceptInvitation, Invitation, NewInvitation, NewUser, User};
use types::{Page, Result};

use crate::client::{ReqwestExt, TalentClient};

pub struct Users<'a>(pub(crate) &'a TalentClient);

impl Users<'_> {
    /// One page of users; pages are numbered from one.
    pub async fn list(&self, page: u32) -> Result<Page<User>> {
        self.0
            .get("users/")?
            .query(&[("page", page.max(1))])
            .try_send()
            .await
    }

    /// The email doubles as the username.
    pub async fn create(&self, user: &NewUser) -> Result<()> {
        self.0
            .post("users/")?
            .json(&json!({
                "username": user.email.trim(),
                "email": user.email.trim(),
                "first_name": user.first_name,
                "last_name": user.last_name,
                "phone": user.phone,
                "company_id": user.company_id,
                "is_company_admin": user.is_company_admin,
                "password": user.password,
                "password_confirm": user.password_confirm,
            }))
            .try_send::<Value>()
            .await?;
        Ok(())
    }

    pub async fn invite_user(&self, invitation: &NewInvitation) -> Result<()> {
        self.0
            .post("users/invite_user/")?
            .json(invitation)
            .try_send::<Value>()
            .await?;
        Ok(())
    }

    pub async fn pending_invitations(&self) -> Result<Page<Invitation>> {
        self.0.get("users/pending_invitations/")?.try_send().await
    }

    /// Needs no bearer token; the invitation token authorizes it.
    pub async fn accept_invitation(&self, form: &AcceptInvitation) -> Result<()> {
        self.0
            .post("users/accept_invitation/")?
            .json(&json!({
                "token": form.token,
                "password": form.password,
                "first_name": form.first_name,
                "last_name": form.last_name,
                "phone": form.phone,
            }))
            .try_send::<Value>()
            .await?;
        Ok(())
    }

    pub async fn activate(&self, id: i64) -> Result<()> {
        self.0
            .post(format!("users/{id}/activate_user/"))?
            .try_send::<Value>()
            .await?;
        Ok(())
    }

    pub async fn deactivate(&self, id: i64) -> Result<()> {
        self.0
            .post(format!("users/{id}/deactivate_user/"))?
            .try_send::<Value>()
            .await?;
        Ok(())
    }
}
