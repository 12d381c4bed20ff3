//! Demo identity provider.
//!
//! NOT an authentication system. Passwords are stored in cleartext and the
//! admin role comes from a client-supplied flag, faithfully reproducing the
//! storefront demo this crate backs. Nothing here is authoritative and none
//! of it must ever gate anything beyond demo UI affordances.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::storage::{self, keys, StorageError, StorageProvider};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Cleartext by design of the demo it mirrors.
    pub password: String,
    pub role: Role,
    pub is_admin: bool,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    /// The "register as admin" checkbox. Client-trusted, see module docs.
    pub admin: bool,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    /// The "sign in as admin" switch; a truthy value promotes the account.
    pub admin: bool,
}

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("هذا البريد مسجّل مسبقًا")]
    EmailTaken,

    #[error("لا يوجد حساب بهذا البريد")]
    UnknownEmail,

    #[error("كلمة المرور غير صحيحة")]
    WrongPassword,

    #[error("كلمة المرور الحالية غير صحيحة")]
    WrongCurrentPassword,

    #[error("البريد الإلكتروني غير صالح")]
    InvalidEmail,

    #[error("غير مسجّل")]
    NotSignedIn,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Users live under the `users` key, the signed-in session under
/// `currentUser`. Sessions follow the last-write-wins semantics of the
/// underlying provider, same as every other record.
#[derive(Clone)]
pub struct DemoIdentityProvider {
    provider: Arc<dyn StorageProvider>,
}

impl DemoIdentityProvider {
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self { provider }
    }

    fn users(&self) -> Result<Vec<UserRecord>, IdentityError> {
        Ok(storage::read_json(self.provider.as_ref(), keys::USERS, Vec::new)?)
    }

    fn save_users(&self, users: &[UserRecord]) -> Result<(), IdentityError> {
        Ok(storage::write_json(self.provider.as_ref(), keys::USERS, &users)?)
    }

    fn set_current(&self, user: Option<&UserRecord>) -> Result<(), IdentityError> {
        match user {
            Some(user) => storage::write_json(self.provider.as_ref(), keys::CURRENT_USER, user)?,
            None => self.provider.remove(keys::CURRENT_USER)?,
        }
        Ok(())
    }

    pub fn current_user(&self) -> Result<Option<UserRecord>, IdentityError> {
        Ok(storage::read_json(self.provider.as_ref(), keys::CURRENT_USER, || None)?)
    }

    pub fn is_admin(&self) -> Result<bool, IdentityError> {
        Ok(self
            .current_user()?
            .map(|u| u.role == Role::Admin || u.is_admin)
            .unwrap_or(false))
    }

    /// Create an account and sign it in.
    pub fn register(&self, new_user: NewUser) -> Result<UserRecord, IdentityError> {
        if !validator::validate_email(new_user.email.as_str()) {
            return Err(IdentityError::InvalidEmail);
        }
        let email = new_user.email.to_lowercase();

        let mut users = self.users()?;
        if find_by_email(&users, &email).is_some() {
            return Err(IdentityError::EmailTaken);
        }

        let name = new_user
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or(&email).to_string());

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password: new_user.password,
            role: if new_user.admin { Role::Admin } else { Role::User },
            is_admin: new_user.admin,
            avatar_url: String::new(),
            created_at: now,
            updated_at: now,
        };

        users.push(record.clone());
        self.save_users(&users)?;
        self.set_current(Some(&record))?;
        tracing::info!(email = %record.email, admin = record.is_admin, "user registered");
        Ok(record)
    }

    /// Sign in. A truthy admin flag promotes the stored account, exactly as
    /// the demo it replicates does.
    pub fn login(&self, credentials: Credentials) -> Result<UserRecord, IdentityError> {
        let email = credentials.email.to_lowercase();
        let mut users = self.users()?;
        let user = find_by_email_mut(&mut users, &email).ok_or(IdentityError::UnknownEmail)?;
        if user.password != credentials.password {
            return Err(IdentityError::WrongPassword);
        }

        if credentials.admin {
            user.role = Role::Admin;
            user.is_admin = true;
            user.updated_at = Utc::now();
        }
        let record = user.clone();
        self.save_users(&users)?;
        self.set_current(Some(&record))?;
        tracing::info!(email = %record.email, admin = record.is_admin, "user signed in");
        Ok(record)
    }

    pub fn update_profile(
        &self,
        name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<UserRecord, IdentityError> {
        let current = self.current_user()?.ok_or(IdentityError::NotSignedIn)?;
        let mut users = self.users()?;
        let user =
            find_by_email_mut(&mut users, &current.email).ok_or(IdentityError::UnknownEmail)?;

        if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
            user.name = name.to_string();
        }
        if let Some(avatar_url) = avatar_url {
            user.avatar_url = avatar_url.to_string();
        }
        user.updated_at = Utc::now();

        let record = user.clone();
        self.save_users(&users)?;
        self.set_current(Some(&record))?;
        Ok(record)
    }

    pub fn change_password(&self, old: &str, new: &str) -> Result<(), IdentityError> {
        let current = self.current_user()?.ok_or(IdentityError::NotSignedIn)?;
        let mut users = self.users()?;
        let user =
            find_by_email_mut(&mut users, &current.email).ok_or(IdentityError::UnknownEmail)?;
        if user.password != old {
            return Err(IdentityError::WrongCurrentPassword);
        }
        user.password = new.to_string();
        user.updated_at = Utc::now();

        // Refresh the session in place; no forced sign-out.
        let record = user.clone();
        self.save_users(&users)?;
        self.set_current(Some(&record))?;
        Ok(())
    }

    /// Sign out. Also empties the cart and the wishlist, as the storefront
    /// treats both as belonging to the signed-in visitor.
    pub fn logout(&self) -> Result<(), IdentityError> {
        self.set_current(None)?;
        self.provider.remove(keys::CART)?;
        self.provider.remove(keys::WISHLIST)?;
        tracing::info!("user signed out");
        Ok(())
    }
}

fn find_by_email<'a>(users: &'a [UserRecord], email: &str) -> Option<&'a UserRecord> {
    users.iter().find(|u| u.email.eq_ignore_ascii_case(email))
}

fn find_by_email_mut<'a>(users: &'a mut [UserRecord], email: &str) -> Option<&'a mut UserRecord> {
    users.iter_mut().find(|u| u.email.eq_ignore_ascii_case(email))
}
