use std::sync::Arc;

use crate::db;
use crate::errors::{AppError, Entity};
use crate::models::{NewUser, User, UserPatch};
use crate::services::ports::UserDirectory;

pub struct UserService {
    users: Arc<dyn UserDirectory>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }

    pub async fn create(&self, user: NewUser) -> Result<User, AppError> {
        validate_name(&user.name)?;
        validate_email(&user.email)?;
        self.ensure_email_free(&user.email, None).await?;

        let email = user.email.clone();
        let user = self
            .users
            .create_user(user)
            .await
            .map_err(|e| email_taken(e, &email))?;
        tracing::info!(user_id = user.id, "user registered");
        Ok(user)
    }

    pub async fn get(&self, id: i64) -> Result<User, AppError> {
        self.users
            .get_user(id)
            .await?
            .ok_or(AppError::NotFound(Entity::User, id))
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.list_users().await?)
    }

    pub async fn update(&self, id: i64, patch: UserPatch) -> Result<User, AppError> {
        let mut user = self.get(id).await?;

        if let Some(name) = patch.name {
            validate_name(&name)?;
            user.name = name;
        }
        if let Some(email) = patch.email {
            validate_email(&email)?;
            self.ensure_email_free(&email, Some(id)).await?;
            user.email = email;
        }

        let updated = self
            .users
            .update_user(&user)
            .await
            .map_err(|e| email_taken(e, &user.email))?;
        if !updated {
            return Err(AppError::NotFound(Entity::User, id));
        }
        Ok(user)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if self.users.delete_user(id).await? {
            tracing::info!(user_id = id, "user deleted");
        }
        Ok(())
    }

    async fn ensure_email_free(&self, email: &str, owner: Option<i64>) -> Result<(), AppError> {
        match self.users.find_by_email(email).await? {
            Some(existing) if Some(existing.id) != owner => Err(email_conflict(email)),
            _ => Ok(()),
        }
    }
}

fn email_conflict(email: &str) -> AppError {
    AppError::Conflict(format!("email {email} is already registered"))
}

/// A registration racing past `ensure_email_free` still ends up here when
/// the UNIQUE index rejects the write.
fn email_taken(err: anyhow::Error, email: &str) -> AppError {
    if db::is_constraint_violation(&err) {
        email_conflict(email)
    } else {
        AppError::Store(err)
    }
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name must not be blank".to_string()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !well_formed {
        return Err(AppError::Validation(format!("invalid email: {email}")));
    }
    Ok(())
}
