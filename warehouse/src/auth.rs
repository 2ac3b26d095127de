use std::sync::OnceLock;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use password_hash::SaltString;
use rand_core::OsRng;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::entity::app_user;
use crate::error::{Error, Result, is_unique_violation};

pub const DEFAULT_ROLE: &str = "user";

/// Self-service sign-up input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

fn is_valid_email(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

/// At least 8 characters with an upper-case letter, a lower-case letter and a digit.
fn check_password_policy(password: &str) -> Result<()> {
    if password.chars().count() < 8 {
        return Err(Error::validation("Password must be at least 8 characters long"));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(Error::validation("Password must contain an upper-case letter"));
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(Error::validation("Password must contain a lower-case letter"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(Error::validation("Password must contain a digit"));
    }
    Ok(())
}

pub struct Auth {
    db: DatabaseConnection,
}

impl Auth {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Register a regular user after checking email format and password policy.
    pub async fn register(&self, input: Registration) -> Result<app_user::Model> {
        let email = input.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(Error::validation("Invalid email address"));
        }
        check_password_policy(&input.password)?;
        if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
            return Err(Error::validation("First and last name are required"));
        }

        self.create_user(
            &email,
            &input.password,
            input.first_name.trim(),
            input.last_name.trim(),
            input.phone,
            DEFAULT_ROLE,
        )
        .await
    }

    /// Insert a user with an Argon2-hashed password. Skips the sign-up
    /// policy checks; used by `register` and the CLI. Emails are stored lower-cased.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        phone: Option<String>,
        role: &str,
    ) -> Result<app_user::Model> {
        let password_hash = Self::hash_password(password)?;
        let now = Utc::now().naive_utc();
        let user = app_user::ActiveModel {
            id: Set(Uuid::now_v7()),
            email: Set(email.trim().to_lowercase()),
            first_name: Set(first_name.to_owned()),
            last_name: Set(last_name.to_owned()),
            password_hash: Set(password_hash),
            phone: Set(phone),
            role: Set(role.to_owned()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::conflict("Email is already registered")
            } else {
                Error::Db(e)
            }
        })?;

        tracing::info!(user_id = %user.id, role = %user.role, "created user");
        Ok(user)
    }

    /// Verify email/password. Updates `last_login_at` on success.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<app_user::Model> {
        let user = app_user::Entity::find()
            .filter(app_user::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await?
            .ok_or_else(|| Error::Unauthorized("Invalid credentials".to_string()))?;

        let hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| Error::Internal(format!("Stored password hash is invalid: {e}")))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .map_err(|_| Error::Unauthorized("Invalid credentials".to_string()))?;

        if !user.is_active {
            return Err(Error::Forbidden("User is inactive".to_string()));
        }

        let mut active: app_user::ActiveModel = user.into();
        active.last_login_at = Set(Some(Utc::now().naive_utc()));
        Ok(active.update(&self.db).await?)
    }

    pub async fn find_user(&self, id: Uuid) -> Result<app_user::Model> {
        app_user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    pub async fn count_users(&self) -> Result<u64> {
        Ok(app_user::Entity::find().count(&self.db).await?)
    }

    /// Hash a plaintext password with Argon2id + a random salt.
    pub fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::Internal(format!("Password hashing failed: {e}")))?
            .to_string();
        Ok(hash)
    }
}
