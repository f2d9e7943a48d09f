//! Registration and login

use crate::domain::{LoginInput, NewUser, RegisterInput, User};
use crate::error::{AppError, Result};
use crate::jwt::JwtManager;
use crate::repository::UserRepository;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use metrics::counter;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// A user together with a freshly issued session token
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

pub struct AuthService<U: UserRepository> {
    user_repo: Arc<U>,
    jwt: JwtManager,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: Arc<U>, jwt: JwtManager) -> Self {
        Self { user_repo, jwt }
    }

    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession> {
        let input = RegisterInput {
            name: input.name.trim().to_string(),
            email: normalize_email(&input.email),
            password: input.password,
        };
        input.validate()?;

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            record_attempt("register", "conflict");
            return Err(AppError::Conflict("Email already in use".to_string()));
        }

        let new_user = NewUser {
            name: input.name,
            email: input.email,
            password_hash: hash_password(&input.password)?,
        };
        let user = self.user_repo.create(&new_user).await.inspect_err(|e| {
            if matches!(e, AppError::Conflict(_)) {
                record_attempt("register", "conflict");
            }
        })?;

        let token = self.jwt.create_token(user.id.0, &user.name)?;
        record_attempt("register", "success");
        info!(user_id = %user.id, "User registered");

        Ok(AuthSession { user, token })
    }

    pub async fn login(&self, input: LoginInput) -> Result<AuthSession> {
        let email = normalize_email(&input.email);
        if email.is_empty() || input.password.is_empty() {
            return Err(AppError::BadRequest(
                "Please provide email and password".to_string(),
            ));
        }

        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            record_attempt("login", "failure");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !verify_password(&input.password, &user.password_hash)? {
            record_attempt("login", "failure");
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.jwt.create_token(user.id.0, &user.name)?;
        record_attempt("login", "success");

        Ok(AuthSession { user, token })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn record_attempt(action: &'static str, result: &'static str) {
    counter!("jobboard_auth_attempts_total", "action" => action, "result" => result).increment(1);
}

/// Hash a password into an argon2 PHC string
pub(crate) fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid hash format: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
