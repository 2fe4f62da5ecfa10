//! Registration and authentication use-cases.
//!
//! # Invariants
//! - User names are unique after normalization (trim + lowercase).
//! - Plain passwords are length-checked, then hashed before storage.

use crate::model::user::{check_password_length, normalize_user_name, User};
use crate::model::ModelError;
use crate::password::PasswordHasher;
use crate::repo::{LibraryRepository, RepoError};
use crate::service::view::UserView;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AuthServiceResult<T> = Result<T, AuthServiceError>;

/// Service error for user registration and login.
#[derive(Debug)]
pub enum AuthServiceError {
    /// Another user already holds this name.
    NameNotUnique(String),
    /// No user with this name is stored.
    UnknownUser(String),
    /// Password does not match the stored hash.
    AuthenticationFailed,
    Model(ModelError),
    Repo(RepoError),
}

impl Display for AuthServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameNotUnique(user_name) => write!(f, "user name already taken: `{user_name}`"),
            Self::UnknownUser(user_name) => write!(f, "unknown user: `{user_name}`"),
            Self::AuthenticationFailed => write!(f, "user name or password is incorrect"),
            Self::Model(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Model(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for AuthServiceError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

impl From<RepoError> for AuthServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateUser(user_name) => Self::NameNotUnique(user_name),
            other => Self::Repo(other),
        }
    }
}

/// Use-case service for user accounts.
pub struct AuthService<'h, R: LibraryRepository> {
    repo: R,
    hasher: &'h dyn PasswordHasher,
}

impl<'h, R: LibraryRepository> AuthService<'h, R> {
    pub fn new(repo: R, hasher: &'h dyn PasswordHasher) -> Self {
        Self { repo, hasher }
    }

    /// Registers a user with a hashed password.
    ///
    /// # Errors
    /// - `NameNotUnique` when the normalized name is taken.
    /// - `Model` for a blank name or a password under 7 characters.
    pub fn add_user(&mut self, user_name: &str, password: &str) -> AuthServiceResult<UserView> {
        let normalized = normalize_user_name(user_name).ok_or(ModelError::InvalidUserName)?;
        if self.repo.get_user(&normalized)?.is_some() {
            return Err(AuthServiceError::NameNotUnique(normalized));
        }

        check_password_length(password)?;
        let user = User::new(&normalized, &self.hasher.hash(password))?;
        self.repo.add_user(&user)?;
        Ok(UserView::from(&user))
    }

    pub fn get_user(&self, user_name: &str) -> AuthServiceResult<UserView> {
        let user = self
            .repo
            .get_user(user_name)?
            .ok_or_else(|| AuthServiceError::UnknownUser(user_name.to_string()))?;
        Ok(UserView::from(&user))
    }

    /// Checks `password` against the stored hash of `user_name`.
    pub fn authenticate_user(&self, user_name: &str, password: &str) -> AuthServiceResult<()> {
        let user = self
            .repo
            .get_user(user_name)?
            .ok_or_else(|| AuthServiceError::UnknownUser(user_name.to_string()))?;
        if self.hasher.verify(password, user.password()) {
            Ok(())
        } else {
            Err(AuthServiceError::AuthenticationFailed)
        }
    }
}
