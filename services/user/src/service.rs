//! User business service

use std::sync::Arc;

use common::{Error, Result, response::format_datetime};
use tracing::{info, warn};

use crate::{
    jwt::TokenIssuer,
    models::{NewUser, User},
    password::{hash_password, verify_dummy, verify_password},
    repository::UserRepository,
};

pub struct UserService {
    repository: Arc<dyn UserRepository>,
    tokens: TokenIssuer,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, tokens: TokenIssuer) -> Self {
        Self { repository, tokens }
    }

    /// Exchange credentials for a session token.
    ///
    /// Unknown emails, lookup failures and wrong passwords all surface as the
    /// same `Unauthorized` error.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let user = match self.repository.get(email).await {
            Ok(user) => user,
            Err(e) => {
                warn!("Login rejected for {}: {:#}", email, e);
                verify_dummy(password);
                return Err(Error::unauthorized());
            }
        };

        if !verify_password(&user.password, password) {
            warn!("Login rejected for {}: password mismatch", email);
            return Err(Error::unauthorized());
        }

        let token = self.tokens.generate(&user.email)?;
        info!("User logged in: {}", user.email);
        Ok(token)
    }

    /// Hash the credential, then store the user
    pub async fn add(&self, new_user: NewUser) -> Result<User> {
        let password = hash_password(&new_user.password)?;

        let user = User {
            email: new_user.email,
            password,
            created_at: format_datetime(new_user.created_at),
            updated_at: format_datetime(new_user.updated_at),
        };

        let user = self.repository.put(user).await?;
        info!("User added: {}", user.email);
        Ok(user)
    }

    pub async fn delete(&self, email: &str) -> Result<()> {
        self.repository.delete(email).await
    }
}
