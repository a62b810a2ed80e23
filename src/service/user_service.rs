//! User registration and maintenance.
//!
//! A user is only persisted once its location has been resolved to an
//! address; a failed resolution aborts the whole operation.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::fields;
use crate::models::User;
use crate::query::Predicate;
use crate::resolve::{AddressResolver, KeyedLocks, Resolution};
use crate::store::Repository;

const ENTITY: &str = "User";

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub location: Resolution,
}

/// Partial update; absent fields keep their current value
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub location: Option<Resolution>,
}

pub struct UserService {
    users: Arc<dyn Repository<User>>,
    resolver: Arc<AddressResolver>,
    /// Serializes claims on one email between the uniqueness check and the write
    email_locks: KeyedLocks,
}

impl UserService {
    pub fn new(users: Arc<dyn Repository<User>>, resolver: Arc<AddressResolver>) -> Self {
        Self {
            users,
            resolver,
            email_locks: KeyedLocks::new(),
        }
    }

    pub async fn register(&self, data: NewUser) -> Result<User> {
        let _claim = self.email_locks.lock(email_key(&data.email)).await;
        self.ensure_email_free(&data.email, None).await?;

        let address = self.resolver.resolve(&data.location).await?;
        let user = self
            .users
            .create(User::new(data.name, data.email, address.id))
            .await?;

        info!("Registered user {} at address {}", user.id, address.id);
        Ok(user)
    }

    pub async fn update(&self, id: Uuid, data: UserUpdate) -> Result<User> {
        let _claim = match &data.email {
            Some(email) => Some(self.email_locks.lock(email_key(email)).await),
            None => None,
        };
        let mut user = self.get(id).await?;

        if let Some(email) = data.email {
            if email != user.email {
                self.ensure_email_free(&email, Some(id)).await?;
            }
            user.email = email;
        }
        if let Some(name) = data.name {
            user.name = name;
        }
        if let Some(location) = &data.location {
            user.address_id = self.resolver.resolve(location).await?.id;
        }

        self.users
            .replace(user)
            .await?
            .ok_or(Error::NotFound { entity: ENTITY, id })
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        Ok(self.users.find_all().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(Error::NotFound { entity: ENTITY, id })
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let predicate = Predicate::new().equals(fields::EMAIL, email).not_deleted();
        Ok(self.users.find_one(&predicate).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if self.users.soft_delete(id).await? {
            info!("Deleted user {}", id);
            Ok(())
        } else {
            Err(Error::NotFound { entity: ENTITY, id })
        }
    }

    async fn ensure_email_free(&self, email: &str, owner: Option<Uuid>) -> Result<()> {
        match self.find_by_email(email).await? {
            Some(existing) if Some(existing.id) != owner => {
                Err(Error::Conflict(format!("email {} is already registered", email)))
            }
            _ => Ok(()),
        }
    }
}

fn email_key(email: &str) -> String {
    format!("email:{}", email.trim().to_lowercase())
}
