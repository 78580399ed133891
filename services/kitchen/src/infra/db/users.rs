use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};

use larder_kitchen_schema::users;

use super::is_unique_violation;
use crate::domain::repository::UserRepository;
use crate::domain::types::{NewUser, User};
use crate::error::KitchenServiceError;

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, KitchenServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, KitchenServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &NewUser) -> Result<User, KitchenServiceError> {
        let now = Utc::now();
        let result = users::ActiveModel {
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            role: Set(i16::from(user.role)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(model) => Ok(user_from_model(model)),
            Err(e) if is_unique_violation(&e) => Err(KitchenServiceError::UserAlreadyExists),
            Err(e) => Err(anyhow::Error::from(e).context("create user").into()),
        }
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        role: u8::try_from(model.role).unwrap_or_default(),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
