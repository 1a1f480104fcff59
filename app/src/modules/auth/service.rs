use super::jwt::{self, Claims};
use super::session::{SessionId, SESSION_DAYS_DURATION};
use crate::services::google::GoogleProfile;
use anyhow::Result;
use bcrypt::verify;
use chrono::{Duration, Utc};
use entity::{sea_orm_active_enums::UserRole, traits::QueryableByEmail, user};
use rand_chacha::ChaCha8Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use tracing::info;

pub enum UserFromCredentialsError {
    NotFound,
    InternalError,
    InvalidPassword,
}

#[derive(Clone)]
pub struct AuthService {
    rng: Arc<Mutex<ChaCha8Rng>>,
    db: DatabaseConnection,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, rng: ChaCha8Rng) -> Self {
        AuthService {
            db,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    fn generate_session_id(&self) -> Result<SessionId> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| anyhow::anyhow!("session rng mutex poisoned"))?;

        Ok(SessionId::generate_new(&mut rng))
    }

    /// generates a new session token and creates a new session record on the DB for the user
    pub async fn new_session(
        &self,
        user_id: i32,
        client_ip: IpAddr,
        client_user_agent: String,
    ) -> Result<SessionId> {
        let ses_token = self.generate_session_id()?;

        let new_session = entity::session::ActiveModel {
            ip: Set(client_ip.to_string()),
            user_agent: Set(client_user_agent),
            created_at: Set(Utc::now().into()),
            expires_at: Set((Utc::now() + Duration::days(SESSION_DAYS_DURATION)).into()),
            user_id: Set(user_id),
            session_token: Set(ses_token.into_database_value()),
        };

        new_session.insert(&self.db).await?;

        Ok(ses_token)
    }

    /// deletes a session by its token
    pub async fn delete_session(&self, session_id: &SessionId) -> Result<()> {
        entity::session::Entity::delete_many()
            .filter(entity::session::Column::SessionToken.eq(session_id.into_database_value()))
            .exec(&self.db)
            .await?;

        Ok(())
    }

    /// gets the user from the session token if the session is not expired
    pub async fn get_user_from_session_id(
        &self,
        session_id: SessionId,
    ) -> Result<Option<user::Model>> {
        let user = user::Entity::find()
            .inner_join(entity::session::Entity)
            .filter(entity::session::Column::ExpiresAt.gt(Utc::now()))
            .filter(entity::session::Column::SessionToken.eq(session_id.into_database_value()))
            .one(&self.db)
            .await?;

        Ok(user)
    }

    /// gets the user from a JWT created by `gen_user_token`, returns `None` for
    /// invalid or expired tokens and deleted users
    pub async fn get_user_from_token(&self, token: &str) -> Result<Option<user::Model>> {
        let user_id = match jwt::decode(token).ok().and_then(|t| t.claims.user_id()) {
            Some(id) => id,
            None => return Ok(None),
        };

        Ok(user::Entity::find_by_id(user_id).one(&self.db).await?)
    }

    pub fn gen_user_token(&self, user_id: i32) -> Result<String> {
        Ok(jwt::encode(&Claims::for_user(user_id))?)
    }

    /// finds a user from email and plain text password, verifying the password
    pub async fn get_user_from_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<user::Model, UserFromCredentialsError> {
        let user = user::Entity::find_by_email(email, &self.db)
            .await
            .or(Err(UserFromCredentialsError::InternalError))?
            .ok_or(UserFromCredentialsError::NotFound)?;

        // users created with google do not have a password to sign in with
        let hash = user
            .password
            .as_deref()
            .ok_or(UserFromCredentialsError::InvalidPassword)?;

        let pass_is_valid =
            verify(password, hash).or(Err(UserFromCredentialsError::InternalError))?;

        if !pass_is_valid {
            return Err(UserFromCredentialsError::InvalidPassword);
        }

        Ok(user)
    }

    /// checks if a email is in use by a user
    pub async fn check_email_in_use(&self, email: &str) -> Result<bool> {
        Ok(user::Entity::find_by_email(email, &self.db).await?.is_some())
    }

    /// creates a user with the `user` role, the password is hashed before persisting
    pub async fn register_user(
        &self,
        email: String,
        password: String,
        first_name: String,
        last_name: String,
    ) -> Result<user::Model> {
        let created = user::ActiveModel {
            display_name: Set(format!("{} {}", first_name, last_name)),
            email: Set(email),
            password: Set(Some(password)),
            first_name: Set(first_name),
            last_name: Set(last_name),
            role: Set(UserRole::User),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(created)
    }

    /// finds the user of a google account, linking it to a existing user with the same
    /// email or creating a new one when there is none
    pub async fn find_or_create_google_user(&self, profile: GoogleProfile) -> Result<user::Model> {
        let by_google_id = user::Entity::find()
            .filter(user::Column::GoogleId.eq(profile.sub.as_str()))
            .one(&self.db)
            .await?;

        if let Some(user) = by_google_id {
            return Ok(user);
        }

        if let Some(existing) = user::Entity::find_by_email(&profile.email, &self.db).await? {
            info!("[AUTH] linking google account to user {}", existing.id);

            let mut to_link: user::ActiveModel = existing.into();
            to_link.google_id = Set(Some(profile.sub));

            return Ok(to_link.update(&self.db).await?);
        }

        let first_name = profile.given_name.unwrap_or_default();
        let last_name = profile.family_name.unwrap_or_default();

        let display_name = profile
            .name
            .unwrap_or_else(|| format!("{} {}", first_name, last_name).trim().to_string());

        let created = user::ActiveModel {
            google_id: Set(Some(profile.sub)),
            email: Set(profile.email),
            password: Set(None),
            display_name: Set(display_name),
            first_name: Set(first_name),
            last_name: Set(last_name),
            profile_photo: Set(profile.picture),
            role: Set(UserRole::User),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("[AUTH] created user {} from google account", created.id);

        Ok(created)
    }
}
