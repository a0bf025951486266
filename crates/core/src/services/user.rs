//! User service.

use std::collections::HashMap;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use agora_common::{AppError, AppResult, IdGenerator};
use agora_db::{
    entities::{
        PrivacyLevel, PrivacySettings, Surface,
        user::{self, Achievement, LifeEvent},
    },
    repositories::UserRepository,
};
use async_trait::async_trait;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use crate::{
    locks::KeyedLocks,
    services::{
        auth::AuthService,
        friendship::FriendshipService,
        visibility::{self, needs_friendship},
    },
};

/// Maximum number of results returned by user search.
const SEARCH_LIMIT: u64 = 20;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    friendship: FriendshipService,
    locks: KeyedLocks,
    id_gen: IdGenerator,
}

/// The public face of a user, shown next to posts, comments and friends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub is_verified: bool,
}

impl From<&user::Model> for UserSummary {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            avatar: user.avatar.clone(),
            is_verified: user.is_verified,
        }
    }
}

/// A user search hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub location: Option<String>,
    pub is_verified: bool,
}

/// A profile as seen by a particular viewer.
///
/// Viewers who fail the profile privacy check get the summary instead of an
/// error.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProfileView {
    Full(Box<user::Model>),
    Partial(UserSummary),
}

/// A signed-in user and their access token.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user: user::Model,
}

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(email, length(max = 256))]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub name: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Input for logging in.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1, max = 256))]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Input for updating a profile. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,

    #[validate(url, length(max = 512))]
    pub avatar: Option<String>,

    #[validate(url, length(max = 512))]
    pub cover_photo: Option<String>,

    #[validate(length(max = 2048))]
    pub bio: Option<String>,

    #[validate(length(max = 256))]
    pub location: Option<String>,

    #[validate(length(max = 256))]
    pub work: Option<String>,

    #[validate(length(max = 256))]
    pub education: Option<String>,

    #[validate(length(max = 64))]
    pub relationship_status: Option<String>,

    #[validate(length(max = 32))]
    pub birthday: Option<String>,

    #[validate(length(max = 64))]
    pub phone: Option<String>,

    #[validate(url, length(max = 512))]
    pub website: Option<String>,

    #[validate(length(max = 50))]
    pub interests: Option<Vec<String>>,

    pub privacy_settings: Option<HashMap<String, String>>,
}

/// Input for adding a life event. `event` and `date` are required.
#[derive(Debug, Default, Deserialize)]
pub struct LifeEventInput {
    pub event: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
}

/// Input for adding an achievement. Every field is required.
#[derive(Debug, Default, Deserialize)]
pub struct AchievementInput {
    pub icon: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(user_repo: UserRepository, friendship: FriendshipService) -> Self {
        Self {
            user_repo,
            friendship,
            locks: KeyedLocks::new(),
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user.
    pub async fn register(&self, input: RegisterInput) -> AppResult<Session> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let token = self.id_gen.generate_token();

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(email),
            name: Set(input.name.trim().to_string()),
            password_hash: Set(password_hash),
            token: Set(Some(token.clone())),
            avatar: Set(None),
            cover_photo: Set(None),
            bio: Set(None),
            location: Set(None),
            work: Set(None),
            education: Set(None),
            relationship_status: Set(None),
            birthday: Set(None),
            phone: Set(None),
            website: Set(None),
            interests: Set(serde_json::json!([])),
            is_verified: Set(false),
            privacy_settings: Set(PrivacySettings::default().to_json()),
            life_events: Set(serde_json::json!([])),
            achievements: Set(serde_json::json!([])),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        info!(user_id = %user.id, "User registered");

        Ok(Session { token, user })
    }

    /// Log in with email and password.
    pub async fn login(&self, input: LoginInput) -> AppResult<Session> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_email(input.email.trim())
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        if let Some(token) = user.token.clone() {
            return Ok(Session { token, user });
        }

        let token = self.id_gen.generate_token();
        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(token.clone()));
        let user = self.user_repo.update(active).await?;

        Ok(Session { token, user })
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Get a profile as `viewer_id` is allowed to see it.
    pub async fn get_profile(&self, viewer_id: &str, user_id: &str) -> AppResult<ProfileView> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let level = user.privacy().profile;

        let are_friends = if needs_friendship(viewer_id, user_id, level) {
            self.friendship.are_friends(viewer_id, user_id).await?
        } else {
            false
        };

        if visibility::can_view(viewer_id, user_id, level, are_friends) {
            Ok(ProfileView::Full(Box::new(user)))
        } else {
            debug!(viewer_id = %viewer_id, user_id = %user_id, "Serving partial profile");
            Ok(ProfileView::Partial(UserSummary::from(&user)))
        }
    }

    /// Update profile fields.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;
        let mut settings = user.privacy();
        let mut active: user::ActiveModel = user.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(avatar) = input.avatar {
            active.avatar = Set(Some(avatar));
        }
        if let Some(cover_photo) = input.cover_photo {
            active.cover_photo = Set(Some(cover_photo));
        }
        if let Some(bio) = input.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(location) = input.location {
            active.location = Set(Some(location));
        }
        if let Some(work) = input.work {
            active.work = Set(Some(work));
        }
        if let Some(education) = input.education {
            active.education = Set(Some(education));
        }
        if let Some(relationship_status) = input.relationship_status {
            active.relationship_status = Set(Some(relationship_status));
        }
        if let Some(birthday) = input.birthday {
            active.birthday = Set(Some(birthday));
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(website) = input.website {
            active.website = Set(Some(website));
        }
        if let Some(interests) = input.interests {
            active.interests = Set(serde_json::json!(interests));
        }
        if let Some(changes) = input.privacy_settings {
            apply_privacy_changes(&mut settings, &changes);
            active.privacy_settings = Set(settings.to_json());
        }

        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Change privacy levels.
    ///
    /// Unknown surfaces and unknown levels are skipped; the stored result is
    /// returned.
    pub async fn update_privacy(
        &self,
        user_id: &str,
        changes: &HashMap<String, String>,
    ) -> AppResult<PrivacySettings> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let mut settings = user.privacy();
        apply_privacy_changes(&mut settings, changes);

        let mut active: user::ActiveModel = user.into();
        active.privacy_settings = Set(settings.to_json());
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        let user = self.user_repo.update(active).await?;

        info!(user_id = %user_id, "Privacy settings updated");
        Ok(user.privacy())
    }

    /// Append a life event to the user's profile.
    pub async fn add_life_event(
        &self,
        user_id: &str,
        input: LifeEventInput,
    ) -> AppResult<LifeEvent> {
        let event = LifeEvent {
            id: self.id_gen.generate(),
            event: required(input.event, "event")?,
            date: required(input.date, "date")?,
            description: input.description.filter(|d| !d.trim().is_empty()),
            created_at: chrono::Utc::now(),
        };

        let _guard = self.locks.lock(user_id).await;
        let user = self.user_repo.get_by_id(user_id).await?;
        let mut events = user.life_event_list()?;
        events.push(event.clone());

        let mut active: user::ActiveModel = user.into();
        active.life_events = Set(serde_json::to_value(&events)?);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        self.user_repo.update(active).await?;

        info!(user_id = %user_id, event_id = %event.id, "Life event added");
        Ok(event)
    }

    /// Remove one of the user's life events.
    pub async fn delete_life_event(&self, user_id: &str, event_id: &str) -> AppResult<()> {
        let _guard = self.locks.lock(user_id).await;
        let user = self.user_repo.get_by_id(user_id).await?;
        let mut events = user.life_event_list()?;
        let before = events.len();
        events.retain(|e| e.id != event_id);
        if events.len() == before {
            return Err(AppError::NotFound("Event not found".to_string()));
        }

        let mut active: user::ActiveModel = user.into();
        active.life_events = Set(serde_json::to_value(&events)?);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        self.user_repo.update(active).await?;

        info!(user_id = %user_id, event_id = %event_id, "Life event deleted");
        Ok(())
    }

    /// Append an achievement to the user's profile.
    pub async fn add_achievement(
        &self,
        user_id: &str,
        input: AchievementInput,
    ) -> AppResult<Achievement> {
        let achievement = Achievement {
            id: self.id_gen.generate(),
            icon: required(input.icon, "icon")?,
            label: required(input.label, "label")?,
            description: required(input.description, "description")?,
            created_at: chrono::Utc::now(),
        };

        let _guard = self.locks.lock(user_id).await;
        let user = self.user_repo.get_by_id(user_id).await?;
        let mut achievements = user.achievement_list()?;
        achievements.push(achievement.clone());

        let mut active: user::ActiveModel = user.into();
        active.achievements = Set(serde_json::to_value(&achievements)?);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        self.user_repo.update(active).await?;

        info!(user_id = %user_id, achievement_id = %achievement.id, "Achievement added");
        Ok(achievement)
    }

    /// Search users by name or email, excluding the caller.
    pub async fn search(&self, query: &str, exclude_user_id: &str) -> AppResult<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(vec![]);
        }

        let users = self
            .user_repo
            .search(query, exclude_user_id, SEARCH_LIMIT)
            .await?;

        Ok(users
            .into_iter()
            .map(|u| SearchResult {
                id: u.id,
                name: u.name,
                avatar: u.avatar,
                location: u.location,
                is_verified: u.is_verified,
            })
            .collect())
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}

#[async_trait]
impl AuthService for UserService {
    async fn current_user(&self, token: &str) -> AppResult<user::Model> {
        self.authenticate_by_token(token).await
    }
}

/// A trimmed, non-blank value for a required input field.
fn required(value: Option<String>, field: &str) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Missing required field: {field}")))
}

fn apply_privacy_changes(settings: &mut PrivacySettings, changes: &HashMap<String, String>) {
    for (key, value) in changes {
        match (Surface::parse(key), PrivacyLevel::parse(value)) {
            (Some(surface), Some(level)) => settings.set(surface, level),
            _ => debug!(key = %key, value = %value, "Ignoring invalid privacy setting"),
        }
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
