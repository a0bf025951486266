//! User entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::privacy::PrivacySettings;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Display name
    pub name: String,

    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Access token
    #[sea_orm(unique, nullable)]
    #[serde(skip_serializing)]
    pub token: Option<String>,

    #[sea_orm(nullable)]
    pub avatar: Option<String>,

    #[sea_orm(nullable)]
    pub cover_photo: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,

    #[sea_orm(nullable)]
    pub location: Option<String>,

    #[sea_orm(nullable)]
    pub work: Option<String>,

    #[sea_orm(nullable)]
    pub education: Option<String>,

    #[sea_orm(nullable)]
    pub relationship_status: Option<String>,

    #[sea_orm(nullable)]
    pub birthday: Option<String>,

    #[sea_orm(nullable)]
    pub phone: Option<String>,

    #[sea_orm(nullable)]
    pub website: Option<String>,

    /// List of interest tags
    #[sea_orm(column_type = "JsonBinary")]
    pub interests: Json,

    #[sea_orm(default_value = false)]
    pub is_verified: bool,

    /// Surface name -> privacy level, see [`PrivacySettings`]
    #[sea_orm(column_type = "JsonBinary")]
    pub privacy_settings: Json,

    /// Embedded [`LifeEvent`] list, oldest first
    #[sea_orm(column_type = "JsonBinary")]
    pub life_events: Json,

    /// Embedded [`Achievement`] list, oldest first
    #[sea_orm(column_type = "JsonBinary")]
    pub achievements: Json,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Typed view of the privacy settings column.
    #[must_use]
    pub fn privacy(&self) -> PrivacySettings {
        PrivacySettings::from_json(&self.privacy_settings)
    }

    /// Decoded life events.
    pub fn life_event_list(&self) -> Result<Vec<LifeEvent>, serde_json::Error> {
        if self.life_events.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(self.life_events.clone())
    }

    /// Decoded achievements.
    pub fn achievement_list(&self) -> Result<Vec<Achievement>, serde_json::Error> {
        if self.achievements.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(self.achievements.clone())
    }
}

/// A dated milestone shown on the profile timeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeEvent {
    pub id: String,
    pub event: String,
    /// Free-form date as entered by the user
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A badge shown on the profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub icon: String,
    pub label: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_with(life_events: Json, achievements: Json) -> Model {
        Model {
            id: "alice".to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            password_hash: String::new(),
            token: None,
            avatar: None,
            cover_photo: None,
            bio: None,
            location: None,
            work: None,
            education: None,
            relationship_status: None,
            birthday: None,
            phone: None,
            website: None,
            interests: json!([]),
            is_verified: false,
            privacy_settings: PrivacySettings::default().to_json(),
            life_events,
            achievements,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_decode_life_events_and_achievements() {
        let user = user_with(
            json!([
                {"id": "e1", "event": "Moved to Lisbon", "date": "2024-03", "created_at": "2025-01-01T00:00:00Z"},
            ]),
            json!([
                {"id": "a1", "icon": "star", "label": "Founder", "description": "Started it", "created_at": "2025-01-01T00:00:00Z"},
            ]),
        );

        let events = user.life_event_list().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "Moved to Lisbon");
        assert_eq!(events[0].description, None);

        let achievements = user.achievement_list().unwrap();
        assert_eq!(achievements[0].label, "Founder");
    }

    #[test]
    fn test_null_profile_collections_are_empty() {
        let user = user_with(Json::Null, Json::Null);
        assert!(user.life_event_list().unwrap().is_empty());
        assert!(user.achievement_list().unwrap().is_empty());
    }
}
