//! Privacy levels and per-surface privacy settings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audience a piece of content is visible to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    #[sea_orm(string_value = "public")]
    Public,
    #[sea_orm(string_value = "friends")]
    Friends,
    #[sea_orm(string_value = "private")]
    Private,
}

impl PrivacyLevel {
    /// Parse a wire value, rejecting anything outside the three levels.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Self::Public),
            "friends" => Some(Self::Friends),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

/// Profile surfaces that carry their own privacy level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Profile,
    Posts,
    Friends,
    Photos,
}

impl Surface {
    /// Parse a settings key.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "profile" => Some(Self::Profile),
            "posts" => Some(Self::Posts),
            "friends" => Some(Self::Friends),
            "photos" => Some(Self::Photos),
            _ => None,
        }
    }
}

/// Stored shape of `user.privacy_settings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacySettings {
    #[serde(default = "public")]
    pub profile: PrivacyLevel,
    #[serde(default = "friends")]
    pub posts: PrivacyLevel,
    #[serde(default = "friends")]
    pub friends: PrivacyLevel,
    #[serde(default = "friends")]
    pub photos: PrivacyLevel,
}

const fn public() -> PrivacyLevel {
    PrivacyLevel::Public
}

const fn friends() -> PrivacyLevel {
    PrivacyLevel::Friends
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            profile: PrivacyLevel::Public,
            posts: PrivacyLevel::Friends,
            friends: PrivacyLevel::Friends,
            photos: PrivacyLevel::Friends,
        }
    }
}

impl PrivacySettings {
    /// Read settings from a JSON column; missing or malformed keys fall back to defaults.
    #[must_use]
    pub fn from_json(value: &Json) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    /// Serialize for storage.
    #[must_use]
    pub fn to_json(&self) -> Json {
        serde_json::json!({
            "profile": self.profile,
            "posts": self.posts,
            "friends": self.friends,
            "photos": self.photos,
        })
    }

    /// Level configured for a surface.
    #[must_use]
    pub const fn level(&self, surface: Surface) -> PrivacyLevel {
        match surface {
            Surface::Profile => self.profile,
            Surface::Posts => self.posts,
            Surface::Friends => self.friends,
            Surface::Photos => self.photos,
        }
    }

    /// Change the level of one surface.
    pub const fn set(&mut self, surface: Surface, level: PrivacyLevel) {
        match surface {
            Surface::Profile => self.profile = level,
            Surface::Posts => self.posts = level,
            Surface::Friends => self.friends = level,
            Surface::Photos => self.photos = level,
        }
    }
}
