//! Visibility rules for profiles and posts.
//!
//! Every read path asks the same question: given how the viewer relates to the
//! owner, does the privacy level of the surface let them through? Profile
//! surfaces are keyed by the owner's `privacy_settings`; posts carry their own
//! `privacy` field, independent of the author's settings.

use agora_db::entities::PrivacyLevel;

/// How a viewer relates to the owner of some content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    /// The viewer owns the content.
    Owner,
    /// An accepted friendship edge connects viewer and owner.
    Friend,
    /// Anyone else.
    Stranger,
}

impl Relationship {
    /// Classify `viewer_id` relative to `owner_id`.
    #[must_use]
    pub fn resolve(viewer_id: &str, owner_id: &str, are_friends: bool) -> Self {
        if viewer_id == owner_id {
            Self::Owner
        } else if are_friends {
            Self::Friend
        } else {
            Self::Stranger
        }
    }

    /// Whether this relationship passes `level`.
    #[must_use]
    pub const fn allows(self, level: PrivacyLevel) -> bool {
        match level {
            PrivacyLevel::Public => true,
            PrivacyLevel::Friends => matches!(self, Self::Owner | Self::Friend),
            PrivacyLevel::Private => matches!(self, Self::Owner),
        }
    }

    /// Post privacy levels this relationship may read.
    #[must_use]
    pub const fn visible_levels(self) -> &'static [PrivacyLevel] {
        match self {
            Self::Owner => &[
                PrivacyLevel::Public,
                PrivacyLevel::Friends,
                PrivacyLevel::Private,
            ],
            Self::Friend => &[PrivacyLevel::Public, PrivacyLevel::Friends],
            Self::Stranger => &[PrivacyLevel::Public],
        }
    }
}

/// Whether `viewer_id` may see content owned by `owner_id` at `level`.
#[must_use]
pub fn can_view(viewer_id: &str, owner_id: &str, level: PrivacyLevel, are_friends: bool) -> bool {
    Relationship::resolve(viewer_id, owner_id, are_friends).allows(level)
}

/// Whether answering `level` needs a friendship lookup at all.
///
/// Public and private levels, and the owner's own reads, are decided without
/// consulting the graph.
#[must_use]
pub fn needs_friendship(viewer_id: &str, owner_id: &str, level: PrivacyLevel) -> bool {
    level == PrivacyLevel::Friends && viewer_id != owner_id
}
