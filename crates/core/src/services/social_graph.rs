//! Friendship graph algorithms.
//!
//! Adjacency is derived from edge rows on every call; these functions only
//! see the rows a repository query returned and never touch the store.

use std::collections::{BTreeMap, BTreeSet};

use agora_db::entities::friend_request::{self, FriendshipStatus};

/// A ranked friend suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedCandidate {
    /// Suggested user.
    pub user_id: String,
    /// Number of the user's friends who are also friends with the candidate.
    pub mutual_friends: usize,
}

/// Users connected to `user_id` through an accepted edge.
#[must_use]
pub fn adjacency(user_id: &str, edges: &[friend_request::Model]) -> BTreeSet<String> {
    edges
        .iter()
        .filter(|edge| edge.status == FriendshipStatus::Accepted)
        .filter_map(|edge| edge.other_party(user_id))
        .map(str::to_string)
        .collect()
}

/// Users adjacent to both sides.
#[must_use]
pub fn mutual(a: &BTreeSet<String>, b: &BTreeSet<String>) -> BTreeSet<String> {
    a.intersection(b).cloned().collect()
}

/// Rank friends-of-friends for `user_id`.
///
/// * `friends` is the adjacency of `user_id`.
/// * `friend_edges` are the accepted edges touching any of those friends.
/// * `connected` holds every user sharing an edge of any status with
///   `user_id`; they are never suggested.
///
/// Candidates are ordered by mutual friend count, highest first, then by id.
#[must_use]
pub fn rank_suggestions(
    user_id: &str,
    friends: &BTreeSet<String>,
    friend_edges: &[friend_request::Model],
    connected: &BTreeSet<String>,
    limit: usize,
) -> Vec<RankedCandidate> {
    let mut via: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for edge in friend_edges {
        if edge.status != FriendshipStatus::Accepted {
            continue;
        }
        for (friend, candidate) in [
            (&edge.requester_id, &edge.recipient_id),
            (&edge.recipient_id, &edge.requester_id),
        ] {
            if !friends.contains(friend)
                || candidate == user_id
                || friends.contains(candidate)
                || connected.contains(candidate)
            {
                continue;
            }
            via.entry(candidate.as_str())
                .or_default()
                .insert(friend.as_str());
        }
    }

    let mut ranked: Vec<RankedCandidate> = via
        .into_iter()
        .map(|(candidate, through)| RankedCandidate {
            user_id: candidate.to_string(),
            mutual_friends: through.len(),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.mutual_friends
            .cmp(&a.mutual_friends)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreeset;

    fn edge(requester: &str, recipient: &str, status: FriendshipStatus) -> friend_request::Model {
        friend_request::Model {
            id: format!("{requester}-{recipient}"),
            requester_id: requester.to_string(),
            recipient_id: recipient.to_string(),
            status,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn accepted(requester: &str, recipient: &str) -> friend_request::Model {
        edge(requester, recipient, FriendshipStatus::Accepted)
    }

    #[test]
    fn test_adjacency_ignores_direction_and_non_accepted() {
        let edges = vec![
            accepted("a", "b"),
            accepted("c", "a"),
            edge("a", "d", FriendshipStatus::Pending),
            edge("e", "a", FriendshipStatus::Declined),
        ];

        assert_eq!(
            adjacency("a", &edges),
            btreeset! {"b".to_string(), "c".to_string()}
        );
    }

    #[test]
    fn test_mutual_is_symmetric() {
        let a = btreeset! {"x".to_string(), "y".to_string(), "z".to_string()};
        let b = btreeset! {"y".to_string(), "z".to_string(), "w".to_string()};

        assert_eq!(mutual(&a, &b), mutual(&b, &a));
        assert_eq!(mutual(&a, &b), btreeset! {"y".to_string(), "z".to_string()});
    }

    #[test]
    fn test_suggestions_scored_by_mutual_friends() {
        // me -- f1, me -- f2; f1 -- x, f2 -- x, f1 -- y
        let friends = btreeset! {"f1".to_string(), "f2".to_string()};
        let friend_edges = vec![
            accepted("me", "f1"),
            accepted("f2", "me"),
            accepted("f1", "x"),
            accepted("x", "f2"),
            accepted("f1", "y"),
        ];
        let connected = friends.clone();

        let ranked = rank_suggestions("me", &friends, &friend_edges, &connected, 20);

        assert_eq!(
            ranked,
            vec![
                RankedCandidate {
                    user_id: "x".to_string(),
                    mutual_friends: 2
                },
                RankedCandidate {
                    user_id: "y".to_string(),
                    mutual_friends: 1
                },
            ]
        );
    }

    #[test]
    fn test_suggestions_exclude_self_friends_and_connected() {
        // f1 and f2 are friends with each other; z has a declined edge with me.
        let friends = btreeset! {"f1".to_string(), "f2".to_string()};
        let friend_edges = vec![
            accepted("me", "f1"),
            accepted("me", "f2"),
            accepted("f1", "f2"),
            accepted("f1", "z"),
            accepted("f2", "q"),
        ];
        let connected = btreeset! {"f1".to_string(), "f2".to_string(), "z".to_string()};

        let ranked = rank_suggestions("me", &friends, &friend_edges, &connected, 20);
        let ids: Vec<_> = ranked.iter().map(|c| c.user_id.as_str()).collect();

        assert_eq!(ids, vec!["q"]);
    }

    #[test]
    fn test_suggestions_ties_by_id_and_truncated() {
        let friends = btreeset! {"f".to_string()};
        let friend_edges = vec![accepted("f", "c"), accepted("f", "a"), accepted("b", "f")];

        let ranked = rank_suggestions("me", &friends, &friend_edges, &friends, 2);
        let ids: Vec<_> = ranked.iter().map(|c| c.user_id.as_str()).collect();

        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_no_friends_no_suggestions() {
        let ranked = rank_suggestions("me", &BTreeSet::new(), &[], &BTreeSet::new(), 20);
        assert!(ranked.is_empty());
    }
}
