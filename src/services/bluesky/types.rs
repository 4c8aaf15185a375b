//! Bluesky response shapes

use serde::{Deserialize, Serialize};

use super::paginator::CursorPage;

/// Profile view as returned in follower/follow listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub did: String,
    pub handle: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<String>,
    pub created_at: Option<String>,
    pub indexed_at: Option<String>,
}

/// Full profile from `app.bsky.actor.getProfile`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileViewDetailed {
    pub did: String,
    pub handle: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<String>,
    pub banner: Option<String>,
    pub followers_count: Option<u64>,
    pub follows_count: Option<u64>,
    pub posts_count: Option<u64>,
    pub created_at: Option<String>,
    pub indexed_at: Option<String>,
}

/// One page of `app.bsky.graph.getFollowers`
#[derive(Debug, Deserialize)]
pub struct FollowersPage {
    pub followers: Vec<ProfileView>,
    #[serde(default)]
    pub cursor: Option<String>,
}

impl CursorPage for FollowersPage {
    type Item = ProfileView;

    fn into_parts(self) -> (Vec<ProfileView>, Option<String>) {
        (self.followers, self.cursor)
    }
}

/// One page of `app.bsky.graph.getFollows`
#[derive(Debug, Deserialize)]
pub struct FollowsPage {
    pub follows: Vec<ProfileView>,
    #[serde(default)]
    pub cursor: Option<String>,
}

impl CursorPage for FollowsPage {
    type Item = ProfileView;

    fn into_parts(self) -> (Vec<ProfileView>, Option<String>) {
        (self.follows, self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_followers_page_ignores_unknown_fields() {
        let page: FollowersPage = serde_json::from_str(
            r#"{
                "subject": {"did": "did:plc:abc", "handle": "artist.test"},
                "followers": [
                    {"did": "did:plc:f1", "handle": "reader.test", "displayName": "Reader", "labels": []}
                ],
                "cursor": "3kxyz"
            }"#,
        )
        .unwrap();

        let (items, cursor) = page.into_parts();
        assert_eq!(cursor.as_deref(), Some("3kxyz"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].display_name.as_deref(), Some("Reader"));
    }

    #[test]
    fn test_last_page_has_no_cursor() {
        let page: FollowsPage = serde_json::from_str(r#"{"follows": []}"#).unwrap();
        assert_eq!(page.into_parts(), (Vec::new(), None));
    }

    #[test]
    fn test_page_without_items_is_rejected() {
        assert!(serde_json::from_str::<FollowersPage>(r#"{"cursor": "a"}"#).is_err());
    }

    #[test]
    fn test_detailed_profile_counts() {
        let profile: ProfileViewDetailed = serde_json::from_str(
            r#"{"did": "did:plc:abc", "handle": "artist.test", "followersCount": 250, "followsCount": 12}"#,
        )
        .unwrap();
        assert_eq!(profile.followers_count, Some(250));
        assert_eq!(profile.posts_count, None);
    }
}
