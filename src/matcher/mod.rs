use crate::models::AppIdentifier;

/// Decides whether a foreground app is blocked.
///
/// Matching is first-match-wins over the blocklist in insertion order: with
/// overlapping keywords (`"insta"`, `"instagram"`), whichever was supplied
/// first is the one reported. Keywords are substrings, so `"instagram"` also
/// matches `"com.instagram.lite"`.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    self_id: AppIdentifier,
}

impl MatchEngine {
    pub fn new(self_id: AppIdentifier) -> Self {
        Self { self_id }
    }

    /// Returns the matched keyword, if any.
    pub fn matches(&self, app_id: &AppIdentifier, blocklist: &[AppIdentifier]) -> Option<AppIdentifier> {
        matches(app_id, blocklist, &self.self_id)
    }
}

pub fn matches(
    app_id: &AppIdentifier,
    blocklist: &[AppIdentifier],
    self_id: &AppIdentifier,
) -> Option<AppIdentifier> {
    // Our own corrective UI must never classify as blocked.
    if app_id.contains(self_id) {
        return None;
    }

    blocklist
        .iter()
        .find(|keyword| app_id.contains(keyword))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<AppIdentifier> {
        raw.iter().copied().map(AppIdentifier::new).collect()
    }

    fn engine() -> MatchEngine {
        MatchEngine::new(AppIdentifier::new("appwarden"))
    }

    #[test]
    fn test_matches_substring_keyword() {
        let blocklist = ids(&["instagram"]);
        let matched = engine().matches(&AppIdentifier::new("com.instagram.android"), &blocklist);
        assert_eq!(matched, Some(AppIdentifier::new("instagram")));
    }

    #[test]
    fn test_no_match_returns_none() {
        let blocklist = ids(&["instagram", "tiktok"]);
        assert_eq!(engine().matches(&AppIdentifier::new("com.maps.app"), &blocklist), None);
    }

    #[test]
    fn test_empty_blocklist_never_matches() {
        assert_eq!(engine().matches(&AppIdentifier::new("com.instagram.android"), &[]), None);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let blocklist = ids(&["YouTube"]);
        let matched = engine().matches(&AppIdentifier::new("COM.GOOGLE.ANDROID.YOUTUBE"), &blocklist);
        assert_eq!(matched, Some(AppIdentifier::new("youtube")));
    }

    #[test]
    fn test_self_exclusion_beats_any_blocklist() {
        let engine = engine();
        let own_apps = ["com.appwarden.app", "appwarden", "org.AppWarden.overlay"];
        let blocklists = [
            ids(&["com"]),
            ids(&["appwarden"]),
            ids(&["app", "warden", "overlay", "org"]),
        ];

        for app in own_apps {
            for blocklist in &blocklists {
                assert_eq!(engine.matches(&AppIdentifier::new(app), blocklist), None, "{app}");
            }
        }
    }

    #[test]
    fn test_first_match_wins_in_insertion_order() {
        let app = AppIdentifier::new("com.instagram.android");

        let first = ids(&["insta", "instagram"]);
        let second = ids(&["instagram", "insta"]);

        for _ in 0..10 {
            assert_eq!(engine().matches(&app, &first), Some(AppIdentifier::new("insta")));
            assert_eq!(engine().matches(&app, &second), Some(AppIdentifier::new("instagram")));
        }
    }

    #[test]
    fn test_substring_keyword_also_matches_variants() {
        let blocklist = ids(&["instagram"]);
        assert!(engine().matches(&AppIdentifier::new("com.instagramlite.android"), &blocklist).is_some());
    }
}
