//! Post visibility resolution.
//!
//! Given who is asking (possibly nobody) and the listing filters they sent,
//! work out which posts they may see. The output is a declarative
//! [`VisibilityQuery`] that the post repository translates into a store
//! predicate; resolution itself is pure and never fails. Malformed input
//! (unparsable dates) is rejected at the route boundary before it gets here.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Listing filters as they arrive from the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    pub search: Option<String>,
    pub published_only: bool,
    pub own_only: bool,
    pub draft_only: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Base scope of a visibility query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    /// Published posts only.
    Published,
    /// The requester's own drafts.
    OwnDrafts(Uuid),
    /// Published posts plus the requester's own posts in any status.
    PublishedOrOwn(Uuid),
}

/// A resolved visibility query. The scope and every narrowing clause are
/// intersected by the store layer.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityQuery {
    pub scope: PostScope,
    /// Extra owner narrowing requested via `own_only`.
    pub owner: Option<Uuid>,
    /// Case-insensitive substring match against title or body.
    pub search: Option<String>,
    /// Inclusive lower bound on creation time.
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on creation time.
    pub created_until: Option<DateTime<Utc>>,
}

impl VisibilityQuery {
    /// Resolve a requester and their filters into a query.
    ///
    /// Scope rules, evaluated in order:
    ///
    /// 1. `draft_only` with an identity scopes to that user's drafts.
    ///    An anonymous caller asking for drafts falls through silently.
    /// 2. Otherwise `published_only` scopes to published posts.
    /// 3. Otherwise an identity sees published posts plus their own,
    ///    whatever the status.
    /// 4. Otherwise (anonymous, no flags) published posts.
    ///
    /// `own_only` narrows to the requester's posts unless `draft_only`
    /// already did. A search term and date bounds always intersect with
    /// the scope, never replace it. Date bounds are inclusive calendar
    /// days in UTC: start of day for the lower bound, 23:59:59.999 for
    /// the upper.
    pub fn resolve(requester: Option<Uuid>, filter: &PostFilter) -> Self {
        let scope = match requester {
            Some(uid) if filter.draft_only => PostScope::OwnDrafts(uid),
            _ if filter.published_only => PostScope::Published,
            Some(uid) => PostScope::PublishedOrOwn(uid),
            None => PostScope::Published,
        };

        let owner = match requester {
            Some(uid) if filter.own_only && !filter.draft_only => Some(uid),
            _ => None,
        };

        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        let created_from = filter
            .start_date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc());

        let created_until = filter
            .end_date
            .and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999))
            .map(|dt| dt.and_utc());

        Self {
            scope,
            owner,
            search,
            created_from,
            created_until,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn filter() -> PostFilter {
        PostFilter::default()
    }

    #[test]
    fn anonymous_with_no_flags_sees_published_only() {
        let q = VisibilityQuery::resolve(None, &filter());
        assert_eq!(q.scope, PostScope::Published);
        assert_eq!(q.owner, None);
        assert_eq!(q.search, None);
    }

    #[test]
    fn authenticated_default_is_published_or_own() {
        let uid = Uuid::new_v4();
        let q = VisibilityQuery::resolve(Some(uid), &filter());
        assert_eq!(q.scope, PostScope::PublishedOrOwn(uid));
        assert_eq!(q.owner, None);
    }

    #[test]
    fn draft_only_with_identity_scopes_to_own_drafts() {
        let uid = Uuid::new_v4();
        let q = VisibilityQuery::resolve(
            Some(uid),
            &PostFilter {
                draft_only: true,
                ..filter()
            },
        );
        assert_eq!(q.scope, PostScope::OwnDrafts(uid));
    }

    #[test]
    fn anonymous_draft_only_falls_through_to_published() {
        // The draft branch requires an identity; without one the request
        // behaves exactly like an unflagged anonymous listing.
        let q = VisibilityQuery::resolve(
            None,
            &PostFilter {
                draft_only: true,
                ..filter()
            },
        );
        assert_eq!(q, VisibilityQuery::resolve(None, &filter()));
        assert_eq!(q.scope, PostScope::Published);
    }

    #[test]
    fn published_only_wins_over_authenticated_default() {
        let uid = Uuid::new_v4();
        let q = VisibilityQuery::resolve(
            Some(uid),
            &PostFilter {
                published_only: true,
                ..filter()
            },
        );
        assert_eq!(q.scope, PostScope::Published);
    }

    #[test]
    fn draft_only_beats_published_only_when_authenticated() {
        let uid = Uuid::new_v4();
        let q = VisibilityQuery::resolve(
            Some(uid),
            &PostFilter {
                draft_only: true,
                published_only: true,
                ..filter()
            },
        );
        assert_eq!(q.scope, PostScope::OwnDrafts(uid));
    }

    #[test]
    fn own_only_with_published_only_narrows_to_owner() {
        let uid = Uuid::new_v4();
        let q = VisibilityQuery::resolve(
            Some(uid),
            &PostFilter {
                published_only: true,
                own_only: true,
                ..filter()
            },
        );
        assert_eq!(q.scope, PostScope::Published);
        assert_eq!(q.owner, Some(uid));
    }

    #[test]
    fn own_only_is_ignored_when_draft_only_already_scoped() {
        let uid = Uuid::new_v4();
        let q = VisibilityQuery::resolve(
            Some(uid),
            &PostFilter {
                draft_only: true,
                own_only: true,
                ..filter()
            },
        );
        assert_eq!(q.scope, PostScope::OwnDrafts(uid));
        assert_eq!(q.owner, None);
    }

    #[test]
    fn own_only_is_ignored_for_anonymous_callers() {
        let q = VisibilityQuery::resolve(
            None,
            &PostFilter {
                own_only: true,
                ..filter()
            },
        );
        assert_eq!(q.owner, None);
    }

    #[test]
    fn search_intersects_with_authenticated_scope() {
        // A search term narrows the "published or own" scope; it must not
        // replace it.
        let uid = Uuid::new_v4();
        let q = VisibilityQuery::resolve(
            Some(uid),
            &PostFilter {
                search: Some("foo".into()),
                ..filter()
            },
        );
        assert_eq!(q.scope, PostScope::PublishedOrOwn(uid));
        assert_eq!(q.search.as_deref(), Some("foo"));
    }

    #[test]
    fn blank_search_is_dropped() {
        let q = VisibilityQuery::resolve(
            None,
            &PostFilter {
                search: Some("   ".into()),
                ..filter()
            },
        );
        assert_eq!(q.search, None);
    }

    #[test]
    fn search_is_trimmed() {
        let q = VisibilityQuery::resolve(
            None,
            &PostFilter {
                search: Some("  foo  ".into()),
                ..filter()
            },
        );
        assert_eq!(q.search.as_deref(), Some("foo"));
    }

    #[test]
    fn date_window_covers_whole_days_utc() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let q = VisibilityQuery::resolve(
            None,
            &PostFilter {
                start_date: Some(start),
                end_date: Some(end),
                ..filter()
            },
        );

        let from = q.created_from.unwrap();
        assert_eq!(from.date_naive(), start);
        assert_eq!((from.hour(), from.minute(), from.second()), (0, 0, 0));

        let until = q.created_until.unwrap();
        assert_eq!(until.date_naive(), end);
        assert_eq!(
            (until.hour(), until.minute(), until.second()),
            (23, 59, 59)
        );
        assert_eq!(until.timestamp_subsec_millis(), 999);
    }

    #[test]
    fn single_sided_date_bounds_are_allowed() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let q = VisibilityQuery::resolve(
            None,
            &PostFilter {
                start_date: Some(start),
                ..filter()
            },
        );
        assert!(q.created_from.is_some());
        assert!(q.created_until.is_none());
    }

    #[test]
    fn search_and_dates_combine_with_scope() {
        let uid = Uuid::new_v4();
        let q = VisibilityQuery::resolve(
            Some(uid),
            &PostFilter {
                search: Some("foo".into()),
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
                end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
                ..filter()
            },
        );
        assert_eq!(q.scope, PostScope::PublishedOrOwn(uid));
        assert!(q.search.is_some());
        assert!(q.created_from.is_some() && q.created_until.is_some());
    }
}
