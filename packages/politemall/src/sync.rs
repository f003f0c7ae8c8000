//! End-to-end flows that feed crawler output into a [`Store`].

use serde::Serialize;
use tracing::{info, instrument};

use crate::api::LmsApi;
use crate::crawler::Crawler;
use crate::error::Result;
use crate::store::Store;
use crate::types::{Module, School, Unit, User};

/// Outcome of a full [`sync_user`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub user: User,
    pub school: School,
    pub semesters: usize,
    pub modules: usize,
}

/// Crawl everything about the user and upsert it.
///
/// Semesters are fetched first so that any tenant discovered from them is known
/// before the module fan-out starts.
#[instrument(skip_all, fields(user_id = %crawler.user_id()))]
pub async fn sync_user<A, S>(crawler: Crawler<'_, A>, store: &S) -> Result<SyncReport>
where
    A: LmsApi + ?Sized,
    S: Store + ?Sized,
{
    let listing = crawler.semesters().await?;
    store.upsert_semesters(&listing.semesters).await?;

    let (user, school) = crawler.user_and_school().await?;
    store.upsert_school(&school).await?;
    store.upsert_user(&user).await?;

    let modules = crawler.modules().await?;
    store
        .upsert_user_modules(crawler.user_id().as_str(), &modules)
        .await?;

    let report = SyncReport {
        user,
        school,
        semesters: listing.semesters.len(),
        modules: modules.len(),
    };
    info!(
        semesters = report.semesters,
        modules = report.modules,
        "User synced"
    );
    Ok(report)
}

/// The user's modules, crawling and storing them first if none are known.
pub async fn ensure_user_synced<A, S>(crawler: Crawler<'_, A>, store: &S) -> Result<Vec<Module>>
where
    A: LmsApi + ?Sized,
    S: Store + ?Sized,
{
    let user_id = crawler.user_id().as_str();

    let known = store.get_user_modules(user_id).await?;
    if !known.is_empty() {
        return Ok(known);
    }

    info!(user_id, "No modules known for user, syncing");
    sync_user(crawler, store).await?;
    store.get_user_modules(user_id).await
}

pub async fn module_units<A>(crawler: Crawler<'_, A>, module_id: &str) -> Result<Vec<Unit>>
where
    A: LmsApi + ?Sized,
{
    crawler.units(module_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::VerifiedUserId;
    use crate::endpoints::{Endpoints, REL_ORGANIZATION, REL_PARENT_SEMESTER};
    use crate::store::MemoryStore;
    use crate::testing::MockApi;
    use crate::types::WhoAmI;
    use serde_json::json;
    use url::Url;

    const ENROLLMENTS: &str = "https://tenant.enrollments.api.brightspace.com/users/490586";
    const SCHOOL: &str = "https://tenant.organizations.api.brightspace.com/6606";
    const ENROLLMENT: &str = "https://tenant.enrollments.api.brightspace.com/users/490586/organizations/332340";
    const MODULE: &str = "https://tenant.organizations.api.brightspace.com/332340?localeId=3";
    const SEARCH: &str =
        "https://nplms.polite.edu.sg/d2l/api/le/manageCourses/courses-searches/490586/BySemester?desc=1";

    fn api() -> MockApi {
        MockApi::new(Url::parse("https://nplms.polite.edu.sg/").unwrap())
            .with_entity(
                SEARCH,
                json!({
                    "actions": [{
                        "name": "6656",
                        "title": " AY2024/25 Semester 1",
                        "href": "https://tenant.organizations.api.brightspace.com/6656"
                    }]
                }),
            )
            .with_entity(
                ENROLLMENTS,
                json!({
                    "entities": [{ "rel": ["enrollment"], "href": ENROLLMENT }],
                    "links": [{ "rel": [REL_ORGANIZATION], "href": SCHOOL }]
                }),
            )
            .with_entity(
                SCHOOL,
                json!({
                    "properties": { "name": "Ngee Ann Polytechnic" },
                    "links": [{ "rel": ["self"], "href": SCHOOL }]
                }),
            )
            .with_entity(
                ENROLLMENT,
                json!({ "links": [{ "rel": [REL_ORGANIZATION], "href": MODULE }] }),
            )
            .with_entity(
                MODULE,
                json!({
                    "properties": { "name": "Data Structures", "code": "DSA" },
                    "links": [{
                        "rel": [REL_PARENT_SEMESTER],
                        "href": "https://tenant.organizations.api.brightspace.com/6656"
                    }]
                }),
            )
            .with_who_am_i(WhoAmI {
                identifier: "490586".into(),
                first_name: "JOHN DOE".into(),
                ..Default::default()
            })
    }

    #[tokio::test]
    async fn test_sync_user() {
        let api = api();
        let endpoints = Endpoints::default();
        let user_id = VerifiedUserId::new("490586");
        let crawler = Crawler::new(&api, &endpoints, "tenant", &user_id);
        let store = MemoryStore::new();

        let report = sync_user(crawler, &store).await.unwrap();
        assert_eq!(report.user.school, "6606");
        assert_eq!(report.semesters, 1);
        assert_eq!(report.modules, 1);

        assert!(store.school("6606").await.is_some());
        assert_eq!(store.semester_count().await, 1);
        let modules = store.get_user_modules("490586").await.unwrap();
        assert_eq!(
            modules,
            vec![Module {
                id: "332340".into(),
                name: "Data Structures".into(),
                code: "DSA".into(),
                semester_id: "6656".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_ensure_user_synced_only_crawls_once() {
        let api = api();
        let endpoints = Endpoints::default();
        let user_id = VerifiedUserId::new("490586");
        let crawler = Crawler::new(&api, &endpoints, "tenant", &user_id);
        let store = MemoryStore::new();

        let first = ensure_user_synced(crawler, &store).await.unwrap();
        let fetches = api.fetch_count();
        assert!(fetches > 0);

        let second = ensure_user_synced(crawler, &store).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(api.fetch_count(), fetches);
    }

    #[tokio::test]
    async fn test_modules_stored_under_verified_id() {
        let api = api().with_who_am_i(WhoAmI {
            identifier: "999".into(),
            first_name: "SOMEONE ELSE".into(),
            ..Default::default()
        });
        let endpoints = Endpoints::default();
        let user_id = VerifiedUserId::new("490586");
        let crawler = Crawler::new(&api, &endpoints, "tenant", &user_id);
        let store = MemoryStore::new();

        let first = ensure_user_synced(crawler, &store).await.unwrap();
        assert_eq!(first.len(), 1);
        let fetches = api.fetch_count();

        let second = ensure_user_synced(crawler, &store).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(api.fetch_count(), fetches);

        assert!(store.user("999").await.is_none());
        assert!(store.get_user_modules("999").await.unwrap().is_empty());
        assert_eq!(store.user("490586").await.unwrap().school, "6606");
    }

    #[tokio::test]
    async fn test_failed_module_crawl_stores_no_modules() {
        let api = api().with_status(MODULE, 503);
        let endpoints = Endpoints::default();
        let user_id = VerifiedUserId::new("490586");
        let crawler = Crawler::new(&api, &endpoints, "tenant", &user_id);
        let store = MemoryStore::new();

        assert!(sync_user(crawler, &store).await.is_err());
        assert!(store.get_user_modules("490586").await.unwrap().is_empty());
    }
}
