use futures::future::try_join_all;
use siren::Entity;
use tracing::{debug, info, warn};

use super::ids::last_path_segment;
use super::Crawler;
use crate::api::LmsApi;
use crate::endpoints::{REL_ORGANIZATION, REL_PARENT_SEMESTER};
use crate::error::{DocumentContext, Result};
use crate::types::Module;

impl<A: LmsApi + ?Sized> Crawler<'_, A> {
    /// Every module the user is enrolled in.
    ///
    /// Enrollments are fetched concurrently, one future each. The first failure
    /// fails the whole listing and the remaining results are dropped. Order of the
    /// returned modules is unspecified.
    pub async fn modules(&self) -> Result<Vec<Module>> {
        let root = self.api.fetch_entity(&self.enrollments_url()).await?;

        let hrefs = root
            .entities
            .iter()
            .map(|enrollment| enrollment.require_href().in_document("enrollment sub-entity"))
            .collect::<Result<Vec<_>>>()?;
        debug!(enrollments = hrefs.len(), "Fetching modules");

        let modules = try_join_all(hrefs.into_iter().map(|href| async move {
            self.module_from_enrollment(href)
                .await
                .inspect_err(|e| warn!(enrollment = href, error = %e, "Failed to fetch module"))
        }))
        .await?;

        info!(modules = modules.len(), "Fetched modules");
        Ok(modules)
    }

    /// Enrollment → organization → module.
    async fn module_from_enrollment(&self, href: &str) -> Result<Module> {
        let enrollment = self.api.fetch_entity(href).await?;
        let organization = enrollment
            .link(&[REL_ORGANIZATION])
            .in_document("enrollment entity")?;

        let org = self.api.fetch_entity(&organization.href).await?;
        parse_module(&organization.href, &org)
    }
}

/// A module from its organization entity and the URL it was fetched from.
pub(crate) fn parse_module(org_href: &str, org: &Entity) -> Result<Module> {
    const CONTEXT: &str = "module organization entity";

    let semester = org.link(&[REL_PARENT_SEMESTER]).in_document(CONTEXT)?;

    Ok(Module {
        id: last_path_segment(org_href)?,
        name: org.require_str("name").in_document(CONTEXT)?.to_string(),
        code: org.require_str("code").in_document(CONTEXT)?.to_string(),
        semester_id: last_path_segment(&semester.href)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::VerifiedUserId;
    use crate::endpoints::Endpoints;
    use crate::error::PolitemallError;
    use crate::testing::MockApi;
    use serde_json::{json, Value};
    use url::Url;

    const ROOT: &str = "https://tenant.enrollments.api.brightspace.com/users/490586";

    fn enrollment_href(n: usize) -> String {
        format!("https://tenant.enrollments.api.brightspace.com/users/490586/organizations/{n}")
    }

    fn org_href(n: usize) -> String {
        format!("https://tenant.organizations.api.brightspace.com/{}?localeId=3", 1000 + n)
    }

    fn org_document(n: usize) -> Value {
        json!({
            "properties": { "name": format!("Module {n}"), "code": format!("C{n}") },
            "links": [
                { "rel": ["self"], "href": org_href(n) },
                {
                    "rel": [REL_PARENT_SEMESTER],
                    "href": "https://tenant.organizations.api.brightspace.com/6656?localeId=3"
                }
            ]
        })
    }

    fn api_with_enrollments(count: usize) -> MockApi {
        let root = json!({
            "entities": (0..count)
                .map(|n| json!({ "rel": ["enrollment"], "href": enrollment_href(n) }))
                .collect::<Vec<_>>()
        });

        let mut api = MockApi::new(Url::parse("https://nplms.polite.edu.sg/").unwrap())
            .with_entity(ROOT, root);
        for n in 0..count {
            api = api
                .with_entity(
                    enrollment_href(n),
                    json!({ "links": [{ "rel": [REL_ORGANIZATION], "href": org_href(n) }] }),
                )
                .with_entity(org_href(n), org_document(n));
        }
        api
    }

    #[tokio::test]
    async fn test_modules() {
        let api = api_with_enrollments(3);
        let endpoints = Endpoints::default();
        let user_id = VerifiedUserId::new("490586");
        let crawler = Crawler::new(&api, &endpoints, "tenant", &user_id);

        let mut modules = crawler.modules().await.unwrap();
        modules.sort_by(|a, b| a.id.cmp(&b.id));

        let expected: Vec<Module> = (0..3)
            .map(|n| Module {
                id: (1000 + n).to_string(),
                name: format!("Module {n}"),
                code: format!("C{n}"),
                semester_id: "6656".into(),
            })
            .collect();
        assert_eq!(modules, expected);
    }

    #[tokio::test]
    async fn test_no_enrollments() {
        let api = api_with_enrollments(0);
        let endpoints = Endpoints::default();
        let user_id = VerifiedUserId::new("490586");
        let crawler = Crawler::new(&api, &endpoints, "tenant", &user_id);

        assert!(crawler.modules().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_one_failing_organization_fails_all() {
        let api = api_with_enrollments(4).with_status(org_href(2), 500);
        let endpoints = Endpoints::default();
        let user_id = VerifiedUserId::new("490586");
        let crawler = Crawler::new(&api, &endpoints, "tenant", &user_id);

        let err = crawler.modules().await.unwrap_err();
        match err {
            PolitemallError::Status { url, status, reason } => {
                assert_eq!(url, org_href(2));
                assert_eq!(status, 500);
                assert_eq!(reason, "Internal Server Error");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_enrollment_without_href_fails() {
        let api = api_with_enrollments(1).with_entity(
            ROOT,
            json!({ "entities": [{ "rel": ["enrollment"] }] }),
        );
        let endpoints = Endpoints::default();
        let user_id = VerifiedUserId::new("490586");
        let crawler = Crawler::new(&api, &endpoints, "tenant", &user_id);

        assert!(matches!(
            crawler.modules().await,
            Err(PolitemallError::Document { .. })
        ));
    }

    #[test]
    fn test_module_without_code_fails() {
        let mut document = org_document(0);
        document["properties"] = json!({ "name": "Module 0" });
        let org: Entity = serde_json::from_value(document).unwrap();

        assert!(parse_module(&org_href(0), &org).is_err());
    }

    #[test]
    fn test_module_without_parent_semester_fails() {
        let org: Entity = serde_json::from_value(json!({
            "properties": { "name": "Module 0", "code": "C0" }
        }))
        .unwrap();

        assert!(parse_module(&org_href(0), &org).is_err());
    }
}
