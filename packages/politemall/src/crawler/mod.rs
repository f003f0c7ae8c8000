//! Walks the Brightspace hypermedia graph into domain records.
//!
//! Each sub-module adds one family of operations to [`Crawler`]:
//! - `school`: user + school
//! - `semesters`: semester search (and tenant discovery)
//! - `modules`: concurrent per-enrollment module fetch
//! - `sequence`: units / lessons / activities of one module

mod ids;
mod modules;
mod school;
mod semesters;
mod sequence;

pub use ids::last_path_segment;
pub use school::parse_school;
pub use semesters::{parse_semesters, tenant_from_href, SemesterListing};
pub use sequence::{parse_activity, parse_lesson, parse_unit, parse_units, ACTIVITY_CLASS, LESSON_CLASS};

use crate::api::LmsApi;
use crate::auth::VerifiedUserId;
use crate::endpoints::Endpoints;

/// Read-only crawl context: who we crawl for, in which tenant, over which API.
pub struct Crawler<'a, A: ?Sized> {
    api: &'a A,
    endpoints: &'a Endpoints,
    tenant_id: &'a str,
    user_id: &'a VerifiedUserId,
}

impl<A: ?Sized> Clone for Crawler<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: ?Sized> Copy for Crawler<'_, A> {}

impl<'a, A: LmsApi + ?Sized> Crawler<'a, A> {
    pub fn new(
        api: &'a A,
        endpoints: &'a Endpoints,
        tenant_id: &'a str,
        user_id: &'a VerifiedUserId,
    ) -> Self {
        Self {
            api,
            endpoints,
            tenant_id,
            user_id,
        }
    }

    /// The same crawler pointed at another tenant.
    ///
    /// Tenant resolution is an explicit step taken before any module fan-out;
    /// the crawler itself never changes tenant mid-crawl.
    pub fn with_tenant_id(self, tenant_id: &'a str) -> Self {
        Self { tenant_id, ..self }
    }

    pub fn api(&self) -> &'a A {
        self.api
    }

    pub fn tenant_id(&self) -> &'a str {
        self.tenant_id
    }

    pub fn user_id(&self) -> &'a VerifiedUserId {
        self.user_id
    }

    fn enrollments_url(&self) -> String {
        self.endpoints
            .enrollments_url(self.tenant_id, self.user_id.as_str())
    }
}
