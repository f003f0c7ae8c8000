//! Units, lessons and activities from a module's sequence document.
//!
//! The sequence is fetched once with everything embedded one level deep, so the
//! parse below is a pure walk over the already-decoded tree.

use siren::Entity;
use tracing::{debug, info};

use super::ids::linked_id;
use super::Crawler;
use crate::api::LmsApi;
use crate::error::{DocumentContext, Result};
use crate::types::{Activity, Lesson, Unit};

/// Class of a sub-entity of a unit that is a lesson.
pub const LESSON_CLASS: [&str; 3] = ["release-condition-fix", "sequence", "sequence-description"];
/// Class of a sub-entity of a lesson that is an activity.
pub const ACTIVITY_CLASS: [&str; 2] = ["release-condition-fix", "sequenced-activity"];

const REL_SELF_DESCRIBES: [&str; 2] = ["self", "describes"];
const REL_UP: [&str; 1] = ["up"];

impl<A: LmsApi + ?Sized> Crawler<'_, A> {
    /// Fetch and parse the unit tree of one module.
    pub async fn units(&self, module_id: &str) -> Result<Vec<Unit>> {
        let url = self.endpoints.sequence_url(self.tenant_id, module_id);
        let sequence = self.api.fetch_entity(&url).await?;

        let units = parse_units(&sequence)?;
        info!(
            module_id,
            units = units.len(),
            lessons = units.iter().map(|u| u.lessons.len()).sum::<usize>(),
            "Parsed module sequence"
        );
        Ok(units)
    }
}

/// Every sub-entity of a sequence document is a unit.
pub fn parse_units(sequence: &Entity) -> Result<Vec<Unit>> {
    sequence.entities.iter().map(parse_unit).collect()
}

pub fn parse_unit(entity: &Entity) -> Result<Unit> {
    let node = Node::parse(entity, "unit entity")?;

    let lessons = entity
        .children_with_class(&LESSON_CLASS)
        .map(parse_lesson)
        .collect::<Result<Vec<_>>>()?;

    Ok(Unit {
        id: node.id,
        module_id: node.parent_id,
        title: node.title,
        lessons,
    })
}

pub fn parse_lesson(entity: &Entity) -> Result<Lesson> {
    let node = Node::parse(entity, "lesson entity")?;

    let activities = entity
        .children_with_class(&ACTIVITY_CLASS)
        .map(parse_activity)
        .collect::<Result<Vec<_>>>()?;

    let skipped = entity.entities.len() - activities.len();
    if skipped > 0 {
        debug!(lesson_id = %node.id, skipped, "Ignored non-activity children");
    }

    Ok(Lesson {
        id: node.id,
        unit_id: node.parent_id,
        title: node.title,
        transparent: false,
        activities,
    })
}

pub fn parse_activity(entity: &Entity) -> Result<Activity> {
    let node = Node::parse(entity, "activity entity")?;

    Ok(Activity {
        id: node.id,
        lesson_id: node.parent_id,
        title: node.title,
    })
}

/// Fields shared by every level of the tree.
struct Node {
    id: String,
    parent_id: String,
    title: String,
}

impl Node {
    fn parse(entity: &Entity, context: &str) -> Result<Self> {
        Ok(Self {
            id: linked_id(entity, &REL_SELF_DESCRIBES, context)?,
            parent_id: linked_id(entity, &REL_UP, context)?,
            title: entity.require_str("title").in_document(context)?.to_string(),
        })
    }
}
