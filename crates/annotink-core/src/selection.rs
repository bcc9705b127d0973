//! Selection state and rigid grouping.

use crate::scene::Scene;
use crate::shapes::{ElementId, GroupId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

/// Selection and grouping errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Grouping needs at least two elements")]
    InsufficientSelection,
    #[error("None of the elements belong to a group")]
    NotGrouped,
}

/// Result type for selection operations.
pub type SelectionResult<T> = Result<T, SelectionError>;

/// What is currently selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    None,
    /// One active element, eligible for resize.
    Single(ElementId),
    /// Several elements: move, delete and recolor only.
    Multi(Vec<ElementId>),
}

impl Selection {
    /// Build a selection from a list of ids, picking the right variant.
    pub fn from_ids(mut ids: Vec<ElementId>) -> Self {
        let mut seen = HashSet::new();
        ids.retain(|id| seen.insert(*id));
        match ids.len() {
            0 => Selection::None,
            1 => Selection::Single(ids[0]),
            _ => Selection::Multi(ids),
        }
    }

    /// Selected ids in selection order.
    pub fn ids(&self) -> Vec<ElementId> {
        match self {
            Selection::None => Vec::new(),
            Selection::Single(id) => vec![*id],
            Selection::Multi(ids) => ids.clone(),
        }
    }

    pub fn contains(&self, id: ElementId) -> bool {
        match self {
            Selection::None => false,
            Selection::Single(selected) => *selected == id,
            Selection::Multi(ids) => ids.contains(&id),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::None)
    }

    /// The active element when exactly one is selected.
    pub fn active(&self) -> Option<ElementId> {
        match self {
            Selection::Single(id) => Some(*id),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Selection::None => 0,
            Selection::Single(_) => 1,
            Selection::Multi(ids) => ids.len(),
        }
    }

    /// Add or remove one id.
    pub fn toggle(&mut self, id: ElementId) {
        let mut ids = self.ids();
        if let Some(pos) = ids.iter().position(|selected| *selected == id) {
            ids.remove(pos);
        } else {
            ids.push(id);
        }
        *self = Selection::from_ids(ids);
    }

    /// Drop ids that are no longer in the scene.
    pub fn retain_existing(&mut self, scene: &Scene) {
        let ids = self.ids().into_iter().filter(|id| scene.contains(*id)).collect();
        *self = Selection::from_ids(ids);
    }

    pub fn clear(&mut self) {
        *self = Selection::None;
    }
}

/// Resolve a click on `hit` into the selection it produces.
///
/// A plain click selects the element, expanded to its whole group. A
/// modifier click toggles just that element. A plain click on nothing clears.
pub fn select_at(selection: &mut Selection, scene: &Scene, hit: Option<ElementId>, modifier: bool) {
    match (hit, modifier) {
        (Some(id), true) => selection.toggle(id),
        (Some(id), false) => {
            let group = scene.get(id).and_then(|e| e.group_id());
            *selection = match group {
                Some(group_id) => Selection::from_ids(scene.group_members(group_id)),
                None => Selection::Single(id),
            };
        }
        (None, false) => selection.clear(),
        (None, true) => {}
    }
}

/// Put `ids` into one new rigid group.
pub fn group(scene: &mut Scene, ids: &[ElementId]) -> SelectionResult<GroupId> {
    let members: Vec<ElementId> = ids
        .iter()
        .copied()
        .filter(|id| scene.contains(*id))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    if members.len() < 2 {
        return Err(SelectionError::InsufficientSelection);
    }
    let group_id = Uuid::new_v4();
    scene.set_group(&members, Some(group_id));
    // Regrouping may have left an old group with a single member.
    scene.normalize_groups();
    log::debug!("Grouped {} elements as {}", members.len(), group_id);
    Ok(group_id)
}

/// Dissolve every group referenced by `ids`. Returns the ids ungrouped.
pub fn ungroup(scene: &mut Scene, ids: &[ElementId]) -> SelectionResult<Vec<ElementId>> {
    let groups: HashSet<GroupId> = ids
        .iter()
        .filter_map(|id| scene.get(*id).and_then(|e| e.group_id()))
        .collect();
    if groups.is_empty() {
        return Err(SelectionError::NotGrouped);
    }
    let members: Vec<ElementId> = groups
        .iter()
        .flat_map(|group_id| scene.group_members(*group_id))
        .collect();
    scene.set_group(&members, None);
    log::debug!("Ungrouped {} elements from {} group(s)", members.len(), groups.len());
    Ok(members)
}
