//! Minimal create/update planning.
//!
//! The matching key is the resource name. Resources present remotely but
//! absent from the desired set produce no entry and are never touched;
//! the engine has no delete path at all.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use concord_core::{DesiredResource, RemoteResource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffAction {
    Create,
    Update,
}

/// One desired resource requiring a change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffEntry {
    pub action: DiffAction,
    pub spec: DesiredResource,
    pub existing_id: Option<String>,
}

/// Ordered plan, one entry per missing or drifted desired resource, in
/// desired-list source order so retries are reproducible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffPlan {
    pub entries: Vec<DiffEntry>,
}

impl DiffPlan {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn creates(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.action == DiffAction::Create)
            .count()
    }

    pub fn updates(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.action == DiffAction::Update)
            .count()
    }
}

/// Compare desired against actual and produce the minimal plan.
///
/// Duplicate remote names should not occur under correct platform
/// semantics; when they do, the first occurrence in actual-list order
/// wins and a warning is logged.
pub fn plan(desired: &[DesiredResource], actual: &[RemoteResource]) -> DiffPlan {
    let mut by_name: HashMap<&str, &RemoteResource> = HashMap::new();
    for record in actual {
        if by_name.contains_key(record.name.as_str()) {
            tracing::warn!(
                name = %record.name,
                id = %record.id,
                "duplicate remote resource name, keeping first occurrence"
            );
            continue;
        }
        by_name.insert(record.name.as_str(), record);
    }

    let mut entries = Vec::new();
    for spec in desired {
        match by_name.get(spec.name.as_str()) {
            None => entries.push(DiffEntry {
                action: DiffAction::Create,
                spec: spec.clone(),
                existing_id: None,
            }),
            Some(remote) if !spec.matches(remote) => entries.push(DiffEntry {
                action: DiffAction::Update,
                spec: spec.clone(),
                existing_id: Some(remote.id.clone()),
            }),
            Some(_) => {}
        }
    }

    DiffPlan { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desired(name: &str, description: &str) -> DesiredResource {
        DesiredResource {
            name: name.to_string(),
            description: description.to_string(),
            kind: "command".to_string(),
            options: vec![],
        }
    }

    fn remote(id: &str, name: &str, description: &str) -> RemoteResource {
        RemoteResource {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            kind: "command".to_string(),
            options: vec![],
        }
    }

    #[test]
    fn creates_updates_and_noops() {
        let want = [
            desired("alpha", "first"),
            desired("bravo", "second"),
            desired("charlie", "third"),
        ];
        let have = [remote("r-b", "bravo", "stale")];

        let plan = plan(&want, &have);

        assert_eq!(plan.len(), 3);
        assert_eq!(plan.entries[0].action, DiffAction::Create);
        assert_eq!(plan.entries[0].spec.name, "alpha");
        assert_eq!(plan.entries[1].action, DiffAction::Update);
        assert_eq!(plan.entries[1].existing_id.as_deref(), Some("r-b"));
        assert_eq!(plan.entries[2].action, DiffAction::Create);
        assert_eq!(plan.entries[2].spec.name, "charlie");
    }

    #[test]
    fn converged_resources_produce_no_entries() {
        let want = [desired("alpha", "first")];
        let have = [remote("r-a", "alpha", "first")];
        assert!(plan(&want, &have).is_empty());
    }

    #[test]
    fn untracked_remote_resources_are_ignored() {
        let want = [desired("alpha", "first")];
        let have = [
            remote("r-a", "alpha", "first"),
            remote("r-x", "untracked-x", "left alone"),
        ];

        let out = plan(&want, &have);
        assert!(out.is_empty(), "no delete entry may ever be planned");
    }

    #[test]
    fn duplicate_remote_names_first_occurrence_wins() {
        let want = [desired("alpha", "new")];
        let have = [
            remote("r-1", "alpha", "old"),
            remote("r-2", "alpha", "older"),
        ];

        let out = plan(&want, &have);
        assert_eq!(out.len(), 1);
        assert_eq!(out.entries[0].existing_id.as_deref(), Some("r-1"));
    }

    #[test]
    fn plan_order_follows_desired_order() {
        let want = [
            desired("zulu", "z"),
            desired("alpha", "a"),
            desired("mike", "m"),
        ];
        let out = plan(&want, &[]);
        let names: Vec<&str> = out.entries.iter().map(|e| e.spec.name.as_str()).collect();
        assert_eq!(names, ["zulu", "alpha", "mike"]);
    }
}
