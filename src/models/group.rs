use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabourGroup {
    pub id: i64,
    pub name: String,
}

/// Look a group up by id in an already fetched list.
pub fn find_group(groups: &[LabourGroup], id: i64) -> Option<&LabourGroup> {
    groups.iter().find(|g| g.id == id)
}
