use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub admin: String,
    pub creation_time: String,
    #[serde(default)]
    pub users: IndexSet<String>,
}

impl Team {
    pub fn summary(&self) -> TeamSummary {
        TeamSummary {
            name: self.name.clone(),
            description: self.description.clone(),
            creation_time: self.creation_time.clone(),
            admin: self.admin.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub name: String,
    pub description: String,
    pub creation_time: String,
    pub admin: String,
}

/// A team as seen from one of its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberTeam {
    pub name: String,
    pub description: String,
    pub creation_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamUpdate {
    pub name: String,
    pub description: String,
    pub admin: String,
}
