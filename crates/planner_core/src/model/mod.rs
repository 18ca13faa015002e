mod board;
mod task;
mod team;
mod user;

pub use board::{Board, BoardBook, BoardDetail, BoardListing, BoardStatus};
pub use task::{Task, TaskStatus};
pub use team::{MemberTeam, Team, TeamMember, TeamSummary, TeamUpdate};
pub use user::{User, UserUpdate};
