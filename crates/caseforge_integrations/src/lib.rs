pub mod jira;

pub use jira::{JiraClient, Project, StorySource};
