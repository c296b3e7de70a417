//! Shared data model for stories, generated test cases and export payloads.
//!
//! These types mirror the JSON contracts exchanged with the outer layers
//! (camelCase on the wire). They are plain data: every serializer borrows
//! them immutably and row order is always the order of `ExportData::cases`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rendered in place of a missing (or empty) `testData` value.
pub const TEST_DATA_PLACEHOLDER: &str = "N/A";

/// Errors raised when a model instance breaks its invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("test case at position {index} has an empty id")]
    EmptyCaseId { index: usize },

    #[error("duplicate test case id: {0}")]
    DuplicateCaseId(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// A single generated test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    pub title: String,
    /// Free-form label such as "Positive" or "Edge"; never validated.
    pub category: String,
    /// Execution order is significant.
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_data: Option<String>,
    pub expected_result: String,
}

impl TestCase {
    /// The test data, or [`TEST_DATA_PLACEHOLDER`] when absent or empty.
    pub fn test_data_or_placeholder(&self) -> &str {
        match self.test_data.as_deref() {
            Some(data) if !data.is_empty() => data,
            _ => TEST_DATA_PLACEHOLDER,
        }
    }

    /// Join the steps in order. An empty step list yields an empty string.
    pub fn joined_steps(&self, separator: &str) -> String {
        self.steps.join(separator)
    }
}

/// Canonical input shared by every export format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub story_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<String>,
    pub cases: Vec<TestCase>,
}

impl ExportData {
    /// Check the per-instance invariants: every case has a non-empty id and
    /// ids are unique. The cases are neither reordered nor modified.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut seen = HashSet::with_capacity(self.cases.len());
        for (index, case) in self.cases.iter().enumerate() {
            if case.id.trim().is_empty() {
                return Err(ModelError::EmptyCaseId { index });
            }
            if !seen.insert(case.id.as_str()) {
                return Err(ModelError::DuplicateCaseId(case.id.clone()));
            }
        }
        Ok(())
    }

    /// Build an export payload from a generation round trip.
    pub fn from_generation(request: &GenerateRequest, response: GenerateResponse) -> Self {
        Self {
            story_title: request.story_title.clone(),
            description: request.description.clone(),
            acceptance_criteria: Some(request.acceptance_criteria.clone())
                .filter(|ac| !ac.is_empty()),
            cases: response.cases,
        }
    }
}

/// A user story as delivered by the Jira collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub key: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<String>,
    pub project_key: String,
}

/// Input contract of the test-case generation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub story_title: String,
    pub acceptance_criteria: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

impl GenerateRequest {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.story_title.trim().is_empty() {
            return Err(ModelError::MissingField("storyTitle"));
        }
        if self.acceptance_criteria.trim().is_empty() {
            return Err(ModelError::MissingField("acceptanceCriteria"));
        }
        Ok(())
    }
}

impl From<&Story> for GenerateRequest {
    fn from(story: &Story) -> Self {
        Self {
            story_title: story.summary.clone(),
            acceptance_criteria: story.acceptance_criteria.clone().unwrap_or_default(),
            description: story.description.clone().filter(|d| !d.is_empty()),
            additional_info: None,
        }
    }
}

/// Output contract of the test-case generation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub cases: Vec<TestCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}
