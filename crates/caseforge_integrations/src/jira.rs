//! Jira Cloud client that turns issues into [`Story`] records.
//!
//! Talks to the REST API v3 with Basic authentication (email + API token)
//! and falls back to the v2 endpoints on instances where a v3 route is
//! missing or retired.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use caseforge_core::{CaseforgeConfig, JiraCredentials, Story};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};
use url::Url;

const DEFAULT_MAX_RESULTS: u32 = 100;

// ── Jira API response types ──────────────────────────────────────

#[derive(Debug, Deserialize)]
struct JiraSearchResponse {
    #[serde(default)]
    issues: Vec<JiraIssue>,
}

#[derive(Debug, Deserialize)]
struct JiraIssue {
    key: String,
    /// Kept untyped: acceptance criteria live in instance-specific custom fields.
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct JiraProjectPage {
    #[serde(default)]
    values: Vec<Project>,
}

/// A Jira project the credentials can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub key: String,
    pub name: String,
}

// ── Trait ──────────────────────────────────────────────────────────

/// A source of user stories to generate test cases from.
#[async_trait]
pub trait StorySource: Send + Sync {
    /// Whether the credentials are accepted.
    async fn test_connection(&self) -> Result<bool>;

    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// Stories and bugs of one project, newest first.
    async fn stories_for_project(&self, project_key: &str) -> Result<Vec<Story>>;

    /// Stories of several projects, concatenated in the order given.
    ///
    /// A project whose fetch fails contributes no stories; the others are
    /// still returned.
    async fn stories_for_projects(&self, project_keys: &[String]) -> Result<Vec<Story>> {
        let mut stories = Vec::new();
        for key in project_keys {
            match self.stories_for_project(key).await {
                Ok(found) => stories.extend(found),
                Err(e) => warn!(project = %key, error = %e, "skipping project, story fetch failed"),
            }
        }
        Ok(stories)
    }
}

// ── Client ─────────────────────────────────────────────────────────

pub struct JiraClient {
    base_url: String,
    email: String,
    api_token: String,
    max_results: u32,
    acceptance_criteria_fields: Vec<String>,
    client: Client,
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}

impl JiraClient {
    /// Create a client from validated credentials.
    ///
    /// Any URL inside the instance works as `base_url`; only its scheme,
    /// host and port are kept.
    pub fn new(credentials: &JiraCredentials) -> Result<Self> {
        credentials.validate()?;
        let base_url = normalize_base_url(&credentials.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client for Jira")?;

        info!(
            base_url = %base_url,
            email = %credentials.email,
            token_len = credentials.api_token.len(),
            "Jira client initialized"
        );

        Ok(Self {
            base_url,
            email: credentials.email.clone(),
            api_token: credentials.api_token.clone(),
            max_results: DEFAULT_MAX_RESULTS,
            acceptance_criteria_fields: CaseforgeConfig::default().acceptance_criteria_fields,
            client,
        })
    }

    /// Create a client from the credentials and search settings in `config`.
    pub fn from_config(config: &CaseforgeConfig) -> Result<Self> {
        let Some(credentials) = config.jira_credentials() else {
            bail!("Jira is not configured: base URL, email and API token are required");
        };
        Ok(Self::new(&credentials)?
            .with_max_results(config.jira_max_results)
            .with_acceptance_criteria_fields(config.acceptance_criteria_fields.clone()))
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn with_acceptance_criteria_fields(mut self, fields: Vec<String>) -> Self {
        self.acceptance_criteria_fields = fields;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send an authenticated request without checking the status.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request
            .basic_auth(&self.email, Some(&self.api_token))
            .send()
            .await
            .context("Jira request failed")
    }

    /// Fail on a non-2xx status, otherwise decode the JSON body.
    async fn parse<T: DeserializeOwned>(resp: Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Jira API error ({status}): {body}");
        }
        resp.json::<T>()
            .await
            .context("failed to parse Jira response")
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(url = %url, "Jira GET request");
        let resp = self.send(self.client.get(&url)).await?;
        Self::parse(resp).await
    }

    fn search_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = ["summary", "description", "project"]
            .into_iter()
            .map(String::from)
            .collect();
        fields.extend(self.acceptance_criteria_fields.iter().cloned());
        fields
    }

    fn convert_issue(&self, issue: JiraIssue, project_key: &str) -> Story {
        let fields = &issue.fields;
        let summary = fields
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let description = fields
            .get("description")
            .map(adf_to_text)
            .filter(|d| !d.is_empty());
        let acceptance_criteria = self
            .acceptance_criteria_fields
            .iter()
            .filter_map(|name| fields.get(name))
            .map(adf_to_text)
            .find(|text| !text.is_empty());
        let project_key = fields
            .get("project")
            .and_then(|p| p.get("key"))
            .and_then(Value::as_str)
            .unwrap_or(project_key)
            .to_string();

        Story {
            key: issue.key,
            summary,
            description,
            acceptance_criteria,
            project_key,
        }
    }
}

#[async_trait]
impl StorySource for JiraClient {
    async fn test_connection(&self) -> Result<bool> {
        let url = self.url("/rest/api/3/myself");
        debug!(url = %url, "testing Jira connection");

        match self.send(self.client.get(&url)).await {
            Ok(resp) if resp.status().is_success() => Ok(true),
            Ok(resp) => {
                warn!(status = %resp.status(), "Jira rejected the credentials");
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, "Jira connection test failed");
                Ok(false)
            }
        }
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        match self.get::<JiraProjectPage>("/rest/api/3/project/search").await {
            Ok(page) => return Ok(page.values),
            Err(e) => warn!(error = %e, "project search failed, trying API v2"),
        }

        let value: Value = self.get("/rest/api/2/project").await?;
        let projects = match value {
            Value::Array(_) => serde_json::from_value::<Vec<Project>>(value)?,
            Value::Object(_) => serde_json::from_value::<JiraProjectPage>(value)?.values,
            other => bail!("unexpected project list from Jira: {other}"),
        };
        Ok(projects)
    }

    async fn stories_for_project(&self, project_key: &str) -> Result<Vec<Story>> {
        let jql = build_jql(project_key);
        let fields = self.search_fields();

        let url = self.url("/rest/api/3/search/jql");
        debug!(url = %url, jql = %jql, "Jira search");
        let payload = json!({
            "jql": jql,
            "maxResults": self.max_results,
            "fields": fields,
        });
        let mut resp = self.send(self.client.post(&url).json(&payload)).await?;

        if matches!(resp.status(), StatusCode::NOT_FOUND | StatusCode::GONE) {
            warn!(status = %resp.status(), "JQL search endpoint unavailable, trying API v2");
            let mut fallback = Url::parse(&self.url("/rest/api/2/search"))
                .context("invalid Jira search URL")?;
            fallback
                .query_pairs_mut()
                .append_pair("jql", &jql)
                .append_pair("maxResults", &self.max_results.to_string())
                .append_pair("fields", &fields.join(","));
            resp = self.send(self.client.get(fallback.as_str())).await?;
        }

        let search: JiraSearchResponse = Self::parse(resp).await?;
        let stories: Vec<Story> = search
            .issues
            .into_iter()
            .map(|issue| self.convert_issue(issue, project_key))
            .collect();
        info!(project = project_key, count = stories.len(), "fetched Jira stories");
        Ok(stories)
    }
}

/// Keep scheme, host and explicit port of whatever URL the user pasted.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw.trim()).with_context(|| format!("Invalid base URL: {raw}"))?;
    let Some(host) = url.host_str() else {
        bail!("Invalid base URL: {raw}");
    };
    Ok(match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    })
}

pub fn build_jql(project_key: &str) -> String {
    let key = project_key.replace('\\', "\\\\").replace('"', "\\\"");
    format!("project = \"{key}\" AND type in (Story, Bug) ORDER BY created DESC")
}

/// Flatten a plain string or an Atlassian Document Format tree into text.
///
/// Paragraph-like blocks end with a newline; the result is trimmed.
pub fn adf_to_text(value: &Value) -> String {
    let mut out = String::new();
    collect_adf(value, &mut out);
    out.trim().to_string()
}

fn collect_adf(node: &Value, out: &mut String) {
    match node {
        Value::String(s) => out.push_str(s),
        Value::Array(items) => {
            for item in items {
                collect_adf(item, out);
                if item.is_string() {
                    out.push('\n');
                }
            }
        }
        Value::Object(map) => {
            let kind = map.get("type").and_then(Value::as_str).unwrap_or_default();
            if kind == "hardBreak" {
                out.push('\n');
            }
            if let Some(text) = map.get("text").and_then(Value::as_str) {
                out.push_str(text);
            }
            if let Some(content) = map.get("content") {
                collect_adf(content, out);
            }
            if matches!(kind, "paragraph" | "heading" | "codeBlock") && !out.ends_with('\n') {
                out.push('\n');
            }
        }
        _ => {}
    }
}
