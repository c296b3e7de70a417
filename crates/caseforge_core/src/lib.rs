pub mod config;
pub mod logging;
pub mod model;

pub use config::{CaseforgeConfig, JiraCredentials};
pub use model::{
    ExportData, GenerateRequest, GenerateResponse, ModelError, Story, TestCase,
    TEST_DATA_PLACEHOLDER,
};
