use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::AppError;

/// Free-form content blocks for one page of the site, keyed by `page_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    pub id: Uuid,
    pub page_id: String,
    pub content: Map<String, Value>,
    /// Editing user, lookup-only.
    pub last_updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInput {
    pub content: Option<Value>,
    pub last_updated_by: Option<Uuid>,
}

/// Validated upsert payload. `content` replaces the stored map wholesale.
#[derive(Debug, Clone)]
pub struct PageUpdate {
    pub content: Map<String, Value>,
    pub last_updated_by: Option<Uuid>,
}

impl PageInput {
    pub fn into_update(self) -> Result<PageUpdate, AppError> {
        let content = match self.content {
            None | Some(Value::Null) => return Err(AppError::validation("Content is required")),
            Some(Value::Object(map)) => map,
            Some(_) => return Err(AppError::validation("Content must be a JSON object")),
        };
        if content.is_empty() {
            return Err(AppError::validation("Content must not be empty"));
        }
        Ok(PageUpdate {
            content,
            last_updated_by: self.last_updated_by,
        })
    }
}

pub fn validate_page_id(page_id: &str) -> Result<&str, AppError> {
    let page_id = page_id.trim();
    if page_id.is_empty() {
        return Err(AppError::validation("pageId is required"));
    }
    Ok(page_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_and_null_content_rejected() {
        assert!(PageInput::default().into_update().is_err());
        let input: PageInput = serde_json::from_value(json!({ "content": null })).unwrap();
        assert!(input.into_update().is_err());
    }

    #[test]
    fn test_non_object_content_rejected() {
        let input: PageInput = serde_json::from_value(json!({ "content": [1, 2] })).unwrap();
        assert!(input.into_update().is_err());
    }

    #[test]
    fn test_object_content_accepted_with_editor() {
        let editor = Uuid::new_v4();
        let input: PageInput = serde_json::from_value(json!({
            "content": { "heroTitle": "Welcome" },
            "lastUpdatedBy": editor
        }))
        .unwrap();
        let update = input.into_update().unwrap();
        assert_eq!(update.content["heroTitle"], "Welcome");
        assert_eq!(update.last_updated_by, Some(editor));
    }
}
