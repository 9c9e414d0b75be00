// src/models.rs
//! Модели данных клиента BD Doc
//!
//! Включает поддержку:
//! - Записей каталога (дипломы/курсовые)
//! - Черновиков форм поиска и создания
//! - Сериализации/десериализации проводных запросов

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::Validate;

/// Placeholder shown for absent/empty document fields.
pub const EMPTY_FIELD_PLACEHOLDER: &str = "—";

// ==================== ТИП ДОКУМЕНТА ====================

/// Kind of catalog document. Scopes criteria searches and tags records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DocType {
    Diploma,
    Coursework,
}

impl Default for DocType {
    fn default() -> Self {
        DocType::Diploma
    }
}

// ==================== ДОКУМЕНТ ====================

/// Запись каталога. Сервер требует только `id` и `type`, поэтому все поля
/// со значениями по умолчанию — битый ответ не должен ронять список.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "type", default)]
    pub doc_type: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub fio: String,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub year: i64,
    #[serde(default)]
    pub order: String,
    #[serde(default)]
    pub reviewer: String,
    #[serde(default)]
    pub discipline: String,
}

impl Doc {
    /// Render a field for display, falling back to the placeholder.
    pub fn display_field(value: &str) -> &str {
        if value.is_empty() {
            EMPTY_FIELD_PLACEHOLDER
        } else {
            value
        }
    }

    /// One-line summary for logs and the CLI listing.
    pub fn describe(&self) -> String {
        format!(
            "#{} [{}] {} — {} ({}, {})",
            self.id.map(|v| v.to_string()).unwrap_or_else(|| "?".into()),
            Self::display_field(&self.doc_type),
            Self::display_field(&self.theme),
            Self::display_field(&self.fio),
            Self::display_field(&self.group),
            if self.year == 0 {
                EMPTY_FIELD_PLACEHOLDER.to_string()
            } else {
                self.year.to_string()
            },
        )
    }
}

// ==================== ФОРМА ДОКУМЕНТА (create/edit draft) ====================

/// Draft of the create/edit form. Only `type` is required at the input
/// boundary; the server enforces the rest.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DocForm {
    #[validate(length(min = 1, message = "Document type is required"))]
    pub doc_type: String,
    pub theme: String,
    pub fio: String,
    pub director: String,
    pub group: String,
    pub year: i64,
    pub order: String,
    pub reviewer: String,
    pub discipline: String,
}

impl Default for DocForm {
    fn default() -> Self {
        Self {
            doc_type: DocType::Diploma.to_string(),
            theme: String::new(),
            fio: String::new(),
            director: String::new(),
            group: String::new(),
            year: 0,
            order: String::new(),
            reviewer: String::new(),
            discipline: String::new(),
        }
    }
}

impl DocForm {
    pub fn to_create_request(&self) -> CreateDocRequest {
        CreateDocRequest {
            doc_type: self.doc_type.to_lowercase(),
            theme: self.theme.clone(),
            fio: self.fio.clone(),
            director: self.director.clone(),
            group: self.group.clone(),
            year: self.year,
            order: self.order.clone(),
            reviewer: self.reviewer.clone(),
            discipline: self.discipline.clone(),
        }
    }

    pub fn to_update_request(&self, id: i64) -> UpdateDocRequest {
        UpdateDocRequest {
            id,
            doc: self.to_create_request(),
        }
    }

    /// Shallow merge of the submitted form over an existing record: every
    /// form field overwrites, only the id survives from the old record.
    pub fn apply_to(&self, old: &Doc) -> Doc {
        Doc {
            id: old.id,
            doc_type: self.doc_type.to_lowercase(),
            theme: self.theme.clone(),
            fio: self.fio.clone(),
            director: self.director.clone(),
            group: self.group.clone(),
            year: self.year,
            order: self.order.clone(),
            reviewer: self.reviewer.clone(),
            discipline: self.discipline.clone(),
        }
    }
}

// ==================== ЧЕРНОВИК КРИТЕРИЕВ ====================

/// Заполняемая форма поиска по критериям. Словарь полей — как в UI
/// (`title`/`supervisor`), на проводе он превращается в словарь хранилища
/// (`theme`/`director`). Пустая строка значит «без ограничения».
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriteriaDraft {
    pub group: String,
    pub fio: String,
    pub title: String,
    pub supervisor: String,
    /// Kept as raw text; coerced to an integer only when the query is sent.
    pub year: String,
    pub order: String,
    pub reviewer: String,
    pub discipline: String,
}

impl CriteriaDraft {
    pub fn clear(&mut self) {
        *self = CriteriaDraft::default();
    }

    /// Map the UI vocabulary to the storage vocabulary. Non-numeric year
    /// becomes 0, not an error — permissive on purpose.
    pub fn to_request(&self, search_type: DocType) -> FilteredRequest {
        FilteredRequest {
            director: self.supervisor.clone(),
            discipline: self.discipline.clone(),
            fio: self.fio.clone(),
            group: self.group.clone(),
            order: self.order.clone(),
            reviewer: self.reviewer.clone(),
            theme: self.title.clone(),
            doc_type: search_type.to_string(),
            year: self.year.trim().parse::<i64>().unwrap_or(0),
        }
    }
}

// ==================== ПРОВОДНЫЕ ЗАПРОСЫ/ОТВЕТЫ ====================

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub search_line: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredRequest {
    pub director: String,
    pub discipline: String,
    pub fio: String,
    pub group: String,
    pub order: String,
    pub reviewer: String,
    pub theme: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub year: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateDocRequest {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub theme: String,
    pub fio: String,
    pub director: String,
    pub group: String,
    pub year: i64,
    pub order: String,
    pub reviewer: String,
    pub discipline: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateDocRequest {
    pub id: i64,
    #[serde(flatten)]
    pub doc: CreateDocRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteDocRequest {
    pub id: i64,
}

/// Lenient reading of a search/filtered response body: a missing or
/// non-array `docs` yields an empty list, unparseable records are skipped.
/// Malformed payloads must never crash the view.
pub fn docs_from_value(body: &serde_json::Value) -> Vec<Doc> {
    match body.get("docs").and_then(|d| d.as_array()) {
        Some(items) => items
            .iter()
            .filter_map(|item| match serde_json::from_value::<Doc>(item.clone()) {
                Ok(doc) => Some(doc),
                Err(err) => {
                    log::warn!("Skipping malformed document record: {}", err);
                    None
                }
            })
            .collect(),
        None => Vec::new(),
    }
}

// ==================== АУТЕНТИФИКАЦИЯ ====================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivateAccountRequest {
    pub link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// Both fields optional: the session holder treats an absent value as
/// "do not overwrite".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenPair {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}
