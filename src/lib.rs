// src/lib.rs - BD Doc client library
//
// Клиент каталога документов (дипломы и курсовые): сессия с парой
// bearer-токенов плюс контроллеры поиска, мутаций и аутентификации
// поверх HTTP JSON API.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod session;

pub use api::{DocsApi, HttpDocsApi};
pub use auth::AuthController;
pub use catalog::CatalogController;
pub use config::{load_config, Config};
pub use error::{ApiError, ApiResult};
pub use models::{CriteriaDraft, Doc, DocForm, DocType};
pub use session::{Session, SessionStore};
