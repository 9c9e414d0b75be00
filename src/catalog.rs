// src/catalog.rs
//! Контроллер каталога: список результатов, активный запрос и жизненный
//! цикл мутаций.
//!
//! Три точки входа (глобальный поиск, поиск по критериям, мутации) сходятся
//! на одном списке. Поиск заменяет список целиком, update/delete латают его
//! на месте. `is_loading` снимается на каждой ветке завершения.

use crate::api::DocsApi;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    CriteriaDraft, DeleteDocRequest, Doc, DocForm, DocType, SearchRequest,
};
use crate::session::Session;
use validator::Validate;

pub struct CatalogController<A: DocsApi> {
    pub(crate) api: A,
    docs: Vec<Doc>,
    is_loading: bool,
    last_error: Option<ApiError>,
    search_type: DocType,
    criteria: CriteriaDraft,
}

impl<A: DocsApi> CatalogController<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            docs: Vec::new(),
            is_loading: false,
            last_error: None,
            search_type: DocType::default(),
            criteria: CriteriaDraft::default(),
        }
    }

    // ==================== STATE ACCESSORS ====================

    pub fn docs(&self) -> &[Doc] {
        &self.docs
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    pub fn search_type(&self) -> DocType {
        self.search_type
    }

    pub fn criteria(&self) -> &CriteriaDraft {
        &self.criteria
    }

    pub fn criteria_mut(&mut self) -> &mut CriteriaDraft {
        &mut self.criteria
    }

    /// Переключение типа поиска сбрасывает недозаполненные критерии,
    /// но показанный список не трогает до следующего запроса.
    pub fn set_search_type(&mut self, search_type: DocType) {
        if self.search_type != search_type {
            self.search_type = search_type;
            self.criteria.clear();
        }
    }

    // ==================== SEARCH ====================

    /// Free-text search. Empty text is a legal query — the server decides
    /// what it means.
    pub async fn search_by_text(&mut self, session: &Session, text: &str) -> ApiResult<()> {
        self.is_loading = true;
        self.last_error = None;

        // No token still goes to the wire: rejection is the server's call
        let token = session.access_token();
        let request = SearchRequest {
            search_line: text.to_string(),
        };
        let result = self.api.search(token.as_deref(), &request).await;
        self.settle_search(result)
    }

    /// Criteria search over the current draft, scoped by the active type.
    pub async fn search_by_criteria(&mut self, session: &Session) -> ApiResult<()> {
        self.is_loading = true;
        self.last_error = None;

        let token = session.access_token();
        let request = self.criteria.to_request(self.search_type);
        let result = self.api.filtered(token.as_deref(), &request).await;
        self.settle_search(result)
    }

    // Единая точка завершения поиска: успех заменяет список целиком,
    // ошибка очищает его и запоминается для вида. `is_loading` снимается
    // здесь на обоих исходах.
    fn settle_search(&mut self, result: ApiResult<Vec<Doc>>) -> ApiResult<()> {
        self.is_loading = false;
        match result {
            Ok(docs) => {
                log::info!("Search settled with {} document(s)", docs.len());
                self.docs = docs;
                Ok(())
            }
            Err(err) => {
                log::warn!("Search failed: {}", err);
                self.docs.clear();
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    // ==================== MUTATIONS ====================

    /// Create a document. On success the visible list is intentionally left
    /// alone: creation and search are decoupled, the new record shows up
    /// only after the user re-searches.
    pub async fn create_doc(&self, session: &Session, form: &DocForm) -> ApiResult<()> {
        form.validate()?;

        let token = session.access_token();
        self.api
            .create(token.as_deref(), &form.to_create_request())
            .await?;
        log::info!("Document created");
        Ok(())
    }

    /// Update a document and patch the list in place: the matching record is
    /// replaced by the form merged over it, everything else keeps its spot.
    /// A failed update leaves the list untouched.
    pub async fn update_doc(&mut self, session: &Session, id: i64, form: &DocForm) -> ApiResult<()> {
        form.validate()?;

        let token = session.access_token();
        self.api
            .update(token.as_deref(), &form.to_update_request(id))
            .await?;

        for doc in &mut self.docs {
            if doc.id == Some(id) {
                *doc = form.apply_to(doc);
            }
        }
        log::info!("Document {} updated", id);
        Ok(())
    }

    /// Delete a document. Needs a present access token — without one the
    /// operation is rejected locally and no request is sent. Confirmation of
    /// the irreversible action is the caller's job.
    pub async fn delete_doc(&mut self, session: &Session, id: i64) -> ApiResult<()> {
        let token = match session.access_token() {
            Some(token) => token,
            None => return Err(ApiError::no_access_token()),
        };

        self.api
            .delete(Some(&token), &DeleteDocRequest { id })
            .await?;

        self.docs.retain(|doc| doc.id != Some(id));
        log::info!("Document {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeApi;
    use crate::session::{Session, SessionStore};
    use tempfile::tempdir;

    fn session_with_token(token: Option<&str>) -> (tempfile::TempDir, Session) {
        let dir = tempdir().unwrap();
        let store = SessionStore::open(dir.path().join("session.json"), 7);
        let mut session = Session::new(store);
        if let Some(token) = token {
            session.set_tokens(Some(token), Some("refresh"));
        }
        (dir, session)
    }

    fn doc(id: i64, theme: &str) -> Doc {
        Doc {
            id: Some(id),
            doc_type: "diploma".to_string(),
            theme: theme.to_string(),
            fio: String::new(),
            director: String::new(),
            group: String::new(),
            year: 0,
            order: String::new(),
            reviewer: String::new(),
            discipline: String::new(),
        }
    }

    #[tokio::test]
    async fn test_search_replaces_list_in_order() {
        let api = FakeApi::new();
        api.push_search(Ok(vec![doc(2, "Б"), doc(1, "А")]));
        let (_dir, session) = session_with_token(Some("acc"));
        let mut ctl = CatalogController::new(api);

        ctl.search_by_text(&session, "учёт").await.unwrap();
        assert_eq!(ctl.docs().len(), 2);
        assert_eq!(ctl.docs()[0].id, Some(2));
        assert_eq!(ctl.docs()[1].id, Some(1));
        assert!(!ctl.is_loading());
        assert!(ctl.last_error().is_none());
    }

    #[tokio::test]
    async fn test_search_attaches_bearer_token() {
        let api = FakeApi::new();
        let (_dir, session) = session_with_token(Some("acc-123"));
        let mut ctl = CatalogController::new(api);

        ctl.search_by_text(&session, "").await.unwrap();
        let tokens = ctl.api.seen_tokens.lock().unwrap();
        assert_eq!(tokens.as_slice(), &[Some("acc-123".to_string())]);
    }

    #[tokio::test]
    async fn test_search_without_token_still_goes_to_wire() {
        let api = FakeApi::new();
        let (_dir, session) = session_with_token(None);
        let mut ctl = CatalogController::new(api);

        ctl.search_by_text(&session, "any").await.unwrap();
        let tokens = ctl.api.seen_tokens.lock().unwrap();
        assert_eq!(tokens.as_slice(), &[None]);
    }

    #[tokio::test]
    async fn test_search_failure_clears_list_and_sets_error() {
        let api = FakeApi::new();
        api.push_search(Ok(vec![doc(1, "А")]));
        api.push_search(Err(ApiError::SearchRejected("HTTP 500".into())));
        let (_dir, session) = session_with_token(Some("acc"));
        let mut ctl = CatalogController::new(api);

        ctl.search_by_text(&session, "первый").await.unwrap();
        assert_eq!(ctl.docs().len(), 1);

        let err = ctl.search_by_text(&session, "второй").await.unwrap_err();
        assert_eq!(err.kind(), "search-rejected");
        assert!(ctl.docs().is_empty());
        assert_eq!(ctl.last_error().map(|e| e.kind()), Some("search-rejected"));
        assert!(!ctl.is_loading());
    }

    #[tokio::test]
    async fn test_connection_failure_is_distinct_kind() {
        let api = FakeApi::new();
        api.push_search(Err(ApiError::ConnectionFailed("refused".into())));
        let (_dir, session) = session_with_token(Some("acc"));
        let mut ctl = CatalogController::new(api);

        let err = ctl.search_by_text(&session, "x").await.unwrap_err();
        assert_eq!(err.kind(), "connection-failed");
        assert_eq!(
            ctl.last_error().map(|e| e.kind()),
            Some("connection-failed")
        );
    }

    #[tokio::test]
    async fn test_new_search_clears_previous_error() {
        let api = FakeApi::new();
        api.push_search(Err(ApiError::SearchRejected("HTTP 500".into())));
        api.push_search(Ok(vec![doc(1, "А")]));
        let (_dir, session) = session_with_token(Some("acc"));
        let mut ctl = CatalogController::new(api);

        let _ = ctl.search_by_text(&session, "a").await;
        assert!(ctl.last_error().is_some());
        ctl.search_by_text(&session, "b").await.unwrap();
        assert!(ctl.last_error().is_none());
    }

    #[tokio::test]
    async fn test_criteria_search_is_idempotent() {
        let api = FakeApi::new();
        api.push_filtered(Ok(vec![doc(1, "А"), doc(2, "Б")]));
        api.push_filtered(Ok(vec![doc(1, "А"), doc(2, "Б")]));
        let (_dir, session) = session_with_token(Some("acc"));
        let mut ctl = CatalogController::new(api);
        ctl.criteria_mut().group = "ИС-31".to_string();

        ctl.search_by_criteria(&session).await.unwrap();
        let first = ctl.docs().to_vec();
        ctl.search_by_criteria(&session).await.unwrap();
        assert_eq!(ctl.docs(), first.as_slice());
    }

    #[tokio::test]
    async fn test_criteria_empty_year_sends_zero() {
        let api = FakeApi::new();
        let (_dir, session) = session_with_token(Some("acc"));
        let mut ctl = CatalogController::new(api);
        ctl.set_search_type(DocType::Coursework);
        ctl.criteria_mut().year = String::new();

        ctl.search_by_criteria(&session).await.unwrap();
        let sent = ctl.api.last_filtered.lock().unwrap().clone().unwrap();
        assert_eq!(sent.year, 0);
        assert_eq!(sent.doc_type, "coursework");
    }

    #[tokio::test]
    async fn test_switching_search_type_clears_criteria_not_docs() {
        let api = FakeApi::new();
        api.push_search(Ok(vec![doc(1, "А")]));
        let (_dir, session) = session_with_token(Some("acc"));
        let mut ctl = CatalogController::new(api);

        ctl.search_by_text(&session, "x").await.unwrap();
        ctl.criteria_mut().fio = "Петров".to_string();

        ctl.set_search_type(DocType::Coursework);
        assert_eq!(ctl.criteria(), &CriteriaDraft::default());
        assert_eq!(ctl.docs().len(), 1);

        // Повторный выбор того же типа черновик не трогает
        ctl.criteria_mut().fio = "Петров".to_string();
        ctl.set_search_type(DocType::Coursework);
        assert_eq!(ctl.criteria().fio, "Петров");
    }

    #[tokio::test]
    async fn test_create_does_not_touch_list() {
        let api = FakeApi::new();
        api.push_search(Ok(vec![doc(1, "А")]));
        let (_dir, session) = session_with_token(Some("acc"));
        let mut ctl = CatalogController::new(api);
        ctl.search_by_text(&session, "x").await.unwrap();

        let form = DocForm {
            theme: "Новый документ".to_string(),
            ..DocForm::default()
        };
        ctl.create_doc(&session, &form).await.unwrap();
        // Создание и поиск разведены: запись появится только после
        // следующего явного поиска
        assert_eq!(ctl.docs().len(), 1);
        assert_eq!(ctl.docs()[0].id, Some(1));
    }

    #[tokio::test]
    async fn test_create_requires_type_at_boundary() {
        let api = FakeApi::new();
        let (_dir, session) = session_with_token(Some("acc"));
        let ctl = CatalogController::new(api);

        let form = DocForm {
            doc_type: String::new(),
            ..DocForm::default()
        };
        let err = ctl.create_doc(&session, &form).await.unwrap_err();
        assert_eq!(err.kind(), "validation");
        // Валидация срезается до сети
        assert!(ctl.api.seen_tokens.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_patches_matching_record_only() {
        let api = FakeApi::new();
        api.push_search(Ok(vec![doc(1, "А"), doc(2, "Б"), doc(3, "В")]));
        let (_dir, session) = session_with_token(Some("acc"));
        let mut ctl = CatalogController::new(api);
        ctl.search_by_text(&session, "x").await.unwrap();
        let before = ctl.docs().to_vec();

        let form = DocForm {
            doc_type: "Coursework".to_string(),
            theme: "Обновлённая".to_string(),
            ..DocForm::default()
        };
        ctl.update_doc(&session, 2, &form).await.unwrap();

        assert_eq!(ctl.docs().len(), 3);
        assert_eq!(ctl.docs()[0], before[0]);
        assert_eq!(ctl.docs()[2], before[2]);
        assert_eq!(ctl.docs()[1].id, Some(2));
        assert_eq!(ctl.docs()[1].doc_type, "coursework");
        assert_eq!(ctl.docs()[1].theme, "Обновлённая");
    }

    #[tokio::test]
    async fn test_failed_update_leaves_list_untouched() {
        let api = FakeApi::new();
        api.push_search(Ok(vec![doc(1, "А")]));
        api.set_mutation_reply(Err(ApiError::MutationRejected("failed to update".into())));
        let (_dir, session) = session_with_token(Some("acc"));
        let mut ctl = CatalogController::new(api);
        ctl.search_by_text(&session, "x").await.unwrap();
        let before = ctl.docs().to_vec();

        let err = ctl
            .update_doc(&session, 1, &DocForm::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "mutation-rejected");
        assert_eq!(ctl.docs(), before.as_slice());
        // Ошибка мутации — мимолётное уведомление, не inline-ошибка списка
        assert!(ctl.last_error().is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_matching_record() {
        let api = FakeApi::new();
        api.push_search(Ok(vec![doc(1, "А"), doc(2, "Б"), doc(3, "В")]));
        let (_dir, session) = session_with_token(Some("acc"));
        let mut ctl = CatalogController::new(api);
        ctl.search_by_text(&session, "x").await.unwrap();

        ctl.delete_doc(&session, 2).await.unwrap();
        assert_eq!(ctl.docs().len(), 2);
        assert_eq!(ctl.docs()[0].id, Some(1));
        assert_eq!(ctl.docs()[1].id, Some(3));
    }

    #[tokio::test]
    async fn test_delete_without_token_sends_nothing() {
        let api = FakeApi::new();
        let (_dir, session) = session_with_token(None);
        let mut ctl = CatalogController::new(api);

        let err = ctl.delete_doc(&session, 1).await.unwrap_err();
        assert_eq!(err.kind(), "auth-missing");
        assert_eq!(*ctl.api.delete_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_list_untouched() {
        let api = FakeApi::new();
        api.push_search(Ok(vec![doc(1, "А")]));
        api.set_mutation_reply(Err(ApiError::MutationRejected("failed to delete".into())));
        let (_dir, session) = session_with_token(Some("acc"));
        let mut ctl = CatalogController::new(api);
        ctl.search_by_text(&session, "x").await.unwrap();

        assert!(ctl.delete_doc(&session, 1).await.is_err());
        assert_eq!(ctl.docs().len(), 1);
    }
}
