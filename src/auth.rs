// src/auth.rs
//! Сценарии аутентификации: вход, регистрация, активация аккаунта, выход.
//!
//! Контроллер не хранит своего состояния, всё живёт в [`Session`]. Вход
//! запоминает пару токенов и черновик формы, выход гарантированно чистит
//! локальную сессию даже когда сервер недоступен.

use crate::api::DocsApi;
use crate::error::ApiResult;
use crate::models::{ActivateAccountRequest, LoginRequest, LogoutRequest, RegisterRequest};
use crate::session::Session;
use validator::Validate;

pub struct AuthController<A: DocsApi> {
    api: A,
}

impl<A: DocsApi> AuthController<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Вход по почте и паролю. При успехе пара токенов и черновик формы
    /// оседают в сессии, флаг `just_logged_in` взводится для приветствия.
    pub async fn login(&self, session: &mut Session, email: &str, password: &str) -> ApiResult<()> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        request.validate()?;

        let tokens = self.api.login(&request).await?;

        session.set_tokens(tokens.access_token.as_deref(), tokens.refresh_token.as_deref());
        session.remember_login_draft(email, password);
        session.mark_just_logged_in();
        log::info!("Logged in as {}", email);
        Ok(())
    }

    /// Регистрация нового аккаунта. Токенов не даёт, сервер шлёт письмо
    /// со ссылкой активации.
    pub async fn register(
        &self,
        session: &mut Session,
        username: &str,
        email: &str,
        password: &str,
    ) -> ApiResult<()> {
        let request = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        request.validate()?;

        self.api.register(&request).await?;
        session.set_username(username);
        log::info!("Registered account for {}", email);
        Ok(())
    }

    /// Активация аккаунта по ссылке из письма.
    pub async fn activate_account(&self, link: &str) -> ApiResult<()> {
        self.api
            .activate_account(&ActivateAccountRequest {
                link: link.to_string(),
            })
            .await?;
        log::info!("Account activated");
        Ok(())
    }

    /// Выход. Без refresh-токена сразу чистим сессию и не ходим в сеть.
    /// С токеном сначала пробуем отозвать его на сервере, но локальная
    /// очистка происходит при любом исходе.
    pub async fn logout(&self, session: &mut Session) -> ApiResult<()> {
        let refresh = match session.refresh_token() {
            Some(refresh) => refresh,
            None => {
                session.clear();
                return Ok(());
            }
        };

        let remote = self
            .api
            .logout(&LogoutRequest {
                refresh_token: refresh,
            })
            .await;
        if let Err(err) = &remote {
            log::warn!("Remote logout failed, clearing local session anyway: {}", err);
        }
        session.clear();
        remote
    }
}
