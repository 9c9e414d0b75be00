// src/main.rs - BD Doc command line client
use std::env;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use anyhow::Context;

use bddoc::api::HttpDocsApi;
use bddoc::auth::AuthController;
use bddoc::catalog::CatalogController;
use bddoc::config::load_config;
use bddoc::models::{DocForm, DocType};
use bddoc::session::{Session, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.clone()),
    )
    .init();

    let api = HttpDocsApi::new(&config.api.base_url, config.api.timeout_seconds)?;
    let store = SessionStore::open(&config.session.store_path, config.session.ttl_days);
    let mut session = Session::new(store);

    let args: Vec<String> = env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("help");

    match command {
        "login" => {
            let email = arg_at(&args, 1, "email")?;
            let password = arg_at(&args, 2, "password")?;
            AuthController::new(api).login(&mut session, email, password).await?;
            if session.take_just_logged_in() {
                println!("Добро пожаловать, {}!", session.username());
            }
        }
        "register" => {
            let username = arg_at(&args, 1, "username")?;
            let email = arg_at(&args, 2, "email")?;
            let password = arg_at(&args, 3, "password")?;
            AuthController::new(api)
                .register(&mut session, username, email, password)
                .await?;
            println!("Аккаунт создан, проверьте почту для активации");
        }
        "activate" => {
            let link = arg_at(&args, 1, "activation link")?;
            AuthController::new(api).activate_account(link).await?;
            println!("Аккаунт активирован");
        }
        "logout" => {
            AuthController::new(api).logout(&mut session).await?;
            println!("Сессия завершена");
        }
        "search" => {
            let text = args.get(1).cloned().unwrap_or_default();
            let mut catalog = CatalogController::new(api);
            catalog.search_by_text(&session, &text).await?;
            print_docs(catalog.docs());
        }
        "filter" => {
            let mut catalog = CatalogController::new(api);
            apply_criteria(&mut catalog, &args[1..])?;
            catalog.search_by_criteria(&session).await?;
            print_docs(catalog.docs());
        }
        "create" => {
            let form = form_from_args(&args[1..])?;
            CatalogController::new(api).create_doc(&session, &form).await?;
            println!("Документ создан");
        }
        "update" => {
            let id: i64 = arg_at(&args, 1, "id")?
                .parse()
                .context("id must be a number")?;
            let form = form_from_args(&args[2..])?;
            let mut catalog = CatalogController::new(api);
            catalog.update_doc(&session, id, &form).await?;
            println!("Документ {} обновлён", id);
        }
        "delete" => {
            let id: i64 = arg_at(&args, 1, "id")?
                .parse()
                .context("id must be a number")?;
            // Удаление необратимо, подтверждение живёт на этой границе
            if !confirm_delete(id)? {
                println!("Отменено");
                return Ok(());
            }
            let mut catalog = CatalogController::new(api);
            catalog.delete_doc(&session, id).await?;
            println!("Документ {} удалён", id);
        }
        _ => print_usage(),
    }

    Ok(())
}

fn arg_at<'a>(args: &'a [String], index: usize, name: &str) -> anyhow::Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .with_context(|| format!("Missing argument: {}", name))
}

/// Разбор пар `field=value` в черновик критериев. Поле `type` переключает
/// тип поиска, остальные ложатся в черновик как есть.
fn apply_criteria<A: bddoc::api::DocsApi>(
    catalog: &mut CatalogController<A>,
    pairs: &[String],
) -> anyhow::Result<()> {
    for pair in pairs {
        let (field, value) = pair
            .split_once('=')
            .with_context(|| format!("Expected field=value, got: {}", pair))?;
        if field == "type" {
            let search_type = DocType::from_str(value)
                .map_err(|_| anyhow::anyhow!("Unknown document type: {}", value))?;
            catalog.set_search_type(search_type);
            continue;
        }
        let criteria = catalog.criteria_mut();
        match field {
            "group" => criteria.group = value.to_string(),
            "fio" => criteria.fio = value.to_string(),
            "title" => criteria.title = value.to_string(),
            "supervisor" => criteria.supervisor = value.to_string(),
            "year" => criteria.year = value.to_string(),
            "order" => criteria.order = value.to_string(),
            "reviewer" => criteria.reviewer = value.to_string(),
            "discipline" => criteria.discipline = value.to_string(),
            other => anyhow::bail!("Unknown criteria field: {}", other),
        }
    }
    Ok(())
}

fn form_from_args(pairs: &[String]) -> anyhow::Result<DocForm> {
    let mut form = DocForm::default();
    for pair in pairs {
        let (field, value) = pair
            .split_once('=')
            .with_context(|| format!("Expected field=value, got: {}", pair))?;
        match field {
            "type" => form.doc_type = value.to_string(),
            "theme" => form.theme = value.to_string(),
            "fio" => form.fio = value.to_string(),
            "director" => form.director = value.to_string(),
            "group" => form.group = value.to_string(),
            "year" => form.year = value.parse().context("year must be a number")?,
            "order" => form.order = value.to_string(),
            "reviewer" => form.reviewer = value.to_string(),
            "discipline" => form.discipline = value.to_string(),
            other => anyhow::bail!("Unknown document field: {}", other),
        }
    }
    Ok(form)
}

fn confirm_delete(id: i64) -> anyhow::Result<bool> {
    print!("Удалить документ {}? [y/N] ", id);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "д" | "Д"))
}

fn print_docs(docs: &[bddoc::models::Doc]) {
    if docs.is_empty() {
        println!("Ничего не найдено");
        return;
    }
    for doc in docs {
        println!("{}", doc.describe());
    }
    println!("Всего: {}", docs.len());
}

fn print_usage() {
    println!("bddoc - клиент каталога дипломов и курсовых");
    println!();
    println!("Команды:");
    println!("  login <email> <password>");
    println!("  register <username> <email> <password>");
    println!("  activate <link>");
    println!("  logout");
    println!("  search [текст]");
    println!("  filter [field=value ...]   поля: type group fio title supervisor year order reviewer discipline");
    println!("  create [field=value ...]   поля: type theme fio director group year order reviewer discipline");
    println!("  update <id> [field=value ...]");
    println!("  delete <id>");
}
