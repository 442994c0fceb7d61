use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Algorithm, Argon2, Params, Version,
};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use catalog_server::{
    api,
    config::AppConfig,
    models::User,
    repository::Repository,
    services::Services,
    store::{DocumentStore, MemoryStore},
    AppState,
};

const USERNAME: &str = "bibliotecario";
const PASSWORD: &str = "s3creta";

async fn spawn_app() -> Router {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let repository = Repository::new(store.clone());

    let params = Params::new(1024, 1, 1, None).unwrap();
    let password_hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(PASSWORD.as_bytes(), &SaltString::generate(&mut OsRng))
        .unwrap()
        .to_string();
    repository
        .users
        .insert(&User {
            id: "u1".to_string(),
            username: USERNAME.to_string(),
            password_hash,
            auth_key: None,
            auth_key_expiration: None,
        })
        .await
        .unwrap();

    let config = AppConfig::default();
    let services = Services::new(repository, config.auth.clone(), config.catalog.clone());

    api::create_router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
        store,
    })
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(body) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"username": USERNAME, "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["response"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/api/v1/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_login() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"username": USERNAME, "password": PASSWORD})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "Token generado correctamente");
    assert!(!body["response"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = spawn_app().await;

    for credentials in [
        json!({"username": USERNAME, "password": "otra"}),
        json!({"username": "nadie", "password": PASSWORD}),
        json!({"username": USERNAME}),
    ] {
        let (status, body) =
            send(&app, Method::POST, "/api/v1/auth/login", None, Some(credentials)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["response"], Value::Null);
        assert_eq!(body["message"], "Credenciales incorrectas");
        assert_eq!(body["status"], "error");
    }
}

#[tokio::test]
async fn test_password_hash_endpoint() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/password",
        None,
        Some(json!({"password": "nueva"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Contraseña generada correctamente");
    assert!(body["response"].as_str().unwrap().starts_with("$argon2"));

    let (status, body) = send(&app, Method::POST, "/api/v1/auth/password", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_catalog_requires_token() {
    let app = spawn_app().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/authors", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token no existente");

    let (status, body) = send(&app, Method::GET, "/api/v1/books", Some("inventado"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token no válido o caducado");

    // an unsupported verb still checks the token first
    let (status, _) = send(&app, Method::POST, "/api/v1/authors/view", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_second_login_invalidates_first_token() {
    let app = spawn_app().await;
    let first = login(&app).await;
    let second = login(&app).await;
    assert_ne!(first, second);

    let (status, _) = send(&app, Method::GET, "/api/v1/authors", Some(&first), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/v1/authors", Some(&second), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_method_not_allowed() {
    let app = spawn_app().await;
    let token = login(&app).await;

    let (status, body) =
        send(&app, Method::POST, "/api/v1/books/view", Some(&token), None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["response"], json!([]));
    assert_eq!(body["message"], "Método no permitido");
    assert_eq!(body["status"], "error");

    let (status, _) = send(&app, Method::GET, "/api/v1/auth/login", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_author_book_lifecycle() {
    let app = spawn_app().await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/authors",
        Some(&token),
        Some(json!({"fullname": "Jorge Luis Borges", "birthdate": "1899-08-24"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Autor agregado con éxito");
    assert_eq!(body["response"]["state"], "ACTIVE");
    let author_id = body["response"]["_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(&token),
        Some(json!({
            "title": "Ficciones",
            "publicationYear": "1944",
            "description": "Cuentos",
            "authors": [author_id, "desconocido"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Libro agregado con éxito");
    assert_eq!(body["response"]["publicationYear"], 1944);
    let authors = body["response"]["authors"].as_array().unwrap();
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0]["_id"], author_id.as_str());
    assert!(authors[0].get("books").is_none());
    let book_id = body["response"]["_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/books/view",
        Some(&token),
        Some(json!({"_id": book_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Libro encontrado");
    assert_eq!(body["response"]["title"], "Ficciones");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/authors",
        Some(&token),
        Some(json!({
            "_id": author_id,
            "fullname": "J. L. Borges",
            "birthdate": "1899-08-24"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Autor editado con éxito");
    assert_eq!(body["response"]["fullname"], "J. L. Borges");

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/api/v1/authors",
        Some(&token),
        Some(json!({"_id": author_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], true);
    assert_eq!(body["message"], "Autor eliminado correctamente");

    // the book no longer embeds the deleted author
    let (_, body) = send(
        &app,
        Method::GET,
        "/api/v1/books/view",
        Some(&token),
        Some(json!({"_id": book_id})),
    )
    .await;
    assert_eq!(body["response"]["authors"], json!([]));

    let (status, body) = send(&app, Method::GET, "/api/v1/authors", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Autores encontrados");
    assert_eq!(body["response"], json!([]));

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/api/v1/authors",
        Some(&token),
        Some(json!({"_id": author_id})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No se encontró el autor referenciado");
}

#[tokio::test]
async fn test_validation_errors() {
    let app = spawn_app().await;
    let token = login(&app).await;

    let (status, body) =
        send(&app, Method::POST, "/api/v1/authors", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "El nombre completo del autor es obligatorio");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/authors",
        Some(&token),
        Some(json!({"fullname": "Borges", "birthdate": "24/08/1899"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "El formato de Fecha de nacimiento es inválido.");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(&token),
        Some(json!({"title": "Ficciones", "publicationYear": "44", "description": "Cuentos"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "El formato de Año de publicación es inválido.");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(&token),
        Some(json!({
            "title": "Ficciones",
            "publicationYear": 1944,
            "description": "Cuentos",
            "authors": "a1"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "'authors' debe ser un array");
}

#[tokio::test]
async fn test_missing_id_messages() {
    let app = spawn_app().await;
    let token = login(&app).await;

    let cases = [
        (Method::GET, "/api/v1/authors/view", "Se debe mandar el campo '_id'"),
        (Method::PATCH, "/api/v1/authors", "Se requiere el '_id' del autor"),
        (Method::DELETE, "/api/v1/authors", "Se debe enviar el '_id' del autor"),
        (Method::GET, "/api/v1/books/view", "Se debe mandar el campo '_id'"),
        (Method::PUT, "/api/v1/books", "Se debe enviar el '_id' del libro"),
        (Method::DELETE, "/api/v1/books", "Se debe enviar el '_id' del libro"),
    ];

    for (method, uri, message) in cases {
        let (status, body) = send(&app, method, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["message"], message);
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = spawn_app().await;
    let token = login(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/books")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"title\": "))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_head_list() {
    let app = spawn_app().await;
    let token = login(&app).await;

    let (status, _) = send(&app, Method::HEAD, "/api/v1/books", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_mistyped_fields_are_validation_errors() {
    let app = spawn_app().await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(&token),
        Some(json!({"title": 5, "publicationYear": "1944", "description": "D"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Titulo debe ser una cadena de texto.");
    assert_eq!(body["status"], "error");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/authors",
        Some(&token),
        Some(json!({"fullname": "Jorge Icaza", "birthdate": 19060710})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "El formato de Fecha de nacimiento es inválido.");

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/authors/view",
        Some(&token),
        Some(json!({"_id": 42})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No se encontró el autor referenciado");
}

#[tokio::test]
async fn test_blank_required_fields_are_rejected() {
    let app = spawn_app().await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/authors",
        Some(&token),
        Some(json!({"fullname": "   ", "birthdate": "1906-07-10"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "El nombre completo del autor es obligatorio");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(&token),
        Some(json!({"title": "Huasipungo", "publicationYear": "1934", "description": "\t"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "La descripción es obligatoria.");

    let (_, body) = send(&app, Method::GET, "/api/v1/authors", Some(&token), None).await;
    assert_eq!(body["response"], json!([]));
}

#[tokio::test]
async fn test_responses_are_gzip_compressed_on_request() {
    let app = spawn_app().await;
    let token = login(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/books")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::ACCEPT_ENCODING, "gzip")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_ENCODING], "gzip");
}
