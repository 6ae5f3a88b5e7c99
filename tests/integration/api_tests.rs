//! API integration tests
//!
//! Each test serves the real router on an ephemeral port, backed by the
//! in-memory store and identity provider.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

use biblioteca_api::{
    api,
    config::{AppConfig, StoreBackend},
    repository::{
        memory::{MemoryIdentity, MemoryStore},
        Repository,
    },
    AppState,
};

struct TestApp {
    base_url: String,
    client: Client,
    store: Arc<MemoryStore>,
    identities: Arc<MemoryIdentity>,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Helper to start a server on a random local port
async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let identities = Arc::new(MemoryIdentity::new());
    let repository = Repository::new(store.clone(), identities.clone());

    let mut config = AppConfig::default();
    config.store.backend = StoreBackend::Memory;
    let app = api::create_router(AppState::new(config, repository));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        base_url: format!("http://{}", addr),
        client: Client::new(),
        store,
        identities,
    }
}

fn dune() -> Value {
    json!({
        "titulo": "Dune",
        "autor": "Herbert",
        "anio_publicacion": 1965,
        "genero": "scifi",
        "imagen": "url"
    })
}

fn loan() -> Value {
    json!({
        "libro_id": "libro-1",
        "usuario_id": "usuario-1",
        "fecha_prestamo": "2024-05-01",
        "fecha_devolucion": "2024-05-15"
    })
}

fn ana(dni: &str) -> Value {
    json!({
        "nombres": "Ana",
        "apellidos": "Quispe",
        "telefono": "987654321",
        "direccion": "Av. Sol 123",
        "rol": "bibliotecario",
        "dni": dni,
        "email": "ana@example.com",
        "password": "secreto1"
    })
}

async fn create(app: &TestApp, path: &str, body: &Value) -> String {
    let response = app
        .client
        .post(app.url(path))
        .json(body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_str().expect("No id in response").to_string()
}

#[tokio::test]
async fn test_root_and_health() {
    let app = spawn_app().await;

    let response = app.client.get(app.url("/")).send().await.unwrap();
    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "API REST de Moviles II");

    let response = app.client.get(app.url("/health")).send().await.unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_book_lifecycle() {
    let app = spawn_app().await;

    let id = create(&app, "/libros", &dune()).await;

    let response = app.client.get(app.url(&format!("/libros/{}", id))).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], json!(id));
    assert_eq!(body["data"], dune());

    let response = app
        .client
        .delete(app.url(&format!("/libros/delete/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.text().await.unwrap().is_empty());

    let response = app.client.get(app.url(&format!("/libros/{}", id))).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Libro no encontrado");
}

#[tokio::test]
async fn test_create_book_missing_field_persists_nothing() {
    let app = spawn_app().await;

    for field in ["titulo", "autor", "anio_publicacion", "genero", "imagen"] {
        let mut payload = dune();
        payload.as_object_mut().unwrap().remove(field);

        let response = app.client.post(app.url("/libros")).json(&payload).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{field}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Todos los campos son obligatorios");
    }

    assert_eq!(app.store.count("libros").await, 0);
}

#[tokio::test]
async fn test_merge_update_preserves_other_fields() {
    let app = spawn_app().await;
    let id = create(&app, "/libros", &dune()).await;

    let response = app
        .client
        .put(app.url(&format!("/libros/{}", id)))
        .json(&json!({ "genero": "ciencia ficción" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Libro actualizado");

    let body: Value = app
        .client
        .get(app.url(&format!("/libros/{}", id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let mut expected = dune();
    expected["genero"] = json!("ciencia ficción");
    assert_eq!(body["data"], expected);
}

#[tokio::test]
async fn test_update_absent_book_creates_it() {
    let app = spawn_app().await;

    let response = app
        .client
        .put(app.url("/libros/nuevo"))
        .json(&json!({ "titulo": "Solo título" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = app.client.get(app.url("/libros/nuevo")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["data"], json!({ "titulo": "Solo título" }));
}

#[tokio::test]
async fn test_list_aliases() {
    let app = spawn_app().await;
    create(&app, "/libros", &dune()).await;
    create(&app, "/libros", &dune()).await;

    for path in ["/libros", "/libros/lista"] {
        let body: Value = app.client.get(app.url(path)).send().await.unwrap().json().await.unwrap();
        assert_eq!(body.as_array().map(Vec::len), Some(2), "{path}");
    }
}

#[tokio::test]
async fn test_bulk_rejects_whole_batch() {
    let app = spawn_app().await;

    let mut bad = dune();
    bad["imagen"] = json!("");
    let response = app
        .client
        .post(app.url("/libros/bulk"))
        .json(&json!([dune(), dune(), bad]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.store.count("libros").await, 0);
}

#[tokio::test]
async fn test_bulk_loans() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/prestamos/bulk"))
        .json(&json!([loan(), loan(), loan()]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Préstamos añadidos correctamente");
    assert_eq!(body["ids"].as_array().map(Vec::len), Some(3));
    assert_eq!(app.store.count("prestamos").await, 3);
}

#[tokio::test]
async fn test_loan_lifecycle() {
    let app = spawn_app().await;

    let mut incomplete = loan();
    incomplete.as_object_mut().unwrap().remove("usuario_id");
    let response = app.client.post(app.url("/prestamos")).json(&incomplete).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let id = create(&app, "/prestamos", &loan()).await;

    let response = app
        .client
        .put(app.url(&format!("/prestamos/{}", id)))
        .json(&json!({ "fecha_devolucion": "2024-05-30" }))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Préstamo actualizado");

    let response = app
        .client
        .delete(app.url(&format!("/prestamos/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.client.get(app.url(&format!("/prestamos/{}", id))).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = spawn_app().await;

    let response = app.client.delete(app.url("/libros/no-existe")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_person_invalid_dni() {
    let app = spawn_app().await;

    let response = app.client.post(app.url("/usuarios")).json(&ana("1234567")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "El DNI debe tener exactamente 8 caracteres");

    assert_eq!(app.store.count("usuarios").await, 0);
}

#[tokio::test]
async fn test_person_lifecycle() {
    let app = spawn_app().await;

    let id = create(&app, "/usuarios", &ana("12345678")).await;
    assert!(app.identities.exists(&id).await);

    let body: Value = app
        .client
        .get(app.url(&format!("/usuarios/{}", id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["id"], json!(id));
    assert_eq!(body["data"]["dni"], "12345678");
    assert!(body["data"].get("email").is_none());
    assert!(body["data"].get("password").is_none());

    // merge skips the dni length check
    let response = app
        .client
        .put(app.url(&format!("/empleados/{}", id)))
        .json(&json!({ "dni": "1" }))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Usuario actualizado");

    let response = app
        .client
        .delete(app.url(&format!("/usuarios/delete/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!app.identities.exists(&id).await);

    let response = app.client.get(app.url(&format!("/usuarios/{}", id))).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_employee_aliases() {
    let app = spawn_app().await;

    let id = create(&app, "/empleados", &ana("87654321")).await;

    let body: Value = app.client.get(app.url("/empleados")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body[0]["id"], json!(id));

    let body: Value = app
        .client
        .get(app.url("/usuarios/lista"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let response = app
        .client
        .delete(app.url(&format!("/empleados/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_duplicate_email_fails_before_document_write() {
    let app = spawn_app().await;
    create(&app, "/usuarios", &ana("12345678")).await;

    let response = app.client.post(app.url("/usuarios")).json(&ana("11112222")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.store.count("usuarios").await, 1);
}

#[tokio::test]
async fn test_delete_person_without_principal_is_partial() {
    let app = spawn_app().await;

    // a document with no matching principal
    let response = app
        .client
        .put(app.url("/usuarios/huerfano"))
        .json(&json!({ "nombres": "Sin cuenta" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.client.delete(app.url("/usuarios/huerfano")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // the document half went through
    let response = app.client.get(app.url("/usuarios/huerfano")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_object_payloads_are_missing_fields() {
    let app = spawn_app().await;

    let cases = [
        ("/libros/bulk", json!([dune(), "x"])),
        ("/libros/bulk", json!({ "titulo": "Dune" })),
        ("/libros", json!([])),
        ("/libros", json!("Dune")),
        ("/prestamos/bulk", json!([loan(), 7])),
        ("/usuarios", json!(null)),
    ];
    for (path, payload) in cases {
        let response = app.client.post(app.url(path)).json(&payload).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path} {payload}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Todos los campos son obligatorios");
    }

    assert_eq!(app.store.count("libros").await, 0);
    assert_eq!(app.store.count("prestamos").await, 0);
    assert_eq!(app.store.count("usuarios").await, 0);
}

#[tokio::test]
async fn test_body_without_json_content_type_reads_as_empty() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/prestamos"))
        .body(loan().to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Todos los campos son obligatorios");

    let response = app
        .client
        .put(app.url("/libros/vacio"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.store.count("prestamos").await, 0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/libros"))
        .header("content-type", "application/json")
        .body("{\"titulo\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.store.count("libros").await, 0);
}

#[tokio::test]
async fn test_required_fields_message_is_shared() {
    let app = spawn_app().await;

    let mut person = ana("12345678");
    person.as_object_mut().unwrap().remove("telefono");
    let cases = [
        ("/libros", json!({ "titulo": "Dune" })),
        ("/libros/bulk", json!([{ "titulo": "Dune" }])),
        ("/prestamos", json!({ "libro_id": "l1" })),
        ("/prestamos/bulk", json!([{ "libro_id": "l1" }])),
        ("/usuarios", person),
    ];
    for (path, payload) in cases {
        let response = app.client.post(app.url(path)).json(&payload).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Todos los campos son obligatorios", "{path}");
    }
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = spawn_app().await;

    let response = app.client.get(app.url("/api-docs/openapi.json")).send().await.unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert!(body["paths"]["/libros/bulk"].is_object());
}
