use client_manager::api::{Api, ApiError};
use client_manager::models::ClientDraft;
use client_manager::models::ClientStatus;
use client_manager::query::{QueryDescriptor, SortDirection};
use serde_json::json;
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn client_body(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "email": "john@techcorp.com",
        "phone": "+1-555-0123",
        "company": "TechCorp Inc.",
        "address": "123 Business Ave, NYC",
        "status": "active",
        "createdAt": "2024-01-15"
    })
}

#[tokio::test]
async fn list_clients_sends_the_descriptor_and_decodes_the_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/clients"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "10"))
        .and(query_param("search", "tech"))
        .and(query_param("sort", "createdAt:desc"))
        .and(query_param("status", "active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Clients retrieved",
            "data": [client_body("1", "John Smith")],
            "pagination": { "page": 2, "limit": 10, "total": 11, "pages": 2 }
        })))
        .mount(&mock_server)
        .await;

    let api = Api::new(&mock_server.uri()).unwrap();
    let query = QueryDescriptor::new(2, 10)
        .unwrap()
        .search("tech")
        .filter("status", "active")
        .sort("createdAt", SortDirection::Desc);

    let page = api.list_clients(&query).await.unwrap();
    assert_eq!(page.total, 11);
    assert_eq!(page.pages, 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "John Smith");
    assert_eq!(page.items[0].status, ClientStatus::Active);
}

#[tokio::test]
async fn bearer_token_is_attached_once_set() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/clients/1"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Client retrieved",
            "data": client_body("1", "John Smith")
        })))
        .mount(&mock_server)
        .await;

    let mut api = Api::new(&mock_server.uri()).unwrap();
    api.set_token(Some("tok-123".to_string()));

    let client = api.get_client("1").await.unwrap();
    assert_eq!(client.id, "1");
}

#[tokio::test]
async fn missing_record_maps_to_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/clients/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "message": "Client not found"
        })))
        .mount(&mock_server)
        .await;

    let api = Api::new(&mock_server.uri()).unwrap();
    let err = api.get_client("404").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
    assert_eq!(err.user_message(), "Resource not found.");
}

#[tokio::test]
async fn rejected_token_maps_to_authorization() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/clients"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "message": "Not authorized"
        })))
        .mount(&mock_server)
        .await;

    let api = Api::new(&mock_server.uri()).unwrap();
    let query = QueryDescriptor::new(1, 10).unwrap();
    let err = api.list_clients(&query).await.unwrap_err();
    assert!(matches!(err, ApiError::Authorization));
    assert_eq!(err.user_message(), "Session expired. Please login again.");
}

#[tokio::test]
async fn field_rejections_map_to_validation_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/clients"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "success": false,
            "message": "Validation failed",
            "errors": { "email": "Please enter a valid email address" }
        })))
        .mount(&mock_server)
        .await;

    let api = Api::new(&mock_server.uri()).unwrap();
    let draft = ClientDraft {
        name: "John Smith".to_string(),
        email: "not-an-email".to_string(),
        phone: "+1-555-0123".to_string(),
        company: "TechCorp Inc.".to_string(),
        address: None,
        status: ClientStatus::Active,
    };

    let err = api.create_client(&draft).await.unwrap_err();
    match err {
        ApiError::Validation(errors) => {
            assert_eq!(
                errors.get("email").unwrap(),
                "Please enter a valid email address"
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_failures_surface_the_server_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "message": "Internal server error. Please try again later."
        })))
        .mount(&mock_server)
        .await;

    let api = Api::new(&mock_server.uri()).unwrap();
    let query = QueryDescriptor::new(1, 10).unwrap();
    let err = api.list_projects(&query).await.unwrap_err();
    assert!(matches!(err, ApiError::Server(_)));
    assert_eq!(
        err.user_message(),
        "Internal server error. Please try again later."
    );
}

#[tokio::test]
async fn login_returns_the_token_and_user() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Login successful",
            "token": "tok-123",
            "user": {
                "id": "1",
                "name": "Admin User",
                "email": "admin@example.com",
                "role": "admin"
            }
        })))
        .mount(&mock_server)
        .await;

    let api = Api::new(&mock_server.uri()).unwrap();
    let auth = api.login("admin@example.com", "Abcdef1").await.unwrap();
    assert_eq!(auth.token, "tok-123");
    assert_eq!(auth.user.name, "Admin User");
}

#[tokio::test]
async fn delete_succeeds_on_a_bare_success_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/projects/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Project deleted"
        })))
        .mount(&mock_server)
        .await;

    let api = Api::new(&mock_server.uri()).unwrap();
    api.delete_project("3").await.unwrap();
}

#[tokio::test]
async fn unreachable_server_maps_to_a_network_error() {
    // Nothing listens on the discard port.
    let api = Api::new("http://127.0.0.1:9").unwrap();
    let query = QueryDescriptor::new(1, 10).unwrap();
    let err = api.list_clients(&query).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(
        err.user_message(),
        "Network error. Please check your connection."
    );
}
