//! Tests de integración de la API: auth, CRUD con aislamiento por
//! dueño, ledger de odómetro y métricas derivadas.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use kilometracker::config::environment::EnvironmentConfig;
use kilometracker::state::AppState;
use kilometracker::store::Store;

fn test_config() -> EnvironmentConfig {
    EnvironmentConfig {
        environment: "test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        jwt_secret: "secreto-de-test".to_string(),
        jwt_expiration: 3600,
        cors_origins: vec!["http://localhost:3000".to_string()],
        rate_limit_requests: 10_000,
        rate_limit_window: 900,
        auth_rate_limit_requests: 10_000,
        auth_rate_limit_window: 900,
    }
}

fn test_app() -> axum::Router {
    let state = AppState::new(Arc::new(Store::new()), test_config());
    kilometracker::build_router(state)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    // Los rechazos del extractor Json llegan como texto plano
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Registrar un usuario y devolver su token
async fn register(app: &axum::Router, email: &str, username: &str, role: &str) -> String {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": username,
                "email": email,
                "password": "secreta123",
                "role": role,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create_vehicle(app: &axum::Router, token: &str, alias: &str, initial: f64) {
    let (status, _) = send(
        app,
        request(
            "POST",
            "/api/vehicles",
            Some(token),
            Some(json!({
                "alias": alias,
                "marca": "Toyota",
                "modelo": 2020,
                "kilometrajeInicial": initial,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_register_login_me() {
    let app = test_app();
    register(&app, "ana@example.com", "ana", "write").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": "secreta123" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, request("GET", "/api/auth/me", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "ana");
    // El hash nunca viaja en la respuesta
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_me_without_token_is_unauthorized() {
    let app = test_app();
    let (status, body) = send(&app, request("GET", "/api/auth/me", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "No autorizado - Token no proporcionado");
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = test_app();
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "ana",
                "email": "ana@example.com",
                "password": "123",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = test_app();
    register(&app, "ana@example.com", "ana", "read").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "otra",
                "email": "ana@example.com",
                "password": "secreta123",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("ya existe"));
}

#[tokio::test]
async fn test_read_role_cannot_write() {
    let app = test_app();
    let token = register(&app, "lector@example.com", "lector", "read").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/vehicles",
            Some(&token),
            Some(json!({ "alias": "CAR1", "marca": "Toyota", "modelo": 2020 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("read"));

    // Pero sí puede listar
    let (status, _) = send(&app, request("GET", "/api/vehicles", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_endpoints_require_admin_role() {
    let app = test_app();
    let writer = register(&app, "ana@example.com", "ana", "write").await;
    let admin = register(&app, "root@example.com", "root", "admin").await;

    let (status, _) = send(&app, request("GET", "/api/auth/users", Some(&writer), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, request("GET", "/api/auth/users", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_admin_cannot_deactivate_own_account() {
    let app = test_app();
    let admin = register(&app, "root@example.com", "root", "admin").await;

    let (_, body) = send(&app, request("GET", "/api/auth/me", Some(&admin), None)).await;
    let admin_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        request(
            "DELETE",
            &format!("/api/auth/users/{}", admin_id),
            Some(&admin),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("No puedes desactivar tu propia cuenta"));
}

#[tokio::test]
async fn test_vehicle_alias_normalized_and_unique() {
    let app = test_app();
    let token = register(&app, "ana@example.com", "ana", "write").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/vehicles",
            Some(&token),
            Some(json!({ "alias": "  car1 ", "marca": "Toyota", "modelo": 2020 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["alias"], "CAR1");

    // Lookup insensible a mayúsculas
    let (status, _) = send(&app, request("GET", "/api/vehicles/car1", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);

    // Alias repetido para el mismo dueño
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/vehicles",
            Some(&token),
            Some(json!({ "alias": "CAR1", "marca": "Honda", "modelo": 2021 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("ya existe"));
}

#[tokio::test]
async fn test_odometer_reconciliation_scenario() {
    let app = test_app();
    let token = register(&app, "ana@example.com", "ana", "write").await;
    create_vehicle(&app, &token, "CAR1", 1000.0).await;

    // Crear ruta de 250 km
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/routes",
            Some(&token),
            Some(json!({ "vehicleAlias": "CAR1", "distanciaRecorrida": 250.0 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["vehicleKilometraje"], 1250.0);
    let route_id = body["data"]["id"].as_str().unwrap().to_string();

    // Corregir distancia a 400
    let (status, _) = send(
        &app,
        request(
            "PUT",
            &format!("/api/routes/{}", route_id),
            Some(&token),
            Some(json!({ "distanciaRecorrida": 400.0 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, request("GET", "/api/vehicles/CAR1", Some(&token), None)).await;
    assert_eq!(body["data"]["kilometrajeTotal"], 1400.0);

    // Borrar la ruta devuelve el total al inicial
    let (status, body) = send(
        &app,
        request(
            "DELETE",
            &format!("/api/routes/{}", route_id),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vehicleKilometraje"], 1000.0);
}

#[tokio::test]
async fn test_route_distance_must_be_positive() {
    let app = test_app();
    let token = register(&app, "ana@example.com", "ana", "write").await;
    create_vehicle(&app, &token, "CAR1", 0.0).await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/routes",
            Some(&token),
            Some(json!({ "vehicleAlias": "CAR1", "distanciaRecorrida": 0.0 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("La distancia debe ser mayor a 0"));
}

#[tokio::test]
async fn test_fuel_analysis_scenario() {
    let app = test_app();
    let token = register(&app, "ana@example.com", "ana", "write").await;
    create_vehicle(&app, &token, "CAR1", 0.0).await;

    for (amount, gallons) in [(500.0, 10.0), (600.0, 10.0)] {
        let (status, _) = send(
            &app,
            request(
                "POST",
                "/api/refuels",
                Some(&token),
                Some(json!({
                    "vehicleAlias": "CAR1",
                    "tipoCombustible": "Regular",
                    "cantidadGastada": amount,
                    "galones": gallons,
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        request(
            "GET",
            "/api/refuels/vehicle/CAR1/analysis",
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["summary"]["totalGalones"], "20.00");
    assert_eq!(body["data"]["summary"]["promedioGalonPrice"], "55.00");
    assert_eq!(body["data"]["porTipoCombustible"]["Regular"]["cantidad"], 2);
}

#[tokio::test]
async fn test_refuel_response_includes_derived_price() {
    let app = test_app();
    let token = register(&app, "ana@example.com", "ana", "write").await;
    create_vehicle(&app, &token, "CAR1", 0.0).await;

    let (_, body) = send(
        &app,
        request(
            "POST",
            "/api/refuels",
            Some(&token),
            Some(json!({
                "vehicleAlias": "CAR1",
                "tipoCombustible": "Premium",
                "cantidadGastada": 500.0,
                "galones": 10.0,
            })),
        ),
    )
    .await;
    assert_eq!(body["data"]["precioPorGalon"], "50.00");
}

#[tokio::test]
async fn test_ownership_isolation_returns_not_found() {
    let app = test_app();
    let ana = register(&app, "ana@example.com", "ana", "write").await;
    let eva = register(&app, "eva@example.com", "eva", "write").await;

    create_vehicle(&app, &ana, "CAR1", 1000.0).await;
    let (_, body) = send(
        &app,
        request(
            "POST",
            "/api/routes",
            Some(&ana),
            Some(json!({ "vehicleAlias": "CAR1", "distanciaRecorrida": 100.0 })),
        ),
    )
    .await;
    let route_id = body["data"]["id"].as_str().unwrap().to_string();

    // El vehículo y la ruta de ana no existen para eva: 404, nunca 403
    let (status, _) = send(&app, request("GET", "/api/vehicles/CAR1", Some(&eva), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        request("GET", &format!("/api/routes/{}", route_id), Some(&eva), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        request(
            "DELETE",
            &format!("/api/routes/{}", route_id),
            Some(&eva),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vehicle_soft_delete_is_idempotent() {
    let app = test_app();
    let token = register(&app, "ana@example.com", "ana", "write").await;
    create_vehicle(&app, &token, "CAR1", 0.0).await;

    for _ in 0..2 {
        let (status, body) = send(
            &app,
            request("DELETE", "/api/vehicles/CAR1", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["isActive"], false);
    }

    // Inactivo: no admite rutas nuevas pero sigue visible por alias
    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/routes",
            Some(&token),
            Some(json!({ "vehicleAlias": "CAR1", "distanciaRecorrida": 50.0 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, request("GET", "/api/vehicles/CAR1", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);

    // Reactivar lo devuelve al servicio
    let (status, body) = send(
        &app,
        request("PATCH", "/api/vehicles/CAR1/reactivate", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isActive"], true);
}

#[tokio::test]
async fn test_malformed_id_is_validation_error() {
    let app = test_app();
    let token = register(&app, "ana@example.com", "ana", "write").await;

    let (status, body) = send(
        &app,
        request("GET", "/api/routes/no-es-un-uuid", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("ID inválido"));
}

#[tokio::test]
async fn test_expense_summary_groups_and_sorts() {
    let app = test_app();
    let token = register(&app, "ana@example.com", "ana", "write").await;
    create_vehicle(&app, &token, "CAR1", 0.0).await;

    for (categoria, monto) in [("Seguro", 100.0), ("Peajes", 50.0), ("Peajes", 300.0)] {
        let (status, _) = send(
            &app,
            request(
                "POST",
                "/api/expenses",
                Some(&token),
                Some(json!({
                    "vehicleAlias": "CAR1",
                    "categoria": categoria,
                    "descripcion": "gasto",
                    "monto": monto,
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        request("GET", "/api/expenses/summary", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["categorias"], 2);
    assert_eq!(body["data"]["totalGastos"], 450.0);
    assert_eq!(body["data"]["summary"][0]["categoria"], "Peajes");
    assert_eq!(body["data"]["summary"][0]["totalMonto"], 350.0);
}

#[tokio::test]
async fn test_maintenance_upcoming_and_pagination() {
    let app = test_app();
    let token = register(&app, "ana@example.com", "ana", "write").await;
    create_vehicle(&app, &token, "CAR1", 0.0).await;

    for i in 0..12 {
        let mut payload = json!({
            "vehicleAlias": "CAR1",
            "tipo": "Cambio de aceite",
            "descripcion": format!("servicio {}", i),
            "costo": 100.0,
            "kilometraje": 10_000.0 + i as f64,
        });
        if i == 0 {
            payload["proximoServicioKm"] = json!(15000.0);
        }
        let (status, _) = send(
            &app,
            request("POST", "/api/maintenance", Some(&token), Some(payload)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        request("GET", "/api/maintenance?page=2&limit=10", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 12);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["count"], 2);

    // Solo el que tiene próximo servicio programado
    let (status, body) = send(
        &app,
        request("GET", "/api/maintenance/upcoming", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["proximoServicioKm"], 15000.0);
}

#[tokio::test]
async fn test_maintenance_requires_odometer_reading() {
    let app = test_app();
    let token = register(&app, "ana@example.com", "ana", "write").await;
    create_vehicle(&app, &token, "CAR1", 0.0).await;

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/maintenance",
            Some(&token),
            Some(json!({
                "vehicleAlias": "CAR1",
                "tipo": "Frenos",
                "descripcion": "Pastillas delanteras",
                "costo": 450.0,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unknown_enum_value_rejected() {
    let app = test_app();
    let token = register(&app, "ana@example.com", "ana", "write").await;
    create_vehicle(&app, &token, "CAR1", 0.0).await;

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/refuels",
            Some(&token),
            Some(json!({
                "vehicleAlias": "CAR1",
                "tipoCombustible": "Nafta",
                "cantidadGastada": 100.0,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
