//! Tests contra PostgreSQL real
//!
//! `cargo test --features db-tests` con `TEST_DATABASE_URL` apuntando a una
//! base descartable. Los datos usan sufijos aleatorios para no chocar entre
//! ejecuciones.

#![cfg(feature = "db-tests")]

mod support;

use axum::http::StatusCode;
use axum::Router;
use rand::Rng;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use sqlx::PgPool;
use tokio::sync::OnceCell;
use uuid::Uuid;

use support::{app, empty_request, get_request, json_request, send};
use taxi_dispatch::config::DatabaseConfig;
use taxi_dispatch::database::apply_schema;
use taxi_dispatch::models::user::{User, UserRole};
use taxi_dispatch::repositories::customer_repository::CustomerRepository;
use taxi_dispatch::repositories::user_repository::{NewUser, UserRepository};
use taxi_dispatch::repositories::vehicle_repository::VehicleRepository;
use taxi_dispatch::services::auth_service::hash_password;

const PASSWORD: &str = "secret123";

// El schema se aplica una sola vez por proceso; los tests corren en paralelo
static SCHEMA: OnceCell<()> = OnceCell::const_new();

async fn setup() -> (PgPool, Router) {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL es obligatoria");
    let pool = DatabaseConfig::with_url(url)
        .max_connections(5)
        .create_pool()
        .await
        .expect("conexión a la base de test");
    SCHEMA
        .get_or_init(|| async { apply_schema(&pool).await.expect("schema aplicado") })
        .await;
    let router = app(pool.clone());
    (pool, router)
}

fn random_digits(n: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..n).map(|_| char::from(b'0' + rng.gen_range(0..10))).collect()
}

fn random_phone() -> String {
    format!("09{}", random_digits(8))
}

async fn create_user(pool: &PgPool, role: UserRole, commission_rate: Decimal) -> User {
    let suffix = random_digits(10);
    UserRepository::new(pool.clone())
        .create(NewUser {
            username: format!("{}_{}", role, suffix),
            email: format!("{}_{}@taxi.test", role, suffix),
            password_hash: hash_password(PASSWORD).unwrap(),
            full_name: format!("Test {}", role),
            phone: random_phone(),
            role,
            commission_rate,
            driver_license: None,
            license_expiry: None,
            address: None,
            salary: None,
        })
        .await
        .unwrap()
}

async fn login(app: &Router, user: &User) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": user.username, "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create_vehicle(app: &Router, admin_token: &str) -> Value {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/vehicles",
            Some(admin_token),
            &json!({
                "license_plate": format!("30A-{}", random_digits(5)),
                "brand": "Toyota",
                "model": "Vios",
                "year": 2022,
                "seats": 4,
                "color": "Blanco"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"].clone()
}

async fn patch_status(app: &Router, token: &str, trip_id: &str, payload: Value) -> (StatusCode, Value) {
    send(
        app,
        json_request("PATCH", &format!("/api/trips/{}/status", trip_id), Some(token), &payload),
    )
    .await
}

#[tokio::test]
async fn test_trip_lifecycle_accrues_revenue_once() {
    let (pool, app) = setup().await;
    let admin = create_user(&pool, UserRole::Admin, Decimal::ZERO).await;
    let dispatcher = create_user(&pool, UserRole::Dispatcher, Decimal::from(10)).await;
    let driver = create_user(&pool, UserRole::Driver, Decimal::ZERO).await;

    let admin_token = login(&app, &admin).await;
    let dispatcher_token = login(&app, &dispatcher).await;
    let driver_token = login(&app, &driver).await;

    let vehicle = create_vehicle(&app, &admin_token).await;
    let vehicle_id: Uuid = vehicle["id"].as_str().unwrap().parse().unwrap();
    let customer_phone = random_phone();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/trips",
            Some(&dispatcher_token),
            &json!({
                "customer_phone": customer_phone,
                "customer_name": "Nguyen Van A",
                "pickup_location": "Hoan Kiem",
                "dropoff_location": "Noi Bai",
                "scheduled_time": "2030-01-01T08:00:00Z",
                "estimated_price": 100000,
                "discount": 10000
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["status"], "new");
    let trip_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/trips/{}/assign", trip_id),
            Some(&dispatcher_token),
            &json!({ "vehicle_id": vehicle_id, "driver_id": driver.id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["status"], "assigned");

    // assigned -> picked_up se salta "called"
    let (status, _) = patch_status(&app, &driver_token, &trip_id, json!({ "status": "picked_up" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    for next in ["called", "picked_up"] {
        let (status, body) = patch_status(&app, &driver_token, &trip_id, json!({ "status": next })).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
    }

    // Completar sin precio real no cambia el estado
    let (status, _) = patch_status(&app, &driver_token, &trip_id, json!({ "status": "completed" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = patch_status(
        &app,
        &driver_token,
        &trip_id,
        json!({ "status": "completed", "actual_price": 100000, "distance": 32.5 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["final_price"].as_f64(), Some(90000.0));
    assert_eq!(body["data"]["commission_amount"].as_f64(), Some(9000.0));
    assert_eq!(body["data"]["is_locked"], true);

    // Repetir la transición falla y no duplica ingresos
    let (status, _) = patch_status(
        &app,
        &driver_token,
        &trip_id,
        json!({ "status": "completed", "actual_price": 100000 }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let vehicle = VehicleRepository::new(pool.clone())
        .find_by_id(vehicle_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(vehicle.total_revenue, Decimal::from(90000));

    let customer = CustomerRepository::new(pool.clone())
        .find_by_phone(&customer_phone)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(customer.total_spent, Decimal::from(90000));

    // Viaje bloqueado: no se puede editar
    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/trips/{}", trip_id),
            Some(&dispatcher_token),
            &json!({ "passengers": 2 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, get_request(&format!("/api/trips/{}", trip_id), Some(&admin_token))).await;
    assert_eq!(status, StatusCode::OK);
    let history: Vec<&str> = body["data"]["status_history"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["status"].as_str().unwrap())
        .collect();
    assert_eq!(history, vec!["new", "assigned", "called", "picked_up", "completed"]);
}

#[tokio::test]
async fn test_deposit_confirmation_marks_trips_paid() {
    let (pool, app) = setup().await;
    let admin = create_user(&pool, UserRole::Admin, Decimal::ZERO).await;
    let driver = create_user(&pool, UserRole::Driver, Decimal::ZERO).await;
    let accountant = create_user(&pool, UserRole::Accountant, Decimal::ZERO).await;

    let admin_token = login(&app, &admin).await;
    let driver_token = login(&app, &driver).await;
    let accountant_token = login(&app, &accountant).await;
    let vehicle = create_vehicle(&app, &admin_token).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/trips",
            Some(&admin_token),
            &json!({
                "customer_phone": random_phone(),
                "pickup_location": "Ba Dinh",
                "dropoff_location": "Cau Giay",
                "scheduled_time": "2030-01-01T09:00:00Z",
                "estimated_price": 50000,
                "vehicle_id": vehicle["id"],
                "driver_id": driver.id
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["status"], "assigned");
    let trip_id = body["data"]["id"].as_str().unwrap().to_string();

    for payload in [
        json!({ "status": "called" }),
        json!({ "status": "picked_up" }),
        json!({ "status": "completed", "actual_price": 50000 }),
    ] {
        let (status, body) = patch_status(&app, &driver_token, &trip_id, payload).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
    }

    let (status, body) = send(&app, get_request("/api/transactions/driver/unpaid", Some(&driver_token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["trip_count"], 1);
    assert_eq!(body["data"]["total_unpaid"].as_f64(), Some(50000.0));

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/transactions/deposit",
            Some(&driver_token),
            &json!({ "amount": 50000, "trip_ids": [trip_id] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["status"], "pending");
    let transaction_id = body["data"]["id"].as_str().unwrap().to_string();

    // El viaje ya está en un depósito pendiente
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/transactions/deposit",
            Some(&driver_token),
            &json!({ "amount": 50000, "trip_ids": [trip_id] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Un conductor no puede confirmar
    let (status, _) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/transactions/{}/confirm", transaction_id),
            Some(&driver_token),
            &json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // La nota es opcional: confirmar sin cuerpo
    let (status, body) = send(
        &app,
        empty_request(
            "PATCH",
            &format!("/api/transactions/{}/confirm", transaction_id),
            Some(&accountant_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["status"], "confirmed");
    assert!(body["data"]["accountant_note"].is_null());

    let (status, _) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/transactions/{}/reject", transaction_id),
            Some(&accountant_token),
            &json!({ "rejection_reason": "Duplicado" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let is_paid: bool = sqlx::query_scalar("SELECT is_paid FROM trips WHERE id = $1")
        .bind(trip_id.parse::<Uuid>().unwrap())
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(is_paid);
}

#[tokio::test]
async fn test_deactivated_user_token_is_rejected() {
    let (pool, app) = setup().await;
    let admin = create_user(&pool, UserRole::Admin, Decimal::ZERO).await;
    let dispatcher = create_user(&pool, UserRole::Dispatcher, Decimal::ZERO).await;

    let admin_token = login(&app, &admin).await;
    let token = login(&app, &dispatcher).await;

    let (status, _) = send(&app, get_request("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/admin/users/{}/deactivate", dispatcher.id),
            Some(&admin_token),
            &json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (status, _) = send(&app, get_request("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Tampoco puede volver a iniciar sesión
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": dispatcher.username, "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_vehicle_round_trip_and_unknown_update() {
    let (pool, app) = setup().await;
    let admin = create_user(&pool, UserRole::Admin, Decimal::ZERO).await;
    let driver = create_user(&pool, UserRole::Driver, Decimal::ZERO).await;
    let admin_token = login(&app, &admin).await;
    let driver_token = login(&app, &driver).await;

    // Matrícula en minúsculas con separadores: se guarda tal cual
    let submitted = json!({
        "license_plate": format!("29a-{}.{}", random_digits(3), random_digits(2)),
        "brand": "Hyundai",
        "model": "Accent",
        "year": 2021,
        "seats": 5,
        "color": "Gris",
        "status": "maintenance"
    });
    let (status, body) = send(&app, json_request("POST", "/api/vehicles", Some(&admin_token), &submitted)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let created = body["data"].clone();
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&app, get_request(&format!("/api/vehicles/{}", id), Some(&driver_token))).await;
    assert_eq!(status, StatusCode::OK);
    for field in ["license_plate", "brand", "model", "year", "seats", "color", "status"] {
        assert_eq!(body["data"][field], submitted[field], "{}", field);
    }

    // La unicidad de la matrícula no distingue mayúsculas
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/vehicles",
            Some(&admin_token),
            &json!({
                "license_plate": submitted["license_plate"].as_str().unwrap().to_uppercase(),
                "brand": "Kia",
                "model": "Morning",
                "year": 2021
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Matrícula duplicada
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/vehicles",
            Some(&admin_token),
            &json!({
                "license_plate": created["license_plate"],
                "brand": "Kia",
                "model": "Morning",
                "year": 2021
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Un conductor no puede crear vehículos
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/vehicles",
            Some(&driver_token),
            &json!({ "license_plate": "99Z-99999", "brand": "Kia", "model": "Morning", "year": 2021 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/vehicles/{}", Uuid::new_v4()),
            Some(&admin_token),
            &json!({ "color": "Negro" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get_request("/api/vehicles/not-a-uuid", Some(&admin_token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
