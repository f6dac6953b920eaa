use anyhow::{anyhow, bail, Context, Result};
use colored::*;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

#[tokio::main]
async fn main() -> Result<()> {
    println!("{}", "🚕 Taxi Dispatch Testing Tool".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());
    println!();

    // Paso 1: Pedir servidor y credenciales de admin
    let settings = get_settings()?;
    let api = Api::new(&settings.base_url);

    // Paso 2: Autenticarse y obtener token
    let token = api.login(&settings.username, &settings.password).await?;
    println!("{}", "✅ Login de admin correcto".bright_green());

    // Paso 3: Menú principal
    loop {
        println!();
        println!("{}", "📋 MENÚ PRINCIPAL".bright_green().bold());
        println!("{}", "==================".bright_green());
        println!("1. 🩺 Probar /health");
        println!("2. 🚕 Flujo completo (vehículo, conductor, viaje, depósito)");
        println!("3. 📊 Ver dashboard");
        println!("4. 🚪 Salir");
        let choice = prompt("Selecciona una opción (1-4): ")?;

        let outcome = match choice.as_str() {
            "1" => api.health().await,
            "2" => run_full_flow(&api, &token).await,
            "3" => show_dashboard(&api, &token).await,
            "4" => {
                println!("{}", "👋 ¡Hasta luego!".bright_green());
                break;
            }
            _ => {
                println!("{}", "❌ Opción inválida. Intenta de nuevo.".bright_red());
                continue;
            }
        };

        if let Err(e) = outcome {
            println!("{} {:#}", "❌ Falló:".bright_red().bold(), e);
        }
    }

    Ok(())
}

#[derive(Debug)]
struct Settings {
    base_url: String,
    username: String,
    password: String,
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

fn get_settings() -> Result<Settings> {
    println!("{}", "🔐 CONEXIÓN".bright_cyan().bold());
    println!("{}", "===========".bright_cyan());

    let base_url = prompt("URL base [http://127.0.0.1:3000]: ")?;
    let base_url = if base_url.is_empty() {
        "http://127.0.0.1:3000".to_string()
    } else {
        base_url.trim_end_matches('/').to_string()
    };

    Ok(Settings {
        base_url,
        username: prompt("Usuario admin: ")?,
        password: prompt("Password: ")?,
    })
}

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    message: Option<String>,
    data: Option<Value>,
}

struct Api {
    client: Client,
    base_url: String,
}

impl Api {
    fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
        }
    }

    async fn call(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Envelope)> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method.clone(), &url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("{} {} no respondió", method, url))?;
        let status = response.status();
        let envelope = response
            .json::<Envelope>()
            .await
            .with_context(|| format!("{} {} devolvió un cuerpo inesperado", method, url))?;

        println!("   {} {} -> {}", method.to_string().bright_blue(), path, status);
        Ok((status, envelope))
    }

    /// Llama y exige el status esperado; devuelve `data`
    async fn expect(&self, method: Method, path: &str, token: &str, body: Option<Value>, expected: StatusCode) -> Result<Value> {
        let (status, envelope) = self.call(method, path, Some(token), body).await?;
        if status != expected || !envelope.success {
            bail!(
                "{} esperaba {} y obtuvo {}: {}",
                path,
                expected,
                status,
                envelope.message.unwrap_or_default()
            );
        }
        Ok(envelope.data.unwrap_or(Value::Null))
    }

    async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let body: Value = self.client.get(&url).send().await?.json().await?;
        println!("{}", serde_json::to_string_pretty(&body)?);
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<String> {
        let (status, envelope) = self
            .call(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await?;
        if status != StatusCode::OK {
            bail!("Login rechazado: {}", envelope.message.unwrap_or_default());
        }

        envelope
            .data
            .and_then(|data| data["token"].as_str().map(str::to_string))
            .ok_or_else(|| anyhow!("La respuesta de login no trae token"))
    }
}

fn id_of(value: &Value) -> Result<String> {
    value["id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("La respuesta no trae id"))
}

// Sufijo numérico para que cada ejecución cree datos nuevos
fn unique_digits() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{:08}", nanos % 100_000_000)
}

async fn run_full_flow(api: &Api, admin_token: &str) -> Result<()> {
    println!();
    println!("{}", "🚕 FLUJO COMPLETO".bright_cyan().bold());
    println!("{}", "=================".bright_cyan());

    let digits = unique_digits();

    let vehicle = api
        .expect(
            Method::POST,
            "/api/vehicles",
            admin_token,
            Some(json!({
                "license_plate": format!("29T-{}", &digits[3..]),
                "brand": "Toyota",
                "model": "Innova",
                "year": 2023,
                "seats": 7
            })),
            StatusCode::CREATED,
        )
        .await?;
    let vehicle_id = id_of(&vehicle)?;

    let driver_password = "driver123";
    let driver = api
        .expect(
            Method::POST,
            "/api/drivers",
            admin_token,
            Some(json!({
                "full_name": "Conductor de prueba",
                "phone": format!("09{}", digits),
                "password": driver_password,
                "email": format!("driver{}@taxi.test", digits)
            })),
            StatusCode::CREATED,
        )
        .await?;
    let driver_id = id_of(&driver)?;
    let driver_username = driver["username"]
        .as_str()
        .ok_or_else(|| anyhow!("El conductor no trae username"))?;
    let driver_token = api.login(driver_username, driver_password).await?;

    let trip = api
        .expect(
            Method::POST,
            "/api/trips",
            admin_token,
            Some(json!({
                "customer_phone": format!("03{}", digits),
                "customer_name": "Cliente de prueba",
                "pickup_location": "Aeropuerto",
                "dropoff_location": "Centro",
                "scheduled_time": "2030-01-01T08:00:00Z",
                "estimated_price": 250000,
                "discount": 20000,
                "vehicle_id": vehicle_id,
                "driver_id": driver_id
            })),
            StatusCode::CREATED,
        )
        .await?;
    let trip_id = id_of(&trip)?;
    println!("   🎫 Viaje {}", trip["trip_code"].as_str().unwrap_or("?").bright_white());

    let status_path = format!("/api/trips/{}/status", trip_id);
    for payload in [
        json!({ "status": "called" }),
        json!({ "status": "picked_up" }),
        json!({ "status": "completed", "actual_price": 240000, "distance": 18.4 }),
    ] {
        api.expect(Method::PATCH, &status_path, &driver_token, Some(payload), StatusCode::OK)
            .await?;
    }

    // Repetir la finalización debe fallar
    let (status, _) = api
        .call(
            Method::PATCH,
            &status_path,
            Some(&driver_token),
            Some(json!({ "status": "completed", "actual_price": 240000 })),
        )
        .await?;
    if status != StatusCode::CONFLICT {
        bail!("Completar dos veces devolvió {}", status);
    }

    let unpaid = api
        .expect(Method::GET, "/api/transactions/driver/unpaid", &driver_token, None, StatusCode::OK)
        .await?;
    println!("   💵 Pendiente de depósito: {}", unpaid["total_unpaid"]);

    let deposit = api
        .expect(
            Method::POST,
            "/api/transactions/deposit",
            &driver_token,
            Some(json!({ "amount": unpaid["total_unpaid"], "trip_ids": [trip_id] })),
            StatusCode::CREATED,
        )
        .await?;
    let deposit_id = id_of(&deposit)?;

    api.expect(
        Method::PATCH,
        &format!("/api/transactions/{}/confirm", deposit_id),
        admin_token,
        Some(json!({ "accountant_note": "Smoke test" })),
        StatusCode::OK,
    )
    .await?;

    let vehicle = api
        .expect(Method::GET, &format!("/api/vehicles/{}", vehicle_id), admin_token, None, StatusCode::OK)
        .await?;
    println!("   🚗 Ingresos del vehículo: {}", vehicle["total_revenue"]);

    println!("{}", "✅ Flujo completo OK".bright_green().bold());
    Ok(())
}

async fn show_dashboard(api: &Api, admin_token: &str) -> Result<()> {
    let dashboard = api
        .expect(Method::GET, "/api/reports/dashboard", admin_token, None, StatusCode::OK)
        .await?;
    println!("{}", serde_json::to_string_pretty(&dashboard)?);
    Ok(())
}
