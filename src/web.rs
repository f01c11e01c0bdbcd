use std::sync::{Mutex, MutexGuard};

use actix_web::{http::header, middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use serde::{Deserialize, Serialize};

use crate::display::{coverage_summary, ContractStatus};
use crate::error::ScheduleError;
use crate::export::{default_export_name, schedule_to_csv_string};
use crate::parser::read_employees;
use crate::rng::ScheduleRng;
use crate::schedule::{generate_schedule, update_shift, Day, Schedule};
use crate::settings::{parse_closed_day, StoreSettings};

// Last generated schedule lives in memory only; every upload recomputes it
pub struct AppState {
    pub schedule: Mutex<Option<Schedule>>,
    pub settings: StoreSettings,
    pub admin_password: String,
}

#[derive(Deserialize)]
pub struct GenerateParams {
    seed: Option<u64>,
    closed_day: Option<String>,
    open: Option<String>,
    close: Option<String>,
}

#[derive(Serialize)]
pub struct ScheduleResponse<'a> {
    seed: Option<u64>,
    statuses: Vec<ContractStatus>,
    schedule: &'a Schedule,
}

fn lock_schedule(state: &AppState) -> Result<MutexGuard<'_, Option<Schedule>>> {
    state
        .schedule
        .lock()
        .map_err(|_| actix_web::error::ErrorInternalServerError("schedule state poisoned"))
}

fn is_authorized(req: &HttpRequest, state: &AppState) -> bool {
    let password = req
        .headers()
        .get("X-Admin-Password")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    password == state.admin_password
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Unauthorized"}))
}

fn bad_request(error: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({"success": false, "error": error.to_string()}))
}

fn no_schedule() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({"error": "No schedule generated yet"}))
}

fn schedule_response(schedule: &Schedule, seed: Option<u64>) -> HttpResponse {
    HttpResponse::Ok().json(ScheduleResponse {
        seed,
        statuses: schedule.entries.iter().map(ContractStatus::of).collect(),
        schedule,
    })
}

// Generate endpoint: CSV roster in the body, store settings in the query
async fn generate(
    req: HttpRequest,
    query: web::Query<GenerateParams>,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_authorized(&req, &state) {
        return Ok(unauthorized());
    }

    let mut settings = state.settings.clone();
    if let Some(ref closed_day) = query.closed_day {
        match parse_closed_day(closed_day) {
            Ok(day) => settings.closed_day = day,
            Err(e) => return Ok(bad_request(e)),
        }
    }
    if let Some(ref open) = query.open {
        settings.open_time = open.clone();
    }
    if let Some(ref close) = query.close {
        settings.close_time = close.clone();
    }

    let employees = match read_employees(body.as_ref()) {
        Ok(employees) => employees,
        Err(e) => return Ok(bad_request(format!("Failed to process CSV: {}", e))),
    };

    let mut rng = match query.seed {
        Some(seed) => ScheduleRng::seeded(seed),
        None => ScheduleRng::from_entropy(),
    };
    let schedule = generate_schedule(&employees, &settings, &mut rng);

    let response = schedule_response(&schedule, Some(rng.seed()));
    *lock_schedule(&state)? = Some(schedule);
    Ok(response)
}

async fn get_schedule(state: web::Data<AppState>) -> Result<HttpResponse> {
    let schedule = lock_schedule(&state)?;
    match schedule.as_ref() {
        Some(schedule) => Ok(schedule_response(schedule, None)),
        None => Ok(no_schedule()),
    }
}

// Manual edit of one cell; the body is the new cell text
async fn update_cell(
    req: HttpRequest,
    path: web::Path<(usize, String)>,
    body: String,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_authorized(&req, &state) {
        return Ok(unauthorized());
    }

    let (employee, day) = path.into_inner();
    let day: Day = match day.parse() {
        Ok(day) => day,
        Err(e) => return Ok(bad_request(e)),
    };

    let mut guard = lock_schedule(&state)?;
    let Some(schedule) = guard.as_mut() else {
        return Ok(no_schedule());
    };

    match update_shift(schedule, employee, day, &body) {
        Ok(entry) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "status": ContractStatus::of(entry),
            "entry": entry,
        }))),
        Err(e @ ScheduleError::UnknownEmployee { .. }) => Ok(HttpResponse::NotFound()
            .json(serde_json::json!({"success": false, "error": e.to_string()}))),
        Err(e) => Ok(bad_request(e)),
    }
}

async fn export_csv(state: web::Data<AppState>) -> Result<HttpResponse> {
    let schedule = lock_schedule(&state)?;
    let Some(schedule) = schedule.as_ref() else {
        return Ok(no_schedule());
    };

    let csv = schedule_to_csv_string(schedule)
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Failed to export: {}", e)))?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", default_export_name()),
        ))
        .body(csv))
}

async fn get_coverage(state: web::Data<AppState>) -> Result<HttpResponse> {
    let schedule = lock_schedule(&state)?;
    match schedule.as_ref() {
        Some(schedule) => Ok(HttpResponse::Ok().json(coverage_summary(schedule))),
        None => Ok(no_schedule()),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/generate", web::post().to(generate))
        .route("/api/schedule", web::get().to(get_schedule))
        .route("/api/schedule/{employee}/{day}", web::put().to(update_cell))
        .route("/api/export", web::get().to(export_csv))
        .route("/api/coverage", web::get().to(get_coverage));
}

pub async fn start_server(port: u16, admin_password: String, settings: StoreSettings) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState {
        schedule: Mutex::new(None),
        settings,
        admin_password,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;

    const ROSTER: &str = "Nome;Ore Contratto;Esigenze/Preferenze;Lun\nAnna;8;;\n";

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState {
            schedule: Mutex::new(None),
            settings: StoreSettings::default(),
            admin_password: "secret".to_string(),
        })
    }

    #[actix_web::test]
    async fn generate_then_fetch_and_edit() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/generate?seed=4&open=09:00&close=17:00&closed_day=Dom")
            .insert_header(("X-Admin-Password", "secret"))
            .set_payload(ROSTER)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["seed"], 4);
        assert_eq!(body["schedule"]["entries"][0]["shifts"]["Lun"], "09:00 - 13:00");
        assert_eq!(body["schedule"]["entries"][0]["shifts"]["Dom"], "CHIUSO");

        let req = test::TestRequest::put()
            .uri("/api/schedule/0/Mer")
            .insert_header(("X-Admin-Password", "secret"))
            .set_payload("10:00 - 12:00")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["entry"]["assigned_hours"], 10);
        assert_eq!(body["status"], "Over");

        let req = test::TestRequest::get().uri("/api/export").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn generate_requires_password() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/generate")
            .set_payload(ROSTER)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn schedule_is_missing_before_generate() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/schedule").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }
}
