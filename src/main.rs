use actix_cors::Cors;
use actix_web::{get, middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Result;

use hrms_be::database::{
    init_database,
    repositories::{
        AttendanceRepository, EmployeeRepository, HolidayRepository, LeaveBalanceRepository,
        LeaveRequestRepository, WorkingRuleRepository,
    },
};
use hrms_be::handlers::{auth, balance, calendar, holiday, leave, working_rule};
use hrms_be::middleware::RequestIdMiddleware;
use hrms_be::services::{
    AuthService, BalanceLedger, DateRuleResolver, DayStatusResolver, LeaveDurationCalculator,
    LeaveRequestLifecycle, OverlapValidator,
};
use hrms_be::Config;

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("HRMS Leave & Attendance API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    log::info!("Starting HRMS API server...");

    // Load configuration
    let config = Config::from_env()?;
    log::info!("Configuration loaded (environment: {})", config.environment);

    // Initialize database
    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    // Repositories
    let employee_repository = EmployeeRepository::new(pool.clone());
    let working_rule_repository = WorkingRuleRepository::new(pool.clone());
    let holiday_repository = HolidayRepository::new(pool.clone());
    let leave_request_repository = LeaveRequestRepository::new(pool.clone());
    let leave_balance_repository = LeaveBalanceRepository::new(pool.clone());
    let attendance_repository = AttendanceRepository::new(pool.clone());

    // Engine services
    let auth_service = AuthService::new(employee_repository.clone(), config.clone());
    let date_rule_resolver = DateRuleResolver::new(working_rule_repository.clone());
    let day_status_resolver = DayStatusResolver::new(
        date_rule_resolver.clone(),
        holiday_repository.clone(),
        leave_request_repository.clone(),
    );
    let duration_calculator =
        LeaveDurationCalculator::new(date_rule_resolver.clone(), holiday_repository.clone());
    let overlap_validator = OverlapValidator::new(leave_request_repository.clone());
    let balance_ledger = BalanceLedger::new(leave_balance_repository.clone());
    let leave_lifecycle = LeaveRequestLifecycle::new(
        leave_request_repository.clone(),
        attendance_repository.clone(),
        overlap_validator.clone(),
        duration_calculator.clone(),
        balance_ledger.clone(),
        config.ledger_write_retries,
    );

    let employee_repo_data = web::Data::new(employee_repository);
    let working_rule_repo_data = web::Data::new(working_rule_repository);
    let holiday_repo_data = web::Data::new(holiday_repository);
    let leave_request_repo_data = web::Data::new(leave_request_repository);
    let attendance_repo_data = web::Data::new(attendance_repository);
    let auth_service_data = web::Data::new(auth_service);
    let date_rule_resolver_data = web::Data::new(date_rule_resolver);
    let day_status_resolver_data = web::Data::new(day_status_resolver);
    let balance_ledger_data = web::Data::new(balance_ledger);
    let leave_lifecycle_data = web::Data::new(leave_lifecycle);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(employee_repo_data.clone())
            .app_data(working_rule_repo_data.clone())
            .app_data(holiday_repo_data.clone())
            .app_data(leave_request_repo_data.clone())
            .app_data(attendance_repo_data.clone())
            .app_data(auth_service_data.clone())
            .app_data(date_rule_resolver_data.clone())
            .app_data(day_status_resolver_data.clone())
            .app_data(balance_ledger_data.clone())
            .app_data(leave_lifecycle_data.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin("http://localhost:3000")
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Requested-With",
                        "X-Correlation-ID",
                    ])
                    .max_age(3600),
            )
            .wrap(RequestIdMiddleware)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .service(hello)
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/auth")
                            .route("/login", web::post().to(auth::login))
                            .route("/me", web::get().to(auth::me)),
                    )
                    .service(
                        web::scope("/employees")
                            .route("", web::post().to(auth::create_employee))
                            .route("", web::get().to(auth::list_employees)),
                    )
                    .service(
                        web::scope("/calendar")
                            .route("/day-status", web::get().to(calendar::day_status))
                            .route("/range-status", web::get().to(calendar::range_status))
                            .route(
                                "/monthly-summary",
                                web::get().to(calendar::monthly_summary),
                            )
                            .route("/attendance", web::get().to(calendar::attendance_records)),
                    )
                    .service(
                        web::scope("/leave")
                            .route("", web::post().to(leave::submit_leave_request))
                            .route("", web::get().to(leave::get_leave_requests))
                            .route(
                                "/validate",
                                web::post().to(leave::validate_leave_application),
                            )
                            .route("/{id}", web::get().to(leave::get_leave_request))
                            .route("/{id}/approve", web::post().to(leave::approve_leave_request))
                            .route("/{id}/reject", web::post().to(leave::reject_leave_request))
                            .route("/{id}/cancel", web::post().to(leave::cancel_leave_request)),
                    )
                    .service(
                        web::scope("/balances")
                            .route("", web::get().to(balance::get_balances))
                            .route("/assign", web::post().to(balance::assign_balances))
                            .route("/history", web::get().to(balance::get_balance_history))
                            .route(
                                "/utilization",
                                web::get().to(balance::get_utilization_report),
                            )
                            .route("/{id}/adjust", web::post().to(balance::adjust_balance)),
                    )
                    .service(
                        web::scope("/holidays")
                            .route("", web::get().to(holiday::list_holidays))
                            .route("", web::post().to(holiday::create_holiday))
                            .route("/{id}", web::put().to(holiday::update_holiday))
                            .route("/{id}", web::delete().to(holiday::delete_holiday)),
                    )
                    .service(
                        web::scope("/working-rules")
                            .route("", web::get().to(working_rule::list_working_rules))
                            .route("", web::post().to(working_rule::create_working_rule)),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
