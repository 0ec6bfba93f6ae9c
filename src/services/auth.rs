use actix_web::{
    dev::Payload, error::ErrorUnauthorized, web::Data, Error as ActixError, FromRequest,
    HttpRequest,
};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::{
    AuthResponse, CreateEmployeeInput, Employee, EmployeeRole, LoginInput,
};
use crate::database::repositories::EmployeeRepository;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // employee id
    pub email: String,
    pub role: EmployeeRole,
    pub exp: usize, // expiration time
}

impl Claims {
    pub fn employee_id(&self) -> Uuid {
        self.sub
    }
    pub fn is_admin(&self) -> bool {
        self.role == EmployeeRole::Admin
    }
    pub fn is_manager(&self) -> bool {
        self.role == EmployeeRole::Manager
    }
    pub fn is_manager_or_admin(&self) -> bool {
        self.is_manager() || self.is_admin()
    }
}

impl FromRequest for Claims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let auth_header = req.headers().get("Authorization");

        if let Some(auth_header) = auth_header {
            if let Ok(auth_str) = auth_header.to_str() {
                if let Some(token) = auth_str.strip_prefix("Bearer ") {
                    if let Some(config) = req.app_data::<Data<Config>>() {
                        match decode::<Claims>(
                            token,
                            &DecodingKey::from_secret(config.jwt_secret.as_ref()),
                            &Validation::new(Algorithm::HS256),
                        ) {
                            Ok(token_data) => {
                                return ready(Ok(token_data.claims));
                            }
                            Err(_) => {
                                return ready(Err(ErrorUnauthorized("Invalid token")));
                            }
                        }
                    }
                }
            }
        }

        ready(Err(ErrorUnauthorized(
            "Missing or invalid authorization header",
        )))
    }
}

#[derive(Clone)]
pub struct AuthService {
    employee_repository: EmployeeRepository,
    config: Config,
}

impl AuthService {
    pub fn new(employee_repository: EmployeeRepository, config: Config) -> Self {
        Self {
            employee_repository,
            config,
        }
    }

    pub async fn login(&self, input: &LoginInput) -> Result<AuthResponse, AppError> {
        let employee = self
            .employee_repository
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !employee.is_active {
            return Err(AppError::Unauthorized);
        }

        let matches = verify(&input.password, &employee.password_hash)
            .map_err(|err| AppError::internal_server_error_message(err.to_string()))?;
        if !matches {
            return Err(AppError::Unauthorized);
        }

        let token = self.generate_token(&employee)?;
        Ok(AuthResponse { token, employee })
    }

    /// Admin-driven creation; there is no self-service registration.
    pub async fn create_employee(&self, input: &CreateEmployeeInput) -> Result<Employee, AppError> {
        if self.employee_repository.email_exists(&input.email).await? {
            return Err(AppError::BadRequest("Email already exists".to_string()));
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|err| AppError::internal_server_error_message(err.to_string()))?;

        Ok(self.employee_repository.create(input, &password_hash).await?)
    }

    pub async fn current_employee(&self, claims: &Claims) -> Result<Employee, AppError> {
        self.employee_repository
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {}", claims.sub)))
    }

    fn generate_token(&self, employee: &Employee) -> Result<String, AppError> {
        let expiration = Utc::now() + Duration::days(self.config.jwt_expiration_days);
        let claims = Claims {
            sub: employee.id,
            email: employee.email.clone(),
            role: employee.role,
            exp: expiration.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )
        .map_err(|err| AppError::internal_server_error_message(err.to_string()))
    }
}
