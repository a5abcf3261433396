use axum::{extract::State, http::StatusCode, response::Json};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use mongodb::bson::doc;
use mongodb::Collection;
use validator::Validate;

use crate::dtos::auth_dtos::{
    validation_message, LoginData, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
};
use crate::errors::{AppError, Result};
use crate::models::admin::{Admin, Claims};
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    payload
        .validate()
        .map_err(|e| AppError::validation(validation_message(&e)))?;

    let admins: Collection<Admin> = state.db.collection("admins");

    let filter = doc! {
        "$or": [
            { "email_address": &payload.email_address },
            { "phone_number": &payload.phone_number }
        ]
    };
    if admins.find_one(filter).await?.is_some() {
        return Err(AppError::DuplicateAdmin);
    }

    let password_hash = hash(&payload.password, DEFAULT_COST)?;

    let mut admin = Admin {
        id: None,
        full_name: payload.full_name,
        email_address: payload.email_address,
        phone_number: payload.phone_number,
        password_hash,
        restaurant_name: payload.restaurant_name,
        created_at: Utc::now(),
    };

    let insert_result = admins.insert_one(&admin).await?;
    admin.id = insert_result.inserted_id.as_object_id();

    tracing::info!("admin created for {}", admin.email_address);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "Admin created successfully".to_string(),
            data: admin.into(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(validation_message(&e)))?;

    let admins: Collection<Admin> = state.db.collection("admins");

    // Unknown email and wrong password answer identically
    let admin = admins
        .find_one(doc! { "email_address": &payload.email_address })
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let valid = verify(&payload.password, &admin.password_hash)?;
    if !valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = issue_session_token(&state, &admin)?;

    tracing::info!("admin logged in: {}", admin.email_address);

    Ok(Json(LoginResponse {
        success: true,
        message: "Admin logged in successfully".to_string(),
        data: LoginData {
            admin: admin.into(),
            token,
        },
    }))
}

fn issue_session_token(state: &AppState, admin: &Admin) -> Result<String> {
    let expiry = Utc::now() + state.config.session_lifetime;
    let claims = Claims {
        sub: admin.id.map(|id| id.to_hex()).unwrap_or_default(),
        email_address: admin.email_address.clone(),
        exp: expiry.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.session_secret.as_bytes()),
    )
    .map_err(|e| AppError::TokenCreation(e.to_string()))
}
