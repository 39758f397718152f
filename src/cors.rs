use std::env;

use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, Cors, CorsOptions};

pub fn create_cors() -> Cors {
    let allowed_origins_env =
        env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".to_string());

    let allowed_origins: Vec<String> = allowed_origins_env
        .split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect();

    CorsOptions {
        allowed_origins: AllowedOrigins::some_exact(&allowed_origins),
        allowed_methods: vec![Method::Get, Method::Put, Method::Post, Method::Patch, Method::Delete]
            .into_iter()
            .map(|method| method.into())
            .collect(),
        allowed_headers: AllowedHeaders::some(&["Accept", "Content-Type"]),
        allow_credentials: true,
        ..Default::default()
    }
    .to_cors()
    .expect("Failed to create CORS configuration")
}
