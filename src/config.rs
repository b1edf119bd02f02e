// src/config.rs

use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,

    /// Optional admin account seeded at startup.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,

    /// Categories an exam draws from, in the order their slices appear
    /// on the paper.
    pub exam_categories: Vec<String>,
    pub questions_per_category: usize,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let admin_email = env::var("ADMIN_EMAIL").ok();
        let admin_password = env::var("ADMIN_PASSWORD").ok();

        let exam_categories = parse_categories(
            &env::var("EXAM_CATEGORIES").unwrap_or_else(|_| "1,2,3".to_string()),
        );

        let questions_per_category = env::var("QUESTIONS_PER_CATEGORY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            port,
            admin_email,
            admin_password,
            exam_categories,
            questions_per_category,
        }
    }
}

/// Splits a comma-separated category list, dropping empty entries.
fn parse_categories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_category_list() {
        assert_eq!(parse_categories("1,2,3"), vec!["1", "2", "3"]);
        assert_eq!(parse_categories(" a , b "), vec!["a", "b"]);
    }

    #[test]
    fn drops_empty_categories() {
        assert_eq!(parse_categories("1,,2,"), vec!["1", "2"]);
        assert!(parse_categories("").is_empty());
    }
}
