use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,

    /// Origin the web client is served from. Invite links are built on it
    /// and it is the primary CORS origin.
    pub public_origin: String,

    // Access tokens are issued by the external identity provider and signed
    // with this shared secret.
    pub jwt_secret: String,
    pub jwt_audience: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .expect("PORT must be a number"),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".into())
                .parse()
                .expect("DB_MAX_CONNECTIONS must be a number"),

            public_origin: env::var("PUBLIC_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".into()),

            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            jwt_audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "authenticated".into()),
        }
    }

    /// Configuration for tests: no database, fixed secret.
    pub fn test_default() -> Self {
        Self {
            database_url: String::new(),
            host: "127.0.0.1".into(),
            port: 0,
            db_max_connections: 1,
            public_origin: "https://app.example.com".into(),
            jwt_secret: "test-secret-do-not-use-in-production".into(),
            jwt_audience: "authenticated".into(),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
