use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub google: GoogleConfig,
    pub session: SessionConfig,
    pub smtp: SmtpConfig,
    pub analytics: AnalyticsConfig,
    pub admin_emails: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    /// Origin of the SPA; used for the post-login redirect and CORS.
    pub client_url: String,
    /// When set, the pre-built SPA bundle is served from this directory.
    pub static_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// HS256 signing key for session tokens.
    pub secret: String,
    pub cookie_name: String,
    pub expiry_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl SmtpConfig {
    /// Sender address, falling back to the SMTP username.
    pub fn sender(&self) -> &str {
        if self.from.is_empty() {
            &self.username
        } else {
            &self.from
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("CRM_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("CLIENT_URL") {
            self.server.client_url = v;
        }
        if let Ok(v) = env::var("CRM_STATIC_DIR") {
            if !v.is_empty() {
                self.server.static_dir = Some(v);
            }
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Google OAuth overrides
        if let Ok(v) = env::var("GOOGLE_CLIENT_ID") {
            self.google.client_id = v;
        }
        if let Ok(v) = env::var("GOOGLE_CLIENT_SECRET") {
            self.google.client_secret = v;
        }
        if let Ok(v) = env::var("GOOGLE_CALLBACK_URL") {
            self.google.callback_url = v;
        }

        // Session overrides
        if let Ok(v) = env::var("SESSION_SECRET") {
            self.session.secret = v;
        }
        if let Ok(v) = env::var("SESSION_EXPIRY_HOURS") {
            self.session.expiry_hours = v.parse().unwrap_or(self.session.expiry_hours);
        }

        // Admin list
        if let Ok(v) = env::var("CRM_ADMIN_EMAILS") {
            self.admin_emails = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // SMTP overrides
        if let Ok(v) = env::var("EMAIL_HOST") {
            self.smtp.host = v;
        }
        if let Ok(v) = env::var("EMAIL_PORT") {
            self.smtp.port = v.parse().unwrap_or(self.smtp.port);
        }
        if let Ok(v) = env::var("EMAIL_USER") {
            self.smtp.username = v;
        }
        if let Ok(v) = env::var("EMAIL_PASSWORD") {
            self.smtp.password = v;
        }
        if let Ok(v) = env::var("EMAIL_FROM") {
            self.smtp.from = v;
        }

        // Analytics service overrides
        if let Ok(v) = env::var("AI_SERVICE_URL") {
            self.analytics.base_url = v;
        }
        if let Ok(v) = env::var("AI_SERVICE_TIMEOUT_SECS") {
            self.analytics.timeout_secs = v.parse().unwrap_or(self.analytics.timeout_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 5000,
                client_url: "http://localhost:3000".to_string(),
                static_dir: None,
            },
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
            },
            google: GoogleConfig {
                client_id: String::new(),
                client_secret: String::new(),
                callback_url: "http://localhost:5000/auth/google/callback".to_string(),
            },
            session: SessionConfig {
                secret: String::new(),
                cookie_name: "crm_session".to_string(),
                expiry_hours: 24,
            },
            smtp: SmtpConfig {
                host: "smtp.gmail.com".to_string(),
                port: 587,
                username: String::new(),
                password: String::new(),
                from: String::new(),
            },
            analytics: AnalyticsConfig {
                base_url: "http://localhost:5002".to_string(),
                timeout_secs: 30,
            },
            admin_emails: Vec::new(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
            },
            ..Self::development()
        }
    }

    /// Admin status is assigned at first login from this list.
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|a| a.eq_ignore_ascii_case(email))
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
