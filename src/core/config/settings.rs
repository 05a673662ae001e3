use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_cors_origins, parse_environment, parse_u16,
    parse_u64,
};
use super::secret::load_or_create_secret;
use super::types::{
    AdminSettings, ApiSettings, ConfigError, CorsSettings, DatabaseSettings, LimitSettings,
    RedisSettings, RuntimeSettings, SecuritySettings, ServerHost, ServerPort, ServerSettings,
    Settings, TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("EXAMHALL_HOST", "0.0.0.0");
        let port = env_or_default("EXAMHALL_PORT", "8080");

        let environment = parse_environment(
            env_optional("EXAMHALL_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config =
            env_optional("EXAMHALL_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Examhall API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_prefix = env_or_default("API_PREFIX", "/api");

        let access_secret_configured = env_optional("JWT_SECRET");
        let refresh_secret_configured = env_optional("JWT_REFRESH_SECRET");
        let secrets_configured =
            access_secret_configured.is_some() && refresh_secret_configured.is_some();
        let access_secret = access_secret_configured
            .unwrap_or_else(|| load_or_create_secret(".jwt_secret"));
        let refresh_secret = refresh_secret_configured
            .unwrap_or_else(|| load_or_create_secret(".jwt_refresh_secret"));

        let access_token_ttl_minutes = parse_u64(
            "ACCESS_TOKEN_TTL_MINUTES",
            env_or_default("ACCESS_TOKEN_TTL_MINUTES", "15"),
        )?;
        let refresh_token_ttl_days =
            parse_u64("REFRESH_TOKEN_TTL_DAYS", env_or_default("REFRESH_TOKEN_TTL_DAYS", "7"))?;
        let role_cache_ttl_minutes =
            parse_u64("ROLE_CACHE_TTL_MINUTES", env_or_default("ROLE_CACHE_TTL_MINUTES", "15"))?;

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "examhall");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "examhall_db");
        let database_url = env_optional("DATABASE_URL");

        let redis_host = env_or_default("REDIS_HOST", "localhost");
        let redis_port = parse_u16("REDIS_PORT", env_or_default("REDIS_PORT", "6379"))?;
        let redis_db = parse_u16("REDIS_DB", env_or_default("REDIS_DB", "0"))?;
        let redis_password = env_or_default("REDIS_PASSWORD", "");

        let rate_limit_requests =
            parse_u64("RATE_LIMIT_REQUESTS", env_or_default("RATE_LIMIT_REQUESTS", "100"))?;
        let rate_limit_window_seconds = parse_u64(
            "RATE_LIMIT_WINDOW_SECONDS",
            env_or_default("RATE_LIMIT_WINDOW_SECONDS", "60"),
        )?;
        let request_timeout_seconds = parse_u64(
            "REQUEST_TIMEOUT_SECONDS",
            env_or_default("REQUEST_TIMEOUT_SECONDS", "5"),
        )?;
        let results_cache_ttl_seconds = parse_u64(
            "RESULTS_CACHE_TTL_SECONDS",
            env_or_default("RESULTS_CACHE_TTL_SECONDS", "600"),
        )?;

        let admin_name = env_or_default("ADMIN_NAME", "Administrator");
        let admin_email = env_or_default("ADMIN_EMAIL", "admin@examhall.local");
        let admin_password = env_or_default("ADMIN_PASSWORD", "");

        let log_level = env_or_default("EXAMHALL_LOG_LEVEL", "info");
        let json = env_optional("EXAMHALL_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_prefix },
            security: SecuritySettings {
                access_secret,
                refresh_secret,
                access_token_ttl_minutes,
                refresh_token_ttl_days,
                role_cache_ttl_minutes,
            },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
            },
            redis: RedisSettings {
                host: redis_host,
                port: redis_port,
                db: redis_db,
                password: redis_password,
            },
            limits: LimitSettings {
                rate_limit_requests,
                rate_limit_window_seconds,
                request_timeout_seconds,
                results_cache_ttl_seconds,
            },
            admin: AdminSettings { name: admin_name, email: admin_email, password: admin_password },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate(secrets_configured)?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn redis(&self) -> &RedisSettings {
        &self.redis
    }

    pub(crate) fn limits(&self) -> &LimitSettings {
        &self.limits
    }

    pub(crate) fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self, secrets_configured: bool) -> Result<(), ConfigError> {
        if self.security.access_token_ttl_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ACCESS_TOKEN_TTL_MINUTES",
                value: "0".to_string(),
            });
        }

        if self.security.refresh_token_ttl_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "REFRESH_TOKEN_TTL_DAYS",
                value: "0".to_string(),
            });
        }

        if self.security.access_secret == self.security.refresh_secret {
            return Err(ConfigError::InvalidValue {
                field: "JWT_REFRESH_SECRET",
                value: "<same as JWT_SECRET>".to_string(),
            });
        }

        if self.limits.rate_limit_window_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "RATE_LIMIT_WINDOW_SECONDS",
                value: "0".to_string(),
            });
        }

        if self.limits.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "REQUEST_TIMEOUT_SECONDS",
                value: "0".to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if !secrets_configured {
            return Err(ConfigError::MissingSecret("JWT_SECRET/JWT_REFRESH_SECRET"));
        }
        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if self.admin.password.is_empty() {
            return Err(ConfigError::MissingSecret("ADMIN_PASSWORD"));
        }

        Ok(())
    }
}
