use clap::Parser;

/// Command-line flags; each one can also come from the environment (or `.env`).
#[derive(Parser, Debug, Clone)]
#[command(name = "vocabking-api")]
#[command(about = "VocabKing API server - token-gated JSON endpoints")]
#[command(version = crate::api::headers::VERSION)]
pub struct Args {
    #[arg(long, env = "JWT_SIGNING_KEY", hide_env_values = true, help = "JWT signing key")]
    pub jwt_signing_key: Option<String>,

    #[arg(long, env = "VOCABKING_DEBUG", help = "Run in debug mode")]
    pub debug: bool,

    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        help = "Whitespace-separated CORS origins allowed in production"
    )]
    pub allowed_origins: Option<String>,

    #[arg(long, env = "PORT", default_value_t = 8080, help = "Port to listen on")]
    pub port: u16,

    #[arg(long, env = "DATABASE_URL", hide_env_values = true, help = "Storage connection string")]
    pub database_url: Option<String>,

    #[arg(long, env = "HIDE_ERROR_STACK", help = "Omit diagnostic stacks from error responses")]
    pub hide_error_stack: bool,
}
