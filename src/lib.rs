// Library crate for the user authentication service
// This file exposes the public API for the binary and integration tests

pub mod config;
pub mod files;
pub mod routes;
pub mod shared;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use config::{DatabaseConfig, ServerConfig, StoreKind};
pub use files::FileService;
pub use routes::build_router;
pub use shared::{AppError, AppState};
pub use user::{
    Authenticator, InMemoryUserRepository, LoginSession, NewUser, PostgresUserRepository,
    UserDirectory, UserModel, UserRepository,
};
