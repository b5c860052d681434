// Public API - what other modules can use
pub use authenticator::Authenticator;
pub use directory::UserDirectory;
pub use handlers::{create_user, get_user, login, logout};
pub use models::{NewUser, UserModel};
pub use repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository};
pub use types::LoginSession;

// Internal modules
pub mod authenticator;
pub mod directory;
pub mod generators;
mod handlers;
pub mod models;
pub mod repository;
pub mod types;
