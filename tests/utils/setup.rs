use std::sync::Arc;

use axum::Router;
use user_auth::{
    build_router,
    files::{InMemoryBlobStore, InMemoryDocumentStore},
    AppState, Authenticator, FileService, InMemoryUserRepository, UserDirectory, UserRepository,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

#[allow(dead_code)]
pub struct TestSetup {
    pub repository: Arc<InMemoryUserRepository>,
    pub directory: Arc<UserDirectory>,
    pub authenticator: Arc<Authenticator>,
    pub file_service: Arc<FileService>,
    pub app: Router,
}

pub struct TestSetupBuilder {
    users: Vec<(&'static str, &'static str)>,
    repository_override: Option<Arc<dyn UserRepository + Send + Sync>>,
}

#[allow(dead_code)]
impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            users: vec![],
            repository_override: None,
        }
    }

    /// Pre-creates users as (role, name) pairs through the authenticator
    pub fn with_users(mut self, users: Vec<(&'static str, &'static str)>) -> Self {
        self.users = users;
        self
    }

    /// Backs the directory with a different repository instead of the in-memory one
    pub fn with_repository(mut self, repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        self.repository_override = Some(repository);
        self
    }

    pub async fn build(self) -> TestSetup {
        let repository = Arc::new(InMemoryUserRepository::new());
        let backing: Arc<dyn UserRepository + Send + Sync> = match self.repository_override {
            Some(repo) => repo,
            None => repository.clone(),
        };

        let directory = Arc::new(UserDirectory::open(backing));
        let authenticator = Arc::new(Authenticator::new(directory.clone()));
        let file_service = Arc::new(FileService::new(
            Arc::new(InMemoryBlobStore::new()),
            Arc::new(InMemoryDocumentStore::new()),
        ));

        for (role, name) in &self.users {
            authenticator
                .create_user(role, name)
                .await
                .expect("seed user should be created");
        }

        let app = build_router(AppState::new(authenticator.clone(), file_service.clone()));

        TestSetup {
            repository,
            directory,
            authenticator,
            file_service,
            app,
        }
    }
}
