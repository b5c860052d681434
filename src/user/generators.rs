use async_trait::async_trait;
use uuid::Uuid;

/// Trait for generating user ids and access tokens
#[async_trait]
pub trait IdGenerator: Send + Sync {
    async fn generate(&self) -> Uuid;
}

/// Random (v4) UUID generator
pub struct RandomIdGenerator;

impl RandomIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdGenerator for RandomIdGenerator {
    async fn generate(&self) -> Uuid {
        Uuid::new_v4()
    }
}
