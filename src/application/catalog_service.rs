use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::Product;

pub struct CatalogService {
    repo: Arc<dyn ProductRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    pub fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        self.repo.list()
    }

    pub fn get_product(&self, id: i32) -> Result<Product, DomainError> {
        self.repo
            .find(id)?
            .ok_or_else(|| DomainError::NotFound("Product not found".to_string()))
    }
}
