//! Category service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::Category;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
}

/// Input for creating or updating a category
#[derive(Debug, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    product_count: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
            product_count: row.product_count,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CATEGORY_SELECT: &str = r#"
    SELECT c.id, c.name, c.description,
           (SELECT COUNT(*) FROM products p WHERE p.category_id = c.id AND p.is_active = true)
               AS product_count,
           c.is_active, c.created_at, c.updated_at
    FROM categories c
"#;

impl CategoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Active categories ordered by name
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "{CATEGORY_SELECT} WHERE c.is_active = true ORDER BY c.name"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    pub async fn get_category(&self, category_id: Uuid) -> AppResult<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!("{CATEGORY_SELECT} WHERE c.id = $1"))
            .bind(category_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category {}", category_id)))?;

        Ok(row.into())
    }

    pub async fn create_category(&self, input: CategoryInput) -> AppResult<Category> {
        input.validate()?;
        self.ensure_name_free(&input.name, None).await?;

        let category_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(category_id = %category_id, name = %input.name, "Category created");

        self.get_category(category_id).await
    }

    pub async fn update_category(
        &self,
        category_id: Uuid,
        input: CategoryInput,
    ) -> AppResult<Category> {
        input.validate()?;
        self.ensure_name_free(&input.name, Some(category_id)).await?;

        let result = sqlx::query(
            r#"
            UPDATE categories
            SET name = $1, description = $2, updated_at = NOW()
            WHERE id = $3 AND is_active = true
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(category_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Category {}", category_id)));
        }

        self.get_category(category_id).await
    }

    /// Soft delete. Refused while active products still reference the category.
    pub async fn delete_category(&self, category_id: Uuid) -> AppResult<()> {
        let category = self.get_category(category_id).await?;

        if category.product_count > 0 {
            return Err(AppError::BusinessRule(format!(
                "Cannot delete category '{}' because it has {} active product(s).",
                category.name, category.product_count
            )));
        }

        sqlx::query("UPDATE categories SET is_active = false, updated_at = NOW() WHERE id = $1")
            .bind(category_id)
            .execute(&self.db)
            .await?;

        tracing::info!(category_id = %category_id, "Category deactivated");
        Ok(())
    }

    async fn ensure_name_free(&self, name: &str, except: Option<Uuid>) -> AppResult<()> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM categories
                WHERE name = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(name)
        .bind(except)
        .fetch_one(&self.db)
        .await?;

        if taken {
            return Err(AppError::Conflict {
                resource: "name".to_string(),
                message: format!("Category '{}' already exists.", name),
            });
        }
        Ok(())
    }
}
