use crate::catalog::dto::DishFilter;
use crate::catalog::repo_types::{Dish, DishCategory};
use sqlx::PgPool;
use uuid::Uuid;

const DISH_COLUMNS: &str = "id, chef_id, name, category, price, calories, protein, carbs, fat, \
                            diabetic_friendly, vegetarian, ingredients, available, created_at";

impl Dish {
    /// Browse the catalog with optional filters, newest first.
    pub async fn list_filtered(
        db: &PgPool,
        filter: &DishFilter,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Dish>> {
        let rows = sqlx::query_as::<_, Dish>(&format!(
            r#"
            SELECT {DISH_COLUMNS}
            FROM dishes
            WHERE available
              AND ($1::text IS NULL OR category = $1)
              AND ($2::float8 IS NULL OR price <= $2)
              AND (NOT $3 OR diabetic_friendly)
              AND (NOT $4 OR vegetarian)
              AND ($5::text IS NULL OR name ILIKE '%' || $5 || '%')
            ORDER BY created_at DESC
            LIMIT $6 OFFSET $7
            "#
        ))
        .bind(filter.category.map(DishCategory::as_str))
        .bind(filter.max_price)
        .bind(filter.diabetic_friendly.unwrap_or(false))
        .bind(filter.vegetarian.unwrap_or(false))
        .bind(filter.q.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Every available dish; the meal planner works over this snapshot.
    pub async fn list_available(db: &PgPool) -> anyhow::Result<Vec<Dish>> {
        let rows = sqlx::query_as::<_, Dish>(&format!(
            r#"SELECT {DISH_COLUMNS} FROM dishes WHERE available ORDER BY created_at DESC"#
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Dish>> {
        let dish = sqlx::query_as::<_, Dish>(&format!(
            r#"SELECT {DISH_COLUMNS} FROM dishes WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(dish)
    }

    /// Dishes referenced by a checkout, available only.
    pub async fn get_many_available(db: &PgPool, ids: &[Uuid]) -> anyhow::Result<Vec<Dish>> {
        let rows = sqlx::query_as::<_, Dish>(&format!(
            r#"SELECT {DISH_COLUMNS} FROM dishes WHERE available AND id = ANY($1)"#
        ))
        .bind(ids)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        db: &PgPool,
        chef_id: Uuid,
        name: &str,
        category: DishCategory,
        price: f64,
        calories: f64,
        protein: f64,
        carbs: f64,
        fat: f64,
        diabetic_friendly: bool,
        vegetarian: bool,
        ingredients: &str,
    ) -> anyhow::Result<Dish> {
        let dish = sqlx::query_as::<_, Dish>(&format!(
            r#"
            INSERT INTO dishes
                (chef_id, name, category, price, calories, protein, carbs, fat,
                 diabetic_friendly, vegetarian, ingredients)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {DISH_COLUMNS}
            "#
        ))
        .bind(chef_id)
        .bind(name)
        .bind(category.as_str())
        .bind(price)
        .bind(calories)
        .bind(protein)
        .bind(carbs)
        .bind(fat)
        .bind(diabetic_friendly)
        .bind(vegetarian)
        .bind(ingredients)
        .fetch_one(db)
        .await?;
        Ok(dish)
    }

    /// Soft-delete a dish owned by the given chef. Returns false when no
    /// matching row exists.
    pub async fn retire_owned(db: &PgPool, id: Uuid, chef_id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"UPDATE dishes SET available = FALSE WHERE id = $1 AND chef_id = $2"#,
        )
        .bind(id)
        .bind(chef_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
