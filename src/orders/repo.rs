use crate::catalog::repo_types::Dish;
use crate::orders::repo_types::{Order, OrderItem, PromoCode};
use crate::orders::services::PricedOrder;
use sqlx::PgPool;
use uuid::Uuid;

const ORDER_COLUMNS: &str =
    "id, user_id, subtotal, discount, total, promo_code, points_earned, created_at";
const ITEM_COLUMNS: &str =
    "id, order_id, dish_id, chef_id, name, category, price, calories, ingredients, quantity";

impl Order {
    /// Persist an order with its denormalized item rows and credit loyalty
    /// points, all in one transaction.
    pub async fn create_with_items(
        db: &PgPool,
        user_id: Uuid,
        priced: &PricedOrder,
        promo_code: Option<&str>,
        lines: &[(&Dish, i64)],
    ) -> anyhow::Result<(Order, Vec<OrderItem>)> {
        let mut tx = db.begin().await?;

        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders (user_id, subtotal, discount, total, promo_code, points_earned)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(priced.subtotal)
        .bind(priced.discount)
        .bind(priced.total)
        .bind(promo_code)
        .bind(priced.points_earned)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for (dish, quantity) in lines {
            let item = sqlx::query_as::<_, OrderItem>(&format!(
                r#"
                INSERT INTO order_items
                    (order_id, dish_id, chef_id, name, category, price, calories, ingredients, quantity)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING {ITEM_COLUMNS}
                "#
            ))
            .bind(order.id)
            .bind(dish.id)
            .bind(dish.chef_id)
            .bind(&dish.name)
            .bind(dish.category.as_str())
            .bind(dish.price)
            .bind(dish.calories)
            .bind(&dish.ingredients)
            .bind(quantity)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);
        }

        sqlx::query(r#"UPDATE users SET loyalty_points = loyalty_points + $1 WHERE id = $2"#)
            .bind(priced.points_earned)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((order, items))
    }

    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Recent history for the analyzer, newest first. Capped so a very long
    /// history does not dominate the aggregate or the query.
    pub async fn history(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 200
            "#
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Items belonging to a set of orders, used to attach lines to history
    /// pages and to feed the analyzer.
    pub async fn items_for(db: &PgPool, order_ids: &[Uuid]) -> anyhow::Result<Vec<OrderItem>> {
        let rows = sqlx::query_as::<_, OrderItem>(&format!(
            r#"SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1)"#
        ))
        .bind(order_ids)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

impl OrderItem {
    /// Every sold line for one chef's dishes, for the chef analytics view.
    pub async fn list_by_chef(db: &PgPool, chef_id: Uuid) -> anyhow::Result<Vec<OrderItem>> {
        let rows = sqlx::query_as::<_, OrderItem>(&format!(
            r#"SELECT {ITEM_COLUMNS} FROM order_items WHERE chef_id = $1"#
        ))
        .bind(chef_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

impl PromoCode {
    pub async fn find_active(db: &PgPool, code: &str) -> anyhow::Result<Option<PromoCode>> {
        let promo = sqlx::query_as::<_, PromoCode>(
            r#"SELECT code, percent_off, active FROM promo_codes WHERE code = $1 AND active"#,
        )
        .bind(code)
        .fetch_optional(db)
        .await?;
        Ok(promo)
    }
}
