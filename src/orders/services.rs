use crate::catalog::repo_types::Dish;
use crate::orders::repo_types::PromoCode;

/// Loyalty accrual: one point per 10 currency units of the final total.
const POINTS_DIVISOR: f64 = 10.0;

/// Priced checkout, computed before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
    pub points_earned: i64,
}

/// Price a cart snapshot. Quantities are assumed positive (validated at the
/// handler); an inactive promo never reaches this function.
pub fn price_order(lines: &[(&Dish, i64)], promo: Option<&PromoCode>) -> PricedOrder {
    let subtotal: f64 = lines
        .iter()
        .map(|(dish, qty)| dish.price * (*qty as f64))
        .sum();

    let discount = promo
        .map(|p| subtotal * (p.percent_off / 100.0).clamp(0.0, 1.0))
        .unwrap_or(0.0);

    let total = (subtotal - discount).max(0.0);
    let points_earned = (total / POINTS_DIVISOR).floor() as i64;

    PricedOrder {
        subtotal,
        discount,
        total,
        points_earned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::repo_types::DishCategory;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn dish(price: f64) -> Dish {
        Dish {
            id: Uuid::new_v4(),
            chef_id: Uuid::new_v4(),
            name: "Dish".into(),
            category: DishCategory::Rice,
            price,
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
            diabetic_friendly: false,
            vegetarian: false,
            ingredients: String::new(),
            available: true,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn promo(percent_off: f64) -> PromoCode {
        PromoCode {
            code: "WELCOME".into(),
            percent_off,
            active: true,
        }
    }

    #[test]
    fn prices_without_promo() {
        let a = dish(12.5);
        let b = dish(4.0);
        let priced = price_order(&[(&a, 2), (&b, 1)], None);
        assert_eq!(priced.subtotal, 29.0);
        assert_eq!(priced.discount, 0.0);
        assert_eq!(priced.total, 29.0);
        assert_eq!(priced.points_earned, 2);
    }

    #[test]
    fn applies_percent_promo() {
        let a = dish(50.0);
        let p = promo(20.0);
        let priced = price_order(&[(&a, 2)], Some(&p));
        assert_eq!(priced.subtotal, 100.0);
        assert_eq!(priced.discount, 20.0);
        assert_eq!(priced.total, 80.0);
        assert_eq!(priced.points_earned, 8);
    }

    #[test]
    fn absurd_promo_never_goes_negative() {
        let a = dish(10.0);
        let p = promo(250.0);
        let priced = price_order(&[(&a, 1)], Some(&p));
        assert_eq!(priced.total, 0.0);
        assert_eq!(priced.points_earned, 0);
    }

    #[test]
    fn empty_cart_prices_to_zero() {
        let priced = price_order(&[], None);
        assert_eq!(priced.subtotal, 0.0);
        assert_eq!(priced.points_earned, 0);
    }
}
