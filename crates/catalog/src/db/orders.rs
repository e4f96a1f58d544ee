//! Order repository.
//!
//! Order numbers are allocated here: `ORD-YYYYMMDD-NNNN`, where the date is
//! the UTC creation date and the sequence is one more than the number of
//! orders already created that day. Two concurrent creations can race to
//! the same sequence; the unique index on `order_number` is the arbiter, and
//! a loser re-counts and retries a bounded number of times.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use tracing::warn;

use orchard_core::{OrderId, OrderNumber, OrderStatus, UserId};

use super::{RepositoryError, conflict_on_unique, from_jsonb, to_jsonb};
use crate::error::CatalogError;
use crate::models::{NewOrder, Order, StatusChange};
use crate::validate::Validate;

/// Attempts at allocating an order number before giving up.
const MAX_NUMBER_ATTEMPTS: u32 = 5;

/// Conflict message reserved for order-number collisions; the allocation
/// loop retries exactly these.
const ORDER_NUMBER_TAKEN: &str = "order number already exists";

const ORDER_COLUMNS: &str = "id, order_number, user_id, customer_info, items, pricing, \
     shipping_address, billing_address, payment, shipping, status, status_history, notes, \
     created_at, updated_at";

/// Internal row type for `PostgreSQL` order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    user_id: i64,
    customer_info: serde_json::Value,
    items: serde_json::Value,
    pricing: serde_json::Value,
    shipping_address: serde_json::Value,
    billing_address: serde_json::Value,
    payment: serde_json::Value,
    shipping: serde_json::Value,
    status: String,
    status_history: serde_json::Value,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let order_number = OrderNumber::parse(&row.order_number).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order number in database: {e}"))
        })?;
        let status: OrderStatus = row.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            order_number,
            user_id: UserId::new(row.user_id),
            customer: from_jsonb(row.customer_info, "order customer info")?,
            items: from_jsonb(row.items, "order items")?,
            pricing: from_jsonb(row.pricing, "order pricing")?,
            shipping_address: from_jsonb(row.shipping_address, "order shipping address")?,
            billing_address: from_jsonb(row.billing_address, "order billing address")?,
            payment: from_jsonb(row.payment, "order payment")?,
            shipping: from_jsonb(row.shipping, "order shipping")?,
            status,
            status_history: from_jsonb(row.status_history, "order status history")?,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// UTC instant range covering one calendar day: `[start, next day start)`.
fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order, allocating its order number.
    ///
    /// The number is assigned exactly once, here; it never changes
    /// afterwards. On an order-number collision the allocation re-counts
    /// and retries up to a small bound.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if field constraints fail.
    /// Returns `RepositoryError::Conflict` if allocation exhausts its
    /// retries.
    pub async fn create(&self, new: &NewOrder) -> Result<Order, CatalogError> {
        new.validate()?;

        for attempt in 1..=MAX_NUMBER_ATTEMPTS {
            let today = Utc::now().date_naive();
            let count = self.count_created_on(today).await?;
            let sequence = u32::try_from(count + 1).unwrap_or(u32::MAX);
            let number = OrderNumber::compose(today, sequence);

            match self.insert(new, &number).await {
                Ok(order) => return Ok(order),
                Err(RepositoryError::Conflict(msg)) if msg == ORDER_NUMBER_TAKEN => {
                    warn!(%number, attempt, "order number already taken; re-counting");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(RepositoryError::Conflict(
            "order number allocation exhausted its retries".to_owned(),
        )
        .into())
    }

    async fn insert(&self, new: &NewOrder, number: &OrderNumber) -> Result<Order, RepositoryError> {
        let initial_history = vec![StatusChange {
            status: OrderStatus::Pending,
            timestamp: Utc::now(),
            note: Some("order created".to_owned()),
        }];

        let sql = format!(
            "INSERT INTO store_order \
                 (order_number, user_id, customer_info, items, pricing, shipping_address, \
                  billing_address, payment, shipping, status, status_history, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(number.as_str())
            .bind(new.user_id.as_i64())
            .bind(to_jsonb(&new.customer)?)
            .bind(to_jsonb(&new.items)?)
            .bind(to_jsonb(&new.pricing)?)
            .bind(to_jsonb(&new.shipping_address)?)
            .bind(to_jsonb(&new.billing_address)?)
            .bind(to_jsonb(&new.payment)?)
            .bind(to_jsonb(&new.shipping)?)
            .bind(OrderStatus::Pending.to_string())
            .bind(to_jsonb(&initial_history)?)
            .bind(new.notes.as_deref())
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, ORDER_NUMBER_TAKEN))?;

        row.try_into()
    }

    /// Count orders created on a UTC calendar day.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_created_on(&self, date: NaiveDate) -> Result<i64, RepositoryError> {
        let (start, end) = day_bounds(date);

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM store_order WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM store_order WHERE id = $1");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        row.map(Order::try_from).transpose()
    }

    /// Get an order by its order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_number(
        &self,
        number: &OrderNumber,
    ) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM store_order WHERE order_number = $1");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(number.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(Order::try_from).transpose()
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM store_order \
             WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(user_id.as_i64())
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Transition an order's status, appending to its history log.
    ///
    /// The history is append-only; prior entries are never rewritten.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        note: Option<String>,
    ) -> Result<Order, RepositoryError> {
        let change = StatusChange {
            status,
            timestamp: Utc::now(),
            note,
        };

        let sql = format!(
            "UPDATE store_order \
             SET status = $2, status_history = status_history || $3::jsonb, updated_at = now() \
             WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id.as_i64())
            .bind(status.to_string())
            .bind(to_jsonb(&change)?)
            .fetch_optional(self.pool)
            .await?;

        let row = row.ok_or(RepositoryError::NotFound)?;
        row.try_into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_day_bounds_cover_exactly_one_day() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let (start, end) = day_bounds(date);

        assert_eq!(start.to_rfc3339(), "2024-05-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-05-02T00:00:00+00:00");
        assert_eq!(end - start, Duration::days(1));
    }

    #[test]
    fn test_sequence_is_count_plus_one() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        for (count, suffix) in [(0_i64, "0001"), (1, "0002"), (2, "0003")] {
            let sequence = u32::try_from(count + 1).unwrap();
            let number = OrderNumber::compose(date, sequence);
            assert!(number.as_str().ends_with(suffix));
        }
    }
}
