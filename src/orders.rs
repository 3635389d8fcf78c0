//! The order placement workflow: validation, pricing, and atomic
//! persistence of an order with its line items.
//!
//! Pricing is server-authoritative. Each line's unit price is the catalog
//! price resolved inside the order transaction; the client's claimed price
//! is only cross-checked and logged on mismatch. Unit prices are stored as
//! snapshots, so later catalog edits never alter historical orders.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use tracing::{info, warn};

use crate::{
    database::decode_money,
    error::AppError,
    menu,
    models::{
        CreatedOrder, ItemPayload, NewOrder, NewOrderLine, OrderLine, OrderPayload, OrderStatus,
        OrderSummary,
    },
    utils::{is_valid_email, sanitize},
};

const LIST_ORDERS_SQL: &str = "\
    SELECT \
        o.id, o.customer_name, o.customer_email, o.customer_phone, \
        o.delivery_address, o.total_amount, o.status, o.notes, \
        o.created_at, o.updated_at, \
        COUNT(oi.id) AS item_count \
    FROM orders o \
    LEFT JOIN order_items oi ON o.id = oi.order_id \
    GROUP BY o.id \
    ORDER BY o.created_at DESC";

/// Normalizes a raw order payload into a [`NewOrder`] or rejects it.
///
/// Pure: no I/O. Catalog existence is checked later, inside the
/// transaction.
pub fn validate(payload: OrderPayload) -> Result<NewOrder, AppError> {
    let customer_name = sanitize(payload.customer_name.as_deref().unwrap_or(""));
    if customer_name.is_empty() {
        return Err(AppError::Validation(
            "Missing required field: customer_name".to_string(),
        ));
    }

    let items = payload
        .items
        .ok_or_else(|| AppError::Validation("Missing required field: items".to_string()))?;
    if items.is_empty() {
        return Err(AppError::Validation(
            "Items must be a non-empty array".to_string(),
        ));
    }

    let customer_email = sanitize(payload.customer_email.as_deref().unwrap_or(""));
    if !customer_email.is_empty() && !is_valid_email(&customer_email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    let mut customer_phone = sanitize(payload.customer_phone.as_deref().unwrap_or(""));
    if customer_phone.is_empty() {
        customer_phone = "Not provided".to_string();
    }

    let items = items.into_iter().map(validate_item).collect::<Result<_, _>>()?;

    Ok(NewOrder {
        customer_name,
        customer_email,
        customer_phone,
        delivery_address: sanitize(payload.delivery_address.as_deref().unwrap_or("")),
        notes: sanitize(payload.notes.as_deref().unwrap_or("")),
        items,
    })
}

fn validate_item(item: ItemPayload) -> Result<NewOrderLine, AppError> {
    let (Some(item_id), Some(quantity), Some(claimed_price)) =
        (item.item_id, item.quantity, item.price)
    else {
        return Err(AppError::Validation("Invalid item data".to_string()));
    };

    if item_id <= 0 {
        return Err(AppError::Validation("Invalid item data".to_string()));
    }

    if quantity <= 0 || claimed_price <= Decimal::ZERO {
        return Err(AppError::Validation(
            "Invalid quantity or price".to_string(),
        ));
    }

    Ok(NewOrderLine {
        item_id,
        quantity,
        claimed_price,
    })
}

/// Persists a validated order atomically and returns the committed rows.
///
/// One transaction covers catalog resolution, the header insert, and every
/// line insert. Any failure drops the transaction, which rolls back; no
/// partial order is ever visible. No retries: a failed transaction is
/// terminal for this request.
pub async fn place_order(pool: &SqlitePool, order: NewOrder) -> Result<CreatedOrder, AppError> {
    let mut tx = pool.begin().await?;

    let mut total_amount = Decimal::ZERO;
    let mut lines = Vec::with_capacity(order.items.len());

    for line in &order.items {
        let item = menu::resolve_item(&mut tx, line.item_id).await?;

        if item.price != line.claimed_price {
            warn!(
                "Claimed price {} for item {} ({}) disagrees with catalog price {}",
                line.claimed_price, line.item_id, item.name, item.price
            );
        }

        let line_total = item.price * Decimal::from(line.quantity);
        total_amount += line_total;
        lines.push((line, item.price, line_total));
    }

    if total_amount <= Decimal::ZERO {
        return Err(AppError::InvalidTotal);
    }

    let now = Utc::now().to_rfc3339();

    let order_id = sqlx::query(
        "INSERT INTO orders \
         (customer_name, customer_email, customer_phone, delivery_address, \
          total_amount, notes, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&order.customer_name)
    .bind(&order.customer_email)
    .bind(&order.customer_phone)
    .bind(&order.delivery_address)
    .bind(total_amount.to_string())
    .bind(&order.notes)
    .bind(&now)
    .bind(&now)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for (line, unit_price, line_total) in &lines {
        sqlx::query(
            "INSERT INTO order_items \
             (order_id, menu_item_id, quantity, unit_price, total_price) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(line.item_id)
        .bind(line.quantity)
        .bind(unit_price.to_string())
        .bind(line_total.to_string())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(
        "Order {order_id} placed: {} line(s), total {total_amount}",
        lines.len()
    );

    read_order(pool, order_id).await
}

/// Re-reads a committed order and its lines (read-after-write consistency
/// for the caller).
async fn read_order(pool: &SqlitePool, order_id: i64) -> Result<CreatedOrder, AppError> {
    let header = sqlx::query(
        "SELECT id, customer_name, total_amount, status FROM orders WHERE id = ?",
    )
    .bind(order_id)
    .fetch_one(pool)
    .await?;

    let lines = sqlx::query(
        "SELECT id, order_id, menu_item_id, quantity, unit_price, total_price \
         FROM order_items WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(CreatedOrder {
        id: header.get("id"),
        customer_name: header.get("customer_name"),
        total_amount: decode_money(&header.get::<String, _>("total_amount"))?,
        status: decode_status(&header.get::<String, _>("status"))?,
        items: lines
            .into_iter()
            .map(line_from_row)
            .collect::<Result<_, _>>()?,
    })
}

/// Returns every order header, newest first, with its line-item count.
pub async fn list_orders(pool: &SqlitePool) -> Result<Vec<OrderSummary>, AppError> {
    let rows = sqlx::query(LIST_ORDERS_SQL).fetch_all(pool).await?;

    rows.into_iter().map(summary_from_row).collect()
}

fn line_from_row(row: SqliteRow) -> Result<OrderLine, AppError> {
    Ok(OrderLine {
        id: row.get("id"),
        order_id: row.get("order_id"),
        menu_item_id: row.get("menu_item_id"),
        quantity: row.get("quantity"),
        unit_price: decode_money(&row.get::<String, _>("unit_price"))?,
        total_price: decode_money(&row.get::<String, _>("total_price"))?,
    })
}

fn summary_from_row(row: SqliteRow) -> Result<OrderSummary, AppError> {
    Ok(OrderSummary {
        id: row.get("id"),
        customer_name: row.get("customer_name"),
        customer_email: row.get("customer_email"),
        customer_phone: row.get("customer_phone"),
        delivery_address: row.get("delivery_address"),
        total_amount: decode_money(&row.get::<String, _>("total_amount"))?,
        status: decode_status(&row.get::<String, _>("status"))?,
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        item_count: row.get("item_count"),
    })
}

fn decode_status(raw: &str) -> Result<OrderStatus, AppError> {
    OrderStatus::parse(raw).ok_or_else(|| AppError::Database(format!("Unknown order status {raw:?}")))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use sqlx::SqlitePool;

    use super::{list_orders, place_order, validate};
    use crate::{
        database,
        error::AppError,
        models::{ItemPayload, NewOrder, NewOrderLine, OrderPayload, OrderStatus},
    };

    fn payload(name: &str, items: Vec<ItemPayload>) -> OrderPayload {
        OrderPayload {
            customer_name: Some(name.to_string()),
            customer_email: None,
            customer_phone: None,
            delivery_address: None,
            notes: None,
            items: Some(items),
        }
    }

    fn item(item_id: i64, quantity: i64, price: &str) -> ItemPayload {
        ItemPayload {
            item_id: Some(item_id),
            quantity: Some(quantity),
            price: Some(price.parse().unwrap()),
        }
    }

    fn new_order(items: Vec<NewOrderLine>) -> NewOrder {
        NewOrder {
            customer_name: "Jane".to_string(),
            customer_email: String::new(),
            customer_phone: "Not provided".to_string(),
            delivery_address: String::new(),
            notes: String::new(),
            items,
        }
    }

    fn line(item_id: i64, quantity: i64, claimed: &str) -> NewOrderLine {
        NewOrderLine {
            item_id,
            quantity,
            claimed_price: claimed.parse().unwrap(),
        }
    }

    async fn test_pool() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        database::init_schema(&pool).await.unwrap();
        pool
    }

    async fn insert_item(pool: &SqlitePool, name: &str, price: &str, available: bool) -> i64 {
        sqlx::query(
            "INSERT INTO menu_items \
             (item_name, description, price, category, image_path, is_available, created_at, updated_at) \
             VALUES (?, '', ?, 'Test', '', ?, '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
        )
        .bind(name)
        .bind(price)
        .bind(available as i64)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
    }

    async fn count(pool: &SqlitePool, table: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap();
        count
    }

    #[test]
    fn test_validate_requires_customer_name() {
        let mut raw = payload("  ", vec![item(1, 1, "9.99")]);
        let err = validate(raw).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("customer_name")));

        raw = payload("Jane", vec![item(1, 1, "9.99")]);
        raw.customer_name = None;
        assert!(validate(raw).is_err());
    }

    #[test]
    fn test_validate_requires_items() {
        let mut raw = payload("Jane", vec![]);
        let err = validate(raw).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("non-empty")));

        raw = payload("Jane", vec![]);
        raw.items = None;
        let err = validate(raw).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("items")));
    }

    #[test]
    fn test_validate_rejects_bad_lines() {
        let err = validate(payload("Jane", vec![item(1, 0, "9.99")])).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("quantity or price")));

        let err = validate(payload("Jane", vec![item(1, 2, "-1.00")])).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("quantity or price")));

        let err = validate(payload("Jane", vec![item(-3, 2, "9.99")])).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("item data")));

        let missing = ItemPayload {
            item_id: Some(1),
            quantity: None,
            price: Some(dec!(9.99)),
        };
        let err = validate(payload("Jane", vec![missing])).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("item data")));
    }

    #[test]
    fn test_validate_normalizes_optional_fields() {
        let mut raw = payload("  Jane <Doe>  ", vec![item(1, 1, "9.99")]);
        raw.customer_email = Some("jane@example.com".to_string());
        raw.notes = Some("  extra sauce  ".to_string());

        let order = validate(raw).unwrap();

        assert_eq!(order.customer_name, "Jane &lt;Doe&gt;");
        assert_eq!(order.customer_email, "jane@example.com");
        assert_eq!(order.customer_phone, "Not provided");
        assert_eq!(order.delivery_address, "");
        assert_eq!(order.notes, "extra sauce");
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let mut raw = payload("Jane", vec![item(1, 1, "9.99")]);
        raw.customer_email = Some("not-an-email".to_string());

        let err = validate(raw).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "Invalid email address"));
    }

    #[tokio::test]
    async fn test_place_order_persists_all_lines_with_exact_total() {
        let pool = test_pool().await;
        let salad = insert_item(&pool, "Salad", "12.99", true).await;
        let burger = insert_item(&pool, "Burger", "15.99", true).await;

        let order = place_order(
            &pool,
            new_order(vec![line(salad, 2, "12.99"), line(burger, 1, "15.99")]),
        )
        .await
        .unwrap();

        assert_eq!(order.items.len(), 2);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, dec!(41.97));

        let line_sum: rust_decimal::Decimal =
            order.items.iter().map(|l| l.total_price).sum();
        assert_eq!(order.total_amount, line_sum);

        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].unit_price, dec!(12.99));
        assert_eq!(order.items[0].total_price, dec!(25.98));
    }

    #[tokio::test]
    async fn test_place_order_ignores_claimed_price() {
        let pool = test_pool().await;
        let salad = insert_item(&pool, "Salad", "12.99", true).await;

        // Tampered claim: totals still come from the catalog.
        let order = place_order(&pool, new_order(vec![line(salad, 2, "0.01")]))
            .await
            .unwrap();

        assert_eq!(order.total_amount, dec!(25.98));
        assert_eq!(order.items[0].unit_price, dec!(12.99));
    }

    #[tokio::test]
    async fn test_unavailable_item_rolls_back_everything() {
        let pool = test_pool().await;
        let salad = insert_item(&pool, "Salad", "12.99", true).await;
        let retired = insert_item(&pool, "Retired Dish", "9.99", false).await;

        let err = place_order(
            &pool,
            new_order(vec![line(salad, 1, "12.99"), line(retired, 1, "9.99")]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::ItemNotFound(found) if found == retired));
        assert_eq!(count(&pool, "orders").await, 0);
        assert_eq!(count(&pool, "order_items").await, 0);
    }

    #[tokio::test]
    async fn test_missing_item_rolls_back_everything() {
        let pool = test_pool().await;
        let salad = insert_item(&pool, "Salad", "12.99", true).await;

        let err = place_order(
            &pool,
            new_order(vec![line(salad, 1, "12.99"), line(999, 1, "9.99")]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::ItemNotFound(999)));
        assert_eq!(count(&pool, "orders").await, 0);
        assert_eq!(count(&pool, "order_items").await, 0);
    }

    #[tokio::test]
    async fn test_failed_line_insert_rolls_back_header_and_lines() {
        let pool = test_pool().await;
        let salad = insert_item(&pool, "Salad", "12.99", true).await;
        let burger = insert_item(&pool, "Burger", "15.99", true).await;

        // A zero quantity slips past pricing (its line total is zero) and
        // trips the quantity CHECK on the second insert, after the header
        // and first line are already written.
        let err = place_order(
            &pool,
            new_order(vec![line(salad, 1, "12.99"), line(burger, 0, "15.99")]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(count(&pool, "orders").await, 0);
        assert_eq!(count(&pool, "order_items").await, 0);
    }

    #[tokio::test]
    async fn test_zero_total_is_rejected_before_any_write() {
        let pool = test_pool().await;
        let salad = insert_item(&pool, "Salad", "12.99", true).await;

        let err = place_order(&pool, new_order(vec![line(salad, 0, "12.99")]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidTotal));
        assert_eq!(count(&pool, "orders").await, 0);
    }

    #[tokio::test]
    async fn test_resubmission_creates_distinct_orders() {
        let pool = test_pool().await;
        let salad = insert_item(&pool, "Salad", "12.99", true).await;

        let first = place_order(&pool, new_order(vec![line(salad, 1, "12.99")]))
            .await
            .unwrap();
        let second = place_order(&pool, new_order(vec![line(salad, 1, "12.99")]))
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(count(&pool, "orders").await, 2);
    }

    #[tokio::test]
    async fn test_list_orders_includes_item_counts() {
        let pool = test_pool().await;
        let salad = insert_item(&pool, "Salad", "12.99", true).await;
        let burger = insert_item(&pool, "Burger", "15.99", true).await;

        place_order(
            &pool,
            new_order(vec![line(salad, 1, "12.99"), line(burger, 2, "15.99")]),
        )
        .await
        .unwrap();

        let orders = list_orders(&pool).await.unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].item_count, 2);
        assert_eq!(orders[0].total_amount, dec!(44.97));
        assert_eq!(orders[0].status, OrderStatus::Pending);
        assert_eq!(orders[0].customer_phone, "Not provided");
    }
}
