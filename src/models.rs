//! Wire payloads, domain types, and response envelopes.
//!
//! Incoming payloads keep every field optional so presence checks happen in
//! the validators rather than inside serde. Money fields are
//! [`rust_decimal::Decimal`] end to end; arithmetic on them is exact.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Incoming payloads

#[derive(Debug, Deserialize)]
pub struct OrderPayload {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub items: Option<Vec<ItemPayload>>,
}

#[derive(Debug, Deserialize)]
pub struct ItemPayload {
    pub item_id: Option<i64>,
    pub quantity: Option<i64>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewPayload {
    pub customer_name: Option<String>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
    pub item_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ContactPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Normalized order request (output of validation, input to persistence)

#[derive(Debug)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub notes: String,
    pub items: Vec<NewOrderLine>,
}

#[derive(Debug)]
pub struct NewOrderLine {
    pub item_id: i64,
    pub quantity: i64,
    /// The client's claimed price. Cross-checked against the catalog and
    /// logged on mismatch; never used for computation.
    pub claimed_price: Decimal,
}

// ---------------------------------------------------------------------------
// Stored records

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "preparing" => Some(Self::Preparing),
            "ready" => Some(Self::Ready),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MenuItem {
    pub item_id: i64,
    pub item_name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub image_path: String,
    pub is_available: bool,
    pub avg_rating: f64,
    pub review_count: i64,
}

/// Canonical {name, price} for one orderable catalog item.
#[derive(Debug)]
pub struct ResolvedItem {
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Serialize)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// The committed order as re-read after the transaction.
#[derive(Debug, Serialize)]
pub struct CreatedOrder {
    pub id: i64,
    pub customer_name: String,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub items: Vec<OrderLine>,
}

/// One row of `GET /orders`: the full header plus its line-item count.
#[derive(Debug, Serialize)]
pub struct OrderSummary {
    pub id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
    pub item_count: i64,
}

#[derive(Debug, Serialize)]
pub struct Review {
    pub id: i64,
    pub customer_name: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: String,
    pub is_approved: bool,
    pub item_id: Option<i64>,
    pub item_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: String,
    pub is_read: bool,
}

// ---------------------------------------------------------------------------
// Success envelopes

#[derive(Serialize)]
pub struct MenuResponse {
    pub success: bool,
    pub message: &'static str,
    pub menu_items: Vec<MenuItem>,
    pub total_items: usize,
}

#[derive(Serialize)]
pub struct OrderCreatedResponse {
    pub success: bool,
    pub message: &'static str,
    pub order: CreatedOrder,
}

#[derive(Serialize)]
pub struct OrderListResponse {
    pub success: bool,
    pub message: &'static str,
    pub orders: Vec<OrderSummary>,
    pub total_orders: usize,
}

#[derive(Serialize)]
pub struct ReviewListResponse {
    pub success: bool,
    pub message: &'static str,
    pub reviews: Vec<Review>,
    pub total_reviews: usize,
}

#[derive(Serialize)]
pub struct ReviewCreatedResponse {
    pub success: bool,
    pub message: &'static str,
    pub review: Review,
}

#[derive(Serialize)]
pub struct ContactCreatedResponse {
    pub success: bool,
    pub message: &'static str,
    pub contact_id: i64,
}

#[derive(Serialize)]
pub struct ContactListResponse {
    pub success: bool,
    pub message: &'static str,
    pub messages: Vec<ContactMessage>,
    pub total_messages: usize,
}
