use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Number, Value};

use super::{Tool, ToolError, ToolResult};
use crate::models::tool::ToolDeclaration;

const TAX_RATE: f64 = 0.1;

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Looks an order up in a small in-memory table
pub struct SearchOrder {
    declaration: ToolDeclaration,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchOrderArgs {
    order_id: Value,
}

impl Default for SearchOrder {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchOrder {
    pub fn new() -> Self {
        Self {
            declaration: ToolDeclaration::new(
                "searchOrder",
                "Look up an order by ID",
                json!({"orderId": {"type": "string"}}),
            )
            .with_required(["orderId"]),
        }
    }

    /// Render a numeric ID the way it is keyed, so `1001.0` finds order "1001"
    fn numeric_key(id: &Number) -> String {
        match id.as_f64() {
            Some(value) if id.is_f64() && value.fract() == 0.0 && value.abs() < 1e15 => {
                format!("{}", value as i64)
            }
            _ => id.to_string(),
        }
    }

    fn lookup(order_id: &str) -> Option<Value> {
        match order_id {
            "1001" => Some(json!({"orderId": "1001", "status": "shipped", "total": 49.99})),
            "1002" => Some(json!({"orderId": "1002", "status": "processing", "total": 19.5})),
            _ => None,
        }
    }
}

#[async_trait]
impl Tool for SearchOrder {
    fn declaration(&self) -> &ToolDeclaration {
        &self.declaration
    }

    async fn invoke(&self, arguments: Value) -> ToolResult<Value> {
        let args: SearchOrderArgs = serde_json::from_value(arguments)?;
        let key = match &args.order_id {
            Value::String(id) => id.clone(),
            Value::Number(id) => Self::numeric_key(id),
            other => {
                return Err(ToolError::InvalidParameters(format!(
                    "orderId must be a string or number, got {}",
                    other
                )))
            }
        };

        Ok(Self::lookup(&key)
            .unwrap_or_else(|| json!({"error": "order_not_found", "orderId": args.order_id})))
    }
}

/// Computes subtotal, tax and total for a list of line items
pub struct CalculatePrice {
    declaration: ToolDeclaration,
}

#[derive(Deserialize)]
struct CalculatePriceArgs {
    items: Vec<LineItem>,
}

#[derive(Deserialize)]
struct LineItem {
    #[serde(default)]
    qty: Option<f64>,
    #[serde(default)]
    price: Option<f64>,
}

impl LineItem {
    fn amount(&self) -> f64 {
        // A zero quantity counts as one
        let qty = self.qty.filter(|q| *q != 0.0).unwrap_or(1.0);
        qty * self.price.unwrap_or(0.0)
    }
}

impl Default for CalculatePrice {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculatePrice {
    pub fn new() -> Self {
        Self {
            declaration: ToolDeclaration::new(
                "calculatePrice",
                "Calculate subtotal, tax and total for list of items",
                json!({
                    "items": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "name": {"type": "string"},
                                "qty": {"type": "number"},
                                "price": {"type": "number"}
                            }
                        }
                    }
                }),
            )
            .with_required(["items"]),
        }
    }
}

#[async_trait]
impl Tool for CalculatePrice {
    fn declaration(&self) -> &ToolDeclaration {
        &self.declaration
    }

    async fn invoke(&self, arguments: Value) -> ToolResult<Value> {
        let args: CalculatePriceArgs = serde_json::from_value(arguments)?;
        let subtotal: f64 = args.items.iter().map(LineItem::amount).sum();
        let tax = round_cents(subtotal * TAX_RATE);
        let total = round_cents(subtotal + tax);

        Ok(json!({"subtotal": subtotal, "tax": tax, "total": total}))
    }
}

/// Acknowledges a user action without persisting it
pub struct LogUserAction {
    declaration: ToolDeclaration,
}

#[derive(Deserialize)]
struct LogUserActionArgs {
    userid: String,
    action: String,
}

impl Default for LogUserAction {
    fn default() -> Self {
        Self::new()
    }
}

impl LogUserAction {
    pub fn new() -> Self {
        Self {
            declaration: ToolDeclaration::new(
                "logUserAction",
                "Log a user action",
                json!({
                    "userid": {"type": "string"},
                    "action": {"type": "string"}
                }),
            )
            .with_required(["userid", "action"]),
        }
    }
}

#[async_trait]
impl Tool for LogUserAction {
    fn declaration(&self) -> &ToolDeclaration {
        &self.declaration
    }

    async fn invoke(&self, arguments: Value) -> ToolResult<Value> {
        let args: LogUserActionArgs = serde_json::from_value(arguments)?;
        tracing::info!(userid = %args.userid, action = %args.action, "user action");

        Ok(json!({
            "ok": true,
            "userid": args.userid,
            "action": args.action,
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }))
    }
}
