//! # IPC
//!
//! Line-delimited JSON over stdin/stdout.
//!
//! ```text
//! stdin  ─► {"id":1,"cmd":"add_to_cart","args":{"productId":"…","quantity":2}}
//! stdout ◄─ {"id":1,"ok":true,"data":{…}}
//!
//! stdin  ─► {"id":2,"cmd":"complete_sale"}
//! stdout ◄─ {"id":2,"ok":false,"error":{"code":"OUTSTANDING_BALANCE","message":"…"}}
//! ```
//!
//! Requests are handled one at a time, in order. `id` is echoed back as
//! given (number or string). A line that is not a valid request gets a
//! response with `"id":null`. Logs go to stderr, never stdout.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::commands::{cart, checkout, config, customer, product, sale, sync};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Value,
    pub cmd: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub id: Value,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl Response {
    fn ok(id: Value, data: Value) -> Self {
        Response {
            id,
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(id: Value, error: ApiError) -> Self {
        Response {
            id,
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

fn args<T: DeserializeOwned>(cmd: &str, raw: Value) -> Result<T, ApiError> {
    let raw = if raw.is_null() {
        Value::Object(Default::default())
    } else {
        raw
    };
    serde_json::from_value(raw)
        .map_err(|e| ApiError::validation(format!("Invalid arguments for {}: {}", cmd, e)))
}

fn data<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

/// Runs one command against the register state.
pub async fn dispatch(state: &AppState, cmd: &str, raw: Value) -> Result<Value, ApiError> {
    let (db, co, cfg) = (&state.db, &state.checkout, &state.config);

    match cmd {
        // Products
        "search_products" => data(product::search_products(db, cfg, args(cmd, raw)?).await?),
        "get_product_by_id" => data(product::get_product_by_id(db, args(cmd, raw)?).await?),
        "get_product_by_sku" => data(product::get_product_by_sku(db, cfg, args(cmd, raw)?).await?),
        // Customers
        "search_customers" => data(customer::search_customers(db, cfg, args(cmd, raw)?).await?),
        "get_customer" => data(customer::get_customer(db, cfg, args(cmd, raw)?).await?),
        // Cart
        "get_cart" => data(cart::get_cart(co, cfg)),
        "add_to_cart" => data(cart::add_to_cart(db, co, cfg, args(cmd, raw)?).await?),
        "update_cart_item" => data(cart::update_cart_item(co, cfg, args(cmd, raw)?)?),
        "remove_from_cart" => data(cart::remove_from_cart(co, cfg, args(cmd, raw)?)?),
        "clear_cart" => data(cart::clear_cart(co, cfg)),
        // Checkout
        "get_checkout" => data(checkout::get_checkout(co, cfg)),
        "set_discount" => data(checkout::set_discount(co, cfg, args(cmd, raw)?)?),
        "attach_customer" => data(checkout::attach_customer(db, co, cfg, args(cmd, raw)?).await?),
        "detach_customer" => data(checkout::detach_customer(co, cfg)),
        "set_points" => data(checkout::set_points(co, cfg, args(cmd, raw)?)?),
        "set_pending_tender" => data(checkout::set_pending_tender(co, cfg, args(cmd, raw)?)?),
        "add_tender" => data(checkout::add_tender(co, cfg, args(cmd, raw)?)?),
        "pay_remaining" => data(checkout::pay_remaining(co, cfg)?),
        "remove_tender" => data(checkout::remove_tender(co, cfg, args(cmd, raw)?)?),
        // Sales
        "complete_sale" => data(sale::complete_sale(db, co, cfg, args(cmd, raw)?).await?),
        "get_sale" => data(sale::get_sale(db, args(cmd, raw)?).await?),
        "list_recent_sales" => data(sale::list_recent_sales(db, cfg, args(cmd, raw)?).await?),
        "void_sale" => data(sale::void_sale(db, args(cmd, raw)?).await?),
        // Config
        "get_config" => data(config::get_config(cfg)),
        "update_pricing" => data(config::update_pricing(db, cfg, args(cmd, raw)?).await?),
        // Sync
        "get_sync_status" => data(sync::get_sync_status(db).await?),
        _ => Err(ApiError::unknown_command(cmd)),
    }
}

/// Parses one request line, runs it, and builds the response.
pub async fn handle_line(state: &AppState, line: &str) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Malformed request");
            return Response::err(
                Value::Null,
                ApiError::validation(format!("Malformed request: {}", e)),
            );
        }
    };

    debug!(id = %request.id, cmd = %request.cmd, "Request");
    match dispatch(state, &request.cmd, request.args).await {
        Ok(data) => Response::ok(request.id, data),
        Err(error) => {
            debug!(id = %request.id, cmd = %request.cmd, code = ?error.code, "Request failed");
            Response::err(request.id, error)
        }
    }
}

/// Serves requests until the reader is exhausted.
pub async fn serve<R, W>(state: &AppState, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0u64;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(state, &line).await;
        let mut out = serde_json::to_vec(&response).map_err(std::io::Error::other)?;
        out.push(b'\n');
        writer.write_all(&out).await?;
        writer.flush().await?;
        handled += 1;
    }

    info!(handled, "Input closed");
    Ok(())
}
