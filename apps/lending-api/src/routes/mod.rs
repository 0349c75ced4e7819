//! HTTP route handlers.
//!
//! ```text
//! GET  /api/health      health::health
//! GET  /api/items       items::list_items
//! POST /api/items       items::add_item
//! GET  /api/checkedout  checkouts::list_open_checkouts
//! POST /api/checkout    checkouts::checkout
//! POST /api/return      checkouts::return_item
//! ```

pub mod checkouts;
pub mod health;
pub mod items;
