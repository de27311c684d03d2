//! Inventory sample domain (event-sourced).
//!
//! Business rules are deterministic domain logic only (no IO, no storage):
//! the item aggregate, the supplier aggregate it references, and the item view
//! projection that combines the two.

pub mod item;
pub mod supplier;
pub mod view;

pub use item::{InventoryCommands, InventoryItem, SKU_MAX_LENGTH_KEY};
pub use supplier::{Supplier, SupplierCommands};
pub use view::InventoryItemView;
