//! Client-held cart store
//!
//! The browsing client accumulates line items here before checkout. This is
//! an explicit store with a typed mutation API and a broadcast event channel;
//! consumers subscribe instead of listening for ambient signals, and the
//! event payload always carries the full line set for the mutated user.
//!
//! Preview pricing goes through [`crate::pricing`], the same function the
//! server uses, so a displayed total is exactly what the server will charge
//! for the same cart and voucher.
//!
//! An optional [`CartBacking`] mirrors each user's cart to persistent storage
//! (JSON file per user) so a restarted client resumes where it left off.
//! Backing failures are logged and never fail the mutation.

use std::path::PathBuf;

use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::core_types::UserId;
use crate::order::OrderItem;
use crate::pricing::{self, DiscountKind, Quote, UnitLine};

/// One cart line. `qty` is kept >= 1 by every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub price: Decimal,
    pub qty: i64,
}

impl CartLine {
    fn unit_line(&self) -> UnitLine {
        UnitLine::new(self.price, self.qty)
    }
}

/// Typed cart change notification.
#[derive(Debug, Clone)]
pub enum CartEvent {
    /// A mutation ran; `items` is the user's full cart after it.
    Updated {
        user_id: UserId,
        items: Vec<CartLine>,
    },
    /// The cart was emptied (logout or successful order placement).
    Cleared { user_id: UserId },
}

/// Persistent mirror of per-user carts.
pub trait CartBacking: Send + Sync {
    fn load(&self, user_id: UserId) -> anyhow::Result<Option<Vec<CartLine>>>;
    fn save(&self, user_id: UserId, items: &[CartLine]) -> anyhow::Result<()>;
    fn remove(&self, user_id: UserId) -> anyhow::Result<()>;
}

/// One JSON file per user under a base directory.
pub struct JsonFileBacking {
    dir: PathBuf,
}

impl JsonFileBacking {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, user_id: UserId) -> PathBuf {
        self.dir.join(format!("cart_{user_id}.json"))
    }
}

impl CartBacking for JsonFileBacking {
    fn load(&self, user_id: UserId) -> anyhow::Result<Option<Vec<CartLine>>> {
        let path = self.path_for(user_id);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, user_id: UserId, items: &[CartLine]) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string(items)?;
        std::fs::write(self.path_for(user_id), content)?;
        Ok(())
    }

    fn remove(&self, user_id: UserId) -> anyhow::Result<()> {
        let path = self.path_for(user_id);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

const EVENT_CHANNEL_CAPACITY: usize = 64;

pub struct CartStore {
    carts: DashMap<UserId, Vec<CartLine>>,
    events: broadcast::Sender<CartEvent>,
    backing: Option<Box<dyn CartBacking>>,
}

impl CartStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            carts: DashMap::new(),
            events,
            backing: None,
        }
    }

    pub fn with_backing(backing: Box<dyn CartBacking>) -> Self {
        let mut store = Self::new();
        store.backing = Some(backing);
        store
    }

    /// Subscribe to cart change events. Slow receivers lag, they do not
    /// block mutations.
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// Hydrate a user's cart from the persistent mirror, if any.
    pub fn restore(&self, user_id: UserId) {
        let Some(backing) = self.backing.as_deref() else {
            return;
        };
        match backing.load(user_id) {
            Ok(Some(mut items)) => {
                for line in &mut items {
                    line.qty = line.qty.max(1);
                    if line.price.is_sign_negative() {
                        line.price = Decimal::ZERO;
                    }
                }
                self.carts.insert(user_id, items);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(user_id, "failed to restore cart: {e}"),
        }
    }

    pub fn items(&self, user_id: UserId) -> Vec<CartLine> {
        self.carts
            .get(&user_id)
            .map(|c| c.value().clone())
            .unwrap_or_default()
    }

    /// Add a line; an existing line for the same product gains its quantity.
    pub fn add(&self, user_id: UserId, line: CartLine) {
        let mut cart = self.carts.entry(user_id).or_default();
        let add_qty = line.qty.max(1);
        match cart.iter().position(|l| l.product_id == line.product_id) {
            Some(i) => cart[i].qty = (cart[i].qty + add_qty).max(1),
            None => cart.push(CartLine {
                qty: add_qty,
                price: if line.price.is_sign_negative() {
                    Decimal::ZERO
                } else {
                    line.price
                },
                ..line
            }),
        }
        let items = cart.value().clone();
        drop(cart);
        self.after_mutation(user_id, items);
    }

    /// Set a line's quantity; values below 1 clamp to 1.
    pub fn set_qty(&self, user_id: UserId, product_id: &str, qty: i64) {
        let Some(mut cart) = self.carts.get_mut(&user_id) else {
            return;
        };
        let Some(line) = cart.iter_mut().find(|l| l.product_id == product_id) else {
            return;
        };
        line.qty = qty.max(1);
        let items = cart.value().clone();
        drop(cart);
        self.after_mutation(user_id, items);
    }

    pub fn remove(&self, user_id: UserId, product_id: &str) {
        let Some(mut cart) = self.carts.get_mut(&user_id) else {
            return;
        };
        cart.retain(|l| l.product_id != product_id);
        let items = cart.value().clone();
        drop(cart);
        self.after_mutation(user_id, items);
    }

    /// Empty the cart and drop its persistent mirror. Called on logout and
    /// after successful order placement.
    pub fn clear(&self, user_id: UserId) {
        self.carts.remove(&user_id);
        if let Some(backing) = self.backing.as_deref() {
            if let Err(e) = backing.remove(user_id) {
                tracing::warn!(user_id, "failed to clear cart mirror: {e}");
            }
        }
        let _ = self.events.send(CartEvent::Cleared { user_id });
    }

    /// Price the cart with the shared pricing function, optionally applying
    /// a previewed voucher's kind/value.
    pub fn preview(&self, user_id: UserId, voucher: Option<(DiscountKind, Decimal)>) -> Quote {
        let lines: Vec<UnitLine> = self
            .items(user_id)
            .iter()
            .map(CartLine::unit_line)
            .collect();
        pricing::quote(&lines, voucher)
    }

    /// Lines in submission shape for `POST /orders`.
    pub fn to_order_items(&self, user_id: UserId) -> Vec<OrderItem> {
        self.items(user_id)
            .into_iter()
            .map(|l| OrderItem {
                product_id: l.product_id,
                name: l.name,
                price: l.price,
                qty: l.qty,
            })
            .collect()
    }

    fn after_mutation(&self, user_id: UserId, items: Vec<CartLine>) {
        if let Some(backing) = self.backing.as_deref() {
            if let Err(e) = backing.save(user_id, &items) {
                tracing::warn!(user_id, "failed to mirror cart: {e}");
            }
        }
        let _ = self.events.send(CartEvent::Updated { user_id, items });
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn margherita(qty: i64) -> CartLine {
        CartLine {
            product_id: "margherita-12".to_string(),
            name: "Margherita 12\"".to_string(),
            price: dec("10.00"),
            qty,
        }
    }

    fn garlic_bread() -> CartLine {
        CartLine {
            product_id: "garlic-bread".to_string(),
            name: "Garlic Bread".to_string(),
            price: dec("6.00"),
            qty: 1,
        }
    }

    #[test]
    fn test_add_merges_same_product() {
        let store = CartStore::new();
        store.add(1, margherita(1));
        store.add(1, margherita(2));
        let items = store.items(1);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].qty, 3);
    }

    #[test]
    fn test_set_qty_clamps_to_one() {
        let store = CartStore::new();
        store.add(1, margherita(2));
        store.set_qty(1, "margherita-12", 0);
        assert_eq!(store.items(1)[0].qty, 1);
        store.set_qty(1, "margherita-12", -5);
        assert_eq!(store.items(1)[0].qty, 1);
    }

    #[test]
    fn test_carts_are_isolated_per_user() {
        let store = CartStore::new();
        store.add(1, margherita(1));
        store.add(2, garlic_bread());
        assert_eq!(store.items(1).len(), 1);
        assert_eq!(store.items(2).len(), 1);
        store.clear(1);
        assert!(store.items(1).is_empty());
        assert_eq!(store.items(2).len(), 1);
    }

    #[test]
    fn test_preview_matches_server_pricing() {
        let store = CartStore::new();
        store.add(1, margherita(2));
        store.add(1, garlic_bread());

        let q = store.preview(1, Some((DiscountKind::Bogo, Decimal::ZERO)));
        assert_eq!(q.subtotal, dec("26.00"));
        assert_eq!(q.discount, dec("6.00"));
        assert_eq!(q.total, dec("20.00"));
    }

    #[tokio::test]
    async fn test_events_carry_full_line_set() {
        let store = CartStore::new();
        let mut rx = store.subscribe();

        store.add(1, margherita(1));
        match rx.recv().await.unwrap() {
            CartEvent::Updated { user_id, items } => {
                assert_eq!(user_id, 1);
                assert_eq!(items.len(), 1);
            }
            other => panic!("unexpected event: {other:?}"),
        }

        store.clear(1);
        // add for another user in between must not disturb ordering per recv
        match rx.recv().await.unwrap() {
            CartEvent::Cleared { user_id } => assert_eq!(user_id, 1),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_json_backing_round_trip() {
        let dir = std::env::temp_dir().join(format!("forno-cart-{}", uuid::Uuid::new_v4()));
        let store = CartStore::with_backing(Box::new(JsonFileBacking::new(&dir)));
        store.add(7, margherita(2));
        store.add(7, garlic_bread());

        // A fresh store over the same directory restores the mirror.
        let resumed = CartStore::with_backing(Box::new(JsonFileBacking::new(&dir)));
        resumed.restore(7);
        assert_eq!(resumed.items(7), store.items(7));

        // Clearing drops the mirror too.
        store.clear(7);
        let empty = CartStore::with_backing(Box::new(JsonFileBacking::new(&dir)));
        empty.restore(7);
        assert!(empty.items(7).is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_restore_sanitizes_tampered_mirror() {
        let dir = std::env::temp_dir().join(format!("forno-cart-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("cart_3.json"),
            r#"[{"product_id":"p1","name":"P1","price":"-4.00","qty":0}]"#,
        )
        .unwrap();

        let store = CartStore::with_backing(Box::new(JsonFileBacking::new(&dir)));
        store.restore(3);
        let items = store.items(3);
        assert_eq!(items[0].qty, 1);
        assert_eq!(items[0].price, Decimal::ZERO);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
