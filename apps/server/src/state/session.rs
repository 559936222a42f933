//! # Session Registry
//!
//! One cart per authenticated session, keyed by the token's `jti`.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  login    ──► open(jti)        cart created (empty)                     │
//! │  /cart/*  ──► with_cart[_mut]  operate on the session's cart            │
//! │  checkout ──► with_cart_mut    read lines, clear on success             │
//! │  logout   ──► close(jti)       cart dropped with the session            │
//! │                                                                         │
//! │  The cart lives exactly as long as the session. There is no             │
//! │  global cart and no cross-session sharing.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The registry is an `Arc<Mutex<HashMap>>`: handlers run concurrently
//! but cart operations are quick, so a plain mutex is enough.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use kasa_core::Cart;

use crate::error::ApiError;

/// Per-session cart storage.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    carts: Arc<Mutex<HashMap<String, Cart>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        SessionRegistry {
            carts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Opens a session with a fresh cart. Called at login.
    pub fn open(&self, session_id: &str) {
        let mut carts = self.carts.lock().expect("session mutex poisoned");
        carts.insert(session_id.to_string(), Cart::new());
    }

    /// Drops a session and its cart. Called at logout.
    pub fn close(&self, session_id: &str) {
        let mut carts = self.carts.lock().expect("session mutex poisoned");
        carts.remove(session_id);
    }

    /// Runs `f` with read access to the session's cart.
    ///
    /// A token may outlive a server restart; an unknown session gets a
    /// cart lazily rather than a confusing error.
    pub fn with_cart<F, R>(&self, session_id: &str, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&Cart) -> R,
    {
        let mut carts = self.carts.lock().expect("session mutex poisoned");
        let cart = carts.entry(session_id.to_string()).or_insert_with(Cart::new);
        Ok(f(cart))
    }

    /// Runs `f` with write access to the session's cart.
    pub fn with_cart_mut<F, R>(&self, session_id: &str, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut carts = self.carts.lock().expect("session mutex poisoned");
        let cart = carts.entry(session_id.to_string()).or_insert_with(Cart::new);
        Ok(f(cart))
    }

    /// Number of live sessions (diagnostics).
    pub fn len(&self) -> usize {
        self.carts.lock().expect("session mutex poisoned").len()
    }

    /// Whether no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kasa_core::Product;

    fn product() -> Product {
        let now = Utc::now();
        Product {
            id: "p1".to_string(),
            barcode: None,
            name: "Test".to_string(),
            price_kurus: 1000,
            cost_kurus: None,
            vat_rate_bps: 2000,
            vat_included: false,
            stock_quantity: 10,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_open_operate_close() {
        let registry = SessionRegistry::new();
        registry.open("s1");

        registry
            .with_cart_mut("s1", |cart| cart.add_item(&product(), 2))
            .unwrap()
            .unwrap();

        let net = registry.with_cart("s1", |cart| cart.net().kurus()).unwrap();
        assert_eq!(net, 2400);

        registry.close("s1");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_sessions_are_isolated() {
        let registry = SessionRegistry::new();
        registry.open("s1");
        registry.open("s2");

        registry
            .with_cart_mut("s1", |cart| cart.add_item(&product(), 1))
            .unwrap()
            .unwrap();

        let s2_empty = registry.with_cart("s2", |cart| cart.is_empty()).unwrap();
        assert!(s2_empty);
    }

    #[test]
    fn test_unknown_session_gets_lazy_cart() {
        let registry = SessionRegistry::new();
        let empty = registry
            .with_cart("restarted-token", |cart| cart.is_empty())
            .unwrap();
        assert!(empty);
        assert_eq!(registry.len(), 1);
    }
}
