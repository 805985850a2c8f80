//! # Checkout State
//!
//! The checkout in progress on this register, plus the sale id reserved for
//! it.
//!
//! ## Sale Id Reservation
//! ```text
//! new session ──► sale id = uuid v4
//!      │
//!      ▼
//! cart / discounts / tenders (any number of commands)
//!      │
//!      ▼
//! complete_sale ──► record_sale(id) ──► finish(id) ──► new session, new id
//!                        │
//!                        └── same id again? primary key → Duplicate
//! ```
//!
//! A retried `complete_sale` for a checkout that was already written fails as
//! a duplicate instead of recording the sale twice.

use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use mostrador_core::checkout::Checkout;

#[derive(Debug)]
struct Session {
    checkout: Checkout,
    sale_id: String,
}

impl Session {
    fn fresh() -> Self {
        Session {
            checkout: Checkout::new(),
            sale_id: Uuid::new_v4().to_string(),
        }
    }
}

#[derive(Debug)]
pub struct CheckoutState {
    session: Mutex<Session>,
}

impl CheckoutState {
    pub fn new() -> Self {
        CheckoutState {
            session: Mutex::new(Session::fresh()),
        }
    }

    // Poisoned only if a closure panicked; the checkout itself stays usable.
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Executes a function with read access to the checkout.
    pub fn with_checkout<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Checkout) -> R,
    {
        let session = self.lock();
        f(&session.checkout)
    }

    /// Executes a function with write access to the checkout.
    ///
    /// ```rust,ignore
    /// checkout_state.with_checkout_mut(|c| c.pay_remaining(&settings))?;
    /// ```
    pub fn with_checkout_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Checkout) -> R,
    {
        let mut session = self.lock();
        f(&mut session.checkout)
    }

    /// Copy of the checkout and its reserved sale id, for work that awaits.
    pub fn snapshot(&self) -> (Checkout, String) {
        let session = self.lock();
        (session.checkout.clone(), session.sale_id.clone())
    }

    pub fn sale_id(&self) -> String {
        self.lock().sale_id.clone()
    }

    /// Starts a new session if `sale_id` is still the current one.
    ///
    /// Returns false when the session already moved on.
    pub fn finish(&self, sale_id: &str) -> bool {
        let mut session = self.lock();
        if session.sale_id != sale_id {
            return false;
        }
        *session = Session::fresh();
        true
    }

    /// Drops the checkout in progress and reserves a new sale id.
    pub fn discard(&self) {
        *self.lock() = Session::fresh();
    }
}

impl Default for CheckoutState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mostrador_core::cart::CartLine;
    use mostrador_core::Money;

    fn line() -> CartLine {
        CartLine::new("p-1", "MATE-500", "Yerba Mate 500g", Money::from_cents(5_000), 1)
    }

    #[test]
    fn test_finish_resets_and_rotates_sale_id() {
        let state = CheckoutState::new();
        state.with_checkout_mut(|c| c.cart.add_line(line())).unwrap();
        let (checkout, sale_id) = state.snapshot();
        assert_eq!(checkout.cart.item_count(), 1);

        assert!(state.finish(&sale_id));
        assert!(state.with_checkout(|c| c.cart.is_empty()));
        assert_ne!(state.sale_id(), sale_id);

        // Stale id: nothing happens
        state.with_checkout_mut(|c| c.cart.add_line(line())).unwrap();
        assert!(!state.finish(&sale_id));
        assert_eq!(state.with_checkout(|c| c.cart.item_count()), 1);
    }

    #[test]
    fn test_discard() {
        let state = CheckoutState::new();
        let before = state.sale_id();
        state.with_checkout_mut(|c| c.cart.add_line(line())).unwrap();

        state.discard();
        assert!(state.with_checkout(|c| c.cart.is_empty()));
        assert_ne!(state.sale_id(), before);
    }
}
