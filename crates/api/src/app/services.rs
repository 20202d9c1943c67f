//! Runtime wiring: store-backed services, the login gate, session state.

use std::{
    collections::HashMap,
    convert::Infallible,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio_stream::wrappers::UnboundedReceiverStream;

use quantii_auth::{AccessGate, Hs256SessionTokens, SessionTokens};
use quantii_core::{DomainError, DomainResult, SessionId};
use quantii_infra::{
    AppConfig, InventoryService, SettingsService, SharedStore, SnapshotSubscription, StoreError,
    TransactionService, connect,
};
use quantii_sales::Cart;

use crate::context::SessionContext;

pub struct AppServices {
    pub inventory: InventoryService,
    pub transactions: TransactionService,
    pub settings: SettingsService,
    gate: AccessGate,
    tokens: Arc<dyn SessionTokens>,
    revoked: Arc<RevokedSessions>,
    carts: SessionCarts,
}

impl AppServices {
    pub fn new(store: SharedStore, gate: AccessGate, tokens: Arc<dyn SessionTokens>) -> Self {
        Self {
            inventory: InventoryService::new(store.clone()),
            transactions: TransactionService::new(store.clone()),
            settings: SettingsService::new(store),
            gate,
            tokens,
            revoked: Arc::new(RevokedSessions::default()),
            carts: SessionCarts::default(),
        }
    }

    /// Connect the configured store and build everything on top of it.
    pub async fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        let store = connect(&config.store).await?;
        let tokens = Hs256SessionTokens::new(config.session_secret.as_bytes(), config.session_ttl);
        let gate = AccessGate::new(config.access_key.clone());
        Ok(Self::new(store, gate, Arc::new(tokens)))
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    pub fn tokens(&self) -> Arc<dyn SessionTokens> {
        self.tokens.clone()
    }

    pub fn revoked(&self) -> Arc<RevokedSessions> {
        self.revoked.clone()
    }

    pub fn carts(&self) -> &SessionCarts {
        &self.carts
    }
}

/// Sessions closed by logout while their token was still valid.
#[derive(Debug, Default)]
pub struct RevokedSessions {
    inner: Mutex<HashMap<SessionId, DateTime<Utc>>>,
}

impl RevokedSessions {
    /// Refuse `session` from now on. Entries whose token has expired anyway
    /// are forgotten.
    pub fn revoke(&self, session: &SessionContext, now: DateTime<Utc>) {
        let mut revoked = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        revoked.retain(|_, expires_at| *expires_at > now);
        revoked.insert(session.session_id(), session.expires_at());
    }

    pub fn is_revoked(&self, session: SessionId) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&session)
    }
}

#[derive(Debug, Default)]
struct HeldCart {
    cart: Cart,
    expires_at: DateTime<Utc>,
    checking_out: bool,
}

/// In-progress sales, one cart per signed-in session.
///
/// Only adding an item creates a cart. Carts that end up empty are dropped,
/// and carts of expired sessions are evicted whenever a new one is created.
#[derive(Debug, Default)]
pub struct SessionCarts {
    inner: Mutex<HashMap<SessionId, HeldCart>>,
}

impl SessionCarts {
    /// Copy of the session's cart (empty if it has none).
    pub fn snapshot(&self, session: SessionId) -> Cart {
        let carts = self.lock();
        carts.get(&session).map(|held| held.cart.clone()).unwrap_or_default()
    }

    /// Run `f` against the session's cart, creating it on first use.
    pub fn with_cart<R>(&self, session: &SessionContext, f: impl FnOnce(&mut Cart) -> R) -> R {
        let mut carts = self.lock();
        let now = Utc::now();
        carts.retain(|_, held| held.checking_out || held.expires_at > now);

        let held = carts.entry(session.session_id()).or_default();
        held.expires_at = session.expires_at();
        f(&mut held.cart)
    }

    /// Run `f` against an existing cart; `None` when the session has none.
    pub fn update<R>(&self, session: SessionId, f: impl FnOnce(&mut Cart) -> R) -> Option<R> {
        let mut carts = self.lock();
        let held = carts.get_mut(&session)?;
        let out = f(&mut held.cart);
        if held.cart.is_empty() && !held.checking_out {
            carts.remove(&session);
        }
        Some(out)
    }

    /// Take the session's cart out for checkout.
    ///
    /// A second checkout of the same session while the first is still
    /// running is a `Conflict`. Dropping the returned guard without
    /// [`PendingCheckout::complete`] puts the cart back.
    pub fn begin_checkout(&self, session: SessionId) -> DomainResult<PendingCheckout<'_>> {
        let mut carts = self.lock();
        let cart = match carts.get_mut(&session) {
            Some(held) if held.checking_out => {
                return Err(DomainError::conflict("checkout already in progress"));
            }
            Some(held) => {
                held.checking_out = true;
                std::mem::take(&mut held.cart)
            }
            None => Cart::default(),
        };
        Ok(PendingCheckout { carts: self, session, cart, recorded: false })
    }

    pub fn end_session(&self, session: SessionId) {
        self.lock().remove(&session);
    }

    fn finish_checkout(&self, session: SessionId, unsold: Cart) {
        let mut carts = self.lock();
        // Gone if the session logged out meanwhile.
        let Some(held) = carts.get_mut(&session) else {
            return;
        };
        held.checking_out = false;
        if !unsold.is_empty() {
            let added_meanwhile = std::mem::replace(&mut held.cart, unsold);
            held.cart.absorb(added_meanwhile);
        }
        if held.cart.is_empty() {
            carts.remove(&session);
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, HeldCart>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// A cart taken out of its session for checkout.
pub struct PendingCheckout<'a> {
    carts: &'a SessionCarts,
    session: SessionId,
    cart: Cart,
    recorded: bool,
}

impl PendingCheckout<'_> {
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The sale is on record; the cart must not come back.
    pub fn complete(mut self) {
        self.recorded = true;
    }
}

impl Drop for PendingCheckout<'_> {
    fn drop(&mut self) {
        let unsold = if self.recorded { Cart::default() } else { std::mem::take(&mut self.cart) };
        self.carts.finish_checkout(self.session, unsold);
    }
}

type SseSender = UnboundedSender<Result<SseEvent, Infallible>>;

/// Build the `/stream` SSE feed: one event per collection snapshot.
///
/// Each collection starts with its current contents, then re-sends whenever
/// it changes. Forwarders stop once the client goes away.
pub fn snapshot_sse_stream(
    services: &AppServices,
) -> Sse<UnboundedReceiverStream<Result<SseEvent, Infallible>>> {
    let (tx, rx) = unbounded_channel();

    spawn_forwarder("inventory", services.inventory.subscribe(), tx.clone(), |items| items);
    spawn_forwarder("transactions", services.transactions.subscribe(), tx.clone(), |txs| txs);
    spawn_forwarder("settings", services.settings.subscribe(), tx, |docs| docs.into_iter().next());

    Sse::new(UnboundedReceiverStream::new(rx))
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

fn spawn_forwarder<T, P>(
    topic: &'static str,
    mut subscription: SnapshotSubscription<T>,
    tx: SseSender,
    shape: fn(Vec<T>) -> P,
) where
    T: Send + 'static,
    P: Serialize + 'static,
{
    tokio::spawn(async move {
        loop {
            let next = tokio::select! {
                _ = tx.closed() => break,
                next = subscription.next() => next,
            };

            let event = match next {
                Some(Ok(snapshot)) => match serde_json::to_string(&shape(snapshot)) {
                    Ok(data) => SseEvent::default().event(topic).data(data),
                    Err(e) => {
                        tracing::error!(topic, error = %e, "failed to encode snapshot");
                        continue;
                    }
                },
                Some(Err(e)) => {
                    let body = serde_json::json!({ "topic": topic, "message": e.to_string() });
                    SseEvent::default().event("error").data(body.to_string())
                }
                None => break,
            };

            if tx.send(Ok(event)).is_err() {
                break;
            }
        }
        tracing::debug!(topic, "snapshot forwarder stopped");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as TtlDuration;
    use quantii_core::{ItemId, Money};
    use quantii_inventory::{InventoryItem, ItemFields};

    fn coffee() -> InventoryItem {
        InventoryItem::from_fields(
            ItemId::new(),
            ItemFields {
                name: "Coffee".into(),
                price: Money::from_cents(350),
                stock: 5,
                category: "Beverages".into(),
                sku: "BEV001".into(),
            },
        )
    }

    fn session() -> SessionContext {
        SessionContext::new(SessionId::new(), Utc::now() + TtlDuration::minutes(10))
    }

    fn ring_up(carts: &SessionCarts, session: &SessionContext, item: &InventoryItem) {
        carts.with_cart(session, |c| c.add_item(item).map(|_| ())).unwrap();
    }

    #[test]
    fn carts_are_per_session() {
        let carts = SessionCarts::default();
        let (a, b) = (session(), session());
        ring_up(&carts, &a, &coffee());

        assert_eq!(carts.snapshot(a.session_id()).item_count(), 1);
        assert!(carts.snapshot(b.session_id()).is_empty());
    }

    #[test]
    fn ending_a_session_drops_its_cart() {
        let carts = SessionCarts::default();
        let a = session();
        ring_up(&carts, &a, &coffee());

        carts.end_session(a.session_id());
        assert!(carts.snapshot(a.session_id()).is_empty());
        assert_eq!(carts.len(), 0);
    }

    #[test]
    fn only_adding_creates_a_cart_and_emptied_carts_go_away() {
        let carts = SessionCarts::default();
        let a = session();
        let item = coffee();

        assert!(carts.update(a.session_id(), |c| c.remove(item.id)).is_none());
        assert!(carts.update(a.session_id(), Cart::clear).is_none());
        assert_eq!(carts.len(), 0);

        ring_up(&carts, &a, &item);
        assert_eq!(carts.update(a.session_id(), |c| c.remove(item.id)), Some(true));
        assert_eq!(carts.len(), 0);
    }

    #[test]
    fn expired_sessions_are_evicted_when_a_new_cart_appears() {
        let carts = SessionCarts::default();
        let stale = SessionContext::new(SessionId::new(), Utc::now() - TtlDuration::minutes(1));
        ring_up(&carts, &stale, &coffee());
        assert_eq!(carts.len(), 1);

        ring_up(&carts, &session(), &coffee());
        assert_eq!(carts.len(), 1);
        assert!(carts.snapshot(stale.session_id()).is_empty());
    }

    #[test]
    fn checkout_takes_the_cart_and_blocks_a_second_checkout() {
        let carts = SessionCarts::default();
        let a = session();
        ring_up(&carts, &a, &coffee());

        let pending = carts.begin_checkout(a.session_id()).unwrap();
        assert_eq!(pending.cart().item_count(), 1);
        assert!(carts.snapshot(a.session_id()).is_empty());
        let second = carts.begin_checkout(a.session_id());
        assert!(matches!(second, Err(DomainError::Conflict(_))));

        pending.complete();
        assert_eq!(carts.len(), 0);
        assert!(carts.begin_checkout(a.session_id()).unwrap().cart().is_empty());
    }

    #[test]
    fn abandoned_checkout_puts_the_cart_back_ahead_of_new_lines() {
        let carts = SessionCarts::default();
        let a = session();
        let (first, second) = (coffee(), coffee());
        ring_up(&carts, &a, &first);

        let pending = carts.begin_checkout(a.session_id()).unwrap();
        ring_up(&carts, &a, &second);
        drop(pending);

        let cart = carts.snapshot(a.session_id());
        let ids: Vec<_> = cart.lines().iter().map(|l| l.item_id).collect();
        assert_eq!(ids, [first.id, second.id]);
        assert!(carts.begin_checkout(a.session_id()).is_ok());
    }

    #[test]
    fn revoked_sessions_are_remembered_until_their_token_expires() {
        let revoked = RevokedSessions::default();
        let live = session();
        let stale = SessionContext::new(SessionId::new(), Utc::now() - TtlDuration::minutes(1));

        revoked.revoke(&stale, Utc::now());
        revoked.revoke(&live, Utc::now());

        assert!(revoked.is_revoked(live.session_id()));
        assert!(!revoked.is_revoked(SessionId::new()));
        // Pruned on the second revoke.
        assert!(!revoked.is_revoked(stale.session_id()));
    }
}
