//! The marketplace ledger: catalog, coin balances, and inventories.
//!
//! One `MarketLedger` serves the whole process. A purchase reads the
//! entry's counters, the buyer's balance, and the buyer's inventory,
//! then mutates all three — so the whole ledger sits behind a single
//! lock at the server layer, and every check-then-debit here is atomic
//! by construction.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use cubeland_protocol::{CatalogItemView, EntryDraft, EntryId, RoomId, Username};

use crate::catalog::CatalogEntry;
use crate::error::MarketError;

static NEXT_ENTRY_ID: AtomicU64 = AtomicU64::new(1);

/// One player's slice of the ledger.
#[derive(Debug, Clone)]
struct Account {
    coins: u64,
    inventory: Vec<EntryId>,
    /// Workers may add catalog entries.
    worker: bool,
}

/// Catalog and accounts, mutated only under the owner's lock.
#[derive(Debug, Default)]
pub struct MarketLedger {
    /// Newest entries first, the order the catalog is shown in.
    catalog: Vec<CatalogEntry>,
    accounts: HashMap<Username, Account>,
}

impl MarketLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a player's account, or refreshes its standing fields
    /// if it already exists. Coins and inventory survive reconnects.
    pub fn register_account(
        &mut self,
        username: Username,
        coins: u64,
        worker: bool,
    ) {
        self.accounts
            .entry(username)
            .and_modify(|account| account.worker = worker)
            .or_insert(Account {
                coins,
                inventory: Vec::new(),
                worker,
            });
    }

    /// Returns a player's coin balance.
    pub fn balance(&self, username: &Username) -> Result<u64, MarketError> {
        self.accounts
            .get(username)
            .map(|account| account.coins)
            .ok_or_else(|| MarketError::UnknownPlayer(username.clone()))
    }

    /// Returns whether a player may add catalog entries.
    pub fn is_worker(&self, username: &Username) -> Result<bool, MarketError> {
        self.accounts
            .get(username)
            .map(|account| account.worker)
            .ok_or_else(|| MarketError::UnknownPlayer(username.clone()))
    }

    /// Returns the catalog as shown to players, newest entries first.
    pub fn list(&self) -> Vec<CatalogItemView> {
        self.catalog.iter().map(CatalogEntry::view).collect()
    }

    /// Adds a new catalog entry at the front of the listing.
    pub fn add_entry(&mut self, draft: EntryDraft) -> EntryId {
        let id = EntryId(NEXT_ENTRY_ID.fetch_add(1, Ordering::Relaxed));
        let entry = CatalogEntry::from_draft(id, draft);
        tracing::info!(entry_id = %id, title = %entry.title, "catalog entry added");
        self.catalog.insert(0, entry);
        id
    }

    /// Buys `entry_id` for `username`, purchasing from `room_id`.
    ///
    /// Checks run in a fixed order so the caller always learns the
    /// most specific failure: existence, then scarcity, then
    /// duplicate ownership, then funds. Nothing is mutated unless
    /// every check passes. Returns the buyer's new balance.
    pub fn purchase(
        &mut self,
        username: &Username,
        entry_id: EntryId,
        room_id: RoomId,
    ) -> Result<u64, MarketError> {
        let entry = self
            .catalog
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or(MarketError::NotFound(entry_id))?;

        if entry.globally_sold_out() || entry.sold_out_in(room_id) {
            return Err(MarketError::SoldOut(entry_id));
        }

        let account = self
            .accounts
            .get_mut(username)
            .ok_or_else(|| MarketError::UnknownPlayer(username.clone()))?;

        if entry.kind.unique_per_player()
            && account.inventory.contains(&entry_id)
        {
            return Err(MarketError::AlreadyOwned(entry_id));
        }

        if account.coins < entry.price {
            return Err(MarketError::InsufficientFunds);
        }

        account.coins -= entry.price;
        account.inventory.push(entry_id);
        entry.record_sale(room_id);

        tracing::info!(
            player = %username,
            entry_id = %entry_id,
            price = entry.price,
            coins = account.coins,
            "purchase completed"
        );
        Ok(account.coins)
    }
}
