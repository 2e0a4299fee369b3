//! Concurrency test: concurrent buyers against a scarce entry never
//! oversell it, and coins are debited for exactly the winners.

use std::sync::{Arc, Mutex};

use cubeland_market::{MarketError, MarketLedger};
use cubeland_protocol::{EntryDraft, EntryKind, ItemBehavior, RoomId, Username};

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_purchases_never_oversell() {
    const BUYERS: usize = 8;
    const LIMIT: u32 = 3;
    const PRICE: u64 = 10;

    let mut ledger = MarketLedger::new();
    for i in 0..BUYERS {
        ledger.register_account(Username::new(&format!("p{i}")), 100, false);
    }
    let entry_id = ledger.add_entry(EntryDraft {
        kind: EntryKind::PlaceableItem {
            behavior: ItemBehavior::default(),
        },
        title: "Scarce Lamp".into(),
        description: String::new(),
        price: PRICE,
        image: String::new(),
        global_limit: Some(LIMIT),
        room_limit: None,
    });

    let ledger = Arc::new(Mutex::new(ledger));

    let mut handles = Vec::new();
    for i in 0..BUYERS {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            let username = Username::new(&format!("p{i}"));
            let mut guard = ledger.lock().unwrap();
            guard.purchase(&username, entry_id, RoomId(1))
        }));
    }

    let mut won = 0;
    let mut sold_out = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(balance) => {
                assert_eq!(balance, 100 - PRICE);
                won += 1;
            }
            Err(MarketError::SoldOut(id)) => {
                assert_eq!(id, entry_id);
                sold_out += 1;
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(won, LIMIT as usize);
    assert_eq!(sold_out, BUYERS - LIMIT as usize);

    // Only the winners were charged.
    let guard = ledger.lock().unwrap();
    let total: u64 = (0..BUYERS)
        .map(|i| guard.balance(&Username::new(&format!("p{i}"))).unwrap())
        .sum();
    assert_eq!(total, BUYERS as u64 * 100 - LIMIT as u64 * PRICE);
    assert!(guard.list()[0].sold_out);
}
