//! Internal catalog entry bookkeeping.

use std::collections::HashMap;

use cubeland_protocol::{CatalogItemView, EntryDraft, EntryId, EntryKind, RoomId};

/// A catalog entry plus its sale counters.
///
/// The immutable description comes from the draft; the counters are the
/// ledger's own and never go on the wire.
#[derive(Debug, Clone)]
pub(crate) struct CatalogEntry {
    pub(crate) id: EntryId,
    pub(crate) kind: EntryKind,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) price: u64,
    pub(crate) image: String,
    pub(crate) global_limit: Option<u32>,
    pub(crate) room_limit: Option<u32>,
    /// Successful purchases across all rooms.
    pub(crate) total_sold: u32,
    /// Successful purchases per room. Absent means zero.
    pub(crate) room_sold: HashMap<RoomId, u32>,
}

impl CatalogEntry {
    pub(crate) fn from_draft(id: EntryId, draft: EntryDraft) -> Self {
        Self {
            id,
            kind: draft.kind,
            title: draft.title,
            description: draft.description,
            price: draft.price,
            image: draft.image,
            global_limit: draft.global_limit,
            room_limit: draft.room_limit,
            total_sold: 0,
            room_sold: HashMap::new(),
        }
    }

    /// `true` once no further purchase can succeed anywhere.
    pub(crate) fn globally_sold_out(&self) -> bool {
        self.global_limit
            .is_some_and(|limit| self.total_sold >= limit)
    }

    /// `true` once no further purchase can succeed in `room_id`.
    pub(crate) fn sold_out_in(&self, room_id: RoomId) -> bool {
        self.room_limit.is_some_and(|limit| {
            self.room_sold.get(&room_id).copied().unwrap_or(0) >= limit
        })
    }

    /// Records one successful sale in `room_id`.
    pub(crate) fn record_sale(&mut self, room_id: RoomId) {
        self.total_sold += 1;
        *self.room_sold.entry(room_id).or_insert(0) += 1;
    }

    pub(crate) fn view(&self) -> CatalogItemView {
        CatalogItemView {
            id: self.id,
            kind: self.kind.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            price: self.price,
            image: self.image.clone(),
            sold_out: self.globally_sold_out(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(global: Option<u32>, room: Option<u32>) -> EntryDraft {
        EntryDraft {
            kind: EntryKind::Skin,
            title: "Gold Cube".into(),
            description: String::new(),
            price: 25,
            image: String::new(),
            global_limit: global,
            room_limit: room,
        }
    }

    #[test]
    fn test_unlimited_entry_never_sells_out() {
        let mut entry = CatalogEntry::from_draft(EntryId(1), draft(None, None));
        for _ in 0..1000 {
            entry.record_sale(RoomId(1));
        }
        assert!(!entry.globally_sold_out());
        assert!(!entry.sold_out_in(RoomId(1)));
    }

    #[test]
    fn test_global_limit_counts_across_rooms() {
        let mut entry = CatalogEntry::from_draft(EntryId(1), draft(Some(2), None));
        entry.record_sale(RoomId(1));
        assert!(!entry.globally_sold_out());
        entry.record_sale(RoomId(2));
        assert!(entry.globally_sold_out());
    }

    #[test]
    fn test_room_limit_is_per_room() {
        let mut entry = CatalogEntry::from_draft(EntryId(1), draft(None, Some(1)));
        entry.record_sale(RoomId(1));
        assert!(entry.sold_out_in(RoomId(1)));
        assert!(!entry.sold_out_in(RoomId(2)));
    }

    #[test]
    fn test_view_reflects_global_exhaustion_only() {
        let mut entry =
            CatalogEntry::from_draft(EntryId(1), draft(Some(1), Some(1)));
        assert!(!entry.view().sold_out);
        entry.record_sale(RoomId(1));
        assert!(entry.view().sold_out);
    }
}
