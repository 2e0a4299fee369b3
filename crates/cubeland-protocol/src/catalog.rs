//! Catalog entry shapes shared by the marketplace ledger and the wire.

use serde::{Deserialize, Serialize};

use crate::EntryId;

/// What a catalog entry is, as a closed set of variants.
///
/// The per-kind data lives on the variant, so an entry can never carry
/// flags that make no sense for its kind (a wallpaper that follows its
/// owner, say) and an unknown flag is a decode error instead of a
/// silent no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryKind {
    /// A cosmetic skin. Owned at most once per player.
    Skin,
    /// A placeable item. May be bought repeatedly.
    PlaceableItem {
        #[serde(default)]
        behavior: ItemBehavior,
    },
    /// A home wallpaper. Owned at most once per player.
    Wallpaper,
}

impl EntryKind {
    /// Returns `true` if a player may own this kind at most once.
    pub fn unique_per_player(&self) -> bool {
        !matches!(self, Self::PlaceableItem { .. })
    }
}

/// Behavior flags for placeable items.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct ItemBehavior {
    /// The item trails its owner around the map.
    #[serde(default)]
    pub follows_owner: bool,
    /// The item periodically grants its owner consumables.
    #[serde(default)]
    pub grants_items: bool,
    /// The item attacks nearby hostiles on its own.
    #[serde(default)]
    pub auto_attack: bool,
}

/// The fields a privileged caller supplies when adding a catalog entry.
///
/// Everything here is immutable once the entry exists; only sale
/// counters change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    #[serde(flatten)]
    pub kind: EntryKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: u64,
    /// Opaque image reference (URL or data URL). Storage is external.
    #[serde(default)]
    pub image: String,
    /// Maximum successful purchases across all rooms.
    #[serde(default)]
    pub global_limit: Option<u32>,
    /// Maximum successful purchases within any single room.
    #[serde(default)]
    pub room_limit: Option<u32>,
}

/// A catalog entry as shown to players.
///
/// Internal sale counters stay in the ledger; clients only learn
/// whether the entry can still be bought at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItemView {
    pub id: EntryId,
    #[serde(flatten)]
    pub kind: EntryKind,
    pub title: String,
    pub description: String,
    pub price: u64,
    pub image: String,
    /// `true` once the global limit has been reached.
    pub sold_out: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_kind_tags_as_snake_case() {
        let json = serde_json::to_value(&EntryKind::Skin).unwrap();
        assert_eq!(json["kind"], "skin");

        let json = serde_json::to_value(&EntryKind::PlaceableItem {
            behavior: ItemBehavior::default(),
        })
        .unwrap();
        assert_eq!(json["kind"], "placeable_item");
    }

    #[test]
    fn test_item_behavior_defaults_when_missing() {
        // A bare placeable item decodes with all flags off.
        let kind: EntryKind =
            serde_json::from_str(r#"{"kind": "placeable_item"}"#).unwrap();
        assert_eq!(
            kind,
            EntryKind::PlaceableItem {
                behavior: ItemBehavior::default()
            }
        );
    }

    #[test]
    fn test_unknown_kind_is_a_decode_error() {
        let result: Result<EntryKind, _> =
            serde_json::from_str(r#"{"kind": "pet_rock"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unique_per_player_kinds() {
        assert!(EntryKind::Skin.unique_per_player());
        assert!(EntryKind::Wallpaper.unique_per_player());
        assert!(
            !EntryKind::PlaceableItem {
                behavior: ItemBehavior::default()
            }
            .unique_per_player()
        );
    }

    #[test]
    fn test_entry_draft_flattens_kind() {
        // The kind tag sits at the top level of the draft, not nested.
        let draft = EntryDraft {
            kind: EntryKind::Wallpaper,
            title: "Starry Night".into(),
            description: String::new(),
            price: 40,
            image: String::new(),
            global_limit: Some(5),
            room_limit: None,
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["kind"], "wallpaper");
        assert_eq!(json["title"], "Starry Night");
        assert_eq!(json["global_limit"], 5);
    }

    #[test]
    fn test_entry_draft_minimal_json_decodes() {
        let draft: EntryDraft = serde_json::from_str(
            r#"{"kind": "skin", "title": "Gold Cube", "price": 10}"#,
        )
        .unwrap();
        assert_eq!(draft.kind, EntryKind::Skin);
        assert_eq!(draft.price, 10);
        assert_eq!(draft.global_limit, None);
    }
}
