//! Item catalog and the shared shop.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::game::types::Item;

/// Static description of an item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ItemSpec {
    pub item: Item,
    pub description: &'static str,
    /// Price in watched episodes, shown to players.
    pub cost: f64,
    /// Units in a fresh shop.
    pub stock: u32,
    /// Uses per unit, `None` for permanent items.
    pub uses: Option<u32>,
}

pub fn item_spec(item: Item) -> ItemSpec {
    let (description, cost, stock, uses) = match item {
        Item::Telescope => ("Permanently increases your vision by 1!", 3.0, 2, None),
        Item::Gun => ("Increase the prison's intersection penalty for other players by 0.5!", 5.0, 1, None),
        Item::Bucket => ("Allows you to create a river tile at a location of your choice! (consumable)", 1.0, 4, Some(3)),
        Item::PontoonBridge => ("Allows you to use 0 rails when placing on a river tile! (consumed when entering a river)", 1.0, 4, Some(3)),
        Item::Axe => ("Increase points gained from wood tiles by 0.5!", 3.0, 2, None),
        Item::Coin => ("Increases your score by 2!", 3.0, 4, None),
        Item::MagLev => ("Faster trains! Permanently decreases the anime requirement for rails from 3 hours to 2 hours.", 3.0, 2, None),
    };
    ItemSpec { item, description, cost, stock, uses }
}

/// Stock of a fresh shop, shared by every player of a game.
pub fn default_shop() -> BTreeMap<Item, u32> {
    Item::ALL.iter().map(|&item| (item, item_spec(item).stock)).collect()
}
