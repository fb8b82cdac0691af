//! Player identities, resources, development cards and structures

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// IDENTITIES
// ============================================================================

/// Player identity (seat color)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    Red,
    Blue,
    Orange,
    White,
}

impl Color {
    /// The full palette in seating order
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Orange, Color::White];

    /// Upper-case name used in column headers
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Red => "RED",
            Color::Blue => "BLUE",
            Color::Orange => "ORANGE",
            Color::White => "WHITE",
        }
    }

    /// Parse a color name (case-insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        Color::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RESOURCES
// ============================================================================

/// Resource card kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Brick,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Ore,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Wood => "WOOD",
            Resource::Brick => "BRICK",
            Resource::Sheep => "SHEEP",
            Resource::Wheat => "WHEAT",
            Resource::Ore => "ORE",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Fixed-slot resource holding (a hand or the bank)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCounts([u32; 5]);

impl ResourceCounts {
    /// Same amount of every resource
    pub fn uniform(amount: u32) -> Self {
        Self([amount; 5])
    }

    /// Build from (resource, amount) pairs
    pub fn of(pairs: &[(Resource, u32)]) -> Self {
        let mut counts = Self::default();
        for &(r, n) in pairs {
            counts.add(r, n);
        }
        counts
    }

    pub fn get(&self, resource: Resource) -> u32 {
        self.0[resource.index()]
    }

    pub fn add(&mut self, resource: Resource, amount: u32) {
        self.0[resource.index()] += amount;
    }

    /// Remove up to `amount`, returning how many were actually removed
    pub fn remove(&mut self, resource: Resource, amount: u32) -> u32 {
        let slot = &mut self.0[resource.index()];
        let taken = amount.min(*slot);
        *slot -= taken;
        taken
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Check whether every slot of `cost` is covered
    pub fn can_afford(&self, cost: &ResourceCounts) -> bool {
        self.0.iter().zip(cost.0.iter()).all(|(have, need)| have >= need)
    }

    /// Subtract `cost` (caller checks `can_afford` first)
    pub fn pay(&mut self, cost: &ResourceCounts) {
        for (have, need) in self.0.iter_mut().zip(cost.0.iter()) {
            *have = have.saturating_sub(*need);
        }
    }

    /// Add every slot of `other`
    pub fn deposit(&mut self, other: &ResourceCounts) {
        for (have, add) in self.0.iter_mut().zip(other.0.iter()) {
            *have += add;
        }
    }

    /// Iterate (resource, amount) in fixed order
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::ALL.into_iter().map(move |r| (r, self.get(r)))
    }

    /// Resource with the largest amount (first wins ties)
    pub fn most_abundant(&self) -> Option<Resource> {
        self.iter()
            .filter(|&(_, n)| n > 0)
            .fold(None, |best: Option<(Resource, u32)>, (r, n)| match best {
                Some((_, m)) if m >= n => best,
                _ => Some((r, n)),
            })
            .map(|(r, _)| r)
    }
}

// ============================================================================
// DEVELOPMENT CARDS
// ============================================================================

/// Development card kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DevCard {
    Knight,
    YearOfPlenty,
    Monopoly,
    RoadBuilding,
    VictoryPoint,
}

impl DevCard {
    pub const ALL: [DevCard; 5] = [
        DevCard::Knight,
        DevCard::YearOfPlenty,
        DevCard::Monopoly,
        DevCard::RoadBuilding,
        DevCard::VictoryPoint,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DevCard::Knight => "KNIGHT",
            DevCard::YearOfPlenty => "YEAR_OF_PLENTY",
            DevCard::Monopoly => "MONOPOLY",
            DevCard::RoadBuilding => "ROAD_BUILDING",
            DevCard::VictoryPoint => "VICTORY_POINT",
        }
    }

    /// Copies of each card in a fresh deck
    pub fn deck_count(self) -> usize {
        match self {
            DevCard::Knight => 14,
            DevCard::YearOfPlenty | DevCard::Monopoly | DevCard::RoadBuilding => 2,
            DevCard::VictoryPoint => 5,
        }
    }
}

/// Fixed-slot development card holding
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevCardCounts([u32; 5]);

impl DevCardCounts {
    pub fn get(&self, card: DevCard) -> u32 {
        self.0[card as usize]
    }

    pub fn add(&mut self, card: DevCard) {
        self.0[card as usize] += 1;
    }

    /// Remove one card, returning false if none was held
    pub fn take(&mut self, card: DevCard) -> bool {
        let slot = &mut self.0[card as usize];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DevCard, u32)> + '_ {
        DevCard::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

// ============================================================================
// STRUCTURES
// ============================================================================

/// Owned structures by kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureCounts {
    pub roads: u32,
    pub settlements: u32,
    pub cities: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse() {
        assert_eq!(Color::parse("red"), Some(Color::Red));
        assert_eq!(Color::parse("WHITE"), Some(Color::White));
        assert_eq!(Color::parse("green"), None);
    }

    #[test]
    fn test_resource_remove_is_bounded() {
        let mut hand = ResourceCounts::of(&[(Resource::Wood, 2)]);
        assert_eq!(hand.remove(Resource::Wood, 5), 2);
        assert_eq!(hand.get(Resource::Wood), 0);
    }

    #[test]
    fn test_can_afford_and_pay() {
        let mut hand = ResourceCounts::of(&[(Resource::Wood, 1), (Resource::Brick, 2)]);
        let cost = ResourceCounts::of(&[(Resource::Wood, 1), (Resource::Brick, 1)]);
        assert!(hand.can_afford(&cost));
        hand.pay(&cost);
        assert_eq!(hand.total(), 1);
        assert!(!hand.can_afford(&cost));
    }

    #[test]
    fn test_most_abundant() {
        let hand = ResourceCounts::of(&[(Resource::Sheep, 3), (Resource::Ore, 3), (Resource::Wood, 1)]);
        assert_eq!(hand.most_abundant(), Some(Resource::Sheep));
        assert_eq!(ResourceCounts::default().most_abundant(), None);
    }

    #[test]
    fn test_deck_has_25_cards() {
        let total: usize = DevCard::ALL.iter().map(|c| c.deck_count()).sum();
        assert_eq!(total, 25);
    }

    #[test]
    fn test_dev_card_take() {
        let mut cards = DevCardCounts::default();
        assert!(!cards.take(DevCard::Knight));
        cards.add(DevCard::Knight);
        assert!(cards.take(DevCard::Knight));
        assert_eq!(cards.total(), 0);
    }
}
