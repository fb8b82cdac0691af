//! Actions a player can take

use serde::{Deserialize, Serialize};

use crate::resources::{Color, Resource};

/// What an action does
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    RollDice,
    BuildRoad,
    BuildSettlement,
    BuildCity,
    BuyDevelopmentCard,
    PlayKnight,
    MaritimeTrade { give: Resource, receive: Resource },
    EndTurn,
}

impl ActionKind {
    /// Stable name used when tallying actions
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::RollDice => "ROLL_DICE",
            ActionKind::BuildRoad => "BUILD_ROAD",
            ActionKind::BuildSettlement => "BUILD_SETTLEMENT",
            ActionKind::BuildCity => "BUILD_CITY",
            ActionKind::BuyDevelopmentCard => "BUY_DEVELOPMENT_CARD",
            ActionKind::PlayKnight => "PLAY_KNIGHT",
            ActionKind::MaritimeTrade { .. } => "MARITIME_TRADE",
            ActionKind::EndTurn => "END_TURN",
        }
    }
}

/// A legal action, bound to the player taking it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub color: Color,
    pub kind: ActionKind,
}

impl Action {
    pub fn new(color: Color, kind: ActionKind) -> Self {
        Self { color, kind }
    }
}
