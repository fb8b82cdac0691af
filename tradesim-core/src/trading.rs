//! Reference board-trading engine
//!
//! A compact resource-trading game: roll for production, build roads,
//! settlements and cities, buy development cards, trade 4:1 with the bank.
//! Positions on a board are abstracted away; each settlement carries one
//! production token instead.

use std::ops::RangeInclusive;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;

use crate::action::{Action, ActionKind};
use crate::engine::{check_player_count, Engine, EngineError, Result};
use crate::resources::{Color, DevCard, DevCardCounts, Resource, ResourceCounts, StructureCounts};
use crate::state::StateQuery;

// ============================================================================
// CONSTANTS
// ============================================================================

const MAX_ROADS: u32 = 15;
const MAX_SETTLEMENTS: u32 = 5;
const MAX_CITIES: u32 = 4;

const LONGEST_ROAD_MIN: u32 = 5;
const LARGEST_ARMY_MIN: u32 = 3;
const AWARD_POINTS: u32 = 2;

const MARITIME_RATE: u32 = 4;

/// Dice numbers a production token can carry
const TOKEN_NUMBERS: [u8; 10] = [2, 3, 4, 5, 6, 8, 9, 10, 11, 12];

fn road_cost() -> ResourceCounts {
    ResourceCounts::of(&[(Resource::Wood, 1), (Resource::Brick, 1)])
}

fn settlement_cost() -> ResourceCounts {
    ResourceCounts::of(&[
        (Resource::Wood, 1),
        (Resource::Brick, 1),
        (Resource::Sheep, 1),
        (Resource::Wheat, 1),
    ])
}

fn city_cost() -> ResourceCounts {
    ResourceCounts::of(&[(Resource::Wheat, 2), (Resource::Ore, 3)])
}

fn dev_card_cost() -> ResourceCounts {
    ResourceCounts::of(&[(Resource::Sheep, 1), (Resource::Wheat, 1), (Resource::Ore, 1)])
}

// ============================================================================
// RULES
// ============================================================================

/// Tunable rule parameters
#[derive(Clone, Debug)]
pub struct TradingRules {
    /// Points needed to win
    pub victory_points_to_win: u32,
    /// Hands above this size are halved on a seven
    pub discard_limit: u32,
    /// Starting bank amount of each resource
    pub bank_per_resource: u32,
}

impl Default for TradingRules {
    fn default() -> Self {
        Self {
            victory_points_to_win: 10,
            discard_limit: 7,
            bank_per_resource: 19,
        }
    }
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TurnPhase {
    Roll,
    Main,
}

/// Production token attached to a settlement or city
#[derive(Clone, Copy, Debug)]
struct Token {
    resource: Resource,
    number: u8,
    city: bool,
}

#[derive(Clone, Debug, Default)]
struct PlayerState {
    hand: ResourceCounts,
    dev_cards: DevCardCounts,
    structures: StructureCounts,
    tokens: Vec<Token>,
    knights_played: u32,
}

/// Full game state (clone to branch)
#[derive(Clone, Debug)]
pub struct TradingState {
    seats: Vec<Color>,
    players: FxHashMap<Color, PlayerState>,
    bank: ResourceCounts,
    dev_deck: Vec<DevCard>,
    current: usize,
    phase: TurnPhase,
    knight_played: bool,
    longest_road: Option<Color>,
    largest_army: Option<Color>,
    winner: Option<Color>,
    num_actions: u64,
    num_turns: u64,
    last_roll: Option<u8>,
    rng: ChaCha8Rng,
}

impl TradingState {
    /// Most recent dice total, if any roll happened
    pub fn last_roll(&self) -> Option<u8> {
        self.last_roll
    }

    fn player(&self, color: Color) -> Option<&PlayerState> {
        self.players.get(&color)
    }

    fn player_mut(&mut self, color: Color) -> Result<&mut PlayerState> {
        self.players
            .get_mut(&color)
            .ok_or_else(|| EngineError::InvalidAction(format!("{} is not seated", color)))
    }

    fn draw_token(&mut self) -> Token {
        let resource = Resource::ALL[self.rng.gen_range(0..Resource::ALL.len())];
        let number = TOKEN_NUMBERS[self.rng.gen_range(0..TOKEN_NUMBERS.len())];
        Token {
            resource,
            number,
            city: false,
        }
    }

    fn points(&self, color: Color) -> u32 {
        let Some(player) = self.player(color) else {
            return 0;
        };
        let mut points = player.structures.settlements
            + 2 * player.structures.cities
            + player.dev_cards.get(DevCard::VictoryPoint);
        if self.longest_road == Some(color) {
            points += AWARD_POINTS;
        }
        if self.largest_army == Some(color) {
            points += AWARD_POINTS;
        }
        points
    }
}

impl StateQuery for TradingState {
    fn colors(&self) -> &[Color] {
        &self.seats
    }

    fn current_color(&self) -> Color {
        self.seats[self.current]
    }

    fn victory_points(&self, color: Color) -> u32 {
        self.points(color)
    }

    fn structures(&self, color: Color) -> StructureCounts {
        self.player(color).map(|p| p.structures).unwrap_or_default()
    }

    fn resources(&self, color: Color) -> ResourceCounts {
        self.player(color).map(|p| p.hand).unwrap_or_default()
    }

    fn dev_cards(&self, color: Color) -> DevCardCounts {
        self.player(color).map(|p| p.dev_cards).unwrap_or_default()
    }

    fn bank(&self) -> ResourceCounts {
        self.bank
    }

    fn num_actions(&self) -> u64 {
        self.num_actions
    }

    fn num_turns(&self) -> u64 {
        self.num_turns
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Reference engine for 2-4 players
#[derive(Clone, Debug, Default)]
pub struct TradingEngine {
    rules: TradingRules,
}

impl TradingEngine {
    pub fn new(rules: TradingRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &TradingRules {
        &self.rules
    }

    fn roll_phase_actions(&self, state: &TradingState, color: Color, actions: &mut Vec<Action>) {
        actions.push(Action::new(color, ActionKind::RollDice));
        if self.can_play_knight(state, color) {
            actions.push(Action::new(color, ActionKind::PlayKnight));
        }
    }

    fn main_phase_actions(&self, state: &TradingState, color: Color, actions: &mut Vec<Action>) {
        let Some(player) = state.player(color) else {
            return;
        };
        let built = player.structures;
        let hand = &player.hand;

        if built.roads < MAX_ROADS && hand.can_afford(&road_cost()) {
            actions.push(Action::new(color, ActionKind::BuildRoad));
        }
        if built.settlements < MAX_SETTLEMENTS
            && built.roads >= 2 * (built.settlements + built.cities)
            && hand.can_afford(&settlement_cost())
        {
            actions.push(Action::new(color, ActionKind::BuildSettlement));
        }
        if built.settlements > 0 && built.cities < MAX_CITIES && hand.can_afford(&city_cost()) {
            actions.push(Action::new(color, ActionKind::BuildCity));
        }
        if !state.dev_deck.is_empty() && hand.can_afford(&dev_card_cost()) {
            actions.push(Action::new(color, ActionKind::BuyDevelopmentCard));
        }
        if self.can_play_knight(state, color) {
            actions.push(Action::new(color, ActionKind::PlayKnight));
        }
        for give in Resource::ALL {
            if hand.get(give) < MARITIME_RATE {
                continue;
            }
            for receive in Resource::ALL {
                if receive != give && state.bank.get(receive) > 0 {
                    actions.push(Action::new(color, ActionKind::MaritimeTrade { give, receive }));
                }
            }
        }
        actions.push(Action::new(color, ActionKind::EndTurn));
    }

    fn can_play_knight(&self, state: &TradingState, color: Color) -> bool {
        !state.knight_played
            && state
                .player(color)
                .map_or(false, |p| p.dev_cards.get(DevCard::Knight) > 0)
    }

    // ========================================================================
    // ACTION RESOLUTION
    // ========================================================================

    fn roll_dice(&self, state: &mut TradingState) {
        let roll = state.rng.gen_range(1..=6u8) + state.rng.gen_range(1..=6u8);
        state.last_roll = Some(roll);
        state.phase = TurnPhase::Main;

        if roll == 7 {
            self.discard_excess(state);
        } else {
            produce(state, roll);
        }
    }

    fn discard_excess(&self, state: &mut TradingState) {
        let limit = self.rules.discard_limit;
        let mut returned = ResourceCounts::default();
        for player in state.players.values_mut() {
            let total = player.hand.total();
            if total <= limit {
                continue;
            }
            for _ in 0..total / 2 {
                if let Some(r) = player.hand.most_abundant() {
                    player.hand.remove(r, 1);
                    returned.add(r, 1);
                }
            }
        }
        state.bank.deposit(&returned);
    }

    fn buy(&self, state: &mut TradingState, color: Color, cost: ResourceCounts) -> Result<()> {
        let player = state.player_mut(color)?;
        if !player.hand.can_afford(&cost) {
            return Err(EngineError::InvalidAction(format!("{} cannot afford purchase", color)));
        }
        player.hand.pay(&cost);
        state.bank.deposit(&cost);
        Ok(())
    }

    fn play_knight(&self, state: &mut TradingState, color: Color) -> Result<()> {
        let player = state.player_mut(color)?;
        if !player.dev_cards.take(DevCard::Knight) {
            return Err(EngineError::InvalidAction(format!("{} holds no knight", color)));
        }
        player.knights_played += 1;
        state.knight_played = true;

        // Robber steals one card from the richest opponent.
        let victim = state
            .seats
            .iter()
            .copied()
            .filter(|&c| c != color)
            .max_by_key(|c| state.player(*c).map_or(0, |p| p.hand.total()));
        if let Some(victim) = victim {
            let stolen = state.player(victim).and_then(|p| p.hand.most_abundant());
            if let Some(resource) = stolen {
                state.player_mut(victim)?.hand.remove(resource, 1);
                state.player_mut(color)?.hand.add(resource, 1);
            }
        }

        let counts: Vec<(Color, u32)> = state
            .seats
            .iter()
            .map(|&c| (c, state.player(c).map_or(0, |p| p.knights_played)))
            .collect();
        state.largest_army = award_holder(state.largest_army, &counts, LARGEST_ARMY_MIN);
        Ok(())
    }

    fn maritime_trade(
        &self,
        state: &mut TradingState,
        color: Color,
        give: Resource,
        receive: Resource,
    ) -> Result<()> {
        if give == receive || state.bank.get(receive) == 0 {
            return Err(EngineError::InvalidAction(format!(
                "bank cannot trade {} for {}",
                give.as_str(),
                receive.as_str()
            )));
        }
        let player = state.player_mut(color)?;
        if player.hand.get(give) < MARITIME_RATE {
            return Err(EngineError::InvalidAction(format!(
                "{} holds fewer than {} {}",
                color,
                MARITIME_RATE,
                give.as_str()
            )));
        }
        player.hand.remove(give, MARITIME_RATE);
        player.hand.add(receive, 1);
        state.bank.add(give, MARITIME_RATE);
        state.bank.remove(receive, 1);
        Ok(())
    }

    fn end_turn(&self, state: &mut TradingState) {
        state.current = (state.current + 1) % state.seats.len();
        state.phase = TurnPhase::Roll;
        state.knight_played = false;
        state.num_turns += 1;
    }

    fn resolve(&self, state: &mut TradingState, action: &Action) -> Result<()> {
        let color = action.color;
        match action.kind {
            ActionKind::RollDice => self.roll_dice(state),
            ActionKind::BuildRoad => {
                self.buy(state, color, road_cost())?;
                state.player_mut(color)?.structures.roads += 1;
                let counts: Vec<(Color, u32)> = state
                    .seats
                    .iter()
                    .map(|&c| (c, state.structures(c).roads))
                    .collect();
                state.longest_road = award_holder(state.longest_road, &counts, LONGEST_ROAD_MIN);
            }
            ActionKind::BuildSettlement => {
                self.buy(state, color, settlement_cost())?;
                let token = state.draw_token();
                let player = state.player_mut(color)?;
                player.structures.settlements += 1;
                player.tokens.push(token);
            }
            ActionKind::BuildCity => {
                self.buy(state, color, city_cost())?;
                let player = state.player_mut(color)?;
                player.structures.settlements -= 1;
                player.structures.cities += 1;
                if let Some(token) = player.tokens.iter_mut().find(|t| !t.city) {
                    token.city = true;
                }
            }
            ActionKind::BuyDevelopmentCard => {
                if state.dev_deck.is_empty() {
                    return Err(EngineError::InvalidAction("development deck is empty".into()));
                }
                self.buy(state, color, dev_card_cost())?;
                if let Some(card) = state.dev_deck.pop() {
                    state.player_mut(color)?.dev_cards.add(card);
                }
            }
            ActionKind::PlayKnight => self.play_knight(state, color)?,
            ActionKind::MaritimeTrade { give, receive } => {
                self.maritime_trade(state, color, give, receive)?
            }
            ActionKind::EndTurn => self.end_turn(state),
        }
        Ok(())
    }
}

impl Engine for TradingEngine {
    type State = TradingState;

    fn player_range(&self) -> RangeInclusive<usize> {
        2..=4
    }

    fn new_game(&self, colors: &[Color], seed: u64) -> Result<TradingState> {
        check_player_count(&self.player_range(), colors.len())?;

        let mut dev_deck: Vec<DevCard> = DevCard::ALL
            .iter()
            .flat_map(|&card| std::iter::repeat(card).take(card.deck_count()))
            .collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        dev_deck.shuffle(&mut rng);

        let mut state = TradingState {
            seats: colors.to_vec(),
            players: FxHashMap::default(),
            bank: ResourceCounts::uniform(self.rules.bank_per_resource),
            dev_deck,
            current: 0,
            phase: TurnPhase::Roll,
            knight_played: false,
            longest_road: None,
            largest_army: None,
            winner: None,
            num_actions: 0,
            num_turns: 0,
            last_roll: None,
            rng,
        };

        // Two starting settlements and roads; the second settlement pays out once.
        for &color in colors {
            let first = state.draw_token();
            let second = state.draw_token();
            let taken = state.bank.remove(second.resource, 1);
            let mut player = PlayerState {
                structures: StructureCounts {
                    roads: 2,
                    settlements: 2,
                    cities: 0,
                },
                tokens: vec![first, second],
                ..Default::default()
            };
            player.hand.add(second.resource, taken);
            state.players.insert(color, player);
        }

        Ok(state)
    }

    fn legal_actions(&self, state: &TradingState) -> Vec<Action> {
        let mut actions = Vec::new();
        if state.winner.is_some() {
            return actions;
        }
        let color = state.current_color();
        match state.phase {
            TurnPhase::Roll => self.roll_phase_actions(state, color, &mut actions),
            TurnPhase::Main => self.main_phase_actions(state, color, &mut actions),
        }
        actions
    }

    fn apply_action(&self, state: &mut TradingState, action: &Action) -> Result<()> {
        if state.winner.is_some() {
            return Err(EngineError::InvalidAction("game is already over".into()));
        }
        if action.color != state.current_color() {
            return Err(EngineError::InvalidAction(format!(
                "{} acted out of turn",
                action.color
            )));
        }

        self.resolve(state, action)?;
        state.num_actions += 1;

        if state.points(action.color) >= self.rules.victory_points_to_win {
            state.winner = Some(action.color);
        }
        Ok(())
    }

    fn is_terminal(&self, state: &TradingState) -> bool {
        state.winner.is_some()
    }

    fn winner(&self, state: &TradingState) -> Option<Color> {
        state.winner
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Pay out production for a dice roll, in seat order, while the bank lasts
fn produce(state: &mut TradingState, roll: u8) {
    let seats = state.seats.clone();
    for color in seats {
        let payouts: Vec<(Resource, u32)> = state
            .player(color)
            .map(|p| {
                p.tokens
                    .iter()
                    .filter(|t| t.number == roll)
                    .map(|t| (t.resource, if t.city { 2 } else { 1 }))
                    .collect()
            })
            .unwrap_or_default();

        for (resource, amount) in payouts {
            let paid = state.bank.remove(resource, amount);
            if let Some(player) = state.players.get_mut(&color) {
                player.hand.add(resource, paid);
            }
        }
    }
}

/// Decide who holds a contested award
///
/// The holder keeps it until someone strictly exceeds their count; without a
/// holder the strict leader at or above `minimum` takes it.
fn award_holder(holder: Option<Color>, counts: &[(Color, u32)], minimum: u32) -> Option<Color> {
    let count_of = |color: Color| {
        counts
            .iter()
            .find(|(c, _)| *c == color)
            .map_or(0, |(_, n)| *n)
    };
    let best = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
    if best < minimum {
        return holder;
    }
    let leaders: Vec<Color> = counts
        .iter()
        .filter(|(_, n)| *n == best)
        .map(|(c, _)| *c)
        .collect();

    match holder {
        Some(h) if count_of(h) == best => Some(h),
        _ if leaders.len() == 1 => Some(leaders[0]),
        _ => holder,
    }
}
