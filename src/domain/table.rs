use serde::{Deserialize, Serialize};

use crate::domain::blinds::BlindSchedule;
use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::hand::{HandPhase, HandWinner, Street};
use crate::domain::player::Player;
use crate::domain::{GameId, PlayerId, SeatId, TableId, UNSEATED};
use crate::engine::pot::Pot;

/// Режим игры: кэш-стол или стол внутри турнира.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameMode {
    Cash,
    Tournament,
}

/// Конфигурация новой игры.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    /// Кэш-стол или турнир, которому принадлежит игра.
    pub table_id: TableId,
    pub mode: GameMode,
    pub num_seats: u8,
    pub initial_stack: Chips,
    pub buy_in: Chips,
    pub min_bet: Chips,
    pub blinds: BlindSchedule,
}

/// Одна игра: физическая рассадка игроков плюс состояние текущей раздачи.
///
/// Инварианты:
/// - `bet` равен максимальной ставке текущей улицы среди живых игроков;
/// - `street` внутри раздачи двигается только вперёд и сбрасывается
///   на Preflop на старте новой;
/// - `ended_at` — конец *раздачи*, `ended` — закрытие всего стола.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub table_id: TableId,
    pub mode: GameMode,
    pub num_seats: u8,
    pub initial_stack: Chips,
    pub buy_in: Chips,
    pub min_bet: Chips,
    pub blinds: BlindSchedule,

    pub street: Street,
    /// Текущая целевая ставка улицы.
    pub bet: Chips,
    /// Все пять общих карт раздаются заранее; открываются по улице.
    pub community_cards: Vec<Card>,
    /// Счётчик раздач, первая = 1.
    pub hand: u32,
    /// Упорядоченный список банков текущей раздачи.
    pub pots: Vec<Pot>,
    pub current_player_id: Option<PlayerId>,
    pub dealer_id: Option<PlayerId>,
    pub phase: HandPhase,

    /// Unix-время старта игры (None = ещё не началась).
    pub started_at: Option<u64>,
    /// Unix-время конца последней раздачи (None = раздача идёт).
    pub ended_at: Option<u64>,
    /// Стол закрыт окончательно.
    pub ended: bool,
    /// Победители последней раздачи.
    pub winners: Vec<HandWinner>,

    pub players: Vec<Player>,
}

impl Game {
    pub fn new(id: GameId, config: GameConfig) -> Self {
        Self {
            id,
            table_id: config.table_id,
            mode: config.mode,
            num_seats: config.num_seats,
            initial_stack: config.initial_stack,
            buy_in: config.buy_in,
            min_bet: config.min_bet,
            blinds: config.blinds,
            street: Street::Preflop,
            bet: Chips::ZERO,
            community_cards: Vec::new(),
            hand: 0,
            pots: Vec::new(),
            current_player_id: None,
            dealer_id: None,
            phase: HandPhase::AwaitingPlayers,
            started_at: None,
            ended_at: None,
            ended: false,
            winners: Vec::new(),
            players: Vec::new(),
        }
    }

    /// Игра активна = стартовала и текущая раздача ещё не завершена.
    pub fn is_active(&self) -> bool {
        self.started_at.is_some() && self.ended_at.is_none() && !self.ended
    }

    /// Игроки, занимающие места (включая неактивных до пересадки).
    pub fn seated_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.seat_id != UNSEATED)
    }

    /// Активные игроки по возрастанию мест (включая сфолдивших).
    pub fn active_players(&self) -> Vec<&Player> {
        let mut players: Vec<&Player> = self.players.iter().filter(|p| p.active).collect();
        players.sort_by_key(|p| p.seat_id);
        players
    }

    /// Активные и не сфолдившие игроки по возрастанию мест.
    pub fn active_unfolded(&self) -> Vec<&Player> {
        let mut players: Vec<&Player> = self
            .players
            .iter()
            .filter(|p| p.is_active_unfolded())
            .collect();
        players.sort_by_key(|p| p.seat_id);
        players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Первое свободное место (места неактивных игроков считаются
    /// свободными). None, если стол полон.
    pub fn free_seat(&self) -> Option<SeatId> {
        let taken: Vec<SeatId> = self
            .players
            .iter()
            .filter(|p| p.active && p.seat_id != UNSEATED)
            .map(|p| p.seat_id)
            .collect();
        (1..=self.num_seats).find(|seat| !taken.contains(seat))
    }

    /// Открытые на текущей улице общие карты.
    pub fn revealed_community(&self) -> &[Card] {
        let n = self.street.revealed_cards().min(self.community_cards.len());
        &self.community_cards[..n]
    }

    /// Сброс на старт новой раздачи: эскалация блайндов, счётчик,
    /// свежий (единственный, живой) банк.
    pub fn reset_for_hand(&mut self, now_ts: u64) -> Option<Chips> {
        self.bet = Chips::ZERO;
        self.community_cards.clear();
        self.ended_at = None;
        self.hand += 1;
        self.street = Street::Preflop;
        self.dealer_id = None;
        self.current_player_id = None;
        self.winners.clear();
        self.pots = vec![Pot::new()];
        self.phase = HandPhase::Dealing;

        let hand = self.hand;
        let mut min_bet = self.min_bet;
        let raised = self.blinds.escalate(&mut min_bet, hand, now_ts);
        self.min_bet = min_bet;
        raised
    }
}
