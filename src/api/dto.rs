use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::table::Game;
use crate::domain::{Card, Chips, PlayerId, SeatId};
use crate::engine::actions::Action;

/// Видимое фронту состояние одного места.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatView {
    pub player_id: PlayerId,
    pub name: String,
    /// Карманные карты: пустые вне вскрытия.
    pub cards: Vec<Card>,
    pub stack: Chips,
    pub bet: Chips,
    pub last_bet: Chips,
    pub dealer: bool,
    pub small_blind: bool,
    pub big_blind: bool,
    pub last_action: Option<Action>,
    pub folded: bool,
}

/// Карта мест стола: каждое место присутствует, пустое = None.
pub type SeatMap = BTreeMap<SeatId, Option<SeatView>>;

/// Снимок рассадки. `reveal_cards` = показывать карманные карты
/// (спорный шоудаун); при бесспорной победе карты остаются скрытыми.
pub fn seat_map(game: &Game, reveal_cards: bool) -> SeatMap {
    let mut seats: SeatMap = (1..=game.num_seats).map(|s| (s, None)).collect();
    for player in game.active_players() {
        let view = SeatView {
            player_id: player.id,
            name: player.name.clone(),
            cards: if reveal_cards {
                player.cards.clone()
            } else {
                Vec::new()
            },
            stack: player.stack,
            bet: player.bet,
            last_bet: player.last_bet,
            dealer: player.dealer,
            small_blind: player.small_blind,
            big_blind: player.big_blind,
            last_action: player.last_action,
            folded: player.folded,
        };
        seats.insert(player.seat_id, Some(view));
    }
    seats
}

/// Банк, как его видит фронт: только сумма.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PotView {
    pub total: Chips,
}

pub fn pot_views(game: &Game) -> Vec<PotView> {
    game.pots.iter().map(|p| PotView { total: p.total }).collect()
}
