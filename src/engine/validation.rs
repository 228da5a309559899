//! Правила легальности действий.
//!
//! Все предикаты чистые и идемпотентные: смотрят на `(игрок, игра,
//! соперники)` и ничего не меняют. Применяет действие и двигает ход
//! только планировщик; действие, не прошедшее проверку, для движка
//! просто не существует.

use serde::{Deserialize, Serialize};

use crate::domain::blinds::big_blind;
use crate::domain::chips::Chips;
use crate::domain::player::Player;
use crate::domain::table::Game;

/// Числовые параметры, которые фронт показывает рядом с кнопками.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionParams {
    pub call_amount: Chips,
    pub min_raise: Chips,
    pub max_bet: Chips,
}

/// Матрица разрешённых действий для одного игрока.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllowedActions {
    pub can_call: bool,
    pub can_raise: bool,
    pub can_check: bool,
    pub can_fold: bool,
    pub can_all_in: bool,
    pub params: ActionParams,
}

fn is_player_turn(player: &Player, game: &Game) -> bool {
    game.current_player_id == Some(player.id)
}

/// Сколько игроков ещё держит фишки в игре (стек или ставка улицы).
fn players_with_chips_in_play(players: &[&Player]) -> usize {
    players
        .iter()
        .filter(|p| !(p.stack + p.bet).is_zero())
        .count()
}

/// Сколько игроков ещё держит фишки в стеке.
fn players_with_stack(players: &[&Player]) -> usize {
    players.iter().filter(|p| !p.stack.is_zero()).count()
}

/// Сумма доплаты до текущей ставки, не больше стека.
pub fn call_amount(player: &Player, game: &Game) -> Chips {
    if game.bet.is_zero() {
        Chips::ZERO
    } else {
        (game.bet - player.bet).min(player.stack)
    }
}

/// Минимальный рейз: доплата до ставки плюс большой блайнд,
/// но не больше стека.
pub fn min_raise(player: &Player, game: &Game) -> Chips {
    (call_amount(player, game) + big_blind(game.min_bet)).min(player.stack)
}

/// Верхний предел ставки — собственный стек, внешних кэпов нет.
pub fn max_bet(player: &Player) -> Chips {
    player.stack
}

/// Чек: ставка уравнена либо игрок уже в олл-ине.
pub fn can_check(player: &Player, game: &Game) -> bool {
    game.is_active()
        && player.is_active_unfolded()
        && (player.is_all_in() || player.bet == game.bet)
}

/// Колл: есть что уравнивать и есть кому отвечать.
pub fn can_call(player: &Player, game: &Game, players: &[&Player]) -> bool {
    !game.bet.is_zero()
        && game.is_active()
        && player.is_active_unfolded()
        && !player.stack.is_zero()
        && player.bet < game.bet
        && players_with_chips_in_play(players) > 1
}

/// Рейз указанной суммы (None = минимальный).
pub fn can_raise(player: &Player, game: &Game, players: &[&Player], amount: Option<Chips>) -> bool {
    let min = min_raise(player, game);
    let amount = amount.unwrap_or(min);
    game.is_active()
        && player.is_active_unfolded()
        && !player.stack.is_zero()
        && min <= amount
        && amount <= max_bet(player)
        && players_with_stack(players) > 1
}

/// Фолд разрешён только в свой ход.
pub fn can_fold(player: &Player, game: &Game) -> bool {
    game.is_active() && is_player_turn(player, game) && player.is_active_unfolded()
}

/// Олл-ин: свой ход, есть фишки, есть кому отвечать.
pub fn can_all_in(player: &Player, game: &Game, players: &[&Player]) -> bool {
    game.is_active()
        && is_player_turn(player, game)
        && player.is_active_unfolded()
        && !player.stack.is_zero()
        && players_with_chips_in_play(players) > 1
}

/// Игроку не осталось ничего, кроме чека.
pub fn can_only_check(player: &Player, game: &Game, players: &[&Player]) -> bool {
    !can_call(player, game, players)
        && !can_raise(player, game, players, None)
        && can_check(player, game)
}

/// Улица заморожена: ни один из оставшихся не может ни колл, ни рейз.
pub fn all_can_only_check(game: &Game, players: &[&Player]) -> bool {
    players.iter().all(|p| can_only_check(p, game, players))
}

/// Раунд ставок улицы завершён: каждый живой игрок уже ходил и либо
/// уравнял ставку, либо стоит в олл-ине.
pub fn is_street_over(players: &[&Player], game: &Game) -> bool {
    for player in players {
        if player.last_action.is_none() {
            return false;
        }
        if player.bet < game.bet && !player.stack.is_zero() {
            return false;
        }
    }
    true
}

/// Собрать матрицу действий для передачи хода.
pub fn allowed_actions(player: &Player, game: &Game, players: &[&Player]) -> AllowedActions {
    let can_raise_flag = can_raise(player, game, players, None);
    AllowedActions {
        can_call: can_call(player, game, players),
        can_raise: can_raise_flag,
        can_check: can_check(player, game),
        can_fold: can_fold(player, game),
        can_all_in: can_all_in(player, game, players),
        params: ActionParams {
            call_amount: call_amount(player, game),
            min_raise: if can_raise_flag {
                min_raise(player, game)
            } else {
                Chips::ZERO
            },
            max_bet: max_bet(player),
        },
    }
}
