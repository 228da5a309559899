//! Порядок мест: кольцо активных игроков и ротация дилера.

use crate::domain::player::Player;
use crate::domain::table::Game;
use crate::domain::{PlayerId, UNSEATED};

/// Кольцо ходящих: активные и не сфолдившие игроки по возрастанию
/// мест, плюс (опционально) сам текущий игрок, даже если он уже
/// сфолдил или вышел — от него считается следующий.
pub fn turn_ring(game: &Game, include: Option<PlayerId>) -> Vec<PlayerId> {
    let mut ring: Vec<&Player> = game
        .players
        .iter()
        .filter(|p| p.is_active_unfolded() || Some(p.id) == include)
        .collect();
    ring.sort_by_key(|p| p.seat_id);
    ring.iter().map(|p| p.id).collect()
}

/// Следующий игрок в кольце относительно текущего.
///
/// Кольцо обходим строго по возрастанию мест с точным переносом через
/// край; если текущего в кольце нет (или он не задан) — первый игрок.
pub fn next_player(ring: &[PlayerId], current: Option<PlayerId>) -> Option<PlayerId> {
    if ring.is_empty() {
        return None;
    }
    let idx = match current.and_then(|id| ring.iter().position(|p| *p == id)) {
        Some(i) => (i + 1) % ring.len(),
        None => 0,
    };
    Some(ring[idx])
}

/// Выбор дилера очередной раздачи.
///
/// Первая раздача — равновероятно среди живых игроков. Дальше кнопка
/// переходит к следующему по кольцу. Если прошлый дилер уже не активен,
/// ротация продолжается от его последнего места: кнопку получает первый
/// живой игрок со старшим местом (с переносом через край).
pub fn choose_dealer<R: crate::engine::RandomSource>(
    game: &Game,
    rng: &mut R,
    prev_dealer: Option<PlayerId>,
) -> Option<PlayerId> {
    let ring = turn_ring(game, None);
    if ring.is_empty() {
        return None;
    }

    if game.hand <= 1 {
        return Some(ring[rng.pick(ring.len())]);
    }

    let prev = match prev_dealer {
        Some(id) => id,
        None => return ring.first().copied(),
    };
    if ring.contains(&prev) {
        return next_player(&ring, Some(prev));
    }

    // Прошлый дилер выбыл: идём от его места дальше по кругу.
    let prev_seat = game.player(prev).map(|p| p.seat_id).unwrap_or(UNSEATED);
    game.active_unfolded()
        .into_iter()
        .find(|p| p.seat_id > prev_seat)
        .map(|p| p.id)
        .or_else(|| ring.first().copied())
}
