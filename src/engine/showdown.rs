//! Расчёт раздачи: победители по банкам, призы, вылеты.
//!
//! Каждый банк разыгрывается независимо среди тех, кто в него вносил
//! и дожил до вскрытия. Приз делится поровну с усечением вниз —
//! остаток от деления сознательно пропадает (задокументированное
//! поведение), сплит воспроизводим до фишки.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::dto::{pot_views, seat_map};
use crate::api::events::RoomEvent;
use crate::api::notifier::RoomNotifier;
use crate::domain::hand::{HandPhase, HandWinner, Street};
use crate::domain::table::{Game, GameMode};
use crate::domain::{Card, Chips, PlayerId, UNSEATED};
use crate::eval::HandEvaluator;

/// Запрос на выплату кэш-стола: стол закрыт, победитель получает свою
/// долю эскроу, остальное возвращается в кассу.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CashPayout {
    pub winner: PlayerId,
    /// Доля победителя: buy_in * stack / initial_stack.
    pub winner_vault: Chips,
    /// Остаток эскроу после выплаты победителю.
    pub leave_vault: Chips,
}

/// Итог расчёта раздачи — всё, что нужно рантайму: кого известить,
/// кому платить, кого выкинуть и надо ли балансировать турнир.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HandOutcome {
    /// Победители, слитые по игроку (призы по банкам просуммированы).
    pub winners: Vec<HandWinner>,
    /// Дошедшие до вскрытия без приза (только текст руки, без фишек).
    pub lost_hands: Vec<HandWinner>,
    /// Вылетевшие в этой раздаче (стек стал ровно 0).
    pub busted: Vec<PlayerId>,
    /// Сколько активных игроков осталось за столом.
    pub active_left: usize,
    /// Выплата закрывшегося кэш-стола.
    pub cash_payout: Option<CashPayout>,
    /// Ранжирование финального стола турнира (чемпион первым),
    /// заполняется только когда стол турнира доигрался до одного.
    pub final_ranking: Vec<PlayerId>,
}

/// Разыграть вскрытие. `instant` — путь "всем остался только чек":
/// оставшиеся улицы раскрываются сразу.
pub fn resolve_showdown(
    game: &mut Game,
    evaluator: &dyn HandEvaluator,
    notifier: &dyn RoomNotifier,
    instant: bool,
    now_ts: u64,
) -> HandOutcome {
    let showdown_players: Vec<PlayerId> =
        game.active_unfolded().iter().map(|p| p.id).collect();
    // Карты раскрываются только при спорном вскрытии.
    let contested = showdown_players.len() > 1;

    notifier.notify_game(
        game.id,
        RoomEvent::SeatsUpdated {
            seats: seat_map(game, contested),
            players: showdown_players.len(),
        },
    );
    notifier.notify_game(game.id, RoomEvent::PotsUpdated(pot_views(game)));

    if instant {
        game.street = Street::River;
        game.bet = Chips::ZERO;
        for player in game.players.iter_mut() {
            if player.active {
                player.bet = Chips::ZERO;
                player.last_action = None;
            }
        }
        notifier.notify_game(game.id, RoomEvent::Log("Moving to River".into()));
    }
    game.phase = HandPhase::Showdown;

    let community: Vec<Card> = game.revealed_community().to_vec();

    // Победители по каждому банку независимо.
    let mut winners_map: BTreeMap<PlayerId, HandWinner> = BTreeMap::new();
    for pot in &game.pots {
        if pot.total.is_zero() {
            continue;
        }
        let eligible: Vec<&crate::domain::Player> = showdown_players
            .iter()
            .filter_map(|id| game.player(*id))
            .filter(|p| pot.involves(p.id))
            .collect();
        if eligible.is_empty() {
            continue;
        }

        let ranked: Vec<_> = eligible
            .iter()
            .map(|p| {
                let mut cards = p.cards.clone();
                cards.extend_from_slice(&community);
                evaluator.rank(&cards)
            })
            .collect();
        let winner_idx = evaluator.winners(&ranked);
        if winner_idx.is_empty() {
            continue;
        }

        let share = pot.total.div_floor(winner_idx.len() as u64);
        for idx in winner_idx {
            let player = eligible[idx];
            let entry = winners_map.entry(player.id).or_insert_with(|| HandWinner {
                player_id: player.id,
                prize: Chips::ZERO,
                desc: ranked[idx].desc.clone(),
                cards: player.cards.clone(),
            });
            entry.prize += share;
        }
    }

    // При бесспорной победе описание руки не показываем.
    if !contested {
        for winner in winners_map.values_mut() {
            winner.desc.clear();
        }
    }

    let lost_hands: Vec<HandWinner> = showdown_players
        .iter()
        .copied()
        .filter(|id| !winners_map.contains_key(id))
        .filter_map(|id| game.player(id))
        .map(|p| {
            let mut cards = p.cards.clone();
            cards.extend_from_slice(&community);
            HandWinner {
                player_id: p.id,
                prize: Chips::ZERO,
                desc: evaluator.rank(&cards).desc,
                cards: p.cards.clone(),
            }
        })
        .collect();

    // Начисляем призы и обнуляем ставки.
    for winner in winners_map.values() {
        if let Some(p) = game.player_mut(winner.player_id) {
            p.stack += winner.prize;
        }
    }
    for player in game.players.iter_mut() {
        player.bet = Chips::ZERO;
    }

    let winners: Vec<HandWinner> = winners_map.values().cloned().collect();
    game.winners = winners.clone();
    game.ended_at = Some(now_ts);
    game.current_player_id = None;
    game.phase = HandPhase::Settled;

    notifier.notify_game(
        game.id,
        RoomEvent::TurnChangedTo {
            player_id: None,
            allowed: None,
        },
    );

    // Проверка вылетов: пустой стек — деактивация, выживший фолдер
    // просто разворачивается к следующей раздаче.
    let mut busted = Vec::new();
    for player in game.players.iter_mut() {
        if !player.active {
            continue;
        }
        if player.stack.is_zero() {
            player.active = false;
            busted.push(player.id);
        } else if player.folded {
            player.folded = false;
        }
    }
    for player_id in &busted {
        notifier.notify_game(
            game.id,
            RoomEvent::Log(format!(
                "{player_id} loses and leaves the table (out of chips)"
            )),
        );
    }

    let active_left = game.active_players().len();

    // Кэш-стол с единственным обеспеченным игроком закрывается,
    // выплата уходит во внешний сервис расчётов (вне критпути).
    let mut cash_payout = None;
    if game.mode == GameMode::Cash && active_left <= 1 {
        game.ended = true;
        if let Some(winner) = game.active_players().first() {
            let seated = game
                .players
                .iter()
                .filter(|p| p.seat_id != UNSEATED)
                .count() as u64;
            let winner_vault = Chips(
                game.buy_in
                    .0
                    .saturating_mul(winner.stack.0)
                    .checked_div(game.initial_stack.0.max(1))
                    .unwrap_or(0),
            );
            let leave_vault = game.buy_in.saturating_mul(seated) - winner_vault;
            cash_payout = Some(CashPayout {
                winner: winner.id,
                winner_vault,
                leave_vault,
            });
        }
        notifier.notify_game(game.id, RoomEvent::ActiveGameUpdated);
    }

    // Финальное ранжирование стола турнира: чемпион, затем итеративный
    // отбор лучших рук среди остальных участников вскрытия.
    let mut final_ranking = Vec::new();
    if game.mode == GameMode::Tournament && active_left <= 1 {
        let champion = game
            .active_players()
            .first()
            .map(|p| p.id)
            .or_else(|| winners.first().map(|w| w.player_id));
        if let Some(champion) = champion {
            final_ranking.push(champion);
            let rest: Vec<PlayerId> = showdown_players
                .iter()
                .copied()
                .filter(|id| *id != champion)
                .collect();
            final_ranking.extend(rank_by_elimination(game, evaluator, &community, &rest));
        }
    }

    let game_over = game.ended;
    notifier.notify_game(
        game.id,
        RoomEvent::Winners {
            winners: winners.clone(),
            game_over,
        },
    );
    notifier.notify_game(game.id, RoomEvent::GameLostHands(lost_hands.clone()));
    for player_id in &showdown_players {
        if let Some(p) = game.player(*player_id) {
            let mut cards = p.cards.clone();
            cards.extend_from_slice(&community);
            notifier.notify_player(*player_id, RoomEvent::BestHand(evaluator.rank(&cards).desc));
        }
    }
    notifier.notify_game(game.id, RoomEvent::BetUpdated(game.bet));
    notifier.notify_game(game.id, RoomEvent::CommunityCardsUpdated(community));
    notifier.notify_game(
        game.id,
        RoomEvent::SeatsUpdated {
            seats: seat_map(game, contested),
            players: active_left,
        },
    );

    HandOutcome {
        winners,
        lost_hands,
        busted,
        active_left,
        cash_payout,
        final_ranking,
    }
}

/// Итеративный отбор по силе рук: на каждом круге лучшие руки
/// получают следующие места и выбывают, пока пул не опустеет.
fn rank_by_elimination(
    game: &Game,
    evaluator: &dyn HandEvaluator,
    community: &[Card],
    pool: &[PlayerId],
) -> Vec<PlayerId> {
    let mut remaining: Vec<PlayerId> = pool.to_vec();
    let mut ranking = Vec::new();

    while !remaining.is_empty() {
        if remaining.len() == 1 {
            ranking.push(remaining[0]);
            break;
        }
        let ranked: Vec<_> = remaining
            .iter()
            .map(|id| {
                let mut cards = game
                    .player(*id)
                    .map(|p| p.cards.clone())
                    .unwrap_or_default();
                cards.extend_from_slice(community);
                evaluator.rank(&cards)
            })
            .collect();
        let winner_idx = evaluator.winners(&ranked);
        if winner_idx.is_empty() {
            ranking.extend(remaining.iter().copied());
            break;
        }
        let mut next_round = Vec::new();
        for (i, id) in remaining.iter().enumerate() {
            if winner_idx.contains(&i) {
                ranking.push(*id);
            } else {
                next_round.push(*id);
            }
        }
        remaining = next_round;
    }

    ranking
}
