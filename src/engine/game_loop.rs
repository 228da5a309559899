//! Жизненный цикл раздачи и планирование хода.
//!
//! Все функции мутируют `Game` синхронно, внутри критической секции
//! игры. Ни одна из них не ждёт внешних сервисов: уведомления уходят
//! через неблокирующий `RoomNotifier`, а выплаты возвращаются наверх
//! в составе `HandOutcome`.

use crate::api::dto::{pot_views, seat_map};
use crate::api::events::RoomEvent;
use crate::api::notifier::RoomNotifier;
use crate::domain::blinds::{big_blind, small_blind};
use crate::domain::deck::Deck;
use crate::domain::hand::{HandPhase, Street};
use crate::domain::table::Game;
use crate::domain::{Chips, PlayerId};
use crate::engine::actions::{Action, ActionKind, PlayerAction};
use crate::engine::errors::EngineError;
use crate::engine::hand_history::ActionHistory;
use crate::engine::pot::settle_contribution;
use crate::engine::positions::{choose_dealer, next_player, turn_ring};
use crate::engine::showdown::{resolve_showdown, HandOutcome};
use crate::engine::validation;
use crate::engine::RandomSource;
use crate::eval::HandEvaluator;

/// Итог применения входящего действия.
#[derive(Debug)]
pub enum ActionOutcome {
    /// Действие не прошло валидацию. Состояние, история и ход
    /// не тронуты — для движка действия не было.
    Ignored,
    Applied(TurnFlow),
}

/// Куда двинулся ход после принятого действия.
#[derive(Debug)]
pub enum TurnFlow {
    /// Ход у игрока; рантайм взводит таймер авто-фолда.
    TurnPassed { player_id: PlayerId },
    /// Раздача дошла до расчёта.
    HandFinished(HandOutcome),
}

/// Пометить игру стартовавшей и сдать первую раздачу.
pub fn start_game<R: RandomSource>(
    game: &mut Game,
    history: &mut ActionHistory,
    rng: &mut R,
    evaluator: &dyn HandEvaluator,
    notifier: &dyn RoomNotifier,
    now_ts: u64,
) -> Result<TurnFlow, EngineError> {
    if game.ended {
        return Err(EngineError::GameEnded);
    }
    if game.started_at.is_some() {
        return Err(EngineError::HandAlreadyInProgress);
    }
    game.started_at = Some(now_ts);
    notifier.notify_game(game.id, RoomEvent::GameStarted);
    notifier.notify_game(game.id, RoomEvent::Log("Game started".into()));
    start_hand(game, history, rng, evaluator, notifier, now_ts)
}

/// Старт новой раздачи: эскалация блайндов, сброс игроков, свежая
/// колода (четыре прохода тасовки), выбор дилера, блайнды, карманные
/// карты, заранее сданный борд — и ход первому игроку.
pub fn start_hand<R: RandomSource>(
    game: &mut Game,
    history: &mut ActionHistory,
    rng: &mut R,
    evaluator: &dyn HandEvaluator,
    notifier: &dyn RoomNotifier,
    now_ts: u64,
) -> Result<TurnFlow, EngineError> {
    if game.ended {
        return Err(EngineError::GameEnded);
    }
    if game.is_active() {
        return Err(EngineError::HandAlreadyInProgress);
    }

    notifier.notify_game(game.id, RoomEvent::Log("New hand started".into()));

    let prev_dealer = game.dealer_id;
    game.reset_for_hand(now_ts);
    for player in game.players.iter_mut() {
        if player.active {
            player.reset_for_hand();
        }
    }

    // Фишки раздаются один раз, на первой раздаче стола.
    if game.hand == 1 {
        let initial = game.initial_stack;
        for player in game.players.iter_mut() {
            if player.active {
                player.stack = initial;
            }
        }
    }

    let ring = turn_ring(game, None);
    if ring.len() < 2 {
        // Фатальная для раздачи ситуация: стол остаётся между раздачами.
        return Err(EngineError::NotEnoughPlayers);
    }

    let mut deck = Deck::standard_52();
    for _ in 0..4 {
        rng.shuffle(&mut deck.cards);
    }

    let dealer = choose_dealer(game, rng, prev_dealer).ok_or(EngineError::NoDealer)?;
    game.dealer_id = Some(dealer);
    if let Some(p) = game.player_mut(dealer) {
        p.dealer = true;
    }
    notifier.notify_game(
        game.id,
        RoomEvent::Log(format!("Player {dealer} was chosen as dealer")),
    );

    // Блайнды: в хедз-апе малый блайнд ставит дилер.
    let heads_up = ring.len() == 2;
    let sb_player = if heads_up {
        dealer
    } else {
        next_player(&ring, Some(dealer)).ok_or(EngineError::Internal("empty turn ring"))?
    };
    post_blind(game, history, notifier, sb_player, small_blind(game.min_bet));
    if let Some(p) = game.player_mut(sb_player) {
        p.small_blind = true;
    }
    game.current_player_id = Some(sb_player);

    let bb_player =
        next_player(&ring, Some(sb_player)).ok_or(EngineError::Internal("empty turn ring"))?;
    post_blind(game, history, notifier, bb_player, big_blind(game.min_bet));
    if let Some(p) = game.player_mut(bb_player) {
        p.big_blind = true;
    }
    game.current_player_id = Some(bb_player);

    // Карманные карты — по две, лично каждому.
    for player_id in &ring {
        let cards = vec![
            deck.draw().ok_or(EngineError::Internal("deck exhausted"))?,
            deck.draw().ok_or(EngineError::Internal("deck exhausted"))?,
        ];
        if let Some(p) = game.player_mut(*player_id) {
            p.cards = cards.clone();
        }
        notifier.notify_player(*player_id, RoomEvent::HoleCards(cards));
    }

    // Борд сдаётся заранее и открывается по улицам:
    // одна сожжённая карта перед флопом, тёрном и ривером.
    for batch in [3usize, 1, 1] {
        deck.burn();
        for _ in 0..batch {
            game.community_cards
                .push(deck.draw().ok_or(EngineError::Internal("deck exhausted"))?);
        }
    }

    game.phase = HandPhase::Betting(Street::Preflop);

    notifier.notify_game(game.id, RoomEvent::BlindUpdated(game.min_bet));
    notifier.notify_game(game.id, RoomEvent::GameLostHands(Vec::new()));
    notifier.notify_game(game.id, RoomEvent::BetUpdated(game.bet));
    notifier.notify_game(game.id, RoomEvent::PotsUpdated(pot_views(game)));
    notifier.notify_game(
        game.id,
        RoomEvent::CommunityCardsUpdated(game.revealed_community().to_vec()),
    );
    notifier.notify_game(
        game.id,
        RoomEvent::SeatsUpdated {
            seats: seat_map(game, false),
            players: game.active_unfolded().len(),
        },
    );

    advance_turn(game, history, evaluator, notifier, now_ts)
}

/// Поставить блайнд: не больше стека, через кассу банков, с записью
/// в историю. Короткий стек уходит в олл-ин прямо с блайнда.
fn post_blind(
    game: &mut Game,
    history: &mut ActionHistory,
    notifier: &dyn RoomNotifier,
    player_id: PlayerId,
    amount: Chips,
) {
    let stack = game
        .player(player_id)
        .map(|p| p.stack)
        .unwrap_or(Chips::ZERO);
    let amount = amount.min(stack);

    place_bet(game, notifier, player_id, amount);
    let all_in = game
        .player(player_id)
        .map(|p| p.is_all_in())
        .unwrap_or(false);
    settle_contribution(&mut game.pots, player_id, amount, all_in);
    history.record(game.id, player_id, Action::Call, Some(amount), game.bet);
    notifier.notify_game(
        game.id,
        RoomEvent::Log(format!("{player_id} BETS {amount} (blind)")),
    );
}

/// Списать ставку со стека и поднять целевую ставку улицы, если надо.
fn place_bet(game: &mut Game, notifier: &dyn RoomNotifier, player_id: PlayerId, amount: Chips) {
    let mut new_bet = None;
    if let Some(player) = game.player_mut(player_id) {
        player.stack -= amount;
        player.bet += amount;
        player.last_bet = player.bet;
        new_bet = Some(player.bet);
    }
    if let Some(bet) = new_bet {
        if bet > game.bet {
            game.bet = bet;
        }
    }
    notifier.notify_game(game.id, RoomEvent::BetUpdated(game.bet));
}

/// Применить действие игрока.
///
/// Нелегальное действие — тихий no-op: без записи в историю, без
/// смены хода, без событий.
pub fn apply_action(
    game: &mut Game,
    history: &mut ActionHistory,
    evaluator: &dyn HandEvaluator,
    notifier: &dyn RoomNotifier,
    action: PlayerAction,
    now_ts: u64,
) -> Result<ActionOutcome, EngineError> {
    if game.ended {
        return Err(EngineError::GameEnded);
    }
    if !game.is_active() {
        return Err(EngineError::NoActiveHand);
    }
    if game.player(action.player_id).is_none() {
        return Err(EngineError::PlayerNotAtTable(action.player_id));
    }

    let legal = {
        let players = game.active_unfolded();
        let player = match players.iter().find(|p| p.id == action.player_id) {
            Some(p) => *p,
            // Сфолдивший/неактивный игрок ничего легального сделать не может.
            None => return Ok(ActionOutcome::Ignored),
        };
        match action.kind {
            ActionKind::Call => validation::can_call(player, game, &players),
            ActionKind::Raise(amount) => {
                validation::can_raise(player, game, &players, Some(amount))
            }
            ActionKind::Check => validation::can_check(player, game),
            ActionKind::Fold => validation::can_fold(player, game),
            ActionKind::AllIn => validation::can_all_in(player, game, &players),
        }
    };
    if !legal {
        return Ok(ActionOutcome::Ignored);
    }

    let player_id = action.player_id;
    match action.kind {
        ActionKind::Call => {
            let amount = {
                let player = game
                    .player(player_id)
                    .ok_or(EngineError::PlayerNotAtTable(player_id))?;
                validation::call_amount(player, game)
            };
            place_bet(game, notifier, player_id, amount);
            let all_in = game
                .player(player_id)
                .map(|p| p.is_all_in())
                .unwrap_or(false);
            settle_contribution(&mut game.pots, player_id, amount, all_in);
            set_last_action(game, player_id, Action::Call);
            history.record(game.id, player_id, Action::Call, Some(amount), game.bet);
            notifier.notify_game(game.id, RoomEvent::Log(format!("{player_id} CALLs {amount}")));
        }
        ActionKind::Raise(amount) => {
            let opener = game.bet.is_zero();
            place_bet(game, notifier, player_id, amount);
            let all_in = game
                .player(player_id)
                .map(|p| p.is_all_in())
                .unwrap_or(false);
            settle_contribution(&mut game.pots, player_id, amount, all_in);
            set_last_action(game, player_id, Action::Raise);
            history.record(game.id, player_id, Action::Raise, Some(amount), game.bet);
            let msg = if opener {
                format!("{player_id} BETS {amount}")
            } else {
                format!("{player_id} RAISES by {amount}")
            };
            notifier.notify_game(game.id, RoomEvent::Log(msg));
        }
        ActionKind::Check => {
            set_last_action(game, player_id, Action::Check);
            history.record(game.id, player_id, Action::Check, None, game.bet);
            notifier.notify_game(game.id, RoomEvent::Log(format!("{player_id} CHECKS")));
        }
        ActionKind::Fold => {
            if let Some(p) = game.player_mut(player_id) {
                p.folded = true;
                p.bet = Chips::ZERO;
                p.last_action = Some(Action::Fold);
            }
            history.record(game.id, player_id, Action::Fold, None, game.bet);
            notifier.notify_game(game.id, RoomEvent::Log(format!("{player_id} FOLDS")));
        }
        ActionKind::AllIn => {
            let amount = game
                .player(player_id)
                .map(|p| p.stack)
                .unwrap_or(Chips::ZERO);
            place_bet(game, notifier, player_id, amount);
            settle_contribution(&mut game.pots, player_id, amount, true);
            set_last_action(game, player_id, Action::AllIn);
            history.record(game.id, player_id, Action::AllIn, Some(amount), game.bet);
            notifier.notify_game(
                game.id,
                RoomEvent::Log(format!("{player_id} goes ALL-IN")),
            );
        }
    }

    notifier.notify_game(game.id, RoomEvent::PotsUpdated(pot_views(game)));
    notifier.notify_game(
        game.id,
        RoomEvent::SeatsUpdated {
            seats: seat_map(game, false),
            players: game.active_unfolded().len(),
        },
    );

    let flow = advance_turn(game, history, evaluator, notifier, now_ts)?;
    Ok(ActionOutcome::Applied(flow))
}

fn set_last_action(game: &mut Game, player_id: PlayerId, action: Action) {
    if let Some(p) = game.player_mut(player_id) {
        p.last_action = Some(action);
    }
}

/// Уход игрока из-за стола.
///
/// До старта игры место освобождается (возврат бай-ина делает рантайм);
/// в идущей игре игрок деактивируется, и если ход был у него — ход
/// двигается дальше. Возвращает поток хода, если он изменился.
pub fn leave_player(
    game: &mut Game,
    history: &mut ActionHistory,
    evaluator: &dyn HandEvaluator,
    notifier: &dyn RoomNotifier,
    player_id: PlayerId,
    now_ts: u64,
) -> Result<Option<TurnFlow>, EngineError> {
    if game.player(player_id).is_none() {
        return Err(EngineError::PlayerNotAtTable(player_id));
    }
    if game.ended {
        return Ok(None);
    }

    history.record(game.id, player_id, Action::Leave, None, game.bet);
    notifier.notify_game(game.id, RoomEvent::Log(format!("{player_id} LEAVES")));

    if game.started_at.is_none() {
        if let Some(p) = game.player_mut(player_id) {
            p.last_action = Some(Action::Leave);
            p.unseat();
        }
        notifier.notify_game(
            game.id,
            RoomEvent::SeatsUpdated {
                seats: seat_map(game, false),
                players: game.active_unfolded().len(),
            },
        );
        return Ok(None);
    }

    if let Some(p) = game.player_mut(player_id) {
        p.last_action = Some(Action::Leave);
        p.active = false;
        p.bet = Chips::ZERO;
    }

    if game.current_player_id == Some(player_id) && game.is_active() {
        let flow = advance_turn(game, history, evaluator, notifier, now_ts)?;
        return Ok(Some(flow));
    }

    notifier.notify_game(
        game.id,
        RoomEvent::SeatsUpdated {
            seats: seat_map(game, false),
            players: game.active_unfolded().len(),
        },
    );

    if game.is_active() && game.active_unfolded().len() == 1 {
        let flow = advance_turn(game, history, evaluator, notifier, now_ts)?;
        return Ok(Some(flow));
    }
    Ok(None)
}

/// Правила перехода хода после каждого принятого действия.
///
/// Порядок проверок фиксированный:
/// 1) остался один живой игрок — сразу расчёт;
/// 2) всем осталось только чекать — мгновенный расчёт с раскрытием
///    оставшихся улиц;
/// 3) следующему игроку остался только чек — авто-чек за него
///    (и цикл продолжается), либо переход улицы, если торговля закрыта;
/// 4) торговля закрыта — следующая улица или расчёт на ривере;
/// 5) иначе ход переходит следующему.
fn advance_turn(
    game: &mut Game,
    history: &mut ActionHistory,
    evaluator: &dyn HandEvaluator,
    notifier: &dyn RoomNotifier,
    now_ts: u64,
) -> Result<TurnFlow, EngineError> {
    loop {
        if !game.is_active() {
            return Err(EngineError::NoActiveHand);
        }

        let current = game.current_player_id;

        // Правило 1: один живой игрок — победа без вскрытия.
        if game.active_unfolded().len() <= 1 {
            let outcome = resolve_showdown(game, evaluator, notifier, false, now_ts);
            return Ok(TurnFlow::HandFinished(outcome));
        }

        let ring = turn_ring(game, current);
        let next =
            next_player(&ring, current).ok_or(EngineError::Internal("empty turn ring"))?;

        let (next_only_check, everyone_only_check, street_over) = {
            let players = game.active_unfolded();
            let next_ref = game
                .player(next)
                .ok_or(EngineError::PlayerNotAtTable(next))?;
            (
                validation::can_only_check(next_ref, game, &players),
                validation::all_can_only_check(game, &players),
                validation::is_street_over(&players, game),
            )
        };

        game.current_player_id = Some(next);

        if next_only_check {
            // Правило 2: улица заморожена у всех — мгновенный расчёт.
            if everyone_only_check {
                let outcome = resolve_showdown(game, evaluator, notifier, true, now_ts);
                return Ok(TurnFlow::HandFinished(outcome));
            }

            if street_over {
                if game.street == Street::River {
                    let outcome = resolve_showdown(game, evaluator, notifier, false, now_ts);
                    return Ok(TurnFlow::HandFinished(outcome));
                }
                advance_street(game, notifier);
                return Ok(pass_turn(game, notifier, next));
            }

            // Правило 3: чекаем за игрока и продолжаем цикл.
            set_last_action(game, next, Action::Check);
            history.record(game.id, next, Action::Check, None, game.bet);
            notifier.notify_game(game.id, RoomEvent::Log(format!("{next} CHECKS")));
            continue;
        }

        if street_over {
            if game.street == Street::River {
                let outcome = resolve_showdown(game, evaluator, notifier, false, now_ts);
                return Ok(TurnFlow::HandFinished(outcome));
            }
            advance_street(game, notifier);
            return Ok(pass_turn(game, notifier, next));
        }

        return Ok(pass_turn(game, notifier, next));
    }
}

/// Передать ход и сообщить игроку, что ему разрешено.
fn pass_turn(game: &mut Game, notifier: &dyn RoomNotifier, player_id: PlayerId) -> TurnFlow {
    game.current_player_id = Some(player_id);
    let allowed = {
        let players = game.active_unfolded();
        game.player(player_id)
            .map(|p| validation::allowed_actions(p, game, &players))
    };
    notifier.notify_game(
        game.id,
        RoomEvent::TurnChangedTo {
            player_id: Some(player_id),
            allowed,
        },
    );
    TurnFlow::TurnPassed { player_id }
}

/// Переход на следующую улицу: сброс ставок, открытие карт.
/// Новый банк НЕ создаётся — банки живут всю раздачу.
fn advance_street(game: &mut Game, notifier: &dyn RoomNotifier) {
    let next_street = match game.street.next() {
        Some(s) => s,
        None => return,
    };
    game.street = next_street;
    game.bet = Chips::ZERO;
    game.phase = HandPhase::Betting(next_street);
    for player in game.players.iter_mut() {
        if player.active {
            player.bet = Chips::ZERO;
            player.last_action = None;
        }
    }

    notifier.notify_game(
        game.id,
        RoomEvent::Log(format!("Moving to {:?}", game.street)),
    );
    notifier.notify_game(
        game.id,
        RoomEvent::CommunityCardsUpdated(game.revealed_community().to_vec()),
    );
    notifier.notify_game(game.id, RoomEvent::BetUpdated(game.bet));
    notifier.notify_game(game.id, RoomEvent::PotsUpdated(pot_views(game)));
}
