//! Интеграционные тесты жизненного цикла раздачи: блайнды, порядок
//! ходов, авто-продвижение улиц, победа фолдами, сохранение фишек.

use poker_room_engine::api::notifier::{NullNotifier, RecordingNotifier};
use poker_room_engine::domain::blinds::BlindSchedule;
use poker_room_engine::domain::chips::Chips;
use poker_room_engine::domain::hand::HandPhase;
use poker_room_engine::domain::player::Player;
use poker_room_engine::domain::table::{Game, GameConfig, GameMode};
use poker_room_engine::domain::{PlayerId, SeatId};
use poker_room_engine::engine::actions::{ActionKind, PlayerAction};
use poker_room_engine::engine::game_loop::{
    apply_action, start_game, ActionOutcome, TurnFlow,
};
use poker_room_engine::engine::hand_history::ActionHistory;
use poker_room_engine::engine::pot::pots_total;
use poker_room_engine::eval::HighCardEvaluator;
use poker_room_engine::infra::rng::DeterministicRng;

fn make_game(seats: &[(SeatId, PlayerId)], min_bet: u64) -> Game {
    let mut game = Game::new(
        1,
        GameConfig {
            table_id: 1,
            mode: GameMode::Cash,
            num_seats: 6,
            initial_stack: Chips(1_000),
            buy_in: Chips(100),
            min_bet: Chips(min_bet),
            blinds: BlindSchedule::fixed(),
        },
    );
    for (seat, id) in seats {
        game.players
            .push(Player::new(*id, format!("p{id}"), *seat, Chips::ZERO));
    }
    game
}

struct Harness {
    game: Game,
    history: ActionHistory,
    rng: DeterministicRng,
    evaluator: HighCardEvaluator,
    notifier: NullNotifier,
}

impl Harness {
    fn new(seats: &[(SeatId, PlayerId)], min_bet: u64, seed: u64) -> Self {
        Self {
            game: make_game(seats, min_bet),
            history: ActionHistory::new(),
            rng: DeterministicRng::from_seed_u64(seed),
            evaluator: HighCardEvaluator,
            notifier: NullNotifier,
        }
    }

    fn start(&mut self) -> TurnFlow {
        start_game(
            &mut self.game,
            &mut self.history,
            &mut self.rng,
            &self.evaluator,
            &self.notifier,
            1_000,
        )
        .expect("start_game must succeed")
    }

    fn act(&mut self, player_id: PlayerId, kind: ActionKind) -> TurnFlow {
        match apply_action(
            &mut self.game,
            &mut self.history,
            &self.evaluator,
            &self.notifier,
            PlayerAction { player_id, kind },
            1_001,
        )
        .expect("apply_action must succeed")
        {
            ActionOutcome::Applied(flow) => flow,
            ActionOutcome::Ignored => panic!("Действие неожиданно отвергнуто"),
        }
    }

    fn total_chips(&self) -> u64 {
        let stacks: u64 = self.game.players.iter().map(|p| p.stack.0).sum();
        stacks + pots_total(&self.game.pots).0
    }
}

/// Хедз-ап: дилер ставит малый блайнд, соперник большой, и первым
/// ходит дилер.
#[test]
fn heads_up_blinds_and_first_turn() {
    let mut h = Harness::new(&[(1, 10), (2, 20)], 20, 7);
    let flow = h.start();

    let dealer = h.game.dealer_id.expect("Дилер должен быть выбран");
    let other = if dealer == 10 { 20 } else { 10 };

    let dealer_row = h.game.player(dealer).unwrap();
    let other_row = h.game.player(other).unwrap();

    assert!(dealer_row.small_blind, "В хедз-апе малый блайнд у дилера");
    assert!(other_row.big_blind);
    assert_eq!(dealer_row.bet, Chips(10));
    assert_eq!(other_row.bet, Chips(20));
    assert_eq!(dealer_row.stack, Chips(990));
    assert_eq!(other_row.stack, Chips(980));
    assert_eq!(h.game.bet, Chips(20));

    match flow {
        TurnFlow::TurnPassed { player_id } => {
            assert_eq!(player_id, dealer, "Первым на префлопе ходит дилер")
        }
        TurnFlow::HandFinished(_) => panic!("Раздача не должна закончиться на блайндах"),
    }

    // Блайнды уже в банках.
    assert_eq!(pots_total(&h.game.pots), Chips(30));
    assert_eq!(h.total_chips(), 2_000);
}

/// За троих: блайнды слева от дилера, ход за большим блайндом.
#[test]
fn three_way_blind_order() {
    let mut h = Harness::new(&[(1, 11), (2, 22), (3, 33)], 20, 3);
    let flow = h.start();

    let dealer = h.game.dealer_id.unwrap();
    let sb = h.game.players.iter().find(|p| p.small_blind).unwrap().id;
    let bb = h.game.players.iter().find(|p| p.big_blind).unwrap().id;

    assert_ne!(sb, dealer, "За троих дилер не ставит малый блайнд");
    assert_ne!(bb, dealer);
    assert_ne!(sb, bb);

    // Ход — первому после большого блайнда (в 3-макс это дилер).
    match flow {
        TurnFlow::TurnPassed { player_id } => assert_eq!(player_id, dealer),
        TurnFlow::HandFinished(_) => panic!("Раздача закончилась преждевременно"),
    }

    // Каждому сдано по две карты, борд сдан заранее.
    for player in h.game.active_unfolded() {
        assert_eq!(player.cards.len(), 2);
    }
    assert_eq!(h.game.community_cards.len(), 5);
    assert!(h.game.revealed_community().is_empty(), "Префлоп: борд закрыт");
}

/// Фолды до последнего игрока: победа без вскрытия, приз — весь банк,
/// описание руки пустое.
#[test]
fn folds_end_hand_without_showdown() {
    let mut h = Harness::new(&[(1, 11), (2, 22), (3, 33)], 20, 5);
    let mut flow = h.start();

    // Все, кому дают ход, фолдят.
    let mut guard = 0;
    let outcome = loop {
        match flow {
            TurnFlow::TurnPassed { player_id } => {
                flow = h.act(player_id, ActionKind::Fold);
            }
            TurnFlow::HandFinished(outcome) => break outcome,
        }
        guard += 1;
        assert!(guard < 10, "Фолды обязаны завершить раздачу");
    };

    assert_eq!(outcome.winners.len(), 1);
    let winner = &outcome.winners[0];
    assert_eq!(winner.prize, Chips(30), "Победителю достаются оба блайнда");
    assert!(winner.desc.is_empty(), "Бесспорная победа — без описания руки");
    assert!(outcome.busted.is_empty());

    assert_eq!(h.game.phase, HandPhase::Settled);
    assert!(h.game.ended_at.is_some());
    assert_eq!(h.total_chips(), 3_000, "Фишки не создаются и не сгорают");
}

/// Сохранение фишек на каждом шаге обычной улицы торговли.
#[test]
fn chips_conserved_through_betting() {
    let mut h = Harness::new(&[(1, 11), (2, 22), (3, 33)], 20, 9);
    let mut flow = h.start();

    let mut steps = 0;
    while steps < 6 {
        assert_eq!(h.total_chips(), 3_000, "Инвариант сохранения фишек");
        match flow {
            TurnFlow::TurnPassed { player_id } => {
                // После закрытия улицы ставки нет — чекаем.
                let kind = match steps {
                    2 => ActionKind::Raise(Chips(60)),
                    s if s >= 5 => ActionKind::Check,
                    _ => ActionKind::Call,
                };
                flow = h.act(player_id, kind);
            }
            TurnFlow::HandFinished(_) => break,
        }
        steps += 1;
    }
    assert_eq!(h.total_chips(), 3_000);
}

/// Все в олл-ине — мгновенное вскрытие с раскрытием всех улиц.
#[test]
fn all_in_everyone_triggers_instant_showdown() {
    let mut h = Harness::new(&[(1, 10), (2, 20)], 20, 11);
    let mut flow = h.start();

    let outcome = loop {
        match flow {
            TurnFlow::TurnPassed { player_id } => {
                flow = h.act(player_id, ActionKind::AllIn);
            }
            TurnFlow::HandFinished(outcome) => break outcome,
        }
    };

    assert_eq!(
        h.game.street,
        poker_room_engine::domain::hand::Street::River,
        "Мгновенное вскрытие докручивает улицы до ривера"
    );
    assert!(!outcome.winners.is_empty());

    // Либо сплит, либо один проигравший; фишки целы в любом случае.
    let prize_sum: u64 = outcome.winners.iter().map(|w| w.prize.0).sum();
    assert!(prize_sum <= 2_000);
    let stacks: u64 = h.game.players.iter().map(|p| p.stack.0).sum();
    assert_eq!(stacks, prize_sum, "После расчёта банки пусты, всё в стеках");
}

/// Нелегальное действие — тихий no-op: ни истории, ни смены хода.
#[test]
fn illegal_action_is_silent_noop() {
    let mut h = Harness::new(&[(1, 10), (2, 20)], 20, 13);
    let flow = h.start();
    let on_turn = match flow {
        TurnFlow::TurnPassed { player_id } => player_id,
        _ => panic!("Ожидали передачу хода"),
    };
    let off_turn = if on_turn == 10 { 20 } else { 10 };

    let history_before = h.history.last_id();
    let current_before = h.game.current_player_id;

    // Фолд вне очереди запрещён.
    let result = apply_action(
        &mut h.game,
        &mut h.history,
        &h.evaluator,
        &h.notifier,
        PlayerAction {
            player_id: off_turn,
            kind: ActionKind::Fold,
        },
        1_002,
    )
    .expect("Отказ не является ошибкой");
    assert!(matches!(result, ActionOutcome::Ignored));
    assert_eq!(h.history.last_id(), history_before, "История не тронута");
    assert_eq!(h.game.current_player_id, current_before, "Ход не сдвинулся");

    // Рейз ниже минимума — тоже no-op.
    let result = apply_action(
        &mut h.game,
        &mut h.history,
        &h.evaluator,
        &h.notifier,
        PlayerAction {
            player_id: on_turn,
            kind: ActionKind::Raise(Chips(1)),
        },
        1_003,
    )
    .unwrap();
    assert!(matches!(result, ActionOutcome::Ignored));
}

/// Карманные карты уходят лично игрокам, стол их не раскрывает.
#[test]
fn hole_cards_are_delivered_privately() {
    let notifier = RecordingNotifier::new();
    let mut game = make_game(&[(1, 10), (2, 20)], 20);
    let mut history = ActionHistory::new();
    let mut rng = DeterministicRng::from_seed_u64(17);
    let evaluator = HighCardEvaluator;

    start_game(&mut game, &mut history, &mut rng, &evaluator, &notifier, 1_000)
        .expect("start_game must succeed");

    let private = notifier.player_events();
    let hole_events: Vec<_> = private
        .iter()
        .filter(|(_, e)| matches!(e, poker_room_engine::api::events::RoomEvent::HoleCards(_)))
        .collect();
    assert_eq!(hole_events.len(), 2, "По одному событию на игрока");

    // В публичных снимках мест карты спрятаны.
    for (_, event) in notifier.game_events() {
        if let poker_room_engine::api::events::RoomEvent::SeatsUpdated { seats, .. } = event {
            for seat in seats.values().flatten() {
                assert!(seat.cards.is_empty(), "Карты не светятся в рассадке");
            }
        }
    }
}

/// Детерминированный RNG: одинаковый seed — одинаковая раздача.
#[test]
fn same_seed_same_deal() {
    let run = |seed: u64| {
        let mut h = Harness::new(&[(1, 10), (2, 20)], 20, seed);
        h.start();
        let mut cards: Vec<String> = h
            .game
            .players
            .iter()
            .flat_map(|p| p.cards.iter().map(|c| c.to_string()))
            .collect();
        cards.extend(h.game.community_cards.iter().map(|c| c.to_string()));
        (h.game.dealer_id, cards)
    };

    assert_eq!(run(99), run(99));
}
