//! Тесты правил легальности действий.
//!
//! Предикаты чистые, поэтому стол собирается вручную, без рантайма.

use poker_room_engine::domain::blinds::BlindSchedule;
use poker_room_engine::domain::chips::Chips;
use poker_room_engine::domain::player::Player;
use poker_room_engine::domain::table::{Game, GameConfig, GameMode};
use poker_room_engine::domain::{PlayerId, SeatId};
use poker_room_engine::engine::validation::{
    allowed_actions, all_can_only_check, call_amount, can_all_in, can_call, can_check, can_fold,
    can_only_check, can_raise, is_street_over, min_raise,
};

/// Стол с игроками (seat, stack) и идущей раздачей.
fn game_with(stacks: &[(SeatId, u64)]) -> Game {
    let mut game = Game::new(
        7,
        GameConfig {
            table_id: 7,
            mode: GameMode::Cash,
            num_seats: 6,
            initial_stack: Chips(1_000),
            buy_in: Chips(100),
            min_bet: Chips(20),
            blinds: BlindSchedule::fixed(),
        },
    );
    for (seat, stack) in stacks {
        let id = *seat as PlayerId;
        game.players.push(Player::new(id, format!("p{id}"), *seat, Chips(*stack)));
    }
    game.started_at = Some(1);
    game
}

fn refs(game: &Game) -> Vec<&Player> {
    game.active_unfolded()
}

#[test]
fn check_requires_matched_bet_or_all_in() {
    let mut game = game_with(&[(1, 500), (2, 500)]);
    game.bet = Chips(40);

    game.player_mut(1).unwrap().bet = Chips(40);
    assert!(can_check(game.player(1).unwrap(), &game));

    game.player_mut(2).unwrap().bet = Chips(10);
    assert!(!can_check(game.player(2).unwrap(), &game));

    // Олл-ин может "чекать", даже не уравняв ставку.
    game.player_mut(2).unwrap().stack = Chips::ZERO;
    assert!(can_check(game.player(2).unwrap(), &game));
}

#[test]
fn call_needs_outstanding_bet_and_live_opponent() {
    let mut game = game_with(&[(1, 500), (2, 500)]);

    // Нет ставки — нечего уравнивать.
    assert!(!can_call(game.player(1).unwrap(), &game, &refs(&game)));

    game.bet = Chips(60);
    game.player_mut(2).unwrap().bet = Chips(60);
    assert!(can_call(game.player(1).unwrap(), &game, &refs(&game)));
    assert_eq!(call_amount(game.player(1).unwrap(), &game), Chips(60));

    // Доплата не больше стека.
    game.player_mut(1).unwrap().stack = Chips(25);
    assert_eq!(call_amount(game.player(1).unwrap(), &game), Chips(25));

    // Уже уравнял — колла нет.
    let game2 = {
        let mut g = game_with(&[(1, 500), (2, 500)]);
        g.bet = Chips(60);
        g.player_mut(1).unwrap().bet = Chips(60);
        g
    };
    assert!(!can_call(game2.player(1).unwrap(), &game2, &refs(&game2)));
}

#[test]
fn call_is_refused_when_no_opponent_holds_chips() {
    let mut game = game_with(&[(1, 500), (2, 0)]);
    game.bet = Chips(40);
    game.player_mut(2).unwrap().bet = Chips::ZERO;

    // Второй игрок без стека и без ставки: фишек в игре у него нет.
    assert!(!can_call(game.player(1).unwrap(), &game, &refs(&game)));

    // Но фишки в ставке всё ещё считаются "в игре".
    game.player_mut(2).unwrap().bet = Chips(40);
    assert!(can_call(game.player(1).unwrap(), &game, &refs(&game)));
}

#[test]
fn min_raise_is_call_plus_big_blind_capped_by_stack() {
    let mut game = game_with(&[(1, 500), (2, 500)]);
    game.bet = Chips(60);

    // Доплата 60 + блайнд 20.
    assert_eq!(min_raise(game.player(1).unwrap(), &game), Chips(80));

    game.player_mut(1).unwrap().stack = Chips(70);
    assert_eq!(min_raise(game.player(1).unwrap(), &game), Chips(70));
}

#[test]
fn raise_respects_min_and_stack_bounds() {
    let mut game = game_with(&[(1, 500), (2, 500)]);
    game.bet = Chips(40);

    let players = refs(&game);
    let p1 = game.player(1).unwrap();
    assert!(can_raise(p1, &game, &players, None), "Минимальный рейз легален");
    assert!(!can_raise(p1, &game, &players, Some(Chips(30))), "Ниже минимума");
    assert!(can_raise(p1, &game, &players, Some(Chips(500))), "Весь стек");
    assert!(
        !can_raise(p1, &game, &players, Some(Chips(501))),
        "Выше стека внешних кэпов нет, но свой стек — предел"
    );
}

#[test]
fn fold_and_all_in_require_turn() {
    let mut game = game_with(&[(1, 500), (2, 500)]);
    game.bet = Chips(40);

    game.current_player_id = Some(2);
    assert!(!can_fold(game.player(1).unwrap(), &game));
    assert!(!can_all_in(game.player(1).unwrap(), &game, &refs(&game)));

    game.current_player_id = Some(1);
    assert!(can_fold(game.player(1).unwrap(), &game));
    assert!(can_all_in(game.player(1).unwrap(), &game, &refs(&game)));
}

#[test]
fn folded_player_can_do_nothing() {
    let mut game = game_with(&[(1, 500), (2, 500)]);
    game.bet = Chips(40);
    game.current_player_id = Some(1);
    game.player_mut(1).unwrap().folded = true;

    let players = refs(&game);
    let p1 = game.player(1).unwrap();
    assert!(!can_check(p1, &game));
    assert!(!can_call(p1, &game, &players));
    assert!(!can_raise(p1, &game, &players, None));
    assert!(!can_fold(p1, &game));
    assert!(!can_all_in(p1, &game, &players));
}

#[test]
fn only_check_detection() {
    // Оба в олл-ине: всем остался только чек.
    let mut game = game_with(&[(1, 0), (2, 0)]);
    game.bet = Chips::ZERO;
    let players = refs(&game);
    assert!(can_only_check(game.player(1).unwrap(), &game, &players));
    assert!(all_can_only_check(&game, &players));

    // Единственный игрок с фишками ставить не может: отвечать некому.
    let game2 = game_with(&[(1, 0), (2, 300)]);
    let players2 = refs(&game2);
    assert!(can_only_check(game2.player(2).unwrap(), &game2, &players2));
    assert!(all_can_only_check(&game2, &players2));

    // Двое с фишками — рейз снова в меню, заморозки нет.
    let game3 = game_with(&[(1, 0), (2, 300), (3, 300)]);
    let players3 = refs(&game3);
    assert!(can_only_check(game3.player(1).unwrap(), &game3, &players3));
    assert!(!can_only_check(game3.player(2).unwrap(), &game3, &players3));
    assert!(!all_can_only_check(&game3, &players3));
}

#[test]
fn street_over_needs_everyone_acted_and_matched() {
    use poker_room_engine::engine::actions::Action;

    let mut game = game_with(&[(1, 500), (2, 500)]);
    game.bet = Chips(40);

    // Никто не ходил.
    assert!(!is_street_over(&refs(&game), &game));

    game.player_mut(1).unwrap().bet = Chips(40);
    game.player_mut(1).unwrap().last_action = Some(Action::Raise);
    game.player_mut(2).unwrap().bet = Chips(40);
    game.player_mut(2).unwrap().last_action = Some(Action::Call);
    assert!(is_street_over(&refs(&game), &game));

    // Недобранная ставка при живом стеке держит улицу открытой.
    game.player_mut(2).unwrap().bet = Chips(10);
    assert!(!is_street_over(&refs(&game), &game));

    // Но олл-ин с недобором улицу не держит.
    game.player_mut(2).unwrap().stack = Chips::ZERO;
    assert!(is_street_over(&refs(&game), &game));
}

#[test]
fn allowed_actions_carries_params() {
    let mut game = game_with(&[(1, 500), (2, 500)]);
    game.bet = Chips(60);
    game.current_player_id = Some(1);

    let players = refs(&game);
    let allowed = allowed_actions(game.player(1).unwrap(), &game, &players);

    assert!(allowed.can_call);
    assert!(allowed.can_raise);
    assert!(allowed.can_fold);
    assert!(allowed.can_all_in);
    assert!(!allowed.can_check);
    assert_eq!(allowed.params.call_amount, Chips(60));
    assert_eq!(allowed.params.min_raise, Chips(80));
    assert_eq!(allowed.params.max_bet, Chips(500));
}

// -----------------------------------------------------------------------------
// Порядок ходов и ротация дилера
// -----------------------------------------------------------------------------

mod turn_order {
    use super::game_with;
    use poker_room_engine::engine::positions::{choose_dealer, next_player, turn_ring};
    use poker_room_engine::infra::rng::DeterministicRng;

    /// Кольцо строго по возрастанию мест, перенос через край ровно
    /// один раз за полный круг.
    #[test]
    fn next_player_cycles_ascending_and_wraps_once() {
        let game = game_with(&[(2, 100), (5, 100), (3, 100)]);
        let ring = turn_ring(&game, None);
        assert_eq!(ring, vec![2, 3, 5], "Кольцо отсортировано по местам");

        assert_eq!(next_player(&ring, Some(2)), Some(3));
        assert_eq!(next_player(&ring, Some(3)), Some(5));
        assert_eq!(next_player(&ring, Some(5)), Some(2), "Перенос через край");
        assert_eq!(next_player(&ring, None), Some(2));
    }

    /// Сфолдившие выпадают из кольца, но текущий игрок остаётся
    /// точкой отсчёта, даже если сам сфолдил.
    #[test]
    fn ring_skips_folded_but_keeps_current_as_anchor() {
        let mut game = game_with(&[(1, 100), (2, 100), (3, 100)]);
        game.player_mut(2).unwrap().folded = true;

        assert_eq!(turn_ring(&game, None), vec![1, 3]);
        // От сфолдившего второго считается следующий.
        let with_anchor = turn_ring(&game, Some(2));
        assert_eq!(with_anchor, vec![1, 2, 3]);
        assert_eq!(next_player(&with_anchor, Some(2)), Some(3));
    }

    /// Кнопка переходит к следующему по кольцу; если прошлый дилер
    /// выбыл — к первому живому игроку со старшим местом.
    #[test]
    fn dealer_rotation_survives_departed_dealer() {
        let mut game = game_with(&[(1, 100), (2, 100), (3, 100)]);
        game.hand = 2;
        let mut rng = DeterministicRng::from_seed_u64(1);

        assert_eq!(choose_dealer(&game, &mut rng, Some(1)), Some(2));
        assert_eq!(choose_dealer(&game, &mut rng, Some(3)), Some(1));

        // Дилер с места 2 выбыл: кнопка уходит на место 3.
        game.player_mut(2).unwrap().active = false;
        assert_eq!(choose_dealer(&game, &mut rng, Some(2)), Some(3));

        // Выбыл дилер с последнего места — перенос на первое.
        game.player_mut(2).unwrap().active = true;
        game.player_mut(3).unwrap().active = false;
        assert_eq!(choose_dealer(&game, &mut rng, Some(3)), Some(1));
    }

    /// Первая раздача: дилер выбирается среди живых игроков.
    #[test]
    fn first_hand_dealer_is_one_of_active_players() {
        let mut game = game_with(&[(1, 100), (2, 100), (3, 100)]);
        game.hand = 1;
        let mut rng = DeterministicRng::from_seed_u64(42);
        let dealer = choose_dealer(&game, &mut rng, None).unwrap();
        assert!([1, 2, 3].contains(&dealer));
    }
}
