//! Тесты турнирного слоя: план балансировки, итоговое ранжирование,
//! план наград, лобби.

use poker_room_engine::domain::blinds::BlindSchedule;
use poker_room_engine::domain::chips::Chips;
use poker_room_engine::domain::table::GameMode;
use poker_room_engine::domain::tournament::{
    RewardShare, Tournament, TournamentConfig, TournamentError,
};
use poker_room_engine::tournament::balancer::{
    final_rankings, plan_balance, BalanceAction, GameSnapshot, PlayerBrief,
};
use poker_room_engine::tournament::lobby::{child_table_count, TournamentLobby};

fn snapshot(game_id: u64, num_seats: u8, ended: bool, players: &[(u64, u64)]) -> GameSnapshot {
    GameSnapshot {
        game_id,
        table_id: 100,
        mode: GameMode::Tournament,
        num_seats,
        started: true,
        ended,
        active_players: players
            .iter()
            .enumerate()
            .map(|(i, (id, stack))| PlayerBrief {
                id: *id,
                seat_id: i as u8 + 1,
                stack: Chips(*stack),
            })
            .collect(),
    }
}

fn base_config() -> TournamentConfig {
    TournamentConfig {
        name: "Nightly 9-max".into(),
        total_seats: 18,
        table_seats: 9,
        initial_stack: Chips(1_000),
        buy_in: Chips(100),
        min_bet: Chips(20),
        blinds: BlindSchedule::by_round(5, 2),
        reward_plan: vec![
            RewardShare { bps: 5_000 },
            RewardShare { bps: 3_000 },
            RewardShare { bps: 2_000 },
        ],
        start_at_ts: 0,
    }
}

// -----------------------------------------------------------------------------
// План балансировки
// -----------------------------------------------------------------------------

/// Выжившие целиком влезают в свободные места соседа — стол
/// растворяется.
#[test]
fn absorb_when_survivors_fit_sibling() {
    let settled = snapshot(1, 9, false, &[(1, 500), (2, 700)]);
    let sibling = snapshot(2, 9, false, &[(3, 100), (4, 100), (5, 100)]);

    let plan = plan_balance(&settled, &[sibling]);
    assert_eq!(plan, Some(BalanceAction::AbsorbInto { from: 1, to: 2 }));
}

/// Сосед с одним игроком: одиночку забирают на стол, где есть место.
/// Это сценарий "таблица X с одним активным игроком, у Y есть место".
#[test]
fn loner_is_pulled_into_settled_table() {
    // Наш стол полон жизни, но есть пустые места.
    let settled = snapshot(
        1,
        9,
        false,
        &[(1, 300), (2, 300), (3, 300), (4, 300), (5, 300)],
    );
    let loner_table = snapshot(2, 9, false, &[(9, 450)]);

    let plan = plan_balance(&settled, &[loner_table]);
    assert_eq!(plan, Some(BalanceAction::PullLoner { from: 2, to: 1 }));
}

/// Полный стол балансировать нечем.
#[test]
fn full_table_never_balances() {
    let settled = snapshot(1, 3, false, &[(1, 100), (2, 100), (3, 100)]);
    let loner_table = snapshot(2, 3, false, &[(9, 450)]);
    assert_eq!(plan_balance(&settled, &[loner_table]), None);
}

/// Последний стол с одним игроком при закрытых соседях — турнир
/// завершён.
#[test]
fn tournament_finishes_when_one_remains() {
    let settled = snapshot(1, 9, false, &[(1, 1_800)]);
    let ended_sibling = snapshot(2, 9, true, &[]);

    let plan = plan_balance(&settled, &[ended_sibling]);
    assert_eq!(plan, Some(BalanceAction::FinishTournament));

    // Пока жив другой стол — не завершаем и не поглощаем (у соседа
    // должно быть больше одного игрока, чтобы принимать гостей).
    let alive_sibling = snapshot(2, 9, false, &[(3, 100), (4, 100)]);
    let plan = plan_balance(&settled, &[alive_sibling]);
    assert_eq!(
        plan,
        Some(BalanceAction::AbsorbInto { from: 1, to: 2 }),
        "Одинокий игрок уезжает к живому соседу"
    );
}

/// Абсорбция не выбирает закрытые и переполненные столы.
#[test]
fn absorb_skips_ended_and_crowded_siblings() {
    let settled = snapshot(1, 9, false, &[(1, 100), (2, 100), (3, 100)]);
    let ended = snapshot(2, 9, true, &[]);
    let crowded = snapshot(3, 3, false, &[(4, 100), (5, 100)]);

    // У crowded всего одно свободное место, наших трое.
    assert_eq!(plan_balance(&settled, &[ended, crowded]), None);
}

// -----------------------------------------------------------------------------
// Ранжирование и награды
// -----------------------------------------------------------------------------

/// Финальный стол первым, затем вылетевшие от свежих к ранним,
/// без дублей, не длиннее плана.
#[test]
fn final_rankings_merge_table_and_eliminations() {
    let final_table = vec![7, 5];
    let eliminations = vec![2, 3, 4, 5]; // 5 вылетал, но дошёл до финала

    let ranking = final_rankings(&final_table, &eliminations, 4);
    assert_eq!(ranking, vec![7, 5, 4, 3]);

    let short = final_rankings(&final_table, &eliminations, 2);
    assert_eq!(short, vec![7, 5]);
}

/// Доли плана наград: базисные пункты от фонда, усечение вниз.
#[test]
fn reward_share_math() {
    let pool = Chips(1_001);
    assert_eq!(RewardShare { bps: 5_000 }.of(pool), Chips(500));
    assert_eq!(RewardShare { bps: 3_000 }.of(pool), Chips(300));
    assert_eq!(RewardShare { bps: 10_000 }.of(pool), Chips(1_001));
}

/// Призовой фонд — бай-ин с каждого реально севшего.
#[test]
fn prize_pool_follows_entrants() {
    let mut tournament = Tournament::new(1, base_config()).unwrap();
    tournament.entrants = 7;
    assert_eq!(tournament.prize_pool(), Chips(700));
}

// -----------------------------------------------------------------------------
// Лобби
// -----------------------------------------------------------------------------

#[test]
fn config_validation_rejects_bad_plans() {
    let mut config = base_config();
    config.reward_plan = vec![RewardShare { bps: 9_000 }, RewardShare { bps: 2_000 }];
    assert!(matches!(
        Tournament::new(1, config),
        Err(TournamentError::InvalidConfig(_))
    ));

    let mut config = base_config();
    config.table_seats = 1;
    assert!(Tournament::new(1, config).is_err());

    let mut config = base_config();
    config.total_seats = 5; // меньше одного стола
    assert!(Tournament::new(1, config).is_err());
}

#[test]
fn child_table_count_rounds_up() {
    let mut config = base_config();
    config.total_seats = 18;
    config.table_seats = 9;
    assert_eq!(child_table_count(&config), 2);

    config.total_seats = 19;
    assert_eq!(child_table_count(&config), 3);
}

/// Рассадка лобби: по одному месту на игрока, переполнение — отказ.
#[test]
fn lobby_seats_players_once_until_full() {
    let mut lobby = TournamentLobby::new();
    let mut config = base_config();
    config.total_seats = 4;
    config.table_seats = 2;
    let tournament = Tournament::new(1, config).unwrap();
    lobby.insert(tournament, vec![10, 11]);

    // Первый стол наполняется первым.
    assert_eq!(lobby.choose_seat(1, 100, 2).unwrap(), 10);
    assert_eq!(lobby.choose_seat(1, 101, 2).unwrap(), 10);
    assert_eq!(lobby.choose_seat(1, 102, 2).unwrap(), 11);

    // Дважды сесть нельзя.
    assert!(matches!(
        lobby.choose_seat(1, 100, 2),
        Err(TournamentError::AlreadySeated { .. })
    ));

    assert_eq!(lobby.choose_seat(1, 103, 2).unwrap(), 11);
    assert!(matches!(
        lobby.choose_seat(1, 104, 2),
        Err(TournamentError::TournamentFull { .. })
    ));

    assert_eq!(lobby.get(1).unwrap().entrants, 4);
}

/// Журнал вылетов не дублируется и сохраняет порядок.
#[test]
fn eliminations_are_recorded_in_order() {
    let mut lobby = TournamentLobby::new();
    lobby.insert(Tournament::new(1, base_config()).unwrap(), vec![10, 11]);

    lobby.record_eliminations(1, &[5]);
    lobby.record_eliminations(1, &[6, 5]);
    lobby.record_eliminations(1, &[7]);

    assert_eq!(lobby.get(1).unwrap().eliminations, vec![5, 6, 7]);
}
