//! Тесты эскалации блайндов: режимы TIME и ROUND, целочисленный
//! малый блайнд.

use poker_room_engine::domain::blinds::{big_blind, small_blind, BlindSchedule};
use poker_room_engine::domain::chips::Chips;

/// ROUND: при шаге в 5 раздач min_bet удваивается на старте пятой
/// от последнего повышения.
#[test]
fn round_mode_escalates_after_configured_hands() {
    let mut schedule = BlindSchedule::by_round(5, 2);
    let mut min_bet = Chips(20);

    for hand in 1..5 {
        assert_eq!(
            schedule.escalate(&mut min_bet, hand, 0),
            None,
            "До пятой раздачи блайнды не растут"
        );
        assert_eq!(min_bet, Chips(20));
    }

    assert_eq!(schedule.escalate(&mut min_bet, 5, 0), Some(Chips(40)));
    assert_eq!(min_bet, Chips(40));

    // Следующее повышение — ещё через пять раздач.
    for hand in 6..10 {
        assert_eq!(schedule.escalate(&mut min_bet, hand, 0), None);
    }
    assert_eq!(schedule.escalate(&mut min_bet, 10, 0), Some(Chips(80)));
}

/// TIME: повышение срабатывает, когда с прошлого прошло больше
/// интервала, и штампует время повышения.
#[test]
fn time_mode_escalates_after_interval() {
    let mut schedule = BlindSchedule::by_time(600, 2, 1_000);
    let mut min_bet = Chips(50);

    assert_eq!(schedule.escalate(&mut min_bet, 1, 1_500), None, "Рано");
    assert_eq!(schedule.escalate(&mut min_bet, 2, 1_601), Some(Chips(100)));

    // Отсчёт пошёл от нового штампа.
    assert_eq!(schedule.escalate(&mut min_bet, 3, 2_100), None);
    assert_eq!(schedule.escalate(&mut min_bet, 4, 2_202), Some(Chips(200)));
}

/// Режимы не пересекаются: ROUND игнорирует время, TIME — раздачи.
#[test]
fn modes_are_mutually_exclusive() {
    let mut by_round = BlindSchedule::by_round(3, 2);
    let mut min_bet = Chips(20);
    assert_eq!(by_round.escalate(&mut min_bet, 1, 999_999), None);

    let mut by_time = BlindSchedule::by_time(600, 2, 0);
    let mut min_bet2 = Chips(20);
    // Сколько бы раздач ни прошло, решает только время.
    assert_eq!(by_time.escalate(&mut min_bet2, 100, 100), None);

    let mut fixed = BlindSchedule::fixed();
    let mut min_bet3 = Chips(20);
    assert_eq!(fixed.escalate(&mut min_bet3, 100, 999_999), None);
}

/// Большой блайнд равен min_bet, малый — половина с усечением вниз.
#[test]
fn small_blind_truncates_odd_min_bet() {
    assert_eq!(big_blind(Chips(20)), Chips(20));
    assert_eq!(small_blind(Chips(20)), Chips(10));
    // Нечётный min_bet: половина округляется вниз, это документировано.
    assert_eq!(small_blind(Chips(25)), Chips(12));
    assert_eq!(small_blind(Chips(1)), Chips(0));
}
