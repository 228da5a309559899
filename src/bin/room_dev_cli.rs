// src/bin/room_dev_cli.rs
//
// Dev-прогон комнаты: кэш-стол на троих ботов, детерминированная
// колода, простые действия по кругу. Удобно смотреть журнал событий
// и выплаты, не поднимая транспорт.

use std::sync::Arc;
use std::time::Duration;

use poker_room_engine::api::events::{InboundEvent, InboundKind};
use poker_room_engine::api::notifier::NullNotifier;
use poker_room_engine::domain::blinds::BlindSchedule;
use poker_room_engine::domain::chips::Chips;
use poker_room_engine::eval::HighCardEvaluator;
use poker_room_engine::infra::persistence::{GameStore, InMemoryStore};
use poker_room_engine::infra::rng_seed::RngSeed;
use poker_room_engine::infra::scheduler::TokioScheduler;
use poker_room_engine::infra::settlement::{LoggingSettlement, RetryPolicy};
use poker_room_engine::runtime::{CashTableConfig, GameDeps, Room, RoomConfig};

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    println!("=== ROOM DEV CLI ===\n");

    let store = Arc::new(InMemoryStore::new());
    let deps = GameDeps {
        store: store.clone(),
        settlement: Arc::new(LoggingSettlement),
        notifier: Arc::new(NullNotifier),
        evaluator: Arc::new(HighCardEvaluator),
        retry: RetryPolicy::default(),
    };
    let config = RoomConfig {
        auto_fold: Duration::from_secs(5),
        auto_start: Duration::from_secs(2),
    };
    let room = Room::new(deps, config, Arc::new(TokioScheduler));

    let game_id = room.create_cash_game(CashTableConfig {
        num_seats: 6,
        initial_stack: Chips(1_000),
        buy_in: Chips(100),
        min_bet: Chips(20),
        blinds: BlindSchedule::by_round(5, 2),
        rng_seed: Some(RngSeed::from_u64(42)),
    });

    for (player_id, name) in [(1, "alice"), (2, "bob"), (3, "carol")] {
        room.sit_on_game(game_id, player_id, name);
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    room.start_game(game_id);
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Несколько кругов простых действий: все просто отвечают на
    // ставку, изредка кто-то коротко рейзит.
    for round in 0..40u32 {
        for player_id in 1..=3u64 {
            let kind = if round % 7 == 0 {
                InboundKind::Raise(Chips(40))
            } else if round % 3 == 0 {
                InboundKind::Check
            } else {
                InboundKind::Call
            };
            room.dispatch(game_id, InboundEvent { player_id, kind });
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    tokio::time::sleep(Duration::from_millis(300)).await;

    if let Some(game) = store.load_game(game_id) {
        println!("game #{game_id}: hand {}, street {:?}", game.hand, game.street);
        for player in game.active_players() {
            println!(
                "  seat {} | player {} | stack {}",
                player.seat_id, player.id, player.stack
            );
        }
        println!("  actions recorded: {}", store.actions_for(game_id).len());
    }

    room.shutdown();
    println!("\n=== ROOM DEV CLI DONE ===");
}
