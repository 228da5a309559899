//! Комната: маршрутизация входящих событий по акторам игр и
//! межстольная логика турниров.
//!
//! Сама комната ничьё игровое состояние не мутирует: она держит
//! адреса акторов, снимки столов (обновляются после каждого расчёта
//! раздачи) и турнирное лобби. Все решения балансировщика исполняются
//! сообщениями к акторам; переносимый игрок едет вместе со стеком.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::api::events::{InboundEvent, RoomEvent};
use crate::api::notifier::RoomNotifier;
use crate::domain::blinds::BlindSchedule;
use crate::domain::table::{Game, GameConfig, GameMode};
use crate::domain::tournament::{
    Tournament, TournamentConfig, TournamentError, TournamentWinner,
};
use crate::domain::{Chips, GameId, PlayerId, TournamentId};
use crate::infra::ids::IdGenerator;
use crate::infra::persistence::GameStore;
use crate::infra::rng::TableRng;
use crate::infra::rng_seed::RngSeed;
use crate::infra::scheduler::StartScheduler;
use crate::infra::settlement::{submit_with_retry, SettlementRequest};
use crate::runtime::actor::{GameActor, GameDeps, GameHandle, GameMessage, RoomConfig, RoomSignal};
use crate::tournament::balancer::{plan_balance, BalanceAction, GameSnapshot};
use crate::tournament::lobby::{child_table_count, TournamentLobby};
use crate::tournament::final_rankings;

/// Конфигурация кэш-стола.
#[derive(Clone, Debug)]
pub struct CashTableConfig {
    pub num_seats: u8,
    pub initial_stack: Chips,
    pub buy_in: Chips,
    pub min_bet: Chips,
    pub blinds: BlindSchedule,
    /// Детерминированные колоды (реплей/тесты). None = системный RNG.
    pub rng_seed: Option<RngSeed>,
}

struct RoomCore {
    ids: IdGenerator,
    games: HashMap<GameId, GameHandle>,
    snapshots: HashMap<GameId, GameSnapshot>,
    lobby: TournamentLobby,
    player_names: HashMap<PlayerId, String>,
}

impl RoomCore {
    fn siblings_of(&self, tournament: &Tournament) -> Vec<GameSnapshot> {
        tournament
            .child_games
            .iter()
            .filter_map(|id| self.snapshots.get(id))
            .cloned()
            .collect()
    }

    fn name_of(&self, player_id: PlayerId) -> String {
        self.player_names
            .get(&player_id)
            .cloned()
            .unwrap_or_else(|| format!("Player {player_id}"))
    }
}

/// Фасад комнаты.
pub struct Room {
    core: Arc<Mutex<RoomCore>>,
    deps: GameDeps,
    config: RoomConfig,
    scheduler: Arc<dyn StartScheduler>,
    signals_tx: mpsc::UnboundedSender<RoomSignal>,
}

impl Room {
    pub fn new(deps: GameDeps, config: RoomConfig, scheduler: Arc<dyn StartScheduler>) -> Self {
        let (signals_tx, signals_rx) = mpsc::unbounded_channel();
        let core = Arc::new(Mutex::new(RoomCore {
            ids: IdGenerator::new(),
            games: HashMap::new(),
            snapshots: HashMap::new(),
            lobby: TournamentLobby::new(),
            player_names: HashMap::new(),
        }));

        let room = Self {
            core: core.clone(),
            deps: deps.clone(),
            config,
            scheduler,
            signals_tx: signals_tx.clone(),
        };

        tokio::spawn(signal_loop(core, deps, signals_rx));
        room
    }

    /// Создать кэш-игру; возвращает её id.
    pub fn create_cash_game(&self, config: CashTableConfig) -> GameId {
        let mut core = self.core.lock();
        let game_id = core.ids.next_game_id();
        let game = Game::new(
            game_id,
            GameConfig {
                table_id: game_id,
                mode: GameMode::Cash,
                num_seats: config.num_seats,
                initial_stack: config.initial_stack,
                buy_in: config.buy_in,
                min_bet: config.min_bet,
                blinds: config.blinds,
            },
        );
        let rng = match config.rng_seed {
            Some(seed) => TableRng::seeded(seed),
            None => TableRng::system(),
        };
        let snapshot = GameSnapshot::from_game(&game);
        let handle = GameActor::spawn(
            game,
            rng,
            self.deps.clone(),
            self.config,
            self.signals_tx.clone(),
        );
        core.snapshots.insert(game_id, snapshot);
        core.games.insert(game_id, handle);
        info!(game_id, "cash game created");
        game_id
    }

    /// Создать турнир с дочерними столами и запланировать старт.
    pub fn create_tournament(
        &self,
        config: TournamentConfig,
    ) -> Result<TournamentId, TournamentError> {
        let start_at_ts = config.start_at_ts;
        let mut core = self.core.lock();
        let tournament_id = core.ids.next_tournament_id();
        let tournament = Tournament::new(tournament_id, config.clone())?;

        let mut child_games = Vec::new();
        for _ in 0..child_table_count(&config) {
            let game_id = core.ids.next_game_id();
            let game = Game::new(
                game_id,
                GameConfig {
                    table_id: tournament_id,
                    mode: GameMode::Tournament,
                    num_seats: config.table_seats,
                    initial_stack: config.initial_stack,
                    buy_in: config.buy_in,
                    min_bet: config.min_bet,
                    blinds: config.blinds.clone(),
                },
            );
            let snapshot = GameSnapshot::from_game(&game);
            let handle = GameActor::spawn(
                game,
                TableRng::system(),
                self.deps.clone(),
                self.config,
                self.signals_tx.clone(),
            );
            core.snapshots.insert(game_id, snapshot);
            core.games.insert(game_id, handle);
            child_games.push(game_id);
        }

        core.lobby.insert(tournament, child_games);
        info!(tournament_id, "tournament created");

        // Старт по расписанию — тоже сообщение, не прямой вызов.
        let signals = self.signals_tx.clone();
        self.scheduler.schedule(
            start_at_ts,
            Box::new(move || {
                let _ = signals.send(RoomSignal::StartTournament(tournament_id));
            }),
        );

        Ok(tournament_id)
    }

    /// Посадить игрока за кэш-стол. false = игры нет или место
    /// не нашлось (ошибка наружу не идёт, см. политику ошибок).
    pub fn sit_on_game(&self, game_id: GameId, player_id: PlayerId, name: &str) -> bool {
        let mut core = self.core.lock();
        match core.games.get(&game_id) {
            Some(handle) => {
                handle.send(GameMessage::SitPlayer {
                    player_id,
                    name: name.to_string(),
                });
                core.player_names.insert(player_id, name.to_string());
                true
            }
            None => false,
        }
    }

    /// Посадить игрока в турнир: стол выбирается лобби.
    pub fn sit_tournament(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
        name: &str,
    ) -> Option<GameId> {
        let mut core = self.core.lock();
        let table_seats = core.lobby.get(tournament_id)?.config.table_seats;
        match core.lobby.choose_seat(tournament_id, player_id, table_seats) {
            Ok(game_id) => {
                core.player_names.insert(player_id, name.to_string());
                if let Some(handle) = core.games.get(&game_id) {
                    handle.send(GameMessage::SitPlayer {
                        player_id,
                        name: name.to_string(),
                    });
                }
                Some(game_id)
            }
            Err(err) => {
                debug!(%err, "tournament seat refused");
                None
            }
        }
    }

    /// Входящее событие транспорта. Неизвестная игра — тихий дроп.
    pub fn dispatch(&self, game_id: GameId, event: InboundEvent) {
        let core = self.core.lock();
        if let Some(handle) = core.games.get(&game_id) {
            handle.send(GameMessage::Inbound(event));
        }
    }

    /// Ручной старт игры (dev-инструменты и тесты).
    pub fn start_game(&self, game_id: GameId) {
        let core = self.core.lock();
        if let Some(handle) = core.games.get(&game_id) {
            handle.send(GameMessage::StartGame);
        }
    }

    pub fn mark_afk(&self, game_id: GameId, player_id: PlayerId) {
        let core = self.core.lock();
        if let Some(handle) = core.games.get(&game_id) {
            handle.send(GameMessage::MarkAfk { player_id });
        }
    }

    pub fn rejoin_from_afk(&self, game_id: GameId, player_id: PlayerId) {
        let core = self.core.lock();
        if let Some(handle) = core.games.get(&game_id) {
            handle.send(GameMessage::RejoinFromAfk { player_id });
        }
    }

    /// Снимок стола (как его видела комната после последнего расчёта).
    pub fn snapshot(&self, game_id: GameId) -> Option<GameSnapshot> {
        self.core.lock().snapshots.get(&game_id).cloned()
    }

    /// Итог турнира, если он завершён.
    pub fn tournament_winners(&self, tournament_id: TournamentId) -> Vec<TournamentWinner> {
        self.core
            .lock()
            .lobby
            .get(tournament_id)
            .map(|t| t.winners.clone())
            .unwrap_or_default()
    }

    pub fn shutdown(&self) {
        let core = self.core.lock();
        for handle in core.games.values() {
            handle.send(GameMessage::Shutdown);
        }
    }
}

/// Задача комнаты: принимает сигналы акторов и планировщика.
async fn signal_loop(
    core: Arc<Mutex<RoomCore>>,
    deps: GameDeps,
    mut rx: mpsc::UnboundedReceiver<RoomSignal>,
) {
    while let Some(signal) = rx.recv().await {
        match signal {
            RoomSignal::SnapshotUpdated(snapshot) => {
                core.lock().snapshots.insert(snapshot.game_id, snapshot);
            }
            RoomSignal::StartTournament(tournament_id) => {
                let handles: Vec<GameHandle> = {
                    let mut core = core.lock();
                    core.lobby.mark_started(tournament_id);
                    let child_games = core
                        .lobby
                        .get(tournament_id)
                        .map(|t| t.child_games.clone())
                        .unwrap_or_default();
                    child_games
                        .iter()
                        .filter_map(|id| core.games.get(id))
                        .cloned()
                        .collect()
                };
                info!(tournament_id, "tournament started");
                for handle in &handles {
                    deps.notifier
                        .notify_game(handle.game_id, RoomEvent::ActiveTournamentUpdated);
                    handle.send(GameMessage::StartGame);
                }
            }
            RoomSignal::HandSettled { snapshot, outcome } => {
                handle_settled(&core, &deps, snapshot, outcome).await;
            }
        }
    }
}

/// Реакция комнаты на рассчитанную раздачу.
async fn handle_settled(
    core: &Arc<Mutex<RoomCore>>,
    deps: &GameDeps,
    snapshot: GameSnapshot,
    outcome: crate::engine::showdown::HandOutcome,
) {
    let game_id = snapshot.game_id;

    // Обновить снимок; кэш-столы дальше ведут себя сами.
    let plan = {
        let mut core = core.lock();
        core.snapshots.insert(game_id, snapshot.clone());

        if snapshot.mode != GameMode::Tournament {
            return;
        }

        let tournament_id = snapshot.table_id;
        core.lobby.record_eliminations(tournament_id, &outcome.busted);
        if !outcome.final_ranking.is_empty() {
            core.lobby
                .set_final_ranking(tournament_id, outcome.final_ranking.clone());
        }

        let siblings = core
            .lobby
            .get(tournament_id)
            .map(|t| core.siblings_of(t))
            .unwrap_or_default();
        plan_balance(&snapshot, &siblings)
    };

    match plan {
        None => {
            // Балансировать нечего — стол продолжает, если есть кому.
            if snapshot.active_count() > 1 {
                let handle = core.lock().games.get(&game_id).cloned();
                if let Some(handle) = handle {
                    handle.send(GameMessage::StartHand);
                }
            }
        }
        Some(BalanceAction::AbsorbInto { from, to }) => {
            migrate(core, from, to).await;
        }
        Some(BalanceAction::PullLoner { from, to }) => {
            migrate(core, from, to).await;
            // Принявший стол доигрывает свою раздачу либо стартует
            // новую сам (актор проверяет это при посадке мигрантов).
        }
        Some(BalanceAction::FinishTournament) => {
            finish_tournament(core, deps, &snapshot).await;
        }
    }
}

/// Перенести всех выживших игроков стола `from` на стол `to`.
/// Стол `from` закрывается; стеки едут без изменений.
async fn migrate(core: &Arc<Mutex<RoomCore>>, from: GameId, to: GameId) {
    let (from_handle, to_handle) = {
        let core = core.lock();
        (
            core.games.get(&from).cloned(),
            core.games.get(&to).cloned(),
        )
    };
    let (from_handle, to_handle) = match (from_handle, to_handle) {
        (Some(f), Some(t)) => (f, t),
        _ => {
            warn!(from, to, "migration skipped: unknown game");
            return;
        }
    };

    let (reply_tx, reply_rx) = oneshot::channel();
    from_handle.send(GameMessage::ExtractForMerge {
        to_game: to,
        reply: reply_tx,
    });

    let movers = match reply_rx.await {
        Ok(movers) => movers,
        Err(_) => {
            warn!(from, "extract reply dropped");
            return;
        }
    };

    info!(from, to, movers = movers.len(), "tournament tables merged");

    {
        let mut core = core.lock();
        if let Some(snap) = core.snapshots.get_mut(&from) {
            snap.ended = true;
            snap.active_players.clear();
        }
    }

    to_handle.send(GameMessage::TakeMigrants { players: movers });
}

/// Турнир закончился: ранжирование, фиксация победителей,
/// пропорциональные выплаты, уведомления.
async fn finish_tournament(
    core: &Arc<Mutex<RoomCore>>,
    deps: &GameDeps,
    snapshot: &GameSnapshot,
) {
    let tournament_id = snapshot.table_id;

    let (winners, final_game_handle) = {
        let mut core_guard = core.lock();
        let tournament = match core_guard.lobby.get(tournament_id) {
            Some(t) => t.clone(),
            None => return,
        };
        if tournament.is_ended() {
            return;
        }

        let ranked = final_rankings(
            core_guard.lobby.final_ranking(tournament_id),
            &tournament.eliminations,
            tournament.config.reward_plan.len(),
        );
        let pool = tournament.prize_pool();
        let winners: Vec<TournamentWinner> = ranked
            .iter()
            .enumerate()
            .map(|(i, player_id)| TournamentWinner {
                player_id: *player_id,
                name: core_guard.name_of(*player_id),
                rank: i as u32 + 1,
                reward: tournament.config.reward_plan[i].of(pool),
            })
            .collect();

        core_guard.lobby.finish(tournament_id, winners.clone());
        let handle = core_guard.games.get(&snapshot.game_id).cloned();

        if let Some(t) = core_guard.lobby.get(tournament_id) {
            if let Err(err) = deps.store.save_tournament(t) {
                warn!(%err, "tournament save failed");
            }
        }
        (winners, handle)
    };

    info!(tournament_id, winners = winners.len(), "tournament finished");

    submit_with_retry(
        deps.settlement.clone(),
        deps.retry,
        SettlementRequest::TournamentPayout {
            tournament_id,
            winners: winners.clone(),
        },
    );

    deps.notifier.notify_game(
        snapshot.game_id,
        RoomEvent::NotifyTournamentWinners(winners),
    );
    deps.notifier
        .notify_game(snapshot.game_id, RoomEvent::ActiveTournamentUpdated);

    if let Some(handle) = final_game_handle {
        handle.send(GameMessage::Shutdown);
    }
}
