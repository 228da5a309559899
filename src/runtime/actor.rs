//! Актор одной игры.
//!
//! Вся мутация `Game` происходит здесь, в последовательном цикле
//! обработки сообщений: валидация, применение и запись в хранилище —
//! одна атомарная единица на сообщение, без await-точек посередине.
//! Медленные внешние вызовы (расчёты) уходят в отдельные задачи и
//! никогда не тормозят ход стола. Когда игра достигает терминального
//! `ended`, оставшиеся сообщения дренируются как no-op.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info_span, warn};

use crate::api::dto::seat_map;
use crate::api::events::{InboundEvent, RoomEvent};
use crate::api::notifier::RoomNotifier;
use crate::domain::player::Player;
use crate::domain::table::{Game, GameMode};
use crate::domain::{Chips, GameId, PlayerId};
use crate::engine::actions::{Action, ActionKind, PlayerAction};
use crate::engine::game_loop::{self, ActionOutcome, TurnFlow};
use crate::engine::hand_history::ActionHistory;
use crate::engine::showdown::HandOutcome;
use crate::eval::HandEvaluator;
use crate::infra::persistence::GameStore;
use crate::infra::rng::TableRng;
use crate::infra::scheduler::now_ts;
use crate::infra::settlement::{
    submit_with_retry, RetryPolicy, Settlement, SettlementRequest,
};
use crate::tournament::balancer::GameSnapshot;

/// Тайминги комнаты.
#[derive(Clone, Copy, Debug)]
pub struct RoomConfig {
    /// Сколько ждать хода до авто-фолда.
    pub auto_fold: Duration,
    /// Пауза перед авто-стартом недоукомплектованной игры.
    pub auto_start: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            auto_fold: Duration::from_secs(30),
            auto_start: Duration::from_secs(300),
        }
    }
}

/// Сообщения в очередь игры.
#[derive(Debug)]
pub enum GameMessage {
    /// Событие транспорта (действие игрока или уход).
    Inbound(InboundEvent),
    /// Посадить игрока (место выберет стол).
    SitPlayer { player_id: PlayerId, name: String },
    /// Игрок отвалился: авто-фолд каждой раздачи до возвращения.
    MarkAfk { player_id: PlayerId },
    /// Возвращение AFK-игрока в игру.
    RejoinFromAfk { player_id: PlayerId },
    /// Стартовать игру (первая раздача).
    StartGame,
    /// Стартовать следующую раздачу (команда роутера).
    StartHand,
    /// Проба авто-старта: если состав не изменился и игра так и не
    /// стартовала — стартуем сами.
    StartIfIdle { active_count: usize },
    /// Сработал таймер хода: если с момента взвода не было ни одного
    /// нового действия — фолдим держателя хода.
    TurnTimeout { player_id: PlayerId, history_id: u64 },
    /// Забрать всех выживших для пересадки (стол закрывается).
    ExtractForMerge {
        to_game: GameId,
        reply: oneshot::Sender<Vec<Player>>,
    },
    /// Принять пересаженных игроков (приезжают сфолженными).
    TakeMigrants { players: Vec<Player> },
    Shutdown,
}

/// Сигналы актора наверх, в задачу комнаты.
#[derive(Debug)]
pub enum RoomSignal {
    /// Раздача рассчитана: свежий снимок стола и итог.
    HandSettled {
        snapshot: GameSnapshot,
        outcome: HandOutcome,
    },
    /// Плановый старт турнира (из планировщика).
    StartTournament(crate::domain::TournamentId),
    /// Свежий снимок стола (рассадка/старт/пересадка) — для решений
    /// балансировщика комнате нужна актуальная занятость.
    SnapshotUpdated(GameSnapshot),
}

/// Внешние зависимости актора.
#[derive(Clone)]
pub struct GameDeps {
    pub store: Arc<dyn GameStore>,
    pub settlement: Arc<dyn Settlement>,
    pub notifier: Arc<dyn RoomNotifier>,
    pub evaluator: Arc<dyn HandEvaluator>,
    pub retry: RetryPolicy,
}

/// Адрес актора.
#[derive(Clone, Debug)]
pub struct GameHandle {
    pub game_id: GameId,
    tx: mpsc::UnboundedSender<GameMessage>,
}

impl GameHandle {
    pub fn send(&self, msg: GameMessage) {
        // Закрытая очередь = актор уже остановлен; сообщение дропается.
        let _ = self.tx.send(msg);
    }
}

pub struct GameActor {
    game: Game,
    history: ActionHistory,
    rng: TableRng,
    deps: GameDeps,
    config: RoomConfig,
    signals: mpsc::UnboundedSender<RoomSignal>,
    self_tx: mpsc::UnboundedSender<GameMessage>,
    rx: mpsc::UnboundedReceiver<GameMessage>,
    persisted_actions: usize,
}

impl GameActor {
    /// Запустить актора; возвращает его адрес.
    pub fn spawn(
        game: Game,
        rng: TableRng,
        deps: GameDeps,
        config: RoomConfig,
        signals: mpsc::UnboundedSender<RoomSignal>,
    ) -> GameHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = GameHandle {
            game_id: game.id,
            tx: tx.clone(),
        };
        let actor = GameActor {
            game,
            history: ActionHistory::new(),
            rng,
            deps,
            config,
            signals,
            self_tx: tx,
            rx,
            persisted_actions: 0,
        };
        tokio::spawn(actor.run());
        handle
    }

    async fn run(mut self) {
        let span = info_span!("game", game_id = self.game.id);

        while let Some(msg) = self.rx.recv().await {
            // Спан входит на обработку одного сообщения и не живёт
            // через await-точки.
            let _guard = span.enter();
            if self.game.ended {
                // Терминальное состояние: всё, кроме Shutdown, — no-op.
                if matches!(msg, GameMessage::Shutdown) {
                    break;
                }
                debug!(?msg, "dropping message for ended game");
                continue;
            }
            if self.handle(msg) {
                break;
            }
        }
    }

    /// Обработать одно сообщение. true = остановить актора.
    fn handle(&mut self, msg: GameMessage) -> bool {
        match msg {
            GameMessage::Inbound(event) => self.on_inbound(event),
            GameMessage::SitPlayer { player_id, name } => self.on_sit(player_id, name),
            GameMessage::MarkAfk { player_id } => self.on_mark_afk(player_id),
            GameMessage::RejoinFromAfk { player_id } => self.on_rejoin(player_id),
            GameMessage::StartGame => self.on_start_game(),
            GameMessage::StartHand => self.on_start_hand(),
            GameMessage::StartIfIdle { active_count } => self.on_start_if_idle(active_count),
            GameMessage::TurnTimeout {
                player_id,
                history_id,
            } => self.on_turn_timeout(player_id, history_id),
            GameMessage::ExtractForMerge { to_game, reply } => {
                self.on_extract(to_game, reply);
            }
            GameMessage::TakeMigrants { players } => self.on_take_migrants(players),
            GameMessage::Shutdown => return true,
        }
        false
    }

    fn on_inbound(&mut self, event: InboundEvent) {
        match event.kind.as_action() {
            Some(kind) => self.apply(PlayerAction {
                player_id: event.player_id,
                kind,
            }),
            None => self.on_leave(event.player_id),
        }
    }

    fn apply(&mut self, action: PlayerAction) {
        let result = game_loop::apply_action(
            &mut self.game,
            &mut self.history,
            self.deps.evaluator.as_ref(),
            self.deps.notifier.as_ref(),
            action,
            now_ts(),
        );
        match result {
            Ok(ActionOutcome::Ignored) => {
                // Тихий no-op: ни истории, ни смены хода.
                debug!(player = action.player_id, "action rejected");
            }
            Ok(ActionOutcome::Applied(flow)) => {
                self.persist();
                self.follow(flow);
            }
            Err(err) => debug!(%err, "action refused"),
        }
    }

    fn on_leave(&mut self, player_id: PlayerId) {
        let before_start = self.game.started_at.is_none();
        let result = game_loop::leave_player(
            &mut self.game,
            &mut self.history,
            self.deps.evaluator.as_ref(),
            self.deps.notifier.as_ref(),
            player_id,
            now_ts(),
        );
        match result {
            Ok(flow) => {
                self.persist();
                if before_start {
                    // Возврат бай-ина — вне критического пути.
                    submit_with_retry(
                        self.deps.settlement.clone(),
                        self.deps.retry,
                        SettlementRequest::RefundOnLeave {
                            game_id: self.game.id,
                            player: player_id,
                        },
                    );
                    self.deps
                        .notifier
                        .notify_game(self.game.id, RoomEvent::ActiveGameUpdated);
                }
                if let Some(flow) = flow {
                    self.follow(flow);
                }
            }
            Err(err) => debug!(%err, "leave refused"),
        }
    }

    fn on_sit(&mut self, player_id: PlayerId, name: String) {
        if self.game.started_at.is_some() {
            debug!(player_id, "cannot sit: game already started");
            return;
        }
        let seat = match self.game.free_seat() {
            Some(seat) => seat,
            None => {
                debug!(player_id, "cannot sit: no free seat");
                return;
            }
        };
        let stack = self.game.initial_stack;
        self.game
            .players
            .push(Player::new(player_id, name, seat, stack));
        self.persist();
        self.push_snapshot();
        self.notify_seats();
        self.deps
            .notifier
            .notify_game(self.game.id, RoomEvent::ActiveGameUpdated);

        // Проба авто-старта (только кэш: турнирные столы стартуют
        // по расписанию): если к сроку состав не изменился, а стол
        // так и не стартовал — стартуем сами.
        if self.game.mode == GameMode::Cash {
            let active_count = self.game.active_players().len();
            let tx = self.self_tx.clone();
            let delay = self.config.auto_start;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(GameMessage::StartIfIdle { active_count });
            });
        }
    }

    fn on_mark_afk(&mut self, player_id: PlayerId) {
        if let Some(p) = self.game.player_mut(player_id) {
            p.last_action = Some(Action::Afk);
        }
        self.persist();
    }

    fn on_rejoin(&mut self, player_id: PlayerId) {
        let mut rejoined = false;
        if let Some(p) = self.game.player_mut(player_id) {
            if matches!(p.last_action, Some(Action::Afk)) {
                p.last_action = None;
                p.folded = false;
                p.active = true;
                rejoined = true;
            }
        }
        if rejoined {
            self.persist();
            self.notify_seats();
        }
    }

    fn on_start_game(&mut self) {
        self.rng
            .reseed_for_hand(self.game.id, self.game.hand as u64 + 1);
        let result = game_loop::start_game(
            &mut self.game,
            &mut self.history,
            &mut self.rng,
            self.deps.evaluator.as_ref(),
            self.deps.notifier.as_ref(),
            now_ts(),
        );
        match result {
            Ok(flow) => {
                self.persist();
                self.push_snapshot();
                self.follow(flow);
            }
            Err(err) => warn!(%err, "start_game failed"),
        }
    }

    fn on_start_hand(&mut self) {
        if self.game.is_active() {
            return;
        }
        if self.game.active_players().len() < 2 {
            debug!("not enough players for next hand");
            return;
        }
        self.rng
            .reseed_for_hand(self.game.id, self.game.hand as u64 + 1);
        let result = game_loop::start_hand(
            &mut self.game,
            &mut self.history,
            &mut self.rng,
            self.deps.evaluator.as_ref(),
            self.deps.notifier.as_ref(),
            now_ts(),
        );
        match result {
            Ok(flow) => {
                self.persist();
                self.push_snapshot();
                self.follow(flow);
            }
            Err(err) => warn!(%err, "start_hand failed"),
        }
    }

    fn on_start_if_idle(&mut self, active_count: usize) {
        if self.game.started_at.is_some() {
            return;
        }
        let active = self.game.active_players().len();
        if active > 1 && active == active_count {
            self.on_start_game();
        }
    }

    fn on_turn_timeout(&mut self, player_id: PlayerId, history_id: u64) {
        if !self.game.is_active() {
            return;
        }
        // Оптимистичная проверка прогресса: появилось новое действие —
        // таймер устарел и ничего не делает.
        if self.history.last_id() != history_id {
            return;
        }
        self.deps.notifier.notify_game(
            self.game.id,
            RoomEvent::Log(format!("{player_id} is folded automatically (timeout)")),
        );
        self.apply(PlayerAction {
            player_id,
            kind: ActionKind::Fold,
        });
    }

    fn on_extract(&mut self, to_game: GameId, reply: oneshot::Sender<Vec<Player>>) {
        let mut movers = Vec::new();
        let mut rest = Vec::new();
        for player in self.game.players.drain(..) {
            if player.active {
                movers.push(player);
            } else {
                rest.push(player);
            }
        }
        self.game.players = rest;

        for player in &movers {
            self.deps.notifier.notify_player(
                player.id,
                RoomEvent::ResitTournamentTable { game_id: to_game },
            );
        }

        self.game.ended = true;
        self.game.ended_at = Some(now_ts());
        self.game.current_player_id = None;
        self.persist();
        self.push_snapshot();
        self.deps
            .notifier
            .notify_game(self.game.id, RoomEvent::ActiveGameUpdated);

        let _ = reply.send(movers);
    }

    fn on_take_migrants(&mut self, players: Vec<Player>) {
        for mut player in players {
            let seat = match self.game.free_seat() {
                Some(seat) => seat,
                None => {
                    // По плану балансировки такого не бывает; фишки
                    // игрока в любом случае не теряем.
                    warn!(player = player.id, "no free seat for migrant");
                    0
                }
            };
            player.seat_id = seat;
            player.bet = Chips::ZERO;
            player.last_bet = Chips::ZERO;
            player.cards.clear();
            player.dealer = false;
            player.small_blind = false;
            player.big_blind = false;
            player.last_action = None;
            // Пересаженный входит сфолженным: в чужую раздачу
            // с середины не вступают.
            player.folded = true;
            self.game.players.push(player);
        }
        self.persist();
        self.push_snapshot();
        self.notify_seats();

        // Стол стоял без раздачи (например, ждал соперников) —
        // пополнение позволяет продолжить.
        if self.game.started_at.is_some()
            && !self.game.is_active()
            && self.game.active_players().len() > 1
        {
            self.on_start_hand();
        }
    }

    /// Довести поток хода до устойчивого состояния: взвести таймер
    /// хода либо обработать конец раздачи (и, для кэша, сдать
    /// следующую).
    fn follow(&mut self, flow: TurnFlow) {
        let mut next = Some(flow);
        while let Some(flow) = next.take() {
            match flow {
                TurnFlow::TurnPassed { player_id } => {
                    self.arm_turn_timer(player_id);
                }
                TurnFlow::HandFinished(outcome) => {
                    next = self.on_hand_finished(outcome);
                }
            }
        }
    }

    fn arm_turn_timer(&self, player_id: PlayerId) {
        let history_id = self.history.last_id();
        let tx = self.self_tx.clone();
        let delay = self.config.auto_fold;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Таймер не отменяется: одновременно может лететь
            // несколько, эффект даст только тот, что не увидел
            // прогресса.
            let _ = tx.send(GameMessage::TurnTimeout {
                player_id,
                history_id,
            });
        });
    }

    fn on_hand_finished(&mut self, outcome: HandOutcome) -> Option<TurnFlow> {
        self.persist();

        if let Some(payout) = outcome.cash_payout {
            submit_with_retry(
                self.deps.settlement.clone(),
                self.deps.retry,
                SettlementRequest::Payout {
                    game_id: self.game.id,
                    winner: payout.winner,
                    amount: payout.winner_vault,
                    leave_vault: payout.leave_vault,
                },
            );
        }

        let snapshot = GameSnapshot::from_game(&self.game);
        let _ = self.signals.send(RoomSignal::HandSettled {
            snapshot,
            outcome: outcome.clone(),
        });

        // Кэш-стол сам сдаёт следующую раздачу; турнирный ждёт
        // решения балансировщика.
        if self.game.mode == GameMode::Cash && !self.game.ended && outcome.active_left > 1 {
            self.rng
                .reseed_for_hand(self.game.id, self.game.hand as u64 + 1);
            let result = game_loop::start_hand(
                &mut self.game,
                &mut self.history,
                &mut self.rng,
                self.deps.evaluator.as_ref(),
                self.deps.notifier.as_ref(),
                now_ts(),
            );
            match result {
                Ok(flow) => {
                    self.persist();
                    return Some(flow);
                }
                Err(err) => warn!(%err, "failed to start next hand"),
            }
        }
        None
    }

    /// Записать состояние в хранилище. Ошибка не фатальна: память —
    /// источник истины до следующей удачной записи.
    fn persist(&mut self) {
        if let Err(err) = self.deps.store.save_game(&self.game) {
            warn!(%err, "game save failed");
        }
        let records = self.history.records();
        for record in &records[self.persisted_actions.min(records.len())..] {
            if let Err(err) = self.deps.store.append_action(record) {
                warn!(%err, "action history save failed");
                break;
            }
        }
        self.persisted_actions = records.len();
    }

    fn push_snapshot(&self) {
        let _ = self
            .signals
            .send(RoomSignal::SnapshotUpdated(GameSnapshot::from_game(
                &self.game,
            )));
    }

    fn notify_seats(&self) {
        self.deps.notifier.notify_game(
            self.game.id,
            RoomEvent::SeatsUpdated {
                seats: seat_map(&self.game, false),
                players: self.game.active_unfolded().len(),
            },
        );
    }
}
