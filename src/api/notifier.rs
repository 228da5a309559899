use parking_lot::Mutex;

use crate::api::events::RoomEvent;
use crate::domain::{GameId, PlayerId};

/// Канал публикации событий наружу.
///
/// Вызывается изнутри критической секции игры, поэтому реализация
/// обязана быть неблокирующей — класть событие в очередь транспорта,
/// а не ждать сети.
pub trait RoomNotifier: Send + Sync {
    /// Событие всем подписчикам комнаты игры.
    fn notify_game(&self, game_id: GameId, event: RoomEvent);

    /// Событие лично игроку (карманные карты, лучшая рука).
    fn notify_player(&self, player_id: PlayerId, event: RoomEvent);
}

/// Заглушка: события никуда не идут.
#[derive(Debug, Default)]
pub struct NullNotifier;

impl RoomNotifier for NullNotifier {
    fn notify_game(&self, _game_id: GameId, _event: RoomEvent) {}
    fn notify_player(&self, _player_id: PlayerId, _event: RoomEvent) {}
}

/// Запоминающий нотификатор для тестов.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    game_events: Mutex<Vec<(GameId, RoomEvent)>>,
    player_events: Mutex<Vec<(PlayerId, RoomEvent)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn game_events(&self) -> Vec<(GameId, RoomEvent)> {
        self.game_events.lock().clone()
    }

    pub fn player_events(&self) -> Vec<(PlayerId, RoomEvent)> {
        self.player_events.lock().clone()
    }
}

impl RoomNotifier for RecordingNotifier {
    fn notify_game(&self, game_id: GameId, event: RoomEvent) {
        self.game_events.lock().push((game_id, event));
    }

    fn notify_player(&self, player_id: PlayerId, event: RoomEvent) {
        self.player_events.lock().push((player_id, event));
    }
}
