//! Турнирное лобби: хранит турниры, считает посадку и журнал вылетов.
//!
//! Дочерние столы живут как обычные игры в рантайме; лобби знает
//! только их id и занятость мест.

use std::collections::HashMap;

use crate::domain::tournament::{
    Tournament, TournamentConfig, TournamentError, TournamentStatus, TournamentWinner,
};
use crate::domain::{GameId, PlayerId, TournamentId};

pub struct TournamentLobby {
    tournaments: HashMap<TournamentId, Tournament>,
    /// Занятость дочерних столов до старта (game_id -> кто сел).
    seatings: HashMap<GameId, Vec<PlayerId>>,
    /// Ранжирование финального стола (заполняется при его расчёте).
    final_rankings: HashMap<TournamentId, Vec<PlayerId>>,
}

impl Default for TournamentLobby {
    fn default() -> Self {
        Self::new()
    }
}

impl TournamentLobby {
    pub fn new() -> Self {
        Self {
            tournaments: HashMap::new(),
            seatings: HashMap::new(),
            final_rankings: HashMap::new(),
        }
    }

    /// Зарегистрировать турнир с уже созданными дочерними столами.
    pub fn insert(&mut self, mut tournament: Tournament, child_games: Vec<GameId>) {
        for game_id in &child_games {
            self.seatings.insert(*game_id, Vec::new());
        }
        tournament.child_games = child_games;
        self.tournaments.insert(tournament.id, tournament);
    }

    pub fn get(&self, id: TournamentId) -> Option<&Tournament> {
        self.tournaments.get(&id)
    }

    pub fn get_mut(&mut self, id: TournamentId) -> Option<&mut Tournament> {
        self.tournaments.get_mut(&id)
    }

    /// Турнир, которому принадлежит стол.
    pub fn tournament_of_game(&self, game_id: GameId) -> Option<&Tournament> {
        self.tournaments
            .values()
            .find(|t| t.child_games.contains(&game_id))
    }

    /// Выбрать стол для садящегося игрока: первый ещё не стартовавший
    /// дочерний стол со свободным местом. Игрок не может сидеть в
    /// турнире дважды.
    pub fn choose_seat(
        &mut self,
        tournament_id: TournamentId,
        player_id: PlayerId,
        table_seats: u8,
    ) -> Result<GameId, TournamentError> {
        let tournament = self
            .tournaments
            .get(&tournament_id)
            .ok_or(TournamentError::TournamentNotFound { tournament_id })?;

        if tournament.status != TournamentStatus::Active {
            return Err(TournamentError::RegistrationClosed {
                tournament_id,
                status: tournament.status,
            });
        }

        let already_seated = tournament.child_games.iter().any(|game_id| {
            self.seatings
                .get(game_id)
                .map(|seats| seats.contains(&player_id))
                .unwrap_or(false)
        });
        if already_seated {
            return Err(TournamentError::AlreadySeated {
                player_id,
                tournament_id,
            });
        }

        let seated_total: usize = tournament
            .child_games
            .iter()
            .filter_map(|g| self.seatings.get(g))
            .map(|s| s.len())
            .sum();
        if seated_total as u32 >= tournament.config.total_seats {
            return Err(TournamentError::TournamentFull { tournament_id });
        }

        let child_games = tournament.child_games.clone();
        for game_id in child_games {
            let seats = self.seatings.entry(game_id).or_default();
            if seats.len() < table_seats as usize {
                seats.push(player_id);
                if let Some(t) = self.tournaments.get_mut(&tournament_id) {
                    t.entrants += 1;
                }
                return Ok(game_id);
            }
        }

        Err(TournamentError::TournamentFull { tournament_id })
    }

    pub fn mark_started(&mut self, tournament_id: TournamentId) {
        if let Some(t) = self.tournaments.get_mut(&tournament_id) {
            if t.status == TournamentStatus::Active {
                t.status = TournamentStatus::Running;
            }
        }
    }

    /// Записать вылетевших (порядок сохраняется: свежие — в конце).
    pub fn record_eliminations(&mut self, tournament_id: TournamentId, busted: &[PlayerId]) {
        if let Some(t) = self.tournaments.get_mut(&tournament_id) {
            for id in busted {
                if !t.eliminations.contains(id) {
                    t.eliminations.push(*id);
                }
            }
        }
    }

    pub fn set_final_ranking(&mut self, tournament_id: TournamentId, ranking: Vec<PlayerId>) {
        if !ranking.is_empty() {
            self.final_rankings.insert(tournament_id, ranking);
        }
    }

    pub fn final_ranking(&self, tournament_id: TournamentId) -> &[PlayerId] {
        self.final_rankings
            .get(&tournament_id)
            .map(|r| r.as_slice())
            .unwrap_or(&[])
    }

    /// Завершить турнир и зафиксировать победителей.
    pub fn finish(&mut self, tournament_id: TournamentId, winners: Vec<TournamentWinner>) {
        if let Some(t) = self.tournaments.get_mut(&tournament_id) {
            t.status = TournamentStatus::Ended;
            t.winners = winners;
        }
    }
}

/// Сколько дочерних столов нужно под `total_seats` при `table_seats`
/// местах за столом (округление вверх).
pub fn child_table_count(config: &TournamentConfig) -> u32 {
    let seats = config.table_seats.max(2) as u32;
    config.total_seats.div_ceil(seats)
}
