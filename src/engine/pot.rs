use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::PlayerId;

/// Один банк раздачи.
///
/// Инварианты:
/// - `total == sum(player_bets)`;
/// - `locked` банк принимает взносы только до своего `max_bet`,
///   излишек каскадом уходит в следующий банк;
/// - в списке банков живой (не locked) банк всегда последний, если он
///   вообще есть: олл-ин "больше, чем кто-либо может уравнять" может
///   оставить хвост из одних locked банков.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pot {
    pub total: Chips,
    /// Потолок взноса одного игрока в этот банк.
    pub max_bet: Chips,
    pub locked: bool,
    /// Суммарный взнос каждого игрока в этот банк за раздачу.
    pub player_bets: BTreeMap<PlayerId, Chips>,
}

impl Pot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Взнос игрока в этот банк (ZERO, если его тут нет).
    pub fn contribution(&self, player_id: PlayerId) -> Chips {
        self.player_bets
            .get(&player_id)
            .copied()
            .unwrap_or(Chips::ZERO)
    }

    /// Участвует ли игрок в этом банке (может ли его выиграть).
    pub fn involves(&self, player_id: PlayerId) -> bool {
        self.player_bets.contains_key(&player_id)
    }

    fn deposit(&mut self, player_id: PlayerId, amount: Chips) {
        if amount.is_zero() {
            return;
        }
        let entry = self.player_bets.entry(player_id).or_insert(Chips::ZERO);
        *entry += amount;
        let new_bet = *entry;
        if new_bet > self.max_bet {
            self.max_bet = new_bet;
        }
        self.total += amount;
    }

    fn recompute_total(&mut self) {
        self.total = self.player_bets.values().copied().sum();
    }
}

/// Провести взнос игрока через список банков.
///
/// Обычная ставка ложится в живой банк. Олл-ин закрывает живой банк на
/// уровне суммарного взноса игрока: излишки прежних вкладчиков
/// переезжают в новый банк, который и становится живым. Ставка против
/// уже закрытого банка добирает его до `max_bet`, остаток каскадом идёт
/// дальше (возможно, создавая новый банк) — так растут сайд-поты при
/// серии олл-инов. Нулевой взнос — no-op.
pub fn settle_contribution(
    pots: &mut Vec<Pot>,
    player_id: PlayerId,
    amount: Chips,
    all_in: bool,
) {
    if amount.is_zero() {
        return;
    }

    let mut rest = amount;
    let mut i = 0;

    while i < pots.len() && !rest.is_zero() {
        let current = pots[i].contribution(player_id);

        if !pots[i].locked {
            if all_in {
                // Живой банк закрывается на уровне взноса олл-ин игрока;
                // излишки остальных переезжают в новый живой банк.
                let cap = current + rest;
                let mut spill = Pot::new();

                pots[i].locked = true;
                pots[i].player_bets.insert(player_id, cap);
                for (pid, bet) in pots[i].player_bets.iter_mut() {
                    if *bet > cap {
                        let excess = *bet - cap;
                        let entry = spill.player_bets.entry(*pid).or_insert(Chips::ZERO);
                        *entry += excess;
                        if *entry > spill.max_bet {
                            spill.max_bet = *entry;
                        }
                        spill.total += excess;
                        *bet = cap;
                    }
                }
                pots[i].max_bet = cap;
                pots[i].recompute_total();
                rest = Chips::ZERO;
                pots.push(spill);
            } else {
                pots[i].deposit(player_id, rest);
                rest = Chips::ZERO;
            }
            break;
        }

        // Банк уже закрыт.
        let cap = pots[i].max_bet;
        if all_in {
            let target = current + rest;
            if target == cap {
                pots[i].deposit(player_id, rest);
                rest = Chips::ZERO;
            } else if target < cap {
                // Олл-ин ниже потолка закрытого банка: банк раскраивается
                // на новом уровне, верхний слой остаётся закрытым и
                // встаёт сразу за ним.
                let mut upper = Pot::new();
                upper.locked = true;

                pots[i].player_bets.insert(player_id, target);
                for (pid, bet) in pots[i].player_bets.iter_mut() {
                    if *bet > target {
                        let excess = *bet - target;
                        let entry = upper.player_bets.entry(*pid).or_insert(Chips::ZERO);
                        *entry += excess;
                        if *entry > upper.max_bet {
                            upper.max_bet = *entry;
                        }
                        upper.total += excess;
                        *bet = target;
                    }
                }
                pots[i].max_bet = target;
                pots[i].recompute_total();
                rest = Chips::ZERO;
                pots.insert(i + 1, upper);
            } else {
                // Добираем закрытый банк, остаток каскадом дальше.
                let need = cap - current;
                pots[i].deposit(player_id, need);
                rest -= need;
            }
        } else if current < cap {
            let need = (cap - current).min(rest);
            pots[i].deposit(player_id, need);
            rest -= need;
        }
        // current == cap: банк уже добран этим игроком, идём дальше.

        i += 1;
    }

    // Все банки закрыты, а остаток есть — открываем новый живой банк,
    // чтобы ни одна фишка не потерялась.
    if !rest.is_zero() {
        let mut pot = Pot::new();
        pot.locked = all_in;
        pot.deposit(player_id, rest);
        pots.push(pot);
    }
}

/// Суммарный объём всех банков.
pub fn pots_total(pots: &[Pot]) -> Chips {
    pots.iter().map(|p| p.total).sum()
}
