use serde::{Deserialize, Serialize};

use crate::domain::card::{Card, Rank, Suit};

/// Колода карт: упорядоченный список, верх колоды — конец вектора.
/// Перемешивание делает движок через `RandomSource`, НЕ домен.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deck {
    pub cards: Vec<Card>,
}

impl Deck {
    /// Полная 52-карточная колода в фиксированном порядке мастей и рангов.
    pub fn standard_52() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::new(rank, suit));
            }
        }
        Deck { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Снять одну карту сверху.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Сжечь карту (снять и выбросить).
    pub fn burn(&mut self) {
        self.cards.pop();
    }
}
