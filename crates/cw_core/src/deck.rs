//! Shuffled card supply
//!
//! A deck remembers every card it has ever known (its universe) so it can be
//! reshuffled from scratch, and keeps a queue of cards still left to draw.

use cw_common::{CodewordError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::vec_deque::Drain;
use std::collections::VecDeque;

/// A named, shuffled supply of cards
#[derive(Debug, Clone)]
pub struct Deck<T> {
    name: String,
    universe: Vec<T>,
    remaining: VecDeque<T>,
    rng: StdRng,
}

impl<T: Clone> Deck<T> {
    /// Open a deck shuffled from OS entropy
    pub fn new(name: impl Into<String>, cards: Vec<T>) -> Self {
        Self::with_rng(name, cards, StdRng::from_entropy())
    }

    /// Open a deck whose shuffles are reproducible
    pub fn with_seed(name: impl Into<String>, cards: Vec<T>, seed: u64) -> Self {
        Self::with_rng(name, cards, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(name: impl Into<String>, cards: Vec<T>, rng: StdRng) -> Self {
        let mut deck = Self {
            name: name.into(),
            universe: cards,
            remaining: VecDeque::new(),
            rng,
        };
        deck.reset();
        deck
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Open up a new deck: a fresh shuffle of every known card
    pub fn reset(&mut self) {
        let mut cards = self.universe.clone();
        shuffle(&mut cards, &mut self.rng);
        self.remaining = cards.into();
    }

    /// Merge another deck's known cards into this one.
    ///
    /// The other cards are shuffled into the *existing* queue; cards already
    /// drawn from this deck stay drawn.
    pub fn add_deck(&mut self, other: &Deck<T>) {
        let other_cards = other.known_cards();
        self.universe.extend(other_cards.iter().cloned());

        let mut merged: Vec<T> = self.remaining.drain(..).chain(other_cards).collect();
        shuffle(&mut merged, &mut self.rng);
        self.remaining = merged.into();
    }

    /// Every card this deck knows about, drawn or not
    pub fn known_cards(&self) -> Vec<T> {
        self.universe.clone()
    }

    /// Number of cards remaining in the deck
    pub fn size(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Remove `n` cards from the top of the deck.
    ///
    /// The returned iterator yields exactly `n` cards; all `n` leave the deck
    /// even if the iterator is dropped early. Fails without touching the deck
    /// when fewer than `n` cards remain.
    pub fn draw(&mut self, n: usize) -> Result<Drain<'_, T>> {
        self.ensure(n)?;
        Ok(self.remaining.drain(..n))
    }

    /// Draw a single card
    pub fn draw_one(&mut self) -> Result<T> {
        self.remaining
            .pop_front()
            .ok_or(CodewordError::InsufficientCards {
                requested: 1,
                available: 0,
            })
    }

    /// Look at the next `n` cards without removing them
    pub fn peek(&self, n: usize) -> Result<impl Iterator<Item = T> + '_> {
        self.ensure(n)?;
        Ok(self.remaining.iter().take(n).cloned())
    }

    /// Throw away `n` cards from the top of the deck
    pub fn discard(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.remaining.drain(..n);
        Ok(())
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if n > self.size() {
            return Err(CodewordError::InsufficientCards {
                requested: n,
                available: self.size(),
            });
        }
        Ok(())
    }
}

/// Fisher–Yates shuffle in place
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: u32) -> Vec<u32> {
        (0..n).collect()
    }

    #[test]
    fn test_draw_removes_exactly_n() {
        let mut deck = Deck::with_seed("numbers", numbers(10), 7);
        let drawn: Vec<u32> = deck.draw(4).unwrap().collect();

        assert_eq!(drawn.len(), 4);
        assert_eq!(deck.size(), 6);
    }

    #[test]
    fn test_draw_removes_even_when_dropped_early() {
        let mut deck = Deck::with_seed("numbers", numbers(10), 7);
        {
            let mut drain = deck.draw(3).unwrap();
            let _first = drain.next();
        }
        assert_eq!(deck.size(), 7);
    }

    #[test]
    fn test_overdraw_leaves_deck_untouched() {
        let mut deck = Deck::with_seed("numbers", numbers(5), 7);
        let before: Vec<u32> = deck.peek(5).unwrap().collect();

        let err = deck.draw(6).unwrap_err();
        assert!(matches!(
            err,
            CodewordError::InsufficientCards {
                requested: 6,
                available: 5
            }
        ));

        let after: Vec<u32> = deck.peek(5).unwrap().collect();
        assert_eq!(before, after);
        assert!(deck.discard(6).is_err());
        assert!(deck.peek(6).is_err());
    }

    #[test]
    fn test_peek_is_not_destructive() {
        let mut deck = Deck::with_seed("numbers", numbers(8), 3);
        let peeked: Vec<u32> = deck.peek(3).unwrap().collect();
        let again: Vec<u32> = deck.peek(3).unwrap().collect();
        assert_eq!(peeked, again);

        let drawn: Vec<u32> = deck.draw(3).unwrap().collect();
        assert_eq!(peeked, drawn);
    }

    #[test]
    fn test_discard_then_draw_one() {
        let mut deck = Deck::with_seed("numbers", numbers(3), 11);
        let order: Vec<u32> = deck.peek(3).unwrap().collect();

        deck.discard(2).unwrap();
        assert_eq!(deck.draw_one().unwrap(), order[2]);
        assert!(deck.is_empty());
        assert!(deck.draw_one().is_err());
    }

    #[test]
    fn test_reset_restores_universe() {
        let mut deck = Deck::with_seed("numbers", numbers(6), 1);
        deck.discard(4).unwrap();
        deck.reset();

        assert_eq!(deck.size(), 6);
        let mut all: Vec<u32> = deck.draw(6).unwrap().collect();
        all.sort();
        assert_eq!(all, numbers(6));
        assert!(deck.draw_one().is_err());
    }

    #[test]
    fn test_add_deck_keeps_consumption() {
        let mut deck = Deck::with_seed("low", numbers(5), 2);
        deck.discard(2).unwrap();

        let other = Deck::with_seed("high", vec![100, 101, 102, 103], 9);
        deck.add_deck(&other);

        assert_eq!(deck.size(), 3 + 4);
        assert_eq!(deck.known_cards().len(), 5 + 4);
    }

    #[test]
    fn test_same_seed_same_order() {
        let a: Vec<u32> = Deck::with_seed("a", numbers(20), 42).peek(20).unwrap().collect();
        let b: Vec<u32> = Deck::with_seed("b", numbers(20), 42).peek(20).unwrap().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut items = numbers(50);
        shuffle(&mut items, &mut rng);
        items.sort();
        assert_eq!(items, numbers(50));

        let mut empty: Vec<u32> = vec![];
        shuffle(&mut empty, &mut rng);
        assert!(empty.is_empty());
    }
}
