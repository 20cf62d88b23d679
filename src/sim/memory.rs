//! Mindful memory match
//!
//! Pairs of practice cards are dealt face down. Each turn flips two cards: a
//! matching pair stays face up, a mismatch stays visible for
//! [`FLIP_BACK_MS`] and is then turned back by the owner's timer.

use serde::{Deserialize, Serialize};

use super::random::RandomSource;

/// How long a mismatched pair stays face up
pub const FLIP_BACK_MS: u32 = 1000;

/// Card faces: name and symbol
pub const FACES: [(&str, &str); 8] = [
    ("meditation", "🧘"),
    ("nature", "🌳"),
    ("exercise", "🏃"),
    ("sleep", "😴"),
    ("water", "💧"),
    ("food", "🍎"),
    ("journal", "📓"),
    ("connect", "👫"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Index into [`FACES`]
    pub face: usize,
    pub flipped: bool,
    pub matched: bool,
}

impl Card {
    pub fn name(&self) -> &'static str {
        FACES[self.face].0
    }

    pub fn symbol(&self) -> &'static str {
        FACES[self.face].1
    }

    pub fn is_face_up(&self) -> bool {
        self.flipped || self.matched
    }
}

/// Result of picking a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    /// Out of range, already face up, or waiting on a flip-back
    Ignored,
    First,
    Matched,
    /// Both cards stay up until [`MemoryGame::resolve_mismatch`]
    Mismatched,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryGame {
    cards: Vec<Card>,
    first: Option<usize>,
    mismatch: Option<(usize, usize)>,
    turns: u32,
}

impl MemoryGame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deal a fresh shuffled board of `pairs` pairs (1 to 8)
    pub fn deal(&mut self, pairs: usize, rng: &mut dyn RandomSource) {
        let pairs = pairs.clamp(1, FACES.len());
        let mut cards: Vec<Card> = (0..2 * pairs)
            .map(|i| Card {
                face: i % pairs,
                flipped: false,
                matched: false,
            })
            .collect();

        // Fisher-Yates
        for i in (1..cards.len()).rev() {
            let j = ((rng.next_unit() * (i + 1) as f32) as usize).min(i);
            cards.swap(i, j);
        }

        self.cards = cards;
        self.first = None;
        self.mismatch = None;
        self.turns = 0;
        log::info!("Dealt {} memory pairs", pairs);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Completed turns (pairs of picks)
    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn is_started(&self) -> bool {
        !self.cards.is_empty()
    }

    /// A mismatched pair is still showing
    pub fn is_locked(&self) -> bool {
        self.mismatch.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.is_started() && self.cards.iter().all(|c| c.matched)
    }

    pub fn pick(&mut self, index: usize) -> PickOutcome {
        if self.is_locked() {
            return PickOutcome::Ignored;
        }
        let Some(card) = self.cards.get_mut(index) else {
            return PickOutcome::Ignored;
        };
        if card.is_face_up() {
            return PickOutcome::Ignored;
        }
        card.flipped = true;

        let Some(first) = self.first.take() else {
            self.first = Some(index);
            return PickOutcome::First;
        };
        self.turns += 1;
        if self.cards[first].face == self.cards[index].face {
            self.cards[first].matched = true;
            self.cards[index].matched = true;
            if self.is_complete() {
                log::info!("Memory board cleared in {} turns", self.turns);
            }
            PickOutcome::Matched
        } else {
            self.mismatch = Some((first, index));
            PickOutcome::Mismatched
        }
    }

    /// Turn a showing mismatch face down again. False when none is showing.
    pub fn resolve_mismatch(&mut self) -> bool {
        let Some((a, b)) = self.mismatch.take() else {
            return false;
        };
        self.cards[a].flipped = false;
        self.cards[b].flipped = false;
        true
    }
}
