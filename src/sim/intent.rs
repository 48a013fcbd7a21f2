//! Player intents sampled once per tick
//!
//! An `IntentSet` is a plain snapshot: reading it has no side effects, and
//! nothing in the simulation writes back into it.

use serde::{Deserialize, Serialize};

/// A discrete player command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    Left,
    Right,
    Up,
    Down,
    Jump,
    Shoot,
    Quit,
    Restart,
}

impl Intent {
    /// Every intent, in bit order
    pub const ALL: [Intent; 8] = [
        Intent::Left,
        Intent::Right,
        Intent::Up,
        Intent::Down,
        Intent::Jump,
        Intent::Shoot,
        Intent::Quit,
        Intent::Restart,
    ];

    #[inline]
    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of intents active for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct IntentSet {
    bits: u8,
}

impl IntentSet {
    pub const EMPTY: IntentSet = IntentSet { bits: 0 };

    pub fn new() -> Self {
        Self::EMPTY
    }

    /// Build a set from a list of intents
    pub fn of(intents: &[Intent]) -> Self {
        let mut set = Self::EMPTY;
        for &intent in intents {
            set.insert(intent);
        }
        set
    }

    #[inline]
    pub fn insert(&mut self, intent: Intent) {
        self.bits |= intent.bit();
    }

    #[inline]
    pub fn remove(&mut self, intent: Intent) {
        self.bits &= !intent.bit();
    }

    #[inline]
    pub fn contains(&self, intent: Intent) -> bool {
        self.bits & intent.bit() != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Union of two snapshots
    pub fn merged(self, other: IntentSet) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Active intents in bit order
    pub fn iter(&self) -> impl Iterator<Item = Intent> + '_ {
        Intent::ALL.into_iter().filter(|i| self.contains(*i))
    }

    /// Horizontal axis where Right wins over Left (-1, 0, 1)
    pub fn horizontal(&self) -> i8 {
        if self.contains(Intent::Right) {
            1
        } else if self.contains(Intent::Left) {
            -1
        } else {
            0
        }
    }
}

impl FromIterator<Intent> for IntentSet {
    fn from_iter<I: IntoIterator<Item = Intent>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for intent in iter {
            set.insert(intent);
        }
        set
    }
}
