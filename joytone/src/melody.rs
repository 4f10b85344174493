use core::iter::Zip;
use core::slice::Iter;

use self::pitch::*;

/// Equal-temperament pitches in Hz, rounded to the nearest integer.
pub mod pitch {
    pub const REST: i32 = 0;

    pub const C4: i32 = 262;
    pub const D4: i32 = 294;
    pub const E4: i32 = 330;
    pub const F4: i32 = 349;
    pub const FS4: i32 = 370;
    pub const G4: i32 = 392;
    pub const GS4: i32 = 415;
    pub const A4: i32 = 440;
    pub const B4: i32 = 494;
    pub const C5: i32 = 523;
    pub const CS5: i32 = 554;
    pub const D5: i32 = 587;
    pub const DS5: i32 = 622;
    pub const E5: i32 = 659;
    pub const FS5: i32 = 740;
    pub const G5: i32 = 784;
    pub const A5: i32 = 880;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Note {
    pub frequency: i32,
    pub duration_ms: u32,
}

impl Note {
    pub fn is_rest(&self) -> bool {
        self.frequency <= 0
    }
}

/// A named tune: frequencies (non-positive is a rest) and durations, pairwise.
#[derive(Debug, Clone, Copy)]
pub struct Melody {
    name: &'static str,
    notes: &'static [i32],
    durations: &'static [u32],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MelodyError {
    LengthMismatch { notes: usize, durations: usize },
}

impl Melody {
    /// For statics: a length mismatch fails const evaluation.
    pub const fn new(name: &'static str, notes: &'static [i32], durations: &'static [u32]) -> Self {
        assert!(
            notes.len() == durations.len(),
            "every note needs exactly one duration"
        );

        Self {
            name,
            notes,
            durations,
        }
    }

    pub fn try_new(
        name: &'static str,
        notes: &'static [i32],
        durations: &'static [u32],
    ) -> Result<Self, MelodyError> {
        if notes.len() != durations.len() {
            return Err(MelodyError::LengthMismatch {
                notes: notes.len(),
                durations: durations.len(),
            });
        }

        Ok(Self {
            name,
            notes,
            durations,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn note(&self, index: usize) -> Option<Note> {
        Some(Note {
            frequency: *self.notes.get(index)?,
            duration_ms: *self.durations.get(index)?,
        })
    }

    pub fn notes(&self) -> Notes {
        Notes {
            inner: self.notes.iter().zip(self.durations.iter()),
        }
    }

    /// Sum of all note and rest durations.
    pub fn total_duration_ms(&self) -> u32 {
        self.durations
            .iter()
            .fold(0u32, |total, &ms| total.saturating_add(ms))
    }
}

pub struct Notes {
    inner: Zip<Iter<'static, i32>, Iter<'static, u32>>,
}

impl Iterator for Notes {
    type Item = Note;

    fn next(&mut self) -> Option<Note> {
        self.inner.next().map(|(&frequency, &duration_ms)| Note {
            frequency,
            duration_ms,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

const ASA_BRANCA_NOTES: [i32; 30] = [
    C4, D4, E4, G4, G4, E4, F4, F4, REST, //
    C4, D4, E4, G4, G4, F4, E4, REST, //
    C4, C4, D4, E4, E4, D4, C4, C4, F4, E4, D4, D4, C4,
];
const ASA_BRANCA_DURATIONS: [u32; 30] = [
    250, 250, 500, 500, 250, 250, 500, 500, 250, //
    250, 250, 500, 500, 250, 250, 500, 250, //
    250, 250, 250, 500, 250, 250, 250, 250, 500, 250, 250, 250, 750,
];

const FUR_ELISE_NOTES: [i32; 28] = [
    E5, DS5, E5, DS5, E5, B4, D5, C5, A4, REST, //
    C4, E4, A4, B4, REST, //
    E4, GS4, B4, C5, REST, //
    E4, E5, DS5, E5, DS5, E5, B4, A4,
];
const FUR_ELISE_DURATIONS: [u32; 28] = [
    150, 150, 150, 150, 150, 150, 150, 150, 300, 150, //
    150, 150, 150, 300, 150, //
    150, 150, 150, 300, 150, //
    150, 150, 150, 150, 150, 150, 150, 450,
];

const CANON_IN_D_NOTES: [i32; 24] = [
    FS5, E5, D5, CS5, B4, A4, B4, CS5, //
    D5, CS5, B4, A4, G4, FS4, G4, E4, //
    D4, FS4, A4, G4, FS4, D4, FS4, E4,
];
const CANON_IN_D_DURATIONS: [u32; 24] = [
    600, 600, 600, 600, 600, 600, 600, 600, //
    600, 600, 600, 600, 600, 600, 600, 600, //
    300, 300, 300, 300, 300, 300, 300, 600,
];

pub const ASA_BRANCA: Melody = Melody::new("Asa Branca", &ASA_BRANCA_NOTES, &ASA_BRANCA_DURATIONS);
pub const FUR_ELISE: Melody = Melody::new("Für Elise", &FUR_ELISE_NOTES, &FUR_ELISE_DURATIONS);
pub const CANON_IN_D: Melody = Melody::new("Canon in D", &CANON_IN_D_NOTES, &CANON_IN_D_DURATIONS);

/// Everything the player cycles through, in selection order.
pub static CATALOG: [Melody; 3] = [ASA_BRANCA, FUR_ELISE, CANON_IN_D];
