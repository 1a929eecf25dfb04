//! Hebrew numeral (gematria) formatting.
//!
//! Numbers are composed per place value: hundreds, tens and units letters,
//! with the thousands rendered as a complete numeral of their own (closing
//! mark included) followed by a `'` separator, so `1000` is `א''` and never
//! collides with `1`.
//! Fifteen and sixteen are always written `טו` / `טז`, and the final group
//! is punctuated with geresh (`'`) or gershayim (`"`).

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::Error;
use crate::result::Result;

/// Values 1-9.
const UNITS: [char; 9] = ['א', 'ב', 'ג', 'ד', 'ה', 'ו', 'ז', 'ח', 'ט'];

/// Values 10-90.
const TENS: [char; 9] = ['י', 'כ', 'ל', 'מ', 'נ', 'ס', 'ע', 'פ', 'צ'];

/// Values 100-400: the last four letters of the alphabet.
const HUNDREDS: [char; 4] = ['ק', 'ר', 'ש', 'ת'];

/// 400, repeated to build 500-900.
const TAV: char = 'ת';

/// Replacements for 10+5 and 10+6.
const FIFTEEN: [char; 2] = ['ט', 'ו'];
const SIXTEEN: [char; 2] = ['ט', 'ז'];

/// Separates the thousands from the rest of the numeral.
pub const THOUSANDS_SEPARATOR: char = '\'';

/// Marks a single-letter numeral.
pub const GERESH: char = '\'';

/// Marks a multi-letter numeral.
pub const GERSHAYIM: char = '"';

/// How chapter and verse numbers are presented.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum NumeralMode {
    /// Gematria letters (`א'`, `י"ב`, ...).
    #[default]
    Hebrew,
    /// Plain decimal digits.
    Arabic,
}

impl NumeralMode {
    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Hebrew => Self::Arabic,
            Self::Arabic => Self::Hebrew,
        }
    }
}

/// Format a positive number in the given mode.
///
/// # Errors
///
/// Returns [`Error::InvalidNumeral`] for zero.
pub fn format(n: u32, mode: NumeralMode) -> Result<String> {
    NonZeroU32::new(n)
        .map(|value| format_nonzero(value, mode))
        .ok_or_else(|| Error::invalid_numeral(i64::from(n)))
}

/// Format a signed number, rejecting anything outside `1..=u32::MAX`.
///
/// # Errors
///
/// Returns [`Error::InvalidNumeral`] for non-positive or out-of-range input.
pub fn format_integer(n: i64, mode: NumeralMode) -> Result<String> {
    u32::try_from(n)
        .ok()
        .and_then(NonZeroU32::new)
        .map(|value| format_nonzero(value, mode))
        .ok_or_else(|| Error::invalid_numeral(n))
}

/// Format a number that is known to be positive.
#[must_use]
pub fn format_nonzero(n: NonZeroU32, mode: NumeralMode) -> String {
    match mode {
        NumeralMode::Arabic => n.to_string(),
        NumeralMode::Hebrew => to_gematria(n),
    }
}

/// Label for a 1-based chapter or verse number. Zero or values beyond `u32`
/// cannot come out of a dense corpus and fall back to plain digits.
#[must_use]
pub fn label(n: usize, mode: NumeralMode) -> String {
    u32::try_from(n)
        .ok()
        .and_then(NonZeroU32::new)
        .map_or_else(|| n.to_string(), |value| format_nonzero(value, mode))
}

/// `chapter:verse` in the given mode.
#[must_use]
pub fn reference(chapter: usize, verse: usize, mode: NumeralMode) -> String {
    format!("{}:{}", label(chapter, mode), label(verse, mode))
}

/// Render `n` as punctuated gematria.
///
/// ```
/// use std::num::NonZeroU32;
/// use tanakh_core::gematria::to_gematria;
///
/// let twelve = NonZeroU32::new(12).map(to_gematria);
/// assert_eq!(twelve.as_deref(), Some("י\"ב"));
/// ```
#[must_use]
pub fn to_gematria(n: NonZeroU32) -> String {
    let value = n.get();

    let mut out = String::new();
    if let Some(thousands) = NonZeroU32::new(value / 1000) {
        out.push_str(&to_gematria(thousands));
        out.push(THOUSANDS_SEPARATOR);
    }
    punctuate(&mut out, &group_letters(value % 1000));
    out
}

/// Letters for a value below 1000.
fn group_letters(value: u32) -> Vec<char> {
    let mut letters = Vec::new();

    let mut hundreds = value / 100;
    while hundreds > 4 {
        letters.push(TAV);
        hundreds -= 4;
    }
    letters.extend(digit(&HUNDREDS, hundreds));

    match ((value / 10) % 10, value % 10) {
        (1, 5) => letters.extend(FIFTEEN),
        (1, 6) => letters.extend(SIXTEEN),
        (tens, units) => {
            letters.extend(digit(&TENS, tens));
            letters.extend(digit(&UNITS, units));
        }
    }

    letters
}

/// Letter for digit `d` (1-based) in `table`; zero has no letter.
fn digit(table: &[char], d: u32) -> Option<char> {
    d.checked_sub(1)
        .and_then(|index| usize::try_from(index).ok())
        .and_then(|index| table.get(index))
        .copied()
}

fn punctuate(out: &mut String, letters: &[char]) {
    match letters {
        [] => {}
        [only] => {
            out.push(*only);
            out.push(GERESH);
        }
        [first, second] => {
            out.push(*first);
            out.push(GERSHAYIM);
            out.push(*second);
        }
        many => {
            out.extend(many);
            out.push(GERSHAYIM);
        }
    }
}
