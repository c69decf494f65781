//! Cutter number generation.
//!
//! Implements the LC Cutter table: an initial letter followed by digits
//! derived from the following letters. Purely positional, no checksum.

/// Expansion digits for third and later letters.
const EXPANSION: [(char, u8); 7] = [
    ('a', 3),
    ('e', 4),
    ('i', 5),
    ('m', 6),
    ('p', 7),
    ('t', 8),
    ('w', 9),
];

/// Second-letter digits after an initial vowel.
const AFTER_VOWEL: [(char, u8); 8] = [
    ('b', 2),
    ('d', 3),
    ('l', 4),
    ('n', 5),
    ('p', 6),
    ('r', 7),
    ('s', 8),
    ('u', 9),
];

/// Second-letter digits after initial S.
const AFTER_S: [(char, u8); 8] = [
    ('a', 2),
    ('c', 3),
    ('e', 4),
    ('h', 5),
    ('m', 6),
    ('t', 7),
    ('u', 8),
    ('w', 9),
];

/// Third-letter digits after initial Qu.
const AFTER_QU: [(char, u8); 7] = [
    ('a', 3),
    ('e', 4),
    ('i', 5),
    ('o', 6),
    ('r', 7),
    ('t', 8),
    ('y', 9),
];

/// Second-letter digits after other initial consonants.
const AFTER_CONSONANT: [(char, u8); 7] = [
    ('a', 3),
    ('e', 4),
    ('i', 5),
    ('o', 6),
    ('r', 7),
    ('u', 8),
    ('y', 9),
];

/// Letters falling between table entries take the digit of the earlier entry.
fn table_digit(letter: char, table: &[(char, u8)]) -> u8 {
    let mut digit = table[0].1;
    for &(threshold, value) in table {
        if letter >= threshold {
            digit = value;
        } else {
            break;
        }
    }
    digit
}

fn is_vowel(letter: char) -> bool {
    matches!(letter, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Derive a Cutter number from a name or title.
///
/// Non-alphabetic characters are ignored; returns `None` when no letters
/// remain. The result is the uppercased initial plus up to `digits` digits.
pub fn cutter_number(input: &str, digits: usize) -> Option<String> {
    let letters: Vec<char> = input
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let (&first, rest) = letters.split_first()?;

    let mut out = String::new();
    out.push(first.to_ascii_uppercase());

    // Position in `rest` where expansion digits start.
    let mut expansion_from = 1;

    if let Some(&second) = rest.first() {
        let second_digit = if is_vowel(first) {
            table_digit(second, &AFTER_VOWEL)
        } else if first == 's' {
            // Only "Sch" takes the ch slot; plain "Sc" rounds down to Sa.
            if second == 'c' {
                if rest.get(1) == Some(&'h') {
                    // Sch is a unit; expansion starts after the h.
                    expansion_from = 2;
                    3
                } else {
                    2
                }
            } else {
                table_digit(second, &AFTER_S)
            }
        } else if first == 'q' {
            if second == 'u' {
                // Qu uses the third letter; expansion then starts at the fourth.
                expansion_from = 2;
                rest.get(1)
                    .map(|&third| table_digit(third, &AFTER_QU))
                    .unwrap_or(2)
            } else {
                2
            }
        } else {
            table_digit(second, &AFTER_CONSONANT)
        };
        out.push(char::from(b'0' + second_digit));
    }

    for &letter in rest.iter().skip(expansion_from).take(digits.saturating_sub(1)) {
        out.push(char::from(b'0' + table_digit(letter, &EXPANSION)));
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consonant_initial() {
        assert_eq!(cutter_number("Campbell", 2).as_deref(), Some("C36"));
        assert_eq!(cutter_number("Dunlap", 2).as_deref(), Some("D86"));
        assert_eq!(cutter_number("Lafayette", 2).as_deref(), Some("L34"));
    }

    #[test]
    fn vowel_initial() {
        assert_eq!(cutter_number("Idaho", 2).as_deref(), Some("I33"));
        assert_eq!(cutter_number("IBM", 2).as_deref(), Some("I26"));
    }

    #[test]
    fn s_initial() {
        assert_eq!(cutter_number("Sadron", 2).as_deref(), Some("S23"));
        assert_eq!(cutter_number("Shillingburg", 2).as_deref(), Some("S55"));
        // Sch takes the ch slot, plain Sc rounds down.
        assert_eq!(cutter_number("Schreiber", 2).as_deref(), Some("S37"));
    }

    #[test]
    fn q_initial() {
        assert_eq!(cutter_number("Qadduri", 2).as_deref(), Some("Q23"));
    }

    #[test]
    fn strips_non_alphabetic_input() {
        assert_eq!(cutter_number("  O'Brien! ", 2).as_deref(), Some("O27"));
        assert_eq!(cutter_number("123", 2), None);
        assert_eq!(cutter_number("", 2), None);
    }

    #[test]
    fn short_names_produce_short_cutters() {
        assert_eq!(cutter_number("A", 2).as_deref(), Some("A"));
        assert_eq!(cutter_number("Ab", 2).as_deref(), Some("A2"));
    }

    #[test]
    fn digit_count_extends_with_more_letters() {
        assert_eq!(cutter_number("Campbell", 3).as_deref(), Some("C367"));
    }
}
