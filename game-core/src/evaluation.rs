use game_types::Verdict;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error("guess has {guess} letters but the target has {target}")]
    LengthMismatch { guess: usize, target: usize },
    #[error("cannot evaluate an empty word")]
    Empty,
}

pub struct Evaluator;

impl Evaluator {
    /// Compare a guess with the target, one verdict per position.
    ///
    /// Exact matches are `Correct`. Letters missing from the target are
    /// `Absent`. A misplaced letter is `Present` only while the target still
    /// has an unclaimed copy of it: exact matches claim first, then earlier
    /// misplaced copies from left to right, and any further copy is `Absent`.
    ///
    /// Comparison is case-insensitive. Both words must have the same number
    /// of characters.
    pub fn evaluate(guess: &str, target: &str) -> Result<Vec<Verdict>, EvaluationError> {
        let guess: Vec<char> = guess.to_uppercase().chars().collect();
        let target: Vec<char> = target.to_uppercase().chars().collect();

        if guess.len() != target.len() {
            return Err(EvaluationError::LengthMismatch {
                guess: guess.len(),
                target: target.len(),
            });
        }
        if guess.is_empty() {
            return Err(EvaluationError::Empty);
        }

        // First pass: exact positions, letters the target lacks, and a
        // tentative present for everything else
        let mut verdicts: Vec<Verdict> = guess
            .iter()
            .zip(&target)
            .map(|(g, t)| {
                if g == t {
                    Verdict::Correct
                } else if !target.contains(g) {
                    Verdict::Absent
                } else {
                    Verdict::Present
                }
            })
            .collect();

        // Second pass: a letter can't be flagged more often than the target has it
        for i in 0..guess.len() {
            if verdicts[i] != Verdict::Present {
                continue;
            }

            let letter = guess[i];
            let target_count = target.iter().filter(|&&c| c == letter).count();
            let correct_count = guess
                .iter()
                .zip(&target)
                .filter(|&(g, t)| *g == letter && g == t)
                .count();
            let present_count = (0..i)
                .filter(|&j| guess[j] == letter && guess[j] != target[j])
                .count();

            if correct_count + present_count >= target_count {
                verdicts[i] = Verdict::Absent;
            }
        }

        Ok(verdicts)
    }

    pub fn is_solved(verdicts: &[Verdict]) -> bool {
        !verdicts.is_empty() && verdicts.iter().all(|v| *v == Verdict::Correct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_types::Verdict::{Absent as A, Correct as C, Present as P};

    fn eval(guess: &str, target: &str) -> Vec<Verdict> {
        Evaluator::evaluate(guess, target).unwrap()
    }

    #[test]
    fn test_exact_match_is_all_correct() {
        assert_eq!(eval("TESTS", "TESTS"), vec![C, C, C, C, C]);
        assert!(Evaluator::is_solved(&eval("HOUSE", "house")));
    }

    #[test]
    fn test_no_shared_letters_is_all_absent() {
        assert_eq!(eval("QXZZZ", "TESTS"), vec![A, A, A, A, A]);
    }

    #[test]
    fn test_first_letter_correct_second_present() {
        // TOAST vs TESTS: T correct, the second T is still owed one copy
        assert_eq!(eval("TOAST", "TESTS"), vec![C, A, A, P, P]);
    }

    #[test]
    fn test_both_duplicates_present() {
        assert_eq!(eval("OTTOO", "TESTS"), vec![A, P, P, A, A]);
    }

    #[test]
    fn test_present_then_correct_duplicate() {
        assert_eq!(eval("OOTTO", "TESTS"), vec![A, A, P, C, A]);
    }

    #[test]
    fn test_excess_duplicates_become_absent() {
        assert_eq!(eval("STEEL", "TESTS"), vec![P, P, P, A, A]);
        assert_eq!(eval("STEEE", "TESTS"), vec![P, P, P, A, A]);
    }

    #[test]
    fn test_correct_takes_priority_over_earlier_present() {
        // The S in position 0 would be present, but HOUSE's only S is
        // already matched in position 3
        assert_eq!(eval("SOUSE", "HOUSE"), vec![A, C, C, C, C]);
    }

    #[test]
    fn test_leftmost_duplicate_wins_present() {
        // Target has a single L, neither guess L is in place
        assert_eq!(eval("LLAMA", "HELOS"), vec![P, A, A, A, A]);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(eval("hello", "HELLO"), eval("HeLLo", "hElLO"));
        assert!(Evaluator::is_solved(&eval("HeLLo", "hElLO")));
    }

    #[test]
    fn test_multibyte_letters() {
        assert_eq!(eval("AÑEJO", "AÑEJO"), vec![C, C, C, C, C]);
        assert_eq!(eval("ÑANDU", "CAÑAS"), vec![P, C, A, A, A]);
    }

    #[test]
    fn test_mismatched_lengths_are_rejected() {
        assert_eq!(
            Evaluator::evaluate("HI", "HELLO"),
            Err(EvaluationError::LengthMismatch { guess: 2, target: 5 })
        );
        assert!(Evaluator::evaluate("HELLOTHERE", "HELLO").is_err());
        assert_eq!(Evaluator::evaluate("", ""), Err(EvaluationError::Empty));
    }

    #[test]
    fn test_marks_never_exceed_target_occurrences() {
        let words = [
            "TESTS", "STEEL", "STEEE", "TOAST", "OTTOO", "OOTTO", "HOUSE", "SOUSE", "EERIE",
            "LLAMA", "HELLO", "LEVEL", "SASSY", "ESSES", "TTTTT", "ABBEY", "KEBAB",
        ];

        for target in words {
            for guess in words {
                let verdicts = eval(guess, target);
                for letter in guess.chars() {
                    let marked = guess
                        .chars()
                        .zip(&verdicts)
                        .filter(|(c, v)| *c == letter && **v != Verdict::Absent)
                        .count();
                    let available = target.chars().filter(|c| *c == letter).count();
                    assert!(
                        marked <= available,
                        "{guess} vs {target}: {letter} marked {marked} times, target has {available}"
                    );
                }

                // Exact positions are always correct
                for ((g, t), v) in guess.chars().zip(target.chars()).zip(&verdicts) {
                    if g == t {
                        assert_eq!(*v, Verdict::Correct, "{guess} vs {target}");
                    }
                }
            }
        }
    }
}
