use crate::rational::Rational;
use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Question tier. Also drives how quickly the bot answers (see `bot`).
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Mid,
    Hard,
}

/// One round's problem. Immutable once generated; a fresh one is created
/// every round and the previous one discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub prompt: String,
    /// Canonical answer: an integer literal or a reduced fraction `"n/d"`.
    /// Always re-parseable by the answer evaluator.
    pub answer: String,
}

pub fn generate(difficulty: Difficulty) -> Question {
    generate_with(&mut rand::thread_rng(), difficulty)
}

pub fn generate_with<R: Rng>(rng: &mut R, difficulty: Difficulty) -> Question {
    match difficulty {
        Difficulty::Easy => integer_question(rng, 20),
        Difficulty::Mid => {
            if rng.gen_bool(0.5) {
                integer_question(rng, 50)
            } else {
                fraction_question(rng)
            }
        }
        Difficulty::Hard => match rng.gen_range(0..3) {
            0 => integer_question(rng, 100),
            1 => fraction_question(rng),
            _ => root_question(rng),
        },
    }
}

/// `a op b` with op drawn from {+, -, *}; the first operand lands in
/// `5..=bound`, the second in `1..=bound/2`. Subtraction operands are
/// ordered so the answer is never negative.
fn integer_question<R: Rng>(rng: &mut R, bound: i64) -> Question {
    let op = ["+", "-", "*"][rng.gen_range(0..3)];
    let mut a = rng.gen_range(5..=bound);
    let mut b = rng.gen_range(1..=bound / 2);
    if op == "-" && b > a {
        std::mem::swap(&mut a, &mut b);
    }
    let answer = match op {
        "+" => a + b,
        "-" => a - b,
        _ => a * b,
    };
    Question {
        prompt: format!("{} {} {} = ?", a, op, b),
        answer: answer.to_string(),
    }
}

/// Two small fractions, + or -, result reduced to lowest terms.
fn fraction_question<R: Rng>(rng: &mut R) -> Question {
    let subtract = rng.gen_bool(0.5);
    let mut p1 = small_fraction(rng);
    let mut p2 = small_fraction(rng);
    if subtract && p2 > p1 {
        std::mem::swap(&mut p1, &mut p2);
    }
    let (op, answer) = if subtract {
        ("-", p1.sub(&p2))
    } else {
        ("+", p1.add(&p2))
    };
    Question {
        prompt: format!("{} {} {} = ?", p1, op, p2),
        answer: answer.to_string(),
    }
}

fn small_fraction<R: Rng>(rng: &mut R) -> Rational {
    // Denominator range excludes 1 so the operand reads as a fraction
    Rational::new(rng.gen_range(1..=5), rng.gen_range(2..=6))
        .unwrap_or_else(|| Rational::from_integer(1))
}

/// Combines a perfect square root and a perfect cube root, e.g.
/// `√49 + 3√27 = ?`. Subtraction is ordered so the answer stays
/// non-negative.
fn root_question<R: Rng>(rng: &mut R) -> Question {
    let sq_base = rng.gen_range(3..=10i64);
    let cube_base = rng.gen_range(2..=5i64);
    let square = sq_base * sq_base;
    let cube = cube_base * cube_base * cube_base;
    if rng.gen_bool(0.5) {
        Question {
            prompt: format!("√{} + 3√{} = ?", square, cube),
            answer: (sq_base + cube_base).to_string(),
        }
    } else if sq_base > cube_base {
        Question {
            prompt: format!("√{} - 3√{} = ?", square, cube),
            answer: (sq_base - cube_base).to_string(),
        }
    } else {
        Question {
            prompt: format!("3√{} - √{} = ?", cube, square),
            answer: (cube_base - sq_base).to_string(),
        }
    }
}
