//! Experience and score formulas.

/// Base XP for each correct answer.
pub const XP_PER_CORRECT: u32 = 10;

/// Extra multiplier added per consecutive correct answer after the first.
pub const STREAK_BONUS_STEP: f64 = 0.2;

/// XP granted for each country a completion unlocks.
pub const XP_PER_UNLOCK: u32 = 40;

/// Score for a perfect quiz.
pub const QUIZ_POINTS_MAX: u32 = 100;

/// XP for a sequence of answers.
///
/// The n-th answer of an unbroken run of correct answers is worth
/// `XP_PER_CORRECT * (1 + (n - 1) * STREAK_BONUS_STEP)`, rounded. A wrong
/// answer earns nothing and resets the run. The total saturates at
/// `u64::MAX`.
pub fn calculate_xp<I>(answers: I) -> u64
where
    I: IntoIterator<Item = bool>,
{
    let mut streak = 0u64;
    let mut total = 0u64;
    for correct in answers {
        if correct {
            streak = streak.saturating_add(1);
            let multiplier = 1.0 + (streak - 1) as f64 * STREAK_BONUS_STEP;
            let xp = (f64::from(XP_PER_CORRECT) * multiplier).round_ties_even() as u64;
            total = total.saturating_add(xp);
        } else {
            streak = 0;
        }
    }
    total
}

/// Accuracy as a percentage of `QUIZ_POINTS_MAX`, rounding half to even.
/// Zero when no questions were asked. `correct` is not capped, so reporting
/// more correct answers than questions scores above the maximum.
pub fn calculate_quiz_points(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let ratio = f64::from(correct) / f64::from(total);
    (ratio * f64::from(QUIZ_POINTS_MAX)).round_ties_even() as u32
}

/// Points for a head-to-head match. Same formula as a solo quiz for now.
pub fn calculate_match_points(correct: u32, total: u32) -> u32 {
    calculate_quiz_points(correct, total)
}

/// XP bonus for unlocking `unlocked` countries at once.
pub fn unlock_bonus(unlocked: usize) -> u32 {
    XP_PER_UNLOCK.saturating_mul(u32::try_from(unlocked).unwrap_or(u32::MAX))
}
