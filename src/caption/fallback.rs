//! Pre-written captions, keyed by mood.
//!
//! RNG: uses `rand`'s thread-local RNG by default; deterministic RNGs can be
//! injected via [`fallback_caption_with_rng`].

use crate::caption::Mood;
use rand::{rng, Rng};

type Pool = [&'static str; 5];

const HAPPY: Pool = [
    "Sunshine and smiles make everything better! ☀️✨",
    "Today I choose joy and gratitude! 🌟",
    "Life is beautiful when you focus on the good! 💫",
    "Happiness is not a destination, it's a way of life! 🌈",
    "Every day is a new opportunity to be happy! 🌸",
];

const SAD: Pool = [
    "Sometimes the rain helps us appreciate the sunshine 🌧️",
    "It's okay to not be okay. Tomorrow is a new day 💙",
    "Healing takes time, but every step forward counts 🌱",
    "Even in darkness, there's always a glimmer of hope ✨",
    "Tough times don't last, but tough people do 💪",
];

const LOVE: Pool = [
    "Love is the greatest adventure of all 💕",
    "You make my heart skip a beat every single day 💖",
    "In your arms, I found my home 🏠💕",
    "Love isn't about finding the perfect person, it's about seeing an imperfect person perfectly 💝",
    "You are my today and all of my tomorrows 💕",
];

const MOTIVATIONAL: Pool = [
    "Believe in yourself and all that you are! 💪✨",
    "Success is not final, failure is not fatal: it is the courage to continue that counts 🚀",
    "Your only limit is your mind. Break free! 🌟",
    "Every expert was once a beginner. Keep going! 🔥",
    "The only impossible journey is the one you never begin 🌟",
];

const FUNNY: Pool = [
    "I'm not arguing, I'm just explaining why I'm right 😂",
    "My bed and I have a special relationship. We're perfect for each other 🛏️",
    "I'm not lazy, I'm just on energy-saving mode 🔋",
    "I put the 'pro' in procrastination! 📝",
    "I'm not short, I'm just concentrated awesome! 😄",
];

impl Mood {
    /// The fixed fallback pool for this mood.
    pub fn fallback_pool(self) -> &'static [&'static str] {
        match self {
            Mood::Happy => &HAPPY,
            Mood::Sad => &SAD,
            Mood::Love => &LOVE,
            Mood::Motivational => &MOTIVATIONAL,
            Mood::Funny => &FUNNY,
        }
    }
}

/// Uniformly random caption from `mood`'s pool (the `happy` pool for unknown moods).
pub fn fallback_caption(mood: &str) -> &'static str {
    fallback_caption_with_rng(mood, &mut rng())
}

pub fn fallback_caption_with_rng<R: Rng + ?Sized>(mood: &str, rng: &mut R) -> &'static str {
    let pool = Mood::resolve(mood).fallback_pool();
    pool[rng.random_range(0..pool.len())]
}
