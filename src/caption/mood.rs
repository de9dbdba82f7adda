use std::fmt;

/// Moods with a registered prompt and fallback pool.
///
/// Callers may send any string; unrecognized moods resolve to [`Mood::Happy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Happy,
    Sad,
    Love,
    Motivational,
    Funny,
}

impl Mood {
    pub const ALL: [Mood; 5] = [Mood::Happy, Mood::Sad, Mood::Love, Mood::Motivational, Mood::Funny];

    /// Exact, case-sensitive lookup of a known mood key.
    pub fn parse(key: &str) -> Option<Mood> {
        Self::ALL.into_iter().find(|mood| mood.as_str() == key)
    }

    /// Known mood for `key`, defaulting to `Happy`.
    pub fn resolve(key: &str) -> Mood {
        Self::parse(key).unwrap_or(Mood::Happy)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Love => "love",
            Mood::Motivational => "motivational",
            Mood::Funny => "funny",
        }
    }

    /// Instruction sent to the text-generation model.
    pub fn prompt(self) -> &'static str {
        match self {
            Mood::Happy => {
                "Write a happy, uplifting social media caption that spreads positivity and joy"
            }
            Mood::Sad => {
                "Write a thoughtful, empathetic social media caption for sad moments that offers comfort"
            }
            Mood::Love => "Write a romantic, loving social media caption that expresses deep affection",
            Mood::Motivational => {
                "Write an inspiring, motivational social media caption that encourages and empowers"
            }
            Mood::Funny => "Write a funny, humorous social media caption that makes people laugh",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
