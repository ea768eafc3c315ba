// Teams and the sanctioning bodies they play under.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::pitcher::PitcherId;

/// Team identifier, unique within a roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u64);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Youth baseball sanctioning bodies a team can be registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Organization {
    UsaBaseball,
    PitchSmart,
    LittleLeague,
    Pony,
    BabeRuth,
    AmericanLegion,
    Usssa,
    Nfhs,
    Aau,
    Aabc,
    Nabf,
    DixieYouth,
    PerfectGame,
    GameDayUsa,
}

impl Organization {
    pub const ALL: [Organization; 14] = [
        Organization::UsaBaseball,
        Organization::PitchSmart,
        Organization::LittleLeague,
        Organization::Pony,
        Organization::BabeRuth,
        Organization::AmericanLegion,
        Organization::Usssa,
        Organization::Nfhs,
        Organization::Aau,
        Organization::Aabc,
        Organization::Nabf,
        Organization::DixieYouth,
        Organization::PerfectGame,
        Organization::GameDayUsa,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Organization::UsaBaseball => "USA Baseball",
            Organization::PitchSmart => "MLB/Pitch Smart",
            Organization::LittleLeague => "Little League Baseball",
            Organization::Pony => "PONY Baseball",
            Organization::BabeRuth => "Babe Ruth League/Cal Ripken",
            Organization::AmericanLegion => "American Legion Baseball",
            Organization::Usssa => "USSSA",
            Organization::Nfhs => "NFHS",
            Organization::Aau => "AAU Baseball",
            Organization::Aabc => "AABC",
            Organization::Nabf => "NABF",
            Organization::DixieYouth => "Dixie Youth Baseball",
            Organization::PerfectGame => "Perfect Game",
            Organization::GameDayUsa => "Game Day USA",
        }
    }

    /// Look up an organization by its display label (case-insensitive).
    pub fn from_label(s: &str) -> Option<Self> {
        let s = s.trim();
        Organization::ALL
            .into_iter()
            .find(|org| org.label().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Organization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A team and the ordered ids of the pitchers on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub organization: Organization,
    /// Free-form label such as "12U" or "Varsity".
    pub age_group: String,
    pub pitcher_ids: Vec<PitcherId>,
}

impl Team {
    pub fn has_pitcher(&self, pitcher_id: PitcherId) -> bool {
        self.pitcher_ids.contains(&pitcher_id)
    }
}
