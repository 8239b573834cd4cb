//! Scenario model: users, Starlink satellites and non-Starlink interferers

use crate::geometry::Position;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 0-based index into [`Scenario::users`]. Serialized 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "usize", try_from = "usize")]
pub struct UserId(pub usize);

/// 0-based index into [`Scenario::satellites`]. Serialized 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "usize", try_from = "usize")]
pub struct SatelliteId(pub usize);

macro_rules! one_based_conversions {
    ($id:ident) => {
        impl From<$id> for usize {
            fn from(id: $id) -> usize {
                id.one_based()
            }
        }

        impl TryFrom<usize> for $id {
            type Error = String;

            fn try_from(one_based: usize) -> std::result::Result<Self, Self::Error> {
                one_based
                    .checked_sub(1)
                    .map($id)
                    .ok_or_else(|| format!("{} ids start at 1", stringify!($id)))
            }
        }
    };
}

one_based_conversions!(UserId);
one_based_conversions!(SatelliteId);

impl UserId {
    /// 1-based id as used in scenario and solution files
    pub fn one_based(self) -> usize {
        self.0 + 1
    }
}

impl SatelliteId {
    /// 1-based id as used in scenario and solution files
    pub fn one_based(self) -> usize {
        self.0 + 1
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.one_based())
    }
}

impl fmt::Display for SatelliteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.one_based())
    }
}

/// Role keyword at the start of a scenario line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Satellite,
    Interferer,
}

impl Role {
    pub fn keyword(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Satellite => "sat",
            Role::Interferer => "interferer",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "sat" => Ok(Role::Satellite),
            "interferer" => Ok(Role::Interferer),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Static positions for one planning run.
///
/// Each sequence keeps input order; an entity's index is its id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub users: Vec<Position>,
    pub satellites: Vec<Position>,
    pub interferers: Vec<Position>,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a position to the sequence for `role`
    pub fn push(&mut self, role: Role, position: Position) {
        match role {
            Role::User => self.users.push(position),
            Role::Satellite => self.satellites.push(position),
            Role::Interferer => self.interferers.push(position),
        }
    }

    /// # Panics
    ///
    /// Panics if `id` is not a user of this scenario; see [`Scenario::get_user`].
    pub fn user(&self, id: UserId) -> &Position {
        &self.users[id.0]
    }

    /// # Panics
    ///
    /// Panics if `id` is not a satellite of this scenario; see [`Scenario::get_satellite`].
    pub fn satellite(&self, id: SatelliteId) -> &Position {
        &self.satellites[id.0]
    }

    pub fn get_user(&self, id: UserId) -> Option<&Position> {
        self.users.get(id.0)
    }

    pub fn get_satellite(&self, id: SatelliteId) -> Option<&Position> {
        self.satellites.get(id.0)
    }

    pub fn user_ids(&self) -> impl Iterator<Item = UserId> + '_ {
        (0..self.users.len()).map(UserId)
    }

    pub fn satellite_ids(&self) -> impl Iterator<Item = SatelliteId> + '_ {
        (0..self.satellites.len()).map(SatelliteId)
    }
}
