//! Request and reply bodies exchanged with the dungeon service.

use std::fmt;

use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::{EntityKind, GridPosition, TerminalFlags};

/// Placement request body for `POST /api/place_entity/`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    /// Kind of entity to construct.
    pub kind: EntityKind,
    /// Target cell.
    pub position: GridPosition,
}

impl Placement {
    /// Creates a new placement request.
    #[must_use]
    pub const fn new(kind: EntityKind, position: GridPosition) -> Self {
        Self { kind, position }
    }
}

impl Serialize for Placement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        PlacementBody {
            type_entity: self.kind,
            x: self.position.x,
            y: self.position.y,
        }
        .serialize(serializer)
    }
}

#[derive(Serialize)]
struct PlacementBody {
    type_entity: EntityKind,
    x: i32,
    y: i32,
}

/// Body for `POST /api/save_dungeon`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveRequest {
    /// File name the service should write.
    pub filename: String,
    /// Opaque campaign progress stored next to the dungeon.
    pub campaign_progress: serde_json::Value,
}

/// `simulation_started` as sent by the service: a bool or its string spelling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SimulationFlag(bool);

impl SimulationFlag {
    /// Wraps a plain boolean.
    #[must_use]
    pub const fn new(started: bool) -> Self {
        Self(started)
    }

    /// Whether the simulation is (still) running.
    #[must_use]
    pub const fn get(self) -> bool {
        self.0
    }
}

impl Serialize for SimulationFlag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bool(self.0)
    }
}

impl<'de> Deserialize<'de> for SimulationFlag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FlagVisitor;

        impl Visitor<'_> for FlagVisitor {
            type Value = SimulationFlag;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a boolean or the string \"true\"/\"false\"")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(SimulationFlag(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                match value.trim().to_ascii_lowercase().as_str() {
                    "true" => Ok(SimulationFlag(true)),
                    "false" => Ok(SimulationFlag(false)),
                    other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
                }
            }
        }

        deserializer.deserialize_any(FlagVisitor)
    }
}

/// Reply to `GET /api/start_simulation/`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSimulationReply {
    /// Whether the service accepted the launch.
    #[serde(default)]
    pub simulation_started: SimulationFlag,
    /// Explanation supplied when the launch was refused.
    #[serde(default)]
    pub error: Option<String>,
}

/// Interpreted result of a launch attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// The simulation is running.
    Started,
    /// No path exists from the start to the exit.
    Blocked {
        /// Explanation reported by the service.
        reason: String,
    },
}

impl From<StartSimulationReply> for StartOutcome {
    fn from(reply: StartSimulationReply) -> Self {
        if reply.simulation_started.get() {
            Self::Started
        } else {
            Self::Blocked {
                reason: reply
                    .error
                    .unwrap_or_else(|| "simulation could not start".to_owned()),
            }
        }
    }
}

/// Reply to `POST /api/move_hero`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceReply {
    /// Whether the simulation could keep going.
    #[serde(default)]
    pub simulation_started: SimulationFlag,
    /// Set once a hero reached the treasure.
    #[serde(default, rename = "treasureReached")]
    pub treasure_reached: Option<bool>,
    /// Set once every hero fell.
    #[serde(default, rename = "allHeroesDead")]
    pub all_heroes_dead: Option<bool>,
}

/// Interpreted result of a single simulation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdvanceOutcome {
    /// Heroes moved; the simulation continues.
    Continued,
    /// The simulation finished with the given terminal flags.
    Finished(TerminalFlags),
    /// The service could not move any hero.
    Stalled,
}

impl From<AdvanceReply> for AdvanceOutcome {
    fn from(reply: AdvanceReply) -> Self {
        let flags = TerminalFlags {
            treasure_reached: reply.treasure_reached.unwrap_or(false),
            all_heroes_dead: reply.all_heroes_dead.unwrap_or(false),
        };
        if flags.is_terminal() {
            Self::Finished(flags)
        } else if reply.simulation_started.get() {
            Self::Continued
        } else {
            Self::Stalled
        }
    }
}
