// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Typed representation of classified log lines.
//!
//! An [`Event`] serializes to one flat JSON object:
//!
//! ```text
//! {"time":"2019-11-23T19:29:07Z","type":"PlayerKill","attacker":{...},...}
//! ```

use serde::Serialize;
use time::OffsetDateTime;

/// A player reference as rendered in the log: `"name<id><steam_id><side>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    pub name: String,
    pub id: u32,
    pub steam_id: String,
    /// `CT`, `TERRORIST`, `Unassigned`, `Spectator` or empty while connecting.
    pub side: String,
}

/// Integer map coordinates, rendered as `[x y z]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// One classified log line. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// Serializes the event as a single JSON line (without the trailing newline).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Category-specific payload of an [`Event`]. The variant name is emitted as `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum EventKind {
    ServerMessage {
        text: String,
    },
    FreezTimeStart,
    WorldMatchStart {
        map: String,
    },
    WorldRoundStart,
    WorldRoundRestart {
        timeleft: u32,
    },
    WorldRoundEnd,
    WorldGameCommencing,
    TeamScored {
        side: String,
        score: u32,
        players: u32,
    },
    TeamNotice {
        side: String,
        notice: String,
        score_ct: u32,
        score_t: u32,
    },
    PlayerConnected {
        player: Player,
        address: String,
    },
    PlayerDisconnected {
        player: Player,
        reason: String,
    },
    PlayerEntered {
        player: Player,
    },
    PlayerBanned {
        player: Player,
        duration: String,
        by: String,
    },
    PlayerSwitched {
        player: Player,
        from: String,
        to: String,
    },
    PlayerSay {
        player: Player,
        text: String,
        team: bool,
    },
    PlayerPurchase {
        player: Player,
        item: String,
    },
    PlayerKill {
        attacker: Player,
        attacker_position: Position,
        victim: Player,
        victim_position: Position,
        weapon: String,
        headshot: bool,
        penetrated: bool,
    },
    PlayerKillAssist {
        attacker: Player,
        victim: Player,
    },
    PlayerAttack {
        attacker: Player,
        attacker_position: Position,
        victim: Player,
        victim_position: Position,
        weapon: String,
        damage: u32,
        damage_armor: u32,
        health: u32,
        armor: u32,
        hitgroup: String,
    },
    PlayerKilledBomb {
        player: Player,
        position: Position,
    },
    PlayerKilledSuicide {
        player: Player,
        position: Position,
        with: String,
    },
    PlayerPickedUp {
        player: Player,
        item: String,
    },
    PlayerDropped {
        player: Player,
        item: String,
    },
    PlayerMoneyChange {
        player: Player,
        previous: i64,
        change: i64,
        result: i64,
        purchase: Option<String>,
    },
    PlayerBombGot {
        player: Player,
    },
    PlayerBombPlanted {
        player: Player,
    },
    PlayerBombDropped {
        player: Player,
    },
    PlayerBombBeginDefuse {
        player: Player,
        kit: bool,
    },
    PlayerBombDefused {
        player: Player,
    },
    PlayerThrew {
        player: Player,
        grenade: String,
        position: Position,
        entindex: Option<u32>,
    },
    PlayerBlinded {
        victim: Player,
        attacker: Player,
        duration: f64,
        entindex: u32,
    },
    ProjectileSpawned {
        position: Vector,
        velocity: Vector,
    },
    GameOver {
        mode: String,
        map_group: String,
        map: String,
        score_ct: u32,
        score_t: u32,
        duration: u32,
    },
    /// A line with a valid header whose body matched no known grammar.
    Unknown {
        raw: String,
    },
}

impl EventKind {
    pub fn category(&self) -> Category {
        match self {
            Self::ServerMessage { .. } => Category::ServerMessage,
            Self::FreezTimeStart => Category::FreezTimeStart,
            Self::WorldMatchStart { .. } => Category::WorldMatchStart,
            Self::WorldRoundStart => Category::WorldRoundStart,
            Self::WorldRoundRestart { .. } => Category::WorldRoundRestart,
            Self::WorldRoundEnd => Category::WorldRoundEnd,
            Self::WorldGameCommencing => Category::WorldGameCommencing,
            Self::TeamScored { .. } => Category::TeamScored,
            Self::TeamNotice { .. } => Category::TeamNotice,
            Self::PlayerConnected { .. } => Category::PlayerConnected,
            Self::PlayerDisconnected { .. } => Category::PlayerDisconnected,
            Self::PlayerEntered { .. } => Category::PlayerEntered,
            Self::PlayerBanned { .. } => Category::PlayerBanned,
            Self::PlayerSwitched { .. } => Category::PlayerSwitched,
            Self::PlayerSay { .. } => Category::PlayerSay,
            Self::PlayerPurchase { .. } => Category::PlayerPurchase,
            Self::PlayerKill { .. } => Category::PlayerKill,
            Self::PlayerKillAssist { .. } => Category::PlayerKillAssist,
            Self::PlayerAttack { .. } => Category::PlayerAttack,
            Self::PlayerKilledBomb { .. } => Category::PlayerKilledBomb,
            Self::PlayerKilledSuicide { .. } => Category::PlayerKilledSuicide,
            Self::PlayerPickedUp { .. } => Category::PlayerPickedUp,
            Self::PlayerDropped { .. } => Category::PlayerDropped,
            Self::PlayerMoneyChange { .. } => Category::PlayerMoneyChange,
            Self::PlayerBombGot { .. } => Category::PlayerBombGot,
            Self::PlayerBombPlanted { .. } => Category::PlayerBombPlanted,
            Self::PlayerBombDropped { .. } => Category::PlayerBombDropped,
            Self::PlayerBombBeginDefuse { .. } => Category::PlayerBombBeginDefuse,
            Self::PlayerBombDefused { .. } => Category::PlayerBombDefused,
            Self::PlayerThrew { .. } => Category::PlayerThrew,
            Self::PlayerBlinded { .. } => Category::PlayerBlinded,
            Self::ProjectileSpawned { .. } => Category::ProjectileSpawned,
            Self::GameOver { .. } => Category::GameOver,
            Self::Unknown { .. } => Category::Unknown,
        }
    }
}

/// The closed set of event categories. Displays as the JSON `type` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Category {
    ServerMessage,
    FreezTimeStart,
    WorldMatchStart,
    WorldRoundStart,
    WorldRoundRestart,
    WorldRoundEnd,
    WorldGameCommencing,
    TeamScored,
    TeamNotice,
    PlayerConnected,
    PlayerDisconnected,
    PlayerEntered,
    PlayerBanned,
    PlayerSwitched,
    PlayerSay,
    PlayerPurchase,
    PlayerKill,
    PlayerKillAssist,
    PlayerAttack,
    PlayerKilledBomb,
    PlayerKilledSuicide,
    PlayerPickedUp,
    PlayerDropped,
    PlayerMoneyChange,
    PlayerBombGot,
    PlayerBombPlanted,
    PlayerBombDropped,
    PlayerBombBeginDefuse,
    PlayerBombDefused,
    PlayerThrew,
    PlayerBlinded,
    ProjectileSpawned,
    GameOver,
    Unknown,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 34] = [
        Category::ServerMessage,
        Category::FreezTimeStart,
        Category::WorldMatchStart,
        Category::WorldRoundStart,
        Category::WorldRoundRestart,
        Category::WorldRoundEnd,
        Category::WorldGameCommencing,
        Category::TeamScored,
        Category::TeamNotice,
        Category::PlayerConnected,
        Category::PlayerDisconnected,
        Category::PlayerEntered,
        Category::PlayerBanned,
        Category::PlayerSwitched,
        Category::PlayerSay,
        Category::PlayerPurchase,
        Category::PlayerKill,
        Category::PlayerKillAssist,
        Category::PlayerAttack,
        Category::PlayerKilledBomb,
        Category::PlayerKilledSuicide,
        Category::PlayerPickedUp,
        Category::PlayerDropped,
        Category::PlayerMoneyChange,
        Category::PlayerBombGot,
        Category::PlayerBombPlanted,
        Category::PlayerBombDropped,
        Category::PlayerBombBeginDefuse,
        Category::PlayerBombDefused,
        Category::PlayerThrew,
        Category::PlayerBlinded,
        Category::ProjectileSpawned,
        Category::GameOver,
        Category::Unknown,
    ];
}
