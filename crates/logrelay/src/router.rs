// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Maps event categories to admin API endpoints.
//!
//! The table lists every [`Category`] with its action. There is no default: a new category
//! must be added here before it can route anywhere.

use crate::event::Category;

/// Admin API endpoint receiving a relayed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Endpoint {
    #[display("match-start")]
    MatchStart,
    #[display("round-start")]
    RoundStart,
    #[display("round-end")]
    RoundEnd,
    #[display("player-connect")]
    PlayerConnect,
    #[display("player-disconnect")]
    PlayerDisconnect,
    #[display("player-kill")]
    PlayerKill,
    #[display("player-assist")]
    PlayerAssist,
    #[display("player-attack")]
    PlayerAttack,
    #[display("match-end")]
    MatchEnd,
}

/// One entry per category, in [`Category::ALL`] order.
pub const ROUTING_TABLE: [(Category, Option<Endpoint>); 34] = [
    (Category::ServerMessage, None),
    (Category::FreezTimeStart, None),
    (Category::WorldMatchStart, Some(Endpoint::MatchStart)),
    (Category::WorldRoundStart, Some(Endpoint::RoundStart)),
    (Category::WorldRoundRestart, Some(Endpoint::RoundStart)),
    (Category::WorldRoundEnd, Some(Endpoint::RoundEnd)),
    (Category::WorldGameCommencing, None),
    (Category::TeamScored, None),
    (Category::TeamNotice, None),
    (Category::PlayerConnected, Some(Endpoint::PlayerConnect)),
    (Category::PlayerDisconnected, Some(Endpoint::PlayerDisconnect)),
    (Category::PlayerEntered, Some(Endpoint::PlayerConnect)),
    (Category::PlayerBanned, None),
    (Category::PlayerSwitched, Some(Endpoint::PlayerConnect)),
    (Category::PlayerSay, None),
    (Category::PlayerPurchase, None),
    (Category::PlayerKill, Some(Endpoint::PlayerKill)),
    (Category::PlayerKillAssist, Some(Endpoint::PlayerAssist)),
    (Category::PlayerAttack, Some(Endpoint::PlayerAttack)),
    (Category::PlayerKilledBomb, None),
    (Category::PlayerKilledSuicide, None),
    (Category::PlayerPickedUp, None),
    (Category::PlayerDropped, None),
    (Category::PlayerMoneyChange, None),
    (Category::PlayerBombGot, None),
    (Category::PlayerBombPlanted, None),
    (Category::PlayerBombDropped, None),
    (Category::PlayerBombBeginDefuse, None),
    (Category::PlayerBombDefused, None),
    (Category::PlayerThrew, None),
    (Category::PlayerBlinded, None),
    (Category::ProjectileSpawned, None),
    (Category::GameOver, Some(Endpoint::MatchEnd)),
    (Category::Unknown, None),
];

/// Returns the endpoint an event of `category` is relayed to, if any.
pub fn route(category: Category) -> Option<Endpoint> {
    ROUTING_TABLE
        .iter()
        .find(|(entry, _)| *entry == category)
        .and_then(|(_, endpoint)| *endpoint)
}
