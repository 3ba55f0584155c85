//! Apply semantics between a host engine and a client engine

use cw_common::{Group, TeamColor};
use cw_config::{AgentCount, Config};
use cw_core::{GameEngine, Invalidation};
use cw_sync::{CardDelta, PeerRole, StateSynchronizer, SyncError, SyncKind, SyncMessage};
use cw_test_helpers::prelude::*;
use predicates::prelude::*;

fn pair(config: &Config) -> (GameEngine, GameEngine) {
    let mut host = GameEngine::with_seed(config, 100);
    host.new_game().unwrap();
    host.take_invalidation();
    let client = GameEngine::with_seed(config, 200);
    (host, client)
}

fn client_sync() -> StateSynchronizer {
    StateSynchronizer::new(PeerRole::Client)
}

#[test]
fn test_full_apply_is_idempotent() {
    let (host, mut client) = pair(&fast_config("Player", TeamColor::Blue));
    let full = StateSynchronizer::full_message(&host);

    client_sync().apply(&mut client, full.clone()).unwrap();
    let once = client.snapshot();
    client_sync().apply(&mut client, full).unwrap();
    let twice = client.snapshot();

    assert_eq!(once.board, twice.board);
    assert_eq!(once.teams, twice.teams);
    assert_eq!(twice.first, host.first());
    assert_eq!(twice.turn, host.turn());

    let host_cards: Vec<(&str, Group)> = host.board().iter().map(|c| (c.name.as_str(), c.group)).collect();
    let client_cards: Vec<(&str, Group)> = twice.board.iter().map(|c| (c.name.as_str(), c.group)).collect();
    assert_eq!(host_cards, client_cards);
}

#[test]
fn test_client_recomputes_classes_for_itself() {
    let (mut host, mut client) = pair(&fast_config("Player", TeamColor::Red));
    host.save_profile("Spy", TeamColor::Red, cw_common::Role::Spymaster);

    let full = StateSynchronizer::full_message(&host);
    match &full {
        SyncMessage::Full { cards, .. } => assert!(cards.iter().all(|c| c.class_name.spy)),
        _ => unreachable!(),
    }

    client_sync().apply(&mut client, full).unwrap();
    assert!(client.board().iter().all(|c| c.visual_class.blank));
}

#[test]
fn test_delta_never_unreveals() {
    let (mut host, mut client) = pair(&fast_config("Player", TeamColor::Red));
    client_sync()
        .apply(&mut client, StateSynchronizer::full_message(&host))
        .unwrap();

    let index = 3;
    client.apply_remote_reveal(index, false).unwrap();
    assert!(!host.board()[index].revealed);

    let outcome = client_sync()
        .apply(&mut client, StateSynchronizer::delta_message(&host))
        .unwrap();
    assert!(outcome.revealed.is_empty());
    assert!(client.board()[index].revealed);

    host.commit_reveal(7).unwrap();
    let outcome = client_sync()
        .apply(&mut client, StateSynchronizer::delta_message(&host))
        .unwrap();
    assert_eq!(outcome.revealed, vec![7]);
    assert!(client.board()[index].revealed);
}

#[test]
fn test_client_takes_host_scores() {
    let (mut host, mut client) = pair(&fast_config("Player", TeamColor::Red));
    client_sync()
        .apply(&mut client, StateSynchronizer::full_message(&host))
        .unwrap();

    let red = host.board().iter().position(|c| c.group == Group::Red).unwrap();
    host.commit_reveal(red).unwrap();
    host.end_turn();

    let outcome = client_sync()
        .apply(&mut client, StateSynchronizer::delta_message(&host))
        .unwrap();
    assert_eq!(outcome.turn_changed, Some(host.turn()));
    assert_eq!(client.teams().red.cards_found, 1);
    assert_eq!(client.teams().red.label, host.teams().red.label);
    assert_eq!(client.board()[red].visual_class.group, Some(Group::Red));
}

#[test]
fn test_two_cards_one_entry_is_malformed() {
    let mut config = fast_config("Player", TeamColor::Red);
    config.game.agents = vec![AgentCount::new(Group::Bystander, 2)];
    let (host, mut client) = pair(&config);
    assert_eq!(host.board().len(), 2);

    client_sync()
        .apply(&mut client, StateSynchronizer::full_message(&host))
        .unwrap();
    let teams_before = client.teams().clone();

    let delta = SyncMessage::Delta {
        cards: vec![CardDelta { revealed: true }],
        teams: host.teams().clone(),
        first: host.first(),
        turn: host.turn().other(),
    };
    assert_eq!(delta.card_count(), 1);

    let result = client_sync().apply(&mut client, delta);
    assert!(matches!(result, Err(SyncError::MalformedSyncMessage(_))));
    assert!(client.board().iter().all(|c| !c.revealed));
    assert_eq!(client.turn(), host.turn());
    assert_eq!(client.teams(), &teams_before);
}

#[test]
fn test_host_apply_flags_everyone() {
    let (mut host, mut client) = pair(&fast_config("Player", TeamColor::Red));
    client_sync()
        .apply(&mut client, StateSynchronizer::full_message(&host))
        .unwrap();
    client.take_invalidation();

    let assassin = client.board().iter().position(|c| c.group == Group::Assassin).unwrap();
    client.commit_reveal(assassin).unwrap();

    let turn = host.turn();
    let outcome = StateSynchronizer::new(PeerRole::Host)
        .apply(&mut host, StateSynchronizer::delta_message(&client))
        .unwrap();

    assert_eq!(outcome.revealed, vec![assassin]);
    assert_eq!(host.winner(), Some(turn.other()));
    assert_eq!(host.take_invalidation(), Some(Invalidation::Incremental));
}

#[test]
fn test_new_state_goes_out_as_full_text() {
    let (host, _) = pair(&fast_config("Player", TeamColor::Red));
    let full = StateSynchronizer::full_message(&host);
    assert_eq!(full.kind(), SyncKind::Full);
    assert!(full_sync_json().eval(&full.to_text().unwrap()));

    let delta = StateSynchronizer::delta_message(&host).to_text().unwrap();
    assert!(!full_sync_json().eval(&delta));
}
