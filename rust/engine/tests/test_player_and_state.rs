use dobble_engine::cards::{Card, Symbol};
use dobble_engine::game::{GameSnapshot, PlayerSnapshot};
use dobble_engine::player::{Ability, AbilityState, Action, ActionKind, PlayerState, Seat};
use dobble_engine::rules::{AbilityRules, GameRules};

fn card(ids: &[u32]) -> Card {
    Card::new(ids.iter().copied().map(Symbol).collect()).unwrap()
}

#[test]
fn player_state_starts_from_rules() {
    let rules = GameRules {
        starting_cards: 5,
        swap: AbilityRules {
            charges: 2,
            cooldown: 1,
        },
        ..GameRules::default()
    };
    let p = PlayerState::new(Seat::new(3, "cleo"), card(&[1, 2, 3]), &rules);
    assert_eq!(p.id(), 3);
    assert_eq!(p.name(), "cleo");
    assert_eq!(p.cards_in_hand_count(), 5);
    assert_eq!(
        *p.ability(Ability::Swap),
        AbilityState {
            charges: 2,
            cooldown: 1
        }
    );
    assert_eq!(p.ability(Ability::Freeze).cooldown, 3);
    assert!(!p.is_frozen());
}

#[test]
fn ability_is_ready_only_with_charges_and_no_cooldown() {
    assert!(AbilityState {
        charges: 1,
        cooldown: 0
    }
    .is_ready());
    assert!(!AbilityState {
        charges: 0,
        cooldown: 0
    }
    .is_ready());
    assert!(!AbilityState {
        charges: 3,
        cooldown: 1
    }
    .is_ready());
}

#[test]
fn action_wire_parts_match_kind_codes() {
    let cases = [
        (Action::PlayCard { symbol: Symbol(12) }, ActionKind::PlayCard, 0, 12),
        (Action::Swap { target: 4 }, ActionKind::Swap, 1, 4),
        (Action::Reroll, ActionKind::Reroll, 2, 0),
        (Action::Freeze { target: 2 }, ActionKind::Freeze, 3, 2),
    ];
    for (action, kind, code, arg) in cases {
        assert_eq!(action.kind(), kind);
        assert_eq!(kind.code(), code);
        assert_eq!(action.argument(), arg);
        assert_eq!(Action::from_parts(code, arg), Some(action));
    }
    assert_eq!(Action::from_parts(4, 0), None);
    assert_eq!(Action::from_parts(-1, 0), None);
}

#[test]
fn action_serializes_with_kind_tag() {
    let json = serde_json::to_string(&Action::Freeze { target: 1 }).unwrap();
    assert_eq!(json, r#"{"kind":"freeze","target":1}"#);
    let back: Action = serde_json::from_str(r#"{"kind":"play_card","symbol":7}"#).unwrap();
    assert_eq!(back, Action::PlayCard { symbol: Symbol(7) });
}

#[test]
fn snapshot_leader_prefers_fewest_cards_then_seat_order() {
    let rules = GameRules::default();
    let mk = |id: u32, count: u32| {
        let mut s = PlayerSnapshot::from(&PlayerState::new(
            Seat::new(id, format!("p{id}")),
            card(&[id, 100 + id]),
            &rules,
        ));
        s.cards_in_hand_count = count;
        s
    };
    let snap = GameSnapshot {
        symbols_per_card: 2,
        top_card: card(&[0, 50]),
        players: vec![mk(0, 9), mk(1, 4), mk(2, 4)],
        has_finished: false,
        winner: None,
        turn: 3,
    };
    assert_eq!(snap.leader().map(|p| p.id), Some(1));
    assert_eq!(snap.playable_symbol(0), Some(Symbol(0)));
    assert_eq!(snap.playable_symbol(1), None);
    assert!(snap.player(7).is_none());
}
