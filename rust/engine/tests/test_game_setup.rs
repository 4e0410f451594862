use dobble_engine::engine::GameEngine;
use dobble_engine::errors::GameError;
use dobble_engine::player::{Ability, Seat};
use dobble_engine::rules::GameRules;

fn seats(n: u32) -> Vec<Seat> {
    (0..n).map(|i| Seat::new(i, format!("Player {i}"))).collect()
}

#[test]
fn new_engine_deals_matching_cards_to_every_player() {
    for seed in 0..50 {
        let eng = GameEngine::new(seats(4), GameRules::default(), Some(seed)).unwrap();
        assert_eq!(eng.players().len(), 4);
        for p in eng.players() {
            assert_eq!(p.card().shared_symbols(eng.top_card()).len(), 1);
            assert_eq!(p.cards_in_hand_count(), 13);
        }
        assert!(!eng.has_finished());
        assert_eq!(eng.winner(), None);
    }
}

#[test]
fn abilities_start_with_charges_and_cooldowns_from_rules() {
    let eng = GameEngine::new(seats(2), GameRules::default(), Some(1)).unwrap();
    let p = eng.player(1).unwrap();
    for ability in [Ability::Swap, Ability::Freeze, Ability::Reroll] {
        assert_eq!(p.ability(ability).charges, 1);
        assert_eq!(p.ability(ability).cooldown, 3);
        assert!(!p.ability(ability).is_ready());
    }
    assert_eq!(p.is_frozen_count(), 0);
}

#[test]
fn same_seed_produces_same_deal() {
    let a = GameEngine::new(seats(3), GameRules::default(), Some(42)).unwrap();
    let b = GameEngine::new(seats(3), GameRules::default(), Some(42)).unwrap();
    assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn invalid_rules_are_rejected_at_setup() {
    let rules = GameRules {
        symbols_count: 10,
        ..GameRules::default()
    };
    let err = GameEngine::new(seats(2), rules, Some(1)).unwrap_err();
    assert!(matches!(err, GameError::UniverseTooSmall { minimum: 15, .. }));
}

#[test]
fn snapshot_keeps_seat_order_and_names() {
    let seats = vec![Seat::new(7, "x"), Seat::new(2, "y")];
    let eng = GameEngine::new(seats, GameRules::default(), Some(3)).unwrap();
    let snap = eng.snapshot();
    let ids: Vec<u32> = snap.players.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![7, 2]);
    assert_eq!(snap.player(2).unwrap().name, "y");
    assert_eq!(snap.symbols_per_card, 8);
    assert_eq!(snap.turn, 0);
}
