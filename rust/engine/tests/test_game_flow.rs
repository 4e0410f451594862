use dobble_engine::cards::Symbol;
use dobble_engine::engine::GameEngine;
use dobble_engine::player::{Ability, Action, PlayerId, Seat};
use dobble_engine::rules::{AbilityRules, GameRules, ReturnCode};

fn engine(players: u32, rules: GameRules, seed: u64) -> GameEngine {
    let seats = (0..players).map(|i| Seat::new(i, format!("p{i}"))).collect();
    GameEngine::new(seats, rules, Some(seed)).expect("engine")
}

fn instant(charges: u32) -> AbilityRules {
    AbilityRules {
        charges,
        cooldown: 0,
    }
}

fn playable(eng: &GameEngine, id: PlayerId) -> Symbol {
    eng.snapshot()
        .playable_symbol(id)
        .expect("player should have a matching symbol")
}

fn play(eng: &mut GameEngine, id: PlayerId) -> ReturnCode {
    let symbol = playable(eng, id);
    eng.apply_action(id, Action::PlayCard { symbol })
}

#[test]
fn four_player_opening_play() {
    let mut eng = engine(4, GameRules::default(), 2024);
    let before = eng.snapshot();
    let hand = eng.player(0).unwrap().card().clone();

    assert_eq!(play(&mut eng, 0), ReturnCode::Success);

    let p0 = eng.player(0).unwrap();
    assert_eq!(p0.cards_in_hand_count(), 12);
    assert_eq!(eng.top_card(), &hand, "played card becomes the top card");
    assert_ne!(eng.top_card(), &before.top_card);
    assert_eq!(p0.card().shared_symbols(eng.top_card()).len(), 1);
    for p in eng.players() {
        for ability in [Ability::Swap, Ability::Freeze, Ability::Reroll] {
            assert_eq!(p.ability(ability).cooldown, 2);
        }
    }
    assert_eq!(eng.turn(), 1);
}

#[test]
fn play_requires_symbol_in_hand_and_on_top() {
    let mut eng = engine(2, GameRules::default(), 11);
    let before = eng.snapshot();
    let hand = eng.player(0).unwrap().card().clone();
    let top = eng.top_card().clone();

    let missing = (0..57)
        .map(Symbol)
        .find(|s| !hand.contains(*s))
        .unwrap();
    assert_eq!(
        eng.apply_action(0, Action::PlayCard { symbol: missing }),
        ReturnCode::PlayerDoesNotHaveSymbol
    );

    let off_top = hand
        .symbols()
        .iter()
        .copied()
        .find(|s| !top.contains(*s))
        .unwrap();
    assert_eq!(
        eng.apply_action(0, Action::PlayCard { symbol: off_top }),
        ReturnCode::SymbolNotOnTopCard
    );

    assert_eq!(eng.snapshot(), before, "rejected plays must not mutate");
}

#[test]
fn last_card_finishes_the_game_once() {
    let rules = GameRules {
        starting_cards: 2,
        ..GameRules::default()
    };
    let mut eng = engine(2, rules, 5);
    assert_eq!(play(&mut eng, 0), ReturnCode::Success);
    assert!(!eng.has_finished());
    assert_eq!(play(&mut eng, 0), ReturnCode::Success);
    assert!(eng.has_finished());
    assert_eq!(eng.winner(), Some(0));

    let after = eng.snapshot();
    assert_eq!(eng.apply_action(1, Action::Reroll), ReturnCode::InvalidAction);
    let symbol = playable(&eng, 0);
    assert_eq!(
        eng.apply_action(0, Action::PlayCard { symbol }),
        ReturnCode::InvalidAction
    );
    assert_eq!(eng.snapshot(), after);
}

#[test]
fn swap_without_charges_is_rejected_without_mutation() {
    let rules = GameRules {
        swap: instant(0),
        ..GameRules::default()
    };
    let mut eng = engine(2, rules, 8);
    let before = eng.snapshot();
    assert_eq!(
        eng.apply_action(0, Action::Swap { target: 1 }),
        ReturnCode::NoChargesLeft
    );
    assert_eq!(eng.snapshot(), before);
}

#[test]
fn abilities_on_cooldown_are_rejected() {
    let mut eng = engine(2, GameRules::default(), 9);
    let before = eng.snapshot();
    assert_eq!(
        eng.apply_action(0, Action::Swap { target: 1 }),
        ReturnCode::CooldownActive
    );
    assert_eq!(
        eng.apply_action(0, Action::Freeze { target: 1 }),
        ReturnCode::CooldownActive
    );
    assert_eq!(eng.apply_action(0, Action::Reroll), ReturnCode::CooldownActive);
    assert_eq!(eng.snapshot(), before);
}

#[test]
fn unknown_target_is_rejected() {
    let rules = GameRules {
        swap: instant(1),
        freeze: instant(1),
        ..GameRules::default()
    };
    let mut eng = engine(2, rules, 10);
    let before = eng.snapshot();
    assert_eq!(
        eng.apply_action(0, Action::Swap { target: 99 }),
        ReturnCode::PlayerNotFound
    );
    assert_eq!(
        eng.apply_action(0, Action::Freeze { target: 99 }),
        ReturnCode::PlayerNotFound
    );
    assert_eq!(eng.snapshot(), before);
}

#[test]
fn swapping_twice_restores_hands() {
    let rules = GameRules {
        swap: instant(2),
        ..GameRules::default()
    };
    let mut eng = engine(3, rules, 12);
    let c0 = eng.player(0).unwrap().card().clone();
    let c1 = eng.player(1).unwrap().card().clone();

    assert_eq!(
        eng.apply_action(0, Action::Swap { target: 1 }),
        ReturnCode::Success
    );
    assert_eq!(eng.player(0).unwrap().card(), &c1);
    assert_eq!(eng.player(1).unwrap().card(), &c0);

    assert_eq!(
        eng.apply_action(0, Action::Swap { target: 1 }),
        ReturnCode::Success
    );
    assert_eq!(eng.player(0).unwrap().card(), &c0);
    assert_eq!(eng.player(1).unwrap().card(), &c1);

    assert_eq!(eng.player(0).unwrap().ability(Ability::Swap).charges, 0);
    assert_eq!(
        eng.apply_action(0, Action::Swap { target: 1 }),
        ReturnCode::NoChargesLeft
    );
}

#[test]
fn frozen_player_is_blocked_until_next_card_play() {
    let rules = GameRules {
        freeze: instant(1),
        ..GameRules::default()
    };
    let mut eng = engine(2, rules, 13);
    assert_eq!(
        eng.apply_action(1, Action::Freeze { target: 0 }),
        ReturnCode::Success
    );
    assert_eq!(eng.player(0).unwrap().is_frozen_count(), 1);
    assert_eq!(eng.player(1).unwrap().ability(Ability::Freeze).charges, 0);

    let before = eng.snapshot();
    let symbol = playable(&eng, 0);
    assert_eq!(
        eng.apply_action(0, Action::PlayCard { symbol }),
        ReturnCode::PlayerIsFrozen
    );
    // frozen is checked before anything kind specific
    assert_eq!(
        eng.apply_action(0, Action::PlayCard { symbol: Symbol(1000) }),
        ReturnCode::PlayerIsFrozen
    );
    assert_eq!(eng.snapshot(), before, "freeze counter unchanged");

    assert_eq!(play(&mut eng, 1), ReturnCode::Success);
    assert_eq!(eng.player(0).unwrap().is_frozen_count(), 0);
    assert_eq!(
        eng.apply_action(0, Action::PlayCard { symbol: Symbol(1000) }),
        ReturnCode::PlayerDoesNotHaveSymbol
    );
}

#[test]
fn freezes_stack_and_expire_one_per_play() {
    let rules = GameRules {
        freeze: instant(1),
        ..GameRules::default()
    };
    let mut eng = engine(3, rules, 14);
    assert_eq!(
        eng.apply_action(1, Action::Freeze { target: 0 }),
        ReturnCode::Success
    );
    assert_eq!(
        eng.apply_action(2, Action::Freeze { target: 0 }),
        ReturnCode::Success
    );
    assert_eq!(eng.player(0).unwrap().is_frozen_count(), 2);

    assert_eq!(play(&mut eng, 1), ReturnCode::Success);
    assert_eq!(eng.player(0).unwrap().is_frozen_count(), 1);
    assert!(eng.player(0).unwrap().is_frozen());

    assert_eq!(play(&mut eng, 1), ReturnCode::Success);
    assert_eq!(eng.player(0).unwrap().is_frozen_count(), 0);
}

#[test]
fn reroll_deals_matching_card_and_restarts_cooldown() {
    let rules = GameRules {
        reroll: AbilityRules {
            charges: 1,
            cooldown: 2,
        },
        ..GameRules::default()
    };
    let mut eng = engine(2, rules, 15);
    assert_eq!(play(&mut eng, 0), ReturnCode::Success);
    assert_eq!(play(&mut eng, 0), ReturnCode::Success);
    assert_eq!(eng.player(1).unwrap().ability(Ability::Reroll).cooldown, 0);

    assert_eq!(eng.apply_action(1, Action::Reroll), ReturnCode::Success);
    let p1 = eng.player(1).unwrap();
    assert_eq!(p1.card().shared_symbols(eng.top_card()).len(), 1);
    assert_eq!(p1.ability(Ability::Reroll).charges, 0);
    assert_eq!(p1.ability(Ability::Reroll).cooldown, 2);
    assert_eq!(eng.apply_action(1, Action::Reroll), ReturnCode::NoChargesLeft);
}

#[test]
fn abilities_do_not_advance_cooldowns() {
    let rules = GameRules {
        swap: instant(1),
        ..GameRules::default()
    };
    let mut eng = engine(2, rules, 16);
    assert_eq!(
        eng.apply_action(0, Action::Swap { target: 1 }),
        ReturnCode::Success
    );
    let p1 = eng.player(1).unwrap();
    assert_eq!(p1.ability(Ability::Reroll).cooldown, 3);
    assert_eq!(eng.turn(), 0);
}

#[test]
fn counters_never_underflow() {
    let mut eng = engine(2, GameRules::default(), 17);
    for _ in 0..10 {
        assert_eq!(play(&mut eng, 0), ReturnCode::Success);
    }
    for p in eng.players() {
        for ability in [Ability::Swap, Ability::Freeze, Ability::Reroll] {
            assert_eq!(p.ability(ability).cooldown, 0);
            assert_eq!(p.ability(ability).charges, 1);
        }
        assert_eq!(p.is_frozen_count(), 0);
    }
    assert_eq!(eng.player(0).unwrap().cards_in_hand_count(), 3);
}
