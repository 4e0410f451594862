/// Full matches over loopback TCP with bots on every seat
use dobble_ai::{BaselineBot, Bot, RandomBot};
use dobble_engine::rules::GameRules;
use dobble_server::{
    ClientSummary, Endianness, GameClient, GameServer, IntWidth, MatchOutcome, ServerConfig,
    WireFormat,
};
use std::time::Duration;
use tokio::task::JoinSet;

const MATCH_TIMEOUT: Duration = Duration::from_secs(30);

async fn run_match(
    config: ServerConfig,
    mut bots: Vec<Box<dyn Bot>>,
) -> (MatchOutcome, Vec<ClientSummary>) {
    let handle = GameServer::new(config)
        .expect("valid config")
        .start()
        .await
        .expect("server starts");
    let addr = handle.address();

    let mut clients = JoinSet::new();
    for (i, mut bot) in bots.drain(..).enumerate() {
        clients.spawn(async move {
            let client = GameClient::connect(addr, &format!("bot-{i}"))
                .await
                .expect("connect");
            client
                .play_until_finished(move |state, me| bot.choose_action(state, me))
                .await
                .expect("client plays")
        });
    }

    let outcome = tokio::time::timeout(MATCH_TIMEOUT, handle.wait())
        .await
        .expect("match ends in time")
        .expect("match outcome");

    let mut summaries = Vec::new();
    while let Some(summary) = clients.join_next().await {
        summaries.push(summary.expect("client task"));
    }
    summaries.sort_by_key(|s| s.player_id);
    (outcome, summaries)
}

fn quick_rules() -> GameRules {
    GameRules {
        starting_cards: 4,
        ..GameRules::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn baseline_bots_finish_a_match() {
    let bots: Vec<Box<dyn Bot>> = (0..4).map(|_| Box::new(BaselineBot::new()) as _).collect();
    let (outcome, summaries) =
        run_match(ServerConfig::for_tests(4).with_rules(quick_rules()), bots).await;

    assert!(outcome.finished);
    let winner = outcome.winner.expect("a winner");
    assert_eq!(outcome.standings.len(), 4);
    let winning = outcome
        .standings
        .iter()
        .find(|s| s.id == winner)
        .expect("winner is seated");
    assert_eq!(winning.cards_in_hand_count, 0);
    assert!(outcome.turns >= 4, "the winner played all four cards");

    // every client saw the end and agrees on the winner
    assert_eq!(summaries.len(), 4);
    for summary in &summaries {
        assert!(summary.finished, "player {} missed FINISH_GAME", summary.player_id);
        let state = summary.final_state.as_ref().expect("saw a state");
        assert!(state.has_finished);
        assert_eq!(state.winner, Some(winner));
    }
    assert_eq!(summaries.iter().filter(|s| s.won()).count(), 1);

    let successes: u64 = summaries.iter().map(|s| s.successes).sum();
    assert!(successes >= outcome.turns);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn names_and_ids_reach_every_player() {
    let bots: Vec<Box<dyn Bot>> = (0..2).map(|_| Box::new(BaselineBot::new()) as _).collect();
    let (outcome, summaries) =
        run_match(ServerConfig::for_tests(2).with_rules(quick_rules()), bots).await;

    let ids: Vec<_> = outcome.standings.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![0, 1]);
    for standing in &outcome.standings {
        assert!(standing.name.starts_with("bot-"));
    }
    let state = summaries[0].final_state.as_ref().unwrap();
    assert_eq!(state.players.len(), 2);
    assert_eq!(state.symbols_per_card, 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn random_bot_gets_rejected_but_match_ends() {
    let bots: Vec<Box<dyn Bot>> = vec![
        Box::new(BaselineBot::new()),
        Box::new(RandomBot::with_seed(5)),
    ];
    let (outcome, summaries) =
        run_match(ServerConfig::for_tests(2).with_rules(quick_rules()), bots).await;

    assert!(outcome.finished);
    let rejections: u64 = summaries.iter().map(|s| s.rejections).sum();
    let sent: u64 = summaries.iter().map(|s| s.actions_sent).sum();
    assert!(sent > 0);
    assert!(rejections <= sent);
    assert!(outcome.actions >= outcome.turns);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn wide_big_endian_format_works_end_to_end() {
    let wire = WireFormat::new(IntWidth::Eight, Endianness::Big);
    let config = ServerConfig::for_tests(2)
        .with_rules(quick_rules())
        .with_wire_format(wire);
    let bots: Vec<Box<dyn Bot>> = (0..2).map(|_| Box::new(BaselineBot::new()) as _).collect();
    let (outcome, summaries) = run_match(config, bots).await;

    assert!(outcome.finished);
    assert!(summaries.iter().all(|s| s.finished));
}

#[tokio::test]
async fn action_log_records_the_match() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("match.jsonl");
    let config = ServerConfig::for_tests(2)
        .with_rules(quick_rules())
        .with_action_log(&path);
    let bots: Vec<Box<dyn Bot>> = (0..2).map(|_| Box::new(BaselineBot::new()) as _).collect();
    let (outcome, _) = run_match(config, bots).await;

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).expect("json line"))
        .collect();
    assert_eq!(lines.len() as u64, outcome.actions);
    let last_success = lines
        .iter()
        .rev()
        .find(|l| l["code"] == "success")
        .expect("a successful action");
    assert_eq!(last_success["finished"], true);
}
