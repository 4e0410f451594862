use crate::action_log::ActionLog;
use crate::barrier::{BarrierCoordinator, StartBarrier};
use crate::broadcaster::Broadcaster;
use crate::connection::{ConnectionBroker, Disconnect};
use crate::errors::{ConnectionError, ServerError};
use crate::protocol::WireFormat;
use crate::session::{GameSession, MatchOutcome};
use dobble_engine::logger::MatchLogger;
use dobble_engine::player::PlayerId;
use dobble_engine::rules::GameRules;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PLAYERS: usize = 4;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    host: String,
    port: u16,
    players: usize,
    rules: GameRules,
    seed: Option<u64>,
    wire: WireFormat,
    action_log: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            players: DEFAULT_PLAYERS,
            rules: GameRules::default(),
            seed: None,
            wire: WireFormat::default(),
            action_log: None,
        }
    }

    /// Loopback, ephemeral port, fixed seed.
    pub fn for_tests(players: usize) -> Self {
        Self::new("127.0.0.1", 0).with_players(players).with_seed(7)
    }

    pub fn with_players(mut self, players: usize) -> Self {
        self.players = players;
        self
    }

    pub fn with_rules(mut self, rules: GameRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_wire_format(mut self, wire: WireFormat) -> Self {
        self.wire = wire;
        self
    }

    pub fn with_action_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.action_log = Some(path.into());
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn players(&self) -> usize {
        self.players
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn wire_format(&self) -> WireFormat {
        self.wire
    }

    pub fn action_log(&self) -> Option<&Path> {
        self.action_log.as_deref()
    }

    pub fn validate(&self) -> Result<(), ServerError> {
        if self.players == 0 {
            return Err(ServerError::ConfigError(
                "a match needs at least one player".to_string(),
            ));
        }
        if PlayerId::try_from(self.players).is_err() {
            return Err(ServerError::ConfigError(format!(
                "too many players: {}",
                self.players
            )));
        }
        self.rules
            .validate()
            .map_err(|err| ServerError::ConfigError(err.to_string()))
    }
}

/// Hosts a single match: accepts players until the lobby is full, runs the
/// game, and ends once every connection has closed.
#[derive(Debug, Clone)]
pub struct GameServer {
    config: ServerConfig,
}

impl GameServer {
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let GameServer { config } = self;
        let bind_addr = Self::bind_addr(&config)?;
        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(ServerError::BindError)?;
        let addr = listener.local_addr().map_err(ServerError::BindError)?;

        let log = match config.action_log() {
            Some(path) => MatchLogger::create(path)
                .and_then(ActionLog::spawn)
                .map_err(ServerError::ActionLog)?,
            None => ActionLog::disabled(),
        };

        tracing::info!(
            %addr,
            players = config.players(),
            symbols_per_card = config.rules().symbols_per_card,
            starting_cards = config.rules().starting_cards,
            "game server listening"
        );

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run_match(listener, config, log, shutdown_rx));

        Ok(ServerHandle::new(addr, shutdown_tx, task))
    }

    fn bind_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
        let host = config.host();

        if let Ok(addr) = host.parse::<SocketAddr>() {
            return Ok(addr);
        }

        if let Ok(ip) = host.parse::<std::net::IpAddr>() {
            return Ok(SocketAddr::new(ip, config.port()));
        }

        let candidate = format!("{}:{}", host, config.port());
        let mut addrs = candidate.to_socket_addrs().map_err(|err| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`: {err}"))
        })?;

        addrs.next().ok_or_else(|| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`"))
        })
    }
}

type Connections = JoinSet<Result<Disconnect, ConnectionError>>;

async fn run_match(
    listener: TcpListener,
    config: ServerConfig,
    log: ActionLog,
    mut shutdown: oneshot::Receiver<()>,
) -> Result<MatchOutcome, ServerError> {
    let broadcaster = Broadcaster::new();
    let (barrier, coordinator) = StartBarrier::new(config.players());
    let mut connections = Connections::new();

    let session = tokio::select! {
        session = lobby(&listener, &config, &broadcaster, barrier, coordinator, log, &mut connections) => session?,
        _ = &mut shutdown => {
            connections.shutdown().await;
            return Err(ServerError::Shutdown);
        }
    };
    // late connections are refused from here on
    drop(listener);

    loop {
        tokio::select! {
            joined = connections.join_next() => match joined {
                Some(result) => reap(result),
                None => break,
            },
            _ = &mut shutdown => {
                tracing::info!("shutdown requested during match");
                connections.shutdown().await;
                return Err(ServerError::Shutdown);
            }
        }
    }

    session.close_action_log().await?;
    let outcome = session.outcome()?;
    tracing::info!(
        finished = outcome.finished,
        winner = ?outcome.winner,
        turns = outcome.turns,
        actions = outcome.actions,
        "match over"
    );
    Ok(outcome)
}

/// Accepts connections until the barrier has built the session.
async fn lobby(
    listener: &TcpListener,
    config: &ServerConfig,
    broadcaster: &Broadcaster,
    barrier: StartBarrier<Arc<GameSession>>,
    coordinator: BarrierCoordinator<Arc<GameSession>>,
    log: ActionLog,
    connections: &mut Connections,
) -> Result<Arc<GameSession>, ServerError> {
    let rules = config.rules().clone();
    let seed = config.seed();
    let wire = config.wire_format();
    let session_broadcaster = broadcaster.clone();
    let start = coordinator.run(move |seats| {
        GameSession::new(seats, rules, seed, log, session_broadcaster, wire).map(Arc::new)
    });
    tokio::pin!(start);

    let mut next_id: PlayerId = 0;
    loop {
        tokio::select! {
            session = &mut start => return Ok(session?),
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(pair) => pair,
                    Err(err) => {
                        tracing::warn!(error = %err, "accept failed");
                        continue;
                    }
                };
                let player_id = next_id;
                next_id += 1;
                tracing::info!(player_id, %peer, "connection accepted");

                let broker = ConnectionBroker::new(
                    player_id,
                    stream,
                    wire,
                    config.rules().symbols_per_card,
                    barrier.clone(),
                    broadcaster.clone(),
                );
                connections.spawn(broker.run());
            }
            Some(result) = connections.join_next(), if !connections.is_empty() => reap(result),
        }
    }
}

fn reap(result: Result<Result<Disconnect, ConnectionError>, tokio::task::JoinError>) {
    match result {
        Ok(Ok(reason)) => tracing::debug!(reason = ?reason, "connection task finished"),
        Ok(Err(err)) => tracing::debug!(error = %err, "connection task failed"),
        Err(err) => tracing::warn!(error = %err, "connection task panicked"),
    }
}

#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<MatchOutcome, ServerError>>>,
}

impl ServerHandle {
    fn new(
        addr: SocketAddr,
        shutdown: oneshot::Sender<()>,
        task: JoinHandle<Result<MatchOutcome, ServerError>>,
    ) -> Self {
        Self {
            addr,
            shutdown: Some(shutdown),
            task: Some(task),
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    /// Waits for the match to end and every connection to close.
    pub async fn wait(mut self) -> Result<MatchOutcome, ServerError> {
        match self.task.take() {
            Some(task) => task
                .await
                .map_err(|err| ServerError::Join(err.to_string()))?,
            None => Err(ServerError::Shutdown),
        }
    }

    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            match task.await {
                Ok(Ok(_)) | Ok(Err(ServerError::Shutdown)) => {}
                Ok(Err(err)) => return Err(err),
                Err(err) => return Err(ServerError::Join(err.to_string())),
            }
        }

        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_empty_lobby_and_bad_rules() {
        let err = ServerConfig::for_tests(0).validate().unwrap_err();
        assert!(matches!(err, ServerError::ConfigError(_)));

        let rules = GameRules {
            symbols_count: 3,
            ..GameRules::default()
        };
        let err = GameServer::new(ServerConfig::for_tests(2).with_rules(rules)).unwrap_err();
        assert!(err.to_string().contains("too small"));
    }

    #[test]
    fn bind_addr_accepts_ips_and_full_addresses() {
        let config = ServerConfig::new("127.0.0.1", 9000);
        assert_eq!(
            GameServer::bind_addr(&config).unwrap(),
            "127.0.0.1:9000".parse().unwrap()
        );
        let config = ServerConfig::new("0.0.0.0:1234", 9000);
        assert_eq!(GameServer::bind_addr(&config).unwrap().port(), 1234);
    }

    #[tokio::test]
    async fn ephemeral_port_is_reported() {
        let server = GameServer::new(ServerConfig::for_tests(2)).unwrap();
        let handle = server.start().await.unwrap();
        assert_ne!(handle.address().port(), 0);
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn unwritable_action_log_fails_start() {
        let dir = tempfile::tempdir().unwrap();
        // a directory cannot be opened as the log file
        let server =
            GameServer::new(ServerConfig::for_tests(1).with_action_log(dir.path())).unwrap();
        assert!(matches!(
            server.start().await,
            Err(ServerError::ActionLog(_))
        ));
    }
}
