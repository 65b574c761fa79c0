//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository/hasher traits, but AppState pins them
//! to the concrete infra implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use rafway_core::auth::service::AuthService;
use rafway_core::chat::exchange::ExchangeService;
use rafway_core::chat::prompt::PromptOptions;
use rafway_core::chat::registry::SessionRegistry;
use rafway_core::llm::box_provider::BoxLlmProvider;
use rafway_core::profile::store::SessionStore;
use rafway_infra::config::load_global_config;
use rafway_infra::crypto::token::Sha256TokenHasher;
use rafway_infra::filesystem::resolve_data_dir;
use rafway_infra::llm::{create_provider, resolve_api_key};
use rafway_infra::report::load_report;
use rafway_infra::sqlite::exchange::SqliteChatLogRepository;
use rafway_infra::sqlite::pool::{DatabasePool, database_url};
use rafway_infra::sqlite::profile::SqliteProfileRepository;
use rafway_infra::sqlite::token::SqliteTokenRepository;
use rafway_types::config::GlobalConfig;
use rafway_types::profile::UserId;
use rafway_types::report::ReportData;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteAuthService =
    AuthService<SqliteProfileRepository, SqliteTokenRepository, Sha256TokenHasher>;

pub type ConcreteExchangeService =
    ExchangeService<SqliteProfileRepository, SqliteChatLogRepository>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<ConcreteAuthService>,
    pub exchange_service: Arc<ConcreteExchangeService>,
    pub chat_log: Arc<SqliteChatLogRepository>,
    pub provider: Arc<BoxLlmProvider>,
    /// Open interactive sessions (REST only; the CLI owns its session directly).
    pub sessions: Arc<SessionRegistry>,
    /// One profile store per signed-in user, shared by all of that user's sessions.
    pub profile_stores: Arc<DashMap<UserId, SessionStore>>,
    pub report: Arc<ReportData>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        Self::from_data_dir(&resolve_data_dir()).await
    }

    /// Same as [`init`](Self::init) with an explicit data directory.
    pub async fn from_data_dir(data_dir: &Path) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;

        let config = load_global_config(data_dir).await;
        let db_pool = DatabasePool::new(&database_url(data_dir)).await?;

        let provider = create_provider(&config.generation, resolve_api_key(&config.generation))?;
        tracing::debug!(
            provider = provider.name(),
            model = provider.default_model(),
            "generation provider ready"
        );

        let auth_service = AuthService::new(
            SqliteProfileRepository::new(db_pool.clone()),
            SqliteTokenRepository::new(db_pool.clone()),
            Sha256TokenHasher::new(),
        );

        let exchange_service = ExchangeService::new(
            SqliteProfileRepository::new(db_pool.clone()),
            SqliteChatLogRepository::new(db_pool.clone()),
            PromptOptions::from(&config.generation),
        );

        let report = load_report(data_dir).await;

        Ok(Self {
            auth_service: Arc::new(auth_service),
            exchange_service: Arc::new(exchange_service),
            chat_log: Arc::new(SqliteChatLogRepository::new(db_pool.clone())),
            provider: Arc::new(provider),
            sessions: Arc::new(SessionRegistry::new()),
            profile_stores: Arc::new(DashMap::new()),
            report: Arc::new(report),
            config: Arc::new(config),
            data_dir: data_dir.to_path_buf(),
            db_pool,
        })
    }

    pub fn prompt_options(&self) -> PromptOptions {
        PromptOptions::from(&self.config.generation)
    }

    /// A fresh profile store for `uid`, loaded from the database.
    pub async fn open_profile_store(&self, uid: &UserId) -> SessionStore {
        let store = SessionStore::spawn(SqliteProfileRepository::new(self.db_pool.clone()));
        store.load(uid).await;
        store
    }

    /// The shared profile store for `uid`, created on first use.
    ///
    /// The profile is reloaded on every call. Queued writes land first, and
    /// charges made through the exchange endpoint become visible.
    pub async fn profile_store(&self, uid: &UserId) -> SessionStore {
        let store = self
            .profile_stores
            .entry(uid.clone())
            .or_insert_with(|| SessionStore::spawn(SqliteProfileRepository::new(self.db_pool.clone())))
            .clone();
        store.load(uid).await;
        store
    }

    /// Close sessions idle for `max_idle`, then drop the stores of users
    /// left without an open session.
    ///
    /// A dropped store's writer finishes its queue and exits. The next request
    /// for that user spawns a fresh store loaded from the database.
    pub fn sweep_idle(&self, max_idle: Duration) -> (usize, usize) {
        let sessions_closed = self.sessions.remove_idle(max_idle);
        let before = self.profile_stores.len();
        self.profile_stores
            .retain(|uid, _| self.sessions.has_sessions_for(uid));
        let stores_dropped = before.saturating_sub(self.profile_stores.len());
        if sessions_closed > 0 || stores_dropped > 0 {
            tracing::info!(sessions_closed, stores_dropped, "idle sweep");
        }
        (sessions_closed, stores_dropped)
    }

    /// Run [`sweep_idle`](Self::sweep_idle) on the configured schedule.
    pub fn spawn_idle_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let state = self.clone();
        let max_idle = Duration::from_secs(self.config.server.session_idle_secs);
        let period = Duration::from_secs(self.config.server.sweep_interval_secs.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                state.sweep_idle(max_idle);
            }
        })
    }

    /// Drop the shared store for `uid` (sign-out).
    pub fn forget_profile_store(&self, uid: &UserId) {
        if let Some((_, store)) = self.profile_stores.remove(uid) {
            store.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rafway_core::chat::session::ChatSession;
    use rafway_types::profile::SignInRequest;

    async fn demo_state(tmp: &tempfile::TempDir) -> AppState {
        tokio::fs::write(
            tmp.path().join("config.toml"),
            "[generation]\nprovider = \"demo\"\ndemo_latency_ms = 0\n",
        )
        .await
        .unwrap();
        AppState::from_data_dir(tmp.path()).await.unwrap()
    }

    async fn sign_in(state: &AppState, email: &str) -> UserId {
        state
            .auth_service
            .sign_in(SignInRequest {
                display_name: Some("Léa Martin".into()),
                email: Some(email.into()),
                photo_url: None,
            })
            .await
            .unwrap()
            .profile
            .uid
    }

    #[tokio::test]
    async fn test_sweep_drops_idle_sessions_and_their_stores() {
        let tmp = tempfile::tempdir().unwrap();
        let state = demo_state(&tmp).await;
        let uid = sign_in(&state, "lea@example.com").await;

        let store = state.profile_store(&uid).await;
        let id = state
            .sessions
            .insert(uid.clone(), ChatSession::new(store, state.prompt_options()));

        assert_eq!(state.sweep_idle(Duration::from_secs(3600)), (0, 0));
        assert!(state.sessions.get(&id, &uid).is_some());

        assert_eq!(state.sweep_idle(Duration::ZERO), (1, 1));
        assert!(state.sessions.is_empty());
        assert!(state.profile_stores.is_empty());

        // Recreated on demand with the stored profile
        let store = state.profile_store(&uid).await;
        assert_eq!(store.current().unwrap().uid, uid);
    }

    #[tokio::test]
    async fn test_sweep_drops_stores_without_sessions() {
        let tmp = tempfile::tempdir().unwrap();
        let state = demo_state(&tmp).await;
        let lea = sign_in(&state, "lea@example.com").await;
        let tom = sign_in(&state, "tom@example.com").await;

        state.profile_store(&lea).await;
        let store = state.profile_store(&tom).await;
        state
            .sessions
            .insert(tom.clone(), ChatSession::new(store, state.prompt_options()));

        assert_eq!(state.sweep_idle(Duration::from_secs(3600)), (0, 1));
        assert!(!state.profile_stores.contains_key(&lea));
        assert!(state.profile_stores.contains_key(&tom));
    }
}
