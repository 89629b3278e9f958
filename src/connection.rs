use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, error, Logger};
use sqlx::postgres::PgPool;

use crate::config;
use crate::errors::BackendError;

/// Opens a new connection given the connection string.
pub type Connector<C> = Arc<dyn Fn(String) -> BoxFuture<'static, Result<C, sqlx::Error>> + Send + Sync>;

type Attempt<C> = Shared<BoxFuture<'static, Result<C, Arc<sqlx::Error>>>>;

enum State<C> {
    Idle,
    Connecting { attempt_number: u64, attempt: Attempt<C> },
    Connected(C),
}

/// Hands out a single shared connection handle for the lifetime of
/// the process.
///
/// The first caller starts a connection attempt; anyone arriving while
/// it is in flight awaits that same attempt, so the connector runs at
/// most once at a time. A failed attempt is reported to all of its
/// waiters and forgotten, which lets the next caller try again.
pub struct ConnectionCache<C> {
    logger: Logger,
    connection_string: String,
    connector: Connector<C>,
    state: Mutex<State<C>>,
    attempts: Mutex<u64>,
}

impl<C: Clone + Send + Sync + 'static> ConnectionCache<C> {
    pub fn new(logger: Logger, connection_string: impl Into<String>, connector: Connector<C>) -> Self {
        ConnectionCache {
            logger,
            connection_string: connection_string.into(),
            connector,
            state: Mutex::new(State::Idle),
            attempts: Mutex::new(0),
        }
    }

    /// Creates a cache whose connection string comes from
    /// `BACKEND_DB_CONNECTION_STRING`. Fails immediately, without
    /// attempting to connect, when the variable is missing.
    pub fn from_env(logger: Logger, connector: Connector<C>) -> Result<Self, BackendError> {
        Self::from_variable(logger, config::DB_CONNECTION_STRING, connector)
    }

    /// Like [`ConnectionCache::from_env`] but reads the named variable.
    pub fn from_variable(
        logger: Logger,
        name: &str,
        connector: Connector<C>,
    ) -> Result<Self, BackendError> {
        let connection_string = config::require_variable(name)?;

        Ok(Self::new(logger, connection_string, connector))
    }

    /// Returns the cached connection, establishing it first if needed.
    pub async fn get(&self) -> Result<C, BackendError> {
        let (attempt_number, attempt) = {
            let mut state = self.lock_state();

            match &*state {
                State::Connected(connection) => return Ok(connection.clone()),
                State::Connecting {
                    attempt_number,
                    attempt,
                } => (*attempt_number, attempt.clone()),
                State::Idle => {
                    let attempt_number = self.next_attempt_number();
                    debug!(self.logger, "Connecting to database..."; "attempt" => attempt_number);

                    let attempt = self.start_attempt();
                    *state = State::Connecting {
                        attempt_number,
                        attempt: attempt.clone(),
                    };

                    (attempt_number, attempt)
                }
            }
        };

        let result = attempt.await;

        let mut state = self.lock_state();

        // only the attempt that is still current may settle the state
        let is_current = matches!(
            &*state,
            State::Connecting { attempt_number: current, .. } if *current == attempt_number
        );

        match result {
            Ok(connection) => {
                if is_current {
                    debug!(self.logger, "Connected to database."; "attempt" => attempt_number);
                    *state = State::Connected(connection.clone());
                }

                Ok(connection)
            }
            Err(source) => {
                if is_current {
                    error!(self.logger, "Failed to connect to database"; "attempt" => attempt_number, "error" => %source);
                    *state = State::Idle;
                }

                Err(BackendError::Connection { source })
            }
        }
    }

    /// Whether a connection has already been established.
    pub fn is_connected(&self) -> bool {
        matches!(&*self.lock_state(), State::Connected(_))
    }

    fn start_attempt(&self) -> Attempt<C> {
        let future = (self.connector)(self.connection_string.clone());

        async move { future.await.map_err(Arc::new) }.boxed().shared()
    }

    fn next_attempt_number(&self) -> u64 {
        let mut attempts = self.attempts.lock().unwrap_or_else(PoisonError::into_inner);
        *attempts += 1;
        *attempts
    }

    fn lock_state(&self) -> MutexGuard<'_, State<C>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The connector used in production: a PostgreSQL pool.
pub fn postgres_connector() -> Connector<PgPool> {
    Arc::new(|connection_string: String| {
        async move { PgPool::connect(&connection_string).await }.boxed()
    })
}
