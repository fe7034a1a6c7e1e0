//! Transfer configuration.

use crate::base::name::Name;
use crate::utils::config::DefMinMax;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use std::collections::HashMap;
use std::time::Duration;
use std::{error, fmt};

//------------ Constants -----------------------------------------------------

/// The time limit on each network operation of a transfer.
const TIMEOUT: DefMinMax<Duration> = DefMinMax::new(
    Duration::from_secs(2),
    Duration::from_millis(10),
    Duration::from_secs(600),
);

//------------ Config --------------------------------------------------------

/// Configuration for zone transfers.
///
/// The configuration carries the timeouts applied to individual network
/// operations and the table of TSIG secrets keyed by key name. With at
/// least one secret configured, every received message that carries a
/// TSIG record is verified against the table; unsigned messages still
/// pass. With an empty table, TSIG records are ignored entirely.
#[derive(Clone, Debug)]
pub struct Config {
    /// Time limit on opening a connection.
    dial_timeout: Duration,

    /// Time limit on reading a single message.
    read_timeout: Duration,

    /// Time limit on writing a single message.
    write_timeout: Duration,

    /// TSIG secrets by key name.
    secrets: HashMap<Name, Bytes>,
}

impl Config {
    /// Creates a new, default config.
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the connect timeout.
    pub fn dial_timeout(&self) -> Duration {
        self.dial_timeout
    }

    /// Sets the connect timeout.
    ///
    /// Excessive values are quietly trimmed.
    pub fn set_dial_timeout(&mut self, timeout: Duration) {
        self.dial_timeout = TIMEOUT.limit(timeout)
    }

    /// Returns the read timeout.
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Sets the read timeout.
    ///
    /// The timeout bounds reading one message, not the whole transfer.
    /// Excessive values are quietly trimmed.
    pub fn set_read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = TIMEOUT.limit(timeout)
    }

    /// Returns the write timeout.
    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    /// Sets the write timeout.
    ///
    /// Excessive values are quietly trimmed.
    pub fn set_write_timeout(&mut self, timeout: Duration) {
        self.write_timeout = TIMEOUT.limit(timeout)
    }

    /// Adds a TSIG secret for the given key name.
    ///
    /// The secret must be in base64 as it appears in key files and server
    /// configurations. It is decoded eagerly so a typo surfaces here
    /// rather than as a signature mismatch on the first transfer.
    pub fn add_secret(
        &mut self,
        key_name: Name,
        secret: &str,
    ) -> Result<(), SecretError> {
        let secret = STANDARD.decode(secret).map_err(|_| SecretError)?;
        self.secrets.insert(key_name, secret.into());
        Ok(())
    }

    /// Returns the secret for the given key name.
    pub(crate) fn secret(&self, key_name: &Name) -> Option<&Bytes> {
        self.secrets.get(key_name)
    }

    /// Returns whether any secrets are configured.
    pub(crate) fn has_secrets(&self) -> bool {
        !self.secrets.is_empty()
    }
}

//--- Default

impl Default for Config {
    fn default() -> Self {
        Self {
            dial_timeout: TIMEOUT.default(),
            read_timeout: TIMEOUT.default(),
            write_timeout: TIMEOUT.default(),
            secrets: HashMap::new(),
        }
    }
}

//------------ SecretError ---------------------------------------------------

/// A TSIG secret was not valid base64.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SecretError;

impl fmt::Display for SecretError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid TSIG secret")
    }
}

impl error::Error for SecretError {}

//============ Tests =========================================================
