//! Wallet connection session model for API clients.
//!
//! Front-ends drive this machine from two inputs: explicit user actions
//! (connect, disconnect) and the address lists the browser wallet hands
//! back, either from a silent authorization check on load or from an
//! interactive connect prompt. Disconnecting is a purely local reset; it
//! does not revoke the wallet-side authorization.

/// Connection state of the wallet session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WalletState {
    #[default]
    Disconnected,
    /// An interactive connect prompt is pending; the connect control is
    /// disabled until the wallet answers.
    Connecting,
    Connected {
        /// Selected account, lowercase-normalized
        address: String,
    },
}

/// Inputs that move the session between states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// User pressed the connect control
    ConnectRequested,
    /// The wallet produced its authorized address list; the first entry
    /// is the active account, an empty list means nothing is authorized
    AccountsReceived(Vec<String>),
    /// The interactive connect prompt failed or was dismissed
    ConnectFailed,
    /// User pressed the disconnect control
    DisconnectRequested,
}

impl WalletState {
    /// Advance the machine by one event, returning the next state.
    pub fn apply(self, event: WalletEvent) -> WalletState {
        match (self, event) {
            (WalletState::Disconnected, WalletEvent::ConnectRequested) => WalletState::Connecting,
            // The control is disabled while connecting; a repeated request
            // in any other state changes nothing
            (state, WalletEvent::ConnectRequested) => state,
            (_, WalletEvent::AccountsReceived(accounts)) => match accounts.first() {
                Some(address) => WalletState::Connected {
                    address: address.to_ascii_lowercase(),
                },
                None => WalletState::Disconnected,
            },
            (_, WalletEvent::ConnectFailed) => WalletState::Disconnected,
            (_, WalletEvent::DisconnectRequested) => WalletState::Disconnected,
        }
    }

    /// Active account address, when connected.
    pub fn address(&self) -> Option<&str> {
        match self {
            WalletState::Connected { address } => Some(address),
            _ => None,
        }
    }

    /// Whether an interactive connect prompt is pending.
    pub fn is_connecting(&self) -> bool {
        matches!(self, WalletState::Connecting)
    }
}

/// Truncated `0x1234...abcd` display form of an address.
pub fn short_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    fn connected(address: &str) -> WalletState {
        WalletState::Connected {
            address: address.to_ascii_lowercase(),
        }
    }

    #[test]
    fn test_interactive_connect_flow() {
        let state = WalletState::Disconnected.apply(WalletEvent::ConnectRequested);
        assert_eq!(state, WalletState::Connecting);
        assert!(state.is_connecting());

        let state = state.apply(WalletEvent::AccountsReceived(vec![ACCOUNT.to_string()]));
        assert_eq!(state, connected(ACCOUNT));
        assert_eq!(
            state.address(),
            Some("0x70997970c51812dc3a010c7d01b50e0d17dc79c8")
        );
    }

    #[test]
    fn test_silent_reconnect_on_load() {
        // A wallet that already authorized the app connects without an
        // interactive prompt
        let state =
            WalletState::Disconnected.apply(WalletEvent::AccountsReceived(vec![
                ACCOUNT.to_string(),
            ]));
        assert_eq!(state, connected(ACCOUNT));
    }

    #[test]
    fn test_empty_account_list_stays_disconnected() {
        let state = WalletState::Disconnected.apply(WalletEvent::AccountsReceived(vec![]));
        assert_eq!(state, WalletState::Disconnected);

        let state = WalletState::Connecting.apply(WalletEvent::AccountsReceived(vec![]));
        assert_eq!(state, WalletState::Disconnected);
    }

    #[test]
    fn test_connect_failure_resets() {
        let state = WalletState::Connecting.apply(WalletEvent::ConnectFailed);
        assert_eq!(state, WalletState::Disconnected);
    }

    #[test]
    fn test_connect_request_is_ignored_while_busy() {
        let state = WalletState::Connecting.apply(WalletEvent::ConnectRequested);
        assert_eq!(state, WalletState::Connecting);

        let state = connected(ACCOUNT).apply(WalletEvent::ConnectRequested);
        assert_eq!(state, connected(ACCOUNT));
    }

    #[test]
    fn test_disconnect_is_local_reset() {
        let state = connected(ACCOUNT).apply(WalletEvent::DisconnectRequested);
        assert_eq!(state, WalletState::Disconnected);
    }

    #[test]
    fn test_first_account_wins() {
        let state = WalletState::Connecting.apply(WalletEvent::AccountsReceived(vec![
            ACCOUNT.to_string(),
            "0x0000000000000000000000000000000000000001".to_string(),
        ]));
        assert_eq!(state, connected(ACCOUNT));
    }

    #[test]
    fn test_short_address() {
        assert_eq!(
            short_address("0x70997970c51812dc3a010c7d01b50e0d17dc79c8"),
            "0x7099...79c8"
        );
        assert_eq!(short_address("0xabc"), "0xabc");
    }
}
