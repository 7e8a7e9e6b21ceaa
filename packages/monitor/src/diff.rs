// ABOUTME: Change detection between two client listings
// ABOUTME: Produces dropped, offline, new and online events keyed by MAC

use clientwatch_core::{normalize_mac, Client};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Known before, absent now
    Dropped(Client),
    WentOffline(Client),
    /// Absent before, present now
    New(Client),
    CameOnline(Client),
}

impl ClientEvent {
    pub fn client(&self) -> &Client {
        match self {
            ClientEvent::Dropped(c)
            | ClientEvent::WentOffline(c)
            | ClientEvent::New(c)
            | ClientEvent::CameOnline(c) => c,
        }
    }

    /// Text sent to the operator, `None` for events that are only logged
    pub fn notification_message(&self) -> Option<String> {
        match self {
            ClientEvent::New(c) => Some(format!("New client {}", c.describe())),
            ClientEvent::CameOnline(c) => Some(format!("Connected client {}", c.describe())),
            ClientEvent::Dropped(_) | ClientEvent::WentOffline(_) => None,
        }
    }
}

/// Events for `previous -> current`. Departures come first in `previous`
/// order, then arrivals in `current` order.
pub fn diff_clients(previous: &[Client], current: &[Client]) -> Vec<ClientEvent> {
    let before: HashMap<String, &Client> =
        previous.iter().map(|c| (normalize_mac(&c.mac), c)).collect();
    let after: HashMap<String, &Client> =
        current.iter().map(|c| (normalize_mac(&c.mac), c)).collect();

    let mut events = Vec::new();

    for old in previous {
        match after.get(&normalize_mac(&old.mac)) {
            None => events.push(ClientEvent::Dropped(old.clone())),
            Some(new) if old.online && !new.online => {
                events.push(ClientEvent::WentOffline((*new).clone()))
            }
            Some(_) => {}
        }
    }

    for new in current {
        match before.get(&normalize_mac(&new.mac)) {
            None => events.push(ClientEvent::New(new.clone())),
            Some(old) if !old.online && new.online => {
                events.push(ClientEvent::CameOnline(new.clone()))
            }
            Some(_) => {}
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(mac: &str, online: bool) -> Client {
        Client {
            name: format!("host-{}", &mac[mac.len() - 2..]),
            mac: mac.to_string(),
            ip: "192.168.1.50".to_string(),
            vendor: "Acme".to_string(),
            online,
        }
    }

    #[test]
    fn test_no_changes() {
        let list = vec![client("AA:BB:CC:DD:EE:01", true), client("AA:BB:CC:DD:EE:02", false)];
        assert!(diff_clients(&list, &list).is_empty());
    }

    #[test]
    fn test_all_event_kinds() {
        let previous = vec![
            client("AA:BB:CC:DD:EE:01", true),  // goes offline
            client("AA:BB:CC:DD:EE:02", false), // comes online
            client("AA:BB:CC:DD:EE:03", true),  // disappears
        ];
        let current = vec![
            client("AA:BB:CC:DD:EE:01", false),
            client("AA:BB:CC:DD:EE:02", true),
            client("AA:BB:CC:DD:EE:04", true), // new
        ];

        let events = diff_clients(&previous, &current);
        assert_eq!(
            events,
            vec![
                ClientEvent::WentOffline(client("AA:BB:CC:DD:EE:01", false)),
                ClientEvent::Dropped(client("AA:BB:CC:DD:EE:03", true)),
                ClientEvent::CameOnline(client("AA:BB:CC:DD:EE:02", true)),
                ClientEvent::New(client("AA:BB:CC:DD:EE:04", true)),
            ]
        );
    }

    #[test]
    fn test_mac_comparison_ignores_formatting() {
        let previous = vec![client("aa-bb-cc-dd-ee-01", true)];
        let current = vec![client("AA:BB:CC:DD:EE:01", true)];
        assert!(diff_clients(&previous, &current).is_empty());
    }

    #[test]
    fn test_first_poll_reports_everything_as_new() {
        let current = vec![client("AA:BB:CC:DD:EE:01", true), client("AA:BB:CC:DD:EE:02", false)];
        let events = diff_clients(&[], &current);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| matches!(e, ClientEvent::New(_))));
    }

    #[test]
    fn test_notification_messages() {
        let c = Client {
            name: "laptop".to_string(),
            mac: "AA:BB:CC:DD:EE:01".to_string(),
            ip: "192.168.1.10".to_string(),
            vendor: String::new(),
            online: true,
        };
        assert_eq!(
            ClientEvent::New(c.clone()).notification_message().as_deref(),
            Some("New client laptop (MAC=AA:BB:CC:DD:EE:01, IP=192.168.1.10)")
        );
        assert_eq!(
            ClientEvent::CameOnline(c.clone()).notification_message().as_deref(),
            Some("Connected client laptop (MAC=AA:BB:CC:DD:EE:01, IP=192.168.1.10)")
        );
        assert_eq!(ClientEvent::Dropped(c.clone()).notification_message(), None);
        assert_eq!(ClientEvent::WentOffline(c).notification_message(), None);
    }
}
