//! Relay state: rooms, participant registry, and per-room fan-out.
//!
//! Room membership and the last snapshot are per-room state in a map keyed
//! by room id; the participant registry maps connection ids to their room.
//! Each room owns one broadcast channel, so deliveries within a room keep
//! the order in which the triggering events were processed. Events that
//! reference an unknown connection are dropped silently; one bad event must
//! never take down the relay loop.

use dashmap::DashMap;
use scrawl_core::protocol::{Participant, ServerEvent};
use tokio::sync::broadcast;
use tracing::{debug, info};

const CHANNEL_CAPACITY: usize = 256;

/// A broadcast payload: the event plus an optional connection id that must
/// not receive it (the sender, for snapshot fan-out and join notices).
pub type Fanout = (Option<String>, ServerEvent);

/// Per-room state. Created implicitly on first join, dropped when the last
/// participant leaves.
struct Room {
    /// Broadcast channel for this room.
    tx: broadcast::Sender<Fanout>,
    /// Member connection ids in join order (the roster order).
    members: Vec<String>,
    /// Most recent canvas snapshot broadcast in this room, handed to late
    /// joiners. None until somebody draws.
    last_snapshot: Option<String>,
}

impl Room {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            members: Vec::new(),
            last_snapshot: None,
        }
    }
}

/// Identity supplied by a joining client.
pub struct JoinInfo {
    pub room_id: String,
    pub username: String,
    pub host: bool,
    pub presenter: bool,
}

/// What the socket task delivers directly to a fresh joiner, alongside the
/// room subscription it will poll for broadcasts.
pub struct JoinOutcome {
    pub rx: broadcast::Receiver<Fanout>,
    pub welcome: ServerEvent,
    pub snapshot: Option<ServerEvent>,
}

/// Process-wide relay state, shared across socket tasks.
#[derive(Default)]
pub struct RelayState {
    rooms: DashMap<String, Room>,
    connections: DashMap<String, Participant>,
}

impl RelayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant and add them to their room. Broadcasts the
    /// join notice to the other members and the refreshed roster to
    /// everyone; the welcome message and any catch-up snapshot go back to
    /// the joiner only.
    pub fn join(&self, connection_id: &str, info: JoinInfo) -> JoinOutcome {
        // A connection can only be in one room; re-joining moves it.
        if self.connections.contains_key(connection_id) {
            self.leave(connection_id);
        }

        let participant = Participant {
            id: connection_id.to_string(),
            username: info.username,
            room: info.room_id.clone(),
            host: info.host,
            presenter: info.presenter,
        };
        let username = participant.username.clone();
        self.connections
            .insert(connection_id.to_string(), participant);

        let mut room = self
            .rooms
            .entry(info.room_id.clone())
            .or_insert_with(Room::new);
        room.members.push(connection_id.to_string());

        // Subscribe before broadcasting so the joiner sees its own roster.
        let rx = room.tx.subscribe();
        let _ = room.tx.send((
            Some(connection_id.to_string()),
            ServerEvent::UserStatus {
                message: format!("{username} has joined"),
            },
        ));
        let _ = room.tx.send((
            None,
            ServerEvent::Users {
                users: self.roster(&room.members),
            },
        ));
        let snapshot = room.last_snapshot.clone();
        drop(room);

        info!("{username} ({connection_id}) joined room {}", info.room_id);

        JoinOutcome {
            rx,
            welcome: ServerEvent::Message {
                username: "System".to_string(),
                message: "Welcome to ChatRoom".to_string(),
            },
            snapshot: snapshot.map(|snapshot_blob| ServerEvent::CanvasImage { snapshot_blob }),
        }
    }

    /// Store a room's latest snapshot and fan it out to every other member.
    /// The submitter already shows this state locally and gets no echo.
    pub fn submit_snapshot(&self, connection_id: &str, snapshot_blob: String) {
        let Some(room_id) = self
            .connections
            .get(connection_id)
            .map(|p| p.room.clone())
        else {
            debug!("snapshot from unknown connection {connection_id}, dropped");
            return;
        };
        if let Some(mut room) = self.rooms.get_mut(&room_id) {
            room.last_snapshot = Some(snapshot_blob.clone());
            let _ = room.tx.send((
                Some(connection_id.to_string()),
                ServerEvent::CanvasImage { snapshot_blob },
            ));
        }
    }

    /// Relay a chat message to the whole room, sender included, under the
    /// sender's registered username.
    pub fn submit_chat(&self, connection_id: &str, text: String) {
        let Some((username, room_id)) = self
            .connections
            .get(connection_id)
            .map(|p| (p.username.clone(), p.room.clone()))
        else {
            debug!("chat from unknown connection {connection_id}, dropped");
            return;
        };
        if let Some(room) = self.rooms.get(&room_id) {
            let _ = room.tx.send((
                None,
                ServerEvent::Message {
                    username,
                    message: text,
                },
            ));
        }
    }

    /// Remove a participant; used for explicit leaves and for transport
    /// disconnects alike. The remaining members get a leave notice and the
    /// refreshed roster. Empty rooms are dropped.
    pub fn leave(&self, connection_id: &str) {
        let Some((_, participant)) = self.connections.remove(connection_id) else {
            return;
        };
        let Some(mut room) = self.rooms.get_mut(&participant.room) else {
            return;
        };
        room.members.retain(|id| id != connection_id);
        if room.members.is_empty() {
            drop(room);
            self.rooms.remove(&participant.room);
        } else {
            let _ = room.tx.send((
                Some(connection_id.to_string()),
                ServerEvent::UserStatus {
                    message: format!("{} left the chat", participant.username),
                },
            ));
            let _ = room.tx.send((
                Some(connection_id.to_string()),
                ServerEvent::Users {
                    users: self.roster(&room.members),
                },
            ));
        }
        info!(
            "{} ({connection_id}) left room {}",
            participant.username, participant.room
        );
    }

    /// Build the roster for a room's member list, in join order.
    fn roster(&self, members: &[String]) -> Vec<Participant> {
        members
            .iter()
            .filter_map(|id| self.connections.get(id).map(|p| p.clone()))
            .collect()
    }

    #[cfg(test)]
    fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    fn join_info(room: &str, name: &str) -> JoinInfo {
        JoinInfo {
            room_id: room.to_string(),
            username: name.to_string(),
            host: false,
            presenter: false,
        }
    }

    /// Drain everything currently queued on a receiver, dropping events
    /// excluded for `own_id` the way the socket task does.
    fn drain(rx: &mut broadcast::Receiver<Fanout>, own_id: &str) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        loop {
            match rx.try_recv() {
                Ok((exclude, event)) => {
                    if exclude.as_deref() != Some(own_id) {
                        events.push(event);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(_)) => continue,
            }
        }
        events
    }

    #[test]
    fn test_joiner_gets_welcome_and_own_roster() {
        let state = RelayState::new();
        let mut outcome = state.join("a", join_info("r1", "ada"));

        assert!(matches!(
            outcome.welcome,
            ServerEvent::Message { ref username, .. } if username == "System"
        ));
        // Fresh room: nothing drawn yet.
        assert!(outcome.snapshot.is_none());

        let events = drain(&mut outcome.rx, "a");
        assert_eq!(events.len(), 1);
        let ServerEvent::Users { users } = &events[0] else {
            panic!("expected roster");
        };
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "ada");
    }

    #[test]
    fn test_late_joiner_receives_last_snapshot() {
        let state = RelayState::new();
        let _a = state.join("a", join_info("r1", "ada"));
        state.submit_snapshot("a", "blob-1".to_string());
        state.submit_snapshot("a", "blob-2".to_string());

        let outcome = state.join("b", join_info("r1", "bob"));
        let Some(ServerEvent::CanvasImage { snapshot_blob }) = outcome.snapshot else {
            panic!("late joiner must catch up");
        };
        assert_eq!(snapshot_blob, "blob-2");
    }

    #[test]
    fn test_snapshot_fan_out_skips_submitter() {
        let state = RelayState::new();
        let mut a = state.join("a", join_info("r1", "ada"));
        let mut b = state.join("b", join_info("r1", "bob"));
        drain(&mut a.rx, "a");
        drain(&mut b.rx, "b");

        state.submit_snapshot("a", "blob".to_string());
        assert!(drain(&mut a.rx, "a").is_empty());
        let events = drain(&mut b.rx, "b");
        assert!(
            matches!(&events[..], [ServerEvent::CanvasImage { snapshot_blob }] if snapshot_blob == "blob")
        );
    }

    #[test]
    fn test_rooms_are_isolated() {
        let state = RelayState::new();
        let mut a = state.join("a", join_info("r1", "ada"));
        state.submit_snapshot("a", "r1-canvas".to_string());
        drain(&mut a.rx, "a");

        let mut c = state.join("c", join_info("r2", "cleo"));
        assert!(c.snapshot.is_none());
        let events = drain(&mut c.rx, "c");
        assert_eq!(events.len(), 1);
        let ServerEvent::Users { users } = &events[0] else {
            panic!("expected roster");
        };
        assert_eq!(users[0].room, "r2");

        // Nothing from r2's join leaked into r1.
        assert!(drain(&mut a.rx, "a").is_empty());
    }

    #[test]
    fn test_join_notice_reaches_existing_members_only() {
        let state = RelayState::new();
        let mut a = state.join("a", join_info("r1", "ada"));
        drain(&mut a.rx, "a");

        let mut b = state.join("b", join_info("r1", "bob"));
        let a_events = drain(&mut a.rx, "a");
        assert!(matches!(
            &a_events[..],
            [
                ServerEvent::UserStatus { message },
                ServerEvent::Users { users }
            ] if message == "bob has joined" && users.len() == 2
        ));

        // The joiner sees the roster but not their own join notice.
        let b_events = drain(&mut b.rx, "b");
        assert!(matches!(&b_events[..], [ServerEvent::Users { .. }]));
    }

    #[test]
    fn test_chat_is_delivered_to_everyone_including_sender() {
        let state = RelayState::new();
        let mut a = state.join("a", join_info("r1", "ada"));
        let mut b = state.join("b", join_info("r1", "bob"));
        drain(&mut a.rx, "a");
        drain(&mut b.rx, "b");

        state.submit_chat("b", "hello".to_string());
        for (rx, own) in [(&mut a.rx, "a"), (&mut b.rx, "b")] {
            let events = drain(rx, own);
            assert!(matches!(
                &events[..],
                [ServerEvent::Message { username, message }]
                    if username == "bob" && message == "hello"
            ));
        }
    }

    #[test]
    fn test_leave_notifies_remainder_once() {
        let state = RelayState::new();
        let _a = state.join("a", join_info("r1", "ada"));
        let mut b = state.join("b", join_info("r1", "bob"));
        drain(&mut b.rx, "b");

        state.leave("a");
        let events = drain(&mut b.rx, "b");
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            ServerEvent::UserStatus { message } if message == "ada left the chat"
        ));
        let ServerEvent::Users { users } = &events[1] else {
            panic!("expected roster");
        };
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "bob");
    }

    #[test]
    fn test_empty_room_is_garbage_collected() {
        let state = RelayState::new();
        let _a = state.join("a", join_info("r1", "ada"));
        assert_eq!(state.room_count(), 1);
        state.leave("a");
        assert_eq!(state.room_count(), 0);

        // A new joiner to the same id starts from a blank room.
        state.submit_snapshot("a", "stale".to_string());
        let outcome = state.join("b", join_info("r1", "bob"));
        assert!(outcome.snapshot.is_none());
    }

    #[test]
    fn test_events_from_unknown_connections_are_dropped() {
        let state = RelayState::new();
        let mut a = state.join("a", join_info("r1", "ada"));
        drain(&mut a.rx, "a");

        state.submit_snapshot("ghost", "blob".to_string());
        state.submit_chat("ghost", "boo".to_string());
        state.leave("ghost");
        assert!(drain(&mut a.rx, "a").is_empty());
    }

    #[test]
    fn test_rejoin_moves_connection_between_rooms() {
        let state = RelayState::new();
        let _a = state.join("a", join_info("r1", "ada"));
        let mut b = state.join("b", join_info("r1", "bob"));
        drain(&mut b.rx, "b");

        // ada moves to r2; r1 sees the leave.
        let _a2 = state.join("a", join_info("r2", "ada"));
        let events = drain(&mut b.rx, "b");
        assert!(matches!(
            &events[0],
            ServerEvent::UserStatus { message } if message == "ada left the chat"
        ));

        state.submit_snapshot("a", "r2-canvas".to_string());
        assert!(drain(&mut b.rx, "b").is_empty());
    }

    #[test]
    fn test_room_ordering_matches_submission_order() {
        let state = RelayState::new();
        let _a = state.join("a", join_info("r1", "ada"));
        let mut b = state.join("b", join_info("r1", "bob"));
        drain(&mut b.rx, "b");

        for i in 0..5 {
            state.submit_snapshot("a", format!("blob-{i}"));
        }
        let events = drain(&mut b.rx, "b");
        let blobs: Vec<&str> = events
            .iter()
            .map(|e| match e {
                ServerEvent::CanvasImage { snapshot_blob } => snapshot_blob.as_str(),
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(blobs, vec!["blob-0", "blob-1", "blob-2", "blob-3", "blob-4"]);
    }
}
