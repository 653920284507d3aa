//! Lobby, seating and move arbitration as a synchronous state machine.
//!
//! [`Session`] never touches a socket. It consumes one inbound event at a
//! time and answers with the frames to send and the connections to close,
//! which keeps every rule here testable without a network.

use derive_more::Display;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use squares_game::{GameState, NUM_PLAYERS, PlayerId};
use squares_protocol::{
    ClientId, ConnectResponse, GameSnapshot, Message, MoveRequest, MoveResponse, NoticeCode,
    OpponentMove,
};
use tracing::{debug, info, instrument, warn};

/// Server-assigned handle for one accepted stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("conn-{}", _0)]
pub struct ConnectionId(pub u64);

/// What a connection delivered to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A decoded frame.
    Message(Message),
    /// The stream ended or failed to decode.
    Disconnected,
}

/// An effect the I/O layer must carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Queue a frame for one connection.
    Send {
        /// Recipient.
        to: ConnectionId,
        /// Frame payload.
        message: Message,
    },
    /// Flush what is queued, then close the connection.
    Close {
        /// Connection to close.
        conn: ConnectionId,
    },
}

/// Server lifecycle.
#[derive(Debug, Clone)]
pub enum SessionPhase {
    /// Seats are filling.
    Lobby,
    /// All four seats filled and the match is live or finished.
    Ongoing(GameState),
}

/// One seat: the identity that owns it and the connection currently bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seat {
    /// Identity to present when reconnecting.
    pub client: ClientId,
    /// Connection currently speaking for the seat.
    pub conn: Option<ConnectionId>,
}

/// The four seats, indexed by player.
#[derive(Debug, Clone, Default)]
pub struct SlotTable {
    seats: [Option<Seat>; NUM_PLAYERS],
}

impl SlotTable {
    /// Seat record for a player.
    pub fn seat(&self, player: PlayerId) -> Option<&Seat> {
        self.seats[player.index()].as_ref()
    }

    /// Player whose seat belongs to `client`.
    pub fn find_client(&self, client: ClientId) -> Option<PlayerId> {
        PlayerId::ALL
            .into_iter()
            .find(|p| self.seat(*p).is_some_and(|s| s.client == client))
    }

    /// Player whose seat `conn` is bound to.
    pub fn find_conn(&self, conn: ConnectionId) -> Option<PlayerId> {
        PlayerId::ALL
            .into_iter()
            .find(|p| self.seat(*p).is_some_and(|s| s.conn == Some(conn)))
    }

    /// First unassigned seat in arrival order.
    pub fn first_free(&self) -> Option<PlayerId> {
        PlayerId::ALL.into_iter().find(|p| self.seat(*p).is_none())
    }

    /// Returns true once all four seats have an identity.
    pub fn is_full(&self) -> bool {
        self.seats.iter().all(Option::is_some)
    }

    /// Assigns a free seat to a new identity bound to `conn`.
    pub fn assign(&mut self, player: PlayerId, client: ClientId, conn: ConnectionId) {
        self.unbind(conn);
        self.seats[player.index()] = Some(Seat {
            client,
            conn: Some(conn),
        });
    }

    /// Binds `conn` to an existing seat, returning the connection it replaced.
    pub fn rebind(&mut self, player: PlayerId, conn: ConnectionId) -> Option<ConnectionId> {
        self.unbind_elsewhere(player, conn);
        self.seats[player.index()]
            .as_mut()
            .and_then(|seat| seat.conn.replace(conn))
            .filter(|old| *old != conn)
    }

    /// Clears `conn` from whichever seat holds it, keeping the identity.
    pub fn unbind(&mut self, conn: ConnectionId) -> Option<PlayerId> {
        let player = self.find_conn(conn)?;
        if let Some(seat) = self.seats[player.index()].as_mut() {
            seat.conn = None;
        }
        Some(player)
    }

    fn unbind_elsewhere(&mut self, player: PlayerId, conn: ConnectionId) {
        if self.find_conn(conn).is_some_and(|p| p != player) {
            self.unbind(conn);
        }
    }

    /// Every bound `(player, identity, connection)` in seat order.
    pub fn bound(&self) -> impl Iterator<Item = (PlayerId, ClientId, ConnectionId)> + '_ {
        PlayerId::ALL.into_iter().filter_map(|p| {
            let seat = self.seat(p)?;
            Some((p, seat.client, seat.conn?))
        })
    }
}

/// The authoritative match: phase, seats and identity generator.
#[derive(Debug)]
pub struct Session {
    phase: SessionPhase,
    slots: SlotTable,
    rng: StdRng,
}

impl Session {
    /// Creates an empty lobby. A seed makes issued identities reproducible.
    #[instrument]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        info!("Lobby open");
        Self {
            phase: SessionPhase::Lobby,
            slots: SlotTable::default(),
            rng,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// Seat table.
    pub fn slots(&self) -> &SlotTable {
        &self.slots
    }

    /// The live game, once the lobby has filled.
    pub fn game(&self) -> Option<&GameState> {
        match &self.phase {
            SessionPhase::Lobby => None,
            SessionPhase::Ongoing(game) => Some(game),
        }
    }

    /// Handles one event from one connection.
    #[instrument(skip(self, inbound), fields(conn = %conn))]
    pub fn handle(&mut self, conn: ConnectionId, inbound: Inbound) -> Vec<Dispatch> {
        match inbound {
            Inbound::Message(message) if !message.tag().from_client() => {
                warn!(tag = %message.tag(), "Client sent a server-only message");
                self.notify(conn, NoticeCode::ProtocolViolation)
            }
            Inbound::Message(Message::ConnectRequest(req)) => self.on_connect(conn, req.id),
            Inbound::Message(Message::MoveRequest(req)) => self.on_move(conn, req),
            // Every client tag is handled above
            Inbound::Message(_) => Vec::new(),
            Inbound::Disconnected => {
                if let Some(player) = self.slots.unbind(conn) {
                    info!(player = %player, "Seat lost its connection");
                }
                Vec::new()
            }
        }
    }

    fn snapshot(&self) -> GameSnapshot {
        match &self.phase {
            SessionPhase::Lobby => GameSnapshot::lobby(),
            SessionPhase::Ongoing(game) => GameSnapshot::from(game),
        }
    }

    fn welcome(&self, conn: ConnectionId, player: PlayerId, client: ClientId) -> Dispatch {
        Dispatch::Send {
            to: conn,
            message: Message::ConnectResponse(ConnectResponse {
                id: client,
                player_id: player,
                game: self.snapshot(),
            }),
        }
    }

    // Closing notices unbind first, so a closed connection never keeps a seat.
    fn notify(&mut self, conn: ConnectionId, code: NoticeCode) -> Vec<Dispatch> {
        let mut out = vec![Dispatch::Send {
            to: conn,
            message: Message::notice(code),
        }];
        if code.closes_connection() {
            self.slots.unbind(conn);
            out.push(Dispatch::Close { conn });
        }
        out
    }

    fn draw_client_id(&mut self) -> ClientId {
        loop {
            let id = ClientId::new(self.rng.random());
            if !id.is_new() && self.slots.find_client(id).is_none() {
                return id;
            }
        }
    }

    fn on_connect(&mut self, conn: ConnectionId, claimed: ClientId) -> Vec<Dispatch> {
        let known = (!claimed.is_new())
            .then(|| self.slots.find_client(claimed))
            .flatten();

        if let Some(player) = known {
            return self.reclaim(conn, player, claimed);
        }

        if matches!(self.phase, SessionPhase::Ongoing(_)) {
            let code = if claimed.is_new() {
                NoticeCode::LobbyFull
            } else {
                NoticeCode::UnknownClient
            };
            warn!(claimed = %claimed, code = %code, "Rejecting connect during match");
            return self.notify(conn, code);
        }

        if let Some(player) = self.slots.find_conn(conn) {
            // Already seated on this connection; treat as keepalive.
            let client = self.slots.seat(player).map(|s| s.client).unwrap_or(claimed);
            debug!(player = %player, "Lobby keepalive");
            return vec![self.welcome(conn, player, client)];
        }

        let Some(player) = self.slots.first_free() else {
            return self.notify(conn, NoticeCode::LobbyFull);
        };
        let client = self.draw_client_id();
        self.slots.assign(player, client, conn);
        info!(player = %player, client = %client, "Seat assigned");

        if !self.slots.is_full() {
            return vec![self.welcome(conn, player, client)];
        }

        info!("Lobby full, starting match");
        self.phase = SessionPhase::Ongoing(GameState::new());
        self.slots
            .bound()
            .map(|(p, id, c)| self.welcome(c, p, id))
            .collect()
    }

    fn reclaim(
        &mut self,
        conn: ConnectionId,
        player: PlayerId,
        client: ClientId,
    ) -> Vec<Dispatch> {
        let replaced = self.slots.rebind(player, conn);
        let mut out = Vec::new();
        if let Some(old) = replaced {
            info!(player = %player, old = %old, "Seat taken over by new connection");
            if matches!(self.phase, SessionPhase::Ongoing(_)) {
                out.push(Dispatch::Send {
                    to: old,
                    message: Message::notice(NoticeCode::SessionReplaced),
                });
            }
            out.push(Dispatch::Close { conn: old });
        } else {
            debug!(player = %player, "Seat reclaimed");
        }
        out.push(self.welcome(conn, player, client));
        out
    }

    fn on_move(&mut self, conn: ConnectionId, req: MoveRequest) -> Vec<Dispatch> {
        let running = self
            .game()
            .is_some_and(|game| game.active_player().is_some());
        if !running {
            debug!("Move outside a running match");
            return self.notify(conn, NoticeCode::GameNotRunning);
        }

        let Some(player) = self.slots.find_conn(conn) else {
            warn!("Move from an unseated connection dropped");
            return Vec::new();
        };
        if self.slots.seat(player).is_some_and(|s| s.client != req.id) {
            warn!(player = %player, claimed = %req.id, "Move carries another seat's identity");
        }

        let SessionPhase::Ongoing(game) = &mut self.phase else {
            return Vec::new();
        };
        let active = game.active_player();
        if active != Some(player) {
            warn!(player = %player, "Out-of-turn move dropped");
            return Vec::new();
        }

        let rejected = vec![Dispatch::Send {
            to: conn,
            message: Message::MoveResponse(MoveResponse {
                ok: false,
                active_player: active,
            }),
        }];
        let Some(placement) = req.placement() else {
            debug!(shape = req.shape, pos = ?req.pos, "Unknown shape or unreachable origin");
            return rejected;
        };

        let report = match game.commit(player, placement) {
            Ok(report) => report,
            Err(e) => {
                debug!(player = %player, error = %e, "Move rejected");
                return rejected;
            }
        };

        info!(
            player = %player,
            placement = %placement,
            next = ?report.active_player(),
            "Move committed"
        );
        for (eliminated, outcome) in report.newly_eliminated() {
            info!(
                player = %eliminated,
                outcome = %outcome,
                score = game.score(*eliminated),
                "Player finished"
            );
        }
        if report.game_over() {
            info!("Match over");
        }

        let next = *report.active_player();
        let broadcast = Message::OpponentMove(OpponentMove::new(player, &placement, next));
        let mut out = vec![Dispatch::Send {
            to: conn,
            message: Message::MoveResponse(MoveResponse {
                ok: true,
                active_player: next,
            }),
        }];
        out.extend(self.slots.bound().map(|(_, _, c)| Dispatch::Send {
            to: c,
            message: broadcast.clone(),
        }));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squares_game::{Coord, Orientation, Placement, ShapeId};
    use squares_protocol::{ConnectRequest, ServerNotice};

    fn connect(session: &mut Session, conn: u64, id: ClientId) -> Vec<Dispatch> {
        session.handle(
            ConnectionId(conn),
            Inbound::Message(Message::ConnectRequest(ConnectRequest { id })),
        )
    }

    fn issued(out: &[Dispatch], conn: u64) -> (PlayerId, ClientId) {
        out.iter()
            .find_map(|d| match d {
                Dispatch::Send {
                    to,
                    message: Message::ConnectResponse(r),
                } if *to == ConnectionId(conn) => Some((r.player_id, r.id)),
                _ => None,
            })
            .expect("connect response")
    }

    fn full_lobby() -> (Session, Vec<ClientId>) {
        let mut session = Session::new(Some(11));
        let mut ids = Vec::new();
        for conn in 0..4 {
            let out = connect(&mut session, conn, ClientId::NEW);
            ids.push(issued(&out, conn).1);
        }
        (session, ids)
    }

    fn mono_at_corner(player: PlayerId, id: ClientId) -> Inbound {
        let monomino = ShapeId::new(0).unwrap();
        let placement = Placement::new(monomino, Orientation::IDENTITY, player.start_corner());
        Inbound::Message(Message::MoveRequest(MoveRequest::new(id, &placement)))
    }

    fn notice(code: NoticeCode) -> Message {
        Message::ServerNotice(ServerNotice { code })
    }

    #[test]
    fn test_seats_fill_in_arrival_order() {
        let mut session = Session::new(Some(1));
        for conn in 0..3 {
            let out = connect(&mut session, conn, ClientId::NEW);
            assert_eq!(out.len(), 1);
            let (player, id) = issued(&out, conn);
            assert_eq!(player.index(), conn as usize);
            assert!(!id.is_new());
        }
        assert!(session.game().is_none());

        let out = connect(&mut session, 3, ClientId::NEW);
        assert_eq!(out.len(), 4, "everyone gets the opening snapshot");
        assert!(session.game().is_some());
    }

    #[test]
    fn test_lobby_keepalive_keeps_seat() {
        let mut session = Session::new(Some(2));
        let (player, id) = issued(&connect(&mut session, 0, ClientId::NEW), 0);
        let out = connect(&mut session, 0, id);
        assert_eq!(issued(&out, 0), (player, id));
        assert_eq!(session.slots().first_free(), PlayerId::new(1));
    }

    #[test]
    fn test_lobby_reconnect_closes_old_connection() {
        let mut session = Session::new(Some(3));
        let (_, id) = issued(&connect(&mut session, 0, ClientId::NEW), 0);
        let out = connect(&mut session, 9, id);
        assert_eq!(out[0], Dispatch::Close { conn: ConnectionId(0) });
        assert_eq!(session.slots().find_conn(ConnectionId(9)), PlayerId::new(0));
    }

    #[test]
    fn test_unknown_identity_rejected_during_match() {
        let (mut session, _) = full_lobby();
        let out = connect(&mut session, 7, ClientId::new(12345));
        assert_eq!(
            out,
            vec![
                Dispatch::Send { to: ConnectionId(7), message: notice(NoticeCode::UnknownClient) },
                Dispatch::Close { conn: ConnectionId(7) },
            ]
        );
        let out = connect(&mut session, 8, ClientId::NEW);
        assert_eq!(
            out[0],
            Dispatch::Send { to: ConnectionId(8), message: notice(NoticeCode::LobbyFull) }
        );
    }

    #[test]
    fn test_reconnect_replaces_socket_and_sends_snapshot() {
        let (mut session, ids) = full_lobby();
        session.handle(ConnectionId(0), mono_at_corner(PlayerId::ALL[0], ids[0]));

        let out = connect(&mut session, 20, ids[1]);
        assert_eq!(
            &out[..2],
            &[
                Dispatch::Send {
                    to: ConnectionId(1),
                    message: notice(NoticeCode::SessionReplaced),
                },
                Dispatch::Close { conn: ConnectionId(1) },
            ]
        );
        let Dispatch::Send { message: Message::ConnectResponse(r), .. } = &out[2] else {
            panic!("expected snapshot");
        };
        assert_eq!(r.player_id, PlayerId::ALL[1]);
        assert_eq!(GameState::try_from(&r.game).unwrap(), *session.game().unwrap());

        // The new socket may move for the seat, the old one may not
        let stale = session.handle(ConnectionId(1), mono_at_corner(PlayerId::ALL[1], ids[1]));
        assert!(stale.is_empty());
        let out = session.handle(ConnectionId(20), mono_at_corner(PlayerId::ALL[1], ids[1]));
        assert!(matches!(
            &out[0],
            Dispatch::Send { message: Message::MoveResponse(MoveResponse { ok: true, .. }), .. }
        ));
    }

    #[test]
    fn test_move_broadcast_reaches_every_bound_seat() {
        let (mut session, ids) = full_lobby();
        session.handle(ConnectionId(2), Inbound::Disconnected);
        let out = session.handle(ConnectionId(0), mono_at_corner(PlayerId::ALL[0], ids[0]));
        let recipients: Vec<_> = out
            .iter()
            .filter_map(|d| match d {
                Dispatch::Send { to, message: Message::OpponentMove(m) } => {
                    assert_eq!(m.active_player, PlayerId::new(1));
                    Some(to.0)
                }
                _ => None,
            })
            .collect();
        assert_eq!(recipients, vec![0, 1, 3]);
    }

    #[test]
    fn test_illegal_and_out_of_turn_moves() {
        let (mut session, ids) = full_lobby();
        // Wrong seat: silently dropped
        let stale = session.handle(ConnectionId(1), mono_at_corner(PlayerId::ALL[1], ids[1]));
        assert!(stale.is_empty());
        // Wrong corner: rejected with the unchanged active player
        let out = session.handle(ConnectionId(0), mono_at_corner(PlayerId::ALL[2], ids[0]));
        assert_eq!(
            out,
            vec![Dispatch::Send {
                to: ConnectionId(0),
                message: Message::MoveResponse(MoveResponse {
                    ok: false,
                    active_player: PlayerId::new(0),
                }),
            }]
        );
        // Unknown piece index: same rejection
        let bogus = MoveRequest { id: ids[0], shape: 99, pos: [0, 0], rotation: 0 };
        let out = session.handle(ConnectionId(0), Inbound::Message(Message::MoveRequest(bogus)));
        assert_eq!(out.len(), 1);
        assert_eq!(session.game().unwrap().active_player(), PlayerId::new(0));
        assert_eq!(session.game().unwrap().cell(Coord::new(0, 0)), None);
    }

    #[test]
    fn test_extreme_origin_is_rejected_not_fatal() {
        let (mut session, ids) = full_lobby();
        let rejected = vec![Dispatch::Send {
            to: ConnectionId(0),
            message: Message::MoveResponse(MoveResponse {
                ok: false,
                active_player: PlayerId::new(0),
            }),
        }];
        for pos in [[i32::MAX, 0], [0, i32::MAX], [i32::MIN, i32::MIN], [-4, i32::MAX]] {
            let far = MoveRequest { id: ids[0], shape: 16, pos, rotation: 0 };
            let out = session.handle(ConnectionId(0), Inbound::Message(Message::MoveRequest(far)));
            assert_eq!(out, rejected);
        }
        // The match carries on normally afterwards
        let out = session.handle(ConnectionId(0), mono_at_corner(PlayerId::ALL[0], ids[0]));
        assert!(matches!(
            &out[0],
            Dispatch::Send { message: Message::MoveResponse(MoveResponse { ok: true, .. }), .. }
        ));
    }

    #[test]
    fn test_move_in_lobby_is_not_running() {
        let mut session = Session::new(Some(4));
        connect(&mut session, 0, ClientId::NEW);
        let out = session.handle(ConnectionId(0), mono_at_corner(PlayerId::ALL[0], ClientId::NEW));
        assert_eq!(
            out,
            vec![Dispatch::Send {
                to: ConnectionId(0),
                message: notice(NoticeCode::GameNotRunning),
            }]
        );
        // This notice is informational; the seat stays bound
        assert_eq!(session.slots().find_conn(ConnectionId(0)), PlayerId::new(0));
    }

    #[test]
    fn test_server_only_message_closes_connection() {
        let (mut session, _) = full_lobby();
        let out = session.handle(ConnectionId(3), Inbound::Message(notice(NoticeCode::LobbyFull)));
        assert_eq!(out[1], Dispatch::Close { conn: ConnectionId(3) });
        assert_eq!(session.slots().find_conn(ConnectionId(3)), None);
        assert!(session.slots().seat(PlayerId::ALL[3]).is_some());
    }

    #[test]
    fn test_seeded_identities_are_reproducible() {
        let (_, a) = full_lobby();
        let (_, b) = full_lobby();
        assert_eq!(a, b);
        let mut unique = a.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 4);
    }
}
