//! Headless network client that mirrors the server's game state.
//!
//! Moves are checked against the mirror before they are sent, so only
//! placements the server would accept go on the wire. A dropped stream can
//! be re-dialled with the same identity to take the seat back.

use crate::error::ServerError;
use squares_game::{Contract, GameState, Placement, PlacementContract, PlayerId};
use squares_protocol::{
    ClientId, ConnectRequest, ConnectResponse, Message, MoveRequest, NoticeCode, OpponentMove,
    read_message, write_message,
};
use tokio::io::BufReader;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::{debug, info, instrument};

/// Something the server told this client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A full state refresh; the mirror has been replaced.
    Snapshot,
    /// Answer to this client's own move.
    MoveResult {
        /// Whether the move was committed.
        ok: bool,
        /// Seat on the move afterwards.
        active_player: Option<PlayerId>,
    },
    /// A committed move, already replayed into the mirror.
    OpponentMove(OpponentMove),
    /// A coded notice.
    Notice(NoticeCode),
    /// The server closed the stream.
    Closed,
}

/// A seated connection to a squares server.
pub struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    id: ClientId,
    seat: PlayerId,
    state: GameState,
}

impl Client {
    /// Connects and performs the handshake.
    ///
    /// Pass a previously issued identity to reclaim its seat. A notice in
    /// place of the connect response becomes [`ServerError::Rejected`].
    #[instrument(skip(addr))]
    pub async fn connect(
        addr: impl ToSocketAddrs,
        id: Option<ClientId>,
    ) -> Result<Self, ServerError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(squares_protocol::ProtocolError::Io)?;
        let _ = stream.set_nodelay(true);
        let (read_half, mut writer) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let request = ConnectRequest {
            id: id.unwrap_or(ClientId::NEW),
        };
        write_message(&mut writer, &Message::ConnectRequest(request)).await?;

        let response = match read_message(&mut reader).await? {
            Some(Message::ConnectResponse(response)) => response,
            Some(Message::ServerNotice(notice)) => return Err(ServerError::Rejected(notice.code)),
            Some(other) => return Err(ServerError::UnexpectedMessage(other.tag())),
            None => return Err(ServerError::HandshakeClosed),
        };
        let ConnectResponse { id, player_id, game } = response;
        let state = GameState::try_from(&game)?;
        info!(client = %id, seat = %player_id, "Seated");
        Ok(Self {
            reader,
            writer,
            id,
            seat: player_id,
            state,
        })
    }

    /// Seat and identity assigned by the server.
    pub fn seat(&self) -> (PlayerId, ClientId) {
        (self.seat, self.id)
    }

    /// Local mirror of the match.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Returns true if the mirror says this client is on the move.
    pub fn my_turn(&self) -> bool {
        self.state.active_player() == Some(self.seat)
    }

    /// Sends a move request once the mirror accepts it.
    ///
    /// A move the mirror refuses is returned as [`ServerError::Move`] and
    /// never reaches the server.
    #[instrument(skip(self), fields(seat = %self.seat))]
    pub async fn submit(&mut self, placement: Placement) -> Result<(), ServerError> {
        PlacementContract::pre(&self.state, &(self.seat, placement))?;
        let request = MoveRequest::new(self.id, &placement);
        write_message(&mut self.writer, &Message::MoveRequest(request)).await?;
        Ok(())
    }

    /// Asks the server for a fresh snapshot on the current connection.
    ///
    /// The answer arrives as [`ClientEvent::Snapshot`].
    #[instrument(skip(self), fields(seat = %self.seat))]
    pub async fn refresh(&mut self) -> Result<(), ServerError> {
        let request = ConnectRequest { id: self.id };
        write_message(&mut self.writer, &Message::ConnectRequest(request)).await?;
        Ok(())
    }

    /// Dials again with the stored identity and replaces the connection.
    ///
    /// On success the seat and mirror come from the new handshake; on failure
    /// this client is left untouched.
    #[instrument(skip(self, addr), fields(seat = %self.seat, client = %self.id))]
    pub async fn reconnect(&mut self, addr: impl ToSocketAddrs) -> Result<(), ServerError> {
        let fresh = Self::connect(addr, Some(self.id)).await?;
        info!(seat = %fresh.seat, "Reconnected");
        *self = fresh;
        Ok(())
    }

    /// Waits for the next server message and folds it into the mirror.
    pub async fn next_event(&mut self) -> Result<ClientEvent, ServerError> {
        let Some(message) = read_message(&mut self.reader).await? else {
            debug!("Server closed the stream");
            return Ok(ClientEvent::Closed);
        };
        match message {
            Message::ConnectResponse(response) => {
                self.state = GameState::try_from(&response.game)?;
                self.id = response.id;
                self.seat = response.player_id;
                Ok(ClientEvent::Snapshot)
            }
            Message::MoveResponse(response) => Ok(ClientEvent::MoveResult {
                ok: response.ok,
                active_player: response.active_player,
            }),
            Message::OpponentMove(broadcast) => {
                let placement = broadcast.placement();
                if !placement.on_board() {
                    return Err(ServerError::OffBoard(placement));
                }
                self.state
                    .replay(broadcast.player_id, &placement, broadcast.active_player);
                Ok(ClientEvent::OpponentMove(broadcast))
            }
            Message::ServerNotice(notice) => Ok(ClientEvent::Notice(notice.code)),
            other => Err(ServerError::UnexpectedMessage(other.tag())),
        }
    }
}
