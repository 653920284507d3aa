//! The closed message catalog.

use crate::notice::NoticeCode;
use crate::snapshot::{GameSnapshot, wire_active};
use serde::{Deserialize, Serialize};
use squares_game::{Coord, Orientation, Placement, PlayerId, ShapeId};
use strum::{EnumIter, FromRepr};

/// Identity a client presents to reclaim its seat.
///
/// Zero is reserved for "issue me a new identity".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    derive_more::Display, derive_more::From,
)]
#[serde(transparent)]
pub struct ClientId(u64);

impl ClientId {
    /// The "no identity yet" value.
    pub const NEW: ClientId = ClientId(0);

    /// Wraps a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns true for the reserved zero value.
    pub const fn is_new(self) -> bool {
        self.0 == 0
    }
}

/// Frame tag for each message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, FromRepr, strum::Display)]
#[repr(u16)]
pub enum MessageTag {
    /// Client asks for a seat or reclaims one.
    ConnectRequest = 1,
    /// Server assigns a seat and sends the state.
    ConnectResponse = 2,
    /// Client submits a placement.
    MoveRequest = 3,
    /// Server accepts or rejects the mover's placement.
    MoveResponse = 4,
    /// Server relays a committed placement to every seat.
    OpponentMove = 5,
    /// Server reports a condition by code.
    ServerNotice = 6,
}

impl MessageTag {
    /// Wire value.
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Returns true for tags a client may send.
    pub const fn from_client(self) -> bool {
        matches!(self, MessageTag::ConnectRequest | MessageTag::MoveRequest)
    }
}

/// Tag 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectRequest {
    /// Previously issued identity, or [`ClientId::NEW`].
    pub id: ClientId,
}

/// Tag 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectResponse {
    /// Identity to present on reconnect.
    pub id: ClientId,
    /// Seat assigned to this identity.
    pub player_id: PlayerId,
    /// Current state of the match.
    pub game: GameSnapshot,
}

/// Tag 3.
///
/// The shape index stays raw so an out-of-range piece is a rejected move
/// rather than a malformed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Identity the client believes it holds. Advisory only.
    pub id: ClientId,
    /// Catalog index of the piece.
    pub shape: u8,
    /// Origin cell `[x, y]`.
    pub pos: [i32; 2],
    /// Orientation index, reduced mod 8.
    pub rotation: u32,
}

impl MoveRequest {
    /// Builds a request for a placement.
    pub fn new(id: ClientId, placement: &Placement) -> Self {
        Self {
            id,
            shape: u8::from(placement.shape),
            pos: [placement.origin.x, placement.origin.y],
            rotation: placement.orientation.index() as u32,
        }
    }

    /// The placement requested, if the shape index is valid and the origin
    /// is close enough to the board for a piece to reach it.
    pub fn placement(&self) -> Option<Placement> {
        let shape = ShapeId::new(self.shape)?;
        let origin = Coord::new(self.pos[0], self.pos[1]);
        if !origin.within_reach() {
            return None;
        }
        Some(Placement::new(shape, Orientation::new(self.rotation), origin))
    }
}

/// Tag 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    /// Whether the placement was committed.
    pub ok: bool,
    /// Seat on the move afterwards.
    #[serde(with = "wire_active")]
    pub active_player: Option<PlayerId>,
}

/// Tag 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentMove {
    /// Seat that placed the piece.
    pub player_id: PlayerId,
    /// Piece placed.
    pub shape: ShapeId,
    /// Origin cell `[x, y]`.
    pub pos: [i32; 2],
    /// Orientation used.
    pub rotation: Orientation,
    /// Seat on the move afterwards.
    #[serde(with = "wire_active")]
    pub active_player: Option<PlayerId>,
}

impl OpponentMove {
    /// Broadcast for a committed placement.
    pub fn new(player: PlayerId, placement: &Placement, active_player: Option<PlayerId>) -> Self {
        Self {
            player_id: player,
            shape: placement.shape,
            pos: [placement.origin.x, placement.origin.y],
            rotation: placement.orientation,
            active_player,
        }
    }

    /// The placement that was committed.
    pub fn placement(&self) -> Placement {
        Placement::new(self.shape, self.rotation, Coord::new(self.pos[0], self.pos[1]))
    }
}

/// Tag 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerNotice {
    /// What happened.
    pub code: NoticeCode,
}

/// Any frame payload.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From)]
pub enum Message {
    /// See [`ConnectRequest`].
    ConnectRequest(ConnectRequest),
    /// See [`ConnectResponse`].
    ConnectResponse(ConnectResponse),
    /// See [`MoveRequest`].
    MoveRequest(MoveRequest),
    /// See [`MoveResponse`].
    MoveResponse(MoveResponse),
    /// See [`OpponentMove`].
    OpponentMove(OpponentMove),
    /// See [`ServerNotice`].
    ServerNotice(ServerNotice),
}

impl Message {
    /// Tag this message travels under.
    pub fn tag(&self) -> MessageTag {
        match self {
            Message::ConnectRequest(_) => MessageTag::ConnectRequest,
            Message::ConnectResponse(_) => MessageTag::ConnectResponse,
            Message::MoveRequest(_) => MessageTag::MoveRequest,
            Message::MoveResponse(_) => MessageTag::MoveResponse,
            Message::OpponentMove(_) => MessageTag::OpponentMove,
            Message::ServerNotice(_) => MessageTag::ServerNotice,
        }
    }

    /// Shorthand for a notice.
    pub fn notice(code: NoticeCode) -> Self {
        Message::ServerNotice(ServerNotice { code })
    }

    pub(crate) fn payload_json(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            Message::ConnectRequest(m) => serde_json::to_vec(m),
            Message::ConnectResponse(m) => serde_json::to_vec(m),
            Message::MoveRequest(m) => serde_json::to_vec(m),
            Message::MoveResponse(m) => serde_json::to_vec(m),
            Message::OpponentMove(m) => serde_json::to_vec(m),
            Message::ServerNotice(m) => serde_json::to_vec(m),
        }
    }

    pub(crate) fn from_json(tag: MessageTag, payload: &[u8]) -> serde_json::Result<Self> {
        use serde_json::from_slice;
        Ok(match tag {
            MessageTag::ConnectRequest => Message::ConnectRequest(from_slice(payload)?),
            MessageTag::ConnectResponse => Message::ConnectResponse(from_slice(payload)?),
            MessageTag::MoveRequest => Message::MoveRequest(from_slice(payload)?),
            MessageTag::MoveResponse => Message::MoveResponse(from_slice(payload)?),
            MessageTag::OpponentMove => Message::OpponentMove(from_slice(payload)?),
            MessageTag::ServerNotice => Message::ServerNotice(from_slice(payload)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strum::IntoEnumIterator;

    #[test]
    fn test_tags_are_stable() {
        let tags: Vec<u16> = MessageTag::iter().map(MessageTag::code).collect();
        assert_eq!(tags, vec![1, 2, 3, 4, 5, 6]);
        assert!(MessageTag::MoveRequest.from_client());
        assert!(!MessageTag::OpponentMove.from_client());
    }

    #[test]
    fn test_move_request_field_names() {
        let placement = Placement::new(
            ShapeId::new(7).unwrap(),
            Orientation::new(3),
            Coord::new(4, 9),
        );
        let request = MoveRequest::new(ClientId::new(42), &placement);
        let value = serde_json::to_value(request).unwrap();
        assert_eq!(value, json!({"id": 42, "shape": 7, "pos": [4, 9], "rotation": 3}));
    }

    #[test]
    fn test_out_of_range_shape_is_not_a_placement() {
        let request: MoveRequest =
            serde_json::from_value(json!({"id": 1, "shape": 30, "pos": [0, 0], "rotation": 11}))
                .unwrap();
        assert_eq!(request.placement(), None);
        let request = MoveRequest { shape: 2, ..request };
        assert_eq!(request.placement().unwrap().orientation, Orientation::new(3));
    }

    #[test]
    fn test_unreachable_origin_is_not_a_placement() {
        let far = MoveRequest { id: ClientId::new(1), shape: 16, pos: [i32::MAX, 0], rotation: 0 };
        assert_eq!(far.placement(), None);
        let far = MoveRequest { pos: [3, i32::MIN], ..far };
        assert_eq!(far.placement(), None);
        let edge = MoveRequest { pos: [-2, 19], ..far };
        assert_eq!(edge.placement().unwrap().origin, Coord::new(-2, 19));
    }

    #[test]
    fn test_game_over_serializes_as_minus_one() {
        let value = serde_json::to_value(MoveResponse { ok: true, active_player: None }).unwrap();
        assert_eq!(value, json!({"ok": true, "active_player": -1}));
        let back: MoveResponse =
            serde_json::from_value(json!({"ok": false, "active_player": 2})).unwrap();
        assert_eq!(back.active_player, PlayerId::new(2));
    }

    #[test]
    fn test_broadcast_rejects_bad_seat() {
        let bad = json!({
            "player_id": 7, "shape": 0, "pos": [0, 0], "rotation": 0, "active_player": 1
        });
        assert!(serde_json::from_value::<OpponentMove>(bad).is_err());
    }
}
