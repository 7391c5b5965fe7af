//! Dialogue stages.
//!
//! The stage vocabulary is a closed enum known at build time. The classifier
//! can only ever resolve to one of these values, and dispatch sites match
//! exhaustively, so adding a stage is a compile-time-checked change rather
//! than a silent runtime no-op.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A discrete conversational intent category determining which handler
/// responds to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Greeting, opening of the dialogue.
    Greeting,
    /// Questions about services, prices, staff.
    InformationGathering,
    /// Booking a service.
    Booking,
    /// Booking with a specific specialist.
    BookingToMaster,
    /// Request to cancel an existing booking.
    CancellationRequest,
    /// Moving an existing booking to another time.
    Reschedule,
    /// Viewing the client's own bookings.
    ViewMyBooking,
}

impl Stage {
    /// All stages, in classifier-prompt order.
    pub const ALL: [Stage; 7] = [
        Stage::Greeting,
        Stage::InformationGathering,
        Stage::Booking,
        Stage::BookingToMaster,
        Stage::CancellationRequest,
        Stage::Reschedule,
        Stage::ViewMyBooking,
    ];

    /// The canonical lowercase name used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Greeting => "greeting",
            Stage::InformationGathering => "information_gathering",
            Stage::Booking => "booking",
            Stage::BookingToMaster => "booking_to_master",
            Stage::CancellationRequest => "cancellation_request",
            Stage::Reschedule => "reschedule",
            Stage::ViewMyBooking => "view_my_booking",
        }
    }

    /// Short description used only to build the classifier's decision
    /// context. Router logic never reads these.
    pub fn description(&self) -> &'static str {
        match self {
            Stage::Greeting => "the client greets, opens the conversation, or makes small talk",
            Stage::InformationGathering => {
                "the client asks about services, prices, durations, or staff"
            }
            Stage::Booking => "the client wants to book a service",
            Stage::BookingToMaster => "the client wants to book with a specific specialist",
            Stage::CancellationRequest => "the client wants to cancel an existing booking",
            Stage::Reschedule => "the client wants to move an existing booking",
            Stage::ViewMyBooking => "the client wants to see their own bookings",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for strings outside the closed stage vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stage: {0}")]
pub struct UnknownStage(pub String);

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}
