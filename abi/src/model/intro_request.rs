use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    /// single stage, the target decides
    Friend,
    /// two stages, the connector vouches then the target decides
    Introduction,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Declined,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "stage_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    #[default]
    Pending,
    Approved,
    Declined,
    #[sqlx(rename = "n/a")]
    #[serde(rename = "n/a")]
    NotApplicable,
}

impl Display for RequestType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestType::Friend => f.write_str("friend"),
            RequestType::Introduction => f.write_str("introduction"),
        }
    }
}

impl Display for RequestStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => f.write_str("pending"),
            RequestStatus::Approved => f.write_str("approved"),
            RequestStatus::Declined => f.write_str("declined"),
        }
    }
}

impl Display for StageStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StageStatus::Pending => f.write_str("pending"),
            StageStatus::Approved => f.write_str("approved"),
            StageStatus::Declined => f.write_str("declined"),
            StageStatus::NotApplicable => f.write_str("n/a"),
        }
    }
}

/// The mutable state of a request. Every transition swaps one progress for
/// another, conditional on the stored progress being the expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub status: RequestStatus,
    pub connector_status: StageStatus,
    pub target_status: StageStatus,
}

impl Progress {
    /// where every new request of the given type starts
    pub fn initial(request_type: RequestType) -> Self {
        let stage = match request_type {
            RequestType::Friend => StageStatus::NotApplicable,
            RequestType::Introduction => StageStatus::Pending,
        };
        Self {
            status: RequestStatus::Pending,
            connector_status: stage,
            target_status: stage,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != RequestStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct IntroRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub from_user_id: String,
    pub to_user_id: String,
    /// equals `to_user_id` for friend requests
    pub via_user_id: String,
    pub message: Option<String>,
    pub status: RequestStatus,
    pub connector_status: StageStatus,
    pub target_status: StageStatus,
    pub create_time: i64,
    pub update_time: i64,
}

impl IntroRequest {
    pub fn progress(&self) -> Progress {
        Progress {
            status: self.status,
            connector_status: self.connector_status,
            target_status: self.target_status,
        }
    }

    pub fn set_progress(&mut self, progress: Progress) {
        self.status = progress.status;
        self.connector_status = progress.connector_status;
        self.target_status = progress.target_status;
    }

    pub fn is_live(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// whether `user_id` has to act on this request right now
    pub fn awaits(&self, user_id: &str) -> bool {
        if !self.is_live() {
            return false;
        }
        match self.request_type {
            RequestType::Friend => self.to_user_id == user_id,
            RequestType::Introduction => {
                (self.via_user_id == user_id && self.connector_status == StageStatus::Pending)
                    || (self.to_user_id == user_id
                        && self.connector_status == StageStatus::Approved
                        && self.target_status == StageStatus::Pending)
            }
        }
    }
}

/// validated request, ready to be stored
#[derive(Debug, Clone)]
pub struct NewIntroRequest {
    pub request_type: RequestType,
    pub from_user_id: String,
    pub to_user_id: String,
    pub via_user_id: String,
    pub message: Option<String>,
}
