use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use abi::errors::{Error, Result};
use abi::model::{
    IntroRequest, NewIntroRequest, Progress, RequestStatus, RequestType, StageStatus,
};

use crate::IntroService;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub from_user_id: String,
    pub to_user_id: String,
    #[serde(default)]
    pub via_user_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Decline,
}

/// the consent an actor is giving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// stage 1 of an introduction
    Connector,
    /// the only stage of a friend request, stage 2 of an introduction
    Target,
}

/// Work out which stage `actor` may decide on.
///
/// Strangers are `Forbidden` whatever the state. Parties acting on a terminal
/// request, or on a stage they already decided, get `AlreadyProcessed`. The
/// target of an introduction is `Forbidden` until the connector approved.
pub fn resolve_stage(req: &IntroRequest, actor: &str) -> Result<Stage> {
    let is_target = req.to_user_id == actor;
    let is_connector = req.request_type == RequestType::Introduction && req.via_user_id == actor;
    if !is_target && !is_connector {
        return Err(Error::forbidden(format!(
            "{} is not a party that decides request {}",
            actor, req.id
        )));
    }
    if req.progress().is_terminal() {
        return Err(Error::already_processed());
    }

    match req.request_type {
        RequestType::Friend => Ok(Stage::Target),
        RequestType::Introduction if is_connector => match req.connector_status {
            StageStatus::Pending => Ok(Stage::Connector),
            _ => Err(Error::already_processed()),
        },
        RequestType::Introduction => match (req.connector_status, req.target_status) {
            (StageStatus::Pending, _) => Err(Error::forbidden(
                "the connector has not vouched for this introduction yet",
            )),
            (StageStatus::Approved, StageStatus::Pending) => Ok(Stage::Target),
            _ => Err(Error::already_processed()),
        },
    }
}

/// Progress after `decision` on `stage`. Declining any stage ends the request,
/// approving ends it only when the target approves.
pub fn next_progress(current: Progress, stage: Stage, decision: Decision) -> Progress {
    let stage_result = match decision {
        Decision::Approve => StageStatus::Approved,
        Decision::Decline => StageStatus::Declined,
    };
    let mut next = current;
    match stage {
        Stage::Connector => {
            next.connector_status = stage_result;
            if decision == Decision::Decline {
                next.status = RequestStatus::Declined;
            }
        }
        Stage::Target => {
            // friend requests keep their stages at n/a
            if next.target_status != StageStatus::NotApplicable {
                next.target_status = stage_result;
            }
            next.status = match decision {
                Decision::Approve => RequestStatus::Approved,
                Decision::Decline => RequestStatus::Declined,
            };
        }
    }
    next
}

fn clean_message(message: Option<String>) -> Option<String> {
    message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

impl IntroService {
    /// validate and store a new friend request or introduction
    pub async fn submit_request(&self, req: SubmitRequest) -> Result<IntroRequest> {
        let SubmitRequest {
            request_type,
            from_user_id,
            to_user_id,
            via_user_id,
            message,
        } = req;

        if from_user_id == to_user_id {
            return Err(Error::invalid_participants(
                "a request cannot target its sender",
            ));
        }

        let via_user_id = match request_type {
            RequestType::Friend => {
                if via_user_id.is_some() {
                    debug!("ignoring via user on friend request {} -> {}", from_user_id, to_user_id);
                }
                to_user_id.clone()
            }
            RequestType::Introduction => {
                let via = via_user_id.ok_or_else(|| {
                    Error::invalid_participants("an introduction needs a connector")
                })?;
                if via == from_user_id || via == to_user_id {
                    return Err(Error::invalid_participants(
                        "the connector must be a third party",
                    ));
                }
                via
            }
        };

        let ids = vec![from_user_id.clone(), to_user_id.clone(), via_user_id.clone()];
        let users = self.db.user.get_users(&ids).await?;
        if let Some(missing) = ids.iter().find(|id| !users.iter().any(|u| &u.id == *id)) {
            return Err(Error::user_not_found(missing.as_str()));
        }

        if self.db.friend.are_friends(&from_user_id, &to_user_id).await? {
            return Err(Error::already_friends());
        }

        if request_type == RequestType::Introduction {
            let friends = self
                .db
                .friend
                .friend_ids_of(std::slice::from_ref(&via_user_id))
                .await?;
            let connector_friends = friends.get(&via_user_id).map(Vec::as_slice).unwrap_or(&[]);
            if !connector_friends.contains(&from_user_id)
                || !connector_friends.contains(&to_user_id)
            {
                return Err(Error::invalid_participants(
                    "the connector must be a friend of both parties",
                ));
            }
        }

        if let Some(existing) = self.find_between(&from_user_id, &to_user_id).await? {
            if existing.is_live() {
                debug!("live request {} already covers the pair", existing.id);
                return Err(Error::duplicate_request());
            }
        }

        let created = self
            .db
            .intro
            .create(NewIntroRequest {
                request_type,
                from_user_id,
                to_user_id,
                via_user_id,
                message: clean_message(message),
            })
            .await?;
        info!(
            "{} request {} submitted: {} -> {} via {}",
            created.request_type,
            created.id,
            created.from_user_id,
            created.to_user_id,
            created.via_user_id
        );
        Ok(created)
    }

    pub async fn approve_request(&self, request_id: &str, acting_user_id: &str) -> Result<IntroRequest> {
        self.decide(request_id, acting_user_id, Decision::Approve)
            .await
    }

    pub async fn decline_request(&self, request_id: &str, acting_user_id: &str) -> Result<IntroRequest> {
        self.decide(request_id, acting_user_id, Decision::Decline)
            .await
    }

    async fn decide(
        &self,
        request_id: &str,
        acting_user_id: &str,
        decision: Decision,
    ) -> Result<IntroRequest> {
        let req = self
            .db
            .intro
            .get(request_id)
            .await?
            .ok_or_else(|| Error::not_found_with_details(format!("request {}", request_id)))?;

        let stage = resolve_stage(&req, acting_user_id)?;
        // the pair connected some other way since this was sent
        if self
            .db
            .friend
            .are_friends(&req.from_user_id, &req.to_user_id)
            .await?
        {
            debug!("request {} superseded by an existing friendship", req.id);
            return Err(Error::already_friends());
        }
        let expected = req.progress();
        let next = next_progress(expected, stage, decision);

        let Some(updated) = self.db.intro.advance(request_id, expected, next).await? else {
            warn!(
                "{:?} by {} on request {} lost to a concurrent decision",
                decision, acting_user_id, request_id
            );
            return Err(Error::already_processed());
        };

        info!(
            "request {} {:?} at {:?} stage by {}: status {}",
            updated.id, decision, stage, acting_user_id, updated.status
        );
        if updated.status == RequestStatus::Approved {
            info!(
                "friendship formed: {} <-> {}",
                updated.from_user_id, updated.to_user_id
            );
        }
        Ok(updated)
    }

    /// latest request on the ordered pair; `(a, b)` and `(b, a)` are different pairs
    pub async fn find_between(
        &self,
        from_user_id: &str,
        to_user_id: &str,
    ) -> Result<Option<IntroRequest>> {
        self.db.intro.find_between(from_user_id, to_user_id).await
    }

    /// requests waiting on `user_id`, minus those whose pair is already connected
    pub async fn list_received(&self, user_id: &str) -> Result<Vec<IntroRequest>> {
        let received = self.db.intro.list_received(user_id).await?;
        self.drop_superseded(received).await
    }

    pub async fn list_sent(&self, user_id: &str) -> Result<Vec<IntroRequest>> {
        self.db.intro.list_sent(user_id).await
    }

    async fn drop_superseded(&self, requests: Vec<IntroRequest>) -> Result<Vec<IntroRequest>> {
        if requests.is_empty() {
            return Ok(requests);
        }
        let mut senders: Vec<String> = requests.iter().map(|r| r.from_user_id.clone()).collect();
        senders.sort();
        senders.dedup();

        let adjacency = self.db.friend.friend_ids_of(&senders).await?;
        Ok(requests
            .into_iter()
            .filter(|r| {
                !adjacency
                    .get(&r.from_user_id)
                    .is_some_and(|friends| friends.contains(&r.to_user_id))
            })
            .collect())
    }
}
