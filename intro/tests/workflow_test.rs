use abi::errors::ErrorKind;
use abi::model::{NewUser, RequestStatus, RequestType, StageStatus};
use intro::{IntroService, SubmitRequest};

async fn user(service: &IntroService, username: &str) -> String {
    service
        .create_user(NewUser {
            username: username.to_string(),
            name: username.to_uppercase(),
            ..Default::default()
        })
        .await
        .unwrap()
        .id
}

fn friend_request(from: &str, to: &str) -> SubmitRequest {
    SubmitRequest {
        request_type: RequestType::Friend,
        from_user_id: from.to_string(),
        to_user_id: to.to_string(),
        via_user_id: None,
        message: None,
    }
}

fn introduction(from: &str, to: &str, via: &str, message: Option<&str>) -> SubmitRequest {
    SubmitRequest {
        request_type: RequestType::Introduction,
        from_user_id: from.to_string(),
        to_user_id: to.to_string(),
        via_user_id: Some(via.to_string()),
        message: message.map(str::to_string),
    }
}

/// requester R and target T both know connector C
async fn triangle() -> (IntroService, String, String, String) {
    let service = IntroService::in_memory();
    let r = user(&service, "requester").await;
    let c = user(&service, "connector").await;
    let t = user(&service, "target").await;
    service.add_friend_edge(&r, &c).await.unwrap();
    service.add_friend_edge(&c, &t).await.unwrap();
    (service, r, c, t)
}

#[tokio::test]
async fn introduction_should_need_both_consents() {
    let (service, r, c, t) = triangle().await;

    let req = service
        .submit_request(introduction(&r, &t, &c, Some("hi")))
        .await
        .unwrap();
    assert_eq!(req.status, RequestStatus::Pending);
    assert_eq!(req.connector_status, StageStatus::Pending);
    assert_eq!(req.target_status, StageStatus::Pending);
    assert_eq!(req.message.as_deref(), Some("hi"));

    // the connector sees it first, the target does not yet
    let for_connector = service.list_received(&c).await.unwrap();
    assert_eq!(for_connector.len(), 1);
    assert!(service.list_received(&t).await.unwrap().is_empty());

    let req = service.approve_request(&req.id, &c).await.unwrap();
    assert_eq!(req.status, RequestStatus::Pending);
    assert_eq!(req.connector_status, StageStatus::Approved);
    assert!(!service.list_friends(&r).await.unwrap().iter().any(|u| u.id == t));

    // the connector already vouched
    let err = service.approve_request(&req.id, &c).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::AlreadyProcessed);

    assert_eq!(service.list_received(&t).await.unwrap().len(), 1);
    assert!(service.list_received(&c).await.unwrap().is_empty());

    let req = service.approve_request(&req.id, &t).await.unwrap();
    assert_eq!(req.status, RequestStatus::Approved);
    assert_eq!(req.target_status, StageStatus::Approved);

    let err = service.approve_request(&req.id, &t).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::AlreadyProcessed);

    let friends_of_r = service.list_friends(&r).await.unwrap();
    assert!(friends_of_r.iter().any(|u| u.id == t));
    let friends_of_t = service.list_friends(&t).await.unwrap();
    assert!(friends_of_t.iter().any(|u| u.id == r));

    let sent = service.list_sent(&r).await.unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].status, RequestStatus::Approved);
}

#[tokio::test]
async fn target_acting_before_connector_should_be_forbidden() {
    let (service, r, c, t) = triangle().await;
    let req = service
        .submit_request(introduction(&r, &t, &c, None))
        .await
        .unwrap();

    for result in [
        service.approve_request(&req.id, &t).await,
        service.decline_request(&req.id, &t).await,
    ] {
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::Forbidden);
    }

    let stored = service.find_between(&r, &t).await.unwrap().unwrap();
    assert_eq!(stored.progress(), req.progress());
}

#[tokio::test]
async fn connector_decline_should_end_the_introduction() {
    let (service, r, c, t) = triangle().await;
    let req = service
        .submit_request(introduction(&r, &t, &c, None))
        .await
        .unwrap();

    let req = service.decline_request(&req.id, &c).await.unwrap();
    assert_eq!(req.status, RequestStatus::Declined);
    assert_eq!(req.connector_status, StageStatus::Declined);
    assert_eq!(req.target_status, StageStatus::Pending);

    let err = service.approve_request(&req.id, &t).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::AlreadyProcessed);
    let err = service.approve_request(&req.id, &c).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::AlreadyProcessed);
    assert!(service.list_received(&t).await.unwrap().is_empty());
    let err = service.decline_request(&req.id, &c).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::AlreadyProcessed);

    // a fresh attempt is allowed once the old one is terminal
    service
        .submit_request(introduction(&r, &t, &c, None))
        .await
        .unwrap();
}

#[tokio::test]
async fn friend_request_should_form_edge_on_approval() {
    let service = IntroService::in_memory();
    let a = user(&service, "alice").await;
    let b = user(&service, "bob").await;

    let req = service.submit_request(friend_request(&a, &b)).await.unwrap();
    assert_eq!(req.via_user_id, b);
    assert_eq!(req.connector_status, StageStatus::NotApplicable);
    assert_eq!(req.target_status, StageStatus::NotApplicable);

    let err = service.approve_request(&req.id, &a).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::Forbidden);

    let req = service.approve_request(&req.id, &b).await.unwrap();
    assert_eq!(req.status, RequestStatus::Approved);

    let err = service
        .submit_request(friend_request(&b, &a))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::AlreadyFriends);
}

#[tokio::test]
async fn stranger_should_be_forbidden() {
    let (service, r, c, t) = triangle().await;
    let x = user(&service, "stranger").await;
    let req = service
        .submit_request(introduction(&r, &t, &c, None))
        .await
        .unwrap();

    let err = service.approve_request(&req.id, &x).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::Forbidden);
    // the requester cannot approve their own introduction either
    let err = service.approve_request(&req.id, &r).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::Forbidden);
}

#[tokio::test]
async fn unknown_request_should_be_not_found() {
    let (service, _, c, _) = triangle().await;
    let err = service.approve_request("missing", &c).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::NotFound);
}

#[tokio::test]
async fn submit_should_validate_participants() {
    let (service, r, c, t) = triangle().await;
    let loner = user(&service, "loner").await;

    let cases = [
        (friend_request(&r, &r), ErrorKind::InvalidParticipants),
        (
            SubmitRequest {
                via_user_id: None,
                ..introduction(&r, &t, &c, None)
            },
            ErrorKind::InvalidParticipants,
        ),
        (introduction(&r, &t, &r, None), ErrorKind::InvalidParticipants),
        (introduction(&r, &t, &t, None), ErrorKind::InvalidParticipants),
        (introduction(&r, &t, "ghost", None), ErrorKind::UserNotFound),
        (friend_request(&r, "ghost"), ErrorKind::UserNotFound),
        // the loner knows neither side
        (introduction(&r, &t, &loner, None), ErrorKind::InvalidParticipants),
        (friend_request(&r, &c), ErrorKind::AlreadyFriends),
    ];
    for (req, kind) in cases {
        let err = service.submit_request(req.clone()).await.unwrap_err();
        assert_eq!(err.kind(), &kind, "{:?}", req);
    }
    assert!(service.list_sent(&r).await.unwrap().is_empty());
}

#[tokio::test]
async fn already_friends_should_win_over_connector_rule() {
    let service = IntroService::in_memory();
    let r = user(&service, "requester").await;
    let c = user(&service, "connector").await;
    let t = user(&service, "target").await;
    service.add_friend_edge(&r, &t).await.unwrap();
    // the connector knows only the requester
    service.add_friend_edge(&r, &c).await.unwrap();

    let err = service
        .submit_request(introduction(&r, &t, &c, None))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::AlreadyFriends);
}

#[tokio::test]
async fn reverse_request_should_be_superseded_by_friendship() {
    let service = IntroService::in_memory();
    let a = user(&service, "alice").await;
    let b = user(&service, "bob").await;

    let forward = service.submit_request(friend_request(&a, &b)).await.unwrap();
    let reverse = service.submit_request(friend_request(&b, &a)).await.unwrap();
    assert_eq!(service.list_received(&a).await.unwrap().len(), 1);

    service.approve_request(&forward.id, &b).await.unwrap();

    assert!(service.list_received(&a).await.unwrap().is_empty());
    for result in [
        service.approve_request(&reverse.id, &a).await,
        service.decline_request(&reverse.id, &a).await,
    ] {
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::AlreadyFriends);
    }
    // strangers are still turned away first
    let x = user(&service, "stranger").await;
    let err = service.approve_request(&reverse.id, &x).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::Forbidden);

    let stored = service.find_between(&b, &a).await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Pending);
}

#[tokio::test]
async fn duplicate_suppression_should_be_directional() {
    let service = IntroService::in_memory();
    let a = user(&service, "alice").await;
    let b = user(&service, "bob").await;

    service.submit_request(friend_request(&a, &b)).await.unwrap();
    let err = service
        .submit_request(friend_request(&a, &b))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::DuplicateRequest);

    // the reverse direction is its own pair
    let reverse = service.submit_request(friend_request(&b, &a)).await.unwrap();
    assert_eq!(
        service.find_between(&b, &a).await.unwrap().unwrap().id,
        reverse.id
    );
}

#[tokio::test]
async fn concurrent_approvals_should_have_one_winner() {
    let service = IntroService::in_memory();
    let a = user(&service, "alice").await;
    let b = user(&service, "bob").await;
    let req = service.submit_request(friend_request(&a, &b)).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            let id = req.id.clone();
            let b = b.clone();
            tokio::spawn(async move { service.approve_request(&id, &b).await })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(e) => assert_eq!(e.kind(), &ErrorKind::AlreadyProcessed),
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(service.list_friends(&a).await.unwrap().len(), 1);
    assert_eq!(service.list_friends(&b).await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_submissions_should_have_one_winner() {
    let service = IntroService::in_memory();
    let a = user(&service, "alice").await;
    let b = user(&service, "bob").await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            let req = friend_request(&a, &b);
            tokio::spawn(async move { service.submit_request(req).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert_eq!(e.kind(), &ErrorKind::DuplicateRequest),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(service.list_sent(&a).await.unwrap().len(), 1);
}

#[tokio::test]
async fn blank_message_should_be_stored_as_none() {
    let (service, r, c, t) = triangle().await;
    let req = service
        .submit_request(introduction(&r, &t, &c, Some("   ")))
        .await
        .unwrap();
    assert_eq!(req.message, None);
}
