use abi::errors::ErrorKind;
use abi::model::NewUser;
use intro::IntroService;

async fn user(service: &IntroService, username: &str) -> String {
    service
        .create_user(NewUser {
            username: username.to_string(),
            name: format!("{} Display", username),
            ..Default::default()
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn fof_should_list_every_connector() {
    let service = IntroService::in_memory();
    let u = user(&service, "user_u").await;
    let a = user(&service, "user_a").await;
    let b = user(&service, "user_b").await;
    let x = user(&service, "user_x").await;
    let y = user(&service, "user_y").await;

    // U{A,B}  A{U,X}  B{U,X,Y}
    for (p, q) in [(&u, &a), (&u, &b), (&a, &x), (&b, &x), (&b, &y)] {
        service.add_friend_edge(p, q).await.unwrap();
    }

    let fof = service.compute_friends_of_friends(&u).await.unwrap();
    assert_eq!(fof.len(), 2);

    // x has two connectors so it sorts first
    assert_eq!(fof[0].user.id, x);
    let mut expected = vec![a.clone(), b.clone()];
    expected.sort();
    let got: Vec<_> = fof[0].mutual_connectors.iter().map(|c| c.id.clone()).collect();
    assert_eq!(got, expected);

    assert_eq!(fof[1].user.id, y);
    assert_eq!(fof[1].mutual_connectors.len(), 1);
    assert_eq!(fof[1].mutual_connectors[0].id, b);
    assert_eq!(fof[1].mutual_connectors[0].display_name, "user_b Display");

    // never self, never a direct friend
    assert!(fof.iter().all(|f| f.user.id != u && f.user.id != a && f.user.id != b));
}

#[tokio::test]
async fn fof_of_lonely_user_should_be_empty() {
    let service = IntroService::in_memory();
    let u = user(&service, "lonely").await;
    assert!(service.compute_friends_of_friends(&u).await.unwrap().is_empty());
}

#[tokio::test]
async fn fof_of_unknown_user_should_fail() {
    let service = IntroService::in_memory();
    let err = service
        .compute_friends_of_friends("ghost")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::UserNotFound);
}

#[tokio::test]
async fn social_map_should_bundle_friends_and_fof() {
    let service = IntroService::in_memory();
    let u = user(&service, "user_u").await;
    let a = user(&service, "user_a").await;
    let x = user(&service, "user_x").await;
    service.add_friend_edge(&u, &a).await.unwrap();
    service.add_friend_edge(&a, &x).await.unwrap();

    let map = service.social_map(&u).await.unwrap();
    assert_eq!(map.user.id, u);
    assert_eq!(map.friends.len(), 1);
    assert_eq!(map.friends[0].id, a);
    assert_eq!(map.friends_of_friends.len(), 1);
    assert_eq!(map.friends_of_friends[0].user.id, x);
}

#[tokio::test]
async fn removing_edge_should_update_both_sides() {
    let service = IntroService::in_memory();
    let u = user(&service, "user_u").await;
    let a = user(&service, "user_a").await;
    let x = user(&service, "user_x").await;
    service.add_friend_edge(&u, &a).await.unwrap();
    service.add_friend_edge(&a, &x).await.unwrap();

    service.remove_friend_edge(&a, &u).await.unwrap();
    assert!(service.list_friends(&u).await.unwrap().is_empty());
    assert_eq!(service.list_friends(&a).await.unwrap().len(), 1);
    assert!(service.compute_friends_of_friends(&u).await.unwrap().is_empty());
}

#[tokio::test]
async fn self_edge_should_be_rejected() {
    let service = IntroService::in_memory();
    let u = user(&service, "user_u").await;
    let err = service.add_friend_edge(&u, &u).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidParticipants);
}
