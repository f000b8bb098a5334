//! Integration tests for comment ownership and reply threading.

use ticketdesk::config::Config;
use ticketdesk::domain::{NewTicket, NewUser, Role, SetupRequest, Ticket, UserInfo};
use ticketdesk::services::{Resource, ServiceError};
use ticketdesk::state::SharedState;

async fn spawn_state() -> SharedState {
    let db_path = std::env::temp_dir().join(format!(
        "ticketdesk-comment-test-{}.db",
        uuid::Uuid::new_v4()
    ));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    SharedState::new(config)
        .await
        .expect("Failed to create shared state")
}

/// Admin, a member who owns a ticket, and another member.
async fn seed(state: &SharedState) -> (UserInfo, UserInfo, UserInfo, Ticket) {
    let admin = state
        .auth_service
        .setup(SetupRequest {
            name: "Ada Admin".to_string(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "correct horse battery".to_string(),
        })
        .await
        .unwrap();

    let mut members = Vec::new();
    for username in ["bob", "mallory"] {
        let member = state
            .user_service
            .create_user(
                &admin,
                NewUser {
                    name: username.to_string(),
                    username: username.to_string(),
                    email: format!("{username}@example.com"),
                    password: "member password".to_string(),
                    role: Role::Member,
                },
            )
            .await
            .unwrap();
        members.push(member);
    }
    let mallory = members.pop().unwrap();
    let bob = members.pop().unwrap();

    let ticket = state
        .ticket_service
        .create_ticket(
            &bob,
            NewTicket {
                title: "Wi-Fi keeps dropping".to_string(),
                description: "Every afternoon around 3pm".to_string(),
                ..NewTicket::default()
            },
        )
        .await
        .unwrap();

    (admin, bob, mallory, ticket)
}

#[tokio::test]
async fn test_anyone_can_comment_and_reply() {
    let state = spawn_state().await;
    let (_, bob, mallory, ticket) = seed(&state).await;

    let question = state
        .comment_service
        .create_comment(&mallory, ticket.id, "Which floor?", None)
        .await
        .unwrap();
    let answer = state
        .comment_service
        .create_comment(&bob, ticket.id, "Third floor", Some(question.id))
        .await
        .unwrap();

    assert_eq!(question.created_by, mallory.id);
    assert_eq!(answer.reply_to, Some(question.id));

    let comments = state.comment_service.list_comments(ticket.id).await.unwrap();
    let contents: Vec<&str> = comments.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(
        contents,
        vec!["Every afternoon around 3pm", "Which floor?", "Third floor"]
    );
}

#[tokio::test]
async fn test_comment_on_missing_ticket_or_foreign_reply() {
    let state = spawn_state().await;
    let (admin, bob, _, ticket) = seed(&state).await;

    let err = state
        .comment_service
        .create_comment(&bob, 404, "Hello?", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(Resource::Ticket)));

    let other = state
        .ticket_service
        .create_ticket(
            &admin,
            NewTicket {
                title: "Other".to_string(),
                description: "Unrelated".to_string(),
                ..NewTicket::default()
            },
        )
        .await
        .unwrap();
    let foreign = state.comment_service.list_comments(other.id).await.unwrap()[0].id;

    let err = state
        .comment_service
        .create_comment(&bob, ticket.id, "Reply", Some(foreign))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(Resource::Comment)));

    let err = state.comment_service.list_comments(404).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(Resource::Ticket)));
}

#[tokio::test]
async fn test_only_author_or_admin_may_edit_or_delete() {
    let state = spawn_state().await;
    let (admin, bob, mallory, ticket) = seed(&state).await;

    let comment = state
        .comment_service
        .create_comment(&bob, ticket.id, "Restarted the router", None)
        .await
        .unwrap();

    let err = state
        .comment_service
        .patch_comment(&mallory, comment.id, "lol")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));

    let err = state
        .comment_service
        .delete_comment(&mallory, comment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));

    let comments = state.comment_service.list_comments(ticket.id).await.unwrap();
    assert_eq!(comments[1].content, "Restarted the router");

    let edited = state
        .comment_service
        .patch_comment(&bob, comment.id, "Restarted the router twice")
        .await
        .unwrap();
    assert_eq!(edited.content, "Restarted the router twice");

    state
        .comment_service
        .delete_comment(&admin, comment.id)
        .await
        .unwrap();
    assert_eq!(
        state.comment_service.list_comments(ticket.id).await.unwrap().len(),
        1
    );

    let err = state
        .comment_service
        .patch_comment(&admin, comment.id, "gone")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(Resource::Comment)));
}

#[tokio::test]
async fn test_description_comment_is_editable_but_not_deletable() {
    let state = spawn_state().await;
    let (_, bob, _, ticket) = seed(&state).await;

    let description = state.comment_service.list_comments(ticket.id).await.unwrap()[0].clone();

    let edited = state
        .comment_service
        .patch_comment(&bob, description.id, "Every afternoon around 3pm, floor 3")
        .await
        .unwrap();
    assert_eq!(edited.id, description.id);

    let err = state
        .comment_service
        .delete_comment(&bob, description.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));
}

#[tokio::test]
async fn test_deleting_a_comment_detaches_replies() {
    let state = spawn_state().await;
    let (_, bob, mallory, ticket) = seed(&state).await;

    let question = state
        .comment_service
        .create_comment(&mallory, ticket.id, "Which floor?", None)
        .await
        .unwrap();
    let answer = state
        .comment_service
        .create_comment(&bob, ticket.id, "Third floor", Some(question.id))
        .await
        .unwrap();

    state
        .comment_service
        .delete_comment(&mallory, question.id)
        .await
        .unwrap();

    let comments = state.comment_service.list_comments(ticket.id).await.unwrap();
    let reply = comments.iter().find(|c| c.id == answer.id).unwrap();
    assert_eq!(reply.reply_to, None);
}
