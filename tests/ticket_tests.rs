//! Integration tests for the ticket engine: creation, label/assignee
//! reconciliation, search, ownership and atomicity.

use sea_orm::{EntityTrait, PaginatorTrait};
use ticketdesk::config::Config;
use ticketdesk::domain::{
    NewTicket, NewUser, Role, SetupRequest, Ticket, TicketPatch, TicketStatus, UserInfo,
};
use ticketdesk::entities::prelude::{Comments, Labels, TicketLabels, Tickets};
use ticketdesk::query::{TagKey, TagPredicate};
use ticketdesk::services::{ErrorKind, Resource, ServiceError};
use ticketdesk::state::SharedState;

async fn spawn_state() -> SharedState {
    let db_path =
        std::env::temp_dir().join(format!("ticketdesk-ticket-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    SharedState::new(config)
        .await
        .expect("Failed to create shared state")
}

async fn bootstrap(state: &SharedState) -> UserInfo {
    state
        .auth_service
        .setup(SetupRequest {
            name: "Ada Admin".to_string(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "correct horse battery".to_string(),
        })
        .await
        .expect("Setup failed")
}

async fn add_member(state: &SharedState, admin: &UserInfo, username: &str) -> UserInfo {
    state
        .user_service
        .create_user(
            admin,
            NewUser {
                name: username.to_string(),
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: "member password".to_string(),
                role: Role::Member,
            },
        )
        .await
        .expect("Failed to create member")
}

fn new_ticket(title: &str, labels: &[&str], assignees: &[i32]) -> NewTicket {
    NewTicket {
        title: title.to_string(),
        description: format!("{title}: steps to reproduce"),
        labels: labels.iter().map(ToString::to_string).collect(),
        assignees: assignees.to_vec(),
    }
}

fn labels(names: &[&str]) -> Option<Vec<String>> {
    Some(names.iter().map(ToString::to_string).collect())
}

fn ids(tickets: &[Ticket]) -> Vec<i32> {
    tickets.iter().map(|t| t.id).collect()
}

#[tokio::test]
async fn test_create_ticket_hydrates_labels_and_assignees() {
    let state = spawn_state().await;
    let admin = bootstrap(&state).await;
    let bob = add_member(&state, &admin, "bob").await;

    let ticket = state
        .ticket_service
        .create_ticket(
            &bob,
            new_ticket("Login page crashes", &["site", "bug", "bug"], &[admin.id, bob.id]),
        )
        .await
        .unwrap();

    assert_eq!(ticket.status, TicketStatus::Open);
    assert_eq!(ticket.created_by, bob.id);
    assert_eq!(ticket.labels, vec!["bug", "site"]);
    assert_eq!(ticket.assignees, vec![admin.id, bob.id]);

    let comments = state.comment_service.list_comments(ticket.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].content, "Login page crashes: steps to reproduce");
    assert_eq!(comments[0].created_by, bob.id);

    assert_eq!(state.ticket_service.get_ticket(ticket.id).await.unwrap(), ticket);
}

#[tokio::test]
async fn test_failed_create_leaves_nothing_behind() {
    let state = spawn_state().await;
    let admin = bootstrap(&state).await;

    let err = state
        .ticket_service
        .create_ticket(&admin, new_ticket("Ghost", &["bug", "brand-new"], &[9999]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(Resource::User)));

    let conn = &state.store.conn;
    assert_eq!(Tickets::find().count(conn).await.unwrap(), 0);
    assert_eq!(Comments::find().count(conn).await.unwrap(), 0);
    assert_eq!(Labels::find().count(conn).await.unwrap(), 0);
    assert_eq!(TicketLabels::find().count(conn).await.unwrap(), 0);
}

#[tokio::test]
async fn test_patch_labels_symmetric_difference() {
    let state = spawn_state().await;
    let admin = bootstrap(&state).await;

    let ticket = state
        .ticket_service
        .create_ticket(&admin, new_ticket("Slow search", &["bug", "feature", "site"], &[]))
        .await
        .unwrap();

    let patched = state
        .ticket_service
        .patch_ticket(
            &admin,
            ticket.id,
            TicketPatch {
                labels: labels(&["site", "request", "bug"]),
                ..TicketPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(patched.labels, vec!["bug", "request", "site"]);
    assert_eq!(patched.title, "Slow search");

    // The unassigned label itself survives; only the link is gone.
    let all_labels: Vec<String> = state
        .ticket_service
        .list_labels()
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.name)
        .collect();
    assert_eq!(all_labels, vec!["bug", "feature", "request", "site"]);
}

#[tokio::test]
async fn test_patch_with_same_sets_writes_nothing() {
    let state = spawn_state().await;
    let admin = bootstrap(&state).await;
    let bob = add_member(&state, &admin, "bob").await;

    let ticket = state
        .ticket_service
        .create_ticket(&admin, new_ticket("Printer on fire", &["bug", "site"], &[bob.id]))
        .await
        .unwrap();

    let links_before = TicketLabels::find().all(&state.store.conn).await.unwrap();

    let patched = state
        .ticket_service
        .patch_ticket(
            &admin,
            ticket.id,
            TicketPatch {
                title: Some("Printer on fire".to_string()),
                labels: labels(&["site", "bug"]),
                assignees: Some(vec![bob.id]),
            },
        )
        .await
        .unwrap();

    let links_after = TicketLabels::find().all(&state.store.conn).await.unwrap();

    assert_eq!(links_before, links_after);
    assert_eq!(patched, ticket);
    assert_eq!(patched.updated_at, ticket.updated_at);
}

#[tokio::test]
async fn test_patch_assignees_symmetric_difference() {
    let state = spawn_state().await;
    let admin = bootstrap(&state).await;
    let bob = add_member(&state, &admin, "bob").await;
    let carol = add_member(&state, &admin, "carol").await;

    let ticket = state
        .ticket_service
        .create_ticket(&admin, new_ticket("VPN drops", &[], &[admin.id, bob.id]))
        .await
        .unwrap();

    let patched = state
        .ticket_service
        .patch_ticket(
            &admin,
            ticket.id,
            TicketPatch {
                title: Some("VPN drops hourly".to_string()),
                assignees: Some(vec![bob.id, carol.id]),
                ..TicketPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(patched.assignees, vec![bob.id, carol.id]);
    assert_eq!(patched.title, "VPN drops hourly");

    let err = state
        .ticket_service
        .patch_ticket(
            &admin,
            ticket.id,
            TicketPatch {
                assignees: Some(vec![bob.id, 4242]),
                ..TicketPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(Resource::User)));

    // Rolled back: carol is still assigned.
    let current = state.ticket_service.get_ticket(ticket.id).await.unwrap();
    assert_eq!(current.assignees, vec![bob.id, carol.id]);
}

#[tokio::test]
async fn test_non_owner_cannot_patch_or_delete() {
    let state = spawn_state().await;
    let admin = bootstrap(&state).await;
    let bob = add_member(&state, &admin, "bob").await;
    let mallory = add_member(&state, &admin, "mallory").await;

    let ticket = state
        .ticket_service
        .create_ticket(&bob, new_ticket("Keyboard sticky", &["hardware"], &[]))
        .await
        .unwrap();

    let err = state
        .ticket_service
        .patch_ticket(
            &mallory,
            ticket.id,
            TicketPatch {
                title: Some("pwned".to_string()),
                labels: labels(&[]),
                ..TicketPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let err = state
        .ticket_service
        .delete_ticket(&mallory, ticket.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));

    assert_eq!(state.ticket_service.get_ticket(ticket.id).await.unwrap(), ticket);

    // Admins may edit anything.
    let patched = state
        .ticket_service
        .patch_ticket(
            &admin,
            ticket.id,
            TicketPatch {
                title: Some("Keyboard sticky (spilled coffee)".to_string()),
                ..TicketPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.labels, vec!["hardware"]);
}

#[tokio::test]
async fn test_missing_ticket_is_not_found() {
    let state = spawn_state().await;
    let admin = bootstrap(&state).await;

    let err = state
        .ticket_service
        .patch_ticket(&admin, 77, TicketPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(Resource::Ticket)));

    let err = state.ticket_service.delete_ticket(&admin, 77).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(Resource::Ticket)));

    let err = state.ticket_service.get_ticket(77).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_any_user_may_flip_status() {
    let state = spawn_state().await;
    let admin = bootstrap(&state).await;
    let bob = add_member(&state, &admin, "bob").await;

    let ticket = state
        .ticket_service
        .create_ticket(&admin, new_ticket("Monitor flickers", &[], &[]))
        .await
        .unwrap();

    let closed = state
        .ticket_service
        .patch_ticket_status(&bob, ticket.id, TicketStatus::Closed)
        .await
        .unwrap();
    assert_eq!(closed.status, TicketStatus::Closed);

    let reopened = state
        .ticket_service
        .patch_ticket_status(&bob, ticket.id, TicketStatus::Open)
        .await
        .unwrap();
    assert_eq!(reopened.status, TicketStatus::Open);

    let err = state
        .ticket_service
        .patch_ticket_status(&bob, 999, TicketStatus::Closed)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(Resource::Ticket)));
}

#[tokio::test]
async fn test_delete_ticket_cascades() {
    let state = spawn_state().await;
    let admin = bootstrap(&state).await;
    let bob = add_member(&state, &admin, "bob").await;

    let ticket = state
        .ticket_service
        .create_ticket(&bob, new_ticket("Old request", &["request"], &[admin.id]))
        .await
        .unwrap();
    state
        .comment_service
        .create_comment(&admin, ticket.id, "Looking into it", None)
        .await
        .unwrap();

    state
        .ticket_service
        .delete_ticket(&bob, ticket.id)
        .await
        .unwrap();

    let conn = &state.store.conn;
    assert_eq!(Tickets::find().count(conn).await.unwrap(), 0);
    assert_eq!(Comments::find().count(conn).await.unwrap(), 0);
    assert_eq!(TicketLabels::find().count(conn).await.unwrap(), 0);
    assert!(
        state
            .store
            .assignments()
            .get_for_pair(ticket.id, admin.id)
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(Labels::find().count(conn).await.unwrap(), 1);
}

#[tokio::test]
async fn test_search_by_label_and_title() {
    let state = spawn_state().await;
    let admin = bootstrap(&state).await;
    let service = &state.ticket_service;

    let crash = service
        .create_ticket(&admin, new_ticket("App crashes on start", &["bug"], &[]))
        .await
        .unwrap();
    let request = service
        .create_ticket(&admin, new_ticket("Dark mode please", &["request"], &[]))
        .await
        .unwrap();
    let site_feature = service
        .create_ticket(&admin, new_ticket("Site search", &["feature", "site"], &[]))
        .await
        .unwrap();
    let feature = service
        .create_ticket(&admin, new_ticket("Export to CSV", &["feature"], &[]))
        .await
        .unwrap();

    let all = service.search_tickets("").await.unwrap();
    assert_eq!(
        ids(&all),
        vec![crash.id, request.id, site_feature.id, feature.id]
    );

    let hits = service.search_tickets("label:bug").await.unwrap();
    assert_eq!(ids(&hits), vec![crash.id]);

    let hits = service.search_tickets("label:bug,request").await.unwrap();
    assert_eq!(ids(&hits), vec![crash.id, request.id]);

    let hits = service.search_tickets("label:feature label:site").await.unwrap();
    assert_eq!(ids(&hits), vec![site_feature.id]);

    let hits = service.search_tickets("CRASHES start").await.unwrap();
    assert_eq!(ids(&hits), vec![crash.id]);

    let hits = service.search_tickets("crashes dark").await.unwrap();
    assert!(hits.is_empty());

    let hits = service.search_tickets("title:search label:site").await.unwrap();
    assert_eq!(ids(&hits), vec![site_feature.id]);

    let hits = service
        .list_tickets(&[TagPredicate {
            key: TagKey::Label,
            values: vec!["feature".to_string()],
        }])
        .await
        .unwrap();
    assert_eq!(ids(&hits), vec![site_feature.id, feature.id]);
}

#[tokio::test]
async fn test_title_search_treats_wildcards_literally() {
    let state = spawn_state().await;
    let admin = bootstrap(&state).await;

    let percent = state
        .ticket_service
        .create_ticket(&admin, new_ticket("Disk at 100% usage", &[], &[]))
        .await
        .unwrap();
    state
        .ticket_service
        .create_ticket(&admin, new_ticket("Disk at 1000 usage", &[], &[]))
        .await
        .unwrap();

    let hits = state.ticket_service.search_tickets("100%").await.unwrap();
    assert_eq!(ids(&hits), vec![percent.id]);
}

#[tokio::test]
async fn test_title_search_folds_non_ascii_case() {
    let state = spawn_state().await;
    let admin = bootstrap(&state).await;

    let ecole = state
        .ticket_service
        .create_ticket(&admin, new_ticket("ÉCOLE portal down", &[], &[]))
        .await
        .unwrap();

    for query in ["école", "ÉCOLE", "École"] {
        let hits = state.ticket_service.search_tickets(query).await.unwrap();
        assert_eq!(ids(&hits), vec![ecole.id], "query {query}");
    }

    state
        .ticket_service
        .patch_ticket(
            &admin,
            ecole.id,
            TicketPatch {
                title: Some("Straße closed".to_string()),
                ..TicketPatch::default()
            },
        )
        .await
        .unwrap();

    assert!(state.ticket_service.search_tickets("école").await.unwrap().is_empty());
    let hits = state.ticket_service.search_tickets("STRAßE").await.unwrap();
    assert_eq!(ids(&hits), vec![ecole.id]);
}

#[tokio::test]
async fn test_invalid_search_query() {
    let state = spawn_state().await;

    let err = state.ticket_service.search_tickets("x:y:z").await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidSearchQuery(_)));

    let err = state
        .ticket_service
        .search_tickets("owner:me")
        .await
        .unwrap_err();
    let field = err.field_error().expect("search errors are field-tagged");
    assert_eq!((field.field, field.validator), ("q", "search"));
}

#[tokio::test]
async fn test_labels_get_or_create() {
    let state = spawn_state().await;
    let admin = bootstrap(&state).await;

    let first = state
        .ticket_service
        .create_label(&admin, "urgent")
        .await
        .unwrap();
    let second = state
        .ticket_service
        .create_label(&admin, " urgent ")
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.created_by, Some(admin.id));
    assert_eq!(state.ticket_service.list_labels().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_blank_label_name_is_rejected() {
    let state = spawn_state().await;
    let admin = bootstrap(&state).await;

    let err = state
        .ticket_service
        .create_label(&admin, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::EmptyLabelName));
    assert_eq!(err.kind(), ErrorKind::Validation);
    let field = err.field_error().unwrap();
    assert_eq!((field.field, field.validator), ("name", "required"));

    assert!(state.ticket_service.list_labels().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_assignments_are_idempotent_and_owner_gated() {
    let state = spawn_state().await;
    let admin = bootstrap(&state).await;
    let bob = add_member(&state, &admin, "bob").await;
    let mallory = add_member(&state, &admin, "mallory").await;

    let ticket = state
        .ticket_service
        .create_ticket(&bob, new_ticket("Need a new laptop", &[], &[]))
        .await
        .unwrap();

    let first = state
        .ticket_service
        .create_assignment(&bob, ticket.id, admin.id)
        .await
        .unwrap();
    let again = state
        .ticket_service
        .create_assignment(&bob, ticket.id, admin.id)
        .await
        .unwrap();
    assert_eq!(first.id, again.id);
    assert_eq!(first.assigned_by, Some(bob.id));

    let err = state
        .ticket_service
        .create_assignment(&mallory, ticket.id, mallory.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));

    let err = state
        .ticket_service
        .create_assignment(&bob, ticket.id, 555)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(Resource::User)));

    let err = state
        .ticket_service
        .delete_assignment(&mallory, first.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));

    state
        .ticket_service
        .delete_assignment(&bob, first.id)
        .await
        .unwrap();
    assert!(
        state
            .ticket_service
            .get_ticket(ticket.id)
            .await
            .unwrap()
            .assignees
            .is_empty()
    );

    let err = state
        .ticket_service
        .delete_assignment(&bob, first.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(Resource::Assignment)));
}
