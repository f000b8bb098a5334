//! Ticket listing command handler

use crate::domain::TicketStatus;
use crate::services::ServiceError;
use crate::state::SharedState;

pub async fn cmd_list_tickets(state: &SharedState, query: &str) -> anyhow::Result<()> {
    let tickets = match state.ticket_service.search_tickets(query).await {
        Ok(tickets) => tickets,
        Err(ServiceError::InvalidSearchQuery(term)) => {
            println!("Invalid search term: '{term}'");
            println!("Use bare words for titles, or title:<text> and label:<a,b>");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if tickets.is_empty() {
        println!("No tickets found.");
        return Ok(());
    }

    println!("Tickets ({} total)", tickets.len());
    println!("{:-<70}", "");

    for ticket in tickets {
        let indicator = match ticket.status {
            TicketStatus::Open => "○",
            TicketStatus::Closed => "✓",
        };

        println!("{} #{} {}", indicator, ticket.id, ticket.title);

        let labels = if ticket.labels.is_empty() {
            "-".to_string()
        } else {
            ticket.labels.join(", ")
        };
        let assignees = if ticket.assignees.is_empty() {
            "-".to_string()
        } else {
            ticket
                .assignees
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };

        println!(
            "  Status: {} | Labels: {} | Assignees: {}",
            ticket.status, labels, assignees
        );
    }

    println!();
    println!("Legend: ○ Open | ✓ Closed");

    Ok(())
}
