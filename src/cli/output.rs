//! Console rendering for campaign status, grounded in the teacher's
//! `cli/output/table.rs` (comfy-table, color-coded status cells).

use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::domain::models::{CampaignStatus, CoreEvent, EventKind};
use crate::services::CampaignView;

fn status_color(status: CampaignStatus) -> Color {
    match status {
        CampaignStatus::Pending => Color::Grey,
        CampaignStatus::Running => Color::Yellow,
        CampaignStatus::Completed => Color::Green,
        CampaignStatus::Failed | CampaignStatus::Abandoned => Color::Red,
    }
}

pub fn format_campaign_view(view: &CampaignView) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new("Field").add_attribute(Attribute::Bold), Cell::new("Value").add_attribute(Attribute::Bold)]);

    table.add_row(vec![Cell::new("campaign_id"), Cell::new(view.campaign_id)]);
    table.add_row(vec![Cell::new("state"), Cell::new(view.state.as_str()).fg(status_color(view.state))]);
    if let Some(decision) = view.current_decision {
        table.add_row(vec![Cell::new("current_decision"), Cell::new(format!("{decision:?}"))]);
    }
    if let Some(goal) = &view.active_goal {
        table.add_row(vec![Cell::new("active_goal"), Cell::new(&goal.description)]);
        table.add_row(vec![Cell::new("goal_status"), Cell::new(goal.status.as_str())]);
    }
    table.add_row(vec![Cell::new("belief_snapshot_ref"), Cell::new(&view.belief_snapshot_ref)]);
    for (i, action) in view.last_actions.iter().enumerate() {
        table.add_row(vec![Cell::new(format!("history[{i}]")), Cell::new(action)]);
    }

    table.to_string()
}

/// One line per event on a campaign's `subscribe` stream, for `submit`'s
/// live progress output.
pub fn format_event(event: &CoreEvent) -> String {
    let kind = match event.kind {
        EventKind::Status => "status",
        EventKind::Phase => "phase",
        EventKind::Cycle => "cycle",
        EventKind::Action => "action",
        EventKind::Complete => "complete",
        EventKind::Error => "error",
    };
    format!("[{}] {kind}: {}", event.timestamp.format("%H:%M:%S"), event.payload)
}
