use tracing::info;

use super::table::render_table;
use super::{gate, settle, ActionOutcome, Notice, PageContext};
use crate::api::resources::{self, Announcement, Order};
use crate::api::ApiClient;
use crate::identity::Action;

/// Announcements and order statuses.
pub struct AnnouncementsPage {
    client: ApiClient,
    ctx: PageContext,
    announcements: Vec<Announcement>,
    orders: Vec<Order>,
    notice: Option<Notice>,
}

impl AnnouncementsPage {
    pub fn new(client: ApiClient, ctx: PageContext) -> Self {
        Self { client, ctx, announcements: Vec::new(), orders: Vec::new(), notice: None }
    }

    pub fn announcements(&self) -> &[Announcement] {
        &self.announcements
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn keep(&mut self, out: ActionOutcome) -> ActionOutcome {
        if let ActionOutcome::Rejected(n) = &out {
            self.notice = Some(n.clone());
        }
        out
    }

    /// Load both lists. The two reads are independent; a failure in one does
    /// not discard the other.
    pub async fn load(&mut self) -> ActionOutcome {
        let (orders, announcements) = tokio::join!(
            resources::list_orders(&self.client),
            resources::list_announcements(&self.client)
        );
        let mut first_failure = None;
        match settle(&self.ctx, "announcements", orders) {
            Ok(list) => self.orders = list,
            Err(ActionOutcome::Discarded) => return ActionOutcome::Discarded,
            Err(out) => first_failure = Some(out),
        }
        match settle(&self.ctx, "announcements", announcements) {
            Ok(list) => self.announcements = list,
            Err(out) => {
                first_failure.get_or_insert(out);
            }
        }
        match first_failure {
            Some(out) => self.keep(out),
            None => ActionOutcome::Applied,
        }
    }

    pub async fn add_announcement(&mut self, message: &str) -> ActionOutcome {
        if let Err(out) = gate(Action::AddAnnouncement, self.client.store().as_ref()) {
            return self.keep(out);
        }
        let message = message.trim();
        if message.is_empty() {
            return self.keep(ActionOutcome::Rejected(Notice::error("Announcement text is required.")));
        }
        let res = resources::add_announcement(&self.client, message).await;
        match settle(&self.ctx, "announcements", res) {
            Ok(created) => {
                info!(target: "storefront_admin::pages", "announcement {} added", created.id);
                self.announcements.insert(0, created);
                self.notice = Some(Notice::info("Announcement added."));
                ActionOutcome::Applied
            }
            Err(out) => self.keep(out),
        }
    }

    pub async fn delete_announcement(&mut self, id: &str) -> ActionOutcome {
        if let Err(out) = gate(Action::DeleteAnnouncement, self.client.store().as_ref()) {
            return self.keep(out);
        }
        let res = resources::delete_announcement(&self.client, id).await;
        match settle(&self.ctx, "announcements", res) {
            Ok(()) => {
                self.announcements.retain(|a| a.id != id);
                self.notice = Some(Notice::info("Announcement deleted."));
                ActionOutcome::Applied
            }
            Err(out) => self.keep(out),
        }
    }

    pub async fn change_order_status(&mut self, order_id: &str, status: &str) -> ActionOutcome {
        if let Err(out) = gate(Action::ChangeOrderStatus, self.client.store().as_ref()) {
            return self.keep(out);
        }
        let status = status.trim();
        if status.is_empty() {
            return self.keep(ActionOutcome::Rejected(Notice::error("Order status is required.")));
        }
        let res = resources::update_order_status(&self.client, order_id, status).await;
        match settle(&self.ctx, "announcements", res) {
            Ok(()) => {
                if let Some(o) = self.orders.iter_mut().find(|o| o.id == order_id) {
                    o.status = status.to_string();
                }
                self.notice = Some(Notice::info("Order status updated."));
                ActionOutcome::Applied
            }
            Err(out) => self.keep(out),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Announcements\n");
        let rows: Vec<Vec<String>> = self.announcements.iter().map(|a| vec![a.id.clone(), a.message.clone()]).collect();
        out.push_str(&render_table(&["id", "message"], &rows));
        out.push_str("\n\nOrders\n");
        let rows: Vec<Vec<String>> = self
            .orders
            .iter()
            .map(|o| vec![o.id.clone(), o.user_id.clone(), format!("{:.2}", o.total), o.status.clone()])
            .collect();
        out.push_str(&render_table(&["id", "user", "total", "status"], &rows));
        out.push('\n');
        if let Some(n) = &self.notice {
            out.push_str(&n.to_string());
            out.push('\n');
        }
        out
    }
}
