use anyhow::Result;
use bns::SweepReport;
use bns::domain::PortfolioSummary;
use bns::expiry::ExpiryAlert;
use bns::notifications::{Notification, NotificationBackend, NotificationFeed};
use serde::Serialize;
use std::io::{self, Write};

/// Writes command results to stdout as text or, with `--json`, as pretty JSON.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Printer {
    json: bool,
}

impl Printer {
    pub(crate) const fn new(json: bool) -> Self {
        Self { json }
    }

    pub(crate) fn alerts(&self, alerts: &[ExpiryAlert<'_>]) -> Result<()> {
        if self.json {
            return Self::emit_json(&alerts);
        }
        let mut out = io::stdout().lock();
        if alerts.is_empty() {
            writeln!(out, "No expiry alerts")?;
        }
        for alert in alerts {
            writeln!(
                out,
                "{:<8}  {:<32}  {}",
                alert.severity.as_str().to_ascii_uppercase(),
                alert.domain.full_name,
                alert.message
            )?;
        }
        Ok(())
    }

    pub(crate) fn summary(&self, summary: &PortfolioSummary) -> Result<()> {
        if self.json {
            return Self::emit_json(summary);
        }
        let mut out = io::stdout().lock();
        writeln!(out, "Domains:        {}", summary.total_domains)?;
        writeln!(out, "Total value:    {}", summary.total_value)?;
        writeln!(out, "Expiring soon:  {}", summary.expiring_soon)?;
        for domain in &summary.expiring_domains {
            writeln!(out, "  - {}", domain.full_name)?;
        }
        Ok(())
    }

    pub(crate) fn sweep(&self, report: &SweepReport) -> Result<()> {
        if self.json {
            return Self::emit_json(&report.notified);
        }
        let mut out = io::stdout().lock();
        writeln!(
            out,
            "{} alert(s), {} notified, {} in cooldown",
            report.alerts,
            report.notified.len(),
            report.suppressed
        )?;
        for n in &report.notified {
            write_notification(&mut out, n)?;
        }
        Ok(())
    }

    pub(crate) fn notifications(&self, notifications: &[Notification]) -> Result<()> {
        if self.json {
            return Self::emit_json(&notifications);
        }
        let mut out = io::stdout().lock();
        if notifications.is_empty() {
            writeln!(out, "No notifications")?;
        }
        for n in notifications {
            write_notification(&mut out, n)?;
        }
        Ok(())
    }

    pub(crate) fn notification(&self, notification: &Notification) -> Result<()> {
        if self.json {
            return Self::emit_json(notification);
        }
        write_notification(&mut io::stdout().lock(), notification)
    }

    pub(crate) fn unread(&self, count: usize) -> Result<()> {
        if self.json {
            return Self::emit_json(&serde_json::json!({ "unreadCount": count }));
        }
        writeln!(io::stdout().lock(), "{count}")?;
        Ok(())
    }

    pub(crate) fn feed<B: NotificationBackend>(&self, feed: &NotificationFeed<B>) -> Result<()> {
        if self.json {
            return Self::emit_json(&serde_json::json!({
                "unreadCount": feed.unread_count(),
                "notifications": feed.notifications(),
            }));
        }
        writeln!(io::stdout().lock(), "-- {} unread --", feed.unread_count())?;
        self.notifications(feed.notifications())
    }

    fn emit_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
        let mut out = io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, value)?;
        writeln!(out)?;
        Ok(())
    }
}

fn write_notification(out: &mut impl Write, n: &Notification) -> Result<()> {
    let marker = if n.read { ' ' } else { '*' };
    write!(out, "{marker} {}  [{}] {}: {}", n.id, n.kind, n.title, n.message)?;
    if let Some(domain_id) = &n.domain_id {
        write!(out, " (domain {domain_id})")?;
    }
    writeln!(out)?;
    Ok(())
}
