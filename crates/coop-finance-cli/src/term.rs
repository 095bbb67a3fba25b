use colored::Colorize;

use coop_finance_core::notify::{Notifier, NotifyKind};

/// Prints engine notifications to the terminal, colored by kind.
pub struct TermNotifier;

impl Notifier for TermNotifier {
    fn notify(&self, kind: NotifyKind, title: &str, detail: Option<&str>) {
        let tag = match kind {
            NotifyKind::Success => "ok".green().bold(),
            NotifyKind::Error => "error".red().bold(),
            NotifyKind::Warning => "warning".yellow().bold(),
            NotifyKind::Info => "info".blue().bold(),
        };
        match detail {
            Some(detail) => println!("{tag}: {title}. {}", detail.dimmed()),
            None => println!("{tag}: {title}"),
        }
    }
}
