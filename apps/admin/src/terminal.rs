//! Terminal implementations of the modal and confirmation capabilities, and
//! table rendering for the list views.

use admin_core::{Confirmation, ModalFactory, ModalSurface, PageWindow};
use async_trait::async_trait;
use shared::domain::{Physician, Specialty};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

pub struct TerminalModals;

struct TerminalModal {
    title: String,
}

impl ModalSurface for TerminalModal {
    fn show(&mut self, title: &str) {
        self.title = title.to_string();
        println!("== {title} ==");
    }

    fn hide(&mut self) {
        debug!(title = %self.title, "closing form");
    }
}

impl ModalFactory for TerminalModals {
    fn build(&self) -> Box<dyn ModalSurface> {
        Box::new(TerminalModal {
            title: String::new(),
        })
    }
}

/// Reads a yes/no answer from stdin. Anything but `y`/`yes` declines.
pub struct PromptConfirmation;

#[async_trait]
impl Confirmation for PromptConfirmation {
    async fn confirm(&self, prompt: &str) -> bool {
        let mut stdout = tokio::io::stdout();
        if let Err(err) = stdout.write_all(format!("{prompt} [y/N] ").as_bytes()).await {
            warn!(error = %err, "failed to write confirmation prompt");
            return false;
        }
        let _ = stdout.flush().await;

        let mut line = String::new();
        match BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
            Ok(_) => is_affirmative(&line),
            Err(err) => {
                warn!(error = %err, "failed to read confirmation; declining");
                false
            }
        }
    }
}

/// `--yes`: the flag itself is the user's consent.
pub struct AssumeYes;

#[async_trait]
impl Confirmation for AssumeYes {
    async fn confirm(&self, prompt: &str) -> bool {
        debug!(prompt, "confirmation given on the command line");
        true
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub fn render_specialties(specialties: &[Specialty]) {
    if specialties.is_empty() {
        println!("No specialties.");
        return;
    }
    println!("{:<6} {:<32} {}", "ID", "NAME", "STATUS");
    for specialty in specialties {
        println!(
            "{:<6} {:<32} {}",
            display_id(specialty.id),
            specialty.name,
            specialty.status
        );
    }
}

pub fn render_physicians(physicians: &[Physician], specialties: &[Specialty]) {
    if physicians.is_empty() {
        println!("No physicians.");
        return;
    }
    println!(
        "{:<6} {:<12} {:<20} {:<20} {:<24} {}",
        "ID", "LICENSE", "FIRST NAME", "LAST NAME", "SPECIALTY", "STATUS"
    );
    for physician in physicians {
        println!(
            "{:<6} {:<12} {:<20} {:<20} {:<24} {}",
            display_id(physician.id),
            physician.license_code,
            physician.first_name,
            physician.last_name,
            specialty_label(physician, specialties),
            physician.status
        );
    }
}

pub fn render_page_bar(window: &PageWindow, total_records: usize) {
    if window.total_pages == 0 {
        return;
    }
    let links: Vec<String> = (1..=window.total_pages)
        .map(|page| {
            if page == window.current_page {
                format!("[{page}]")
            } else {
                page.to_string()
            }
        })
        .collect();
    println!(
        "Page {} of {} ({} records): {}",
        window.current_page,
        window.total_pages,
        total_records,
        links.join(" ")
    );
}

fn specialty_label(physician: &Physician, specialties: &[Specialty]) -> String {
    if let Some(name) = physician
        .specialty
        .as_ref()
        .and_then(|link| link.name())
        .filter(|name| !name.is_empty())
    {
        return name.to_string();
    }
    match physician.specialty_id() {
        Some(id) => specialties
            .iter()
            .find(|specialty| specialty.id == Some(id))
            .map(|specialty| specialty.name.clone())
            .unwrap_or_else(|| format!("#{id}")),
        None => "-".to_string(),
    }
}

fn display_id<T: std::fmt::Display>(id: Option<T>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}
