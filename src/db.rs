//! Ticket database and the ticket service seam.
//!
//! `TicketService` is what the widget needs from the ticket domain: look a
//! ticket up, write it back, create one. `TicketDatabase` implements it over
//! a JSON file.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::fields::Kind;
use crate::task::Ticket;

/// Ticket lookups and writes the widget depends on.
pub trait TicketService {
    /// The ticket, or `None` when it does not exist or the caller cannot see it.
    fn get_ticket(&self, id: u64) -> Result<Option<Ticket>>;

    /// Replace the stored ticket with the same id.
    fn save_ticket(&mut self, ticket: Ticket) -> Result<()>;

    /// Store a new ticket under a fresh id and return that id.
    fn create_ticket(&mut self, ticket: Ticket) -> Result<u64>;
}

/// Serialize `value` as pretty JSON and write it atomically (temp file + rename).
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    let mut f = File::create(&tmp)?;
    let data = serde_json::to_string_pretty(value)?;
    f.write_all(data.as_bytes())?;
    f.flush()?;
    fs::rename(tmp, path)?;
    Ok(())
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TicketFile {
    #[serde(default)]
    tickets: Vec<Ticket>,
}

/// Ticket store backed by a JSON file.
#[derive(Debug)]
pub struct TicketDatabase {
    path: PathBuf,
    data: TicketFile,
}

impl TicketDatabase {
    /// Load tickets from `path`; a missing file starts an empty database.
    pub fn load(path: &Path) -> Result<Self> {
        let data = if path.exists() {
            let buf = fs::read_to_string(path)?;
            serde_json::from_str(&buf)?
        } else {
            TicketFile::default()
        };
        debug!(path = %path.display(), tickets = data.tickets.len(), "loaded tickets");
        Ok(Self { path: path.to_path_buf(), data })
    }

    pub fn save(&self) -> Result<()> {
        write_json_atomic(&self.path, &self.data)
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.data.tickets
    }

    /// Generate the next available ticket ID.
    pub fn next_id(&self) -> u64 {
        self.data.tickets.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    pub fn get(&self, id: u64) -> Option<&Ticket> {
        self.data.tickets.iter().find(|t| t.id == id)
    }

    /// Create a ticket of `kind`, persist, and return its id.
    pub fn add(
        &mut self,
        headline: String,
        kind: Kind,
        project_id: Option<u64>,
        priority: Option<u8>,
        date_to_finish: Option<NaiveDate>,
    ) -> Result<u64> {
        if headline.trim().is_empty() {
            return Err(Error::InvalidArgument("headline cannot be empty".into()));
        }
        if let Some(p) = priority {
            if !(1..=4).contains(&p) {
                return Err(Error::InvalidArgument(format!("priority must be 1-4, got {p}")));
            }
        }
        self.create_ticket(Ticket {
            project_id: project_id.filter(|&p| p != 0),
            priority,
            date_to_finish,
            kind,
            ..Ticket::new(0, headline.trim())
        })
    }
}

impl TicketService for TicketDatabase {
    fn get_ticket(&self, id: u64) -> Result<Option<Ticket>> {
        Ok(self.get(id).cloned())
    }

    fn save_ticket(&mut self, ticket: Ticket) -> Result<()> {
        let id = ticket.id;
        match self.data.tickets.iter_mut().find(|t| t.id == id) {
            Some(slot) => *slot = ticket,
            None => {
                warn!(id, "attempted to save unknown ticket");
                return Err(Error::TicketNotFound(id));
            }
        }
        self.save()
    }

    fn create_ticket(&mut self, mut ticket: Ticket) -> Result<u64> {
        let now = Utc::now().timestamp();
        ticket.id = self.next_id();
        ticket.created_at_utc = now;
        ticket.updated_at_utc = now;
        let id = ticket.id;
        self.data.tickets.push(ticket);
        self.save()?;
        debug!(id, "created ticket");
        Ok(id)
    }
}
