use anyhow::{Context, Result};
use tracing::{error, info};

use crate::{
    config::Settings,
    controller::{Controller, Notice},
    db::Db,
};

pub(crate) type NotesController = Controller<Db, Db>;

/// Owns the open databases (through the controller) for one run.
pub(crate) struct AppContext {
    settings: Settings,
    controller: NotesController,
}

impl AppContext {
    pub(crate) fn open(settings: Settings) -> Result<Self> {
        let notes_path = settings.notes_db_path();
        let notes = match Db::open(&notes_path) {
            Ok(db) => Some(db),
            Err(err) => {
                error!(path = %notes_path.display(), %err, "note storage unavailable");
                None
            }
        };

        let state_path = settings.state_db_path();
        let (state, state_fallback) = match Db::open(&state_path) {
            Ok(db) => (db, None),
            Err(err) => {
                error!(path = %state_path.display(), %err, "state storage unavailable");
                let db = Db::open_in_memory().context("could not open any state storage")?;
                (db, Some(err))
            }
        };

        let mut controller = Controller::load(notes, state);
        if let Some(err) = state_fallback {
            controller.notify(Notice::warning(
                "Storage Error",
                format!("Unsaved content will not survive a restart: {err}."),
            ));
        }
        info!(notes = controller.notes().len(), "session loaded");
        Ok(Self {
            settings,
            controller,
        })
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn controller(&mut self) -> &mut NotesController {
        &mut self.controller
    }

    pub(crate) fn close(self) -> Result<()> {
        let (notes, state) = self.controller.shutdown();
        if let Some(notes) = notes {
            notes.close().context("could not close note storage")?;
        }
        state.close().context("could not close state storage")?;
        Ok(())
    }
}
