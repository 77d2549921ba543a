//! Progress hooks for rebuilds.
//!
//! Observers only see progress; they cannot influence the load. Every hook
//! has an empty default so implementers override what they display.

use log::info;
use noriba_core::EntityDef;

/// Receives progress events while a feed directory is loaded.
pub trait LoadObserver {
    /// The entity's feed file is absent and the entity stays empty.
    fn skipped(&mut self, _entity: &EntityDef) {}

    /// The entity's feed file is being read.
    fn loading(&mut self, _entity: &EntityDef) {}

    /// `rows` staged rows are about to be inserted.
    fn inserting(&mut self, _entity: &EntityDef, _rows: usize) {}

    /// `rows` rows were inserted into the entity's table.
    fn inserted(&mut self, _entity: &EntityDef, _rows: usize) {}

    /// The feed file held no rows, so nothing was inserted.
    fn empty(&mut self, _entity: &EntityDef) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl LoadObserver for SilentObserver {}

/// Observer that forwards progress to the `log` facade at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl LoadObserver for LogObserver {
    fn skipped(&mut self, entity: &EntityDef) {
        info!("{:<20} -- Not found, skipped", entity.file_name);
    }

    fn loading(&mut self, entity: &EntityDef) {
        info!("{:<20} -- Loading", entity.file_name);
    }

    fn inserted(&mut self, entity: &EntityDef, rows: usize) {
        info!(
            "{:<20} -- Inserted {rows} records to `{}`",
            entity.file_name, entity.table
        );
    }
}

/// Observer recording events, for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingObserver {
    pub(crate) events: Vec<String>,
}

#[cfg(test)]
impl LoadObserver for RecordingObserver {
    fn skipped(&mut self, entity: &EntityDef) {
        self.events.push(format!("skipped {}", entity.file_name));
    }

    fn loading(&mut self, entity: &EntityDef) {
        self.events.push(format!("loading {}", entity.file_name));
    }

    fn inserting(&mut self, entity: &EntityDef, rows: usize) {
        self.events
            .push(format!("inserting {rows} into {}", entity.table));
    }

    fn inserted(&mut self, entity: &EntityDef, rows: usize) {
        self.events.push(format!("inserted {rows} into {}", entity.table));
    }

    fn empty(&mut self, entity: &EntityDef) {
        self.events.push(format!("empty {}", entity.file_name));
    }
}
