//! Spinner progress for the `load` command.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use noriba_core::EntityDef;
use noriba_data::LoadObserver;

/// Load observer drawing a spinner on stderr.
pub(crate) struct SpinnerObserver {
    bar: ProgressBar,
}

impl SpinnerObserver {
    pub(crate) fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    #[cfg(test)]
    pub(crate) fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    #[cfg(test)]
    pub(crate) fn message(&self) -> String {
        self.bar.message()
    }
}

impl LoadObserver for SpinnerObserver {
    fn loading(&mut self, entity: &EntityDef) {
        self.bar
            .set_message(format!("{:<20} -- Loading", entity.file_name));
    }

    fn inserting(&mut self, entity: &EntityDef, rows: usize) {
        self.bar.set_message(format!(
            "{:<20} -- Insert {rows} records to `{}`",
            entity.file_name, entity.table
        ));
    }

    fn inserted(&mut self, entity: &EntityDef, rows: usize) {
        self.bar.println(format!(
            "✔ {:<20} -- Inserted {rows} records to `{}`",
            entity.file_name, entity.table
        ));
    }

    fn empty(&mut self, entity: &EntityDef) {
        self.bar.println(format!(
            "⚠ {:<20} -- Skip to insert because there are no records.",
            entity.file_name
        ));
    }
}

impl Drop for SpinnerObserver {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
