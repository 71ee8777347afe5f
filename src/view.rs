use std::collections::{BTreeSet, HashMap};

use crate::models::{ApplicationRecord, Status};
use crate::state::Applications;

/// Whether a record's inline status-update form is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardMode {
    #[default]
    Collapsed,
    Editing,
}

/// Per-record card modes. At most one card is `Editing` at a time.
#[derive(Debug, Default)]
pub struct CardModes {
    modes: HashMap<i64, CardMode>,
}

impl CardModes {
    pub fn mode(&self, id: i64) -> CardMode {
        self.modes.get(&id).copied().unwrap_or_default()
    }

    /// Open the editor for `id`, collapsing every other card.
    pub fn open(&mut self, id: i64) {
        self.modes.clear();
        self.modes.insert(id, CardMode::Editing);
    }

    pub fn close(&mut self, id: i64) {
        self.modes.remove(&id);
    }
}

/// Values in the status-update form before they are saved.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusDraft {
    pub id: i64,
    pub status: Status,
    pub specific_salary: String,
}

impl StatusDraft {
    pub fn for_record(record: &ApplicationRecord) -> Self {
        Self {
            id: record.id,
            status: record.status,
            specific_salary: record.specific_salary.clone(),
        }
    }
}

/// Checked records, for bulk delete.
#[derive(Debug, Default)]
pub struct Selection {
    ids: BTreeSet<i64>,
}

impl Selection {
    /// Flip the checkbox for `id`. Returns whether it is now selected.
    pub fn toggle(&mut self, id: i64) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> Vec<i64> {
        self.ids.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids whose records are gone.
    pub fn prune(&mut self, apps: &Applications) {
        self.ids.retain(|id| apps.contains(*id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewApplication;

    #[test]
    fn test_cards_start_collapsed() {
        let cards = CardModes::default();
        assert_eq!(cards.mode(1), CardMode::Collapsed);
    }

    #[test]
    fn test_opening_one_editor_collapses_others() {
        let mut cards = CardModes::default();
        cards.open(1);
        assert_eq!(cards.mode(1), CardMode::Editing);
        cards.open(2);
        assert_eq!(cards.mode(1), CardMode::Collapsed);
        assert_eq!(cards.mode(2), CardMode::Editing);
        cards.close(2);
        assert_eq!(cards.mode(2), CardMode::Collapsed);
    }

    #[test]
    fn test_draft_prefills_from_record() {
        let mut apps = Applications::default();
        let id = apps
            .add(NewApplication {
                job_title: "SRE".to_string(),
                company: "Initech".to_string(),
                date_applied: "2024-03-03".to_string(),
                ..Default::default()
            })
            .unwrap();
        apps.update_status(id, Status::Offer, "$95,000").unwrap();
        let draft = StatusDraft::for_record(apps.get(id).unwrap());
        assert_eq!(draft.status, Status::Offer);
        assert_eq!(draft.specific_salary, "$95,000");
    }

    #[test]
    fn test_selection_toggle_and_prune() {
        let mut apps = Applications::default();
        for title in ["A", "B", "C"] {
            apps.add(NewApplication {
                job_title: title.to_string(),
                company: "Acme".to_string(),
                date_applied: "2024-03-03".to_string(),
                ..Default::default()
            })
            .unwrap();
        }

        let mut selection = Selection::default();
        assert!(selection.toggle(1));
        assert!(selection.toggle(3));
        assert!(!selection.toggle(1));
        assert!(selection.toggle(2));
        assert_eq!(selection.ids(), vec![2, 3]);

        apps.delete(3);
        selection.prune(&apps);
        assert_eq!(selection.ids(), vec![2]);
        assert_eq!(selection.len(), 1);

        selection.clear();
        assert!(selection.is_empty());
    }
}
