//! Folding one container into another.
//!
//! When an entity flows into another, the donor's states move into the
//! destination. On overlap the destination keeps its own value and
//! controller. Everything else the donor held is appended after the
//! destination's existing order, keeping the donor's relative order.
//! The donor is left inert.

use super::{GeneralState, MergeError, StateContainer};
use crate::core::{StatePath, StateTransition, TransitionKind};
use crate::lineage::LineageId;
use chrono::Utc;
use serde::Serialize;
use tracing::debug;

/// Paths touched by a merge, in donor order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Active donor states taken over by the destination
    pub adopted: Vec<StatePath>,
    /// Inactive donor entries appended to the destination's history
    pub carried: Vec<StatePath>,
    /// Donor entries dropped because the destination already had them
    pub discarded: Vec<StatePath>,
}

impl StateContainer {
    /// Fold `donor` into this container.
    ///
    /// Both containers must be live and distinct. On success the donor is
    /// inert: every later mutation on it fails with
    /// [`InertContainerError`](super::InertContainerError).
    ///
    /// # Example
    ///
    /// ```rust
    /// use stateflow::lineage::Blueprint;
    /// use stateflow::states;
    ///
    /// let blueprint = Blueprint::builder("entity").build().unwrap();
    /// let mut destination = blueprint.construct(states! { "main-ready" => true }).unwrap();
    /// let mut donor = blueprint
    ///     .construct(states! { "main-ready" => false, "main-count" => 5 })
    ///     .unwrap();
    ///
    /// destination.merge(&mut donor).unwrap();
    ///
    /// let ready = "main-ready".parse().unwrap();
    /// assert_eq!(destination.value(&ready).and_then(|v| v.as_bool()), Some(true));
    /// assert_eq!(destination.current_states().len(), 2);
    /// assert!(donor.set("main-ready", true).is_err());
    /// ```
    pub fn merge(&mut self, donor: &mut StateContainer) -> Result<MergeReport, MergeError> {
        self.ensure_active()?;
        donor.ensure_active()?;
        if self.lineage == donor.lineage {
            return Err(MergeError::SelfMerge {
                lineage: self.lineage.clone(),
            });
        }

        let donor_states = std::mem::take(&mut donor.states);
        let mut donor_current = std::mem::take(&mut donor.current);
        let mut donor_controllers = donor.controllers.take_all();
        donor.retire(self.lineage.clone());

        let timestamp = Utc::now();
        let mut report = MergeReport::default();

        for entry in donor_states {
            let controller = donor_controllers.remove(&entry.path);

            let overlaps = match donor_current.remove(&entry.path) {
                Some(_) if self.current.contains_key(&entry.path) => true,
                Some(value) => {
                    match self.slots.get(&entry.path) {
                        Some(&slot) => self.states[slot].value = value.clone(),
                        None => self.introduce(entry.path.clone(), value.clone()),
                    }
                    self.current.insert(entry.path.clone(), value.clone());
                    self.history.push(StateTransition {
                        path: entry.path.clone(),
                        from: None,
                        to: Some(value),
                        kind: TransitionKind::Adopted,
                        timestamp,
                    });
                    report.adopted.push(entry.path.clone());
                    false
                }
                None if self.slots.contains_key(&entry.path) => true,
                None => {
                    self.introduce(entry.path.clone(), entry.value);
                    report.carried.push(entry.path.clone());
                    false
                }
            };

            if overlaps {
                report.discarded.push(entry.path);
                continue;
            }
            if let Some(controller) = controller {
                if !self.controllers.contains(&entry.path) {
                    self.controllers.register(entry.path, controller);
                }
            }
        }

        // Controllers registered on paths the donor never set
        for (path, controller) in donor_controllers {
            if !self.controllers.contains(&path) {
                self.controllers.register(path, controller);
            }
        }

        self.refresh();

        debug!(
            destination = %self.lineage,
            donor = %donor.lineage,
            adopted = report.adopted.len(),
            carried = report.carried.len(),
            discarded = report.discarded.len(),
            "Merged container"
        );
        Ok(report)
    }

    /// Drop everything this container owns and mark it consumed.
    fn retire(&mut self, merged_into: LineageId) {
        self.slots.clear();
        self.order.clear();
        self.general = GeneralState {
            non_meta_state: self.non_meta_state,
            ..Default::default()
        };
        self.merged_into = Some(merged_into);
    }
}
