//! Attaches child exercises to workout rows.
//!
//! Children of every visible row are fetched in one batched call. Rows whose
//! details the requester may not see get no children at all, and a failed
//! fetch fails the whole assembly instead of returning partial results.

use crate::errors::ServiceError;
use crate::identity::Requester;
use crate::responses::{WorkoutExerciseResponse, WorkoutResponse};
use crate::visibility::can_view_details;
use std::collections::HashMap;
use std::sync::Arc;
use store_object::{WorkoutExerciseRepository, WorkoutRecord};

#[derive(Clone)]
pub struct WorkoutAssembler {
    children: Arc<dyn WorkoutExerciseRepository>,
}

impl WorkoutAssembler {
    pub fn new(children: Arc<dyn WorkoutExerciseRepository>) -> Self {
        Self { children }
    }

    /// Build responses in the order of `rows`
    pub async fn assemble(
        &self,
        requester: &Requester,
        rows: Vec<WorkoutRecord>,
    ) -> Result<Vec<WorkoutResponse>, ServiceError> {
        let visible: Vec<i64> = rows
            .iter()
            .filter(|row| can_view_details(requester, row))
            .map(|row| row.id)
            .collect();

        let mut grouped: HashMap<i64, Vec<WorkoutExerciseResponse>> =
            visible.iter().map(|id| (*id, Vec::new())).collect();

        if !visible.is_empty() {
            let children = self.children.list_by_workouts(&visible).await?;
            crate::debug_log!(
                workouts = visible.len(),
                children = children.len(),
                "fetched workout exercises"
            );
            for child in children {
                // Only ids we asked for are keys; anything else is dropped.
                if let Some(bucket) = grouped.get_mut(&child.workout_id) {
                    bucket.push(child.into());
                }
            }
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let exercises = grouped.remove(&row.id);
                WorkoutResponse::new(row, exercises)
            })
            .collect())
    }

    pub async fn assemble_one(
        &self,
        requester: &Requester,
        row: WorkoutRecord,
    ) -> Result<WorkoutResponse, ServiceError> {
        let mut assembled = self.assemble(requester, vec![row]).await?;
        assembled
            .pop()
            .ok_or_else(|| ServiceError::Internal("assembly produced no workout".to_string()))
    }
}
