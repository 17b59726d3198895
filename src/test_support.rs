//! In-memory repositories for service tests

use async_trait::async_trait;
use chrono::Utc;
use query_engine::{Pagination, QueryParams};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use store_object::{
    ExerciseRecord, ExerciseRepository, ExerciseWithWorkoutCheck, LikeState, ListScope, Listing,
    NewUser, NewWorkout, Patch, StoreError, UserPatch, UserRecord, UserRepository,
    WorkoutExercisePatch, WorkoutExerciseRecord, WorkoutExerciseRepository, WorkoutPatch,
    WorkoutRecord, WorkoutRepository,
};

pub fn workout(id: i64, owner_id: i64, is_private: bool, price: f64) -> WorkoutRecord {
    WorkoutRecord {
        id,
        owner_id,
        title: format!("workout {}", id),
        description: String::new(),
        is_private,
        price,
        likes_count: 0,
        created_at: Utc::now(),
        updated_at: None,
    }
}

pub fn user(id: i64) -> UserRecord {
    UserRecord {
        id,
        email: format!("user{}@example.com", id),
        username: format!("user{}", id),
        password_hash: "hashed".to_string(),
        bio: String::new(),
        avatar: String::new(),
        card_pan: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

struct Exercise {
    id: i64,
    name: String,
    custom_for: Option<i64>,
}

#[derive(Default)]
struct State {
    next_id: i64,
    workouts: BTreeMap<i64, WorkoutRecord>,
    children: BTreeMap<i64, WorkoutExerciseRecord>,
    likes: HashSet<(i64, i64)>,
    users: BTreeMap<i64, UserRecord>,
    deleted_users: HashSet<i64>,
    exercises: Vec<Exercise>,
    batched_fetches: usize,
    fail_children: bool,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn resolve_exercise(&mut self, name: &str, user_id: i64) -> i64 {
        let found = self
            .exercises
            .iter()
            .find(|e| e.name == name && e.custom_for.is_none())
            .or_else(|| {
                self.exercises
                    .iter()
                    .find(|e| e.name == name && e.custom_for == Some(user_id))
            })
            .map(|e| e.id);
        match found {
            Some(id) => id,
            None => {
                let id = self.next_id();
                self.exercises.push(Exercise {
                    id,
                    name: name.to_string(),
                    custom_for: Some(user_id),
                });
                id
            }
        }
    }

    fn add_child(&mut self, workout_id: i64, owner_id: i64, name: &str) -> i64 {
        let exercise_id = self.resolve_exercise(name, owner_id);
        let id = self.next_id();
        self.children.insert(
            id,
            WorkoutExerciseRecord {
                id,
                workout_id,
                owner_id,
                exercise_id,
                exercise_name: name.to_string(),
                main_note: String::new(),
                secondary_note: String::new(),
                created_at: Utc::now(),
            },
        );
        id
    }
}

fn paginate<T>(rows: Vec<T>, pagination: &Pagination) -> Vec<T> {
    if !pagination.is_paginated() {
        return rows;
    }
    rows.into_iter()
        .skip(pagination.offset() as usize)
        .take(pagination.limit as usize)
        .collect()
}

/// Every repository over one shared in-memory state
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        let store = Self::default();
        store.lock().next_id = 1000;
        Arc::new(store)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn insert_workout(&self, record: WorkoutRecord) {
        self.lock().workouts.insert(record.id, record);
    }

    pub fn workout(&self, id: i64) -> WorkoutRecord {
        self.lock().workouts[&id].clone()
    }

    pub fn has_workout(&self, id: i64) -> bool {
        self.lock().workouts.contains_key(&id)
    }

    pub fn add_shared_exercise(&self, name: &str) -> i64 {
        let mut state = self.lock();
        let id = state.next_id();
        state.exercises.push(Exercise {
            id,
            name: name.to_string(),
            custom_for: None,
        });
        id
    }

    pub fn add_child(&self, workout_id: i64, name: &str) -> i64 {
        let mut state = self.lock();
        let owner_id = state.workouts[&workout_id].owner_id;
        state.add_child(workout_id, owner_id, name)
    }

    pub fn child(&self, id: i64) -> WorkoutExerciseRecord {
        self.lock().children[&id].clone()
    }

    pub fn children_of(&self, workout_id: i64) -> Vec<WorkoutExerciseRecord> {
        self.lock()
            .children
            .values()
            .filter(|c| c.workout_id == workout_id)
            .cloned()
            .collect()
    }

    pub fn batched_fetches(&self) -> usize {
        self.lock().batched_fetches
    }

    pub fn fail_child_fetches(&self) {
        self.lock().fail_children = true;
    }

    pub fn insert_user(&self, record: UserRecord) {
        self.lock().users.insert(record.id, record);
    }

    pub fn user(&self, id: i64) -> UserRecord {
        self.lock().users[&id].clone()
    }

    pub fn is_user_deleted(&self, id: i64) -> bool {
        self.lock().deleted_users.contains(&id)
    }
}

fn apply<T: Clone>(target: &mut T, patch: &Patch<T>) {
    if let Patch::Set(value) = patch {
        *target = value.clone();
    }
}

#[async_trait]
impl WorkoutRepository for MemoryStore {
    async fn list_filtered(
        &self,
        params: &QueryParams,
        scope: ListScope,
    ) -> Result<Listing<WorkoutRecord>, StoreError> {
        let state = self.lock();
        let mut rows: Vec<WorkoutRecord> = state
            .workouts
            .values()
            .filter(|w| match scope {
                ListScope::Everything => true,
                ListScope::VisibleTo(user) => !w.is_private || w.owner_id == user,
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.likes_count.cmp(&a.likes_count).then(a.id.cmp(&b.id)));

        let total = rows.len() as i64;
        Ok(Listing {
            rows: paginate(rows, &params.pagination),
            total,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<WorkoutRecord, StoreError> {
        self.lock()
            .workouts
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("workout"))
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        include_private: bool,
    ) -> Result<Vec<WorkoutRecord>, StoreError> {
        Ok(self
            .lock()
            .workouts
            .values()
            .filter(|w| w.owner_id == owner_id && (include_private || !w.is_private))
            .cloned()
            .collect())
    }

    async fn create(&self, workout: &NewWorkout, exercise_names: &[String]) -> Result<i64, StoreError> {
        let mut state = self.lock();
        let id = state.next_id();
        state.workouts.insert(
            id,
            WorkoutRecord {
                id,
                owner_id: workout.owner_id,
                title: workout.title.clone(),
                description: workout.description.clone(),
                is_private: workout.is_private,
                price: workout.price,
                likes_count: 0,
                created_at: Utc::now(),
                updated_at: None,
            },
        );
        for name in exercise_names {
            state.add_child(id, workout.owner_id, name);
        }
        Ok(id)
    }

    async fn update(&self, id: i64, patch: &WorkoutPatch) -> Result<(), StoreError> {
        let mut state = self.lock();
        let record = state
            .workouts
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("workout"))?;
        apply(&mut record.title, &patch.title);
        apply(&mut record.description, &patch.description);
        apply(&mut record.is_private, &patch.is_private);
        apply(&mut record.price, &patch.price);
        record.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut state = self.lock();
        state
            .workouts
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("workout"))?;
        state.children.retain(|_, c| c.workout_id != id);
        Ok(())
    }

    async fn copy(&self, id: i64, new_owner: i64) -> Result<i64, StoreError> {
        let mut state = self.lock();
        let source = state
            .workouts
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("workout"))?;
        let new_id = state.next_id();
        state.workouts.insert(
            new_id,
            WorkoutRecord {
                id: new_id,
                owner_id: new_owner,
                is_private: true,
                price: 0.0,
                likes_count: 0,
                created_at: Utc::now(),
                updated_at: None,
                ..source
            },
        );
        let children: Vec<WorkoutExerciseRecord> = state
            .children
            .values()
            .filter(|c| c.workout_id == id)
            .cloned()
            .collect();
        for child in children {
            let child_id = state.next_id();
            state.children.insert(
                child_id,
                WorkoutExerciseRecord {
                    id: child_id,
                    workout_id: new_id,
                    owner_id: new_owner,
                    ..child
                },
            );
        }
        Ok(new_id)
    }

    async fn toggle_like(&self, id: i64, user_id: i64) -> Result<LikeState, StoreError> {
        let mut state = self.lock();
        if !state.workouts.contains_key(&id) {
            return Err(StoreError::not_found("workout"));
        }
        let liked = if state.likes.remove(&(id, user_id)) {
            LikeState::Unliked
        } else {
            state.likes.insert((id, user_id));
            LikeState::Liked
        };
        let count = state.likes.iter().filter(|(w, _)| *w == id).count() as i64;
        if let Some(record) = state.workouts.get_mut(&id) {
            record.likes_count = count;
        }
        Ok(liked)
    }
}

#[async_trait]
impl WorkoutExerciseRepository for MemoryStore {
    async fn list_by_workouts(&self, workout_ids: &[i64]) -> Result<Vec<WorkoutExerciseRecord>, StoreError> {
        let mut state = self.lock();
        state.batched_fetches += 1;
        if state.fail_children {
            return Err(StoreError::timed_out("workout_exercises.list_by_workouts"));
        }
        Ok(state
            .children
            .values()
            .filter(|c| workout_ids.contains(&c.workout_id))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<WorkoutExerciseRecord, StoreError> {
        self.lock()
            .children
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("workout exercise"))
    }

    async fn add_by_names(
        &self,
        workout_id: i64,
        owner_id: i64,
        names: &[String],
    ) -> Result<Vec<i64>, StoreError> {
        let mut state = self.lock();
        if !state.workouts.contains_key(&workout_id) {
            return Err(StoreError::ForeignKeyViolation {
                table: "workout_exercises",
            });
        }
        Ok(names
            .iter()
            .map(|name| state.add_child(workout_id, owner_id, name))
            .collect())
    }

    async fn remove(&self, workout_id: i64, ids: &[i64]) -> Result<u64, StoreError> {
        let mut state = self.lock();
        let unique: HashSet<i64> = ids.iter().copied().collect();
        let all_owned = unique.iter().all(|id| {
            state
                .children
                .get(id)
                .is_some_and(|c| c.workout_id == workout_id)
        });
        if !all_owned {
            return Err(StoreError::not_found("workout exercise"));
        }
        for id in &unique {
            state.children.remove(id);
        }
        Ok(unique.len() as u64)
    }

    async fn update(&self, id: i64, patch: &WorkoutExercisePatch) -> Result<(), StoreError> {
        let mut state = self.lock();
        let record = state
            .children
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("workout exercise"))?;
        apply(&mut record.main_note, &patch.main_note);
        apply(&mut record.secondary_note, &patch.secondary_note);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn list_filtered(&self, params: &QueryParams) -> Result<Listing<UserRecord>, StoreError> {
        let state = self.lock();
        let rows: Vec<UserRecord> = state
            .users
            .values()
            .filter(|u| !state.deleted_users.contains(&u.id))
            .cloned()
            .collect();
        let total = rows.len() as i64;
        Ok(Listing {
            rows: paginate(rows, &params.pagination),
            total,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<UserRecord, StoreError> {
        let state = self.lock();
        if state.deleted_users.contains(&id) {
            return Err(StoreError::not_found("user"));
        }
        state
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user"))
    }

    async fn create(&self, user: &NewUser) -> Result<i64, StoreError> {
        let mut state = self.lock();
        if state.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict { table: "users" });
        }
        let id = state.next_id();
        state.users.insert(
            id,
            UserRecord {
                email: user.email.clone(),
                username: user.username.clone(),
                password_hash: user.password_hash.clone(),
                ..self::user(id)
            },
        );
        Ok(id)
    }

    async fn update(&self, id: i64, patch: &UserPatch) -> Result<(), StoreError> {
        let mut state = self.lock();
        if state.deleted_users.contains(&id) {
            return Err(StoreError::not_found("user"));
        }
        let record = state
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("user"))?;
        apply(&mut record.email, &patch.email);
        apply(&mut record.username, &patch.username);
        apply(&mut record.bio, &patch.bio);
        apply(&mut record.avatar, &patch.avatar);
        apply(&mut record.password_hash, &patch.password_hash);
        Ok(())
    }

    async fn soft_delete(&self, id: i64) -> Result<(), StoreError> {
        let mut state = self.lock();
        if !state.users.contains_key(&id) || !state.deleted_users.insert(id) {
            return Err(StoreError::not_found("user"));
        }
        Ok(())
    }
}

#[async_trait]
impl ExerciseRepository for MemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<ExerciseRecord, StoreError> {
        self.lock()
            .exercises
            .iter()
            .find(|e| e.name == name && e.custom_for.is_none())
            .map(|e| ExerciseRecord {
                id: e.id,
                name: e.name.clone(),
                created_at: Utc::now(),
            })
            .ok_or_else(|| StoreError::not_found("exercise"))
    }

    async fn create_custom(&self, name: &str, user_id: i64) -> Result<i64, StoreError> {
        let mut state = self.lock();
        if state
            .exercises
            .iter()
            .any(|e| e.name == name && e.custom_for == Some(user_id))
        {
            return Err(StoreError::Conflict { table: "exercises" });
        }
        let id = state.next_id();
        state.exercises.push(Exercise {
            id,
            name: name.to_string(),
            custom_for: Some(user_id),
        });
        Ok(id)
    }

    async fn list_with_workout_check(&self, workout_id: i64) -> Result<Vec<ExerciseWithWorkoutCheck>, StoreError> {
        let state = self.lock();
        let owner = state
            .workouts
            .get(&workout_id)
            .map(|w| w.owner_id)
            .ok_or_else(|| StoreError::not_found("workout"))?;
        Ok(state
            .exercises
            .iter()
            .filter(|e| e.custom_for.is_none() || e.custom_for == Some(owner))
            .map(|e| ExerciseWithWorkoutCheck {
                id: e.id,
                name: e.name.clone(),
                is_in_workout: state
                    .children
                    .values()
                    .any(|c| c.workout_id == workout_id && c.exercise_id == e.id),
            })
            .collect())
    }
}
