//! Typed partial updates
//!
//! A patch is a set of optional fields. Only the fields that are present
//! become `column = $n` assignments, so column names never come from the
//! client.

use type_mapping::PostgresValue;

/// One field of a partial update
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    #[default]
    Unchanged,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            Patch::Unchanged => None,
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Patch::Unchanged, Patch::Set)
    }
}

/// Column assignments collected from a patch
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateSet {
    assignments: Vec<(&'static str, PostgresValue)>,
    guards: Vec<&'static str>,
}

impl UpdateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T>(mut self, column: &'static str, field: &Patch<T>) -> Self
    where
        T: Clone + Into<PostgresValue>,
    {
        if let Patch::Set(value) = field {
            self.assignments.push((column, value.clone().into()));
        }
        self
    }

    /// Extra static predicate the row must satisfy, ANDed after the key
    pub fn only_where(mut self, predicate: &'static str) -> Self {
        self.guards.push(predicate);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// `UPDATE table SET a = $1, b = $2, updated_at = NOW() WHERE key = $3 [AND guard ...]`.
    /// The key is bound last. An empty set still touches `updated_at`.
    pub fn to_sql(&self, table: &str, key_column: &str) -> (String, Vec<PostgresValue>) {
        let mut clauses: Vec<String> = self
            .assignments
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ${}", column, i + 1))
            .collect();
        clauses.push("updated_at = NOW()".to_string());

        let mut sql = format!(
            "UPDATE {} SET {} WHERE {} = ${}",
            table,
            clauses.join(", "),
            key_column,
            self.assignments.len() + 1
        );
        for guard in &self.guards {
            sql.push_str(" AND ");
            sql.push_str(guard);
        }
        let values = self.assignments.iter().map(|(_, value)| value.clone()).collect();
        (sql, values)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkoutPatch {
    pub title: Patch<String>,
    pub description: Patch<String>,
    pub is_private: Patch<bool>,
    pub price: Patch<f64>,
}

impl WorkoutPatch {
    pub fn update_set(&self) -> UpdateSet {
        UpdateSet::new()
            .set("title", &self.title)
            .set("description", &self.description)
            .set("is_private", &self.is_private)
            .set("price", &self.price)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkoutExercisePatch {
    pub main_note: Patch<String>,
    pub secondary_note: Patch<String>,
}

impl WorkoutExercisePatch {
    pub fn update_set(&self) -> UpdateSet {
        UpdateSet::new()
            .set("main_note", &self.main_note)
            .set("secondary_note", &self.secondary_note)
    }
}

/// `password_hash` is set by the service after hashing, never from client text
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserPatch {
    pub email: Patch<String>,
    pub username: Patch<String>,
    pub bio: Patch<String>,
    pub avatar: Patch<String>,
    pub password_hash: Patch<String>,
}

impl UserPatch {
    pub fn update_set(&self) -> UpdateSet {
        UpdateSet::new()
            .set("email", &self.email)
            .set("username", &self.username)
            .set("bio", &self.bio)
            .set("avatar", &self.avatar)
            .set("password_hash", &self.password_hash)
    }
}
