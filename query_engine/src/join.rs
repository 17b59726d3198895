/// `LEFT JOIN table ON left = right [AND extra ...]`
///
/// Every base row survives the join; unmatched rows carry NULLs, which the
/// aggregate counts skip.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub table: String,
    pub left_field: String,
    pub right_field: String,
    /// Constant conditions appended to the ON clause, e.g. `likes.deleted_at IS NULL`
    pub extra: Vec<String>,
}

impl JoinClause {
    pub fn left(
        table: impl Into<String>,
        left_field: impl Into<String>,
        right_field: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            left_field: left_field.into(),
            right_field: right_field.into(),
            extra: Vec::new(),
        }
    }

    /// Only join rows where `field IS NULL`
    pub fn and_is_null(mut self, field: impl Into<String>) -> Self {
        self.extra.push(format!("{} IS NULL", field.into()));
        self
    }

    pub fn to_sql(&self) -> String {
        let mut sql = format!(
            "LEFT JOIN {} ON {} = {}",
            self.table, self.left_field, self.right_field
        );
        for condition in &self.extra {
            sql.push_str(" AND ");
            sql.push_str(condition);
        }
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_join_with_null_guard() {
        let join = JoinClause::left("workout_likes", "workouts.id", "workout_likes.workout_id")
            .and_is_null("workout_likes.deleted_at");

        assert_eq!(
            join.to_sql(),
            "LEFT JOIN workout_likes ON workouts.id = workout_likes.workout_id AND workout_likes.deleted_at IS NULL"
        );
    }

    #[test]
    fn test_plain_left_join() {
        let join = JoinClause::left("exercises", "workout_exercises.exercise_id", "exercises.id");

        assert_eq!(
            join.to_sql(),
            "LEFT JOIN exercises ON workout_exercises.exercise_id = exercises.id"
        );
    }
}
