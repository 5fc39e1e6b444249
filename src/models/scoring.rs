// src/models/scoring.rs

use serde::Deserialize;
use sqlx::PgPool;
use tokio::time::timeout;

use crate::{
    error::AppError,
    models::{QUERY_TIMEOUT, game::Game, player::Player, quiz::Quiz},
};

/// DTO for submitting an answer sheet against a quiz.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnswerGameRequest {
    #[serde(rename = "playerId")]
    pub player_id: i64,
    pub answers: Vec<String>,
}

/// How a judged attempt ended. An incorrect answer sheet is a normal
/// outcome, not an error: nothing is written and the caller reports it with
/// a 200.
#[derive(Debug)]
pub enum AnswerOutcome {
    Correct { player: Player, game: Game },
    Incorrect,
}

/// Exact positional equality of the submitted answers against the stored
/// sheet: same length, every element equal, in order. No partial credit.
pub fn answers_match(submitted: &[String], stored: &[String]) -> bool {
    submitted == stored
}

/// The game-answer workflow: look up the quiz, judge the submitted answers,
/// and when they are correct, award the reward and record the game.
///
/// The award and the game record are one transaction with the player row
/// locked, so concurrent attempts serialize and a half-applied score can
/// never be observed.
#[derive(Clone)]
pub struct ScoringService {
    pool: PgPool,
}

impl ScoringService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Judges one attempt of `quiz_id` by `player_id`.
    ///
    /// The whole judge-and-record unit runs under a single deadline; if it
    /// elapses mid-transaction the rollback leaves score and game history
    /// untouched.
    pub async fn judge(
        &self,
        quiz_id: i64,
        player_id: i64,
        answers: &[String],
    ) -> Result<AnswerOutcome, AppError> {
        timeout(QUERY_TIMEOUT, self.judge_inner(quiz_id, player_id, answers)).await?
    }

    async fn judge_inner(
        &self,
        quiz_id: i64,
        player_id: i64,
        answers: &[String],
    ) -> Result<AnswerOutcome, AppError> {
        if quiz_id < 1 {
            return Err(AppError::not_found());
        }

        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT id, category, reward, questions, answers
            FROM quizes
            WHERE id = $1
            "#,
        )
        .bind(quiz_id)
        .fetch_one(&self.pool)
        .await?;

        if !answers_match(answers, &quiz.answers) {
            return Ok(AnswerOutcome::Incorrect);
        }

        if player_id < 1 {
            return Err(AppError::not_found());
        }

        let mut tx = self.pool.begin().await?;

        // Lock the row first: two concurrent correct answers for the same
        // player must both land, not overwrite each other.
        let player = sqlx::query_as::<_, Player>(
            r#"
            SELECT id, name, joined, last_update, score
            FROM players
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(player_id)
        .fetch_one(&mut *tx)
        .await?;

        let player = sqlx::query_as::<_, Player>(
            r#"
            UPDATE players
            SET score = score + $1, last_update = now()
            WHERE id = $2
            RETURNING id, name, joined, last_update, score
            "#,
        )
        .bind(quiz.reward)
        .bind(player.id)
        .fetch_one(&mut *tx)
        .await?;

        let game = sqlx::query_as::<_, Game>(
            r#"
            INSERT INTO games (player, quiz)
            VALUES ($1, $2)
            RETURNING id, finished, player, quiz
            "#,
        )
        .bind(player.id)
        .bind(quiz.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(AnswerOutcome::Correct { player, game })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn answers_match_requires_exact_positional_equality() {
        let stored = sheet(&["A", "B"]);

        assert!(answers_match(&sheet(&["A", "B"]), &stored));
        assert!(!answers_match(&sheet(&["B", "A"]), &stored));
        assert!(!answers_match(&sheet(&["A", "X"]), &stored));
        assert!(!answers_match(&sheet(&["A"]), &stored));
        assert!(!answers_match(&sheet(&["A", "B", "B"]), &stored));
        assert!(!answers_match(&sheet(&[]), &stored));
    }

    #[test]
    fn answer_comparison_is_case_sensitive() {
        let stored = sheet(&["Paris"]);
        assert!(!answers_match(&sheet(&["paris"]), &stored));
    }
}
