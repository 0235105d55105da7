//! Goal service
//!
//! Savings goals and the contributions toward them. Contributing inserts a
//! contribution row and raises the goal's saved amount; deleting a goal
//! removes its contributions too.

use chrono::{Local, NaiveDate};

use crate::audit::EntityType;
use crate::error::{FedhaError, FedhaResult};
use crate::models::{Contribution, Goal, Money, OwnerId};
use crate::storage::Storage;

use super::resolve_one;

/// Service for goal management
pub struct GoalService<'a> {
    storage: &'a Storage,
}

impl<'a> GoalService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(
        &self,
        owner: OwnerId,
        name: &str,
        target: Money,
        saved: Option<Money>,
        deadline: Option<NaiveDate>,
    ) -> FedhaResult<Goal> {
        let mut goal = Goal::new(owner, name, target);
        goal.saved_amount = saved.unwrap_or_default();
        goal.deadline = deadline;

        goal.validate()
            .map_err(|e| FedhaError::Validation(e.to_string()))?;

        self.storage.goals.insert(goal.clone())?;
        self.storage.goals.save()?;

        self.storage.log_create(
            EntityType::Goal,
            goal.id.to_string(),
            Some(goal.name.clone()),
            &goal,
        )?;

        Ok(goal)
    }

    /// The owner's goals; open goals with the nearest deadline first
    pub fn list(&self, owner: OwnerId) -> FedhaResult<Vec<Goal>> {
        let mut goals = self.storage.goals.select(|g| g.owner == owner)?;
        goals.sort_by(|a, b| {
            a.is_completed()
                .cmp(&b.is_completed())
                .then_with(|| match (a.deadline, b.deadline) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                })
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(goals)
    }

    /// Find a goal by ID or by exact name (case-insensitive)
    pub fn find(&self, owner: OwnerId, input: &str) -> FedhaResult<Option<Goal>> {
        let rows = self.storage.goals.select(|g| g.owner == owner)?;
        let wanted = input.trim();

        if let Some(goal) = rows.iter().find(|g| g.name.eq_ignore_ascii_case(wanted)) {
            return Ok(Some(goal.clone()));
        }
        resolve_one(rows, input, |g| g.id.matches(input))
    }

    /// Add money to a goal
    pub fn contribute(
        &self,
        owner: OwnerId,
        goal: &str,
        amount: Money,
        date: Option<NaiveDate>,
        notes: Option<String>,
    ) -> FedhaResult<(Goal, Contribution)> {
        let before = self
            .find(owner, goal)?
            .ok_or_else(|| FedhaError::goal_not_found(goal))?;

        let contribution = Contribution::new(
            owner,
            before.id,
            amount,
            date.unwrap_or_else(|| Local::now().date_naive()),
        )
        .with_notes(notes);
        contribution
            .validate()
            .map_err(|e| FedhaError::Validation(e.to_string()))?;

        // Both checks run before anything is written
        let mut after = before.clone();
        after
            .add_saved(amount)
            .map_err(|e| FedhaError::Validation(e.to_string()))?;

        self.storage.contributions.insert(contribution.clone())?;
        self.storage.contributions.save()?;

        let after = self
            .storage
            .goals
            .update(before.id, |g| *g = after)?
            .ok_or_else(|| FedhaError::goal_not_found(goal))?;
        self.storage.goals.save()?;

        self.storage.log_create(
            EntityType::Contribution,
            contribution.id.to_string(),
            Some(after.name.clone()),
            &contribution,
        )?;
        self.storage.log_update(
            EntityType::Goal,
            after.id.to_string(),
            Some(after.name.clone()),
            &before,
            &after,
        )?;

        if after.is_completed() && !before.is_completed() {
            tracing::info!(goal = %after.id, "goal reached");
        }

        Ok((after, contribution))
    }

    /// Contributions to one goal, newest first
    pub fn contributions(&self, owner: OwnerId, goal: &str) -> FedhaResult<Vec<Contribution>> {
        let goal = self
            .find(owner, goal)?
            .ok_or_else(|| FedhaError::goal_not_found(goal))?;

        let mut rows = self
            .storage
            .contributions
            .select(|c| c.owner == owner && c.goal_id == goal.id)?;
        rows.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(rows)
    }

    /// Delete a goal and every contribution made to it
    pub fn delete(&self, owner: OwnerId, input: &str) -> FedhaResult<(Goal, usize)> {
        let goal = self
            .find(owner, input)?
            .ok_or_else(|| FedhaError::goal_not_found(input))?;

        let removed = self
            .storage
            .contributions
            .delete_where(|c| c.goal_id == goal.id)?;
        self.storage.contributions.save()?;

        self.storage.goals.delete(goal.id)?;
        self.storage.goals.save()?;

        for contribution in &removed {
            self.storage.log_delete(
                EntityType::Contribution,
                contribution.id.to_string(),
                Some(goal.name.clone()),
                contribution,
            )?;
        }
        self.storage.log_delete(
            EntityType::Goal,
            goal.id.to_string(),
            Some(goal.name.clone()),
            &goal,
        )?;

        Ok((goal, removed.len()))
    }
}
