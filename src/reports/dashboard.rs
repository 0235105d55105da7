//! Dashboard
//!
//! Aggregates the owner's fetched rows into totals, a category breakdown, a
//! monthly trend and budget/goal summaries. Nothing here writes.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{FedhaError, FedhaResult};
use crate::models::{Budget, Expense, ExpenseCategory, Goal, Income, Money, Month, OwnerId};
use crate::storage::Storage;

/// How many rows the recent activity list keeps
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// Longest trend the dashboard will build (ten years)
pub const MAX_TREND_MONTHS: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub income: Money,
    pub expenses: Money,
    pub net: Money,
    /// Share of income kept, `None` when there is no income
    pub savings_rate: Option<f64>,
}

impl Totals {
    fn new(income: Money, expenses: Money) -> Self {
        let savings_rate = if income.is_positive() {
            Some((income - expenses).percent_of(income))
        } else {
            None
        };
        Self {
            income,
            expenses,
            net: income - expenses,
            savings_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: ExpenseCategory,
    pub amount: Money,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthPoint {
    pub month: Month,
    pub income: Money,
    pub expenses: Money,
    pub net: Money,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub count: usize,
    pub total_limit: Money,
    pub total_spent: Money,
    pub over_budget: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GoalSummary {
    pub active: usize,
    pub completed: usize,
    pub total_saved: Money,
    pub total_target: Money,
    /// Saved over target across all goals, capped at 100
    pub progress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Expense,
    Income,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    pub kind: ActivityKind,
    pub date: NaiveDate,
    /// Category for expenses, source for income
    pub label: String,
    pub amount: Money,
    #[serde(skip)]
    created_at: DateTime<Utc>,
}

/// Everything the dashboard shows
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub current_month: Month,
    pub totals: Totals,
    pub this_month: Totals,
    pub by_category: Vec<CategoryShare>,
    pub trend: Vec<MonthPoint>,
    pub budgets: BudgetSummary,
    pub goals: GoalSummary,
    pub recent: Vec<Activity>,
}

impl Dashboard {
    /// Build the dashboard for `owner` from storage
    pub fn generate(
        storage: &Storage,
        owner: OwnerId,
        current_month: Month,
        months: u32,
    ) -> FedhaResult<Self> {
        if !(1..=MAX_TREND_MONTHS).contains(&months) {
            return Err(FedhaError::Validation(format!(
                "Trend length must be between 1 and {} months",
                MAX_TREND_MONTHS
            )));
        }

        let expenses = storage.expenses.select(|e| e.owner == owner)?;
        let income = storage.income.select(|i| i.owner == owner)?;
        let budgets = storage.budgets.select(|b| b.owner == owner)?;
        let goals = storage.goals.select(|g| g.owner == owner)?;

        Ok(Self::from_rows(
            &expenses,
            &income,
            &budgets,
            &goals,
            current_month,
            months,
        ))
    }

    /// Aggregate already-fetched rows; `months` is clamped to
    /// [`MAX_TREND_MONTHS`]
    pub fn from_rows(
        expenses: &[Expense],
        income: &[Income],
        budgets: &[Budget],
        goals: &[Goal],
        current_month: Month,
        months: u32,
    ) -> Self {
        let total_income: Money = income.iter().map(|i| i.amount).sum();
        let total_expenses: Money = expenses.iter().map(|e| e.amount).sum();

        let month_income: Money = income
            .iter()
            .filter(|i| current_month.contains(i.date))
            .map(|i| i.amount)
            .sum();
        let month_expenses: Money = expenses
            .iter()
            .filter(|e| current_month.contains(e.date))
            .map(|e| e.amount)
            .sum();

        Self {
            current_month,
            totals: Totals::new(total_income, total_expenses),
            this_month: Totals::new(month_income, month_expenses),
            by_category: category_breakdown(expenses, total_expenses),
            trend: monthly_trend(
                expenses,
                income,
                current_month,
                months.min(MAX_TREND_MONTHS),
            ),
            budgets: budget_summary(budgets),
            goals: goal_summary(goals),
            recent: recent_activity(expenses, income),
        }
    }

    /// Plain-text rendering for the terminal
    pub fn format_terminal(&self, currency: &str) -> String {
        let fmt = |m: Money| m.format_with_currency(currency);
        let mut output = String::new();

        output.push_str("Financial Overview\n");
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!("Total Income:    {:>20}\n", fmt(self.totals.income)));
        output.push_str(&format!("Total Expenses:  {:>20}\n", fmt(self.totals.expenses)));
        output.push_str(&format!("Net Balance:     {:>20}\n", fmt(self.totals.net)));
        output.push_str(&format!(
            "Savings Rate:    {:>20}\n",
            self.totals
                .savings_rate
                .map(|r| format!("{:.1}%", r))
                .unwrap_or_else(|| "-".to_string())
        ));

        output.push_str(&format!("\n{}\n", self.current_month.label()));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!("Income:          {:>20}\n", fmt(self.this_month.income)));
        output.push_str(&format!("Expenses:        {:>20}\n", fmt(self.this_month.expenses)));
        output.push_str(&format!("Net:             {:>20}\n", fmt(self.this_month.net)));

        if !self.by_category.is_empty() {
            output.push_str("\nSpending by Category\n");
            output.push_str(&"-".repeat(60));
            output.push('\n');
            for share in &self.by_category {
                output.push_str(&format!(
                    "{:<16} {:>20} {:>6.1}%\n",
                    share.category.name(),
                    fmt(share.amount),
                    share.percentage
                ));
            }
        }

        output.push_str("\nMonthly Trend\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "{:<10} {:>15} {:>15} {:>15}\n",
            "Month", "Income", "Expenses", "Net"
        ));
        for point in &self.trend {
            output.push_str(&format!(
                "{:<10} {:>15} {:>15} {:>15}\n",
                point.month.label(),
                point.income,
                point.expenses,
                point.net
            ));
        }

        output.push_str(&format!(
            "\nBudgets: {} ({} over), {} spent of {}\n",
            self.budgets.count,
            self.budgets.over_budget,
            fmt(self.budgets.total_spent),
            fmt(self.budgets.total_limit)
        ));
        output.push_str(&format!(
            "Goals: {} active, {} completed, {} saved of {} ({:.1}%)\n",
            self.goals.active,
            self.goals.completed,
            fmt(self.goals.total_saved),
            fmt(self.goals.total_target),
            self.goals.progress
        ));

        if !self.recent.is_empty() {
            output.push_str("\nRecent Activity\n");
            output.push_str(&"-".repeat(60));
            output.push('\n');
            for item in &self.recent {
                let sign = match item.kind {
                    ActivityKind::Expense => "-",
                    ActivityKind::Income => "+",
                };
                output.push_str(&format!(
                    "{}  {:<20} {}{}\n",
                    item.date,
                    item.label,
                    sign,
                    fmt(item.amount)
                ));
            }
        }

        output
    }
}

fn category_breakdown(expenses: &[Expense], total: Money) -> Vec<CategoryShare> {
    let mut by_category: HashMap<ExpenseCategory, (Money, usize)> = HashMap::new();
    for expense in expenses {
        let entry = by_category
            .entry(expense.category)
            .or_insert((Money::zero(), 0));
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    let mut shares: Vec<CategoryShare> = by_category
        .into_iter()
        .map(|(category, (amount, count))| CategoryShare {
            category,
            amount,
            count,
            percentage: amount.percent_of(total),
        })
        .collect();

    // Largest first; ties in the fixed category order
    shares.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    shares
}

fn monthly_trend(
    expenses: &[Expense],
    income: &[Income],
    current: Month,
    months: u32,
) -> Vec<MonthPoint> {
    current
        .trailing(months)
        .into_iter()
        .map(|month| {
            let income: Money = income
                .iter()
                .filter(|i| month.contains(i.date))
                .map(|i| i.amount)
                .sum();
            let expenses: Money = expenses
                .iter()
                .filter(|e| month.contains(e.date))
                .map(|e| e.amount)
                .sum();
            MonthPoint {
                month,
                income,
                expenses,
                net: income - expenses,
            }
        })
        .collect()
}

fn budget_summary(budgets: &[Budget]) -> BudgetSummary {
    BudgetSummary {
        count: budgets.len(),
        total_limit: budgets.iter().map(|b| b.limit).sum(),
        total_spent: budgets.iter().map(|b| b.spent).sum(),
        over_budget: budgets.iter().filter(|b| b.is_over_budget()).count(),
    }
}

fn goal_summary(goals: &[Goal]) -> GoalSummary {
    let completed = goals.iter().filter(|g| g.is_completed()).count();
    let total_saved: Money = goals.iter().map(|g| g.saved_amount).sum();
    let total_target: Money = goals.iter().map(|g| g.target_amount).sum();

    GoalSummary {
        active: goals.len() - completed,
        completed,
        total_saved,
        total_target,
        progress: total_saved.percent_of(total_target).min(100.0),
    }
}

fn recent_activity(expenses: &[Expense], income: &[Income]) -> Vec<Activity> {
    let mut items: Vec<Activity> = expenses
        .iter()
        .map(|e| Activity {
            kind: ActivityKind::Expense,
            date: e.date,
            label: e.category.name().to_string(),
            amount: e.amount,
            created_at: e.created_at,
        })
        .chain(income.iter().map(|i| Activity {
            kind: ActivityKind::Income,
            date: i.date,
            label: i.source.clone(),
            amount: i.amount,
            created_at: i.created_at,
        }))
        .collect();

    items.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    items.truncate(RECENT_ACTIVITY_LIMIT);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FedhaPaths;
    use crate::models::BudgetPeriodKind;
    use tempfile::TempDir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn march() -> Month {
        Month::new(2025, 3).unwrap()
    }

    fn expense(owner: OwnerId, cents: i64, cat: ExpenseCategory, date: NaiveDate) -> Expense {
        Expense::new(owner, Money::from_cents(cents), cat, date)
    }

    fn income(owner: OwnerId, cents: i64, source: &str, date: NaiveDate) -> Income {
        Income::new(owner, Money::from_cents(cents), source, date)
    }

    #[test]
    fn test_totals_and_savings_rate() {
        let owner = OwnerId::new();
        let expenses = vec![
            expense(owner, 30_000, ExpenseCategory::Food, d(2025, 3, 2)),
            expense(owner, 10_000, ExpenseCategory::Bills, d(2025, 1, 5)),
        ];
        let income = vec![
            income(owner, 80_000, "Salary", d(2025, 3, 1)),
            income(owner, 20_000, "Side gig", d(2025, 2, 1)),
        ];

        let dash = Dashboard::from_rows(&expenses, &income, &[], &[], march(), 6);

        assert_eq!(dash.totals.income.cents(), 100_000);
        assert_eq!(dash.totals.expenses.cents(), 40_000);
        assert_eq!(dash.totals.net.cents(), 60_000);
        assert_eq!(dash.totals.savings_rate, Some(60.0));

        assert_eq!(dash.this_month.income.cents(), 80_000);
        assert_eq!(dash.this_month.expenses.cents(), 30_000);
        assert_eq!(dash.this_month.net.cents(), 50_000);
    }

    #[test]
    fn test_no_income_has_no_savings_rate() {
        let owner = OwnerId::new();
        let expenses = vec![expense(owner, 500, ExpenseCategory::Other, d(2025, 3, 1))];

        let dash = Dashboard::from_rows(&expenses, &[], &[], &[], march(), 3);
        assert_eq!(dash.totals.savings_rate, None);
        assert_eq!(dash.totals.net.cents(), -500);
    }

    #[test]
    fn test_category_breakdown_largest_first() {
        let owner = OwnerId::new();
        let expenses = vec![
            expense(owner, 2_500, ExpenseCategory::Transport, d(2025, 3, 1)),
            expense(owner, 5_000, ExpenseCategory::Food, d(2025, 3, 2)),
            expense(owner, 2_500, ExpenseCategory::Food, d(2025, 3, 3)),
        ];

        let dash = Dashboard::from_rows(&expenses, &[], &[], &[], march(), 1);
        assert_eq!(dash.by_category.len(), 2);
        assert_eq!(dash.by_category[0].category, ExpenseCategory::Food);
        assert_eq!(dash.by_category[0].count, 2);
        assert_eq!(dash.by_category[0].percentage, 75.0);
        assert_eq!(dash.by_category[1].percentage, 25.0);
    }

    #[test]
    fn test_trend_is_zero_filled_oldest_first() {
        let owner = OwnerId::new();
        let expenses = vec![expense(owner, 1_000, ExpenseCategory::Food, d(2025, 1, 15))];
        let income = vec![income(owner, 4_000, "Salary", d(2025, 3, 1))];

        let dash = Dashboard::from_rows(&expenses, &income, &[], &[], march(), 4);
        let months: Vec<String> = dash.trend.iter().map(|p| p.month.to_string()).collect();
        assert_eq!(months, vec!["2024-12", "2025-01", "2025-02", "2025-03"]);

        assert!(dash.trend[0].income.is_zero() && dash.trend[0].expenses.is_zero());
        assert_eq!(dash.trend[1].net.cents(), -1_000);
        assert!(dash.trend[2].net.is_zero());
        assert_eq!(dash.trend[3].net.cents(), 4_000);
    }

    #[test]
    fn test_budget_and_goal_summaries() {
        let owner = OwnerId::new();
        let mut over = Budget::new(owner, "Food", Money::from_cents(1_000), BudgetPeriodKind::Monthly, march());
        over.set_spent(Money::from_cents(1_500));
        let mut under = Budget::new(owner, "Bills", Money::from_cents(2_000), BudgetPeriodKind::Monthly, march());
        under.set_spent(Money::from_cents(500));

        let mut done = Goal::new(owner, "Phone", Money::from_cents(1_000));
        done.add_saved(Money::from_cents(1_000)).unwrap();
        let mut open = Goal::new(owner, "Car", Money::from_cents(3_000));
        open.add_saved(Money::from_cents(1_000)).unwrap();

        let dash = Dashboard::from_rows(&[], &[], &[over, under], &[done, open], march(), 1);

        assert_eq!(dash.budgets.count, 2);
        assert_eq!(dash.budgets.total_limit.cents(), 3_000);
        assert_eq!(dash.budgets.total_spent.cents(), 2_000);
        assert_eq!(dash.budgets.over_budget, 1);

        assert_eq!(dash.goals.active, 1);
        assert_eq!(dash.goals.completed, 1);
        assert_eq!(dash.goals.total_saved.cents(), 2_000);
        assert_eq!(dash.goals.progress, 50.0);
    }

    #[test]
    fn test_recent_activity_keeps_newest_five() {
        let owner = OwnerId::new();
        let expenses: Vec<Expense> = (1..=4)
            .map(|day| expense(owner, 100, ExpenseCategory::Food, d(2025, 3, day)))
            .collect();
        let income: Vec<Income> = (5..=7)
            .map(|day| income(owner, 100, "Salary", d(2025, 3, day)))
            .collect();

        let dash = Dashboard::from_rows(&expenses, &income, &[], &[], march(), 1);
        assert_eq!(dash.recent.len(), RECENT_ACTIVITY_LIMIT);
        assert_eq!(dash.recent[0].date, d(2025, 3, 7));
        assert_eq!(dash.recent[0].kind, ActivityKind::Income);
        assert_eq!(dash.recent[4].date, d(2025, 3, 3));
        assert_eq!(dash.recent[4].kind, ActivityKind::Expense);
    }

    #[test]
    fn test_generate_only_reads_owner_rows() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FedhaPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let me = OwnerId::new();
        storage
            .expenses
            .insert(expense(me, 700, ExpenseCategory::Food, d(2025, 3, 1)))
            .unwrap();
        storage
            .expenses
            .insert(expense(OwnerId::new(), 99_999, ExpenseCategory::Food, d(2025, 3, 1)))
            .unwrap();

        let dash = Dashboard::generate(&storage, me, march(), 6).unwrap();
        assert_eq!(dash.totals.expenses.cents(), 700);
        assert_eq!(dash.trend.len(), 6);

        let text = dash.format_terminal("KES");
        assert!(text.contains("Total Expenses"));
        assert!(text.contains("KES 7.00"));
    }

    #[test]
    fn test_trend_length_is_bounded() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FedhaPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        let me = OwnerId::new();

        for months in [0, MAX_TREND_MONTHS + 1, u32::MAX] {
            assert!(Dashboard::generate(&storage, me, march(), months)
                .unwrap_err()
                .is_validation());
        }
        let dash = Dashboard::generate(&storage, me, march(), MAX_TREND_MONTHS).unwrap();
        assert_eq!(dash.trend.len(), MAX_TREND_MONTHS as usize);

        let dash = Dashboard::from_rows(&[], &[], &[], &[], march(), u32::MAX);
        assert_eq!(dash.trend.len(), MAX_TREND_MONTHS as usize);
    }
}
